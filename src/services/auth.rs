use rocket::http::Status;
use rocket::request::{FromRequest, Outcome};
use rocket::Request;
use rocket::State;

use k256::ecdsa::{RecoveryId, Signature, VerifyingKey};
use sha3::{Digest, Keccak256};

use crate::models::account::Account;
use crate::models::error::GalleryError;
use crate::store::account_store::AccountStore;

/// The message a wallet signs to log in. Binds the signature to the
/// account's current nonce, which is rotated on every successful login.
pub fn login_message(nonce: &str) -> String {
    format!("Sign this message to authenticate with our app: {}", nonce)
}

/// Keccak-256 over the EIP-191 personal-message envelope.
fn personal_hash(message: &str) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(format!("\x19Ethereum Signed Message:\n{}", message.len()));
    hasher.update(message);
    hasher.finalize().into()
}

/// Recover the lowercase signer address from a 65-byte r||s||v signature
/// over the personal-message hash of `message`.
pub fn recover_signer(message: &str, signature: &str) -> Result<String, GalleryError> {
    let raw = hex::decode(signature.trim_start_matches("0x"))
        .map_err(|_| GalleryError::Validation("signature is not valid hex".to_string()))?;
    if raw.len() != 65 {
        return Err(GalleryError::Validation("signature must be 65 bytes".to_string()));
    }

    let signature = Signature::from_slice(&raw[..64])
        .map_err(|_| GalleryError::Validation("malformed signature".to_string()))?;
    let v = raw[64];
    let recovery_id = RecoveryId::from_byte(if v >= 27 { v - 27 } else { v })
        .ok_or_else(|| GalleryError::Validation("invalid recovery id".to_string()))?;

    let digest = personal_hash(message);
    let key = VerifyingKey::recover_from_prehash(&digest, &signature, recovery_id)
        .map_err(|_| GalleryError::Validation("signature recovery failed".to_string()))?;

    let point = key.to_encoded_point(false);
    let hash = Keccak256::digest(&point.as_bytes()[1..]);
    Ok(format!("0x{}", hex::encode(&hash[12..])))
}

/// Check that `signature` is a valid signature by `address` over the login
/// message for `nonce`.
pub fn verify_login(address: &str, nonce: &str, signature: &str) -> Result<(), GalleryError> {
    let signer = recover_signer(&login_message(nonce), signature)?;
    if signer != address.trim().to_lowercase() {
        return Err(GalleryError::Unauthorized);
    }
    Ok(())
}

/// Request guard resolving `Authorization: Bearer <token>` to an account.
pub struct AuthGuard {
    pub account: Account,
    pub token: String,
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for AuthGuard {
    type Error = ();

    async fn from_request(request: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let accounts = match request.guard::<&State<AccountStore>>().await.succeeded() {
            Some(accounts) => accounts,
            None => return Outcome::Error((Status::InternalServerError, ())),
        };

        let token = match request.headers().get_one("Authorization") {
            Some(header) if header.starts_with("Bearer ") => &header[7..],
            _ => return Outcome::Error((Status::Unauthorized, ())),
        };

        match accounts.session_account(token).await {
            Ok(account) => Outcome::Success(AuthGuard { account, token: token.to_string() }),
            Err(err) => Outcome::Error((err.status(), ())),
        }
    }
}
