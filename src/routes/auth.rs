use log::{info, warn};
use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::State;
use serde::{Deserialize, Serialize};

use crate::services::auth::{verify_login, AuthGuard};
use crate::store::account_store::AccountStore;

#[derive(Serialize)]
pub struct NonceResponse {
    nonce: String,
}

#[derive(Serialize)]
pub struct UserInfo {
    id: String,
    address: String,
}

#[derive(Serialize)]
pub struct SessionResponse {
    token: String,
    user: UserInfo,
}

#[derive(Serialize)]
pub struct CurrentSession {
    user: Option<UserInfo>,
}

#[derive(Deserialize)]
pub struct VerifyRequest {
    address: String,
    signature: String,
}

#[derive(Serialize)]
pub struct LogoutResponse {
    success: bool,
}

#[get("/auth/nonce?<address>")]
pub async fn nonce(
    accounts: &State<AccountStore>,
    address: Option<String>,
) -> Result<Json<NonceResponse>, Status> {
    let address = address.ok_or(Status::BadRequest)?;
    let nonce = accounts.issue_nonce(&address).await.map_err(|e| {
        warn!("Failed to issue nonce: {}", e);
        e.status()
    })?;
    Ok(Json(NonceResponse { nonce }))
}

/// Wallet login. The submitted signature must be valid over the login
/// message for the account's current nonce; on success the nonce is rotated
/// and a session token is issued.
#[post("/auth/verify", data = "<payload>")]
pub async fn verify(
    accounts: &State<AccountStore>,
    payload: Json<VerifyRequest>,
) -> Result<Json<SessionResponse>, Status> {
    let account = accounts.get_by_address(&payload.address).await.map_err(|e| {
        warn!("Login for unknown address: {}", e);
        Status::Unauthorized
    })?;

    verify_login(&payload.address, &account.nonce, &payload.signature).map_err(|e| {
        warn!("Signature verification failed for {}: {}", account.address, e);
        e.status()
    })?;

    let token = accounts.open_session(&account.address).await.map_err(|e| e.status())?;
    info!("Wallet {} logged in", account.address);

    Ok(Json(SessionResponse {
        token,
        user: UserInfo { id: account.id, address: account.address },
    }))
}

#[get("/auth/session")]
pub async fn session(auth: Option<AuthGuard>) -> Json<CurrentSession> {
    Json(CurrentSession {
        user: auth.map(|auth| UserInfo {
            id: auth.account.id,
            address: auth.account.address,
        }),
    })
}

#[post("/auth/logout")]
pub async fn logout(
    accounts: &State<AccountStore>,
    auth: AuthGuard,
) -> Result<Json<LogoutResponse>, Status> {
    accounts.revoke_session(&auth.token).await.map_err(|e| e.status())?;
    Ok(Json(LogoutResponse { success: true }))
}

#[options("/auth/nonce")]
pub fn nonce_options() -> Status {
    Status::NoContent
}

#[options("/auth/verify")]
pub fn verify_options() -> Status {
    Status::NoContent
}

#[options("/auth/session")]
pub fn session_options() -> Status {
    Status::NoContent
}

#[options("/auth/logout")]
pub fn logout_options() -> Status {
    Status::NoContent
}
