use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::timeout;

use chrono::Utc;
use uuid::Uuid;

use crate::models::account::Account;
use crate::models::error::GalleryError;

/// Wallet accounts and their live sessions, keyed by lowercase address.
///
/// Same lock and timeout discipline as the comic store: bounded waits,
/// `StoreUnavailable` on expiry.
#[derive(Clone)]
pub struct AccountStore {
    accounts: Arc<RwLock<HashMap<String, Account>>>,
    sessions: Arc<RwLock<HashMap<String, String>>>,
    op_timeout: Duration,
}

impl AccountStore {
    pub fn new(op_timeout: Duration) -> Self {
        AccountStore {
            accounts: Arc::new(RwLock::new(HashMap::new())),
            sessions: Arc::new(RwLock::new(HashMap::new())),
            op_timeout,
        }
    }

    /// Find or create the account for `address` and rotate its nonce.
    /// Returns the fresh nonce for the client to sign.
    pub async fn issue_nonce(&self, address: &str) -> Result<String, GalleryError> {
        let address = normalize_address(address)?;
        let nonce = Uuid::new_v4().simple().to_string();

        let mut accounts = timeout(self.op_timeout, self.accounts.write())
            .await
            .map_err(|_| GalleryError::StoreUnavailable)?;
        match accounts.get_mut(&address) {
            Some(account) => account.nonce = nonce.clone(),
            None => {
                accounts.insert(
                    address.clone(),
                    Account {
                        id: Uuid::new_v4().to_string(),
                        address,
                        nonce: nonce.clone(),
                        created_at: Utc::now(),
                    },
                );
            }
        }
        Ok(nonce)
    }

    pub async fn get_by_address(&self, address: &str) -> Result<Account, GalleryError> {
        let address = normalize_address(address)?;
        let accounts = timeout(self.op_timeout, self.accounts.read())
            .await
            .map_err(|_| GalleryError::StoreUnavailable)?;
        accounts.get(&address).cloned().ok_or(GalleryError::NotFound)
    }

    /// Rotate the account's nonce and open a session. Called only after the
    /// login signature has been verified; the rotation makes the signed
    /// message single-use.
    pub async fn open_session(&self, address: &str) -> Result<String, GalleryError> {
        let address = normalize_address(address)?;

        let mut accounts = timeout(self.op_timeout, self.accounts.write())
            .await
            .map_err(|_| GalleryError::StoreUnavailable)?;
        let account = accounts.get_mut(&address).ok_or(GalleryError::NotFound)?;
        account.nonce = Uuid::new_v4().simple().to_string();
        drop(accounts);

        let token = Uuid::new_v4().simple().to_string();
        let mut sessions = timeout(self.op_timeout, self.sessions.write())
            .await
            .map_err(|_| GalleryError::StoreUnavailable)?;
        sessions.insert(token.clone(), address);
        Ok(token)
    }

    /// Resolve a session token to its account.
    pub async fn session_account(&self, token: &str) -> Result<Account, GalleryError> {
        let sessions = timeout(self.op_timeout, self.sessions.read())
            .await
            .map_err(|_| GalleryError::StoreUnavailable)?;
        let address = sessions.get(token).cloned().ok_or(GalleryError::Unauthorized)?;
        drop(sessions);

        self.get_by_address(&address).await.map_err(|err| match err {
            GalleryError::NotFound => GalleryError::Unauthorized,
            other => other,
        })
    }

    pub async fn revoke_session(&self, token: &str) -> Result<(), GalleryError> {
        let mut sessions = timeout(self.op_timeout, self.sessions.write())
            .await
            .map_err(|_| GalleryError::StoreUnavailable)?;
        sessions.remove(token);
        Ok(())
    }
}

fn normalize_address(address: &str) -> Result<String, GalleryError> {
    let address = address.trim().to_lowercase();
    if address.is_empty() {
        return Err(GalleryError::Validation("address is required".to_string()));
    }
    Ok(address)
}
