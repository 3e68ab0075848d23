use chrono::{DateTime, Utc};
use serde::Serialize;

/// A wallet-backed identity. The address is the canonical identifier and is
/// normalized to lowercase before it ever reaches a store or a comic record.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: String,
    pub address: String,
    /// One-time challenge for the next signature login; rotated on every
    /// nonce request and after every successful verification.
    #[serde(skip_serializing)]
    pub nonce: String,
    pub created_at: DateTime<Utc>,
}
