//! API key minting and validation.

use rand::rngs::OsRng;
use rand::RngCore;

use crate::errors::AppError;
use crate::store::{ApiKey, KeyStore};

pub const KEY_PREFIX: &str = "dgst_";

/// Mint a new opaque API key string: `dgst_` plus 24 random bytes, hex.
pub fn generate_key() -> String {
    let mut raw = [0u8; 24];
    OsRng.fill_bytes(&mut raw);
    format!("{}{}", KEY_PREFIX, hex::encode(raw))
}

/// Look up a presented API key.
///
/// An empty candidate is its own failure (the caller never sent one) and
/// must not be confused with an unmatched key; a store failure propagates
/// as-is so an outage is never reported as an invalid key.
pub async fn validate(store: &dyn KeyStore, candidate: &str) -> Result<ApiKey, AppError> {
    if candidate.trim().is_empty() {
        return Err(AppError::MissingApiKey);
    }

    match store.find_by_key(candidate).await? {
        Some(key) => Ok(key),
        None => Err(AppError::InvalidApiKey),
    }
}
