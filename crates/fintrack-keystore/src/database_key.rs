//! Database encryption key management
//!
//! The app database is encrypted with a 64-byte key that is generated once
//! from the OS RNG and kept only in secure storage. The key never appears in
//! logs and is zeroized when dropped.

use crate::store::{AccessPolicy, CredentialKey, CredentialStore};
use crate::{Error, Result};
use rand::rngs::OsRng;
use rand::RngCore;
use zeroize::Zeroizing;

/// Database encryption key length in bytes (512 bits)
pub const DATABASE_KEY_LEN: usize = 64;

/// 64-byte database encryption key
pub struct DatabaseKey(Zeroizing<[u8; DATABASE_KEY_LEN]>);

impl DatabaseKey {
    /// Generate a fresh key from the OS RNG
    pub fn generate() -> Self {
        let mut key = [0u8; DATABASE_KEY_LEN];
        OsRng.fill_bytes(&mut key);
        Self(Zeroizing::new(key))
    }

    /// Parse from the stored hex encoding
    pub fn from_hex(encoded: &str) -> Result<Self> {
        if encoded.len() != DATABASE_KEY_LEN * 2 {
            return Err(Error::Encryption(format!(
                "database key must be {} bytes",
                DATABASE_KEY_LEN
            )));
        }
        let bytes = hex::decode(encoded)
            .map_err(|e| Error::Encryption(format!("invalid database key encoding: {e}")))?;
        let mut key = [0u8; DATABASE_KEY_LEN];
        key.copy_from_slice(&bytes);
        Ok(Self(Zeroizing::new(key)))
    }

    /// Hex encoding for storage
    pub fn to_hex(&self) -> Zeroizing<String> {
        Zeroizing::new(hex::encode(self.0.as_slice()))
    }

    /// Raw key bytes
    pub fn as_bytes(&self) -> &[u8; DATABASE_KEY_LEN] {
        &self.0
    }

    /// Read the key from the store, generating and persisting a fresh one
    /// when absent. A malformed or truncated stored value is replaced rather
    /// than propagated — the database it guarded is unreadable either way.
    pub async fn get_or_create(store: &dyn CredentialStore) -> Result<Self> {
        if let Some(encoded) = store.get(CredentialKey::DatabaseKey).await? {
            match Self::from_hex(&encoded) {
                Ok(key) => return Ok(key),
                Err(_) => {
                    tracing::warn!("stored database key is malformed; regenerating");
                }
            }
        }

        let key = Self::generate();
        store
            .set(
                CredentialKey::DatabaseKey,
                &key.to_hex(),
                AccessPolicy::WhenUnlocked,
            )
            .await?;
        Ok(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryStore;

    #[test]
    fn hex_roundtrip() {
        let key = DatabaseKey::generate();
        let parsed = DatabaseKey::from_hex(&key.to_hex()).unwrap();
        assert_eq!(parsed.as_bytes(), key.as_bytes());
    }

    #[test]
    fn rejects_wrong_length() {
        assert!(DatabaseKey::from_hex("abcd").is_err());
        assert!(DatabaseKey::from_hex(&"ff".repeat(DATABASE_KEY_LEN - 1)).is_err());
    }

    #[tokio::test]
    async fn generated_once_and_stable() {
        let store = MemoryStore::new();
        let first = DatabaseKey::get_or_create(&store).await.unwrap();
        let second = DatabaseKey::get_or_create(&store).await.unwrap();
        assert_eq!(first.as_bytes(), second.as_bytes());
    }

    #[tokio::test]
    async fn malformed_stored_key_is_replaced() {
        let store = MemoryStore::new();
        store
            .set(
                CredentialKey::DatabaseKey,
                "not-a-key",
                AccessPolicy::WhenUnlocked,
            )
            .await
            .unwrap();

        let key = DatabaseKey::get_or_create(&store).await.unwrap();
        let stored = store
            .get(CredentialKey::DatabaseKey)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored, *key.to_hex());
        assert_eq!(stored.len(), DATABASE_KEY_LEN * 2);
    }

    #[tokio::test]
    async fn write_failure_propagates() {
        let store = MemoryStore::new();
        store.set_fail_writes(true);
        assert!(DatabaseKey::get_or_create(&store).await.is_err());
    }
}
