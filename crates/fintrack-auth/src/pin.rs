//! PIN authentication with lockout
//!
//! The PIN is never persisted; only an Argon2id hash (PHC string) reaches
//! secure storage. Verification is deliberately slow — tens of milliseconds
//! on phone hardware — so an exfiltrated hash resists offline brute force
//! of the 10^4 PIN space. Three consecutive failures suspend verification
//! for thirty seconds; the suspension expires lazily on the next read.

use crate::clock::Clock;
use crate::lockout;
use crate::{Error, Result};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2, ParamsBuilder, Version,
};
use fintrack_keystore::{AccessPolicy, CredentialKey, CredentialStore};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use zeroize::Zeroizing;

/// Failed attempts before the lockout engages
pub const MAX_ATTEMPTS: u32 = 3;

/// Lockout duration in seconds
pub const LOCKOUT_DURATION_SECS: u32 = 30;

/// Argon2id parameters for PIN hashing.
/// Memory: 16 MiB, Iterations: 2, Parallelism: 2
const ARGON2_PARAMS: (u32, u32, u32) = (16384, 2, 2);

/// Outcome of a verification attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VerifyOutcome {
    /// Hash matched; lockout state was reset
    Success,
    /// Verification is suspended
    Locked {
        /// Seconds until the lockout expires
        remaining_seconds: u32,
    },
    /// Wrong PIN, not yet locked
    Incorrect {
        /// Attempts left before the lockout engages
        attempts_left: u32,
    },
}

/// PIN creation and verification over the credential store
pub struct PinAuth {
    store: Arc<dyn CredentialStore>,
    clock: Arc<dyn Clock>,
}

impl PinAuth {
    /// Create over the given store and clock
    pub fn new(store: Arc<dyn CredentialStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Hash the PIN and persist it, then reset the lockout state.
    ///
    /// The caller guarantees PIN format (the keypad only emits digits and
    /// submits at fixed length); no re-validation happens here. Store write
    /// failures propagate — a failed hash write must not report success.
    pub async fn create_pin(&self, pin: &str) -> Result<()> {
        let hash = hash_pin(pin)?;
        self.store
            .set(CredentialKey::PinHash, &hash, AccessPolicy::WhenUnlocked)
            .await?;
        lockout::clear(self.store.as_ref()).await?;
        tracing::debug!("PIN created, lockout state reset");
        Ok(())
    }

    /// Verify a PIN attempt against the stored hash.
    ///
    /// An attempt made while locked short-circuits without touching the
    /// hash and does not count. A mismatch increments the failed-attempt
    /// counter; the third failure engages a 30s lockout.
    pub async fn verify_pin(&self, pin: &str) -> Result<VerifyOutcome> {
        let remaining = self.remaining_lockout_seconds().await;
        if remaining > 0 {
            return Ok(VerifyOutcome::Locked {
                remaining_seconds: remaining,
            });
        }

        if self.check_hash(pin).await {
            lockout::clear(self.store.as_ref()).await?;
            return Ok(VerifyOutcome::Success);
        }

        let state = lockout::load(self.store.as_ref()).await;
        let attempts = (state.failed_attempts + 1).min(MAX_ATTEMPTS);
        lockout::store_attempts(self.store.as_ref(), attempts).await?;

        if attempts >= MAX_ATTEMPTS {
            let until = self.clock.now_millis() + u64::from(LOCKOUT_DURATION_SECS) * 1000;
            lockout::store_until(self.store.as_ref(), until).await?;
            tracing::warn!("PIN lockout engaged for {LOCKOUT_DURATION_SECS}s");
            return Ok(VerifyOutcome::Locked {
                remaining_seconds: LOCKOUT_DURATION_SECS,
            });
        }

        Ok(VerifyOutcome::Incorrect {
            attempts_left: MAX_ATTEMPTS - attempts,
        })
    }

    /// Seconds left on the current lockout. An elapsed lockout is lazily
    /// reset to the clear state here, so no background sweep owns expiry.
    /// A plain failed-attempt count below the cap is left untouched.
    pub async fn remaining_lockout_seconds(&self) -> u32 {
        let state = lockout::load(self.store.as_ref()).await;
        let remaining = state.remaining_seconds(self.clock.now_millis());
        if remaining == 0 && state.lockout_until_ms.is_some() {
            if let Err(e) = lockout::clear(self.store.as_ref()).await {
                tracing::warn!("lazy lockout reset failed: {e}");
            }
        }
        remaining
    }

    /// Whether verification is currently suspended
    pub async fn is_locked(&self) -> bool {
        self.remaining_lockout_seconds().await > 0
    }

    /// Whether a PIN has been set. Read failures collapse to `false` —
    /// toward requiring PIN setup, never toward skipping authentication.
    pub async fn has_pin(&self) -> bool {
        matches!(
            self.store.get(CredentialKey::PinHash).await,
            Ok(Some(hash)) if !hash.is_empty()
        )
    }

    /// Remove the stored hash and reset the lockout state.
    pub async fn clear_pin(&self) -> Result<()> {
        self.store.delete(CredentialKey::PinHash).await?;
        lockout::clear(self.store.as_ref()).await?;
        Ok(())
    }

    /// Compare the attempt against the stored hash. A missing hash, an
    /// unreadable store, or a garbled PHC string all count as a mismatch.
    async fn check_hash(&self, pin: &str) -> bool {
        let stored = match self.store.get(CredentialKey::PinHash).await {
            Ok(Some(hash)) => hash,
            Ok(None) => return false,
            Err(e) => {
                tracing::warn!("PIN hash unreadable: {e}");
                return false;
            }
        };
        verify_hash(pin, &stored)
    }
}

/// Hash a PIN with Argon2id into a PHC string.
fn hash_pin(pin: &str) -> Result<String> {
    let params = ParamsBuilder::new()
        .m_cost(ARGON2_PARAMS.0)
        .t_cost(ARGON2_PARAMS.1)
        .p_cost(ARGON2_PARAMS.2)
        .build()
        .map_err(|e| Error::Hash(e.to_string()))?;
    let argon2 = Argon2::new(argon2::Algorithm::Argon2id, Version::V0x13, params);

    let salt = SaltString::generate(&mut OsRng);
    let pin_bytes = Zeroizing::new(pin.as_bytes().to_vec());
    let hash = argon2
        .hash_password(&pin_bytes, &salt)
        .map_err(|e| Error::Hash(e.to_string()))?
        .to_string();
    Ok(hash)
}

/// Verify a PIN against a stored PHC string (parameters come from the
/// string itself). Parse failures count as a mismatch.
fn verify_hash(pin: &str, stored: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored) else {
        return false;
    };
    let pin_bytes = Zeroizing::new(pin.as_bytes().to_vec());
    Argon2::default().verify_password(&pin_bytes, &parsed).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use fintrack_keystore::MemoryStore;

    fn auth_with(store: Arc<MemoryStore>, clock: Arc<ManualClock>) -> PinAuth {
        PinAuth::new(store, clock)
    }

    #[tokio::test]
    async fn pin_roundtrip() {
        let auth = auth_with(Arc::new(MemoryStore::new()), Arc::new(ManualClock::at(0)));
        auth.create_pin("1234").await.unwrap();
        assert!(auth.has_pin().await);

        assert_eq!(auth.verify_pin("1234").await.unwrap(), VerifyOutcome::Success);
        assert_eq!(
            auth.verify_pin("4321").await.unwrap(),
            VerifyOutcome::Incorrect { attempts_left: 2 }
        );
    }

    #[tokio::test]
    async fn third_failure_locks_for_thirty_seconds() {
        let clock = Arc::new(ManualClock::at(1_000_000));
        let auth = auth_with(Arc::new(MemoryStore::new()), clock.clone());
        auth.create_pin("1234").await.unwrap();

        assert_eq!(
            auth.verify_pin("0000").await.unwrap(),
            VerifyOutcome::Incorrect { attempts_left: 2 }
        );
        assert_eq!(
            auth.verify_pin("0000").await.unwrap(),
            VerifyOutcome::Incorrect { attempts_left: 1 }
        );
        assert_eq!(
            auth.verify_pin("0000").await.unwrap(),
            VerifyOutcome::Locked {
                remaining_seconds: 30
            }
        );

        // a fourth attempt short-circuits and does not consume an attempt
        clock.advance_secs(5);
        match auth.verify_pin("1234").await.unwrap() {
            VerifyOutcome::Locked { remaining_seconds } => {
                assert!(remaining_seconds > 0 && remaining_seconds <= 30);
            }
            other => panic!("expected locked, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn lockout_expiry_is_lazy_and_self_healing() {
        let clock = Arc::new(ManualClock::at(0));
        let store = Arc::new(MemoryStore::new());
        let auth = auth_with(store.clone(), clock.clone());
        auth.create_pin("1234").await.unwrap();

        for _ in 0..3 {
            auth.verify_pin("0000").await.unwrap();
        }
        assert!(auth.is_locked().await);

        clock.advance_secs(31);
        assert_eq!(auth.remaining_lockout_seconds().await, 0);
        assert!(!auth.is_locked().await);

        // counter healed back to zero: a fresh failure reports two left
        assert_eq!(
            auth.verify_pin("0000").await.unwrap(),
            VerifyOutcome::Incorrect { attempts_left: 2 }
        );
    }

    #[tokio::test]
    async fn success_resets_failed_attempts() {
        let auth = auth_with(Arc::new(MemoryStore::new()), Arc::new(ManualClock::at(0)));
        auth.create_pin("1234").await.unwrap();

        auth.verify_pin("0000").await.unwrap();
        auth.verify_pin("0000").await.unwrap();
        assert_eq!(auth.verify_pin("1234").await.unwrap(), VerifyOutcome::Success);
        assert_eq!(auth.remaining_lockout_seconds().await, 0);

        assert_eq!(
            auth.verify_pin("0000").await.unwrap(),
            VerifyOutcome::Incorrect { attempts_left: 2 }
        );
    }

    #[tokio::test]
    async fn create_pin_resets_existing_lockout() {
        let clock = Arc::new(ManualClock::at(0));
        let auth = auth_with(Arc::new(MemoryStore::new()), clock.clone());
        auth.create_pin("1234").await.unwrap();
        for _ in 0..3 {
            auth.verify_pin("0000").await.unwrap();
        }
        assert!(auth.is_locked().await);

        auth.create_pin("5678").await.unwrap();
        assert!(!auth.is_locked().await);
        assert_eq!(auth.verify_pin("5678").await.unwrap(), VerifyOutcome::Success);
    }

    #[tokio::test]
    async fn missing_pin_counts_as_mismatch() {
        let auth = auth_with(Arc::new(MemoryStore::new()), Arc::new(ManualClock::at(0)));
        assert!(!auth.has_pin().await);
        assert_eq!(
            auth.verify_pin("1234").await.unwrap(),
            VerifyOutcome::Incorrect { attempts_left: 2 }
        );
    }

    #[tokio::test]
    async fn hash_write_failure_propagates() {
        let store = Arc::new(MemoryStore::new());
        let auth = auth_with(store.clone(), Arc::new(ManualClock::at(0)));
        store.set_fail_writes(true);
        assert!(auth.create_pin("1234").await.is_err());
    }

    #[tokio::test]
    async fn clear_pin_removes_hash_and_lockout() {
        let auth = auth_with(Arc::new(MemoryStore::new()), Arc::new(ManualClock::at(0)));
        auth.create_pin("1234").await.unwrap();
        auth.verify_pin("0000").await.unwrap();

        auth.clear_pin().await.unwrap();
        assert!(!auth.has_pin().await);
        assert_eq!(auth.remaining_lockout_seconds().await, 0);
    }

    #[test]
    fn garbled_hash_is_a_mismatch() {
        assert!(!verify_hash("1234", "not-a-phc-string"));
    }
}
