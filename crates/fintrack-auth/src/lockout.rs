//! Persistent lockout state
//!
//! Tracks consecutive failed PIN attempts and the timestamp until which
//! verification is suspended. Both live in secure storage so a process
//! restart cannot clear a lockout. Expiry is lazy: whoever reads the
//! remaining time heals an elapsed lockout back to the zero state.

use crate::pin::MAX_ATTEMPTS;
use fintrack_keystore::{AccessPolicy, CredentialKey, CredentialStore};

/// Snapshot of the persisted lockout state.
///
/// Invariants: `failed_attempts` is clamped to `0..=MAX_ATTEMPTS`;
/// `lockout_until_ms` is only set once the attempt cap is reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockoutState {
    /// Consecutive failed attempts
    pub failed_attempts: u32,
    /// Millisecond epoch timestamp the lockout expires at, if locked
    pub lockout_until_ms: Option<u64>,
}

impl LockoutState {
    /// The reset state: no failures, no lockout
    pub const CLEAR: Self = Self {
        failed_attempts: 0,
        lockout_until_ms: None,
    };

    /// Seconds left on the lockout at `now_ms`, rounded up. Zero when no
    /// lockout is set or it has elapsed.
    pub fn remaining_seconds(&self, now_ms: u64) -> u32 {
        match self.lockout_until_ms {
            Some(until) if until > now_ms => until
                .saturating_sub(now_ms)
                .div_ceil(1000)
                .try_into()
                .unwrap_or(u32::MAX),
            _ => 0,
        }
    }
}

/// Read the lockout state. Read failures and garbled values collapse to the
/// clear state: an unreadable counter must not lock the user out, and PIN
/// entry still stands between them and the app.
pub async fn load(store: &dyn CredentialStore) -> LockoutState {
    let failed_attempts = match store.get(CredentialKey::PinFailedAttempts).await {
        Ok(Some(raw)) => raw
            .parse::<u32>()
            .map(|n| n.min(MAX_ATTEMPTS))
            .unwrap_or(0),
        Ok(None) => 0,
        Err(e) => {
            tracing::warn!("failed-attempt counter unreadable: {e}");
            0
        }
    };

    let lockout_until_ms = match store.get(CredentialKey::PinLockoutUntil).await {
        Ok(Some(raw)) => raw.parse::<u64>().ok(),
        Ok(None) => None,
        Err(e) => {
            tracing::warn!("lockout timestamp unreadable: {e}");
            None
        }
    };

    LockoutState {
        failed_attempts,
        lockout_until_ms,
    }
}

/// Persist the failed-attempt counter, clamped to the cap.
pub async fn store_attempts(
    store: &dyn CredentialStore,
    attempts: u32,
) -> fintrack_keystore::Result<()> {
    store
        .set(
            CredentialKey::PinFailedAttempts,
            &attempts.min(MAX_ATTEMPTS).to_string(),
            AccessPolicy::WhenUnlocked,
        )
        .await
}

/// Persist the lockout expiry timestamp.
pub async fn store_until(
    store: &dyn CredentialStore,
    until_ms: u64,
) -> fintrack_keystore::Result<()> {
    store
        .set(
            CredentialKey::PinLockoutUntil,
            &until_ms.to_string(),
            AccessPolicy::WhenUnlocked,
        )
        .await
}

/// Reset to the clear state: zero the counter, drop the timestamp.
pub async fn clear(store: &dyn CredentialStore) -> fintrack_keystore::Result<()> {
    store_attempts(store, 0).await?;
    store.delete(CredentialKey::PinLockoutUntil).await
}
