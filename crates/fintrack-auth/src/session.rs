//! Session state
//!
//! One `SessionState` is constructed at process start and handed to every
//! consumer; the in-memory flag is authoritative for the running process
//! and survives UI remounts. A persisted marker mirrors the flag so a
//! relaunch after a clean background/foreground cycle can skip PIN entry
//! (still subject to the auto-lock threshold).

use fintrack_keystore::{AccessPolicy, CredentialKey, CredentialStore};
use std::sync::Arc;
use tokio::sync::watch;

const SESSION_MARKER: &str = "1";

/// Process-lifetime authentication flag with observers and a persisted
/// marker.
pub struct SessionState {
    store: Arc<dyn CredentialStore>,
    flag: watch::Sender<bool>,
}

impl SessionState {
    /// Create unauthenticated
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        let (flag, _) = watch::channel(false);
        Self { store, flag }
    }

    /// Whether the current process is authenticated
    pub fn is_authenticated(&self) -> bool {
        *self.flag.borrow()
    }

    /// Observe authentication changes; the UI shell re-routes on change
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.flag.subscribe()
    }

    /// Mark the session authenticated and persist the marker.
    ///
    /// Marker I/O is best-effort: the in-memory flag is authoritative and a
    /// lost marker fails toward re-authentication on the next launch.
    pub async fn sign_in(&self) {
        self.flag.send_replace(true);
        tracing::debug!("session signed in");
        if let Err(e) = self
            .store
            .set(
                CredentialKey::AuthSession,
                SESSION_MARKER,
                AccessPolicy::WhenUnlocked,
            )
            .await
        {
            tracing::warn!("session marker write failed: {e}");
        }
    }

    /// Mark the session unauthenticated and clear the marker.
    pub async fn sign_out(&self) {
        self.flag.send_replace(false);
        tracing::debug!("session signed out");
        if let Err(e) = self.store.delete(CredentialKey::AuthSession).await {
            tracing::warn!("session marker clear failed: {e}");
        }
    }

    /// Seed the in-memory flag at startup (e.g. from the persisted marker)
    /// without touching storage.
    pub fn restore(&self, authenticated: bool) {
        self.flag.send_replace(authenticated);
    }

    /// Read the persisted marker. Read failures collapse to `false`.
    pub async fn has_persisted_session(&self) -> bool {
        matches!(
            self.store.get(CredentialKey::AuthSession).await,
            Ok(Some(v)) if v == SESSION_MARKER
        )
    }
}
