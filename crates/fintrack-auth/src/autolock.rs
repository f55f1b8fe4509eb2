//! Auto-lock on background
//!
//! Watches app lifecycle transitions and forces re-authentication when the
//! app has been backgrounded longer than the configured threshold. The
//! monitor belongs on the authenticated view tree only; auth screens never
//! attach it.

use crate::clock::Clock;
use crate::session::SessionState;
use fintrack_keystore::{AccessPolicy, CredentialKey, CredentialStore};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Below this, a background/foreground pair is an OS blip, not a real cycle
const MIN_BACKGROUND_MS: u64 = 1000;

/// How long the app may stay backgrounded before re-authentication
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AutoLockInterval {
    /// 30 seconds
    Secs30,
    /// 60 seconds
    Secs60,
    /// 5 minutes
    Secs300,
    /// Never auto-lock
    Never,
}

impl AutoLockInterval {
    /// Default interval when nothing is stored or the value is garbled
    pub const DEFAULT: Self = Self::Secs60;

    /// Threshold in seconds, `None` for [`Self::Never`]
    pub fn as_seconds(&self) -> Option<u64> {
        match self {
            Self::Secs30 => Some(30),
            Self::Secs60 => Some(60),
            Self::Secs300 => Some(300),
            Self::Never => None,
        }
    }

    /// Stored string form
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Secs30 => "30",
            Self::Secs60 => "60",
            Self::Secs300 => "300",
            Self::Never => "never",
        }
    }

    fn parse(raw: &str) -> Option<Self> {
        match raw {
            "30" => Some(Self::Secs30),
            "60" => Some(Self::Secs60),
            "300" => Some(Self::Secs300),
            "never" => Some(Self::Never),
            _ => None,
        }
    }

    /// Read the persisted interval. Unknown values and read failures
    /// collapse to the default.
    pub async fn load(store: &dyn CredentialStore) -> Self {
        match store.get(CredentialKey::AutoLockInterval).await {
            Ok(Some(raw)) => Self::parse(&raw).unwrap_or(Self::DEFAULT),
            Ok(None) => Self::DEFAULT,
            Err(e) => {
                tracing::warn!("auto-lock interval unreadable: {e}");
                Self::DEFAULT
            }
        }
    }

    /// Persist the interval
    pub async fn store(&self, store: &dyn CredentialStore) -> fintrack_keystore::Result<()> {
        store
            .set(
                CredentialKey::AutoLockInterval,
                self.as_str(),
                AccessPolicy::WhenUnlocked,
            )
            .await
    }
}

/// App lifecycle signal from the OS
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    /// App is active in the foreground
    Foreground,
    /// App moved to the background
    Background,
    /// Transient state: system dialog, biometric prompt, app switcher.
    /// Never counts as backgrounding — the login screen's own biometric
    /// prompt fires this.
    Inactive,
}

/// Lifecycle state machine forcing sign-out after too long in background
pub struct AutoLockMonitor {
    store: Arc<dyn CredentialStore>,
    clock: Arc<dyn Clock>,
    session: Arc<SessionState>,
    backgrounded_at_ms: u64,
    came_from_background: bool,
}

impl AutoLockMonitor {
    /// Create over the given store, clock, and session
    pub fn new(
        store: Arc<dyn CredentialStore>,
        clock: Arc<dyn Clock>,
        session: Arc<SessionState>,
    ) -> Self {
        Self {
            store,
            clock,
            session,
            backgrounded_at_ms: 0,
            came_from_background: false,
        }
    }

    /// Feed a lifecycle transition. Returns `true` when this event forced
    /// a sign-out.
    pub async fn on_lifecycle_event(&mut self, event: LifecycleEvent) -> bool {
        match event {
            LifecycleEvent::Background => {
                self.backgrounded_at_ms = self.clock.now_millis();
                self.came_from_background = true;
                false
            }
            LifecycleEvent::Inactive => false,
            LifecycleEvent::Foreground => {
                if !self.came_from_background {
                    // return from a transient dialog, not a real cycle
                    return false;
                }
                self.came_from_background = false;

                let interval = AutoLockInterval::load(self.store.as_ref()).await;
                let Some(threshold_secs) = interval.as_seconds() else {
                    return false;
                };

                let elapsed_ms = self
                    .clock
                    .now_millis()
                    .saturating_sub(self.backgrounded_at_ms);
                if elapsed_ms < MIN_BACKGROUND_MS {
                    return false;
                }
                if elapsed_ms >= threshold_secs * 1000 {
                    tracing::warn!(
                        "auto-lock after {}s in background (threshold {}s)",
                        elapsed_ms / 1000,
                        threshold_secs
                    );
                    self.session.sign_out().await;
                    return true;
                }
                false
            }
        }
    }
}
