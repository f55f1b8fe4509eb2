//! Biometric unlock gate
//!
//! No biometric API is called directly. A hardware-gated placeholder item
//! in the credential store does the work: writing it arms the gate, and
//! reading it back runs the platform's Face ID / Touch ID / fingerprint
//! prompt. A successful read of the expected sentinel *is* the passed
//! challenge. The sentinel value itself is not sensitive — the access
//! control on the item is what matters.

use fintrack_keystore::{
    AccessPolicy, CredentialKey, CredentialStore, Error, GatedRead,
};
use serde::Serialize;
use std::sync::Arc;

/// Sentinel stored in the hardware-gated item
pub const BIOMETRIC_TOKEN_VALUE: &str = "fintrack_biometric_auth";

const ENABLED_SENTINEL: &str = "1";

/// Settings-screen view of the biometric feature. `enabled` is persisted
/// user intent; the other two are live platform queries, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BiometricStatus {
    /// User has turned biometric unlock on
    pub enabled: bool,
    /// Device reports a supported biometric modality
    pub hardware_available: bool,
    /// Runtime permission is granted (or not required)
    pub permission_granted: bool,
}

/// Decides whether and how biometric unlock is offered
pub struct BiometricGate {
    store: Arc<dyn CredentialStore>,
}

impl BiometricGate {
    /// Create over the given store
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self { store }
    }

    /// Whether the device has a supported biometric modality. Pure
    /// capability query; never errors.
    pub fn is_available(&self) -> bool {
        self.store.capabilities().has_biometrics()
    }

    /// Whether the user has enabled biometric unlock. Read failures
    /// collapse to `false`.
    pub async fn is_enabled(&self) -> bool {
        matches!(
            self.store.get(CredentialKey::BiometricEnabled).await,
            Ok(Some(v)) if v == ENABLED_SENTINEL
        )
    }

    /// Request the runtime permission where one exists. Never errors.
    pub async fn request_permission(&self) -> bool {
        self.store.request_biometric_permission().await
    }

    /// Turn biometric unlock on: persist the intent flag, then arm the
    /// hardware-gated token. If arming fails the flag is rolled back and
    /// the error raised — never report "enabled" without a working gate.
    pub async fn enable(&self) -> Result<(), Error> {
        self.store
            .set(
                CredentialKey::BiometricEnabled,
                ENABLED_SENTINEL,
                AccessPolicy::WhenUnlocked,
            )
            .await?;

        if let Err(e) = self
            .store
            .set(
                CredentialKey::BiometricToken,
                BIOMETRIC_TOKEN_VALUE,
                AccessPolicy::BiometricGated,
            )
            .await
        {
            tracing::warn!("biometric token setup failed, rolling back: {e}");
            if let Err(rollback) = self.store.delete(CredentialKey::BiometricEnabled).await {
                tracing::warn!("biometric enable rollback failed: {rollback}");
            }
            return Err(e);
        }

        tracing::debug!("biometric unlock enabled");
        Ok(())
    }

    /// Turn biometric unlock off. Token removal is best-effort — a leftover
    /// unreadable item is harmless — but the flag always ends up cleared.
    pub async fn disable(&self) -> Result<(), Error> {
        if let Err(e) = self.store.delete(CredentialKey::BiometricToken).await {
            tracing::warn!("biometric token removal failed: {e}");
        }
        self.store.delete(CredentialKey::BiometricEnabled).await?;
        tracing::debug!("biometric unlock disabled");
        Ok(())
    }

    /// Run the biometric challenge by reading the gated token. Every
    /// non-success outcome — cancellation, failed challenge, missing item,
    /// hardware error, wrong value — collapses to `false`.
    pub async fn authenticate(&self) -> bool {
        match self.store.read_gated(CredentialKey::BiometricToken).await {
            GatedRead::Value(v) if v == BIOMETRIC_TOKEN_VALUE => true,
            GatedRead::Value(_) => {
                tracing::warn!("biometric token holds an unexpected value");
                false
            }
            GatedRead::Cancelled => {
                tracing::debug!("biometric prompt cancelled");
                false
            }
            GatedRead::AuthFailed | GatedRead::NotFound | GatedRead::Unavailable => false,
            GatedRead::Error(e) => {
                tracing::warn!("biometric challenge errored: {e}");
                false
            }
        }
    }

    /// Live status snapshot for the settings screen
    pub async fn status(&self) -> BiometricStatus {
        BiometricStatus {
            enabled: self.is_enabled().await,
            hardware_available: self.is_available(),
            permission_granted: self.request_permission().await,
        }
    }
}
