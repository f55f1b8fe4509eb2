//! Platform credential store abstraction
//!
//! Provides a unified interface to platform-specific secure storage:
//! - Android: Keystore-backed encrypted entries (StrongBox when available)
//! - iOS: Keychain with Secure Enclave protection
//!
//! All operations are designed to be FFI-friendly for the mobile shell.

use crate::{Error, Result};
use async_trait::async_trait;

/// Logical keys for every secret the app core persists.
///
/// Each key maps to a distinct service name so secrets are stored and
/// protected independently. The names are identifiers only, never secret.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CredentialKey {
    /// Argon2id PHC hash of the unlock PIN (never the PIN itself)
    PinHash,
    /// Consecutive failed PIN attempts, integer string 0..=3
    PinFailedAttempts,
    /// Millisecond epoch timestamp until which PIN entry is locked
    PinLockoutUntil,
    /// User-intent flag for biometric unlock, `"1"` sentinel
    BiometricEnabled,
    /// Hardware-gated placeholder whose readability proves a biometric pass
    BiometricToken,
    /// 64-byte database encryption key, hex encoded
    DatabaseKey,
    /// Persisted session marker, `"1"` sentinel
    AuthSession,
    /// Whether onboarding has been completed, `"true"`/`"false"`
    OnboardingCompleted,
    /// Auto-lock interval setting: `"30"`, `"60"`, `"300"`, or `"never"`
    AutoLockInterval,
}

impl CredentialKey {
    /// Stable service-name string for the platform store.
    pub fn service(&self) -> &'static str {
        match self {
            Self::PinHash => "@fintrack/secure_pin_hash",
            Self::PinFailedAttempts => "@fintrack/pin_failed_attempts",
            Self::PinLockoutUntil => "@fintrack/pin_lockout_until",
            Self::BiometricEnabled => "@fintrack/biometric_enabled",
            Self::BiometricToken => "@fintrack/biometric_token",
            Self::DatabaseKey => "@fintrack/secure_database_key",
            Self::AuthSession => "@fintrack/auth_session",
            Self::OnboardingCompleted => "@fintrack/onboarding_completed",
            Self::AutoLockInterval => "@fintrack/auto_lock_interval",
        }
    }
}

/// Protection level requested when writing an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessPolicy {
    /// Readable whenever the device is unlocked (this device only)
    WhenUnlocked,
    /// Readable only after a successful biometric (or passcode) challenge
    BiometricGated,
}

/// Biometric modality reported by the platform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BiometricType {
    /// Fingerprint sensor
    Fingerprint,
    /// Face recognition (Face ID)
    Face,
    /// Iris scanner
    Iris,
    /// Multiple modalities available
    Multiple,
    /// Unknown or unavailable
    None,
}

/// Supported platforms
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    /// Android (Keystore, StrongBox)
    Android,
    /// iOS (Keychain, Secure Enclave)
    Ios,
    /// Desktop/test host
    Host,
}

impl Platform {
    /// Detect current platform at runtime
    pub fn current() -> Self {
        #[cfg(target_os = "android")]
        return Platform::Android;

        #[cfg(target_os = "ios")]
        return Platform::Ios;

        #[cfg(not(any(target_os = "android", target_os = "ios")))]
        Platform::Host
    }
}

/// Capabilities of the backing store on this device
#[derive(Debug, Clone)]
pub struct StoreCapabilities {
    /// Hardware-backed storage present (TEE, StrongBox, Secure Enclave)
    pub has_secure_hardware: bool,
    /// Biometric modality the platform reports
    pub biometric_type: BiometricType,
    /// Platform identity
    pub platform: Platform,
}

impl StoreCapabilities {
    /// True iff the platform reports any supported biometric modality.
    pub fn has_biometrics(&self) -> bool {
        self.biometric_type != BiometricType::None
    }
}

impl Default for StoreCapabilities {
    fn default() -> Self {
        Self {
            has_secure_hardware: false,
            biometric_type: BiometricType::None,
            platform: Platform::current(),
        }
    }
}

/// Outcome of reading a hardware-gated entry.
///
/// The biometric challenge runs as a side effect of the read; cancellation
/// and auth failure are expected outcomes, not errors.
#[derive(Debug)]
pub enum GatedRead {
    /// Challenge passed and the entry was read
    Value(String),
    /// User dismissed the platform prompt
    Cancelled,
    /// Challenge ran and failed (wrong biometric)
    AuthFailed,
    /// No entry exists under this key
    NotFound,
    /// No biometric hardware, or gated storage unsupported here
    Unavailable,
    /// The store itself failed
    Error(Error),
}

/// Credential store capability consumed by the authentication core.
///
/// Implementations bridge to native platform code via the mobile shell's
/// FFI; [`crate::MemoryStore`] is the in-process reference used in tests.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Capabilities of the backing store
    fn capabilities(&self) -> StoreCapabilities;

    /// Read an entry. Returns `Ok(None)` when absent. Entries written with
    /// [`AccessPolicy::BiometricGated`] are not readable here and yield a
    /// [`Error::Security`].
    async fn get(&self, key: CredentialKey) -> Result<Option<String>>;

    /// Write an entry under the given protection level, replacing any
    /// previous value (and its policy).
    async fn set(&self, key: CredentialKey, value: &str, policy: AccessPolicy) -> Result<()>;

    /// Remove an entry. Removing an absent entry is not an error.
    async fn delete(&self, key: CredentialKey) -> Result<()>;

    /// Read a hardware-gated entry, triggering the platform biometric
    /// challenge. Suspends for the duration of the prompt.
    async fn read_gated(&self, key: CredentialKey) -> GatedRead;

    /// Request the runtime biometric permission where the platform requires
    /// one (Android 6-9 fingerprint). Returns `true` when granted or when no
    /// explicit grant is needed; never errors — platform trouble collapses
    /// to `false`.
    async fn request_biometric_permission(&self) -> bool;
}

// =============================================================================
// Platform-specific shims (FFI bridge points)
// =============================================================================

/// Android Keystore shim
///
/// In production the shell bridges these to Kotlin:
/// - entries: `KeyGenParameterSpec` AES-256-GCM keys, `AES_GCM_NO_AUTH`
///   storage so plain reads do not demand per-use auth
/// - gated token: `setUserAuthenticationRequired(true)` so decryption runs
///   the BiometricPrompt
/// - permission: `USE_BIOMETRIC` (API 29+) or `USE_FINGERPRINT` (API 23-28)
#[cfg(target_os = "android")]
pub mod android {
    use super::Result;

    /// Check if StrongBox is available
    pub fn has_strongbox() -> bool {
        // FFI: PackageManager.hasSystemFeature(FEATURE_STRONGBOX_KEYSTORE)
        false
    }

    /// Encrypt and persist an entry under a Keystore-backed key
    pub fn put_entry(service: &str, value: &[u8], require_biometric: bool) -> Result<()> {
        let _ = (service, value, require_biometric);
        Err(super::Error::Storage(
            "Android Keystore FFI not wired".into(),
        ))
    }

    /// Read and decrypt an entry
    pub fn get_entry(service: &str) -> Result<Option<Vec<u8>>> {
        let _ = service;
        Err(super::Error::Storage(
            "Android Keystore FFI not wired".into(),
        ))
    }
}

/// iOS Keychain shim
///
/// In production the shell bridges these to Swift:
/// - entries: `SecItemAdd` with
///   `kSecAttrAccessibleWhenUnlockedThisDeviceOnly`
/// - gated token: `SecAccessControl` with `.biometryCurrentSet` or device
///   passcode, so `SecItemCopyMatching` runs the Face ID / Touch ID prompt
#[cfg(target_os = "ios")]
pub mod apple {
    use super::Result;

    /// Check if Secure Enclave is available
    pub fn has_secure_enclave() -> bool {
        // FFI: SecureEnclave.isAvailable
        false
    }

    /// Persist an entry in the Keychain
    pub fn put_entry(service: &str, value: &[u8], require_biometric: bool) -> Result<()> {
        let _ = (service, value, require_biometric);
        Err(super::Error::Storage("Keychain FFI not wired".into()))
    }

    /// Read an entry from the Keychain
    pub fn get_entry(service: &str) -> Result<Option<Vec<u8>>> {
        let _ = service;
        Err(super::Error::Storage("Keychain FFI not wired".into()))
    }
}
