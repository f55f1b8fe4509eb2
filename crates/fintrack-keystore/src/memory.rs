//! In-memory credential store
//!
//! Reference implementation of [`CredentialStore`] used by tests and by
//! desktop/dev builds that have no platform keystore. The biometric
//! challenge and the runtime permission prompt are simulated through
//! configurable behaviors so every auth path can be exercised.

use crate::store::{
    AccessPolicy, BiometricType, CredentialKey, CredentialStore, GatedRead, Platform,
    StoreCapabilities,
};
use crate::{Error, Result};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;

/// Simulated outcome of the platform biometric challenge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChallengeBehavior {
    /// Challenge passes
    Succeed,
    /// User dismisses the prompt
    Cancel,
    /// Challenge runs and fails
    Fail,
    /// No biometric hardware
    Unavailable,
}

#[derive(Debug, Clone)]
struct StoredEntry {
    value: String,
    policy: AccessPolicy,
}

/// In-memory [`CredentialStore`] with fault injection
pub struct MemoryStore {
    entries: RwLock<HashMap<CredentialKey, StoredEntry>>,
    capabilities: StoreCapabilities,
    challenge: RwLock<ChallengeBehavior>,
    permission_granted: RwLock<bool>,
    fail_reads: RwLock<bool>,
    fail_writes: RwLock<bool>,
}

impl MemoryStore {
    /// Create a store with biometric hardware present and challenges passing
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            capabilities: StoreCapabilities {
                has_secure_hardware: true,
                biometric_type: BiometricType::Fingerprint,
                platform: Platform::current(),
            },
            challenge: RwLock::new(ChallengeBehavior::Succeed),
            permission_granted: RwLock::new(true),
            fail_reads: RwLock::new(false),
            fail_writes: RwLock::new(false),
        }
    }

    /// Create a store with custom capabilities
    pub fn with_capabilities(capabilities: StoreCapabilities) -> Self {
        let challenge = if capabilities.has_biometrics() {
            ChallengeBehavior::Succeed
        } else {
            ChallengeBehavior::Unavailable
        };
        Self {
            entries: RwLock::new(HashMap::new()),
            capabilities,
            challenge: RwLock::new(challenge),
            permission_granted: RwLock::new(true),
            fail_reads: RwLock::new(false),
            fail_writes: RwLock::new(false),
        }
    }

    /// Set the simulated biometric challenge outcome
    pub fn set_challenge_behavior(&self, behavior: ChallengeBehavior) {
        *self.challenge.write() = behavior;
    }

    /// Set whether the simulated runtime permission prompt grants
    pub fn set_permission_granted(&self, granted: bool) {
        *self.permission_granted.write() = granted;
    }

    /// Make every subsequent read fail with a storage error
    pub fn set_fail_reads(&self, fail: bool) {
        *self.fail_reads.write() = fail;
    }

    /// Make every subsequent write fail with a storage error
    pub fn set_fail_writes(&self, fail: bool) {
        *self.fail_writes.write() = fail;
    }

    /// Raw presence check, bypassing access policy (test inspection)
    pub fn contains(&self, key: CredentialKey) -> bool {
        self.entries.read().contains_key(&key)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    fn capabilities(&self) -> StoreCapabilities {
        self.capabilities.clone()
    }

    async fn get(&self, key: CredentialKey) -> Result<Option<String>> {
        if *self.fail_reads.read() {
            return Err(Error::Storage(format!("read failed: {}", key.service())));
        }
        match self.entries.read().get(&key) {
            Some(entry) if entry.policy == AccessPolicy::BiometricGated => Err(Error::Security(
                format!("{} requires a biometric challenge", key.service()),
            )),
            Some(entry) => Ok(Some(entry.value.clone())),
            None => Ok(None),
        }
    }

    async fn set(&self, key: CredentialKey, value: &str, policy: AccessPolicy) -> Result<()> {
        if *self.fail_writes.read() {
            return Err(Error::Storage(format!("write failed: {}", key.service())));
        }
        if policy == AccessPolicy::BiometricGated && !self.capabilities.has_biometrics() {
            return Err(Error::Security(
                "biometric-gated storage unavailable".into(),
            ));
        }
        self.entries.write().insert(
            key,
            StoredEntry {
                value: value.to_string(),
                policy,
            },
        );
        Ok(())
    }

    async fn delete(&self, key: CredentialKey) -> Result<()> {
        if *self.fail_writes.read() {
            return Err(Error::Storage(format!("delete failed: {}", key.service())));
        }
        self.entries.write().remove(&key);
        Ok(())
    }

    async fn read_gated(&self, key: CredentialKey) -> GatedRead {
        if *self.fail_reads.read() {
            return GatedRead::Error(Error::Storage(format!(
                "read failed: {}",
                key.service()
            )));
        }
        match *self.challenge.read() {
            ChallengeBehavior::Unavailable => return GatedRead::Unavailable,
            ChallengeBehavior::Cancel => return GatedRead::Cancelled,
            ChallengeBehavior::Fail => return GatedRead::AuthFailed,
            ChallengeBehavior::Succeed => {}
        }
        match self.entries.read().get(&key) {
            Some(entry) => GatedRead::Value(entry.value.clone()),
            None => GatedRead::NotFound,
        }
    }

    async fn request_biometric_permission(&self) -> bool {
        *self.permission_granted.read()
    }
}
