//! Secure credential storage for the Fintrack app core
//!
//! Wraps the platform's hardware-backed key/value storage (Android Keystore,
//! iOS Keychain) behind a capability trait the authentication core consumes.
//!
//! ## Security Features
//!
//! - **Typed keys**: every secret lives under a fixed, distinct service name
//! - **Hardware gating**: the biometric unlock token is readable only after a
//!   successful platform biometric challenge
//! - **Database Key**: 64-byte encryption key for the app database, generated
//!   once from the OS RNG and never leaving secure storage unwrapped
//! - **Fail-closed reads**: callers collapse read failures toward requiring
//!   re-authentication, never toward skipping it

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod database_key;
pub mod error;
pub mod memory;
pub mod store;

pub use database_key::{DatabaseKey, DATABASE_KEY_LEN};
pub use error::{Error, Result};
pub use memory::{ChallengeBehavior, MemoryStore};
pub use store::{
    AccessPolicy, BiometricType, CredentialKey, CredentialStore, GatedRead, Platform,
    StoreCapabilities,
};
