//! Authentication core for the Fintrack app
//!
//! Everything between the keypad and the secure store:
//!
//! - **PIN app-lock**: Argon2id-hashed 4-digit PIN with a 3-strikes/30s
//!   lockout that expires lazily (no background sweep)
//! - **Biometric unlock**: a hardware-gated keystore item stands in for the
//!   platform biometric challenge
//! - **PIN flows**: create, change, and login controllers over a shared
//!   digit-collection state machine
//! - **Auto-lock**: re-authentication forced after a configurable time in
//!   the background
//! - **Session**: injectable process-lifetime auth flag with observers and
//!   a persisted marker for relaunch restore
//!
//! The crate is consumed in-process by the mobile shell; all storage goes
//! through the [`fintrack_keystore::CredentialStore`] capability.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod autolock;
pub mod biometric;
pub mod clock;
pub mod entry;
pub mod error;
pub mod flows;
pub mod lockout;
pub mod pin;
pub mod session;
pub mod startup;

pub use autolock::{AutoLockInterval, AutoLockMonitor, LifecycleEvent};
pub use biometric::{BiometricGate, BiometricStatus, BIOMETRIC_TOKEN_VALUE};
pub use clock::{Clock, ManualClock, SystemClock};
pub use entry::{AuthMessage, DigitCollector, DigitEvent, PIN_LENGTH};
pub use error::{Error, Result};
pub use flows::{ChangeStep, CreateStep, PinChangeFlow, PinCreateFlow, PinLoginFlow};
pub use lockout::LockoutState;
pub use pin::{PinAuth, VerifyOutcome, LOCKOUT_DURATION_SECS, MAX_ATTEMPTS};
pub use session::SessionState;
pub use startup::{initialize, initial_route, AppInitState, InitialRoute};
