//! PIN screen controllers
//!
//! Three controllers layer step orchestration on the shared
//! [`DigitCollector`]: create (enter + confirm), change (verify current +
//! enter + confirm), and login (verify with lockout countdown and biometric
//! unlock). Each is driven by keypad events from the shell and owns its
//! background work; dropping a controller tears that work down.

use crate::biometric::BiometricGate;
use crate::entry::{AuthMessage, DigitCollector, DigitEvent};
use crate::pin::{PinAuth, VerifyOutcome};
use crate::session::SessionState;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use zeroize::Zeroizing;

const LOCKOUT_POLL: Duration = Duration::from_secs(1);

/// Sentinel for "no informational attempt count"
const NO_ATTEMPTS: u32 = u32::MAX;

// ============================================================================
// PIN creation
// ============================================================================

/// Steps of the PIN-create screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateStep {
    /// First entry
    First,
    /// Re-enter to confirm
    Confirm,
}

struct CreateInner {
    collector: DigitCollector,
    step: CreateStep,
    first_pin: Option<Zeroizing<String>>,
}

/// Controller for the PIN-create screen
pub struct PinCreateFlow {
    inner: Mutex<CreateInner>,
    auth: Arc<PinAuth>,
    session: Arc<SessionState>,
}

impl PinCreateFlow {
    /// Create over the auth core and session
    pub fn new(auth: Arc<PinAuth>, session: Arc<SessionState>) -> Self {
        Self {
            inner: Mutex::new(CreateInner {
                collector: DigitCollector::new(),
                step: CreateStep::First,
                first_pin: None,
            }),
            auth,
            session,
        }
    }

    /// Feed a keypad digit
    pub async fn press_digit(&self, digit: char) {
        let completed = {
            let mut inner = self.inner.lock();
            match inner.collector.push_digit(digit) {
                DigitEvent::Completed(pin) => Some((pin, inner.step)),
                _ => None,
            }
        };
        let Some((pin, step)) = completed else {
            return;
        };

        match step {
            CreateStep::First => {
                let mut inner = self.inner.lock();
                inner.first_pin = Some(Zeroizing::new(pin));
                inner.collector.clear();
                inner.step = CreateStep::Confirm;
            }
            CreateStep::Confirm => {
                let matches = {
                    let inner = self.inner.lock();
                    inner.first_pin.as_ref().is_some_and(|p| p.as_str() == pin)
                };
                if !matches {
                    let mut inner = self.inner.lock();
                    inner.collector.set_error(Some(AuthMessage::PinMismatch));
                    inner.collector.clear();
                    return;
                }

                self.inner.lock().collector.set_loading(true);
                let created = self.auth.create_pin(&pin).await;
                self.inner.lock().collector.set_loading(false);
                match created {
                    Ok(()) => self.session.sign_in().await,
                    Err(e) => {
                        tracing::warn!("PIN creation failed: {e}");
                        let mut inner = self.inner.lock();
                        inner.collector.set_error(Some(AuthMessage::Generic));
                        inner.collector.clear();
                    }
                }
            }
        }
    }

    /// Feed a backspace
    pub fn press_backspace(&self) {
        self.inner.lock().collector.backspace();
    }

    /// Current step
    pub fn step(&self) -> CreateStep {
        self.inner.lock().step
    }

    /// Current digits
    pub fn value(&self) -> String {
        self.inner.lock().collector.value().to_string()
    }

    /// Current error, if any
    pub fn error(&self) -> Option<AuthMessage> {
        self.inner.lock().collector.error()
    }

    /// Whether an async operation is in flight
    pub fn is_loading(&self) -> bool {
        self.inner.lock().collector.is_loading()
    }

    /// Title localization key for the current step
    pub fn title_key(&self) -> &'static str {
        match self.step() {
            CreateStep::First => "pin.create.title",
            CreateStep::Confirm => "pin.create.repeatPrompt",
        }
    }

    /// Subtitle localization key, when the step has one
    pub fn subtitle_key(&self) -> Option<&'static str> {
        match self.step() {
            CreateStep::First => Some("pin.create.subtitle"),
            CreateStep::Confirm => None,
        }
    }
}

// ============================================================================
// PIN change
// ============================================================================

/// Steps of the PIN-change screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeStep {
    /// Verify the current PIN first
    VerifyCurrent,
    /// Enter the new PIN
    EnterNew,
    /// Re-enter the new PIN
    ConfirmNew,
}

struct ChangeInner {
    collector: DigitCollector,
    step: ChangeStep,
    new_pin: Option<Zeroizing<String>>,
}

/// Controller for the PIN-change screen
pub struct PinChangeFlow {
    inner: Mutex<ChangeInner>,
    auth: Arc<PinAuth>,
    complete: AtomicBool,
}

impl PinChangeFlow {
    /// Create over the auth core
    pub fn new(auth: Arc<PinAuth>) -> Self {
        Self {
            inner: Mutex::new(ChangeInner {
                collector: DigitCollector::new(),
                step: ChangeStep::VerifyCurrent,
                new_pin: None,
            }),
            auth,
            complete: AtomicBool::new(false),
        }
    }

    /// Feed a keypad digit
    pub async fn press_digit(&self, digit: char) {
        let completed = {
            let mut inner = self.inner.lock();
            match inner.collector.push_digit(digit) {
                DigitEvent::Completed(pin) => Some((pin, inner.step)),
                _ => None,
            }
        };
        let Some((pin, step)) = completed else {
            return;
        };

        match step {
            ChangeStep::VerifyCurrent => {
                self.inner.lock().collector.set_loading(true);
                let outcome = self.auth.verify_pin(&pin).await;
                let mut inner = self.inner.lock();
                inner.collector.set_loading(false);
                inner.collector.clear();
                match outcome {
                    Ok(VerifyOutcome::Success) => inner.step = ChangeStep::EnterNew,
                    Ok(VerifyOutcome::Incorrect { .. }) => {
                        inner.collector.set_error(Some(AuthMessage::IncorrectPin));
                    }
                    // same verify primitive as login, so the same lockout
                    // applies; this screen shows it as a message only
                    Ok(VerifyOutcome::Locked { remaining_seconds }) => {
                        inner
                            .collector
                            .set_error(Some(AuthMessage::LockedFor(remaining_seconds)));
                    }
                    Err(e) => {
                        tracing::warn!("current-PIN verification failed: {e}");
                        inner.collector.set_error(Some(AuthMessage::Generic));
                    }
                }
            }
            ChangeStep::EnterNew => {
                let mut inner = self.inner.lock();
                inner.new_pin = Some(Zeroizing::new(pin));
                inner.collector.clear();
                inner.step = ChangeStep::ConfirmNew;
            }
            ChangeStep::ConfirmNew => {
                let matches = {
                    let inner = self.inner.lock();
                    inner.new_pin.as_ref().is_some_and(|p| p.as_str() == pin)
                };
                if !matches {
                    let mut inner = self.inner.lock();
                    inner.collector.set_error(Some(AuthMessage::PinMismatch));
                    inner.collector.clear();
                    return;
                }

                self.inner.lock().collector.set_loading(true);
                let created = self.auth.create_pin(&pin).await;
                self.inner.lock().collector.set_loading(false);
                match created {
                    Ok(()) => self.complete.store(true, Ordering::SeqCst),
                    Err(e) => {
                        tracing::warn!("PIN change failed: {e}");
                        let mut inner = self.inner.lock();
                        inner.collector.set_error(Some(AuthMessage::Generic));
                        inner.collector.clear();
                    }
                }
            }
        }
    }

    /// Feed a backspace
    pub fn press_backspace(&self) {
        self.inner.lock().collector.backspace();
    }

    /// The new PIN is saved; the shell navigates back
    pub fn is_complete(&self) -> bool {
        self.complete.load(Ordering::SeqCst)
    }

    /// Current step
    pub fn step(&self) -> ChangeStep {
        self.inner.lock().step
    }

    /// Current digits
    pub fn value(&self) -> String {
        self.inner.lock().collector.value().to_string()
    }

    /// Current error, if any
    pub fn error(&self) -> Option<AuthMessage> {
        self.inner.lock().collector.error()
    }

    /// Whether an async operation is in flight
    pub fn is_loading(&self) -> bool {
        self.inner.lock().collector.is_loading()
    }

    /// Title localization key for the current step
    pub fn title_key(&self) -> &'static str {
        match self.step() {
            ChangeStep::VerifyCurrent => "pin.change.currentTitle",
            ChangeStep::EnterNew => "pin.change.newTitle",
            ChangeStep::ConfirmNew => "pin.create.repeatPrompt",
        }
    }

    /// Subtitle localization key, when the step has one
    pub fn subtitle_key(&self) -> Option<&'static str> {
        match self.step() {
            ChangeStep::VerifyCurrent => Some("pin.change.currentSubtitle"),
            _ => None,
        }
    }
}

// ============================================================================
// PIN login
// ============================================================================

struct LoginShared {
    collector: Mutex<DigitCollector>,
    remaining_seconds: AtomicU32,
    attempts_left: AtomicU32,
    biometric_tappable: AtomicBool,
    checking_biometric: AtomicBool,
    auth: Arc<PinAuth>,
    gate: Arc<BiometricGate>,
    session: Arc<SessionState>,
}

/// Controller for the PIN-login screen
pub struct PinLoginFlow {
    shared: Arc<LoginShared>,
    countdown: Mutex<Option<JoinHandle<()>>>,
    mount_check: Mutex<Option<JoinHandle<()>>>,
    mount_cancelled: Arc<AtomicBool>,
}

impl PinLoginFlow {
    /// Create over the auth core, biometric gate, and session
    pub fn new(auth: Arc<PinAuth>, gate: Arc<BiometricGate>, session: Arc<SessionState>) -> Self {
        Self {
            shared: Arc::new(LoginShared {
                collector: Mutex::new(DigitCollector::new()),
                remaining_seconds: AtomicU32::new(0),
                attempts_left: AtomicU32::new(NO_ATTEMPTS),
                biometric_tappable: AtomicBool::new(true),
                checking_biometric: AtomicBool::new(false),
                auth,
                gate,
                session,
            }),
            countdown: Mutex::new(None),
            mount_check: Mutex::new(None),
            mount_cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Screen mounted: pick up a persisted lockout and, when biometric
    /// unlock is enabled and available, run the on-mount challenge.
    pub async fn start(&self) {
        let remaining = self.shared.auth.remaining_lockout_seconds().await;
        if remaining > 0 {
            tracing::debug!("login mounted under lockout, {remaining}s left");
            self.engage_lockout(remaining);
        }
        self.spawn_mount_check();
    }

    /// Feed a keypad digit
    pub async fn press_digit(&self, digit: char) {
        let completed = {
            let mut collector = self.shared.collector.lock();
            match collector.push_digit(digit) {
                DigitEvent::Completed(pin) => {
                    collector.set_loading(true);
                    Some(pin)
                }
                _ => None,
            }
        };
        let Some(pin) = completed else {
            return;
        };

        let outcome = self.shared.auth.verify_pin(&pin).await;
        self.shared.collector.lock().set_loading(false);
        match outcome {
            Ok(VerifyOutcome::Success) => {
                self.shared.session.sign_in().await;
            }
            Ok(VerifyOutcome::Locked { remaining_seconds }) => {
                self.engage_lockout(remaining_seconds);
            }
            Ok(VerifyOutcome::Incorrect { attempts_left }) => {
                self.shared
                    .attempts_left
                    .store(attempts_left, Ordering::SeqCst);
                let mut collector = self.shared.collector.lock();
                collector.set_error(Some(AuthMessage::IncorrectPin));
                collector.clear();
            }
            Err(e) => {
                tracing::warn!("PIN verification failed: {e}");
                let mut collector = self.shared.collector.lock();
                collector.set_error(Some(AuthMessage::Generic));
                collector.clear();
            }
        }
    }

    /// Feed a backspace
    pub fn press_backspace(&self) {
        self.shared.collector.lock().backspace();
    }

    /// Biometric icon tapped: request permission (denial latches the icon
    /// off for this screen), enable on first use, then run the challenge.
    /// Challenge failure is silent — cancellation is a normal outcome.
    pub async fn press_biometric(&self) {
        if !self.shared.biometric_tappable.load(Ordering::SeqCst) {
            return;
        }
        if !self.shared.gate.request_permission().await {
            tracing::debug!("biometric permission denied; disabling affordance");
            self.shared
                .biometric_tappable
                .store(false, Ordering::SeqCst);
            return;
        }
        if !self.shared.gate.is_enabled().await {
            if let Err(e) = self.shared.gate.enable().await {
                // leave the affordance tappable so the user can retry
                tracing::warn!("biometric enable failed: {e}");
                return;
            }
        }
        if self.shared.gate.authenticate().await {
            self.shared.session.sign_in().await;
        }
    }

    /// Current digits
    pub fn value(&self) -> String {
        self.shared.collector.lock().value().to_string()
    }

    /// Current error, if any
    pub fn error(&self) -> Option<AuthMessage> {
        self.shared.collector.lock().error()
    }

    /// Whether a verification is in flight
    pub fn is_loading(&self) -> bool {
        self.shared.collector.lock().is_loading()
    }

    /// Whether input is disabled by an active lockout
    pub fn is_locked(&self) -> bool {
        self.shared.collector.lock().is_disabled()
    }

    /// Seconds left on the countdown shown while locked
    pub fn remaining_seconds(&self) -> u32 {
        self.shared.remaining_seconds.load(Ordering::SeqCst)
    }

    /// Attempts left after the last wrong entry, for optional UI messaging
    pub fn attempts_left(&self) -> Option<u32> {
        match self.shared.attempts_left.load(Ordering::SeqCst) {
            NO_ATTEMPTS => None,
            n => Some(n),
        }
    }

    /// Whether the biometric icon should respond to taps
    pub fn biometric_tappable(&self) -> bool {
        self.shared.biometric_tappable.load(Ordering::SeqCst)
    }

    /// Whether the on-mount biometric check is still running
    pub fn is_checking_biometric(&self) -> bool {
        self.shared.checking_biometric.load(Ordering::SeqCst)
    }

    /// Title localization key
    pub fn title_key(&self) -> &'static str {
        "pin.login.title"
    }

    /// Subtitle localization key
    pub fn subtitle_key(&self) -> Option<&'static str> {
        Some("pin.login.subtitle")
    }

    /// Disable input, show the countdown message, and poll the remaining
    /// time once a second until the lockout expires.
    fn engage_lockout(&self, remaining: u32) {
        {
            let mut collector = self.shared.collector.lock();
            collector.set_disabled(true);
            collector.set_error(Some(AuthMessage::LockedFor(remaining)));
            collector.clear();
        }
        self.shared
            .remaining_seconds
            .store(remaining, Ordering::SeqCst);

        let shared = self.shared.clone();
        let handle = tokio::spawn(async move {
            loop {
                tokio::time::sleep(LOCKOUT_POLL).await;
                let remaining = shared.auth.remaining_lockout_seconds().await;
                shared.remaining_seconds.store(remaining, Ordering::SeqCst);
                let mut collector = shared.collector.lock();
                if remaining == 0 {
                    collector.set_disabled(false);
                    collector.set_error(None);
                    break;
                }
                collector.set_error(Some(AuthMessage::LockedFor(remaining)));
            }
            tracing::debug!("lockout countdown finished");
        });
        if let Some(previous) = self.countdown.lock().replace(handle) {
            previous.abort();
        }
    }

    /// Run the on-mount biometric challenge. Cancellation is checked after
    /// every suspension point so a torn-down screen never commits state.
    fn spawn_mount_check(&self) {
        let shared = self.shared.clone();
        let cancelled = self.mount_cancelled.clone();
        shared.checking_biometric.store(true, Ordering::SeqCst);

        let handle = tokio::spawn(async move {
            let available = shared.gate.is_available();
            let enabled = shared.gate.is_enabled().await;
            if cancelled.load(Ordering::SeqCst) || !enabled || !available {
                tracing::debug!("on-mount biometric check skipped");
                shared.checking_biometric.store(false, Ordering::SeqCst);
                return;
            }

            let success = shared.gate.authenticate().await;
            if cancelled.load(Ordering::SeqCst) {
                return;
            }
            if success {
                shared.session.sign_in().await;
            }
            shared.checking_biometric.store(false, Ordering::SeqCst);
        });
        if let Some(previous) = self.mount_check.lock().replace(handle) {
            previous.abort();
        }
    }
}

impl Drop for PinLoginFlow {
    fn drop(&mut self) {
        self.mount_cancelled.store(true, Ordering::SeqCst);
        if let Some(handle) = self.countdown.lock().take() {
            handle.abort();
        }
        if let Some(handle) = self.mount_check.lock().take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use fintrack_keystore::{ChallengeBehavior, MemoryStore};

    struct Fixture {
        store: Arc<MemoryStore>,
        clock: Arc<ManualClock>,
        auth: Arc<PinAuth>,
        gate: Arc<BiometricGate>,
        session: Arc<SessionState>,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let clock = Arc::new(ManualClock::at(0));
        let auth = Arc::new(PinAuth::new(store.clone(), clock.clone()));
        let gate = Arc::new(BiometricGate::new(store.clone()));
        let session = Arc::new(SessionState::new(store.clone()));
        Fixture {
            store,
            clock,
            auth,
            gate,
            session,
        }
    }

    #[tokio::test]
    async fn create_flow_confirms_and_signs_in() {
        let f = fixture();
        let flow = PinCreateFlow::new(f.auth.clone(), f.session.clone());
        assert_eq!(flow.step(), CreateStep::First);
        assert_eq!(flow.title_key(), "pin.create.title");

        for d in ['1', '2', '3', '4'] {
            flow.press_digit(d).await;
        }
        assert_eq!(flow.step(), CreateStep::Confirm);
        assert_eq!(flow.value(), "");
        assert_eq!(flow.title_key(), "pin.create.repeatPrompt");

        // mismatched confirmation stays on the confirm step
        for d in ['9', '9', '9', '9'] {
            flow.press_digit(d).await;
        }
        assert_eq!(flow.error(), Some(AuthMessage::PinMismatch));
        assert_eq!(flow.step(), CreateStep::Confirm);
        assert!(!f.session.is_authenticated());

        for d in ['1', '2', '3', '4'] {
            flow.press_digit(d).await;
        }
        assert!(f.session.is_authenticated());
        assert!(f.auth.has_pin().await);
    }

    #[tokio::test]
    async fn create_flow_surfaces_store_failure_and_allows_retry() {
        let f = fixture();
        let flow = PinCreateFlow::new(f.auth.clone(), f.session.clone());
        for d in ['1', '2', '3', '4'] {
            flow.press_digit(d).await;
        }

        f.store.set_fail_writes(true);
        for d in ['1', '2', '3', '4'] {
            flow.press_digit(d).await;
        }
        assert_eq!(flow.error(), Some(AuthMessage::Generic));
        assert_eq!(flow.step(), CreateStep::Confirm);
        assert!(!f.session.is_authenticated());

        f.store.set_fail_writes(false);
        for d in ['1', '2', '3', '4'] {
            flow.press_digit(d).await;
        }
        assert!(f.session.is_authenticated());
    }

    #[tokio::test]
    async fn change_flow_happy_path() {
        let f = fixture();
        f.auth.create_pin("1234").await.unwrap();
        let flow = PinChangeFlow::new(f.auth.clone());

        for d in ['1', '2', '3', '4'] {
            flow.press_digit(d).await;
        }
        assert_eq!(flow.step(), ChangeStep::EnterNew);

        for d in ['5', '6', '7', '8'] {
            flow.press_digit(d).await;
        }
        assert_eq!(flow.step(), ChangeStep::ConfirmNew);
        for d in ['5', '6', '7', '8'] {
            flow.press_digit(d).await;
        }
        assert!(flow.is_complete());

        assert_eq!(
            f.auth.verify_pin("5678").await.unwrap(),
            VerifyOutcome::Success
        );
    }

    #[tokio::test]
    async fn change_flow_wrong_current_pin_shares_lockout() {
        let f = fixture();
        f.auth.create_pin("1234").await.unwrap();
        let flow = PinChangeFlow::new(f.auth.clone());

        for _ in 0..2 {
            for d in ['0', '0', '0', '0'] {
                flow.press_digit(d).await;
            }
            assert_eq!(flow.error(), Some(AuthMessage::IncorrectPin));
            assert_eq!(flow.step(), ChangeStep::VerifyCurrent);
        }
        for d in ['0', '0', '0', '0'] {
            flow.press_digit(d).await;
        }
        assert_eq!(flow.error(), Some(AuthMessage::LockedFor(30)));
        assert!(f.auth.is_locked().await);
    }

    #[tokio::test(start_paused = true)]
    async fn login_flow_locks_and_recovers() {
        let f = fixture();
        f.auth.create_pin("1234").await.unwrap();
        let flow = PinLoginFlow::new(f.auth.clone(), f.gate.clone(), f.session.clone());
        flow.start().await;

        for _ in 0..2 {
            for d in ['0', '0', '0', '0'] {
                flow.press_digit(d).await;
            }
            assert_eq!(flow.error(), Some(AuthMessage::IncorrectPin));
        }
        assert_eq!(flow.attempts_left(), Some(1));

        for d in ['0', '0', '0', '0'] {
            flow.press_digit(d).await;
        }
        assert!(flow.is_locked());
        assert_eq!(flow.remaining_seconds(), 30);

        // input is ignored while locked
        flow.press_digit('1').await;
        assert_eq!(flow.value(), "");

        // let the countdown observe the expired lockout
        f.clock.advance_secs(31);
        tokio::time::sleep(Duration::from_secs(3)).await;
        assert!(!flow.is_locked());
        assert_eq!(flow.remaining_seconds(), 0);

        for d in ['1', '2', '3', '4'] {
            flow.press_digit(d).await;
        }
        assert!(f.session.is_authenticated());
    }

    #[tokio::test]
    async fn login_flow_biometric_press_enables_and_signs_in() {
        let f = fixture();
        f.auth.create_pin("1234").await.unwrap();
        let flow = PinLoginFlow::new(f.auth.clone(), f.gate.clone(), f.session.clone());

        assert!(!f.gate.is_enabled().await);
        flow.press_biometric().await;
        assert!(f.gate.is_enabled().await);
        assert!(f.session.is_authenticated());
    }

    #[tokio::test]
    async fn login_flow_permission_denial_latches_affordance() {
        let f = fixture();
        f.auth.create_pin("1234").await.unwrap();
        f.store.set_permission_granted(false);
        let flow = PinLoginFlow::new(f.auth.clone(), f.gate.clone(), f.session.clone());

        flow.press_biometric().await;
        assert!(!flow.biometric_tappable());
        assert!(!f.session.is_authenticated());

        // latched: granting later in the same screen changes nothing
        f.store.set_permission_granted(true);
        flow.press_biometric().await;
        assert!(!f.session.is_authenticated());
    }

    #[tokio::test]
    async fn login_flow_biometric_cancel_is_silent() {
        let f = fixture();
        f.auth.create_pin("1234").await.unwrap();
        f.gate.enable().await.unwrap();
        f.store.set_challenge_behavior(ChallengeBehavior::Cancel);
        let flow = PinLoginFlow::new(f.auth.clone(), f.gate.clone(), f.session.clone());

        flow.press_biometric().await;
        assert!(!f.session.is_authenticated());
        assert_eq!(flow.error(), None);
        assert!(flow.biometric_tappable());
    }

    #[tokio::test(start_paused = true)]
    async fn on_mount_check_signs_in_when_enabled() {
        let f = fixture();
        f.auth.create_pin("1234").await.unwrap();
        f.gate.enable().await.unwrap();
        let flow = PinLoginFlow::new(f.auth.clone(), f.gate.clone(), f.session.clone());
        flow.start().await;

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(f.session.is_authenticated());
    }

    #[tokio::test(start_paused = true)]
    async fn on_mount_check_falls_through_when_disabled() {
        let f = fixture();
        f.auth.create_pin("1234").await.unwrap();
        let flow = PinLoginFlow::new(f.auth.clone(), f.gate.clone(), f.session.clone());
        flow.start().await;

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!f.session.is_authenticated());
        assert!(!flow.is_checking_biometric());
    }

    #[tokio::test(start_paused = true)]
    async fn dropped_flow_cancels_mount_check() {
        let f = fixture();
        f.auth.create_pin("1234").await.unwrap();
        f.gate.enable().await.unwrap();
        let flow = PinLoginFlow::new(f.auth.clone(), f.gate.clone(), f.session.clone());
        flow.start().await;
        drop(flow);

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!f.session.is_authenticated());
    }
}
