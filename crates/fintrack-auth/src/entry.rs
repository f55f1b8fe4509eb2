//! Digit-collection state machine
//!
//! One step-agnostic collector backs all three PIN screens (create, change,
//! login). It knows nothing about steps or verification; flows react to
//! [`DigitEvent::Completed`] and drive the collector back through its API.

use serde::Serialize;

/// PIN length collected before completion fires
pub const PIN_LENGTH: usize = 4;

/// User-visible message, exposed as the shell's localization key so the UI
/// layer owns the actual wording.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AuthMessage {
    /// Wrong PIN entered
    IncorrectPin,
    /// Confirmation entry did not match the first entry
    PinMismatch,
    /// Verification suspended for the given number of seconds
    LockedFor(u32),
    /// Generic failure (e.g. secure storage write failed)
    Generic,
}

impl AuthMessage {
    /// Localization key the shell resolves
    pub fn key(&self) -> &'static str {
        match self {
            Self::IncorrectPin => "pin.login.incorrect",
            Self::PinMismatch => "pin.create.mismatch",
            Self::LockedFor(_) => "pin.login.locked",
            Self::Generic => "common.error",
        }
    }
}

/// Result of feeding a digit to the collector
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DigitEvent {
    /// Input was disabled or the value already full; nothing changed
    Ignored,
    /// Digit appended, value still short of the target length
    Accepted,
    /// Digit appended and the target length reached; holds the full entry
    Completed(String),
}

/// Collects up to [`PIN_LENGTH`] digits with an error message and a loading
/// flag for the owning screen.
#[derive(Debug)]
pub struct DigitCollector {
    value: String,
    pin_length: usize,
    error: Option<AuthMessage>,
    loading: bool,
    disabled: bool,
}

impl DigitCollector {
    /// Collector for the default PIN length
    pub fn new() -> Self {
        Self::with_length(PIN_LENGTH)
    }

    /// Collector for a custom length
    pub fn with_length(pin_length: usize) -> Self {
        Self {
            value: String::new(),
            pin_length,
            error: None,
            loading: false,
            disabled: false,
        }
    }

    /// Append a digit. No-op while disabled or full; clears any error on an
    /// accepted digit; yields the complete entry at the target length.
    pub fn push_digit(&mut self, digit: char) -> DigitEvent {
        if self.disabled || self.value.len() >= self.pin_length {
            return DigitEvent::Ignored;
        }
        self.error = None;
        self.value.push(digit);
        if self.value.len() == self.pin_length {
            DigitEvent::Completed(self.value.clone())
        } else {
            DigitEvent::Accepted
        }
    }

    /// Drop the last digit. Always safe on an empty value. The error is
    /// cleared unless input is disabled.
    pub fn backspace(&mut self) {
        if !self.disabled {
            self.error = None;
        }
        self.value.pop();
    }

    /// Empty the value (kept error/loading untouched)
    pub fn clear(&mut self) {
        self.value.clear();
    }

    /// Current digits
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Current error message, if any
    pub fn error(&self) -> Option<AuthMessage> {
        self.error
    }

    /// Set or clear the error message
    pub fn set_error(&mut self, error: Option<AuthMessage>) {
        self.error = error;
    }

    /// Whether an async operation is in flight
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Toggle the loading flag
    pub fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    /// Whether input is ignored
    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    /// Toggle input handling
    pub fn set_disabled(&mut self, disabled: bool) {
        self.disabled = disabled;
    }
}

impl Default for DigitCollector {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn completes_at_pin_length() {
        let mut collector = DigitCollector::new();
        assert_eq!(collector.push_digit('1'), DigitEvent::Accepted);
        assert_eq!(collector.push_digit('2'), DigitEvent::Accepted);
        assert_eq!(collector.push_digit('3'), DigitEvent::Accepted);
        assert_eq!(
            collector.push_digit('4'),
            DigitEvent::Completed("1234".to_string())
        );
        // full: further digits ignored
        assert_eq!(collector.push_digit('5'), DigitEvent::Ignored);
        assert_eq!(collector.value(), "1234");
    }

    #[test]
    fn backspace_on_empty_is_idempotent() {
        let mut collector = DigitCollector::new();
        for _ in 0..10 {
            collector.backspace();
            assert_eq!(collector.value(), "");
        }
    }

    #[test]
    fn accepted_digit_clears_error() {
        let mut collector = DigitCollector::new();
        collector.set_error(Some(AuthMessage::IncorrectPin));
        collector.push_digit('7');
        assert_eq!(collector.error(), None);
    }

    #[test]
    fn backspace_keeps_error_while_disabled() {
        let mut collector = DigitCollector::new();
        collector.set_error(Some(AuthMessage::LockedFor(12)));
        collector.set_disabled(true);
        collector.backspace();
        assert_eq!(collector.error(), Some(AuthMessage::LockedFor(12)));

        collector.set_disabled(false);
        collector.backspace();
        assert_eq!(collector.error(), None);
    }

    #[test]
    fn message_keys() {
        assert_eq!(AuthMessage::IncorrectPin.key(), "pin.login.incorrect");
        assert_eq!(AuthMessage::LockedFor(30).key(), "pin.login.locked");
    }

    proptest! {
        #[test]
        fn disabled_collector_ignores_all_input(digits in proptest::collection::vec(proptest::char::range('0', '9'), 0..32)) {
            let mut collector = DigitCollector::new();
            collector.set_disabled(true);
            for d in digits {
                prop_assert_eq!(collector.push_digit(d), DigitEvent::Ignored);
                prop_assert_eq!(collector.value(), "");
            }
        }

        #[test]
        fn value_never_exceeds_pin_length(digits in proptest::collection::vec(proptest::char::range('0', '9'), 0..64)) {
            let mut collector = DigitCollector::new();
            for d in digits {
                collector.push_digit(d);
                prop_assert!(collector.value().len() <= PIN_LENGTH);
            }
        }
    }
}
