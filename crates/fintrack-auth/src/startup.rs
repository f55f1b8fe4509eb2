//! App startup sequencing
//!
//! One parallel read at launch decides the first screen: onboarding for a
//! first launch, PIN creation when onboarding is done but no PIN exists,
//! PIN login otherwise. Any storage trouble defaults to "first launch" —
//! showing onboarding again is safe; silently bypassing auth is not.

use crate::session::SessionState;
use fintrack_keystore::{AccessPolicy, CredentialKey, CredentialStore};
use serde::Serialize;
use std::sync::Arc;

/// Snapshot the UI shell consumes after the splash screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AppInitState {
    /// Initialization finished (the shell shows the splash until then)
    pub is_ready: bool,
    /// Onboarding has not been completed
    pub is_first_launch: bool,
    /// A PIN hash exists
    pub has_pin: bool,
    /// A persisted session marker exists
    pub has_session: bool,
}

impl Default for AppInitState {
    fn default() -> Self {
        Self {
            is_ready: false,
            is_first_launch: true,
            has_pin: false,
            has_session: false,
        }
    }
}

/// First screen after the splash
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum InitialRoute {
    /// First launch: run onboarding
    Onboarding,
    /// Onboarded but no PIN yet: create one
    PinCreate,
    /// PIN exists: unlock
    PinLogin,
}

/// Run the startup reads in parallel and seed the session from the
/// persisted marker.
pub async fn initialize(store: Arc<dyn CredentialStore>, session: &SessionState) -> AppInitState {
    let (onboarded, has_pin, has_session) = tokio::join!(
        onboarding_completed(store.as_ref()),
        pin_exists(store.as_ref()),
        session.has_persisted_session(),
    );

    session.restore(has_session);

    AppInitState {
        is_ready: true,
        is_first_launch: !onboarded,
        has_pin,
        has_session,
    }
}

/// Compute the first screen from the init snapshot
pub fn initial_route(state: &AppInitState) -> InitialRoute {
    if state.is_first_launch {
        InitialRoute::Onboarding
    } else if state.has_pin {
        InitialRoute::PinLogin
    } else {
        InitialRoute::PinCreate
    }
}

/// Whether onboarding has been completed. Read failures collapse to
/// `false` (first launch).
pub async fn onboarding_completed(store: &dyn CredentialStore) -> bool {
    matches!(
        store.get(CredentialKey::OnboardingCompleted).await,
        Ok(Some(v)) if v == "true"
    )
}

/// Persist the onboarding-completed flag
pub async fn set_onboarding_completed(
    store: &dyn CredentialStore,
    completed: bool,
) -> fintrack_keystore::Result<()> {
    store
        .set(
            CredentialKey::OnboardingCompleted,
            if completed { "true" } else { "false" },
            AccessPolicy::WhenUnlocked,
        )
        .await
}

async fn pin_exists(store: &dyn CredentialStore) -> bool {
    matches!(
        store.get(CredentialKey::PinHash).await,
        Ok(Some(hash)) if !hash.is_empty()
    )
}
