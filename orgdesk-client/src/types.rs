//! Type markers for the client's typestate pattern.
//!
//! State markers enforce at compile time that protected endpoints are
//! only reachable after a successful login.

use std::marker::PhantomData;

use shared::client::Admin;

// ============================================================================
// State Markers
// ============================================================================

/// Anonymous state - client holds no session token.
///
/// Available transitions:
/// - `login()` -> Authenticated
#[derive(Debug, Clone, Copy, Default)]
pub struct Anonymous;

/// Authenticated state - client holds a bearer token.
///
/// Available operations: `list_divisions()`, `list_employees()`,
/// `create_employee()`, `update_employee()`, `delete_employee()`,
/// `admin()`, `logout()`.
#[derive(Debug, Clone, Copy)]
pub struct Authenticated;

/// Sealed trait for client states.
pub trait ClientState: private::Sealed + Send + Sync + 'static {}
impl ClientState for Anonymous {}
impl ClientState for Authenticated {}

mod private {
    pub trait Sealed {}
    impl Sealed for super::Anonymous {}
    impl Sealed for super::Authenticated {}
}

// ============================================================================
// Session Data
// ============================================================================

/// Active session: bearer token plus the admin profile returned at login.
#[derive(Debug, Clone)]
pub struct Session {
    /// Bearer token for API authentication.
    pub token: String,
    /// Profile of the signed-in administrator.
    pub admin: Admin,
}

impl Session {
    /// Creates a session from a login response.
    pub fn new(token: impl Into<String>, admin: Admin) -> Self {
        Self {
            token: token.into(),
            admin,
        }
    }
}

// ============================================================================
// Phantom State Wrapper
// ============================================================================

/// Internal wrapper to hold the phantom state marker.
#[derive(Debug)]
pub(crate) struct StateMarker<S> {
    pub(crate) _state: PhantomData<S>,
}

impl<S> StateMarker<S> {
    pub(crate) fn new() -> Self {
        Self {
            _state: PhantomData,
        }
    }
}

impl<S> Clone for StateMarker<S> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<S> Default for StateMarker<S> {
    fn default() -> Self {
        Self::new()
    }
}
