//! Caller identity: token verification, login accounts, and the
//! authorization guards applied to review writes.

pub mod accounts;
pub mod guard;
pub mod verifier;

use std::fmt;

use serde::Serialize;

pub use accounts::{AccountDirectory, Credentials, LoginService, Session};
pub use guard::{authorize_author, authorize_edit, require_identity, AuthError, EditPolicy};
pub use verifier::{SessionTokens, TokenVerifier, DEFAULT_SESSION_TTL};

/// A verified user, identified by email
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Identity {
    email: String,
}

impl Identity {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
        }
    }

    pub fn email(&self) -> &str {
        &self.email
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.email)
    }
}
