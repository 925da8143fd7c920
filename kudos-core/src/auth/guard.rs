//! Authorization checks applied before any review is written.
//!
//! These are pure functions over the caller's verified identity; they never
//! touch storage or transport.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::Identity;

/// Why a request was refused
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// No bearer token, or one the verifier does not recognise
    #[error("authentication required")]
    MissingCredentials,

    /// Login with an unknown email or wrong password
    #[error("invalid email or password")]
    InvalidCredentials,

    /// Signed-in user tried to post under another name
    #[error("author does not match the signed-in user")]
    AuthorMismatch,

    /// Signed-in user tried to edit someone else's review
    #[error("only the author may edit this review")]
    NotOwner,
}

/// Who may change the message of an existing review
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EditPolicy {
    /// Any signed-in user
    #[default]
    Authenticated,
    /// Only the user whose identity matches the review's author
    Owner,
}

impl FromStr for EditPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "authenticated" => Ok(EditPolicy::Authenticated),
            "owner" => Ok(EditPolicy::Owner),
            other => Err(format!("Unknown edit policy: {}", other)),
        }
    }
}

impl fmt::Display for EditPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EditPolicy::Authenticated => write!(f, "authenticated"),
            EditPolicy::Owner => write!(f, "owner"),
        }
    }
}

/// Unwrap the caller's identity or refuse the request
pub fn require_identity(identity: Option<Identity>) -> Result<Identity, AuthError> {
    identity.ok_or(AuthError::MissingCredentials)
}

/// A claimed author is acceptable when the caller is anonymous or is that author
pub fn authorize_author(claimed: &str, verified: Option<&Identity>) -> Result<(), AuthError> {
    match verified {
        None => Ok(()),
        Some(identity) if identity.email() == claimed => Ok(()),
        Some(_) => Err(AuthError::AuthorMismatch),
    }
}

/// Decide whether `editor` may change a review written by `review_author`
pub fn authorize_edit(
    policy: EditPolicy,
    review_author: &str,
    editor: &Identity,
) -> Result<(), AuthError> {
    match policy {
        EditPolicy::Authenticated => Ok(()),
        EditPolicy::Owner if editor.email() == review_author => Ok(()),
        EditPolicy::Owner => Err(AuthError::NotOwner),
    }
}
