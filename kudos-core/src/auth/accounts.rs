//! Login accounts and token issuance

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{info, warn};

use super::{AuthError, Identity, SessionTokens};
use crate::config::AccountConfig;

/// Login request body
#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Result of a successful login
#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub token: String,
    #[serde(rename = "umail")]
    pub email: String,
}

/// Accounts allowed to log in
#[derive(Debug, Clone, Default)]
pub struct AccountDirectory {
    accounts: Vec<AccountConfig>,
}

impl AccountDirectory {
    pub fn new(accounts: Vec<AccountConfig>) -> Self {
        Self { accounts }
    }

    /// Check an email/password pair against the stored digests
    pub fn authenticate(&self, credentials: &Credentials) -> Option<Identity> {
        let digest = password_digest(&credentials.password);
        self.accounts
            .iter()
            .find(|account| {
                account.email == credentials.email
                    && account.password_sha256.eq_ignore_ascii_case(&digest)
            })
            .map(|account| Identity::new(&account.email))
    }
}

/// Lowercase hex SHA-256 of a password, the format kept in configuration
pub fn password_digest(password: &str) -> String {
    format!("{:x}", Sha256::digest(password.as_bytes()))
}

/// Exchanges credentials for session tokens
#[derive(Debug, Clone)]
pub struct LoginService {
    accounts: AccountDirectory,
    sessions: Arc<SessionTokens>,
}

impl LoginService {
    pub fn new(accounts: AccountDirectory, sessions: Arc<SessionTokens>) -> Self {
        Self { accounts, sessions }
    }

    pub fn login(&self, credentials: &Credentials) -> Result<Session, AuthError> {
        let Some(identity) = self.accounts.authenticate(credentials) else {
            warn!(email = %credentials.email, "Rejected login");
            return Err(AuthError::InvalidCredentials);
        };

        info!(user = %identity, "User logged in");
        let email = identity.email().to_string();
        let token = self.sessions.issue(identity);
        Ok(Session { token, email })
    }
}
