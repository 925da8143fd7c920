//! Bearer token verification

use std::time::{Duration, Instant};

use dashmap::DashMap;
use tracing::debug;
use uuid::Uuid;

use super::Identity;

/// Default lifetime of a session token
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(6 * 60 * 60);

/// Resolves a bearer token to the user it was issued for.
///
/// Verification is a local lookup or signature check; it must not block.
pub trait TokenVerifier: Send + Sync {
    /// `None` when the token is unknown, expired or malformed
    fn verify(&self, token: &str) -> Option<Identity>;
}

#[derive(Debug)]
struct SessionEntry {
    identity: Identity,
    expires_at: Instant,
}

impl SessionEntry {
    fn is_live(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}

/// Opaque session tokens issued by [`super::LoginService`].
///
/// Tokens expire `ttl` after issue. Expired entries are dropped when they are
/// looked up and swept whenever a new token is issued.
#[derive(Debug)]
pub struct SessionTokens {
    sessions: DashMap<String, SessionEntry>,
    ttl: Duration,
}

impl Default for SessionTokens {
    fn default() -> Self {
        Self::with_ttl(DEFAULT_SESSION_TTL)
    }
}

impl SessionTokens {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            sessions: DashMap::new(),
            ttl,
        }
    }

    /// Mint a fresh token for `identity`
    pub fn issue(&self, identity: Identity) -> String {
        let now = Instant::now();
        self.sessions.retain(|_, entry| entry.is_live(now));

        let token = Uuid::new_v4().simple().to_string();
        debug!(user = %identity, live = self.sessions.len(), "Issued session token");
        self.sessions.insert(
            token.clone(),
            SessionEntry {
                identity,
                expires_at: now + self.ttl,
            },
        );
        token
    }

    #[cfg(test)]
    pub(crate) fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

impl TokenVerifier for SessionTokens {
    fn verify(&self, token: &str) -> Option<Identity> {
        let now = Instant::now();
        let identity = {
            let entry = self.sessions.get(token)?;
            entry.is_live(now).then(|| entry.identity.clone())
        };
        if identity.is_none() {
            self.sessions.remove_if(token, |_, entry| !entry.is_live(now));
            debug!("Dropped expired session token");
        }
        identity
    }
}
