//! Kudos Core - product reviews with authenticated writes
//!
//! This crate holds configuration, caller identity and the
//! transport-independent [`ReviewService`] that applies authorization
//! before delegating to a [`kudos_db::ReviewStore`].

pub mod auth;
pub mod config;
pub mod error;
pub mod review;

pub use auth::{Identity, LoginService, SessionTokens, TokenVerifier};
pub use config::{Config, ConfigOverrides, StoreBackend};
pub use error::{Error, Result};
pub use review::{ReviewService, ServiceError};
