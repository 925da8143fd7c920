//! Kudos API - HTTP transport for the product review service
//!
//! Maps the JSON endpoints under `/rest` onto [`kudos_core::ReviewService`]
//! and [`kudos_core::LoginService`].

pub mod http;

pub use http::{create_router, run_http_server, AppState};
