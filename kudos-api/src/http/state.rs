//! Application state for HTTP handlers.

use kudos_core::{LoginService, ReviewService};

/// Application state shared across all HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    /// Review operations with authorization applied.
    pub reviews: ReviewService,
    /// Credential exchange for `POST /rest/user/login`.
    pub login: LoginService,
}

impl AppState {
    pub fn new(reviews: ReviewService, login: LoginService) -> Self {
        Self { reviews, login }
    }
}
