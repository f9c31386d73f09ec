//! Employee Records API: token-guarded CRUD, listing and salary analytics
//! over a single employee collection.
//!
//! The binary in `main.rs` wires configuration, telemetry and a store backend
//! into [`app`]; integration tests in `tests/` drive the same router against
//! [`store::memory::MemoryStore`].

use std::sync::Arc;

use axum::Router;

pub mod api;
pub mod auth;
pub mod codec;
pub mod config;
pub mod errors;
pub mod models;
pub mod repository;
pub mod store;
pub mod telemetry;

use auth::{CredentialVerifier, TokenService};
use repository::EmployeeRepository;

/// Shared application state passed to handlers and extractors.
pub struct AppState {
    pub repo: EmployeeRepository,
    pub tokens: TokenService,
    pub credentials: Arc<dyn CredentialVerifier>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn store::DocumentStore>,
        tokens: TokenService,
        credentials: Arc<dyn CredentialVerifier>,
    ) -> Self {
        Self {
            repo: EmployeeRepository::new(store),
            tokens,
            credentials,
        }
    }
}

/// The complete HTTP application: routes plus transport layers.
pub fn app(state: Arc<AppState>, dashboard_origin: String) -> Router {
    api::layers::with_transport_layers(api::api_router(state), dashboard_origin)
}
