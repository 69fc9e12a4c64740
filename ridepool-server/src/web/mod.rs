//! Web layer for the ride pooling service.
//!
//! Provides JSON endpoints for request intake, cancellation, on-demand
//! matching and ride acceptance.

mod dto;
mod routes;
mod state;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::AppState;
