//! Web layer for the departure board server.
//!
//! One read-only endpoint scrapes a stop's board and answers with the
//! filtered departures.

mod dto;
mod routes;
mod state;

pub use dto::ErrorResponse;
pub use routes::{AppError, create_router};
pub use state::AppState;
