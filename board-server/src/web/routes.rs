//! HTTP route handlers.

use axum::{
    Json, Router,
    extract::{Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info, warn};

use crate::board::{BoardError, scrape_stop};
use crate::query::{self, DepartureQuery, QueryError};

use super::dto::ErrorResponse;
use super::state::AppState;

/// Message for every rejected query.
const BAD_REQUEST: &str = "Bad request.";

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(departures))
        .route("/departures", get(departures))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Scrape a stop's board and answer with its filtered departures.
///
/// The query is validated in full before the board is requested.
async fn departures(
    State(state): State<AppState>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Response, AppError> {
    let query = DepartureQuery::from_pairs(params.iter().map(|(k, v)| (k.as_str(), v.as_str())))?;

    let board = scrape_stop(
        state.source.as_ref(),
        &query.stop_id,
        state.lines.clone(),
        state.clock.clone(),
    )
    .await?;
    let scraped = board.departures.len();

    let format = query.options.format;
    let result = query::apply(board, &query.options);
    info!(
        stop = %query.stop_id,
        scraped,
        returned = result.departures.len(),
        "departures served"
    );

    let body = format.encode(&result).map_err(|e| AppError::Internal {
        message: format!("encoding failed: {e}"),
    })?;

    Ok(([(header::CONTENT_TYPE, format.content_type())], body).into_response())
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    NotFound { message: String },
    BadGateway { message: String },
    Internal { message: String },
}

impl From<QueryError> for AppError {
    fn from(e: QueryError) -> Self {
        debug!(error = %e, "rejected query");
        AppError::BadRequest {
            message: BAD_REQUEST.to_string(),
        }
    }
}

impl From<BoardError> for AppError {
    fn from(e: BoardError) -> Self {
        let message = e.to_string();
        match e {
            BoardError::StopNotFound(_) => AppError::NotFound { message },
            BoardError::Http(_)
            | BoardError::Refused { .. }
            | BoardError::RateLimited
            | BoardError::Upstream { .. } => AppError::BadGateway { message },
            BoardError::InvalidUrl(_)
            | BoardError::Io(_)
            | BoardError::Extract(_)
            | BoardError::Task(_) => AppError::Internal { message },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message),
            AppError::NotFound { message } => (StatusCode::NOT_FOUND, message),
            AppError::BadGateway { message } => (StatusCode::BAD_GATEWAY, message),
            AppError::Internal { message } => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };

        if status.is_server_error() {
            error!(%status, %message, "request failed");
        } else {
            warn!(%status, %message, "request refused");
        }

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}
