use std::any::Any;
use std::sync::Arc;

use axum::{
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use tower_http::{catch_panic::CatchPanicLayer, cors::CorsLayer};
use tracing::error;

pub mod error;
pub mod handlers;
pub mod state;

pub use error::ApiError;
pub use state::AppState;

pub fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::permissive();

    // Method checks live in the handlers so a wrong verb answers 404, not 405.
    Router::new()
        .route("/health", any(handlers::health))
        .route("/analyze", any(handlers::analyze))
        .fallback(handlers::not_found)
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(cors)
        .with_state(Arc::new(state))
}

fn handle_panic(panic: Box<dyn Any + Send + 'static>) -> Response {
    let details = if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };
    error!("Request handler panicked: {}", details);
    ApiError::Internal(details).into_response()
}

pub mod prelude {
    pub use crate::{create_app, ApiError, AppState};
    pub use tf_core::{AnalysisRequest, AnalysisResult, Error, Result};
}
