//! HTTP surface for the habit service
//!
//! Every failure leaves the router as `{ "success": false, "error": ... }`
//! with a matching status code; nothing propagates past the handlers.

pub mod errors;
pub mod handlers;

pub use errors::{ApiError, ApiResponse};
pub use handlers::SESSION_COOKIE;

use std::sync::Arc;

use axum::routing::get;
use axum::Router;

use crate::service::HabitService;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<HabitService>,
}

impl AppState {
    pub fn new(service: Arc<HabitService>) -> Self {
        Self { service }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/habits",
            get(handlers::list_habits)
                .post(handlers::create_habit)
                .patch(handlers::toggle_completion)
                .delete(handlers::delete_habit),
        )
        .route("/calendar", get(handlers::month_calendar))
        .with_state(state)
}
