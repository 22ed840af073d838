pub mod health;

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::export::handlers as export;
use crate::pagination::handlers as pagination;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // One-shot pagination
        .route("/api/v1/paginate", post(pagination::handle_paginate))
        // Preview sessions
        .route("/api/v1/sessions", post(pagination::handle_create_session))
        .route(
            "/api/v1/sessions/:id",
            get(pagination::handle_get_snapshot).delete(pagination::handle_close_session),
        )
        .route(
            "/api/v1/sessions/:id/input",
            put(pagination::handle_update_input),
        )
        // Export
        .route(
            "/api/v1/sessions/:id/export/png",
            post(export::handle_export_png),
        )
        .route(
            "/api/v1/sessions/:id/export/pdf",
            post(export::handle_export_pdf),
        )
        .with_state(state)
}
