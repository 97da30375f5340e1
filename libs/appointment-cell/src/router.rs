use std::sync::Arc;

use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers::*;

pub fn appointment_routes(config: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/", get(list_appointments))
        .route("/", post(create_appointment))
        .route("/board", get(appointment_board))
        .route("/stats", get(dashboard_stats))
        .route("/{id}", get(get_appointment))
        .route("/{id}", put(update_appointment))
        .route("/{id}", delete(delete_appointment))
        .route("/{id}/cancel", post(cancel_appointment))
        .layer(middleware::from_fn_with_state(config.clone(), auth_middleware))
        .with_state(config)
}
