use std::sync::Arc;

use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers::*;

pub fn prescription_routes(config: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/", get(list_prescriptions))
        .route("/", post(create_prescription))
        .route("/{id}", get(get_prescription))
        .route("/{id}", put(update_prescription))
        .route("/{id}", delete(delete_prescription))
        .layer(middleware::from_fn_with_state(config.clone(), auth_middleware))
        .with_state(config)
}
