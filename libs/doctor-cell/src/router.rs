use std::sync::Arc;

use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers::*;

pub fn doctor_routes(config: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/", post(create_doctor))
        .route("/search", get(search_doctors))
        .route("/{id}", get(get_doctor))
        .route("/{id}", put(update_doctor))
        .route("/{id}", delete(delete_doctor))
        .route("/{id}/credentials", get(list_doctor_credentials))
        .route("/{id}/credentials", post(add_doctor_credential))
        .route("/credentials/{id}", delete(delete_credential))
        .layer(middleware::from_fn_with_state(config.clone(), auth_middleware))
        .with_state(config)
}

pub fn specialty_routes(config: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/", get(list_specialties))
        .route("/", post(create_specialty))
        .route("/{id}", put(update_specialty))
        .route("/{id}", delete(delete_specialty))
        .layer(middleware::from_fn_with_state(config.clone(), auth_middleware))
        .with_state(config)
}
