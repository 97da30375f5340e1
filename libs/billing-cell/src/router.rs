use std::sync::Arc;

use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers::*;

pub fn billing_routes(config: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/providers", get(list_providers))
        .route("/providers", post(create_provider))
        .route("/providers/{id}", get(get_provider))
        .route("/providers/{id}", put(update_provider))
        .route("/providers/{id}", delete(delete_provider))
        .route("/codes", get(search_codes))
        .route("/codes", post(create_code))
        .route("/codes/{id}", put(update_code))
        .route("/codes/{id}", delete(delete_code))
        .route("/codes/adjust", post(adjust_code_values))
        .layer(middleware::from_fn_with_state(config.clone(), auth_middleware))
        .with_state(config)
}
