use std::sync::Arc;

use axum::{routing::get, Router};

use admin_cell::router::admin_routes;
use appointment_cell::router::appointment_routes;
use billing_cell::router::billing_routes;
use doctor_cell::router::{doctor_routes, specialty_routes};
use patient_cell::router::patient_routes;
use prescription_cell::router::prescription_routes;
use shared_config::AppConfig;

pub fn create_router(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/", get(|| async { "Consultorio API is running" }))
        .nest("/patients", patient_routes(state.clone()))
        .nest("/doctors", doctor_routes(state.clone()))
        .nest("/specialties", specialty_routes(state.clone()))
        .nest("/appointments", appointment_routes(state.clone()))
        .nest("/prescriptions", prescription_routes(state.clone()))
        .nest("/billing", billing_routes(state.clone()))
        .nest("/admin", admin_routes(state))
}
