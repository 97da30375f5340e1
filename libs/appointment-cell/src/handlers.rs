use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query, State},
    Json,
};
use axum_extra::TypedHeader;
use headers::{authorization::Bearer, Authorization};
use serde_json::{json, Value};

use shared_config::AppConfig;
use shared_models::auth::User;
use shared_models::error::AppError;

use crate::filter::{self, FilterCriteria};
use crate::models::{
    AppointmentError, AppointmentListQuery, CancelAppointmentRequest, CreateAppointmentRequest,
    UpdateAppointmentRequest,
};
use crate::services::AppointmentService;
use crate::stats;

fn map_error(e: AppointmentError) -> AppError {
    match e {
        AppointmentError::NotFound => AppError::NotFound("Appointment not found".to_string()),
        AppointmentError::ValidationError(msg) => AppError::Validation(msg),
        AppointmentError::DatabaseError(msg) => AppError::Database(msg),
    }
}

#[axum::debug_handler]
pub async fn list_appointments(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(_user): Extension<User>,
    Query(query): Query<AppointmentListQuery>,
) -> Result<Json<Value>, AppError> {
    let service = AppointmentService::new(&config);

    let appointments = service.list(&query, auth.token()).await.map_err(map_error)?;

    Ok(Json(json!({
        "appointments": appointments,
        "total": appointments.len()
    })))
}

/// The board view: full denormalized snapshot narrowed in memory by the
/// filter engine, with dashboard statistics computed over the unfiltered
/// snapshot.
#[axum::debug_handler]
pub async fn appointment_board(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(_user): Extension<User>,
    Query(criteria): Query<FilterCriteria>,
) -> Result<Json<Value>, AppError> {
    let service = AppointmentService::new(&config);

    let snapshot = service.board_snapshot(auth.token()).await.map_err(map_error)?;
    let stats = stats::summarize(&snapshot);
    let filtered = filter::apply(Some(&snapshot), &criteria);

    Ok(Json(json!({
        "appointments": filtered,
        "total": filtered.len(),
        "stats": stats
    })))
}

#[axum::debug_handler]
pub async fn dashboard_stats(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(_user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let service = AppointmentService::new(&config);

    let snapshot = service.board_snapshot(auth.token()).await.map_err(map_error)?;

    Ok(Json(json!(stats::summarize(&snapshot))))
}

#[axum::debug_handler]
pub async fn get_appointment(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(_user): Extension<User>,
    Path(appointment_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let service = AppointmentService::new(&config);

    let appointment = service
        .get(&appointment_id, auth.token())
        .await
        .map_err(map_error)?;

    Ok(Json(json!(appointment)))
}

#[axum::debug_handler]
pub async fn create_appointment(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(_user): Extension<User>,
    Json(request): Json<CreateAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    let service = AppointmentService::new(&config);

    let appointment = service
        .create(request, auth.token())
        .await
        .map_err(map_error)?;

    Ok(Json(json!(appointment)))
}

#[axum::debug_handler]
pub async fn update_appointment(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(_user): Extension<User>,
    Path(appointment_id): Path<String>,
    Json(request): Json<UpdateAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    let service = AppointmentService::new(&config);

    let appointment = service
        .update(&appointment_id, request, auth.token())
        .await
        .map_err(map_error)?;

    Ok(Json(json!(appointment)))
}

#[axum::debug_handler]
pub async fn cancel_appointment(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(_user): Extension<User>,
    Path(appointment_id): Path<String>,
    Json(request): Json<CancelAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    let service = AppointmentService::new(&config);

    let appointment = service
        .cancel(&appointment_id, request.reason, auth.token())
        .await
        .map_err(map_error)?;

    Ok(Json(json!(appointment)))
}

#[axum::debug_handler]
pub async fn delete_appointment(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(_user): Extension<User>,
    Path(appointment_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let service = AppointmentService::new(&config);

    service
        .delete(&appointment_id, auth.token())
        .await
        .map_err(map_error)?;

    Ok(Json(json!({ "deleted": true })))
}
