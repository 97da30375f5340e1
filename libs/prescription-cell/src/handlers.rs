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

use crate::models::{
    CreatePrescriptionRequest, PrescriptionError, PrescriptionListQuery,
    UpdatePrescriptionRequest,
};
use crate::services::PrescriptionService;

fn map_error(e: PrescriptionError) -> AppError {
    match e {
        PrescriptionError::NotFound => AppError::NotFound("Prescription not found".to_string()),
        PrescriptionError::ValidationError(msg) => AppError::Validation(msg),
        PrescriptionError::DatabaseError(msg) => AppError::Database(msg),
    }
}

#[axum::debug_handler]
pub async fn create_prescription(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(_user): Extension<User>,
    Json(request): Json<CreatePrescriptionRequest>,
) -> Result<Json<Value>, AppError> {
    let service = PrescriptionService::new(&config);

    let prescription = service
        .create_prescription(request, auth.token())
        .await
        .map_err(map_error)?;

    Ok(Json(json!(prescription)))
}

#[axum::debug_handler]
pub async fn get_prescription(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(_user): Extension<User>,
    Path(prescription_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let service = PrescriptionService::new(&config);

    let prescription = service
        .get_prescription(&prescription_id, auth.token())
        .await
        .map_err(map_error)?;

    Ok(Json(json!(prescription)))
}

#[axum::debug_handler]
pub async fn list_prescriptions(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(_user): Extension<User>,
    Query(query): Query<PrescriptionListQuery>,
) -> Result<Json<Value>, AppError> {
    let service = PrescriptionService::new(&config);

    let prescriptions = service
        .list_prescriptions(&query, auth.token())
        .await
        .map_err(map_error)?;

    Ok(Json(json!({
        "prescriptions": prescriptions,
        "total": prescriptions.len()
    })))
}

#[axum::debug_handler]
pub async fn update_prescription(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(_user): Extension<User>,
    Path(prescription_id): Path<String>,
    Json(request): Json<UpdatePrescriptionRequest>,
) -> Result<Json<Value>, AppError> {
    let service = PrescriptionService::new(&config);

    let prescription = service
        .update_prescription(&prescription_id, request, auth.token())
        .await
        .map_err(map_error)?;

    Ok(Json(json!(prescription)))
}

#[axum::debug_handler]
pub async fn delete_prescription(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(_user): Extension<User>,
    Path(prescription_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let service = PrescriptionService::new(&config);

    service
        .delete_prescription(&prescription_id, auth.token())
        .await
        .map_err(map_error)?;

    Ok(Json(json!({ "deleted": true })))
}
