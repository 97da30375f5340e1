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
    CreateCredentialRequest, CreateDoctorRequest, CreateSpecialtyRequest, DoctorError,
    DoctorSearchQuery, UpdateDoctorRequest, UpdateSpecialtyRequest,
};
use crate::services::{CredentialService, DoctorService, SpecialtyService};

fn map_error(e: DoctorError) -> AppError {
    match e {
        DoctorError::NotFound => AppError::NotFound("Doctor not found".to_string()),
        DoctorError::SpecialtyNotFound => AppError::NotFound("Specialty not found".to_string()),
        DoctorError::CredentialNotFound => AppError::NotFound("Credential not found".to_string()),
        DoctorError::SpecialtyAlreadyExists { name } => {
            AppError::Conflict(format!("Specialty {} already exists", name))
        }
        DoctorError::ValidationError(msg) => AppError::Validation(msg),
        DoctorError::DatabaseError(msg) => AppError::Database(msg),
    }
}

// ==============================================================================
// DOCTOR HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn create_doctor(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(_user): Extension<User>,
    Json(request): Json<CreateDoctorRequest>,
) -> Result<Json<Value>, AppError> {
    let service = DoctorService::new(&config);

    let doctor = service
        .create_doctor(request, auth.token())
        .await
        .map_err(map_error)?;

    Ok(Json(json!(doctor)))
}

#[axum::debug_handler]
pub async fn get_doctor(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(_user): Extension<User>,
    Path(doctor_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let service = DoctorService::new(&config);

    let doctor = service
        .get_doctor(&doctor_id, auth.token())
        .await
        .map_err(map_error)?;

    Ok(Json(json!(doctor)))
}

#[axum::debug_handler]
pub async fn update_doctor(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(_user): Extension<User>,
    Path(doctor_id): Path<String>,
    Json(request): Json<UpdateDoctorRequest>,
) -> Result<Json<Value>, AppError> {
    let service = DoctorService::new(&config);

    let doctor = service
        .update_doctor(&doctor_id, request, auth.token())
        .await
        .map_err(map_error)?;

    Ok(Json(json!(doctor)))
}

#[axum::debug_handler]
pub async fn delete_doctor(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(_user): Extension<User>,
    Path(doctor_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let service = DoctorService::new(&config);

    service
        .delete_doctor(&doctor_id, auth.token())
        .await
        .map_err(map_error)?;

    Ok(Json(json!({ "deleted": true })))
}

#[axum::debug_handler]
pub async fn search_doctors(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(_user): Extension<User>,
    Query(query): Query<DoctorSearchQuery>,
) -> Result<Json<Value>, AppError> {
    let service = DoctorService::new(&config);

    let doctors = service
        .search_doctors(query, auth.token())
        .await
        .map_err(map_error)?;

    Ok(Json(json!({
        "doctors": doctors,
        "total": doctors.len()
    })))
}

// ==============================================================================
// SPECIALTY HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn list_specialties(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(_user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let service = SpecialtyService::new(&config);

    let specialties = service
        .list_specialties(auth.token())
        .await
        .map_err(map_error)?;

    Ok(Json(json!({
        "specialties": specialties,
        "total": specialties.len()
    })))
}

#[axum::debug_handler]
pub async fn create_specialty(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(_user): Extension<User>,
    Json(request): Json<CreateSpecialtyRequest>,
) -> Result<Json<Value>, AppError> {
    let service = SpecialtyService::new(&config);

    let specialty = service
        .create_specialty(request, auth.token())
        .await
        .map_err(map_error)?;

    Ok(Json(json!(specialty)))
}

#[axum::debug_handler]
pub async fn update_specialty(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(_user): Extension<User>,
    Path(specialty_id): Path<String>,
    Json(request): Json<UpdateSpecialtyRequest>,
) -> Result<Json<Value>, AppError> {
    let service = SpecialtyService::new(&config);

    let specialty = service
        .update_specialty(&specialty_id, request, auth.token())
        .await
        .map_err(map_error)?;

    Ok(Json(json!(specialty)))
}

#[axum::debug_handler]
pub async fn delete_specialty(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(_user): Extension<User>,
    Path(specialty_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let service = SpecialtyService::new(&config);

    service
        .delete_specialty(&specialty_id, auth.token())
        .await
        .map_err(map_error)?;

    Ok(Json(json!({ "deleted": true })))
}

// ==============================================================================
// CREDENTIAL HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn list_doctor_credentials(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(_user): Extension<User>,
    Path(doctor_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let service = CredentialService::new(&config);

    let credentials = service
        .list_for_doctor(&doctor_id, auth.token())
        .await
        .map_err(map_error)?;

    Ok(Json(json!({
        "credentials": credentials,
        "total": credentials.len()
    })))
}

#[axum::debug_handler]
pub async fn add_doctor_credential(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(_user): Extension<User>,
    Path(doctor_id): Path<String>,
    Json(request): Json<CreateCredentialRequest>,
) -> Result<Json<Value>, AppError> {
    let service = CredentialService::new(&config);

    let credential = service
        .add_credential(&doctor_id, request, auth.token())
        .await
        .map_err(map_error)?;

    Ok(Json(json!(credential)))
}

#[axum::debug_handler]
pub async fn delete_credential(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(_user): Extension<User>,
    Path(credential_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let service = CredentialService::new(&config);

    service
        .delete_credential(&credential_id, auth.token())
        .await
        .map_err(map_error)?;

    Ok(Json(json!({ "deleted": true })))
}
