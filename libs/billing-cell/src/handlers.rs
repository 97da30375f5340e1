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
use shared_utils::extractor::require_role;

use crate::models::{
    BillingError, BulkAdjustRequest, CreateInsuranceProviderRequest,
    CreateNomenclatureCodeRequest, NomenclatureSearchQuery, UpdateInsuranceProviderRequest,
    UpdateNomenclatureCodeRequest,
};
use crate::services::{InsuranceService, NomenclatureService};

fn map_error(e: BillingError) -> AppError {
    match e {
        BillingError::ProviderNotFound => {
            AppError::NotFound("Insurance provider not found".to_string())
        }
        BillingError::CodeNotFound => {
            AppError::NotFound("Nomenclature code not found".to_string())
        }
        BillingError::ValidationError(msg) => AppError::Validation(msg),
        e @ BillingError::BulkAdjustAborted { .. } => AppError::Database(e.to_string()),
        BillingError::DatabaseError(msg) => AppError::Database(msg),
    }
}

// ==============================================================================
// INSURANCE PROVIDER HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn list_providers(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(_user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let service = InsuranceService::new(&config);

    let providers = service.list_providers(auth.token()).await.map_err(map_error)?;

    Ok(Json(json!({
        "providers": providers,
        "total": providers.len()
    })))
}

#[axum::debug_handler]
pub async fn get_provider(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(_user): Extension<User>,
    Path(provider_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let service = InsuranceService::new(&config);

    let provider = service
        .get_provider(&provider_id, auth.token())
        .await
        .map_err(map_error)?;

    Ok(Json(json!(provider)))
}

#[axum::debug_handler]
pub async fn create_provider(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(_user): Extension<User>,
    Json(request): Json<CreateInsuranceProviderRequest>,
) -> Result<Json<Value>, AppError> {
    let service = InsuranceService::new(&config);

    let provider = service
        .create_provider(request, auth.token())
        .await
        .map_err(map_error)?;

    Ok(Json(json!(provider)))
}

#[axum::debug_handler]
pub async fn update_provider(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(_user): Extension<User>,
    Path(provider_id): Path<String>,
    Json(request): Json<UpdateInsuranceProviderRequest>,
) -> Result<Json<Value>, AppError> {
    let service = InsuranceService::new(&config);

    let provider = service
        .update_provider(&provider_id, request, auth.token())
        .await
        .map_err(map_error)?;

    Ok(Json(json!(provider)))
}

#[axum::debug_handler]
pub async fn delete_provider(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(_user): Extension<User>,
    Path(provider_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let service = InsuranceService::new(&config);

    service
        .delete_provider(&provider_id, auth.token())
        .await
        .map_err(map_error)?;

    Ok(Json(json!({ "deleted": true })))
}

// ==============================================================================
// NOMENCLATURE CODE HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn search_codes(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(_user): Extension<User>,
    Query(query): Query<NomenclatureSearchQuery>,
) -> Result<Json<Value>, AppError> {
    let service = NomenclatureService::new(&config);

    let codes = service
        .search_codes(query, auth.token())
        .await
        .map_err(map_error)?;

    Ok(Json(json!({
        "codes": codes,
        "total": codes.len()
    })))
}

#[axum::debug_handler]
pub async fn create_code(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(_user): Extension<User>,
    Json(request): Json<CreateNomenclatureCodeRequest>,
) -> Result<Json<Value>, AppError> {
    let service = NomenclatureService::new(&config);

    let code = service
        .create_code(request, auth.token())
        .await
        .map_err(map_error)?;

    Ok(Json(json!(code)))
}

#[axum::debug_handler]
pub async fn update_code(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(_user): Extension<User>,
    Path(code_id): Path<String>,
    Json(request): Json<UpdateNomenclatureCodeRequest>,
) -> Result<Json<Value>, AppError> {
    let service = NomenclatureService::new(&config);

    let code = service
        .update_code(&code_id, request, auth.token())
        .await
        .map_err(map_error)?;

    Ok(Json(json!(code)))
}

#[axum::debug_handler]
pub async fn delete_code(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(_user): Extension<User>,
    Path(code_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let service = NomenclatureService::new(&config);

    service
        .delete_code(&code_id, auth.token())
        .await
        .map_err(map_error)?;

    Ok(Json(json!({ "deleted": true })))
}

/// Privileged bulk tariff adjustment. Only administrators may re-price the
/// whole nomenclature.
#[axum::debug_handler]
pub async fn adjust_code_values(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Json(request): Json<BulkAdjustRequest>,
) -> Result<Json<Value>, AppError> {
    require_role(&user, "admin")?;

    let service = NomenclatureService::new(&config);

    let result = service
        .adjust_values(request.percentage, auth.token())
        .await
        .map_err(map_error)?;

    Ok(Json(json!({
        "success": true,
        "result": result
    })))
}
