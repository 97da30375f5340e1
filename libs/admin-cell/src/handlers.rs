use std::sync::Arc;

use axum::{
    extract::{Extension, Query, State},
    Json,
};
use axum_extra::TypedHeader;
use headers::{authorization::Bearer, Authorization};
use serde_json::{json, Value};
use tracing::warn;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::auth::User;
use shared_models::error::AppError;
use shared_utils::extractor::require_role;

use crate::models::{AdminError, AuditListQuery, CreateUserRequest, RecordAuditRequest};
use crate::services::{AuditService, UserProvisioningService};

fn map_error(e: AdminError) -> AppError {
    match e {
        AdminError::InvalidEmail | AdminError::WeakPassword => {
            AppError::Validation(e.to_string())
        }
        AdminError::InvalidRole(_) => AppError::Validation(e.to_string()),
        AdminError::EmailAlreadyExists { .. } => AppError::Conflict(e.to_string()),
        AdminError::AuthCreateFailed(_) => AppError::Upstream(e.to_string()),
        AdminError::ProfileCreateFailed(_) | AdminError::RollbackFailed { .. } => {
            AppError::Internal(e.to_string())
        }
        AdminError::DatabaseError(msg) => AppError::Database(msg),
    }
}

/// Privileged: creates the auth user and the matching profile row, rolling
/// the auth user back if the second step fails.
#[axum::debug_handler]
pub async fn create_user(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Json(request): Json<CreateUserRequest>,
) -> Result<Json<Value>, AppError> {
    require_role(&user, "admin")?;

    let service = UserProvisioningService::new(&config);
    let profile = service.create_user(request).await.map_err(map_error)?;

    // The trail should not fail the provisioning that already happened.
    let audit = AuditService::new(&config);
    let entry = RecordAuditRequest {
        action: "user.create".to_string(),
        entity: "profiles".to_string(),
        entity_id: Some(profile.id.to_string()),
        detail: Some(format!("role={}", profile.role)),
    };
    if let Err(e) = audit
        .record(Uuid::parse_str(&user.id).ok(), entry, auth.token())
        .await
    {
        warn!("Failed to record audit entry for user creation: {}", e);
    }

    Ok(Json(json!({
        "success": true,
        "user": profile
    })))
}

#[axum::debug_handler]
pub async fn list_users(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    require_role(&user, "admin")?;

    let service = UserProvisioningService::new(&config);
    let users = service.list_users(auth.token()).await.map_err(map_error)?;

    Ok(Json(json!({
        "users": users,
        "total": users.len()
    })))
}

#[axum::debug_handler]
pub async fn record_audit_entry(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Json(request): Json<RecordAuditRequest>,
) -> Result<Json<Value>, AppError> {
    let service = AuditService::new(&config);

    let entry = service
        .record(Uuid::parse_str(&user.id).ok(), request, auth.token())
        .await
        .map_err(map_error)?;

    Ok(Json(json!(entry)))
}

#[axum::debug_handler]
pub async fn list_audit_entries(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Query(query): Query<AuditListQuery>,
) -> Result<Json<Value>, AppError> {
    require_role(&user, "admin")?;

    let service = AuditService::new(&config);
    let entries = service.list(&query, auth.token()).await.map_err(map_error)?;

    Ok(Json(json!({
        "entries": entries,
        "total": entries.len()
    })))
}
