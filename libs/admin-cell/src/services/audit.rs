use chrono::Utc;
use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, info};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::{AdminError, AuditListQuery, AuditLogEntry, RecordAuditRequest};

/// Append-only trail of administrative actions. Entries go straight to the
/// store and are mirrored to structured logging so operators see them without
/// querying the table.
pub struct AuditService {
    supabase: SupabaseClient,
}

impl AuditService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    pub async fn record(
        &self,
        user_id: Option<Uuid>,
        request: RecordAuditRequest,
        auth_token: &str,
    ) -> Result<AuditLogEntry, AdminError> {
        info!(
            user_id = ?user_id,
            entity = %request.entity,
            entity_id = ?request.entity_id,
            "AUDIT: {}",
            request.action
        );

        let body = json!({
            "user_id": user_id,
            "action": request.action,
            "entity": request.entity,
            "entity_id": request.entity_id,
            "detail": request.detail,
            "created_at": Utc::now().to_rfc3339(),
        });

        let rows: Vec<Value> = self
            .supabase
            .request_with_headers(
                Method::POST,
                "/rest/v1/audit_logs",
                Some(auth_token),
                Some(body),
                SupabaseClient::return_representation(),
            )
            .await
            .map_err(|e| AdminError::DatabaseError(e.to_string()))?;

        let row = rows.into_iter().next().ok_or_else(|| {
            AdminError::DatabaseError("Failed to record audit entry".to_string())
        })?;
        serde_json::from_value(row).map_err(|e| AdminError::DatabaseError(e.to_string()))
    }

    pub async fn list(
        &self,
        query: &AuditListQuery,
        auth_token: &str,
    ) -> Result<Vec<AuditLogEntry>, AdminError> {
        debug!("Listing audit entries with query: {:?}", query);

        let mut parts = vec![];

        if let Some(user_id) = query.user_id {
            parts.push(format!("user_id=eq.{}", user_id));
        }
        if let Some(entity) = &query.entity {
            parts.push(format!("entity=eq.{}", urlencoding::encode(entity)));
        }
        if let Some(action) = &query.action {
            parts.push(format!("action=eq.{}", urlencoding::encode(action)));
        }

        parts.push("order=created_at.desc".to_string());
        parts.push(format!("limit={}", query.limit.unwrap_or(100)));
        parts.push(format!("offset={}", query.offset.unwrap_or(0)));

        let path = format!("/rest/v1/audit_logs?{}", parts.join("&"));
        let rows: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await
            .map_err(|e| AdminError::DatabaseError(e.to_string()))?;

        rows.into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| AdminError::DatabaseError(e.to_string()))
    }
}
