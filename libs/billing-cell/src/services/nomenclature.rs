use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::{
    BillingError, BulkAdjustResult, CreateNomenclatureCodeRequest, NomenclatureCode,
    NomenclatureSearchQuery, UpdateNomenclatureCodeRequest,
};

pub struct NomenclatureService {
    supabase: SupabaseClient,
}

impl NomenclatureService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    pub async fn search_codes(
        &self,
        query: NomenclatureSearchQuery,
        auth_token: &str,
    ) -> Result<Vec<NomenclatureCode>, BillingError> {
        debug!("Searching nomenclature codes with query: {:?}", query);

        let mut parts = vec![];

        if let Some(term) = query.term {
            let term = urlencoding::encode(&term).into_owned();
            parts.push(format!(
                "or=(code.ilike.%{}%,description.ilike.%{}%)",
                term, term
            ));
        }
        if let Some(chapter) = query.chapter {
            parts.push(format!("chapter=eq.{}", urlencoding::encode(&chapter)));
        }

        parts.push("order=code.asc".to_string());
        parts.push(format!("limit={}", query.limit.unwrap_or(100)));
        parts.push(format!("offset={}", query.offset.unwrap_or(0)));

        let path = format!("/rest/v1/nomenclature_codes?{}", parts.join("&"));
        let rows: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await
            .map_err(|e| BillingError::DatabaseError(e.to_string()))?;

        rows.into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| BillingError::DatabaseError(e.to_string()))
    }

    pub async fn create_code(
        &self,
        request: CreateNomenclatureCodeRequest,
        auth_token: &str,
    ) -> Result<NomenclatureCode, BillingError> {
        debug!("Creating nomenclature code: {}", request.code);

        if request.code.trim().is_empty() {
            return Err(BillingError::ValidationError(
                "Code must not be empty".to_string(),
            ));
        }
        if request.value < 0.0 {
            return Err(BillingError::ValidationError(
                "Value must not be negative".to_string(),
            ));
        }

        let body = json!({
            "code": request.code,
            "description": request.description,
            "value": request.value,
            "chapter": request.chapter,
        });

        let rows: Vec<Value> = self
            .supabase
            .request_with_headers(
                Method::POST,
                "/rest/v1/nomenclature_codes",
                Some(auth_token),
                Some(body),
                SupabaseClient::return_representation(),
            )
            .await
            .map_err(|e| BillingError::DatabaseError(e.to_string()))?;

        let row = rows.into_iter().next().ok_or_else(|| {
            BillingError::DatabaseError("Failed to create nomenclature code".to_string())
        })?;
        serde_json::from_value(row).map_err(|e| BillingError::DatabaseError(e.to_string()))
    }

    pub async fn update_code(
        &self,
        code_id: &str,
        request: UpdateNomenclatureCodeRequest,
        auth_token: &str,
    ) -> Result<NomenclatureCode, BillingError> {
        let mut fields = serde_json::Map::new();
        if let Some(code) = request.code {
            fields.insert("code".to_string(), json!(code));
        }
        if let Some(description) = request.description {
            fields.insert("description".to_string(), json!(description));
        }
        if let Some(value) = request.value {
            fields.insert("value".to_string(), json!(value));
        }
        if let Some(chapter) = request.chapter {
            fields.insert("chapter".to_string(), json!(chapter));
        }

        let path = format!("/rest/v1/nomenclature_codes?id=eq.{}", code_id);
        let rows: Vec<Value> = self
            .supabase
            .request_with_headers(
                Method::PATCH,
                &path,
                Some(auth_token),
                Some(Value::Object(fields)),
                SupabaseClient::return_representation(),
            )
            .await
            .map_err(|e| BillingError::DatabaseError(e.to_string()))?;

        let row = rows.into_iter().next().ok_or(BillingError::CodeNotFound)?;
        serde_json::from_value(row).map_err(|e| BillingError::DatabaseError(e.to_string()))
    }

    pub async fn delete_code(&self, code_id: &str, auth_token: &str) -> Result<(), BillingError> {
        let path = format!("/rest/v1/nomenclature_codes?id=eq.{}", code_id);
        let _: Value = self
            .supabase
            .request(Method::DELETE, &path, Some(auth_token), None)
            .await
            .map_err(|e| BillingError::DatabaseError(e.to_string()))?;
        Ok(())
    }

    /// Apply a percentage to every code's value. The store exposes no bulk
    /// arithmetic, so this walks the rows sequentially and reports how far it
    /// got if a write fails; already-written rows are left in place for the
    /// operator to re-run or revert.
    pub async fn adjust_values(
        &self,
        percentage: f64,
        auth_token: &str,
    ) -> Result<BulkAdjustResult, BillingError> {
        if !percentage.is_finite() {
            return Err(BillingError::ValidationError(
                "Percentage must be a finite number".to_string(),
            ));
        }
        if percentage <= -100.0 {
            return Err(BillingError::ValidationError(
                "Percentage would make values negative".to_string(),
            ));
        }

        let codes: Vec<NomenclatureCode> = {
            let path = "/rest/v1/nomenclature_codes?order=code.asc";
            let rows: Vec<Value> = self
                .supabase
                .request(Method::GET, path, Some(auth_token), None)
                .await
                .map_err(|e| BillingError::DatabaseError(e.to_string()))?;
            rows.into_iter()
                .map(serde_json::from_value)
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| BillingError::DatabaseError(e.to_string()))?
        };

        let total = codes.len();
        let factor = 1.0 + percentage / 100.0;
        let mut updated = 0usize;

        info!(
            "Adjusting {} nomenclature codes by {:.2}%",
            total, percentage
        );

        for code in codes {
            let new_value = (code.value * factor * 100.0).round() / 100.0;
            let path = format!("/rest/v1/nomenclature_codes?id=eq.{}", code.id);
            let body = json!({ "value": new_value });

            let result: Result<Value, _> = self
                .supabase
                .request(Method::PATCH, &path, Some(auth_token), Some(body))
                .await;

            if let Err(e) = result {
                warn!(
                    "Bulk adjustment stopped at code {} after {} of {} updates: {}",
                    code.code, updated, total, e
                );
                return Err(BillingError::BulkAdjustAborted {
                    updated,
                    total,
                    message: e.to_string(),
                });
            }
            updated += 1;
        }

        info!("Bulk adjustment complete: {} rows updated", updated);
        Ok(BulkAdjustResult {
            total,
            updated,
            percentage,
        })
    }
}
