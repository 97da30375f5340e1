use reqwest::Method;
use serde_json::{json, Value};
use tracing::debug;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::{CreateSpecialtyRequest, DoctorError, Specialty, UpdateSpecialtyRequest};

pub struct SpecialtyService {
    supabase: SupabaseClient,
}

impl SpecialtyService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    pub async fn list_specialties(&self, auth_token: &str) -> Result<Vec<Specialty>, DoctorError> {
        let path = "/rest/v1/specialties?order=name.asc";
        let rows: Vec<Value> = self
            .supabase
            .request(Method::GET, path, Some(auth_token), None)
            .await
            .map_err(|e| DoctorError::DatabaseError(e.to_string()))?;

        rows.into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| DoctorError::DatabaseError(e.to_string()))
    }

    pub async fn create_specialty(
        &self,
        request: CreateSpecialtyRequest,
        auth_token: &str,
    ) -> Result<Specialty, DoctorError> {
        debug!("Creating specialty: {}", request.name);

        // Specialty names are referenced by exact match elsewhere; keep them
        // unique here since the store does not.
        let existing_path = format!(
            "/rest/v1/specialties?name=eq.{}",
            urlencoding::encode(&request.name)
        );
        let existing: Vec<Value> = self
            .supabase
            .request(Method::GET, &existing_path, Some(auth_token), None)
            .await
            .map_err(|e| DoctorError::DatabaseError(e.to_string()))?;

        if !existing.is_empty() {
            return Err(DoctorError::SpecialtyAlreadyExists { name: request.name });
        }

        let body = json!({
            "name": request.name,
            "description": request.description,
        });

        let rows: Vec<Value> = self
            .supabase
            .request_with_headers(
                Method::POST,
                "/rest/v1/specialties",
                Some(auth_token),
                Some(body),
                SupabaseClient::return_representation(),
            )
            .await
            .map_err(|e| DoctorError::DatabaseError(e.to_string()))?;

        let row = rows.into_iter().next().ok_or_else(|| {
            DoctorError::DatabaseError("Failed to create specialty".to_string())
        })?;
        serde_json::from_value(row).map_err(|e| DoctorError::DatabaseError(e.to_string()))
    }

    pub async fn update_specialty(
        &self,
        specialty_id: &str,
        request: UpdateSpecialtyRequest,
        auth_token: &str,
    ) -> Result<Specialty, DoctorError> {
        let mut fields = serde_json::Map::new();
        if let Some(name) = request.name {
            fields.insert("name".to_string(), json!(name));
        }
        if let Some(description) = request.description {
            fields.insert("description".to_string(), json!(description));
        }

        let path = format!("/rest/v1/specialties?id=eq.{}", specialty_id);
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
            .map_err(|e| DoctorError::DatabaseError(e.to_string()))?;

        let row = rows.into_iter().next().ok_or(DoctorError::SpecialtyNotFound)?;
        serde_json::from_value(row).map_err(|e| DoctorError::DatabaseError(e.to_string()))
    }

    pub async fn delete_specialty(
        &self,
        specialty_id: &str,
        auth_token: &str,
    ) -> Result<(), DoctorError> {
        let path = format!("/rest/v1/specialties?id=eq.{}", specialty_id);
        let _: Value = self
            .supabase
            .request(Method::DELETE, &path, Some(auth_token), None)
            .await
            .map_err(|e| DoctorError::DatabaseError(e.to_string()))?;
        Ok(())
    }
}
