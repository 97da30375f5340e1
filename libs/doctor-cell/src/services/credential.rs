use reqwest::Method;
use serde_json::{json, Value};
use tracing::debug;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::{CreateCredentialRequest, Credential, DoctorError};

pub struct CredentialService {
    supabase: SupabaseClient,
}

impl CredentialService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    pub async fn list_for_doctor(
        &self,
        doctor_id: &str,
        auth_token: &str,
    ) -> Result<Vec<Credential>, DoctorError> {
        let path = format!(
            "/rest/v1/credentials?doctor_id=eq.{}&order=credential_type.asc",
            doctor_id
        );
        let rows: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await
            .map_err(|e| DoctorError::DatabaseError(e.to_string()))?;

        rows.into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| DoctorError::DatabaseError(e.to_string()))
    }

    pub async fn add_credential(
        &self,
        doctor_id: &str,
        request: CreateCredentialRequest,
        auth_token: &str,
    ) -> Result<Credential, DoctorError> {
        debug!(
            "Adding {} credential for doctor {}",
            request.credential_type, doctor_id
        );

        if request.number.trim().is_empty() {
            return Err(DoctorError::ValidationError(
                "Credential number must not be empty".to_string(),
            ));
        }

        let body = json!({
            "doctor_id": doctor_id,
            "credential_type": request.credential_type,
            "number": request.number,
            "issued_by": request.issued_by,
            "issued_on": request.issued_on,
            "expires_on": request.expires_on,
        });

        let rows: Vec<Value> = self
            .supabase
            .request_with_headers(
                Method::POST,
                "/rest/v1/credentials",
                Some(auth_token),
                Some(body),
                SupabaseClient::return_representation(),
            )
            .await
            .map_err(|e| DoctorError::DatabaseError(e.to_string()))?;

        let row = rows.into_iter().next().ok_or_else(|| {
            DoctorError::DatabaseError("Failed to create credential".to_string())
        })?;
        serde_json::from_value(row).map_err(|e| DoctorError::DatabaseError(e.to_string()))
    }

    pub async fn delete_credential(
        &self,
        credential_id: &str,
        auth_token: &str,
    ) -> Result<(), DoctorError> {
        let path = format!("/rest/v1/credentials?id=eq.{}", credential_id);
        let _: Value = self
            .supabase
            .request(Method::DELETE, &path, Some(auth_token), None)
            .await
            .map_err(|e| DoctorError::DatabaseError(e.to_string()))?;
        Ok(())
    }
}
