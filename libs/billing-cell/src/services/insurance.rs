use reqwest::Method;
use serde_json::{json, Value};
use tracing::debug;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::{
    BillingError, CreateInsuranceProviderRequest, InsuranceProvider,
    UpdateInsuranceProviderRequest,
};

pub struct InsuranceService {
    supabase: SupabaseClient,
}

impl InsuranceService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    pub async fn list_providers(
        &self,
        auth_token: &str,
    ) -> Result<Vec<InsuranceProvider>, BillingError> {
        let path = "/rest/v1/insurance_providers?order=name.asc";
        let rows: Vec<Value> = self
            .supabase
            .request(Method::GET, path, Some(auth_token), None)
            .await
            .map_err(|e| BillingError::DatabaseError(e.to_string()))?;

        rows.into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| BillingError::DatabaseError(e.to_string()))
    }

    pub async fn get_provider(
        &self,
        provider_id: &str,
        auth_token: &str,
    ) -> Result<InsuranceProvider, BillingError> {
        let path = format!("/rest/v1/insurance_providers?id=eq.{}", provider_id);
        let rows: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await
            .map_err(|e| BillingError::DatabaseError(e.to_string()))?;

        let row = rows.into_iter().next().ok_or(BillingError::ProviderNotFound)?;
        serde_json::from_value(row).map_err(|e| BillingError::DatabaseError(e.to_string()))
    }

    pub async fn create_provider(
        &self,
        request: CreateInsuranceProviderRequest,
        auth_token: &str,
    ) -> Result<InsuranceProvider, BillingError> {
        debug!("Creating insurance provider: {}", request.name);

        if request.name.trim().is_empty() {
            return Err(BillingError::ValidationError(
                "Provider name must not be empty".to_string(),
            ));
        }

        let body = json!({
            "name": request.name,
            "acronym": request.acronym,
            "phone": request.phone,
            "email": request.email,
            "notes": request.notes,
        });

        let rows: Vec<Value> = self
            .supabase
            .request_with_headers(
                Method::POST,
                "/rest/v1/insurance_providers",
                Some(auth_token),
                Some(body),
                SupabaseClient::return_representation(),
            )
            .await
            .map_err(|e| BillingError::DatabaseError(e.to_string()))?;

        let row = rows.into_iter().next().ok_or_else(|| {
            BillingError::DatabaseError("Failed to create insurance provider".to_string())
        })?;
        serde_json::from_value(row).map_err(|e| BillingError::DatabaseError(e.to_string()))
    }

    pub async fn update_provider(
        &self,
        provider_id: &str,
        request: UpdateInsuranceProviderRequest,
        auth_token: &str,
    ) -> Result<InsuranceProvider, BillingError> {
        let mut fields = serde_json::Map::new();
        if let Some(name) = request.name {
            fields.insert("name".to_string(), json!(name));
        }
        if let Some(acronym) = request.acronym {
            fields.insert("acronym".to_string(), json!(acronym));
        }
        if let Some(phone) = request.phone {
            fields.insert("phone".to_string(), json!(phone));
        }
        if let Some(email) = request.email {
            fields.insert("email".to_string(), json!(email));
        }
        if let Some(notes) = request.notes {
            fields.insert("notes".to_string(), json!(notes));
        }

        let path = format!("/rest/v1/insurance_providers?id=eq.{}", provider_id);
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

        let row = rows.into_iter().next().ok_or(BillingError::ProviderNotFound)?;
        serde_json::from_value(row).map_err(|e| BillingError::DatabaseError(e.to_string()))
    }

    pub async fn delete_provider(
        &self,
        provider_id: &str,
        auth_token: &str,
    ) -> Result<(), BillingError> {
        let path = format!("/rest/v1/insurance_providers?id=eq.{}", provider_id);
        let _: Value = self
            .supabase
            .request(Method::DELETE, &path, Some(auth_token), None)
            .await
            .map_err(|e| BillingError::DatabaseError(e.to_string()))?;
        Ok(())
    }
}
