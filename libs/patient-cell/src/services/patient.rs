use chrono::Utc;
use reqwest::Method;
use serde_json::{json, Value};
use tracing::debug;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::{
    CreatePatientRequest, Patient, PatientError, PatientSearchQuery, UpdatePatientRequest,
};

pub struct PatientService {
    supabase: SupabaseClient,
}

impl PatientService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    pub async fn create_patient(
        &self,
        request: CreatePatientRequest,
        auth_token: &str,
    ) -> Result<Patient, PatientError> {
        debug!("Creating patient record for DNI: {}", request.dni);

        if request.dni.trim().is_empty() {
            return Err(PatientError::ValidationError(
                "DNI must not be empty".to_string(),
            ));
        }

        // The store does not enforce DNI uniqueness; guard here.
        let existing_path = format!("/rest/v1/patients?dni=eq.{}", request.dni);
        let existing: Vec<Value> = self
            .supabase
            .request(Method::GET, &existing_path, Some(auth_token), None)
            .await
            .map_err(|e| PatientError::DatabaseError(e.to_string()))?;

        if !existing.is_empty() {
            return Err(PatientError::DniAlreadyExists { dni: request.dni });
        }

        let body = json!({
            "first_name": request.first_name,
            "last_name": request.last_name,
            "dni": request.dni,
            "email": request.email,
            "phone": request.phone,
            "address": request.address,
            "birth_date": request.birth_date,
            "insurance_provider_id": request.insurance_provider_id,
            "insurance_number": request.insurance_number,
            "created_at": Utc::now().to_rfc3339(),
            "updated_at": Utc::now().to_rfc3339(),
        });

        let rows: Vec<Value> = self
            .supabase
            .request_with_headers(
                Method::POST,
                "/rest/v1/patients",
                Some(auth_token),
                Some(body),
                SupabaseClient::return_representation(),
            )
            .await
            .map_err(|e| PatientError::DatabaseError(e.to_string()))?;

        let row = rows.into_iter().next().ok_or_else(|| {
            PatientError::DatabaseError("Failed to create patient record".to_string())
        })?;
        let patient: Patient =
            serde_json::from_value(row).map_err(|e| PatientError::DatabaseError(e.to_string()))?;

        debug!("Patient record created with ID: {}", patient.id);
        Ok(patient)
    }

    pub async fn get_patient(
        &self,
        patient_id: &str,
        auth_token: &str,
    ) -> Result<Patient, PatientError> {
        debug!("Fetching patient record: {}", patient_id);

        let path = format!("/rest/v1/patients?id=eq.{}", patient_id);
        let rows: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await
            .map_err(|e| PatientError::DatabaseError(e.to_string()))?;

        let row = rows.into_iter().next().ok_or(PatientError::NotFound)?;
        serde_json::from_value(row).map_err(|e| PatientError::DatabaseError(e.to_string()))
    }

    pub async fn update_patient(
        &self,
        patient_id: &str,
        request: UpdatePatientRequest,
        auth_token: &str,
    ) -> Result<Patient, PatientError> {
        debug!("Updating patient record: {}", patient_id);

        let mut fields = serde_json::Map::new();
        if let Some(first_name) = request.first_name {
            fields.insert("first_name".to_string(), json!(first_name));
        }
        if let Some(last_name) = request.last_name {
            fields.insert("last_name".to_string(), json!(last_name));
        }
        if let Some(email) = request.email {
            fields.insert("email".to_string(), json!(email));
        }
        if let Some(phone) = request.phone {
            fields.insert("phone".to_string(), json!(phone));
        }
        if let Some(address) = request.address {
            fields.insert("address".to_string(), json!(address));
        }
        if let Some(birth_date) = request.birth_date {
            fields.insert("birth_date".to_string(), json!(birth_date));
        }
        if let Some(provider_id) = request.insurance_provider_id {
            fields.insert("insurance_provider_id".to_string(), json!(provider_id));
        }
        if let Some(number) = request.insurance_number {
            fields.insert("insurance_number".to_string(), json!(number));
        }
        fields.insert("updated_at".to_string(), json!(Utc::now().to_rfc3339()));

        let path = format!("/rest/v1/patients?id=eq.{}", patient_id);
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
            .map_err(|e| PatientError::DatabaseError(e.to_string()))?;

        let row = rows.into_iter().next().ok_or(PatientError::NotFound)?;
        serde_json::from_value(row).map_err(|e| PatientError::DatabaseError(e.to_string()))
    }

    pub async fn delete_patient(
        &self,
        patient_id: &str,
        auth_token: &str,
    ) -> Result<(), PatientError> {
        debug!("Deleting patient record: {}", patient_id);

        let path = format!("/rest/v1/patients?id=eq.{}", patient_id);
        let _: Value = self
            .supabase
            .request(Method::DELETE, &path, Some(auth_token), None)
            .await
            .map_err(|e| PatientError::DatabaseError(e.to_string()))?;
        Ok(())
    }

    pub async fn search_patients(
        &self,
        query: PatientSearchQuery,
        auth_token: &str,
    ) -> Result<Vec<Patient>, PatientError> {
        debug!("Searching patients with query: {:?}", query);

        let mut parts = vec![];

        if let Some(name) = query.name {
            let term = urlencoding::encode(&name).into_owned();
            parts.push(format!(
                "or=(first_name.ilike.%{}%,last_name.ilike.%{}%)",
                term, term
            ));
        }
        if let Some(dni) = query.dni {
            parts.push(format!("dni=ilike.%{}%", urlencoding::encode(&dni)));
        }
        if let Some(provider_id) = query.insurance_provider_id {
            parts.push(format!("insurance_provider_id=eq.{}", provider_id));
        }

        parts.push("order=last_name.asc,first_name.asc".to_string());
        parts.push(format!("limit={}", query.limit.unwrap_or(50)));
        parts.push(format!("offset={}", query.offset.unwrap_or(0)));

        let path = format!("/rest/v1/patients?{}", parts.join("&"));
        let rows: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await
            .map_err(|e| PatientError::DatabaseError(e.to_string()))?;

        rows.into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| PatientError::DatabaseError(e.to_string()))
    }
}
