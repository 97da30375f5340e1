use chrono::Utc;
use reqwest::Method;
use serde_json::{json, Value};
use tracing::debug;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::{
    CreateDoctorRequest, Doctor, DoctorError, DoctorSearchQuery, UpdateDoctorRequest,
};

/// Embed the specialty name so listings match what the appointment board
/// shows for each doctor.
const DOCTOR_SELECT: &str = "select=*,specialty:specialties(name)";

pub struct DoctorService {
    supabase: SupabaseClient,
}

impl DoctorService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    pub async fn create_doctor(
        &self,
        request: CreateDoctorRequest,
        auth_token: &str,
    ) -> Result<Doctor, DoctorError> {
        debug!("Creating doctor record for: {}", request.email);

        let body = json!({
            "first_name": request.first_name,
            "last_name": request.last_name,
            "email": request.email,
            "phone": request.phone,
            "license_number": request.license_number,
            "specialty_id": request.specialty_id,
            "active": true,
            "created_at": Utc::now().to_rfc3339(),
            "updated_at": Utc::now().to_rfc3339(),
        });

        let rows: Vec<Value> = self
            .supabase
            .request_with_headers(
                Method::POST,
                "/rest/v1/doctors",
                Some(auth_token),
                Some(body),
                SupabaseClient::return_representation(),
            )
            .await
            .map_err(|e| DoctorError::DatabaseError(e.to_string()))?;

        let row = rows.into_iter().next().ok_or_else(|| {
            DoctorError::DatabaseError("Failed to create doctor record".to_string())
        })?;
        serde_json::from_value(row).map_err(|e| DoctorError::DatabaseError(e.to_string()))
    }

    pub async fn get_doctor(
        &self,
        doctor_id: &str,
        auth_token: &str,
    ) -> Result<Doctor, DoctorError> {
        let path = format!("/rest/v1/doctors?id=eq.{}&{}", doctor_id, DOCTOR_SELECT);
        let rows: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await
            .map_err(|e| DoctorError::DatabaseError(e.to_string()))?;

        let row = rows.into_iter().next().ok_or(DoctorError::NotFound)?;
        serde_json::from_value(row).map_err(|e| DoctorError::DatabaseError(e.to_string()))
    }

    pub async fn update_doctor(
        &self,
        doctor_id: &str,
        request: UpdateDoctorRequest,
        auth_token: &str,
    ) -> Result<Doctor, DoctorError> {
        debug!("Updating doctor record: {}", doctor_id);

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
        if let Some(license_number) = request.license_number {
            fields.insert("license_number".to_string(), json!(license_number));
        }
        if let Some(specialty_id) = request.specialty_id {
            fields.insert("specialty_id".to_string(), json!(specialty_id));
        }
        if let Some(active) = request.active {
            fields.insert("active".to_string(), json!(active));
        }
        fields.insert("updated_at".to_string(), json!(Utc::now().to_rfc3339()));

        let path = format!("/rest/v1/doctors?id=eq.{}", doctor_id);
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

        let row = rows.into_iter().next().ok_or(DoctorError::NotFound)?;
        serde_json::from_value(row).map_err(|e| DoctorError::DatabaseError(e.to_string()))
    }

    pub async fn delete_doctor(
        &self,
        doctor_id: &str,
        auth_token: &str,
    ) -> Result<(), DoctorError> {
        let path = format!("/rest/v1/doctors?id=eq.{}", doctor_id);
        let _: Value = self
            .supabase
            .request(Method::DELETE, &path, Some(auth_token), None)
            .await
            .map_err(|e| DoctorError::DatabaseError(e.to_string()))?;
        Ok(())
    }

    pub async fn search_doctors(
        &self,
        query: DoctorSearchQuery,
        auth_token: &str,
    ) -> Result<Vec<Doctor>, DoctorError> {
        debug!("Searching doctors with query: {:?}", query);

        let mut parts = vec![DOCTOR_SELECT.to_string()];

        if let Some(name) = query.name {
            let term = urlencoding::encode(&name).into_owned();
            parts.push(format!(
                "or=(first_name.ilike.%{}%,last_name.ilike.%{}%)",
                term, term
            ));
        }
        if let Some(specialty_id) = query.specialty_id {
            parts.push(format!("specialty_id=eq.{}", specialty_id));
        }
        if query.active_only.unwrap_or(false) {
            parts.push("active=eq.true".to_string());
        }

        parts.push("order=last_name.asc,first_name.asc".to_string());
        parts.push(format!("limit={}", query.limit.unwrap_or(50)));
        parts.push(format!("offset={}", query.offset.unwrap_or(0)));

        let path = format!("/rest/v1/doctors?{}", parts.join("&"));
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
}
