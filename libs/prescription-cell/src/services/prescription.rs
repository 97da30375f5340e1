use chrono::Utc;
use reqwest::Method;
use serde_json::{json, Value};
use tracing::debug;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::{
    CreatePrescriptionRequest, Prescription, PrescriptionError, PrescriptionListQuery,
    UpdatePrescriptionRequest,
};

pub struct PrescriptionService {
    supabase: SupabaseClient,
}

impl PrescriptionService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    pub async fn create_prescription(
        &self,
        request: CreatePrescriptionRequest,
        auth_token: &str,
    ) -> Result<Prescription, PrescriptionError> {
        debug!(
            "Creating prescription for patient {} by doctor {}",
            request.patient_id, request.doctor_id
        );

        if request.medication.trim().is_empty() {
            return Err(PrescriptionError::ValidationError(
                "Medication must not be empty".to_string(),
            ));
        }

        let body = json!({
            "patient_id": request.patient_id,
            "doctor_id": request.doctor_id,
            "appointment_id": request.appointment_id,
            "issued_on": request.issued_on,
            "medication": request.medication,
            "dosage": request.dosage,
            "instructions": request.instructions,
            "diagnosis": request.diagnosis,
            "notes": request.notes,
            "created_at": Utc::now().to_rfc3339(),
            "updated_at": Utc::now().to_rfc3339(),
        });

        let rows: Vec<Value> = self
            .supabase
            .request_with_headers(
                Method::POST,
                "/rest/v1/prescriptions",
                Some(auth_token),
                Some(body),
                SupabaseClient::return_representation(),
            )
            .await
            .map_err(|e| PrescriptionError::DatabaseError(e.to_string()))?;

        let row = rows.into_iter().next().ok_or_else(|| {
            PrescriptionError::DatabaseError("Failed to create prescription".to_string())
        })?;
        serde_json::from_value(row).map_err(|e| PrescriptionError::DatabaseError(e.to_string()))
    }

    pub async fn get_prescription(
        &self,
        prescription_id: &str,
        auth_token: &str,
    ) -> Result<Prescription, PrescriptionError> {
        let path = format!("/rest/v1/prescriptions?id=eq.{}", prescription_id);
        let rows: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await
            .map_err(|e| PrescriptionError::DatabaseError(e.to_string()))?;

        let row = rows.into_iter().next().ok_or(PrescriptionError::NotFound)?;
        serde_json::from_value(row).map_err(|e| PrescriptionError::DatabaseError(e.to_string()))
    }

    pub async fn list_prescriptions(
        &self,
        query: &PrescriptionListQuery,
        auth_token: &str,
    ) -> Result<Vec<Prescription>, PrescriptionError> {
        debug!("Listing prescriptions with query: {:?}", query);

        let mut parts = vec![];

        if let Some(patient_id) = query.patient_id {
            parts.push(format!("patient_id=eq.{}", patient_id));
        }
        if let Some(doctor_id) = query.doctor_id {
            parts.push(format!("doctor_id=eq.{}", doctor_id));
        }
        if let Some(from) = query.from_date {
            parts.push(format!("issued_on=gte.{}", from));
        }
        if let Some(to) = query.to_date {
            parts.push(format!("issued_on=lte.{}", to));
        }

        parts.push("order=issued_on.desc".to_string());
        parts.push(format!("limit={}", query.limit.unwrap_or(100)));
        parts.push(format!("offset={}", query.offset.unwrap_or(0)));

        let path = format!("/rest/v1/prescriptions?{}", parts.join("&"));
        let rows: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await
            .map_err(|e| PrescriptionError::DatabaseError(e.to_string()))?;

        rows.into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| PrescriptionError::DatabaseError(e.to_string()))
    }

    pub async fn update_prescription(
        &self,
        prescription_id: &str,
        request: UpdatePrescriptionRequest,
        auth_token: &str,
    ) -> Result<Prescription, PrescriptionError> {
        debug!("Updating prescription: {}", prescription_id);

        let mut fields = serde_json::Map::new();
        if let Some(medication) = request.medication {
            fields.insert("medication".to_string(), json!(medication));
        }
        if let Some(dosage) = request.dosage {
            fields.insert("dosage".to_string(), json!(dosage));
        }
        if let Some(instructions) = request.instructions {
            fields.insert("instructions".to_string(), json!(instructions));
        }
        if let Some(diagnosis) = request.diagnosis {
            fields.insert("diagnosis".to_string(), json!(diagnosis));
        }
        if let Some(notes) = request.notes {
            fields.insert("notes".to_string(), json!(notes));
        }
        fields.insert("updated_at".to_string(), json!(Utc::now().to_rfc3339()));

        let path = format!("/rest/v1/prescriptions?id=eq.{}", prescription_id);
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
            .map_err(|e| PrescriptionError::DatabaseError(e.to_string()))?;

        let row = rows.into_iter().next().ok_or(PrescriptionError::NotFound)?;
        serde_json::from_value(row).map_err(|e| PrescriptionError::DatabaseError(e.to_string()))
    }

    pub async fn delete_prescription(
        &self,
        prescription_id: &str,
        auth_token: &str,
    ) -> Result<(), PrescriptionError> {
        let path = format!("/rest/v1/prescriptions?id=eq.{}", prescription_id);
        let _: Value = self
            .supabase
            .request(Method::DELETE, &path, Some(auth_token), None)
            .await
            .map_err(|e| PrescriptionError::DatabaseError(e.to_string()))?;
        Ok(())
    }
}
