use chrono::Utc;
use reqwest::Method;
use serde_json::{json, Value};
use tracing::debug;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::{
    Appointment, AppointmentError, AppointmentListQuery, AppointmentStatus,
    CreateAppointmentRequest, UpdateAppointmentRequest,
};

/// Nested embed so every read comes back denormalized with the patient and
/// doctor names the board and the filter engine work on.
const NESTED_SELECT: &str = "select=*,patient:patients(first_name,last_name,dni),doctor:doctors(first_name,last_name,specialty:specialties(name))";

pub struct AppointmentService {
    supabase: SupabaseClient,
}

impl AppointmentService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    /// Server-side narrowed listing, ordered by schedule slot.
    pub async fn list(
        &self,
        query: &AppointmentListQuery,
        auth_token: &str,
    ) -> Result<Vec<Appointment>, AppointmentError> {
        debug!("Listing appointments with query: {:?}", query);

        let mut parts = vec![NESTED_SELECT.to_string()];

        if let Some(patient_id) = query.patient_id {
            parts.push(format!("patient_id=eq.{}", patient_id));
        }
        if let Some(doctor_id) = query.doctor_id {
            parts.push(format!("doctor_id=eq.{}", doctor_id));
        }
        if let Some(status) = query.status {
            parts.push(format!("status=eq.{}", status));
        }
        if let Some(from) = query.from_date {
            parts.push(format!("date=gte.{}", from));
        }
        if let Some(to) = query.to_date {
            parts.push(format!("date=lte.{}", to));
        }

        parts.push("order=date.asc,time.asc".to_string());
        parts.push(format!("limit={}", query.limit.unwrap_or(500)));
        if let Some(offset) = query.offset {
            parts.push(format!("offset={}", offset));
        }

        let path = format!("/rest/v1/appointments?{}", parts.join("&"));
        let rows: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await
            .map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        rows.into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| AppointmentError::DatabaseError(e.to_string()))
    }

    /// The full denormalized snapshot the board view and the dashboard
    /// statistics are computed from.
    pub async fn board_snapshot(
        &self,
        auth_token: &str,
    ) -> Result<Vec<Appointment>, AppointmentError> {
        self.list(&AppointmentListQuery::default(), auth_token).await
    }

    pub async fn get(
        &self,
        appointment_id: &str,
        auth_token: &str,
    ) -> Result<Appointment, AppointmentError> {
        let path = format!(
            "/rest/v1/appointments?id=eq.{}&{}",
            appointment_id, NESTED_SELECT
        );
        let rows: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await
            .map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        let row = rows.into_iter().next().ok_or(AppointmentError::NotFound)?;
        serde_json::from_value(row).map_err(|e| AppointmentError::DatabaseError(e.to_string()))
    }

    pub async fn create(
        &self,
        request: CreateAppointmentRequest,
        auth_token: &str,
    ) -> Result<Appointment, AppointmentError> {
        debug!(
            "Creating appointment for patient {} with doctor {} on {}",
            request.patient_id, request.doctor_id, request.date
        );

        let body = json!({
            "patient_id": request.patient_id,
            "doctor_id": request.doctor_id,
            "date": request.date,
            "time": request.time,
            "status": AppointmentStatus::Scheduled,
            "reason": request.reason,
            "notes": request.notes,
            "created_at": Utc::now().to_rfc3339(),
            "updated_at": Utc::now().to_rfc3339(),
        });

        let rows: Vec<Value> = self
            .supabase
            .request_with_headers(
                Method::POST,
                "/rest/v1/appointments",
                Some(auth_token),
                Some(body),
                SupabaseClient::return_representation(),
            )
            .await
            .map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        let row = rows.into_iter().next().ok_or_else(|| {
            AppointmentError::DatabaseError("Failed to create appointment".to_string())
        })?;
        serde_json::from_value(row).map_err(|e| AppointmentError::DatabaseError(e.to_string()))
    }

    pub async fn update(
        &self,
        appointment_id: &str,
        request: UpdateAppointmentRequest,
        auth_token: &str,
    ) -> Result<Appointment, AppointmentError> {
        debug!("Updating appointment: {}", appointment_id);

        let mut fields = serde_json::Map::new();
        if let Some(status) = request.status {
            fields.insert("status".to_string(), json!(status));
        }
        if let Some(date) = request.date {
            fields.insert("date".to_string(), json!(date));
        }
        if let Some(time) = request.time {
            fields.insert("time".to_string(), json!(time));
        }
        if let Some(reason) = request.reason {
            fields.insert("reason".to_string(), json!(reason));
        }
        if let Some(notes) = request.notes {
            fields.insert("notes".to_string(), json!(notes));
        }
        fields.insert("updated_at".to_string(), json!(Utc::now().to_rfc3339()));

        self.patch(appointment_id, Value::Object(fields), auth_token)
            .await
    }

    /// Cancellation is a plain status update; the store keeps the history.
    pub async fn cancel(
        &self,
        appointment_id: &str,
        reason: Option<String>,
        auth_token: &str,
    ) -> Result<Appointment, AppointmentError> {
        debug!("Cancelling appointment: {}", appointment_id);

        let mut fields = serde_json::Map::new();
        fields.insert("status".to_string(), json!(AppointmentStatus::Cancelled));
        if let Some(reason) = reason {
            fields.insert("reason".to_string(), json!(reason));
        }
        fields.insert("updated_at".to_string(), json!(Utc::now().to_rfc3339()));

        self.patch(appointment_id, Value::Object(fields), auth_token)
            .await
    }

    pub async fn delete(
        &self,
        appointment_id: &str,
        auth_token: &str,
    ) -> Result<(), AppointmentError> {
        let path = format!("/rest/v1/appointments?id=eq.{}", appointment_id);
        let _: Value = self
            .supabase
            .request(Method::DELETE, &path, Some(auth_token), None)
            .await
            .map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;
        Ok(())
    }

    async fn patch(
        &self,
        appointment_id: &str,
        fields: Value,
        auth_token: &str,
    ) -> Result<Appointment, AppointmentError> {
        let path = format!("/rest/v1/appointments?id=eq.{}", appointment_id);
        let rows: Vec<Value> = self
            .supabase
            .request_with_headers(
                Method::PATCH,
                &path,
                Some(auth_token),
                Some(fields),
                SupabaseClient::return_representation(),
            )
            .await
            .map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        let row = rows.into_iter().next().ok_or(AppointmentError::NotFound)?;
        serde_json::from_value(row).map_err(|e| AppointmentError::DatabaseError(e.to_string()))
    }
}
