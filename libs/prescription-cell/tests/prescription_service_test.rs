use assert_matches::assert_matches;
use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use prescription_cell::models::{
    CreatePrescriptionRequest, PrescriptionError, PrescriptionListQuery,
};
use prescription_cell::services::PrescriptionService;
use shared_utils::test_utils::TestConfig;

const TOKEN: &str = "test-user-token";

fn prescription_row(id: &str, patient_id: &str) -> serde_json::Value {
    json!({
        "id": id,
        "patient_id": patient_id,
        "doctor_id": Uuid::new_v4().to_string(),
        "appointment_id": null,
        "issued_on": "2024-03-15",
        "medication": "Amoxicilina 500mg",
        "dosage": "1 comprimido cada 8 horas",
        "instructions": "Durante 7 días",
        "diagnosis": null,
        "notes": null,
        "created_at": "2024-03-15T10:00:00Z",
        "updated_at": "2024-03-15T10:00:00Z"
    })
}

#[tokio::test]
async fn create_prescription_rejects_blank_medication() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_url(&mock_server.uri()).to_app_config();
    let service = PrescriptionService::new(&config);

    let request = CreatePrescriptionRequest {
        patient_id: Uuid::new_v4(),
        doctor_id: Uuid::new_v4(),
        appointment_id: None,
        issued_on: "2024-03-15".parse().unwrap(),
        medication: "   ".to_string(),
        dosage: "1 comprimido".to_string(),
        instructions: None,
        diagnosis: None,
        notes: None,
    };

    let result = service.create_prescription(request, TOKEN).await;
    assert_matches!(result, Err(PrescriptionError::ValidationError(_)));
}

#[tokio::test]
async fn list_filters_by_patient() {
    let mock_server = MockServer::start().await;
    let patient_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/prescriptions"))
        .and(query_param("patient_id", format!("eq.{}", patient_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            prescription_row(&Uuid::new_v4().to_string(), &patient_id.to_string())
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = TestConfig::with_url(&mock_server.uri()).to_app_config();
    let service = PrescriptionService::new(&config);

    let query = PrescriptionListQuery {
        patient_id: Some(patient_id),
        ..Default::default()
    };
    let prescriptions = service.list_prescriptions(&query, TOKEN).await.unwrap();

    assert_eq!(prescriptions.len(), 1);
    assert_eq!(prescriptions[0].medication, "Amoxicilina 500mg");
}

#[tokio::test]
async fn get_missing_prescription_is_not_found() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/prescriptions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let config = TestConfig::with_url(&mock_server.uri()).to_app_config();
    let service = PrescriptionService::new(&config);

    let result = service
        .get_prescription(&Uuid::new_v4().to_string(), TOKEN)
        .await;
    assert_matches!(result, Err(PrescriptionError::NotFound));
}
