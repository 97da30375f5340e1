use assert_matches::assert_matches;
use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use patient_cell::models::{CreatePatientRequest, PatientError, PatientSearchQuery};
use patient_cell::services::PatientService;
use shared_utils::test_utils::{MockSupabaseRows, TestConfig};

const TOKEN: &str = "test-user-token";

fn service_for(mock_server: &MockServer) -> PatientService {
    let config = TestConfig::with_url(&mock_server.uri()).to_app_config();
    PatientService::new(&config)
}

fn create_request(dni: &str) -> CreatePatientRequest {
    CreatePatientRequest {
        first_name: "María".to_string(),
        last_name: "García".to_string(),
        dni: dni.to_string(),
        email: Some("maria@example.com".to_string()),
        phone: None,
        address: None,
        birth_date: Some("1985-06-15".parse().unwrap()),
        insurance_provider_id: None,
        insurance_number: None,
    }
}

#[tokio::test]
async fn create_patient_rejects_duplicate_dni() {
    let mock_server = MockServer::start().await;
    let id = Uuid::new_v4().to_string();

    Mock::given(method("GET"))
        .and(path("/rest/v1/patients"))
        .and(query_param("dni", "eq.28456789"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseRows::patient(&id, "María", "García", "28456789")
        ])))
        .mount(&mock_server)
        .await;

    let service = service_for(&mock_server);
    let result = service.create_patient(create_request("28456789"), TOKEN).await;

    assert_matches!(result, Err(PatientError::DniAlreadyExists { dni }) if dni == "28456789");
}

#[tokio::test]
async fn create_patient_inserts_when_dni_is_new() {
    let mock_server = MockServer::start().await;
    let id = Uuid::new_v4().to_string();

    Mock::given(method("GET"))
        .and(path("/rest/v1/patients"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/patients"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            MockSupabaseRows::patient(&id, "María", "García", "28456789")
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let service = service_for(&mock_server);
    let patient = service
        .create_patient(create_request("28456789"), TOKEN)
        .await
        .unwrap();

    assert_eq!(patient.full_name(), "María García");
    assert_eq!(patient.dni, "28456789");
}

#[tokio::test]
async fn create_patient_rejects_blank_dni() {
    let mock_server = MockServer::start().await;
    let service = service_for(&mock_server);

    let result = service.create_patient(create_request("  "), TOKEN).await;

    assert_matches!(result, Err(PatientError::ValidationError(_)));
}

#[tokio::test]
async fn get_missing_patient_is_not_found() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/patients"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let service = service_for(&mock_server);
    let result = service.get_patient(&Uuid::new_v4().to_string(), TOKEN).await;

    assert_matches!(result, Err(PatientError::NotFound));
}

#[tokio::test]
async fn search_applies_default_paging() {
    let mock_server = MockServer::start().await;
    let id = Uuid::new_v4().to_string();

    Mock::given(method("GET"))
        .and(path("/rest/v1/patients"))
        .and(query_param("limit", "50"))
        .and(query_param("offset", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseRows::patient(&id, "Juan", "Ibáñez", "30111222")
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let service = service_for(&mock_server);
    let query = PatientSearchQuery {
        name: None,
        dni: None,
        insurance_provider_id: None,
        limit: None,
        offset: None,
    };
    let patients = service.search_patients(query, TOKEN).await.unwrap();

    assert_eq!(patients.len(), 1);
    assert_eq!(patients[0].last_name, "Ibáñez");
}
