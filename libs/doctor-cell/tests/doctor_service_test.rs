use assert_matches::assert_matches;
use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use doctor_cell::models::{CreateSpecialtyRequest, DoctorError, DoctorSearchQuery};
use doctor_cell::services::{DoctorService, SpecialtyService};
use shared_utils::test_utils::{MockSupabaseRows, TestConfig};

const TOKEN: &str = "test-user-token";

#[tokio::test]
async fn search_doctors_embeds_specialty() {
    let mock_server = MockServer::start().await;
    let id = Uuid::new_v4().to_string();

    Mock::given(method("GET"))
        .and(path("/rest/v1/doctors"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseRows::doctor(&id, "Carlos", "Pérez", "Cardiología")
        ])))
        .mount(&mock_server)
        .await;

    let config = TestConfig::with_url(&mock_server.uri()).to_app_config();
    let service = DoctorService::new(&config);

    let query = DoctorSearchQuery {
        name: None,
        specialty_id: None,
        active_only: Some(true),
        limit: None,
        offset: None,
    };
    let doctors = service.search_doctors(query, TOKEN).await.unwrap();

    assert_eq!(doctors.len(), 1);
    assert_eq!(doctors[0].full_name(), "Carlos Pérez");
    assert_eq!(doctors[0].specialty.as_ref().unwrap().name, "Cardiología");
}

#[tokio::test]
async fn get_missing_doctor_is_not_found() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/doctors"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let config = TestConfig::with_url(&mock_server.uri()).to_app_config();
    let service = DoctorService::new(&config);

    let result = service.get_doctor(&Uuid::new_v4().to_string(), TOKEN).await;
    assert_matches!(result, Err(DoctorError::NotFound));
}

#[tokio::test]
async fn create_specialty_rejects_duplicate_name() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/specialties"))
        .and(query_param("name", "eq.Cardiología"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": Uuid::new_v4(), "name": "Cardiología", "description": null }
        ])))
        .mount(&mock_server)
        .await;

    let config = TestConfig::with_url(&mock_server.uri()).to_app_config();
    let service = SpecialtyService::new(&config);

    let request = CreateSpecialtyRequest {
        name: "Cardiología".to_string(),
        description: None,
    };
    let result = service.create_specialty(request, TOKEN).await;

    assert_matches!(
        result,
        Err(DoctorError::SpecialtyAlreadyExists { name }) if name == "Cardiología"
    );
}
