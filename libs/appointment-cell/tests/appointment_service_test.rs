use assert_matches::assert_matches;
use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use appointment_cell::filter::{self, FilterCriteria};
use appointment_cell::models::{AppointmentError, AppointmentListQuery, AppointmentStatus};
use appointment_cell::services::AppointmentService;
use appointment_cell::stats;
use shared_utils::test_utils::{MockSupabaseRows, TestConfig};

const TOKEN: &str = "test-user-token";

fn service_for(mock_server: &MockServer) -> AppointmentService {
    let config = TestConfig::with_url(&mock_server.uri()).to_app_config();
    AppointmentService::new(&config)
}

fn denormalized_rows() -> serde_json::Value {
    json!([
        MockSupabaseRows::appointment(
            &Uuid::new_v4().to_string(),
            "2024-03-15",
            "scheduled",
            Some(json!({ "first_name": "María", "last_name": "García", "dni": "28456789" })),
            Some(json!({
                "first_name": "Carlos",
                "last_name": "Pérez",
                "specialty": { "name": "Cardiología" }
            })),
        ),
        MockSupabaseRows::appointment(
            &Uuid::new_v4().to_string(),
            "2024-03-16",
            "confirmed",
            Some(json!({ "first_name": "Juan", "last_name": "Ibáñez", "dni": "30111222" })),
            Some(json!({
                "first_name": "Ana",
                "last_name": "Suárez",
                "specialty": { "name": "Pediatría" }
            })),
        )
    ])
}

#[tokio::test]
async fn list_deserializes_nested_embeds() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(denormalized_rows()))
        .mount(&mock_server)
        .await;

    let service = service_for(&mock_server);
    let appointments = service
        .list(&AppointmentListQuery::default(), TOKEN)
        .await
        .unwrap();

    assert_eq!(appointments.len(), 2);
    let first = &appointments[0];
    assert_eq!(first.status, AppointmentStatus::Scheduled);
    assert_eq!(first.patient.as_ref().unwrap().last_name, "García");
    assert_eq!(
        first
            .doctor
            .as_ref()
            .unwrap()
            .specialty
            .as_ref()
            .unwrap()
            .name,
        "Cardiología"
    );
}

#[tokio::test]
async fn list_passes_status_filter_to_the_store() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("status", "eq.confirmed"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let service = service_for(&mock_server);
    let query = AppointmentListQuery {
        status: Some(AppointmentStatus::Confirmed),
        ..Default::default()
    };
    let appointments = service.list(&query, TOKEN).await.unwrap();

    assert!(appointments.is_empty());
}

#[tokio::test]
async fn board_snapshot_feeds_filter_and_stats() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(denormalized_rows()))
        .mount(&mock_server)
        .await;

    let service = service_for(&mock_server);
    let snapshot = service.board_snapshot(TOKEN).await.unwrap();

    // Filter engine narrows the snapshot in memory.
    let criteria = FilterCriteria {
        search: Some("garcia".to_string()),
        ..Default::default()
    };
    let filtered = filter::apply(Some(&snapshot), &criteria);
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered[0].patient.as_ref().unwrap().last_name, "García");

    // The aggregator consumes the unfiltered snapshot.
    let day = "2024-03-15".parse().unwrap();
    let stats = stats::summarize_at(&snapshot, day);
    assert_eq!(stats.today, 1);
    assert_eq!(stats.pending, 1);
    assert_eq!(stats.confirmed, 1);
    assert_eq!(stats.this_week, 2);
}

#[tokio::test]
async fn get_missing_appointment_is_not_found() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let service = service_for(&mock_server);
    let result = service.get(&Uuid::new_v4().to_string(), TOKEN).await;

    assert_matches!(result, Err(AppointmentError::NotFound));
}

#[tokio::test]
async fn cancel_patches_status_with_reason() {
    let mock_server = MockServer::start().await;
    let id = Uuid::new_v4().to_string();

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("id", format!("eq.{}", id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseRows::appointment(&id, "2024-03-15", "cancelled", None, None)
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let service = service_for(&mock_server);
    let appointment = service
        .cancel(&id, Some("Patient request".to_string()), TOKEN)
        .await
        .unwrap();

    assert_eq!(appointment.status, AppointmentStatus::Cancelled);
    assert!(appointment.patient.is_none());
}
