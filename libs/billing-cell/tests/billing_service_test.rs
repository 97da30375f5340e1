use assert_matches::assert_matches;
use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use billing_cell::models::BillingError;
use billing_cell::services::NomenclatureService;
use shared_utils::test_utils::{MockSupabaseRows, TestConfig};

const TOKEN: &str = "test-user-token";

fn service_for(mock_server: &MockServer) -> NomenclatureService {
    let config = TestConfig::with_url(&mock_server.uri()).to_app_config();
    NomenclatureService::new(&config)
}

#[tokio::test]
async fn adjust_values_patches_every_code() {
    let mock_server = MockServer::start().await;
    let first = Uuid::new_v4().to_string();
    let second = Uuid::new_v4().to_string();

    Mock::given(method("GET"))
        .and(path("/rest/v1/nomenclature_codes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseRows::nomenclature_code(&first, "42.01.01", 100.0),
            MockSupabaseRows::nomenclature_code(&second, "42.01.02", 80.0),
        ])))
        .mount(&mock_server)
        .await;

    // 10% on 100.00 -> 110.00, on 80.00 -> 88.00, rounded to cents.
    Mock::given(method("PATCH"))
        .and(path("/rest/v1/nomenclature_codes"))
        .and(query_param("id", format!("eq.{}", first)))
        .and(body_json(json!({ "value": 110.0 })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/nomenclature_codes"))
        .and(query_param("id", format!("eq.{}", second)))
        .and(body_json(json!({ "value": 88.0 })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;

    let service = service_for(&mock_server);
    let result = service.adjust_values(10.0, TOKEN).await.unwrap();

    assert_eq!(result.total, 2);
    assert_eq!(result.updated, 2);
    assert_eq!(result.percentage, 10.0);
}

#[tokio::test]
async fn adjust_values_reports_partial_progress_on_failure() {
    let mock_server = MockServer::start().await;
    let first = Uuid::new_v4().to_string();
    let second = Uuid::new_v4().to_string();

    Mock::given(method("GET"))
        .and(path("/rest/v1/nomenclature_codes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseRows::nomenclature_code(&first, "42.01.01", 100.0),
            MockSupabaseRows::nomenclature_code(&second, "42.01.02", 80.0),
        ])))
        .mount(&mock_server)
        .await;

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/nomenclature_codes"))
        .and(query_param("id", format!("eq.{}", first)))
        .respond_with(ResponseTemplate::new(204))
        .mount(&mock_server)
        .await;

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/nomenclature_codes"))
        .and(query_param("id", format!("eq.{}", second)))
        .respond_with(ResponseTemplate::new(500).set_body_string("row locked"))
        .mount(&mock_server)
        .await;

    let service = service_for(&mock_server);
    let result = service.adjust_values(10.0, TOKEN).await;

    assert_matches!(
        result,
        Err(BillingError::BulkAdjustAborted { updated: 1, total: 2, .. })
    );
}

#[tokio::test]
async fn adjust_values_rejects_out_of_range_percentage() {
    let mock_server = MockServer::start().await;
    let service = service_for(&mock_server);

    let result = service.adjust_values(-120.0, TOKEN).await;
    assert_matches!(result, Err(BillingError::ValidationError(_)));

    let result = service.adjust_values(f64::NAN, TOKEN).await;
    assert_matches!(result, Err(BillingError::ValidationError(_)));
}
