/// Integration tests with a mocked Notion API
/// Tests the page-creation call and error classification without hitting Notion
use rust_inquiry_api::errors::ExternalStoreError;
use rust_inquiry_api::mapping::MappingProfile;
use rust_inquiry_api::models::InquiryInput;
use rust_inquiry_api::notion_client::NotionClient;
use rust_inquiry_api::services::RecordStore;
use serde_json::{json, Map, Value};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PAGE_ID: &str = "59833787-2cf9-4fdf-8782-e53db20768a5";

/// Helper function to create a client pointed at the mock server
fn create_test_client(base_url: String) -> NotionClient {
    NotionClient::new(base_url, "secret_test".to_string(), "2022-06-28".to_string()).unwrap()
}

fn title_only(name: &str) -> Map<String, Value> {
    let mut properties = Map::new();
    properties.insert(
        "단지명".to_string(),
        json!({"title": [{"text": {"content": name}}]}),
    );
    properties
}

fn notion_error(status: u16, code: &str, message: &str) -> ResponseTemplate {
    ResponseTemplate::new(status).set_body_json(json!({
        "object": "error",
        "status": status,
        "code": code,
        "message": message
    }))
}

#[tokio::test]
async fn test_create_page_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/pages"))
        .and(header("authorization", "Bearer secret_test"))
        .and(header("notion-version", "2022-06-28"))
        .and(body_partial_json(json!({
            "parent": {"database_id": "db-123"},
            "properties": {"단지명": {"title": [{"text": {"content": "잠실엘스"}}]}}
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"object": "page", "id": PAGE_ID})),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(format!("{}/v1", mock_server.uri()));
    let record_id = client
        .create_page("db-123", title_only("잠실엘스"))
        .await
        .unwrap();

    assert_eq!(record_id.to_string(), PAGE_ID);
}

#[tokio::test]
async fn test_create_record_via_trait_sends_full_profile() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/pages"))
        .and(body_partial_json(json!({
            "properties": {
                "KB시세": {"rich_text": [{"text": {"content": "125000.0억"}}]},
                "결과": {"select": {"name": "HUG·SGI 모두 가능"}}
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": PAGE_ID})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let profile = MappingProfile::full_pricing("억");
    let input: InquiryInput = serde_json::from_value(json!({
        "complexName": "Sample Complex",
        "salePrice": 1250000000u64,
        "result": "both_possible"
    }))
    .unwrap();
    let record = profile.map_and_validate(&input, chrono::Utc::now()).unwrap();

    let store: &dyn RecordStore = &create_test_client(mock_server.uri());
    let result = store
        .create_record("db-123", profile.to_properties(&record))
        .await;

    assert!(result.is_ok());
}

#[tokio::test]
async fn test_unauthorized_maps_to_authentication() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/pages"))
        .respond_with(notion_error(401, "unauthorized", "API token is invalid."))
        .mount(&mock_server)
        .await;

    let client = create_test_client(mock_server.uri());
    let err = client.create_page("db-123", title_only("A")).await.unwrap_err();

    assert!(matches!(err, ExternalStoreError::Authentication(ref msg) if msg.contains("API token is invalid")));
}

#[tokio::test]
async fn test_missing_database_maps_to_target_not_found() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/pages"))
        .respond_with(notion_error(
            404,
            "object_not_found",
            "Could not find database with ID: db-404.",
        ))
        .mount(&mock_server)
        .await;

    let client = create_test_client(mock_server.uri());
    let err = client.create_page("db-404", title_only("A")).await.unwrap_err();

    assert!(matches!(err, ExternalStoreError::TargetNotFound(_)));
}

#[tokio::test]
async fn test_schema_mismatch_maps_to_rejected() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/pages"))
        .respond_with(notion_error(
            400,
            "validation_error",
            "KB시세 is not a property that exists.",
        ))
        .mount(&mock_server)
        .await;

    let client = create_test_client(mock_server.uri());
    let err = client.create_page("db-123", title_only("A")).await.unwrap_err();

    assert!(matches!(err, ExternalStoreError::Rejected(_)));
}

#[tokio::test]
async fn test_gateway_error_maps_to_unknown() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/pages"))
        .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
        .mount(&mock_server)
        .await;

    let client = create_test_client(mock_server.uri());
    let err = client.create_page("db-123", title_only("A")).await.unwrap_err();

    assert!(matches!(err, ExternalStoreError::Unknown(ref msg) if msg.contains("Bad Gateway")));
}

#[tokio::test]
async fn test_response_without_id_is_unknown() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/pages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"object": "page"})))
        .mount(&mock_server)
        .await;

    let client = create_test_client(mock_server.uri());
    let err = client.create_page("db-123", title_only("A")).await.unwrap_err();

    assert!(matches!(err, ExternalStoreError::Unknown(_)));
}

#[tokio::test]
async fn test_unreachable_store_is_unknown() {
    // Nothing listens on port 9 (discard) in the test environment
    let client = create_test_client("http://127.0.0.1:9".to_string());
    let err = client.create_page("db-123", title_only("A")).await.unwrap_err();

    assert!(matches!(err, ExternalStoreError::Unknown(_)));
}

#[tokio::test]
async fn test_identical_submissions_create_two_pages() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/pages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": PAGE_ID})))
        .up_to_n_times(1)
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/pages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            json!({"id": "0f4c3d1e-8a8b-4f43-9d3e-2f2b1c0a9e77"}),
        ))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(mock_server.uri());
    let first = client.create_page("db-123", title_only("A")).await.unwrap();
    let second = client.create_page("db-123", title_only("A")).await.unwrap();

    assert_ne!(first, second);
}

#[tokio::test]
async fn test_concurrent_submissions() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/pages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": PAGE_ID})))
        .expect(10) // Expect 10 concurrent requests
        .mount(&mock_server)
        .await;

    let client = create_test_client(mock_server.uri());

    // Fire 10 concurrent requests
    let mut handles = vec![];
    for i in 0..10 {
        let client = client.clone();
        let handle = tokio::spawn(async move {
            client
                .create_page("db-123", title_only(&format!("단지 {}", i)))
                .await
        });
        handles.push(handle);
    }

    // Wait for all to complete
    for handle in handles {
        let result = handle.await.unwrap();
        assert!(result.is_ok());
    }
}
