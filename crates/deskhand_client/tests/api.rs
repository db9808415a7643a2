use std::time::Duration;

use deskhand_client::{ApiClient, ApiError, ClientSettings, DocumentStatusDto};
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> ApiClient {
    ApiClient::new(ClientSettings {
        base_url: server.uri(),
        ..ClientSettings::default()
    })
    .expect("client")
}

#[tokio::test]
async fn statistics_parses_the_payload() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/statistics"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total_documents": 12,
            "status": {"completed": 9, "processing": 2, "failed": 1},
            "categories": [{"name": "invoices", "count": 7}]
        })))
        .mount(&server)
        .await;

    let stats = client_for(&server).statistics().await.expect("statistics");
    assert_eq!(stats.total_documents, 12);
    assert_eq!(stats.status.completed, 9);
    assert_eq!(stats.categories[0].name, "invoices");
    assert_eq!(stats.categories[0].count, 7);
}

#[tokio::test]
async fn documents_carry_the_active_filters() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/documents"))
        .and(query_param("search", "report"))
        .and(query_param("status", "completed"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "documents": [{
                "id": 3,
                "filename": "report.pdf",
                "category": "reports",
                "status": "completed",
                "file_size": 2048,
                "processed_at": "2026-08-06T09:30:00"
            }]
        })))
        .mount(&server)
        .await;

    let documents = client_for(&server)
        .documents("report", Some("completed"), None)
        .await
        .expect("documents");
    assert_eq!(documents.len(), 1);
    assert_eq!(documents[0].id, 3);
    assert_eq!(documents[0].status, DocumentStatusDto::Completed);
}

#[tokio::test]
async fn error_body_detail_is_surfaced() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/statistics"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({"detail": "database unavailable"})),
        )
        .mount(&server)
        .await;

    let err = client_for(&server).statistics().await.unwrap_err();
    assert_eq!(
        err,
        ApiError::HttpStatus {
            status: 500,
            detail: "database unavailable".to_string()
        }
    );
}

#[tokio::test]
async fn error_body_message_is_a_fallback() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/documents/9"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({"message": "no such document"})),
        )
        .mount(&server)
        .await;

    let err = client_for(&server).delete_document(9).await.unwrap_err();
    assert_eq!(
        err,
        ApiError::HttpStatus {
            status: 404,
            detail: "no such document".to_string()
        }
    );
}

#[tokio::test]
async fn malformed_body_is_a_parse_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/statistics"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>login</html>"))
        .mount(&server)
        .await;

    let err = client_for(&server).statistics().await.unwrap_err();
    assert!(matches!(err, ApiError::Parse(_)));
}

#[tokio::test]
async fn slow_response_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/statistics"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(250))
                .set_body_json(json!({"total_documents": 0})),
        )
        .mount(&server)
        .await;

    let client = ApiClient::new(ClientSettings {
        base_url: server.uri(),
        request_timeout: Duration::from_millis(50),
        ..ClientSettings::default()
    })
    .expect("client");

    let err = client.statistics().await.unwrap_err();
    assert_eq!(err, ApiError::Timeout);
}

#[tokio::test]
async fn login_redirect_is_surfaced_as_auth_required() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/statistics"))
        .respond_with(
            ResponseTemplate::new(302).insert_header("Location", "/login?next=%2Fapi%2Fstatistics"),
        )
        .mount(&server)
        .await;

    let err = client_for(&server).statistics().await.unwrap_err();
    match err {
        ApiError::AuthRequired { location } => assert!(location.starts_with("/login")),
        other => panic!("expected AuthRequired, got {other:?}"),
    }
}

#[tokio::test]
async fn non_login_redirects_are_followed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/statistics"))
        .respond_with(ResponseTemplate::new(307).insert_header("Location", "/api/stats-v2"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/stats-v2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"total_documents": 4})))
        .mount(&server)
        .await;

    let stats = client_for(&server).statistics().await.expect("statistics");
    assert_eq!(stats.total_documents, 4);
}

#[tokio::test]
async fn dictionary_is_flattened_per_category() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/dictionary"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "entries": {
                "company_names": {"entries": {"accme": "ACME Corp"}},
                "technical_terms": {"entries": {"kube": "Kubernetes", "tf": "Terraform"}}
            }
        })))
        .mount(&server)
        .await;

    let entries = client_for(&server).dictionary().await.expect("dictionary");
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0].category, "company_names");
    assert_eq!(entries[0].source, "accme");
    assert_eq!(entries[0].replacement, "ACME Corp");
}

#[tokio::test]
async fn batch_export_returns_the_body_and_disposition() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/export/batch/markdown-zip"))
        .and(body_json(json!({"document_ids": [1, 2]})))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Content-Disposition", "attachment; filename=\"export.zip\"")
                .set_body_bytes(b"PK\x03\x04".to_vec()),
        )
        .mount(&server)
        .await;

    let body = client_for(&server)
        .export_markdown_zip(&[1, 2])
        .await
        .expect("export");
    assert_eq!(&body.bytes[..2], b"PK");
    assert_eq!(
        body.content_disposition.as_deref(),
        Some("attachment; filename=\"export.zip\"")
    );
}

#[tokio::test]
async fn upload_acknowledgement_is_parsed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/upload"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "processing"})))
        .mount(&server)
        .await;

    let ack = client_for(&server)
        .upload_minutes(
            "standup.mp3",
            b"RIFF".to_vec(),
            &deskhand_client::UploadForm {
                email: "team@example.com".to_string(),
                ..Default::default()
            },
        )
        .await
        .expect("upload");
    assert_eq!(ack.status.as_deref(), Some("processing"));
}

#[tokio::test]
async fn template_round_trip_hits_the_expected_routes() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/templates"))
        .and(body_json(json!({
            "id": "retro",
            "name": "Retro",
            "description": "",
            "prompt_template": "Summarize"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/templates/retro/default"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/templates/retro"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .mount(&server)
        .await;

    let client = client_for(&server);
    client
        .create_template("retro", "Retro", "", "Summarize")
        .await
        .expect("create");
    client.set_default_template("retro").await.expect("default");
    client.delete_template("retro").await.expect("delete");
}
