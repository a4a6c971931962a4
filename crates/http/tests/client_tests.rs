//! Integration tests for the Assist HTTP client

#![cfg(feature = "client")]

mod common;

use assist_http::client::{RequestBody, RequestOptions, SessionKey};
use assist_http::types::{ListQuery, UseYn};
use assist_http::{AssistClient, ClientError};
use common::{harness, harness_at};
use reqwest::Method;
use std::time::Duration;
use serde_json::{json, Value};
use wiremock::matchers::{
    body_json, body_string_contains, header, method, path, query_param,
};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_client_builder() {
    let client = AssistClient::builder()
        .base_url("http://localhost:8000/api/")
        .login_route("/signin")
        .build();

    assert!(client.is_ok());
    let client = client.unwrap();
    assert_eq!(client.base_url(), "http://localhost:8000/api");
    assert_eq!(client.login_route(), "/signin");
    assert!(!client.is_authenticated());
}

#[tokio::test]
async fn test_client_builder_rejects_bad_base_url() {
    let result = AssistClient::builder().base_url("").build();
    assert!(matches!(result, Err(ClientError::Configuration(_))));

    let result = AssistClient::builder().base_url("localhost:8000").build();
    assert!(matches!(result, Err(ClientError::Configuration(_))));
}

#[tokio::test]
async fn test_bearer_attached_from_session() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/auth/profile/"))
        .and(header("authorization", "Bearer A1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": {"user_login_id": "alice", "name": "Alice"}
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let h = harness(&mock_server, Some("A1"), Some("R1"));
    let profile = h.client.profile().await.unwrap();
    assert_eq!(profile["name"], "Alice");
}

#[tokio::test]
async fn test_no_bearer_without_token() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/chat/list/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true, "data": []})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let h = harness(&mock_server, None, None);
    let chats = h.client.list_chats().await.unwrap();
    assert_eq!(chats, json!([]));

    let requests = mock_server.received_requests().await.unwrap();
    assert!(requests[0].headers.get("authorization").is_none());
}

#[tokio::test]
async fn test_login_stores_session() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/login/"))
        .and(body_json(json!({"user_login_id": "alice", "passwd": "x"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token": "A1",
            "refresh": "R1",
            "user": {"user_login_id": "alice", "is_admin": false}
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let h = harness(&mock_server, None, None);
    let login = h.client.login("alice", "x").await.unwrap();

    assert_eq!(login.access_token, "A1");
    assert_eq!(h.stored(SessionKey::AccessToken).as_deref(), Some("A1"));
    assert_eq!(h.stored(SessionKey::RefreshToken).as_deref(), Some("R1"));
    assert!(h.client.is_authenticated());
    assert_eq!(h.client.current_user().unwrap()["user_login_id"], "alice");

    let requests = mock_server.received_requests().await.unwrap();
    assert!(requests[0].headers.get("authorization").is_none());
}

#[tokio::test]
async fn test_failed_login_does_not_refresh() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/login/"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"error": "invalid credentials"})),
        )
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(path("/api/auth/refresh/"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let h = harness(&mock_server, Some("stale"), Some("R0"));
    let result = h.client.login("alice", "wrong").await;

    assert!(
        matches!(result, Err(ClientError::AuthenticationFailed(ref m)) if m == "invalid credentials")
    );
    assert!(h.expired_routes().is_empty());
}

#[tokio::test]
async fn test_logout_clears_session_even_on_server_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/logout/"))
        .and(header("authorization", "Bearer A1"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&mock_server)
        .await;

    let h = harness(&mock_server, Some("A1"), Some("R1"));
    h.client.logout().await.unwrap();

    assert!(h.session_is_empty());
    assert!(h.expired_routes().is_empty());
}

#[tokio::test]
async fn test_application_error_carries_message() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/password-change/"))
        .and(body_json(json!({
            "current_password": "old",
            "new_password": "new-secret",
            "confirm_password": "new-secret"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "message": "current password is incorrect"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let h = harness(&mock_server, Some("A1"), Some("R1"));
    let err = h
        .client
        .change_password("old", "new-secret", "new-secret")
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::Application(ref m) if m == "current password is incorrect"));
    assert_eq!(err.to_string(), "current password is incorrect");
}

#[tokio::test]
async fn test_update_profile_refreshes_stored_user() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/api/auth/profile/"))
        .and(body_json(json!({"name": "Alice Kim"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": {"user_login_id": "alice", "name": "Alice Kim"},
            "message": "updated"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let h = harness(&mock_server, Some("A1"), Some("R1"));
    h.client
        .update_profile(&json!({"name": "Alice Kim"}))
        .await
        .unwrap();

    assert_eq!(h.client.current_user().unwrap()["name"], "Alice Kim");
}

#[tokio::test]
async fn test_chat_flow() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/chat/new/"))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(json!({"success": true, "data": {"id": 7}})),
        )
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/chat/7/query/"))
        .and(body_json(json!({"question": "How do I file a receipt?"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": {"answer": "Upload it from the receipt page."}
        })))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/chat/7/report/"))
        .and(body_json(json!({"reason": "outdated answer"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/chat/7/delete/"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;

    let h = harness(&mock_server, Some("A1"), Some("R1"));
    let chat = h.client.new_chat(None).await.unwrap();
    let id = chat["id"].as_i64().unwrap();

    let answer = h
        .client
        .query_chat(id, "How do I file a receipt?")
        .await
        .unwrap();
    assert_eq!(answer["answer"], "Upload it from the receipt page.");

    let reported = h.client.report_chat(id, "outdated answer").await.unwrap();
    assert_eq!(reported, Value::Null);

    h.client.delete_chat(id).await.unwrap();
}

#[tokio::test]
async fn test_admin_listing_passes_query() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/admin/users/"))
        .and(query_param("page", "2"))
        .and(query_param("search", "kim"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": {"results": [{"user_login_id": "kim"}], "count": 11}
        })))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/admin/users/update_use_yn/"))
        .and(body_json(json!({"user_ids": ["kim"], "use_yn": "N"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true, "data": {"updated": 1}})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let h = harness(&mock_server, Some("A1"), Some("R1"));
    let query = ListQuery {
        page: Some(2),
        search: Some("kim".into()),
        ..Default::default()
    };
    let page = h.client.list_users(&query).await.unwrap();
    assert_eq!(page["count"], 11);

    let updated = h
        .client
        .update_user_use_yn(vec!["kim".into()], UseYn::Disabled)
        .await
        .unwrap();
    assert_eq!(updated["updated"], 1);
}

#[tokio::test]
async fn test_blank_list_filters_are_not_sent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/admin/receipts/"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"success": true, "data": []})),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let h = harness(&mock_server, Some("A1"), Some("R1"));
    let query = ListQuery {
        page_size: Some(20),
        search: Some(String::new()),
        ..Default::default()
    };
    h.client.list_receipts(&query).await.unwrap();

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests[0].url.query(), Some("page_size=20"));
}

#[tokio::test]
async fn test_sub_second_timeout_is_applied() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/chat/list/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"success": true, "data": []}))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&mock_server)
        .await;

    let h = harness_at(
        &format!("{}/api", mock_server.uri()),
        Some("A1"),
        Some("R1"),
        Some(Duration::from_millis(200)),
    );
    let err = h.client.list_chats().await.unwrap_err();

    assert!(matches!(err, ClientError::Request(ref e) if e.is_timeout()));
}

#[tokio::test]
async fn test_receipt_download_returns_bytes() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/admin/receipts/download"))
        .and(query_param("start_date", "2024-05-01"))
        .and(header("authorization", "Bearer A1"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"PK\x03\x04export".to_vec()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let h = harness(&mock_server, Some("A1"), Some("R1"));
    let query = ListQuery {
        start_date: Some("2024-05-01".into()),
        ..Default::default()
    };
    let bytes = h.client.download_receipts(&query).await.unwrap();
    assert_eq!(&bytes[..], b"PK\x03\x04export");
}

#[tokio::test]
async fn test_upload_receipt_file_reads_from_disk() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/receipt/upload/"))
        .and(header("authorization", "Bearer A1"))
        .and(body_string_contains("filename=\"taxi.pdf\""))
        .and(body_string_contains("application/pdf"))
        .and(body_string_contains("%PDF-1.4 fare"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": {"receipt_id": 42, "amount": 18000}
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("taxi.pdf");
    std::fs::write(&file, b"%PDF-1.4 fare").unwrap();

    let h = harness(&mock_server, Some("A1"), Some("R1"));
    let receipt = h.client.upload_receipt_file(&file).await.unwrap();
    assert_eq!(receipt["receipt_id"], 42);

    let missing = h.client.upload_receipt_file(dir.path().join("nope.png")).await;
    assert!(matches!(missing, Err(ClientError::Storage(_))));
}

#[tokio::test]
async fn test_request_options_override_content_type() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/chat/new/"))
        .and(header("content-type", "application/vnd.assist+json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let h = harness(&mock_server, Some("A1"), Some("R1"));
    let response = h
        .client
        .request(
            Method::POST,
            "chat/new/",
            Some(RequestBody::Json(json!({"title": "Travel"}))),
            Some(
                RequestOptions::new()
                    .content_type("application/vnd.assist+json")
                    .unwrap(),
            ),
        )
        .await
        .unwrap();
    assert!(response.status().is_success());
}

#[tokio::test]
async fn test_generic_verbs_decode_json() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/api/auth/profile/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true, "data": 1})))
        .mount(&mock_server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/chat/3/delete/"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&mock_server)
        .await;

    let h = harness(&mock_server, Some("A1"), None);
    let put: Value = h
        .client
        .put("/auth/profile/", &json!({"name": "x"}))
        .await
        .unwrap();
    assert_eq!(put["data"], 1);

    let deleted: Option<Value> = h.client.delete("/chat/3/delete/").await.unwrap();
    assert!(deleted.is_none());
}
