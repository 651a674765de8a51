//! API Regression Tests
//!
//! In-process tests that build the Axum app via `create_app()` and exercise
//! the /api/* endpoints using `tower::ServiceExt::oneshot()`.
//! No binary spawn, no network port.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::NaiveDate;
use serde_json::{json, Value};
use tower::ServiceExt;

use sentinel::api::{create_app, ApiState};
use sentinel::config::{AnalyticsConfig, MockConfig, SentinelConfig};
use sentinel::jobs::ModelRunner;
use sentinel::mock::MockDataset;
use sentinel::storage::InMemoryPostStore;

const DEMO_PASSWORD: &str = "sentinel123";

fn create_test_app_with(config: SentinelConfig) -> (Router, ModelRunner) {
    let mock = MockConfig {
        seed: 42,
        company_count: 15,
    };
    let as_of = NaiveDate::from_ymd_opt(2025, 8, 14).unwrap();
    let dataset = Arc::new(MockDataset::generate(&mock, &AnalyticsConfig::default(), as_of));
    let (state, runner) = ApiState::new(config, dataset, Arc::new(InMemoryPostStore::new()));
    (create_app(state), runner)
}

fn create_test_app() -> Router {
    create_test_app_with(SentinelConfig::default()).0
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, json)
}

fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::get(uri);
    if let Some(t) = token {
        builder = builder.header("authorization", format!("Bearer {t}"));
    }
    builder.body(Body::empty()).unwrap()
}

fn json_request(method: &str, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(t) = token {
        builder = builder.header("authorization", format!("Bearer {t}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

async fn login(app: &Router, email: &str) -> String {
    let (status, json) = send(
        app,
        json_request(
            "POST",
            "/api/auth/login",
            None,
            json!({ "email": email, "password": DEMO_PASSWORD }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed: {json}");
    json["data"]["token"].as_str().unwrap().to_string()
}

/// All public GET endpoints return 200 with a `data` envelope.
#[tokio::test]
async fn test_get_endpoints_return_200() {
    let app = create_test_app();
    let endpoints = [
        "/health",
        "/api/companies/C0001",
        "/api/companies/C0001/overview",
        "/api/dashboard/summary",
        "/api/dashboard/summary?range=7d",
        "/api/dashboard/risk-trend",
        "/api/dashboard/risk-trend?unit=percent",
        "/api/posts/notice",
        "/api/posts/qna",
    ];

    for endpoint in endpoints {
        let (status, json) = send(&app, get(endpoint, None)).await;
        assert_eq!(status, StatusCode::OK, "{endpoint} returned {status}");
        assert!(json.get("data").is_some(), "{endpoint} missing data envelope");
    }
}

#[tokio::test]
async fn test_unknown_company_is_404_envelope() {
    let app = create_test_app();
    let (status, json) = send(&app, get("/api/companies/NOPE", None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"]["code"], "NOT_FOUND");
    assert!(json["error"]["message"].as_str().unwrap().contains("NOPE"));
}

#[tokio::test]
async fn test_company_search_by_keyword_and_limit() {
    let app = create_test_app();
    let (status, json) = send(
        &app,
        json_request("POST", "/api/companies/search", None, json!({ "keyword": "", "limit": 3 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let list = json["data"].as_array().unwrap();
    assert_eq!(list.len(), 3);

    let scores: Vec<f64> = list.iter().map(|c| c["riskScore"].as_f64().unwrap()).collect();
    assert!(scores.windows(2).all(|w| w[0] >= w[1]), "not sorted by risk: {scores:?}");
}

#[tokio::test]
async fn test_malformed_json_is_enveloped_400() {
    let app = create_test_app();
    let req = Request::post("/api/companies/search")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, json) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_risk_trend_matches_window() {
    let app = create_test_app();
    let (status, json) = send(&app, get("/api/dashboard/risk-trend", None)).await;
    assert_eq!(status, StatusCode::OK);

    let payload = &json["data"]["payload"];
    let window = payload["windowQuarters"].as_array().unwrap();
    let trend = payload["trend"].as_array().unwrap();
    assert_eq!(window.len(), trend.len());
    for (q, bucket) in window.iter().zip(trend) {
        assert_eq!(q, &bucket["quarter"]);
    }
    assert_eq!(trend.last().unwrap()["dataType"], "FORECAST");
    // The mock feed reaches further back than the chart, skips one quarter
    // and re-sends another.
    let report = &json["data"]["report"];
    assert!(!report["droppedQuarters"].as_array().unwrap().is_empty());
    assert_eq!(report["missingQuarters"].as_array().unwrap().len(), 1);
    assert_eq!(report["duplicateQuarters"].as_array().unwrap().len(), 1);
    assert_eq!(report["missingQuarters"][0], window[0]);
}

#[tokio::test]
async fn test_invalid_trend_unit_rejected() {
    let app = create_test_app();
    let (status, _) = send(&app, get("/api/dashboard/risk-trend?unit=ratio", None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// ============================================================================
// Auth
// ============================================================================

#[tokio::test]
async fn test_login_validation_returns_field_errors() {
    let app = create_test_app();
    let (status, json) = send(
        &app,
        json_request(
            "POST",
            "/api/auth/login",
            None,
            json!({ "email": "not-an-email", "password": "" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json["error"]["code"], "VALIDATION_FAILED");
    assert!(json["error"]["fieldErrors"]["email"].is_array());
    assert!(json["error"]["fieldErrors"]["password"].is_array());
}

#[tokio::test]
async fn test_wrong_password_is_401() {
    let app = create_test_app();
    let (status, _) = send(
        &app,
        json_request(
            "POST",
            "/api/auth/login",
            None,
            json!({ "email": "analyst@sentinel.io", "password": "wrong-password" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_signup_me_logout() {
    let app = create_test_app();
    let (status, json) = send(
        &app,
        json_request(
            "POST",
            "/api/auth/signup",
            None,
            json!({
                "email": "new@partner.io",
                "name": "New Analyst",
                "password": "longenough",
                "passwordConfirm": "longenough"
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let token = json["data"]["token"].as_str().unwrap().to_string();

    let (status, json) = send(&app, get("/api/auth/me", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["email"], "new@partner.io");
    assert_eq!(json["data"]["role"], "analyst");

    let (status, _) = send(&app, json_request("POST", "/api/auth/logout", Some(&token), json!({}))).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, get("/api/auth/me", Some(&token))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_duplicate_signup_conflicts() {
    let app = create_test_app();
    let body = json!({
        "email": "analyst@sentinel.io",
        "name": "Again",
        "password": "longenough",
        "passwordConfirm": "longenough"
    });
    let (status, json) = send(&app, json_request("POST", "/api/auth/signup", None, body)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["error"]["code"], "CONFLICT");
}

#[tokio::test]
async fn test_view_as_is_admin_only() {
    let app = create_test_app();
    let analyst = login(&app, "analyst@sentinel.io").await;
    let admin = login(&app, "admin@sentinel.io").await;

    let (status, _) = send(&app, get("/api/auth/users", Some(&analyst))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, json) = send(&app, get("/api/auth/users", Some(&admin))).await;
    assert_eq!(status, StatusCode::OK);
    let viewer_id = json["data"]
        .as_array()
        .unwrap()
        .iter()
        .find(|u| u["role"] == "viewer")
        .map(|u| u["id"].as_str().unwrap().to_string())
        .unwrap();

    let (status, json) = send(
        &app,
        json_request("POST", "/api/auth/view-as", Some(&admin), json!({ "userId": viewer_id })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["role"], "viewer");

    // Acting as the viewer, writes are refused.
    let (status, _) = send(
        &app,
        json_request("POST", "/api/posts/qna", Some(&admin), json!({ "title": "t", "body": "b" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, json) = send(
        &app,
        json_request("POST", "/api/auth/view-as", Some(&admin), json!({ "userId": null })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["role"], "admin");
}

// ============================================================================
// Decision Room
// ============================================================================

#[tokio::test]
async fn test_post_crud_round_trip() {
    let app = create_test_app();
    let token = login(&app, "analyst@sentinel.io").await;

    let (status, json) = send(
        &app,
        json_request(
            "POST",
            "/api/posts/qna",
            Some(&token),
            json!({ "title": "  Supplier audit  ", "body": "Is the Q3 audit complete?", "tags": ["audit"] }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = json["data"]["id"].as_str().unwrap().to_string();
    assert_eq!(json["data"]["title"], "Supplier audit");
    assert_eq!(json["data"]["author"], "Risk Analyst");
    assert_eq!(json["data"]["status"], "open");

    let (status, json) = send(&app, get("/api/posts/qna", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"][0]["id"], id.as_str(), "newest post should be first");

    let (status, json) = send(
        &app,
        json_request(
            "PATCH",
            &format!("/api/posts/qna/{id}"),
            Some(&token),
            json!({ "answer": "Yes, signed off." }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["status"], "answered");
    assert_eq!(json["data"]["answers"].as_array().unwrap().len(), 1);

    let (status, json) = send(&app, get(&format!("/api/posts/qna/{id}"), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["answers"][0]["body"], "Yes, signed off.");

    let (status, json) = send(
        &app,
        Request::delete(format!("/api/posts/qna/{id}"))
            .header("authorization", format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["deleted"], true);

    let (status, _) = send(&app, get(&format!("/api/posts/qna/{id}"), None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_post_list_filters() {
    let app = create_test_app();
    let token = login(&app, "analyst@sentinel.io").await;
    for title in ["Zephyrine freight delay", "Beta pricing question"] {
        let (status, _) = send(
            &app,
            json_request("POST", "/api/posts/qna", Some(&token), json!({ "title": title, "body": "details" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (_, json) = send(&app, get("/api/posts/qna?q=ZEPHYRINE", None)).await;
    let list = json["data"].as_array().unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["title"], "Zephyrine freight delay");

    let (_, json) = send(&app, get("/api/posts/qna?sort=nameAsc", None)).await;
    let titles: Vec<&str> = json["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["title"].as_str().unwrap())
        .collect();
    let mut sorted = titles.clone();
    sorted.sort_by_key(|t| t.to_lowercase());
    assert_eq!(titles, sorted);

    let (status, _) = send(&app, get("/api/posts/qna?sort=sideways", None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_post_validation_returns_422() {
    let app = create_test_app();
    let token = login(&app, "analyst@sentinel.io").await;
    let (status, json) = send(
        &app,
        json_request("POST", "/api/posts/notice", Some(&token), json!({ "title": " ", "body": "" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(json["error"]["fieldErrors"]["title"].is_array());
    assert!(json["error"]["fieldErrors"]["body"].is_array());
}

#[tokio::test]
async fn test_shared_display_name_grants_no_ownership() {
    let app = create_test_app();
    // A fresh account reusing the admin's display name.
    let (status, json) = send(
        &app,
        json_request(
            "POST",
            "/api/auth/signup",
            None,
            json!({
                "email": "namesake@partner.io",
                "name": "Sentinel Admin",
                "password": "longenough",
                "passwordConfirm": "longenough"
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["data"]["user"]["role"], "analyst");
    let namesake = json["data"]["token"].as_str().unwrap().to_string();

    let (status, _) = send(
        &app,
        json_request("DELETE", "/api/posts/notice/notice-welcome", Some(&namesake), json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        &app,
        json_request(
            "PATCH",
            "/api/posts/notice/notice-welcome",
            Some(&namesake),
            json!({ "title": "Renamed" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, json) = send(&app, get("/api/posts/notice/notice-welcome", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["title"], "Quarterly risk review schedule");

    // The real author still owns the seeded question.
    let analyst = login(&app, "analyst@sentinel.io").await;
    let (status, json) = send(
        &app,
        json_request(
            "PATCH",
            "/api/posts/qna/qna-watchlist",
            Some(&analyst),
            json!({ "tags": ["watchlist", "criteria"] }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["authorId"], "demo-analyst");
}

#[tokio::test]
async fn test_viewer_cannot_write_and_others_cannot_edit() {
    let app = create_test_app();
    let viewer = login(&app, "viewer@sentinel.io").await;
    let (status, json) = send(
        &app,
        json_request("POST", "/api/posts/qna", Some(&viewer), json!({ "title": "t", "body": "b" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(json["error"]["code"], "FORBIDDEN");

    // The seeded notice belongs to the admin; an analyst may not retitle it.
    let analyst = login(&app, "analyst@sentinel.io").await;
    let (status, _) = send(
        &app,
        json_request(
            "PATCH",
            "/api/posts/notice/notice-welcome",
            Some(&analyst),
            json!({ "title": "Hijacked" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let admin = login(&app, "admin@sentinel.io").await;
    let (status, json) = send(
        &app,
        json_request(
            "PATCH",
            "/api/posts/qna/qna-watchlist",
            Some(&admin),
            json!({ "status": "closed" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["status"], "closed");
}

fn multipart_request(uri: &str, token: &str, content_type: &str, bytes: &[u8]) -> Request<Body> {
    let boundary = "sentinel-test-boundary";
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
    body.extend_from_slice(
        b"Content-Disposition: form-data; name=\"file\"; filename=\"audit.pdf\"\r\n",
    );
    body.extend_from_slice(format!("Content-Type: {content_type}\r\n\r\n").as_bytes());
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    Request::post(uri)
        .header("authorization", format!("Bearer {token}"))
        .header("content-type", format!("multipart/form-data; boundary={boundary}"))
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn test_upload_attachment() {
    let app = create_test_app();
    let token = login(&app, "analyst@sentinel.io").await;

    let (status, json) = send(
        &app,
        multipart_request("/api/posts/qna-watchlist/files", &token, "application/pdf", b"%PDF-1.4 test"),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{json}");
    assert_eq!(json["data"]["fileName"], "audit.pdf");
    assert_eq!(json["data"]["sizeBytes"], 13);

    let (_, json) = send(&app, get("/api/posts/qna/qna-watchlist", None)).await;
    assert_eq!(json["data"]["attachments"].as_array().unwrap().len(), 1);

    let (status, _) = send(
        &app,
        multipart_request("/api/posts/missing/files", &token, "application/pdf", b"x"),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_upload_limits() {
    let mut config = SentinelConfig::default();
    config.upload.max_file_bytes = 8;
    config.upload.allowed_content_types = vec!["application/pdf".to_string()];
    let (app, _runner) = create_test_app_with(config);
    let token = login(&app, "analyst@sentinel.io").await;

    let (status, json) = send(
        &app,
        multipart_request("/api/posts/qna-watchlist/files", &token, "application/pdf", b"0123456789"),
    )
    .await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(json["error"]["code"], "PAYLOAD_TOO_LARGE");

    let (status, _) = send(
        &app,
        multipart_request("/api/posts/qna-watchlist/files", &token, "image/png", b"png"),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// ============================================================================
// Model jobs
// ============================================================================

#[tokio::test]
async fn test_model_job_lifecycle() {
    let (app, runner) = create_test_app_with(SentinelConfig::default());
    let cancel = tokio_util::sync::CancellationToken::new();
    let handle = tokio::spawn(runner.run(cancel.clone()));

    let (status, json) = send(
        &app,
        json_request("POST", "/api/model/run", None, json!({ "companyIds": ["C0001", "C0002"] })),
    )
    .await;
    assert_eq!(status, StatusCode::ACCEPTED);
    let job_id = json["data"]["jobId"].as_str().unwrap().to_string();

    let mut last = Value::Null;
    for _ in 0..50 {
        let (status, json) = send(&app, get(&format!("/api/model/jobs/{job_id}"), None)).await;
        assert_eq!(status, StatusCode::OK);
        last = json;
        if last["data"]["status"] == "done" {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    }
    assert_eq!(last["data"]["status"], "done", "{last}");
    assert_eq!(last["data"]["result"].as_array().unwrap().len(), 2);

    let (status, _) = send(&app, get("/api/model/jobs/unknown", None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    cancel.cancel();
    handle.await.unwrap();
}
