use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use eyd_core::checker::{CheckService, HttpChecker};
use eyd_core::config::ServiceConfig;
use eyd_core::{CorrectionCandidate, EditingSession};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

// These tests run the HTTP client against a small in-process stand-in for the
// checker service, bound to an ephemeral port.

type FeedbackLog = Arc<Mutex<Vec<(Value, String)>>>;

async fn check_handler(Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    let text = body["text"].as_str().unwrap_or_default().to_string();
    let mut corrections = Vec::new();
    if text.contains("yg") {
        corrections.push(json!({
            "original": "yg",
            "suggested": "yang",
            "rule": "Singkatan tidak baku"
        }));
    }
    if text.contains("dikota") {
        corrections.push(json!({
            "original": "dikota",
            "suggested": "di kota",
            "rule": "Preposisi 'di/ke/dari' harus dipisah jika berfungsi sebagai preposisi"
        }));
    }
    (StatusCode::OK, Json(json!({"text": text, "corrections": corrections})))
}

async fn feedback_handler(
    State(log): State<FeedbackLog>,
    Query(params): Query<HashMap<String, String>>,
    Json(body): Json<Value>,
) -> Json<Value> {
    let accepted = params.get("accepted").cloned().unwrap_or_default();
    log.lock().unwrap().push((body, accepted));
    Json(json!({"status": "ok"}))
}

async fn spawn(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

fn checker_for(base_url: String) -> HttpChecker {
    HttpChecker::new(&ServiceConfig {
        base_url,
        timeout_secs: 5,
        ..ServiceConfig::default()
    })
    .unwrap()
}

#[tokio::test]
async fn check_returns_candidates_in_order() {
    let base = spawn(Router::new().route("/check_eyd", post(check_handler))).await;
    let checker = checker_for(base);

    let response = checker.check("rumah yg besar dikota").await.unwrap();
    assert_eq!(response.text, "rumah yg besar dikota");
    assert_eq!(
        response.corrections,
        vec![
            CorrectionCandidate::new("yg", "yang", "Singkatan tidak baku"),
            CorrectionCandidate::new(
                "dikota",
                "di kota",
                "Preposisi 'di/ke/dari' harus dipisah jika berfungsi sebagai preposisi"
            ),
        ]
    );
}

#[tokio::test]
async fn session_loads_checked_document() {
    let base = spawn(Router::new().route("/check_eyd", post(check_handler))).await;
    let checker = checker_for(base);
    let mut session = EditingSession::new();

    session.check(&checker, "rumah yg besar dikota").await.unwrap();
    session.accept(1).unwrap();

    assert_eq!(session.view().final_text, "rumah yg besar di kota");
    assert_eq!(
        session.view().preview,
        "rumah <span class=\"suggestion\">yang</span> besar \
         <span class=\"suggestion\">di kota</span>"
    );
}

#[tokio::test]
async fn service_error_detail_is_surfaced() {
    let app = Router::new().route(
        "/check_eyd",
        post(|| async { (StatusCode::BAD_REQUEST, Json(json!({"detail": "Text is empty"}))) }),
    );
    let checker = checker_for(spawn(app).await);

    let err = checker.check("tidak kosong").await.unwrap_err();
    assert!(err.is_transport());
    assert_eq!(err.to_string(), "Checker service error: HTTP 400: Text is empty");
}

#[tokio::test]
async fn plain_error_body_is_kept() {
    let app = Router::new().route(
        "/check_eyd",
        post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "model crashed") }),
    );
    let checker = checker_for(spawn(app).await);

    let err = checker.check("teks").await.unwrap_err();
    assert_eq!(err.category(), "Service");
    assert!(err.to_string().contains("500"));
    assert!(err.to_string().contains("model crashed"));
}

#[tokio::test]
async fn malformed_response_does_not_touch_session() {
    let app = Router::new().route(
        "/check_eyd",
        post(|| async { Json(json!({"text": "teks"})) }),
    );
    let checker = checker_for(spawn(app).await);
    let mut session = EditingSession::new();
    session.load("dokumen lama", Default::default());

    let err = session.check(&checker, "teks").await.unwrap_err();
    assert_eq!(err.category(), "MalformedResponse");
    assert!(err.is_transport());
    assert_eq!(session.source(), "dokumen lama");
}

#[tokio::test]
async fn unreachable_service_is_a_network_error() {
    // Bind and immediately drop a listener to get a port nothing serves.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let checker = checker_for(format!("http://{}", addr));
    let err = checker.check("teks").await.unwrap_err();
    assert_eq!(err.category(), "Network");
}

#[tokio::test]
async fn feedback_is_posted_with_decision() {
    let log: FeedbackLog = Arc::default();
    let app = Router::new()
        .route("/feedback", post(feedback_handler))
        .with_state(log.clone());
    let checker = checker_for(spawn(app).await);

    let candidate = CorrectionCandidate::new("yg", "yang", "Singkatan tidak baku");
    checker.send_feedback(&candidate, true).await.unwrap();
    checker.send_feedback(&candidate, false).await.unwrap();

    let entries = log.lock().unwrap().clone();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].0["original"], "yg");
    assert_eq!(entries[0].0["rule"], "Singkatan tidak baku");
    assert_eq!(entries[0].1, "true");
    assert_eq!(entries[1].1, "false");
}
