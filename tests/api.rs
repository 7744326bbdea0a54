#![cfg(feature = "server")]

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use finance_tracker::api::{app_router, AppState};
use finance_tracker::{Config, TransactionStore};
use serde_json::{json, Value};
use tower::ServiceExt;

fn build_test_router() -> Router {
    let store = TransactionStore::open_in_memory().unwrap();
    app_router(AppState::new(store), &Config::default())
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

async fn post_json(app: &Router, body: Value) -> (StatusCode, Value) {
    send(
        app,
        Request::builder()
            .method(Method::POST)
            .uri("/transactions")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, Request::builder().uri(uri).body(Body::empty()).unwrap()).await
}

async fn seed_example(app: &Router) {
    let (status, _) = post_json(
        app,
        json!({"date": "2024-01-05", "amount": 1000, "category": "Income", "sub_category": "Salary"}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = post_json(
        app,
        json!({"date": "2024-01-10", "amount": 200, "category": "Expense", "sub_category": "Food"}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn create_transaction_returns_created_record() {
    let app = build_test_router();

    let (status, body) = post_json(
        &app,
        json!({
            "date": "2024-01-05",
            "amount": 1000.5,
            "category": "Income",
            "sub_category": "Salary",
            "description": "January paycheck"
        }),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert!(body["id"].as_i64().is_some());
    assert_eq!(body["date"], "2024-01-05");
    assert_eq!(body["amount"], 1000.5);
    assert_eq!(body["category"], "Income");
    assert_eq!(body["description"], "January paycheck");
}

#[tokio::test]
async fn create_transaction_assigns_distinct_ids() {
    let app = build_test_router();
    let payload = json!({"date": "2024-01-05", "amount": 10, "category": "Expense"});

    let (_, first) = post_json(&app, payload.clone()).await;
    let (_, second) = post_json(&app, payload).await;

    assert_ne!(first["id"], second["id"]);
}

#[tokio::test]
async fn create_transaction_rejects_invalid_fields() {
    let app = build_test_router();

    let (status, body) = post_json(
        &app,
        json!({"date": "2024-13-01", "amount": "lots", "category": "Gift"}),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 400);
    let fields: Vec<&str> = body["errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["field"].as_str().unwrap())
        .collect();
    assert_eq!(fields, vec!["date", "amount", "category"]);
}

#[tokio::test]
async fn create_transaction_rejects_missing_fields_and_bad_json() {
    let app = build_test_router();

    let (status, _) = post_json(&app, json!({"amount": 5})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &app,
        Request::builder()
            .method(Method::POST)
            .uri("/transactions")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 400);

    // Wrong JSON type for a field
    let (status, _) = post_json(&app, json!({"date": 20240105, "amount": 5, "category": "Income"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn summary_for_january() {
    let app = build_test_router();
    seed_example(&app).await;
    post_json(&app, json!({"date": "2024-02-01", "amount": 50, "category": "Expense"})).await;

    let (status, body) = get(&app, "/transactions?start_date=2024-01-01&end_date=2024-01-31").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["start_date"], "2024-01-01");
    assert_eq!(body["end_date"], "2024-01-31");
    assert_eq!(body["total_income"], 1000.0);
    assert_eq!(body["total_expense"], 200.0);
    assert_eq!(body["net_savings"], 800.0);

    let dates: Vec<&str> = body["transactions"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["date"].as_str().unwrap())
        .collect();
    assert_eq!(dates, vec!["2024-01-05", "2024-01-10"]);
}

#[tokio::test]
async fn summary_for_empty_range_is_zero() {
    let app = build_test_router();
    seed_example(&app).await;

    let (status, body) = get(&app, "/transactions?start_date=2023-01-01&end_date=2023-12-31").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_income"], 0.0);
    assert_eq!(body["total_expense"], 0.0);
    assert_eq!(body["net_savings"], 0.0);
    assert!(body["transactions"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn summary_rejects_bad_ranges() {
    let app = build_test_router();

    let (status, body) = get(&app, "/transactions?start_date=2024-02-01&end_date=2024-01-01").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"][0]["field"], "date_range");

    let (status, _) = get(&app, "/transactions?start_date=2024-01-01").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = get(&app, "/transactions?start_date=yesterday&end_date=2024-01-01").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn malformed_query_string_gets_json_error_body() {
    let app = build_test_router();

    let (status, body) = get(
        &app,
        "/transactions?start_date=2024-01-01&start_date=2024-01-02&end_date=2024-01-31",
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 400);
    assert!(body["message"].as_str().is_some());

    let (status, body) = get(
        &app,
        "/health-score?start_date=2024-01-01&end_date=2024-01-31&end_date=2024-02-01",
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 400);
}

#[tokio::test]
async fn health_score_for_january() {
    let app = build_test_router();
    seed_example(&app).await;

    let (status, body) = get(&app, "/health-score?start_date=2024-01-01&end_date=2024-01-31").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["start_date"], "2024-01-01");
    assert_eq!(body["savings_rate"], 0.8);
    assert_eq!(body["expense_breakdown"], json!({"Food": 1.0}));
    assert_eq!(body["score"], 90);
    assert_eq!(body["label"], "Healthy");
}

#[tokio::test]
async fn health_score_without_income_has_null_rate() {
    let app = build_test_router();
    post_json(&app, json!({"date": "2024-03-02", "amount": 300, "category": "Expense", "sub_category": "Rent"})).await;

    let (status, body) = get(&app, "/health-score?start_date=2024-03-01&end_date=2024-03-31").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["savings_rate"].is_null());
    assert_eq!(body["score"], 85);
}

#[tokio::test]
async fn health_score_rejects_inverted_range() {
    let app = build_test_router();

    let (status, _) = get(&app, "/health-score?start_date=2024-02-01&end_date=2024-01-01").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn status_reports_count() {
    let app = build_test_router();
    seed_example(&app).await;

    let (status, body) = get(&app, "/status").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["transactions"], 2);
}

#[tokio::test]
async fn cors_allows_local_dev_origin() {
    let app = build_test_router();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/status")
                .header(header::ORIGIN, "http://localhost:5173")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(
        response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
        "http://localhost:5173"
    );
}
