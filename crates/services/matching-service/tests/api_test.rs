//! HTTP API tests: the full router over an in-memory store.

mod support;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use matching_service_lib::api::{create_router, AppState};

async fn app() -> Router {
    let database = support::test_database().await;
    create_router(AppState::from_config(database, support::jwt_config()))
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

/// Register and log in, returning the bearer token.
async fn sign_up(app: &Router, name: &str, role: &str) -> String {
    let email = format!("{}@example.com", name);
    let (status, _) = send(
        app,
        Method::POST,
        "/auth/register",
        None,
        Some(json!({
            "name": name,
            "email": email,
            "password": support::PASSWORD,
            "role": role,
            "location": "Springfield",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(
        app,
        Method::POST,
        "/auth/login",
        None,
        Some(json!({ "email": email, "password": support::PASSWORD })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["role"], role);

    body["access_token"].as_str().unwrap().to_string()
}

async fn post_request(app: &Router, token: &str) -> i64 {
    let (status, body) = send(
        app,
        Method::POST,
        "/requests",
        Some(token),
        Some(json!({ "food_type": "rice", "quantity": 5, "location": "Springfield" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_i64().unwrap()
}

#[tokio::test]
async fn test_root_and_health() {
    let app = app().await;

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let (status, body) = send(&app, Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["database"]["status"], "healthy");
}

#[tokio::test]
async fn test_openapi_document_is_served() {
    let app = app().await;

    let (status, body) = send(&app, Method::GET, "/api-docs/openapi.json", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/donations/confirm"].is_object());
}

#[tokio::test]
async fn test_protected_routes_require_token() {
    let app = app().await;

    for uri in ["/me", "/dashboard", "/requests/mine", "/requests/open", "/donations/mine"] {
        let (status, body) = send(&app, Method::GET, uri, None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{}", uri);
        assert_eq!(body["error"]["code"], "UNAUTHORIZED");
    }

    let (status, body) = send(&app, Method::GET, "/me", Some("not-a-jwt"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "AUTH_ERROR");
}

#[tokio::test]
async fn test_register_validation_and_conflict() {
    let app = app().await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/auth/register",
        None,
        Some(json!({
            "name": "Rita",
            "email": "not-an-email",
            "password": "short",
            "role": "receiver",
            "location": "Springfield",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    sign_up(&app, "rita", "receiver").await;
    let (status, body) = send(
        &app,
        Method::POST,
        "/auth/register",
        None,
        Some(json!({
            "name": "Someone Else",
            "email": "rita@example.com",
            "password": "another-password",
            "role": "donor",
            "location": "Elsewhere",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["message"], "Email already exists");
}

#[tokio::test]
async fn test_whitespace_only_name_is_rejected() {
    let app = app().await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/auth/register",
        None,
        Some(json!({
            "name": "   ",
            "email": "blank@example.com",
            "password": "long-enough-pass",
            "role": "donor",
            "location": "Springfield",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["message"], "Name is required");
}

#[tokio::test]
async fn test_unknown_role_is_rejected() {
    let app = app().await;

    let (status, _) = send(
        &app,
        Method::POST,
        "/auth/register",
        None,
        Some(json!({
            "name": "Ada",
            "email": "ada@example.com",
            "password": "long-enough-pass",
            "role": "admin",
            "location": "Springfield",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_wrong_password_is_invalid_credentials() {
    let app = app().await;
    sign_up(&app, "dan", "donor").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/auth/login",
        None,
        Some(json!({ "email": "dan@example.com", "password": "wrong-password" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "INVALID_CREDENTIALS");
}

#[tokio::test]
async fn test_me_reports_stored_role() {
    let app = app().await;
    let token = sign_up(&app, "rita", "receiver").await;

    let (status, body) = send(&app, Method::GET, "/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "rita");
    assert_eq!(body["role"], "receiver");
}

#[tokio::test]
async fn test_full_matching_flow() {
    let app = app().await;
    let receiver = sign_up(&app, "rita", "receiver").await;
    let donor = sign_up(&app, "dan", "donor").await;
    let rival = sign_up(&app, "dora", "donor").await;

    let request_id = post_request(&app, &receiver).await;

    let (status, open) = send(
        &app,
        Method::GET,
        "/requests/open?location=SPRING",
        Some(&donor),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(open[0]["id"], request_id);
    assert_eq!(open[0]["receiver_name"], "rita");

    let (status, donation) = send(
        &app,
        Method::POST,
        "/donations",
        Some(&donor),
        Some(json!({ "request_id": request_id, "message": "Saturday" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(donation["status"], "pending");
    let donation_id = donation["id"].as_i64().unwrap();

    let (status, body) = send(
        &app,
        Method::POST,
        "/donations",
        Some(&rival),
        Some(json!({ "request_id": request_id })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "CONFLICT");

    let (_, open) = send(&app, Method::GET, "/requests/open", Some(&donor), None).await;
    assert_eq!(open.as_array().unwrap().len(), 0);

    let (status, confirmed) = send(
        &app,
        Method::POST,
        "/donations/confirm",
        Some(&receiver),
        Some(json!({ "donation_id": donation_id, "request_id": request_id })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(confirmed["request"]["status"], "fulfilled");
    assert_eq!(confirmed["donation"]["status"], "fulfilled");

    let (_, mine) = send(&app, Method::GET, "/requests/mine", Some(&receiver), None).await;
    assert_eq!(mine["open"].as_array().unwrap().len(), 0);
    assert_eq!(mine["fulfilled"][0]["id"], request_id);

    let (_, donations) = send(&app, Method::GET, "/donations/mine", Some(&donor), None).await;
    assert_eq!(donations[0]["status"], "fulfilled");
    assert_eq!(donations[0]["food_type"], "rice");
}

#[tokio::test]
async fn test_role_gates_return_forbidden() {
    let app = app().await;
    let receiver = sign_up(&app, "rita", "receiver").await;
    let donor = sign_up(&app, "dan", "donor").await;
    let request_id = post_request(&app, &receiver).await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/requests",
        Some(&donor),
        Some(json!({ "food_type": "rice", "quantity": 1, "location": "Springfield" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"]["code"], "FORBIDDEN");

    let (status, _) = send(
        &app,
        Method::POST,
        "/donations",
        Some(&receiver),
        Some(json!({ "request_id": request_id })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(&app, Method::GET, "/requests/open", Some(&receiver), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_other_receiver_cannot_confirm() {
    let app = app().await;
    let owner = sign_up(&app, "rita", "receiver").await;
    let stranger = sign_up(&app, "sam", "receiver").await;
    let donor = sign_up(&app, "dan", "donor").await;
    let request_id = post_request(&app, &owner).await;

    let (_, donation) = send(
        &app,
        Method::POST,
        "/donations",
        Some(&donor),
        Some(json!({ "request_id": request_id })),
    )
    .await;

    let (status, _) = send(
        &app,
        Method::POST,
        "/donations/confirm",
        Some(&stranger),
        Some(json!({ "donation_id": donation["id"], "request_id": request_id })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_request_body_validation() {
    let app = app().await;
    let receiver = sign_up(&app, "rita", "receiver").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/requests",
        Some(&receiver),
        Some(json!({ "food_type": "", "quantity": 0, "location": "Springfield" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error"]["message"],
        "Food type is required, Quantity must be at least 1"
    );

    let (status, _) = send(
        &app,
        Method::POST,
        "/donations/confirm",
        Some(&receiver),
        Some(json!({ "donation_id": "one" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_dashboard_matches_role() {
    let app = app().await;
    let receiver = sign_up(&app, "rita", "receiver").await;
    let donor = sign_up(&app, "dan", "donor").await;
    post_request(&app, &receiver).await;

    let (status, body) = send(&app, Method::GET, "/dashboard", Some(&donor), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["role"], "donor");
    assert_eq!(body["open_requests"].as_array().unwrap().len(), 1);

    let (_, body) = send(&app, Method::GET, "/dashboard", Some(&receiver), None).await;
    assert_eq!(body["role"], "receiver");
    assert_eq!(body["requests"]["open"].as_array().unwrap().len(), 1);
}
