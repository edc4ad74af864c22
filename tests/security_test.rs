use assetdesk::api::api_router;
use assetdesk::auth::{create_jwt, decode_jwt, hash_password, verify_password};
use assetdesk::db;
use assetdesk::infrastructure::AppState;
use assetdesk::seed;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use serde_json::{Value, json};
use tower::util::ServiceExt; // for `oneshot`

async fn setup_app() -> Router {
    let db = db::init_db("sqlite::memory:")
        .await
        .expect("Failed to init DB");
    api_router(AppState::new(db))
}

async fn post_json(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let req = Request::builder()
        .method("POST")
        .uri(uri)
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

#[test]
fn test_password_hashing() {
    let password = "secure_password";
    let hash = hash_password(password).expect("Failed to hash password");

    assert_ne!(password, hash);
    assert!(verify_password(password, &hash).unwrap());
    assert!(!verify_password("wrong_password", &hash).unwrap());
}

#[test]
fn test_password_hashes_are_salted() {
    let first = hash_password("same").unwrap();
    let second = hash_password("same").unwrap();
    assert_ne!(first, second);
}

#[test]
fn test_verify_rejects_malformed_hash() {
    assert!(verify_password("anything", "not-a-phc-string").is_err());
}

#[test]
fn test_jwt_round_trip_keeps_claims() {
    let token = create_jwt("ada", "admin").expect("Failed to create token");
    let claims = decode_jwt(&token).expect("Failed to decode token");
    assert_eq!(claims.sub, "ada");
    assert_eq!(claims.role, "admin");
    assert!(claims.exp as i64 > chrono::Utc::now().timestamp());
}

#[test]
fn test_tampered_jwt_is_rejected() {
    let token = create_jwt("ada", "user").unwrap();
    let mut tampered = token.clone();
    tampered.push('x');
    assert!(decode_jwt(&tampered).is_err());
    assert!(decode_jwt("garbage").is_err());
}

#[tokio::test]
async fn test_register_login_and_me() {
    let app = setup_app().await;

    let (status, body) = post_json(
        &app,
        "/auth/register",
        json!({ "username": "ada", "password": "lovelace" }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["user"]["role"], "admin");
    assert!(body["user"].get("password_hash").is_none());

    let (status, body) = post_json(
        &app,
        "/auth/register",
        json!({ "username": "bob", "password": "builder" }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["user"]["role"], "user");

    let (status, body) = post_json(
        &app,
        "/auth/login",
        json!({ "username": "ada", "password": "lovelace" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let token = body["token"].as_str().unwrap().to_string();

    let req = Request::builder()
        .uri("/auth/me")
        .header("Authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let me: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(me["username"], "ada");
    assert_eq!(me["role"], "admin");
}

#[tokio::test]
async fn test_register_rejects_bad_input() {
    let app = setup_app().await;

    let (status, _) = post_json(
        &app,
        "/auth/register",
        json!({ "username": "carol", "password": "abc" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = post_json(
        &app,
        "/auth/register",
        json!({ "username": "   ", "password": "long enough" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = post_json(
        &app,
        "/auth/register",
        json!({ "username": "carol", "password": "secret" }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = post_json(
        &app,
        "/auth/register",
        json!({ "username": "carol", "password": "another" }),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_login_failures_are_unauthorized() {
    let app = setup_app().await;
    post_json(
        &app,
        "/auth/register",
        json!({ "username": "dave", "password": "correct" }),
    )
    .await;

    let (status, body) = post_json(
        &app,
        "/auth/login",
        json!({ "username": "dave", "password": "incorrect" }),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid credentials");

    let (status, _) = post_json(
        &app,
        "/auth/login",
        json!({ "username": "nobody", "password": "correct" }),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_me_requires_token() {
    let app = setup_app().await;
    let req = Request::builder()
        .uri("/auth/me")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_seeded_admin_can_log_in() {
    let db = db::init_db("sqlite::memory:")
        .await
        .expect("Failed to init DB");
    seed::seed_demo_data(&db).await.expect("Failed to seed");
    // Seeding twice must not fail or duplicate rows
    seed::seed_demo_data(&db).await.expect("Failed to re-seed");
    let app = api_router(AppState::new(db));

    let (status, _) = post_json(
        &app,
        "/auth/login",
        json!({ "username": "admin", "password": "admin" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let req = Request::builder()
        .uri("/assets")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(req).await.unwrap();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["total"], 5);

    let req = Request::builder()
        .uri("/inventory?low_stock=true")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(req).await.unwrap();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["total"], 1);
    assert_eq!(body["items"][0]["sku"], "USB-C-CBL");
}
