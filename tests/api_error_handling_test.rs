use assetdesk::api::api_router;
use assetdesk::auth::create_jwt;
use assetdesk::db;
use assetdesk::infrastructure::AppState;
use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use serde_json::{Value, json};
use tower::util::ServiceExt; // for `oneshot`

// Helper to create a test state with an in-memory database
async fn setup_test_state() -> AppState {
    let db = db::init_db("sqlite::memory:")
        .await
        .expect("Failed to init DB");
    AppState::new(db)
}

fn get_test_token() -> String {
    create_jwt("tester", "admin").expect("Failed to create token")
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap_or(Value::Null)
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("Content-Type", "application/json")
        .header("Authorization", format!("Bearer {}", get_test_token()))
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn authed_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("Authorization", format!("Bearer {}", get_test_token()))
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn test_get_asset_not_found() {
    let app = api_router(setup_test_state().await);

    let req = Request::builder()
        .uri("/assets/999")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Asset not found");
}

#[tokio::test]
async fn test_unknown_records_return_404() {
    let app = api_router(setup_test_state().await);

    for uri in [
        "/employees/42",
        "/inventory/42",
        "/maintenance/42",
        "/assets/42/history",
        "/assets/42/sheet",
        "/inventory/42/transactions",
    ] {
        let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let response = app.clone().oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "GET {}", uri);
    }

    let response = app
        .clone()
        .oneshot(authed_request("PUT", "/checkouts/42/return"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .clone()
        .oneshot(authed_request("DELETE", "/audits/42"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .clone()
        .oneshot(authed_request("DELETE", "/employees/42"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/checkouts",
            json!({ "asset_id": 1, "employee_id": 1 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_asset_idempotency() {
    let app = api_router(setup_test_state().await);

    let response = app
        .clone()
        .oneshot(authed_request("DELETE", "/assets/999"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(authed_request("DELETE", "/inventory/999"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_create_asset_invalid_input() {
    let app = api_router(setup_test_state().await);

    let cases = [
        json!({ "asset_tag": "", "name": "Laptop" }),
        json!({ "asset_tag": "LT-1", "name": "   " }),
        json!({ "asset_tag": "LT-1", "name": "Laptop", "status": "lost" }),
        json!({ "asset_tag": "LT-1", "name": "Laptop", "status": "checked_out" }),
        json!({ "asset_tag": "LT-1", "name": "Laptop", "purchase_date": "yesterday" }),
        json!({ "asset_tag": "LT-1", "name": "Laptop", "purchase_cost": -5.0 }),
    ];
    for case in cases {
        let response = app
            .clone()
            .oneshot(json_request("POST", "/assets", case.clone()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{}", case);
    }
}

#[tokio::test]
async fn test_malformed_json_is_rejected() {
    let app = api_router(setup_test_state().await);

    let req = Request::builder()
        .method("POST")
        .uri("/assets")
        .header("Content-Type", "application/json")
        .header("Authorization", format!("Bearer {}", get_test_token()))
        .body(Body::from("{ not json"))
        .unwrap();
    let response = app.oneshot(req).await.unwrap();
    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn test_mutations_require_token() {
    let app = api_router(setup_test_state().await);

    let req = Request::builder()
        .method("POST")
        .uri("/assets")
        .header("Content-Type", "application/json")
        .body(Body::from(json!({ "asset_tag": "LT-1", "name": "Laptop" }).to_string()))
        .unwrap();
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let req = Request::builder()
        .method("DELETE")
        .uri("/assets/1")
        .header("Authorization", "Bearer not-a-real-token")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let req = Request::builder()
        .method("POST")
        .uri("/inventory")
        .header("Content-Type", "application/json")
        .header("Authorization", "Token abc")
        .body(Body::from(json!({ "sku": "X", "name": "Y" }).to_string()))
        .unwrap();
    let response = app.oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_invalid_dates_and_ranges() {
    let state = setup_test_state().await;
    let app = api_router(state.clone());

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/employees",
            json!({ "name": "Ada" }),
        ))
        .await
        .unwrap();
    let employee_id = body_json(response).await["employee"]["id"].as_i64().unwrap();
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/assets",
            json!({ "asset_tag": "LT-1", "name": "Laptop" }),
        ))
        .await
        .unwrap();
    let asset_id = body_json(response).await["asset"]["id"].as_i64().unwrap();

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/checkouts",
            json!({ "asset_id": asset_id, "employee_id": employee_id, "checkout_date": "2024-05-10", "due_date": "2024-05-01" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/checkouts",
            json!({ "asset_id": asset_id, "employee_id": employee_id, "due_date": "05/01/2024" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .clone()
        .oneshot(authed_request("GET", "/audits?from=2024-13-01"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .clone()
        .oneshot(authed_request(
            "GET",
            "/reports/generate/checkout_history?from=2024-05-01&to=2024-04-01",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Nothing was checked out by the rejected requests
    let asset = state.asset_repo.find_by_id(asset_id as i32).await.unwrap().unwrap();
    assert_eq!(asset.status, "available");
}

#[tokio::test]
async fn test_inventory_transaction_validation() {
    let app = api_router(setup_test_state().await);

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/inventory",
            json!({ "sku": "CBL-1", "name": "Cable", "opening_quantity": -1 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/inventory",
            json!({ "sku": "CBL-1", "name": "Cable" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let item_id = body_json(response).await["item"]["id"].as_i64().unwrap();
    let uri = format!("/inventory/{}/transactions", item_id);

    for body in [
        json!({ "transaction_type": "receipt", "quantity": 0 }),
        json!({ "transaction_type": "issue", "quantity": -2 }),
        json!({ "transaction_type": "adjustment", "quantity": 0 }),
        json!({ "transaction_type": "transfer", "quantity": 1 }),
    ] {
        let response = app
            .clone()
            .oneshot(json_request("POST", &uri, body.clone()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{}", body);
    }

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            &uri,
            json!({ "transaction_type": "issue", "quantity": 1 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_report_format_must_be_known() {
    let app = api_router(setup_test_state().await);

    let response = app
        .oneshot(authed_request("GET", "/reports/generate/low_stock?format=pdf"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
