use assetdesk::auth::create_jwt;
use assetdesk::db;
use assetdesk::server::build_router;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
    response::Response,
};
use serde_json::{Value, json};
use tower::util::ServiceExt; // for `oneshot`

const BOUNDARY: &str = "assetdesk-test-boundary";

async fn setup_app() -> Router {
    let db = db::init_db("sqlite::memory:")
        .await
        .expect("Failed to init DB");
    build_router(db, &[])
}

fn bearer() -> String {
    format!("Bearer {}", create_jwt("tester", "admin").unwrap())
}

fn multipart_body(field: &str, filename: &str, content: &str) -> String {
    format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\nContent-Type: text/csv\r\n\r\n{content}\r\n--{b}--\r\n",
        b = BOUNDARY,
    )
}

async fn upload(app: &Router, uri: &str, field: &str, content: &str) -> (StatusCode, Value) {
    upload_raw(app, uri, multipart_body(field, "upload.csv", content)).await
}

async fn upload_raw(app: &Router, uri: &str, body: String) -> (StatusCode, Value) {
    let req = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::AUTHORIZATION, bearer())
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap();
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

async fn get(app: &Router, uri: &str) -> Response {
    let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
    app.clone().oneshot(req).await.unwrap()
}

async fn body_text(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn post_json(app: &Router, uri: &str, body: Value) -> Value {
    let req = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::AUTHORIZATION, bearer())
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let response = app.clone().oneshot(req).await.unwrap();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap_or(Value::Null)
}

#[tokio::test]
async fn test_import_assets_reports_row_errors() {
    let app = setup_app().await;
    post_json(
        &app,
        "/api/assets",
        json!({ "asset_tag": "LT-EXISTING", "name": "Already here" }),
    )
    .await;

    let csv = "Asset Tag,Name,Category,Purchase Cost,Status\n\
               LT-1,Laptop one,Laptop,999.99,\n\
               LT-2,Laptop two,Laptop,not-a-number,\n\
               LT-1,Duplicate in file,Laptop,,\n\
               LT-EXISTING,Clashes with database,,,\n\
               LT-3,,Laptop,,\n\
               MN-1,Monitor,Monitor,,broken\n\
               MN-2,Monitor two,Monitor,150,in_maintenance";

    let (status, body) = upload(&app, "/api/import/assets", "file", csv).await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["imported"], 2);
    assert_eq!(body["skipped"], 5);

    let rows: Vec<i64> = body["errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["row"].as_i64().unwrap())
        .collect();
    assert_eq!(rows, vec![2, 3, 4, 5, 6]);

    let response = get(&app, "/api/assets?category=Laptop").await;
    let listed: Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(listed["total"], 1);
    assert_eq!(listed["assets"][0]["purchase_cost"], 999.99);

    let response = get(&app, "/api/assets?status=in_maintenance").await;
    let listed: Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(listed["assets"][0]["asset_tag"], "MN-2");
}

#[tokio::test]
async fn test_import_rejects_missing_file_and_columns() {
    let app = setup_app().await;

    let (status, body) = upload(&app, "/api/import/assets", "attachment", "Asset Tag,Name\nA,B").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No file uploaded");

    let (status, body) = upload(&app, "/api/import/assets", "file", "Name,Category\nLaptop,Laptop").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("asset_tag"));
}

#[tokio::test]
async fn test_import_reports_malformed_upload() {
    let app = setup_app().await;

    // Part headers never terminated
    let body = format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"upload.csv\"\r\n",
        b = BOUNDARY,
    );
    let (status, body) = upload_raw(&app, "/api/import/assets", body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let error = body["error"].as_str().unwrap();
    assert!(error.starts_with("Malformed multipart upload"), "{}", error);
}

#[tokio::test]
async fn test_import_reads_model_column() {
    let app = setup_app().await;

    let csv = "Asset Tag,Name,Manufacturer,Model\n\
               LT-40,Laptop,Lenovo,T14 Gen 3";
    let (status, body) = upload(&app, "/api/import/assets", "file", csv).await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["imported"], 1);

    let response = get(&app, "/api/assets?q=T14").await;
    let listed: Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(listed["total"], 1);
    assert_eq!(listed["assets"][0]["model"], "T14 Gen 3");

    let csv = body_text(get(&app, "/api/export/assets?columns=asset_tag,model").await).await;
    assert!(csv.starts_with("Asset Tag,Model"), "{}", csv);
    assert!(csv.contains("LT-40,T14 Gen 3"));
}

#[tokio::test]
async fn test_import_inventory_books_opening_stock() {
    let app = setup_app().await;

    let csv = "sku,name,unit,quantity_on_hand,reorder_level,unit_cost\n\
               PAPER-A4,A4 paper,ream,40,10,4.50\n\
               TONER,Toner,each,-3,1,80\n\
               PENS,Pens,box,,2,";

    let (status, body) = upload(&app, "/api/import/inventory", "file", csv).await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["imported"], 2);
    assert_eq!(body["errors"][0]["row"], 2);

    let response = get(&app, "/api/inventory?q=PAPER").await;
    let listed: Value = serde_json::from_str(&body_text(response).await).unwrap();
    let item = &listed["items"][0];
    assert_eq!(item["quantity_on_hand"], 40);
    assert_eq!(item["unit"], "ream");

    let response = get(
        &app,
        &format!("/api/inventory/{}/transactions", item["id"].as_i64().unwrap()),
    )
    .await;
    let history: Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(history["total"], 1);
    assert_eq!(history["transactions"][0]["transaction_type"], "receipt");
    assert_eq!(history["transactions"][0]["quantity"], 40);
}

#[tokio::test]
async fn test_export_assets_with_selected_columns() {
    let app = setup_app().await;
    post_json(
        &app,
        "/api/assets",
        json!({ "asset_tag": "LT-9", "name": "Laptop, 14\"", "location": "HQ" }),
    )
    .await;

    let response = get(&app, "/api/export/assets?columns=asset_tag,name").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        response.headers()[header::CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("text/csv")
    );
    let disposition = response.headers()[header::CONTENT_DISPOSITION]
        .to_str()
        .unwrap()
        .to_string();
    assert!(disposition.starts_with("attachment; filename=\"assets_"));

    let text = body_text(response).await;
    let mut lines = text.lines();
    assert_eq!(lines.next(), Some("Asset Tag,Name"));
    assert_eq!(lines.next(), Some("LT-9,\"Laptop, 14\"\"\""));

    let response = get(&app, "/api/export/assets?columns=asset_tag,colour").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_exported_assets_can_be_imported_again() {
    let source = setup_app().await;
    post_json(
        &source,
        "/api/assets",
        json!({ "asset_tag": "PR-1", "name": "Printer", "category": "Printer", "purchase_date": "2023-02-01" }),
    )
    .await;
    let csv = body_text(get(&source, "/api/export/assets").await).await;

    let target = setup_app().await;
    let (status, body) = upload(&target, "/api/import/assets", "file", &csv).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["imported"], 1);
    assert_eq!(body["skipped"], 0);
}

#[tokio::test]
async fn test_export_inventory_csv() {
    let app = setup_app().await;
    post_json(
        &app,
        "/api/inventory",
        json!({ "sku": "CBL", "name": "Cable", "unit_cost": 2.5, "opening_quantity": 4 }),
    )
    .await;

    let response = get(&app, "/api/export/inventory?columns=sku,quantity_on_hand").await;
    assert_eq!(response.status(), StatusCode::OK);
    let text = body_text(response).await;
    assert!(text.starts_with("SKU,Quantity On Hand"));
    assert!(text.contains("CBL,4"));
}

#[tokio::test]
async fn test_backup_contains_everything_but_users() {
    let app = setup_app().await;
    post_json(
        &app,
        "/api/assets",
        json!({ "asset_tag": "LT-1", "name": "Laptop" }),
    )
    .await;
    post_json(&app, "/api/employees", json!({ "name": "Ada" })).await;

    let response = get(&app, "/api/export").await;
    assert_eq!(response.status(), StatusCode::OK);
    let disposition = response.headers()[header::CONTENT_DISPOSITION]
        .to_str()
        .unwrap()
        .to_string();
    assert!(disposition.contains("assetdesk_backup_"));

    let backup: Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(backup["assets"].as_array().unwrap().len(), 1);
    assert_eq!(backup["employees"].as_array().unwrap().len(), 1);
    assert!(backup["inventory_transactions"].is_array());
    assert!(backup.get("users").is_none());
}

#[tokio::test]
async fn test_asset_sheet_is_escaped_html() {
    let app = setup_app().await;
    let created = post_json(
        &app,
        "/api/assets",
        json!({ "asset_tag": "LT-<1>", "name": "Tom & Jerry's laptop", "purchase_cost": 1234.5 }),
    )
    .await;
    let id = created["asset"]["id"].as_i64().unwrap();

    let response = get(&app, &format!("/api/assets/{}/sheet", id)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "text/html; charset=utf-8"
    );
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "inline; filename=\"asset-LT-_1_.html\""
    );

    let html = body_text(response).await;
    assert!(html.contains("Tom &amp; Jerry&#39;s laptop"));
    assert!(html.contains("LT-&lt;1&gt;"));
    assert!(!html.contains("LT-<1>"));
    assert!(html.contains("1234.50"));
    assert!(html.contains("Not assigned"));
    assert!(html.contains("Never audited"));
}
