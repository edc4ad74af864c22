use axum::{
    Json,
    extract::{Path, Query, State},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use serde_json::json;

use crate::infrastructure::auth::Claims;
use crate::modules::export;
use crate::services::report_service::{self, CreateReportDto, ReportOutput, ReportParams};

#[derive(Debug, Default, Deserialize)]
pub struct RunQuery {
    pub format: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct GenerateQuery {
    pub format: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub category: Option<String>,
    pub status: Option<String>,
}

/// Render report output as JSON (default) or a CSV attachment
fn render(output: ReportOutput, format: Option<&str>, extra: serde_json::Value) -> Response {
    match format.unwrap_or("json") {
        "json" => {
            let mut body = json!({ "report": output });
            if let (Some(map), serde_json::Value::Object(extra)) = (body.as_object_mut(), extra) {
                map.extend(extra);
            }
            Json(body).into_response()
        }
        "csv" => match export::report_csv(&output) {
            Ok(bytes) => {
                let filename = format!(
                    "{}_{}.csv",
                    output.report_type,
                    chrono::Utc::now().format("%Y-%m-%d")
                );
                let mut headers = HeaderMap::new();
                headers.insert(
                    header::CONTENT_TYPE,
                    HeaderValue::from_static("text/csv; charset=utf-8"),
                );
                if let Ok(v) = HeaderValue::from_str(&format!("attachment; filename=\"{}\"", filename)) {
                    headers.insert(header::CONTENT_DISPOSITION, v);
                }
                (StatusCode::OK, headers, bytes).into_response()
            }
            Err(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": format!("Failed to write CSV: {}", e) })),
            )
                .into_response(),
        },
        other => unsupported_format(Some(other)),
    }
}

fn is_supported_format(format: Option<&str>) -> bool {
    matches!(format.unwrap_or("json"), "json" | "csv")
}

fn unsupported_format(format: Option<&str>) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "error": format!("Unsupported format '{}'", format.unwrap_or_default()) })),
    )
        .into_response()
}

pub async fn list_reports(State(db): State<DatabaseConnection>) -> impl IntoResponse {
    match report_service::list_reports(&db).await {
        Ok(reports) => Json(json!({
            "reports": reports,
            "report_types": report_service::REPORT_TYPES
        }))
        .into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn create_report(
    State(db): State<DatabaseConnection>,
    claims: Claims,
    Json(payload): Json<CreateReportDto>,
) -> impl IntoResponse {
    match report_service::create_report(&db, payload, Some(claims.username())).await {
        Ok(report) => (
            StatusCode::CREATED,
            Json(json!({
                "message": "Report saved",
                "report": report
            })),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn delete_report(
    State(db): State<DatabaseConnection>,
    claims: Claims,
    Path(id): Path<i32>,
) -> impl IntoResponse {
    match report_service::delete_report(&db, id, Some(claims.username())).await {
        Ok(()) => Json(json!({ "message": "Report deleted" })).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn run_report(
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
    Query(query): Query<RunQuery>,
) -> impl IntoResponse {
    let format = query.format.as_deref();
    if !is_supported_format(format) {
        return unsupported_format(format);
    }

    match report_service::run_saved_report(&db, id).await {
        Ok((saved, output)) => render(output, format, json!({ "definition": saved })),
        Err(e) => e.into_response(),
    }
}

pub async fn generate_report(
    State(db): State<DatabaseConnection>,
    Path(report_type): Path<String>,
    Query(query): Query<GenerateQuery>,
) -> impl IntoResponse {
    let format = query.format.as_deref();
    if !is_supported_format(format) {
        return unsupported_format(format);
    }

    let params = ReportParams {
        from: query.from.clone(),
        to: query.to.clone(),
        category: query.category.clone(),
        status: query.status.clone(),
    };

    match report_service::generate(&db, &report_type, &params).await {
        Ok(output) => render(output, format, json!({})),
        Err(e) => e.into_response(),
    }
}
