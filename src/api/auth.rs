use crate::infrastructure::auth::{Claims, create_jwt, hash_password, verify_password};
use crate::models::user::{self, Entity as User};
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use sea_orm::*;
use serde::Deserialize;
use serde_json::json;

const MIN_PASSWORD_LEN: usize = 4;

#[derive(Deserialize)]
pub struct LoginRequest {
    username: String,
    password: String,
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    responses(
        (status = 200, description = "Token issued"),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(db): State<DatabaseConnection>,
    Json(payload): Json<LoginRequest>,
) -> impl IntoResponse {
    tracing::info!("Login attempt for user: {}", payload.username);

    let user = match User::find()
        .filter(user::Column::Username.eq(&payload.username))
        .one(&db)
        .await
    {
        Ok(Some(u)) => u,
        Ok(None) => {
            tracing::warn!("User not found: {}", payload.username);
            return (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": "Invalid credentials" })),
            )
                .into_response();
        }
        Err(e) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": e.to_string() })),
            )
                .into_response();
        }
    };

    match verify_password(&payload.password, &user.password_hash) {
        Ok(true) => match create_jwt(&user.username, &user.role) {
            Ok(token) => (StatusCode::OK, Json(json!({ "token": token }))).into_response(),
            Err(e) => {
                tracing::error!("Failed to issue token: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "Failed to issue token" })),
                )
                    .into_response()
            }
        },
        _ => {
            tracing::warn!("Password verification failed for user: {}", user.username);
            (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": "Invalid credentials" })),
            )
                .into_response()
        }
    }
}

#[derive(Deserialize)]
pub struct RegisterRequest {
    username: String,
    password: String,
}

/// The first account becomes `admin`; later ones are plain users.
pub async fn register(
    State(db): State<DatabaseConnection>,
    Json(payload): Json<RegisterRequest>,
) -> impl IntoResponse {
    let username = payload.username.trim().to_string();
    if username.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "username is required" })),
        )
            .into_response();
    }
    if payload.password.chars().count() < MIN_PASSWORD_LEN {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": format!("password must be at least {} characters", MIN_PASSWORD_LEN) })),
        )
            .into_response();
    }

    match User::find()
        .filter(user::Column::Username.eq(&username))
        .one(&db)
        .await
    {
        Ok(Some(_)) => {
            return (
                StatusCode::CONFLICT,
                Json(json!({ "error": format!("Username '{}' is taken", username) })),
            )
                .into_response();
        }
        Ok(None) => {}
        Err(e) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": e.to_string() })),
            )
                .into_response();
        }
    }

    let role = match User::find().count(&db).await {
        Ok(0) => "admin",
        Ok(_) => "user",
        Err(e) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": e.to_string() })),
            )
                .into_response();
        }
    };

    let password_hash = match hash_password(&payload.password) {
        Ok(h) => h,
        Err(e) => {
            tracing::error!("Password hashing failed: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Failed to hash password" })),
            )
                .into_response();
        }
    };

    let now = chrono::Utc::now().to_rfc3339();
    let user = user::ActiveModel {
        username: Set(username),
        password_hash: Set(password_hash),
        role: Set(role.to_string()),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    };

    match user.insert(&db).await {
        Ok(user) => (
            StatusCode::CREATED,
            Json(json!({ "message": "User created", "user": user })),
        )
            .into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": e.to_string() })),
        )
            .into_response(),
    }
}

pub async fn me(claims: Claims) -> impl IntoResponse {
    Json(json!({
        "username": claims.sub,
        "role": claims.role,
        "exp": claims.exp
    }))
}
