//! Login and registration endpoints

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::user::{RegisterRequest, Role},
    AppState,
};

/// Login request
#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Login response
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub message: String,
    pub token: String,
    #[serde(rename = "token_type")]
    pub token_type: String,
    pub user_name: String,
    pub roles: Role,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub message: String,
    pub user_id: Uuid,
}

const INVALID_CREDENTIALS: &str = "Invalid username or password";

/// Authenticate with username and password
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    tracing::info!("Login attempt for user: {}", request.username);

    let Some(user) = state.services.auth.get_user_by_username(&request.username).await? else {
        tracing::warn!("Invalid username: {}", request.username);
        return Err(AppError::Authentication(INVALID_CREDENTIALS.to_string()));
    };

    if !state.services.auth.verify_login(&request.username, &request.password).await? {
        tracing::warn!("Invalid password for user: {}", request.username);
        return Err(AppError::Authentication(INVALID_CREDENTIALS.to_string()));
    }

    if !user.is_active {
        tracing::warn!("Login refused for deactivated user: {}", request.username);
        return Err(AppError::Authentication("Account is deactivated".to_string()));
    }

    let auth = &state.config.auth;
    if auth.jwt_secret.is_empty() || auth.jwt_issuer.is_empty() || auth.jwt_audience.is_empty() {
        return Err(AppError::Internal("JWT configuration is missing or invalid".to_string()));
    }

    let token = state
        .services
        .auth
        .generate_token(&user, &auth.jwt_secret, &auth.jwt_issuer, &auth.jwt_audience)?;

    tracing::info!("User {} logged in successfully", user.username);

    Ok(Json(LoginResponse {
        message: "Login successful".to_string(),
        token,
        token_type: "Bearer".to_string(),
        user_name: user.username,
        roles: user.role,
    }))
}

/// Register a new member account
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> AppResult<Json<RegisterResponse>> {
    request.validate()?;

    let user = state.services.auth.register(request).await?;
    tracing::info!("Registered user {} ({})", user.username, user.id);

    Ok(Json(RegisterResponse {
        message: "User created successfully".to_string(),
        user_id: user.id,
    }))
}
