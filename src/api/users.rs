//! User management endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::user::{CreateUser, UpdateUser, User},
    AppState,
};

use super::{parse_body, Admin, Librarian};

fn user_not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("User with id {} not found", id))
}

/// List all users, including deactivated ones
pub async fn list_users(
    State(state): State<AppState>,
    Admin(_claims): Admin,
) -> AppResult<Json<Vec<User>>> {
    let users = state.services.users.get_all_users().await?;
    Ok(Json(users))
}

/// Get user details by ID
pub async fn get_user(
    State(state): State<AppState>,
    Librarian(_claims): Librarian,
    Path(id): Path<Uuid>,
) -> AppResult<Json<User>> {
    let user = state.services.users.get_user_by_id(id).await?.ok_or_else(|| {
        tracing::warn!("User with ID {} not found", id);
        user_not_found(id)
    })?;
    Ok(Json(user))
}

/// Create a new user
pub async fn create_user(
    State(state): State<AppState>,
    Admin(_claims): Admin,
    Json(body): Json<Value>,
) -> AppResult<(StatusCode, Json<User>)> {
    let user: CreateUser = parse_body(body)?;
    user.validate()?;

    tracing::info!("Creating new user: {}", user.username);
    let created = state.services.users.create_user(user).await?;
    tracing::info!("User {} created successfully", created.id);
    Ok((StatusCode::CREATED, Json(created)))
}

/// Update an existing user
pub async fn update_user(
    State(state): State<AppState>,
    Admin(_claims): Admin,
    Path(id): Path<Uuid>,
    Json(body): Json<Value>,
) -> AppResult<Json<User>> {
    let user: UpdateUser = parse_body(body)?;
    user.validate()?;

    let updated = state
        .services
        .users
        .update_user(id, user)
        .await?
        .ok_or_else(|| user_not_found(id))?;

    tracing::info!("User {} updated successfully", id);
    Ok(Json(updated))
}

/// Deactivate a user (soft delete)
pub async fn deactivate_user(
    State(state): State<AppState>,
    Admin(_claims): Admin,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Value>> {
    if !state.services.users.deactivate_user(id).await? {
        tracing::warn!("User with ID {} not found for deactivation", id);
        return Err(user_not_found(id));
    }

    tracing::info!("User {} deactivated successfully", id);
    Ok(Json(json!({ "message": "User deactivated successfully" })))
}
