//! API handlers for the library REST endpoints

pub mod auth;
pub mod books;
pub mod health;
pub mod loans;
pub mod users;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderValue, Method},
    routing::{get, patch, post},
    Router,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    error::{AppError, AppResult},
    models::user::UserClaims,
    AppState,
};

/// Extractor for authenticated user from JWT token
pub struct AuthenticatedUser(pub UserClaims);

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::Authentication("Missing authorization header".to_string()))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::Authentication("Invalid authorization header format".to_string()))?;

        let claims = state.services.auth.decode_token(token.trim())?;

        Ok(AuthenticatedUser(claims))
    }
}

/// Caller holding `User_Admin` or `User_Standard`. Rejects before the
/// request body is read.
pub struct Librarian(pub UserClaims);

/// Caller holding any staff role, read-only included
pub struct Staff(pub UserClaims);

/// Caller holding `User_Admin`
pub struct Admin(pub UserClaims);

#[async_trait]
impl FromRequestParts<AppState> for Librarian {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let AuthenticatedUser(claims) = AuthenticatedUser::from_request_parts(parts, state).await?;
        claims.require_librarian()?;
        Ok(Librarian(claims))
    }
}

#[async_trait]
impl FromRequestParts<AppState> for Staff {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let AuthenticatedUser(claims) = AuthenticatedUser::from_request_parts(parts, state).await?;
        claims.require_staff()?;
        Ok(Staff(claims))
    }
}

#[async_trait]
impl FromRequestParts<AppState> for Admin {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let AuthenticatedUser(claims) = AuthenticatedUser::from_request_parts(parts, state).await?;
        claims.require_admin()?;
        Ok(Admin(claims))
    }
}

/// Deserialize a request body that was taken as raw JSON
pub(crate) fn parse_body<T: DeserializeOwned>(body: Value) -> AppResult<T> {
    serde_json::from_value(body).map_err(|e| AppError::BadRequest(format!("Invalid request body: {}", e)))
}

/// `id` field of a raw JSON body, nil when absent or not a UUID
pub(crate) fn body_id(body: &Value) -> uuid::Uuid {
    body.get("id")
        .and_then(Value::as_str)
        .and_then(|id| id.parse().ok())
        .unwrap_or_default()
}

/// Create the application router with all routes
pub fn router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.cors.allowed_origin);

    let api_v1 = Router::new()
        .route("/health", get(health::health_check))
        // Authentication
        .route("/login/authenticate", post(auth::login))
        .route("/login/register", post(auth::register))
        // Books
        .route("/books", get(books::list_books).post(books::create_book))
        .route("/books/available", get(books::list_available_books))
        .route(
            "/books/:id",
            get(books::get_book).put(books::update_book).delete(books::delete_book),
        )
        // Loans
        .route("/loans", get(loans::list_loans).post(loans::create_loan))
        .route("/loans/by-customer", get(loans::get_loans_by_customer))
        .route("/loans/:id", get(loans::get_loan).put(loans::return_loan))
        // Users
        .route("/users", get(users::list_users).post(users::create_user))
        .route("/users/:id", get(users::get_user).put(users::update_user))
        .route("/users/:id/deactivate", patch(users::deactivate_user))
        .with_state(state);

    Router::new()
        .nest("/api/v1", api_v1)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

fn cors_layer(allowed_origin: &str) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::PATCH, Method::DELETE])
        .allow_headers(Any);

    match allowed_origin.parse::<HeaderValue>() {
        Ok(origin) if allowed_origin != "*" => cors.allow_origin(origin),
        _ => cors.allow_origin(Any),
    }
}
