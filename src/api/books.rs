//! Book catalog endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::Value;
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::Book,
    AppState,
};

use super::{body_id, parse_body, Admin, AuthenticatedUser, Librarian};

/// List all books
pub async fn list_books(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
) -> AppResult<Json<Vec<Book>>> {
    let books = state.services.books.get_all_books().await?;
    Ok(Json(books))
}

/// List books that can be checked out
pub async fn list_available_books(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
) -> AppResult<Json<Vec<Book>>> {
    let books = state.services.books.get_available_books().await?;
    Ok(Json(books))
}

/// Get book by ID
pub async fn get_book(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Book>> {
    let book = state
        .services
        .books
        .get_book_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))?;
    Ok(Json(book))
}

/// Create a new book
pub async fn create_book(
    State(state): State<AppState>,
    Librarian(claims): Librarian,
    Json(body): Json<Value>,
) -> AppResult<(StatusCode, Json<Book>)> {
    let book: Book = parse_body(body)?;
    book.validate()?;

    let created = state.services.books.add_book(book).await?;
    tracing::info!("Book {} created by {}", created.id, claims.sub);
    Ok((StatusCode::CREATED, Json(created)))
}

/// Replace an existing book
pub async fn update_book(
    State(state): State<AppState>,
    Librarian(_claims): Librarian,
    Path(id): Path<Uuid>,
    Json(body): Json<Value>,
) -> AppResult<StatusCode> {
    // Checked before the rest of the body is looked at
    let sent_id = body_id(&body);
    if id != sent_id {
        tracing::warn!("Book ID mismatch: route={}, body={}", id, sent_id);
        return Err(AppError::BadRequest("Route id does not match body id".to_string()));
    }

    let book: Book = parse_body(body)?;
    book.validate()?;

    state.services.books.update_book(book).await?;
    Ok(StatusCode::OK)
}

/// Delete a book
pub async fn delete_book(
    State(state): State<AppState>,
    Admin(claims): Admin,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    state.services.books.delete_book(id).await?;
    tracing::info!("Book {} deleted by {}", id, claims.sub);
    Ok(StatusCode::OK)
}
