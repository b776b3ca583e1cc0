//! Loan management endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::Value;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{loan::CreateLoan, LoanDetails, LoanOutcome, Role},
    AppState,
};

use super::{body_id, parse_body, AuthenticatedUser, Librarian, Staff};

/// List every loan
pub async fn list_loans(
    State(state): State<AppState>,
    Staff(_claims): Staff,
) -> AppResult<Json<Vec<LoanDetails>>> {
    tracing::info!("Fetching all book loans");
    let loans = state.services.loans.get_all_loan_details().await?;
    Ok(Json(loans))
}

/// Get loan by ID
pub async fn get_loan(
    State(state): State<AppState>,
    Staff(_claims): Staff,
    Path(id): Path<Uuid>,
) -> AppResult<Json<LoanDetails>> {
    let loan = state.services.loans.get_loan_details_by_id(id).await?.ok_or_else(|| {
        tracing::warn!("Loan with ID {} not found", id);
        AppError::NotFound(format!("Loan with id {} not found", id))
    })?;
    Ok(Json(loan))
}

/// Loans of the authenticated caller
pub async fn get_loans_by_customer(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<LoanDetails>>> {
    claims.require_any_of(&Role::ALL)?;

    let loans = state.services.loans.get_loan_details_by_client(claims.user_id).await?;
    if loans.is_empty() {
        tracing::warn!("No loans found for user {}", claims.user_id);
        return Err(AppError::NotFound("No loans found for the current customer".to_string()));
    }

    Ok(Json(loans))
}

/// Check a book out to a user
pub async fn create_loan(
    State(state): State<AppState>,
    Librarian(_claims): Librarian,
    Json(body): Json<Value>,
) -> AppResult<(StatusCode, Json<LoanDetails>)> {
    let request: CreateLoan = parse_body(body)?;

    tracing::info!("Creating new loan: user={}, book={}", request.user_id, request.book_id);

    match state.services.loans.add_loan(request.user_id, request.book_id).await? {
        LoanOutcome::Success(loan) => {
            tracing::info!("Loan {} created successfully", loan.id);
            let details = match state.services.loans.get_loan_details_by_id(loan.id).await? {
                Some(details) => details,
                None => loan.into(),
            };
            Ok((StatusCode::CREATED, Json(details)))
        }
        LoanOutcome::Failure(message) => {
            tracing::warn!("Failed to create loan: {}", message);
            Err(AppError::BusinessRule(message))
        }
    }
}

/// Mark a loan as returned. Only the body's id is read.
pub async fn return_loan(
    State(state): State<AppState>,
    Librarian(_claims): Librarian,
    Path(id): Path<Uuid>,
    Json(body): Json<Value>,
) -> AppResult<StatusCode> {
    let sent_id = body_id(&body);
    if id != sent_id {
        tracing::warn!("Loan ID mismatch: route={}, body={}", id, sent_id);
        return Err(AppError::BadRequest("Route id does not match body id".to_string()));
    }

    state.services.loans.return_loan(id).await?;
    tracing::info!("Loan {} marked as returned", id);
    Ok(StatusCode::OK)
}
