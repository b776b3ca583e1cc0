//! Loan (borrow) model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Loan model from database
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Loan {
    pub id: Uuid,
    pub user_id: Uuid,
    pub book_id: Uuid,
    pub loan_date: DateTime<Utc>,
    pub return_date: Option<DateTime<Utc>>,
}

impl Loan {
    /// Open loan starting now
    pub fn open(user_id: Uuid, book_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            book_id,
            loan_date: Utc::now(),
            return_date: None,
        }
    }

    pub fn is_returned(&self) -> bool {
        self.return_date.is_some()
    }

    /// Stamp the return date. A loan that is already returned keeps its
    /// first timestamp.
    pub fn mark_returned(&mut self, at: DateTime<Utc>) {
        if self.return_date.is_none() {
            self.return_date = Some(at);
        }
    }
}

/// Loan as exposed over the API: the derived returned flag plus the
/// borrower's username and the book title
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct LoanDetails {
    pub id: Uuid,
    pub user_id: Uuid,
    pub book_id: Uuid,
    pub loan_date: DateTime<Utc>,
    pub return_date: Option<DateTime<Utc>>,
    pub is_returned: bool,
    pub user_name: Option<String>,
    pub book_title: Option<String>,
}

impl From<Loan> for LoanDetails {
    fn from(loan: Loan) -> Self {
        LoanDetails {
            is_returned: loan.is_returned(),
            id: loan.id,
            user_id: loan.user_id,
            book_id: loan.book_id,
            loan_date: loan.loan_date,
            return_date: loan.return_date,
            user_name: None,
            book_title: None,
        }
    }
}

/// Create loan request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLoan {
    pub user_id: Uuid,
    pub book_id: Uuid,
}

/// Result of a loan operation: expected rejections are values, not errors
#[derive(Debug, Clone, PartialEq)]
pub enum LoanOutcome<T> {
    Success(T),
    Failure(String),
}

impl<T> LoanOutcome<T> {
    pub fn failure(message: impl Into<String>) -> Self {
        LoanOutcome::Failure(message.into())
    }

    pub fn is_success(&self) -> bool {
        matches!(self, LoanOutcome::Success(_))
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            LoanOutcome::Success(data) => Some(data),
            LoanOutcome::Failure(_) => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            LoanOutcome::Success(_) => None,
            LoanOutcome::Failure(message) => Some(message),
        }
    }
}
