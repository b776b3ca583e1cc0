//! Loan management service

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{Loan, LoanDetails, LoanOutcome},
    repository::{BookRepository, LoanRepository},
};

pub const BOOK_NOT_FOUND: &str = "Book not found.";
pub const BOOK_NOT_AVAILABLE: &str = "Book is not available for loan.";

#[derive(Clone)]
pub struct LoansService {
    loans: Arc<dyn LoanRepository>,
    books: Arc<dyn BookRepository>,
}

impl LoansService {
    pub fn new(loans: Arc<dyn LoanRepository>, books: Arc<dyn BookRepository>) -> Self {
        Self { loans, books }
    }

    pub async fn get_all_loans(&self) -> AppResult<Vec<Loan>> {
        self.loans.get_all().await
    }

    pub async fn get_loan_by_id(&self, id: Uuid) -> AppResult<Option<Loan>> {
        self.loans.get_by_id(id).await
    }

    /// Check a book out to a user.
    ///
    /// A missing or already loaned book is a [`LoanOutcome::Failure`], not
    /// an error. The loan insert and the availability flip commit together.
    pub async fn add_loan(&self, user_id: Uuid, book_id: Uuid) -> AppResult<LoanOutcome<Loan>> {
        let Some(book) = self.books.get_by_id(book_id).await? else {
            return Ok(LoanOutcome::failure(BOOK_NOT_FOUND));
        };

        if !book.is_available {
            return Ok(LoanOutcome::failure(BOOK_NOT_AVAILABLE));
        }

        let loan = Loan::open(user_id, book_id);

        // Another checkout may have won between the read and the commit
        if !self.loans.checkout(&loan).await? {
            return Ok(LoanOutcome::failure(BOOK_NOT_AVAILABLE));
        }

        Ok(LoanOutcome::Success(loan))
    }

    /// Stamp the return date of a loan. Unknown ids are ignored.
    ///
    /// The book stays unavailable after a return.
    pub async fn return_loan(&self, id: Uuid) -> AppResult<()> {
        if let Some(mut loan) = self.loans.get_by_id(id).await? {
            loan.mark_returned(Utc::now());
            self.loans.save(&loan).await?;
        }
        Ok(())
    }

    /// Loans (open and returned) of the calling user
    pub async fn get_loans_by_client(&self, caller_id: Uuid) -> AppResult<Vec<Loan>> {
        self.loans.get_by_user(caller_id).await
    }

    pub async fn get_all_loan_details(&self) -> AppResult<Vec<LoanDetails>> {
        self.loans.get_all_details().await
    }

    pub async fn get_loan_details_by_id(&self, id: Uuid) -> AppResult<Option<LoanDetails>> {
        self.loans.get_details_by_id(id).await
    }

    pub async fn get_loan_details_by_client(&self, caller_id: Uuid) -> AppResult<Vec<LoanDetails>> {
        self.loans.get_details_by_user(caller_id).await
    }

    pub async fn get_active_loans_by_user(&self, user_id: Uuid) -> AppResult<Vec<Loan>> {
        let loans = self.loans.get_by_user(user_id).await?;
        Ok(loans.into_iter().filter(|loan| !loan.is_returned()).collect())
    }
}
