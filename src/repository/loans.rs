//! Loans repository for database operations

use async_trait::async_trait;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{Loan, LoanDetails},
};

use super::{CrudRepository, LoanRepository};

const DETAILS_SELECT: &str = r#"
    SELECT l.id, l.user_id, l.book_id, l.loan_date, l.return_date,
           (l.return_date IS NOT NULL) AS is_returned,
           u.username AS user_name, b.title AS book_title
    FROM book_loans l
    LEFT JOIN users u ON u.id = l.user_id
    LEFT JOIN books b ON b.id = l.book_id
"#;

#[derive(Clone)]
pub struct LoansRepository {
    pool: Pool<Postgres>,
}

impl LoansRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CrudRepository<Loan> for LoansRepository {
    async fn get_all(&self) -> AppResult<Vec<Loan>> {
        let loans = sqlx::query_as::<_, Loan>("SELECT * FROM book_loans ORDER BY loan_date DESC")
            .fetch_all(&self.pool)
            .await?;
        Ok(loans)
    }

    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<Loan>> {
        let loan = sqlx::query_as::<_, Loan>("SELECT * FROM book_loans WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(loan)
    }

    async fn add(&self, loan: &Loan) -> AppResult<Loan> {
        let created = sqlx::query_as::<_, Loan>(
            r#"
            INSERT INTO book_loans (id, user_id, book_id, loan_date, return_date)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(loan.id)
        .bind(loan.user_id)
        .bind(loan.book_id)
        .bind(loan.loan_date)
        .bind(loan.return_date)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    async fn update(&self, loan: &Loan) -> AppResult<bool> {
        // COALESCE keeps a return date that is already set
        let result = sqlx::query(
            r#"
            UPDATE book_loans
            SET user_id = $2, book_id = $3, loan_date = $4,
                return_date = COALESCE(return_date, $5)
            WHERE id = $1
            "#,
        )
        .bind(loan.id)
        .bind(loan.user_id)
        .bind(loan.book_id)
        .bind(loan.loan_date)
        .bind(loan.return_date)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn remove(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM book_loans WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn save(&self, loan: &Loan) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO book_loans (id, user_id, book_id, loan_date, return_date)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (id) DO UPDATE
            SET return_date = COALESCE(book_loans.return_date, EXCLUDED.return_date)
            "#,
        )
        .bind(loan.id)
        .bind(loan.user_id)
        .bind(loan.book_id)
        .bind(loan.loan_date)
        .bind(loan.return_date)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl LoanRepository for LoansRepository {
    async fn get_by_user(&self, user_id: Uuid) -> AppResult<Vec<Loan>> {
        let loans = sqlx::query_as::<_, Loan>(
            "SELECT * FROM book_loans WHERE user_id = $1 ORDER BY loan_date DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(loans)
    }

    async fn get_all_details(&self) -> AppResult<Vec<LoanDetails>> {
        let loans = sqlx::query_as::<_, LoanDetails>(&format!("{} ORDER BY l.loan_date DESC", DETAILS_SELECT))
            .fetch_all(&self.pool)
            .await?;
        Ok(loans)
    }

    async fn get_details_by_id(&self, id: Uuid) -> AppResult<Option<LoanDetails>> {
        let loan = sqlx::query_as::<_, LoanDetails>(&format!("{} WHERE l.id = $1", DETAILS_SELECT))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(loan)
    }

    async fn get_details_by_user(&self, user_id: Uuid) -> AppResult<Vec<LoanDetails>> {
        let loans = sqlx::query_as::<_, LoanDetails>(&format!(
            "{} WHERE l.user_id = $1 ORDER BY l.loan_date DESC",
            DETAILS_SELECT
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(loans)
    }

    async fn checkout(&self, loan: &Loan) -> AppResult<bool> {
        let mut tx = self.pool.begin().await?;

        let flipped = sqlx::query(
            "UPDATE books SET is_available = FALSE WHERE id = $1 AND is_available = TRUE",
        )
        .bind(loan.book_id)
        .execute(&mut *tx)
        .await?;

        if flipped.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(false);
        }

        sqlx::query(
            r#"
            INSERT INTO book_loans (id, user_id, book_id, loan_date, return_date)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(loan.id)
        .bind(loan.user_id)
        .bind(loan.book_id)
        .bind(loan.loan_date)
        .bind(loan.return_date)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(true)
    }
}
