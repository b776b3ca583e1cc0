//! Repository layer for database operations
//!
//! Services only see the traits declared here; the Postgres structs are
//! wired in by [`Repository::new`].

pub mod books;
pub mod loans;
pub mod users;

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{Book, Loan, LoanDetails, User},
};

/// Generic CRUD operations shared by every entity table.
#[async_trait]
pub trait CrudRepository<T>: Send + Sync
where
    T: Send + Sync + 'static,
{
    async fn get_all(&self) -> AppResult<Vec<T>>;

    /// `None` when no row has this id
    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<T>>;

    /// Insert a new row and return it as stored
    async fn add(&self, entity: &T) -> AppResult<T>;

    /// Replace the row with the entity's id. Returns `false` if no row matched.
    async fn update(&self, entity: &T) -> AppResult<bool>;

    /// Delete by id. Returns `false` if no row matched.
    async fn remove(&self, id: Uuid) -> AppResult<bool>;

    /// Insert or replace, keyed by id
    async fn save(&self, entity: &T) -> AppResult<()>;
}

#[async_trait]
pub trait UserRepository: CrudRepository<User> {
    async fn get_by_username(&self, username: &str) -> AppResult<Option<User>>;
}

#[async_trait]
pub trait BookRepository: CrudRepository<Book> {
    async fn get_available(&self) -> AppResult<Vec<Book>>;
}

#[async_trait]
pub trait LoanRepository: CrudRepository<Loan> {
    async fn get_by_user(&self, user_id: Uuid) -> AppResult<Vec<Loan>>;

    /// Every loan joined with its borrower's username and book title
    async fn get_all_details(&self) -> AppResult<Vec<LoanDetails>>;

    async fn get_details_by_id(&self, id: Uuid) -> AppResult<Option<LoanDetails>>;

    async fn get_details_by_user(&self, user_id: Uuid) -> AppResult<Vec<LoanDetails>>;

    /// Insert `loan` and mark its book unavailable as one unit.
    ///
    /// Returns `false`, writing nothing, when the book is no longer
    /// available at commit time.
    async fn checkout(&self, loan: &Loan) -> AppResult<bool>;
}

/// Main repository struct holding one handle per entity table
#[derive(Clone)]
pub struct Repository {
    pub books: Arc<dyn BookRepository>,
    pub users: Arc<dyn UserRepository>,
    pub loans: Arc<dyn LoanRepository>,
}

impl Repository {
    /// Create Postgres-backed repositories on the given pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            books: Arc::new(books::BooksRepository::new(pool.clone())),
            users: Arc::new(users::UsersRepository::new(pool.clone())),
            loans: Arc::new(loans::LoansRepository::new(pool)),
        }
    }
}
