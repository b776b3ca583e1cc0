//! In-memory repositories and fixtures shared by the integration tests
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use axum::Router;
use chrono::{TimeZone, Utc};
use uuid::Uuid;

use library_server::{
    api,
    config::{AppConfig, AuthConfig},
    error::{AppError, AppResult},
    models::{Book, Loan, LoanDetails, Role, User},
    repository::{
        users::USERNAME_TAKEN, BookRepository, CrudRepository, LoanRepository, Repository, UserRepository,
    },
    services::{password, Services},
    AppState,
};

pub const SECRET: &str = "test-secret";
pub const ISSUER: &str = "library-tests";
pub const AUDIENCE: &str = "library-tests-clients";

#[derive(Default)]
pub struct State {
    pub users: HashMap<Uuid, User>,
    pub books: HashMap<Uuid, Book>,
    pub loans: HashMap<Uuid, Loan>,
    /// Number of write operations performed through the repositories
    pub writes: usize,
}

/// One shared in-memory database behind the three repository traits
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<State>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    pub fn repository(&self) -> Repository {
        Repository {
            books: Arc::new(MemoryBooks(self.clone())),
            users: Arc::new(MemoryUsers(self.clone())),
            loans: Arc::new(MemoryLoans(self.clone())),
        }
    }

    pub fn insert_book(&self, title: &str, available: bool) -> Book {
        let mut book = Book::new(title, "Some Author", Utc.with_ymd_and_hms(1999, 1, 1, 0, 0, 0).unwrap());
        book.is_available = available;
        self.lock().books.insert(book.id, book.clone());
        book
    }

    pub fn insert_user(&self, username: &str, password: &str, role: Role) -> User {
        let user = User::new(
            username.to_string(),
            password::hash_password(password).unwrap(),
            format!("{}@library.test", username),
            String::new(),
            role,
        );
        self.lock().users.insert(user.id, user.clone());
        user
    }

    pub fn insert_loan(&self, loan: Loan) -> Loan {
        self.lock().loans.insert(loan.id, loan.clone());
        loan
    }

    pub fn writes(&self) -> usize {
        self.lock().writes
    }
}

pub struct MemoryBooks(MemoryStore);
pub struct MemoryUsers(MemoryStore);
pub struct MemoryLoans(MemoryStore);

#[async_trait]
impl CrudRepository<Book> for MemoryBooks {
    async fn get_all(&self) -> AppResult<Vec<Book>> {
        Ok(self.0.lock().books.values().cloned().collect())
    }

    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<Book>> {
        Ok(self.0.lock().books.get(&id).cloned())
    }

    async fn add(&self, book: &Book) -> AppResult<Book> {
        let mut state = self.0.lock();
        state.writes += 1;
        state.books.insert(book.id, book.clone());
        Ok(book.clone())
    }

    async fn update(&self, book: &Book) -> AppResult<bool> {
        let mut state = self.0.lock();
        state.writes += 1;
        match state.books.get_mut(&book.id) {
            Some(existing) => {
                *existing = book.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn remove(&self, id: Uuid) -> AppResult<bool> {
        let mut state = self.0.lock();
        state.writes += 1;
        Ok(state.books.remove(&id).is_some())
    }

    async fn save(&self, book: &Book) -> AppResult<()> {
        let mut state = self.0.lock();
        state.writes += 1;
        state.books.insert(book.id, book.clone());
        Ok(())
    }
}

#[async_trait]
impl BookRepository for MemoryBooks {
    async fn get_available(&self) -> AppResult<Vec<Book>> {
        Ok(self.0.lock().books.values().filter(|b| b.is_available).cloned().collect())
    }
}

#[async_trait]
impl CrudRepository<User> for MemoryUsers {
    async fn get_all(&self) -> AppResult<Vec<User>> {
        Ok(self.0.lock().users.values().cloned().collect())
    }

    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        Ok(self.0.lock().users.get(&id).cloned())
    }

    async fn add(&self, user: &User) -> AppResult<User> {
        let mut state = self.0.lock();
        // Same rule as the unique index on users.username
        if state.users.values().any(|u| u.username == user.username) {
            return Err(AppError::BusinessRule(USERNAME_TAKEN.to_string()));
        }
        state.writes += 1;
        state.users.insert(user.id, user.clone());
        Ok(user.clone())
    }

    async fn update(&self, user: &User) -> AppResult<bool> {
        let mut state = self.0.lock();
        state.writes += 1;
        match state.users.get_mut(&user.id) {
            Some(existing) => {
                *existing = user.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn remove(&self, id: Uuid) -> AppResult<bool> {
        let mut state = self.0.lock();
        state.writes += 1;
        match state.users.get_mut(&id) {
            Some(user) => {
                user.is_active = false;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn save(&self, user: &User) -> AppResult<()> {
        let mut state = self.0.lock();
        state.writes += 1;
        state.users.insert(user.id, user.clone());
        Ok(())
    }
}

#[async_trait]
impl UserRepository for MemoryUsers {
    async fn get_by_username(&self, username: &str) -> AppResult<Option<User>> {
        Ok(self.0.lock().users.values().find(|u| u.username == username).cloned())
    }
}

#[async_trait]
impl CrudRepository<Loan> for MemoryLoans {
    async fn get_all(&self) -> AppResult<Vec<Loan>> {
        Ok(self.0.lock().loans.values().cloned().collect())
    }

    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<Loan>> {
        Ok(self.0.lock().loans.get(&id).cloned())
    }

    async fn add(&self, loan: &Loan) -> AppResult<Loan> {
        let mut state = self.0.lock();
        state.writes += 1;
        state.loans.insert(loan.id, loan.clone());
        Ok(loan.clone())
    }

    async fn update(&self, loan: &Loan) -> AppResult<bool> {
        let mut state = self.0.lock();
        state.writes += 1;
        match state.loans.get_mut(&loan.id) {
            Some(existing) => {
                let return_date = existing.return_date.or(loan.return_date);
                *existing = loan.clone();
                existing.return_date = return_date;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn remove(&self, id: Uuid) -> AppResult<bool> {
        let mut state = self.0.lock();
        state.writes += 1;
        Ok(state.loans.remove(&id).is_some())
    }

    async fn save(&self, loan: &Loan) -> AppResult<()> {
        let mut state = self.0.lock();
        state.writes += 1;
        let return_date = state
            .loans
            .get(&loan.id)
            .and_then(|existing| existing.return_date)
            .or(loan.return_date);
        let mut stored = loan.clone();
        stored.return_date = return_date;
        state.loans.insert(loan.id, stored);
        Ok(())
    }
}

#[async_trait]
impl LoanRepository for MemoryLoans {
    async fn get_by_user(&self, user_id: Uuid) -> AppResult<Vec<Loan>> {
        Ok(self.0.lock().loans.values().filter(|l| l.user_id == user_id).cloned().collect())
    }

    async fn get_all_details(&self) -> AppResult<Vec<LoanDetails>> {
        let state = self.0.lock();
        Ok(state.loans.values().map(|l| details(&state, l)).collect())
    }

    async fn get_details_by_id(&self, id: Uuid) -> AppResult<Option<LoanDetails>> {
        let state = self.0.lock();
        Ok(state.loans.get(&id).map(|l| details(&state, l)))
    }

    async fn get_details_by_user(&self, user_id: Uuid) -> AppResult<Vec<LoanDetails>> {
        let state = self.0.lock();
        Ok(state
            .loans
            .values()
            .filter(|l| l.user_id == user_id)
            .map(|l| details(&state, l))
            .collect())
    }

    async fn checkout(&self, loan: &Loan) -> AppResult<bool> {
        let mut state = self.0.lock();
        match state.books.get_mut(&loan.book_id) {
            Some(book) if book.is_available => book.is_available = false,
            _ => return Ok(false),
        }
        state.writes += 1;
        state.loans.insert(loan.id, loan.clone());
        Ok(true)
    }
}

/// Loan joined with its borrower and book, like the SQL view
fn details(state: &State, loan: &Loan) -> LoanDetails {
    LoanDetails {
        user_name: state.users.get(&loan.user_id).map(|u| u.username.clone()),
        book_title: state.books.get(&loan.book_id).map(|b| b.title.clone()),
        ..LoanDetails::from(loan.clone())
    }
}

pub fn auth_config() -> AuthConfig {
    AuthConfig {
        jwt_secret: SECRET.to_string(),
        jwt_issuer: ISSUER.to_string(),
        jwt_audience: AUDIENCE.to_string(),
        seed_default_users: false,
    }
}

pub fn services(store: &MemoryStore) -> Services {
    Services::new(store.repository(), auth_config())
}

pub fn app(store: &MemoryStore) -> Router {
    app_with_auth(store, auth_config())
}

/// Router over `store` with a specific token configuration
pub fn app_with_auth(store: &MemoryStore, auth: AuthConfig) -> Router {
    let services = Services::new(store.repository(), auth.clone());
    let config = AppConfig {
        auth,
        ..AppConfig::default()
    };

    api::router(AppState {
        config: Arc::new(config),
        services: Arc::new(services),
    })
}

/// A stored user of `role` and a valid bearer token for it
pub fn login_as(store: &MemoryStore, role: Role) -> (User, String) {
    let username = format!("{}-{}", role.as_str().to_lowercase(), &Uuid::new_v4().to_string()[..8]);
    let user = store.insert_user(&username, "password!", role);
    let token = services(store)
        .auth
        .generate_token(&user, SECRET, ISSUER, AUDIENCE)
        .unwrap();
    (user, token)
}
