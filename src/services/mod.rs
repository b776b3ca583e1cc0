//! Business logic services

pub mod auth;
pub mod books;
pub mod loans;
pub mod password;
pub mod users;

use crate::{config::AuthConfig, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub auth: auth::AuthService,
    pub books: books::BooksService,
    pub users: users::UsersService,
    pub loans: loans::LoansService,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, auth_config: AuthConfig) -> Self {
        Self {
            auth: auth::AuthService::new(repository.users.clone(), auth_config),
            books: books::BooksService::new(repository.books.clone()),
            users: users::UsersService::new(repository.users),
            loans: loans::LoansService::new(repository.loans, repository.books),
        }
    }
}
