//! Authentication service: credential checks, tokens, registration

use std::sync::Arc;

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::user::{RegisterRequest, Role, User, UserClaims},
    repository::UserRepository,
};

use super::password;

/// Accounts created by [`AuthService::seed_default_users`]
const DEFAULT_ACCOUNTS: [(&str, &str, &str, Role); 3] = [
    ("admin", "admin!", "admin@library.local", Role::Admin),
    ("user", "user!", "user@library.local", Role::Standard),
    ("viewer", "viewer!", "viewer@library.local", Role::ReadOnly),
];

fn registration_refused() -> AppError {
    AppError::BusinessRule("It was not possible to register the user. Try another username.".to_string())
}

#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserRepository>,
    config: AuthConfig,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserRepository>, config: AuthConfig) -> Self {
        Self { users, config }
    }

    /// True iff `username` exists and `password` matches its stored hash.
    /// Bad credentials are never an error.
    pub async fn verify_login(&self, username: &str, password: &str) -> AppResult<bool> {
        let Some(user) = self.users.get_by_username(username).await? else {
            return Ok(false);
        };

        Ok(password::verify_password(password, &user.password_hash))
    }

    pub async fn get_user_by_username(&self, username: &str) -> AppResult<Option<User>> {
        self.users.get_by_username(username).await
    }

    /// Sign a one-hour token carrying the user's name, id and role
    pub fn generate_token(
        &self,
        user: &User,
        secret_key: &str,
        issuer: &str,
        audience: &str,
    ) -> AppResult<String> {
        UserClaims::for_user(user, issuer, audience).create_token(secret_key)
    }

    /// Validate a bearer token against the configured key, issuer and audience
    pub fn decode_token(&self, token: &str) -> AppResult<UserClaims> {
        UserClaims::from_token(
            token,
            &self.config.jwt_secret,
            &self.config.jwt_issuer,
            &self.config.jwt_audience,
        )
        .map_err(|e| AppError::Authentication(e.to_string()))
    }

    /// Self-service registration with the default role
    pub async fn register(&self, request: RegisterRequest) -> AppResult<User> {
        if self.users.get_by_username(&request.username).await?.is_some() {
            return Err(registration_refused());
        }

        let user = User::new(
            request.username,
            password::hash_password(&request.password)?,
            request.email,
            request.full_name.unwrap_or_default(),
            Role::default(),
        );

        self.users.add(&user).await.map_err(|e| match e {
            AppError::BusinessRule(_) => registration_refused(),
            other => other,
        })
    }

    /// Create the built-in staff accounts that are missing. Existing
    /// accounts are left untouched.
    pub async fn seed_default_users(&self) -> AppResult<usize> {
        let mut created = 0;
        for (username, password, email, role) in DEFAULT_ACCOUNTS {
            if self.users.get_by_username(username).await?.is_some() {
                continue;
            }

            let user = User::new(
                username.to_string(),
                password::hash_password(password)?,
                email.to_string(),
                String::new(),
                role,
            );
            self.users.add(&user).await?;
            tracing::info!("Seeded default account {} ({})", username, role);
            created += 1;
        }
        Ok(created)
    }
}
