//! User management service

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::user::{CreateUser, UpdateUser, User},
    repository::{users::USERNAME_TAKEN, UserRepository},
};

use super::password;

#[derive(Clone)]
pub struct UsersService {
    users: Arc<dyn UserRepository>,
}

impl UsersService {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    pub async fn get_all_users(&self) -> AppResult<Vec<User>> {
        self.users.get_all().await
    }

    pub async fn get_user_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        self.users.get_by_id(id).await
    }

    pub async fn get_user_by_username(&self, username: &str) -> AppResult<Option<User>> {
        self.users.get_by_username(username).await
    }

    /// Create a user with an explicit role
    pub async fn create_user(&self, request: CreateUser) -> AppResult<User> {
        // Inactive accounts still hold their username
        if self.users.get_by_username(&request.username).await?.is_some() {
            return Err(AppError::BusinessRule(USERNAME_TAKEN.to_string()));
        }

        let user = User::new(
            request.username,
            password::hash_password(&request.password)?,
            request.email,
            request.full_name.unwrap_or_default(),
            request.role,
        );

        self.users.add(&user).await
    }

    /// Update profile fields. Omitted name/email keep their value; role and
    /// active flag are always replaced. `None` when the user does not exist.
    pub async fn update_user(&self, id: Uuid, request: UpdateUser) -> AppResult<Option<User>> {
        let Some(mut user) = self.users.get_by_id(id).await? else {
            return Ok(None);
        };

        if let Some(full_name) = request.full_name {
            user.full_name = full_name;
        }
        if let Some(email) = request.email {
            user.email = email;
        }
        user.role = request.role;
        user.is_active = request.is_active;
        user.updated_at = Some(Utc::now());

        self.users.update(&user).await?;
        Ok(Some(user))
    }

    /// Soft delete. Returns `false` when the user does not exist.
    pub async fn deactivate_user(&self, id: Uuid) -> AppResult<bool> {
        let Some(mut user) = self.users.get_by_id(id).await? else {
            return Ok(false);
        };

        user.is_active = false;
        self.users.update(&user).await
    }
}
