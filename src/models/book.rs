//! Book model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// Catalog entry, also used as the create/update request body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    /// Nil on create requests; the server assigns one
    #[serde(default)]
    pub id: Uuid,
    #[validate(length(min = 1, max = 255, message = "Title must be 1 to 255 characters"))]
    pub title: String,
    #[validate(length(max = 255, message = "Author must be at most 255 characters"))]
    pub author: Option<String>,
    #[validate(length(max = 100, message = "Genre must be at most 100 characters"))]
    pub genre: Option<String>,
    pub published_date: DateTime<Utc>,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_available")]
    pub is_available: bool,
}

fn default_available() -> bool {
    true
}

impl Book {
    pub fn new(title: impl Into<String>, author: impl Into<String>, published_date: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            author: Some(author.into()),
            genre: None,
            published_date,
            description: String::new(),
            is_available: true,
        }
    }
}
