//! Book catalog service

use std::sync::Arc;

use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::Book,
    repository::BookRepository,
};

#[derive(Clone)]
pub struct BooksService {
    books: Arc<dyn BookRepository>,
}

impl BooksService {
    pub fn new(books: Arc<dyn BookRepository>) -> Self {
        Self { books }
    }

    pub async fn get_all_books(&self) -> AppResult<Vec<Book>> {
        self.books.get_all().await
    }

    pub async fn get_available_books(&self) -> AppResult<Vec<Book>> {
        self.books.get_available().await
    }

    pub async fn get_book_by_id(&self, id: Uuid) -> AppResult<Option<Book>> {
        self.books.get_by_id(id).await
    }

    /// Add a book, assigning an id when the request carries none
    pub async fn add_book(&self, mut book: Book) -> AppResult<Book> {
        if book.id.is_nil() {
            book.id = Uuid::new_v4();
        }
        self.books.add(&book).await
    }

    /// Full replace of an existing book
    pub async fn update_book(&self, book: Book) -> AppResult<()> {
        if !self.books.update(&book).await? {
            return Err(AppError::NotFound(format!("Book with id {} not found", book.id)));
        }
        Ok(())
    }

    /// Delete a book; deleting an unknown id does nothing
    pub async fn delete_book(&self, id: Uuid) -> AppResult<()> {
        if self.books.get_by_id(id).await?.is_some() {
            self.books.remove(id).await?;
        }
        Ok(())
    }
}
