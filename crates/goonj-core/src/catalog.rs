//! # Catalog
//!
//! Read-only, ordered list of books. The storefront never writes to it.

use std::collections::HashSet;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::types::{Book, BookId};
use crate::validation::validate_book;

/// The books on offer, in the order the source supplied them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    books: Vec<Book>,
}

impl Catalog {
    /// Builds a catalog, rejecting duplicate ids and invalid records.
    pub fn from_books(books: Vec<Book>) -> Result<Self, ValidationError> {
        let mut seen = HashSet::with_capacity(books.len());
        for book in &books {
            validate_book(book)?;
            if !seen.insert(book.id) {
                return Err(ValidationError::Duplicate {
                    field: "id".to_string(),
                    value: book.id.to_string(),
                });
            }
        }
        Ok(Catalog { books })
    }

    pub fn books(&self) -> &[Book] {
        &self.books
    }

    pub fn find(&self, book_id: BookId) -> Option<&Book> {
        self.books.iter().find(|b| b.id == book_id)
    }

    /// Like [`Catalog::find`], but an unknown id is an error.
    pub fn get(&self, book_id: BookId) -> CoreResult<&Book> {
        self.find(book_id).ok_or(CoreError::UnknownBook(book_id))
    }

    pub fn len(&self) -> usize {
        self.books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book(id: BookId, price_cents: i64) -> Book {
        Book {
            id,
            title: format!("Title {}", id),
            author: "A".to_string(),
            category: "Poetry".to_string(),
            price_cents,
            pages: 90,
            language: "Urdu".to_string(),
            description: String::new(),
            image: String::new(),
            isbn: String::new(),
        }
    }

    #[test]
    fn test_from_books_keeps_order() {
        let catalog = Catalog::from_books(vec![book(7, 100), book(2, 100)]).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.books()[0].id, 7);
        assert_eq!(catalog.find(2).map(|b| b.id), Some(2));
        assert!(catalog.find(3).is_none());
        assert!(matches!(catalog.get(3), Err(CoreError::UnknownBook(3))));
    }

    #[test]
    fn test_rejects_duplicate_ids() {
        let err = Catalog::from_books(vec![book(1, 100), book(1, 200)]).unwrap_err();
        assert!(matches!(err, ValidationError::Duplicate { .. }));
    }

    #[test]
    fn test_rejects_non_positive_price() {
        let err = Catalog::from_books(vec![book(1, 0)]).unwrap_err();
        assert!(matches!(err, ValidationError::MustBePositive { .. }));
    }
}
