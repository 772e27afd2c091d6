//! Catalog management service

use std::collections::HashMap;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{Book, BookView, BorrowingStatus, CallerClaims, CreateBook, Stored},
    repository::Repository,
};

use super::identity::IdentityResolver;

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
    identity: IdentityResolver,
}

impl CatalogService {
    pub fn new(repository: Repository, identity: IdentityResolver) -> Self {
        Self {
            repository,
            identity,
        }
    }

    /// Add a title to the catalog. `kodeBuku` must be unused.
    pub async fn add_book(&self, caller: &CallerClaims, request: CreateBook) -> AppResult<BookView> {
        request.validate()?;
        self.identity.resolve(caller).await?.require_admin()?;

        let book = Book::from(request);
        if book.kode_buku.is_empty() {
            return Err(AppError::Validation("kodeBuku must not be blank".to_string()));
        }
        if self.repository.books.find_by_code(&book.kode_buku).await?.is_some() {
            return Err(AppError::Conflict(format!(
                "Book code {} is already in the catalog",
                book.kode_buku
            )));
        }

        let id = self.repository.books.create(&book).await?;
        tracing::info!("Catalog: added {} ({} copies)", book.kode_buku, book.jumlah_buku);
        Ok(BookView {
            id,
            available: book.jumlah_buku,
            book,
        })
    }

    pub async fn list_books(&self, caller: &CallerClaims) -> AppResult<Vec<BookView>> {
        self.identity.resolve(caller).await?;

        let mut on_loan: HashMap<String, i64> = HashMap::new();
        for loan in self
            .repository
            .borrowings
            .list_by_status(BorrowingStatus::Outstanding)
            .await?
        {
            *on_loan.entry(loan.record.kode_buku).or_default() += 1;
        }

        Ok(self
            .repository
            .books
            .list_all()
            .await?
            .into_iter()
            .map(|book| {
                let out = on_loan.get(&book.kode_buku).copied().unwrap_or(0);
                view(book, out)
            })
            .collect())
    }

    pub async fn get_book(&self, caller: &CallerClaims, kode_buku: &str) -> AppResult<BookView> {
        self.identity.resolve(caller).await?;

        let book = self
            .repository
            .books
            .find_by_code(kode_buku)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book {} not found", kode_buku)))?;
        let out = self
            .repository
            .borrowings
            .count_outstanding_for_book(&book.kode_buku)
            .await?;
        Ok(view(book, out))
    }
}

/// Availability never goes negative, even if legacy data over-lent a title
fn view(book: Stored<Book>, on_loan: i64) -> BookView {
    BookView {
        id: book.id,
        available: (book.record.jumlah_buku - on_loan).max(0),
        book: book.record,
    }
}
