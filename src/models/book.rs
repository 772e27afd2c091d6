//! Book (catalog) model

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use super::lenient;

/// `books` document, addressed by its business key `kodeBuku`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub kode_buku: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, deserialize_with = "lenient::optional_text")]
    pub isbn: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub publisher: Option<String>,
    #[serde(default, deserialize_with = "lenient::optional_text")]
    pub published_year: Option<String>,
    /// Book category
    #[serde(default)]
    pub jenis: Option<String>,
    /// Number of physical copies owned
    #[serde(default, deserialize_with = "lenient::count")]
    pub jumlah_buku: i64,
    #[serde(default, alias = "cover")]
    pub cover_url: Option<String>,
}

/// Create book request
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateBook {
    #[validate(length(min = 1, max = 32))]
    pub kode_buku: String,
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    #[validate(length(max = 20))]
    pub isbn: Option<String>,
    #[validate(length(max = 255))]
    pub author: Option<String>,
    #[validate(length(max = 255))]
    pub publisher: Option<String>,
    #[validate(length(max = 10))]
    pub published_year: Option<String>,
    #[validate(length(max = 100))]
    pub jenis: Option<String>,
    #[validate(range(min = 0, max = 10000))]
    pub jumlah_buku: i64,
    #[validate(url)]
    pub cover_url: Option<String>,
}

impl From<CreateBook> for Book {
    fn from(b: CreateBook) -> Self {
        Self {
            kode_buku: b.kode_buku.trim().to_string(),
            title: b.title,
            isbn: b.isbn,
            author: b.author,
            publisher: b.publisher,
            published_year: b.published_year,
            jenis: b.jenis,
            jumlah_buku: b.jumlah_buku,
            cover_url: b.cover_url,
        }
    }
}

/// Book with its current availability
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookView {
    pub id: String,
    #[serde(flatten)]
    pub book: Book,
    /// Copies not currently out on loan
    pub available: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_form_written_books() {
        let book: Book = serde_json::from_value(json!({
            "kodeBuku": "B001",
            "title": "Laskar Pelangi",
            "isbn": 9786020331607i64,
            "publishedYear": 2005,
            "jumlahBuku": "3",
            "cover": "https://img.example/b001.png"
        }))
        .unwrap();

        assert_eq!(book.jumlah_buku, 3);
        assert_eq!(book.isbn.as_deref(), Some("9786020331607"));
        assert_eq!(book.published_year.as_deref(), Some("2005"));
        assert_eq!(book.cover_url.as_deref(), Some("https://img.example/b001.png"));
    }

    #[test]
    fn negative_copy_counts_are_rejected() {
        let request = CreateBook {
            kode_buku: "B9".to_string(),
            title: "Atlas".to_string(),
            isbn: None,
            author: None,
            publisher: None,
            published_year: None,
            jenis: None,
            jumlah_buku: -1,
            cover_url: None,
        };
        assert!(request.validate().is_err());
    }
}
