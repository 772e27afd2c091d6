//! Read-only circulation reports for library staff

use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::{
    clock::Clock,
    error::AppResult,
    models::{
        report::{MISSING_NAME, MISSING_TITLE},
        Book, Borrowing, BorrowingStatus, CallerClaims, GuestVisit, LibrarySummary, LoanView,
        Stored, Student, User,
    },
    repository::Repository,
};

use super::identity::IdentityResolver;

/// Lookup tables for joining borrowings to their borrower and book.
/// The first record wins when a key is duplicated, and documents that no
/// longer decode are left out of the tables.
struct LoanJoin {
    users: HashMap<String, User>,
    students: HashMap<String, Student>,
    books: HashMap<String, Book>,
}

impl LoanJoin {
    async fn load(repository: &Repository) -> AppResult<Self> {
        let mut users = HashMap::new();
        for user in repository.users.list_readable().await? {
            users.entry(user.id.clone()).or_insert(user.record);
        }
        let mut students = HashMap::new();
        for student in repository.students.list_readable().await? {
            students
                .entry(student.user_id.clone())
                .or_insert(student.record);
        }
        let mut books = HashMap::new();
        for book in repository.books.list_readable().await? {
            books.entry(book.kode_buku.clone()).or_insert(book.record);
        }
        Ok(Self {
            users,
            students,
            books,
        })
    }

    fn view(&self, loan: Stored<Borrowing>, now: DateTime<Utc>) -> LoanView {
        let student = self.students.get(&loan.student_id);
        let overdue = loan.is_outstanding() && loan.is_late_at(now);
        // studentId holds the borrower's User.id, so the name joins directly
        let name = self
            .users
            .get(&loan.student_id)
            .map(|u| u.name.clone())
            .unwrap_or_else(|| MISSING_NAME.to_string());
        let book_title = self
            .books
            .get(&loan.kode_buku)
            .map(|b| b.title.clone())
            .unwrap_or_else(|| MISSING_TITLE.to_string());
        let Stored { id, record, .. } = loan;

        LoanView {
            borrowing_id: id,
            student_user_id: record.student_id,
            name,
            class: student.map(|s| s.class.clone()),
            profile_image_url: student.and_then(|s| s.profile_image_url.clone()),
            kode_buku: record.kode_buku,
            book_title,
            nomor_hp: record.nomor_hp,
            tanggal_peminjaman: record.tanggal_peminjaman,
            tanggal_pengembalian: record.tanggal_pengembalian,
            status: record.status,
            returned_at: record.returned_at,
            overdue,
        }
    }
}

/// Join borrowings with borrower and book details. Missing records become
/// placeholders instead of errors.
pub(crate) async fn join_loans(
    repository: &Repository,
    loans: Vec<Stored<Borrowing>>,
    now: DateTime<Utc>,
) -> AppResult<Vec<LoanView>> {
    if loans.is_empty() {
        return Ok(Vec::new());
    }
    let join = LoanJoin::load(repository).await?;
    Ok(loans.into_iter().map(|loan| join.view(loan, now)).collect())
}

#[derive(Clone)]
pub struct ReportsService {
    repository: Repository,
    identity: IdentityResolver,
    clock: Arc<dyn Clock>,
}

impl ReportsService {
    pub fn new(repository: Repository, identity: IdentityResolver, clock: Arc<dyn Clock>) -> Self {
        Self {
            repository,
            identity,
            clock,
        }
    }

    pub async fn list_outstanding(&self, caller: &CallerClaims) -> AppResult<Vec<LoanView>> {
        self.list_by_status(caller, BorrowingStatus::Outstanding).await
    }

    pub async fn list_returned(&self, caller: &CallerClaims) -> AppResult<Vec<LoanView>> {
        self.list_by_status(caller, BorrowingStatus::Returned).await
    }

    async fn list_by_status(
        &self,
        caller: &CallerClaims,
        status: BorrowingStatus,
    ) -> AppResult<Vec<LoanView>> {
        self.identity.resolve(caller).await?.require_staff()?;
        let loans = self.repository.borrowings.list_by_status(status).await?;
        join_loans(&self.repository, loans, self.clock.now()).await
    }

    /// Every loan, in both states, of the students the calling admin registered
    pub async fn list_admin_loans(&self, caller: &CallerClaims) -> AppResult<Vec<LoanView>> {
        let member = self.identity.resolve(caller).await?;
        let admin = member.require_admin()?;

        let own: HashSet<String> = self
            .repository
            .students
            .list_by_admin(&admin.id)
            .await?
            .into_iter()
            .map(|s| s.record.user_id)
            .collect();
        let loans = self
            .repository
            .borrowings
            .list_all()
            .await?
            .into_iter()
            .filter(|loan| own.contains(&loan.student_id))
            .collect();
        join_loans(&self.repository, loans, self.clock.now()).await
    }

    pub async fn summary(&self, caller: &CallerClaims) -> AppResult<LibrarySummary> {
        self.identity.resolve(caller).await?.require_staff()?;

        let books = self.repository.books.list_readable().await?;
        let mut borrowed = 0;
        let mut returned = 0;
        for loan in self.repository.borrowings.list_all().await? {
            match loan.status {
                BorrowingStatus::Outstanding => borrowed += 1,
                BorrowingStatus::Returned => returned += 1,
            }
        }

        Ok(LibrarySummary {
            total_titles: books.len() as i64,
            total_copies: books.iter().map(|b| b.jumlah_buku).sum(),
            borrowed,
            returned,
        })
    }

    /// Library visits by the calling admin's students, newest first
    pub async fn list_guests(&self, caller: &CallerClaims) -> AppResult<Vec<GuestVisit>> {
        let member = self.identity.resolve(caller).await?;
        let admin = member.require_admin()?;

        // Visits reference the student document id
        let students: HashMap<String, Stored<Student>> = self
            .repository
            .students
            .list_by_admin(&admin.id)
            .await?
            .into_iter()
            .map(|s| (s.id.clone(), s))
            .collect();
        let users: HashMap<String, Stored<User>> = self
            .repository
            .users
            .list_readable()
            .await?
            .into_iter()
            .map(|u| (u.id.clone(), u))
            .collect();

        let mut visits: Vec<GuestVisit> = self
            .repository
            .guests
            .list_all()
            .await?
            .into_iter()
            .filter_map(|guest| {
                let student = students.get(&guest.student_id)?;
                Some(GuestVisit {
                    name: users
                        .get(&student.user_id)
                        .map(|u| u.name.clone())
                        .unwrap_or_else(|| MISSING_NAME.to_string()),
                    class: student.class.clone(),
                    tanggal_kunjungan: guest.tanggal_kunjungan,
                    id: guest.id,
                })
            })
            .collect();
        visits.sort_by(|a, b| b.tanggal_kunjungan.cmp(&a.tanggal_kunjungan));
        Ok(visits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::AppError,
        models::Role,
        services::testing::{date, Fixture},
        store::{fields, Collection, DocumentStore},
    };
    use serde_json::json;

    async fn raw_loan(fx: &Fixture, student: &str, kode: &str, status: &str) -> String {
        fx.store
            .insert(
                Collection::Borrowings,
                fields(json!({
                    "studentId": student,
                    "kodeBuku": kode,
                    "nomorHp": "0812",
                    "tanggalPeminjaman": "2024-01-02",
                    "tanggalPengembalian": "2024-01-09",
                    "status": status
                })),
            )
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn missing_joins_use_placeholders() {
        let fx = Fixture::new(date(2024, 1, 5)).await;
        let admin = fx.admin("1001", "A1").await;
        fx.student("2415001", "A1").await;
        fx.book("B001", "Laskar Pelangi", 1).await;
        raw_loan(&fx, "2415001", "GONE", "0").await;
        raw_loan(&fx, "2419999", "B001", "0").await;

        let loans = fx.services.reports.list_outstanding(&admin).await.unwrap();
        assert_eq!(loans.len(), 2);

        assert_eq!(loans[0].name, "Member 2415001");
        assert_eq!(loans[0].book_title, MISSING_TITLE);
        assert_eq!(loans[0].class.as_deref(), Some("7A"));

        assert_eq!(loans[1].name, MISSING_NAME);
        assert_eq!(loans[1].book_title, "Laskar Pelangi");
        assert_eq!(loans[1].class, None);
    }

    #[tokio::test]
    async fn outstanding_and_returned_are_disjoint() {
        let fx = Fixture::new(date(2024, 1, 5)).await;
        let headmaster = fx.user("1", Role::Headmaster).await;
        fx.student("2415001", "A1").await;
        let open = raw_loan(&fx, "2415001", "B001", "0").await;
        let closed = raw_loan(&fx, "2415001", "B001", "1").await;

        let outstanding = fx.services.reports.list_outstanding(&headmaster).await.unwrap();
        let returned = fx.services.reports.list_returned(&headmaster).await.unwrap();
        assert_eq!(outstanding.len(), 1);
        assert_eq!(outstanding[0].borrowing_id, open);
        assert_eq!(returned.len(), 1);
        assert_eq!(returned[0].borrowing_id, closed);
    }

    #[tokio::test]
    async fn overdue_flag_follows_the_clock() {
        let fx = Fixture::new(date(2024, 1, 5)).await;
        let admin = fx.admin("1001", "A1").await;
        fx.student("2415001", "A1").await;
        raw_loan(&fx, "2415001", "B001", "0").await;

        assert!(!fx.services.reports.list_outstanding(&admin).await.unwrap()[0].overdue);
        fx.clock.set(date(2024, 1, 10));
        assert!(fx.services.reports.list_outstanding(&admin).await.unwrap()[0].overdue);
    }

    #[tokio::test]
    async fn students_cannot_read_reports() {
        let fx = Fixture::new(date(2024, 1, 5)).await;
        let student = fx.student("2415001", "A1").await;

        let err = fx.services.reports.summary(&student).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
        let err = fx.services.reports.list_outstanding(&student).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[tokio::test]
    async fn summary_counts_titles_copies_and_loans() {
        let fx = Fixture::new(date(2024, 1, 5)).await;
        let admin = fx.admin("1001", "A1").await;
        fx.book("B001", "Laskar Pelangi", 3).await;
        fx.book("B002", "Bumi Manusia", 2).await;
        raw_loan(&fx, "2415001", "B001", "0").await;
        raw_loan(&fx, "2415002", "B001", "1").await;
        raw_loan(&fx, "2415003", "B002", "1").await;

        let summary = fx.services.reports.summary(&admin).await.unwrap();
        assert_eq!(
            summary,
            LibrarySummary {
                total_titles: 2,
                total_copies: 5,
                borrowed: 1,
                returned: 2,
            }
        );
    }

    #[tokio::test]
    async fn admin_loans_are_scoped_to_own_students() {
        let fx = Fixture::new(date(2024, 1, 5)).await;
        let admin = fx.admin("1001", "A1").await;
        fx.admin("1002", "A2").await;
        fx.student("2415001", "A1").await;
        fx.student("2415002", "A2").await;
        let mine = raw_loan(&fx, "2415001", "B001", "1").await;
        raw_loan(&fx, "2415002", "B001", "0").await;

        let loans = fx.services.reports.list_admin_loans(&admin).await.unwrap();
        assert_eq!(loans.len(), 1);
        assert_eq!(loans[0].borrowing_id, mine);

        let headmaster = fx.user("1", Role::Headmaster).await;
        let err = fx.services.reports.list_admin_loans(&headmaster).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[tokio::test]
    async fn guests_are_joined_and_scoped() {
        let fx = Fixture::new(date(2024, 1, 5)).await;
        let admin = fx.admin("1001", "A1").await;
        fx.admin("1002", "A2").await;
        fx.student("2415001", "A1").await;
        fx.student("2415002", "A2").await;
        let own = fx.student_doc_id("2415001").await;
        let other = fx.student_doc_id("2415002").await;

        for (student, day) in [(&own, "2024-01-03"), (&other, "2024-01-03"), (&own, "2024-01-04")] {
            fx.store
                .insert(
                    Collection::Guests,
                    fields(json!({ "studentId": student, "tanggalKunjungan": day })),
                )
                .await
                .unwrap();
        }
        fx.store
            .insert(
                Collection::Guests,
                fields(json!({ "studentId": "deleted", "tanggalKunjungan": "2024-01-04" })),
            )
            .await
            .unwrap();

        let visits = fx.services.reports.list_guests(&admin).await.unwrap();
        assert_eq!(visits.len(), 2);
        assert_eq!(visits[0].tanggal_kunjungan, date(2024, 1, 4));
        assert!(visits.iter().all(|v| v.name == "Member 2415001" && v.class == "7A"));
    }

    #[tokio::test]
    async fn unreadable_documents_do_not_break_listings() {
        let fx = Fixture::new(date(2024, 1, 5)).await;
        let admin = fx.admin("1001", "A1").await;
        fx.student("2415001", "A1").await;
        fx.book("B001", "Laskar Pelangi", 1).await;
        for (collection, body) in [
            (Collection::Books, json!({ "kodeBuku": "B009", "isbn": 9786020000000i64 })),
            (Collection::Books, json!({ "kodeBuku": "B010", "jumlahBuku": "many" })),
            (Collection::Users, json!({ "id": 42, "role": "ghost" })),
        ] {
            fx.store.insert(collection, fields(body)).await.unwrap();
        }
        raw_loan(&fx, "2415001", "B001", "0").await;

        let loans = fx.services.reports.list_outstanding(&admin).await.unwrap();
        assert_eq!(loans.len(), 1);
        assert_eq!(loans[0].name, "Member 2415001");
        assert_eq!(loans[0].book_title, "Laskar Pelangi");

        let summary = fx.services.reports.summary(&admin).await.unwrap();
        assert_eq!(summary.total_titles, 2);
    }
}
