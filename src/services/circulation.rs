//! Circulation: creating loans and processing returns

use serde_json::json;
use std::sync::Arc;
use validator::Validate;

use crate::{
    clock::Clock,
    config::CirculationConfig,
    error::{AppError, AppResult},
    models::{
        Borrowing, BorrowingStatus, CallerClaims, CreateLoan, LoanRecord, LoanView, ReturnOutcome,
        Stored, StudentStatus,
    },
    repository::{
        books::BooksRepository, borrowings::BorrowingsRepository, students::StudentsRepository,
        Repository,
    },
    store::fields,
};

use super::{ban::BanPolicy, identity::IdentityResolver, reports};

#[derive(Clone)]
pub struct CirculationService {
    repository: Repository,
    identity: IdentityResolver,
    clock: Arc<dyn Clock>,
    ban: BanPolicy,
    enforce_single_loan: bool,
    enforce_capacity: bool,
}

impl CirculationService {
    pub fn new(
        repository: Repository,
        identity: IdentityResolver,
        clock: Arc<dyn Clock>,
        config: &CirculationConfig,
    ) -> Self {
        Self {
            repository,
            identity,
            clock,
            ban: BanPolicy::new(config.ban_days),
            enforce_single_loan: config.enforce_single_loan,
            enforce_capacity: config.enforce_capacity,
        }
    }

    /// Borrow a book. The caller must be the borrowing student.
    pub async fn create_loan(&self, caller: &CallerClaims, request: CreateLoan) -> AppResult<LoanRecord> {
        request.validate()?;
        let kode_buku = request.kode_buku.trim();
        let nomor_hp = request.nomor_hp.trim();
        if kode_buku.is_empty() || nomor_hp.is_empty() {
            return Err(AppError::Validation(
                "kodeBuku and nomorHp must not be blank".to_string(),
            ));
        }

        let now = self.clock.now();
        let loan_date = request.tanggal_peminjaman.unwrap_or(now);
        if request.tanggal_pengembalian < loan_date {
            return Err(AppError::Validation(format!(
                "Due date {} precedes loan date {}",
                request.tanggal_pengembalian, loan_date
            )));
        }

        let member = self.identity.resolve(caller).await?;
        let student = member.require_student()?;

        if student.status != StudentStatus::Active {
            return Err(AppError::Forbidden(format!(
                "Member {} is {}",
                student.user_id,
                student.status.as_str()
            )));
        }
        if !BanPolicy::may_borrow(student.ban, now) {
            return Err(AppError::Forbidden(format!(
                "Member {} is banned from borrowing until {}",
                student.user_id,
                student.ban.map(|b| b.to_rfc3339()).unwrap_or_default()
            )));
        }

        let book = self
            .repository
            .books
            .find_by_code(kode_buku)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book {} not found", kode_buku)))?;

        if self.enforce_single_loan {
            let outstanding = self
                .repository
                .borrowings
                .outstanding_for_student(&student.user_id)
                .await?;
            if let Some(open) = outstanding.first() {
                return Err(AppError::BusinessRule(format!(
                    "Member {} still has loan {} outstanding",
                    student.user_id, open.id
                )));
            }
        }
        if self.enforce_capacity {
            let out = self
                .repository
                .borrowings
                .count_outstanding_for_book(&book.kode_buku)
                .await?;
            if out >= book.jumlah_buku {
                return Err(AppError::BusinessRule(format!(
                    "No copies of {} left ({} of {} on loan)",
                    book.kode_buku, out, book.jumlah_buku
                )));
            }
        }

        let borrowing = Borrowing {
            student_id: student.user_id.clone(),
            kode_buku: book.kode_buku.clone(),
            nomor_hp: nomor_hp.to_string(),
            tanggal_peminjaman: loan_date,
            tanggal_pengembalian: request.tanggal_pengembalian,
            status: BorrowingStatus::Outstanding,
            returned_at: None,
        };

        let insert = BorrowingsRepository::insert_op(&borrowing)?;
        let id = insert.id().to_string();
        let touch = StudentsRepository::update_op(
            student,
            fields(json!({ "lastBorrowedDate": loan_date })),
        );
        let mut ops = vec![insert, touch];
        if self.enforce_capacity {
            // Serializes loans of one title so the copy count above stays true
            ops.push(BooksRepository::update_op(
                &book,
                fields(json!({ "lastLoanedAt": now })),
            ));
        }
        self.repository.apply(ops).await?;

        tracing::info!(
            "Loan {} created: member {} borrowed {} until {}",
            id,
            borrowing.student_id,
            borrowing.kode_buku,
            borrowing.tanggal_pengembalian
        );
        Ok(LoanRecord { id, borrowing })
    }

    /// Mark a loan returned; bans the borrower when it comes back late.
    /// Only admins process returns.
    pub async fn return_loan(&self, caller: &CallerClaims, borrowing_id: &str) -> AppResult<ReturnOutcome> {
        let member = self.identity.resolve(caller).await?;
        member.require_admin()?;

        let borrowing = self.load_outstanding(borrowing_id).await?;
        let now = self.clock.now();
        let late = borrowing.is_late_at(now);

        let mut ops = vec![BorrowingsRepository::update_op(
            &borrowing,
            fields(json!({
                "status": BorrowingStatus::Returned.as_str(),
                "returnedAt": now,
            })),
        )];

        let mut banned_until = None;
        if late {
            let student = self
                .repository
                .students
                .find_by_user_id(&borrowing.student_id)
                .await?
                .ok_or_else(|| {
                    AppError::NotFound(format!(
                        "Student {} of loan {} not found",
                        borrowing.student_id, borrowing.id
                    ))
                })?;
            let (until, op) = self.ban.penalty(&student, now);
            banned_until = Some(until);
            ops.push(op);
        }

        match self.repository.apply(ops).await {
            Ok(()) => {}
            Err(AppError::Conflict(message)) => {
                return Err(self.explain_conflict(borrowing_id, message).await);
            }
            Err(e) => return Err(e),
        }

        if let Some(until) = banned_until {
            tracing::info!(
                "Loan {} returned late by member {}, banned until {}",
                borrowing.id,
                borrowing.student_id,
                until
            );
        } else {
            tracing::info!("Loan {} returned by member {}", borrowing.id, borrowing.student_id);
        }

        Ok(ReturnOutcome {
            borrowing_id: borrowing.id.clone(),
            returned_at: now,
            late,
            banned_until,
        })
    }

    /// The calling student's loans, both outstanding and returned
    pub async fn own_loans(&self, caller: &CallerClaims) -> AppResult<Vec<LoanView>> {
        let member = self.identity.resolve(caller).await?;
        let student = member.require_student()?;
        let loans = self
            .repository
            .borrowings
            .list_by_student(&student.user_id)
            .await?;
        reports::join_loans(&self.repository, loans, self.clock.now()).await
    }

    async fn load_outstanding(&self, borrowing_id: &str) -> AppResult<Stored<Borrowing>> {
        let borrowing = self
            .repository
            .borrowings
            .get_by_id(borrowing_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Loan {} not found", borrowing_id)))?;
        if !borrowing.is_outstanding() {
            return Err(AppError::AlreadyReturned(borrowing_id.to_string()));
        }
        Ok(borrowing)
    }

    /// A concurrent writer beat us. If it returned the same loan report that,
    /// otherwise keep the conflict.
    async fn explain_conflict(&self, borrowing_id: &str, message: String) -> AppError {
        match self.load_outstanding(borrowing_id).await {
            Err(AppError::AlreadyReturned(id)) => AppError::AlreadyReturned(id),
            _ => AppError::Conflict(message),
        }
    }
}
