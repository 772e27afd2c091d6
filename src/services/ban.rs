//! Ban policy: suspension windows for late returns

use chrono::{DateTime, Duration, Utc};
use serde_json::json;

use crate::{
    models::{Stored, Student},
    repository::students::StudentsRepository,
    store::{fields, WriteOp},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BanPolicy {
    duration: Duration,
}

impl Default for BanPolicy {
    fn default() -> Self {
        Self::new(7)
    }
}

impl BanPolicy {
    pub fn new(days: i64) -> Self {
        Self {
            duration: Duration::days(days),
        }
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// New ban expiry after a late return.
    ///
    /// Extends from the later of the current expiry and `now`, so repeated
    /// late returns stack and an existing ban never moves backward.
    pub fn extend_ban(&self, now: DateTime<Utc>, current: Option<DateTime<Utc>>) -> DateTime<Utc> {
        let base = match current {
            Some(expiry) if expiry > now => expiry,
            _ => now,
        };
        base + self.duration
    }

    /// A member may borrow when no ban is set or it has expired
    pub fn may_borrow(ban: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
        ban.map_or(true, |expiry| expiry <= now)
    }

    /// Ban write for a late return, guarded by the student revision that was read
    pub fn penalty(&self, student: &Stored<Student>, now: DateTime<Utc>) -> (DateTime<Utc>, WriteOp) {
        let until = self.extend_ban(now, student.ban);
        let op = StudentsRepository::update_op(student, fields(json!({ "ban": until })));
        (until, op)
    }
}
