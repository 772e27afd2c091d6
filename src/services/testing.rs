//! Seeded in-memory services for unit tests

use chrono::{DateTime, TimeZone, Utc};
use serde_json::json;
use std::sync::Arc;

use crate::{
    clock::FixedClock,
    config::CirculationConfig,
    models::{CallerClaims, CreateLoan, LoanRecord, Role},
    repository::Repository,
    store::{fields, Collection, DocumentStore, Filter, MemoryDocumentStore},
};

use super::Services;

pub fn date(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
}

pub struct Fixture {
    pub store: Arc<MemoryDocumentStore>,
    pub clock: Arc<FixedClock>,
    pub services: Services,
}

impl Fixture {
    pub async fn new(now: DateTime<Utc>) -> Self {
        Self::with_config(now, CirculationConfig::default()).await
    }

    pub async fn with_config(now: DateTime<Utc>, config: CirculationConfig) -> Self {
        let store = Arc::new(MemoryDocumentStore::new());
        let clock = Arc::new(FixedClock::new(now));
        let services =
            Services::new(Repository::new(store.clone()), config, clock.clone()).unwrap();
        Self {
            store,
            clock,
            services,
        }
    }

    /// A bare user record named `Member <id>`
    pub async fn user(&self, id: &str, role: Role) -> CallerClaims {
        self.store
            .insert(
                Collection::Users,
                fields(json!({
                    "id": id,
                    "name": format!("Member {}", id),
                    "username": format!("user{}", id),
                    "password": "",
                    "role": role.as_str(),
                })),
            )
            .await
            .unwrap();
        CallerClaims::new(id, role)
    }

    pub async fn admin(&self, user_id: &str, admin_id: &str) -> CallerClaims {
        let claims = self.user(user_id, Role::Admin).await;
        self.store
            .insert(
                Collection::Admins,
                fields(json!({ "id": admin_id, "userId": user_id })),
            )
            .await
            .unwrap();
        claims
    }

    /// An active student in class 7A
    pub async fn student(&self, user_id: &str, admin_id: &str) -> CallerClaims {
        let claims = self.user(user_id, Role::Student).await;
        self.store
            .insert(
                Collection::Students,
                fields(json!({
                    "userId": user_id,
                    "adminId": admin_id,
                    "class": "7A",
                    "status": "active",
                })),
            )
            .await
            .unwrap();
        claims
    }

    pub async fn banned_student(
        &self,
        user_id: &str,
        admin_id: &str,
        until: DateTime<Utc>,
    ) -> CallerClaims {
        let claims = self.student(user_id, admin_id).await;
        let id = self.student_doc_id(user_id).await;
        self.store
            .update(Collection::Students, &id, fields(json!({ "ban": until })))
            .await
            .unwrap();
        claims
    }

    pub async fn student_doc_id(&self, user_id: &str) -> String {
        self.store
            .find(Collection::Students, &[Filter::eq("userId", user_id)])
            .await
            .unwrap()
            .remove(0)
            .id
    }

    pub async fn book(&self, kode: &str, title: &str, copies: i64) -> String {
        self.store
            .insert(
                Collection::Books,
                fields(json!({ "kodeBuku": kode, "title": title, "jumlahBuku": copies })),
            )
            .await
            .unwrap()
    }

    /// Borrow through the circulation service, failing the test on error
    pub async fn loan(&self, student: &CallerClaims, kode: &str, due: DateTime<Utc>) -> LoanRecord {
        self.services
            .circulation
            .create_loan(
                student,
                CreateLoan {
                    kode_buku: kode.to_string(),
                    nomor_hp: "081234567890".to_string(),
                    tanggal_peminjaman: None,
                    tanggal_pengembalian: due,
                },
            )
            .await
            .unwrap()
    }
}
