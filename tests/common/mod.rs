//! Shared harness: services and router over the in-memory store with a fixed clock

#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use chrono::{DateTime, TimeZone, Utc};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use perpus_server::{
    api,
    clock::FixedClock,
    config::CirculationConfig,
    models::{CallerClaims, Role},
    repository::Repository,
    services::Services,
    store::{fields, Collection, DocumentStore, MemoryDocumentStore},
    AppConfig, AppState,
};

pub fn date(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
}

pub struct TestApp {
    pub store: Arc<MemoryDocumentStore>,
    pub clock: Arc<FixedClock>,
    pub services: Arc<Services>,
    pub router: Router,
}

impl TestApp {
    pub fn new(now: DateTime<Utc>) -> Self {
        let store = Arc::new(MemoryDocumentStore::new());
        let clock = Arc::new(FixedClock::new(now));
        let services = Arc::new(
            Services::new(
                Repository::new(store.clone()),
                CirculationConfig::default(),
                clock.clone(),
            )
            .unwrap(),
        );
        let router = api::create_router(AppState {
            config: Arc::new(AppConfig::default()),
            services: services.clone(),
        });
        Self {
            store,
            clock,
            services,
            router,
        }
    }

    pub async fn seed(&self, collection: Collection, body: Value) -> String {
        self.store.insert(collection, fields(body)).await.unwrap()
    }

    pub async fn admin(&self, user_id: &str, admin_id: &str) -> CallerClaims {
        self.seed(
            Collection::Users,
            json!({ "id": user_id, "name": "Bu Ratna", "username": format!("admin{}", user_id), "role": "admin" }),
        )
        .await;
        self.seed(Collection::Admins, json!({ "id": admin_id, "userId": user_id }))
            .await;
        CallerClaims::new(user_id, Role::Admin)
    }

    pub async fn headmaster(&self, user_id: &str) -> CallerClaims {
        self.seed(
            Collection::Users,
            json!({ "id": user_id, "name": "Pak Budi", "username": "kepsek", "role": "headmaster" }),
        )
        .await;
        CallerClaims::new(user_id, Role::Headmaster)
    }

    pub async fn student(&self, user_id: &str, name: &str, admin_id: &str) -> CallerClaims {
        self.seed(
            Collection::Users,
            json!({ "id": user_id, "name": name, "username": format!("s{}", user_id), "role": "student" }),
        )
        .await;
        self.seed(
            Collection::Students,
            json!({ "userId": user_id, "adminId": admin_id, "class": "8C", "status": "active" }),
        )
        .await;
        CallerClaims::new(user_id, Role::Student)
    }

    pub async fn book(&self, kode: &str, title: &str, copies: i64) {
        self.seed(
            Collection::Books,
            json!({ "kodeBuku": kode, "title": title, "jumlahBuku": copies }),
        )
        .await;
    }

    /// Send a request as `caller` and decode the JSON response
    pub async fn call(
        &self,
        method: &str,
        uri: &str,
        caller: Option<&CallerClaims>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        if let Some(caller) = caller {
            request = request
                .header("X-Member-Id", caller.id.as_str())
                .header("X-Member-Role", caller.role.as_str());
        }
        let request = match body {
            Some(body) => request
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => request.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }
}
