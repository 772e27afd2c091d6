//! API integration tests driving the router in-process

mod common;

use axum::http::StatusCode;
use common::{date, TestApp};
use perpus_server::models::{CallerClaims, Role};
use serde_json::json;

#[tokio::test]
async fn test_health_and_readiness() {
    let app = TestApp::new(date(2024, 1, 1));

    let (status, body) = app.call("GET", "/api/v1/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, body) = app.call("GET", "/api/v1/ready", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ready");
}

#[tokio::test]
async fn test_missing_identity_is_unauthorized() {
    let app = TestApp::new(date(2024, 1, 1));
    let (status, body) = app.call("GET", "/api/v1/books", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], 2);
}

#[tokio::test]
async fn test_borrow_and_late_return() {
    let app = TestApp::new(date(2024, 1, 25));
    let admin = app.admin("1001", "A1").await;
    let student = app.student("2415001", "Sari", "A1").await;
    app.book("B001", "Laskar Pelangi", 1).await;

    let (status, loan) = app
        .call(
            "POST",
            "/api/v1/loans",
            Some(&student),
            Some(json!({
                "kodeBuku": "B001",
                "nomorHp": "085712345678",
                "tanggalPengembalian": "2024-02-01"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(loan["status"], "0");
    assert_eq!(loan["kodeBuku"], "B001");
    let id = loan["id"].as_str().unwrap().to_string();

    let (status, mine) = app.call("GET", "/api/v1/loans/me", Some(&student), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(mine[0]["bookTitle"], "Laskar Pelangi");

    app.clock.set(date(2024, 2, 5));
    let uri = format!("/api/v1/loans/{}/return", id);
    let (status, outcome) = app.call("POST", &uri, Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(outcome["late"], true);
    assert_eq!(outcome["bannedUntil"], "2024-02-12T00:00:00Z");

    let (status, body) = app.call("POST", &uri, Some(&admin), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], 10);

    let (status, card) = app
        .call("GET", "/api/v1/members/me/card", Some(&student), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(card["canBorrow"], false);
    assert_eq!(card["memberId"], "SMPN11-2415001");
}

#[tokio::test]
async fn test_loan_rules_map_to_status_codes() {
    let app = TestApp::new(date(2024, 1, 25));
    let student = app.student("2415001", "Sari", "A1").await;
    let other = app.student("2415002", "Tono", "A1").await;
    app.book("B001", "Laskar Pelangi", 1).await;
    let request = json!({
        "kodeBuku": "B001",
        "nomorHp": "085712345678",
        "tanggalPengembalian": "2024-02-01"
    });

    let (status, _) = app
        .call("POST", "/api/v1/loans", Some(&student), Some(request.clone()))
        .await;
    assert_eq!(status, StatusCode::CREATED);

    // No copies left
    let (status, _) = app
        .call("POST", "/api/v1/loans", Some(&other), Some(request))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = app
        .call(
            "POST",
            "/api/v1/loans",
            Some(&other),
            Some(json!({
                "kodeBuku": "B404",
                "nomorHp": "085712345678",
                "tanggalPengembalian": "2024-02-01"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .call(
            "POST",
            "/api/v1/loans",
            Some(&other),
            Some(json!({
                "kodeBuku": "B001",
                "nomorHp": "1",
                "tanggalPengembalian": "2024-02-01"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_role_checks() {
    let app = TestApp::new(date(2024, 1, 25));
    let student = app.student("2415001", "Sari", "A1").await;

    let (status, body) = app
        .call("GET", "/api/v1/reports/summary", Some(&student), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], 2);

    // Claimed role disagrees with the stored user
    let impostor = CallerClaims::new("2415001", Role::Admin);
    let (status, _) = app
        .call("GET", "/api/v1/members", Some(&impostor), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let unknown = CallerClaims::new("2419999", Role::Student);
    let (status, _) = app
        .call("GET", "/api/v1/loans/me", Some(&unknown), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_members_and_books_admin_flow() {
    let app = TestApp::new(date(2024, 1, 2));
    let admin = app.admin("1001", "A1").await;

    let (status, member) = app
        .call(
            "POST",
            "/api/v1/members",
            Some(&admin),
            Some(json!({
                "name": "Agus",
                "username": "agus",
                "password": "agus12345",
                "class": "8A"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(member["userId"], "2415001");

    let (status, _) = app
        .call(
            "POST",
            "/api/v1/members",
            Some(&admin),
            Some(json!({
                "name": "Agus Lain",
                "username": "agus",
                "password": "agus12345",
                "class": "8B"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, members) = app.call("GET", "/api/v1/members", Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(members.as_array().unwrap().len(), 1);

    let (status, updated) = app
        .call(
            "PUT",
            "/api/v1/members/2415001/status",
            Some(&admin),
            Some(json!({ "status": "inactive" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["status"], "inactive");

    let book = json!({
        "kodeBuku": "B100",
        "title": "Ronggeng Dukuh Paruk",
        "jumlahBuku": 2
    });
    let (status, created) = app
        .call("POST", "/api/v1/books", Some(&admin), Some(book.clone()))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["available"], 2);

    let (status, _) = app
        .call("POST", "/api/v1/books", Some(&admin), Some(book))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let student = CallerClaims::new("2415001", Role::Student);
    let (status, fetched) = app
        .call("GET", "/api/v1/books/B100", Some(&student), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["title"], "Ronggeng Dukuh Paruk");
}

#[tokio::test]
async fn test_reports_use_placeholders_for_missing_records() {
    let app = TestApp::new(date(2024, 1, 25));
    let headmaster = app.headmaster("1").await;
    app.seed(
        perpus_server::store::Collection::Borrowings,
        json!({
            "studentId": "2419999",
            "kodeBuku": "GONE",
            "nomorHp": "0857",
            "tanggalPeminjaman": "2024-01-20",
            "tanggalPengembalian": "2024-01-27",
            "status": "0"
        }),
    )
    .await;

    let (status, loans) = app
        .call("GET", "/api/v1/reports/outstanding", Some(&headmaster), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(loans[0]["name"], "Name not found");
    assert_eq!(loans[0]["bookTitle"], "Book not found");
    assert_eq!(loans[0]["class"], serde_json::Value::Null);

    let (status, summary) = app
        .call("GET", "/api/v1/reports/summary", Some(&headmaster), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["borrowed"], 1);
}

#[tokio::test]
async fn test_openapi_document_is_served() {
    let app = TestApp::new(date(2024, 1, 1));
    let (status, doc) = app.call("GET", "/api-docs/openapi.json", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(doc["paths"]["/loans/{id}/return"].is_object());
}
