//! API integration tests
//!
//! These run against a live server started with
//! `LENDABLE_AUTH__BOOTSTRAP_ADMIN=admin LENDABLE_AUTH__BOOTSTRAP_PASSWORD=admin`.

use chrono::{Duration, Utc};
use reqwest::Client;
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:8080/api/v1";

async fn login(client: &Client, username: &str, password: &str) -> String {
    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "username": username,
            "password": password
        }))
        .send()
        .await
        .expect("Failed to send login request");

    let body: Value = response.json().await.expect("Failed to parse login response");
    body["token"].as_str().expect("No token in response").to_string()
}

/// Creates an account through the admin API and returns its id and a token
async fn create_account(client: &Client, admin_token: &str, role: &str) -> (i64, String) {
    let username = format!("{}_{}", role.to_lowercase(), Utc::now().timestamp_micros());
    let response = client
        .post(format!("{}/users", BASE_URL))
        .header("Authorization", format!("Bearer {}", admin_token))
        .json(&json!({
            "username": username,
            "password": "rahasia123",
            "full_name": format!("Test {}", role),
            "role": role
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);

    let body: Value = response.json().await.expect("Failed to parse response");
    let id = body["id"].as_i64().expect("No id in response");
    (id, login(client, &username, "rahasia123").await)
}

async fn create_equipment(client: &Client, admin_token: &str, stock: i64, price: &str) -> i64 {
    let response = client
        .post(format!("{}/equipment", BASE_URL))
        .header("Authorization", format!("Bearer {}", admin_token))
        .json(&json!({
            "name": format!("Kamera {}", Utc::now().timestamp_micros()),
            "description": "Mirrorless camera",
            "stock": stock,
            "unit_price": price
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);

    let body: Value = response.json().await.expect("Failed to parse response");
    body["id"].as_i64().expect("No id in response")
}

async fn get_stock(client: &Client, token: &str, equipment_id: i64) -> (i64, String) {
    let body: Value = client
        .get(format!("{}/equipment/{}", BASE_URL, equipment_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    (
        body["stock"].as_i64().expect("No stock"),
        body["status"].as_str().expect("No status").to_string(),
    )
}

/// Requests, approves and hands over a loan whose deadline passed `days_late` days ago
async fn borrowed_loan(
    client: &Client,
    borrower_token: &str,
    staff_token: &str,
    equipment_id: i64,
    quantity: i64,
    days_late: i64,
) -> i64 {
    let deadline = Utc::now() - Duration::days(days_late);
    let response = client
        .post(format!("{}/loans", BASE_URL))
        .header("Authorization", format!("Bearer {}", borrower_token))
        .json(&json!({
            "equipment_id": equipment_id,
            "quantity": quantity,
            "borrow_date": deadline - Duration::days(7),
            "deadline": deadline,
            "purpose": "Dokumentasi acara"
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse response");
    let loan_id = body["data"]["id"].as_i64().expect("No loan id");

    for step in ["approve", "handover"] {
        let response = client
            .post(format!("{}/loans/{}/{}", BASE_URL, loan_id, step))
            .header("Authorization", format!("Bearer {}", staff_token))
            .send()
            .await
            .expect("Failed to send request");
        assert!(response.status().is_success(), "{} failed", step);
    }

    loan_id
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_health_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_login_invalid_credentials() {
    let client = Client::new();

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "username": "admin",
            "password": "wrong"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["success"], false);
}

#[tokio::test]
#[ignore]
async fn test_late_damaged_return_is_fined_and_restocked_on_confirmation() {
    let client = Client::new();
    let admin = login(&client, "admin", "admin").await;
    let (_, staff) = create_account(&client, &admin, "PETUGAS").await;
    let (_, borrower) = create_account(&client, &admin, "PEMINJAM").await;
    let equipment_id = create_equipment(&client, &admin, 2, "1000000").await;

    let loan_id = borrowed_loan(&client, &borrower, &staff, equipment_id, 2, 3).await;
    assert_eq!(get_stock(&client, &admin, equipment_id).await, (0, "UNAVAILABLE".to_string()));

    // Submission assesses the fine but leaves stock untouched
    let response = client
        .post(format!("{}/returns", BASE_URL))
        .header("Authorization", format!("Bearer {}", borrower))
        .json(&json!({
            "loan_id": loan_id,
            "kondisi_alat": "MODERATE_DAMAGE",
            "catatan": "Strap putus"
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["fine"]["late_days"], 3);
    assert_eq!(body["data"]["fine"]["total_fine"], "550000.00");
    assert_eq!(body["data"]["return"]["status"], "AWAITING_PAYMENT");
    let return_id = body["data"]["return"]["id"].as_i64().expect("No return id");
    assert_eq!(get_stock(&client, &admin, equipment_id).await.0, 0);

    // A second submission for the same loan conflicts
    let response = client
        .post(format!("{}/returns", BASE_URL))
        .header("Authorization", format!("Bearer {}", borrower))
        .json(&json!({"loan_id": loan_id, "kondisi_alat": "GOOD"}))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["error"], "Conflict");

    // The fine must be settled before confirming
    let response = client
        .patch(format!("{}/returns/{}", BASE_URL, return_id))
        .header("Authorization", format!("Bearer {}", staff))
        .json(&json!({"confirm_payment": false}))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["error"], "PaymentRequired");

    let response = client
        .patch(format!("{}/returns/{}", BASE_URL, return_id))
        .header("Authorization", format!("Bearer {}", staff))
        .json(&json!({"confirm_payment": true}))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["data"]["status"], "RETURNED_CONFIRMED");
    assert_eq!(get_stock(&client, &admin, equipment_id).await, (2, "AVAILABLE".to_string()));

    // Confirming twice changes nothing
    let response = client
        .patch(format!("{}/returns/{}", BASE_URL, return_id))
        .header("Authorization", format!("Bearer {}", staff))
        .json(&json!({"confirm_payment": true}))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 400);
    assert_eq!(get_stock(&client, &admin, equipment_id).await.0, 2);
}

#[tokio::test]
#[ignore]
async fn test_borrower_cannot_return_someone_elses_loan() {
    let client = Client::new();
    let admin = login(&client, "admin", "admin").await;
    let (_, staff) = create_account(&client, &admin, "PETUGAS").await;
    let (_, owner) = create_account(&client, &admin, "PEMINJAM").await;
    let (_, stranger) = create_account(&client, &admin, "PEMINJAM").await;
    let equipment_id = create_equipment(&client, &admin, 1, "250000").await;
    let loan_id = borrowed_loan(&client, &owner, &staff, equipment_id, 1, 0).await;

    let response = client
        .post(format!("{}/returns", BASE_URL))
        .header("Authorization", format!("Bearer {}", stranger))
        .json(&json!({"loan_id": loan_id, "kondisi_alat": "GOOD"}))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 403);
}

#[tokio::test]
#[ignore]
async fn test_fine_free_return_confirms_without_payment() {
    let client = Client::new();
    let admin = login(&client, "admin", "admin").await;
    let (_, staff) = create_account(&client, &admin, "PETUGAS").await;
    let (_, borrower) = create_account(&client, &admin, "PEMINJAM").await;
    let equipment_id = create_equipment(&client, &admin, 3, "800000").await;
    let loan_id = borrowed_loan(&client, &borrower, &staff, equipment_id, 1, 0).await;

    let body: Value = client
        .post(format!("{}/returns", BASE_URL))
        .header("Authorization", format!("Bearer {}", borrower))
        .json(&json!({"loan_id": loan_id, "kondisi_alat": "GOOD"}))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    assert_eq!(body["data"]["fine"]["total_fine"], "0.00");
    let return_id = body["data"]["return"]["id"].as_i64().expect("No return id");

    let response = client
        .patch(format!("{}/returns/{}", BASE_URL, return_id))
        .header("Authorization", format!("Bearer {}", staff))
        .json(&json!({"confirm_payment": false}))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 200);
    assert_eq!(get_stock(&client, &admin, equipment_id).await.0, 3);
}

#[tokio::test]
#[ignore]
async fn test_overdue_filter_lists_late_loans() {
    let client = Client::new();
    let admin = login(&client, "admin", "admin").await;
    let (_, staff) = create_account(&client, &admin, "PETUGAS").await;
    let (_, borrower) = create_account(&client, &admin, "PEMINJAM").await;
    let equipment_id = create_equipment(&client, &admin, 1, "100000").await;
    let loan_id = borrowed_loan(&client, &borrower, &staff, equipment_id, 1, 2).await;

    let body: Value = client
        .get(format!("{}/loans?status=OVERDUE", BASE_URL))
        .header("Authorization", format!("Bearer {}", borrower))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");

    let items = body["data"]["items"].as_array().expect("No items");
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["id"].as_i64(), Some(loan_id));
    assert_eq!(items[0]["status"], "BORROWED");
    assert_eq!(items[0]["display_status"], "OVERDUE");
}
