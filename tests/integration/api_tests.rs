//! API integration tests
//!
//! Run against a live server and database:
//! `cargo test --test api_tests -- --ignored`
//! Tokens are minted locally with the server's JWT secret (JWT_SECRET or the
//! default from config/default.toml).

use asset_booking_server::models::{enums::Role, UserClaims};
use chrono::{Duration, Local, NaiveDate};
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:8080/api/v1";
const DEFAULT_SECRET: &str = "change-this-secret-in-production";

fn token(person_id: i32, role: Role, is_admin: bool) -> String {
    let secret = std::env::var("JWT_SECRET").unwrap_or_else(|_| DEFAULT_SECRET.to_string());
    let now = chrono::Utc::now().timestamp();
    UserClaims {
        sub: format!("tester-{}", person_id),
        person_id,
        role,
        is_admin,
        exp: now + 3600,
        iat: now,
    }
    .create_token(&secret)
    .expect("Failed to sign token")
}

fn admin_token() -> String {
    token(0, Role::DeliveryManager, true)
}

/// Suffix keeping names unique across test runs
fn unique(prefix: &str) -> String {
    let nanos = chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default();
    format!("{}{}", prefix, nanos % 1_000_000_000_000)
}

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

async fn create_location(client: &Client, admin: &str) -> i64 {
    let response = client
        .post(format!("{}/locations", BASE_URL))
        .bearer_auth(admin)
        .json(&json!({ "name": unique("Office ") }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = response.json().await.expect("Failed to parse response");
    body["id"].as_i64().expect("No location id")
}

async fn create_person(client: &Client, admin: &str, office_id: i64, last_name: &str, role: &str) -> i32 {
    let response = client
        .post(format!("{}/persons", BASE_URL))
        .bearer_auth(admin)
        .json(&json!({
            "username": unique("user"),
            "first_name": "Test",
            "last_name": last_name,
            "office_id": office_id,
            "role": role
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = response.json().await.expect("Failed to parse response");
    body["id"].as_i64().expect("No person id") as i32
}

async fn create_device(client: &Client, admin: &str, office_id: i64) -> String {
    let asset_num = unique("A");
    let response = client
        .post(format!("{}/devices", BASE_URL))
        .bearer_auth(admin)
        .json(&json!({
            "asset_num": asset_num,
            "serial_num": unique("SN"),
            "brand": "Google",
            "model": "Pixel 8",
            "os_name": "ANDROID",
            "os_version": "14",
            "office_id": office_id
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::CREATED);
    asset_num
}

async fn book(
    client: &Client,
    token: &str,
    person_id: i32,
    device: &str,
    from: NaiveDate,
    to: NaiveDate,
) -> reqwest::Response {
    client
        .post(format!("{}/bookings", BASE_URL))
        .bearer_auth(token)
        .json(&json!({
            "person_id": person_id,
            "device_id": device,
            "date_from": from,
            "date_to": to
        }))
        .send()
        .await
        .expect("Failed to send request")
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

    let response = client
        .get(format!("{}/ready", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
}

#[tokio::test]
#[ignore]
async fn test_missing_token_rejected() {
    let client = Client::new();

    let response = client
        .get(format!("{}/devices", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore]
async fn test_overlap_on_shared_day() {
    let client = Client::new();
    let admin = admin_token();
    let office = create_location(&client, &admin).await;
    let p1 = create_person(&client, &admin, office, "First", "SC").await;
    let p2 = create_person(&client, &admin, office, "Second", "SC").await;
    let device = create_device(&client, &admin, office).await;

    let first = book(&client, &admin, p1, &device, day(2024, 1, 1), day(2024, 1, 10)).await;
    assert_eq!(first.status(), StatusCode::CREATED);
    let first: Value = first.json().await.expect("Failed to parse response");

    let shared_day = book(&client, &admin, p2, &device, day(2024, 1, 10), day(2024, 1, 15)).await;
    assert_eq!(shared_day.status(), StatusCode::CONFLICT);
    let body: Value = shared_day.json().await.expect("Failed to parse response");
    assert_eq!(body["error"], "BookingOverlap");
    assert!(body["message"]
        .as_str()
        .unwrap_or_default()
        .contains(&format!("#{}", first["id"])));

    let next_day = book(&client, &admin, p2, &device, day(2024, 1, 11), day(2024, 1, 15)).await;
    assert_eq!(next_day.status(), StatusCode::CREATED);
}

#[tokio::test]
#[ignore]
async fn test_date_order_rejected() {
    let client = Client::new();
    let admin = admin_token();
    let office = create_location(&client, &admin).await;
    let person = create_person(&client, &admin, office, "Order", "SC").await;
    let device = create_device(&client, &admin, office).await;

    let response = book(&client, &admin, person, &device, day(2024, 2, 5), day(2024, 2, 1)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["error"], "DateOrder");
}

#[tokio::test]
#[ignore]
async fn test_consultant_restrictions() {
    let client = Client::new();
    let admin = admin_token();
    let office = create_location(&client, &admin).await;
    let me = create_person(&client, &admin, office, "Consultant", "SC").await;
    let other = create_person(&client, &admin, office, "Other", "SC").await;
    let device = create_device(&client, &admin, office).await;
    let consultant = token(me, Role::SecurityConsultant, false);

    // Booking for somebody else
    let response = book(&client, &consultant, other, &device, day(2030, 1, 1), day(2030, 1, 5)).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Own booking is fine
    let response = book(&client, &consultant, me, &device, day(2030, 1, 1), day(2030, 1, 5)).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let booking: Value = response.json().await.expect("Failed to parse response");
    let id = booking["id"].as_i64().expect("No booking id");

    // Marking it returned is not
    let response = client
        .post(format!("{}/bookings/{}/return", BASE_URL, id))
        .bearer_auth(&consultant)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Nor is managing devices
    let response = client
        .delete(format!("{}/devices/{}", BASE_URL, device))
        .bearer_auth(&consultant)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
#[ignore]
async fn test_return_flow_and_availability() {
    let client = Client::new();
    let admin = admin_token();
    let office = create_location(&client, &admin).await;
    let p1 = create_person(&client, &admin, office, "Early", "SC").await;
    let p2 = create_person(&client, &admin, office, "Current", "SC").await;
    let device = create_device(&client, &admin, office).await;

    // Fresh device is free with no holder
    let response = client
        .get(format!("{}/devices/{}", BASE_URL, device))
        .bearer_auth(&admin)
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["free"], true);
    assert!(body["used_by"].is_null());

    let today = Local::now().date_naive();
    let past = book(&client, &admin, p1, &device, today - Duration::days(20), today - Duration::days(10)).await;
    assert_eq!(past.status(), StatusCode::CREATED);
    let past: Value = past.json().await.expect("Failed to parse response");
    assert_eq!(past["overdue"], true);

    let response = client
        .post(format!("{}/bookings/{}/return", BASE_URL, past["id"]))
        .bearer_auth(&admin)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::OK);
    let returned: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(returned["returned"], true);
    assert_eq!(returned["overdue"], false);

    // Returning twice conflicts
    let response = client
        .post(format!("{}/bookings/{}/return", BASE_URL, past["id"]))
        .bearer_auth(&admin)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let current = book(&client, &admin, p2, &device, today, today + Duration::days(7)).await;
    assert_eq!(current.status(), StatusCode::CREATED);
    let current: Value = current.json().await.expect("Failed to parse response");

    // Returning before the end date is premature
    let response = client
        .post(format!("{}/bookings/{}/return", BASE_URL, current["id"]))
        .bearer_auth(&admin)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let response = client
        .get(format!("{}/devices/{}", BASE_URL, device))
        .bearer_auth(&admin)
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["free"], false);
    assert_eq!(body["used_by"]["id"], p2);
    assert_eq!(body["bookings_count"], 2);

    let response = client
        .get(format!("{}/devices/{}/bookings", BASE_URL, device))
        .bearer_auth(&admin)
        .send()
        .await
        .expect("Failed to send request");
    let history: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(history.as_array().map(Vec::len), Some(2));
}

#[tokio::test]
#[ignore]
async fn test_concurrent_overlapping_bookings() {
    let client = Client::new();
    let admin = admin_token();
    let office = create_location(&client, &admin).await;
    let p1 = create_person(&client, &admin, office, "Racer", "SC").await;
    let p2 = create_person(&client, &admin, office, "Rival", "SC").await;
    let device = create_device(&client, &admin, office).await;

    let (a, b) = tokio::join!(
        book(&client, &admin, p1, &device, day(2031, 5, 1), day(2031, 5, 10)),
        book(&client, &admin, p2, &device, day(2031, 5, 5), day(2031, 5, 15)),
    );

    let mut statuses = vec![a.status(), b.status()];
    statuses.sort();
    assert_eq!(statuses, vec![StatusCode::CREATED, StatusCode::CONFLICT]);
}

#[tokio::test]
#[ignore]
async fn test_booking_filters() {
    let client = Client::new();
    let admin = admin_token();
    let office = create_location(&client, &admin).await;
    let last_name = unique("Filter");
    let person = create_person(&client, &admin, office, &last_name, "EC").await;
    let device = create_device(&client, &admin, office).await;

    let response = book(&client, &admin, person, &device, day(2032, 3, 1), day(2032, 3, 3)).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = client
        .get(format!("{}/bookings", BASE_URL))
        .bearer_auth(&admin)
        .query(&[("search", last_name.as_str()), ("returned", "false")])
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["total"], 1);
    assert_eq!(body["items"][0]["device_id"], device.as_str());

    let response = client
        .get(format!("{}/bookings", BASE_URL))
        .bearer_auth(&admin)
        .query(&[("device_id", device.as_str()), ("from_after", "2032-03-02")])
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["total"], 0);
}

#[tokio::test]
#[ignore]
async fn test_csv_export() {
    let client = Client::new();
    let admin = admin_token();
    let office = create_location(&client, &admin).await;
    let device = create_device(&client, &admin, office).await;

    let response = client
        .get(format!("{}/devices/export", BASE_URL))
        .bearer_auth(&admin)
        .query(&[("office_id", office.to_string())])
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["content-disposition"],
        "attachment; filename=assets.csv"
    );
    let bytes = response.bytes().await.expect("Failed to read body");
    assert!(bytes.starts_with(b"\xEF\xBB\xBF"));
    let text = String::from_utf8_lossy(&bytes[3..]);
    let mut lines = text.split("\r\n");
    assert_eq!(lines.next(), Some("Brand,Model,OS Name,OS Version,Serial,Rooted"));
    let row = lines.next().unwrap_or_default();
    assert!(row.starts_with("Google,Pixel 8,ANDROID,14,"));
    assert!(row.ends_with(",False"));
    assert!(!device.is_empty());
}

#[tokio::test]
#[ignore]
async fn test_audit_log_records_changes() {
    let client = Client::new();
    let admin = admin_token();
    let office = create_location(&client, &admin).await;
    let device = create_device(&client, &admin, office).await;

    let response = client
        .get(format!("{}/audit", BASE_URL))
        .bearer_auth(&admin)
        .query(&[("content_type", "device"), ("search", device.as_str())])
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["total"], 1);
    assert_eq!(body["items"][0]["action_flag"], "addition");
    assert_eq!(body["items"][0]["object_id"], device.as_str());

    // Non-admins cannot read it
    let manager = token(0, Role::DeliveryManager, false);
    let response = client
        .get(format!("{}/audit", BASE_URL))
        .bearer_auth(&manager)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
#[ignore]
async fn test_concurrent_returns() {
    let client = Client::new();
    let admin = admin_token();
    let office = create_location(&client, &admin).await;
    let person = create_person(&client, &admin, office, "Returner", "SC").await;
    let device = create_device(&client, &admin, office).await;

    let response = book(&client, &admin, person, &device, day(2024, 6, 1), day(2024, 6, 5)).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let booking: Value = response.json().await.expect("Failed to parse response");
    let url = format!("{}/bookings/{}/return", BASE_URL, booking["id"]);

    let (a, b) = tokio::join!(
        client.post(&url).bearer_auth(&admin).send(),
        client.post(&url).bearer_auth(&admin).send(),
    );
    let mut statuses = vec![
        a.expect("Failed to send request").status(),
        b.expect("Failed to send request").status(),
    ];
    statuses.sort();
    assert_eq!(statuses, vec![StatusCode::OK, StatusCode::CONFLICT]);

    // Only the winning return is recorded
    let response = client
        .get(format!("{}/audit", BASE_URL))
        .bearer_auth(&admin)
        .query(&[
            ("content_type", "booking".to_string()),
            ("action_flag", "change".to_string()),
            ("search", device.clone()),
        ])
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["total"], 1);
}
