use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    response::Response,
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt; // oneshot

use adapt::service::Services;
use adapt::store::InMemoryStore;
use domain::security::password::hash_password;
use domain::setting::{DefaultAdminSettings, EventSettings, Settings};
use serve::{app_router, AppState};

type AppSvc = tower_http::normalize_path::NormalizePath<Router>;

const OWNER_EMAIL: &str = "owner@example.com";
const OWNER_PASS: &str = "owner-pass-123";
const GROUP_LINK: &str = "https://chat.whatsapp.com/example";

// === Build app like main ===
fn build_test_app() -> AppSvc {
    let settings = Settings {
        default_admin: Some(DefaultAdminSettings {
            name: "Owner".into(),
            email: OWNER_EMAIL.into(),
            password_hash: hash_password(OWNER_PASS).unwrap(),
        }),
        event: EventSettings {
            currency: "TZS".into(),
            whatsapp_link: Some(GROUP_LINK.into()),
        },
        ..Settings::default()
    };
    let services = Services::new(Arc::new(InMemoryStore::new()), &settings).unwrap();
    app_router(AppState::new(services, settings.event))
}

// === Small IO helpers ===
async fn read(resp: Response) -> (StatusCode, String) {
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
    (status, String::from_utf8_lossy(&bytes).into_owned())
}

async fn send(
    app: &AppSvc,
    method: &str,
    path: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut req = Request::builder().method(method).uri(path);
    if let Some(t) = token {
        req = req.header(header::AUTHORIZATION, format!("Bearer {t}"));
    }
    let req = match body {
        Some(v) => req
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(v.to_string()))
            .unwrap(),
        None => req.body(Body::empty()).unwrap(),
    };
    let (status, text) = read(app.clone().oneshot(req).await.unwrap()).await;
    let value = if text.is_empty() {
        Value::Null
    } else {
        serde_json::from_str(&text).unwrap_or(Value::String(text))
    };
    (status, value)
}

async fn login(app: &AppSvc) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/api/admin/login",
        None,
        Some(json!({ "email": OWNER_EMAIL, "password": OWNER_PASS })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    body["token"].as_str().unwrap().to_owned()
}

async fn pledge(app: &AppSvc, name: &str, phone: &str, amount: f64) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/api/pledges",
        None,
        Some(json!({ "name": name, "phone": phone, "pledgeAmount": amount })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["pledge"]["id"].as_str().unwrap().to_owned()
}

// ===================== TESTS =====================

#[tokio::test]
async fn root_answers_and_trailing_slash_is_normalized() {
    let app = build_test_app();
    let (status, _) = send(&app, "GET", "/", None, None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, "GET", "/api/pledges/", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pledges"], json!([]));
}

#[tokio::test]
async fn public_pledge_flow() {
    let app = build_test_app();

    let (status, body) = send(
        &app,
        "POST",
        "/api/pledges",
        None,
        Some(json!({ "name": "Asha", "phone": "0712345678", "pledgeAmount": 200000 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["whatsappLink"], GROUP_LINK);
    assert_eq!(body["pledge"]["paidAmount"], 0.0);
    assert_eq!(body["pledge"]["registrationType"], "SELF");

    pledge(&app, "Juma", "0755000111", 5000.0).await;

    let (status, body) = send(&app, "GET", "/api/pledges?q=asha", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pledges"].as_array().unwrap().len(), 1);
    assert_eq!(body["pledges"][0]["phone"], "071***");
    assert_eq!(body["totalPledged"], 205000.0);
    assert_eq!(body["totalPaid"], 0.0);
}

#[tokio::test]
async fn invalid_pledge_reports_every_field() {
    let app = build_test_app();
    let (status, body) = send(
        &app,
        "POST",
        "/api/pledges",
        None,
        Some(json!({ "name": " ", "phone": "abc", "pledgeAmount": 50 })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["fields"]["name"], "Name is required");
    assert_eq!(body["fields"]["phone"], "Please enter a valid phone number");
    assert_eq!(body["fields"]["pledgeAmount"], "Enter a valid pledge amount");
}

#[tokio::test]
async fn mistyped_body_gets_json_error() {
    let app = build_test_app();
    let (status, body) = send(
        &app,
        "POST",
        "/api/pledges",
        None,
        Some(json!({ "name": "Asha", "phone": "0712345678", "pledgeAmount": "abc" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "Invalid request body");

    let id = pledge(&app, "Asha", "0712345678", 1000.0).await;
    let token = login(&app).await;
    let path = format!("/api/admin/pledges/{id}/payments");
    let (status, body) = send(&app, "POST", &path, Some(&token), Some(json!({ "amount": null }))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "Invalid request body");
}

#[tokio::test]
async fn admin_bearer_sees_full_phones_on_public_listing() {
    let app = build_test_app();
    pledge(&app, "Asha", "0712345678", 1000.0).await;

    let (_, body) = send(&app, "GET", "/api/pledges", None, None).await;
    assert_eq!(body["pledges"][0]["phone"], "071***");

    let token = login(&app).await;
    let (status, body) = send(&app, "GET", "/api/pledges", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pledges"][0]["phone"], "0712345678");

    let (_, body) = send(&app, "GET", "/api/pledges", Some("stale-token"), None).await;
    assert_eq!(body["pledges"][0]["phone"], "071***");
}

#[tokio::test]
async fn payment_for_missing_invitee_is_404() {
    let app = build_test_app();
    let token = login(&app).await;
    let (status, body) = send(
        &app,
        "POST",
        "/api/admin/pledges/ghost/payments",
        Some(&token),
        Some(json!({ "amount": 1000 })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Invitee not found");
}

#[tokio::test]
async fn admin_routes_need_a_session() {
    let app = build_test_app();
    for path in ["/api/admin/dashboard", "/api/admin/invitees", "/api/admin/pledges/export.csv"] {
        let (status, _) = send(&app, "GET", path, None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{path}");
        let (status, _) = send(&app, "GET", path, Some("forged"), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{path}");
    }

    let (status, body) = send(
        &app,
        "POST",
        "/api/admin/login",
        None,
        Some(json!({ "email": OWNER_EMAIL, "password": "wrong-password" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid email or password");
}

#[tokio::test]
async fn login_session_logout() {
    let app = build_test_app();
    let (_, state) = send(&app, "GET", "/api/admin/session", None, None).await;
    assert_eq!(state["isAuthenticated"], false);

    let token = login(&app).await;
    let (_, state) = send(&app, "GET", "/api/admin/session", Some(&token), None).await;
    assert_eq!(state["isAuthenticated"], true);
    assert_eq!(state["admin"]["id"], "default");

    let (status, _) = send(&app, "POST", "/api/admin/logout", Some(&token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, "GET", "/api/admin/dashboard", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn payments_dashboard_and_csv() {
    let app = build_test_app();
    let id = pledge(&app, "Asha", "0712345678", 200000.0).await;
    let token = login(&app).await;

    let path = format!("/api/admin/pledges/{id}/payments");
    let (status, body) = send(&app, "POST", &path, Some(&token), Some(json!({ "amount": 50000 }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["progress"]["percentage"], 25.0);
    assert_eq!(body["progress"]["tier"], "low");

    let (status, body) = send(&app, "POST", &path, Some(&token), Some(json!({ "amount": 0 }))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["fields"]["amount"].is_string());

    let (status, body) = send(&app, "POST", &path, Some(&token), Some(json!({ "amount": 150000 }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["paidAmount"], 200000.0);
    assert_eq!(body["progress"]["tier"], "complete");

    let (_, stats) = send(&app, "GET", "/api/admin/dashboard", Some(&token), None).await;
    assert_eq!(stats["totalAdmins"], 1);
    assert_eq!(stats["totalInvitees"], 1);
    assert_eq!(stats["activePledges"], 1);
    assert_eq!(stats["totalPaid"], 200000.0);

    let req = Request::get("/api/admin/pledges/export.csv")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    assert!(resp.headers()[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with("text/csv"));
    assert!(resp.headers()[header::CONTENT_DISPOSITION]
        .to_str()
        .unwrap()
        .contains("Pledges_Report.csv"));
    let (_, csv) = read(resp).await;
    let lines: Vec<_> = csv.lines().collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[1], "Asha,0712345678,200000,200000,0,Fully Paid,100%");
}

#[tokio::test]
async fn paid_amount_edits_are_admin_only() {
    let app = build_test_app();
    let id = pledge(&app, "Asha", "0712345678", 1000.0).await;
    let path = format!("/api/pledges/{id}");
    let update = json!({ "name": "Asha", "phone": "0712345678", "pledgeAmount": 1000, "paidAmount": 400 });

    let (status, _) = send(&app, "PUT", &path, None, Some(update.clone())).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let token = login(&app).await;
    let (status, body) = send(&app, "PUT", &path, Some(&token), Some(update)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["paidAmount"], 400.0);
    assert_eq!(body["paymentInstallments"], json!([400.0]));

    let (status, _) = send(&app, "PUT", "/api/pledges/ghost", None,
        Some(json!({ "name": "X", "phone": "0712345678", "pledgeAmount": 1000 }))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn card_token_flow() {
    let app = build_test_app();
    let token = login(&app).await;

    let (status, card) = send(
        &app,
        "POST",
        "/api/admin/cards",
        Some(&token),
        Some(json!({ "name": "Mr & Mrs Mushi", "phone": "0712345678" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let share = card["token"].as_str().unwrap().to_owned();

    let (status, view) = send(&app, "GET", &format!("/api/cards/{share}"), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["name"], "Mr & Mrs Mushi");
    assert_eq!(view["id"], card["id"]);
    assert!(view.get("phone").is_none());

    let (status, draft) = send(&app, "GET", &format!("/api/pledges/by-card/{share}"), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(draft["phone"], "0712345678");

    let (status, _) = send(&app, "GET", "/api/cards/bm9wZQ", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(&app, "POST", "/api/admin/cards", Some(&token), Some(json!({}))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["fields"]["phone"], "Phone number is required");
}

#[tokio::test]
async fn admin_management_rules() {
    let app = build_test_app();
    let owner = login(&app).await;

    let (status, rehema) = send(
        &app,
        "POST",
        "/api/admin/admins",
        Some(&owner),
        Some(json!({ "name": "Rehema", "email": "rehema@example.com", "password": "harusi-2025" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(rehema.get("passwordHash").is_none());

    let (status, _) = send(
        &app,
        "POST",
        "/api/admin/admins",
        Some(&owner),
        Some(json!({ "name": "Dup", "email": "REHEMA@example.com", "password": "harusi-2025" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send(&app, "DELETE", "/api/admin/admins/default", Some(&owner), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // rehema logs in, then gets deleted: her session dies with her
    let (_, body) = send(
        &app,
        "POST",
        "/api/admin/login",
        None,
        Some(json!({ "email": "rehema@example.com", "password": "harusi-2025" })),
    )
    .await;
    let rehema_token = body["token"].as_str().unwrap().to_owned();
    let rehema_path = format!("/api/admin/admins/{}", rehema["id"].as_str().unwrap());

    let (status, _) = send(&app, "DELETE", &rehema_path, Some(&rehema_token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(&app, "DELETE", &rehema_path, Some(&owner), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, "GET", "/api/admin/dashboard", Some(&rehema_token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn admin_registers_invitee_with_payments() {
    let app = build_test_app();
    let token = login(&app).await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/admin/invitees",
        Some(&token),
        Some(json!({ "name": "Baraka", "phone": "0755000111", "paymentInstallments": [10000] })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["registrationType"], "REGISTERED");
    assert_eq!(body["adminId"], "default");

    let (_, listing) = send(&app, "GET", "/api/admin/invitees", Some(&token), None).await;
    assert_eq!(listing["pledges"][0]["phone"], "0755000111");

    let (_, report) = send(&app, "GET", "/api/admin/reports", Some(&token), None).await;
    assert_eq!(report["totalPaidAmount"], 10000.0);

    let id = body["id"].as_str().unwrap();
    let (status, _) = send(&app, "DELETE", &format!("/api/admin/invitees/{id}"), Some(&token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}
