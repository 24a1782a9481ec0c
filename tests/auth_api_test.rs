mod common;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
};
use common::{response_json, TestApp, ADMIN_EMAIL, ADMIN_PASSWORD};
use serde_json::json;

const RIDER_EMAIL: &str = "rider@riders.test";
const RIDER_PASSWORD: &str = "correct-horse-battery";

async fn register_rider(app: &TestApp) {
    let (status, body) = app
        .call(
            Method::POST,
            "/api/auth/register",
            Some(json!({
                "name": "Rider",
                "email": RIDER_EMAIL,
                "password": RIDER_PASSWORD
            })),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["data"]["email"], RIDER_EMAIL);
    assert_eq!(body["data"]["isVerified"], false);
    assert_eq!(body["data"]["role"], "user");
}

fn login_body(email: &str, password: &str) -> serde_json::Value {
    json!({ "email": email, "password": password })
}

#[tokio::test]
async fn registration_requires_email_verification_before_login() {
    let app = TestApp::new().await;
    register_rider(&app).await;

    let sent = app.mailer.messages();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, RIDER_EMAIL);

    let (status, body) = app
        .call(
            Method::POST,
            "/api/auth/login",
            Some(login_body(RIDER_EMAIL, RIDER_PASSWORD)),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["statusCode"], 403);

    let token = app
        .mailer
        .verification_token_for(RIDER_EMAIL)
        .expect("verification link was mailed");
    let (status, body) = app
        .call(
            Method::GET,
            &format!("/api/auth/verify-email?token={token}"),
            None,
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["isVerified"], true);

    let (status, _) = app
        .call(
            Method::GET,
            &format!("/api/auth/verify-email?token={token}"),
            None,
            None,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let response = app
        .request(
            Method::POST,
            "/api/auth/login",
            Some(login_body(RIDER_EMAIL, RIDER_PASSWORD)),
            None,
        )
        .await;
    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .expect("session cookie set");
    assert!(cookie.starts_with("token="));
    assert!(cookie.contains("HttpOnly"));

    let (status, body) = response_json(response).await;
    assert_eq!(status, StatusCode::OK);
    let jwt = body["data"]["token"].as_str().unwrap().to_string();
    assert_eq!(body["data"]["user"]["email"], RIDER_EMAIL);

    let (status, body) = app.call(Method::GET, "/api/auth/me", None, Some(&jwt)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["email"], RIDER_EMAIL);

    let session = cookie.split(';').next().unwrap_or_default().to_string();
    let request = Request::builder()
        .method(Method::GET)
        .uri("/api/auth/me")
        .header(header::COOKIE, session)
        .body(Body::empty())
        .unwrap();
    let (status, body) = response_json(app.send(request).await).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "Rider");
}

#[tokio::test]
async fn missing_verification_token_is_a_bad_request() {
    let app = TestApp::new().await;
    let (status, body) = app
        .call(Method::GET, "/api/auth/verify-email", None, None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Verification token is required");
}

#[tokio::test]
async fn resend_issues_a_fresh_link_and_ignores_unknown_addresses() {
    let app = TestApp::new().await;
    register_rider(&app).await;
    let first = app.mailer.verification_token_for(RIDER_EMAIL).unwrap();

    let (status, _) = app
        .call(
            Method::POST,
            "/api/auth/resend-verification",
            Some(json!({ "email": RIDER_EMAIL })),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let second = app.mailer.verification_token_for(RIDER_EMAIL).unwrap();
    assert_ne!(first, second);

    let (status, _) = app
        .call(
            Method::POST,
            "/api/auth/resend-verification",
            Some(json!({ "email": "nobody@riders.test" })),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(app.mailer.messages().len(), 2);
}

#[tokio::test]
async fn wrong_password_and_duplicate_email_are_rejected() {
    let app = TestApp::new().await;
    register_rider(&app).await;

    let (status, body) = app
        .call(
            Method::POST,
            "/api/auth/register",
            Some(json!({
                "name": "Again",
                "email": RIDER_EMAIL,
                "password": "another-password"
            })),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["statusCode"], 409);

    let (status, _) = app
        .call(
            Method::POST,
            "/api/auth/login",
            Some(login_body(ADMIN_EMAIL, "not-the-password")),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = app
        .call(
            Method::POST,
            "/api/auth/login",
            Some(login_body(ADMIN_EMAIL, ADMIN_PASSWORD)),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["user"]["role"], "admin");
}

#[tokio::test]
async fn registration_payload_is_validated() {
    let app = TestApp::new().await;
    let (status, body) = app
        .call(
            Method::POST,
            "/api/auth/register",
            Some(json!({ "name": "", "email": "not-an-email", "password": "short" })),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["errors"]["email"].is_array());
    assert!(body["errors"]["password"].is_array());
    assert!(app.mailer.messages().is_empty());
}

#[tokio::test]
async fn admin_routes_require_an_admin_session() {
    let app = TestApp::new().await;

    let (status, _) = app.call(Method::GET, "/api/admin/bikes", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app.call(Method::GET, "/api/auth/me", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let user = app.user_token();
    let (status, _) = app
        .call(Method::GET, "/api/admin/bikes", None, Some(&user))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .call(Method::GET, "/api/admin/bikes", None, Some("garbage"))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app.admin(Method::GET, "/api/admin/bikes", None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn logout_expires_the_session_cookie() {
    let app = TestApp::new().await;
    let response = app.request(Method::POST, "/api/auth/logout", None, None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    assert!(cookie.starts_with("token=;"));
    assert!(cookie.contains("Max-Age=0"));
}
