mod common;

use axum::http::{Method, StatusCode};
use common::TestApp;
use serde_json::json;
use uuid::Uuid;

#[tokio::test]
async fn duplicate_email_is_a_conflict() {
    let app = TestApp::new().await;
    app.create_partner("Anna", "anna@partners.test").await;

    let (status, body) = app
        .admin(
            Method::POST,
            "/api/admin/partners",
            Some(json!({ "name": "Other Anna", "email": "Anna@Partners.test" })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT, "{body}");
    assert_eq!(body["statusCode"], 409);
    assert!(body["message"].as_str().unwrap().contains("anna@partners.test"));

    let (_, list) = app.admin(Method::GET, "/api/admin/partners", None).await;
    assert_eq!(list["data"]["total"], 1);
}

#[tokio::test]
async fn update_replaces_fields_and_guards_the_email() {
    let app = TestApp::new().await;
    let anna = app.create_partner("Anna", "anna@partners.test").await;
    app.create_partner("Bruno", "bruno@partners.test").await;
    let uri = format!("/api/admin/partners/{anna}");

    let (status, body) = app
        .admin(
            Method::PUT,
            &uri,
            Some(json!({
                "name": "Anna Maria",
                "email": "anna@partners.test",
                "phone": "+351 900 000 000",
                "notes": "Prefers bank transfer"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["name"], "Anna Maria");
    assert_eq!(body["data"]["phone"], "+351 900 000 000");
    assert_eq!(body["data"]["isActive"], true);

    let (status, body) = app
        .admin(
            Method::PUT,
            &uri,
            Some(json!({ "name": "Anna Maria", "email": "bruno@partners.test" })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT, "{body}");

    let (status, body) = app.admin(Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["email"], "anna@partners.test");
    assert_eq!(body["data"]["notes"], "Prefers bank transfer");

    let (status, _) = app
        .admin(
            Method::PUT,
            &format!("/api/admin/partners/{}", Uuid::new_v4()),
            Some(json!({ "name": "Nobody", "email": "nobody@partners.test" })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_deactivates_instead_of_removing() {
    let app = TestApp::new().await;
    let anna = app.create_partner("Anna", "anna@partners.test").await;
    app.create_partner("Bruno", "bruno@partners.test").await;
    let uri = format!("/api/admin/partners/{anna}");

    let (status, body) = app.admin(Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["isActive"], false);

    let (status, body) = app.admin(Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["isActive"], false);

    let (_, body) = app
        .admin(Method::GET, "/api/admin/partners?isActive=true", None)
        .await;
    assert_eq!(body["data"]["total"], 1);
    assert_eq!(body["data"]["items"][0]["name"], "Bruno");

    let (_, body) = app
        .admin(Method::GET, "/api/admin/partners?isActive=false", None)
        .await;
    assert_eq!(body["data"]["total"], 1);
    assert_eq!(body["data"]["items"][0]["name"], "Anna");

    let (status, _) = app
        .admin(
            Method::DELETE,
            &format!("/api/admin/partners/{}", Uuid::new_v4()),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn search_matches_name_or_email() {
    let app = TestApp::new().await;
    app.create_partner("Anna", "anna@partners.test").await;
    app.create_partner("Bruno", "bruno@garage.test").await;

    let (status, body) = app
        .admin(Method::GET, "/api/admin/partners?search=garage", None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], 1);
    assert_eq!(body["data"]["items"][0]["name"], "Bruno");

    let (_, body) = app
        .admin(Method::GET, "/api/admin/partners?search=ann", None)
        .await;
    assert_eq!(body["data"]["total"], 1);
}
