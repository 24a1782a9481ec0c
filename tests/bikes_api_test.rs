mod common;

use axum::http::{Method, StatusCode};
use common::{id_of, money, TestApp};
use rust_decimal_macros::dec;
use serde_json::json;

#[tokio::test]
async fn bike_without_explicit_share_reports_what_partners_leave() {
    let app = TestApp::new().await;
    let partner = app.create_partner("Ana Rider", "ana@partners.test").await;

    let bike = app
        .create_bike(json!({
            "price": 1000.0,
            "partners": [{ "partnerId": partner, "percentage": 30.0 }]
        }))
        .await;

    assert_eq!(money(&bike["myShare"]), dec!(700));
    assert_eq!(bike["partners"][0]["partnerId"], json!(partner));
    assert_eq!(bike["status"], "available");
    assert_eq!(bike["serviceHistory"], json!([]));
}

#[tokio::test]
async fn partner_percentages_over_one_hundred_are_rejected() {
    let app = TestApp::new().await;
    let a = app.create_partner("A", "a@partners.test").await;
    let b = app.create_partner("B", "b@partners.test").await;

    let (status, body) = app
        .admin(
            Method::POST,
            "/api/admin/bikes",
            Some(json!({
                "name": "Monster",
                "brand": "Ducati",
                "model": "937",
                "year": 2020,
                "mileage": 5000,
                "price": 9000.0,
                "purchasePrice": 7000.0,
                "partners": [
                    { "partnerId": a, "percentage": 60.0 },
                    { "partnerId": b, "percentage": 50.0 }
                ]
            })),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["statusCode"], 400);
    assert!(body["message"].as_str().unwrap().contains("exceeds 100%"));

    let (_, list) = app.admin(Method::GET, "/api/admin/bikes", None).await;
    assert_eq!(list["data"]["total"], 0);
}

#[tokio::test]
async fn unknown_partner_on_a_bike_is_not_found() {
    let app = TestApp::new().await;
    let (status, _) = app
        .admin(
            Method::POST,
            "/api/admin/bikes",
            Some(json!({
                "name": "Tenere",
                "brand": "Yamaha",
                "model": "700",
                "year": 2022,
                "mileage": 100,
                "price": 9500.0,
                "purchasePrice": 8000.0,
                "partners": [{ "partnerId": uuid::Uuid::new_v4(), "percentage": 10.0 }]
            })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn invalid_bike_fields_are_reported_per_field() {
    let app = TestApp::new().await;
    let (status, body) = app
        .admin(
            Method::POST,
            "/api/admin/bikes",
            Some(json!({
                "name": "",
                "brand": "Honda",
                "model": "CB500",
                "year": 1800,
                "mileage": 10,
                "price": 5000.0,
                "purchasePrice": 4000.0
            })),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["errors"]["name"].is_array());
    assert!(body["errors"]["year"].is_array());
}

#[tokio::test]
async fn status_toggle_and_soft_delete_control_storefront_visibility() {
    let app = TestApp::new().await;
    let bike = app.create_bike(json!({})).await;
    let id = id_of(&bike);

    let (status, _) = app.call(Method::GET, &format!("/api/bikes/{id}"), None, None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .admin(
            Method::PUT,
            &format!("/api/admin/bikes/{id}"),
            Some(json!({ "updateType": "status", "status": "sold" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "sold");
    assert_eq!(body["data"]["name"], "Street Triple");

    let (status, _) = app.call(Method::GET, &format!("/api/bikes/{id}"), None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = app
        .admin(Method::DELETE, &format!("/api/admin/bikes/{id}"), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "inactive");

    let (status, _) = app.admin(Method::GET, &format!("/api/admin/bikes/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn full_update_replaces_partner_list() {
    let app = TestApp::new().await;
    let a = app.create_partner("A", "a@partners.test").await;
    let b = app.create_partner("B", "b@partners.test").await;
    let bike = app
        .create_bike(json!({ "partners": [{ "partnerId": a, "percentage": 40.0 }] }))
        .await;
    let id = id_of(&bike);

    let (status, body) = app
        .admin(
            Method::PUT,
            &format!("/api/admin/bikes/{id}"),
            Some(json!({
                "name": "Street Triple",
                "brand": "Triumph",
                "model": "765 RS",
                "year": 2021,
                "mileage": 13000,
                "price": 10000.0,
                "purchasePrice": 8000.0,
                "partners": [{ "partnerId": b, "percentage": 20.0 }]
            })),
        )
        .await;

    assert_eq!(status, StatusCode::OK, "{body}");
    let partners = body["data"]["partners"].as_array().unwrap();
    assert_eq!(partners.len(), 1);
    assert_eq!(partners[0]["partnerId"], json!(b));
    assert_eq!(money(&body["data"]["myShare"]), dec!(8000));
    assert_eq!(body["data"]["mileage"], 13000);
}
