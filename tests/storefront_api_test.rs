mod common;

use axum::http::{Method, StatusCode};
use common::{id_of, money, response_json, TestApp};
use rust_decimal_macros::dec;
use serde_json::json;

#[tokio::test]
async fn public_catalogue_filters_by_brand_and_price() {
    let app = TestApp::new().await;
    app.create_bike(json!({ "brand": "Ducati", "name": "Panigale", "price": 20000.0 }))
        .await;
    app.create_bike(json!({ "brand": "Ducati", "name": "Scrambler", "price": 9000.0 }))
        .await;
    app.create_bike(json!({ "brand": "Honda", "name": "Africa Twin", "price": 14000.0 }))
        .await;
    app.create_bike(json!({ "brand": "Ducati", "name": "Sold One", "status": "sold" }))
        .await;

    let (status, body) = app.call(Method::GET, "/api/bikes", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], 3);

    let (_, body) = app
        .call(Method::GET, "/api/bikes?brand=Ducati&maxPrice=10000", None, None)
        .await;
    let items = body["data"]["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["name"], "Scrambler");
    assert!(items[0].get("purchasePrice").is_none());
    assert!(items[0].get("partners").is_none());

    let (_, body) = app
        .call(Method::GET, "/api/bikes?search=africa", None, None)
        .await;
    assert_eq!(body["data"]["total"], 1);

    let (_, body) = app.call(Method::GET, "/api/bikes?limit=2&page=2", None, None).await;
    assert_eq!(body["data"]["items"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"]["totalPages"], 2);
}

#[tokio::test]
async fn bike_wash_storefront_lists_active_locations_only() {
    let app = TestApp::new().await;
    let (status, body) = app
        .admin(
            Method::POST,
            "/api/admin/bike-wash",
            Some(json!({
                "name": "Shine",
                "address": "1 Main St",
                "city": "Lisbon",
                "services": ["wash", "wax"],
                "priceFrom": 15.0
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["data"]["services"], json!(["wash", "wax"]));

    let (_, hidden) = app
        .admin(
            Method::POST,
            "/api/admin/bike-wash",
            Some(json!({
                "name": "Closed",
                "address": "2 Side St",
                "city": "Porto",
                "isActive": false
            })),
        )
        .await;

    let (status, body) = app.call(Method::GET, "/api/bike-wash", None, None).await;
    assert_eq!(status, StatusCode::OK);
    let public = body["data"].as_array().unwrap();
    assert_eq!(public.len(), 1);
    assert_eq!(public[0]["name"], "Shine");
    assert_eq!(money(&public[0]["priceFrom"]), dec!(15));

    let (_, body) = app.admin(Method::GET, "/api/admin/bike-wash", None).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 2);

    let (status, _) = app
        .admin(
            Method::DELETE,
            &format!("/api/admin/bike-wash/{}", id_of(&hidden["data"])),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let (_, body) = app.admin(Method::GET, "/api/admin/bike-wash", None).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn public_info_is_sorted_and_filterable_by_category() {
    let app = TestApp::new().await;
    for (title, category, sort_order, active) in [
        ("Opening hours", "general", 2, true),
        ("Welcome", "general", 1, true),
        ("Financing", "sales", 0, true),
        ("Draft", "general", 0, false),
    ] {
        let (status, body) = app
            .admin(
                Method::POST,
                "/api/admin/public-info",
                Some(json!({
                    "title": title,
                    "content": "Lorem ipsum",
                    "category": category,
                    "sortOrder": sort_order,
                    "isActive": active
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
    }

    let (status, body) = app
        .call(Method::GET, "/api/public-info?category=general", None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let titles: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|e| e["title"].as_str())
        .collect();
    assert_eq!(titles, ["Welcome", "Opening hours"]);

    let (_, body) = app.call(Method::GET, "/api/public-info", None, None).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 3);

    let (_, body) = app.admin(Method::GET, "/api/admin/public-info", None).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn health_endpoints_report_liveness() {
    let app = TestApp::new().await;

    let (status, body) = app.call(Method::GET, "/api/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["database"], "up");
    assert!(body["version"].is_string());

    let response = app.request(Method::GET, "/", None, None).await;
    assert!(response.headers().contains_key("x-request-id"));
    let (status, body) = response_json(response).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!("MotoHub API is running"));
}
