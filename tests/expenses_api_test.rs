mod common;

use axum::http::{Method, StatusCode};
use common::{id_of, money, TestApp};
use motohub_api::entities::bike;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::EntityTrait;
use serde_json::{json, Value};
use uuid::Uuid;

fn expense_body(bike_id: Uuid, amount: Decimal, adjust_bike_price: bool) -> Value {
    json!({
        "bikeId": bike_id,
        "amount": amount,
        "type": "repair",
        "description": "Fork seals",
        "adjustBikePrice": adjust_bike_price
    })
}

async fn purchase_price(app: &TestApp, bike_id: Uuid) -> Decimal {
    let (status, body) = app
        .admin(Method::GET, &format!("/api/admin/bikes/{bike_id}"), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    money(&body["data"]["purchasePrice"])
}

#[tokio::test]
async fn toggling_the_price_flag_restores_the_original_price() {
    let app = TestApp::new().await;
    let bike = id_of(&app.create_bike(json!({ "purchasePrice": 8000.0 })).await);

    let (status, body) = app
        .admin(
            Method::POST,
            "/api/admin/expenses",
            Some(expense_body(bike, dec!(250), true)),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let uri = format!("/api/admin/expenses/{}", id_of(&body["data"]));
    assert_eq!(purchase_price(&app, bike).await, dec!(8250));

    let (status, _) = app
        .admin(Method::PUT, &uri, Some(expense_body(bike, dec!(250), false)))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(purchase_price(&app, bike).await, dec!(8000));

    let (status, _) = app
        .admin(Method::PUT, &uri, Some(expense_body(bike, dec!(250), true)))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(purchase_price(&app, bike).await, dec!(8250));

    let (status, _) = app
        .admin(Method::PUT, &uri, Some(expense_body(bike, dec!(400), true)))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(purchase_price(&app, bike).await, dec!(8400));
}

#[tokio::test]
async fn deleting_an_expense_reverses_price_and_history() {
    let app = TestApp::new().await;
    let bike = id_of(&app.create_bike(json!({ "purchasePrice": 8000.0 })).await);

    let (_, body) = app
        .admin(
            Method::POST,
            "/api/admin/expenses",
            Some(expense_body(bike, dec!(300), true)),
        )
        .await;
    let expense_id = id_of(&body["data"]);

    let (_, detail) = app
        .admin(Method::GET, &format!("/api/admin/bikes/{bike}"), None)
        .await;
    assert_eq!(detail["data"]["serviceHistory"], json!([expense_id]));
    assert_eq!(money(&detail["data"]["purchasePrice"]), dec!(8300));

    let (status, _) = app
        .admin(Method::DELETE, &format!("/api/admin/expenses/{expense_id}"), None)
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, detail) = app
        .admin(Method::GET, &format!("/api/admin/bikes/{bike}"), None)
        .await;
    assert_eq!(detail["data"]["serviceHistory"], json!([]));
    assert_eq!(money(&detail["data"]["purchasePrice"]), dec!(8000));

    let (status, _) = app
        .admin(Method::GET, &format!("/api/admin/expenses/{expense_id}"), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn moving_an_expense_to_another_bike_moves_the_adjustment() {
    let app = TestApp::new().await;
    let first = id_of(&app.create_bike(json!({ "purchasePrice": 5000.0 })).await);
    let second = id_of(&app.create_bike(json!({ "purchasePrice": 6000.0 })).await);

    let (_, body) = app
        .admin(
            Method::POST,
            "/api/admin/expenses",
            Some(expense_body(first, dec!(100), true)),
        )
        .await;
    let uri = format!("/api/admin/expenses/{}", id_of(&body["data"]));

    let (status, _) = app
        .admin(Method::PUT, &uri, Some(expense_body(second, dec!(100), true)))
        .await;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(purchase_price(&app, first).await, dec!(5000));
    assert_eq!(purchase_price(&app, second).await, dec!(6100));
}

#[tokio::test]
async fn partner_must_hold_a_share_in_the_bike() {
    let app = TestApp::new().await;
    let holder = app.create_partner("Holder", "holder@partners.test").await;
    let outsider = app.create_partner("Outsider", "outsider@partners.test").await;
    let bike = id_of(
        &app.create_bike(json!({
            "purchasePrice": 8000.0,
            "partners": [{ "partnerId": holder, "percentage": 25.0 }]
        }))
        .await,
    );

    let mut body = expense_body(bike, dec!(400), true);
    body["partnerId"] = json!(outsider);
    body["adjustPartnerShares"] = json!(true);
    let (status, _) = app
        .admin(Method::POST, "/api/admin/expenses", Some(body.clone()))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(purchase_price(&app, bike).await, dec!(8000));

    body["partnerId"] = json!(holder);
    let (status, created) = app
        .admin(Method::POST, "/api/admin/expenses", Some(body))
        .await;
    assert_eq!(status, StatusCode::CREATED, "{created}");
    assert_eq!(money(&created["data"]["partnerShareAmount"]), dec!(100));
    assert_eq!(created["data"]["type"], "repair");
}

#[tokio::test]
async fn negative_amounts_are_rejected() {
    let app = TestApp::new().await;
    let bike = id_of(&app.create_bike(json!({})).await);

    let (status, body) = app
        .admin(
            Method::POST,
            "/api/admin/expenses",
            Some(expense_body(bike, dec!(-5), true)),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["errors"]["amount"].is_array());
}

#[tokio::test]
async fn repeated_cent_adjustments_leave_no_residue() {
    let app = TestApp::new().await;
    let bike_id = id_of(&app.create_bike(json!({ "purchasePrice": 0.1 })).await);

    let mut created = Vec::new();
    for amount in [dec!(0.2), dec!(0.7), dec!(0.1)] {
        let (status, body) = app
            .admin(
                Method::POST,
                "/api/admin/expenses",
                Some(expense_body(bike_id, amount, true)),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        created.push(id_of(&body["data"]));
    }
    assert_eq!(purchase_price(&app, bike_id).await, dec!(1.1));

    for expense_id in created {
        let (status, _) = app
            .admin(Method::DELETE, &format!("/api/admin/expenses/{expense_id}"), None)
            .await;
        assert_eq!(status, StatusCode::OK);
    }

    let stored = bike::Entity::find_by_id(bike_id)
        .one(app.state.db.as_ref())
        .await
        .expect("load bike")
        .expect("bike exists");
    assert_eq!(stored.purchase_price, dec!(0.1));
    assert_eq!(purchase_price(&app, bike_id).await, dec!(0.1));
}

#[tokio::test]
async fn amounts_are_stored_to_the_cent() {
    let app = TestApp::new().await;
    let bike_id = id_of(&app.create_bike(json!({ "purchasePrice": "1000.00" })).await);

    let (status, body) = app
        .admin(
            Method::POST,
            "/api/admin/expenses",
            Some(expense_body(bike_id, dec!(19.999), true)),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(money(&body["data"]["amount"]), dec!(20));
    assert_eq!(purchase_price(&app, bike_id).await, dec!(1020));
}
