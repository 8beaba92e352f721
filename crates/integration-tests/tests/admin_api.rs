//! Admin API scenarios: authentication, order management with its audit
//! trail, catalog CRUD, stats, and the calendar view.

use std::sync::Arc;

use axum::http::StatusCode;
use fournil_core::store::memory::MemoryStore;
use fournil_integration_tests::{
    admin_app, admin_token, order_payload, request, seed_flanc, storefront_app,
};
use serde_json::json;

fn token() -> String {
    admin_token(uuid::Uuid::new_v4(), "ADMIN")
}

/// Create one CASH order through the public API and return its id.
async fn place_order(store: &Arc<MemoryStore>) -> String {
    let flanc = seed_flanc(store).await;
    let (status, body) = request(
        storefront_app(store, false),
        "POST",
        "/api/orders",
        None,
        Some(order_payload(&flanc, "CASH")),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["order"]["id"].as_str().expect("order id").to_owned()
}

#[tokio::test]
async fn requests_without_token_are_unauthorized() {
    let store = Arc::new(MemoryStore::new());

    let (status, _) = request(admin_app(&store, false), "GET", "/api/admin/orders", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn non_admin_roles_are_forbidden() {
    let store = Arc::new(MemoryStore::new());
    let viewer = admin_token(uuid::Uuid::new_v4(), "VIEWER");

    let (status, _) = request(
        admin_app(&store, false),
        "GET",
        "/api/admin/orders",
        Some(&viewer),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn garbage_tokens_are_unauthorized() {
    let store = Arc::new(MemoryStore::new());

    let (status, _) = request(
        admin_app(&store, false),
        "GET",
        "/api/admin/orders",
        Some("not-a-jwt"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn orders_are_listed_and_filtered() {
    let store = Arc::new(MemoryStore::new());
    place_order(&store).await;
    let token = token();

    let (status, body) = request(
        admin_app(&store, false),
        "GET",
        "/api/admin/orders",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["orders"].as_array().expect("orders").len(), 1);

    let (status, body) = request(
        admin_app(&store, false),
        "GET",
        "/api/admin/orders?status=LIVREE",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["orders"].as_array().expect("orders").is_empty());

    let (status, _) = request(
        admin_app(&store, false),
        "GET",
        "/api/admin/orders?status=EN_ROUTE",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn status_update_audits_exactly_once() {
    let store = Arc::new(MemoryStore::new());
    let order_id = place_order(&store).await;
    let token = token();

    let (status, body) = request(
        admin_app(&store, false),
        "PATCH",
        &format!("/api/admin/orders/{order_id}/status"),
        Some(&token),
        Some(json!({ "status": "CONFIRMED", "notes": "Appelée, ok pour le 24" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["order"]["status"], "CONFIRMED");
    assert_eq!(body["order"]["notes_admin"], "Appelée, ok pour le 24");
    assert_eq!(store.audit_count(), 1);

    let (_, audit) = request(
        admin_app(&store, false),
        "GET",
        "/api/admin/audit",
        Some(&token),
        None,
    )
    .await;
    let entry = &audit["entries"][0];
    assert_eq!(entry["action"], "ORDER_STATUS_CHANGED");
    assert_eq!(entry["old_values"]["status"], "PENDING");
    assert_eq!(entry["new_values"]["status"], "CONFIRMED");
}

#[tokio::test]
async fn payment_update_by_admin_is_audited() {
    let store = Arc::new(MemoryStore::new());
    let order_id = place_order(&store).await;
    let token = token();

    let (status, body) = request(
        admin_app(&store, false),
        "PATCH",
        &format!("/api/admin/orders/{order_id}/payment"),
        Some(&token),
        Some(json!({ "payment_status": "PAID" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["order"]["payment_status"], "PAID");
    assert_eq!(store.audit_count(), 1);
}

#[tokio::test]
async fn unknown_order_is_404() {
    let store = Arc::new(MemoryStore::new());
    let token = token();

    let (status, _) = request(
        admin_app(&store, false),
        "PATCH",
        &format!("/api/admin/orders/{}/status", uuid::Uuid::new_v4()),
        Some(&token),
        Some(json!({ "status": "CONFIRMED" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn strict_mode_rejects_status_skips() {
    let store = Arc::new(MemoryStore::new());
    let order_id = place_order(&store).await;
    let token = token();

    let (status, body) = request(
        admin_app(&store, true),
        "PATCH",
        &format!("/api/admin/orders/{order_id}/status"),
        Some(&token),
        Some(json!({ "status": "PRETE" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().expect("error").contains("not allowed"));
    assert_eq!(store.audit_count(), 0);
}

#[tokio::test]
async fn stats_report_counts_and_paid_revenue() {
    let store = Arc::new(MemoryStore::new());
    let order_id = place_order(&store).await;
    let token = token();

    request(
        admin_app(&store, false),
        "PATCH",
        &format!("/api/admin/orders/{order_id}/payment"),
        Some(&token),
        Some(json!({ "payment_status": "PAID" })),
    )
    .await;

    let (status, body) = request(
        admin_app(&store, false),
        "GET",
        "/api/admin/stats",
        Some(&token),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let stats = &body["stats"];
    assert_eq!(stats["total_orders"], 1);
    assert_eq!(stats["today_orders"], 1);
    assert_eq!(stats["total_revenue"], 6000);
    assert_eq!(stats["today_revenue"], 6000);
    assert_eq!(stats["orders_by_status"]["PENDING"], 1);
    assert_eq!(stats["orders_by_status"]["LIVREE"], 0);
}

#[tokio::test]
async fn calendar_groups_orders_by_pickup_date() {
    let store = Arc::new(MemoryStore::new());
    place_order(&store).await;
    let token = token();

    let (status, body) = request(
        admin_app(&store, false),
        "GET",
        "/api/admin/calendar?date_from=2026-12-01&date_to=2026-12-31",
        Some(&token),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let day = &body["calendar"]["2026-12-24"];
    assert_eq!(day.as_array().expect("day bucket").len(), 1);
}

#[tokio::test]
async fn product_crud_writes_audit_entries() {
    let store = Arc::new(MemoryStore::new());
    let token = token();

    // Create
    let (status, body) = request(
        admin_app(&store, false),
        "POST",
        "/api/admin/products",
        Some(&token),
        Some(json!({ "name": "Tarte aux pommes", "price": 2200, "category": "tartes" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let product_id = body["product"]["id"].as_str().expect("product id").to_owned();

    // Add a flavor
    let (status, body) = request(
        admin_app(&store, false),
        "POST",
        &format!("/api/admin/products/{product_id}/flavors"),
        Some(&token),
        Some(json!({ "name": "Normande", "price_modifier": 150 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["flavor"]["price_modifier"], 150);

    // Update the product
    let (status, body) = request(
        admin_app(&store, false),
        "PATCH",
        &format!("/api/admin/products/{product_id}"),
        Some(&token),
        Some(json!({ "available": false })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["product"]["available"], false);

    // Delete it (flavors go with it)
    let (status, _) = request(
        admin_app(&store, false),
        "DELETE",
        &format!("/api/admin/products/{product_id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // create + flavor + update + delete
    assert_eq!(store.audit_count(), 4);

    let (_, audit) = request(
        admin_app(&store, false),
        "GET",
        "/api/admin/audit?action=PRODUCT_DELETED",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(audit["entries"].as_array().expect("entries").len(), 1);
}

#[tokio::test]
async fn negative_price_is_rejected() {
    let store = Arc::new(MemoryStore::new());
    let token = token();

    let (status, body) = request(
        admin_app(&store, false),
        "POST",
        "/api/admin/products",
        Some(&token),
        Some(json!({ "name": "Tarte gratuite", "price": -100 })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().expect("error").contains("negative"));
}
