//! HTTP-level integration tests for the `/readiness/rules` endpoints.
//!
//! Uses Axum's `tower::ServiceExt` to send requests directly to the
//! router, covering rule CRUD, normalization at the save boundary, the
//! all-issues-at-once validation contract, and the active toggle.

mod common;

use axum::http::StatusCode;
use common::{body_json, build_test_app, delete, get, patch_json, post_json, put_json};
use serde_json::json;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn sample_rule(name: &str, priority: i32) -> serde_json::Value {
    json!({
        "rule_name": name,
        "rule_type": "risk_scoring",
        "conditions": [
            {"field": "incoming_payment_countries", "operator": "has_any", "value": "IR, KP"}
        ],
        "actions": [
            {"type": "add_score", "value": 25},
            {"type": "add_flag", "message": "Sanctioned corridor"}
        ],
        "priority": priority
    })
}

async fn create_rule(pool: &PgPool, body: serde_json::Value) -> serde_json::Value {
    let response = post_json(build_test_app(pool.clone()), "/api/v1/readiness/rules", body).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await
}

// ---------------------------------------------------------------------------
// Test: POST normalizes comma-joined list values before persisting
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn create_normalizes_condition_values(pool: PgPool) {
    let created = create_rule(&pool, sample_rule("Sanctioned corridor", 10)).await;

    let rule = &created["data"];
    assert!(rule["id"].as_i64().is_some());
    assert!(rule["created_at"].is_string());
    // The comma-joined form input is stored as a proper list.
    assert_eq!(rule["conditions"][0]["value"], json!(["IR", "KP"]));
}

// ---------------------------------------------------------------------------
// Test: POST with invalid input returns every issue and persists nothing
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn create_reports_all_validation_issues(pool: PgPool) {
    let response = post_json(
        build_test_app(pool.clone()),
        "/api/v1/readiness/rules",
        json!({
            "rule_name": "",
            "rule_type": "risk_scoring",
            "conditions": [
                {"field": "no_such_field", "operator": "equals", "value": "x"}
            ],
            "actions": [
                {"type": "add_flag", "message": ""}
            ]
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
    let details = json["details"].as_array().expect("details should be an array");
    assert_eq!(details.len(), 3, "name, field, and message issues expected");

    // Validation fails closed: nothing was written.
    let response = get(build_test_app(pool), "/api/v1/readiness/rules").await;
    let json = body_json(response).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 0);
}

// ---------------------------------------------------------------------------
// Test: GET /rules returns priority order with stable ties
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn list_returns_priority_order(pool: PgPool) {
    create_rule(&pool, sample_rule("Late", 50)).await;
    create_rule(&pool, sample_rule("Early", 5)).await;
    create_rule(&pool, sample_rule("Tie", 50)).await;

    let response = get(build_test_app(pool), "/api/v1/readiness/rules").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let names: Vec<_> = json["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["rule_name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, vec!["Early", "Late", "Tie"]);
}

// ---------------------------------------------------------------------------
// Test: GET /rules/{id} and 404 behaviour
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn get_rule_by_id(pool: PgPool) {
    let created = create_rule(&pool, sample_rule("Lookup", 1)).await;
    let id = created["data"]["id"].as_i64().unwrap();

    let response = get(
        build_test_app(pool.clone()),
        &format!("/api/v1/readiness/rules/{id}"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["rule_name"], "Lookup");

    let response = get(build_test_app(pool), "/api/v1/readiness/rules/9999").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Test: PUT re-validates like create and replaces the definition
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn update_revalidates_and_replaces(pool: PgPool) {
    let created = create_rule(&pool, sample_rule("Original", 10)).await;
    let id = created["data"]["id"].as_i64().unwrap();

    // Invalid replacement is rejected with the full issue list.
    let response = put_json(
        build_test_app(pool.clone()),
        &format!("/api/v1/readiness/rules/{id}"),
        json!({
            "rule_name": "Still broken",
            "rule_type": "risk_scoring",
            "conditions": [],
            "actions": []
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["details"].as_array().unwrap().len(), 2);

    // Valid replacement goes through.
    let response = put_json(
        build_test_app(pool.clone()),
        &format!("/api/v1/readiness/rules/{id}"),
        sample_rule("Replaced", 77),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["rule_name"], "Replaced");
    assert_eq!(json["data"]["priority"], 77);

    // Unknown id is 404 even with a valid body.
    let response = put_json(
        build_test_app(pool),
        "/api/v1/readiness/rules/9999",
        sample_rule("Ghost", 1),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Test: PATCH /active bypasses condition/action validation
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn set_active_is_a_partial_update(pool: PgPool) {
    let created = create_rule(&pool, sample_rule("Toggle", 10)).await;
    let id = created["data"]["id"].as_i64().unwrap();

    let response = patch_json(
        build_test_app(pool.clone()),
        &format!("/api/v1/readiness/rules/{id}/active"),
        json!({"active": false}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["is_active"], false);
    // Definition untouched.
    assert_eq!(json["data"]["conditions"][0]["value"], json!(["IR", "KP"]));

    let response = patch_json(
        build_test_app(pool),
        "/api/v1/readiness/rules/9999/active",
        json!({"active": true}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Test: DELETE is hard and a repeat delete is 404
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn delete_rule_twice_returns_not_found(pool: PgPool) {
    let created = create_rule(&pool, sample_rule("Doomed", 10)).await;
    let id = created["data"]["id"].as_i64().unwrap();
    let uri = format!("/api/v1/readiness/rules/{id}");

    let response = delete(build_test_app(pool.clone()), &uri).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = delete(build_test_app(pool), &uri).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Test: GET /fields exposes the closed field/operator catalog
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn field_catalog_lists_fields_and_operators(pool: PgPool) {
    let response = get(build_test_app(pool), "/api/v1/readiness/fields").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let fields = json["data"].as_array().unwrap();
    assert_eq!(fields.len(), 9);

    let residency = fields
        .iter()
        .find(|f| f["name"] == "uae_residency")
        .expect("uae_residency should be in the catalog");
    assert_eq!(residency["domain"], "boolean");
    assert_eq!(residency["operators"], json!(["equals", "not_equals"]));
}
