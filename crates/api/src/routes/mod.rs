pub mod health;
pub mod readiness;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /readiness/fields                    fact-field catalog (GET)
/// /readiness/rules                     list, create
/// /readiness/rules/{id}                get, update, delete
/// /readiness/rules/{id}/active         toggle active flag (PATCH)
/// /readiness/evaluate                  evaluate facts (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new().nest("/readiness", readiness::router())
}
