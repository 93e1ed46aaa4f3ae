//! Route definitions for the `/readiness` resource.

use axum::routing::{get, patch, post};
use axum::Router;

use crate::handlers::readiness;
use crate::state::AppState;

/// Routes mounted at `/readiness`.
///
/// ```text
/// GET    /fields             -> list_fields
/// GET    /rules              -> list_rules   (?rule_type)
/// POST   /rules              -> create_rule
/// GET    /rules/{id}         -> get_rule
/// PUT    /rules/{id}         -> update_rule
/// DELETE /rules/{id}         -> delete_rule
/// PATCH  /rules/{id}/active  -> set_rule_active
/// POST   /evaluate           -> evaluate
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/fields", get(readiness::list_fields))
        .route(
            "/rules",
            get(readiness::list_rules).post(readiness::create_rule),
        )
        .route(
            "/rules/{id}",
            get(readiness::get_rule)
                .put(readiness::update_rule)
                .delete(readiness::delete_rule),
        )
        .route("/rules/{id}/active", patch(readiness::set_rule_active))
        .route("/evaluate", post(readiness::evaluate))
}
