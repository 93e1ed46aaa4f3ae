//! Handlers for the `/readiness` resource.
//!
//! Provides rule CRUD for the bank-readiness rules management screen
//! and the evaluation endpoint that scores an applicant fact set
//! against the active rule set.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use intake_core::error::CoreError;
use intake_core::evaluate::{evaluate as evaluate_rules, Evaluation};
use intake_core::facts::{FactMap, FieldDomain, FACT_FIELDS};
use intake_core::rule::{Operator, Rule};
use intake_core::types::DbId;
use intake_core::validate::{validate, RuleInput};
use intake_db::models::rule::{NewRule, RuleRow};
use intake_db::repositories::RuleRepo;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Fact-field catalog
// ---------------------------------------------------------------------------

/// One entry of the fact-field catalog exposed to the rules form.
#[derive(Debug, Serialize)]
pub struct FieldCatalogEntry {
    pub name: &'static str,
    pub domain: FieldDomain,
    pub operators: Vec<&'static str>,
}

/// GET /api/v1/readiness/fields
///
/// List the closed set of applicant fact fields and the operators valid
/// for each, so the rules form can populate its dropdowns.
pub async fn list_fields() -> Json<DataResponse<Vec<FieldCatalogEntry>>> {
    let fields = FACT_FIELDS
        .iter()
        .map(|f| FieldCatalogEntry {
            name: f.name,
            domain: f.domain,
            operators: Operator::allowed_for(f.domain)
                .iter()
                .map(Operator::as_str)
                .collect(),
        })
        .collect();
    Json(DataResponse { data: fields })
}

// ---------------------------------------------------------------------------
// Rule CRUD
// ---------------------------------------------------------------------------

/// Query parameters for listing rules.
#[derive(Debug, Deserialize)]
pub struct ListRulesParams {
    pub rule_type: Option<String>,
}

/// GET /api/v1/readiness/rules?rule_type=X
///
/// List all rules in evaluation order (priority ascending, storage
/// order on ties), optionally filtered by type tag.
pub async fn list_rules(
    State(state): State<AppState>,
    Query(params): Query<ListRulesParams>,
) -> AppResult<Json<DataResponse<Vec<RuleRow>>>> {
    let rules = RuleRepo::list(&state.pool, params.rule_type.as_deref()).await?;
    tracing::debug!(count = rules.len(), "Listed readiness rules");
    Ok(Json(DataResponse { data: rules }))
}

/// POST /api/v1/readiness/rules
///
/// Validate and create a new rule. Returns 201 with the stored row, or
/// 400 carrying every validation issue without persisting anything.
pub async fn create_rule(
    State(state): State<AppState>,
    Json(input): Json<RuleInput>,
) -> AppResult<(StatusCode, Json<DataResponse<RuleRow>>)> {
    let valid = validate(&input).map_err(AppError::RuleValidation)?;
    let new_rule = NewRule::try_from(valid)
        .map_err(|e| AppError::InternalError(format!("failed to encode rule: {e}")))?;

    let created = RuleRepo::create(&state.pool, &new_rule).await?;
    tracing::info!(id = created.id, name = %created.rule_name, "Readiness rule created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: created })))
}

/// GET /api/v1/readiness/rules/{id}
///
/// Fetch a single rule. Returns 404 if not found.
pub async fn get_rule(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<RuleRow>>> {
    let rule = RuleRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Rule", id }))?;
    Ok(Json(DataResponse { data: rule }))
}

/// PUT /api/v1/readiness/rules/{id}
///
/// Replace a rule's definition. The input goes through exactly the same
/// validation as create. Returns 404 if not found.
pub async fn update_rule(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<RuleInput>,
) -> AppResult<Json<DataResponse<RuleRow>>> {
    let valid = validate(&input).map_err(AppError::RuleValidation)?;
    let new_rule = NewRule::try_from(valid)
        .map_err(|e| AppError::InternalError(format!("failed to encode rule: {e}")))?;

    let updated = RuleRepo::update(&state.pool, id, &new_rule)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Rule", id }))?;
    tracing::info!(id = updated.id, "Readiness rule updated");
    Ok(Json(DataResponse { data: updated }))
}

/// Request body for the active-flag toggle.
#[derive(Debug, Deserialize)]
pub struct SetActiveRequest {
    pub active: bool,
}

/// PATCH /api/v1/readiness/rules/{id}/active
///
/// Toggle a rule's active flag. This is a partial update and does not
/// re-validate the rule's conditions or actions. Returns 404 if not
/// found.
pub async fn set_rule_active(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(body): Json<SetActiveRequest>,
) -> AppResult<Json<DataResponse<RuleRow>>> {
    let updated = RuleRepo::set_active(&state.pool, id, body.active)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Rule", id }))?;
    tracing::info!(id, active = body.active, "Readiness rule toggled");
    Ok(Json(DataResponse { data: updated }))
}

/// DELETE /api/v1/readiness/rules/{id}
///
/// Hard-delete a rule. Returns 204 on success, 404 if not found —
/// including a second delete of the same id.
pub async fn delete_rule(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let deleted = RuleRepo::delete(&state.pool, id).await?;
    if deleted {
        tracing::info!(id, "Readiness rule deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound { entity: "Rule", id }))
    }
}

// ---------------------------------------------------------------------------
// Evaluation
// ---------------------------------------------------------------------------

/// Request body for the evaluation endpoint.
#[derive(Debug, Deserialize)]
pub struct EvaluateRequest {
    pub facts: FactMap,
}

/// POST /api/v1/readiness/evaluate
///
/// Score an applicant fact set against all active rules. Every matching
/// rule contributes; priority orders evaluation but never cuts it short.
pub async fn evaluate(
    State(state): State<AppState>,
    Json(body): Json<EvaluateRequest>,
) -> AppResult<Json<DataResponse<Evaluation>>> {
    let rows = RuleRepo::list_active(&state.pool).await?;
    let rules: Vec<Rule> = rows
        .into_iter()
        .map(RuleRow::into_domain)
        .collect::<Result<_, _>>()?;

    let result = evaluate_rules(&rules, &body.facts);
    tracing::debug!(
        total_score = result.total_score,
        matched = result.matched_rule_ids.len(),
        "Evaluated applicant facts"
    );
    Ok(Json(DataResponse { data: result }))
}
