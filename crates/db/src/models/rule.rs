//! Readiness rule row model and insert DTO.

use serde::Serialize;
use sqlx::FromRow;

use intake_core::error::CoreError;
use intake_core::rule::{Action, Condition, Rule};
use intake_core::types::{DbId, Timestamp};
use intake_core::validate::ValidRule;

/// A row from the `rules` table. Conditions and actions stay as raw
/// JSONB here; [`RuleRow::into_domain`] decodes them for evaluation.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct RuleRow {
    pub id: DbId,
    pub rule_name: String,
    pub rule_type: String,
    pub description: Option<String>,
    pub conditions: serde_json::Value,
    pub actions: serde_json::Value,
    pub priority: i32,
    pub is_active: bool,
    pub created_at: Timestamp,
}

impl RuleRow {
    /// Decode the JSONB columns into a typed domain [`Rule`].
    ///
    /// Every stored rule passed validation when written, so a decode
    /// failure is an internal invariant violation rather than bad user
    /// input.
    pub fn into_domain(self) -> Result<Rule, CoreError> {
        let conditions: Vec<Condition> = serde_json::from_value(self.conditions).map_err(|e| {
            CoreError::Internal(format!("rule {} has malformed conditions: {e}", self.id))
        })?;
        let actions: Vec<Action> = serde_json::from_value(self.actions).map_err(|e| {
            CoreError::Internal(format!("rule {} has malformed actions: {e}", self.id))
        })?;
        Ok(Rule {
            id: self.id,
            rule_name: self.rule_name,
            rule_type: self.rule_type,
            description: self.description,
            conditions,
            actions,
            priority: self.priority,
            is_active: self.is_active,
            created_at: self.created_at,
        })
    }
}

/// Insert/replace DTO, built from a rule that already passed
/// validation. Conditions and actions are serialized once here so the
/// repository can bind them directly as JSONB.
#[derive(Debug, Clone)]
pub struct NewRule {
    pub rule_name: String,
    pub rule_type: String,
    pub description: Option<String>,
    pub conditions: serde_json::Value,
    pub actions: serde_json::Value,
    pub priority: i32,
    pub is_active: bool,
}

impl TryFrom<ValidRule> for NewRule {
    type Error = serde_json::Error;

    fn try_from(rule: ValidRule) -> Result<Self, Self::Error> {
        Ok(Self {
            rule_name: rule.rule_name,
            rule_type: rule.rule_type,
            description: rule.description,
            conditions: serde_json::to_value(&rule.conditions)?,
            actions: serde_json::to_value(&rule.actions)?,
            priority: rule.priority,
            is_active: rule.is_active,
        })
    }
}
