//! Rule validation.
//!
//! Converts the loosely-typed shape submitted by the rules form into a
//! [`ValidRule`] with typed conditions and actions, or the full list of
//! problems found. Validation never fails fast: the UI highlights every
//! issue at once, so all of them are collected in a single pass.

use serde::{Deserialize, Serialize};

use crate::facts::field_domain;
use crate::normalize::coerce_value;
use crate::rule::{
    Action, Condition, ConditionValue, Operator, ACTION_ADD_FLAG, ACTION_ADD_SCORE,
    VALID_ACTION_TYPES,
};

// ---------------------------------------------------------------------------
// Input shapes
// ---------------------------------------------------------------------------

/// A rule as submitted by the management UI, before any coercion.
#[derive(Debug, Clone, Deserialize)]
pub struct RuleInput {
    pub rule_name: String,
    pub rule_type: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub conditions: Vec<ConditionInput>,
    #[serde(default)]
    pub actions: Vec<ActionInput>,
    #[serde(default)]
    pub priority: i32,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

/// A raw condition: operator as string, value as untyped JSON.
#[derive(Debug, Clone, Deserialize)]
pub struct ConditionInput {
    pub field: String,
    pub operator: String,
    pub value: serde_json::Value,
}

/// A raw action: type as string, value/message as submitted.
#[derive(Debug, Clone, Deserialize)]
pub struct ActionInput {
    #[serde(rename = "type")]
    pub action_type: String,
    #[serde(default)]
    pub value: Option<serde_json::Value>,
    #[serde(default)]
    pub message: Option<String>,
}

// ---------------------------------------------------------------------------
// Output shapes
// ---------------------------------------------------------------------------

/// A single validation problem, addressed by input path so the form can
/// highlight the offending field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    /// Path into the submitted rule, e.g. `conditions[2].operator`.
    pub field: String,
    pub message: String,
}

/// A rule that passed validation, with fully typed conditions and
/// actions, ready to persist.
#[derive(Debug, Clone)]
pub struct ValidRule {
    pub rule_name: String,
    pub rule_type: String,
    pub description: Option<String>,
    pub conditions: Vec<Condition>,
    pub actions: Vec<Action>,
    pub priority: i32,
    pub is_active: bool,
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate a submitted rule, collecting every problem found.
///
/// A valid rule needs a non-empty name, at least one condition, and at
/// least one action; each condition must use a known field with an
/// operator allowed for that field's domain, and each value must coerce
/// into the operator's expected shape.
pub fn validate(input: &RuleInput) -> Result<ValidRule, Vec<ValidationIssue>> {
    let mut issues = Vec::new();

    if input.rule_name.trim().is_empty() {
        issues.push(issue("rule_name", "rule name must not be empty"));
    }
    if input.rule_type.trim().is_empty() {
        issues.push(issue("rule_type", "rule type must not be empty"));
    }
    if input.conditions.is_empty() {
        issues.push(issue("conditions", "at least one condition is required"));
    }
    if input.actions.is_empty() {
        issues.push(issue("actions", "at least one action is required"));
    }

    let mut conditions = Vec::with_capacity(input.conditions.len());
    for (index, condition) in input.conditions.iter().enumerate() {
        if let Some(typed) = validate_condition(index, condition, &mut issues) {
            conditions.push(typed);
        }
    }

    let mut actions = Vec::with_capacity(input.actions.len());
    for (index, action) in input.actions.iter().enumerate() {
        if let Some(typed) = validate_action(index, action, &mut issues) {
            actions.push(typed);
        }
    }

    if !issues.is_empty() {
        return Err(issues);
    }

    Ok(ValidRule {
        rule_name: input.rule_name.trim().to_string(),
        rule_type: input.rule_type.trim().to_string(),
        description: input.description.clone(),
        conditions,
        actions,
        priority: input.priority,
        is_active: input.is_active,
    })
}

fn validate_condition(
    index: usize,
    input: &ConditionInput,
    issues: &mut Vec<ValidationIssue>,
) -> Option<Condition> {
    let domain = match field_domain(&input.field) {
        Some(d) => d,
        None => {
            issues.push(issue(
                &format!("conditions[{index}].field"),
                &format!("unknown field '{}'", input.field),
            ));
            return None;
        }
    };

    let operator = match Operator::from_str_value(&input.operator) {
        Ok(op) => op,
        Err(msg) => {
            issues.push(issue(&format!("conditions[{index}].operator"), &msg));
            return None;
        }
    };

    if !Operator::allowed_for(domain).contains(&operator) {
        issues.push(issue(
            &format!("conditions[{index}].operator"),
            &format!(
                "operator '{}' is not valid for field '{}'",
                operator.as_str(),
                input.field
            ),
        ));
        return None;
    }

    match coerce_value(domain, operator, &input.value) {
        // A blank comma string normalizes to an empty list; such a
        // condition could never match (or, negated, always would), so
        // it is rejected rather than stored.
        Ok(ConditionValue::List(elements)) if elements.is_empty() => {
            issues.push(issue(
                &format!("conditions[{index}].value"),
                "list value must contain at least one element",
            ));
            None
        }
        Ok(value) => Some(Condition {
            field: input.field.clone(),
            operator,
            value,
        }),
        Err(msg) => {
            issues.push(issue(&format!("conditions[{index}].value"), &msg));
            None
        }
    }
}

fn validate_action(
    index: usize,
    input: &ActionInput,
    issues: &mut Vec<ValidationIssue>,
) -> Option<Action> {
    match input.action_type.as_str() {
        ACTION_ADD_SCORE => match score_delta(input.value.as_ref()) {
            Ok(value) => Some(Action::AddScore { value }),
            Err(msg) => {
                issues.push(issue(&format!("actions[{index}].value"), &msg));
                None
            }
        },
        ACTION_ADD_FLAG => {
            let message = input.message.as_deref().unwrap_or("").trim();
            if message.is_empty() {
                issues.push(issue(
                    &format!("actions[{index}].message"),
                    "add_flag requires a non-empty message",
                ));
                None
            } else {
                Some(Action::AddFlag {
                    message: message.to_string(),
                })
            }
        }
        other => {
            issues.push(issue(
                &format!("actions[{index}].type"),
                &format!(
                    "unknown action type '{other}'. Must be one of: {}",
                    VALID_ACTION_TYPES.join(", ")
                ),
            ));
            None
        }
    }
}

/// Parse an `add_score` delta. Absent values default to 0; negative
/// deltas are allowed (rules may penalize).
fn score_delta(raw: Option<&serde_json::Value>) -> Result<i64, String> {
    match raw {
        None | Some(serde_json::Value::Null) => Ok(0),
        Some(serde_json::Value::Number(n)) => n
            .as_i64()
            .ok_or_else(|| format!("score delta must be an integer, got {n}")),
        Some(serde_json::Value::String(s)) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| format!("score delta must be an integer, got '{s}'")),
        Some(other) => Err(format!("score delta must be an integer, got {other}")),
    }
}

fn issue(field: &str, message: &str) -> ValidationIssue {
    ValidationIssue {
        field: field.to_string(),
        message: message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::ConditionValue;
    use serde_json::json;

    fn base_input() -> RuleInput {
        RuleInput {
            rule_name: "Sanctioned corridor".to_string(),
            rule_type: "risk_scoring".to_string(),
            description: None,
            conditions: vec![ConditionInput {
                field: "incoming_payment_countries".to_string(),
                operator: "has_any".to_string(),
                value: json!("IR, KP"),
            }],
            actions: vec![ActionInput {
                action_type: "add_score".to_string(),
                value: Some(json!(25)),
                message: None,
            }],
            priority: 10,
            is_active: true,
        }
    }

    #[test]
    fn valid_input_produces_typed_rule() {
        let valid = validate(&base_input()).unwrap();
        assert_eq!(valid.rule_name, "Sanctioned corridor");
        assert_eq!(
            valid.conditions[0].value,
            ConditionValue::List(vec!["IR".into(), "KP".into()])
        );
        assert_eq!(valid.actions[0], Action::AddScore { value: 25 });
    }

    #[test]
    fn empty_name_is_rejected() {
        let mut input = base_input();
        input.rule_name = "   ".to_string();
        let issues = validate(&input).unwrap_err();
        assert!(issues.iter().any(|i| i.field == "rule_name"));
    }

    #[test]
    fn empty_conditions_and_actions_are_rejected() {
        let mut input = base_input();
        input.conditions.clear();
        input.actions.clear();
        let issues = validate(&input).unwrap_err();
        let fields: Vec<_> = issues.iter().map(|i| i.field.as_str()).collect();
        assert!(fields.contains(&"conditions"));
        assert!(fields.contains(&"actions"));
    }

    #[test]
    fn unknown_field_is_rejected() {
        let mut input = base_input();
        input.conditions[0].field = "astrological_sign".to_string();
        let issues = validate(&input).unwrap_err();
        assert_eq!(issues[0].field, "conditions[0].field");
    }

    #[test]
    fn operator_domain_mismatch_is_rejected() {
        let mut input = base_input();
        // `contains` is a substring check on text; it makes no sense on
        // a boolean field.
        input.conditions[0] = ConditionInput {
            field: "uae_residency".to_string(),
            operator: "contains".to_string(),
            value: json!("tru"),
        };
        let issues = validate(&input).unwrap_err();
        assert_eq!(issues[0].field, "conditions[0].operator");
    }

    #[test]
    fn blank_comma_string_list_is_rejected() {
        let mut input = base_input();
        // Normalizes to an empty list; a condition that can never match
        // must not be stored.
        input.conditions[0].value = json!(" , ");
        let issues = validate(&input).unwrap_err();
        assert_eq!(issues[0].field, "conditions[0].value");
    }

    #[test]
    fn empty_array_list_is_rejected() {
        let mut input = base_input();
        input.conditions[0].value = json!([]);
        let issues = validate(&input).unwrap_err();
        assert_eq!(issues[0].field, "conditions[0].value");
    }

    #[test]
    fn string_boolean_is_coerced() {
        let mut input = base_input();
        input.conditions[0] = ConditionInput {
            field: "previous_rejection".to_string(),
            operator: "equals".to_string(),
            value: json!("true"),
        };
        let valid = validate(&input).unwrap();
        assert_eq!(valid.conditions[0].value, ConditionValue::Bool(true));
    }

    #[test]
    fn bad_boolean_literal_is_rejected() {
        let mut input = base_input();
        input.conditions[0] = ConditionInput {
            field: "previous_rejection".to_string(),
            operator: "equals".to_string(),
            value: json!("maybe"),
        };
        let issues = validate(&input).unwrap_err();
        assert_eq!(issues[0].field, "conditions[0].value");
    }

    #[test]
    fn missing_score_value_defaults_to_zero() {
        let mut input = base_input();
        input.actions[0].value = None;
        let valid = validate(&input).unwrap();
        assert_eq!(valid.actions[0], Action::AddScore { value: 0 });
    }

    #[test]
    fn negative_score_delta_is_allowed() {
        let mut input = base_input();
        input.actions[0].value = Some(json!(-15));
        let valid = validate(&input).unwrap();
        assert_eq!(valid.actions[0], Action::AddScore { value: -15 });
    }

    #[test]
    fn add_flag_requires_message() {
        let mut input = base_input();
        input.actions[0] = ActionInput {
            action_type: "add_flag".to_string(),
            value: None,
            message: Some("  ".to_string()),
        };
        let issues = validate(&input).unwrap_err();
        assert_eq!(issues[0].field, "actions[0].message");
    }

    #[test]
    fn all_problems_are_reported_together() {
        let input = RuleInput {
            rule_name: String::new(),
            rule_type: "risk_scoring".to_string(),
            description: None,
            conditions: vec![ConditionInput {
                field: "nope".to_string(),
                operator: "equals".to_string(),
                value: json!("x"),
            }],
            actions: vec![ActionInput {
                action_type: "add_flag".to_string(),
                value: None,
                message: None,
            }],
            priority: 0,
            is_active: true,
        };
        let issues = validate(&input).unwrap_err();
        // Name, unknown field, and missing flag message must all appear
        // in one pass.
        assert_eq!(issues.len(), 3);
    }
}
