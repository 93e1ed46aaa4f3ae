//! Rule evaluation — pure logic, no database access.
//!
//! Conditions AND together; every active rule whose conditions all match
//! contributes its actions. Priority only controls evaluation order,
//! never short-circuiting: a high-priority match does not stop
//! lower-priority rules from firing.

use serde::Serialize;

use crate::facts::{FactMap, FactValue};
use crate::rule::{Action, Condition, ConditionValue, Operator, Rule};
use crate::types::DbId;

// ---------------------------------------------------------------------------
// Condition matching
// ---------------------------------------------------------------------------

/// Evaluate a single condition against the fact set.
///
/// A missing fact fails every positive operator and satisfies the
/// negative ones (`not_equals`, `not_in`): absence means no
/// disqualifying value is present.
pub fn condition_matches(condition: &Condition, facts: &FactMap) -> bool {
    let fact = match facts.get(&condition.field) {
        Some(f) => f,
        None => return condition.operator.is_negative(),
    };

    match condition.operator {
        Operator::Equals => equals(fact, &condition.value),
        Operator::NotEquals => !equals(fact, &condition.value),
        Operator::In => is_in(fact, &condition.value),
        Operator::NotIn => !is_in(fact, &condition.value),
        Operator::Contains => contains(fact, &condition.value),
        Operator::ContainsAny => contains_any(fact, &condition.value),
        Operator::HasAny => has_any(fact, &condition.value),
    }
}

/// Strict equality: the fact must match the condition value in both
/// type and value.
fn equals(fact: &FactValue, value: &ConditionValue) -> bool {
    match (fact, value) {
        (FactValue::Bool(a), ConditionValue::Bool(b)) => a == b,
        (FactValue::Number(a), ConditionValue::Number(b)) => a == b,
        (FactValue::Text(a), ConditionValue::Text(b)) => a == b,
        (FactValue::List(a), ConditionValue::List(b)) => a == b,
        _ => false,
    }
}

/// The fact equals one element of the condition list. Numeric facts
/// compare against elements parsed as numbers, since list elements are
/// stored as strings.
fn is_in(fact: &FactValue, value: &ConditionValue) -> bool {
    let ConditionValue::List(elements) = value else {
        return false;
    };
    match fact {
        FactValue::Text(s) => elements.iter().any(|e| e == s),
        FactValue::Number(n) => elements
            .iter()
            .any(|e| e.trim().parse::<f64>().is_ok_and(|v| v == *n)),
        _ => false,
    }
}

/// Case-sensitive substring check on a string fact.
fn contains(fact: &FactValue, value: &ConditionValue) -> bool {
    match (fact, value) {
        (FactValue::Text(haystack), ConditionValue::Text(needle)) => haystack.contains(needle),
        _ => false,
    }
}

/// The string fact contains at least one of the listed substrings.
fn contains_any(fact: &FactValue, value: &ConditionValue) -> bool {
    match (fact, value) {
        (FactValue::Text(haystack), ConditionValue::List(needles)) => {
            needles.iter().any(|n| haystack.contains(n))
        }
        _ => false,
    }
}

/// Non-empty intersection between a list fact and the condition list.
fn has_any(fact: &FactValue, value: &ConditionValue) -> bool {
    match (fact, value) {
        (FactValue::List(have), ConditionValue::List(want)) => {
            have.iter().any(|h| want.iter().any(|w| w == h))
        }
        _ => false,
    }
}

/// Whether a rule's conditions all hold for the given facts.
///
/// An empty condition list cannot pass validation; if one is ever seen
/// here it is treated as non-matching so an invalid rule cannot
/// silently fire.
pub fn rule_matches(rule: &Rule, facts: &FactMap) -> bool {
    !rule.conditions.is_empty()
        && rule
            .conditions
            .iter()
            .all(|c| condition_matches(c, facts))
}

// ---------------------------------------------------------------------------
// Action application
// ---------------------------------------------------------------------------

/// The accumulated effect of a set of matched actions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AppliedActions {
    pub score_delta: i64,
    pub flags: Vec<String>,
}

/// Sum score deltas and collect flag messages in declared order.
/// Duplicate messages are preserved; the back office wants to see a
/// warning once per rule that raised it.
pub fn apply_actions(actions: &[Action]) -> AppliedActions {
    let mut applied = AppliedActions::default();
    for action in actions {
        match action {
            Action::AddScore { value } => applied.score_delta += value,
            Action::AddFlag { message } => applied.flags.push(message.clone()),
        }
    }
    applied
}

// ---------------------------------------------------------------------------
// Evaluation pipeline
// ---------------------------------------------------------------------------

/// The outcome of evaluating all rules against one applicant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Evaluation {
    pub total_score: i64,
    pub flags: Vec<String>,
    pub matched_rule_ids: Vec<DbId>,
}

/// Evaluate the rule set against an applicant fact set.
///
/// Inactive rules are skipped entirely. Active rules are visited in
/// priority-ascending order (stable, so ties keep the caller's order);
/// every matching rule contributes its actions.
pub fn evaluate(rules: &[Rule], facts: &FactMap) -> Evaluation {
    let mut ordered: Vec<&Rule> = rules.iter().filter(|r| r.is_active).collect();
    ordered.sort_by_key(|r| r.priority);

    let mut result = Evaluation::default();
    for rule in ordered {
        if rule_matches(rule, facts) {
            let applied = apply_actions(&rule.actions);
            result.total_score += applied.score_delta;
            result.flags.extend(applied.flags);
            result.matched_rule_ids.push(rule.id);
        }
    }
    result
}
