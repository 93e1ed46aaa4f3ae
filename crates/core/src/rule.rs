//! Rule, condition, and action types.
//!
//! These are the typed shapes stored in the `conditions` and `actions`
//! JSONB columns. Free-text form input is converted into them once, at
//! save time, by the validator; the evaluator only ever sees these.

use serde::{Deserialize, Serialize};

use crate::facts::FieldDomain;
use crate::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Operators
// ---------------------------------------------------------------------------

pub const OP_EQUALS: &str = "equals";
pub const OP_NOT_EQUALS: &str = "not_equals";
pub const OP_IN: &str = "in";
pub const OP_NOT_IN: &str = "not_in";
pub const OP_CONTAINS: &str = "contains";
pub const OP_CONTAINS_ANY: &str = "contains_any";
pub const OP_HAS_ANY: &str = "has_any";

/// All valid operator strings.
pub const VALID_OPERATORS: &[&str] = &[
    OP_EQUALS,
    OP_NOT_EQUALS,
    OP_IN,
    OP_NOT_IN,
    OP_CONTAINS,
    OP_CONTAINS_ANY,
    OP_HAS_ANY,
];

/// Comparison operator of a condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    Equals,
    NotEquals,
    In,
    NotIn,
    Contains,
    ContainsAny,
    HasAny,
}

impl Operator {
    /// Convert from the stored string value.
    pub fn from_str_value(s: &str) -> Result<Self, String> {
        match s {
            OP_EQUALS => Ok(Self::Equals),
            OP_NOT_EQUALS => Ok(Self::NotEquals),
            OP_IN => Ok(Self::In),
            OP_NOT_IN => Ok(Self::NotIn),
            OP_CONTAINS => Ok(Self::Contains),
            OP_CONTAINS_ANY => Ok(Self::ContainsAny),
            OP_HAS_ANY => Ok(Self::HasAny),
            _ => Err(format!(
                "Invalid operator '{s}'. Must be one of: {}",
                VALID_OPERATORS.join(", ")
            )),
        }
    }

    /// Convert to the stored string value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Equals => OP_EQUALS,
            Self::NotEquals => OP_NOT_EQUALS,
            Self::In => OP_IN,
            Self::NotIn => OP_NOT_IN,
            Self::Contains => OP_CONTAINS,
            Self::ContainsAny => OP_CONTAINS_ANY,
            Self::HasAny => OP_HAS_ANY,
        }
    }

    /// Whether the operator compares against a list of strings.
    pub fn is_list_valued(&self) -> bool {
        matches!(
            self,
            Self::In | Self::NotIn | Self::ContainsAny | Self::HasAny
        )
    }

    /// Whether the operator expresses a negative constraint.
    ///
    /// Negative operators are trivially satisfied by an absent fact: no
    /// disqualifying value is present.
    pub fn is_negative(&self) -> bool {
        matches!(self, Self::NotEquals | Self::NotIn)
    }

    /// Operators that are valid for fields of the given domain.
    pub fn allowed_for(domain: FieldDomain) -> &'static [Operator] {
        match domain {
            FieldDomain::Boolean => &[Self::Equals, Self::NotEquals],
            FieldDomain::Number => &[Self::Equals, Self::NotEquals, Self::In, Self::NotIn],
            FieldDomain::Text => &[
                Self::Equals,
                Self::NotEquals,
                Self::In,
                Self::NotIn,
                Self::Contains,
                Self::ContainsAny,
            ],
            FieldDomain::List => &[Self::HasAny],
        }
    }
}

// ---------------------------------------------------------------------------
// Conditions
// ---------------------------------------------------------------------------

/// A typed condition value. Which variant is legal depends on the
/// operator and the field's domain; the validator enforces this before
/// a condition is ever persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConditionValue {
    Bool(bool),
    Number(f64),
    Text(String),
    List(Vec<String>),
}

/// One comparison against a named applicant fact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub field: String,
    pub operator: Operator,
    pub value: ConditionValue,
}

// ---------------------------------------------------------------------------
// Actions
// ---------------------------------------------------------------------------

pub const ACTION_ADD_SCORE: &str = "add_score";
pub const ACTION_ADD_FLAG: &str = "add_flag";

/// All valid action type strings.
pub const VALID_ACTION_TYPES: &[&str] = &[ACTION_ADD_SCORE, ACTION_ADD_FLAG];

/// An effect applied when a rule's conditions all hold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    /// Add a (possibly negative) point delta to the readiness score.
    AddScore {
        #[serde(default)]
        value: i64,
    },
    /// Attach a qualitative warning flag to the evaluation result.
    AddFlag { message: String },
}

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

/// A stored readiness rule with decoded conditions and actions.
///
/// Lower `priority` evaluates first; ties keep storage (id) order.
/// Inactive rules stay in storage and remain editable but never fire.
#[derive(Debug, Clone, Serialize)]
pub struct Rule {
    pub id: DbId,
    pub rule_name: String,
    pub rule_type: String,
    pub description: Option<String>,
    pub conditions: Vec<Condition>,
    pub actions: Vec<Action>,
    pub priority: i32,
    pub is_active: bool,
    pub created_at: Timestamp,
}
