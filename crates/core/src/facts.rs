//! Applicant fact-field registry and fact values.
//!
//! The set of fields a condition may reference is a closed enumeration
//! shared with the intake form. Each field has a value domain that
//! determines which operators apply to it and how free-text form input
//! is coerced before persistence.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Field name constants
// ---------------------------------------------------------------------------

pub const FIELD_APPLICANT_NATIONALITY: &str = "applicant_nationality";
pub const FIELD_UAE_RESIDENCY: &str = "uae_residency";
pub const FIELD_COMPANY_JURISDICTION: &str = "company_jurisdiction";
pub const FIELD_LICENSE_ACTIVITY: &str = "license_activity";
pub const FIELD_BUSINESS_MODEL: &str = "business_model";
pub const FIELD_EXPECTED_MONTHLY_INFLOW: &str = "expected_monthly_inflow";
pub const FIELD_SOURCE_OF_FUNDS: &str = "source_of_funds";
pub const FIELD_INCOMING_PAYMENT_COUNTRIES: &str = "incoming_payment_countries";
pub const FIELD_PREVIOUS_REJECTION: &str = "previous_rejection";

// ---------------------------------------------------------------------------
// Field domains
// ---------------------------------------------------------------------------

/// The value domain of a fact field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldDomain {
    /// Free-text value (nationality codes, jurisdiction names, ...).
    Text,
    /// Yes/no flag.
    Boolean,
    /// Numeric value (amounts).
    Number,
    /// A list of strings (e.g. country codes).
    List,
}

/// One entry in the fact-field registry.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct FieldSpec {
    pub name: &'static str,
    pub domain: FieldDomain,
}

/// All fields a condition may reference, with their value domains.
pub const FACT_FIELDS: &[FieldSpec] = &[
    FieldSpec {
        name: FIELD_APPLICANT_NATIONALITY,
        domain: FieldDomain::Text,
    },
    FieldSpec {
        name: FIELD_UAE_RESIDENCY,
        domain: FieldDomain::Boolean,
    },
    FieldSpec {
        name: FIELD_COMPANY_JURISDICTION,
        domain: FieldDomain::Text,
    },
    FieldSpec {
        name: FIELD_LICENSE_ACTIVITY,
        domain: FieldDomain::Text,
    },
    FieldSpec {
        name: FIELD_BUSINESS_MODEL,
        domain: FieldDomain::Text,
    },
    FieldSpec {
        name: FIELD_EXPECTED_MONTHLY_INFLOW,
        domain: FieldDomain::Number,
    },
    FieldSpec {
        name: FIELD_SOURCE_OF_FUNDS,
        domain: FieldDomain::Text,
    },
    FieldSpec {
        name: FIELD_INCOMING_PAYMENT_COUNTRIES,
        domain: FieldDomain::List,
    },
    FieldSpec {
        name: FIELD_PREVIOUS_REJECTION,
        domain: FieldDomain::Boolean,
    },
];

/// Look up the domain of a field by name. `None` for unknown fields.
pub fn field_domain(name: &str) -> Option<FieldDomain> {
    FACT_FIELDS
        .iter()
        .find(|f| f.name == name)
        .map(|f| f.domain)
}

// ---------------------------------------------------------------------------
// Fact values
// ---------------------------------------------------------------------------

/// A single applicant attribute value, as supplied by the caller.
///
/// Deserializes from plain JSON scalars and string arrays; the variant
/// order matters for untagged deserialization (booleans and numbers
/// must be tried before strings).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FactValue {
    Bool(bool),
    Number(f64),
    Text(String),
    List(Vec<String>),
}

/// The caller-supplied map of applicant attributes a rule is evaluated
/// against. Keys are fact-field names; unknown keys are ignored by the
/// evaluator.
pub type FactMap = BTreeMap<String, FactValue>;
