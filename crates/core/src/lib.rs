//! Pure domain logic for bank-readiness rules.
//!
//! Contains the rule data model, fact-field registry, form-input
//! normalization, validation, and the evaluation pipeline. The crate has
//! no database dependency; callers load rules and pass them in together
//! with an applicant fact set.

pub mod error;
pub mod evaluate;
pub mod facts;
pub mod normalize;
pub mod rule;
pub mod types;
pub mod validate;
