//! Structural checks on parsed model output.
//!
//! Breakdowns and implementation plans are validated fail-fast: the first
//! violation, in schema declaration order and then list index order, is
//! returned as a [`ValidationError`] naming its dotted path. Question sets
//! are never rejected; [`questions`] repairs them instead.

mod fields;
pub mod questions;
mod schema;

pub use goalplan_utils::error::ValidationError;
pub use schema::{
    SchemaValidator, check_breakdown, check_implementation_plan, renumber_phases,
    validate_breakdown, validate_implementation_plan,
};
