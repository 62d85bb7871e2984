//! Turning raw model text into a JSON object.
//!
//! Two stages run in order:
//!
//! 1. [`extract`] isolates the content of a markdown code fence, if any.
//! 2. [`TolerantParser::parse`] tries an ordered list of [`ParseStrategy`]
//!    values, each a textual repair followed by a strict parse, and stops at
//!    the first one that yields an object.

mod fence;
mod parser;
pub mod repair;

pub use fence::{ExtractionOutcome, Extracted, extract, extract_with_outcome};
pub use parser::{ParseStrategy, Parsed, TolerantParser};
