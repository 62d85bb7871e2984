//! Artifact generation and the goal workflow.
//!
//! [`ArtifactGenerator`] drives one model call through extraction, parsing,
//! validation and repair. [`GoalService`] ties it to a [`goalplan_store::GoalStore`].

mod generator;
mod goals;
mod stage;

pub use generator::{ArtifactGenerator, GeneratorSettings};
pub use goals::GoalService;
