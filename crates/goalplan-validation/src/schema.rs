use goalplan_model::{GoalBreakdown, ImplementationPlan};
use goalplan_utils::error::ValidationError;
use goalplan_utils::types::ArtifactKind;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::warn;

use crate::fields::{
    Object, as_object, child_path, element_path, require_list, require_non_empty_list,
    require_object, require_scalar, require_scalar_elements,
};

const CRITERIA_LISTS: [&str; 3] = ["must_have_skills", "must_complete_tasks", "validation_methods"];

/// Check the structure of a goal breakdown.
///
/// Order: `goal` (description, then completion_criteria and its three
/// lists), then every phase in index order.
pub fn check_breakdown(data: &Object) -> Result<(), ValidationError> {
    let goal = require_object(data, "", "goal")?;
    require_scalar(goal, "goal", "description")?;
    let criteria = require_object(goal, "goal", "completion_criteria")?;
    for list in CRITERIA_LISTS {
        require_list(criteria, "goal.completion_criteria", list)?;
    }

    let phases = require_non_empty_list(data, "", "phases")?;
    for (i, phase) in phases.iter().enumerate() {
        let path = element_path("", "phases", i);
        let phase = as_object(phase, &path)?;
        require_scalar(phase, &path, "name")?;
        let dims = require_list(phase, &path, "focus_dimensions")?;
        require_scalar_elements(dims, &path, "focus_dimensions")?;
        require_list(phase, &path, "milestones")?;
        let exit = require_object(phase, &path, "exit_criteria")?;
        let exit_path = child_path(&path, "exit_criteria");
        require_list(exit, &exit_path, "skills_checklist")?;
        require_list(exit, &exit_path, "practical_tasks")?;
    }
    Ok(())
}

/// Check the structure of an implementation plan.
///
/// Every dimension needs `id, name, why, phase, options` with at least one
/// option; every option needs `id, name, difficulty, time_cost, actions`
/// with at least one action.
pub fn check_implementation_plan(data: &Object) -> Result<(), ValidationError> {
    let dimensions = require_non_empty_list(data, "", "dimensions")?;
    for (i, dimension) in dimensions.iter().enumerate() {
        let path = element_path("", "dimensions", i);
        let dimension = as_object(dimension, &path)?;
        for field in ["id", "name", "why", "phase"] {
            require_scalar(dimension, &path, field)?;
        }

        let options = require_non_empty_list(dimension, &path, "options")?;
        for (j, option) in options.iter().enumerate() {
            let opt_path = element_path(&path, "options", j);
            let option = as_object(option, &opt_path)?;
            for field in ["id", "name", "difficulty", "time_cost"] {
                require_scalar(option, &opt_path, field)?;
            }
            let actions = require_non_empty_list(option, &opt_path, "actions")?;
            require_scalar_elements(actions, &opt_path, "actions")?;
        }
    }
    Ok(())
}

/// Overwrite phase ids with `p1, p2, ...` in list order.
///
/// Model-supplied ids are discarded. Entries that are not objects are left
/// untouched; [`check_breakdown`] rejects them anyway.
pub fn renumber_phases(data: &mut Object) {
    if let Some(Value::Array(phases)) = data.get_mut("phases") {
        for (i, phase) in phases.iter_mut().enumerate() {
            if let Value::Object(phase) = phase {
                phase.insert("id".to_string(), Value::String(format!("p{}", i + 1)));
            }
        }
    }
}

fn into_typed<T: DeserializeOwned>(data: Object) -> Result<T, ValidationError> {
    serde_json::from_value(Value::Object(data)).map_err(|e| ValidationError::Shape {
        message: e.to_string(),
    })
}

/// Check, renumber, and convert a breakdown.
///
/// When `expected_phases` is given, a different phase count is a
/// [`ValidationError::PhaseCountMismatch`].
pub fn validate_breakdown(
    mut data: Object,
    expected_phases: Option<usize>,
) -> Result<GoalBreakdown, ValidationError> {
    check_breakdown(&data)?;
    if let Some(expected) = expected_phases {
        let actual = phase_count(&data);
        if actual != expected {
            return Err(ValidationError::PhaseCountMismatch { expected, actual });
        }
    }
    renumber_phases(&mut data);
    into_typed(data)
}

/// Check and convert an implementation plan.
pub fn validate_implementation_plan(data: Object) -> Result<ImplementationPlan, ValidationError> {
    check_implementation_plan(&data)?;
    into_typed(data)
}

fn phase_count(data: &Object) -> usize {
    data.get("phases")
        .and_then(Value::as_array)
        .map_or(0, Vec::len)
}

/// Per-kind validator carrying the phase-count policy.
///
/// By default the requested phase count is advisory: a mismatch is logged
/// and the model's phases are kept. With strict phase counting the mismatch
/// is rejected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SchemaValidator {
    strict_phase_count: bool,
}

impl SchemaValidator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_strict_phase_count(mut self, strict: bool) -> Self {
        self.strict_phase_count = strict;
        self
    }

    #[must_use]
    pub fn strict_phase_count(&self) -> bool {
        self.strict_phase_count
    }

    /// Validate `data` as the given artifact kind and return it normalized.
    ///
    /// Questions are not validated here; they go through the repairer.
    pub fn validate(&self, kind: ArtifactKind, mut data: Object) -> Result<Object, ValidationError> {
        match kind {
            ArtifactKind::Questions => Ok(data),
            ArtifactKind::Breakdown => {
                check_breakdown(&data)?;
                renumber_phases(&mut data);
                Ok(data)
            }
            ArtifactKind::ImplementationPlan => {
                check_implementation_plan(&data)?;
                Ok(data)
            }
        }
    }

    /// Validate a breakdown generated for `requested_phases` phases.
    pub fn breakdown(
        &self,
        data: Object,
        requested_phases: usize,
    ) -> Result<GoalBreakdown, ValidationError> {
        if self.strict_phase_count {
            return validate_breakdown(data, Some(requested_phases));
        }
        let breakdown = validate_breakdown(data, None)?;
        if breakdown.phases.len() != requested_phases {
            warn!(
                requested = requested_phases,
                produced = breakdown.phases.len(),
                "model produced a different number of phases than requested; keeping them"
            );
        }
        Ok(breakdown)
    }

    pub fn implementation_plan(&self, data: Object) -> Result<ImplementationPlan, ValidationError> {
        validate_implementation_plan(data)
    }
}
