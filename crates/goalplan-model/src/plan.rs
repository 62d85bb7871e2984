use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::de::{de_string_like, de_string_list};

/// Implementation plan: facets of the goal, each with actionable options.
///
/// Only the known fields are kept; anything else the model adds is dropped
/// when the plan is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImplementationPlan {
    pub dimensions: Vec<Dimension>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dimension {
    #[serde(deserialize_with = "de_string_like")]
    pub id: String,
    #[serde(deserialize_with = "de_string_like")]
    pub name: String,
    #[serde(deserialize_with = "de_string_like")]
    pub why: String,
    /// Phase tag (`p1`...). Not cross-checked against the breakdown.
    #[serde(deserialize_with = "de_string_like")]
    pub phase: String,
    pub options: Vec<PlanOption>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanOption {
    #[serde(deserialize_with = "de_string_like")]
    pub id: String,
    #[serde(deserialize_with = "de_string_like")]
    pub name: String,
    /// Usually a 1-5 number, sometimes a label such as `"medium"`.
    pub difficulty: Value,
    #[serde(deserialize_with = "de_string_like")]
    pub time_cost: String,
    #[serde(deserialize_with = "de_string_list")]
    pub actions: Vec<String>,
}

impl ImplementationPlan {
    #[must_use]
    pub fn option_count(&self) -> usize {
        self.dimensions.iter().map(|d| d.options.len()).sum()
    }

    /// Dimensions tagged with the given phase id.
    pub fn dimensions_for_phase<'a>(&'a self, phase: &'a str) -> impl Iterator<Item = &'a Dimension> {
        self.dimensions.iter().filter(move |d| d.phase == phase)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn extra_fields_are_dropped_and_scalars_stringified() {
        let plan: ImplementationPlan = serde_json::from_value(json!({
            "dimensions": [{
                "id": 1,
                "name": "Fitness",
                "why": "base",
                "phase": "p1",
                "icon": "🏃",
                "options": [{
                    "id": "1a",
                    "name": "Couch to 5k",
                    "difficulty": 2,
                    "time_cost": "3h/week",
                    "actions": ["buy shoes", "run"],
                    "cost": 50
                }]
            }]
        }))
        .unwrap();

        assert_eq!(plan.dimensions[0].id, "1");
        assert_eq!(plan.option_count(), 1);
        let back = serde_json::to_value(&plan).unwrap();
        assert!(back["dimensions"][0].get("icon").is_none());
        assert!(back["dimensions"][0]["options"][0].get("cost").is_none());
        assert_eq!(plan.dimensions_for_phase("p1").count(), 1);
        assert_eq!(plan.dimensions_for_phase("p2").count(), 0);
    }
}
