//! Human-readable and JSON rendering of command results.

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::Value;

use goalplan_model::{Dimension, GoalBreakdown, GoalRecord, ImplementationPlan, QuestionSet};

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize JSON output")?;
    println!("{json}");
    Ok(())
}

fn time(record_time: &chrono::DateTime<chrono::Utc>) -> String {
    record_time.format("%Y-%m-%d %H:%M UTC").to_string()
}

/// Render a scalar model value without JSON quoting.
fn plain(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

pub fn goal_line(record: &GoalRecord) -> String {
    format!("{:>4}  {:<12} {}", record.id, record.stage_label(), record.wish)
}

pub fn goal_details(record: &GoalRecord) -> String {
    let mut out = format!("Goal {} ({})\n", record.id, record.stage_label());
    out.push_str(&format!("  Wish:    {}\n", record.wish));
    out.push_str(&format!("  Outcome: {}\n", record.outcome));
    out.push_str(&format!("  Created: {}\n", time(&record.created_at)));
    out.push_str(&format!("  Updated: {}\n", time(&record.updated_at)));

    if let Some(answers) = &record.questions_answers {
        out.push_str(&format!("\nAnswers ({}):\n", answers.len()));
        for entry in answers {
            out.push_str(&format!("  Q: {}\n  A: {}\n", entry.question, entry.answer));
        }
    }
    if let Some(breakdown) = &record.goal_breakdown {
        out.push('\n');
        out.push_str(&breakdown_text(breakdown));
    }
    if let Some(plan) = &record.implementation_plan {
        out.push('\n');
        out.push_str(&plan_text(plan, record.goal_breakdown.as_ref()));
    }
    out
}

pub fn questions_text(set: &QuestionSet) -> String {
    let mut out = String::new();
    if let Some(summary) = set
        .analysis
        .as_ref()
        .and_then(|a| a.get("goal_summary"))
        .and_then(Value::as_str)
    {
        out.push_str(&format!("{summary}\n\n"));
    }
    for (i, q) in set.questions.iter().enumerate() {
        out.push_str(&format!("{}. {}\n", i + 1, q.question));
        out.push_str(&format!("   purpose: {}\n", q.purpose));
    }
    out
}

pub fn breakdown_text(breakdown: &GoalBreakdown) -> String {
    let mut out = format!("Breakdown: {}\n", breakdown.goal.description);
    for phase in &breakdown.phases {
        out.push_str(&format!("  {}  {}\n", phase.id, phase.name));
        if !phase.focus_dimensions.is_empty() {
            out.push_str(&format!("      focus: {}\n", phase.focus_dimensions.join(", ")));
        }
        for milestone in &phase.milestones {
            let label = milestone
                .get("name")
                .map_or_else(|| plain(milestone), plain);
            out.push_str(&format!("      - {label}\n"));
        }
    }
    out
}

/// Render a plan. With the breakdown at hand, dimensions are grouped under
/// the phase they belong to; dimensions naming an unknown phase come last.
pub fn plan_text(plan: &ImplementationPlan, breakdown: Option<&GoalBreakdown>) -> String {
    let mut out = format!(
        "Plan: {} dimensions, {} options\n",
        plan.dimensions.len(),
        plan.option_count()
    );
    let Some(breakdown) = breakdown else {
        for dimension in &plan.dimensions {
            out.push_str(&format!("  [{}] {} ({})\n", dimension.phase, dimension.name, dimension.why));
            push_options(&mut out, dimension, "    ");
        }
        return out;
    };

    for phase in &breakdown.phases {
        let mut dimensions = plan.dimensions_for_phase(&phase.id).peekable();
        if dimensions.peek().is_none() {
            continue;
        }
        out.push_str(&format!("  {}  {}\n", phase.id, phase.name));
        for dimension in dimensions {
            out.push_str(&format!("    {} ({})\n", dimension.name, dimension.why));
            push_options(&mut out, dimension, "      ");
        }
    }
    for dimension in plan
        .dimensions
        .iter()
        .filter(|d| breakdown.phase(&d.phase).is_none())
    {
        out.push_str(&format!("  [{}] {} ({})\n", dimension.phase, dimension.name, dimension.why));
        push_options(&mut out, dimension, "    ");
    }
    out
}

fn push_options(out: &mut String, dimension: &Dimension, indent: &str) {
    for option in &dimension.options {
        out.push_str(&format!(
            "{indent}{} (difficulty {}, {})\n",
            option.name,
            plain(&option.difficulty),
            option.time_cost
        ));
        for action in &option.actions {
            out.push_str(&format!("{indent}  - {action}\n"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use goalplan_model::{AnswerEntry, NewGoal};
    use serde_json::json;

    fn record() -> GoalRecord {
        GoalRecord::new(
            7,
            "alice",
            NewGoal {
                wish: "Learn to sail".to_string(),
                outcome: "Cross the channel".to_string(),
            },
            Utc::now(),
        )
    }

    #[test]
    fn goal_line_shows_stage() {
        let line = goal_line(&record());
        assert!(line.contains("new"));
        assert!(line.ends_with("Learn to sail"));
    }

    #[test]
    fn details_include_answers() {
        let mut record = record();
        record.questions_answers = Some(vec![AnswerEntry::new("Boat?", "Rented")]);
        let text = goal_details(&record);
        assert!(text.starts_with("Goal 7 (answered)"));
        assert!(text.contains("A: Rented"));
    }

    #[test]
    fn plan_difficulty_is_unquoted() {
        let plan: ImplementationPlan = serde_json::from_value(json!({
            "dimensions": [{
                "id": "d1", "name": "Seamanship", "why": "w", "phase": "p1",
                "options": [{"id": "o1", "name": "Course", "difficulty": "medium", "time_cost": "2 days", "actions": ["Book"]}]
            }]
        }))
        .unwrap();
        let text = plan_text(&plan, None);
        assert!(text.contains("difficulty medium"));
        assert!(text.contains("- Book"));
    }

    #[test]
    fn plan_is_grouped_by_breakdown_phase() {
        let breakdown: GoalBreakdown = serde_json::from_value(json!({
            "goal": {
                "description": "Sail",
                "completion_criteria": {"must_have_skills": [], "must_complete_tasks": [], "validation_methods": []}
            },
            "phases": [
                {"id": "p1", "name": "Basics", "focus_dimensions": [], "milestones": [],
                 "exit_criteria": {"skills_checklist": [], "practical_tasks": []}},
                {"id": "p2", "name": "Open water", "focus_dimensions": [], "milestones": [],
                 "exit_criteria": {"skills_checklist": [], "practical_tasks": []}}
            ]
        }))
        .unwrap();
        let dimension = |id: &str, phase: &str| {
            json!({"id": id, "name": format!("Dim {id}"), "why": "w", "phase": phase,
                   "options": [{"id": "o1", "name": "Opt", "difficulty": 1, "time_cost": "1h", "actions": ["Go"]}]})
        };
        let plan: ImplementationPlan = serde_json::from_value(json!({
            "dimensions": [dimension("d1", "p2"), dimension("d2", "p1"), dimension("d3", "p9")]
        }))
        .unwrap();

        let text = plan_text(&plan, Some(&breakdown));
        let basics = text.find("p1  Basics").unwrap();
        let open_water = text.find("p2  Open water").unwrap();
        assert!(basics < text.find("Dim d2").unwrap());
        assert!(basics < open_water && open_water < text.find("Dim d1").unwrap());
        assert!(text.contains("[p9] Dim d3"));
    }
}
