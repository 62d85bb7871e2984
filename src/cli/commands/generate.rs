//! Commands that call the model: questions, breakdown, regenerate, plan.

use anyhow::Result;
use std::path::Path;

use super::common::{CommandContext, read_answers};
use super::output::{breakdown_text, plan_text, print_json, questions_text};

pub async fn execute_questions_command(ctx: &CommandContext, goal_id: u64) -> Result<()> {
    let service = ctx.service()?;
    let set = service.questions(&ctx.user, goal_id).await?;

    if ctx.json {
        print_json(&set)?;
    } else {
        print!("{}", questions_text(&set));
        println!("\nAnswer them in a JSON file, then run: goalplan breakdown {goal_id} --answers FILE");
    }
    Ok(())
}

pub async fn execute_breakdown_command(
    ctx: &CommandContext,
    goal_id: u64,
    answers_path: &Path,
    phases: Option<usize>,
) -> Result<()> {
    let answers = read_answers(answers_path)?;
    let service = ctx.service()?;
    let record = service.breakdown(&ctx.user, goal_id, answers, phases).await?;
    print_breakdown(ctx, &record)
}

pub async fn execute_regenerate_command(ctx: &CommandContext, goal_id: u64, phases: usize) -> Result<()> {
    let service = ctx.service()?;
    let record = service
        .regenerate_breakdown(&ctx.user, goal_id, Some(phases))
        .await?;
    print_breakdown(ctx, &record)
}

pub async fn execute_plan_command(ctx: &CommandContext, goal_id: u64) -> Result<()> {
    let service = ctx.service()?;
    let plan = service.implementation_plan(&ctx.user, goal_id).await?;

    if ctx.json {
        print_json(&plan)?;
    } else {
        let record = service.get_goal(&ctx.user, goal_id)?;
        print!("{}", plan_text(&plan, record.goal_breakdown.as_ref()));
    }
    Ok(())
}

fn print_breakdown(ctx: &CommandContext, record: &goalplan_model::GoalRecord) -> Result<()> {
    let Some(breakdown) = &record.goal_breakdown else {
        return Ok(());
    };
    if ctx.json {
        print_json(breakdown)?;
    } else {
        print!("{}", breakdown_text(breakdown));
        println!("\nNext: goalplan plan {}", record.id);
    }
    Ok(())
}
