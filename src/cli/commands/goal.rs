//! `goalplan goal ...` commands. None of these talk to the model.

use anyhow::Result;
use chrono::Utc;
use serde_json::json;
use tracing::info;

use goalplan_model::NewGoal;
use goalplan_store::GoalStore;

use super::common::CommandContext;
use super::output::{goal_details, goal_line, print_json};
use crate::cli::args::{CreateGoal, GoalCommands};

pub fn execute_goal_command(ctx: &CommandContext, command: GoalCommands) -> Result<()> {
    let store = ctx.store()?;
    let user = ctx.user.as_str();

    match command {
        GoalCommands::Create(CreateGoal { wish, outcome }) => {
            let record = store.create(user, NewGoal { wish, outcome }, Utc::now())?;
            info!(user_id = user, goal_id = record.id, "goal created");
            if ctx.json {
                print_json(&record)?;
            } else {
                println!("Created goal {}: {}", record.id, record.wish);
                println!("Next: goalplan questions {}", record.id);
            }
        }
        GoalCommands::List => {
            let records = store.list(user)?;
            if ctx.json {
                print_json(&records)?;
            } else if records.is_empty() {
                println!("No goals yet. Create one with: goalplan goal create --wish ... --outcome ...");
            } else {
                for record in &records {
                    println!("{}", goal_line(record));
                }
            }
        }
        GoalCommands::Show { id } => {
            let record = store.get(user, id)?;
            if ctx.json {
                print_json(&record)?;
            } else {
                print!("{}", goal_details(&record));
            }
        }
        GoalCommands::Delete { id } => {
            store.delete(user, id)?;
            info!(user_id = user, goal_id = id, "goal deleted");
            if ctx.json {
                print_json(&json!({ "deleted": id }))?;
            } else {
                println!("Deleted goal {id}");
            }
        }
    }
    Ok(())
}
