//! CLI command implementations.

mod common;
mod generate;
mod goal;
mod output;

pub use common::CommandContext;

use anyhow::Result;

use super::args::Commands;

/// Run one parsed command.
pub async fn dispatch(ctx: &CommandContext, command: Commands) -> Result<()> {
    match command {
        Commands::Goal(goal_cmd) => goal::execute_goal_command(ctx, goal_cmd),
        Commands::Questions { id } => generate::execute_questions_command(ctx, id).await,
        Commands::Breakdown {
            id,
            answers,
            phases,
        } => generate::execute_breakdown_command(ctx, id, &answers, phases).await,
        Commands::Regenerate { id, phases } => {
            generate::execute_regenerate_command(ctx, id, phases).await
        }
        Commands::Plan { id } => generate::execute_plan_command(ctx, id).await,
    }
}
