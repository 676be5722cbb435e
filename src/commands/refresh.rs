use crate::core::{config::AppConfig, engine::Engine, error::Result, print_success};
use colored::*;

pub async fn execute_refresh(config: &AppConfig, project: String, json: bool) -> Result<()> {
    let engine = Engine::from_config(config);
    let summary = engine.refresh(&project).await;
    engine.shutdown(true).await;
    let summary = summary?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    print_success(&format!("Project {} cache refreshed", summary.project));
    println!(
        "  {} tags, {} branches, mode {}\n",
        summary.tags.to_string().blue(),
        summary.branches.to_string().blue(),
        summary.mode.to_string().green()
    );
    Ok(())
}
