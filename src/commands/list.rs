use crate::commands::doctor::print_diagnosis;
use crate::core::{
    config::AppConfig,
    diagnose::diagnose,
    engine::Engine,
    error::Result,
    print_info, print_section_header, print_warning,
    state::{ProjectSnapshot, WorkingMode},
};
use colored::*;

pub async fn execute_list(config: &AppConfig, selected: Option<String>, json: bool) -> Result<()> {
    let engine = Engine::from_config(config);

    if !json {
        for project in engine.projects() {
            if !project.path.exists() {
                print_warning(&format!("Project path does not exist: {}", project.path.display()));
            }
        }
    }

    if let Some(name) = selected.as_deref().filter(|_| !json) {
        if config.project_by_name(name).is_none() {
            print_warning(&format!("Project {name} is not configured or is disabled"));
        }
    }

    if engine.options().debug && !json {
        print_section_header("Diagnostics");
        for project in engine.projects() {
            print_diagnosis(&diagnose(engine.git(), project).await);
        }
    }

    let listing = engine.list(selected.as_deref()).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&listing)?);
    } else if listing.projects.is_empty() {
        print_info("No enabled projects. Add some to the configuration file.");
    } else {
        print_section_header("Projects");
        for snapshot in &listing.projects {
            print_snapshot(snapshot);
        }
    }

    // Let a refresh started by a cache miss finish and persist.
    engine.shutdown(true).await;
    Ok(())
}

pub fn print_snapshot(snapshot: &ProjectSnapshot) {
    let marker = if snapshot.current { "*" } else { " " };
    println!(
        "{}{}{} {} {}",
        "[".bright_black(),
        marker.white(),
        "]".bright_black(),
        snapshot.name.blue(),
        format!("({})", snapshot.path.display()).bright_black()
    );
    println!("    {}", snapshot.description.white());
    println!("    mode: {}", format_mode(snapshot));

    if !snapshot.tags.is_empty() {
        println!("    {}", "tags:".bright_black());
        for tag in &snapshot.tags {
            let marker = if tag.checked { "*" } else { " " };
            println!(
                "    {} {} {} {} {}",
                marker.green(),
                tag.name.blue(),
                tag.commit_hash.bright_black(),
                tag.created_time.bright_black(),
                tag.message.white()
            );
        }
    }

    if !snapshot.branches.is_empty() {
        println!("    {}", "branches:".bright_black());
        for branch in &snapshot.branches {
            let marker = if branch.checked { "*" } else { " " };
            let name = if branch.is_remote {
                branch.name.bright_black()
            } else {
                branch.name.blue()
            };
            println!(
                "    {} {} {} {} {}",
                marker.green(),
                name,
                branch.commit_hash.bright_black(),
                branch.commit_time.bright_black(),
                branch.last_commit.white()
            );
        }
    }

    println!();
}

fn format_mode(snapshot: &ProjectSnapshot) -> ColoredString {
    match snapshot.working_mode {
        WorkingMode::Branch => format!("branch {}", snapshot.current_branch).green(),
        WorkingMode::Tag => format!("tag {}", snapshot.current_tag).green(),
        WorkingMode::Detached => format!("detached near {}", snapshot.current_tag).yellow(),
        WorkingMode::Unknown => "unknown".red(),
    }
}
