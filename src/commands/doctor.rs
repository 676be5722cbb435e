use crate::core::{
    config::AppConfig,
    diagnose::{diagnose, Diagnosis},
    error::Result,
    git::GitCli,
    print_info, print_section_header,
};
use colored::*;

/// Diagnose every configured project, enabled or not.
pub async fn execute_doctor(config: &AppConfig) -> Result<()> {
    if config.projects.is_empty() {
        print_info("No projects configured.");
        return Ok(());
    }

    let git = GitCli::new(&config.engine.git_binary);
    print_section_header("Diagnostics");
    for project in &config.projects {
        print_diagnosis(&diagnose(&git, project).await);
    }
    Ok(())
}

pub fn print_diagnosis(diagnosis: &Diagnosis) {
    let enabled = if diagnosis.enabled { "" } else { " (disabled)" };
    println!(
        "{}{} {}",
        diagnosis.name.blue(),
        enabled.bright_black(),
        format!("({})", diagnosis.path.display()).bright_black()
    );

    if !diagnosis.path_exists {
        println!("    path:       {}", "missing".red());
        println!();
        return;
    }
    let kind = if diagnosis.is_directory { "directory" } else { "file" };
    println!("    path:       {} ({kind})", "exists".green());

    if !diagnosis.is_repository {
        println!("    repository: {}", "no .git directory".red());
        println!();
        return;
    }
    println!("    repository: {}", "valid".green());

    match &diagnosis.git_error {
        None => println!("    git:        {}", "ok".green()),
        Some(e) => println!("    git:        {} {}", "failed".red(), e.bright_black()),
    }
    match diagnosis.tag_count {
        Some(count) => println!("    tags:       {count}"),
        None => println!("    tags:       {}", "unavailable".red()),
    }
    println!();
}
