use crate::core::{
    config::AppConfig,
    error::Result,
    git::{GitCli, TrustScope},
    print_section_header, print_success,
};
use colored::*;
use tokio_util::sync::CancellationToken;

/// Add every enabled project to the global `safe.directory` list.
pub async fn execute_fix_git(config: &AppConfig) -> Result<()> {
    let git = GitCli::new(&config.engine.git_binary);
    let token = CancellationToken::new();
    let mut repaired = 0;

    print_section_header("Marking project directories as trusted");
    for project in config.enabled_projects() {
        println!(
            "{} {}",
            project.name.blue(),
            format!("({})", project.path.display()).bright_black()
        );

        if !project.path.exists() {
            println!("    {} path does not exist\n", "✕".red());
            continue;
        }

        match git.trust_directory(TrustScope::Global, &project.path, &token).await {
            Ok(()) => {
                println!("    {} added to {}\n", "✓".green(), TrustScope::Global.describe());
                repaired += 1;
            }
            Err(e) => {
                log::debug!("Trusting {} failed: {e}", project.path.display());
                println!("    {} {}", "✕".red(), e.to_string().white());
                println!("    {}", "Run manually:".bright_black());
                println!(
                    "      git config --global --add safe.directory {}\n",
                    project.path.display()
                );
            }
        }
    }

    print_success(&format!("Repaired {repaired} project(s)"));
    println!();
    Ok(())
}
