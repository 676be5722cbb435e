use assert_cmd::prelude::*;
use gover::core::config::{AppConfig, EngineOptions};
use predicates::prelude::*;
use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

mod common;
use common::assertions::*;
use common::fixtures::*;
use common::repository::*;

/// `gover` with its config, cache and home directories inside `sandbox`
fn gover(sandbox: &Path, config: &Path) -> anyhow::Result<Command> {
    let mut cmd = Command::cargo_bin("gover")?;
    cmd.arg("--config")
        .arg(config)
        .env("HOME", sandbox)
        .env("XDG_CONFIG_HOME", sandbox.join("config"))
        .env("XDG_CACHE_HOME", sandbox.join("cache"))
        .env("NO_COLOR", "1");
    Ok(cmd)
}

#[cfg(test)]
mod cli_tests {
    use super::*;

    #[test]
    fn test_list_shows_projects_and_modes() -> anyhow::Result<()> {
        let repo = create_tagged_repo_detached_at_v2()?;
        let sandbox = TempDir::new()?;
        let config = write_config(sandbox.path(), vec![project("api", repo.path())])?;

        gover(sandbox.path(), &config)?
            .arg("list")
            .assert()
            .success()
            .stdout(predicate::str::contains("api"))
            .stdout(has_mode("tag v2.0.0"));

        // The first run persisted a full snapshot for the second one.
        gover(sandbox.path(), &config)?
            .arg("list")
            .assert()
            .success()
            .stdout(predicate::str::contains("v1.5.3"))
            .stdout(has_checked_ref("v2.0.0"));

        Ok(())
    }

    #[test]
    fn test_list_json() -> anyhow::Result<()> {
        let repo = setup_test_repo_with_initial_commit()?;
        let sandbox = TempDir::new()?;
        let config = write_config(sandbox.path(), vec![project("api", repo.path())])?;

        let output = gover(sandbox.path(), &config)?
            .args(["list", "--json"])
            .output()?;
        assert!(output.status.success());

        let listing: serde_json::Value = serde_json::from_slice(&output.stdout)?;
        assert_eq!(listing["current"], 0);
        assert_eq!(listing["projects"][0]["name"], "api");
        assert_eq!(listing["projects"][0]["working_mode"], "branch");
        assert_eq!(listing["projects"][0]["current_branch"], "main");
        assert_eq!(listing["projects"][0]["current"], true);

        Ok(())
    }

    #[test]
    fn test_list_warns_about_missing_paths() -> anyhow::Result<()> {
        let sandbox = TempDir::new()?;
        let missing = sandbox.path().join("missing");
        let config = write_config(sandbox.path(), vec![project("ghost", &missing)])?;

        gover(sandbox.path(), &config)?
            .arg("list")
            .assert()
            .success()
            .stdout(predicate::str::contains("Project path does not exist"))
            .stdout(has_mode("unknown"));

        Ok(())
    }

    #[test]
    fn test_list_warns_about_unknown_selection() -> anyhow::Result<()> {
        let repo = setup_test_repo_with_initial_commit()?;
        let sandbox = TempDir::new()?;
        let config = write_config(sandbox.path(), vec![project("api", repo.path())])?;

        gover(sandbox.path(), &config)?
            .args(["list", "--project", "web"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Project web is not configured or is disabled"))
            .stdout(predicate::str::contains("[*]").not());

        Ok(())
    }

    #[test]
    fn test_configured_debug_enables_debug_logging() -> anyhow::Result<()> {
        let repo = setup_test_repo_with_initial_commit()?;
        let sandbox = TempDir::new()?;
        let config = sandbox.path().join("config.json");
        AppConfig {
            projects: vec![project("api", repo.path())],
            engine: EngineOptions {
                debug: true,
                ..local_options()
            },
        }
        .save(&config)?;

        gover(sandbox.path(), &config)?
            .arg("list")
            .assert()
            .success()
            .stdout(predicate::str::contains("Diagnostics"))
            .stderr(predicate::str::contains("DEBUG"));

        Ok(())
    }

    #[test]
    fn test_checkout_tag_then_branch() -> anyhow::Result<()> {
        let repo = create_tagged_repo_detached_at_v2()?;
        let sandbox = TempDir::new()?;
        let config = write_config(sandbox.path(), vec![project("api", repo.path())])?;

        gover(sandbox.path(), &config)?
            .args(["checkout", "--project", "api", "--tag", "v1.0.0"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Project api switched to tag v1.0.0"))
            .stdout(has_mode("tag v1.0.0"));
        assert_eq!(git(repo.path(), &["describe", "--exact-match", "--tags"])?, "v1.0.0");

        gover(sandbox.path(), &config)?
            .args(["checkout", "--project", "api", "--branch", "main"])
            .assert()
            .success()
            .stdout(has_mode("branch main"));
        assert_eq!(current_head(repo.path())?, "main");

        Ok(())
    }

    #[test]
    fn test_checkout_rejects_tag_and_branch_together() -> anyhow::Result<()> {
        let repo = setup_test_repo_with_initial_commit()?;
        let sandbox = TempDir::new()?;
        let config = write_config(sandbox.path(), vec![project("api", repo.path())])?;

        gover(sandbox.path(), &config)?
            .args(["checkout", "--project", "api", "--tag", "v1", "--branch", "main"])
            .assert()
            .failure()
            .code(1)
            .stdout(has_error())
            .stdout(invalid_request());

        Ok(())
    }

    #[test]
    fn test_checkout_unknown_project_fails() -> anyhow::Result<()> {
        let sandbox = TempDir::new()?;
        let config = write_config(sandbox.path(), Vec::new())?;

        gover(sandbox.path(), &config)?
            .args(["checkout", "--project", "nope", "--branch", "main"])
            .assert()
            .failure()
            .stdout(predicate::str::contains("project 'nope' does not exist"));

        Ok(())
    }

    #[test]
    fn test_refresh_json_reports_counts() -> anyhow::Result<()> {
        let repo = create_tagged_repo_detached_at_v2()?;
        let sandbox = TempDir::new()?;
        let config = write_config(sandbox.path(), vec![project("api", repo.path())])?;

        let output = gover(sandbox.path(), &config)?
            .args(["refresh", "--project", "api", "--json"])
            .output()?;
        assert!(output.status.success());

        let summary: serde_json::Value = serde_json::from_slice(&output.stdout)?;
        assert_eq!(summary["project"], "api");
        assert_eq!(summary["tags"], 3);
        assert_eq!(summary["branches"], 1);
        assert_eq!(summary["mode"], "tag");

        Ok(())
    }

    #[test]
    fn test_doctor_reports_each_project() -> anyhow::Result<()> {
        let repo = setup_test_repo_with_initial_commit()?;
        let plain = TempDir::new()?;
        let sandbox = TempDir::new()?;
        let config = write_config(
            sandbox.path(),
            vec![project("api", repo.path()), project("docs", plain.path())],
        )?;

        gover(sandbox.path(), &config)?
            .arg("doctor")
            .assert()
            .success()
            .stdout(predicate::str::contains("repository: valid"))
            .stdout(predicate::str::contains("no .git directory"));

        Ok(())
    }

    #[test]
    fn test_fix_git_skips_missing_paths() -> anyhow::Result<()> {
        let repo = setup_test_repo_with_initial_commit()?;
        let sandbox = TempDir::new()?;
        let missing = sandbox.path().join("missing");
        let config = write_config(
            sandbox.path(),
            vec![project("api", repo.path()), project("ghost", &missing)],
        )?;

        gover(sandbox.path(), &config)?
            .arg("fix-git")
            .assert()
            .success()
            .stdout(predicate::str::contains("path does not exist"))
            .stdout(predicate::str::contains("Repaired 1 project(s)"));

        let trusted = git(
            sandbox.path(),
            &["config", "--file", ".gitconfig", "--get-all", "safe.directory"],
        )?;
        assert_eq!(trusted, repo.path().display().to_string());

        Ok(())
    }

    #[test]
    fn test_missing_config_is_created() -> anyhow::Result<()> {
        let sandbox = TempDir::new()?;
        let config = sandbox.path().join("fresh").join("config.json");

        gover(sandbox.path(), &config)?
            .arg("list")
            .assert()
            .success()
            .stdout(predicate::str::contains("No enabled projects"));
        assert!(config.exists());

        Ok(())
    }
}
