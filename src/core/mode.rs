//! Working-mode detection.
//!
//! Probes, first match wins:
//! 1. symbolic name of HEAD (anything but the literal `HEAD`) → branch
//! 2. exact tag at HEAD → tag
//! 3. nearest reachable tag → detached
//! 4. otherwise → unknown
//!
//! A failing probe counts as "no match"; detection never returns an error.

use crate::core::git::GitCli;
use crate::core::state::ModeState;
use std::path::Path;

pub async fn detect_working_mode(git: &GitCli, path: &Path) -> ModeState {
    match git.run(path, &["rev-parse", "--abbrev-ref", "HEAD"]).await {
        Ok(name) if !name.is_empty() && name != "HEAD" => {
            log::debug!("{} is on branch {name}", path.display());
            return ModeState::branch(name);
        }
        Ok(_) => {}
        Err(e) => log::debug!("HEAD probe failed for {}: {e}", path.display()),
    }

    match git.run(path, &["describe", "--exact-match", "--tags"]).await {
        Ok(tag) if !tag.is_empty() => {
            log::debug!("{} is on tag {tag}", path.display());
            return ModeState::tag(tag);
        }
        Ok(_) => {}
        Err(e) => log::debug!("Exact tag probe failed for {}: {e}", path.display()),
    }

    match git.run(path, &["describe", "--tags"]).await {
        Ok(tag) if !tag.is_empty() => {
            log::debug!("{} is detached near tag {tag}", path.display());
            return ModeState::detached(tag);
        }
        Ok(_) => {}
        Err(e) => log::debug!("Nearest tag probe failed for {}: {e}", path.display()),
    }

    log::debug!("Could not determine working mode of {}", path.display());
    ModeState::unknown()
}
