//! Repository state engine.
//!
//! [`Engine`] ties the pieces together and exposes the three operations used by
//! the CLI: [`Engine::list`], [`Engine::checkout`] and [`Engine::refresh`].
//!
//! # Read path
//! A cache hit returns the stored snapshot. A miss returns a cheap summary
//! (working mode only) right away and schedules one background full rebuild for
//! that path on the engine's [`TaskTracker`].
//!
//! # Mutations
//! Checkouts and explicit refreshes hold a per-path lock, drop the cached entry
//! and rebuild it in full before returning, so the next read sees the new state.
//! Background rebuilds take the same lock, so they never interleave with a
//! checkout of the same repository.

use crate::core::cache::{ProjectCache, SnapshotStore};
use crate::core::checkout::{CheckoutExecutor, CheckoutTarget};
use crate::core::config::{AppConfig, EngineOptions, Project};
use crate::core::diagnose::validate_repository;
use crate::core::error::{GoverError, Result};
use crate::core::git::GitCli;
use crate::core::mode::detect_working_mode;
use crate::core::refs::RefEnumerator;
use crate::core::state::{ProjectSnapshot, WorkingMode};
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::SystemTime;
use tokio::sync::OwnedMutexGuard;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

/// Projects in configuration order plus the index of the current one.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectListing {
    pub projects: Vec<ProjectSnapshot>,
    pub current: Option<usize>,
}

impl ProjectListing {
    pub fn current_project(&self) -> Option<&ProjectSnapshot> {
        self.current.and_then(|index| self.projects.get(index))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckoutRequest {
    pub project: String,
    pub tag: Option<String>,
    pub branch: Option<String>,
}

impl CheckoutRequest {
    pub fn tag(project: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            tag: Some(tag.into()),
            branch: None,
        }
    }

    pub fn branch(project: impl Into<String>, branch: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            tag: None,
            branch: Some(branch.into()),
        }
    }

    /// Exactly one of tag or branch must be set; empty strings count as unset.
    pub fn target(&self) -> Result<CheckoutTarget> {
        let tag = self.tag.as_deref().filter(|tag| !tag.is_empty());
        let branch = self.branch.as_deref().filter(|branch| !branch.is_empty());

        let target = match (tag, branch) {
            (Some(tag), None) => CheckoutTarget::Tag(tag.to_string()),
            (None, Some(branch)) => CheckoutTarget::Branch(branch.to_string()),
            (Some(_), Some(_)) => {
                return Err(GoverError::invalid_request(
                    "a tag and a branch cannot be given together",
                ))
            }
            (None, None) => {
                return Err(GoverError::invalid_request("either a tag or a branch is required"))
            }
        };

        if self.project.is_empty() {
            return Err(GoverError::invalid_request("a project name is required"));
        }
        Ok(target)
    }
}

#[derive(Debug, Clone)]
pub struct CheckoutOutcome {
    pub message: String,
    pub snapshot: ProjectSnapshot,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RefreshSummary {
    pub project: String,
    pub tags: usize,
    pub branches: usize,
    pub mode: WorkingMode,
}

#[derive(Debug, Default)]
struct PathLocks {
    locks: Mutex<HashMap<PathBuf, Arc<tokio::sync::Mutex<()>>>>,
}

impl PathLocks {
    async fn lock(&self, path: &Path) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
            locks.entry(path.to_path_buf()).or_default().clone()
        };
        lock.lock_owned().await
    }
}

/// Clears the refresh flag when a background rebuild ends without storing.
struct RefreshGuard<'a> {
    cache: &'a ProjectCache,
    path: &'a Path,
    completed: bool,
}

impl Drop for RefreshGuard<'_> {
    fn drop(&mut self) {
        if !self.completed {
            self.cache.mark_refreshing(self.path, false);
        }
    }
}

struct Inner {
    options: EngineOptions,
    projects: Vec<Project>,
    git: GitCli,
    cache: ProjectCache,
    store: Option<SnapshotStore>,
    locks: PathLocks,
    tracker: TaskTracker,
    shutdown: CancellationToken,
    refreshes_started: AtomicUsize,
}

#[derive(Clone)]
pub struct Engine {
    inner: Arc<Inner>,
}

impl Engine {
    /// Build an engine over the enabled entries of `projects`.
    ///
    /// With a `store`, previously persisted snapshots are loaded with their
    /// original timestamps.
    pub fn new(
        options: EngineOptions,
        projects: Vec<Project>,
        store: Option<SnapshotStore>,
    ) -> Self {
        let shutdown = CancellationToken::new();
        let git = GitCli::new(&options.git_binary).with_cancellation(shutdown.clone());
        let cache = ProjectCache::new(options.cache_ttl());
        let projects: Vec<Project> = projects.into_iter().filter(|p| p.enabled).collect();

        if let Some(store) = &store {
            restore_snapshots(&cache, store, &projects);
        }

        Self {
            inner: Arc::new(Inner {
                options,
                projects,
                git,
                cache,
                store,
                locks: PathLocks::default(),
                tracker: TaskTracker::new(),
                shutdown,
                refreshes_started: AtomicUsize::new(0),
            }),
        }
    }

    /// Engine for a loaded configuration, persisting to the platform cache directory.
    pub fn from_config(config: &AppConfig) -> Self {
        let store = match SnapshotStore::default_location() {
            Ok(store) => Some(store),
            Err(e) => {
                log::warn!("Snapshot persistence disabled: {e}");
                None
            }
        };
        Self::new(config.engine.clone(), config.projects.clone(), store)
    }

    pub fn options(&self) -> &EngineOptions {
        &self.inner.options
    }

    pub fn projects(&self) -> &[Project] {
        &self.inner.projects
    }

    pub fn git(&self) -> &GitCli {
        &self.inner.git
    }

    pub fn cache(&self) -> &ProjectCache {
        &self.inner.cache
    }

    /// Number of background refreshes started since the engine was built.
    pub fn background_refreshes(&self) -> usize {
        self.inner.refreshes_started.load(Ordering::SeqCst)
    }

    pub fn project(&self, name: &str) -> Result<&Project> {
        self.inner
            .projects
            .iter()
            .find(|p| p.name == name)
            .ok_or_else(|| GoverError::unknown_project(name))
    }

    /// Snapshot of every enabled project; `selected` (or the first project when
    /// none is selected) is marked current.
    pub async fn list(&self, selected: Option<&str>) -> ProjectListing {
        let selected = selected.filter(|name| !name.is_empty());
        let mut listing = ProjectListing {
            projects: Vec::with_capacity(self.inner.projects.len()),
            current: None,
        };

        for (index, project) in self.inner.projects.iter().enumerate() {
            let mut snapshot = self.read(project).await;

            let is_current = match selected {
                Some(name) => project.name == name,
                None => index == 0,
            };
            snapshot.current = is_current;
            if is_current && listing.current.is_none() {
                listing.current = Some(index);
            }
            listing.projects.push(snapshot);
        }

        listing
    }

    /// Cached or summary snapshot of one project, scheduling a refresh on a miss.
    pub async fn snapshot(&self, name: &str) -> Result<ProjectSnapshot> {
        let project = self.project(name)?;
        Ok(self.read(project).await)
    }

    pub async fn checkout(&self, request: CheckoutRequest) -> Result<CheckoutOutcome> {
        let target = request.target()?;
        let project = self.project(&request.project)?.clone();

        let _guard = self.inner.locks.lock(&project.path).await;

        validate_repository(&project.path)
            .map_err(|e| GoverError::checkout_failed(&project.name, target.to_string(), e))?;

        CheckoutExecutor::new(&self.inner.git, self.inner.options.skip_fetch)
            .checkout(&project.path, &target)
            .await
            .map_err(|e| GoverError::checkout_failed(&project.name, target.to_string(), e))?;

        self.inner.cache.invalidate(&project.path);
        let snapshot = self.build_full(&project).await;
        self.store(&project.path, &snapshot);

        let message = format!("Project {} switched to {target}", project.name);
        log::info!("{message}");
        Ok(CheckoutOutcome { message, snapshot })
    }

    /// Drop and rebuild one project's entry in full.
    pub async fn refresh(&self, name: &str) -> Result<RefreshSummary> {
        let project = self.project(name)?.clone();

        let _guard = self.inner.locks.lock(&project.path).await;
        self.inner.cache.invalidate(&project.path);
        let snapshot = self.build_full(&project).await;
        self.store(&project.path, &snapshot);

        Ok(RefreshSummary {
            project: project.name,
            tags: snapshot.tags.len(),
            branches: snapshot.branches.len(),
            mode: snapshot.working_mode,
        })
    }

    /// Stop accepting background work. With `wait`, in-flight refreshes run to
    /// completion; otherwise their subprocesses are killed first.
    pub async fn shutdown(&self, wait: bool) {
        self.inner.tracker.close();
        if !wait {
            self.inner.shutdown.cancel();
        }
        self.inner.tracker.wait().await;
    }

    async fn read(&self, project: &Project) -> ProjectSnapshot {
        if let Some(snapshot) = self.inner.cache.get(&project.path) {
            log::debug!("Project {} served from cache", project.name);
            return snapshot;
        }

        let summary = self.build_summary(project).await;
        if self.spawn_refresh(project) {
            log::debug!("Project {} summarised, full refresh scheduled", project.name);
        }
        summary
    }

    /// Schedule a background full rebuild unless one is already running.
    fn spawn_refresh(&self, project: &Project) -> bool {
        if !self.inner.cache.try_begin_refresh(&project.path) {
            return false;
        }
        self.inner.refreshes_started.fetch_add(1, Ordering::SeqCst);

        let engine = self.clone();
        let project = project.clone();
        self.inner.tracker.spawn(async move {
            let inner = &engine.inner;
            let mut guard = RefreshGuard {
                cache: &inner.cache,
                path: &project.path,
                completed: false,
            };

            let _lock = inner.locks.lock(&project.path).await;
            let snapshot = engine.build_full(&project).await;
            if inner.shutdown.is_cancelled() {
                log::debug!("Discarding refresh of {} after shutdown", project.name);
                return;
            }

            engine.store(&project.path, &snapshot);
            guard.completed = true;
            log::debug!("Background refresh of {} finished", project.name);
        });
        true
    }

    async fn build_summary(&self, project: &Project) -> ProjectSnapshot {
        let state = detect_working_mode(&self.inner.git, &project.path).await;
        let description = format!("Git project ({}){}", state.mode, state.describe_current());

        ProjectSnapshot {
            name: project.name.clone(),
            path: project.path.clone(),
            description,
            current_branch: state.branch,
            current_tag: state.tag,
            working_mode: state.mode,
            ..ProjectSnapshot::default()
        }
    }

    async fn build_full(&self, project: &Project) -> ProjectSnapshot {
        let mut snapshot = ProjectSnapshot {
            name: project.name.clone(),
            path: project.path.clone(),
            description: project.description.clone(),
            ..ProjectSnapshot::default()
        };

        if let Err(e) = validate_repository(&project.path) {
            log::warn!("Project {}: {e}", project.name);
            return snapshot;
        }

        let state = detect_working_mode(&self.inner.git, &project.path).await;
        let enumerator = RefEnumerator::new(&self.inner.git, self.inner.options.enumeration());

        snapshot.tags = enumerator
            .list_tags(&project.path, &state)
            .await
            .unwrap_or_else(|e| {
                log::warn!("Could not list tags of {}: {e}", project.name);
                Vec::new()
            });
        snapshot.branches = enumerator
            .list_branches(&project.path, &state)
            .await
            .unwrap_or_else(|e| {
                log::warn!("Could not list branches of {}: {e}", project.name);
                Vec::new()
            });

        if !snapshot.tags.is_empty() || !snapshot.branches.is_empty() {
            snapshot.description = format!(
                "Git project, {} tags, {} branches{}",
                snapshot.tags.len(),
                snapshot.branches.len(),
                state.describe_current()
            );
        }

        snapshot.current_branch = state.branch;
        snapshot.current_tag = state.tag;
        snapshot.working_mode = state.mode;
        snapshot
    }

    fn store(&self, path: &Path, snapshot: &ProjectSnapshot) {
        let now = SystemTime::now();
        self.inner.cache.put_at(path, snapshot.clone(), now);

        if let Some(store) = &self.inner.store {
            if let Err(e) = store.save(path, snapshot, now) {
                log::warn!("Could not persist snapshot of {}: {e}", path.display());
            }
        }
    }
}

fn restore_snapshots(cache: &ProjectCache, store: &SnapshotStore, projects: &[Project]) {
    for project in projects {
        match store.load(&project.path) {
            Ok(Some((mut snapshot, updated_at))) => {
                snapshot.name = project.name.clone();
                snapshot.current = false;
                cache.put_at(&project.path, snapshot, updated_at);
                log::debug!("Restored cached snapshot of {}", project.name);
            }
            Ok(None) => {}
            Err(e) => log::warn!("Ignoring cached snapshot of {}: {e}", project.name),
        }
    }
}
