//! Publishing updated news files to the remote repository.
//!
//! A run publishes at most once: every rewritten history file from every feed
//! goes into a single commit, which is then pushed to a fixed branch. Nothing
//! is rolled back when a step fails: the files stay written locally, and they
//! reach the remote only through a manual push or a later run in which the
//! same feed changes again.
//!
//! # Steps
//!
//! | Step | Command |
//! |------|---------|
//! | protect list | create `.gitignore` if missing |
//! | stage | `git add -- <files> .gitignore` |
//! | commit | `git commit -m "Auto-update: <label> news <YYYY-MM-DD HH:MM>"` |
//! | push | `git push <remote> <branch>:<branch>` |

use crate::config::Config;
use crate::error::SyncError;
use crate::utils::{relative_to_repo, truncate_for_log};
use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::process::Command;
use tracing::{debug, info, instrument, warn};

/// File that keeps credentials and build clutter out of the repository.
pub const PROTECT_LIST_FILE: &str = ".gitignore";

/// Content written when the protect list does not exist yet.
pub const DEFAULT_PROTECT_LIST: &str = ".env\n__pycache__/\n*.pyc\n/target/\n";

/// Result of the publish step for one run.
#[derive(Debug)]
pub enum PublishOutcome {
    /// No file changed, nothing was attempted.
    Skipped,
    /// Publishing was turned off for this run.
    Disabled,
    /// One commit containing these files was pushed.
    Published { files: Vec<PathBuf> },
    /// Staging, commit or push failed. Local files remain updated.
    Failed(SyncError),
}

/// Something that can commit and push a set of files.
pub trait Publish {
    /// Stage `files` (repo-relative), commit them with `message` and push.
    async fn publish(&self, files: &[PathBuf], message: &str) -> Result<(), SyncError>;
}

/// Publisher backed by the `git` command line.
#[derive(Debug, Clone)]
pub struct GitPublisher {
    repo: PathBuf,
    remote: String,
    branch: String,
}

impl GitPublisher {
    pub fn new(repo: impl Into<PathBuf>, remote: impl Into<String>, branch: impl Into<String>) -> Self {
        Self {
            repo: repo.into(),
            remote: remote.into(),
            branch: branch.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.repo_path, &config.remote, &config.branch)
    }

    fn refspec(&self) -> String {
        format!("{0}:{0}", self.branch)
    }

    #[instrument(level = "debug", skip(self))]
    async fn git(&self, args: &[&str]) -> Result<String, SyncError> {
        let output = Command::new("git")
            .args(args)
            .current_dir(&self.repo)
            .output()
            .await
            .map_err(|e| SyncError::Publish(format!("failed to run git: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stdout = String::from_utf8_lossy(&output.stdout);
            let detail = if stderr.trim().is_empty() { stdout } else { stderr };
            return Err(SyncError::Publish(format!(
                "git {} failed ({}): {}",
                args.first().copied().unwrap_or_default(),
                output.status,
                truncate_for_log(detail.trim(), 500)
            )));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl Publish for GitPublisher {
    #[instrument(level = "info", skip_all, fields(repo = %self.repo.display(), files = files.len()))]
    async fn publish(&self, files: &[PathBuf], message: &str) -> Result<(), SyncError> {
        let mut add: Vec<String> = vec!["add".into(), "--".into()];
        add.extend(files.iter().map(|f| f.to_string_lossy().into_owned()));
        let add_refs: Vec<&str> = add.iter().map(String::as_str).collect();
        self.git(&add_refs).await?;
        debug!("Staged files");

        self.git(&["commit", "-m", message]).await?;
        info!(%message, "Created commit");

        let refspec = self.refspec();
        self.git(&["push", self.remote.as_str(), refspec.as_str()]).await?;
        info!(remote = %self.remote, branch = %self.branch, "Pushed commit");
        Ok(())
    }
}

/// Commit message for a run finishing at `now`.
pub fn commit_message(label: &str, now: DateTime<Local>) -> String {
    format!("Auto-update: {label} news {}", now.format("%Y-%m-%d %H:%M"))
}

/// Create the protect list with default content if it is missing.
///
/// Returns `true` when the file was created.
#[instrument(level = "info", skip_all, fields(repo = %repo.display()))]
pub async fn ensure_protect_list(repo: &Path) -> Result<bool, SyncError> {
    let path = repo.join(PROTECT_LIST_FILE);
    if fs::try_exists(&path).await? {
        return Ok(false);
    }
    fs::write(&path, DEFAULT_PROTECT_LIST).await?;
    info!(path = %path.display(), "Created protect list");
    Ok(true)
}

/// Publish every file rewritten this run in one commit.
///
/// An empty `updated` list returns [`PublishOutcome::Skipped`] without
/// touching the repository.
#[instrument(level = "info", skip_all, fields(files = updated.len()))]
pub async fn publish_updates<P: Publish>(
    publisher: &P,
    repo: &Path,
    updated: &[PathBuf],
    label: &str,
) -> PublishOutcome {
    if updated.is_empty() {
        info!("No files updated; skipping publish");
        return PublishOutcome::Skipped;
    }

    if let Err(e) = ensure_protect_list(repo).await {
        warn!(error = %e, kind = %e.kind(), "Could not create protect list");
        return PublishOutcome::Failed(SyncError::Publish(format!("protect list: {e}")));
    }

    let mut files: Vec<PathBuf> = updated.iter().map(|p| relative_to_repo(repo, p)).collect();
    files.push(PathBuf::from(PROTECT_LIST_FILE));

    let message = commit_message(label, Local::now());
    match publisher.publish(&files, &message).await {
        Ok(()) => {
            info!(%message, "Successfully published update");
            PublishOutcome::Published {
                files: updated.to_vec(),
            }
        }
        Err(e) => {
            warn!(error = %e, kind = %e.kind(), "Publish failed; local files remain updated");
            PublishOutcome::Failed(e)
        }
    }
}
