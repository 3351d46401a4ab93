//! Git adapter for the provisioning pipeline.
//!
//! [`Vcs`] is the seam the orchestrator talks to; [`GitCli`] implements it
//! with a small, explicit wrapper around `git` subprocess calls.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use anyhow::{Context, Result, anyhow};
use tracing::{debug, instrument};

/// Remote name registered for new projects.
pub const REMOTE_NAME: &str = "origin";

/// Local version-control operations needed to provision a project.
pub trait Vcs {
    /// Initialize a repository at `path`. Returns git's summary line.
    fn init_repository(&self, path: &Path) -> Result<String>;

    /// Read `user.<key>` from git config. An unset key is `Ok(None)`.
    fn user_config_value(&self, key: &str) -> Result<Option<String>>;

    /// Stage everything under `path` and commit. Returns the new short SHA.
    fn commit(&self, path: &Path, message: &str) -> Result<String>;

    /// Register `url` as the `origin` remote.
    fn add_remote(&self, path: &Path, url: &str) -> Result<()>;

    /// Push the current branch to `origin`, setting upstream.
    fn push(&self, path: &Path) -> Result<()>;
}

/// Wrapper for executing git commands in a working directory.
#[derive(Debug, Clone)]
pub struct Git {
    workdir: PathBuf,
    envs: Vec<(OsString, OsString)>,
}

impl Git {
    pub fn new(workdir: impl Into<PathBuf>) -> Self {
        Self {
            workdir: workdir.into(),
            envs: Vec::new(),
        }
    }

    /// Set an environment variable on every git invocation.
    pub fn with_env(mut self, key: impl Into<OsString>, value: impl Into<OsString>) -> Self {
        self.envs.push((key.into(), value.into()));
        self
    }

    pub fn init(&self) -> Result<String> {
        let out = self.run_capture(&["init"])?;
        Ok(out.trim().to_string())
    }

    /// Read a config value; `Ok(None)` when the key is unset.
    pub fn config_get(&self, key: &str) -> Result<Option<String>> {
        let output = self.run(&["config", "--get", key])?;
        if output.status.success() {
            let value = String::from_utf8_lossy(&output.stdout).trim().to_string();
            return Ok((!value.is_empty()).then_some(value));
        }
        // `git config --get` exits 1 when the key is not set.
        if output.status.code() == Some(1) {
            return Ok(None);
        }
        let stderr = String::from_utf8_lossy(&output.stderr);
        Err(anyhow!("git config --get {key} failed: {}", stderr.trim()))
    }

    /// Stage all changes (respects .gitignore).
    pub fn add_all(&self) -> Result<()> {
        self.run_checked(&["add", "-A"])?;
        Ok(())
    }

    /// True if there is anything staged for commit.
    pub fn has_staged_changes(&self) -> Result<bool> {
        let out = self.run(&["diff", "--cached", "--name-only"])?;
        Ok(!String::from_utf8_lossy(&out.stdout).trim().is_empty())
    }

    /// Commit staged changes; an empty commit is created when nothing is staged.
    #[instrument(skip_all)]
    pub fn commit_staged(&self, message: &str) -> Result<()> {
        if self.has_staged_changes()? {
            debug!("committing staged changes");
            self.run_checked(&["commit", "-m", message])?;
        } else {
            debug!("nothing staged, creating empty commit");
            self.run_checked(&["commit", "--allow-empty", "-m", message])?;
        }
        Ok(())
    }

    /// Return the current HEAD short SHA.
    pub fn head_short_sha(&self, len: usize) -> Result<String> {
        let arg = format!("--short={len}");
        let out = self.run_capture(&["rev-parse", &arg, "HEAD"])?;
        Ok(out.trim().to_string())
    }

    /// Number of commits reachable from HEAD.
    pub fn commit_count(&self) -> Result<usize> {
        let out = self.run_capture(&["rev-list", "--count", "HEAD"])?;
        out.trim()
            .parse()
            .with_context(|| format!("parse commit count '{}'", out.trim()))
    }

    pub fn remote_add(&self, name: &str, url: &str) -> Result<()> {
        self.run_checked(&["remote", "add", name, url])?;
        Ok(())
    }

    /// URL of remote `name`, if configured.
    pub fn remote_url(&self, name: &str) -> Result<Option<String>> {
        self.config_get(&format!("remote.{name}.url"))
    }

    pub fn push_upstream(&self, remote: &str) -> Result<()> {
        self.run_checked(&["push", "--set-upstream", remote, "HEAD"])?;
        Ok(())
    }

    fn run_capture(&self, args: &[&str]) -> Result<String> {
        let output = self.run_checked(args)?;
        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }

    fn run_checked(&self, args: &[&str]) -> Result<Output> {
        let output = self.run(args)?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(anyhow!("git {} failed: {}", args.join(" "), stderr.trim()));
        }
        Ok(output)
    }

    fn run(&self, args: &[&str]) -> Result<Output> {
        debug!(workdir = %self.workdir.display(), args = ?args, "git");
        Command::new("git")
            .args(args)
            .envs(self.envs.iter().map(|(k, v)| (k, v)))
            .current_dir(&self.workdir)
            .output()
            .with_context(|| format!("spawn git {}", args.join(" ")))
    }
}

/// [`Vcs`] backed by the `git` executable.
#[derive(Debug, Clone)]
pub struct GitCli {
    config_dir: PathBuf,
    envs: Vec<(OsString, OsString)>,
}

impl Default for GitCli {
    fn default() -> Self {
        Self::new()
    }
}

impl GitCli {
    /// Git CLI reading user config from the current directory's view.
    pub fn new() -> Self {
        Self {
            config_dir: PathBuf::from("."),
            envs: Vec::new(),
        }
    }

    /// Read user config as seen from `dir` (repository-local config applies).
    pub fn with_config_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config_dir = dir.into();
        self
    }

    /// Set an environment variable on every git invocation.
    pub fn with_env(mut self, key: impl Into<OsString>, value: impl Into<OsString>) -> Self {
        self.envs.push((key.into(), value.into()));
        self
    }

    fn git(&self, workdir: &Path) -> Git {
        self.envs
            .iter()
            .fold(Git::new(workdir), |git, (k, v)| git.with_env(k, v))
    }
}

impl Vcs for GitCli {
    #[instrument(skip_all, fields(path = %path.display()))]
    fn init_repository(&self, path: &Path) -> Result<String> {
        self.git(path).init()
    }

    fn user_config_value(&self, key: &str) -> Result<Option<String>> {
        self.git(&self.config_dir).config_get(&format!("user.{key}"))
    }

    #[instrument(skip_all, fields(path = %path.display()))]
    fn commit(&self, path: &Path, message: &str) -> Result<String> {
        let git = self.git(path);
        git.add_all()?;
        git.commit_staged(message)?;
        git.head_short_sha(8)
    }

    #[instrument(skip_all, fields(path = %path.display(), url))]
    fn add_remote(&self, path: &Path, url: &str) -> Result<()> {
        self.git(path).remote_add(REMOTE_NAME, url)
    }

    #[instrument(skip_all, fields(path = %path.display()))]
    fn push(&self, path: &Path) -> Result<()> {
        self.git(path).push_upstream(REMOTE_NAME)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::isolated_git;

    #[test]
    fn init_commit_and_remote_round_trip() {
        let temp = tempfile::tempdir().expect("tempdir");
        let repo = temp.path().join("repo");
        std::fs::create_dir_all(&repo).expect("mkdir");
        std::fs::write(repo.join("README.md"), "# demo\n").expect("write");
        let vcs = isolated_git(temp.path());

        vcs.init_repository(&repo).expect("init");
        assert!(repo.join(".git").is_dir());

        let sha = vcs.commit(&repo, "Initial commit").expect("commit");
        assert_eq!(sha.len(), 8);
        let git = vcs.git(&repo);
        assert_eq!(git.commit_count().expect("count"), 1);

        vcs.add_remote(&repo, "git@example.com:me/demo.git")
            .expect("remote");
        assert_eq!(
            git.remote_url(REMOTE_NAME).expect("url").as_deref(),
            Some("git@example.com:me/demo.git")
        );
    }

    #[test]
    fn commit_without_changes_creates_empty_commit() {
        let temp = tempfile::tempdir().expect("tempdir");
        let repo = temp.path().join("empty");
        std::fs::create_dir_all(&repo).expect("mkdir");
        let vcs = isolated_git(temp.path());

        vcs.init_repository(&repo).expect("init");
        vcs.commit(&repo, "Initial commit").expect("commit");
        assert_eq!(vcs.git(&repo).commit_count().expect("count"), 1);
    }

    #[test]
    fn unset_user_config_is_none_not_error() {
        let temp = tempfile::tempdir().expect("tempdir");
        let vcs = isolated_git(temp.path()).with_config_dir(temp.path());

        assert_eq!(vcs.user_config_value("signingkey").expect("lookup"), None);
    }

    #[test]
    fn commit_outside_repository_fails() {
        let temp = tempfile::tempdir().expect("tempdir");
        let vcs = isolated_git(temp.path());
        let err = vcs.commit(temp.path(), "msg").unwrap_err();
        assert!(format!("{err:#}").contains("git add -A failed"));
    }
}
