//! Scripted collaborators and fixtures for tests.
//!
//! Compiled for unit tests and, through the `test-support` feature, for the
//! integration tests under `tests/`.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Result, anyhow};
use serde_json::Value;
use tempfile::TempDir;

use crate::core::projection::{Source, project, to_source};
use crate::core::types::{Credential, RemoteRepository};
use crate::io::git::{GitCli, Vcs};
use crate::io::github::{NewRepository, RemoteApiError, RemoteRepositories};
use crate::io::questionnaire::{Answers, Choices, ManualRemote, Questionnaire};
use crate::io::settings::{ConfigStore, InstallPaths, SETTINGS_FILE_NAME};

pub const TEST_AUTHOR_NAME: &str = "Test Author";
pub const TEST_AUTHOR_EMAIL: &str = "author@example.com";

/// A [`GitCli`] that ignores the user's and the system's git configuration.
///
/// Writes a private global config under `root` with a fixed identity and
/// `main` as the initial branch.
pub fn isolated_git(root: &Path) -> GitCli {
    let config = root.join(".gitconfig-test");
    let contents = format!(
        "[user]\n\tname = {TEST_AUTHOR_NAME}\n\temail = {TEST_AUTHOR_EMAIL}\n\
         [init]\n\tdefaultBranch = main\n\
         [commit]\n\tgpgsign = false\n"
    );
    fs::write(&config, contents).expect("write test git config");
    GitCli::new()
        .with_config_dir(root)
        .with_env("GIT_CONFIG_GLOBAL", &config)
        .with_env("GIT_CONFIG_NOSYSTEM", "1")
        .with_env("GIT_CEILING_DIRECTORIES", root)
        .with_env("GIT_TERMINAL_PROMPT", "0")
}

/// Temporary install root with a `basic` template, licenses and settings
/// locations, plus a directory for new projects.
pub struct TestWorkspace {
    temp: TempDir,
}

impl Default for TestWorkspace {
    fn default() -> Self {
        Self::new()
    }
}

impl TestWorkspace {
    pub fn new() -> Self {
        let temp = tempfile::tempdir().expect("tempdir");
        let ws = Self { temp };
        ws.write_template(
            "basic",
            &[
                (
                    "package.json",
                    "{\n  \"name\": \"PROJECT_NAME\",\n  \"version\": \"PROJECT_VERSION\",\n  \"license\": \"PROJECT_LICENSE\"\n}\n",
                ),
                ("README.md", "# PROJECT_NAME\n\nPROJECT_DESCRIPTION\n"),
                ("src/index.js", "// PROJECT_NAME by PROJECT_AUTHOR_NAME\n"),
            ],
        );
        ws.write_license("MIT", "Copyright (c) PROJECT_YEAR PROJECT_AUTHOR_NAME\n");
        ws.write_license("ISC", "ISC License\n\nCopyright PROJECT_YEAR PROJECT_AUTHOR_NAME\n");
        fs::create_dir_all(ws.root().join("projects")).expect("mkdir projects");
        ws
    }

    pub fn root(&self) -> &Path {
        self.temp.path()
    }

    pub fn paths(&self) -> InstallPaths {
        InstallPaths::new(
            &self.root().join("install"),
            self.root().join("cwd").join(SETTINGS_FILE_NAME),
            self.root().join("config").join(SETTINGS_FILE_NAME),
        )
    }

    /// A fresh store over this workspace (built-in defaults, nothing loaded).
    pub fn store(&self) -> ConfigStore {
        ConfigStore::new(self.paths())
    }

    /// The settings file a fresh store resolves to.
    pub fn settings_path(&self) -> PathBuf {
        self.paths().global_settings
    }

    /// Destination for a new project (not created).
    pub fn dest(&self, name: &str) -> PathBuf {
        self.root().join("projects").join(name)
    }

    pub fn write_template(&self, name: &str, files: &[(&str, &str)]) {
        let dir = self.paths().templates.join(name);
        for (rel, contents) in files {
            let path = dir.join(rel);
            fs::create_dir_all(path.parent().expect("parent")).expect("mkdir template");
            fs::write(&path, contents).expect("write template file");
        }
    }

    pub fn write_license(&self, id: &str, text: &str) {
        let dir = self.paths().licenses;
        fs::create_dir_all(&dir).expect("mkdir licenses");
        fs::write(dir.join(id), text).expect("write license");
    }
}

/// [`Questionnaire`] that answers from a script.
///
/// Project details accept the offered defaults, overlaid with the JSON given
/// to [`ScriptedQuestionnaire::answer`]. Empty GitHub answers keep the
/// offered default, like pressing enter on the terminal.
#[derive(Default)]
pub struct ScriptedQuestionnaire {
    overrides: Source,
    manual: ManualRemote,
    identity: String,
    secret: String,
    confirm_update: bool,
    asked: RefCell<Vec<String>>,
    seen_defaults: RefCell<Option<Answers>>,
}

impl ScriptedQuestionnaire {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overlay these camelCase fields on the offered defaults.
    pub fn answer(mut self, overrides: Value) -> Self {
        self.overrides = to_source(&overrides);
        self
    }

    pub fn with_manual_remote(mut self, ssh_url: &str, issue_tracker: &str) -> Self {
        self.manual = ManualRemote {
            ssh_url: ssh_url.to_string(),
            issue_tracker: issue_tracker.to_string(),
        };
        self
    }

    pub fn with_github(mut self, identity: &str, secret: &str, confirm_update: bool) -> Self {
        self.identity = identity.to_string();
        self.secret = secret.to_string();
        self.confirm_update = confirm_update;
        self
    }

    /// Names of the questionnaire methods called, in order.
    pub fn asked(&self) -> Vec<String> {
        self.asked.borrow().clone()
    }

    /// Defaults offered to the last `project_details` call.
    pub fn details_defaults(&self) -> Option<Answers> {
        self.seen_defaults.borrow().clone()
    }

    fn ask(&self, what: &str) {
        self.asked.borrow_mut().push(what.to_string());
    }
}

impl Questionnaire for ScriptedQuestionnaire {
    fn project_details(&self, defaults: &Answers, _choices: &Choices<'_>) -> Result<Answers> {
        self.ask("project_details");
        *self.seen_defaults.borrow_mut() = Some(defaults.clone());
        let mut answers = defaults.clone();
        project(&mut answers, &[&self.overrides]);
        Ok(answers)
    }

    fn manual_remote(&self) -> Result<ManualRemote> {
        self.ask("manual_remote");
        Ok(self.manual.clone())
    }

    fn github_identity(&self, default: &str) -> Result<String> {
        self.ask("github_identity");
        Ok(or_default(&self.identity, default))
    }

    fn github_secret(&self, _identity: &str, default: &str) -> Result<String> {
        self.ask("github_secret");
        Ok(or_default(&self.secret, default))
    }

    fn confirm_token_update(&self) -> Result<bool> {
        self.ask("confirm_token_update");
        Ok(self.confirm_update)
    }
}

fn or_default(value: &str, default: &str) -> String {
    let chosen = if value.is_empty() { default } else { value };
    chosen.to_string()
}

/// [`Vcs`] that records calls and can be told to fail one operation.
///
/// Operations are recorded as `init`, `commit <message>`,
/// `add_remote <url>` and `push`. Git config lookups are not recorded.
#[derive(Default)]
pub struct ScriptedVcs {
    fail_on: Option<&'static str>,
    user: BTreeMap<String, String>,
    calls: RefCell<Vec<String>>,
}

impl ScriptedVcs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the operation named `op` (`init`, `commit`, `add_remote`, `push`).
    pub fn failing_on(mut self, op: &'static str) -> Self {
        self.fail_on = Some(op);
        self
    }

    pub fn with_user(mut self, key: &str, value: &str) -> Self {
        self.user.insert(key.to_string(), value.to_string());
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    fn record(&self, op: &'static str, detail: Option<&str>) -> Result<()> {
        let entry = match detail {
            Some(detail) => format!("{op} {detail}"),
            None => op.to_string(),
        };
        self.calls.borrow_mut().push(entry);
        if self.fail_on == Some(op) {
            return Err(anyhow!("scripted {op} failure"));
        }
        Ok(())
    }
}

impl Vcs for ScriptedVcs {
    fn init_repository(&self, path: &Path) -> Result<String> {
        self.record("init", None)?;
        Ok(format!(
            "Initialized empty Git repository in {}",
            path.join(".git").display()
        ))
    }

    fn user_config_value(&self, key: &str) -> Result<Option<String>> {
        Ok(self.user.get(key).cloned())
    }

    fn commit(&self, _path: &Path, message: &str) -> Result<String> {
        self.record("commit", Some(message))?;
        Ok("0123abcd".to_string())
    }

    fn add_remote(&self, _path: &Path, url: &str) -> Result<()> {
        self.record("add_remote", Some(url))
    }

    fn push(&self, _path: &Path) -> Result<()> {
        self.record("push", None)
    }
}

/// [`RemoteRepositories`] returning a fixed repository or a fixed rejection.
pub struct ScriptedRemote {
    response: std::result::Result<RemoteRepository, (u16, String)>,
    requests: RefCell<Vec<NewRepository>>,
}

impl ScriptedRemote {
    pub fn created(repo: RemoteRepository) -> Self {
        Self {
            response: Ok(repo),
            requests: RefCell::new(Vec::new()),
        }
    }

    pub fn rejecting(status: u16, body: &str) -> Self {
        Self {
            response: Err((status, body.to_string())),
            requests: RefCell::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<NewRepository> {
        self.requests.borrow().clone()
    }
}

impl RemoteRepositories for ScriptedRemote {
    fn create_repository(
        &self,
        request: &NewRepository,
        _credential: &Credential,
    ) -> std::result::Result<RemoteRepository, RemoteApiError> {
        self.requests.borrow_mut().push(request.clone());
        match &self.response {
            Ok(repo) => Ok(repo.clone()),
            Err((status, body)) => Err(RemoteApiError::Status {
                status: *status,
                body: body.clone(),
            }),
        }
    }

    fn delete_repository(
        &self,
        _name: &str,
        _owner: &str,
        _credential: &Credential,
    ) -> std::result::Result<(), RemoteApiError> {
        Ok(())
    }
}
