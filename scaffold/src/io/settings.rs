//! Persistent scaffolder settings (`scaffold-settings.json`).
//!
//! One [`ConfigStore`] is built at process start from built-in defaults,
//! overlaid with the settings file, and passed by reference to the code that
//! needs it. Every save rewrites the whole document.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::core::messages::{Locale, Message};
use crate::core::projection::{Settingable, Source, assign_field, project, to_source};
use crate::core::types::Credential;
use crate::error::ScaffoldError;
use crate::io::files::write_json_atomic;

/// File name of both the project-local and the global settings file.
pub const SETTINGS_FILE_NAME: &str = "scaffold-settings.json";

/// Environment variable overriding the install root (templates, licenses).
pub const HOME_ENV: &str = "SCAFFOLD_HOME";

/// Fixed filesystem locations used by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallPaths {
    pub templates: PathBuf,
    pub licenses: PathBuf,
    pub local_settings: PathBuf,
    pub global_settings: PathBuf,
}

impl InstallPaths {
    /// Lay out paths below an install root.
    pub fn new(
        install_root: &Path,
        local_settings: impl Into<PathBuf>,
        global_settings: impl Into<PathBuf>,
    ) -> Self {
        let templates = install_root.join("templates");
        Self {
            licenses: templates.join("licenses"),
            templates,
            local_settings: local_settings.into(),
            global_settings: global_settings.into(),
        }
    }

    /// Locate the install root (`SCAFFOLD_HOME`, else the crate directory),
    /// the local settings file in the working directory and the global one in
    /// the platform config directory.
    pub fn discover() -> Result<Self> {
        let install_root = std::env::var_os(HOME_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(env!("CARGO_MANIFEST_DIR")));
        let cwd = std::env::current_dir().context("read current directory")?;
        let global_dir = dirs::config_dir()
            .map(|dir| dir.join("scaffold"))
            .unwrap_or_else(|| install_root.clone());
        Ok(Self::new(
            &install_root,
            cwd.join(SETTINGS_FILE_NAME),
            global_dir.join(SETTINGS_FILE_NAME),
        ))
    }
}

/// Built-in defaults. Never loaded from disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Defaults {
    pub template: String,
    pub description: String,
    pub version: String,
    pub license: String,
    pub commit_message: String,
    pub keywords: Vec<String>,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            template: "basic".to_string(),
            description: String::new(),
            version: "0.1.0".to_string(),
            license: "MIT".to_string(),
            commit_message: "Initial commit".to_string(),
            keywords: Vec::new(),
        }
    }
}

/// The persisted part of the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub lint_packages: Vec<String>,
    pub testing_packages: Vec<String>,
    pub licenses: Vec<String>,
    pub templates: Vec<String>,
    pub credentials: Vec<Credential>,
    pub use_yarn: bool,
    pub website: String,
    pub template: String,
    pub description: String,
    pub version: String,
    pub license: String,
    pub commit_message: String,
    pub locale: String,
}

impl Settings {
    fn from_defaults(defaults: &Defaults) -> Self {
        Self {
            lint_packages: strings(&["eslint", "prettier"]),
            testing_packages: strings(&["jest", "mocha", "chai", "ava"]),
            licenses: strings(&["MIT", "ISC", "BSD-2-Clause"]),
            templates: strings(&["basic"]),
            credentials: Vec::new(),
            use_yarn: false,
            website: String::new(),
            template: defaults.template.clone(),
            description: defaults.description.clone(),
            version: defaults.version.clone(),
            license: defaults.license.clone(),
            commit_message: defaults.commit_message.clone(),
            locale: "en".to_string(),
        }
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Settingable for Settings {
    const FIELDS: &'static [&'static str] = &[
        "lintPackages",
        "testingPackages",
        "licenses",
        "templates",
        "credentials",
        "useYarn",
        "website",
        "template",
        "description",
        "version",
        "license",
        "commitMessage",
        "locale",
    ];

    fn assign(&mut self, key: &str, value: &Value) -> bool {
        match key {
            "lintPackages" => assign_field(&mut self.lint_packages, key, value),
            "testingPackages" => assign_field(&mut self.testing_packages, key, value),
            "licenses" => assign_field(&mut self.licenses, key, value),
            "templates" => assign_field(&mut self.templates, key, value),
            "credentials" => assign_field(&mut self.credentials, key, value),
            "useYarn" => assign_field(&mut self.use_yarn, key, value),
            "website" => assign_field(&mut self.website, key, value),
            "template" => assign_field(&mut self.template, key, value),
            "description" => assign_field(&mut self.description, key, value),
            "version" => assign_field(&mut self.version, key, value),
            "license" => assign_field(&mut self.license, key, value),
            "commitMessage" => assign_field(&mut self.commit_message, key, value),
            "locale" => assign_field(&mut self.locale, key, value),
            _ => false,
        }
    }
}

/// On-disk shape: the settings plus a read-only copy of the built-in defaults.
#[derive(Serialize)]
struct SettingsDocument<'a> {
    #[serde(flatten)]
    settings: &'a Settings,
    defaults: &'a Defaults,
}

/// Process-wide configuration: defaults, persisted settings and credentials.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    paths: InstallPaths,
    defaults: Defaults,
    settings: Settings,
    settings_path: Option<PathBuf>,
    locale: Locale,
}

impl ConfigStore {
    pub fn new(paths: InstallPaths) -> Self {
        let defaults = Defaults::default();
        let settings = Settings::from_defaults(&defaults);
        Self {
            paths,
            defaults,
            settings,
            settings_path: None,
            locale: Locale::default(),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn defaults(&self) -> &Defaults {
        &self.defaults
    }

    pub fn templates_path(&self) -> &Path {
        &self.paths.templates
    }

    pub fn licenses_path(&self) -> &Path {
        &self.paths.licenses
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    /// Pick the settings file: project-local if it exists, else global.
    ///
    /// The choice is made once and cached for the process lifetime.
    pub fn resolve_settings_path(&mut self) -> PathBuf {
        if let Some(path) = &self.settings_path {
            return path.clone();
        }
        let path = if self.paths.local_settings.exists() {
            info!(
                path = %self.paths.local_settings.display(),
                "{}",
                self.locale.text(Message::HasLocalSettings)
            );
            self.paths.local_settings.clone()
        } else {
            info!(
                path = %self.paths.global_settings.display(),
                "{}",
                self.locale.text(Message::NoLocalSettings)
            );
            self.paths.global_settings.clone()
        };
        self.settings_path = Some(path.clone());
        path
    }

    /// Overlay the settings file onto the current state.
    ///
    /// With `apply_defaults`, built-in defaults are re-applied on top of the
    /// file so a stale file cannot override them.
    #[instrument(skip_all, fields(apply_defaults = apply_defaults))]
    pub fn load(&mut self, path: Option<&Path>, apply_defaults: bool) -> Result<(), ScaffoldError> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => self.resolve_settings_path(),
        };
        let raw = fs::read_to_string(&path).map_err(|source| ScaffoldError::ConfigNotFound {
            path: path.clone(),
            source,
        })?;
        let parsed: Value =
            serde_json::from_str(&raw).map_err(|source| ScaffoldError::MalformedConfig {
                path: path.clone(),
                source,
            })?;
        let file = match parsed {
            Value::Object(map) => map,
            other => {
                warn!(kind = %json_kind(&other), "settings file is not an object, ignoring content");
                Source::new()
            }
        };
        let forced = if apply_defaults {
            to_source(&self.defaults)
        } else {
            Source::new()
        };

        let assigned = project(&mut self.settings, &[&forced, &file]);
        self.locale = Locale::parse(&self.settings.locale);
        debug!(path = %path.display(), assigned, locale = ?self.locale, "settings loaded");
        Ok(())
    }

    /// Merge `sources` (descending priority) into the persisted settings.
    pub fn apply(&mut self, sources: &[&Source]) -> usize {
        let assigned = project(&mut self.settings, sources);
        self.locale = Locale::parse(&self.settings.locale);
        assigned
    }

    /// Assign `field` (when given) and write the whole state to `path`
    /// (default: the resolved settings path).
    pub fn persist(
        &mut self,
        field: Option<(&str, Value)>,
        path: Option<&Path>,
    ) -> Result<(), ScaffoldError> {
        if let Some((key, value)) = field
            && !self.settings.assign(key, &value)
        {
            warn!(field = key, "not a settings field, ignoring");
        }
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => self.resolve_settings_path(),
        };
        let document = SettingsDocument {
            settings: &self.settings,
            defaults: &self.defaults,
        };
        write_json_atomic(&path, &document)
            .map_err(|source| ScaffoldError::ConfigWrite {
                path: path.clone(),
                source,
            })?;
        debug!(path = %path.display(), "settings written");
        Ok(())
    }

    /// Write the whole state to the resolved settings path.
    pub fn persist_all(&mut self) -> Result<(), ScaffoldError> {
        self.persist(None, None)
    }

    pub fn first_credential(&self) -> Result<&Credential, ScaffoldError> {
        self.settings
            .credentials
            .first()
            .ok_or(ScaffoldError::NoCredential)
    }

    pub fn find_credential(&self, identity: &str) -> Option<&Credential> {
        self.settings
            .credentials
            .iter()
            .find(|cred| cred.identity == identity)
    }

    pub fn token_for(&self, identity: &str) -> Option<&str> {
        self.find_credential(identity)
            .map(|cred| cred.secret.as_str())
    }

    /// Store `secret` for `identity` and persist.
    ///
    /// Returns `Ok(false)` without touching disk when the stored secret is
    /// already `secret`. Unknown identities are appended.
    pub fn update_token(&mut self, identity: &str, secret: &str) -> Result<bool, ScaffoldError> {
        let mut credentials = self.settings.credentials.clone();
        match credentials.iter_mut().find(|cred| cred.identity == identity) {
            Some(cred) if cred.secret == secret => {
                debug!(identity, "token unchanged");
                return Ok(false);
            }
            Some(cred) => cred.secret = secret.to_string(),
            None => credentials.push(Credential::new(identity, secret)),
        }

        // Only keep the new secret once it is on disk.
        let previous = std::mem::replace(&mut self.settings.credentials, credentials);
        if let Err(err) = self.persist_all() {
            self.settings.credentials = previous;
            return Err(err);
        }
        info!(identity, "token updated");
        Ok(true)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
