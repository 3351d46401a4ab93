//! The resolved description of one project to create.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::projection::{Settingable, assign_field};
use super::types::{Author, Credential, RemoteRepository, VcsInfo};

/// Placeholder token → replacement text, used for template rendering.
pub type Dictionary = BTreeMap<&'static str, String>;

/// Everything the provisioning pipeline needs to create one project.
///
/// Built once by plan resolution. Only the remote coordinates (`vcs`,
/// `has_remote`, `issue_tracker`) change afterwards, through
/// [`ProvisioningPlan::apply_remote`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProvisioningPlan {
    pub name: String,
    pub description: String,
    pub version: String,
    pub url: String,
    pub keywords: Vec<String>,
    pub license: String,
    pub author: Author,
    pub use_github: bool,
    pub github: Credential,
    pub has_remote: bool,
    pub vcs: VcsInfo,
    pub issue_tracker: String,
    pub is_private: bool,
    pub dest_path: PathBuf,
    pub year: i32,
    pub test_packages: Vec<String>,
    pub template_name: String,
    pub use_yarn: bool,
    pub commit_message: String,
}

impl Settingable for ProvisioningPlan {
    const FIELDS: &'static [&'static str] = &[
        "name",
        "description",
        "version",
        "url",
        "keywords",
        "license",
        "author",
        "useGithub",
        "github",
        "hasRemote",
        "vcs",
        "issueTracker",
        "isPrivate",
        "destPath",
        "year",
        "testPackages",
        "templateName",
        "useYarn",
        "commitMessage",
    ];

    fn assign(&mut self, key: &str, value: &Value) -> bool {
        match key {
            "name" => assign_field(&mut self.name, key, value),
            "description" => assign_field(&mut self.description, key, value),
            "version" => assign_field(&mut self.version, key, value),
            "url" => assign_field(&mut self.url, key, value),
            "keywords" => assign_field(&mut self.keywords, key, value),
            "license" => assign_field(&mut self.license, key, value),
            "author" => assign_field(&mut self.author, key, value),
            "useGithub" => assign_field(&mut self.use_github, key, value),
            "github" => assign_field(&mut self.github, key, value),
            "hasRemote" => assign_field(&mut self.has_remote, key, value),
            "vcs" => assign_field(&mut self.vcs, key, value),
            "issueTracker" => assign_field(&mut self.issue_tracker, key, value),
            "isPrivate" => assign_field(&mut self.is_private, key, value),
            "destPath" => assign_field(&mut self.dest_path, key, value),
            "year" => assign_field(&mut self.year, key, value),
            "testPackages" => assign_field(&mut self.test_packages, key, value),
            "templateName" => assign_field(&mut self.template_name, key, value),
            "useYarn" => assign_field(&mut self.use_yarn, key, value),
            "commitMessage" => assign_field(&mut self.commit_message, key, value),
            _ => false,
        }
    }
}

impl ProvisioningPlan {
    /// Record a freshly created remote repository on the plan.
    pub fn apply_remote(&mut self, repo: &RemoteRepository) {
        self.vcs = VcsInfo {
            name: repo.name.clone(),
            http_url: repo.html_url.clone(),
            ssh_url: repo.ssh_url.clone(),
        };
        self.issue_tracker = format!("{}/issues", repo.html_url);
        self.has_remote = !self.vcs.ssh_url.is_empty();
    }

    /// Placeholder values for template and license rendering.
    pub fn dictionary(&self) -> Dictionary {
        let keywords = serde_json::to_string(&self.keywords).unwrap_or_else(|_| "[]".to_string());
        Dictionary::from([
            ("PROJECT_NAME", self.name.clone()),
            ("PROJECT_DESCRIPTION", self.description.clone()),
            ("PROJECT_VERSION", self.version.clone()),
            ("PROJECT_URL", self.url.clone()),
            ("PROJECT_KEYWORDS", keywords),
            ("PROJECT_LICENSE", self.license.clone()),
            ("PROJECT_AUTHOR_NAME", self.author.name.clone()),
            ("PROJECT_AUTHOR_EMAIL", self.author.email.clone()),
            ("PROJECT_AUTHOR_URL", self.author.url.clone()),
            ("PROJECT_GIT_URL", self.vcs.ssh_url.clone()),
            ("PROJECT_ISSUETRACKER", self.issue_tracker.clone()),
            ("PROJECT_PRIVATE", self.is_private.to_string()),
            ("PROJECT_YEAR", self.year.to_string()),
        ])
    }
}

/// Split a comma-separated keyword answer into trimmed, non-empty keywords.
pub fn parse_keywords(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::projection::{project, to_source};
    use serde_json::json;

    #[test]
    fn apply_remote_sets_coordinates_and_issue_tracker() {
        let mut plan = ProvisioningPlan::default();
        plan.apply_remote(&RemoteRepository {
            name: "demo".to_string(),
            html_url: "https://github.com/me/demo".to_string(),
            ssh_url: "git@github.com:me/demo.git".to_string(),
        });

        assert!(plan.has_remote);
        assert_eq!(plan.vcs.name, "demo");
        assert_eq!(plan.issue_tracker, "https://github.com/me/demo/issues");
    }

    #[test]
    fn dictionary_renders_keywords_as_json_array() {
        let plan = ProvisioningPlan {
            name: "demo-app".to_string(),
            keywords: vec!["cli".to_string(), "tool".to_string()],
            is_private: true,
            year: 2026,
            ..Default::default()
        };
        let dict = plan.dictionary();
        assert_eq!(dict["PROJECT_NAME"], "demo-app");
        assert_eq!(dict["PROJECT_KEYWORDS"], r#"["cli","tool"]"#);
        assert_eq!(dict["PROJECT_PRIVATE"], "true");
        assert_eq!(dict["PROJECT_YEAR"], "2026");
    }

    #[test]
    fn answers_override_plan_defaults() {
        let mut plan = ProvisioningPlan::default();
        let answers = to_source(&json!({
            "name": "chosen",
            "author": { "name": "Ada", "email": "ada@example.com", "url": "" },
            "unknownField": 1
        }));
        let defaults = to_source(&json!({ "name": "derived", "version": "0.1.0" }));

        project(&mut plan, &[&answers, &defaults]);

        assert_eq!(plan.name, "chosen");
        assert_eq!(plan.version, "0.1.0");
        assert_eq!(plan.author.name, "Ada");
    }

    #[test]
    fn parse_keywords_trims_and_drops_empty() {
        assert_eq!(parse_keywords(" a, b ,,c "), vec!["a", "b", "c"]);
        assert!(parse_keywords("").is_empty());
    }
}
