//! Interactive answer collection.
//!
//! [`Questionnaire`] is the seam plan resolution talks to. [`InquireQuestionnaire`]
//! asks on the terminal; tests use the scripted double in `test_support`.

use anyhow::Result;
use inquire::{Confirm, MultiSelect, Password, PasswordDisplayMode, Select, Text};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::messages::{Locale, Message};
use crate::core::plan::parse_keywords;
use crate::core::projection::{Settingable, assign_field};
use crate::core::types::Author;

/// Answers to the project-details questionnaire.
///
/// Also used as the prompt defaults, so it takes part in projection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Answers {
    pub name: String,
    pub template: String,
    pub description: String,
    pub version: String,
    pub keywords: Vec<String>,
    pub license: String,
    pub author: Author,
    pub is_private: bool,
    pub url: String,
    pub test_packages: Vec<String>,
    pub use_github: bool,
    pub use_yarn: bool,
}

impl Settingable for Answers {
    const FIELDS: &'static [&'static str] = &[
        "name",
        "template",
        "description",
        "version",
        "keywords",
        "license",
        "author",
        "isPrivate",
        "url",
        "testPackages",
        "useGithub",
        "useYarn",
    ];

    fn assign(&mut self, key: &str, value: &Value) -> bool {
        match key {
            "name" => assign_field(&mut self.name, key, value),
            "template" => assign_field(&mut self.template, key, value),
            "description" => assign_field(&mut self.description, key, value),
            "version" => assign_field(&mut self.version, key, value),
            "keywords" => assign_field(&mut self.keywords, key, value),
            "license" => assign_field(&mut self.license, key, value),
            "author" => assign_field(&mut self.author, key, value),
            "isPrivate" => assign_field(&mut self.is_private, key, value),
            "url" => assign_field(&mut self.url, key, value),
            "testPackages" => assign_field(&mut self.test_packages, key, value),
            "useGithub" => assign_field(&mut self.use_github, key, value),
            "useYarn" => assign_field(&mut self.use_yarn, key, value),
            _ => false,
        }
    }
}

/// Option lists offered by the select prompts.
#[derive(Debug, Clone, Copy)]
pub struct Choices<'a> {
    pub templates: &'a [String],
    pub licenses: &'a [String],
    pub testing_packages: &'a [String],
}

/// A remote entered by hand when GitHub is not used.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManualRemote {
    pub ssh_url: String,
    pub issue_tracker: String,
}

pub trait Questionnaire {
    fn project_details(&self, defaults: &Answers, choices: &Choices<'_>) -> Result<Answers>;

    fn manual_remote(&self) -> Result<ManualRemote>;

    fn github_identity(&self, default: &str) -> Result<String>;

    /// An empty answer keeps `default`.
    fn github_secret(&self, identity: &str, default: &str) -> Result<String>;

    fn confirm_token_update(&self) -> Result<bool>;
}

/// [`Questionnaire`] backed by terminal prompts.
#[derive(Debug, Clone, Copy, Default)]
pub struct InquireQuestionnaire {
    locale: Locale,
}

impl InquireQuestionnaire {
    pub fn new(locale: Locale) -> Self {
        Self { locale }
    }

    fn text(&self, message: Message, default: &str) -> Result<String> {
        Ok(Text::new(self.locale.text(message))
            .with_default(default)
            .prompt()?)
    }

    fn confirm(&self, message: Message, default: bool) -> Result<bool> {
        Ok(Confirm::new(self.locale.text(message))
            .with_default(default)
            .prompt()?)
    }

    fn select(&self, message: Message, options: &[String], default: &str) -> Result<String> {
        if options.is_empty() {
            return Ok(default.to_string());
        }
        let cursor = options.iter().position(|o| o == default).unwrap_or(0);
        Ok(Select::new(self.locale.text(message), options.to_vec())
            .with_starting_cursor(cursor)
            .prompt()?)
    }

    fn multi_select(
        &self,
        message: Message,
        options: &[String],
        selected: &[String],
    ) -> Result<Vec<String>> {
        if options.is_empty() {
            return Ok(Vec::new());
        }
        let defaults: Vec<usize> = options
            .iter()
            .enumerate()
            .filter(|(_, o)| selected.contains(o))
            .map(|(i, _)| i)
            .collect();
        Ok(MultiSelect::new(self.locale.text(message), options.to_vec())
            .with_default(&defaults)
            .prompt()?)
    }
}

impl Questionnaire for InquireQuestionnaire {
    fn project_details(&self, defaults: &Answers, choices: &Choices<'_>) -> Result<Answers> {
        let name = self.text(Message::ProjectName, &defaults.name)?;
        let template = self.select(Message::TemplateType, choices.templates, &defaults.template)?;
        let description = self.text(Message::Description, &defaults.description)?;
        let version = self.text(Message::Version, &defaults.version)?;
        let keywords = parse_keywords(&self.text(Message::Keywords, &defaults.keywords.join(", "))?);
        let license = self.select(Message::License, choices.licenses, &defaults.license)?;
        let author = Author {
            name: self.text(Message::AuthorName, &defaults.author.name)?,
            email: self.text(Message::AuthorEmail, &defaults.author.email)?,
            url: self.text(Message::Website, &defaults.author.url)?,
        };
        let is_private = self.confirm(Message::Private, defaults.is_private)?;
        let url = self.text(Message::ProjectUrl, &defaults.url)?;
        let test_packages = self.multi_select(
            Message::TestPackages,
            choices.testing_packages,
            &defaults.test_packages,
        )?;
        let use_github = self.confirm(Message::CreateRepo, defaults.use_github)?;
        let use_yarn = self.confirm(Message::UseYarn, defaults.use_yarn)?;

        Ok(Answers {
            name,
            template,
            description,
            version,
            keywords,
            license,
            author,
            is_private,
            url,
            test_packages,
            use_github,
            use_yarn,
        })
    }

    fn manual_remote(&self) -> Result<ManualRemote> {
        let ssh_url = self.text(Message::RemoteUrl, "")?;
        let issue_tracker = if ssh_url.trim().is_empty() {
            String::new()
        } else {
            self.text(Message::IssueTracker, "")?
        };
        Ok(ManualRemote {
            ssh_url: ssh_url.trim().to_string(),
            issue_tracker: issue_tracker.trim().to_string(),
        })
    }

    fn github_identity(&self, default: &str) -> Result<String> {
        Ok(self.text(Message::GithubUser, default)?.trim().to_string())
    }

    fn github_secret(&self, identity: &str, default: &str) -> Result<String> {
        let message = format!("{} {identity}", self.locale.text(Message::GithubToken));
        let answer = Password::new(&message)
            .without_confirmation()
            .with_display_mode(PasswordDisplayMode::Masked)
            .prompt()?;
        let answer = answer.trim();
        Ok(if answer.is_empty() { default } else { answer }.to_string())
    }

    fn confirm_token_update(&self) -> Result<bool> {
        self.confirm(Message::UpdateToken, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::projection::{project, to_source};
    use serde_json::json;

    #[test]
    fn answers_take_store_values_over_builtin_defaults() {
        let store = to_source(&json!({
            "license": "ISC",
            "useYarn": true,
            "lintPackages": ["eslint"],
        }));
        let builtin = to_source(&json!({
            "template": "basic",
            "license": "MIT",
            "version": "0.1.0",
            "commitMessage": "Initial commit",
        }));
        let mut answers = Answers::default();

        project(&mut answers, &[&store, &builtin]);

        assert_eq!(answers.license, "ISC");
        assert_eq!(answers.template, "basic");
        assert_eq!(answers.version, "0.1.0");
        assert!(answers.use_yarn);
    }

    #[test]
    fn answers_serialize_camel_case() {
        let answers = Answers {
            is_private: true,
            test_packages: vec!["jest".to_string()],
            ..Default::default()
        };
        let source = to_source(&answers);
        assert_eq!(source["isPrivate"], json!(true));
        assert_eq!(source["testPackages"], json!(["jest"]));
        assert!(source.contains_key("useGithub"));
    }
}
