//! Plan resolution: validate the destination, collect answers and build the
//! [`ProvisioningPlan`].

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::core::naming::normalize_name;
use crate::core::plan::ProvisioningPlan;
use crate::core::projection::{project, to_source};
use crate::core::types::{Author, Credential, VcsInfo};
use crate::error::ScaffoldError;
use crate::io::files::resolve_path;
use crate::io::git::Vcs;
use crate::io::questionnaire::{Answers, Choices, Questionnaire};
use crate::io::settings::ConfigStore;

/// Validate the destination argument before anything else happens.
///
/// Fails with `MissingArgument` when no path is given and with
/// `AlreadyExists` when any filesystem entry (file, directory, dangling
/// symlink) is already there.
pub fn resolve_dest_path(raw: Option<&str>) -> Result<PathBuf, ScaffoldError> {
    let path = raw
        .and_then(resolve_path)
        .ok_or(ScaffoldError::MissingArgument)?;
    if fs::symlink_metadata(&path).is_ok() {
        return Err(ScaffoldError::AlreadyExists(path));
    }
    debug!(path = %path.display(), "destination resolved");
    Ok(path)
}

/// Ask the user for project details and resolve them into a plan.
///
/// Answers that are also preferences (template, license, yarn, website...)
/// are written back to the settings file.
#[instrument(skip_all, fields(dest = %dest.display()))]
pub fn collect_details<Q, V>(
    dest: &Path,
    store: &mut ConfigStore,
    questionnaire: &Q,
    vcs: &V,
    year: i32,
) -> Result<ProvisioningPlan, ScaffoldError>
where
    Q: Questionnaire,
    V: Vcs,
{
    let defaults = prompt_defaults(dest, store, vcs);
    let answers = {
        let settings = store.settings();
        let choices = Choices {
            templates: &settings.templates,
            licenses: &settings.licenses,
            testing_packages: &settings.testing_packages,
        };
        questionnaire
            .project_details(&defaults, &choices)
            .map_err(ScaffoldError::Prompt)?
    };

    let mut plan = ProvisioningPlan::default();
    project(&mut plan, &[&to_source(&answers), &to_source(&defaults)]);
    if plan.name.trim().is_empty() {
        plan.name = defaults.name.clone();
    }
    plan.dest_path = dest.to_path_buf();
    plan.template_name = non_empty(&answers.template, &defaults.template);
    plan.commit_message = non_empty(
        &store.settings().commit_message,
        &store.defaults().commit_message,
    );
    plan.year = year;

    if answers.use_github {
        let credential = resolve_credential(store, questionnaire)?;
        if credential.is_usable() {
            plan.github = credential;
        } else {
            warn!("no GitHub token given, skipping repository creation");
            plan.use_github = false;
        }
    } else {
        let remote = questionnaire
            .manual_remote()
            .map_err(ScaffoldError::Prompt)?;
        plan.has_remote = !remote.ssh_url.is_empty();
        plan.vcs = VcsInfo {
            name: plan.name.clone(),
            http_url: String::new(),
            ssh_url: remote.ssh_url,
        };
        plan.issue_tracker = remote.issue_tracker;
    }

    let mut preferences = to_source(&answers);
    preferences.insert("website".to_string(), Value::String(answers.author.url.clone()));
    store.apply(&[&preferences]);
    store.persist_all()?;

    info!(
        name = %plan.name,
        template = %plan.template_name,
        use_github = plan.use_github,
        has_remote = plan.has_remote,
        "project details collected"
    );
    Ok(plan)
}

/// Defaults offered by the questionnaire: stored preferences over built-in
/// defaults, the git identity and a name derived from the destination.
fn prompt_defaults<V: Vcs>(dest: &Path, store: &ConfigStore, vcs: &V) -> Answers {
    let mut defaults = Answers::default();
    project(
        &mut defaults,
        &[&to_source(store.settings()), &to_source(store.defaults())],
    );
    defaults.name = normalize_name(dest);
    defaults.author = Author {
        name: git_user(vcs, "name"),
        email: git_user(vcs, "email"),
        url: store.settings().website.clone(),
    };
    defaults
}

fn git_user<V: Vcs>(vcs: &V, key: &str) -> String {
    match vcs.user_config_value(key) {
        Ok(value) => value.unwrap_or_default(),
        Err(err) => {
            warn!(key, err = %format!("{err:#}"), "cannot read git user config");
            String::new()
        }
    }
}

/// Prompt for a GitHub identity and secret, seeded from the store, and offer
/// to save them when they differ from what is stored.
fn resolve_credential<Q: Questionnaire>(
    store: &mut ConfigStore,
    questionnaire: &Q,
) -> Result<Credential, ScaffoldError> {
    let stored_identity = match store.first_credential() {
        Ok(credential) => credential.identity.clone(),
        Err(ScaffoldError::NoCredential) => String::new(),
        Err(err) => return Err(err),
    };
    let identity = questionnaire
        .github_identity(&stored_identity)
        .map_err(ScaffoldError::Prompt)?;
    let stored_secret = store.token_for(&identity).unwrap_or_default().to_string();
    let secret = questionnaire
        .github_secret(&identity, &stored_secret)
        .map_err(ScaffoldError::Prompt)?;

    let credential = Credential::new(identity, secret);
    let changed = store.token_for(&credential.identity) != Some(credential.secret.as_str());
    if credential.is_usable()
        && changed
        && questionnaire
            .confirm_token_update()
            .map_err(ScaffoldError::Prompt)?
    {
        store.update_token(&credential.identity, &credential.secret)?;
    }
    Ok(credential)
}

fn non_empty(value: &str, fallback: &str) -> String {
    if value.trim().is_empty() {
        fallback.to_string()
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Credential;
    use crate::test_support::{ScriptedQuestionnaire, ScriptedVcs, TestWorkspace};
    use serde_json::json;

    #[test]
    fn missing_argument_is_rejected() {
        assert!(matches!(
            resolve_dest_path(None),
            Err(ScaffoldError::MissingArgument)
        ));
        assert!(matches!(
            resolve_dest_path(Some("  ")),
            Err(ScaffoldError::MissingArgument)
        ));
    }

    #[test]
    fn existing_file_or_directory_conflicts() {
        let temp = tempfile::tempdir().expect("tempdir");
        let file = temp.path().join("taken.txt");
        fs::write(&file, "x").expect("write");

        let err = resolve_dest_path(Some(temp.path().to_str().expect("utf8"))).unwrap_err();
        assert!(matches!(err, ScaffoldError::AlreadyExists(_)));
        let err = resolve_dest_path(Some(file.to_str().expect("utf8"))).unwrap_err();
        assert!(matches!(err, ScaffoldError::AlreadyExists(p) if p == file));

        let fresh = temp.path().join("fresh");
        assert_eq!(
            resolve_dest_path(Some(fresh.to_str().expect("utf8"))).expect("fresh"),
            fresh
        );
    }

    #[test]
    fn defaults_come_from_store_git_and_destination() {
        let ws = TestWorkspace::new();
        let mut store = ws.store();
        store.apply(&[&to_source(&json!({ "license": "ISC", "website": "https://ada.dev" }))]);
        let questionnaire = ScriptedQuestionnaire::new();
        let vcs = ScriptedVcs::new().with_user("name", "Ada Lovelace");

        let plan = collect_details(
            &ws.dest("My Cool_App"),
            &mut store,
            &questionnaire,
            &vcs,
            2026,
        )
        .expect("details");

        let seen = questionnaire.details_defaults().expect("asked");
        assert_eq!(seen.name, "my-cool-app");
        assert_eq!(seen.license, "ISC");
        assert_eq!(seen.version, "0.1.0");
        assert_eq!(seen.author.name, "Ada Lovelace");
        assert_eq!(seen.author.email, "");
        assert_eq!(seen.author.url, "https://ada.dev");

        assert_eq!(plan.name, "my-cool-app");
        assert_eq!(plan.template_name, "basic");
        assert_eq!(plan.commit_message, "Initial commit");
        assert_eq!(plan.year, 2026);
        assert_eq!(plan.dest_path, ws.dest("My Cool_App"));
    }

    #[test]
    fn answers_are_persisted_as_preferences() {
        let ws = TestWorkspace::new();
        let mut store = ws.store();
        let questionnaire = ScriptedQuestionnaire::new().answer(json!({
            "license": "ISC",
            "useYarn": true,
            "author": { "name": "Ada", "email": "ada@example.com", "url": "https://ada.dev" }
        }));

        collect_details(
            &ws.dest("demo"),
            &mut store,
            &questionnaire,
            &ScriptedVcs::new(),
            2026,
        )
        .expect("details");

        assert_eq!(store.settings().license, "ISC");
        assert!(store.settings().use_yarn);
        assert_eq!(store.settings().website, "https://ada.dev");

        let mut reloaded = ws.store();
        reloaded.load(None, false).expect("reload");
        assert_eq!(reloaded.settings().website, "https://ada.dev");
    }

    #[test]
    fn manual_remote_sets_has_remote() {
        let ws = TestWorkspace::new();
        let mut store = ws.store();
        let questionnaire = ScriptedQuestionnaire::new()
            .with_manual_remote("git@example.com:me/demo.git", "https://example.com/me/demo/issues");

        let plan = collect_details(
            &ws.dest("demo"),
            &mut store,
            &questionnaire,
            &ScriptedVcs::new(),
            2026,
        )
        .expect("details");

        assert!(!plan.use_github);
        assert!(plan.has_remote);
        assert_eq!(plan.vcs.ssh_url, "git@example.com:me/demo.git");
        assert_eq!(plan.issue_tracker, "https://example.com/me/demo/issues");
    }

    #[test]
    fn new_github_credential_is_saved_on_confirmation() {
        let ws = TestWorkspace::new();
        let mut store = ws.store();
        let questionnaire = ScriptedQuestionnaire::new()
            .answer(json!({ "useGithub": true }))
            .with_github("ada", "tok-1", true);

        let plan = collect_details(
            &ws.dest("demo"),
            &mut store,
            &questionnaire,
            &ScriptedVcs::new(),
            2026,
        )
        .expect("details");

        assert!(plan.use_github);
        assert_eq!(plan.github, Credential::new("ada", "tok-1"));
        assert_eq!(store.token_for("ada"), Some("tok-1"));
        assert!(questionnaire.asked().contains(&"confirm_token_update".to_string()));
    }

    #[test]
    fn stored_credential_is_offered_and_not_rewritten() {
        let ws = TestWorkspace::new();
        let mut store = ws.store();
        store.apply(&[&to_source(&json!({
            "credentials": [{ "identity": "ada", "secret": "stored" }]
        }))]);
        // Empty answers keep the stored defaults.
        let questionnaire = ScriptedQuestionnaire::new()
            .answer(json!({ "useGithub": true }))
            .with_github("", "", true);

        let plan = collect_details(
            &ws.dest("demo"),
            &mut store,
            &questionnaire,
            &ScriptedVcs::new(),
            2026,
        )
        .expect("details");

        assert_eq!(plan.github, Credential::new("ada", "stored"));
        assert!(!questionnaire.asked().contains(&"confirm_token_update".to_string()));
    }

    #[test]
    fn empty_secret_turns_github_off() {
        let ws = TestWorkspace::new();
        let mut store = ws.store();
        let questionnaire = ScriptedQuestionnaire::new()
            .answer(json!({ "useGithub": true }))
            .with_github("ada", "", true);

        let plan = collect_details(
            &ws.dest("demo"),
            &mut store,
            &questionnaire,
            &ScriptedVcs::new(),
            2026,
        )
        .expect("details");

        assert!(!plan.use_github);
        assert!(!plan.has_remote);
        assert!(store.settings().credentials.is_empty());
    }
}
