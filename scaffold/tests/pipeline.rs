//! End-to-end provisioning tests against real `git` and real templates.
//!
//! Prompts and the GitHub API are scripted; everything else (filesystem,
//! repository, commit, push to a local bare remote) is real.

use std::fs;
use std::path::Path;
use std::process::Command;

use serde_json::json;

use scaffold::core::stage::{Stage, StageOutcome};
use scaffold::core::types::RemoteRepository;
use scaffold::error::ScaffoldError;
use scaffold::io::git::{Git, REMOTE_NAME};
use scaffold::io::settings::{ConfigStore, InstallPaths, SETTINGS_FILE_NAME};
use scaffold::io::template::FsTemplates;
use scaffold::provision::Provisioner;
use scaffold::test_support::{
    ScriptedQuestionnaire, ScriptedRemote, TEST_AUTHOR_NAME, TestWorkspace, isolated_git,
};

/// Create a bare repository to push to.
fn bare_remote(root: &Path) -> String {
    let bare = root.join("remote.git");
    let status = Command::new("git")
        .args(["init", "--bare", "--quiet"])
        .arg(&bare)
        .env("GIT_CONFIG_NOSYSTEM", "1")
        .env("GIT_CONFIG_GLOBAL", root.join(".gitconfig-test"))
        .status()
        .expect("git init --bare");
    assert!(status.success());
    bare.to_str().expect("utf8 path").to_string()
}

fn count_commits(git_dir: &Path, rev: &str) -> usize {
    let out = Command::new("git")
        .args(["rev-list", "--count", rev])
        .current_dir(git_dir)
        .env("GIT_CONFIG_NOSYSTEM", "1")
        .output()
        .expect("git rev-list");
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    String::from_utf8_lossy(&out.stdout)
        .trim()
        .parse()
        .expect("count")
}

#[test]
fn pipeline_creates_dir_files_repository_commit_and_remote() {
    let ws = TestWorkspace::new();
    let vcs = isolated_git(ws.root());
    let bare = bare_remote(ws.root());
    let remote = ScriptedRemote::created(RemoteRepository {
        name: "demo".to_string(),
        html_url: "https://github.com/ada/demo".to_string(),
        ssh_url: bare.clone(),
    });
    let questionnaire = ScriptedQuestionnaire::new()
        .answer(json!({ "useGithub": true, "description": "A demo" }))
        .with_github("ada", "tok", false);
    let mut store = ws.store();
    let dest = ws.dest("demo");

    let outcome = Provisioner::new(&mut store, &questionnaire, &vcs, &remote, &FsTemplates)
        .run(dest.to_str())
        .expect("provision");

    assert!(dest.is_dir());
    assert_eq!(
        fs::read_to_string(dest.join("README.md")).expect("readme"),
        "# demo\n\nA demo\n"
    );
    assert!(
        fs::read_to_string(dest.join("LICENSE"))
            .expect("license")
            .contains(TEST_AUTHOR_NAME)
    );
    assert!(dest.join(".git").is_dir());

    let git = Git::new(&dest);
    assert_eq!(git.commit_count().expect("count"), 1);
    assert!(!git.has_staged_changes().expect("staged"));
    assert_eq!(
        git.remote_url(REMOTE_NAME).expect("remote").as_deref(),
        Some(bare.as_str())
    );
    assert_eq!(outcome.report.outcome(Stage::Pushed), Some(&StageOutcome::Completed));
    assert_eq!(count_commits(Path::new(&bare), "main"), 1);
    assert_eq!(outcome.plan.issue_tracker, "https://github.com/ada/demo/issues");
}

#[test]
fn rejected_github_request_still_succeeds_without_remote() {
    for status in [401, 422] {
        let ws = TestWorkspace::new();
        let vcs = isolated_git(ws.root());
        let remote = ScriptedRemote::rejecting(status, r#"{"message":"nope"}"#);
        let questionnaire = ScriptedQuestionnaire::new()
            .answer(json!({ "useGithub": true }))
            .with_github("ada", "tok", false);
        let mut store = ws.store();
        let dest = ws.dest("demo");

        let outcome = Provisioner::new(&mut store, &questionnaire, &vcs, &remote, &FsTemplates)
            .run(dest.to_str())
            .expect("best-effort remote");

        assert!(outcome.report.is_degraded(), "status {status}");
        assert_eq!(outcome.report.outcome(Stage::Pushed), Some(&StageOutcome::Skipped));
        let git = Git::new(&dest);
        assert_eq!(git.commit_count().expect("count"), 1);
        assert_eq!(git.remote_url(REMOTE_NAME).expect("remote"), None);
    }
}

#[test]
fn path_conflict_fails_before_prompting_or_touching_disk() {
    let ws = TestWorkspace::new();
    let vcs = isolated_git(ws.root());
    let remote = ScriptedRemote::rejecting(500, "");
    let questionnaire = ScriptedQuestionnaire::new();
    let mut store = ws.store();
    let dest = ws.dest("taken");
    fs::write(&dest, "not a directory").expect("write");

    let err = Provisioner::new(&mut store, &questionnaire, &vcs, &remote, &FsTemplates)
        .run(dest.to_str())
        .unwrap_err();

    assert!(matches!(err, ScaffoldError::AlreadyExists(_)));
    assert!(questionnaire.asked().is_empty());
    assert!(!ws.settings_path().exists(), "nothing persisted");
    assert_eq!(fs::read_to_string(&dest).expect("read"), "not a directory");
}

/// Shipped `basic` template, manual remote pointing at a bare repository,
/// push to it.
#[test]
fn basic_template_with_manual_remote_is_pushed() {
    let temp = tempfile::tempdir().expect("tempdir");
    let root = temp.path();
    let vcs = isolated_git(root);
    let bare = bare_remote(root);
    let paths = InstallPaths::new(
        Path::new(env!("CARGO_MANIFEST_DIR")),
        root.join(SETTINGS_FILE_NAME),
        root.join("global").join(SETTINGS_FILE_NAME),
    );
    let mut store = ConfigStore::new(paths);
    let questionnaire = ScriptedQuestionnaire::new()
        .answer(json!({
            "template": "basic",
            "license": "BSD-2-Clause",
            "keywords": ["cli", "demo"],
            "isPrivate": true,
        }))
        .with_manual_remote(&bare, "https://example.com/demo/issues");
    let remote = ScriptedRemote::rejecting(500, "unused");
    let dest = root.join("My App");

    let outcome = Provisioner::new(&mut store, &questionnaire, &vcs, &remote, &FsTemplates)
        .run(dest.to_str())
        .expect("provision");

    assert_eq!(outcome.plan.name, "my-app");
    assert!(remote.requests().is_empty());
    assert!(!outcome.report.is_degraded());

    let package: serde_json::Value = serde_json::from_str(
        &fs::read_to_string(dest.join("package.json")).expect("package.json"),
    )
    .expect("rendered package.json is valid JSON");
    assert_eq!(package["name"], "my-app");
    assert_eq!(package["keywords"], json!(["cli", "demo"]));
    assert_eq!(package["private"], json!(true));
    assert_eq!(package["bugs"]["url"], "https://example.com/demo/issues");
    assert_eq!(package["author"]["name"], TEST_AUTHOR_NAME);

    for entry in walk_files(&dest) {
        let text = fs::read_to_string(&entry).unwrap_or_default();
        assert!(
            !text.contains("PROJECT_"),
            "unrendered placeholder in {}",
            entry.display()
        );
    }
    assert!(
        fs::read_to_string(dest.join("LICENSE"))
            .expect("license")
            .starts_with("BSD 2-Clause License")
    );

    assert_eq!(count_commits(Path::new(&bare), "main"), 1);
    assert_eq!(store.settings().license, "BSD-2-Clause");
}

fn walk_files(dir: &Path) -> Vec<std::path::PathBuf> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).expect("read_dir") {
        let path = entry.expect("entry").path();
        if path.file_name().is_some_and(|n| n == ".git") {
            continue;
        }
        if path.is_dir() {
            files.extend(walk_files(&path));
        } else {
            files.push(path);
        }
    }
    files
}
