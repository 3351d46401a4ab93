//! Failure taxonomy surfaced by plan resolution and the provisioning pipeline.

use std::path::PathBuf;

use thiserror::Error;

use crate::core::stage::Stage;
use crate::exit_codes;
use crate::io::github::RemoteApiError;

#[derive(Debug, Error)]
pub enum ScaffoldError {
    #[error("a path for the new project is required")]
    MissingArgument,

    #[error(
        "the project folder '{}' already exists; specify a different path",
        .0.display()
    )]
    AlreadyExists(PathBuf),

    #[error(
        "settings file {} is not accessible (run `scaffold-install` to create it)",
        path.display()
    )]
    ConfigNotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("settings file {} is not valid JSON", path.display())]
    MalformedConfig {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("write settings file {}", path.display())]
    ConfigWrite {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("no GitHub credential configured")]
    NoCredential,

    #[error(transparent)]
    RemoteApi(#[from] RemoteApiError),

    #[error("{stage}: version control operation failed")]
    Vcs {
        stage: Stage,
        #[source]
        source: anyhow::Error,
    },

    #[error("{stage}: filesystem operation failed")]
    FileSystem {
        stage: Stage,
        #[source]
        source: anyhow::Error,
    },

    #[error("prompt failed")]
    Prompt(#[source] anyhow::Error),

    #[error("dependency installation failed")]
    Install(#[source] anyhow::Error),
}

impl ScaffoldError {
    /// Stable process exit code for this failure kind.
    pub fn exit_code(&self) -> i32 {
        match self {
            ScaffoldError::MissingArgument => exit_codes::INVALID_ARGUMENT,
            ScaffoldError::AlreadyExists(_) => exit_codes::PATH_CONFLICT,
            ScaffoldError::ConfigNotFound { .. }
            | ScaffoldError::MalformedConfig { .. }
            | ScaffoldError::ConfigWrite { .. } => exit_codes::CONFIG,
            _ => exit_codes::FAILED,
        }
    }
}

/// Exit code for an arbitrary error chain.
pub fn exit_code_for(err: &anyhow::Error) -> i32 {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<ScaffoldError>())
        .map(ScaffoldError::exit_code)
        .unwrap_or(exit_codes::FAILED)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[test]
    fn exit_codes_distinguish_failure_kinds() {
        assert_eq!(
            ScaffoldError::MissingArgument.exit_code(),
            exit_codes::INVALID_ARGUMENT
        );
        assert_eq!(
            ScaffoldError::AlreadyExists(PathBuf::from("/tmp/x")).exit_code(),
            exit_codes::PATH_CONFLICT
        );
        let vcs = ScaffoldError::Vcs {
            stage: Stage::VcsInitialized,
            source: anyhow!("boom"),
        };
        assert_eq!(vcs.exit_code(), exit_codes::FAILED);
    }

    #[test]
    fn exit_code_for_finds_wrapped_error() {
        let err = anyhow::Error::new(ScaffoldError::AlreadyExists(PathBuf::from("/tmp/x")))
            .context("provision project");
        assert_eq!(exit_code_for(&err), exit_codes::PATH_CONFLICT);
        assert_eq!(exit_code_for(&anyhow!("plain")), exit_codes::FAILED);
    }

    #[test]
    fn stage_appears_in_message() {
        let err = ScaffoldError::FileSystem {
            stage: Stage::FolderCreated,
            source: anyhow!("denied"),
        };
        assert_eq!(err.to_string(), "folder-created: filesystem operation failed");
    }
}
