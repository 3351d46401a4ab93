//! GitHub API interactions for repository creation and deletion.

use serde::Serialize;
use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::core::types::{Credential, RemoteRepository};

/// GitHub API base URL
pub const GITHUB_API_BASE: &str = "https://api.github.com";

const ACCEPT: &str = "application/vnd.github+json";
const API_VERSION: &str = "2022-11-28";

/// Errors returned by the remote repository host.
#[derive(Debug, Error)]
pub enum RemoteApiError {
    /// No secret available for the request
    #[error("GitHub token missing")]
    MissingToken,

    /// Non-success HTTP response
    #[error("GitHub returned {status}: {body}")]
    Status { status: u16, body: String },

    /// Network or other transport error
    #[error("HTTP request failed: {0}")]
    Transport(String),

    /// Failed to parse response
    #[error("failed to parse GitHub response: {0}")]
    Parse(String),
}

impl RemoteApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            RemoteApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Request body for `POST /user/repos`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewRepository {
    pub name: String,
    pub private: bool,
    pub description: String,
    pub homepage: String,
}

/// Remote repository host operations.
pub trait RemoteRepositories {
    fn create_repository(
        &self,
        request: &NewRepository,
        credential: &Credential,
    ) -> Result<RemoteRepository, RemoteApiError>;

    fn delete_repository(
        &self,
        name: &str,
        owner: &str,
        credential: &Credential,
    ) -> Result<(), RemoteApiError>;
}

/// [`RemoteRepositories`] backed by the GitHub REST API.
#[derive(Debug, Clone)]
pub struct GithubClient {
    base_url: String,
}

impl Default for GithubClient {
    fn default() -> Self {
        Self::new()
    }
}

impl GithubClient {
    pub fn new() -> Self {
        Self::with_base_url(GITHUB_API_BASE)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn request(&self, method: &str, path: &str, credential: &Credential) -> ureq::Request {
        let user_agent = if credential.identity.is_empty() {
            "scaffold-cli"
        } else {
            credential.identity.as_str()
        };
        ureq::request(method, &format!("{}{}", self.base_url, path))
            .set("Authorization", &format!("Bearer {}", credential.secret))
            .set("Accept", ACCEPT)
            .set("User-Agent", user_agent)
            .set("X-GitHub-Api-Version", API_VERSION)
    }
}

impl RemoteRepositories for GithubClient {
    #[instrument(skip_all, fields(name = %request.name, private = request.private))]
    fn create_repository(
        &self,
        request: &NewRepository,
        credential: &Credential,
    ) -> Result<RemoteRepository, RemoteApiError> {
        if credential.secret.trim().is_empty() {
            return Err(RemoteApiError::MissingToken);
        }
        info!("creating GitHub repository");
        let response = self
            .request("POST", "/user/repos", credential)
            .send_json(request)
            .map_err(map_ureq_error)?;
        let repo: RemoteRepository = response
            .into_json()
            .map_err(|e| RemoteApiError::Parse(e.to_string()))?;
        info!(html_url = %repo.html_url, "repository created");
        Ok(repo)
    }

    #[instrument(skip_all, fields(name, owner))]
    fn delete_repository(
        &self,
        name: &str,
        owner: &str,
        credential: &Credential,
    ) -> Result<(), RemoteApiError> {
        if credential.secret.trim().is_empty() {
            return Err(RemoteApiError::MissingToken);
        }
        info!("deleting GitHub repository");
        self.request("DELETE", &format!("/repos/{owner}/{name}"), credential)
            .call()
            .map_err(map_ureq_error)?;
        info!("repository deleted");
        Ok(())
    }
}

fn map_ureq_error(err: ureq::Error) -> RemoteApiError {
    match err {
        ureq::Error::Status(status, resp) => {
            let body = resp.into_string().unwrap_or_default();
            warn!(status, body = %body, "GitHub request rejected");
            RemoteApiError::Status { status, body }
        }
        other => RemoteApiError::Transport(other.to_string()),
    }
}
