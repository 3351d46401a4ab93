//! Shared value types for configuration and plans.
//!
//! These are plain data: no I/O, stable serialized shape (camelCase) so they
//! can live both in the settings file and in projection sources.

use serde::{Deserialize, Serialize};

/// An `{identity, secret}` pair authorizing remote repository creation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Credential {
    pub identity: String,
    pub secret: String,
}

impl Credential {
    pub fn new(identity: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            identity: identity.into(),
            secret: secret.into(),
        }
    }

    /// True when both identity and secret are non-empty.
    pub fn is_usable(&self) -> bool {
        !self.identity.trim().is_empty() && !self.secret.trim().is_empty()
    }
}

/// Project author details.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Author {
    pub name: String,
    pub email: String,
    pub url: String,
}

/// Remote version-control coordinates of a project.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VcsInfo {
    pub name: String,
    pub http_url: String,
    pub ssh_url: String,
}

/// A repository that exists on the remote host.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RemoteRepository {
    pub name: String,
    pub html_url: String,
    pub ssh_url: String,
}
