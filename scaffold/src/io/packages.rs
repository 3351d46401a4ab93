//! Development dependency installation through npm or yarn.

use std::path::Path;
use std::process::Command;
use std::time::Duration;

use anyhow::{Result, anyhow};
use tracing::{info, instrument};

use crate::io::process::run_command_with_timeout;

/// Package installs routinely take a few minutes on a cold cache.
pub const INSTALL_TIMEOUT: Duration = Duration::from_secs(600);
const OUTPUT_LIMIT_BYTES: usize = 256 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageManager {
    Npm,
    Yarn,
}

impl PackageManager {
    pub fn from_use_yarn(use_yarn: bool) -> Self {
        if use_yarn {
            PackageManager::Yarn
        } else {
            PackageManager::Npm
        }
    }

    pub fn program(self) -> &'static str {
        match self {
            PackageManager::Npm => "npm",
            PackageManager::Yarn => "yarn",
        }
    }

    /// Arguments that add `packages` as development dependencies.
    pub fn dev_install_args(self, packages: &[String]) -> Vec<String> {
        let verb = match self {
            PackageManager::Npm => "install",
            PackageManager::Yarn => "add",
        };
        [verb.to_string(), "-D".to_string()]
            .into_iter()
            .chain(packages.iter().cloned())
            .collect()
    }
}

/// Installs development dependencies into a project directory.
pub trait PackageInstaller {
    fn install_dev(&self, dir: &Path, manager: PackageManager, packages: &[String]) -> Result<()>;
}

/// [`PackageInstaller`] that shells out to the package manager binary.
#[derive(Debug, Clone)]
pub struct CommandInstaller {
    timeout: Duration,
}

impl Default for CommandInstaller {
    fn default() -> Self {
        Self {
            timeout: INSTALL_TIMEOUT,
        }
    }
}

impl CommandInstaller {
    pub fn with_timeout(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl PackageInstaller for CommandInstaller {
    #[instrument(skip_all, fields(dir = %dir.display(), manager = manager.program(), count = packages.len()))]
    fn install_dev(&self, dir: &Path, manager: PackageManager, packages: &[String]) -> Result<()> {
        if packages.is_empty() {
            info!("no packages to install");
            return Ok(());
        }
        let mut cmd = Command::new(manager.program());
        cmd.args(manager.dev_install_args(packages)).current_dir(dir);

        let output = run_command_with_timeout(cmd, self.timeout, OUTPUT_LIMIT_BYTES)?;
        if output.timed_out {
            return Err(anyhow!(
                "{} timed out after {}s",
                manager.program(),
                self.timeout.as_secs()
            ));
        }
        if !output.success() {
            return Err(anyhow!(
                "{} exited with {:?}: {}",
                manager.program(),
                output.status.code(),
                output.stderr_tail()
            ));
        }
        info!("packages installed");
        Ok(())
    }
}
