//! Provisioning orchestration: turn a destination argument into a project
//! directory with committed history and, optionally, a remote.
//!
//! The pipeline is an explicit state machine over [`Stage`]. Every stage is
//! fatal on error except remote creation, which degrades. Nothing is rolled
//! back: a failure leaves the effects of the stages before it on disk.

use std::fs;
use std::sync::mpsc;
use std::thread;

use anyhow::{Context, anyhow};
use chrono::Datelike;
use tracing::{debug, info, instrument, warn};

use crate::core::plan::ProvisioningPlan;
use crate::core::stage::{Stage, StageOutcome, StageReport};
use crate::details::{collect_details, resolve_dest_path};
use crate::error::ScaffoldError;
use crate::io::git::Vcs;
use crate::io::github::{NewRepository, RemoteRepositories};
use crate::io::packages::{PackageInstaller, PackageManager};
use crate::io::questionnaire::Questionnaire;
use crate::io::settings::ConfigStore;
use crate::io::template::TemplateEngine;

/// Result of a successful run.
#[derive(Debug, Clone)]
pub struct ProvisionOutcome {
    pub plan: ProvisioningPlan,
    pub report: StageReport,
}

/// Runs the provisioning pipeline against injected collaborators.
pub struct Provisioner<'a, Q, V, R, T> {
    store: &'a mut ConfigStore,
    questionnaire: &'a Q,
    vcs: &'a V,
    remote: &'a R,
    templates: &'a T,
}

impl<'a, Q, V, R, T> Provisioner<'a, Q, V, R, T>
where
    Q: Questionnaire,
    V: Vcs,
    R: RemoteRepositories,
    T: TemplateEngine,
{
    pub fn new(
        store: &'a mut ConfigStore,
        questionnaire: &'a Q,
        vcs: &'a V,
        remote: &'a R,
        templates: &'a T,
    ) -> Self {
        Self {
            store,
            questionnaire,
            vcs,
            remote,
            templates,
        }
    }

    /// Resolve `raw_dest`, collect details, then run every pipeline stage.
    #[instrument(skip_all, fields(dest = raw_dest.unwrap_or_default()))]
    pub fn run(&mut self, raw_dest: Option<&str>) -> Result<ProvisionOutcome, ScaffoldError> {
        let mut report = StageReport::default();

        let dest = resolve_dest_path(raw_dest)?;
        report.record(Stage::PathResolved, StageOutcome::Completed);

        let year = chrono::Local::now().year();
        let mut plan = collect_details(&dest, &mut *self.store, self.questionnaire, self.vcs, year)?;
        report.record(Stage::DetailsCollected, StageOutcome::Completed);

        for stage in Stage::PIPELINE {
            debug!(%stage, "stage starting");
            let outcome = self.run_stage(stage, &mut plan)?;
            debug_assert!(
                !matches!(outcome, StageOutcome::Degraded(_)) || stage.is_best_effort(),
                "only best-effort stages may degrade"
            );
            info!(%stage, outcome = ?outcome, "stage finished");
            report.record(stage, outcome);
        }

        Ok(ProvisionOutcome { plan, report })
    }

    /// Install lint packages plus the selected test packages with npm or yarn.
    ///
    /// Not part of [`Provisioner::run`]; callers opt in.
    #[instrument(skip_all, fields(dest = %plan.dest_path.display()))]
    pub fn install_dependencies<I: PackageInstaller>(
        &self,
        plan: &ProvisioningPlan,
        installer: &I,
    ) -> Result<(), ScaffoldError> {
        let packages: Vec<String> = self
            .store
            .settings()
            .lint_packages
            .iter()
            .chain(&plan.test_packages)
            .cloned()
            .collect();
        installer
            .install_dev(
                &plan.dest_path,
                PackageManager::from_use_yarn(plan.use_yarn),
                &packages,
            )
            .map_err(ScaffoldError::Install)
    }

    fn run_stage(
        &self,
        stage: Stage,
        plan: &mut ProvisioningPlan,
    ) -> Result<StageOutcome, ScaffoldError> {
        let fs_err = |source| ScaffoldError::FileSystem { stage, source };
        let vcs_err = |source| ScaffoldError::Vcs { stage, source };

        match stage {
            // Both happen before the pipeline proper.
            Stage::PathResolved | Stage::DetailsCollected => Ok(StageOutcome::Completed),
            Stage::FolderCreated => {
                fs::create_dir_all(&plan.dest_path)
                    .with_context(|| format!("create {}", plan.dest_path.display()))
                    .map_err(fs_err)?;
                Ok(StageOutcome::Completed)
            }
            Stage::TemplateMaterialized => {
                self.materialize(plan).map_err(fs_err)?;
                Ok(StageOutcome::Completed)
            }
            Stage::VcsInitialized => {
                let summary = self
                    .vcs
                    .init_repository(&plan.dest_path)
                    .map_err(vcs_err)?;
                debug!(%summary, "repository initialized");
                Ok(StageOutcome::Completed)
            }
            Stage::Committed => {
                let sha = self
                    .vcs
                    .commit(&plan.dest_path, &plan.commit_message)
                    .map_err(vcs_err)?;
                info!(%sha, "initial commit created");
                Ok(StageOutcome::Completed)
            }
            Stage::RemoteCreated => Ok(self.create_remote(plan)),
            Stage::Pushed => {
                if !plan.has_remote {
                    return Ok(StageOutcome::Skipped);
                }
                self.vcs.push(&plan.dest_path).map_err(vcs_err)?;
                Ok(StageOutcome::Completed)
            }
        }
    }

    /// Copy the template, then render placeholders and the license
    /// concurrently. Both tasks are joined; the first one to fail decides
    /// the error and a later failure is only logged.
    fn materialize(&self, plan: &ProvisioningPlan) -> anyhow::Result<()> {
        let source = self.store.templates_path().join(&plan.template_name);
        self.templates
            .copy_template(&source, &plan.dest_path)
            .with_context(|| format!("copy template '{}'", plan.template_name))?;

        let dictionary = plan.dictionary();
        let dictionary = &dictionary;
        let licenses = self.store.licenses_path();
        let templates = self.templates;
        let (done, finished) = mpsc::channel();
        let panicked = thread::scope(|scope| {
            let render_done = done.clone();
            let render = scope.spawn(move || {
                let result = templates
                    .render_placeholders(dictionary, &plan.dest_path)
                    .context("render placeholders");
                let _ = render_done.send(result);
            });
            let license_done = done.clone();
            let license = scope.spawn(move || {
                let result = templates
                    .materialize_license(&plan.license, dictionary, licenses, &plan.dest_path)
                    .with_context(|| format!("materialize license '{}'", plan.license));
                let _ = license_done.send(result);
            });
            [render.join(), license.join()].iter().any(Result::is_err)
        });
        drop(done);

        // Results arrive in completion order.
        let mut failures = finished.try_iter().filter_map(Result::err);
        if let Some(first) = failures.next() {
            for later in failures {
                warn!(error = %format!("{later:#}"), "second stage task also failed");
            }
            return Err(first);
        }
        if panicked {
            return Err(anyhow!("template task panicked"));
        }
        Ok(())
    }

    /// Best effort: any failure is logged and reported as degraded.
    fn create_remote(&self, plan: &mut ProvisioningPlan) -> StageOutcome {
        let result = if plan.use_github {
            self.create_github_remote(plan)
        } else if plan.has_remote {
            self.vcs
                .add_remote(&plan.dest_path, &plan.vcs.ssh_url)
                .map_err(|source| ScaffoldError::Vcs {
                    stage: Stage::RemoteCreated,
                    source,
                })
        } else {
            return StageOutcome::Skipped;
        };

        match result {
            Ok(()) => StageOutcome::Completed,
            Err(err) => {
                plan.has_remote = false;
                let reason = format!("{:#}", anyhow::Error::new(err));
                warn!(%reason, "continuing without a remote repository");
                StageOutcome::Degraded(reason)
            }
        }
    }

    fn create_github_remote(&self, plan: &mut ProvisioningPlan) -> Result<(), ScaffoldError> {
        if !plan.github.is_usable() {
            return Err(ScaffoldError::NoCredential);
        }
        let request = NewRepository {
            name: plan.name.clone(),
            private: plan.is_private,
            description: plan.description.clone(),
            homepage: plan.url.clone(),
        };
        let repo = self.remote.create_repository(&request, &plan.github)?;
        plan.apply_remote(&repo);
        self.vcs
            .add_remote(&plan.dest_path, &plan.vcs.ssh_url)
            .map_err(|source| ScaffoldError::Vcs {
                stage: Stage::RemoteCreated,
                source,
            })
    }
}
