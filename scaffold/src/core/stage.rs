//! Provisioning pipeline stages and their outcomes.
//!
//! Stages run in declaration order. A stage either completes, is skipped
//! because its precondition does not hold, or degrades (fails without
//! aborting the pipeline). Fatal failures are returned as errors by the
//! orchestrator and never appear in a [`StageReport`].

use std::fmt;

/// One ordered step of the provisioning pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    PathResolved,
    DetailsCollected,
    FolderCreated,
    TemplateMaterialized,
    VcsInitialized,
    Committed,
    RemoteCreated,
    Pushed,
}

impl Stage {
    /// Stages executed against a resolved plan, in order.
    pub const PIPELINE: [Stage; 6] = [
        Stage::FolderCreated,
        Stage::TemplateMaterialized,
        Stage::VcsInitialized,
        Stage::Committed,
        Stage::RemoteCreated,
        Stage::Pushed,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Stage::PathResolved => "path-resolved",
            Stage::DetailsCollected => "details-collected",
            Stage::FolderCreated => "folder-created",
            Stage::TemplateMaterialized => "template-materialized",
            Stage::VcsInitialized => "vcs-initialized",
            Stage::Committed => "committed",
            Stage::RemoteCreated => "remote-created",
            Stage::Pushed => "pushed",
        }
    }

    /// Only remote creation may fail without aborting the pipeline.
    pub fn is_best_effort(self) -> bool {
        self == Stage::RemoteCreated
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Non-fatal result of running a stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageOutcome {
    Completed,
    Skipped,
    /// The stage failed but the pipeline continues; carries the reason.
    Degraded(String),
}

/// Ordered record of the stages a run went through.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StageReport {
    entries: Vec<(Stage, StageOutcome)>,
}

impl StageReport {
    /// Append `outcome` for `stage`.
    ///
    /// Panics in debug builds when stages are recorded out of order.
    pub fn record(&mut self, stage: Stage, outcome: StageOutcome) {
        debug_assert!(
            self.entries.last().is_none_or(|(prev, _)| *prev < stage),
            "stage {stage} recorded out of order"
        );
        self.entries.push((stage, outcome));
    }

    pub fn entries(&self) -> &[(Stage, StageOutcome)] {
        &self.entries
    }

    pub fn outcome(&self, stage: Stage) -> Option<&StageOutcome> {
        self.entries
            .iter()
            .find(|(s, _)| *s == stage)
            .map(|(_, outcome)| outcome)
    }

    pub fn stages(&self) -> Vec<Stage> {
        self.entries.iter().map(|(stage, _)| *stage).collect()
    }

    pub fn is_degraded(&self) -> bool {
        self.entries
            .iter()
            .any(|(_, outcome)| matches!(outcome, StageOutcome::Degraded(_)))
    }
}
