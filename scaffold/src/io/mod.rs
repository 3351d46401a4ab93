//! Side-effecting collaborators: filesystem, git, GitHub, prompts, processes.

pub mod files;
pub mod git;
pub mod github;
pub mod packages;
pub mod process;
pub mod questionnaire;
pub mod settings;
pub mod template;
