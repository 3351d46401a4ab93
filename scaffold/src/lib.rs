//! Project scaffolder: resolve a layered configuration into a provisioning
//! plan and run the pipeline that materializes it.
//!
//! The crate keeps a strict split:
//!
//! - **[`core`]**: Pure logic (settings projection, plan, stages, naming,
//!   message catalogs). No I/O.
//! - **[`io`]**: Side-effecting collaborators (filesystem, settings file,
//!   git, GitHub, prompts, child processes), each behind a trait seam so
//!   tests can substitute scripted doubles.
//!
//! [`details`] resolves the plan and [`provision`] runs the pipeline on it.

pub mod core;
pub mod details;
pub mod error;
pub mod exit_codes;
pub mod io;
pub mod logging;
pub mod provision;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
