//! Deterministic, pure logic shared by the scaffolder.
//!
//! Core modules must be free of I/O side effects. They operate on in-memory
//! data structures and return deterministic outputs suitable for tests.

pub mod messages;
pub mod naming;
pub mod plan;
pub mod projection;
pub mod stage;
pub mod types;
