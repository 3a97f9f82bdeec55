//! popgit - the mutation-workflow layer of a git client.
//!
//! Turns a user's intent to create or rename a branch, tag, or remote (or
//! start a git-flow branch) into a validated, asynchronously-executed
//! repository operation, coordinated through a single-slot modal popup:
//!
//! - [`grammar`] / [`validate`]: naming rules checked against live
//!   repository listings before any mutation is attempted.
//! - [`popup`]: the lockable coordinator guaranteeing at most one dialog and
//!   one in-flight mutation per repository context.
//! - [`workflow`]: concrete dialogs wiring rules to fields and dispatching
//!   mutations to worker threads.
//! - [`git`]: the git2 backend behind both the snapshots and the mutations.
//!
//! Rendering, input handling, and localization content live in the embedding
//! application; this crate only hands it message keys and notices.

pub mod config;
pub mod git;
pub mod grammar;
pub mod notice;
pub mod popup;
pub mod snapshot;
pub mod text;
pub mod validate;
pub mod workflow;

#[cfg(test)]
mod testutil;

pub use git::{BranchType, GitRepo, MutationOutcome};
pub use notice::{Notice, Notifier, Severity};
pub use popup::{CloseBehavior, PopupController, PopupState, Workflow};
pub use validate::{MessageKey, ValidationContext, ValidationResult};
