//! Naming validation engine - stateful rules checked against live repository
//! listings before any mutation is attempted.
//!
//! Invalid input is an expected, frequent state here, not a fault: every rule
//! returns a [`ValidationResult`] carrying a message key, never an error.

use std::path::Path;

use crate::grammar::{self, GrammarError, RefKind};
use crate::snapshot::RepoSnapshot;

/// Message keys surfaced to the user for failing rules. The core treats these
/// as opaque identifiers; [`crate::text::TextResolver`] turns them into
/// display strings at the presentation edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MessageKey {
    EmptyBranchName,
    BadBranchName,
    DuplicatedBranchName,
    EmptyTagName,
    BadTagName,
    DuplicatedTagName,
    EmptyRemoteName,
    BadRemoteName,
    DuplicatedRemoteName,
    EmptyCommitMessage,
    BadPatchFile,
    BadCloneFolder,
    BadSubmodulePath,
    BadRemoteUri,
}

impl MessageKey {
    pub fn as_str(self) -> &'static str {
        match self {
            MessageKey::EmptyBranchName => "EmptyBranchName",
            MessageKey::BadBranchName => "BadBranchName",
            MessageKey::DuplicatedBranchName => "DuplicatedBranchName",
            MessageKey::EmptyTagName => "EmptyTagName",
            MessageKey::BadTagName => "BadTagName",
            MessageKey::DuplicatedTagName => "DuplicatedTagName",
            MessageKey::EmptyRemoteName => "EmptyRemoteName",
            MessageKey::BadRemoteName => "BadRemoteName",
            MessageKey::DuplicatedRemoteName => "DuplicatedRemoteName",
            MessageKey::EmptyCommitMessage => "EmptyCommitMessage",
            MessageKey::BadPatchFile => "BadPatchFile",
            MessageKey::BadCloneFolder => "BadCloneFolder",
            MessageKey::BadSubmodulePath => "BadSubmodulePath",
            MessageKey::BadRemoteUri => "BadRemoteUri",
        }
    }
}

/// Outcome of a single rule. No warning or partial state exists.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ValidationResult {
    Valid,
    Invalid(MessageKey),
}

impl ValidationResult {
    pub fn is_valid(self) -> bool {
        matches!(self, ValidationResult::Valid)
    }

    pub fn message_key(self) -> Option<MessageKey> {
        match self {
            ValidationResult::Valid => None,
            ValidationResult::Invalid(key) => Some(key),
        }
    }
}

/// Explicit value carrying everything a rule may consult: the repository
/// listings at validation time, and for rename flows the previous identity
/// (so renaming something to its own current name stays valid).
#[derive(Clone, Debug, Default)]
pub struct ValidationContext {
    pub branches: Vec<String>,
    pub tags: Vec<String>,
    pub remotes: Vec<String>,
    pub previous: Option<String>,
}

impl ValidationContext {
    /// Build a context from a fresh snapshot. Called on every confirm so the
    /// listings are as current as they can be before dispatch.
    pub fn from_snapshot(snapshot: &dyn RepoSnapshot) -> anyhow::Result<Self> {
        Ok(Self {
            branches: snapshot.branches()?.into_iter().map(|b| b.name).collect(),
            tags: snapshot.tags()?.into_iter().map(|t| t.name).collect(),
            remotes: snapshot.remotes()?.into_iter().map(|r| r.name).collect(),
            previous: None,
        })
    }

    pub fn with_previous(mut self, name: impl Into<String>) -> Self {
        self.previous = Some(name.into());
        self
    }
}

/// Branch name: required, grammar on `prefix + value`, unique among branches
/// by exact match on the same joined name.
pub fn branch_name(value: &str, prefix: &str, ctx: &ValidationContext) -> ValidationResult {
    if value.trim().is_empty() {
        return ValidationResult::Invalid(MessageKey::EmptyBranchName);
    }
    let full = grammar::join_prefix(prefix, value);
    if grammar::check(RefKind::Branch, &full).is_err() {
        return ValidationResult::Invalid(MessageKey::BadBranchName);
    }
    if ctx.branches.iter().any(|b| *b == full) {
        return ValidationResult::Invalid(MessageKey::DuplicatedBranchName);
    }
    ValidationResult::Valid
}

/// Tag name: required, grammar, unique among tags.
pub fn tag_name(value: &str, ctx: &ValidationContext) -> ValidationResult {
    match grammar::check(RefKind::Tag, value) {
        Err(GrammarError::Empty) => return ValidationResult::Invalid(MessageKey::EmptyTagName),
        Err(GrammarError::BadFormat) => return ValidationResult::Invalid(MessageKey::BadTagName),
        Ok(()) => {}
    }
    if ctx.tags.iter().any(|t| t == value) {
        return ValidationResult::Invalid(MessageKey::DuplicatedTagName);
    }
    ValidationResult::Valid
}

/// Remote name: required, grammar, unique among remotes - except that a value
/// equal to `ctx.previous` is always accepted, so renaming a remote to its
/// own current name never reports a false duplicate.
pub fn remote_name(value: &str, ctx: &ValidationContext) -> ValidationResult {
    match grammar::check(RefKind::Remote, value) {
        Err(GrammarError::Empty) => return ValidationResult::Invalid(MessageKey::EmptyRemoteName),
        Err(GrammarError::BadFormat) => return ValidationResult::Invalid(MessageKey::BadRemoteName),
        Ok(()) => {}
    }
    if ctx.previous.as_deref() == Some(value) {
        return ValidationResult::Valid;
    }
    if ctx.remotes.iter().any(|r| r == value) {
        return ValidationResult::Invalid(MessageKey::DuplicatedRemoteName);
    }
    ValidationResult::Valid
}

/// Commit subject: non-empty after trimming. No grammar, no uniqueness.
pub fn commit_subject(value: &str) -> ValidationResult {
    if value.trim().is_empty() {
        ValidationResult::Invalid(MessageKey::EmptyCommitMessage)
    } else {
        ValidationResult::Valid
    }
}

/// Patch file: valid iff the path exists as a file. An existence probe at
/// validation time only - the file may be gone by the time the worker runs.
pub fn patch_file(value: &str) -> ValidationResult {
    if !value.is_empty() && Path::new(value).is_file() {
        ValidationResult::Valid
    } else {
        ValidationResult::Invalid(MessageKey::BadPatchFile)
    }
}

/// Clone destination: valid iff the path exists as a directory.
pub fn clone_folder(value: &str) -> ValidationResult {
    if !value.is_empty() && Path::new(value).is_dir() {
        ValidationResult::Valid
    } else {
        ValidationResult::Invalid(MessageKey::BadCloneFolder)
    }
}

/// Submodule path: required, grammar only. No uniqueness check.
pub fn submodule_path(value: &str) -> ValidationResult {
    match grammar::check(RefKind::SubmodulePath, value) {
        Ok(()) => ValidationResult::Valid,
        Err(_) => ValidationResult::Invalid(MessageKey::BadSubmodulePath),
    }
}

/// Remote URL: delegates entirely to a collaborator's checker; no URL grammar
/// is duplicated here.
pub fn remote_url(value: &str, checker: impl Fn(&str) -> bool) -> ValidationResult {
    if checker(value) {
        ValidationResult::Valid
    } else {
        ValidationResult::Invalid(MessageKey::BadRemoteUri)
    }
}

/// A field-bindable rule. Dialogs compose these in ordered lists via
/// [`validate_all`] rather than subclassing anything; the first failure wins.
#[derive(Clone, Debug)]
pub enum Rule {
    BranchName { prefix: String },
    TagName,
    RemoteName,
    CommitSubject,
    PatchFile,
    CloneFolder,
    SubmodulePath,
}

impl Rule {
    pub fn validate(&self, value: &str, ctx: &ValidationContext) -> ValidationResult {
        match self {
            Rule::BranchName { prefix } => branch_name(value, prefix, ctx),
            Rule::TagName => tag_name(value, ctx),
            Rule::RemoteName => remote_name(value, ctx),
            Rule::CommitSubject => commit_subject(value),
            Rule::PatchFile => patch_file(value),
            Rule::CloneFolder => clone_folder(value),
            Rule::SubmodulePath => submodule_path(value),
        }
    }
}

/// Run rules in order against one field value; the first failure wins.
pub fn validate_all(rules: &[Rule], value: &str, ctx: &ValidationContext) -> ValidationResult {
    for rule in rules {
        let result = rule.validate(value, ctx);
        if !result.is_valid() {
            return result;
        }
    }
    ValidationResult::Valid
}
