//! Lexical rules for proposed ref names - pure pattern checks, no repository access

use std::sync::LazyLock;

use regex::Regex;

/// What kind of name is being checked. Branches permit `/` for hierarchical
/// names; tags and remotes do not.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RefKind {
    Branch,
    Tag,
    Remote,
    SubmodulePath,
}

/// Why a name failed the grammar. Empty input is reported separately from a
/// pattern mismatch so callers can show "required" vs "invalid format".
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GrammarError {
    Empty,
    BadFormat,
}

static TAG_OR_REMOTE_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\w\-\.]+$").expect("tag/remote name pattern"));

static BRANCH_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\w\-/\.]+$").expect("branch name pattern"));

static SUBMODULE_PATH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\w\-\._/]+$").expect("submodule path pattern"));

/// Check the lexical shape of a proposed name.
///
/// Submodule paths are trimmed of surrounding whitespace before matching;
/// other kinds are matched as-is.
pub fn check(kind: RefKind, text: &str) -> Result<(), GrammarError> {
    if text.trim().is_empty() {
        return Err(GrammarError::Empty);
    }

    let ok = match kind {
        RefKind::Branch => BRANCH_NAME.is_match(text),
        RefKind::Tag | RefKind::Remote => TAG_OR_REMOTE_NAME.is_match(text),
        RefKind::SubmodulePath => SUBMODULE_PATH.is_match(text.trim()),
    };

    if ok { Ok(()) } else { Err(GrammarError::BadFormat) }
}

/// Prepend a git-flow style prefix to a sub-name.
///
/// This is the single concatenation point shared by validation and the
/// mutation backend, so the name checked for uniqueness is byte-for-byte the
/// name the worker later creates.
pub fn join_prefix(prefix: &str, name: &str) -> String {
    format!("{prefix}{name}")
}
