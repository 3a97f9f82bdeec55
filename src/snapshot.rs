//! Read-only repository listings consumed by the validation layer

use anyhow::Result;

/// A local or remote branch as seen by validation.
#[derive(Clone, Debug)]
pub struct BranchInfo {
    pub name: String,
    pub is_current: bool,
}

/// Tag information
#[derive(Clone, Debug)]
pub struct TagInfo {
    pub name: String,
}

/// A configured remote
#[derive(Clone, Debug)]
pub struct RemoteInfo {
    pub name: String,
    pub url: String,
}

/// Point-in-time listings of repository metadata, queried on demand.
///
/// Implementations are expected to be cheap enough to call on every
/// confirm; there is no subscription model. A snapshot may be stale by the
/// time a mutation runs - the mutation itself is the authority and may fail.
pub trait RepoSnapshot {
    fn branches(&self) -> Result<Vec<BranchInfo>>;
    fn tags(&self) -> Result<Vec<TagInfo>>;
    fn remotes(&self) -> Result<Vec<RemoteInfo>>;
}
