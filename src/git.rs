//! git2-backed repository access: snapshot queries consumed by validation and
//! the mutating operations dispatched by popup workflows.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use std::sync::mpsc::{self, Receiver};

use anyhow::{Context, Result};
use git2::build::CheckoutBuilder;
use git2::{Oid, Repository};
use regex::Regex;
use tracing::debug;

use crate::grammar;
use crate::snapshot::{BranchInfo, RemoteInfo, RepoSnapshot, TagInfo};

/// Git-flow branch category. Fixed after a workflow is constructed; selects
/// the configured prefix and the base branch the new branch starts from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BranchType {
    Feature,
    Release,
    Hotfix,
}

impl BranchType {
    /// Repository config key holding the prefix for this category.
    fn prefix_key(self) -> &'static str {
        match self {
            BranchType::Feature => "gitflow.prefix.feature",
            BranchType::Release => "gitflow.prefix.release",
            BranchType::Hotfix => "gitflow.prefix.hotfix",
        }
    }

    /// Conventional prefix used when the repository has no git-flow config.
    fn default_prefix(self) -> &'static str {
        match self {
            BranchType::Feature => "feature/",
            BranchType::Release => "release/",
            BranchType::Hotfix => "hotfix/",
        }
    }

    /// Config key naming the branch this category starts from. Features and
    /// releases branch off develop; hotfixes branch off the production line.
    fn base_key(self) -> &'static str {
        match self {
            BranchType::Feature | BranchType::Release => "gitflow.branch.develop",
            BranchType::Hotfix => "gitflow.branch.master",
        }
    }
}

/// Final result of one background mutation, sent once on the operation's
/// channel. `label` names the operation for user-facing messages.
#[derive(Clone, Debug)]
pub struct MutationOutcome {
    pub label: String,
    pub result: Result<String, String>,
}

/// Repository wrapper for the mutation-workflow layer
pub struct GitRepo {
    repo: Repository,
}

impl GitRepo {
    /// Open a repository at the given path
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let repo = Repository::discover(path.as_ref())
            .with_context(|| format!("Failed to open repository at {:?}", path.as_ref()))?;
        Ok(Self { repo })
    }

    /// Get the repository's working directory
    pub fn workdir(&self) -> Option<&Path> {
        self.repo.workdir()
    }

    /// Get the current branch name
    pub fn current_branch(&self) -> Result<String> {
        let head = self.repo.head().context("Failed to get HEAD")?;
        Ok(head.shorthand().unwrap_or("HEAD").to_string())
    }

    /// Get the head commit OID
    pub fn head_oid(&self) -> Result<Oid> {
        let head = self.repo.head().context("Failed to get HEAD")?;
        head.target().context("HEAD has no target")
    }

    /// Create a branch pointing at the given commit. Does not check it out.
    pub fn create_branch_at(&self, name: &str, oid: Oid) -> Result<()> {
        let commit = self.repo.find_commit(oid).context("Failed to find commit")?;
        self.repo
            .branch(name, &commit, false)
            .with_context(|| format!("Failed to create branch '{}'", name))?;
        Ok(())
    }

    /// Create a lightweight tag pointing at the given commit.
    pub fn create_tag(&self, name: &str, oid: Oid) -> Result<()> {
        let object = self
            .repo
            .find_object(oid, None)
            .context("Failed to find object for tag")?;
        self.repo
            .tag_lightweight(name, &object, false)
            .with_context(|| format!("Failed to create tag '{}'", name))?;
        Ok(())
    }

    /// Add a remote
    pub fn add_remote(&self, name: &str, url: &str) -> Result<()> {
        self.repo
            .remote(name, url)
            .with_context(|| format!("Failed to add remote '{}'", name))?;
        Ok(())
    }

    /// Rename a remote
    pub fn rename_remote(&self, old_name: &str, new_name: &str) -> Result<()> {
        let problems = self
            .repo
            .remote_rename(old_name, new_name)
            .with_context(|| format!("Failed to rename remote '{}'", old_name))?;
        // Non-default refspecs that could not be rewritten; the rename itself
        // succeeded.
        for spec in problems.iter().flatten() {
            debug!(refspec = spec, "refspec not rewritten during remote rename");
        }
        Ok(())
    }

    /// Change a remote's fetch URL
    pub fn set_remote_url(&self, name: &str, url: &str) -> Result<()> {
        self.repo
            .remote_set_url(name, url)
            .with_context(|| format!("Failed to set URL for remote '{}'", name))?;
        Ok(())
    }

    /// The configured git-flow prefix for a branch category, falling back to
    /// the conventional prefix when git-flow was never initialized.
    pub fn git_flow_prefix(&self, kind: BranchType) -> String {
        self.repo
            .config()
            .and_then(|cfg| cfg.get_string(kind.prefix_key()))
            .unwrap_or_else(|_| kind.default_prefix().to_string())
    }

    /// Resolve the commit a git-flow branch of this category starts from:
    /// the configured base branch if it exists, otherwise current HEAD.
    fn git_flow_base_commit(&self, kind: BranchType) -> Result<git2::Commit<'_>> {
        if let Ok(cfg) = self.repo.config()
            && let Ok(base) = cfg.get_string(kind.base_key())
            && let Ok(branch) = self.repo.find_branch(&base, git2::BranchType::Local)
        {
            return branch
                .get()
                .peel_to_commit()
                .with_context(|| format!("Base branch '{}' has no commit", base));
        }
        self.repo
            .head()
            .context("Failed to get HEAD")?
            .peel_to_commit()
            .context("HEAD has no commit")
    }

    /// Start a git-flow branch: create `<prefix><sub_name>` from the
    /// category's base and check it out. Returns the full branch name.
    ///
    /// The name is joined with [`grammar::join_prefix`], the same
    /// concatenation validation used, so the created ref matches the name
    /// that passed uniqueness.
    pub fn start_git_flow_branch(&self, kind: BranchType, sub_name: &str) -> Result<String> {
        let prefix = self.git_flow_prefix(kind);
        let full = grammar::join_prefix(&prefix, sub_name);
        let base = self.git_flow_base_commit(kind)?;

        let branch = self
            .repo
            .branch(&full, &base, false)
            .with_context(|| format!("Failed to create branch '{}'", full))?;

        let refname = branch
            .get()
            .name()
            .with_context(|| format!("Branch '{}' has a non-utf8 ref name", full))?
            .to_string();
        self.repo
            .set_head(&refname)
            .with_context(|| format!("Failed to switch HEAD to '{}'", full))?;
        self.repo
            .checkout_head(Some(CheckoutBuilder::new().safe()))
            .context("Failed to checkout new branch")?;

        debug!(branch = %full, "started git-flow branch");
        Ok(full)
    }

    #[cfg(test)]
    pub(crate) fn raw_config(&self) -> Result<git2::Config> {
        self.repo.config().context("Failed to get config")
    }
}

impl RepoSnapshot for GitRepo {
    fn branches(&self) -> Result<Vec<BranchInfo>> {
        let branches = self.repo.branches(None).context("Failed to get branches")?;
        let infos = branches
            .filter_map(|b| {
                let (branch, _) = b.ok()?;
                let is_current = branch.is_head();
                let name = branch.name().ok()??.to_string();
                Some(BranchInfo { name, is_current })
            })
            .collect();
        Ok(infos)
    }

    fn tags(&self) -> Result<Vec<TagInfo>> {
        let names = self.repo.tag_names(None).context("Failed to get tags")?;
        Ok(names
            .iter()
            .flatten()
            .map(|name| TagInfo { name: name.to_string() })
            .collect())
    }

    fn remotes(&self) -> Result<Vec<RemoteInfo>> {
        let names = self.repo.remotes().context("Failed to get remotes")?;
        let mut infos = Vec::new();
        for name in names.iter().flatten() {
            let url = self
                .repo
                .find_remote(name)
                .ok()
                .and_then(|r| r.url().map(|u| u.to_string()))
                .unwrap_or_default();
            infos.push(RemoteInfo { name: name.to_string(), url });
        }
        Ok(infos)
    }
}

static REMOTE_URL: LazyLock<Regex> = LazyLock::new(|| {
    // http(s)/git/ssh/file URLs, scp-like user@host:path, or an absolute path
    Regex::new(r"^(?:(?:https?|git|ssh|file)://\S+|[\w\-\.]+@[\w\-\.]+:\S+|/\S+)$")
        .expect("remote URL pattern")
});

/// Syntax check for a remote URL. Consumed by the remote-URL validation rule;
/// the remote itself is still the authority at fetch time.
pub fn is_valid_remote_url(url: &str) -> bool {
    REMOTE_URL.is_match(url)
}

/// Spawn a mutation on a worker thread and return the receiver for its single
/// outcome. The sender being dropped without a message means the worker died.
fn spawn_mutation(
    label: String,
    op: impl FnOnce() -> Result<String> + Send + 'static,
) -> Receiver<MutationOutcome> {
    let (tx, rx) = mpsc::channel();
    std::thread::spawn(move || {
        debug!(label = %label, "mutation worker started");
        // Report the root cause for a cleaner message
        let result = op().map_err(|e| e.root_cause().to_string());
        let _ = tx.send(MutationOutcome { label, result });
    });
    rx
}

/// Start a git-flow branch on a worker thread.
pub fn start_git_flow_branch_async(
    workdir: PathBuf,
    kind: BranchType,
    sub_name: String,
) -> Receiver<MutationOutcome> {
    spawn_mutation(format!("Start git-flow branch '{}'", sub_name), move || {
        let repo = GitRepo::open(&workdir)?;
        let full = repo.start_git_flow_branch(kind, &sub_name)?;
        Ok(format!("Created branch '{}'", full))
    })
}

/// Create a branch at a commit on a worker thread.
pub fn create_branch_async(workdir: PathBuf, name: String, oid: Oid) -> Receiver<MutationOutcome> {
    spawn_mutation(format!("Create branch '{}'", name), move || {
        let repo = GitRepo::open(&workdir)?;
        repo.create_branch_at(&name, oid)?;
        Ok(format!("Created branch '{}'", name))
    })
}

/// Create a lightweight tag on a worker thread.
pub fn create_tag_async(workdir: PathBuf, name: String, oid: Oid) -> Receiver<MutationOutcome> {
    spawn_mutation(format!("Create tag '{}'", name), move || {
        let repo = GitRepo::open(&workdir)?;
        repo.create_tag(&name, oid)?;
        Ok(format!("Created tag '{}'", name))
    })
}

/// Add a remote on a worker thread.
pub fn add_remote_async(workdir: PathBuf, name: String, url: String) -> Receiver<MutationOutcome> {
    spawn_mutation(format!("Add remote '{}'", name), move || {
        let repo = GitRepo::open(&workdir)?;
        repo.add_remote(&name, &url)?;
        Ok(format!("Added remote '{}'", name))
    })
}

/// Rename a remote on a worker thread.
pub fn rename_remote_async(
    workdir: PathBuf,
    old_name: String,
    new_name: String,
) -> Receiver<MutationOutcome> {
    spawn_mutation(format!("Rename remote '{}'", old_name), move || {
        let repo = GitRepo::open(&workdir)?;
        repo.rename_remote(&old_name, &new_name)?;
        Ok(format!("Renamed remote '{}' to '{}'", old_name, new_name))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::init_repo;

    #[test]
    fn test_snapshot_listings() {
        let (_dir, repo) = init_repo();
        repo.add_remote("origin", "https://example.com/repo.git").expect("add remote");

        let branches = repo.branches().expect("branches");
        assert!(branches.iter().any(|b| b.name == "main" && b.is_current));

        let remotes = repo.remotes().expect("remotes");
        assert_eq!(remotes.len(), 1);
        assert_eq!(remotes[0].name, "origin");
        assert_eq!(remotes[0].url, "https://example.com/repo.git");

        assert!(repo.tags().expect("tags").is_empty());
    }

    #[test]
    fn test_create_branch_and_tag() {
        let (_dir, repo) = init_repo();
        let head = repo.head_oid().expect("head");

        repo.create_branch_at("topic", head).expect("create branch");
        assert!(repo.branches().expect("branches").iter().any(|b| b.name == "topic"));

        repo.create_tag("v0.1", head).expect("create tag");
        assert!(repo.tags().expect("tags").iter().any(|t| t.name == "v0.1"));

        // Duplicates are rejected by git itself
        assert!(repo.create_branch_at("topic", head).is_err());
        assert!(repo.create_tag("v0.1", head).is_err());
    }

    #[test]
    fn test_remote_lifecycle() {
        let (_dir, repo) = init_repo();
        repo.add_remote("origin", "https://example.com/a.git").expect("add");
        repo.rename_remote("origin", "upstream").expect("rename");
        repo.set_remote_url("upstream", "https://example.com/b.git").expect("set url");

        let remotes = repo.remotes().expect("remotes");
        assert_eq!(remotes.len(), 1);
        assert_eq!(remotes[0].name, "upstream");
        assert_eq!(remotes[0].url, "https://example.com/b.git");
    }

    #[test]
    fn test_git_flow_prefix_defaults_and_config() {
        let (_dir, repo) = init_repo();
        assert_eq!(repo.git_flow_prefix(BranchType::Feature), "feature/");
        assert_eq!(repo.git_flow_prefix(BranchType::Release), "release/");
        assert_eq!(repo.git_flow_prefix(BranchType::Hotfix), "hotfix/");

        repo.raw_config()
            .expect("config")
            .set_str("gitflow.prefix.feature", "feat/")
            .expect("set prefix");
        assert_eq!(repo.git_flow_prefix(BranchType::Feature), "feat/");
    }

    #[test]
    fn test_start_git_flow_branch_creates_and_checks_out() {
        let (_dir, repo) = init_repo();
        let full = repo
            .start_git_flow_branch(BranchType::Feature, "login")
            .expect("start branch");
        assert_eq!(full, "feature/login");
        assert_eq!(repo.current_branch().expect("current"), "feature/login");

        // Starting the same branch again fails - the mutation is the
        // authority on collisions, not just validation.
        assert!(repo.start_git_flow_branch(BranchType::Feature, "login").is_err());
    }

    #[test]
    fn test_async_mutation_reports_outcome() {
        let (_dir, repo) = init_repo();
        let workdir = repo.workdir().expect("workdir").to_path_buf();

        let rx = start_git_flow_branch_async(workdir, BranchType::Hotfix, "urgent".to_string());
        let outcome = rx.recv().expect("outcome");
        assert!(outcome.result.is_ok(), "unexpected failure: {:?}", outcome.result);
        assert!(repo.branches().expect("branches").iter().any(|b| b.name == "hotfix/urgent"));
    }

    #[test]
    fn test_remote_url_syntax() {
        assert!(is_valid_remote_url("https://github.com/user/repo.git"));
        assert!(is_valid_remote_url("git://example.com/repo.git"));
        assert!(is_valid_remote_url("git@github.com:user/repo.git"));
        assert!(is_valid_remote_url("/srv/git/repo.git"));
        assert!(!is_valid_remote_url("not a url"));
        assert!(!is_valid_remote_url(""));
    }
}
