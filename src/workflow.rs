//! Concrete dialog workflows. Each one binds its field values and
//! collaborators at construction, validates via the rules in
//! [`crate::validate`], and dispatches its mutation through the async helpers
//! in [`crate::git`]. No workflow owns the repository; it borrows it at
//! confirm time and workers re-open it by path.

use std::any::Any;
use std::path::Path;
use std::sync::mpsc::Receiver;

use git2::Oid;

use crate::git::{self, BranchType, GitRepo, MutationOutcome};
use crate::popup::Workflow;
use crate::validate::{self, ValidationContext, ValidationResult};

/// Start a git-flow branch: the representative dialog template. The prefix
/// is fetched from repository config once, at construction, and the same
/// prefix drives both validation and the created ref name.
pub struct StartGitFlowBranch {
    branch_type: BranchType,
    prefix: String,
    pub sub_name: String,
}

impl StartGitFlowBranch {
    pub fn new(repo: &GitRepo, branch_type: BranchType) -> Self {
        Self {
            branch_type,
            prefix: repo.git_flow_prefix(branch_type),
            sub_name: String::new(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}

impl Workflow for StartGitFlowBranch {
    fn title_key(&self) -> &'static str {
        match self.branch_type {
            BranchType::Feature => "GitFlow.StartFeatureTitle",
            BranchType::Release => "GitFlow.StartReleaseTitle",
            BranchType::Hotfix => "GitFlow.StartHotfixTitle",
        }
    }

    fn validate(&self, ctx: &ValidationContext) -> ValidationResult {
        validate::branch_name(&self.sub_name, &self.prefix, ctx)
    }

    fn dispatch(&self, workdir: &Path) -> Receiver<MutationOutcome> {
        git::start_git_flow_branch_async(
            workdir.to_path_buf(),
            self.branch_type,
            self.sub_name.clone(),
        )
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Create a plain branch at a commit.
pub struct CreateBranch {
    target: Oid,
    pub name: String,
}

impl CreateBranch {
    pub fn new(target: Oid) -> Self {
        Self { target, name: String::new() }
    }
}

impl Workflow for CreateBranch {
    fn title_key(&self) -> &'static str {
        "CreateBranchTitle"
    }

    fn validate(&self, ctx: &ValidationContext) -> ValidationResult {
        validate::branch_name(&self.name, "", ctx)
    }

    fn dispatch(&self, workdir: &Path) -> Receiver<MutationOutcome> {
        git::create_branch_async(workdir.to_path_buf(), self.name.clone(), self.target)
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Create a lightweight tag at a commit.
pub struct CreateTag {
    target: Oid,
    pub name: String,
}

impl CreateTag {
    pub fn new(target: Oid) -> Self {
        Self { target, name: String::new() }
    }
}

impl Workflow for CreateTag {
    fn title_key(&self) -> &'static str {
        "CreateTagTitle"
    }

    fn validate(&self, ctx: &ValidationContext) -> ValidationResult {
        validate::tag_name(&self.name, ctx)
    }

    fn dispatch(&self, workdir: &Path) -> Receiver<MutationOutcome> {
        git::create_tag_async(workdir.to_path_buf(), self.name.clone(), self.target)
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Add a remote with a name and URL.
pub struct AddRemote {
    pub name: String,
    pub url: String,
}

impl AddRemote {
    pub fn new() -> Self {
        Self { name: "origin".to_string(), url: String::new() }
    }
}

impl Default for AddRemote {
    fn default() -> Self {
        Self::new()
    }
}

impl Workflow for AddRemote {
    fn title_key(&self) -> &'static str {
        "AddRemoteTitle"
    }

    fn validate(&self, ctx: &ValidationContext) -> ValidationResult {
        let name = validate::remote_name(&self.name, ctx);
        if !name.is_valid() {
            return name;
        }
        validate::remote_url(&self.url, git::is_valid_remote_url)
    }

    fn dispatch(&self, workdir: &Path) -> Receiver<MutationOutcome> {
        git::add_remote_async(workdir.to_path_buf(), self.name.clone(), self.url.clone())
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Rename an existing remote. Keeping the current name is a valid no-op.
pub struct RenameRemote {
    previous: String,
    pub name: String,
}

impl RenameRemote {
    pub fn new(previous: impl Into<String>) -> Self {
        let previous = previous.into();
        Self { name: previous.clone(), previous }
    }
}

impl Workflow for RenameRemote {
    fn title_key(&self) -> &'static str {
        "RenameRemoteTitle"
    }

    fn validate(&self, ctx: &ValidationContext) -> ValidationResult {
        let ctx = ctx.clone().with_previous(self.previous.clone());
        validate::remote_name(&self.name, &ctx)
    }

    fn dispatch(&self, workdir: &Path) -> Receiver<MutationOutcome> {
        git::rename_remote_async(workdir.to_path_buf(), self.previous.clone(), self.name.clone())
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
