//! Shared test fixtures

use tempfile::TempDir;

use crate::git::GitRepo;

/// Create a throwaway repository on branch `main` with one empty commit and
/// a configured signature.
pub(crate) fn init_repo() -> (TempDir, GitRepo) {
    let dir = tempfile::tempdir().expect("tempdir");

    let mut opts = git2::RepositoryInitOptions::new();
    opts.initial_head("main");
    let repo = git2::Repository::init_opts(dir.path(), &opts).expect("init repo");

    let mut cfg = repo.config().expect("config");
    cfg.set_str("user.name", "Test User").expect("user.name");
    cfg.set_str("user.email", "test@example.com").expect("user.email");

    let sig = repo.signature().expect("signature");
    let tree_id = {
        let mut index = repo.index().expect("index");
        index.write_tree().expect("write tree")
    };
    let tree = repo.find_tree(tree_id).expect("find tree");
    repo.commit(Some("HEAD"), &sig, &sig, "initial commit", &tree, &[])
        .expect("initial commit");
    drop(tree);
    drop(repo);

    let repo = GitRepo::open(dir.path()).expect("open repo");
    (dir, repo)
}
