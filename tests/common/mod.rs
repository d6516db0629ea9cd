// Shared git fixtures for the integration tests
#![allow(dead_code)]

use git2::{Repository, RepositoryInitOptions, Signature};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

pub const PROPERTIES: &str = "group=com.example\nversion=1.2.3-SNAPSHOT\n";

/// A working copy on `main` with one pushed commit and its bare remote
pub struct Fixture {
    pub work: TempDir,
    pub remote: TempDir,
}

impl Fixture {
    pub fn new() -> Self {
        let remote = TempDir::new().unwrap();
        Repository::init_bare(remote.path()).unwrap();

        let work = TempDir::new().unwrap();
        let mut options = RepositoryInitOptions::new();
        options.initial_head("main");
        let repo = Repository::init_opts(work.path(), &options).unwrap();
        {
            let mut config = repo.config().unwrap();
            config.set_str("user.name", "Release Bot").unwrap();
            config.set_str("user.email", "release@example.com").unwrap();
        }

        fs::write(work.path().join("gradle.properties"), PROPERTIES).unwrap();
        commit_all(&repo, "Initial commit");

        repo.remote("origin", remote.path().to_str().unwrap()).unwrap();
        {
            let mut origin = repo.find_remote("origin").unwrap();
            origin
                .push(&["refs/heads/main:refs/heads/main"], None)
                .unwrap();
        }
        let head = repo.head().unwrap().target().unwrap();
        repo.reference("refs/remotes/origin/main", head, true, "fixture")
            .unwrap();
        repo.find_branch("main", git2::BranchType::Local)
            .unwrap()
            .set_upstream(Some("origin/main"))
            .unwrap();

        Fixture { work, remote }
    }

    pub fn repo(&self) -> Repository {
        Repository::open(self.work.path()).unwrap()
    }

    pub fn remote_repo(&self) -> Repository {
        Repository::open_bare(self.remote.path()).unwrap()
    }

    pub fn properties(&self) -> String {
        fs::read_to_string(self.work.path().join("gradle.properties")).unwrap()
    }
}

pub fn commit_all(repo: &Repository, message: &str) {
    let mut index = repo.index().unwrap();
    index
        .add_all(["*"].iter(), git2::IndexAddOption::DEFAULT, None)
        .unwrap();
    index.write().unwrap();
    let tree = repo.find_tree(index.write_tree().unwrap()).unwrap();
    let signature = Signature::now("Release Bot", "release@example.com").unwrap();
    let parents = match repo.head() {
        Ok(head) => vec![head.peel_to_commit().unwrap()],
        Err(_) => vec![],
    };
    let parent_refs: Vec<&git2::Commit> = parents.iter().collect();
    repo.commit(
        Some("HEAD"),
        &signature,
        &signature,
        message,
        &tree,
        &parent_refs,
    )
    .unwrap();
}

pub fn head_message(repo: &Repository) -> String {
    repo.head()
        .unwrap()
        .peel_to_commit()
        .unwrap()
        .message()
        .unwrap_or_default()
        .to_string()
}

pub fn write(dir: &Path, name: &str, contents: &str) {
    fs::write(dir.join(name), contents).unwrap();
}
