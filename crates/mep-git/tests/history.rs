use git2::{Repository, Signature};
use mep_git::{recent_history, GitHistoryError, GitRepository, HistoryOptions};
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn commit_file(repo: &Repository, dir: &Path, name: &str, content: &str, message: &str, when: i64) {
    fs::write(dir.join(name), content).unwrap();
    let sig = Signature::new("Ada Tester", "ada@example.com", &git2::Time::new(when, 0)).unwrap();
    let mut index = repo.index().unwrap();
    index.add_path(Path::new(name)).unwrap();
    index.write().unwrap();
    let tree_id = index.write_tree().unwrap();
    let tree = repo.find_tree(tree_id).unwrap();
    let parents = match repo.head() {
        Ok(head) => vec![head.peel_to_commit().unwrap()],
        Err(_) => Vec::new(),
    };
    let parent_refs: Vec<_> = parents.iter().collect();
    repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parent_refs)
        .unwrap();
}

#[test]
fn history_is_newest_first_and_capped() {
    let dir = tempdir().unwrap();
    let repo = Repository::init(dir.path()).unwrap();
    commit_file(&repo, dir.path(), "a.txt", "1", "Initial room schedule", 1_735_689_600);
    commit_file(&repo, dir.path(), "a.txt", "2", "Add ISO 7 limits\n\nLonger body", 1_735_776_000);
    commit_file(&repo, dir.path(), "a.txt", "3", "Fix pressure check", 1_735_862_400);

    let opts = HistoryOptions {
        max_commits: 2,
        ..Default::default()
    };
    let history = recent_history(dir.path(), &opts).unwrap();

    assert_eq!(history.len(), 2);
    assert_eq!(history[0].message, "Fix pressure check");
    assert_eq!(history[1].message, "Add ISO 7 limits");
    assert_eq!(history[0].author, "Ada Tester");
    assert_eq!(history[0].date, "2025-01-03");
    assert_eq!(history[0].hash.len(), 40);
}

#[test]
fn single_commit_in_full_clone_is_returned_unchanged() {
    let dir = tempdir().unwrap();
    let repo = Repository::init(dir.path()).unwrap();
    commit_file(&repo, dir.path(), "a.txt", "1", "Only commit", 1_735_689_600);

    let history = recent_history(dir.path(), &HistoryOptions::default()).unwrap();
    assert_eq!(history.len(), 1);
    assert!(!GitRepository::open(dir.path()).unwrap().is_shallow());
}

#[test]
fn empty_repository_has_no_history() {
    let dir = tempdir().unwrap();
    Repository::init(dir.path()).unwrap();
    let history = recent_history(dir.path(), &HistoryOptions::default()).unwrap();
    assert!(history.is_empty());
}

#[test]
fn missing_repository_is_reported() {
    let dir = tempdir().unwrap();
    let err = GitRepository::open(dir.path().join("nowhere")).err().unwrap();
    assert!(matches!(err, GitHistoryError::RepoNotFound(_)));
}

#[test]
fn deepen_without_remote_fails_cleanly() {
    let dir = tempdir().unwrap();
    let repo = Repository::init(dir.path()).unwrap();
    commit_file(&repo, dir.path(), "a.txt", "1", "Only commit", 1_735_689_600);

    let git = GitRepository::open(dir.path()).unwrap();
    let err = git.deepen("origin", 50).unwrap_err();
    assert!(matches!(err, GitHistoryError::RemoteNotFound(_)));
}
