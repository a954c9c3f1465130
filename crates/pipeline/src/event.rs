//! Push-event model and the event builder.
//!
//! A [`PushEvent`] describes a set of commits added to a branch. It is the
//! input that justifies triggering a build. The serialised form uses the field
//! names of a conventional push webhook (`ref`, `before`, `after`,
//! `head_commit`, ...) so it can be handed to anything that already speaks
//! that format.
//!
//! Events are built from a [`PushEventTemplate`]; the template carries every
//! value except the commit timestamp, which is supplied at build time.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::{CommitSha, GitRef, RepositoryName, Timestamp};

// ---------------------------------------------------------------------------
// Payload parts
// ---------------------------------------------------------------------------

/// A named person with an email address (pusher or commit author).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    /// Display or account name.
    pub name: String,
    /// Contact address.
    pub email: String,
}

impl Person {
    /// Creates a person from a name and an email address.
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }
}

/// Identity of the repository that received the push.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    /// Short repository name (`"ShopSphere"`).
    pub name: String,
    /// Owner-qualified name (`"Navpan18/ShopSphere"`).
    pub full_name: RepositoryName,
    /// Browser URL of the repository.
    #[serde(rename = "html_url")]
    pub url: String,
}

/// One commit included in a push.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    pub id: CommitSha,
    pub message: String,
    /// Commit time in UTC; serialised as ISO-8601.
    pub timestamp: Timestamp,
    pub author: Person,
    #[serde(rename = "added")]
    pub added_paths: BTreeSet<String>,
    #[serde(rename = "modified")]
    pub modified_paths: BTreeSet<String>,
    #[serde(rename = "removed")]
    pub removed_paths: BTreeSet<String>,
}

impl Commit {
    /// Total number of paths touched by this commit.
    pub fn changed_path_count(&self) -> usize {
        self.added_paths.len() + self.modified_paths.len() + self.removed_paths.len()
    }
}

// ---------------------------------------------------------------------------
// PushEvent
// ---------------------------------------------------------------------------

/// A source-control push: the commits added to one branch.
///
/// Immutable once built. Always satisfies:
///
/// - `commits()` is non-empty;
/// - `head_commit().id == after()`;
/// - the head commit is the last entry of `commits()`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PushEvent {
    #[serde(rename = "ref")]
    git_ref: GitRef,
    before: CommitSha,
    after: CommitSha,
    repository: Repository,
    pusher: Person,
    commits: Vec<Commit>,
    head_commit: Commit,
}

impl PushEvent {
    /// The pushed reference (`refs/heads/main`).
    pub fn git_ref(&self) -> &GitRef {
        &self.git_ref
    }

    /// Short branch name derived from [`Self::git_ref`].
    pub fn branch_name(&self) -> &str {
        self.git_ref.short_name()
    }

    /// Tip of the branch before the push.
    pub fn before(&self) -> &CommitSha {
        &self.before
    }

    /// Tip of the branch after the push.
    pub fn after(&self) -> &CommitSha {
        &self.after
    }

    pub fn repository(&self) -> &Repository {
        &self.repository
    }

    pub fn pusher(&self) -> &Person {
        &self.pusher
    }

    /// Commits in push order; never empty.
    pub fn commits(&self) -> &[Commit] {
        &self.commits
    }

    pub fn head_commit(&self) -> &Commit {
        &self.head_commit
    }

    /// Renders the event as pretty-printed webhook JSON.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Every value of a [`PushEvent`] except the commit timestamp.
///
/// [`Default`] yields the sample push used for end-to-end checks of a build
/// job: one commit on `main` of `Navpan18/ShopSphere` adding a feature file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushEventTemplate {
    pub repository: RepositoryName,
    pub repository_url: String,
    pub git_ref: GitRef,
    pub before: CommitSha,
    pub after: CommitSha,
    pub pusher: Person,
    pub author: Person,
    pub message: String,
    pub added_paths: BTreeSet<String>,
    pub modified_paths: BTreeSet<String>,
    pub removed_paths: BTreeSet<String>,
}

impl Default for PushEventTemplate {
    fn default() -> Self {
        Self {
            repository: RepositoryName::from_static("Navpan18/ShopSphere"),
            repository_url: "https://github.com/Navpan18/ShopSphere".to_owned(),
            git_ref: GitRef::from_static("refs/heads/main"),
            before: CommitSha::from_static("abc123old"),
            after: CommitSha::from_static("def456new"),
            pusher: Person::new("developer", "dev@example.com"),
            author: Person::new("Developer", "dev@example.com"),
            message: "Add new feature to ShopSphere".to_owned(),
            added_paths: ["src/new-feature.js".to_owned()].into(),
            modified_paths: ["package.json".to_owned(), "README.md".to_owned()].into(),
            removed_paths: BTreeSet::new(),
        }
    }
}

impl PushEventTemplate {
    /// Replaces the repository; the browser URL follows the GitHub layout.
    pub fn with_repository(mut self, repository: RepositoryName) -> Self {
        self.repository_url = format!("https://github.com/{repository}");
        self.repository = repository;
        self
    }

    pub fn with_ref(mut self, git_ref: GitRef) -> Self {
        self.git_ref = git_ref;
        self
    }

    /// Replaces the pushed commit (and therefore the head commit id).
    pub fn with_after(mut self, after: CommitSha) -> Self {
        self.after = after;
        self
    }

    /// Builds the event with its single commit stamped at `at`.
    pub fn build(&self, at: Timestamp) -> PushEvent {
        let head = Commit {
            id: self.after.clone(),
            message: self.message.clone(),
            timestamp: at,
            author: self.author.clone(),
            added_paths: self.added_paths.clone(),
            modified_paths: self.modified_paths.clone(),
            removed_paths: self.removed_paths.clone(),
        };

        PushEvent {
            git_ref: self.git_ref.clone(),
            before: self.before.clone(),
            after: self.after.clone(),
            repository: Repository {
                name: self.repository.repo().to_owned(),
                full_name: self.repository.clone(),
                url: self.repository_url.clone(),
            },
            pusher: self.pusher.clone(),
            commits: vec![head.clone()],
            head_commit: head,
        }
    }
}

/// Builds the sample push event, stamped with the current instant.
pub fn build_push_event() -> PushEvent {
    PushEventTemplate::default().build(Timestamp::now())
}
