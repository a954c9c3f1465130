//! Newtype domain identifiers.
//!
//! Every domain concept that has an identity is represented as a distinct newtype
//! wrapping a primitive. This prevents accidentally interchanging a
//! [`BuildNumber`] with a [`QueueItemId`] even though both are `u64` under the
//! hood, or a [`CommitSha`] with a [`GitRef`].

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Macro for String-wrapped newtypes.
// Generates: struct, new() returning Option<Self>, from_static(), as_str(), Display.
// ---------------------------------------------------------------------------
macro_rules! string_id {
    (
        $(#[$attr:meta])*
        $name:ident
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(String);

        impl $name {
            /// Creates a new identifier, returning `None` if the value is empty
            /// or only whitespace.
            pub fn new(value: impl Into<String>) -> Option<Self> {
                let v = value.into();
                if v.trim().is_empty() { None } else { Some(Self(v)) }
            }

            /// Creates an identifier from a compile-time literal.
            ///
            /// Reserved for built-in defaults; the literal must not be empty.
            pub(crate) fn from_static(value: &'static str) -> Self {
                debug_assert!(!value.is_empty());
                Self(value.to_owned())
            }

            /// Returns the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Macro for u64-wrapped newtypes (server-assigned integers).
// Generates: struct (Copy), new(), as_u64(), Display.
// ---------------------------------------------------------------------------
macro_rules! u64_id {
    (
        $(#[$attr:meta])*
        $name:ident
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(u64);

        impl $name {
            /// Creates a new identifier from a raw integer.
            pub fn new(value: u64) -> Self {
                Self(value)
            }

            /// Returns the underlying integer value.
            pub fn as_u64(self) -> u64 {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Identifiers: server-assigned integers
// ---------------------------------------------------------------------------

u64_id! {
    /// Sequence number the CI server assigned to one build of a job.
    ///
    /// The only identity that survives across status polls.
    BuildNumber
}

u64_id! {
    /// Queue item the CI server created when it accepted a trigger request.
    ///
    /// Only available when the server reports it (Jenkins sends it in the
    /// `Location` header of the trigger response).
    QueueItemId
}

// ---------------------------------------------------------------------------
// Identifiers: UUID-backed (internally generated)
// ---------------------------------------------------------------------------

/// Identifies a single trigger-and-monitor run (one invocation of the monitor).
///
/// Generated fresh for every run; recorded on the run's tracing span so all
/// activity from a single run can be correlated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TriggerRunId(Uuid);

impl TriggerRunId {
    /// Generates a new random run identifier.
    pub fn new_random() -> Self {
        Self(Uuid::new_v4())
    }

}

impl std::fmt::Display for TriggerRunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Identifiers: String-backed (Git names)
// ---------------------------------------------------------------------------

string_id! {
    /// A Git commit SHA.
    ///
    /// Not validated as hex: sample payloads use placeholder values such as
    /// `"def456new"`.
    CommitSha
}

string_id! {
    /// A fully qualified Git reference (e.g. `"refs/heads/main"`).
    GitRef
}

impl GitRef {
    /// Builds the branch reference `refs/heads/<branch>`.
    ///
    /// A value that is already a `refs/heads/` reference is kept as is.
    /// Returns `None` if the branch name is empty or `branch` names some other
    /// kind of reference (`refs/tags/...`).
    pub fn branch(branch: &str) -> Option<Self> {
        let branch = branch.trim();
        let name = branch.strip_prefix("refs/heads/").unwrap_or(branch);
        if name.is_empty() || name.starts_with("refs/") {
            return None;
        }
        Self::new(format!("refs/heads/{name}"))
    }

    /// Returns the short name of the reference.
    ///
    /// `refs/heads/feature/x` yields `feature/x`; any other reference yields
    /// its last path segment.
    pub fn short_name(&self) -> &str {
        if let Some(branch) = self.0.strip_prefix("refs/heads/") {
            return branch;
        }
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }
}

string_id! {
    /// Identifies a repository in `"owner/repo"` format.
    RepositoryName
}

impl RepositoryName {
    /// Creates an owner-qualified name, returning `None` unless `name` is
    /// exactly `owner/repo` with both parts non-empty.
    pub fn qualified(name: &str) -> Option<Self> {
        let name = name.trim();
        let (owner, repo) = name.split_once('/')?;
        if owner.is_empty() || repo.is_empty() || repo.contains('/') {
            return None;
        }
        Self::new(name)
    }

    /// Returns the repository part of `"owner/repo"`, or the whole name if it
    /// has no owner prefix.
    pub fn repo(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_ids_reject_blank_values() {
        assert!(CommitSha::new("").is_none());
        assert!(GitRef::new("   ").is_none());
        assert_eq!(CommitSha::new("abc").map(|s| s.to_string()), Some("abc".into()));
    }

    #[test]
    fn short_name_keeps_nested_branch_names() {
        let r = GitRef::branch("feature/login").unwrap();
        assert_eq!(r.as_str(), "refs/heads/feature/login");
        assert_eq!(r.short_name(), "feature/login");
    }

    #[test]
    fn branch_accepts_a_full_branch_ref() {
        let r = GitRef::branch("refs/heads/main").unwrap();
        assert_eq!(r.as_str(), "refs/heads/main");
        assert_eq!(r.short_name(), "main");
    }

    #[test]
    fn branch_rejects_empty_and_non_branch_refs() {
        assert!(GitRef::branch("  ").is_none());
        assert!(GitRef::branch("refs/heads/").is_none());
        assert!(GitRef::branch("refs/tags/v1.0").is_none());
    }

    #[test]
    fn short_name_of_non_branch_ref_is_last_segment() {
        let r = GitRef::new("refs/tags/v1.2.0").unwrap();
        assert_eq!(r.short_name(), "v1.2.0");
    }

    #[test]
    fn repository_name_splits_owner() {
        let name = RepositoryName::new("Navpan18/ShopSphere").unwrap();
        assert_eq!(name.repo(), "ShopSphere");
        assert_eq!(RepositoryName::new("solo").unwrap().repo(), "solo");
    }

    #[test]
    fn qualified_repository_name_needs_owner_and_repo() {
        assert_eq!(
            RepositoryName::qualified("acme/web").map(|n| n.to_string()),
            Some("acme/web".to_owned())
        );
        for bad in ["owner/", "/repo", "no-owner", "a/b/c", ""] {
            assert!(RepositoryName::qualified(bad).is_none(), "{bad}");
        }
    }

    #[test]
    fn build_number_serialises_as_plain_integer() {
        let json = serde_json::to_string(&BuildNumber::new(42)).unwrap();
        assert_eq!(json, "42");
    }
}
