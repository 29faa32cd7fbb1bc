//! Domain types shared across modules.
//!
//! The repository context is supplied by the caller for one agent
//! invocation and never mutated while the agent runs.

use serde::{Deserialize, Serialize};

/// Snapshot of repository statistics included in the opening prompt.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryMetadata {
    pub stars: u64,
    pub forks: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    pub open_issues: u64,
    pub contributor_count: u64,
}

/// Identity and metadata of the repository the conversation is about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryContext {
    pub owner: String,
    pub name: String,
    pub full_name: String,
    #[serde(default)]
    pub metadata: RepositoryMetadata,
}

impl RepositoryContext {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        let owner = owner.into();
        let name = name.into();
        let full_name = format!("{}/{}", owner, name);
        Self {
            owner,
            name,
            full_name,
            metadata: RepositoryMetadata::default(),
        }
    }

    /// Parse an `owner/name` slug.
    pub fn from_slug(slug: &str) -> Option<Self> {
        let (owner, name) = slug.trim().split_once('/')?;
        if owner.is_empty() || name.is_empty() || name.contains('/') {
            return None;
        }
        Some(Self::new(owner, name))
    }

    pub fn with_metadata(mut self, metadata: RepositoryMetadata) -> Self {
        self.metadata = metadata;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_slug() {
        let repo = RepositoryContext::from_slug("acme/widgets").unwrap();
        assert_eq!(repo.owner, "acme");
        assert_eq!(repo.name, "widgets");
        assert_eq!(repo.full_name, "acme/widgets");

        assert!(RepositoryContext::from_slug("acme").is_none());
        assert!(RepositoryContext::from_slug("/widgets").is_none());
        assert!(RepositoryContext::from_slug("acme/widgets/extra").is_none());
    }
}
