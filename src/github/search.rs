use super::client::{GitHubClient, GitHubError};
use super::models::{CodeSearchHit, CodeSearchResults};
use super::types::RawSearchResults;

const SEARCH_PAGE_SIZE: u32 = 20;

/// Scope a free-text query to one repository and optional extension.
fn scoped_query(owner: &str, repo: &str, query: &str, extension: Option<&str>) -> String {
    let mut q = format!("{} repo:{}/{}", query, owner, repo);
    if let Some(ext) = extension.map(|e| e.trim_start_matches('.')).filter(|e| !e.is_empty()) {
        q.push_str(&format!(" extension:{}", ext));
    }
    q
}

impl GitHubClient {
    pub async fn search_code(
        &self,
        owner: &str,
        repo: &str,
        query: &str,
        extension: Option<&str>,
    ) -> Result<CodeSearchResults, GitHubError> {
        let data: RawSearchResults = self
            .get_json(
                &["search", "code"],
                &[
                    ("q", scoped_query(owner, repo, query, extension)),
                    ("per_page", SEARCH_PAGE_SIZE.to_string()),
                ],
            )
            .await?;

        Ok(CodeSearchResults {
            total_count: data.total_count,
            results: data
                .items
                .into_iter()
                .map(|item| CodeSearchHit {
                    filename: item.name,
                    path: item.path,
                    url: item.html_url,
                })
                .collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scoped_query() {
        assert_eq!(
            scoped_query("acme", "widgets", "fn main", None),
            "fn main repo:acme/widgets"
        );
        assert_eq!(
            scoped_query("acme", "widgets", "TODO", Some(".rs")),
            "TODO repo:acme/widgets extension:rs"
        );
    }
}
