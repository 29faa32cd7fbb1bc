use crate::domain::RepositoryContext;

/// Instructions sent as the system prompt on every provider.
pub const SYSTEM_PROMPT: &str = r#"You are an expert GitHub repository analyst with deep knowledge of software development, code review, and collaboration patterns.

You have access to tools that fetch real-time data from GitHub repositories. ALWAYS use these tools proactively to provide comprehensive, data-driven analysis. Don't make assumptions - fetch the actual data.

AVAILABLE TOOLS:
- getRepositoryOverview: Get repo stats and metadata
- getContributors: List contributors (returns {items: [...]})
- getPullRequests: Get PRs with status (returns {items: [...]})
- getPullRequestDetails: Get detailed PR info including file changes and code diffs
- getIssues: Get issues with labels (returns {items: [...]})
- getCommits: Get commit history (returns {items: [...]})
- getFileTree: Browse repository file structure
- getFileContent: Read source code files (IMPORTANT: Use this to show actual code)
- getCommitDiff: See changes in a specific commit with actual code diffs
- compareBranches: Compare two branches
- searchCode: Search for code patterns
- getBranches: List all branches
- getLanguages: Get language breakdown

IMPORTANT INSTRUCTIONS:
1. ALWAYS use the relevant tools to fetch actual data before responding
2. When tools return {items: [...]}, access the data from the 'items' field
3. When asked about code changes, PRs, or commits - USE the diff tools to get actual code
4. Provide specific metrics, names, dates, and code snippets
5. Format code with proper syntax highlighting using markdown code blocks
6. When showing diffs, use diff syntax highlighting (```diff)

For structured responses, you can return JSON (start with { and end with }):
- {"type": "chart", "data": {"chartType": "bar|pie|line", "title": "...", "labels": [...], "datasets": [{"label": "...", "data": [...]}]}}
- {"type": "table", "data": {"title": "...", "headers": [...], "rows": [[...], [...]], "summary": "..."}}
- {"type": "diff", "data": {"prNumber": N, "title": "...", "author": "...", "additions": N, "deletions": N, "files": [...], "diff": "..."}}
- {"type": "text", "data": {"content": "markdown content"}}
- {"type": "mixed", "data": {"sections": [...]}}

Be thorough but concise. Focus on actionable insights."#;

/// Opening user message: repository identity, optional focus, metadata, question.
pub fn context_message(repository: &RepositoryContext, focus: &[String], query: &str) -> String {
    let mut message = format!(
        "Repository: {} (owner: {}, repo: {})",
        repository.full_name, repository.owner, repository.name
    );

    if !focus.is_empty() {
        message.push_str(&format!(
            "\n\nFocus analysis on these contributors: {}",
            focus.join(", ")
        ));
    }

    let metadata = &repository.metadata;
    message.push_str(&format!(
        "\n\nRepository metadata:\n\
         - Stars: {}\n\
         - Forks: {}\n\
         - Language: {}\n\
         - Open Issues: {}\n\
         - Contributors: {}",
        metadata.stars,
        metadata.forks,
        metadata.language.as_deref().unwrap_or("Unknown"),
        metadata.open_issues,
        metadata.contributor_count,
    ));

    message.push_str(&format!("\n\nUser question: {}", query));
    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RepositoryMetadata;

    #[test]
    fn test_context_message_layout() {
        let repo = RepositoryContext::new("acme", "widgets").with_metadata(RepositoryMetadata {
            stars: 420,
            forks: 17,
            language: Some("Rust".to_string()),
            open_issues: 5,
            contributor_count: 12,
        });

        let message = context_message(&repo, &["alice".to_string(), "bob".to_string()], "Who?");
        assert_eq!(
            message,
            "Repository: acme/widgets (owner: acme, repo: widgets)\n\n\
             Focus analysis on these contributors: alice, bob\n\n\
             Repository metadata:\n\
             - Stars: 420\n\
             - Forks: 17\n\
             - Language: Rust\n\
             - Open Issues: 5\n\
             - Contributors: 12\n\n\
             User question: Who?"
        );
    }

    #[test]
    fn test_context_message_without_focus() {
        let repo = RepositoryContext::new("acme", "widgets");
        let message = context_message(&repo, &[], "Hi");
        assert!(!message.contains("Focus analysis"));
        assert!(message.contains("- Language: Unknown"));
        assert!(message.ends_with("User question: Hi"));
    }
}
