use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::cmp::Ordering;

use super::client::{GitHubClient, GitHubError};
use super::models::{FileContent, FileTree, TreeEntry};
use super::truncate::truncate_chars;
use super::types::RawContents;

const DIRECTORY: &str = "directory";
const FILE: &str = "file";

fn contents_segments<'a>(owner: &'a str, repo: &'a str, path: &'a str) -> Vec<&'a str> {
    let mut segments = vec!["repos", owner, repo, "contents"];
    segments.extend(path.split('/').filter(|s| !s.is_empty()));
    segments
}

/// Directories before files, then by name.
fn tree_order(a: &TreeEntry, b: &TreeEntry) -> Ordering {
    match (a.kind == DIRECTORY, b.kind == DIRECTORY) {
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        _ => a.name.cmp(&b.name),
    }
}

/// Lowercased extension of the last path component, or empty.
fn extension_of(path: &str) -> String {
    let name = path.rsplit('/').next().unwrap_or(path);
    match name.rsplit_once('.') {
        Some((_, ext)) => ext.to_lowercase(),
        None => String::new(),
    }
}

fn decode_content(encoded: &str) -> Result<String, GitHubError> {
    // GitHub wraps base64 content at 60 columns.
    let compact: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = STANDARD
        .decode(compact)
        .map_err(|e| GitHubError::Decode(format!("invalid base64 content: {}", e)))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

impl GitHubClient {
    pub async fn file_tree(
        &self,
        owner: &str,
        repo: &str,
        path: Option<&str>,
        branch: Option<&str>,
    ) -> Result<FileTree, GitHubError> {
        let git_ref = self.resolve_ref(owner, repo, branch).await?;
        let path = path.unwrap_or_default().trim_matches('/');

        let contents: RawContents = self
            .get_json(
                &contents_segments(owner, repo, path),
                &[("ref", git_ref.clone())],
            )
            .await?;

        match contents {
            RawContents::Directory(entries) => {
                let mut items: Vec<TreeEntry> = entries
                    .into_iter()
                    .map(|e| TreeEntry {
                        kind: if e.kind == "dir" { DIRECTORY } else { FILE }.to_string(),
                        name: e.name,
                        path: e.path,
                        size: e.size,
                    })
                    .collect();
                items.sort_by(tree_order);
                Ok(FileTree::Directory {
                    path: if path.is_empty() { "/".to_string() } else { path.to_string() },
                    branch: git_ref,
                    items,
                })
            }
            RawContents::Entry(entry) => Ok(FileTree::File {
                path: path.to_string(),
                kind: FILE.to_string(),
                name: entry.name,
            }),
        }
    }

    /// Decoded text of one file, capped at the configured character limit.
    pub async fn file_content(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
        branch: Option<&str>,
    ) -> Result<FileContent, GitHubError> {
        let git_ref = self.resolve_ref(owner, repo, branch).await?;
        let contents: RawContents = self
            .get_json(&contents_segments(owner, repo, path), &[("ref", git_ref)])
            .await?;

        let entry = match contents {
            RawContents::Directory(_) => {
                return Err(GitHubError::NotAFile("Path is a directory, not a file"))
            }
            RawContents::Entry(entry) if entry.kind != FILE => {
                return Err(GitHubError::NotAFile("Path is not a file"))
            }
            RawContents::Entry(entry) => entry,
        };

        let text = decode_content(entry.content.as_deref().unwrap_or_default())?;
        let (content, truncated) = truncate_chars(&text, self.limits().file_content_chars);

        Ok(FileContent {
            path: path.to_string(),
            name: entry.name,
            size: entry.size,
            content,
            language: extension_of(path),
            truncated,
        })
    }
}
