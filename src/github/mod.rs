//! GitHub data access.
//!
//! Read-only operations over the GitHub REST API. Each operation maps one
//! endpoint (or a small fixed set of them) to a normalized, size-capped shape
//! from [`models`], ready to be handed to the model as a tool result.

mod client;
mod commits;
mod contents;
mod http;
mod issues;
pub mod models;
mod pulls;
mod repos;
mod search;
mod truncate;
mod types;

pub use client::{GitHubClient, GitHubError};
#[cfg(test)]
pub use http::RetryPolicy;
pub use models::StateFilter;
