use clap::{Parser, Subcommand};

/// Repo Analyst - ask questions about a GitHub repository
#[derive(Parser)]
#[command(name = "repo-analyst")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Run as MCP server over stdio
    #[arg(long)]
    pub mcp: bool,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Ask the agent a question about a repository
    Ask {
        /// The question to ask
        query: String,

        /// Repository as owner/name
        #[arg(short, long, env = "REPO_ANALYST_REPO")]
        repo: String,

        /// Model to use (Gemini or Groq-hosted model id)
        #[arg(short, long)]
        model: Option<String>,

        /// Contributor login to focus the analysis on (repeatable)
        #[arg(short, long = "focus")]
        focus: Vec<String>,

        /// Session id for progress and message history (random if absent)
        #[arg(short, long)]
        session: Option<String>,
    },
    /// Print the tool declarations in a provider's wire format
    Tools {
        /// Model whose provider format to print
        #[arg(short, long)]
        model: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ask_with_repeated_focus() {
        let cli = Cli::try_parse_from([
            "repo-analyst",
            "ask",
            "Who reviews the most PRs?",
            "--repo",
            "acme/widgets",
            "--focus",
            "alice",
            "--focus",
            "bob",
            "-v",
        ])
        .unwrap();

        assert!(cli.verbose);
        match cli.command {
            Some(Commands::Ask {
                query, repo, focus, model, ..
            }) => {
                assert_eq!(query, "Who reviews the most PRs?");
                assert_eq!(repo, "acme/widgets");
                assert_eq!(focus, ["alice", "bob"]);
                assert!(model.is_none());
            }
            _ => panic!("expected ask"),
        }
    }

    #[test]
    fn test_parse_mcp_flag() {
        let cli = Cli::try_parse_from(["repo-analyst", "--mcp"]).unwrap();
        assert!(cli.mcp);
        assert!(cli.command.is_none());
    }
}
