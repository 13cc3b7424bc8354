pub mod commands;

use clap::{Parser, Subcommand};

use crate::reddit::SortType;

#[derive(Parser)]
#[command(name = "redthread")]
#[command(about = "Fetch Reddit posts and fully expanded comment trees", long_about = None)]
pub struct Cli {
    /// Config file to use instead of ~/.config/redthread/config.toml
    #[arg(short, long, global = true)]
    pub config: Option<std::path::PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List posts from one or more subreddits
    Posts {
        /// Subreddit names, e.g. `rust` or `r/rust`
        #[arg(required = true)]
        subreddits: Vec<String>,

        /// Listing sort order
        #[arg(short, long, value_enum)]
        sort: Option<SortType>,

        /// Posts per subreddit (1-100)
        #[arg(short, long)]
        limit: Option<u32>,

        /// Cursor returned by a previous page
        #[arg(long)]
        after: Option<String>,
    },
    /// Fetch a post's comment tree with every "more" stub expanded
    Comments {
        /// Post permalink or full post URL
        permalink: String,

        /// Print the tree as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the summarizer prompt for a post's comments
    Outline {
        /// Post permalink or full post URL
        permalink: String,

        /// Ask a question about the thread instead of summarizing it
        #[arg(short, long)]
        question: Option<String>,

        /// Use the standalone export template
        #[arg(long, conflicts_with = "question")]
        export: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_posts() {
        let cli = Cli::try_parse_from([
            "redthread", "posts", "rust", "r/programming", "--sort", "top", "--limit", "10",
        ])
        .unwrap();

        match cli.command {
            Commands::Posts {
                subreddits,
                sort,
                limit,
                after,
            } => {
                assert_eq!(subreddits, vec!["rust", "r/programming"]);
                assert_eq!(sort, Some(SortType::Top));
                assert_eq!(limit, Some(10));
                assert!(after.is_none());
            }
            _ => panic!("expected posts command"),
        }
    }

    #[test]
    fn test_posts_requires_subreddit() {
        assert!(Cli::try_parse_from(["redthread", "posts"]).is_err());
    }

    #[test]
    fn test_outline_export_conflicts_with_question() {
        let result = Cli::try_parse_from([
            "redthread", "outline", "/r/rust/comments/abc/", "--export", "--question", "why?",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_global_config_flag() {
        let cli = Cli::try_parse_from([
            "redthread", "comments", "/r/rust/comments/abc/", "--json", "--config", "/tmp/r.toml",
        ])
        .unwrap();
        assert_eq!(cli.config, Some(std::path::PathBuf::from("/tmp/r.toml")));
        assert!(matches!(cli.command, Commands::Comments { json: true, .. }));
    }
}
