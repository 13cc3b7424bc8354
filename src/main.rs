use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use redthread::app::AppContext;
use redthread::cli::{commands, Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let ctx = AppContext::new(cli.config)?;

    match cli.command {
        Commands::Posts {
            subreddits,
            sort,
            limit,
            after,
        } => {
            commands::list_posts(&ctx, &subreddits, sort, limit, after.as_deref()).await?;
        }
        Commands::Comments { permalink, json } => {
            commands::show_comments(&ctx, &permalink, json).await?;
        }
        Commands::Outline {
            permalink,
            question,
            export,
        } => {
            commands::outline(&ctx, &permalink, question.as_deref(), export).await?;
        }
    }

    Ok(())
}
