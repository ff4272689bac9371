use anyhow::Result;
use arena_cli::{commands, Cli, Command};
use clap::Parser;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Run(args) => {
            info!(config = %args.config.display(), "Arena starting");
            commands::run(args).await?;
        }
        Command::Questions { topic, difficulty } => {
            println!("{}", commands::list_questions(topic.as_deref(), difficulty)?);
        }
        Command::Analyze { file } => {
            println!("{}", commands::analyze(&file)?);
        }
        Command::CheckConfig { config } => {
            println!("{}", commands::check_config(&config)?);
        }
    }

    Ok(())
}
