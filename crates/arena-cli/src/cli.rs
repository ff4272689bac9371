//! Command-line arguments.

use std::path::PathBuf;

use arena::Difficulty;
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(author, version, about = "Peer-judged LLM arena", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a tournament with the configured models
    Run(RunArgs),

    /// List the built-in question bank
    Questions {
        /// Only questions of this topic
        #[arg(long)]
        topic: Option<String>,

        /// Only questions of this difficulty (easy, medium, hard)
        #[arg(long)]
        difficulty: Option<Difficulty>,
    },

    /// Summarize a saved run
    Analyze {
        /// Results file written by `run`
        #[arg(long)]
        file: PathBuf,
    },

    /// Validate a configuration file and list usable models
    CheckConfig {
        #[arg(long, default_value = "arena.toml")]
        config: PathBuf,
    },
}

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Configuration file (TOML, or JSON when ending in .json)
    #[arg(long, default_value = "arena.toml")]
    pub config: PathBuf,

    /// Number of questions (overrides question_generation.count)
    #[arg(long)]
    pub questions: Option<usize>,

    /// Seed for question sampling and fallback shuffles
    #[arg(long)]
    pub seed: Option<u64>,

    /// Results file (defaults to competition_results_<timestamp>.json)
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Start without asking for confirmation
    #[arg(long, short = 'y', default_value_t = false)]
    pub yes: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_args() {
        let cli = Cli::try_parse_from([
            "arena", "run", "--config", "c.json", "--questions", "2", "--seed", "7", "-y",
        ])
        .unwrap();
        match cli.command {
            Command::Run(args) => {
                assert_eq!(args.config, PathBuf::from("c.json"));
                assert_eq!(args.questions, Some(2));
                assert_eq!(args.seed, Some(7));
                assert!(args.yes);
                assert!(args.output.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_questions_difficulty_parsed() {
        let cli = Cli::try_parse_from(["arena", "questions", "--difficulty", "hard"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Questions {
                difficulty: Some(Difficulty::Hard),
                topic: None
            }
        ));
        assert!(Cli::try_parse_from(["arena", "questions", "--difficulty", "brutal"]).is_err());
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["arena", "check-config"]).unwrap();
        match cli.command {
            Command::CheckConfig { config } => assert_eq!(config, PathBuf::from("arena.toml")),
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
