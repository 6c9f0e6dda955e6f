use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "cura",
    about = "Curation pool accounting -- scenario replay",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Log settlement details to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Replay a scenario and print its trace
    Run(RunArgs),
    /// Validate genesis and actions without replaying
    Check(CheckArgs),
}

#[derive(Args)]
pub struct RunArgs {
    /// Scenario file (.toml, or .json)
    pub scenario: PathBuf,
    /// Keep going after failed actions instead of stopping
    #[arg(long)]
    pub collect: bool,
    /// Print only the final state
    #[arg(long)]
    pub last: bool,
}

#[derive(Args)]
pub struct CheckArgs {
    /// Scenario file (.toml, or .json)
    pub scenario: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_run() {
        let cli = Cli::try_parse_from(["cura", "run", "whale.toml"]).unwrap();
        assert_eq!(cli.format, OutputFormat::Text);
        assert!(!cli.verbose);
        if let Command::Run(args) = cli.command {
            assert_eq!(args.scenario, PathBuf::from("whale.toml"));
            assert!(!args.collect);
            assert!(!args.last);
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn parse_run_collect_json() {
        let cli = Cli::try_parse_from([
            "cura", "run", "s.json", "--collect", "--format", "json", "-v",
        ])
        .unwrap();
        assert_eq!(cli.format, OutputFormat::Json);
        assert!(cli.verbose);
        if let Command::Run(args) = cli.command {
            assert!(args.collect);
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn parse_check() {
        let cli = Cli::try_parse_from(["cura", "check", "s.toml"]).unwrap();
        assert!(matches!(cli.command, Command::Check(_)));
    }

    #[test]
    fn run_requires_a_scenario() {
        assert!(Cli::try_parse_from(["cura", "run"]).is_err());
        assert!(Cli::try_parse_from(["cura", "run", "s.toml", "--format", "yaml"]).is_err());
    }
}
