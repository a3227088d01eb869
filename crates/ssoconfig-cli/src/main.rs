mod cmd_generate;
mod cmd_prune;
mod cmd_validate;
mod config;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "ssoconfig")]
#[command(about = "Merge AWS SSO profiles into an AWS config file")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log more (-v info, -vv debug); RUST_LOG takes precedence
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Merge a list of profiles into the config file
    Generate(cmd_generate::GenerateArgs),
    /// Remove generated sections for the given start URLs
    Prune {
        /// Start URL whose generated sections are removed (repeatable)
        #[arg(long = "start-url", required = true)]
        start_urls: Vec<String>,

        /// Config file to update (default: $AWS_CONFIG_FILE or ~/.aws/config)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Print a diff instead of writing
        #[arg(long)]
        dry_run: bool,
    },
    /// Parse the config file and list its sections
    Validate {
        /// Config file to read (default: $AWS_CONFIG_FILE or ~/.aws/config)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Generate(args) => cmd_generate::run(args),
        Commands::Prune {
            start_urls,
            config,
            dry_run,
        } => cmd_prune::run(config, start_urls, dry_run),
        Commands::Validate { config, json } => cmd_validate::run(config, json),
    }
}
