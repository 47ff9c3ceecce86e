pub mod commands;
pub mod config;
pub mod prompt;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(name = "casedesk")]
#[command(about = "Case desk - law office case management from the terminal")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in human-readable text format")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Backend URL, session cookie and current user")]
    Session {
        #[command(subcommand)]
        cmd: commands::session::SessionCommands,
    },

    #[command(about = "Show the navigation links available to the current user")]
    Nav,

    #[command(about = "List, search and open documents")]
    Documents {
        #[command(subcommand)]
        cmd: commands::documents::DocumentCommands,
    },

    #[command(about = "View cases and change their status")]
    Case {
        #[command(subcommand)]
        cmd: commands::case::CaseCommands,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    match cli.command {
        Commands::Session { cmd } => commands::session::handle(cmd, output_format).await,
        Commands::Nav => commands::nav::handle(output_format).await,
        Commands::Documents { cmd } => commands::documents::handle(cmd, output_format).await,
        Commands::Case { cmd } => commands::case::handle(cmd, output_format).await,
    }
}
