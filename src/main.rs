use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "codesage",
    about = "AI-assisted technical interviews against a local model",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run an interview session (default)
    Interview {
        /// Language reported with submissions (default from config)
        #[arg(short, long)]
        language: Option<String>,

        /// Problem catalog JSON to use instead of the built-in one
        #[arg(long)]
        catalog: Option<PathBuf>,
    },
    /// List stored sessions, newest first
    Dashboard,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mode = match cli.command.unwrap_or(Command::Interview { language: None, catalog: None }) {
        Command::Interview { language, catalog } => codesage_lib::Mode::Interview { language, catalog },
        Command::Dashboard => codesage_lib::Mode::Dashboard,
    };

    codesage_lib::run(mode)
}
