use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use console::style;

use wren::chat::ChatEngine;
use wren::providers::configs::GeminiConfig;
use wren::providers::gemini::GeminiProvider;
use wren::tools::ToolRegistry;

mod prompt;
mod session;

use prompt::cliclack::CliclackPrompt;
use session::session::Session;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Model to use (overrides WREN_MODEL)
    #[arg(short, long)]
    model: Option<String>,

    /// Base directory for agent-generated projects (defaults to the
    /// current directory)
    #[arg(long)]
    base_dir: Option<PathBuf>,

    /// Retry budget for failed model calls
    #[arg(long, default_value_t = 2)]
    retries: u32,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match GeminiConfig::from_env() {
        Ok(config) => config,
        Err(error) => {
            eprintln!("{}", style(&error).red());
            std::process::exit(1);
        }
    };
    if let Some(model) = cli.model {
        config.model = model;
    }

    let provider = match GeminiProvider::new(config) {
        Ok(provider) => provider,
        Err(error) => {
            eprintln!("{}", style(&error).red());
            std::process::exit(1);
        }
    };
    let engine = ChatEngine::new(Box::new(provider)).with_retries(cli.retries);

    let base_dir = match cli.base_dir {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };

    println!(
        "wren {}",
        style("- type \"/help\" for commands, \"/exit\" to quit").dim()
    );
    println!();

    let mut session = Session::new(
        engine,
        ToolRegistry::new(),
        Box::new(CliclackPrompt::new()),
        base_dir,
    );
    session.run().await
}
