//! `adx` — analytics-template validation from the command line.

mod commands;

use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "adx", version, about = "Analytics template validation and linting")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Lint a template directory and print its diagnostics
    Lint {
        /// Template directory (contains template-info.json)
        dir: PathBuf,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
        format: OutputFormat,

        /// Path to a JSON file with per-code severity overrides
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Run the language server over stdio
    Lsp,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    Human,
    Json,
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .try_init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Lint { dir, format, config } => {
            init_tracing();
            match commands::lint::run(&dir, format, config.as_deref()).await {
                Ok(exit_code) => std::process::exit(exit_code),
                Err(error) => {
                    eprintln!("error: {error:#}");
                    std::process::exit(2);
                }
            }
        }
        Commands::Lsp => {
            adx_lsp::run_server().await;
        }
        Commands::Completions { shell } => {
            let mut command = Cli::command();
            let name = command.get_name().to_string();
            clap_complete::generate(shell, &mut command, name, &mut std::io::stdout());
        }
    }
}
