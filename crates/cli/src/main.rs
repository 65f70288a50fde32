// payrep CLI - payables summary report generation

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use payrep_cli::exit_codes::EXIT_SUCCESS;
use payrep_cli::generate::{cmd_generate, cmd_validate};

#[derive(Parser)]
#[command(name = "payrep")]
#[command(about = "Payables summary report generator")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the payables report from the uploaded workbooks
    #[command(after_help = "\
Examples:
  payrep generate
  payrep generate --uploads uploads --output processed
  payrep generate --config payrep.toml --json")]
    Generate {
        /// Directory holding the three input workbooks
        #[arg(long, default_value = "uploads")]
        uploads: PathBuf,

        /// Output directory (defaults to the config's output.dir)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Path to a payrep.toml config file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Print a JSON run summary to stdout
        #[arg(long)]
        json: bool,
    },

    /// Validate a config file without running
    #[command(after_help = "\
Examples:
  payrep validate payrep.toml")]
    Validate {
        /// Path to the payrep.toml config file
        config: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Generate { uploads, output, config, json } => {
            cmd_generate(uploads, output, config, json)
        }
        Commands::Validate { config } => cmd_validate(config),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(err) => {
            eprintln!("error: {}", err.message);
            if let Some(hint) = err.hint {
                eprintln!("hint: {hint}");
            }
            ExitCode::from(err.code)
        }
    }
}
