// bpnative-cli: CLI entry point for the Blueprint nativization backend.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "bpnative", about = "bpnative: Blueprint nativization backend")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate C++ source and the dependency manifest from the model dump.
    Generate {
        /// Path to bpnative.config.toml.
        #[arg(long, default_value = "bpnative.config.toml")]
        config: PathBuf,
    },
    /// Parse and validate the input model without writing any output.
    Check {
        /// Path to bpnative.config.toml.
        #[arg(long, default_value = "bpnative.config.toml")]
        config: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Generate { config } => {
            bpnative_emit::run_generate(&config);
        }
        Commands::Check { config } => {
            bpnative_emit::run_check(&config);
        }
    }
}
