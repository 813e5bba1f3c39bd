mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::dcf::{DcfArgs, DdmArgs};

/// Discounted cash flow stock valuation
#[derive(Parser)]
#[command(
    name = "stockval",
    version,
    about = "Intrinsic value estimates for listed equities",
    long_about = "Values a listed company by projecting its reported free \
                  cash flow forward, discounting the forecast and a perpetuity \
                  terminal value to present, and comparing the fair value per \
                  share to the current market price."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "table", global = true)]
    output: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a Discounted Cash Flow valuation
    Dcf(DcfArgs),
    /// Run a Discounted Dividend valuation
    Ddm(DdmArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn main() {
    let cli = Cli::parse();

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Dcf(args) => commands::dcf::run_dcf(args),
        Commands::Ddm(args) => commands::dcf::run_ddm(args),
        Commands::Version => {
            println!("stockval {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
