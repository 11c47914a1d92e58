mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing_subscriber::EnvFilter;

use commands::amortization::{CompareArgs, ScheduleArgs};
use commands::housing::{AffordArgs, AllInArgs, PitiArgs, RentEquivalentArgs};
use commands::scenarios::SensitivityArgs;

/// Fixed-rate mortgage amortization with exact decimal arithmetic
#[derive(Parser)]
#[command(
    name = "mortgage",
    version,
    about = "Fixed-rate mortgage amortization with exact decimal arithmetic",
    long_about = "A CLI for amortizing fixed-rate mortgages to the cent. Generates \
                  payment schedules, summary statistics, extra-payment comparisons, \
                  principal/rate sensitivity grids and all-in housing costs."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Increase log verbosity on stderr (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the full payment schedule with summary statistics
    Schedule(ScheduleArgs),
    /// Summary statistics without the per-period rows
    Summary(ScheduleArgs),
    /// Compare a loan with and without its extra monthly principal
    Compare(CompareArgs),
    /// Principal x rate sensitivity grid
    Sensitivity(SensitivityArgs),
    /// All-in annual carrying rate per unit borrowed at several rates
    AllIn(AllInArgs),
    /// Monthly principal, interest, taxes and insurance
    Piti(PitiArgs),
    /// House price whose all-in cost matches a monthly rent
    RentEquivalent(RentEquivalentArgs),
    /// Financed value an income supports
    Afford(AffordArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
    Text,
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Schedule(args) => commands::amortization::run_schedule(args),
        Commands::Summary(args) => commands::amortization::run_summary(args),
        Commands::Compare(args) => commands::amortization::run_compare(args),
        Commands::Sensitivity(args) => commands::scenarios::run_sensitivity(args),
        Commands::AllIn(args) => commands::housing::run_all_in(args),
        Commands::Piti(args) => commands::housing::run_piti(args),
        Commands::RentEquivalent(args) => commands::housing::run_rent_equivalent(args),
        Commands::Afford(args) => commands::housing::run_afford(args),
        Commands::Version => {
            println!("mortgage {}", env!("CARGO_PKG_VERSION"));
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
