mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use commands::grid::GridArgs;
use commands::score::ScoreArgs;
use commands::screen::ScreenArgs;

/// Capital allocation screening under ROE and guaranteed yield thresholds
#[derive(Parser)]
#[command(
    name = "capalloc",
    version,
    about = "Screen capital allocations against ROE and guaranteed yield thresholds",
    long_about = "Enumerates every allocation across Taux, Actions_cotees, \
                  Actions_non_cotees, Immobilier and Cash on a percentage grid, \
                  scores net-of-tax ROE, covariance risk and guaranteed yield, \
                  and recommends the lowest-risk portfolio meeting both thresholds."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Screen the allocation grid and recommend the lowest-risk admissible portfolio
    Screen(ScreenArgs),
    /// Score a single allocation
    Score(ScoreArgs),
    /// List the allocations of a grid step
    Grid(GridArgs),
    /// Print the default market assumptions
    Assumptions,
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

/// Log to stderr so stdout stays machine-readable. RUST_LOG overrides the
/// default `warn` level.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Screen(args) => commands::screen::run_screen(args),
        Commands::Score(args) => commands::score::run_score(args),
        Commands::Grid(args) => commands::grid::run_grid(args),
        Commands::Assumptions => commands::run_assumptions(),
        Commands::Version => {
            println!("capalloc {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::print_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
