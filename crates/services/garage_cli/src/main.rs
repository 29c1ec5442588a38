// File: services/garage_cli/src/main.rs
mod commands;

use clap::{Parser, Subcommand};
use commands::{book, cancel, show_config, slots};
use colored::Colorize;
use garage_common::{
    config_error, init_with_level, level_from_str, log_error, GarageError, UserMessage,
};
use garage_config::{load_config, FlowVariant};
use tracing::debug;

#[derive(Parser)]
#[command(name = "garage-booking", version, about = "Book or cancel a garage appointment")]
struct Cli {
    /// Log level, overrides `logging.level` from the configuration
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Make a booking with the configured form
    Book {
        /// Form to use instead of `booking.flow` (stepper or calendar)
        #[arg(long)]
        flow: Option<FlowVariant>,
    },
    /// Show bookable dates and hours of the stepper window
    Slots {
        /// Only show the hours of this date (YYYY-MM-DD)
        #[arg(long)]
        date: Option<String>,
    },
    /// Cancel a booking from its cancellation link
    Cancel {
        /// Full link or query string carrying `bookingId`
        link: String,
        /// Do not ask for confirmation
        #[arg(long, short)]
        yes: bool,
    },
    /// Print the effective configuration as JSON
    Config,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        log_error(&e, "garage-booking failed");
        eprintln!("{}", failure_line(&e).red());
        std::process::exit(1);
    }
}

/// What a failed command prints.
fn failure_line(error: &GarageError) -> String {
    format!("Error: {}", error.user_message())
}

async fn run(cli: Cli) -> Result<(), GarageError> {
    let config = load_config().map_err(config_error);
    // Logging is up before a broken configuration is reported.
    let level = cli
        .log_level
        .as_deref()
        .or_else(|| config.as_ref().ok().map(|c| c.logging.level.as_str()))
        .unwrap_or("warn");
    init_with_level(level_from_str(level));
    let config = config?;
    debug!("Configuration loaded, flow {:?}", config.booking.flow);

    match cli.command {
        Commands::Book { flow } => book::run(&config, flow).await,
        Commands::Slots { date } => slots::run(&config, date.as_deref()).await,
        Commands::Cancel { link, yes } => cancel::run(&config, &link, yes).await,
        Commands::Config => show_config::run(&config),
    }
}
