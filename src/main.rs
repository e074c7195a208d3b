// src/main.rs
use clap::{Parser, Subcommand};
use std::time::Duration;

use yahoo_earnings::calendar::{parse_day, EarningsCalendar};
use yahoo_earnings::utils::{self, AppError};
use yahoo_earnings::EarningsRecord;

/// Command Line Interface for the Yahoo! Finance earnings calendar
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Delay between successive page requests, in milliseconds
    #[arg(long)]
    delay_ms: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Earnings announced on a single day (YYYY-MM-DD)
    On { date: String },

    /// Earnings announced between two days, both inclusive (YYYY-MM-DD)
    Between { from: String, to: String },

    /// Every earnings record listed for a ticker symbol
    Of { symbol: String },

    /// Unix timestamp of the next earnings announcement for a ticker symbol
    Next { symbol: String },
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // 1. Setup Logging (reads RUST_LOG env var)
    utils::logging::setup_logging();

    // 2. Parse CLI Arguments
    let args = Args::parse();
    tracing::debug!("Starting with args: {:?}", args);

    // 3. Build the calendar; the delay is fixed for its lifetime
    let calendar = match args.delay_ms {
        Some(ms) => EarningsCalendar::with_delay(Duration::from_millis(ms))?,
        None => EarningsCalendar::new()?,
    };

    // 4. Run the requested query
    match args.command {
        Command::On { date } => {
            let records = calendar.earnings_on(parse_day(&date)?).await?;
            print_records(&records)?;
        }
        Command::Between { from, to } => {
            let records = calendar
                .earnings_between(parse_day(&from)?, parse_day(&to)?)
                .await?;
            print_records(&records)?;
        }
        Command::Of { symbol } => {
            let records = calendar.earnings_of(&symbol).await?;
            print_records(&records)?;
        }
        Command::Next { symbol } => {
            let timestamp = calendar.next_earnings_date(&symbol).await?;
            println!("{timestamp}");
        }
    }

    Ok(())
}

fn print_records(records: &[EarningsRecord]) -> Result<(), AppError> {
    println!("{}", serde_json::to_string_pretty(records)?);
    tracing::info!("Returned {} earnings records", records.len());
    Ok(())
}
