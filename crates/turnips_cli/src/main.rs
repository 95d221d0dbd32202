//! Line-oriented session entry point.
//!
//! # Responsibility
//! - Stand in for the chat transport: read command lines from stdin, feed
//!   the core price service, print each outcome.
//! - Own process lifecycle: config, logging, one store handle for the
//!   whole session.

mod command;
mod config;

use chrono::Utc;
use command::{parse_line, Command};
use config::{load_config, Config, DEFAULT_CONFIG_PATH};
use log::warn;
use std::io::BufRead;
use turnips_core::db::open_db;
use turnips_core::{
    BasePriceEntry, ObservationEntry, PriceService, RequestError, SqlitePriceRepository,
};

const HELP_TEXT: &str = "commands:
  !sell <price>            record this week's Sunday base price
  !buy [day] [am|pm] <price>   record a half-day buy price (day/half-day
                           default to the current time)
  !chart                   print the chart URL for the current week
  !quit                    end the session";

fn main() {
    if let Err(err) = run() {
        eprintln!("turnips: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let config = load_config(&config_path)?;

    if let Some(log_dir) = &config.log_dir {
        // A broken log setup should not keep prices from being recorded.
        if let Err(err) =
            turnips_core::init_logging(&config.log_level, &log_dir.to_string_lossy())
        {
            eprintln!("turnips: logging disabled: {err}");
        }
    }

    let conn = open_db(&config.db_path)?;
    let repo = SqlitePriceRepository::try_new(&conn)?;
    let service = PriceService::new(repo);

    println!(
        "turnip tracker ready as {} ({}); !help for commands",
        config.display_name, config.external_id
    );

    let stdin = std::io::stdin();
    for line in stdin.lock().lines() {
        let line = line?;
        match parse_line(&line) {
            Ok(None) => {}
            Ok(Some(Command::Quit)) => break,
            Ok(Some(parsed)) => println!("{}", dispatch(&service, &config, parsed)),
            Err(err) => println!("{err}"),
        }
    }

    Ok(())
}

fn dispatch(
    service: &PriceService<SqlitePriceRepository<'_>>,
    config: &Config,
    parsed: Command,
) -> String {
    let now = Utc::now();
    match parsed {
        Command::Help => HELP_TEXT.to_string(),
        Command::Sell { price } => {
            let entry = BasePriceEntry {
                external_id: config.external_id.clone(),
                display_name: config.display_name.clone(),
                event_time: now,
                price,
            };
            match service.record_base_price(&entry) {
                Ok(week_id) => format!("base price {price} recorded (week #{week_id})"),
                Err(err) => render_error(err),
            }
        }
        Command::Buy {
            day,
            half_day,
            price,
        } => {
            let entry = ObservationEntry {
                external_id: config.external_id.clone(),
                display_name: config.display_name.clone(),
                event_time: now,
                day,
                half_day,
                price,
            };
            match service.record_observation(&entry) {
                Ok(observation_id) => {
                    format!("buy price {price} recorded (observation #{observation_id})")
                }
                Err(err) => render_error(err),
            }
        }
        Command::Chart => match service.chart_url(&config.external_id, now) {
            Ok(url) => url,
            Err(err) => render_error(err),
        },
        // Quit never reaches dispatch; the session loop consumes it.
        Command::Quit => String::new(),
    }
}

fn render_error(err: RequestError) -> String {
    match err {
        RequestError::NoBasePrice { week_start } => format!(
            "no base price for the week of {week_start} yet; record one with `!sell <price>` first"
        ),
        RequestError::StoreUnavailable(inner) => {
            warn!("event=request_failed module=cli status=error error={inner}");
            format!("price store unavailable: {inner}")
        }
        other => other.to_string(),
    }
}
