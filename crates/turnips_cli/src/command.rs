//! Command-text resolver for the line-oriented transport.
//!
//! # Responsibility
//! - Turn raw `!sell` / `!buy` / `!chart` message text into structured
//!   commands for the core service.
//! - Leave day/half-day vocabulary unvalidated; the core owns that check.
//!
//! # Invariants
//! - Lines without a leading `!` are ignored, never errors.
//! - The price is the first digit run in the message, wherever it sits.

use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

static PRICE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").expect("literal regex"));

/// One parsed chat command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `!sell <price>`: record the Sunday base price.
    Sell { price: u32 },
    /// `!buy [day] [am|pm] <price>`: record a half-day observation. Day and
    /// half-day tokens stay raw strings for the core to validate.
    Buy {
        day: Option<String>,
        half_day: Option<String>,
        price: u32,
    },
    /// `!chart`: render the current week's chart URL.
    Chart,
    /// `!help`: print command usage.
    Help,
    /// `!quit`: end the session.
    Quit,
}

/// Failure to resolve a `!`-prefixed line into a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    UnknownCommand(String),
    MissingPrice(&'static str),
    PriceOutOfRange(String),
}

impl Display for CommandError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownCommand(name) => write!(f, "unknown command `{name}`"),
            Self::MissingPrice(command) => {
                write!(f, "`{command}` needs a price, e.g. `{command} 105`")
            }
            Self::PriceOutOfRange(digits) => write!(f, "price `{digits}` is out of range"),
        }
    }
}

impl Error for CommandError {}

/// Parses one input line.
///
/// Returns `Ok(None)` for chatter without the command prefix, mirroring a
/// chat bot ignoring ordinary messages.
pub fn parse_line(line: &str) -> Result<Option<Command>, CommandError> {
    let trimmed = line.trim();
    if !trimmed.starts_with('!') {
        return Ok(None);
    }

    let mut tokens = trimmed.split_whitespace();
    let keyword = tokens.next().unwrap_or(trimmed).to_ascii_lowercase();

    let command = match keyword.as_str() {
        "!sell" => Command::Sell {
            price: extract_price(trimmed, "!sell")?,
        },
        "!buy" => {
            let (day, half_day) = slot_tokens(tokens);
            Command::Buy {
                day,
                half_day,
                price: extract_price(trimmed, "!buy")?,
            }
        }
        "!chart" => Command::Chart,
        "!help" => Command::Help,
        "!quit" | "!exit" => Command::Quit,
        other => return Err(CommandError::UnknownCommand(other.to_string())),
    };

    Ok(Some(command))
}

fn extract_price(line: &str, command: &'static str) -> Result<u32, CommandError> {
    let digits = PRICE_RE
        .find(line)
        .ok_or(CommandError::MissingPrice(command))?
        .as_str();
    digits
        .parse()
        .map_err(|_| CommandError::PriceOutOfRange(digits.to_string()))
}

/// Splits the non-numeric `!buy` arguments into (day, half-day) tokens.
///
/// A lone `am`/`pm`-style token is a half-day marker; anything else is
/// treated as a day name and left for the core to validate.
fn slot_tokens<'a>(tokens: impl Iterator<Item = &'a str>) -> (Option<String>, Option<String>) {
    let mut day = None;
    let mut half_day = None;
    for token in tokens {
        if PRICE_RE.is_match(token) {
            break;
        }
        if is_half_day_token(token) && half_day.is_none() {
            half_day = Some(token.to_string());
        } else if day.is_none() {
            day = Some(token.to_string());
        }
    }
    (day, half_day)
}

fn is_half_day_token(token: &str) -> bool {
    matches!(
        token.to_ascii_lowercase().as_str(),
        "am" | "pm" | "morning" | "afternoon"
    )
}

#[cfg(test)]
mod tests {
    use super::{parse_line, Command, CommandError};

    fn parsed(line: &str) -> Command {
        parse_line(line).unwrap().expect("line should be a command")
    }

    #[test]
    fn ordinary_chatter_is_ignored() {
        assert_eq!(parse_line("good morning everyone").unwrap(), None);
        assert_eq!(parse_line("").unwrap(), None);
    }

    #[test]
    fn sell_extracts_the_price() {
        assert_eq!(parsed("!sell 105"), Command::Sell { price: 105 });
        assert_eq!(parsed("  !sell turnips at 98  "), Command::Sell { price: 98 });
    }

    #[test]
    fn buy_with_no_markers_leaves_slot_inference_to_the_core() {
        assert_eq!(
            parsed("!buy 90"),
            Command::Buy {
                day: None,
                half_day: None,
                price: 90
            }
        );
    }

    #[test]
    fn buy_accepts_day_and_half_day_tokens_in_either_order() {
        let expected = Command::Buy {
            day: Some("monday".to_string()),
            half_day: Some("am".to_string()),
            price: 90,
        };
        assert_eq!(parsed("!buy monday am 90"), expected);
        assert_eq!(parsed("!buy am monday 90"), expected);
    }

    #[test]
    fn buy_with_only_a_half_day_token() {
        assert_eq!(
            parsed("!buy pm 82"),
            Command::Buy {
                day: None,
                half_day: Some("pm".to_string()),
                price: 82
            }
        );
    }

    #[test]
    fn unvalidated_day_tokens_pass_through() {
        assert_eq!(
            parsed("!buy someday 82"),
            Command::Buy {
                day: Some("someday".to_string()),
                half_day: None,
                price: 82
            }
        );
    }

    #[test]
    fn missing_price_is_an_error() {
        assert_eq!(
            parse_line("!sell").unwrap_err(),
            CommandError::MissingPrice("!sell")
        );
        assert_eq!(
            parse_line("!buy monday am").unwrap_err(),
            CommandError::MissingPrice("!buy")
        );
    }

    #[test]
    fn oversized_prices_are_rejected() {
        assert!(matches!(
            parse_line("!sell 99999999999999").unwrap_err(),
            CommandError::PriceOutOfRange(_)
        ));
    }

    #[test]
    fn unknown_commands_are_reported() {
        assert_eq!(
            parse_line("!dance").unwrap_err(),
            CommandError::UnknownCommand("!dance".to_string())
        );
    }

    #[test]
    fn control_commands_parse() {
        assert_eq!(parsed("!chart"), Command::Chart);
        assert_eq!(parsed("!help"), Command::Help);
        assert_eq!(parsed("!quit"), Command::Quit);
        assert_eq!(parsed("!exit"), Command::Quit);
    }
}
