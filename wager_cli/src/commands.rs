use std::fmt;
use wager_engine::{Points, Prediction, parse_wager};

/// Default number of rows shown by `history`.
pub const DEFAULT_HISTORY_LIMIT: i64 = 10;

/// A line of player input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Place a wager and start a round.
    Bet(Points),
    /// Predict the next card.
    Guess(Prediction),
    Retire,
    Roll,
    Pass,
    CashOut,
    Double,
    /// Back to betting after a round.
    NewRound,
    Balance,
    History(i64),
    Status,
    Help,
    Quit,
}

/// Errors that can occur during command parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Wager is not a non-negative number.
    InvalidWager(String),
    /// History limit is not a positive integer.
    InvalidHistoryLimit(String),
    /// Unrecognized command.
    UnrecognizedCommand(String),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidWager(value) => write!(
                f,
                "Invalid wager '{value}'. Must be a non-negative number (e.g., 'bet 10')"
            ),
            Self::InvalidHistoryLimit(value) => write!(
                f,
                "Invalid history limit '{value}'. Must be a positive number (e.g., 'history 5')"
            ),
            Self::UnrecognizedCommand(cmd) => write!(
                f,
                "Unrecognized command '{cmd}'. Type 'help' to see available commands"
            ),
        }
    }
}

impl std::error::Error for ParseError {}

pub const COMMANDS_HELP: &str = "\
Commands:
  bet [AMOUNT]      Place a wager (fractions are dropped, empty is 0)
  higher | h        High card: next card is higher (ties win)
  lower | l         High card: next card is lower (ties win)
  retire            High card: cash out the pot
  roll | r          Dice: roll two dice
  pass | stand      Dice: hand the dice to the bank
  cash              Dice: cash out a won pot
  double            Dice: double a won pot and climb again
  new               Back to betting after a round
  balance           Show the ledger balance
  history [N]       Show the last N results
  status            Show the session state
  help              Show this message
  quit | exit       Leave the game
";

/// Parse a line of input into a [`Command`].
///
/// # Examples
///
/// ```
/// use wager_cli::commands::{Command, parse_command};
/// use wager_engine::Prediction;
///
/// assert_eq!(parse_command("roll"), Ok(Command::Roll));
/// assert_eq!(parse_command("h"), Ok(Command::Guess(Prediction::Higher)));
/// assert_eq!(parse_command("bet 12.9"), Ok(Command::Bet(12)));
/// ```
pub fn parse_command(input: &str) -> Result<Command, ParseError> {
    let trimmed = input.trim();

    // Try single-word commands first
    match trimmed {
        "higher" | "h" => return Ok(Command::Guess(Prediction::Higher)),
        "lower" | "l" => return Ok(Command::Guess(Prediction::Lower)),
        "retire" => return Ok(Command::Retire),
        "roll" | "r" => return Ok(Command::Roll),
        "pass" | "stand" => return Ok(Command::Pass),
        "cash" | "cashout" => return Ok(Command::CashOut),
        "double" => return Ok(Command::Double),
        "new" => return Ok(Command::NewRound),
        "balance" => return Ok(Command::Balance),
        "status" => return Ok(Command::Status),
        "help" | "?" => return Ok(Command::Help),
        "quit" | "exit" => return Ok(Command::Quit),
        _ => {}
    }

    let parts: Vec<&str> = trimmed.split_ascii_whitespace().collect();
    match parts.first() {
        Some(&"bet") => parse_bet_command(&parts),
        Some(&"history") => parse_history_command(&parts),
        _ => Err(ParseError::UnrecognizedCommand(trimmed.to_string())),
    }
}

/// Parse a bet command: "bet [amount]"
fn parse_bet_command(parts: &[&str]) -> Result<Command, ParseError> {
    let value = parts.get(1).copied().unwrap_or("");
    parse_wager(value)
        .map(Command::Bet)
        .map_err(|_| ParseError::InvalidWager(value.to_string()))
}

/// Parse a history command: "history [limit]"
fn parse_history_command(parts: &[&str]) -> Result<Command, ParseError> {
    match parts.get(1) {
        Some(value) => match value.parse::<i64>() {
            Ok(limit) if limit > 0 => Ok(Command::History(limit)),
            _ => Err(ParseError::InvalidHistoryLimit(value.to_string())),
        },
        None => Ok(Command::History(DEFAULT_HISTORY_LIMIT)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_predictions() {
        assert_eq!(
            parse_command("higher"),
            Ok(Command::Guess(Prediction::Higher))
        );
        assert_eq!(parse_command("l"), Ok(Command::Guess(Prediction::Lower)));
    }

    #[test]
    fn test_parse_dice_commands() {
        assert_eq!(parse_command("roll"), Ok(Command::Roll));
        assert_eq!(parse_command("stand"), Ok(Command::Pass));
        assert_eq!(parse_command("cash"), Ok(Command::CashOut));
        assert_eq!(parse_command("double"), Ok(Command::Double));
    }

    #[test]
    fn test_parse_with_surrounding_whitespace() {
        assert_eq!(parse_command("  retire  "), Ok(Command::Retire));
    }

    // === Bet command tests ===

    #[test]
    fn test_parse_bet_with_amount() {
        assert_eq!(parse_command("bet 100"), Ok(Command::Bet(100)));
    }

    #[test]
    fn test_parse_bet_truncates_fraction() {
        assert_eq!(parse_command("bet 10.99"), Ok(Command::Bet(10)));
    }

    #[test]
    fn test_parse_bet_without_amount_is_free_round() {
        assert_eq!(parse_command("bet"), Ok(Command::Bet(0)));
    }

    #[test]
    fn test_parse_bet_with_negative_amount() {
        assert!(matches!(
            parse_command("bet -5"),
            Err(ParseError::InvalidWager(_))
        ));
    }

    #[test]
    fn test_parse_bet_with_invalid_amount() {
        assert_eq!(
            parse_command("bet lots"),
            Err(ParseError::InvalidWager("lots".to_string()))
        );
    }

    // === History command tests ===

    #[test]
    fn test_parse_history_default_limit() {
        assert_eq!(
            parse_command("history"),
            Ok(Command::History(DEFAULT_HISTORY_LIMIT))
        );
        assert_eq!(parse_command("history 3"), Ok(Command::History(3)));
    }

    #[test]
    fn test_parse_history_rejects_zero() {
        assert!(matches!(
            parse_command("history 0"),
            Err(ParseError::InvalidHistoryLimit(_))
        ));
    }

    // === Error cases ===

    #[test]
    fn test_parse_unrecognized_command() {
        assert!(matches!(
            parse_command("fold"),
            Err(ParseError::UnrecognizedCommand(_))
        ));
        assert!(matches!(
            parse_command("   "),
            Err(ParseError::UnrecognizedCommand(_))
        ));
    }

    #[test]
    fn test_error_message_invalid_wager() {
        let msg = ParseError::InvalidWager("abc".to_string()).to_string();
        assert!(msg.contains("Invalid wager"));
        assert!(msg.contains("abc"));
    }
}
