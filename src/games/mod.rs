//! Game representations for the simplicial subdivision solver.
//!
//! This module provides concrete [`StrategicGame`](crate::nash::StrategicGame)
//! implementations and the readers that build them:
//!
//! 1. **Storage**: [`TableGame`] keeps a full payoff table in exact rationals.
//!
//! 2. **Input**: [`read_game`] accepts either an `.nfg` file (see [`nfg`]) or
//!    the JSON layout described on [`TableGame::from_json_str`].
//!
//! 3. **Validation**: [`classic`] holds textbook games with known equilibria.
//!
//! ## Adding New Games
//!
//! Payoffs that are cheap to compute on demand do not need a table: implement
//! `StrategicGame` directly and hand the game to
//! [`SimpdivSolver`](crate::nash::SimpdivSolver).

pub mod classic;
pub mod nfg;
pub mod table;

pub use table::{PlayerInfo, TableGame};

/// Errors that can occur while building or reading a game.
#[derive(Debug, Clone, PartialEq)]
pub enum GameError {
    /// The game has no players.
    NoPlayers,
    /// A player has no strategies.
    NoStrategies {
        /// Offending player (0-based).
        player: usize,
    },
    /// The number of pure profiles overflows `usize`.
    TooLarge,
    /// Wrong number of payoff vectors.
    PayoffCount {
        /// One per pure profile.
        expected: usize,
        /// Number supplied.
        actual: usize,
    },
    /// A payoff vector does not have one entry per player.
    PayoffWidth {
        /// Index of the pure profile.
        profile: usize,
        /// Number of players.
        expected: usize,
        /// Number supplied.
        actual: usize,
    },
    /// Replacement player list does not match the game's shape.
    ShapeMismatch,
    /// A number could not be read.
    InvalidNumber(String),
    /// An outcome index refers to no outcome.
    UnknownOutcome(usize),
    /// Input ended early.
    UnexpectedEnd,
    /// Malformed `.nfg` input.
    SyntaxError(String),
    /// Input is neither an `.nfg` file nor JSON.
    UnknownFormat,
    /// Malformed JSON input.
    ParseError(String),
}

impl std::fmt::Display for GameError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GameError::NoPlayers => write!(f, "Game has no players"),
            GameError::NoStrategies { player } => {
                write!(f, "Player {} has no strategies", player + 1)
            }
            GameError::TooLarge => write!(f, "Game has too many pure profiles"),
            GameError::PayoffCount { expected, actual } => {
                write!(f, "Expected {} payoff vectors, found {}", expected, actual)
            }
            GameError::PayoffWidth {
                profile,
                expected,
                actual,
            } => write!(
                f,
                "Profile {} has {} payoffs, expected {}",
                profile + 1,
                actual,
                expected
            ),
            GameError::ShapeMismatch => write!(f, "Player list does not match the game"),
            GameError::InvalidNumber(text) => write!(f, "Invalid number '{}'", text),
            GameError::UnknownOutcome(index) => write!(f, "No outcome numbered {}", index),
            GameError::UnexpectedEnd => write!(f, "Unexpected end of input"),
            GameError::SyntaxError(msg) => write!(f, "Syntax error: {}", msg),
            GameError::UnknownFormat => {
                write!(f, "Input is neither an NFG file nor a JSON game")
            }
            GameError::ParseError(msg) => write!(f, "Failed to parse game: {}", msg),
        }
    }
}

impl std::error::Error for GameError {}

/// Read a game, choosing the format from the first non-blank characters.
pub fn read_game(input: &str) -> Result<TableGame, GameError> {
    let trimmed = input.trim_start();
    if trimmed.starts_with("NFG") {
        nfg::parse_nfg(trimmed)
    } else if trimmed.starts_with('{') {
        TableGame::from_json_str(trimmed)
    } else {
        Err(GameError::UnknownFormat)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nash::game::StrategicGame;

    #[test]
    fn test_read_game_detects_format() {
        let nfg = read_game("\n  NFG 1 R \"x\" { \"A\" \"B\" } { 1 1 } 2 3").unwrap();
        assert_eq!(nfg.title(), "x");

        let json = read_game(
            r#"{ "players": [ { "name": "A", "strategies": ["s"] } ], "payoffs": [[4]] }"#,
        )
        .unwrap();
        assert_eq!(json.num_players(), 1);

        assert_eq!(read_game("hello"), Err(GameError::UnknownFormat));
        assert_eq!(read_game(""), Err(GameError::UnknownFormat));
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            GameError::NoStrategies { player: 0 }.to_string(),
            "Player 1 has no strategies"
        );
        assert_eq!(
            GameError::PayoffCount {
                expected: 4,
                actual: 3
            }
            .to_string(),
            "Expected 4 payoff vectors, found 3"
        );
    }
}
