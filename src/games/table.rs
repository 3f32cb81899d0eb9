//! Dense payoff-table games.
//!
//! [`TableGame`] stores one payoff vector per pure strategy profile, in the
//! order used by strategic-form game files: the first player's strategy
//! varies fastest.

use num_rational::BigRational;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::games::GameError;
use crate::nash::game::StrategicGame;
use crate::nash::support::parse_rational;

/// A player's name and strategy names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerInfo {
    /// Player name.
    pub name: String,
    /// One name per strategy.
    pub strategies: Vec<String>,
}

impl PlayerInfo {
    /// A player with `count` strategies named `1`, `2`, ...
    pub fn numbered(name: impl Into<String>, count: usize) -> Self {
        Self {
            name: name.into(),
            strategies: (1..=count).map(|s| s.to_string()).collect(),
        }
    }
}

/// A strategic-form game stored as a full payoff table.
#[derive(Debug, Clone, PartialEq)]
pub struct TableGame {
    title: String,
    players: Vec<PlayerInfo>,
    /// Profile index stride of each player.
    strides: Vec<usize>,
    /// `payoffs[profile][player]`.
    payoffs: Vec<Vec<BigRational>>,
}

impl TableGame {
    /// Build a game, checking that every player has a strategy and that there
    /// is one payoff per player for every pure profile.
    pub fn new(
        title: impl Into<String>,
        players: Vec<PlayerInfo>,
        payoffs: Vec<Vec<BigRational>>,
    ) -> Result<Self, GameError> {
        if players.is_empty() {
            return Err(GameError::NoPlayers);
        }
        if let Some(player) = players.iter().position(|p| p.strategies.is_empty()) {
            return Err(GameError::NoStrategies { player });
        }

        let mut strides = Vec::with_capacity(players.len());
        let mut size = 1usize;
        for player in &players {
            strides.push(size);
            size = size
                .checked_mul(player.strategies.len())
                .ok_or(GameError::TooLarge)?;
        }

        if payoffs.len() != size {
            return Err(GameError::PayoffCount {
                expected: size,
                actual: payoffs.len(),
            });
        }
        if let Some(profile) = payoffs.iter().position(|p| p.len() != players.len()) {
            return Err(GameError::PayoffWidth {
                profile,
                expected: players.len(),
                actual: payoffs[profile].len(),
            });
        }

        Ok(Self {
            title: title.into(),
            players,
            strides,
            payoffs,
        })
    }

    /// Build a two-player game from row and column payoff matrices.
    ///
    /// # Panics
    /// Panics if the matrices are empty, ragged, or of different sizes.
    pub fn bimatrix(title: &str, row: &[&[i64]], col: &[&[i64]]) -> Self {
        let rows = row.len();
        let cols = row.first().map_or(0, |r| r.len());
        assert!(rows > 0 && cols > 0, "bimatrix needs at least one cell");
        assert!(
            row.iter().all(|r| r.len() == cols)
                && col.len() == rows
                && col.iter().all(|c| c.len() == cols),
            "bimatrix payoff matrices must be {}x{}",
            rows,
            cols
        );

        let mut payoffs = Vec::with_capacity(rows * cols);
        for c in 0..cols {
            for r in 0..rows {
                payoffs.push(vec![
                    BigRational::from_integer(row[r][c].into()),
                    BigRational::from_integer(col[r][c].into()),
                ]);
            }
        }

        Self {
            title: title.to_string(),
            players: vec![
                PlayerInfo::numbered("Player 1", rows),
                PlayerInfo::numbered("Player 2", cols),
            ],
            strides: vec![1, rows],
            payoffs,
        }
    }

    /// Replace player and strategy names, keeping the payoffs.
    pub fn with_players(mut self, players: Vec<PlayerInfo>) -> Result<Self, GameError> {
        let same_shape = players.len() == self.players.len()
            && players
                .iter()
                .zip(&self.players)
                .all(|(new, old)| new.strategies.len() == old.strategies.len());
        if !same_shape {
            return Err(GameError::ShapeMismatch);
        }
        self.players = players;
        Ok(self)
    }

    /// Parse a game from JSON.
    ///
    /// ```json
    /// {
    ///   "title": "Matching pennies",
    ///   "players": [
    ///     { "name": "Row", "strategies": ["H", "T"] },
    ///     { "name": "Col", "strategies": ["H", "T"] }
    ///   ],
    ///   "payoffs": [[1, -1], [-1, 1], [-1, 1], [1, -1]]
    /// }
    /// ```
    ///
    /// Payoffs may be integers, decimals, or strings holding any form
    /// accepted by [`parse_rational`] (such as `"2/3"`).
    pub fn from_json_str(json: &str) -> Result<Self, GameError> {
        let file: GameFile =
            serde_json::from_str(json).map_err(|e| GameError::ParseError(e.to_string()))?;
        let payoffs = file
            .payoffs
            .into_iter()
            .map(|row| row.into_iter().map(payoff_from_json).collect())
            .collect::<Result<Vec<Vec<_>>, _>>()?;
        Self::new(file.title, file.players, payoffs)
    }

    /// Serialize to the JSON form read by [`TableGame::from_json_str`].
    pub fn to_json_string(&self) -> Result<String, GameError> {
        let file = GameFile {
            title: self.title.clone(),
            players: self.players.clone(),
            payoffs: self
                .payoffs
                .iter()
                .map(|row| row.iter().map(|v| Value::String(v.to_string())).collect())
                .collect(),
        };
        serde_json::to_string_pretty(&file).map_err(|e| GameError::ParseError(e.to_string()))
    }

    /// Index of a pure profile in the payoff table.
    pub fn profile_index(&self, profile: &[usize]) -> usize {
        profile
            .iter()
            .zip(&self.strides)
            .map(|(strategy, stride)| strategy * stride)
            .sum()
    }

    /// The pure profile stored at `index` of the payoff table.
    pub fn pure_profile(&self, mut index: usize) -> Vec<usize> {
        self.players
            .iter()
            .map(|player| {
                let n = player.strategies.len();
                let strategy = index % n;
                index /= n;
                strategy
            })
            .collect()
    }
}

impl StrategicGame for TableGame {
    fn num_players(&self) -> usize {
        self.players.len()
    }

    fn num_strategies(&self, player: usize) -> usize {
        self.players[player].strategies.len()
    }

    fn payoff(&self, player: usize, profile: &[usize]) -> BigRational {
        self.payoffs[self.profile_index(profile)][player].clone()
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn player_name(&self, player: usize) -> String {
        self.players[player].name.clone()
    }

    fn strategy_name(&self, player: usize, strategy: usize) -> String {
        self.players[player].strategies[strategy].clone()
    }
}

/// On-disk JSON layout of a [`TableGame`].
#[derive(Debug, Serialize, Deserialize)]
struct GameFile {
    #[serde(default)]
    title: String,
    players: Vec<PlayerInfo>,
    payoffs: Vec<Vec<Value>>,
}

/// Read one payoff: a JSON number, taken digit for digit, or a string.
fn payoff_from_json(value: Value) -> Result<BigRational, GameError> {
    let text = match value {
        Value::Number(number) => number.to_string(),
        Value::String(text) => text,
        other => return Err(GameError::InvalidNumber(other.to_string())),
    };
    parse_rational(&text).ok_or(GameError::InvalidNumber(text))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ratio(n: i64, d: i64) -> BigRational {
        BigRational::new(n.into(), d.into())
    }

    const PENNIES: &str = r#"{
        "title": "Matching pennies",
        "players": [
            { "name": "Row", "strategies": ["H", "T"] },
            { "name": "Col", "strategies": ["H", "T"] }
        ],
        "payoffs": [[1, -1], [-1, 1], [-1, 1], [1, -1]]
    }"#;

    #[test]
    fn test_profile_indexing_first_player_fastest() {
        let game = TableGame::bimatrix("", &[&[1, 2, 3], &[4, 5, 6]], &[&[0, 0, 0], &[0, 0, 0]]);
        assert_eq!(game.shape(), vec![2, 3]);
        assert_eq!(game.profile_index(&[1, 0]), 1);
        assert_eq!(game.profile_index(&[0, 2]), 4);
        assert_eq!(game.pure_profile(5), vec![1, 2]);
        assert_eq!(game.payoff(0, &[1, 2]), ratio(6, 1));
        assert_eq!(game.payoff(0, &[0, 1]), ratio(2, 1));
    }

    #[test]
    fn test_json_game() {
        let game = TableGame::from_json_str(PENNIES).unwrap();
        assert_eq!(game.title(), "Matching pennies");
        assert_eq!(game.player_name(1), "Col");
        assert_eq!(game.strategy_name(0, 1), "T");
        assert_eq!(game.payoff(0, &[0, 0]), ratio(1, 1));
        assert_eq!(game.payoff(1, &[1, 0]), ratio(1, 1));
    }

    #[test]
    fn test_json_exact_numbers() {
        let json = r#"{
            "players": [ { "name": "Solo", "strategies": ["a", "b"] } ],
            "payoffs": [[0.1], ["2/3"]]
        }"#;
        let game = TableGame::from_json_str(json).unwrap();
        assert_eq!(game.payoff(0, &[0]), ratio(1, 10));
        assert_eq!(game.payoff(0, &[1]), ratio(2, 3));
    }

    #[test]
    fn test_json_long_decimals_are_exact() {
        let json = r#"{
            "players": [ { "name": "Solo", "strategies": ["a", "b"] } ],
            "payoffs": [[0.12345678901234567890123], [-1.000000000000000000001e-3]]
        }"#;
        let game = TableGame::from_json_str(json).unwrap();
        assert_eq!(
            game.payoff(0, &[0]),
            parse_rational("0.12345678901234567890123").unwrap()
        );
        assert_eq!(
            game.payoff(0, &[1]),
            parse_rational("-1.000000000000000000001e-3").unwrap()
        );
    }

    #[test]
    fn test_json_rejects_non_numeric_payoffs() {
        let json = r#"{
            "players": [ { "name": "Solo", "strategies": ["a"] } ],
            "payoffs": [[true]]
        }"#;
        assert!(matches!(
            TableGame::from_json_str(json),
            Err(GameError::InvalidNumber(_))
        ));
    }

    #[test]
    fn test_json_round_trip() {
        let game = TableGame::from_json_str(PENNIES).unwrap();
        let json = game.to_json_string().unwrap();
        assert_eq!(TableGame::from_json_str(&json).unwrap(), game);
    }

    #[test]
    fn test_validation() {
        assert!(matches!(
            TableGame::new("", vec![], vec![]),
            Err(GameError::NoPlayers)
        ));
        assert!(matches!(
            TableGame::new("", vec![PlayerInfo::numbered("A", 0)], vec![]),
            Err(GameError::NoStrategies { player: 0 })
        ));
        assert!(matches!(
            TableGame::new("", vec![PlayerInfo::numbered("A", 2)], vec![vec![ratio(1, 1)]]),
            Err(GameError::PayoffCount { expected: 2, actual: 1 })
        ));
        assert!(matches!(
            TableGame::new(
                "",
                vec![PlayerInfo::numbered("A", 1)],
                vec![vec![ratio(1, 1), ratio(2, 1)]]
            ),
            Err(GameError::PayoffWidth { profile: 0, .. })
        ));
        assert!(matches!(
            TableGame::from_json_str("{ not json"),
            Err(GameError::ParseError(_))
        ));
    }
}
