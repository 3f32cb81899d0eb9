//! Exact mixed strategy profiles.
//!
//! A [`MixedProfile`] assigns every player a probability distribution over
//! their pure strategies, stored as exact rationals. Every player's weights
//! are non-negative and sum to exactly one when a profile is constructed;
//! the only in-place mutation ([`MixedProfile::transfer`]) moves weight
//! between two strategies of the same player and so keeps each sum at one.

use std::fmt;
use std::ops::Index;

use num_bigint::BigInt;
use num_integer::Integer;
use num_rational::BigRational;
use num_traits::{One, Signed, Zero};

use crate::nash::game::StrategicGame;
use crate::nash::support::{format_decimal, parse_rational, StrategyTable};

/// How profile values are rendered in text output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProfileDisplay {
    /// Exact rational text (`1/2`, `0`, `1`).
    #[default]
    Rational,
    /// Fixed-point decimal with the given number of digits.
    Decimal(usize),
}

/// A mixed strategy profile with exact rational weights.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MixedProfile {
    weights: StrategyTable<BigRational>,
}

impl MixedProfile {
    /// The profile in which every player plays their first strategy.
    ///
    /// # Panics
    /// Panics if some player has no strategies.
    pub fn first_strategies(shape: &[usize]) -> Self {
        assert!(
            shape.iter().all(|&n| n > 0),
            "every player needs at least one strategy"
        );
        let mut weights = StrategyTable::filled(shape, BigRational::zero());
        for player in 0..shape.len() {
            weights[(player, 0)] = BigRational::one();
        }
        Self { weights }
    }

    /// Build a profile from player-major values, checking that every player's
    /// weights are non-negative and sum to exactly one.
    pub fn from_values(shape: &[usize], values: Vec<BigRational>) -> Result<Self, ProfileError> {
        if shape.is_empty() || shape.contains(&0) {
            return Err(ProfileError::InvalidShape(shape.to_vec()));
        }
        let expected: usize = shape.iter().sum();
        let actual = values.len();
        let weights = StrategyTable::from_vec(shape, values)
            .ok_or(ProfileError::WrongLength { expected, actual })?;

        for player in 0..weights.num_players() {
            let row = weights.player(player);
            if let Some(strategy) = row.iter().position(|w| w.is_negative()) {
                return Err(ProfileError::NegativeWeight { player, strategy });
            }
            let total: BigRational = row.iter().sum();
            if !total.is_one() {
                return Err(ProfileError::NotNormalized { player, total });
            }
        }

        Ok(Self { weights })
    }

    /// Parse one profile line: comma-separated values in player-major order.
    ///
    /// A line may carry one extra leading field (the label written by
    /// [`MixedProfile::to_line`]), which is ignored, so solver output can be
    /// fed back in as starting points.
    pub fn parse_line(shape: &[usize], line: &str) -> Result<Self, ProfileError> {
        let expected: usize = shape.iter().sum();
        let mut fields: Vec<&str> = line.trim().split(',').map(str::trim).collect();
        if fields.len() == expected + 1 {
            fields.remove(0);
        }
        if fields.len() != expected {
            return Err(ProfileError::WrongLength {
                expected,
                actual: fields.len(),
            });
        }

        let values = fields
            .iter()
            .map(|field| {
                parse_rational(field).ok_or_else(|| ProfileError::InvalidValue(field.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Self::from_values(shape, values)
    }

    /// Parse every non-blank line of a starting-point file.
    ///
    /// Items carry the 1-based line number. A bad line yields an error and
    /// reading continues with the next one.
    pub fn parse_lines<'a>(
        shape: &'a [usize],
        text: &'a str,
    ) -> impl Iterator<Item = (usize, Result<Self, ProfileError>)> + 'a {
        text.lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(move |(index, line)| (index + 1, Self::parse_line(shape, line)))
    }

    /// Render the profile as `<label>,<v1>,<v2>,...`.
    pub fn to_line(&self, label: &str, display: ProfileDisplay) -> String {
        let mut line = String::from(label);
        for value in self.weights.as_slice() {
            line.push(',');
            match display {
                ProfileDisplay::Rational => line.push_str(&value.to_string()),
                ProfileDisplay::Decimal(digits) => line.push_str(&format_decimal(value, digits)),
            }
        }
        line
    }

    /// Number of players.
    pub fn num_players(&self) -> usize {
        self.weights.num_players()
    }

    /// Number of strategies of `player`.
    pub fn num_strategies(&self, player: usize) -> usize {
        self.weights.num_strategies(player)
    }

    /// Strategy counts of all players.
    pub fn shape(&self) -> Vec<usize> {
        self.weights.shape()
    }

    /// Total number of (player, strategy) pairs.
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    /// True if the profile has no entries.
    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    /// Weights of one player.
    pub fn player(&self, player: usize) -> &[BigRational] {
        self.weights.player(player)
    }

    /// All weights in player-major order.
    pub fn values(&self) -> &[BigRational] {
        self.weights.as_slice()
    }

    /// Number of strategies `player` plays with positive weight.
    pub fn support_size(&self, player: usize) -> usize {
        self.player(player).iter().filter(|w| w.is_positive()).count()
    }

    /// True if every player's weights are non-negative and sum to one.
    pub fn is_normalized(&self) -> bool {
        (0..self.num_players()).all(|player| {
            let row = self.player(player);
            !row.iter().any(Signed::is_negative) && row.iter().sum::<BigRational>().is_one()
        })
    }

    /// Least common multiple of all weight denominators.
    pub fn denominator_lcm(&self) -> BigInt {
        self.values()
            .iter()
            .fold(BigInt::one(), |lcm, w| lcm.lcm(w.denom()))
    }

    /// Move `amount` of `player`'s weight from strategy `from` to strategy `to`.
    pub(crate) fn transfer(&mut self, player: usize, from: usize, to: usize, amount: &BigRational) {
        self.weights[(player, to)] += amount;
        self.weights[(player, from)] -= amount;
    }

    /// Payoff to `player` from playing pure `strategy` while everyone else
    /// plays according to this profile.
    pub fn strategy_payoff<G: StrategicGame + ?Sized>(
        &self,
        game: &G,
        player: usize,
        strategy: usize,
    ) -> BigRational {
        let mut pure = vec![0; self.num_players()];
        pure[player] = strategy;
        let mut total = BigRational::zero();
        self.accumulate(game, player, 0, &mut pure, BigRational::one(), &mut total);
        total
    }

    /// Expected payoff to `player` under this profile.
    pub fn expected_payoff<G: StrategicGame + ?Sized>(&self, game: &G, player: usize) -> BigRational {
        self.player(player)
            .iter()
            .enumerate()
            .filter(|(_, w)| !w.is_zero())
            .map(|(strategy, w)| w * self.strategy_payoff(game, player, strategy))
            .sum()
    }

    fn accumulate<G: StrategicGame + ?Sized>(
        &self,
        game: &G,
        player: usize,
        depth: usize,
        pure: &mut Vec<usize>,
        weight: BigRational,
        total: &mut BigRational,
    ) {
        if depth == self.num_players() {
            *total += weight * game.payoff(player, pure);
            return;
        }
        if depth == player {
            self.accumulate(game, player, depth + 1, pure, weight, total);
            return;
        }
        for (strategy, w) in self.player(depth).iter().enumerate() {
            if w.is_zero() {
                continue;
            }
            pure[depth] = strategy;
            self.accumulate(game, player, depth + 1, pure, &weight * w, total);
        }
    }
}

impl Index<(usize, usize)> for MixedProfile {
    type Output = BigRational;

    fn index(&self, index: (usize, usize)) -> &BigRational {
        &self.weights[index]
    }
}

impl fmt::Display for MixedProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for player in 0..self.num_players() {
            if player > 0 {
                write!(f, " ")?;
            }
            let row: Vec<String> = self.player(player).iter().map(ToString::to_string).collect();
            write!(f, "({})", row.join(","))?;
        }
        Ok(())
    }
}

/// Errors that can occur when building or reading a profile.
#[derive(Debug, Clone, PartialEq)]
pub enum ProfileError {
    /// The shape has no players or a player without strategies.
    InvalidShape(Vec<usize>),
    /// Wrong number of values for the game's shape.
    WrongLength {
        /// Values required.
        expected: usize,
        /// Values supplied.
        actual: usize,
    },
    /// A value could not be read as a rational number.
    InvalidValue(String),
    /// A weight is below zero.
    NegativeWeight {
        /// Player index (0-based).
        player: usize,
        /// Strategy index (0-based).
        strategy: usize,
    },
    /// A player's weights do not sum to one.
    NotNormalized {
        /// Player index (0-based).
        player: usize,
        /// The actual sum.
        total: BigRational,
    },
    /// The profile does not fit the game being solved.
    ShapeMismatch {
        /// The game's strategy counts.
        expected: Vec<usize>,
        /// The profile's strategy counts.
        actual: Vec<usize>,
    },
}

impl fmt::Display for ProfileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProfileError::InvalidShape(shape) => {
                write!(f, "invalid profile shape {:?}", shape)
            }
            ProfileError::WrongLength { expected, actual } => {
                write!(f, "expected {} values, found {}", expected, actual)
            }
            ProfileError::InvalidValue(text) => {
                write!(f, "'{}' is not a rational number", text)
            }
            ProfileError::NegativeWeight { player, strategy } => {
                write!(
                    f,
                    "player {} strategy {} has negative weight",
                    player + 1,
                    strategy + 1
                )
            }
            ProfileError::NotNormalized { player, total } => {
                write!(f, "player {} weights sum to {}, not 1", player + 1, total)
            }
            ProfileError::ShapeMismatch { expected, actual } => {
                write!(
                    f,
                    "profile shape {:?} does not match game shape {:?}",
                    actual, expected
                )
            }
        }
    }
}

impl std::error::Error for ProfileError {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::classic;

    fn ratio(n: i64, d: i64) -> BigRational {
        BigRational::new(n.into(), d.into())
    }

    #[test]
    fn test_first_strategies_is_normalized() {
        let profile = MixedProfile::first_strategies(&[2, 3]);
        assert!(profile.is_normalized());
        assert_eq!(profile[(1, 0)], BigRational::one());
        assert_eq!(profile.support_size(1), 1);
        assert_eq!(profile.to_line("start", ProfileDisplay::Rational), "start,1,0,1,0,0");
    }

    #[test]
    fn test_from_values_rejects_bad_profiles() {
        let shape = [2, 2];
        let short = MixedProfile::from_values(&shape, vec![ratio(1, 1)]);
        assert!(matches!(short, Err(ProfileError::WrongLength { expected: 4, actual: 1 })));

        let unnormalized =
            MixedProfile::from_values(&shape, vec![ratio(1, 2), ratio(1, 3), ratio(1, 1), ratio(0, 1)]);
        assert!(matches!(unnormalized, Err(ProfileError::NotNormalized { player: 0, .. })));

        let negative =
            MixedProfile::from_values(&shape, vec![ratio(1, 1), ratio(0, 1), ratio(2, 1), ratio(-1, 1)]);
        assert!(matches!(
            negative,
            Err(ProfileError::NegativeWeight { player: 1, strategy: 1 })
        ));
    }

    #[test]
    fn test_transfer_keeps_sums() {
        let mut profile = MixedProfile::first_strategies(&[3]);
        profile.transfer(0, 0, 2, &ratio(1, 4));
        profile.transfer(0, 2, 1, &ratio(1, 8));
        assert!(profile.is_normalized());
        assert_eq!(profile.player(0), &[ratio(3, 4), ratio(1, 8), ratio(1, 8)]);
    }

    #[test]
    fn test_rational_line_round_trip() {
        let shape = [3, 2];
        let values = vec![ratio(1, 3), ratio(1, 6), ratio(1, 2), ratio(5, 7), ratio(2, 7)];
        let profile = MixedProfile::from_values(&shape, values).unwrap();

        let line = profile.to_line("NE", ProfileDisplay::Rational);
        assert_eq!(line, "NE,1/3,1/6,1/2,5/7,2/7");

        let reread = MixedProfile::parse_line(&shape, &line).unwrap();
        assert_eq!(reread, profile);

        let unlabeled = MixedProfile::parse_line(&shape, "1/3, 1/6, 0.5, 5/7, 2/7").unwrap();
        assert_eq!(unlabeled, profile);
    }

    #[test]
    fn test_parse_line_failures() {
        let shape = [2, 2];
        assert!(matches!(
            MixedProfile::parse_line(&shape, "1,0,1"),
            Err(ProfileError::WrongLength { .. })
        ));
        assert!(matches!(
            MixedProfile::parse_line(&shape, "1,0,x,1"),
            Err(ProfileError::InvalidValue(_))
        ));
        assert!(matches!(
            MixedProfile::parse_line(&shape, "1,1,1,0"),
            Err(ProfileError::NotNormalized { player: 0, .. })
        ));
    }

    #[test]
    fn test_parse_lines_skips_bad_lines() {
        let shape = [2, 2];
        let text = "NE,1/2,1/2,1,0\n1,0,1\n1/2,1/3,1,0\n\n   \n0,1,1/4,3/4\n";
        let parsed: Vec<_> = MixedProfile::parse_lines(&shape, text).collect();

        let lines: Vec<usize> = parsed.iter().map(|(line, _)| *line).collect();
        assert_eq!(lines, vec![1, 2, 3, 6]);
        assert!(matches!(parsed[1].1, Err(ProfileError::WrongLength { .. })));
        assert!(matches!(parsed[2].1, Err(ProfileError::NotNormalized { player: 0, .. })));

        let good: Vec<MixedProfile> = parsed.into_iter().filter_map(|(_, p)| p.ok()).collect();
        assert_eq!(
            good,
            vec![
                MixedProfile::from_values(&shape, vec![ratio(1, 2), ratio(1, 2), ratio(1, 1), ratio(0, 1)])
                    .unwrap(),
                MixedProfile::from_values(&shape, vec![ratio(0, 1), ratio(1, 1), ratio(1, 4), ratio(3, 4)])
                    .unwrap(),
            ]
        );
    }

    #[test]
    fn test_decimal_display() {
        let profile =
            MixedProfile::from_values(&[2], vec![ratio(1, 3), ratio(2, 3)]).unwrap();
        assert_eq!(
            profile.to_line("NE", ProfileDisplay::Decimal(3)),
            "NE,0.333,0.667"
        );
    }

    #[test]
    fn test_payoffs_against_mixed_opponent() {
        let game = classic::matching_pennies();
        let profile = MixedProfile::from_values(
            &[2, 2],
            vec![ratio(1, 1), ratio(0, 1), ratio(3, 4), ratio(1, 4)],
        )
        .unwrap();

        // Row player wins on a match: 3/4 - 1/4 with heads, 1/4 - 3/4 with tails.
        assert_eq!(profile.strategy_payoff(&game, 0, 0), ratio(1, 2));
        assert_eq!(profile.strategy_payoff(&game, 0, 1), ratio(-1, 2));
        assert_eq!(profile.expected_payoff(&game, 0), ratio(1, 2));
        assert_eq!(profile.expected_payoff(&game, 1), ratio(-1, 2));
    }

    #[test]
    fn test_denominator_lcm() {
        let profile = MixedProfile::from_values(
            &[2, 2],
            vec![ratio(1, 4), ratio(3, 4), ratio(1, 6), ratio(5, 6)],
        )
        .unwrap();
        assert_eq!(profile.denominator_lcm(), BigInt::from(12));
    }
}
