//! Game trait definition for the simplicial subdivision solver.
//!
//! Any finite strategic-form game that implements [`StrategicGame`] can be
//! solved. The solver only ever asks for player and strategy counts and for
//! pure-profile payoffs; how the game is stored or parsed is up to the
//! implementor (see [`crate::games`] for a dense table implementation).

use num_rational::BigRational;

/// The interface the solver needs from a strategic-form game.
///
/// Players and strategies are 0-indexed. Every player must have at least one
/// strategy; the solver treats a player without strategies as a broken game
/// and panics.
///
/// # Example
/// ```ignore
/// struct Coordination;
///
/// impl StrategicGame for Coordination {
///     fn num_players(&self) -> usize { 2 }
///     fn num_strategies(&self, _player: usize) -> usize { 2 }
///     fn payoff(&self, _player: usize, profile: &[usize]) -> BigRational {
///         BigRational::from_integer((profile[0] == profile[1]).into())
///     }
/// }
/// ```
pub trait StrategicGame {
    /// Number of players.
    fn num_players(&self) -> usize;

    /// Number of pure strategies available to `player`.
    fn num_strategies(&self, player: usize) -> usize;

    /// Payoff to `player` when each player `p` plays pure strategy `profile[p]`.
    fn payoff(&self, player: usize, profile: &[usize]) -> BigRational;

    /// Human-readable title of the game.
    fn title(&self) -> &str {
        ""
    }

    /// Human-readable name of a player.
    fn player_name(&self, player: usize) -> String {
        format!("Player {}", player + 1)
    }

    /// Human-readable name of a strategy.
    fn strategy_name(&self, _player: usize, strategy: usize) -> String {
        (strategy + 1).to_string()
    }

    /// Strategy counts of all players.
    fn shape(&self) -> Vec<usize> {
        (0..self.num_players())
            .map(|player| self.num_strategies(player))
            .collect()
    }

    /// Number of pure strategy profiles.
    fn num_profiles(&self) -> usize {
        self.shape().iter().product()
    }
}
