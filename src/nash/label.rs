//! Vertex labelling.
//!
//! The label of a profile is the (player, strategy) pair with the largest
//! unilateral gain: for each player, the gap between the best pure reply
//! and the payoff actually realised. The pivot engine is driven entirely by
//! these labels; the size of the largest gap doubles as the quality measure
//! of an approximate equilibrium.

use std::fmt;

use num_rational::BigRational;

use crate::nash::game::StrategicGame;
use crate::nash::profile::MixedProfile;

/// A (player, strategy) pair. Both indices are 0-based; [`fmt::Display`]
/// shows them 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Label {
    /// Player index.
    pub player: usize,
    /// Strategy index.
    pub strategy: usize,
}

impl Label {
    /// Create a label.
    pub fn new(player: usize, strategy: usize) -> Self {
        Self { player, strategy }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.player + 1, self.strategy + 1)
    }
}

/// Find the most profitable unilateral deviation from `profile`.
///
/// Returns the label and its excess (best reply payoff minus realised
/// payoff). Ties go to the lowest player, then the lowest strategy.
///
/// # Panics
/// Panics if some player has no strategies.
pub fn best_deviation<G: StrategicGame + ?Sized>(
    game: &G,
    profile: &MixedProfile,
) -> (Label, BigRational) {
    let mut best: Option<(Label, BigRational)> = None;

    for player in 0..profile.num_players() {
        let mut realised = BigRational::from_integer(0.into());
        let mut reply: Option<(usize, BigRational)> = None;

        for (strategy, weight) in profile.player(player).iter().enumerate() {
            let pay = profile.strategy_payoff(game, player, strategy);
            realised += weight * &pay;
            if reply.as_ref().map_or(true, |(_, max)| pay > *max) {
                reply = Some((strategy, pay));
            }
        }

        let Some((strategy, max)) = reply else {
            panic!("player {} has no best response", player + 1);
        };
        let excess = max - realised;
        if best.as_ref().map_or(true, |(_, z)| excess > *z) {
            best = Some((Label::new(player, strategy), excess));
        }
    }

    best.unwrap_or_else(|| panic!("cannot label a profile without players"))
}

/// The smallest excess seen so far in a solve, and the profile it was seen at.
///
/// One incumbent lives for a whole solve; it is never reset between mesh
/// passes.
#[derive(Debug, Clone)]
pub struct Incumbent {
    regret: BigRational,
    profile: MixedProfile,
    evaluations: u64,
}

impl Incumbent {
    /// Start from `start`, scored by its own label excess.
    pub fn new<G: StrategicGame + ?Sized>(game: &G, start: &MixedProfile) -> Self {
        let (_, regret) = best_deviation(game, start);
        Self {
            regret,
            profile: start.clone(),
            evaluations: 0,
        }
    }

    /// Smallest excess observed.
    pub fn regret(&self) -> &BigRational {
        &self.regret
    }

    /// Profile at which [`Incumbent::regret`] was observed.
    pub fn profile(&self) -> &MixedProfile {
        &self.profile
    }

    /// Number of labels evaluated through [`Incumbent::label`].
    pub fn evaluations(&self) -> u64 {
        self.evaluations
    }

    /// Label `profile`, recording it if its excess beats the incumbent.
    pub fn label<G: StrategicGame + ?Sized>(&mut self, game: &G, profile: &MixedProfile) -> Label {
        let (label, excess) = best_deviation(game, profile);
        self.evaluations += 1;
        if excess < self.regret {
            self.regret = excess;
            self.profile.clone_from(profile);
        }
        label
    }
}
