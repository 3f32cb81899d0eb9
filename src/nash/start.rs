//! Starting points for the solver.
//!
//! The solver's first mesh is derived from the starting profile's
//! denominators, so a start with denominator `k` begins on the grid of
//! spacing `1 / k` (before the first resize).

use std::num::NonZeroU32;

use num_bigint::BigInt;
use num_rational::BigRational;
use rand::Rng;

use crate::nash::game::StrategicGame;
use crate::nash::profile::MixedProfile;

/// Every player puts all weight on their first strategy.
pub fn pure_start<G: StrategicGame + ?Sized>(game: &G) -> MixedProfile {
    MixedProfile::first_strategies(&game.shape())
}

/// A random profile whose weights are multiples of `1 / denom`.
///
/// For each player, strategies except the last draw, in order, a uniform
/// share of the weight not yet assigned; the last strategy takes the rest.
/// Once a player's weight is used up the remaining strategies get zero.
pub fn random_start<G, R>(game: &G, denom: NonZeroU32, rng: &mut R) -> MixedProfile
where
    G: StrategicGame + ?Sized,
    R: Rng + ?Sized,
{
    let denom = denom.get();
    let shape = game.shape();
    let mut values = Vec::with_capacity(shape.iter().sum());

    for &n in &shape {
        let mut counts = vec![0u32; n];
        let mut used = 0;
        for count in counts.iter_mut().take(n.saturating_sub(1)) {
            if used >= denom {
                break;
            }
            let draw = rng.gen_range(0..=denom - used);
            *count = draw;
            used += draw;
        }
        if let Some(last) = counts.last_mut() {
            *last = denom - used;
        }
        values.extend(
            counts
                .into_iter()
                .map(|c| BigRational::new(BigInt::from(c), BigInt::from(denom))),
        );
    }

    // Each player's counts sum to `denom` by construction.
    match MixedProfile::from_values(&shape, values) {
        Ok(profile) => profile,
        Err(e) => panic!("random start is not a profile: {}", e),
    }
}
