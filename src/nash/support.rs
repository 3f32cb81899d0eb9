//! Dense per-(player, strategy) storage and exact number text helpers.
//!
//! Every quantity the pivot engine tracks per strategy (profile weights,
//! triangulation flags, saturation flags, step multipliers) lives in a
//! [`StrategyTable`]: one flat vector in player-major, strategy-minor order
//! with per-player offsets.

use std::ops::{Index, IndexMut};

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{ToPrimitive, Zero};

/// Largest decimal exponent accepted by [`parse_rational`].
const MAX_DECIMAL_EXPONENT: i64 = 4096;

/// A table holding one value per (player, strategy) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrategyTable<T> {
    /// `offsets[p]..offsets[p + 1]` is player `p`'s slice of `data`.
    offsets: Vec<usize>,
    data: Vec<T>,
}

impl<T: Clone> StrategyTable<T> {
    /// Create a table with every entry set to `value`.
    pub fn filled(shape: &[usize], value: T) -> Self {
        let offsets = offsets_for(shape);
        let total = offsets[offsets.len() - 1];
        Self {
            offsets,
            data: vec![value; total],
        }
    }
}

impl<T> StrategyTable<T> {
    /// Wrap a flat player-major vector. Returns `None` if its length does
    /// not match the shape.
    pub fn from_vec(shape: &[usize], data: Vec<T>) -> Option<Self> {
        let offsets = offsets_for(shape);
        if offsets[offsets.len() - 1] != data.len() {
            return None;
        }
        Some(Self { offsets, data })
    }

    /// Number of players.
    pub fn num_players(&self) -> usize {
        self.offsets.len() - 1
    }

    /// Number of strategies of `player`.
    pub fn num_strategies(&self, player: usize) -> usize {
        self.offsets[player + 1] - self.offsets[player]
    }

    /// Strategy counts of all players.
    pub fn shape(&self) -> Vec<usize> {
        self.offsets.windows(2).map(|w| w[1] - w[0]).collect()
    }

    /// Total number of entries.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True if the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// All entries of one player.
    pub fn player(&self, player: usize) -> &[T] {
        &self.data[self.offsets[player]..self.offsets[player + 1]]
    }

    /// All entries in player-major order.
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }
}

impl<T> Index<(usize, usize)> for StrategyTable<T> {
    type Output = T;

    fn index(&self, (player, strategy): (usize, usize)) -> &T {
        debug_assert!(strategy < self.num_strategies(player));
        &self.data[self.offsets[player] + strategy]
    }
}

impl<T> IndexMut<(usize, usize)> for StrategyTable<T> {
    fn index_mut(&mut self, (player, strategy): (usize, usize)) -> &mut T {
        debug_assert!(strategy < self.num_strategies(player));
        &mut self.data[self.offsets[player] + strategy]
    }
}

fn offsets_for(shape: &[usize]) -> Vec<usize> {
    let mut offsets = Vec::with_capacity(shape.len() + 1);
    offsets.push(0);
    let mut total = 0;
    for &n in shape {
        total += n;
        offsets.push(total);
    }
    offsets
}

/// Parse an exact rational from text.
///
/// Accepts integers (`-3`), fractions (`2/3`), and decimals with an
/// optional exponent (`0.125`, `1.5e-3`). Decimals are read exactly, never
/// through a float.
pub fn parse_rational(text: &str) -> Option<BigRational> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if let Some((numer, denom)) = text.split_once('/') {
        let numer: BigInt = numer.trim().parse().ok()?;
        let denom: BigInt = denom.trim().parse().ok()?;
        if denom.is_zero() {
            return None;
        }
        return Some(BigRational::new(numer, denom));
    }

    let (mantissa, exponent) = match text.find(['e', 'E']) {
        Some(pos) => (&text[..pos], text[pos + 1..].parse::<i64>().ok()?),
        None => (text, 0),
    };
    if exponent.abs() > MAX_DECIMAL_EXPONENT {
        return None;
    }

    let (negative, digits) = match mantissa.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, mantissa.strip_prefix('+').unwrap_or(mantissa)),
    };
    let (whole, frac) = digits.split_once('.').unwrap_or((digits, ""));
    if whole.is_empty() && frac.is_empty() {
        return None;
    }
    if !whole.chars().chain(frac.chars()).all(|c| c.is_ascii_digit()) {
        return None;
    }

    let numer: BigInt = format!("{whole}{frac}").parse().ok()?;
    let scale = exponent - frac.len() as i64;
    let ten = BigInt::from(10u32);
    let value = if scale >= 0 {
        BigRational::from_integer(numer * num_traits::pow(ten, scale as usize))
    } else {
        BigRational::new(numer, num_traits::pow(ten, (-scale) as usize))
    };

    Some(if negative { -value } else { value })
}

/// Format a rational in fixed-point notation with `decimals` digits.
pub fn format_decimal(value: &BigRational, decimals: usize) -> String {
    match value.to_f64() {
        Some(x) => format!("{:.*}", decimals, x),
        None => value.to_string(),
    }
}
