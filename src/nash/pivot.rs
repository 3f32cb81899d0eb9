//! The pivot engine: one pass of complementary pivoting at a fixed mesh.
//!
//! A pass starts at a reference vertex `v` of the grid with spacing `d` and
//! walks a path of simplices, one label evaluation per step, until it reaches
//! a vertex whose labels cover all but one strategy of some player (a fully
//! labelled vertex). The walk is encoded compactly:
//!
//! - the path `π` is an ordered list of (player, strategy) pairs; walking it
//!   from `v` one grid step per entry reaches every vertex of the current
//!   simplex,
//! - `labels` records, per path position, which label produced it,
//! - `T` (triangulated) and `U` (saturated) flag strategies consumed into the
//!   path or pinned at zero on the simplex boundary,
//! - `ab` counts net grid steps per strategy, so coordinates can be rebuilt
//!   from `v` without replaying the whole walk.
//!
//! Path positions are 1-based (`1..=t` for `π`, `1..=t + 1` for `labels`):
//! head, tail and interior moves are told apart by comparing against `1` and
//! `t + 1`. Strategies are 0-based and ordered circularly; the predecessor of
//! the first strategy is the last one.
//!
//! Reference: van der Laan, Talman and van der Heyden, "Simplicial variable
//! dimension algorithms for solving the nonlinear complementarity problem on
//! a product of unit simplices using a general labelling", Mathematics of
//! Operations Research, 1987.

use std::time::Instant;

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{Signed, Zero};

use crate::nash::game::StrategicGame;
use crate::nash::label::{Incumbent, Label};
use crate::nash::profile::MixedProfile;
use crate::nash::support::StrategyTable;

/// Why a pass stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum PassEnd {
    /// A fully labelled vertex was reached.
    FullyLabeled,
    /// The per-pass label budget ran out.
    PivotLimit,
    /// The solve deadline passed.
    Deadline,
}

/// Limits checked before every label evaluation of a pass.
#[derive(Debug, Clone, Default)]
pub struct PassLimits {
    /// Maximum number of label evaluations in the pass.
    pub max_pivots: Option<u64>,
    /// Wall-clock deadline.
    pub deadline: Option<Instant>,
}

impl PassLimits {
    fn check(&self, pivots: u64) -> Option<PassEnd> {
        if self.max_pivots.is_some_and(|max| pivots >= max) {
            return Some(PassEnd::PivotLimit);
        }
        if self.deadline.is_some_and(|deadline| Instant::now() >= deadline) {
            return Some(PassEnd::Deadline);
        }
        None
    }
}

/// Result of one pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PassOutcome {
    /// Why the pass stopped.
    pub end: PassEnd,
    /// Label evaluations performed.
    pub pivots: u64,
}

/// Run one pass at mesh `mesh` from reference vertex `start`.
///
/// Every label evaluation is reported to `incumbent`; when the pass ends,
/// `incumbent.profile()` holds the answer and `incumbent.regret()` its excess.
/// All coordinate changes made during the pass are integer multiples of
/// `mesh`.
pub fn run_pass<G: StrategicGame + ?Sized>(
    game: &G,
    start: &MixedProfile,
    mesh: &BigRational,
    leash_length: u32,
    incumbent: &mut Incumbent,
    limits: &PassLimits,
) -> PassOutcome {
    let mut state = PivotState::new(start, mesh, leash_length);
    state.run(game, incumbent, limits)
}

/// Nearest strategy before `strategy`, scanning backwards circularly, that
/// is not saturated.
///
/// # Panics
/// Panics if every strategy is saturated.
pub fn unsaturated_predecessor(saturated: &[bool], strategy: usize) -> usize {
    let n = saturated.len();
    let mut candidate = strategy;
    for _ in 0..n {
        candidate = (candidate + n - 1) % n;
        if !saturated[candidate] {
            return candidate;
        }
    }
    panic!("every strategy is saturated");
}

/// Circular successor of [`unsaturated_predecessor`].
pub fn unsaturated_successor(saturated: &[bool], strategy: usize) -> usize {
    (unsaturated_predecessor(saturated, strategy) + 1) % saturated.len()
}

/// Ordered slots addressed by 1-based position.
#[derive(Debug, Clone)]
struct Path {
    slots: Vec<Option<Label>>,
}

impl Path {
    fn new(positions: usize) -> Self {
        Self {
            slots: vec![None; positions + 1],
        }
    }

    fn get(&self, position: usize) -> Option<Label> {
        self.slots.get(position).copied().flatten()
    }

    fn at(&self, position: usize) -> Label {
        self.get(position)
            .unwrap_or_else(|| panic!("pivot path position {} is empty", position))
    }

    fn set(&mut self, position: usize, label: Label) {
        self.slots[position] = Some(label);
    }

    /// Move the entry at `hi` to `lo`, shifting `lo..hi` up by one.
    fn rotate_down(&mut self, lo: usize, hi: usize) {
        self.slots[lo..=hi].rotate_right(1);
    }

    /// Move the entry at `lo` to `hi`, shifting `lo + 1..=hi` down by one.
    fn rotate_up(&mut self, lo: usize, hi: usize) {
        self.slots[lo..=hi].rotate_left(1);
    }

    fn swap(&mut self, a: usize, b: usize) {
        self.slots.swap(a, b);
    }

    /// First position holding `label`, other than `skip`.
    fn find(&self, label: Label, skip: Option<usize>) -> usize {
        (1..self.slots.len())
            .find(|&i| Some(i) != skip && self.slots[i] == Some(label))
            .unwrap_or_else(|| panic!("label {} is not on the pivot path", label))
    }
}

/// Where the state machine goes next.
#[derive(Debug, Clone, Copy)]
enum Step {
    /// Evaluate the label of the current vertex.
    Label,
    /// Insert `label` into the path at `at` and step away from it.
    Extend { at: usize, label: Label },
    /// The label at `at` is already on the path: move the path end.
    Retract { at: usize },
    /// Remove the path entry before `at`.
    Drop { at: usize },
    /// Release saturated strategy `to` of `label.player` and rotate the path.
    Wrap { label: Label, to: usize },
    /// A fully labelled vertex was reached.
    Finished,
}

/// The per-pass working state: everything the pivot steps read and write.
struct PivotState {
    /// Grid spacing `d`.
    mesh: BigRational,
    /// Maximum drift `leash_length * d` from the reference vertex.
    leash: BigRational,
    /// Reference vertex `v`.
    reference: MixedProfile,
    /// Current vertex `y`.
    current: MixedProfile,
    path: Path,
    labels: Path,
    /// Path length `t`.
    len: usize,
    /// Label slot to be filled by the next evaluation.
    ibar: usize,
    triangulated: StrategyTable<bool>,
    saturated: StrategyTable<bool>,
    steps: StrategyTable<i64>,
}

impl PivotState {
    fn new(start: &MixedProfile, mesh: &BigRational, leash_length: u32) -> Self {
        let shape = start.shape();
        let mut saturated = StrategyTable::filled(&shape, false);
        for (player, &n) in shape.iter().enumerate() {
            for strategy in 0..n {
                saturated[(player, strategy)] = start[(player, strategy)].is_zero();
            }
        }
        let positions = start.len() + 2;

        Self {
            mesh: mesh.clone(),
            leash: mesh * BigRational::from_integer(BigInt::from(leash_length)),
            reference: start.clone(),
            current: start.clone(),
            path: Path::new(positions),
            labels: Path::new(positions),
            len: 0,
            ibar: 1,
            triangulated: StrategyTable::filled(&shape, false),
            saturated,
            steps: StrategyTable::filled(&shape, 0),
        }
    }

    fn run<G: StrategicGame + ?Sized>(
        &mut self,
        game: &G,
        incumbent: &mut Incumbent,
        limits: &PassLimits,
    ) -> PassOutcome {
        let mut pivots = 0;
        let mut step = Step::Label;
        loop {
            step = match step {
                Step::Label => {
                    if let Some(end) = limits.check(pivots) {
                        return PassOutcome { end, pivots };
                    }
                    pivots += 1;
                    let label = incumbent.label(game, &self.current);
                    self.classify(label)
                }
                Step::Extend { at, label } => self.extend(at, label),
                Step::Retract { at } => self.retract(at),
                Step::Drop { at } => self.drop_entry(at),
                Step::Wrap { label, to } => self.wrap(label, to),
                Step::Finished => {
                    return PassOutcome {
                        end: PassEnd::FullyLabeled,
                        pivots,
                    }
                }
            };
        }
    }

    fn num_strategies(&self, player: usize) -> usize {
        self.reference.num_strategies(player)
    }

    fn predecessor(&self, player: usize, strategy: usize) -> usize {
        unsaturated_predecessor(self.saturated.player(player), strategy)
    }

    fn successor(&self, player: usize, strategy: usize) -> usize {
        unsaturated_successor(self.saturated.player(player), strategy)
    }

    fn is_fixed(&self, player: usize, strategy: usize) -> bool {
        self.triangulated[(player, strategy)] || self.saturated[(player, strategy)]
    }

    /// True if every strategy of `player` but one is triangulated or saturated.
    fn is_last_free(&self, player: usize) -> bool {
        let fixed = (0..self.num_strategies(player))
            .filter(|&s| self.is_fixed(player, s))
            .count();
        fixed + 1 == self.num_strategies(player)
    }

    /// True if strategy `strategy` of `player` is at zero or has drifted a
    /// full leash below the reference vertex.
    fn is_exhausted(&self, player: usize, strategy: usize) -> bool {
        let y = &self.current[(player, strategy)];
        !y.is_positive() || &self.reference[(player, strategy)] - y >= self.leash
    }

    /// Decide what to do with a freshly evaluated label.
    fn classify(&mut self, label: Label) -> Step {
        self.labels.set(self.ibar, label);
        let Label { player, strategy } = label;

        if !self.is_fixed(player, strategy) {
            if self.is_last_free(player) {
                return Step::Finished;
            }
            return Step::Extend {
                at: self.len + 1,
                label,
            };
        }

        if self.triangulated[(player, strategy)] {
            return Step::Retract {
                at: self.labels.find(label, Some(self.ibar)),
            };
        }

        // Saturated: look for the next free strategy in increasing order.
        let n = self.num_strategies(player);
        let mut free = strategy;
        while self.saturated[(player, free)] {
            free = (free + 1) % n;
        }
        let target = Label::new(player, free);
        let at = if self.triangulated[(player, free)] {
            (1..=self.len)
                .find(|&i| self.path.get(i) == Some(target))
                .unwrap_or(self.len + 1)
        } else {
            self.len + 1
        };
        Step::Extend { at, label }
    }

    fn extend(&mut self, at: usize, label: Label) -> Step {
        self.reconstruct(at);
        self.path.rotate_down(at, self.len + 1);
        self.path.set(at, label);
        self.labels.rotate_down(at + 1, self.len + 2);
        self.ibar = at + 1;
        self.len += 1;
        self.advance(at);
        self.triangulated[(label.player, label.strategy)] = true;
        self.saturated[(label.player, label.strategy)] = false;
        Step::Label
    }

    fn retract(&mut self, at: usize) -> Step {
        let t = self.len;
        let Label { player, strategy } = self.path.at(if at == t + 1 { t } else { at });
        let boundary = if at < t + 1 {
            self.predecessor(player, strategy)
        } else {
            strategy
        };
        let mut wrap_to = self.successor(player, strategy);

        let anchor = if at == 1 {
            t + 1
        } else if at == t + 1 {
            1
        } else {
            at - 1
        };
        self.reconstruct(anchor);

        if at == 1 && self.is_exhausted(player, boundary) {
            if self.is_last_free(player) {
                self.saturated[(player, boundary)] = true;
                return Step::Finished;
            }
            self.update(player, at);
            self.saturated[(player, boundary)] = true;
            self.advance(self.len);
            return Step::Label;
        }

        if (2..=t).contains(&at) && self.is_exhausted(player, boundary) {
            return Step::Drop { at };
        }

        if at == t + 1 && self.steps[(player, wrap_to)] == 0 {
            if self.is_exhausted(player, strategy) {
                return Step::Drop { at };
            }
            let n = self.num_strategies(player);
            let mut passed = false;
            while self.steps[(player, wrap_to)] == 0 && !passed {
                if wrap_to == strategy {
                    passed = true;
                }
                wrap_to = (wrap_to + 1) % n;
            }
            wrap_to = (wrap_to + n - 1) % n;
            return if wrap_to == strategy {
                Step::Drop { at }
            } else {
                Step::Wrap {
                    label: Label::new(player, strategy),
                    to: wrap_to,
                }
            };
        }

        if at == 1 || at <= t {
            self.advance(at);
        } else {
            let tail = self.path.at(t);
            let to = self.predecessor(tail.player, tail.strategy);
            let mesh = self.mesh.clone();
            self.current.transfer(tail.player, tail.strategy, to, &mesh);
        }
        self.update(player, at);
        Step::Label
    }

    fn drop_entry(&mut self, at: usize) -> Step {
        let t = self.len;
        self.reconstruct(1);
        let label = self.path.at(at - 1);
        self.triangulated[(label.player, label.strategy)] = false;
        if self.is_exhausted(label.player, label.strategy) {
            self.saturated[(label.player, label.strategy)] = true;
        }
        self.labels.rotate_up(at, t + 1);
        self.path.rotate_up(at - 1, t);
        self.len -= 1;
        Step::Retract {
            at: self.labels.find(label, None),
        }
    }

    fn wrap(&mut self, label: Label, to: usize) -> Step {
        let t = self.len;
        self.labels.rotate_down(1, t + 1);
        self.ibar = 1;
        self.path.rotate_down(1, t);
        self.saturated[(label.player, to)] = false;

        let head = self.path.at(1);
        let to = self.predecessor(head.player, head.strategy);
        let mesh = self.mesh.clone();
        self.current.transfer(head.player, head.strategy, to, &mesh);

        self.shift_steps(label.player, label.strategy, -1);
        Step::Label
    }

    /// Rotate the path after a retraction at `at`, keeping `ab` consistent.
    fn update(&mut self, player: usize, at: usize) {
        let t = self.len;
        if (2..=t).contains(&at) {
            self.path.swap(at, at - 1);
            self.ibar = at;
        } else if at == 1 {
            self.labels.rotate_up(1, t + 1);
            self.ibar = t + 1;
            let head = self.path.at(1);
            if head.player == player {
                self.shift_steps(player, head.strategy, 1);
                self.path.rotate_up(1, t);
            }
        } else if at == t + 1 {
            self.labels.rotate_down(1, t + 1);
            self.ibar = 1;
            let tail = self.path.at(t);
            if tail.player == player {
                self.shift_steps(player, tail.strategy, -1);
                self.path.rotate_down(1, t);
            }
        }
    }

    /// Add `delta` to the step counter of every strategy of `player` from the
    /// successor of `strategy` circularly up to and including `strategy`.
    fn shift_steps(&mut self, player: usize, strategy: usize, delta: i64) {
        let n = self.num_strategies(player);
        let mut k = self.successor(player, strategy);
        loop {
            self.steps[(player, k)] += delta;
            if k == strategy {
                break;
            }
            k = (k + 1) % n;
        }
    }

    /// Rebuild the current vertex from the reference vertex and the step
    /// ledger, then walk the path up to position `position`.
    fn reconstruct(&mut self, position: usize) {
        self.current.clone_from(&self.reference);
        for player in 0..self.reference.num_players() {
            let n = self.num_strategies(player);
            for strategy in 0..n {
                let count = self.steps[(player, strategy)];
                if count == 0 || !self.is_fixed(player, strategy) {
                    continue;
                }
                let amount = &self.mesh * BigRational::from_integer(BigInt::from(count));
                let before = (strategy + n - 1) % n;
                self.current.transfer(player, before, strategy, &amount);
            }
        }
        for i in 1..position {
            self.advance(i);
        }
    }

    /// Take one grid step along path entry `position`: move `d` onto its
    /// strategy from that strategy's unsaturated predecessor.
    fn advance(&mut self, position: usize) {
        let Label { player, strategy } = self.path.at(position);
        let from = self.predecessor(player, strategy);
        let mesh = self.mesh.clone();
        self.current.transfer(player, from, strategy, &mesh);
    }
}
