//! Grid refinement: the outer loop of the simplicial subdivision method.
//!
//! The solver starts from a rational profile, picks an initial mesh from the
//! profile's common denominator, and runs the pivot engine at successively
//! finer meshes. Each pass starts from the previous pass's answer. It stops
//! when the label excess of the answer drops below the configured tolerance
//! (or a configured bound is hit).

use std::time::{Duration, Instant};

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::ToPrimitive;

use crate::nash::config::{ConfigError, SimpdivConfig, SolveStats};
use crate::nash::game::StrategicGame;
use crate::nash::label::Incumbent;
use crate::nash::pivot::{self, PassEnd, PassLimits};
use crate::nash::profile::{MixedProfile, ProfileError};

/// The simplicial subdivision solver.
///
/// # Example
/// ```ignore
/// use simpdiv::nash::{SimpdivConfig, SimpdivSolver, start};
///
/// let game = simpdiv::games::classic::matching_pennies();
/// let solver = SimpdivSolver::new(game, SimpdivConfig::default())?;
/// let result = solver.solve(&start::pure_start(solver.game()))?;
/// println!("{}", result.profile);
/// ```
#[derive(Debug, Clone)]
pub struct SimpdivSolver<G: StrategicGame> {
    /// The game being solved.
    game: G,

    /// Configuration for the solver.
    config: SimpdivConfig,

    /// `config.tolerance` as an exact rational.
    tolerance: BigRational,
}

/// What the solver reports after every pass.
#[derive(Debug, Clone, Copy)]
pub struct PassReport<'a> {
    /// 1-based pass number.
    pub pass: u32,
    /// Mesh size of the pass.
    pub mesh: &'a BigRational,
    /// Smallest label excess seen so far in the solve.
    pub max_regret: &'a BigRational,
    /// The pass's answer; the next pass starts here.
    pub profile: &'a MixedProfile,
    /// Label evaluations in this pass.
    pub pivots: u64,
    /// Why the pass stopped.
    pub end: PassEnd,
}

/// The answer of one solve.
#[derive(Debug, Clone)]
pub struct SolveResult {
    /// The approximate equilibrium.
    pub profile: MixedProfile,
    /// Its label excess: the most any player gains by deviating.
    pub max_regret: BigRational,
    /// Statistics of the run.
    pub stats: SolveStats,
}

impl<G: StrategicGame> SimpdivSolver<G> {
    /// Create a new solver for the given game.
    pub fn new(game: G, config: SimpdivConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let tolerance = config.tolerance_bound()?;
        Ok(Self {
            game,
            config,
            tolerance,
        })
    }

    /// Get reference to the game.
    pub fn game(&self) -> &G {
        &self.game
    }

    /// Get reference to the configuration.
    pub fn config(&self) -> &SimpdivConfig {
        &self.config
    }

    /// Solve from `start`.
    pub fn solve(&self, start: &MixedProfile) -> Result<SolveResult, ProfileError> {
        self.solve_with_callback(start, |_| true)
    }

    /// Solve from `start`, calling `callback` after every pass.
    ///
    /// Returning `false` from the callback stops refinement after that pass;
    /// the result is then flagged as not converged unless the pass already
    /// met the tolerance.
    pub fn solve_with_callback<F>(
        &self,
        start: &MixedProfile,
        mut callback: F,
    ) -> Result<SolveResult, ProfileError>
    where
        F: FnMut(&PassReport<'_>) -> bool,
    {
        let shape = self.game.shape();
        if start.shape() != shape {
            return Err(ProfileError::ShapeMismatch {
                expected: shape,
                actual: start.shape(),
            });
        }

        let started = Instant::now();
        let limits = PassLimits {
            max_pivots: self.config.max_pivots_per_pass,
            deadline: self
                .config
                .time_limit_secs
                .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
                .and_then(|limit| started.checked_add(limit)),
        };
        let resize = BigRational::from_integer(BigInt::from(self.config.grid_resize));

        let mut mesh = BigRational::new(BigInt::from(1), start.denominator_lcm());
        let mut incumbent = Incumbent::new(&self.game, start);
        let mut current = start.clone();
        let mut stats = SolveStats::default();

        log::info!(
            "solving {} player game with shape {:?} from initial mesh {}",
            shape.len(),
            shape,
            mesh
        );

        loop {
            mesh = mesh / &resize;
            let outcome = pivot::run_pass(
                &self.game,
                &current,
                &mesh,
                self.config.leash_length,
                &mut incumbent,
                &limits,
            );
            current.clone_from(incumbent.profile());
            stats.passes += 1;
            stats.pivots += outcome.pivots;

            log::info!(
                "pass {:>3}  mesh {:<16}  excess {:.3e}  pivots {}",
                stats.passes,
                mesh,
                incumbent.regret().to_f64().unwrap_or(f64::NAN),
                outcome.pivots
            );
            log::debug!("pass {} ended: {:?}", stats.passes, outcome.end);

            let report = PassReport {
                pass: stats.passes,
                mesh: &mesh,
                max_regret: incumbent.regret(),
                profile: &current,
                pivots: outcome.pivots,
                end: outcome.end,
            };
            let keep_going = callback(&report);

            if *incumbent.regret() < self.tolerance {
                stats.converged = true;
                break;
            }
            if outcome.end == PassEnd::Deadline {
                log::warn!("time limit reached after {} passes", stats.passes);
                break;
            }
            if !keep_going {
                log::warn!("refinement stopped by caller after {} passes", stats.passes);
                break;
            }
            if self
                .config
                .max_refinements
                .is_some_and(|max| stats.passes >= max)
            {
                log::warn!("refinement limit reached after {} passes", stats.passes);
                break;
            }
        }

        let max_regret = incumbent.regret().clone();
        stats.final_mesh = mesh.to_string();
        stats.max_regret = max_regret.to_f64().unwrap_or(f64::NAN);
        stats.elapsed_seconds = started.elapsed().as_secs_f64();

        log::info!(
            "finished after {} passes and {} pivots in {:.3}s (converged: {})",
            stats.passes,
            stats.pivots,
            stats.elapsed_seconds,
            stats.converged
        );

        Ok(SolveResult {
            profile: current,
            max_regret,
            stats,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::classic;
    use crate::nash::start::pure_start;
    use num_traits::Zero;

    fn ratio(n: i64, d: i64) -> BigRational {
        BigRational::new(n.into(), d.into())
    }

    fn profile(shape: &[usize], values: &[(i64, i64)]) -> MixedProfile {
        let values = values.iter().map(|&(n, d)| ratio(n, d)).collect();
        MixedProfile::from_values(shape, values).unwrap()
    }

    #[test]
    fn test_trivial_game_single_pass() {
        let solver = SimpdivSolver::new(classic::trivial(), SimpdivConfig::default()).unwrap();
        let start = pure_start(solver.game());
        let result = solver.solve(&start).unwrap();

        assert!(result.stats.converged);
        assert_eq!(result.stats.passes, 1);
        assert_eq!(result.stats.pivots, 1);
        assert!(result.max_regret <= BigRational::zero());
        assert_eq!(result.profile, start);
    }

    #[test]
    fn test_matching_pennies_hits_uniform_mix() {
        let solver =
            SimpdivSolver::new(classic::matching_pennies(), SimpdivConfig::default()).unwrap();
        let result = solver.solve(&pure_start(solver.game())).unwrap();

        assert!(result.stats.converged);
        assert_eq!(result.stats.passes, 1);
        assert_eq!(result.stats.final_mesh, "1/2");
        assert!(result.max_regret.is_zero());
        assert_eq!(
            result.profile,
            profile(&[2, 2], &[(1, 2), (1, 2), (1, 2), (1, 2)])
        );
    }

    #[test]
    fn test_prisoners_dilemma_defects() {
        let solver =
            SimpdivSolver::new(classic::prisoners_dilemma(), SimpdivConfig::default()).unwrap();
        let result = solver.solve(&pure_start(solver.game())).unwrap();

        assert_eq!(result.stats.passes, 1);
        assert_eq!(result.profile, profile(&[2, 2], &[(0, 1), (1, 1), (0, 1), (1, 1)]));
    }

    #[test]
    fn test_dominant_strategy_found_on_first_pass() {
        let solver =
            SimpdivSolver::new(classic::dominant_row(), SimpdivConfig::default()).unwrap();
        let result = solver.solve(&pure_start(solver.game())).unwrap();

        assert!(result.stats.converged);
        assert_eq!(result.stats.passes, 1);
        assert_eq!(result.profile.player(0), &[ratio(0, 1), ratio(0, 1), ratio(1, 1)]);
        assert_eq!(result.profile.player(1), &[ratio(0, 1), ratio(1, 1)]);
    }

    #[test]
    fn test_initial_mesh_uses_start_denominators() {
        let solver =
            SimpdivSolver::new(classic::battle_of_the_sexes(), SimpdivConfig::default()).unwrap();
        let start = profile(&[2, 2], &[(1, 3), (2, 3), (1, 2), (1, 2)]);
        let result = solver.solve(&start).unwrap();

        assert_eq!(result.stats.passes, 1);
        assert_eq!(result.stats.final_mesh, "1/12");
        assert_eq!(result.profile, profile(&[2, 2], &[(0, 1), (1, 1), (0, 1), (1, 1)]));
    }

    #[test]
    fn test_rock_paper_scissors_converges() {
        let solver =
            SimpdivSolver::new(classic::rock_paper_scissors(), SimpdivConfig::default()).unwrap();
        let result = solver.solve(&pure_start(solver.game())).unwrap();

        assert!(result.stats.converged);
        assert!(result.stats.passes <= 40, "took {} passes", result.stats.passes);
        assert!(result.max_regret < solver.config().tolerance_bound().unwrap());
        for w in result.profile.values() {
            let x = w.to_f64().unwrap();
            assert!((x - 1.0 / 3.0).abs() < 1e-9, "weight {} is not near 1/3", x);
        }
    }

    #[test]
    fn test_rock_paper_scissors_from_mixed_starts() {
        let solver =
            SimpdivSolver::new(classic::rock_paper_scissors(), SimpdivConfig::default()).unwrap();
        let starts = [
            profile(&[3, 3], &[(1, 5), (2, 5), (2, 5), (3, 5), (0, 1), (2, 5)]),
            profile(&[3, 3], &[(1, 2), (1, 4), (1, 4), (0, 1), (0, 1), (1, 1)]),
        ];
        for start in &starts {
            let result = solver.solve(start).unwrap();
            assert!(result.stats.converged);
            assert!(result.profile.is_normalized());
        }
    }

    #[test]
    fn test_coarser_resize_can_land_exactly() {
        let config = SimpdivConfig::default().with_grid_resize(3);
        let solver = SimpdivSolver::new(classic::rock_paper_scissors(), config).unwrap();
        let result = solver.solve(&pure_start(solver.game())).unwrap();

        assert_eq!(result.stats.passes, 1);
        assert!(result.max_regret.is_zero());
        assert!(result.profile.values().iter().all(|w| *w == ratio(1, 3)));
    }

    #[test]
    fn test_reports_are_normalized_and_monotone() {
        let solver =
            SimpdivSolver::new(classic::rock_paper_scissors(), SimpdivConfig::default()).unwrap();
        let mut regrets: Vec<BigRational> = Vec::new();
        let mut meshes: Vec<BigRational> = Vec::new();
        solver
            .solve_with_callback(&pure_start(solver.game()), |report| {
                assert!(report.profile.is_normalized());
                regrets.push(report.max_regret.clone());
                meshes.push(report.mesh.clone());
                true
            })
            .unwrap();

        assert!(regrets.windows(2).all(|w| w[1] <= w[0]));
        assert!(meshes.windows(2).all(|w| w[1] == &w[0] / ratio(2, 1)));
    }

    #[test]
    fn test_short_leash_still_converges() {
        let config = SimpdivConfig::default().with_leash_length(1);
        let solver = SimpdivSolver::new(classic::rock_paper_scissors(), config).unwrap();
        let result = solver.solve(&pure_start(solver.game())).unwrap();
        assert!(result.stats.converged);
    }

    #[test]
    fn test_callback_can_stop_refinement() {
        let solver =
            SimpdivSolver::new(classic::rock_paper_scissors(), SimpdivConfig::default()).unwrap();
        let result = solver
            .solve_with_callback(&pure_start(solver.game()), |_| false)
            .unwrap();
        assert_eq!(result.stats.passes, 1);
        assert!(!result.stats.converged);
    }

    #[test]
    fn test_refinement_and_pivot_limits() {
        let config = SimpdivConfig::default()
            .with_max_refinements(3)
            .with_max_pivots_per_pass(4);
        let solver = SimpdivSolver::new(classic::rock_paper_scissors(), config).unwrap();
        let mut ends = Vec::new();
        let result = solver
            .solve_with_callback(&pure_start(solver.game()), |report| {
                ends.push(report.end);
                assert!(report.pivots <= 4);
                true
            })
            .unwrap();

        assert_eq!(result.stats.passes, 3);
        assert!(!result.stats.converged);
        assert!(ends.contains(&PassEnd::PivotLimit));
        assert!(result.profile.is_normalized());
    }

    #[test]
    fn test_unreachable_deadline_means_no_deadline() {
        // Fits in a Duration but not after the current Instant.
        let config = SimpdivConfig::default().with_time_limit(1.8e19);
        assert!(config.validate().is_ok());
        let solver = SimpdivSolver::new(classic::matching_pennies(), config).unwrap();
        let result = solver.solve(&pure_start(solver.game())).unwrap();
        assert!(result.stats.converged);
    }

    #[test]
    fn test_rejects_time_limit_beyond_duration_range() {
        let config = SimpdivConfig::default().with_time_limit(1e30);
        assert!(matches!(
            SimpdivSolver::new(classic::matching_pennies(), config),
            Err(ConfigError::InvalidTimeLimit(_))
        ));
    }

    #[test]
    fn test_rejects_mismatched_start() {
        let solver =
            SimpdivSolver::new(classic::matching_pennies(), SimpdivConfig::default()).unwrap();
        let start = MixedProfile::first_strategies(&[3, 2]);
        assert!(matches!(
            solver.solve(&start),
            Err(ProfileError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_rejects_invalid_config() {
        let config = SimpdivConfig::default().with_grid_resize(0);
        assert!(SimpdivSolver::new(classic::matching_pennies(), config).is_err());
    }
}
