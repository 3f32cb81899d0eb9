//! Simplicial subdivision equilibrium solver.
//!
//! This module computes approximate Nash equilibria of finite strategic-form
//! games by complementary pivoting on successively refined simplicial grids,
//! with all arithmetic in exact rationals.
//!
//! # Overview
//!
//! The strategy space of each player is a simplex; the product of these
//! simplices is triangulated into a grid of mesh `d`. Every grid vertex gets
//! a label: the player and pure strategy with the largest gain from a
//! unilateral deviation. Starting from a reference vertex, the pivot engine
//! follows a path of adjacent simplices until it reaches a vertex that is
//! "fully labelled", which is a discrete stand-in for an equilibrium. The
//! solver then shrinks the mesh and restarts from that vertex, until no
//! player can gain more than a tolerance by deviating.
//!
//! # Usage
//!
//! 1. Implement [`StrategicGame`] for your game (or load a
//!    [`crate::games::TableGame`])
//! 2. Create a [`SimpdivSolver`] with your game and a [`SimpdivConfig`]
//! 3. Call [`SimpdivSolver::solve`] with a starting profile from [`start`]
//!
//! # Example
//!
//! ```ignore
//! use simpdiv::games::classic;
//! use simpdiv::nash::{start, SimpdivConfig, SimpdivSolver};
//!
//! let solver = SimpdivSolver::new(classic::matching_pennies(), SimpdivConfig::default())?;
//! let result = solver.solve(&start::pure_start(solver.game()))?;
//! println!("{}", result.profile.to_line("NE", Default::default()));
//! ```
//!
//! # Theory
//!
//! **Label excess** of a profile `y` for player `i`:
//! ```text
//! z_i(y) = max_s u_i(s, y_-i) - u_i(y)
//! ```
//! The label is the argmax over players of `z_i`, paired with player `i`'s
//! best reply. A profile with `max_i z_i(y) = 0` is a Nash equilibrium.
//!
//! # References
//!
//! - van der Laan, G., Talman, A.J.J., van der Heyden, L. "Simplicial
//!   Variable Dimension Algorithms for Solving the Nonlinear Complementarity
//!   Problem on a Product of Unit Simplices Using a General Labelling" (1987)

pub mod config;
pub mod game;
pub mod label;
pub mod pivot;
pub mod profile;
pub mod solver;
pub mod start;
pub mod support;

// Re-export main types for convenient access
pub use config::{ConfigError, SimpdivConfig, SolveStats};
pub use game::StrategicGame;
pub use label::{Incumbent, Label};
pub use pivot::{PassEnd, PassLimits, PassOutcome};
pub use profile::{MixedProfile, ProfileDisplay, ProfileError};
pub use solver::{PassReport, SimpdivSolver, SolveResult};
pub use support::StrategyTable;
