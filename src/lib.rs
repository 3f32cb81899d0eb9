//! # Simpdiv
//!
//! Approximate Nash equilibria of finite strategic-form games by simplicial
//! subdivision, computed in exact rational arithmetic.
//!
//! ## Features
//!
//! - **Generic Solver**: Works with any game implementing the `StrategicGame` trait
//! - **Exact Arithmetic**: Profiles, payoffs, and the stopping test use big rationals
//! - **Grid Refinement**: Each pass restarts on a finer grid from the previous answer
//! - **Bounded Runs**: Optional per-pass pivot caps, pass caps, and wall-clock limits
//! - **Game Files**: Reads `.nfg` files and a JSON payoff-table format
//!
//! ## Quick Start
//!
//! ```ignore
//! use simpdiv::nash::{start, SimpdivConfig, SimpdivSolver};
//!
//! // 1. Load or build a game
//! let game = simpdiv::games::read_game(&text)?;
//!
//! // 2. Create a solver
//! let solver = SimpdivSolver::new(game, SimpdivConfig::default())?;
//!
//! // 3. Solve from a starting profile
//! let result = solver.solve(&start::pure_start(solver.game()))?;
//! println!("{}", result.profile.to_line("NE", Default::default()));
//! ```
//!
//! ## Modules
//!
//! - [`nash`]: Labelling, pivoting, and the refinement driver
//! - [`games`]: Payoff tables, file readers, and classic test games
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    SimpdivSolver (Generic)                      │
//! │  - Mesh refinement        - Convergence test                    │
//! │  - Pivot engine           - Best-profile tracking               │
//! └─────────────────────────────────────────────────────────────────┘
//!                               │
//!                               │ implements StrategicGame
//!                               ▼
//!         ┌─────────────────────┼─────────────────────┐
//!         │                     │                     │
//!         ▼                     ▼                     ▼
//!    ┌─────────┐         ┌───────────┐         ┌───────────┐
//!    │   NFG   │         │   JSON    │         │  Classic  │
//!    │  files  │         │  tables   │         │   games   │
//!    └─────────┘         └───────────┘         └───────────┘
//! ```

#![warn(missing_docs)]

/// Simplicial subdivision solver module.
///
/// Game-agnostic: everything here works through the `StrategicGame` trait.
pub mod nash;

/// Game representations module.
///
/// Contains the payoff table, its readers, and textbook games.
pub mod games;

// Re-export commonly used types at crate root for convenience
pub use games::{read_game, GameError, TableGame};
pub use nash::{MixedProfile, SimpdivConfig, SimpdivSolver, SolveResult, StrategicGame};
