//! Configuration options for the simplicial subdivision solver.
//!
//! This module provides the configuration struct that controls grid
//! refinement and the bounds that keep a solve from running forever, plus
//! the statistics reported at the end of a solve.

use std::time::Duration;

use num_rational::BigRational;
use num_traits::Signed;
use serde::{Deserialize, Serialize};

/// Default leash length.
pub const DEFAULT_LEASH_LENGTH: u32 = 32000;

/// Default stopping tolerance on the label excess.
pub const DEFAULT_TOLERANCE: f64 = 1.0e-10;

/// Configuration for the simplicial subdivision solver.
///
/// # Example
/// ```
/// use simpdiv::nash::SimpdivConfig;
///
/// let config = SimpdivConfig::default().with_grid_resize(3);
/// assert_eq!(config.grid_resize, 3);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimpdivConfig {
    /// Integer factor the mesh is divided by before every pass.
    ///
    /// The first pass runs at `1 / (k * grid_resize)` where `k` is the least
    /// common denominator of the starting profile.
    pub grid_resize: u32,

    /// Maximum drift of a coordinate below the reference vertex, in grid
    /// steps, before the pivot engine forces a retraction.
    pub leash_length: u32,

    /// Refinement stops once the label excess drops below this value.
    ///
    /// The comparison is exact: the f64 is converted to the rational it
    /// denotes.
    pub tolerance: f64,

    /// Maximum label evaluations per pass.
    ///
    /// A pass that runs out returns the best profile it has seen, as if it
    /// had reached a fully labelled vertex. `None` means unbounded.
    pub max_pivots_per_pass: Option<u64>,

    /// Maximum number of passes. `None` means unbounded.
    pub max_refinements: Option<u32>,

    /// Wall-clock limit for the whole solve, in seconds.
    ///
    /// Must fit in a [`Duration`]. A limit so far away that it cannot be
    /// added to the current time means no deadline.
    pub time_limit_secs: Option<f64>,
}

impl Default for SimpdivConfig {
    fn default() -> Self {
        Self {
            grid_resize: 2,
            leash_length: DEFAULT_LEASH_LENGTH,
            tolerance: DEFAULT_TOLERANCE,
            max_pivots_per_pass: None,
            max_refinements: None,
            time_limit_secs: None,
        }
    }
}

impl SimpdivConfig {
    /// Create a new SimpdivConfig with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a configuration with finite bounds, for batch runs over many
    /// starting points where one degenerate start must not stall the rest.
    pub fn bounded() -> Self {
        Self {
            max_pivots_per_pass: Some(1_000_000),
            max_refinements: Some(64),
            ..Default::default()
        }
    }

    /// Builder method: set the grid resize factor.
    pub fn with_grid_resize(mut self, grid_resize: u32) -> Self {
        self.grid_resize = grid_resize;
        self
    }

    /// Builder method: set the leash length.
    pub fn with_leash_length(mut self, leash_length: u32) -> Self {
        self.leash_length = leash_length;
        self
    }

    /// Builder method: set the stopping tolerance.
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Builder method: cap label evaluations per pass.
    pub fn with_max_pivots_per_pass(mut self, max_pivots: u64) -> Self {
        self.max_pivots_per_pass = Some(max_pivots);
        self
    }

    /// Builder method: cap the number of passes.
    pub fn with_max_refinements(mut self, max_refinements: u32) -> Self {
        self.max_refinements = Some(max_refinements);
        self
    }

    /// Builder method: set a wall-clock limit in seconds.
    pub fn with_time_limit(mut self, seconds: f64) -> Self {
        self.time_limit_secs = Some(seconds);
        self
    }

    /// The tolerance as an exact rational.
    pub fn tolerance_bound(&self) -> Result<BigRational, ConfigError> {
        match BigRational::from_float(self.tolerance) {
            Some(bound) if bound.is_positive() => Ok(bound),
            _ => Err(ConfigError::InvalidTolerance(self.tolerance)),
        }
    }

    /// Validate the configuration and return any errors.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grid_resize < 2 {
            return Err(ConfigError::InvalidGridResize(self.grid_resize));
        }

        if self.leash_length == 0 {
            return Err(ConfigError::InvalidLeashLength);
        }

        self.tolerance_bound()?;

        if self.max_pivots_per_pass == Some(0) {
            return Err(ConfigError::InvalidLimit("max_pivots_per_pass"));
        }

        if self.max_refinements == Some(0) {
            return Err(ConfigError::InvalidLimit("max_refinements"));
        }

        if let Some(seconds) = self.time_limit_secs {
            if seconds <= 0.0 || Duration::try_from_secs_f64(seconds).is_err() {
                return Err(ConfigError::InvalidTimeLimit(seconds));
            }
        }

        Ok(())
    }
}

/// Errors that can occur when validating solver configuration.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Grid resize factor is below 2.
    InvalidGridResize(u32),
    /// Leash length is zero.
    InvalidLeashLength,
    /// Tolerance is not a positive finite number.
    InvalidTolerance(f64),
    /// A count limit is zero.
    InvalidLimit(&'static str),
    /// Time limit is not a positive finite number of seconds.
    InvalidTimeLimit(f64),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::InvalidGridResize(val) => {
                write!(f, "Grid resize factor {} must be at least 2", val)
            }
            ConfigError::InvalidLeashLength => {
                write!(f, "Leash length must be at least 1")
            }
            ConfigError::InvalidTolerance(val) => {
                write!(f, "Tolerance {} must be positive and finite", val)
            }
            ConfigError::InvalidLimit(name) => {
                write!(f, "{} must be at least 1", name)
            }
            ConfigError::InvalidTimeLimit(val) => {
                write!(f, "Time limit {}s must be positive and finite", val)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Statistics of one solve.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SolveStats {
    /// Passes completed.
    pub passes: u32,

    /// Label evaluations across all passes.
    pub pivots: u64,

    /// Mesh of the last pass, as rational text.
    pub final_mesh: String,

    /// Label excess of the answer.
    pub max_regret: f64,

    /// Total time spent solving (in seconds).
    pub elapsed_seconds: f64,

    /// Whether the excess fell below the tolerance.
    pub converged: bool,
}
