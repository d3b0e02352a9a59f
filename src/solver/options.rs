//! Solver configuration and reports.

use std::time::Duration;

use strum_macros::Display;

use crate::geometry::EdgeId;

/// Tunable behaviour of a solve.
///
/// The rule toggles exist for difficulty grading and for tests that
/// exercise one family in isolation; a default solve runs everything.
#[derive(Debug, Clone)]
pub struct SolveOption {
    /// Maximum number of nested guesses. Zero forbids guessing entirely.
    pub max_guess_level: usize,
    /// Wall-clock budget for the whole solve.
    pub time_limit: Option<Duration>,
    /// Keep searching after the first solution to prove it unique.
    pub check_uniqueness: bool,
    /// Corner-gate truth tables.
    pub gate_check: bool,
    /// Inner/outer region colouring.
    pub color_check: bool,
    /// The diagonal 1-3 shortcut across chains of 2s.
    pub diagonal_check: bool,
    /// Speculative single-edge trials when local propagation stalls.
    pub try_one_step: bool,
    /// Area endpoint-parity analysis when local propagation stalls.
    pub area_check: bool,
    /// Dead-end fingerprint cache for trial probes.
    pub use_cache: bool,
    /// Maximum sweep passes of one trial invocation.
    pub trial_extension: usize,
}

impl Default for SolveOption {
    fn default() -> Self {
        SolveOption {
            max_guess_level: 5,
            time_limit: None,
            check_uniqueness: false,
            gate_check: true,
            color_check: true,
            diagonal_check: true,
            try_one_step: true,
            area_check: true,
            use_cache: true,
            trial_extension: 2,
        }
    }
}

impl SolveOption {
    /// A budget that proves uniqueness, as the generator's pruner needs.
    pub fn uniqueness(max_guess_level: usize) -> SolveOption {
        SolveOption {
            max_guess_level,
            check_uniqueness: true,
            ..SolveOption::default()
        }
    }
}

/// Why a solve ended the way it did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum SolveReason {
    /// A solution was found (and proven unique when asked).
    Solved,
    /// The search space is exhausted without a solution.
    NoLoop,
    /// More than one solution exists.
    MultiLoop,
    /// Gave up within the guess-level or time budget.
    NotLogical,
}

/// Outcome of a solve.
#[derive(Debug, Clone)]
pub struct SolveResult {
    pub solved: bool,
    pub reason: SolveReason,
    pub elapsed: Duration,
    /// Deepest guess level reached.
    pub max_depth: usize,
    /// The guess-level ceiling or deadline cut the search short, so
    /// exhaustiveness claims (no-loop, uniqueness) do not hold.
    pub depth_limited: bool,
    /// The first solution's loop, in traversal order.
    pub loop_edges: Option<Vec<EdgeId>>,
}
