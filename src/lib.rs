//! A slither-link engine: constraint propagation, backtracking search and
//! puzzle generation.
//!
//! A [`Board`] is a flat arena of nodes, edges and cells over a
//! rectangular grid; every change to it goes through a [`trail`] step so
//! it can be rewound exactly. The [`propagation`] rules force edges from
//! clue arithmetic, corner gates, region colours and the diagonal
//! shortcut; the [`Solver`] drives them to a fixpoint, layers speculative
//! trials and area parity on top, and searches the rest with bounded
//! guessing. The [`Generator`] runs the pipeline backwards: grow a random
//! loop, read off its clues, prune them while uniqueness survives.
//!
//! ```
//! use slither_search::{Board, SolveOption, Solver};
//!
//! let board = Board::from_clue_rows(&["33"]);
//! let mut solver = Solver::new(board, SolveOption::default());
//! let result = solver.solve();
//! assert!(result.solved);
//! ```

pub mod area;
pub mod generator;
pub mod geometry;
pub mod propagation;
pub mod solver;
pub mod trail;

pub use generator::{
    GenerateError, GenerateOption, GenerateProgress, GenerateResult, Generator, RemovalOrder,
};
pub use geometry::{Board, CellId, EdgeId, EdgeStatus, LoopStatus, NodeId};
pub use propagation::{Element, Halt, RuleKind};
pub use solver::{SolveOption, SolveReason, SolveResult, Solver, Statistics};
