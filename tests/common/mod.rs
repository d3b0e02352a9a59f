//! Helpers shared by the integration suites.

use slither_search::{
    Board, EdgeId, EdgeStatus, Halt, LoopStatus, SolveOption, SolveResult, Solver,
};

pub fn solve(board: Board, options: SolveOption) -> SolveResult {
    Solver::new(board, options).solve()
}

/// Replay a reported loop onto a fresh board, move by move, and verify it
/// closes into a valid solution.
pub fn replay_loop(board: Board, loop_edges: &[EdgeId]) -> bool {
    let mut solver = Solver::new(board, SolveOption::default());
    for &e in loop_edges {
        match solver.set_edge_status(e, EdgeStatus::On) {
            Ok(()) => {}
            Err(Halt::Finished) => break,
            Err(_) => return false,
        }
    }
    solver.board().check(true) == LoopStatus::Finished
}
