//! Branch candidates for the search driver.

use std::collections::VecDeque;

use crate::geometry::{Board, EdgeId, EdgeStatus};

/// One branch: an edge the driver will speculatively turn on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Branch {
    pub edge: EdgeId,
}

/// The untried branches of one guess level.
///
/// The candidate set is complete: one of its edges is on in every solution
/// extending the current state, so exhausting the buffer refutes the state.
/// Preference order: the undetermined edges of a chain end (the chain must
/// continue through exactly one), else those of a cell one edge short of
/// its clue (clue-bearing boards always offer one), else a single arbitrary
/// undetermined edge for clue-free boards.
#[derive(Debug, Default)]
pub struct BranchBuffer {
    branches: VecDeque<Branch>,
}

impl BranchBuffer {
    pub fn collect(board: &Board) -> BranchBuffer {
        let edges = candidate_edges(board);
        BranchBuffer {
            branches: edges.into_iter().map(|edge| Branch { edge }).collect(),
        }
    }

    pub fn next(&mut self) -> Option<Branch> {
        self.branches.pop_front()
    }

    pub fn len(&self) -> usize {
        self.branches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.branches.is_empty()
    }
}

fn candidate_edges(board: &Board) -> Vec<EdgeId> {
    for n in 0..board.node_count() {
        if board.node(n).on_count == 1 && board.node(n).unset_count() > 0 {
            return board.node_edges_with_status(n, EdgeStatus::Unset);
        }
    }
    for c in 0..board.cell_count() {
        let cell = board.cell(c);
        if cell.number > 0 && cell.on_count == cell.number as u8 - 1 && cell.unset_count() > 0 {
            return board.cell_edges_with_status(c, EdgeStatus::Unset);
        }
    }
    board.first_unset_edge().into_iter().collect()
}
