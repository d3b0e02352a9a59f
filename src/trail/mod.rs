//! Reversible mutation log.
//!
//! Every engine mutation of the board is an [`Action`] capturing the prior
//! and new value of exactly one field. Actions are grouped into [`Step`]
//! transactions, one per guess level, held on a [`StepStack`]. Rewinding a
//! step undoes its actions in reverse order, restoring the board exactly;
//! together with the O(1) degree counters this makes backtracking cheap.
//!
//! A step also carries the propagation work queues (changed-edge FIFO and
//! the gate/colour pending sets) and an XOR-folded fingerprint of its edge
//! changes. Trial steps arm a [`FingerprintCache`] of known dead ends so a
//! speculative probe can be cut off as soon as it re-enters a state that
//! already failed.

use std::collections::{HashSet, VecDeque};

use crate::geometry::{
    Board, CellColor, CellId, Diagonal, EdgeId, EdgeStatus, GateStatus, NodeId,
};
use crate::propagation::RuleKind;

/// One reversible field mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    SetEdgeStatus {
        edge: EdgeId,
        from: EdgeStatus,
        to: EdgeStatus,
        /// Which rule forced this edge; read by hint consumers.
        rule: RuleKind,
    },
    SetOppositeNode {
        node: NodeId,
        from: Option<NodeId>,
        to: Option<NodeId>,
    },
    SetGateStatus {
        node: NodeId,
        diagonal: Diagonal,
        from: GateStatus,
        to: GateStatus,
    },
    SetCellColor {
        cell: CellId,
        from: CellColor,
        to: CellColor,
    },
    SetCellNumber {
        cell: CellId,
        from: i8,
        to: i8,
    },
}

impl Action {
    /// Apply the mutation.
    pub fn redo(&self, board: &mut Board) {
        match *self {
            Action::SetEdgeStatus {
                edge, from, to, ..
            } => board.set_edge_raw(edge, from, to),
            Action::SetOppositeNode { node, to, .. } => board.node_mut(node).opposite = to,
            Action::SetGateStatus {
                node, diagonal, to, ..
            } => board.node_mut(node).gates[diagonal.index()] = to,
            Action::SetCellColor { cell, to, .. } => board.cell_mut(cell).color = to,
            Action::SetCellNumber { cell, to, .. } => board.cell_mut(cell).number = to,
        }
    }

    /// Reverse the mutation.
    pub fn undo(&self, board: &mut Board) {
        match *self {
            Action::SetEdgeStatus {
                edge, from, to, ..
            } => board.set_edge_raw(edge, to, from),
            Action::SetOppositeNode { node, from, .. } => board.node_mut(node).opposite = from,
            Action::SetGateStatus {
                node,
                diagonal,
                from,
                ..
            } => board.node_mut(node).gates[diagonal.index()] = from,
            Action::SetCellColor { cell, from, .. } => board.cell_mut(cell).color = from,
            Action::SetCellNumber { cell, from, .. } => board.cell_mut(cell).number = from,
        }
    }
}

/// Mix an edge assignment into a 64-bit fingerprint contribution.
///
/// splitmix64 finalizer; XOR-folding the contributions makes the combined
/// fingerprint order-independent.
pub fn fingerprint(edge: EdgeId, status: EdgeStatus) -> u64 {
    let code = match status {
        EdgeStatus::Unset => 0u64,
        EdgeStatus::On => 1,
        EdgeStatus::Off => 2,
    };
    let mut z = ((edge as u64) << 2 | code).wrapping_add(0x9e37_79b9_7f4a_7c15);
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

/// Set of fingerprints of states known to propagate to a contradiction.
#[derive(Debug, Default)]
pub struct FingerprintCache {
    known: HashSet<u64>,
    hits: u64,
}

impl FingerprintCache {
    pub fn len(&self) -> usize {
        self.known.len()
    }

    pub fn is_empty(&self) -> bool {
        self.known.is_empty()
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }
}

/// One transaction of the mutation log.
#[derive(Debug, Default)]
pub struct Step {
    actions: Vec<Action>,
    /// FIFO of edges whose status changed and still need rule checks.
    pub changed_edges: VecDeque<EdgeId>,
    gate_pending: Vec<CellId>,
    color_pending: Vec<CellId>,
    base_fingerprint: u64,
    fingerprint: u64,
    seen: Vec<u64>,
    cache: Option<FingerprintCache>,
}

impl Step {
    pub fn new() -> Step {
        Step::default()
    }

    /// Apply an action to the board and log it.
    pub fn record(&mut self, board: &mut Board, action: Action) {
        action.redo(board);
        self.actions.push(action);
    }

    /// Fold an edge change into the fingerprint and queue the edge for
    /// rule checks. Returns `true` when the armed cache already knows the
    /// resulting state fails.
    pub fn note_edge_change(&mut self, edge: EdgeId, contribution: u64) -> bool {
        self.fingerprint ^= contribution;
        self.changed_edges.push_back(edge);
        if let Some(cache) = &mut self.cache {
            self.seen.push(self.fingerprint);
            if cache.known.contains(&self.fingerprint) {
                cache.hits += 1;
                return true;
            }
        }
        false
    }

    pub fn enqueue_gate(&mut self, cell: CellId) {
        if !self.gate_pending.contains(&cell) {
            self.gate_pending.push(cell);
        }
    }

    pub fn enqueue_color(&mut self, cell: CellId) {
        if !self.color_pending.contains(&cell) {
            self.color_pending.push(cell);
        }
    }

    pub fn pop_gate(&mut self) -> Option<CellId> {
        self.gate_pending.pop()
    }

    pub fn pop_color(&mut self) -> Option<CellId> {
        self.color_pending.pop()
    }

    pub fn clear_gate_queue(&mut self) {
        self.gate_pending.clear();
    }

    pub fn clear_color_queue(&mut self) {
        self.color_pending.clear();
    }

    /// Undo every action in reverse order and clear the work queues.
    ///
    /// With `commit`, the fingerprints of the states this step passed
    /// through are folded into the armed cache: a rewound step that failed
    /// marks its whole path as dead.
    pub fn rewind(&mut self, board: &mut Board, commit: bool) {
        while let Some(action) = self.actions.pop() {
            action.undo(board);
        }
        self.changed_edges.clear();
        self.gate_pending.clear();
        self.color_pending.clear();
        match (&mut self.cache, commit) {
            (Some(cache), true) => cache.known.extend(self.seen.drain(..)),
            _ => self.seen.clear(),
        }
        self.fingerprint = self.base_fingerprint;
    }

    /// Seed the fingerprint of a fresh step from its parent's.
    pub fn set_base_fingerprint(&mut self, fp: u64) {
        debug_assert!(self.actions.is_empty());
        self.base_fingerprint = fp;
        self.fingerprint = fp;
    }

    pub fn fingerprint(&self) -> u64 {
        self.fingerprint
    }

    pub fn arm_cache(&mut self, cache: FingerprintCache) {
        self.cache = Some(cache);
    }

    pub fn disarm_cache(&mut self) -> FingerprintCache {
        self.cache.take().unwrap_or_default()
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

/// The stack of open transactions, one per guess level.
///
/// Only the top step is mutable; lower steps are frozen until their level
/// is backtracked.
#[derive(Debug)]
pub struct StepStack {
    steps: Vec<Step>,
}

impl StepStack {
    /// A stack with a single base step.
    pub fn new() -> StepStack {
        StepStack {
            steps: vec![Step::new()],
        }
    }

    pub fn depth(&self) -> usize {
        self.steps.len()
    }

    pub fn current(&mut self) -> &mut Step {
        self.steps.last_mut().expect("step stack never empty")
    }

    pub fn top(&self) -> &Step {
        self.steps.last().expect("step stack never empty")
    }

    /// Open a new transaction on top, inheriting the cumulative fingerprint.
    pub fn push(&mut self) {
        let fp = self.top().fingerprint();
        let mut step = Step::new();
        step.set_base_fingerprint(fp);
        self.steps.push(step);
    }

    /// Rewind and discard the top transaction. The base step stays.
    pub fn pop_rewind(&mut self, board: &mut Board) {
        debug_assert!(self.steps.len() > 1, "cannot pop the base step");
        if self.steps.len() > 1 {
            let mut step = self.steps.pop().expect("step stack never empty");
            step.rewind(board, false);
        }
    }
}

impl Default for StepStack {
    fn default() -> Self {
        StepStack::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Board, CellColor, EdgeStatus, GateStatus};

    #[test]
    fn actions_round_trip_every_field() {
        let mut board = Board::blank(2, 2);
        let before = board.dump();
        let edge = board.h_edge_id(0, 0);
        let origin = board.node_id(0, 0);
        let far = board.node_id(1, 0);
        let center = board.node_id(1, 1);
        let mut step = Step::new();
        step.record(
            &mut board,
            Action::SetEdgeStatus {
                edge,
                from: EdgeStatus::Unset,
                to: EdgeStatus::On,
                rule: RuleKind::External,
            },
        );
        step.record(
            &mut board,
            Action::SetOppositeNode {
                node: origin,
                from: None,
                to: Some(far),
            },
        );
        step.record(
            &mut board,
            Action::SetGateStatus {
                node: center,
                diagonal: Diagonal::NwSe,
                from: GateStatus::Unset,
                to: GateStatus::Open,
            },
        );
        step.record(
            &mut board,
            Action::SetCellColor {
                cell: 0,
                from: CellColor::Unset,
                to: CellColor::Inner,
            },
        );
        step.record(
            &mut board,
            Action::SetCellNumber {
                cell: 3,
                from: -1,
                to: 2,
            },
        );
        assert_eq!(board.on_edge_count(), 1);
        assert_eq!(board.cell(0).color, CellColor::Inner);
        assert_eq!(board.cell(3).number, 2);

        step.rewind(&mut board, false);
        assert_eq!(board.dump(), before);
        assert_eq!(board.on_edge_count(), 0);
        assert_eq!(board.node(origin).opposite, None);
        assert_eq!(
            board.node(center).gates[Diagonal::NwSe.index()],
            GateStatus::Unset
        );
        assert_eq!(board.cell(3).number, -1);
    }

    #[test]
    fn fingerprint_is_order_independent() {
        let a = fingerprint(3, EdgeStatus::On);
        let b = fingerprint(7, EdgeStatus::Off);
        assert_ne!(a, b);
        assert_eq!(a ^ b, b ^ a);
        // same edge, different status must differ
        assert_ne!(fingerprint(3, EdgeStatus::On), fingerprint(3, EdgeStatus::Off));
    }

    #[test]
    fn committed_rewind_feeds_the_cache() {
        let mut board = Board::blank(2, 1);
        let mut step = Step::new();
        step.arm_cache(FingerprintCache::default());
        let e = board.h_edge_id(0, 0);

        step.record(
            &mut board,
            Action::SetEdgeStatus {
                edge: e,
                from: EdgeStatus::Unset,
                to: EdgeStatus::On,
                rule: RuleKind::Trial,
            },
        );
        assert!(!step.note_edge_change(e, fingerprint(e, EdgeStatus::On)));
        step.rewind(&mut board, true);

        // the same probe is now a cache hit
        step.record(
            &mut board,
            Action::SetEdgeStatus {
                edge: e,
                from: EdgeStatus::Unset,
                to: EdgeStatus::On,
                rule: RuleKind::Trial,
            },
        );
        assert!(step.note_edge_change(e, fingerprint(e, EdgeStatus::On)));
        step.rewind(&mut board, false);
        let cache = step.disarm_cache();
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.hits(), 1);
    }

    #[test]
    fn stack_pushes_inherit_fingerprints() {
        let mut board = Board::blank(2, 1);
        let mut stack = StepStack::new();
        let e = board.h_edge_id(1, 0);
        let contribution = fingerprint(e, EdgeStatus::Off);
        stack.current().record(
            &mut board,
            Action::SetEdgeStatus {
                edge: e,
                from: EdgeStatus::Unset,
                to: EdgeStatus::Off,
                rule: RuleKind::External,
            },
        );
        stack.current().note_edge_change(e, contribution);
        let fp = stack.top().fingerprint();
        stack.push();
        assert_eq!(stack.top().fingerprint(), fp);
        stack.pop_rewind(&mut board);
        assert_eq!(stack.depth(), 1);
        assert_eq!(board.edge(e).status, EdgeStatus::Off);
    }
}
