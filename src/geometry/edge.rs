//! Edge entities: the line segments of the lattice.

use strum_macros::Display;

use super::{CellId, EdgeId, NodeId};

/// Tri-state assignment of an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display)]
pub enum EdgeStatus {
    /// Not yet determined.
    #[default]
    Unset,
    /// Part of the loop.
    On,
    /// Excluded from the loop.
    Off,
}

impl EdgeStatus {
    /// The opposite determined status. `Unset` maps to itself.
    pub fn inverse(self) -> EdgeStatus {
        match self {
            EdgeStatus::On => EdgeStatus::Off,
            EdgeStatus::Off => EdgeStatus::On,
            EdgeStatus::Unset => EdgeStatus::Unset,
        }
    }

    pub fn is_determined(self) -> bool {
        self != EdgeStatus::Unset
    }
}

/// Orientation of an edge within the lattice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Axis {
    Horizontal,
    Vertical,
}

/// One lattice segment.
///
/// `nodes` are `[left, right]` for horizontal edges and `[up, down]` for
/// vertical ones; `cells` are `[above, below]` and `[left, right]`
/// respectively, with the dummy cell standing in at the boundary.
/// `straight` holds the colinear continuation past each node (the dummy
/// edge when the lattice ends there).
#[derive(Debug, Clone)]
pub struct Edge {
    pub status: EdgeStatus,
    /// Locked against mutation by an interactive layer; the engine ignores it.
    pub fixed: bool,
    pub axis: Axis,
    pub nodes: [NodeId; 2],
    pub cells: [CellId; 2],
    pub straight: [EdgeId; 2],
}

impl Edge {
    /// The endpoint that is not `n`.
    pub fn other_node(&self, n: NodeId) -> NodeId {
        if self.nodes[0] == n {
            self.nodes[1]
        } else {
            self.nodes[0]
        }
    }

    /// The bordering cell that is not `c`.
    pub fn other_cell(&self, c: CellId) -> CellId {
        if self.cells[0] == c {
            self.cells[1]
        } else {
            self.cells[0]
        }
    }

    /// The colinear continuation of this edge past node `n`.
    pub fn straight_through(&self, n: NodeId) -> EdgeId {
        if self.nodes[0] == n {
            self.straight[0]
        } else {
            self.straight[1]
        }
    }

    pub fn is_on(&self) -> bool {
        self.status == EdgeStatus::On
    }

    pub fn is_unset(&self) -> bool {
        self.status == EdgeStatus::Unset
    }
}
