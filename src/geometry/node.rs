//! Node entities: the lattice points where edges meet.

use strum_macros::Display;

use super::{EdgeId, NodeId};

/// The two diagonals through a node, used as gate slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Diagonal {
    /// North-west to south-east.
    NwSe,
    /// North-east to south-west.
    NeSw,
}

impl Diagonal {
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Whether the loop crosses a node diagonal.
///
/// A gate is `Open` when exactly one edge of each side pair at the node is
/// on in the finished loop, i.e. the loop passes from one side of the
/// diagonal to the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display)]
pub enum GateStatus {
    #[default]
    Unset,
    Open,
    Closed,
}

impl GateStatus {
    pub fn inverse(self) -> GateStatus {
        match self {
            GateStatus::Open => GateStatus::Closed,
            GateStatus::Closed => GateStatus::Open,
            GateStatus::Unset => GateStatus::Unset,
        }
    }
}

/// One lattice point.
///
/// `edges` are the four incident edge slots in `Dir` order (up, left, down,
/// right), with the dummy edge filling boundary slots. The off counter is
/// seeded with the number of dummy slots so the degree rules treat the
/// boundary like any other determined edge.
#[derive(Debug, Clone)]
pub struct Node {
    pub x: usize,
    pub y: usize,
    pub edges: [EdgeId; 4],
    pub on_count: u8,
    pub off_count: u8,
    /// While this node is a chain endpoint, the endpoint at the far end of
    /// its chain. Stale once the node becomes interior.
    pub opposite: Option<NodeId>,
    /// Gate state per diagonal, indexed by `Diagonal`.
    pub gates: [GateStatus; 2],
}

impl Node {
    pub fn unset_count(&self) -> u8 {
        4 - self.on_count - self.off_count
    }
}
