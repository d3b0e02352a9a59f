//! Board geometry: flat arenas of nodes, edges and cells.
//!
//! The grid is stored as three index-addressed arenas. A single dummy node,
//! dummy edge and dummy cell sit at the tail of each arena so that boundary
//! adjacency lookups stay branch-free: every node has four edge slots and
//! every edge has two cell slots, with out-of-grid neighbours pointing at
//! the dummies. The dummy edge is permanently `Off` and the dummy cell is
//! permanently `Outer`, which makes the degree and colour rules hold at the
//! boundary without special cases.

mod board;
mod cell;
mod edge;
mod node;
mod text;

pub use board::{Board, LoopStatus};
pub use cell::{Cell, CellColor};
pub use edge::{Axis, Edge, EdgeStatus};
pub use node::{Diagonal, GateStatus, Node};
pub use text::ParseError;

/// Index into the node arena.
pub type NodeId = usize;
/// Index into the edge arena.
pub type EdgeId = usize;
/// Index into the cell arena.
pub type CellId = usize;

/// The four edge slots around a node or a cell, in fixed order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dir {
    Up,
    Left,
    Down,
    Right,
}

impl Dir {
    pub const ALL: [Dir; 4] = [Dir::Up, Dir::Left, Dir::Down, Dir::Right];

    pub fn index(self) -> usize {
        self as usize
    }
}

/// The four corners of a cell, equivalently the four diagonal directions
/// out of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Corner {
    UpLeft,
    UpRight,
    DownLeft,
    DownRight,
}

impl Corner {
    pub const ALL: [Corner; 4] = [
        Corner::UpLeft,
        Corner::UpRight,
        Corner::DownLeft,
        Corner::DownRight,
    ];

    pub fn opposite(self) -> Corner {
        match self {
            Corner::UpLeft => Corner::DownRight,
            Corner::UpRight => Corner::DownLeft,
            Corner::DownLeft => Corner::UpRight,
            Corner::DownRight => Corner::UpLeft,
        }
    }

    /// The diagonal this corner lies on.
    pub fn diagonal(self) -> Diagonal {
        match self {
            Corner::UpLeft | Corner::DownRight => Diagonal::NwSe,
            Corner::UpRight | Corner::DownLeft => Diagonal::NeSw,
        }
    }

    /// Horizontal component of the corner direction.
    pub fn dx(self) -> isize {
        match self {
            Corner::UpLeft | Corner::DownLeft => -1,
            Corner::UpRight | Corner::DownRight => 1,
        }
    }

    /// Vertical component of the corner direction.
    pub fn dy(self) -> isize {
        match self {
            Corner::UpLeft | Corner::UpRight => -1,
            Corner::DownLeft | Corner::DownRight => 1,
        }
    }
}
