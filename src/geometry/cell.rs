//! Cell entities: the squares of the grid.

use strum_macros::Display;

use super::EdgeId;

/// Which side of the loop a cell lies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display)]
pub enum CellColor {
    #[default]
    Unset,
    Inner,
    Outer,
}

impl CellColor {
    pub fn inverse(self) -> CellColor {
        match self {
            CellColor::Inner => CellColor::Outer,
            CellColor::Outer => CellColor::Inner,
            CellColor::Unset => CellColor::Unset,
        }
    }
}

/// One grid square.
///
/// `edges` are the four border edges in `Dir` order (up, left, down,
/// right); all four are real edges. `number` is the clue, `-1` for blank.
#[derive(Debug, Clone)]
pub struct Cell {
    pub x: usize,
    pub y: usize,
    pub number: i8,
    pub color: CellColor,
    pub edges: [EdgeId; 4],
    pub on_count: u8,
    pub off_count: u8,
}

impl Cell {
    pub fn is_numbered(&self) -> bool {
        self.number >= 0
    }

    pub fn unset_count(&self) -> u8 {
        4 - self.on_count - self.off_count
    }
}
