//! Region colour rules.
//!
//! Each cell is inside or outside the loop; the area beyond the boundary is
//! outside (the dummy cell is permanently `Outer`). Two cells separated by
//! an off-edge share a colour, an on-edge flips it. The rules run both
//! ways: determined edges propagate colours, and a determined colour pair
//! forces their shared edge.

use crate::geometry::{Board, CellColor, CellId, EdgeStatus};
use crate::trail::Step;

use super::{post_color, post_status, Halt, RuleKind};

fn neighbor_color(board: &Board, c: CellId) -> CellColor {
    if c == board.dummy_cell() {
        CellColor::Outer
    } else {
        board.cell(c).color
    }
}

/// Derive a cell's colour from its determined edges, then its remaining
/// edges from neighbouring colours.
pub(super) fn check_cell(board: &mut Board, step: &mut Step, c: CellId) -> Result<(), Halt> {
    if c == board.dummy_cell() {
        return Ok(());
    }

    if board.cell(c).color == CellColor::Unset {
        for slot in 0..4 {
            let edge = board.cell(c).edges[slot];
            let status = board.edge(edge).status;
            if !status.is_determined() {
                continue;
            }
            let other = board.edge(edge).other_cell(c);
            let across = neighbor_color(board, other);
            if across == CellColor::Unset {
                continue;
            }
            let derived = if status == EdgeStatus::Off {
                across
            } else {
                across.inverse()
            };
            post_color(board, step, c, derived)?;
            break;
        }
    }

    let own = board.cell(c).color;
    if own == CellColor::Unset {
        return Ok(());
    }
    for slot in 0..4 {
        let edge = board.cell(c).edges[slot];
        let status = board.edge(edge).status;
        let other = board.edge(edge).other_cell(c);
        let across = neighbor_color(board, other);
        if across != CellColor::Unset {
            let forced = if across == own {
                EdgeStatus::Off
            } else {
                EdgeStatus::On
            };
            post_status(board, step, edge, forced, RuleKind::Color)?;
        } else if status.is_determined() {
            // the neighbour's colour now follows from ours
            step.enqueue_color(other);
        }
    }
    Ok(())
}
