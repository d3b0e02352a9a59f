//! Corner-gate truth tables.
//!
//! A gate sits on a node diagonal and records whether the finished loop
//! crosses that corner point: `Open` means each side pair at the node has
//! exactly one on-edge, `Closed` means zero or two. Gates classify from
//! either side pair of the node or from the tables of an adjacent numbered
//! cell, force edges once known, and mirror to the opposite corner of the
//! cell: a 2 preserves the gate state across itself, a 1 or a 3 inverts
//! it.

use crate::geometry::{Board, CellId, Corner, EdgeStatus, GateStatus, NodeId};
use crate::geometry::Diagonal;
use crate::trail::Step;

use super::{post_gate, post_status, Halt, RuleKind};

/// Re-derive the gates at each corner of a cell.
pub(super) fn check_cell(board: &mut Board, step: &mut Step, c: CellId) -> Result<(), Halt> {
    for corner in Corner::ALL {
        let node = board.corner_node(c, corner);
        let diagonal = corner.diagonal();
        classify_from_node(board, step, node, diagonal)?;
        classify_from_cell(board, step, c, corner)?;
        force(board, step, c, corner)?;
    }
    Ok(())
}

/// Node degree is 0 or 2, so one determined side pair classifies the gate:
/// a pair with both edges equal closes it, a split pair opens it.
fn classify_from_node(
    board: &mut Board,
    step: &mut Step,
    node: NodeId,
    diagonal: Diagonal,
) -> Result<(), Halt> {
    if board.node(node).gates[diagonal.index()] != GateStatus::Unset {
        return Ok(());
    }
    for pair in board.node_side_pairs(node, diagonal) {
        let (a, b) = (board.edge(pair[0]).status, board.edge(pair[1]).status);
        let verdict = match (a, b) {
            (EdgeStatus::On, EdgeStatus::On) | (EdgeStatus::Off, EdgeStatus::Off) => {
                Some(GateStatus::Closed)
            }
            (EdgeStatus::On, EdgeStatus::Off) | (EdgeStatus::Off, EdgeStatus::On) => {
                Some(GateStatus::Open)
            }
            _ => None,
        };
        if let Some(status) = verdict {
            return post_gate(board, step, node, diagonal, status);
        }
    }
    Ok(())
}

/// The clue tables: what a cell's corner pair says about its gate.
fn classify_from_cell(
    board: &mut Board,
    step: &mut Step,
    c: CellId,
    corner: Corner,
) -> Result<(), Halt> {
    let node = board.corner_node(c, corner);
    let diagonal = corner.diagonal();
    if board.node(node).gates[diagonal.index()] != GateStatus::Unset {
        return Ok(());
    }
    let number = board.cell(c).number;
    let [e1, e2] = board.corner_pair(c, corner);
    let (a, b) = (board.edge(e1).status, board.edge(e2).status);
    let verdict = match number {
        // a 1's single on-edge is at this corner or it is not
        1 => {
            if a == EdgeStatus::On || b == EdgeStatus::On {
                Some(GateStatus::Open)
            } else if a == EdgeStatus::Off && b == EdgeStatus::Off {
                Some(GateStatus::Closed)
            } else {
                None
            }
        }
        // a 3's single off-edge, dually
        3 => {
            if a == EdgeStatus::Off || b == EdgeStatus::Off {
                Some(GateStatus::Open)
            } else if a == EdgeStatus::On && b == EdgeStatus::On {
                Some(GateStatus::Closed)
            } else {
                None
            }
        }
        2 => match (a, b) {
            (EdgeStatus::On, EdgeStatus::On) | (EdgeStatus::Off, EdgeStatus::Off) => {
                Some(GateStatus::Closed)
            }
            (EdgeStatus::On, EdgeStatus::Off) | (EdgeStatus::Off, EdgeStatus::On) => {
                Some(GateStatus::Open)
            }
            _ => None,
        },
        _ => None,
    };
    match verdict {
        Some(status) => post_gate(board, step, node, diagonal, status),
        // fall back to the mirror of the opposite corner
        None => mirror_pull(board, step, c, corner),
    }
}

fn mirror_status(number: i8, status: GateStatus) -> Option<GateStatus> {
    match number {
        2 => Some(status),
        1 | 3 => Some(status.inverse()),
        _ => None,
    }
}

/// Derive this corner's gate from the opposite corner's.
fn mirror_pull(board: &mut Board, step: &mut Step, c: CellId, corner: Corner) -> Result<(), Halt> {
    let number = board.cell(c).number;
    let far = board.corner_node(c, corner.opposite());
    let diagonal = corner.diagonal();
    let far_status = board.node(far).gates[diagonal.index()];
    if far_status == GateStatus::Unset {
        return Ok(());
    }
    if let Some(status) = mirror_status(number, far_status) {
        let node = board.corner_node(c, corner);
        post_gate(board, step, node, diagonal, status)?;
    }
    Ok(())
}

/// Apply the consequences of a known gate.
fn force(board: &mut Board, step: &mut Step, c: CellId, corner: Corner) -> Result<(), Halt> {
    let node = board.corner_node(c, corner);
    let diagonal = corner.diagonal();
    let gate = board.node(node).gates[diagonal.index()];
    if gate == GateStatus::Unset {
        return Ok(());
    }

    // within each side pair of the node, one known edge fixes the other
    for pair in board.node_side_pairs(node, diagonal) {
        for (known, other) in [(pair[0], pair[1]), (pair[1], pair[0])] {
            let status = board.edge(known).status;
            if !status.is_determined() || board.edge(other).status.is_determined() {
                continue;
            }
            let forced = match gate {
                GateStatus::Open => status.inverse(),
                _ => status,
            };
            post_status(board, step, other, forced, RuleKind::Gate)?;
        }
    }

    // clue-specific forcings across the cell
    let number = board.cell(c).number;
    match (number, gate) {
        // an open gate at a 1 pins its on-edge here: the far corner is off.
        // a closed gate at a 1 empties this corner outright
        (1, GateStatus::Open) => {
            for e in board.corner_pair(c, corner.opposite()) {
                post_status(board, step, e, EdgeStatus::Off, RuleKind::Gate)?;
            }
        }
        (1, GateStatus::Closed) => {
            for e in board.corner_pair(c, corner) {
                post_status(board, step, e, EdgeStatus::Off, RuleKind::Gate)?;
            }
        }
        // dually for a 3
        (3, GateStatus::Open) => {
            for e in board.corner_pair(c, corner.opposite()) {
                post_status(board, step, e, EdgeStatus::On, RuleKind::Gate)?;
            }
        }
        (3, GateStatus::Closed) => {
            for e in board.corner_pair(c, corner) {
                post_status(board, step, e, EdgeStatus::On, RuleKind::Gate)?;
            }
        }
        _ => {}
    }

    // mirror to the opposite corner of the cell
    if let Some(status) = mirror_status(number, gate) {
        let far = board.corner_node(c, corner.opposite());
        post_gate(board, step, far, diagonal, status)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Board;
    use crate::solver::SolveOption;
    use crate::trail::Step;

    fn gates_only() -> SolveOption {
        SolveOption {
            color_check: false,
            diagonal_check: false,
            ..SolveOption::default()
        }
    }

    fn seed_all_cells(board: &mut Board, step: &mut Step) {
        for c in 0..board.cell_count() {
            step.enqueue_gate(c);
        }
    }

    #[test]
    fn one_in_a_corner_loses_its_outer_edges() {
        let mut board = Board::from_clue_rows(&["1 ", "  "]);
        let mut step = Step::new();
        seed_all_cells(&mut board, &mut step);
        super::super::drain_local(&mut board, &mut step, &gates_only()).unwrap();
        // boundary dummies close the corner gate, emptying the corner pair
        let c = board.cell_id(0, 0);
        for e in board.corner_pair(c, Corner::UpLeft) {
            assert_eq!(board.edge(e).status, EdgeStatus::Off);
        }
    }

    #[test]
    fn three_in_a_corner_keeps_its_outer_edges() {
        let mut board = Board::from_clue_rows(&["  ", " 3"]);
        let mut step = Step::new();
        seed_all_cells(&mut board, &mut step);
        super::super::drain_local(&mut board, &mut step, &gates_only()).unwrap();
        let c = board.cell_id(1, 1);
        for e in board.corner_pair(c, Corner::DownRight) {
            assert_eq!(board.edge(e).status, EdgeStatus::On);
        }
    }

    #[test]
    fn open_gate_splits_a_side_pair() {
        let mut board = Board::blank(2, 2);
        let mut step = Step::new();
        let n = board.node_id(1, 1);
        let [up, left, down, right] = board.node(n).edges;
        // up on, left off splits the NW pair: the gate opens and the SE
        // pair must split too once one of its edges is known
        post_status(&mut board, &mut step, up, EdgeStatus::On, RuleKind::External).unwrap();
        post_status(&mut board, &mut step, left, EdgeStatus::Off, RuleKind::External).unwrap();
        post_status(&mut board, &mut step, down, EdgeStatus::Off, RuleKind::External).unwrap();
        super::super::drain_local(&mut board, &mut step, &gates_only()).unwrap();
        assert_eq!(
            board.node(n).gates[Diagonal::NwSe.index()],
            GateStatus::Open
        );
        assert_eq!(board.edge(right).status, EdgeStatus::On);
    }

    #[test]
    fn a_two_mirrors_its_gate() {
        // a split corner pair opens the gate of a 2, which relays the
        // crossing to its far corner
        let mut board = Board::from_clue_rows(&["   ", " 2 ", "   "]);
        let mut step = Step::new();
        seed_all_cells(&mut board, &mut step);
        let c = board.cell_id(1, 1);
        let [up, left] = board.corner_pair(c, Corner::UpLeft);
        post_status(&mut board, &mut step, up, EdgeStatus::On, RuleKind::External).unwrap();
        post_status(&mut board, &mut step, left, EdgeStatus::Off, RuleKind::External).unwrap();
        super::super::drain_local(&mut board, &mut step, &gates_only()).unwrap();
        let far = board.corner_node(c, Corner::DownRight);
        assert_eq!(
            board.node(far).gates[Diagonal::NwSe.index()],
            GateStatus::Open
        );
    }
}
