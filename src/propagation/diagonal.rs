//! The diagonal shortcut between 1- and 3-clues across chains of 2s.
//!
//! When both edges at one corner of a 1-cell are off, its single on-edge
//! lies at the opposite corner, so the loop crosses that corner point with
//! exactly one edge per side. A 2-cell entered that way passes the crossing
//! to its far corner, and a diagonal chain of 2s carries it until it meets
//! a 1 (far corner both off) or a 3 (far corner both on). The mirrored
//! start, a 3-cell with both edges at one corner on, launches the same
//! walk.

use crate::geometry::{Board, CellId, Corner, EdgeId, EdgeStatus};
use crate::trail::Step;

use super::{post_status, Halt, RuleKind};

/// Launch diagonal walks from any 1- or 3-clue bordering a changed edge.
pub(super) fn check_edge(board: &mut Board, step: &mut Step, edge: EdgeId) -> Result<(), Halt> {
    let cells = board.edge(edge).cells;
    for c in cells {
        if c != board.dummy_cell() {
            check_cell(board, step, c)?;
        }
    }
    Ok(())
}

fn check_cell(board: &mut Board, step: &mut Step, c: CellId) -> Result<(), Halt> {
    let number = board.cell(c).number;
    if number != 1 && number != 3 {
        return Ok(());
    }
    for corner in Corner::ALL {
        let [e1, e2] = board.corner_pair(c, corner);
        let (s1, s2) = (board.edge(e1).status, board.edge(e2).status);
        let launches = match number {
            1 => s1 == EdgeStatus::Off && s2 == EdgeStatus::Off,
            _ => s1 == EdgeStatus::On && s2 == EdgeStatus::On,
        };
        if launches {
            walk(board, step, c, corner.opposite())?;
        }
    }
    Ok(())
}

/// Follow the crossing diagonally from `c` in direction `dir`, forcing the
/// far corner of the first non-2 clue met.
fn walk(board: &mut Board, step: &mut Step, c: CellId, dir: Corner) -> Result<(), Halt> {
    let mut cell = board.diagonal_neighbor(c, dir);
    loop {
        if cell == board.dummy_cell() {
            return Ok(());
        }
        match board.cell(cell).number {
            2 => cell = board.diagonal_neighbor(cell, dir),
            3 => {
                for e in board.corner_pair(cell, dir) {
                    post_status(board, step, e, EdgeStatus::On, RuleKind::DiagonalChain)?;
                }
                return Ok(());
            }
            1 => {
                for e in board.corner_pair(cell, dir) {
                    post_status(board, step, e, EdgeStatus::Off, RuleKind::DiagonalChain)?;
                }
                return Ok(());
            }
            _ => return Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Board;
    use crate::solver::SolveOption;
    use crate::trail::Step;

    fn options() -> SolveOption {
        SolveOption {
            gate_check: false,
            color_check: false,
            ..SolveOption::default()
        }
    }

    #[test]
    fn blocked_one_forces_a_diagonal_three() {
        // 1 at (0,0), 3 at (1,1); turning off the 1's outer corner pair
        // forces the 3's outer corner pair on
        let mut board = Board::from_clue_rows(&["1 ", " 3"]);
        let mut step = Step::new();
        let one = board.cell_id(0, 0);
        let [up, left] = board.corner_pair(one, Corner::UpLeft);
        post_status(&mut board, &mut step, up, EdgeStatus::Off, RuleKind::External).unwrap();
        post_status(&mut board, &mut step, left, EdgeStatus::Off, RuleKind::External).unwrap();
        super::super::drain_local(&mut board, &mut step, &options()).unwrap();
        let three = board.cell_id(1, 1);
        for e in board.corner_pair(three, Corner::DownRight) {
            assert_eq!(board.edge(e).status, EdgeStatus::On);
        }
    }

    #[test]
    fn the_chain_carries_across_a_two() {
        let mut board = Board::from_clue_rows(&["1  ", " 2 ", "  3"]);
        let mut step = Step::new();
        let one = board.cell_id(0, 0);
        let [up, left] = board.corner_pair(one, Corner::UpLeft);
        post_status(&mut board, &mut step, up, EdgeStatus::Off, RuleKind::External).unwrap();
        post_status(&mut board, &mut step, left, EdgeStatus::Off, RuleKind::External).unwrap();
        super::super::drain_local(&mut board, &mut step, &options()).unwrap();
        let three = board.cell_id(2, 2);
        for e in board.corner_pair(three, Corner::DownRight) {
            assert_eq!(board.edge(e).status, EdgeStatus::On);
        }
    }

    #[test]
    fn saturated_three_blocks_a_diagonal_one() {
        let mut board = Board::from_clue_rows(&["3 ", " 1"]);
        let mut step = Step::new();
        let three = board.cell_id(0, 0);
        let [up, left] = board.corner_pair(three, Corner::UpLeft);
        post_status(&mut board, &mut step, up, EdgeStatus::On, RuleKind::External).unwrap();
        post_status(&mut board, &mut step, left, EdgeStatus::On, RuleKind::External).unwrap();
        super::super::drain_local(&mut board, &mut step, &options()).unwrap();
        let one = board.cell_id(1, 1);
        for e in board.corner_pair(one, Corner::DownRight) {
            assert_eq!(board.edge(e).status, EdgeStatus::Off);
        }
    }
}
