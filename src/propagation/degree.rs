//! Node- and cell-degree rules.

use crate::geometry::{Board, CellId, EdgeId, EdgeStatus, NodeId};
use crate::trail::Step;

use super::{post_status, Element, Halt, RuleKind};

/// Re-check the degree rules around a changed edge.
pub(super) fn check_edge(board: &mut Board, step: &mut Step, edge: EdgeId) -> Result<(), Halt> {
    let nodes = board.edge(edge).nodes;
    let cells = board.edge(edge).cells;
    for n in nodes {
        if n != board.dummy_node() {
            check_node_degree(board, step, n)?;
        }
    }
    for c in cells {
        if c != board.dummy_cell() {
            check_cell_degree(board, step, c)?;
        }
    }
    Ok(())
}

/// Every node has loop degree 0 or 2.
///
/// - three or more on-edges: contradiction;
/// - two on-edges: the rest are off;
/// - one on-edge with the rest determined off: contradiction;
/// - one on-edge with a single undetermined slot: that slot is on;
/// - three off-edges: the fourth cannot be the only line, so it is off.
fn check_node_degree(board: &mut Board, step: &mut Step, n: NodeId) -> Result<(), Halt> {
    let (on, off) = {
        let node = board.node(n);
        (node.on_count, node.off_count)
    };
    let unset = 4 - on - off;
    if on > 2 || (on == 1 && unset == 0) {
        return Err(Halt::Contradiction(Some(Element::Node(n))));
    }
    let force = if on == 2 && unset > 0 {
        Some(EdgeStatus::Off)
    } else if on == 1 && unset == 1 {
        Some(EdgeStatus::On)
    } else if on == 0 && off == 3 {
        Some(EdgeStatus::Off)
    } else {
        None
    };
    if let Some(status) = force {
        for e in board.node_edges_with_status(n, EdgeStatus::Unset) {
            post_status(board, step, e, status, RuleKind::NodeDegree)?;
        }
    }
    Ok(())
}

/// Every numbered cell has exactly its clue's worth of on-edges.
pub(crate) fn check_cell_degree(board: &mut Board, step: &mut Step, c: CellId) -> Result<(), Halt> {
    let (number, on, off) = {
        let cell = board.cell(c);
        if !cell.is_numbered() {
            return Ok(());
        }
        (cell.number as u8, cell.on_count, cell.off_count)
    };
    if on > number || off > 4 - number {
        return Err(Halt::Contradiction(Some(Element::Cell(c))));
    }
    let force = if on == number {
        Some(EdgeStatus::Off)
    } else if off == 4 - number {
        Some(EdgeStatus::On)
    } else {
        None
    };
    if let Some(status) = force {
        for e in board.cell_edges_with_status(c, EdgeStatus::Unset) {
            post_status(board, step, e, status, RuleKind::CellDegree)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Board;
    use crate::solver::SolveOption;
    use crate::trail::Step;

    fn local_only() -> SolveOption {
        SolveOption {
            gate_check: false,
            color_check: false,
            diagonal_check: false,
            ..SolveOption::default()
        }
    }

    #[test]
    fn zero_clue_forces_all_edges_off() {
        let mut board = Board::from_clue_rows(&["  ", " 0"]);
        let mut step = Step::new();
        let c = board.cell_id(1, 1);
        check_cell_degree(&mut board, &mut step, c).unwrap();
        super::super::drain_local(&mut board, &mut step, &local_only()).unwrap();
        for e in board.cell(c).edges {
            assert_eq!(board.edge(e).status, EdgeStatus::Off);
        }
    }

    #[test]
    fn two_on_edges_close_the_node() {
        let mut board = Board::blank(2, 2);
        let mut step = Step::new();
        let n = board.node_id(1, 1);
        let [up, left, down, right] = board.node(n).edges;
        post_status(&mut board, &mut step, up, EdgeStatus::On, RuleKind::External).unwrap();
        post_status(&mut board, &mut step, left, EdgeStatus::On, RuleKind::External).unwrap();
        super::super::drain_local(&mut board, &mut step, &local_only()).unwrap();
        assert_eq!(board.edge(down).status, EdgeStatus::Off);
        assert_eq!(board.edge(right).status, EdgeStatus::Off);
    }

    #[test]
    fn dead_end_is_a_contradiction() {
        let mut board = Board::blank(2, 2);
        let mut step = Step::new();
        let n = board.node_id(1, 1);
        let [up, left, down, right] = board.node(n).edges;
        post_status(&mut board, &mut step, left, EdgeStatus::Off, RuleKind::External).unwrap();
        post_status(&mut board, &mut step, down, EdgeStatus::Off, RuleKind::External).unwrap();
        post_status(&mut board, &mut step, right, EdgeStatus::Off, RuleKind::External).unwrap();
        post_status(&mut board, &mut step, up, EdgeStatus::On, RuleKind::External).unwrap();
        let err = super::super::drain_local(&mut board, &mut step, &local_only()).unwrap_err();
        assert!(matches!(err, Halt::Contradiction(_)));
    }

    #[test]
    fn chain_turns_at_a_grid_corner() {
        let mut board = Board::blank(2, 2);
        let mut step = Step::new();
        // the corner node (0,0) has two real edges; turning one on forces
        // the other on
        let right = board.h_edge_id(0, 0);
        let down = board.v_edge_id(0, 0);
        post_status(&mut board, &mut step, right, EdgeStatus::On, RuleKind::External).unwrap();
        super::super::drain_local(&mut board, &mut step, &local_only()).unwrap();
        assert_eq!(board.edge(down).status, EdgeStatus::On);
    }
}
