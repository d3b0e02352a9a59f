//! Constraint propagation.
//!
//! The single entry point for changing an edge is [`post_status`]: it logs
//! the action, maintains chain-endpoint references, detects loop closure
//! and queues follow-up work. [`drain_local`] then runs the local rules to
//! a fixpoint in a strict order: the changed-edge FIFO first (degree and
//! diagonal rules), then the gate queue, then the colour queue; any forced
//! edge re-feeds the FIFO. The stall-time passes (speculative trial, area
//! parity) live with the solver, which owns the step stack they need.

mod colors;
mod degree;
mod diagonal;
mod errors;
mod gates;

pub use errors::{Element, Halt, RuleKind};

pub(crate) use degree::check_cell_degree;

use log::trace;

use crate::geometry::{Board, CellColor, CellId, Diagonal, EdgeId, EdgeStatus, GateStatus, NodeId};
use crate::solver::SolveOption;
use crate::trail::{fingerprint, Action, Step};

/// Set an edge's status, logging the change and its direct consequences.
///
/// A no-op when the edge already has the requested status; a
/// [`Halt::Contradiction`] when it has the opposite one. Setting an edge on
/// merges the chains at its endpoints; if that closes a cycle, the result
/// is [`Halt::Finished`] for a valid solution and a contradiction
/// otherwise.
pub(crate) fn post_status(
    board: &mut Board,
    step: &mut Step,
    edge: EdgeId,
    status: EdgeStatus,
    rule: RuleKind,
) -> Result<(), Halt> {
    debug_assert!(status.is_determined());
    let current = board.edge(edge).status;
    if current == status {
        return Ok(());
    }
    if current.is_determined() {
        return Err(Halt::Contradiction(Some(Element::Edge(edge))));
    }
    trace!("{rule}: edge {edge} -> {status}");
    step.record(
        board,
        Action::SetEdgeStatus {
            edge,
            from: current,
            to: status,
            rule,
        },
    );
    if step.note_edge_change(edge, fingerprint(edge, status)) {
        return Err(Halt::CacheHit);
    }
    for n in board.edge(edge).nodes {
        for c in board.cells_around_node(n) {
            if c != board.dummy_cell() {
                step.enqueue_gate(c);
            }
        }
    }
    for c in board.edge(edge).cells {
        if c != board.dummy_cell() {
            step.enqueue_color(c);
        }
    }
    if status == EdgeStatus::On {
        merge_chains(board, step, edge)?;
    }
    Ok(())
}

/// Update chain-endpoint references after `edge` was turned on, handle
/// closure, and apply the premature-loop guard.
fn merge_chains(board: &mut Board, step: &mut Step, edge: EdgeId) -> Result<(), Halt> {
    let [a, b] = board.edge(edge).nodes;
    for n in [a, b] {
        if board.node(n).on_count > 2 {
            return Err(Halt::Contradiction(Some(Element::Node(n))));
        }
    }
    // far end of the chain that contained each endpoint before the merge
    let far_a = if board.node(a).on_count == 1 {
        a
    } else {
        board.node(a).opposite.unwrap_or(a)
    };
    let far_b = if board.node(b).on_count == 1 {
        b
    } else {
        board.node(b).opposite.unwrap_or(b)
    };

    if far_a == b || far_b == a {
        // the edge connected the two ends of one chain: a closed cycle
        return Err(evaluate_closure(board, a, edge));
    }

    post_opposite(board, step, far_a, Some(far_b));
    post_opposite(board, step, far_b, Some(far_a));

    // guard: if the merged chain's ends are adjacent and joining them would
    // not complete the puzzle, the joining edge can only close a premature
    // loop, so it is off
    if let Some(joining) = board.joining_edge(far_a, far_b) {
        if board.edge(joining).is_unset() && !would_finish(board, far_a, far_b, joining) {
            post_status(board, step, joining, EdgeStatus::Off, RuleKind::ChainGuard)?;
        }
    }
    Ok(())
}

/// Decide whether a just-closed cycle is the solution.
fn evaluate_closure(board: &Board, from: NodeId, along: EdgeId) -> Halt {
    let (_, len, closed) = board.loop_end(from, along);
    if !closed || len < board.on_edge_count() {
        // some on-edge is outside the cycle: a second loop
        return Halt::Contradiction(Some(Element::Edge(along)));
    }
    for c in 0..board.cell_count() {
        let cell = board.cell(c);
        if cell.is_numbered() && cell.on_count != cell.number as u8 {
            return Halt::Contradiction(Some(Element::Cell(c)));
        }
    }
    Halt::Finished
}

/// Would turning on `joining` (which connects the chain ends `far_a` and
/// `far_b`) complete the puzzle?
fn would_finish(board: &Board, far_a: NodeId, far_b: NodeId, joining: EdgeId) -> bool {
    let Some(first) = board.node_edge_with_status(far_a, EdgeStatus::On) else {
        return false;
    };
    let (end, len, closed) = board.loop_end(far_a, first);
    if closed || end != far_b || len != board.on_edge_count() {
        return false;
    }
    let bordering = board.edge(joining).cells;
    for c in 0..board.cell_count() {
        let cell = board.cell(c);
        if !cell.is_numbered() {
            continue;
        }
        let extra = bordering.contains(&c) as u8;
        if cell.on_count + extra != cell.number as u8 {
            return false;
        }
    }
    true
}

/// Record a chain-endpoint reference change.
fn post_opposite(board: &mut Board, step: &mut Step, node: NodeId, to: Option<NodeId>) {
    let from = board.node(node).opposite;
    if from != to {
        step.record(board, Action::SetOppositeNode { node, from, to });
    }
}

/// Set a gate, queueing the surrounding cells for gate re-checks.
pub(crate) fn post_gate(
    board: &mut Board,
    step: &mut Step,
    node: NodeId,
    diagonal: Diagonal,
    status: GateStatus,
) -> Result<(), Halt> {
    debug_assert_ne!(status, GateStatus::Unset);
    let current = board.node(node).gates[diagonal.index()];
    if current == status {
        return Ok(());
    }
    if current != GateStatus::Unset {
        return Err(Halt::Contradiction(Some(Element::Node(node))));
    }
    step.record(
        board,
        Action::SetGateStatus {
            node,
            diagonal,
            from: current,
            to: status,
        },
    );
    for c in board.cells_around_node(node) {
        if c != board.dummy_cell() {
            step.enqueue_gate(c);
        }
    }
    Ok(())
}

/// Set a cell colour, queueing the cell so its edges get re-derived.
pub(crate) fn post_color(
    board: &mut Board,
    step: &mut Step,
    cell: CellId,
    color: CellColor,
) -> Result<(), Halt> {
    debug_assert_ne!(color, CellColor::Unset);
    let current = board.cell(cell).color;
    if current == color {
        return Ok(());
    }
    if current != CellColor::Unset {
        return Err(Halt::Contradiction(Some(Element::Cell(cell))));
    }
    step.record(
        board,
        Action::SetCellColor {
            cell,
            from: current,
            to: color,
        },
    );
    step.enqueue_color(cell);
    Ok(())
}

/// Run the local rules to a fixpoint in queue order.
pub(crate) fn drain_local(
    board: &mut Board,
    step: &mut Step,
    options: &SolveOption,
) -> Result<(), Halt> {
    if !options.gate_check {
        step.clear_gate_queue();
    }
    if !options.color_check {
        step.clear_color_queue();
    }
    loop {
        if let Some(edge) = step.changed_edges.pop_front() {
            degree::check_edge(board, step, edge)?;
            if options.diagonal_check {
                diagonal::check_edge(board, step, edge)?;
            }
            continue;
        }
        if options.gate_check {
            if let Some(cell) = step.pop_gate() {
                gates::check_cell(board, step, cell)?;
                continue;
            }
        } else {
            step.clear_gate_queue();
        }
        if options.color_check {
            if let Some(cell) = step.pop_color() {
                colors::check_cell(board, step, cell)?;
                continue;
            }
        } else {
            step.clear_color_queue();
        }
        return Ok(());
    }
}
