//! Stall-time area analysis.
//!
//! When local propagation stalls, the undetermined part of the lattice is
//! split into areas and each area is checked for endpoint parity. Chain
//! endpoints inside an area must pair up through it, and the only way a
//! path leaves an area is through a gate point, a pinch the loop can only
//! pass straight through. An area with no gates must hold an even number
//! of endpoints; with exactly one gate, the parity of the endpoint count
//! decides whether the loop crosses the gate, forcing its edge pair. Two
//! or more gates give no information and are deliberately left alone.

use log::debug;
use strum_macros::Display;

use crate::geometry::{Board, EdgeId, EdgeStatus, NodeId};
use crate::propagation::{post_status, Halt, RuleKind};
use crate::trail::Step;

mod union_find;

pub use union_find::UnionFind;

/// Role of a lattice point in the current partial assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum PointKind {
    /// All incident edges determined; paths neither start nor pass here.
    Wall,
    /// Undetermined surroundings a path may wander through.
    Space,
    /// A chain endpoint: exactly one incident on-edge.
    Terminal,
    /// No on-edge and exactly two undetermined edges, colinear: a pinch
    /// the loop can only cross straight through.
    Gate,
}

/// Classify every real node.
pub fn classify_points(board: &Board) -> Vec<PointKind> {
    (0..board.node_count())
        .map(|n| classify(board, n))
        .collect()
}

fn classify(board: &Board, n: NodeId) -> PointKind {
    let node = board.node(n);
    if node.unset_count() == 0 {
        return PointKind::Wall;
    }
    if node.on_count == 1 {
        return PointKind::Terminal;
    }
    if node.on_count == 0 && node.unset_count() == 2 {
        let unset = board.node_edges_with_status(n, EdgeStatus::Unset);
        if board.edge(unset[0]).straight_through(n) == unset[1] {
            return PointKind::Gate;
        }
    }
    PointKind::Space
}

#[derive(Debug, Default)]
struct Area {
    terminals: usize,
    gates: Vec<NodeId>,
}

/// Run the area check, forcing at most one gate per invocation.
///
/// Returns whether anything was forced; the caller re-drains and calls
/// again, so working from a fresh classification each time keeps the
/// analysis sound.
pub(crate) fn check(board: &mut Board, step: &mut Step) -> Result<bool, Halt> {
    let kinds = classify_points(board);
    let node_count = board.node_count();
    let dummy_edge = board.dummy_edge();

    // flood areas over undetermined edges, stopping at gates
    let mut area_of: Vec<Option<usize>> = vec![None; node_count];
    let mut areas: Vec<Area> = Vec::new();
    for start in 0..node_count {
        if area_of[start].is_some()
            || !matches!(kinds[start], PointKind::Space | PointKind::Terminal)
        {
            continue;
        }
        let id = areas.len();
        let mut area = Area::default();
        let mut queue = vec![start];
        area_of[start] = Some(id);
        while let Some(n) = queue.pop() {
            if kinds[n] == PointKind::Terminal {
                area.terminals += 1;
            }
            for &e in &board.node(n).edges {
                if e == dummy_edge || board.edge(e).status != EdgeStatus::Unset {
                    continue;
                }
                let m = board.edge(e).other_node(n);
                match kinds[m] {
                    PointKind::Space | PointKind::Terminal => {
                        if area_of[m].is_none() {
                            area_of[m] = Some(id);
                            queue.push(m);
                        }
                    }
                    PointKind::Gate => {
                        if !area.gates.contains(&m) {
                            area.gates.push(m);
                        }
                    }
                    PointKind::Wall => {}
                }
            }
        }
        areas.push(area);
    }

    // merge areas whose terminals are two ends of the same chain
    let mut uf = UnionFind::new(areas.len());
    for n in 0..node_count {
        if kinds[n] != PointKind::Terminal {
            continue;
        }
        let (Some(a), Some(partner)) = (area_of[n], board.node(n).opposite) else {
            continue;
        };
        if let Some(b) = area_of.get(partner).copied().flatten() {
            uf.union(a, b);
        }
    }

    // per gate, the set of distinct merged areas it touches; a gate whose
    // neighbours are all in one area is interior to it and drops out,
    // unless it adjoins another gate (a corridor we do not analyse)
    let mut totals: Vec<(usize, Vec<NodeId>)> = vec![(0, Vec::new()); areas.len()];
    for (id, area) in areas.iter().enumerate() {
        let root = uf.find(id);
        totals[root].0 += area.terminals;
    }
    for gate in gate_nodes(&kinds) {
        let mut roots: Vec<usize> = Vec::new();
        let mut next_to_gate = false;
        for &e in &board.node(gate).edges {
            if e == dummy_edge || board.edge(e).status != EdgeStatus::Unset {
                continue;
            }
            let m = board.edge(e).other_node(gate);
            match kinds[m] {
                PointKind::Gate => next_to_gate = true,
                _ => {
                    if let Some(a) = area_of[m] {
                        let root = uf.find(a);
                        if !roots.contains(&root) {
                            roots.push(root);
                        }
                    }
                }
            }
        }
        if roots.len() == 1 && !next_to_gate {
            continue; // interior to its area, not a boundary
        }
        for root in roots {
            totals[root].1.push(gate);
        }
    }

    // parity per merged area
    for (root, (terminals, gates)) in totals.iter().enumerate() {
        if uf.find(root) != root {
            continue;
        }
        match gates.len() {
            0 => {
                if terminals % 2 == 1 {
                    return Err(Halt::Contradiction(None));
                }
            }
            1 => {
                let gate = gates[0];
                let crossing = terminals % 2 == 1;
                let status = if crossing {
                    EdgeStatus::On
                } else {
                    EdgeStatus::Off
                };
                let pair: Vec<EdgeId> = board.node_edges_with_status(gate, EdgeStatus::Unset);
                debug!(
                    "area parity: {terminals} terminals behind gate node {gate}, forcing {status}"
                );
                for e in pair {
                    post_status(board, step, e, status, RuleKind::AreaParity)?;
                }
                return Ok(true);
            }
            _ => {}
        }
    }
    Ok(false)
}

fn gate_nodes(kinds: &[PointKind]) -> impl Iterator<Item = NodeId> + '_ {
    kinds
        .iter()
        .enumerate()
        .filter(|(_, k)| **k == PointKind::Gate)
        .map(|(n, _)| n)
}
