//! The board: arena construction, adjacency queries and loop tracing.

use strum_macros::Display;

use super::{
    Axis, Cell, CellColor, CellId, Corner, Diagonal, Edge, EdgeId, EdgeStatus, GateStatus, Node,
    NodeId,
};

/// Classification of the current edge assignment as a whole.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum LoopStatus {
    /// No closed loop yet (open chains or no edges at all).
    NotClosed,
    /// Some node has an impossible degree.
    NodeError,
    /// Some cell disagrees with its clue.
    CellError,
    /// More than one closed loop.
    MultiLoop,
    /// A single closed loop satisfying every clue.
    Finished,
}

/// A rectangular slither-link board.
///
/// Arena layout, for a `width x height` grid:
///
/// - nodes: `(width+1) * (height+1)` real nodes row-major, then the dummy;
/// - edges: `width * (height+1)` horizontal row-major, then
///   `(width+1) * height` vertical row-major, then the dummy;
/// - cells: `width * height` real cells row-major, then the dummy.
#[derive(Debug, Clone)]
pub struct Board {
    width: usize,
    height: usize,
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    cells: Vec<Cell>,
    on_edges: usize,
}

impl Board {
    /// Build a board from a row-major clue array (`-1` for blank).
    ///
    /// # Panics
    ///
    /// Panics if `numbers.len() != width * height` or a clue is outside
    /// `-1..=3`.
    pub fn new(width: usize, height: usize, numbers: &[i8]) -> Board {
        assert!(width > 0 && height > 0, "board must have positive size");
        assert_eq!(numbers.len(), width * height, "clue array size mismatch");
        assert!(
            numbers.iter().all(|&n| (-1..=3).contains(&n)),
            "clue out of range"
        );

        let h_edges = width * (height + 1);
        let v_edges = (width + 1) * height;
        let dummy_node = (width + 1) * (height + 1);
        let dummy_edge = h_edges + v_edges;
        let dummy_cell = width * height;

        let h_edge = |x: usize, y: usize| y * width + x;
        let v_edge = |x: usize, y: usize| h_edges + y * (width + 1) + x;
        let node_at = |x: usize, y: usize| y * (width + 1) + x;
        let cell_at = |x: usize, y: usize| y * width + x;

        let mut nodes = Vec::with_capacity(dummy_node + 1);
        for y in 0..=height {
            for x in 0..=width {
                let edges = [
                    if y > 0 { v_edge(x, y - 1) } else { dummy_edge },
                    if x > 0 { h_edge(x - 1, y) } else { dummy_edge },
                    if y < height { v_edge(x, y) } else { dummy_edge },
                    if x < width { h_edge(x, y) } else { dummy_edge },
                ];
                let boundary = edges.iter().filter(|&&e| e == dummy_edge).count() as u8;
                nodes.push(Node {
                    x,
                    y,
                    edges,
                    on_count: 0,
                    off_count: boundary,
                    opposite: None,
                    gates: [GateStatus::Unset; 2],
                });
            }
        }
        nodes.push(Node {
            x: usize::MAX,
            y: usize::MAX,
            edges: [dummy_edge; 4],
            on_count: 0,
            off_count: 4,
            opposite: None,
            gates: [GateStatus::Unset; 2],
        });

        let mut edges = Vec::with_capacity(dummy_edge + 1);
        for y in 0..=height {
            for x in 0..width {
                edges.push(Edge {
                    status: EdgeStatus::Unset,
                    fixed: false,
                    axis: Axis::Horizontal,
                    nodes: [node_at(x, y), node_at(x + 1, y)],
                    cells: [
                        if y > 0 { cell_at(x, y - 1) } else { dummy_cell },
                        if y < height { cell_at(x, y) } else { dummy_cell },
                    ],
                    straight: [
                        if x > 0 { h_edge(x - 1, y) } else { dummy_edge },
                        if x + 1 < width { h_edge(x + 1, y) } else { dummy_edge },
                    ],
                });
            }
        }
        for y in 0..height {
            for x in 0..=width {
                edges.push(Edge {
                    status: EdgeStatus::Unset,
                    fixed: false,
                    axis: Axis::Vertical,
                    nodes: [node_at(x, y), node_at(x, y + 1)],
                    cells: [
                        if x > 0 { cell_at(x - 1, y) } else { dummy_cell },
                        if x < width { cell_at(x, y) } else { dummy_cell },
                    ],
                    straight: [
                        if y > 0 { v_edge(x, y - 1) } else { dummy_edge },
                        if y + 1 < height { v_edge(x, y + 1) } else { dummy_edge },
                    ],
                });
            }
        }
        edges.push(Edge {
            status: EdgeStatus::Off,
            fixed: true,
            axis: Axis::Horizontal,
            nodes: [dummy_node; 2],
            cells: [dummy_cell; 2],
            straight: [dummy_edge; 2],
        });

        let mut cells = Vec::with_capacity(dummy_cell + 1);
        for y in 0..height {
            for x in 0..width {
                cells.push(Cell {
                    x,
                    y,
                    number: numbers[cell_at(x, y)],
                    color: CellColor::Unset,
                    edges: [
                        h_edge(x, y),
                        v_edge(x, y),
                        h_edge(x, y + 1),
                        v_edge(x + 1, y),
                    ],
                    on_count: 0,
                    off_count: 0,
                });
            }
        }
        cells.push(Cell {
            x: usize::MAX,
            y: usize::MAX,
            number: -1,
            color: CellColor::Outer,
            edges: [dummy_edge; 4],
            on_count: 0,
            off_count: 4,
        });

        Board {
            width,
            height,
            nodes,
            edges,
            cells,
            on_edges: 0,
        }
    }

    /// A board of the given size with every clue blank.
    pub fn blank(width: usize, height: usize) -> Board {
        Board::new(width, height, &vec![-1; width * height])
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of real nodes.
    pub fn node_count(&self) -> usize {
        (self.width + 1) * (self.height + 1)
    }

    /// Number of real edges.
    pub fn edge_count(&self) -> usize {
        self.width * (self.height + 1) + (self.width + 1) * self.height
    }

    /// Number of real cells.
    pub fn cell_count(&self) -> usize {
        self.width * self.height
    }

    pub fn dummy_node(&self) -> NodeId {
        self.node_count()
    }

    pub fn dummy_edge(&self) -> EdgeId {
        self.edge_count()
    }

    pub fn dummy_cell(&self) -> CellId {
        self.cell_count()
    }

    pub fn node_id(&self, x: usize, y: usize) -> NodeId {
        debug_assert!(x <= self.width && y <= self.height);
        y * (self.width + 1) + x
    }

    pub fn h_edge_id(&self, x: usize, y: usize) -> EdgeId {
        debug_assert!(x < self.width && y <= self.height);
        y * self.width + x
    }

    pub fn v_edge_id(&self, x: usize, y: usize) -> EdgeId {
        debug_assert!(x <= self.width && y < self.height);
        self.width * (self.height + 1) + y * (self.width + 1) + x
    }

    pub fn cell_id(&self, x: usize, y: usize) -> CellId {
        debug_assert!(x < self.width && y < self.height);
        y * self.width + x
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }

    pub fn edge(&self, id: EdgeId) -> &Edge {
        &self.edges[id]
    }

    pub fn cell(&self, id: CellId) -> &Cell {
        &self.cells[id]
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id]
    }

    pub(crate) fn cell_mut(&mut self, id: CellId) -> &mut Cell {
        &mut self.cells[id]
    }

    /// Edges of the loop set so far.
    pub fn on_edge_count(&self) -> usize {
        self.on_edges
    }

    /// The four cells around a node in corner order (up-left, up-right,
    /// down-left, down-right); the dummy cell at the boundary.
    pub fn cells_around_node(&self, n: NodeId) -> [CellId; 4] {
        let node = &self.nodes[n];
        let (x, y) = (node.x, node.y);
        let mut out = [self.dummy_cell(); 4];
        for (slot, corner) in Corner::ALL.iter().enumerate() {
            let cx = x as isize + if corner.dx() < 0 { -1 } else { 0 };
            let cy = y as isize + if corner.dy() < 0 { -1 } else { 0 };
            if cx >= 0 && cy >= 0 && (cx as usize) < self.width && (cy as usize) < self.height {
                out[slot] = self.cell_id(cx as usize, cy as usize);
            }
        }
        out
    }

    /// The node at the given corner of a cell.
    pub fn corner_node(&self, c: CellId, corner: Corner) -> NodeId {
        let cell = &self.cells[c];
        let x = if corner.dx() < 0 { cell.x } else { cell.x + 1 };
        let y = if corner.dy() < 0 { cell.y } else { cell.y + 1 };
        self.node_id(x, y)
    }

    /// The two border edges of a cell meeting at the given corner.
    pub fn corner_pair(&self, c: CellId, corner: Corner) -> [EdgeId; 2] {
        let cell = &self.cells[c];
        let horizontal = if corner.dy() < 0 {
            cell.edges[0]
        } else {
            cell.edges[2]
        };
        let vertical = if corner.dx() < 0 {
            cell.edges[1]
        } else {
            cell.edges[3]
        };
        [horizontal, vertical]
    }

    /// The diagonally adjacent cell across the given corner, or the dummy
    /// cell when off-grid.
    pub fn diagonal_neighbor(&self, c: CellId, corner: Corner) -> CellId {
        let cell = &self.cells[c];
        let x = cell.x as isize + corner.dx();
        let y = cell.y as isize + corner.dy();
        if x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height {
            self.cell_id(x as usize, y as usize)
        } else {
            self.dummy_cell()
        }
    }

    /// The two side pairs of a node's edges with respect to a diagonal.
    ///
    /// For `NwSe`, the pairs are `[up, left]` and `[down, right]`; for
    /// `NeSw`, `[up, right]` and `[down, left]`.
    pub fn node_side_pairs(&self, n: NodeId, d: Diagonal) -> [[EdgeId; 2]; 2] {
        let e = &self.nodes[n].edges;
        match d {
            Diagonal::NwSe => [[e[0], e[1]], [e[2], e[3]]],
            Diagonal::NeSw => [[e[0], e[3]], [e[2], e[1]]],
        }
    }

    /// The edge connecting two lattice-adjacent nodes, if they are adjacent.
    pub fn joining_edge(&self, a: NodeId, b: NodeId) -> Option<EdgeId> {
        if a >= self.node_count() || b >= self.node_count() {
            return None;
        }
        let (na, nb) = (&self.nodes[a], &self.nodes[b]);
        if na.y == nb.y && na.x.abs_diff(nb.x) == 1 {
            Some(self.h_edge_id(na.x.min(nb.x), na.y))
        } else if na.x == nb.x && na.y.abs_diff(nb.y) == 1 {
            Some(self.v_edge_id(na.x, na.y.min(nb.y)))
        } else {
            None
        }
    }

    /// Reset all transient solving state. Clues are kept; edge statuses,
    /// fixed flags, counters, endpoint references, gates and colours are
    /// cleared.
    pub fn clear(&mut self) {
        let dummy_edge = self.dummy_edge();
        for edge in &mut self.edges[..dummy_edge] {
            edge.status = EdgeStatus::Unset;
            edge.fixed = false;
        }
        for node in &mut self.nodes {
            node.on_count = 0;
            node.off_count = node.edges.iter().filter(|&&e| e == dummy_edge).count() as u8;
            node.opposite = None;
            node.gates = [GateStatus::Unset; 2];
        }
        let dummy_cell = self.dummy_cell();
        for cell in &mut self.cells[..dummy_cell] {
            cell.color = CellColor::Unset;
            cell.on_count = 0;
            cell.off_count = 0;
        }
        self.on_edges = 0;
    }

    /// Lock every determined edge against mutation by an interactive layer.
    pub fn fix_status(&mut self) {
        let count = self.edge_count();
        for edge in &mut self.edges[..count] {
            if edge.status.is_determined() {
                edge.fixed = true;
            }
        }
    }

    /// Raw edge-status transition, adjusting the degree counters. Used by
    /// the action log; the propagation engine goes through `post_status`.
    pub(crate) fn set_edge_raw(&mut self, e: EdgeId, from: EdgeStatus, to: EdgeStatus) {
        debug_assert_eq!(self.edges[e].status, from);
        debug_assert!(e < self.edge_count());
        let (nodes, cells) = (self.edges[e].nodes, self.edges[e].cells);
        let dummy_cell = self.dummy_cell();
        self.edges[e].status = to;
        for step in [(from, -1i8), (to, 1i8)] {
            let (status, delta) = step;
            match status {
                EdgeStatus::On => {
                    for n in nodes {
                        let c = &mut self.nodes[n].on_count;
                        *c = c.wrapping_add_signed(delta);
                    }
                    for cl in cells {
                        if cl != dummy_cell {
                            let c = &mut self.cells[cl].on_count;
                            *c = c.wrapping_add_signed(delta);
                        }
                    }
                    self.on_edges = self.on_edges.wrapping_add_signed(delta as isize);
                }
                EdgeStatus::Off => {
                    for n in nodes {
                        let c = &mut self.nodes[n].off_count;
                        *c = c.wrapping_add_signed(delta);
                    }
                    for cl in cells {
                        if cl != dummy_cell {
                            let c = &mut self.cells[cl].off_count;
                            *c = c.wrapping_add_signed(delta);
                        }
                    }
                }
                EdgeStatus::Unset => {}
            }
        }
    }

    /// The first edge with the given status at a node, if any.
    pub fn node_edge_with_status(&self, n: NodeId, status: EdgeStatus) -> Option<EdgeId> {
        let dummy = self.dummy_edge();
        self.nodes[n]
            .edges
            .iter()
            .copied()
            .find(|&e| e != dummy && self.edges[e].status == status)
    }

    /// All edges with the given status at a node.
    pub fn node_edges_with_status(&self, n: NodeId, status: EdgeStatus) -> Vec<EdgeId> {
        let dummy = self.dummy_edge();
        self.nodes[n]
            .edges
            .iter()
            .copied()
            .filter(|&e| e != dummy && self.edges[e].status == status)
            .collect()
    }

    /// All border edges of a cell with the given status.
    pub fn cell_edges_with_status(&self, c: CellId, status: EdgeStatus) -> Vec<EdgeId> {
        self.cells[c]
            .edges
            .iter()
            .copied()
            .filter(|&e| self.edges[e].status == status)
            .collect()
    }

    /// Follow the chain of on-edges starting by crossing `along` away from
    /// `from`. Returns the far endpoint, the number of edges walked, and
    /// whether the walk returned to `from` (a closed loop).
    pub fn loop_end(&self, from: NodeId, along: EdgeId) -> (NodeId, usize, bool) {
        let mut prev = along;
        let mut node = self.edges[along].other_node(from);
        let mut len = 1usize;
        loop {
            if node == from {
                return (node, len, true);
            }
            let dummy = self.dummy_edge();
            let next = self.nodes[node]
                .edges
                .iter()
                .copied()
                .find(|&e| e != dummy && e != prev && self.edges[e].is_on());
            match next {
                None => return (node, len, false),
                Some(e) => {
                    prev = e;
                    node = self.edges[e].other_node(node);
                    len += 1;
                }
            }
        }
    }

    /// The ordered edges of the closed loop through `start`, or `None` if
    /// the chain through `start` is not closed.
    pub fn loop_edges(&self, start: EdgeId) -> Option<Vec<EdgeId>> {
        if !self.edges[start].is_on() {
            return None;
        }
        let from = self.edges[start].nodes[0];
        let mut out = vec![start];
        let mut prev = start;
        let mut node = self.edges[start].other_node(from);
        let dummy = self.dummy_edge();
        while node != from {
            let next = self.nodes[node]
                .edges
                .iter()
                .copied()
                .find(|&e| e != dummy && e != prev && self.edges[e].is_on())?;
            out.push(next);
            prev = next;
            node = self.edges[next].other_node(node);
        }
        Some(out)
    }

    /// The first on-edge, if any.
    pub fn first_on_edge(&self) -> Option<EdgeId> {
        (0..self.edge_count()).find(|&e| self.edges[e].is_on())
    }

    /// The first unset edge, if any.
    pub fn first_unset_edge(&self) -> Option<EdgeId> {
        (0..self.edge_count()).find(|&e| self.edges[e].is_unset())
    }

    /// Classify the current assignment.
    ///
    /// With `finished`, open chains and unsatisfied clues are errors; without
    /// it, only outright violations are. A closed loop that leaves a clue
    /// unsatisfied is an error either way, since it cannot be extended.
    pub fn check(&self, finished: bool) -> LoopStatus {
        for n in 0..self.node_count() {
            let node = &self.nodes[n];
            if node.on_count > 2 || (finished && node.on_count == 1) {
                return LoopStatus::NodeError;
            }
        }
        for c in 0..self.cell_count() {
            let cell = &self.cells[c];
            if !cell.is_numbered() {
                continue;
            }
            let number = cell.number as u8;
            if cell.on_count > number || cell.off_count > 4 - number {
                return LoopStatus::CellError;
            }
            if finished && cell.on_count != number {
                return LoopStatus::CellError;
            }
        }
        let Some(start) = self.first_on_edge() else {
            return LoopStatus::NotClosed;
        };
        let (_, len, closed) = self.loop_end(self.edges[start].nodes[0], start);
        if !closed {
            return LoopStatus::NotClosed;
        }
        if len < self.on_edges {
            return LoopStatus::MultiLoop;
        }
        for c in 0..self.cell_count() {
            let cell = &self.cells[c];
            if cell.is_numbered() && cell.on_count != cell.number as u8 {
                return LoopStatus::CellError;
            }
        }
        LoopStatus::Finished
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arena_sizes_and_dummies() {
        let b = Board::blank(3, 2);
        assert_eq!(b.node_count(), 12);
        assert_eq!(b.edge_count(), 3 * 3 + 4 * 2);
        assert_eq!(b.cell_count(), 6);
        assert_eq!(b.edge(b.dummy_edge()).status, EdgeStatus::Off);
        assert_eq!(b.cell(b.dummy_cell()).color, CellColor::Outer);
    }

    #[test]
    fn corner_node_off_counts_include_boundary() {
        let b = Board::blank(3, 2);
        assert_eq!(b.node(b.node_id(0, 0)).off_count, 2);
        assert_eq!(b.node(b.node_id(1, 0)).off_count, 1);
        assert_eq!(b.node(b.node_id(1, 1)).off_count, 0);
        assert_eq!(b.node(b.node_id(3, 2)).off_count, 2);
    }

    #[test]
    fn edge_wiring_is_consistent() {
        let b = Board::blank(4, 3);
        for e in 0..b.edge_count() {
            let edge = b.edge(e);
            for &n in &edge.nodes {
                assert!(b.node(n).edges.contains(&e), "edge {e} missing at node {n}");
            }
            for &c in &edge.cells {
                if c != b.dummy_cell() {
                    assert!(b.cell(c).edges.contains(&e), "edge {e} missing at cell {c}");
                }
            }
        }
        // straight continuations share an axis and the pivot node
        for e in 0..b.edge_count() {
            let edge = b.edge(e);
            for (slot, &n) in edge.nodes.iter().enumerate() {
                let s = edge.straight[slot];
                if s != b.dummy_edge() {
                    assert_eq!(b.edge(s).axis, edge.axis);
                    assert!(b.edge(s).nodes.contains(&n));
                }
            }
        }
    }

    #[test]
    fn corner_pair_meets_at_corner_node() {
        let b = Board::blank(3, 3);
        let c = b.cell_id(1, 1);
        for corner in Corner::ALL {
            let n = b.corner_node(c, corner);
            for e in b.corner_pair(c, corner) {
                assert!(b.edge(e).nodes.contains(&n));
            }
        }
    }

    #[test]
    fn set_edge_raw_updates_counters() {
        let mut b = Board::blank(2, 2);
        let e = b.h_edge_id(0, 0);
        b.set_edge_raw(e, EdgeStatus::Unset, EdgeStatus::On);
        assert_eq!(b.node(b.node_id(0, 0)).on_count, 1);
        assert_eq!(b.node(b.node_id(1, 0)).on_count, 1);
        assert_eq!(b.cell(b.cell_id(0, 0)).on_count, 1);
        assert_eq!(b.on_edge_count(), 1);
        b.set_edge_raw(e, EdgeStatus::On, EdgeStatus::Unset);
        assert_eq!(b.node(b.node_id(0, 0)).on_count, 0);
        assert_eq!(b.on_edge_count(), 0);
    }

    #[test]
    fn loop_end_traces_a_square() {
        let mut b = Board::blank(2, 2);
        // the unit square around cell (0,0)
        let ring = [
            b.h_edge_id(0, 0),
            b.v_edge_id(1, 0),
            b.h_edge_id(0, 1),
            b.v_edge_id(0, 0),
        ];
        for e in ring {
            b.set_edge_raw(e, EdgeStatus::Unset, EdgeStatus::On);
        }
        let (end, len, closed) = b.loop_end(b.node_id(0, 0), ring[0]);
        assert!(closed);
        assert_eq!(len, 4);
        assert_eq!(end, b.node_id(0, 0));
        assert_eq!(b.loop_edges(ring[0]).map(|l| l.len()), Some(4));
    }

    #[test]
    fn check_classifies_partial_and_closed_states() {
        let mut b = Board::new(2, 2, &[-1, -1, -1, 0]);
        assert_eq!(b.check(false), LoopStatus::NotClosed);
        let ring = [
            b.h_edge_id(0, 0),
            b.v_edge_id(1, 0),
            b.h_edge_id(0, 1),
            b.v_edge_id(0, 0),
        ];
        for e in ring {
            b.set_edge_raw(e, EdgeStatus::Unset, EdgeStatus::On);
        }
        assert_eq!(b.check(true), LoopStatus::Finished);
        // a second ring around the 0-clue shares node (1,1) with the
        // first, driving its degree to four; the node check fires first
        let far = [
            b.h_edge_id(1, 1),
            b.v_edge_id(2, 1),
            b.h_edge_id(1, 2),
            b.v_edge_id(1, 1),
        ];
        for e in far {
            b.set_edge_raw(e, EdgeStatus::Unset, EdgeStatus::On);
        }
        assert_eq!(b.check(false), LoopStatus::NodeError);
    }

    #[test]
    fn check_reports_a_violated_clue() {
        let mut b = Board::new(2, 1, &[-1, 0]);
        // the ring around cell (0,0) borders the 0-clue on its right side
        for e in [
            b.h_edge_id(0, 0),
            b.v_edge_id(1, 0),
            b.h_edge_id(0, 1),
            b.v_edge_id(0, 0),
        ] {
            b.set_edge_raw(e, EdgeStatus::Unset, EdgeStatus::On);
        }
        assert_eq!(b.check(false), LoopStatus::CellError);
    }

    #[test]
    fn check_reports_multiple_loops() {
        let mut b = Board::blank(3, 1);
        for x in [0, 2] {
            for e in [
                b.h_edge_id(x, 0),
                b.v_edge_id(x + 1, 0),
                b.h_edge_id(x, 1),
                b.v_edge_id(x, 0),
            ] {
                b.set_edge_raw(e, EdgeStatus::Unset, EdgeStatus::On);
            }
        }
        assert_eq!(b.check(false), LoopStatus::MultiLoop);
    }

    #[test]
    fn clear_restores_a_blank_state() {
        let mut b = Board::new(2, 1, &[3, 3]);
        b.set_edge_raw(b.h_edge_id(0, 0), EdgeStatus::Unset, EdgeStatus::On);
        b.set_edge_raw(b.v_edge_id(0, 0), EdgeStatus::Unset, EdgeStatus::Off);
        b.fix_status();
        b.clear();
        assert_eq!(b.on_edge_count(), 0);
        assert_eq!(b.edge(b.h_edge_id(0, 0)).status, EdgeStatus::Unset);
        assert!(!b.edge(b.v_edge_id(0, 0)).fixed);
        assert_eq!(b.cell(0).number, 3);
        assert_eq!(b.node(b.node_id(0, 0)).off_count, 2);
    }
}
