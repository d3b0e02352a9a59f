//! The propagation halt taxonomy and rule tags.

use std::fmt;

use strum_macros::{Display, EnumCount as EnumCountMacro};
use thiserror::Error;

use crate::geometry::{CellId, EdgeId, NodeId};

/// A board element implicated in a contradiction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Element {
    Node(NodeId),
    Edge(EdgeId),
    Cell(CellId),
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Element::Node(id) => write!(f, "node {id}"),
            Element::Edge(id) => write!(f, "edge {id}"),
            Element::Cell(id) => write!(f, "cell {id}"),
        }
    }
}

/// Why propagation stopped early.
///
/// These are ordinary control-flow outcomes, not panics: a contradiction
/// or a completed loop is reported to the caller, which rewinds the current
/// step and decides what to try next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, EnumCountMacro)]
pub enum Halt {
    /// The current assignment cannot extend to a solution. Carries the
    /// element where the conflict surfaced when one is known.
    #[error("contradiction{}", .0.map(|e| format!(" at {e}")).unwrap_or_default())]
    Contradiction(Option<Element>),
    /// A single closed loop satisfying every clue was completed.
    #[error("loop completed")]
    Finished,
    /// A speculative state the dead-end cache already knows fails.
    #[error("speculative state already known to fail")]
    CacheHit,
    /// The configured wall-clock deadline passed.
    #[error("time limit exceeded")]
    TimeOver,
}

/// Which rule produced a forced edge. Tagged onto every edge action so a
/// hint layer can replay deductions from the step log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumCountMacro)]
pub enum RuleKind {
    /// Direct caller request (user move, fixture setup).
    External,
    NodeDegree,
    CellDegree,
    DiagonalChain,
    Gate,
    Color,
    AreaParity,
    /// The guard that keeps a chain from closing a premature loop.
    ChainGuard,
    Trial,
    Search,
    Generator,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn halt_messages_name_the_element() {
        let halt = Halt::Contradiction(Some(Element::Cell(7)));
        assert_eq!(halt.to_string(), "contradiction at cell 7");
        assert_eq!(Halt::Contradiction(None).to_string(), "contradiction");
        assert_eq!(Halt::Finished.to_string(), "loop completed");
    }
}
