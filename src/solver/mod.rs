//! The backtracking search driver.
//!
//! The driver keeps an explicit stack of [`BranchBuffer`]s, one per guess
//! level, mirrored by a [`StepStack`] transaction per tried branch. A
//! branch turns one candidate edge on and propagates; a contradiction
//! rewinds the step and tries the next candidate, an exhausted buffer
//! backtracks a level, and a completed loop is recorded (and searched
//! past, when uniqueness is being proven). Guess depth and wall-clock are
//! both bounded; hitting either bound poisons exhaustiveness claims,
//! which the result reports as `depth_limited`.

use std::mem;
use std::time::Instant;

use log::debug;

use crate::area;
use crate::geometry::{Board, EdgeId, EdgeStatus};
use crate::propagation::{self, Halt, RuleKind};
use crate::trail::{Action, FingerprintCache, Step, StepStack};

mod branch;
mod options;
mod statistics;

pub use branch::{Branch, BranchBuffer};
pub use options::{SolveOption, SolveReason, SolveResult};
pub use statistics::{Counter, Statistics};

enum SearchOutcome {
    /// Every branch was tried (within the depth ceiling).
    Exhausted,
    /// Stopped early with the answer in hand.
    Stopped,
    TimedOut,
}

/// A solving session owning a board and its undo history.
pub struct Solver {
    board: Board,
    steps: StepStack,
    options: SolveOption,
    cache: FingerprintCache,
    deadline: Option<Instant>,
    stats: Statistics,
    solutions: Vec<Vec<EdgeId>>,
    canonical: Vec<Vec<EdgeId>>,
    depth_limited: bool,
    max_depth: usize,
}

impl Solver {
    pub fn new(board: Board, options: SolveOption) -> Solver {
        Solver {
            board,
            steps: StepStack::new(),
            options,
            cache: Default::default(),
            deadline: None,
            stats: Statistics::default(),
            solutions: Vec::new(),
            canonical: Vec::new(),
            depth_limited: false,
            max_depth: 0,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn into_board(self) -> Board {
        self.board
    }

    pub fn statistics(&self) -> &Statistics {
        &self.stats
    }

    /// Actions logged in the currently open step, latest transaction first
    /// consumers use the rule tags to explain deductions.
    pub fn step_actions(&self) -> &[Action] {
        self.steps.top().actions()
    }

    /// Set an edge and propagate all consequences.
    ///
    /// This is the external entry point for interactive moves and fixture
    /// setup; the search driver uses it internally for its guesses.
    pub fn set_edge_status(&mut self, edge: EdgeId, status: EdgeStatus) -> Result<(), Halt> {
        self.check_deadline()?;
        {
            let Solver { board, steps, .. } = self;
            propagation::post_status(board, steps.current(), edge, status, RuleKind::External)?;
        }
        self.propagate()
    }

    /// Solve the board as configured.
    pub fn solve(&mut self) -> SolveResult {
        let start = Instant::now();
        self.deadline = self.options.time_limit.map(|limit| start + limit);
        debug!(
            "solve: {}x{} board, max guess level {}",
            self.board.width(),
            self.board.height(),
            self.options.max_guess_level
        );
        let outcome = match self.warm_up() {
            Ok(()) => self.search(),
            Err(Halt::Finished) => {
                // forced by propagation alone, trivially unique
                self.record_solution();
                SearchOutcome::Exhausted
            }
            Err(Halt::TimeOver) => SearchOutcome::TimedOut,
            Err(_) => SearchOutcome::Exhausted,
        };
        self.unwind();
        self.deadline = None;
        let (solved, reason) = self.classify(&outcome);
        debug!("solve: {reason} after {:?} ({})", start.elapsed(), self.stats);
        SolveResult {
            solved,
            reason,
            elapsed: start.elapsed(),
            max_depth: self.max_depth,
            depth_limited: self.depth_limited,
            loop_edges: self.solutions.first().cloned(),
        }
    }

    /// Seed the work queues from the clues and run to the first fixpoint.
    fn warm_up(&mut self) -> Result<(), Halt> {
        {
            let Solver { board, steps, .. } = self;
            let step = steps.current();
            for c in 0..board.cell_count() {
                step.enqueue_gate(c);
                step.enqueue_color(c);
                propagation::check_cell_degree(board, step, c)?;
            }
        }
        self.propagate()
    }

    fn search(&mut self) -> SearchOutcome {
        if self.options.max_guess_level == 0 {
            self.depth_limited = self.board.first_unset_edge().is_some();
            return SearchOutcome::Exhausted;
        }
        let mut levels = vec![BranchBuffer::collect(&self.board)];
        loop {
            if self.check_deadline().is_err() {
                self.depth_limited = true;
                return SearchOutcome::TimedOut;
            }
            let Some(level) = levels.last_mut() else {
                return SearchOutcome::Exhausted;
            };
            let Some(branch) = level.next() else {
                levels.pop();
                if !levels.is_empty() {
                    self.pop_step();
                }
                continue;
            };

            self.stats.increment(Counter::Guesses);
            self.max_depth = self.max_depth.max(levels.len());
            self.steps.push();
            match self.try_branch(branch.edge) {
                Ok(()) => {
                    if self.board.first_unset_edge().is_none() {
                        // fully determined yet not closed: dead branch
                        self.stats.increment(Counter::Backtracks);
                        self.pop_step();
                    } else if levels.len() >= self.options.max_guess_level {
                        self.depth_limited = true;
                        self.pop_step();
                    } else {
                        levels.push(BranchBuffer::collect(&self.board));
                    }
                }
                Err(Halt::Finished) => {
                    self.record_solution();
                    let done = !self.options.check_uniqueness || self.solutions.len() >= 2;
                    self.pop_step();
                    if done {
                        return SearchOutcome::Stopped;
                    }
                }
                Err(Halt::TimeOver) => {
                    self.depth_limited = true;
                    self.pop_step();
                    return SearchOutcome::TimedOut;
                }
                Err(_) => {
                    self.stats.increment(Counter::Backtracks);
                    self.pop_step();
                }
            }
        }
    }

    fn try_branch(&mut self, edge: EdgeId) -> Result<(), Halt> {
        {
            let Solver { board, steps, .. } = self;
            propagation::post_status(board, steps.current(), edge, EdgeStatus::On, RuleKind::Search)?;
        }
        self.propagate()
    }

    /// Propagate to a global fixpoint: local rules first, then the
    /// stall-time passes, each success re-feeding the local queues.
    fn propagate(&mut self) -> Result<(), Halt> {
        loop {
            {
                let Solver {
                    board,
                    steps,
                    options,
                    ..
                } = self;
                propagation::drain_local(board, steps.current(), options)?;
            }
            if self.options.try_one_step && self.trial_sweep()? {
                continue;
            }
            if self.options.area_check {
                let changed = {
                    let Solver { board, steps, .. } = self;
                    area::check(board, steps.current())?
                };
                if changed {
                    self.stats.increment(Counter::AreaForcings);
                    continue;
                }
            }
            return Ok(());
        }
    }

    /// Probe undetermined edges speculatively; a probe that fails forces
    /// the opposite status for real.
    fn trial_sweep(&mut self) -> Result<bool, Halt> {
        let mut trial = Step::new();
        if self.options.use_cache {
            trial.arm_cache(mem::take(&mut self.cache));
        }
        let result = self.run_sweep(&mut trial);
        if self.options.use_cache {
            self.cache = trial.disarm_cache();
        }
        result
    }

    fn run_sweep(&mut self, trial: &mut Step) -> Result<bool, Halt> {
        let mut changed_any = false;
        for _ in 0..self.options.trial_extension.max(1) {
            let mut changed = false;
            for edge in self.trial_candidates() {
                self.check_deadline()?;
                if !self.board.edge(edge).is_unset() {
                    continue;
                }
                for probe in [EdgeStatus::On, EdgeStatus::Off] {
                    if !self.board.edge(edge).is_unset() {
                        break;
                    }
                    self.stats.increment(Counter::Trials);
                    trial.set_base_fingerprint(self.steps.top().fingerprint());
                    let outcome = {
                        let Solver { board, options, .. } = self;
                        probe_once(board, trial, edge, probe, options)
                    };
                    match outcome {
                        // consistent (or speculatively complete): no info
                        Ok(()) | Err(Halt::Finished) => trial.rewind(&mut self.board, false),
                        Err(Halt::TimeOver) => {
                            trial.rewind(&mut self.board, false);
                            return Err(Halt::TimeOver);
                        }
                        Err(halt) => {
                            if halt == Halt::CacheHit {
                                self.stats.increment(Counter::CacheHits);
                            }
                            trial.rewind(&mut self.board, true);
                            self.force_edge(edge, probe.inverse(), RuleKind::Trial)?;
                            changed = true;
                        }
                    }
                }
            }
            changed_any |= changed;
            if !changed {
                break;
            }
        }
        Ok(changed_any)
    }

    /// Edges worth probing: continuations of chain ends and the borders of
    /// cells one edge away from satisfying (or saturating) their clue.
    fn trial_candidates(&self) -> Vec<EdgeId> {
        let board = &self.board;
        let mut out = Vec::new();
        for n in 0..board.node_count() {
            if board.node(n).on_count == 1 {
                out.extend(board.node_edges_with_status(n, EdgeStatus::Unset));
            }
        }
        for c in 0..board.cell_count() {
            let cell = board.cell(c);
            if !cell.is_numbered() {
                continue;
            }
            let number = cell.number as u8;
            let nearly_on = number > 0 && cell.on_count == number - 1;
            let nearly_off = cell.off_count + number == 3;
            if nearly_on || nearly_off {
                out.extend(board.cell_edges_with_status(c, EdgeStatus::Unset));
            }
        }
        out.sort_unstable();
        out.dedup();
        out
    }

    fn force_edge(&mut self, edge: EdgeId, status: EdgeStatus, rule: RuleKind) -> Result<(), Halt> {
        let Solver {
            board,
            steps,
            options,
            ..
        } = self;
        let step = steps.current();
        propagation::post_status(board, step, edge, status, rule)?;
        propagation::drain_local(board, step, options)
    }

    fn record_solution(&mut self) {
        let Some(start) = self.board.first_on_edge() else {
            return;
        };
        let Some(loop_edges) = self.board.loop_edges(start) else {
            return;
        };
        let mut key = loop_edges.clone();
        key.sort_unstable();
        if !self.canonical.contains(&key) {
            debug!("solution found: {} edges", loop_edges.len());
            self.canonical.push(key);
            self.solutions.push(loop_edges);
        }
    }

    fn classify(&self, outcome: &SearchOutcome) -> (bool, SolveReason) {
        match self.solutions.len() {
            0 => match outcome {
                SearchOutcome::TimedOut => (false, SolveReason::NotLogical),
                _ if self.depth_limited => (false, SolveReason::NotLogical),
                _ => (false, SolveReason::NoLoop),
            },
            1 => (true, SolveReason::Solved),
            _ => (false, SolveReason::MultiLoop),
        }
    }

    fn check_deadline(&self) -> Result<(), Halt> {
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Err(Halt::TimeOver),
            _ => Ok(()),
        }
    }

    fn unwind(&mut self) {
        while self.steps.depth() > 1 {
            self.pop_step();
        }
    }

    pub(crate) fn push_step(&mut self) {
        self.steps.push();
    }

    pub(crate) fn pop_step(&mut self) {
        let Solver { board, steps, .. } = self;
        steps.pop_rewind(board);
    }

    /// Generator entry: set an edge under the generator's rule tag.
    pub(crate) fn grow_edge(&mut self, edge: EdgeId, status: EdgeStatus) -> Result<(), Halt> {
        {
            let Solver { board, steps, .. } = self;
            propagation::post_status(board, steps.current(), edge, status, RuleKind::Generator)?;
        }
        self.propagate()
    }
}

fn probe_once(
    board: &mut Board,
    trial: &mut Step,
    edge: EdgeId,
    status: EdgeStatus,
    options: &SolveOption,
) -> Result<(), Halt> {
    propagation::post_status(board, trial, edge, status, RuleKind::Trial)?;
    propagation::drain_local(board, trial, options)
}
