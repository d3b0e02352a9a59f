//! End-to-end solver runs on small puzzles.

mod common;

use std::time::Duration;

use slither_search::solver::Counter;
use slither_search::{Board, SolveOption, SolveReason, Solver};

#[test]
fn twin_threes_need_no_guessing() {
    let board = Board::from_clue_rows(&["33"]);
    let result = common::solve(board, SolveOption::default());
    assert!(result.solved);
    assert_eq!(result.reason, SolveReason::Solved);
    assert_eq!(result.max_depth, 0);
    let loop_edges = result.loop_edges.unwrap();
    assert_eq!(loop_edges.len(), 6);
    assert!(common::replay_loop(Board::from_clue_rows(&["33"]), &loop_edges));
}

#[test]
fn ring_around_a_zero_is_unique() {
    let rows = ["212", "101", "212"];
    let board = Board::from_clue_rows(&rows);
    let result = common::solve(board, SolveOption::uniqueness(8));
    assert!(result.solved, "{:?}", result.reason);
    assert!(!result.depth_limited);
    let loop_edges = result.loop_edges.unwrap();
    assert_eq!(loop_edges.len(), 12);
    assert!(common::replay_loop(Board::from_clue_rows(&rows), &loop_edges));
}

#[test]
fn a_five_by_five_solves_within_the_default_budget() {
    let rows = ["2 1 1", "2  2 ", " 3 12", "2  3 ", "2  2 "];
    let board = Board::from_clue_rows(&rows);
    let result = common::solve(board, SolveOption::default());
    assert!(result.solved, "{:?}", result.reason);
    let loop_edges = result.loop_edges.unwrap();
    assert!(common::replay_loop(Board::from_clue_rows(&rows), &loop_edges));
}

#[test]
fn an_unsatisfiable_board_reports_no_loop() {
    let result = common::solve(Board::from_clue_rows(&["3"]), SolveOption::default());
    assert!(!result.solved);
    assert_eq!(result.reason, SolveReason::NoLoop);
}

#[test]
fn a_blank_board_fails_uniqueness() {
    let result = common::solve(Board::blank(2, 2), SolveOption::uniqueness(8));
    assert!(!result.solved);
    assert_eq!(result.reason, SolveReason::MultiLoop);
}

#[test]
fn a_clued_board_can_still_need_guessing() {
    // a lone centre 3 gives the rules nothing to grip: every deduction
    // family stalls, so only the search driver can place the loop
    let rows = ["   ", " 3 ", "   "];
    let result = common::solve(Board::from_clue_rows(&rows), SolveOption::default());
    assert!(result.solved, "{:?}", result.reason);
    assert!(result.max_depth >= 1);

    let options = SolveOption {
        max_guess_level: 0,
        ..SolveOption::default()
    };
    let result = common::solve(Board::from_clue_rows(&rows), options);
    assert!(!result.solved);
    assert_eq!(result.reason, SolveReason::NotLogical);
    assert!(result.depth_limited);
}

#[test]
fn guess_starved_solves_report_not_logical() {
    let options = SolveOption {
        max_guess_level: 0,
        ..SolveOption::default()
    };
    let result = common::solve(Board::blank(3, 3), options);
    assert!(!result.solved);
    assert_eq!(result.reason, SolveReason::NotLogical);
    assert!(result.depth_limited);
}

#[test]
fn an_expired_deadline_cuts_the_search_short() {
    let options = SolveOption {
        time_limit: Some(Duration::ZERO),
        ..SolveOption::default()
    };
    let result = common::solve(Board::blank(6, 6), options);
    assert!(!result.solved);
    assert_eq!(result.reason, SolveReason::NotLogical);
}

#[test]
fn statistics_track_the_search() {
    let mut solver = Solver::new(Board::blank(3, 3), SolveOption::default());
    let result = solver.solve();
    assert!(result.solved);
    assert!(solver.statistics().get(Counter::Guesses) >= 1);
    assert!(result.max_depth >= 1);
}
