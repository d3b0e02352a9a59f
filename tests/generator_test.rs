//! End-to-end generation runs.

mod common;

use slither_search::{
    GenerateOption, GenerateProgress, Generator, RemovalOrder, SolveOption, SolveReason,
};

fn options(seed: u64) -> GenerateOption {
    GenerateOption {
        seed: Some(seed),
        ..GenerateOption::default()
    }
}

#[test]
fn generated_puzzles_stay_unique() {
    let mut generator = Generator::new(options(3));
    let result = generator.generate(6, 5).unwrap();
    assert_eq!(result.clues.len(), 30);

    let solve = common::solve(result.board(), SolveOption::uniqueness(8));
    assert!(solve.solved, "{:?}", solve.reason);
    assert_eq!(solve.reason, SolveReason::Solved);
    assert!(!solve.depth_limited);

    // the solver recovers the very loop the clues were derived from
    let mut found = solve.loop_edges.unwrap();
    let mut grown = result.loop_edges.clone();
    found.sort_unstable();
    grown.sort_unstable();
    assert_eq!(found, grown);
}

#[test]
fn the_grown_loop_replays_cleanly() {
    let mut generator = Generator::new(options(17));
    let result = generator.generate(5, 5).unwrap();
    assert!(result.loop_edges.len() >= 4);
    assert!(common::replay_loop(result.board(), &result.loop_edges));
}

#[test]
fn progress_reports_growth_then_pruning() {
    let mut generator = Generator::new(options(5));
    let mut grown = 0;
    let mut batches = 0;
    generator
        .generate_with(4, 4, |event| match event {
            GenerateProgress::LoopGrown { edges } => {
                grown += 1;
                assert!(edges >= 4);
            }
            GenerateProgress::PruneBatch { cells, .. } => {
                batches += 1;
                assert!(cells >= 1);
            }
        })
        .unwrap();
    assert_eq!(grown, 1);
    assert!(batches >= 1);
}

#[test]
fn asymmetric_pruning_also_stays_unique() {
    let mut generator = Generator::new(GenerateOption {
        removal_order: RemovalOrder::RandomPairs,
        ..options(29)
    });
    let result = generator.generate(5, 4).unwrap();
    let solve = common::solve(result.board(), SolveOption::uniqueness(8));
    assert!(solve.solved, "{:?}", solve.reason);
}

#[test]
fn full_size_boards_generate() {
    let mut generator = Generator::new(options(101));
    let result = generator.generate(20, 15).unwrap();

    // the grown loop is long enough and leaves little of the board blank
    let board = result.board();
    let total = board.edge_count();
    assert!(
        result.loop_edges.len() as f64 >= 0.2 * total as f64,
        "loop of {} edges on {} positions",
        result.loop_edges.len(),
        total
    );
    let mut touched = vec![false; board.node_count()];
    for &e in &result.loop_edges {
        let [a, b] = board.edge(e).nodes;
        touched[a] = true;
        touched[b] = true;
    }
    let blank = (0..total)
        .filter(|&e| {
            let [a, b] = board.edge(e).nodes;
            !touched[a] && !touched[b]
        })
        .count();
    assert!(
        blank as f64 <= 0.4 * total as f64,
        "{blank} blank of {total} edges"
    );

    let solve = common::solve(result.board(), SolveOption::uniqueness(10));
    assert!(solve.solved, "{:?}", solve.reason);
}
