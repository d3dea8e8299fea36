//! Integration tests for goai-mcts
//!
//! These cover the search invariants end to end: visit accounting, sign
//! alternation during backup, root-only noise, temperature handling, the
//! move/index mapping and the terminal-root scenario.

use std::cell::Cell;

use goai_mcts::board::Color;
use goai_mcts::distribution::sample_action;
use goai_mcts::evaluator::{Evaluation, Evaluator, EvaluatorContractError, UniformEvaluator};
use goai_mcts::game::{GameState, Move, MoveError};
use goai_mcts::mcts::{LeafAction, SearchConfig, SearchEngine, SearchError};
use goai_mcts::node::NodeId;
use goai_mcts::player::MctsPlayer;
use goai_mcts::playout::RolloutEvaluator;
use goai_mcts::tree::SearchTree;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

// =============================================================================
// Helpers
// =============================================================================

/// Uniform evaluator that counts how often it is called.
#[derive(Default)]
struct CountingEvaluator {
    calls: Cell<usize>,
}

impl Evaluator for CountingEvaluator {
    fn evaluate(&self, state: &GameState) -> Evaluation {
        self.calls.set(self.calls.get() + 1);
        UniformEvaluator.evaluate(state)
    }
}

/// Evaluator that reports a value outside [-1, 1].
struct OverconfidentEvaluator;

impl Evaluator for OverconfidentEvaluator {
    fn evaluate(&self, state: &GameState) -> Evaluation {
        Evaluation {
            value: 2.0,
            ..UniformEvaluator.evaluate(state)
        }
    }
}

/// Evaluator whose policy does not sum to one.
struct UnnormalizedEvaluator;

impl Evaluator for UnnormalizedEvaluator {
    fn evaluate(&self, state: &GameState) -> Evaluation {
        Evaluation {
            policy: vec![0.5; state.action_size()],
            value: 0.0,
        }
    }
}

fn play_moves(size: usize, moves: &[Move]) -> GameState {
    let mut state = GameState::new(size);
    for &mv in moves {
        state.apply(mv).unwrap();
    }
    state
}

fn children_visit_sum(tree: &SearchTree) -> u32 {
    tree.get(tree.root())
        .children
        .iter()
        .map(|&(_, id)| tree.get(id).visit_count)
        .sum()
}

// =============================================================================
// Rules contract
// =============================================================================

#[test]
fn test_two_passes_end_the_game() {
    let mut state = GameState::new(9);
    state.apply(Move::Pass).unwrap();
    assert!(!state.is_terminal());
    state.apply(Move::Pass).unwrap();
    assert!(state.is_terminal());
    assert_eq!(state.move_history(), &[Move::Pass, Move::Pass]);
}

#[test]
fn test_interrupted_passes_do_not_end_the_game() {
    let state = play_moves(9, &[Move::Pass, Move::At(3, 3), Move::Pass]);
    assert!(!state.is_terminal());
    assert_eq!(state.current_player(), Color::White);
}

#[test]
fn test_occupied_cell_is_rejected() {
    let mut state = play_moves(9, &[Move::At(4, 4)]);
    assert!(!state.is_legal(Move::At(4, 4)));
    assert_eq!(
        state.apply(Move::At(4, 4)),
        Err(MoveError::Occupied(Move::At(4, 4)))
    );
    assert_eq!(state.current_player(), Color::White);
    assert!(!state.legal_moves().contains(&Move::At(4, 4)));
    assert_eq!(state.legal_moves().last(), Some(&Move::Pass));
}

#[test]
fn test_move_index_round_trip() {
    for n in [1, 3, 9, 13] {
        let state = GameState::new(n);
        for i in 0..=n * n {
            let mv = state.index_to_move(i).unwrap();
            assert_eq!(state.move_to_index(mv), i);
        }
        assert_eq!(state.index_to_move(n * n), Some(Move::Pass));
        assert_eq!(state.index_to_move(n * n + 1), None);
        for mv in state.legal_moves() {
            assert_eq!(state.index_to_move(state.move_to_index(mv)), Some(mv));
        }
    }
}

// =============================================================================
// Tree statistics
// =============================================================================

#[test]
fn test_backup_reaches_every_ancestor_once_with_alternating_sign() {
    let state = GameState::new(3);
    let policy = vec![0.1; 10];
    let mut tree = SearchTree::new(state);

    // root -> a -> b -> c
    let mut path = vec![tree.root()];
    for _ in 0..3 {
        let id = *path.last().unwrap();
        let legal = tree.get(id).state.legal_moves();
        tree.expand(id, &legal, &policy);
        path.push(tree.get(id).children[0].1);
    }
    let leaf = *path.last().unwrap();

    // Warm up some statistics so the deltas are not measured from zero
    tree.backup(path[2], 0.4);

    let before: Vec<(u32, f64)> = path
        .iter()
        .map(|&id| (tree.get(id).visit_count, tree.get(id).value_sum))
        .collect();

    let v = 0.3;
    tree.backup(leaf, v);

    for (k, &id) in path.iter().rev().enumerate() {
        let (visits, sum) = before[path.len() - 1 - k];
        let node = tree.get(id);
        let expected = if k % 2 == 0 { v } else { -v };
        assert_eq!(node.visit_count, visits + 1, "visits at distance {k}");
        assert!(
            (node.value_sum - (sum + expected)).abs() < 1e-12,
            "value at distance {k}"
        );
    }

    // Siblings are untouched
    let sibling = tree.get(tree.root()).children[1].1;
    assert_eq!(tree.get(sibling).visit_count, 0);
}

#[test]
fn test_mean_values_stay_in_range() {
    let state = play_moves(9, &[Move::At(4, 4), Move::At(3, 3)]);
    let mut engine = SearchEngine::with_config(
        RolloutEvaluator::with_seed(11),
        SearchConfig::for_testing().with_simulations(200),
    );
    engine.search(&state).unwrap();

    let tree = engine.last_tree().unwrap();
    for node in tree.nodes() {
        if node.visit_count > 0 {
            let q = node.value_sum / node.visit_count as f64;
            assert!((-1.0..=1.0).contains(&q), "mean value {q} out of range");
        }
    }
}

#[test]
fn test_root_children_visits_equal_simulations() {
    for sims in [1, 7, 50, 120] {
        let mut engine = SearchEngine::with_config(
            RolloutEvaluator::with_seed(3),
            SearchConfig::for_testing().with_simulations(sims),
        );
        engine.search(&GameState::new(5)).unwrap();

        let tree = engine.last_tree().unwrap();
        assert_eq!(children_visit_sum(tree), sims as u32);
        assert_eq!(tree.get(tree.root()).visit_count, sims as u32);
    }
}

#[test]
fn test_unvisited_children_taken_in_insertion_order() {
    let mut engine = SearchEngine::with_config(
        UniformEvaluator,
        SearchConfig::for_testing().with_simulations(5),
    );
    let state = GameState::new(3);
    engine.search(&state).unwrap();

    let counts = engine.last_tree().unwrap().root_visit_counts(10);
    assert_eq!(counts, vec![1, 1, 1, 1, 1, 0, 0, 0, 0, 0]);
    assert_eq!(engine.get_best_move(&state).unwrap(), Move::At(0, 0));
}

// =============================================================================
// Action probabilities
// =============================================================================

#[test]
fn test_empty_9x9_scenario() {
    let state = GameState::new(9);
    let mut engine = SearchEngine::new(RolloutEvaluator::with_seed(5), 50, 1.0, false, 0.03, 0.25);

    let probs = engine.search(&state).unwrap();
    assert_eq!(probs.len(), 82);
    assert!((probs.iter().sum::<f64>() - 1.0).abs() < 1e-6);
    assert!(probs.iter().all(|&p| (0.0..=1.0).contains(&p)));
}

#[test]
fn test_occupied_cells_get_zero_probability() {
    let state = play_moves(9, &[Move::At(4, 4), Move::At(2, 6), Move::At(0, 0)]);
    let mut engine = SearchEngine::new(RolloutEvaluator::with_seed(8), 50, 1.0, false, 0.03, 0.25);

    let probs = engine.search(&state).unwrap();
    assert_eq!(probs.len(), 82);
    assert!((probs.iter().sum::<f64>() - 1.0).abs() < 1e-6);
    for mv in [Move::At(4, 4), Move::At(2, 6), Move::At(0, 0)] {
        assert_eq!(probs[state.move_to_index(mv)], 0.0);
    }
}

#[test]
fn test_zero_temperature_is_one_hot_at_most_visited() {
    let state = play_moves(5, &[Move::At(2, 2)]);
    let mut engine = SearchEngine::with_config(
        RolloutEvaluator::with_seed(21),
        SearchConfig::for_testing().with_simulations(80),
    );

    let probs = engine.get_action_probs(&state, 0.0).unwrap();
    let counts = engine.last_tree().unwrap().root_visit_counts(26);
    let max = *counts.iter().max().unwrap();
    let best = counts.iter().position(|&c| c == max).unwrap();

    assert_eq!(probs.iter().filter(|&&p| p == 1.0).count(), 1);
    assert_eq!(probs[best], 1.0);
    assert_eq!(probs.iter().sum::<f64>(), 1.0);
}

#[test]
fn test_positive_temperatures_sum_to_one() {
    let state = GameState::new(5);
    for temperature in [0.1, 0.5, 1.0, 2.0] {
        let mut engine = SearchEngine::with_config(
            RolloutEvaluator::with_seed(4),
            SearchConfig::for_testing().with_simulations(60),
        );
        let probs = engine.get_action_probs(&state, temperature).unwrap();
        assert!(
            (probs.iter().sum::<f64>() - 1.0).abs() < 1e-6,
            "temperature {temperature}"
        );
    }
}

#[test]
fn test_seeded_search_is_reproducible() {
    let state = GameState::new(5);
    let config = SearchConfig::for_testing().with_root_noise(0.3, 0.25);
    let mut a = SearchEngine::with_config(RolloutEvaluator::with_seed(9), config.clone());
    let mut b = SearchEngine::with_config(RolloutEvaluator::with_seed(9), config);

    assert_eq!(a.search(&state).unwrap(), b.search(&state).unwrap());
}

// =============================================================================
// Root noise
// =============================================================================

#[test]
fn test_noise_only_touches_root_priors() {
    let state = GameState::new(3);
    let uniform = 1.0 / 10.0;
    let mut engine = SearchEngine::with_config(
        UniformEvaluator,
        SearchConfig::for_testing()
            .with_simulations(40)
            .with_root_noise(0.3, 0.25),
    );
    engine.search(&state).unwrap();
    let tree = engine.last_tree().unwrap();

    let root = tree.get(tree.root());
    let root_priors: Vec<f64> = root
        .children
        .iter()
        .map(|&(_, id)| tree.get(id).prior_prob)
        .collect();
    assert!((root_priors.iter().sum::<f64>() - 1.0).abs() < 1e-9);
    assert!(root_priors.iter().any(|&p| (p - uniform).abs() > 1e-9));

    let mut descendants_checked = 0;
    for (i, node) in tree.nodes().iter().enumerate() {
        if NodeId(i) == tree.root() {
            continue;
        }
        for &(_, child) in &node.children {
            assert_eq!(tree.get(child).prior_prob, uniform);
            descendants_checked += 1;
        }
    }
    assert!(descendants_checked > 0);
}

#[test]
fn test_no_noise_keeps_evaluator_priors() {
    let mut engine = SearchEngine::with_config(
        UniformEvaluator,
        SearchConfig::for_testing().with_simulations(10),
    );
    engine.search(&GameState::new(3)).unwrap();
    let tree = engine.last_tree().unwrap();
    for &(_, id) in &tree.get(tree.root()).children {
        assert_eq!(tree.get(id).prior_prob, 0.1);
    }
}

// =============================================================================
// Terminal root
// =============================================================================

#[test]
fn test_terminal_root_is_only_evaluated() {
    let state = play_moves(9, &[Move::Pass, Move::Pass]);
    assert!(state.is_terminal());

    let evaluator = CountingEvaluator::default();
    let mut engine = SearchEngine::new(&evaluator, 10, 1.0, false, 0.03, 0.25);
    let mut tree = SearchTree::new(state.clone());
    for _ in 0..10 {
        assert_eq!(engine.simulate(&mut tree).unwrap(), LeafAction::Terminal);
    }

    let root = tree.get(tree.root());
    assert!(!root.expanded);
    assert!(root.children.is_empty());
    assert_eq!(root.visit_count, 10);
    assert_eq!(root.value_sum, 0.0);
    assert_eq!(evaluator.calls.get(), 0);

    let probs = engine.search(&state).unwrap();
    assert_eq!(probs, vec![0.0; 82]);
    assert_eq!(evaluator.calls.get(), 0);
    assert!(matches!(
        engine.get_best_move(&state),
        Err(SearchError::NoVisits)
    ));
}

#[test]
fn test_terminal_root_backs_up_same_outcome() {
    // Black leads by one stone; White is to move at the terminal root
    let state = play_moves(5, &[Move::At(0, 0), Move::Pass, Move::Pass]);
    assert!(state.is_terminal());
    assert_eq!(state.current_player(), Color::White);

    let mut engine = SearchEngine::with_config(
        UniformEvaluator,
        SearchConfig::for_testing().with_simulations(12),
    );
    let tree = engine.run(&state).unwrap();
    let root = tree.get(tree.root());
    assert_eq!(root.visit_count, 12);
    assert_eq!(root.value_sum, -12.0);
}

// =============================================================================
// Evaluator contract
// =============================================================================

#[test]
fn test_out_of_range_value_is_rejected() {
    let mut engine = SearchEngine::with_config(OverconfidentEvaluator, SearchConfig::for_testing());
    let err = engine.search(&GameState::new(3)).unwrap_err();
    assert!(matches!(
        err,
        SearchError::EvaluatorContract(EvaluatorContractError::InvalidValue(v)) if v == 2.0
    ));
}

#[test]
fn test_unnormalized_policy_is_rejected() {
    let mut engine = SearchEngine::with_config(UnnormalizedEvaluator, SearchConfig::for_testing());
    let err = engine.get_best_move(&GameState::new(3)).unwrap_err();
    assert!(matches!(
        err,
        SearchError::EvaluatorContract(EvaluatorContractError::NotNormalized { .. })
    ));
}

#[test]
fn test_shared_evaluator_is_not_consumed() {
    let evaluator = CountingEvaluator::default();
    let state = GameState::new(3);
    {
        let mut engine = SearchEngine::new(&evaluator, 5, 1.0, false, 0.03, 0.25);
        engine.search(&state).unwrap();
    }
    {
        let mut engine = SearchEngine::new(&evaluator, 5, 1.0, false, 0.03, 0.25);
        engine.search(&state).unwrap();
    }
    // One root expansion plus one expansion per simulation, per search
    assert_eq!(evaluator.calls.get(), 12);
}

// =============================================================================
// Player adapter
// =============================================================================

#[test]
fn test_player_moves_are_legal() {
    let config = SearchConfig::for_testing().with_simulations(30);
    let mut player = MctsPlayer::with_config(RolloutEvaluator::with_seed(2), config);
    let mut state = GameState::new(5);

    for _ in 0..6 {
        if state.is_terminal() {
            break;
        }
        let mv = player.get_move(&state).unwrap();
        assert!(state.is_legal(mv));
        state.apply(mv).unwrap();
    }
}

#[test]
fn test_player_distribution_can_be_sampled() {
    let config = SearchConfig::for_testing().with_simulations(30);
    let mut player = MctsPlayer::with_config(RolloutEvaluator::with_seed(6), config);
    let state = play_moves(5, &[Move::At(1, 1)]);

    let probs = player.get_action_probs(&state, 1.0).unwrap();
    let mut rng = ChaCha20Rng::seed_from_u64(0);
    for _ in 0..20 {
        let index = sample_action(&probs, &mut rng).unwrap();
        let mv = state.index_to_move(index).unwrap();
        assert!(state.is_legal(mv));
    }

    let greedy = player.get_action_probs(&state, 0.0).unwrap();
    assert_eq!(greedy.iter().filter(|&&p| p > 0.0).count(), 1);
}
