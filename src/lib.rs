//! goai-mcts: a Go move selector built on PUCT Monte Carlo Tree Search.
//!
//! The search is driven by a pluggable [`evaluator::Evaluator`] that returns a
//! policy over the action space and a value for the player to move. Rules are
//! kept minimal: any empty cell is legal, and two passes end the game.
//!
//! ## Modules
//!
//! - [`constants`] - Board size and search defaults
//! - [`board`] - Stone colors and the 2D grid
//! - [`game`] - Game state, moves and the action-space mapping
//! - [`evaluator`] - Evaluator trait, contract checks and the uniform strategy
//! - [`playout`] - Random playouts and the rollout evaluator
//! - [`node`] / [`tree`] - Arena-allocated search tree
//! - [`distribution`] - Temperature, Dirichlet noise and sampling
//! - [`mcts`] - The search engine
//! - [`player`] - Player adapter for game loops
//!
//! ## Example
//!
//! ```
//! use goai_mcts::game::GameState;
//! use goai_mcts::mcts::SearchEngine;
//! use goai_mcts::playout::RolloutEvaluator;
//!
//! let state = GameState::new(9);
//! let mut engine = SearchEngine::new(RolloutEvaluator::with_seed(1), 50, 1.0, false, 0.03, 0.25);
//!
//! let probs = engine.search(&state).unwrap();
//! assert_eq!(probs.len(), 82);
//!
//! let best = engine.get_best_move(&state).unwrap();
//! println!("Best move: {best}");
//! ```

pub mod board;
pub mod constants;
pub mod distribution;
pub mod evaluator;
pub mod game;
pub mod mcts;
pub mod node;
pub mod player;
pub mod playout;
pub mod tree;
