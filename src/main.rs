//! goai-mcts: a small driver for the MCTS engine.
//!
//! ## Usage
//!
//! - `goai-mcts` - Run the search demo
//! - `goai-mcts demo` - Search an empty board and show the top candidates
//! - `goai-mcts play` - Let the engine play a game against itself

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

use goai_mcts::board::Color;
use goai_mcts::constants::{C_PUCT, DEFAULT_BOARD_SIZE, DIRICHLET_ALPHA, DIRICHLET_EPSILON};
use goai_mcts::distribution::argmax;
use goai_mcts::evaluator::EvaluatorKind;
use goai_mcts::game::GameState;
use goai_mcts::mcts::{SearchConfig, SearchEngine};
use goai_mcts::player::MctsPlayer;

/// goai-mcts: Go move selection with Monte Carlo Tree Search
#[derive(Parser)]
#[command(name = "goai-mcts")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    opts: SearchOpts,
}

#[derive(clap::Args, Clone)]
struct SearchOpts {
    /// Board size
    #[arg(long, global = true, default_value_t = DEFAULT_BOARD_SIZE)]
    size: usize,

    /// Simulations per move
    #[arg(long, global = true, default_value_t = 200)]
    sims: usize,

    /// RNG seed for reproducible runs
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Evaluator strategy
    #[arg(long, global = true, value_enum, default_value_t = EvaluatorArg::Rollout)]
    evaluator: EvaluatorArg,

    /// Mix Dirichlet noise into the root priors
    #[arg(long, global = true)]
    noise: bool,
}

#[derive(Copy, Clone, ValueEnum)]
enum EvaluatorArg {
    Rollout,
    Uniform,
}

impl From<EvaluatorArg> for EvaluatorKind {
    fn from(arg: EvaluatorArg) -> Self {
        match arg {
            EvaluatorArg::Rollout => EvaluatorKind::Rollout,
            EvaluatorArg::Uniform => EvaluatorKind::Uniform,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Search an empty board and print the best move
    Demo {
        /// Number of candidates to list
        #[arg(long, default_value_t = 5)]
        top: usize,
    },
    /// Play one engine-vs-engine game
    Play {
        /// Stop after this many moves
        #[arg(long, default_value_t = 50)]
        max_moves: usize,
    },
}

impl SearchOpts {
    fn config(&self) -> SearchConfig {
        let mut config = SearchConfig::default()
            .with_simulations(self.sims)
            .with_c_puct(C_PUCT);
        if self.noise {
            config = config.with_root_noise(DIRICHLET_ALPHA, DIRICHLET_EPSILON);
        }
        if let Some(seed) = self.seed {
            config = config.with_seed(seed);
        }
        config
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if cli.opts.size == 0 {
        bail!("board size must be at least 1");
    }

    match cli.command {
        Some(Commands::Play { max_moves }) => run_play(&cli.opts, max_moves),
        Some(Commands::Demo { top }) => run_demo(&cli.opts, top),
        None => run_demo(&cli.opts, 5),
    }
}

fn run_demo(opts: &SearchOpts, top: usize) -> Result<()> {
    let evaluator = EvaluatorKind::from(opts.evaluator).build(opts.seed);
    let mut engine = SearchEngine::with_config(evaluator, opts.config());
    let state = GameState::new(opts.size);

    info!(size = opts.size, sims = opts.sims, "running search on an empty board");
    let probs = engine.search(&state).context("search failed")?;

    let mut ranked: Vec<(usize, f64)> = probs.iter().copied().enumerate().collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
    for (index, p) in ranked.into_iter().take(top) {
        if let Some(mv) = state.index_to_move(index) {
            println!("{:>8}  {:5.1}%", mv.to_string(), p * 100.0);
        }
    }

    let best = argmax(&probs)
        .filter(|&i| probs[i] > 0.0)
        .and_then(|i| state.index_to_move(i))
        .context("search produced no visits")?;
    println!("Best move: {best}");
    if let Some(stats) = engine.last_tree_stats() {
        println!(
            "Tree: {} nodes, depth {}, root value {:.3}",
            stats.total_nodes, stats.max_depth, stats.root_value
        );
    }
    Ok(())
}

fn run_play(opts: &SearchOpts, max_moves: usize) -> Result<()> {
    let evaluator = EvaluatorKind::from(opts.evaluator).build(opts.seed);
    let mut player = MctsPlayer::with_config(evaluator, opts.config());
    let mut state = GameState::new(opts.size);

    for turn in 1..=max_moves {
        if state.is_terminal() {
            break;
        }
        let (mv, _) = player
            .select_move(&state)
            .with_context(|| format!("search failed on move {turn}"))?;
        println!("Move {turn}: {} plays {mv}", state.current_player());
        state
            .apply(mv)
            .with_context(|| format!("engine chose an illegal move {mv}"))?;
        println!("{}\n", state.board());
    }

    if state.is_terminal() {
        println!("Game over (two consecutive passes)");
    } else {
        println!("Stopped after {max_moves} moves");
    }
    println!(
        "Stones: Black {}, White {}",
        state.stone_count(Color::Black),
        state.stone_count(Color::White)
    );
    Ok(())
}
