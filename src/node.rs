//! Search tree node representation.
//!
//! Each node owns its own copy of the game state and the statistics used by
//! PUCT selection. Nodes live in the arena of [`crate::tree::SearchTree`] and
//! refer to each other by [`NodeId`].

use crate::game::{GameState, Move};

/// Index into the node arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

/// A node in the search tree.
#[derive(Debug, Clone)]
pub struct SearchNode {
    /// Game state at this node (independent copy)
    pub state: GameState,
    /// Parent node, `None` for the root
    pub parent: Option<NodeId>,
    /// Move that led here from the parent, `None` for the root
    pub mv: Option<Move>,
    /// Children in insertion order
    pub children: Vec<(Move, NodeId)>,
    /// Number of backups through this node
    pub visit_count: u32,
    /// Sum of backed-up values, from the perspective of the player to move here
    pub value_sum: f64,
    /// Prior probability P(s,a) assigned by the parent's evaluation
    pub prior_prob: f64,
    /// Whether `expand` has run on this node
    pub expanded: bool,
}

impl SearchNode {
    /// Create a root node for `state`.
    pub fn new_root(state: GameState) -> Self {
        Self {
            state,
            parent: None,
            mv: None,
            children: Vec::new(),
            visit_count: 0,
            value_sum: 0.0,
            prior_prob: 1.0,
            expanded: false,
        }
    }

    /// Create a child reached from `parent` by `mv`.
    pub fn new_child(parent: NodeId, mv: Move, state: GameState, prior_prob: f64) -> Self {
        Self {
            state,
            parent: Some(parent),
            mv: Some(mv),
            children: Vec::new(),
            visit_count: 0,
            value_sum: 0.0,
            prior_prob,
            expanded: false,
        }
    }

    /// Average backed-up value. Returns 0.0 if never visited.
    #[inline]
    pub fn mean_value(&self) -> f64 {
        if self.visit_count == 0 {
            0.0
        } else {
            self.value_sum / self.visit_count as f64
        }
    }

    /// PUCT score of this node as a child of a parent with `parent_visits_sqrt`.
    ///
    /// `Q + c_puct * P * sqrt(N_parent) / (1 + N)`, or `+inf` if unvisited.
    ///
    /// `Q` is this node's own mean value, stored for the player to move here
    /// (the parent's opponent). It is not negated.
    #[inline]
    pub fn puct_score(&self, parent_visits_sqrt: f64, c_puct: f64) -> f64 {
        if self.visit_count == 0 {
            return f64::INFINITY;
        }
        let u = c_puct * self.prior_prob * parent_visits_sqrt / (1.0 + self.visit_count as f64);
        self.mean_value() + u
    }

    #[inline]
    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    /// Child reached by `mv`, if that move has been expanded.
    pub fn child(&self, mv: Move) -> Option<NodeId> {
        self.children
            .iter()
            .find(|(m, _)| *m == mv)
            .map(|(_, id)| *id)
    }
}
