//! Search tree with arena allocation.
//!
//! Nodes are stored in a contiguous `Vec` and referenced by [`NodeId`]. The
//! root is always `NodeId(0)`. Parent links are plain indices, so the tree
//! has a single owner and is dropped in one piece after each decision.

use crate::game::{GameState, Move};
use crate::node::{NodeId, SearchNode};

/// Search tree with arena-based node storage.
#[derive(Debug, Clone)]
pub struct SearchTree {
    nodes: Vec<SearchNode>,
}

/// Summary of a finished search tree.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeStats {
    pub total_nodes: usize,
    pub root_visits: u32,
    pub root_value: f64,
    pub max_depth: usize,
}

impl SearchTree {
    /// Create a tree whose root owns `state`.
    pub fn new(state: GameState) -> Self {
        Self {
            nodes: vec![SearchNode::new_root(state)],
        }
    }

    #[inline]
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    #[inline]
    pub fn get(&self, id: NodeId) -> &SearchNode {
        &self.nodes[id.0]
    }

    #[inline]
    pub fn get_mut(&mut self, id: NodeId) -> &mut SearchNode {
        &mut self.nodes[id.0]
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All nodes in allocation order.
    pub fn nodes(&self) -> &[SearchNode] {
        &self.nodes
    }

    /// Select the child of `node_id` with the highest PUCT score.
    ///
    /// Unvisited children score `+inf`. Ties go to the earliest inserted child.
    pub fn select_child(&self, node_id: NodeId, c_puct: f64) -> Option<NodeId> {
        let node = self.get(node_id);
        let parent_visits_sqrt = (node.visit_count as f64).sqrt();

        let mut best: Option<(f64, NodeId)> = None;
        for &(_, child_id) in &node.children {
            let score = self.get(child_id).puct_score(parent_visits_sqrt, c_puct);
            match best {
                Some((best_score, _)) if score <= best_score => {}
                _ => best = Some((score, child_id)),
            }
        }
        best.map(|(_, id)| id)
    }

    /// Expand `node_id` with one child per legal move.
    ///
    /// Each child gets its own copy of the state with the move applied, and
    /// prior `policy[index(move)]`, or 0.0 when the index is out of range.
    pub fn expand(&mut self, node_id: NodeId, legal_moves: &[Move], policy: &[f64]) {
        let parent_state = self.get(node_id).state.clone();
        let n = parent_state.size();

        for &mv in legal_moves {
            let mut child_state = parent_state.clone();
            if child_state.apply(mv).is_err() {
                continue;
            }
            let prior = policy.get(mv.to_index(n)).copied().unwrap_or(0.0);
            let child_id = NodeId(self.nodes.len());
            self.nodes
                .push(SearchNode::new_child(node_id, mv, child_state, prior));
            self.get_mut(node_id).children.push((mv, child_id));
        }

        self.get_mut(node_id).expanded = true;
    }

    /// Backpropagate `value` from `leaf_id` to the root.
    ///
    /// The value is negated at each level (opponent's perspective).
    pub fn backup(&mut self, leaf_id: NodeId, value: f64) {
        let mut current = Some(leaf_id);
        let mut value = value;

        while let Some(id) = current {
            let node = self.get_mut(id);
            node.visit_count += 1;
            node.value_sum += value;
            value = -value;
            current = node.parent;
        }
    }

    /// Visit count of each root child, indexed by action. Unexpanded moves are 0.
    pub fn root_visit_counts(&self, action_size: usize) -> Vec<u32> {
        let root = self.get(self.root());
        let n = root.state.size();
        let mut counts = vec![0; action_size];
        for &(mv, child_id) in &root.children {
            if let Some(slot) = counts.get_mut(mv.to_index(n)) {
                *slot = self.get(child_id).visit_count;
            }
        }
        counts
    }

    /// Number of edges between `node_id` and the root.
    pub fn depth(&self, node_id: NodeId) -> usize {
        let mut depth = 0;
        let mut current = self.get(node_id).parent;
        while let Some(id) = current {
            depth += 1;
            current = self.get(id).parent;
        }
        depth
    }

    pub fn stats(&self) -> TreeStats {
        let root = self.get(self.root());
        TreeStats {
            total_nodes: self.nodes.len(),
            root_visits: root.visit_count,
            root_value: root.mean_value(),
            max_depth: (0..self.nodes.len())
                .map(|i| self.depth(NodeId(i)))
                .max()
                .unwrap_or(0),
        }
    }
}
