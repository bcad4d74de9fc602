//! # Sparse Transition Lattice
//!
//! An arena of states with per-position index lists. Nodes are created on
//! demand while the decoder expands positions left to right; each edge
//! consumes exactly one LM character.
//!
//! Viterbi scores and forward log-sums are maintained as edges are added.
//! Every edge runs from a node expanded earlier to a node expanded later,
//! so a node's incoming edges are complete before it is expanded, and a
//! walk over edges in reverse creation order is a valid backward order.

use core::cmp::Ordering;

use crate::{
    glyph::GlyphType,
    lattice::TransitionState,
    types::{CharId, CommonHashMap, LanguageId},
    utility::log_add,
};

/// Index of a node in the arena.
pub type NodeId = usize;

/// Index of an edge in the arena.
pub type EdgeId = usize;

/// The identity of a lattice state at a pixel position.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StateKey {
    /// The language of the last LM character.
    pub language: Option<LanguageId>,

    /// The language-model context, oldest first.
    pub context: Vec<CharId>,

    /// The type of the last glyph.
    pub prev_glyph_type: GlyphType,

    /// The last LM character.
    pub prev_lm_char: Option<CharId>,

    /// The number of elided glyphs ending here.
    pub elision_run: usize,
}

impl StateKey {
    /// The line-start state.
    pub fn line_start() -> Self {
        Self {
            language: None,
            context: Vec::new(),
            prev_glyph_type: GlyphType::Normal,
            prev_lm_char: None,
            elision_run: 0,
        }
    }
}

/// A lattice state.
#[derive(Debug, Clone)]
pub struct Node {
    /// The state identity.
    pub key: StateKey,

    /// The pixel position.
    pub position: usize,

    /// Best log score of a path from the line start.
    pub viterbi: f64,

    /// The incoming edge of the best path.
    pub best_edge: Option<EdgeId>,

    /// Log-sum of all paths from the line start.
    pub forward: f64,

    /// Removed by beam pruning; never expanded.
    pub pruned: bool,
}

/// A scored transition.
#[derive(Debug, Clone)]
pub struct Edge {
    /// The source node.
    pub from: NodeId,

    /// The target node.
    pub to: NodeId,

    /// The decoded step; `position` is the glyph's first column.
    pub state: TransitionState,

    /// The glyph width.
    pub width: usize,

    /// The transition log score.
    pub score: f64,
}

/// The lattice of one line.
#[derive(Debug)]
pub struct SparseLattice {
    width: usize,
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    positions: Vec<Vec<NodeId>>,
    index: CommonHashMap<(usize, StateKey), NodeId>,
}

impl SparseLattice {
    /// Create a lattice over `width` pixel columns holding the line-start node.
    pub fn new(width: usize) -> Self {
        let mut lattice = Self {
            width,
            nodes: Vec::new(),
            edges: Vec::new(),
            positions: vec![Vec::new(); width + 1],
            index: CommonHashMap::new(),
        };
        let start = lattice.node_at(0, StateKey::line_start());
        lattice.nodes[start].viterbi = 0.0;
        lattice.nodes[start].forward = 0.0;
        lattice
    }

    /// The line width.
    pub fn width(&self) -> usize {
        self.width
    }

    /// The line-start node.
    pub fn start(&self) -> NodeId {
        0
    }

    /// A node.
    pub fn node(
        &self,
        id: NodeId,
    ) -> &Node {
        &self.nodes[id]
    }

    /// The number of nodes.
    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// All edges, in creation order.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// The nodes at `position`, in creation order.
    pub fn nodes_at(
        &self,
        position: usize,
    ) -> &[NodeId] {
        &self.positions[position]
    }

    fn node_at(
        &mut self,
        position: usize,
        key: StateKey,
    ) -> NodeId {
        if let Some(&id) = self.index.get(&(position, key.clone())) {
            return id;
        }
        let id = self.nodes.len();
        self.nodes.push(Node {
            key: key.clone(),
            position,
            viterbi: f64::NEG_INFINITY,
            best_edge: None,
            forward: f64::NEG_INFINITY,
            pruned: false,
        });
        self.positions[position].push(id);
        self.index.insert((position, key), id);
        id
    }

    /// Add a transition from `from` to the state `key` at `from.position + width`.
    ///
    /// The target's Viterbi score keeps the better path; on equal scores
    /// the path that keeps the language unchanged wins, then the lower
    /// `lm_char`, then the lower predecessor id, then the earlier edge.
    pub fn add_edge(
        &mut self,
        from: NodeId,
        key: StateKey,
        state: TransitionState,
        width: usize,
        score: f64,
    ) -> EdgeId {
        let position = self.nodes[from].position + width;
        let to = self.node_at(position, key);

        let edge_id = self.edges.len();
        self.edges.push(Edge {
            from,
            to,
            state,
            width,
            score,
        });

        let source = &self.nodes[from];
        let candidate = source.viterbi + score;
        let forward = source.forward + score;

        let replace = match self.nodes[to].best_edge {
            None => true,
            Some(best) => {
                self.compare_paths(candidate, edge_id, self.nodes[to].viterbi, best)
                    == Ordering::Greater
            }
        };

        let target = &mut self.nodes[to];
        target.forward = log_add(target.forward, forward);
        if replace {
            target.viterbi = candidate;
            target.best_edge = Some(edge_id);
        }
        edge_id
    }

    /// Order two incoming paths of the same node; `Greater` is preferred.
    fn compare_paths(
        &self,
        a_score: f64,
        a_edge: EdgeId,
        b_score: f64,
        b_edge: EdgeId,
    ) -> Ordering {
        let keeps_language = |edge: EdgeId| {
            let edge = &self.edges[edge];
            self.nodes[edge.from].key.language == edge.state.language
        };
        let a = &self.edges[a_edge];
        let b = &self.edges[b_edge];

        a_score
            .total_cmp(&b_score)
            .then_with(|| keeps_language(a_edge).cmp(&keeps_language(b_edge)))
            .then_with(|| b.state.lm_char.cmp(&a.state.lm_char))
            .then_with(|| b.from.cmp(&a.from))
            .then_with(|| b_edge.cmp(&a_edge))
    }

    /// Prune `layer` to the `beam_width` best nodes by Viterbi score, then id.
    pub fn prune(
        &mut self,
        layer: &[NodeId],
        beam_width: usize,
    ) {
        if layer.len() <= beam_width {
            return;
        }
        let mut ranked = layer.to_vec();
        ranked.sort_by(|&a, &b| {
            self.nodes[b]
                .viterbi
                .total_cmp(&self.nodes[a].viterbi)
                .then(a.cmp(&b))
        });
        for &id in &ranked[beam_width..] {
            self.nodes[id].pruned = true;
        }
    }

    /// Unpruned nodes at the final position reached by some path.
    pub fn terminals(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.positions[self.width].iter().copied().filter(|&id| {
            let node = &self.nodes[id];
            !node.pruned && (node.best_edge.is_some() || id == self.start())
        })
    }

    /// The terminal node with the best Viterbi score.
    ///
    /// Ties between terminals break on their best incoming edges with the
    /// same order as [`Self::add_edge`], then the lower node id.
    pub fn best_terminal(&self) -> Option<NodeId> {
        self.terminals()
            .filter(|&id| self.nodes[id].viterbi.is_finite())
            .fold(None, |best: Option<NodeId>, id| match best {
                Some(b) if self.compare_terminals(b, id) != Ordering::Less => Some(b),
                _ => Some(id),
            })
    }

    /// Order two terminals; `Greater` is preferred.
    fn compare_terminals(
        &self,
        a: NodeId,
        b: NodeId,
    ) -> Ordering {
        let (node_a, node_b) = (&self.nodes[a], &self.nodes[b]);
        let by_path = match (node_a.best_edge, node_b.best_edge) {
            (Some(edge_a), Some(edge_b)) => {
                self.compare_paths(node_a.viterbi, edge_a, node_b.viterbi, edge_b)
            }
            _ => node_a.viterbi.total_cmp(&node_b.viterbi),
        };
        by_path.then_with(|| b.cmp(&a))
    }

    /// The edges of the best path into `node`, left to right.
    pub fn backtrack(
        &self,
        node: NodeId,
    ) -> Vec<&Edge> {
        let mut path = Vec::new();
        let mut current = node;
        while let Some(edge) = self.nodes[current].best_edge {
            let edge = &self.edges[edge];
            path.push(edge);
            current = edge.from;
        }
        path.reverse();
        path
    }

    /// The log-sum over all complete paths.
    pub fn log_partition(&self) -> f64 {
        self.terminals()
            .map(|id| self.nodes[id].forward)
            .fold(f64::NEG_INFINITY, log_add)
    }

    /// Log-sum of all path suffixes from each node to the line end.
    pub fn backward(&self) -> Vec<f64> {
        let mut backward = vec![f64::NEG_INFINITY; self.nodes.len()];
        for id in self.terminals() {
            backward[id] = 0.0;
        }
        for edge in self.edges.iter().rev() {
            backward[edge.from] = log_add(backward[edge.from], edge.score + backward[edge.to]);
        }
        backward
    }
}
