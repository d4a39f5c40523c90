//! The weighted method co-occurrence graph.
//!
//! - [`MethodGraph`]: undirected petgraph graph of [`MethodNode`]s joined by [`CoEdge`]s,
//!   plus the paper records backing them
//! - [`EdgeKey`]: the unordered method pair identifying an edge

use crate::{
    cooccurrence::record::{PaperId, PaperRecord},
    normalize::{MethodIdentity, MethodKey},
};
use petgraph::{
    graph::{EdgeIndex, NodeIndex, UnGraph},
    visit::EdgeRef,
};
use serde::{Deserialize, Serialize};
use std::{
    collections::{BTreeMap, BTreeSet},
    fmt,
};

/// Unordered pair of distinct methods. `(a, b)` and `(b, a)` build the same key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EdgeKey {
    low: MethodKey,
    high: MethodKey,
}

impl EdgeKey {
    /// `None` for a self pair.
    pub fn new(a: MethodKey, b: MethodKey) -> Option<Self> {
        match a.cmp(&b) {
            std::cmp::Ordering::Less => Some(EdgeKey { low: a, high: b }),
            std::cmp::Ordering::Greater => Some(EdgeKey { low: b, high: a }),
            std::cmp::Ordering::Equal => None,
        }
    }

    pub fn endpoints(&self) -> (&MethodKey, &MethodKey) {
        (&self.low, &self.high)
    }

    pub fn touches(&self, key: &MethodKey) -> bool {
        &self.low == key || &self.high == key
    }

    /// The endpoint across from `key`, if `key` is an endpoint.
    pub fn opposite(&self, key: &MethodKey) -> Option<&MethodKey> {
        if &self.low == key {
            Some(&self.high)
        } else if &self.high == key {
            Some(&self.low)
        } else {
            None
        }
    }
}

impl fmt::Display for EdgeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <-> {}", self.low, self.high)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodNode {
    pub identity: MethodIdentity,
    pub papers: BTreeSet<PaperId>,
}

impl MethodNode {
    /// Number of distinct papers mentioning the method.
    pub fn occurrences(&self) -> usize {
        self.papers.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoEdge {
    pub key: EdgeKey,
    pub papers: BTreeSet<PaperId>,
}

impl CoEdge {
    /// Number of papers in which both endpoints appear.
    pub fn weight(&self) -> usize {
        self.papers.len()
    }
}

/// Frozen result of a build. Never mutated once constructed; derived views borrow it.
#[derive(Debug, Clone, Default)]
pub struct MethodGraph {
    graph: UnGraph<MethodNode, CoEdge>,
    nodes: BTreeMap<MethodKey, NodeIndex>,
    edges: BTreeMap<EdgeKey, EdgeIndex>,
    papers: BTreeMap<PaperId, PaperRecord>,
}

impl MethodGraph {
    /// Assemble from accumulated nodes and edges. Nodes and edges are inserted in key
    /// order so equal inputs give equal petgraph indices. Edges whose endpoints are
    /// missing from `nodes` are skipped.
    pub(crate) fn assemble(
        nodes: BTreeMap<MethodKey, MethodNode>,
        edges: BTreeMap<EdgeKey, BTreeSet<PaperId>>,
        papers: BTreeMap<PaperId, PaperRecord>,
    ) -> Self {
        let mut graph = UnGraph::with_capacity(nodes.len(), edges.len());
        let mut node_index = BTreeMap::new();
        for (key, node) in nodes {
            let idx = graph.add_node(node);
            node_index.insert(key, idx);
        }

        let mut edge_index = BTreeMap::new();
        for (key, edge_papers) in edges {
            if edge_papers.is_empty() {
                continue;
            }
            let (a, b) = key.endpoints();
            let (Some(&a_idx), Some(&b_idx)) = (node_index.get(a), node_index.get(b)) else {
                continue;
            };
            let idx = graph.add_edge(
                a_idx,
                b_idx,
                CoEdge {
                    key: key.clone(),
                    papers: edge_papers,
                },
            );
            edge_index.insert(key, idx);
        }

        MethodGraph {
            graph,
            nodes: node_index,
            edges: edge_index,
            papers,
        }
    }

    pub fn as_graph(&self) -> &UnGraph<MethodNode, CoEdge> {
        &self.graph
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn paper_count(&self) -> usize {
        self.papers.len()
    }

    pub fn node(&self, key: &MethodKey) -> Option<&MethodNode> {
        self.nodes.get(key).map(|idx| &self.graph[*idx])
    }

    pub fn edge(&self, key: &EdgeKey) -> Option<&CoEdge> {
        self.edges.get(key).map(|idx| &self.graph[*idx])
    }

    pub fn edge_between(&self, a: &MethodKey, b: &MethodKey) -> Option<&CoEdge> {
        EdgeKey::new(a.clone(), b.clone()).and_then(|key| self.edge(&key))
    }

    /// Edge weight, zero when the pair never co-occurs.
    pub fn weight(&self, a: &MethodKey, b: &MethodKey) -> usize {
        self.edge_between(a, b).map(CoEdge::weight).unwrap_or(0)
    }

    /// Nodes in key order.
    pub fn nodes(&self) -> impl Iterator<Item = &MethodNode> {
        self.nodes.values().map(|idx| &self.graph[*idx])
    }

    /// Edges in key order.
    pub fn edges(&self) -> impl Iterator<Item = &CoEdge> {
        self.edges.values().map(|idx| &self.graph[*idx])
    }

    pub fn method_keys(&self) -> impl Iterator<Item = &MethodKey> {
        self.nodes.keys()
    }

    /// Edges touching `key`.
    pub fn incident_edges<'a>(&'a self, key: &MethodKey) -> impl Iterator<Item = &'a CoEdge> + 'a {
        let start = self.nodes.get(key).copied();
        start
            .into_iter()
            .flat_map(move |idx| self.graph.edges(idx).map(|edge| edge.weight()))
    }

    pub fn paper(&self, id: &PaperId) -> Option<&PaperRecord> {
        self.papers.get(id)
    }

    pub fn papers(&self) -> impl Iterator<Item = &PaperRecord> {
        self.papers.values()
    }

    pub fn categories(&self) -> BTreeSet<&str> {
        self.nodes()
            .map(|node| node.identity.category.as_str())
            .collect()
    }
}

impl PartialEq for MethodGraph {
    fn eq(&self, other: &Self) -> bool {
        self.nodes().eq(other.nodes())
            && self.edges().eq(other.edges())
            && self.papers == other.papers
    }
}

impl Eq for MethodGraph {}
