//! Category/topic filtering of a [`MethodGraph`] into a read-only [`FilteredView`].
//!
//! An empty category set or an empty topic set passes everything, so
//! `FilterSpec::default()` is the identity filter. A view edge survives only if both of
//! its endpoints survive and at least one of its backing papers survives; its weight in
//! the view is the number of surviving backing papers.

use crate::{
    config::TopicMode,
    cooccurrence::{CoEdge, EdgeKey, MethodGraph, MethodNode, PaperId, PaperRecord},
    normalize::MethodKey,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSpec {
    pub categories: BTreeSet<String>,
    pub topics: BTreeSet<u32>,
    pub topic_mode: TopicMode,
}

impl FilterSpec {
    pub fn new<C, S, T>(categories: C, topics: T) -> Self
    where
        C: IntoIterator<Item = S>,
        S: Into<String>,
        T: IntoIterator<Item = u32>,
    {
        FilterSpec {
            categories: categories.into_iter().map(Into::into).collect(),
            topics: topics.into_iter().collect(),
            topic_mode: TopicMode::default(),
        }
    }

    pub fn with_topic_mode(mut self, topic_mode: TopicMode) -> Self {
        self.topic_mode = topic_mode;
        self
    }

    pub fn is_identity(&self) -> bool {
        self.categories.is_empty() && self.topics.is_empty()
    }

    pub fn admits_category(&self, category: &str) -> bool {
        self.categories.is_empty() || self.categories.contains(category)
    }

    pub fn admits_paper(&self, paper: &PaperRecord) -> bool {
        self.topics.is_empty()
            || self
                .topic_mode
                .admits(&self.topics, paper.primary_topic, paper.secondary_topic)
    }
}

/// A surviving node with the subset of its papers that survive the topic filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewNode<'g> {
    pub node: &'g MethodNode,
    pub papers: BTreeSet<&'g PaperId>,
}

impl ViewNode<'_> {
    pub fn key(&self) -> &MethodKey {
        &self.node.identity.key
    }

    pub fn occurrences(&self) -> usize {
        self.papers.len()
    }
}

/// A surviving edge with its surviving backing papers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewEdge<'g> {
    pub edge: &'g CoEdge,
    pub papers: BTreeSet<&'g PaperId>,
}

impl ViewEdge<'_> {
    pub fn key(&self) -> &EdgeKey {
        &self.edge.key
    }

    pub fn weight(&self) -> usize {
        self.papers.len()
    }
}

/// Read-only projection of a graph. Recomputed on every filter change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilteredView<'g> {
    graph: &'g MethodGraph,
    spec: FilterSpec,
    nodes: BTreeMap<&'g MethodKey, ViewNode<'g>>,
    edges: BTreeMap<&'g EdgeKey, ViewEdge<'g>>,
    papers: BTreeMap<&'g PaperId, &'g PaperRecord>,
}

pub fn filter<'g>(graph: &'g MethodGraph, spec: &FilterSpec) -> FilteredView<'g> {
    let papers = graph
        .papers()
        .filter(|paper| spec.admits_paper(paper))
        .map(|paper| (&paper.id, paper))
        .collect::<BTreeMap<_, _>>();

    let nodes = graph
        .nodes()
        .filter(|node| spec.admits_category(&node.identity.category))
        .map(|node| {
            let surviving = node
                .papers
                .iter()
                .filter(|id| papers.contains_key(*id))
                .collect();
            (
                &node.identity.key,
                ViewNode {
                    node,
                    papers: surviving,
                },
            )
        })
        .collect::<BTreeMap<_, _>>();

    let edges = graph
        .edges()
        .filter(|edge| {
            let (a, b) = edge.key.endpoints();
            nodes.contains_key(a) && nodes.contains_key(b)
        })
        .filter_map(|edge| {
            let surviving = edge
                .papers
                .iter()
                .filter(|id| papers.contains_key(*id))
                .collect::<BTreeSet<_>>();
            (!surviving.is_empty()).then_some((
                &edge.key,
                ViewEdge {
                    edge,
                    papers: surviving,
                },
            ))
        })
        .collect::<BTreeMap<_, _>>();

    tracing::debug!(
        "Filtered view: {}/{} methods, {}/{} edges, {}/{} papers",
        nodes.len(),
        graph.node_count(),
        edges.len(),
        graph.edge_count(),
        papers.len(),
        graph.paper_count()
    );

    FilteredView {
        graph,
        spec: spec.clone(),
        nodes,
        edges,
        papers,
    }
}

impl<'g> FilteredView<'g> {
    pub fn graph(&self) -> &'g MethodGraph {
        self.graph
    }

    pub fn spec(&self) -> &FilterSpec {
        &self.spec
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn paper_count(&self) -> usize {
        self.papers.len()
    }

    pub fn node(&self, key: &MethodKey) -> Option<&ViewNode<'g>> {
        self.nodes.get(key)
    }

    pub fn edge(&self, key: &EdgeKey) -> Option<&ViewEdge<'g>> {
        self.edges.get(key)
    }

    pub fn contains_paper(&self, id: &PaperId) -> bool {
        self.papers.contains_key(id)
    }

    pub fn paper(&self, id: &PaperId) -> Option<&'g PaperRecord> {
        self.papers.get(id).copied()
    }

    pub fn nodes(&self) -> impl Iterator<Item = &ViewNode<'g>> {
        self.nodes.values()
    }

    pub fn edges(&self) -> impl Iterator<Item = &ViewEdge<'g>> {
        self.edges.values()
    }

    pub fn papers(&self) -> impl Iterator<Item = &'g PaperRecord> + '_ {
        self.papers.values().copied()
    }

    /// Surviving edges touching `key`, in edge key order.
    pub fn edges_of<'a>(
        &'a self,
        key: &'a MethodKey,
    ) -> impl Iterator<Item = &'a ViewEdge<'g>> + 'a {
        self.edges.values().filter(move |edge| edge.key().touches(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::helpers::{create_test_graph, key};
    use test_log::test;

    fn counts(view: &FilteredView<'_>) -> (usize, usize, usize) {
        (view.node_count(), view.edge_count(), view.paper_count())
    }

    #[test]
    fn test_empty_filter_is_identity() {
        let (_, graph, _) = create_test_graph();
        let view = filter(&graph, &FilterSpec::default());
        assert!(view.spec().is_identity());
        assert_eq!(counts(&view), (3, 2, 3));
        for edge in graph.edges() {
            let view_edge = view.edge(&edge.key).unwrap();
            assert_eq!(view_edge.weight(), edge.weight());
        }
        for node in graph.nodes() {
            assert_eq!(view.node(&node.identity.key).unwrap().occurrences(), node.occurrences());
        }
    }

    #[test]
    fn test_category_filter_drops_nodes_and_their_edges() {
        let (normalizer, graph, _) = create_test_graph();
        let view = filter(&graph, &FilterSpec::new(["Optimization"], []));
        assert_eq!(counts(&view), (2, 1, 3));
        assert!(view.node(&key(&normalizer, "b")).is_none());
        let ac = EdgeKey::new(key(&normalizer, "a"), key(&normalizer, "c")).unwrap();
        assert_eq!(view.edge(&ac).unwrap().weight(), 1);
    }

    #[test]
    fn test_topic_filter_drops_unevidenced_edges() {
        let (normalizer, graph, _) = create_test_graph();
        // only p2 has topic 5 or 7
        let view = filter(&graph, &FilterSpec::new(Vec::<String>::new(), [7]));
        assert_eq!(counts(&view), (3, 1, 1));
        let ab = EdgeKey::new(key(&normalizer, "a"), key(&normalizer, "b")).unwrap();
        assert_eq!(view.edge(&ab).unwrap().weight(), 1);
        let ac = EdgeKey::new(key(&normalizer, "a"), key(&normalizer, "c")).unwrap();
        assert!(view.edge(&ac).is_none());
        // node survives on category, with no surviving papers
        assert_eq!(view.node(&key(&normalizer, "c")).unwrap().occurrences(), 0);
    }

    #[test]
    fn test_topic_mode_primary_ignores_secondary() {
        let (_, graph, _) = create_test_graph();
        let any = filter(&graph, &FilterSpec::new(Vec::<String>::new(), [7]));
        let primary = filter(
            &graph,
            &FilterSpec::new(Vec::<String>::new(), [7]).with_topic_mode(TopicMode::Primary),
        );
        assert_eq!(any.paper_count(), 1);
        assert_eq!(primary.paper_count(), 0);
        assert_eq!(primary.edge_count(), 0);
    }

    #[test]
    fn test_narrowing_never_grows_the_view() {
        let (_, graph, _) = create_test_graph();
        let specs = [
            FilterSpec::default(),
            FilterSpec::new(["Optimization", "Statistics"], []),
            FilterSpec::new(["Optimization", "Statistics"], [2, 5]),
            FilterSpec::new(["Optimization"], [2, 5]),
            FilterSpec::new(["Optimization"], [5]),
        ];
        let views = specs.iter().map(|spec| filter(&graph, spec)).collect::<Vec<_>>();
        for pair in views.windows(2) {
            let (wide, narrow) = (counts(&pair[0]), counts(&pair[1]));
            assert!(narrow.0 <= wide.0);
            assert!(narrow.1 <= wide.1);
            assert!(narrow.2 <= wide.2);
        }
    }

    #[test]
    fn test_unknown_values_yield_empty_view() {
        let (_, graph, _) = create_test_graph();
        assert_eq!(counts(&filter(&graph, &FilterSpec::new(["Nope"], []))), (0, 0, 3));
        assert_eq!(
            counts(&filter(&graph, &FilterSpec::new(Vec::<String>::new(), [99]))),
            (3, 0, 0)
        );
    }

    #[test]
    fn test_filter_is_pure() {
        let (_, graph, _) = create_test_graph();
        let before = graph.clone();
        let spec = FilterSpec::new(["Statistics"], [2]);
        assert_eq!(filter(&graph, &spec), filter(&graph, &spec));
        assert_eq!(graph, before);
    }
}
