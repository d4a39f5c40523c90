//! Circular network plan: which methods are drawn, where on the circle, and which edges
//! connect them.
//!
//! Only positions and emphasis are decided here. Pixel geometry, colours and marker sizes
//! belong to whoever renders the plan.

use crate::{
    config::LayoutConfig,
    cooccurrence::EdgeKey,
    filter::FilteredView,
    normalize::{MethodIdentity, MethodKey},
    selection::Selection,
};
use serde::{Deserialize, Serialize};
use std::{
    collections::{BTreeMap, BTreeSet},
    f64::consts::TAU,
};

const ELLIPSIS: &str = "...";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeEmphasis {
    Focused,
    /// Joined to the focused node by a plotted edge.
    Connected,
    /// A node is focused and this one is unrelated to it.
    Dimmed,
    Normal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotNode {
    pub identity: MethodIdentity,
    pub occurrences: usize,
    /// Radians, `2 * pi * i / n`.
    pub angle: f64,
    pub label: String,
    pub emphasis: NodeEmphasis,
}

impl PlotNode {
    /// Unit circle coordinates.
    pub fn position(&self) -> (f64, f64) {
        (self.angle.cos(), self.angle.sin())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlotEdge {
    pub key: EdgeKey,
    pub weight: usize,
    pub highlighted: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NetworkPlan {
    /// Drawing order, which is also angular order.
    pub nodes: Vec<PlotNode>,
    /// Edge key order.
    pub edges: Vec<PlotEdge>,
    /// Plotted methods per category.
    pub legend: BTreeMap<String, usize>,
}

impl NetworkPlan {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, key: &MethodKey) -> Option<&PlotNode> {
        self.nodes.iter().find(|node| &node.identity.key == key)
    }

    pub fn edge(&self, key: &EdgeKey) -> Option<&PlotEdge> {
        self.edges.iter().find(|edge| &edge.key == key)
    }
}

/// Shorten `text` to at most `width` characters. A cut label ends in `...` when `width`
/// leaves room for it.
pub fn ellipsize(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    if width < ELLIPSIS.len() {
        return text.chars().take(width).collect();
    }
    let keep = width - ELLIPSIS.len();
    let mut label = text.chars().take(keep).collect::<String>();
    label.push_str(ELLIPSIS);
    label
}

/// View methods ranked by surviving occurrences, most frequent first, ties by key.
pub fn top_methods(view: &FilteredView<'_>, n: usize) -> Vec<MethodKey> {
    let mut ranked = view
        .nodes()
        .map(|node| (node.occurrences(), node.key()))
        .collect::<Vec<_>>();
    ranked.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(b.1)));
    ranked
        .into_iter()
        .take(n)
        .map(|(_, key)| key.clone())
        .collect()
}

/// Lay out `view` on a circle.
///
/// When `pinned` is non-empty only pinned methods present in the view are drawn, in pin
/// order; otherwise every view node is drawn in key order. Each drawn method keeps its
/// `max_edges_per_method` heaviest edges of weight at least `min_cooccurrence` to other
/// drawn methods.
pub fn plan(
    view: &FilteredView<'_>,
    pinned: &[MethodKey],
    selection: &Selection,
    config: &LayoutConfig,
) -> NetworkPlan {
    let drawn = if pinned.is_empty() {
        view.nodes().collect::<Vec<_>>()
    } else {
        let mut seen = BTreeSet::new();
        pinned
            .iter()
            .filter(|key| seen.insert(*key))
            .filter_map(|key| view.node(key))
            .collect::<Vec<_>>()
    };
    if drawn.is_empty() {
        return NetworkPlan::default();
    }
    let members = drawn.iter().map(|node| node.key()).collect::<BTreeSet<_>>();

    let mut kept = BTreeMap::new();
    for node in drawn.iter() {
        let mut candidates = view
            .edges_of(node.key())
            .filter(|edge| {
                edge.key()
                    .opposite(node.key())
                    .is_some_and(|other| members.contains(other))
            })
            .filter(|edge| edge.weight() >= config.min_cooccurrence.max(1))
            .collect::<Vec<_>>();
        // stable: equal weights stay in key order
        candidates.sort_by(|a, b| b.weight().cmp(&a.weight()));
        for edge in candidates.into_iter().take(config.max_edges_per_method) {
            kept.insert(edge.key(), edge.weight());
        }
    }

    let focused_node = match selection {
        Selection::NodeFocused(key) if members.contains(key) => Some(key),
        _ => None,
    };
    let focused_edge = match selection {
        Selection::EdgeFocused(key) => Some(key),
        _ => None,
    };

    let edges = kept
        .into_iter()
        .map(|(key, weight)| PlotEdge {
            key: key.clone(),
            weight,
            highlighted: focused_node.is_some_and(|focus| key.touches(focus))
                || focused_edge == Some(key),
        })
        .collect::<Vec<_>>();

    let connected = focused_node
        .map(|focus| {
            edges
                .iter()
                .filter_map(|edge| edge.key.opposite(focus))
                .collect::<BTreeSet<_>>()
        })
        .unwrap_or_default();

    let count = drawn.len() as f64;
    let mut legend = BTreeMap::new();
    let nodes = drawn
        .iter()
        .enumerate()
        .map(|(i, node)| {
            let identity = &node.node.identity;
            *legend.entry(identity.category.clone()).or_insert(0) += 1;
            let emphasis = match focused_node {
                Some(focus) if focus == node.key() => NodeEmphasis::Focused,
                Some(_) if connected.contains(node.key()) => NodeEmphasis::Connected,
                Some(_) => NodeEmphasis::Dimmed,
                None => NodeEmphasis::Normal,
            };
            PlotNode {
                identity: identity.clone(),
                occurrences: node.occurrences(),
                angle: TAU * i as f64 / count,
                label: ellipsize(&identity.shortname, config.label_width),
                emphasis,
            }
        })
        .collect::<Vec<_>>();

    tracing::debug!(
        "Network plan: {} methods, {} edges",
        nodes.len(),
        edges.len()
    );
    NetworkPlan {
        nodes,
        edges,
        legend,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        cooccurrence::{build, PaperRecord},
        filter::{filter, FilterSpec},
        tests::helpers::{create_test_graph, create_test_normalizer, key},
    };
    use test_log::test;

    fn loose() -> LayoutConfig {
        LayoutConfig {
            min_cooccurrence: 1,
            ..Default::default()
        }
    }

    #[test]
    fn test_ellipsize() {
        assert_eq!(ellipsize("short", 18), "short");
        assert_eq!(ellipsize("exactly eighteen!!", 18), "exactly eighteen!!");
        assert_eq!(
            ellipsize("particle swarm optimization", 18),
            "particle swarm ..."
        );
        assert_eq!(ellipsize("abc", 3), "abc");
        assert_eq!(ellipsize("abcd", 3), "...");
        assert_eq!(ellipsize("abc", 2), "ab");
        assert_eq!(ellipsize("abc", 0), "");
    }

    #[test]
    fn test_nodes_are_spaced_on_the_circle() {
        let (_, graph, _) = create_test_graph();
        let view = filter(&graph, &FilterSpec::default());
        let plan = plan(&view, &[], &Selection::Idle, &loose());
        let keys = plan
            .nodes
            .iter()
            .map(|n| n.identity.key.as_str())
            .collect::<Vec<_>>();
        assert_eq!(keys, vec!["a", "b", "c"]);
        assert_eq!(plan.nodes[0].angle, 0.0);
        assert!((plan.nodes[1].angle - TAU / 3.0).abs() < 1e-12);
        let (x, y) = plan.nodes[0].position();
        assert!((x - 1.0).abs() < 1e-12 && y.abs() < 1e-12);
        assert!(plan.nodes.iter().all(|n| n.emphasis == NodeEmphasis::Normal));
        assert_eq!(plan.edges.len(), 2);
        assert_eq!(plan.legend["Optimization"], 2);
    }

    #[test]
    fn test_min_cooccurrence_drops_light_edges() {
        let (_, graph, _) = create_test_graph();
        let view = filter(&graph, &FilterSpec::default());
        let config = LayoutConfig {
            min_cooccurrence: 2,
            ..Default::default()
        };
        let plan = plan(&view, &[], &Selection::Idle, &config);
        assert_eq!(plan.nodes.len(), 3);
        assert_eq!(plan.edges.len(), 1);
        assert_eq!(plan.edges[0].weight, 2);
    }

    #[test]
    fn test_pinned_methods_restrict_and_order() {
        let (normalizer, graph, _) = create_test_graph();
        let view = filter(&graph, &FilterSpec::default());
        let pinned = vec![
            key(&normalizer, "c"),
            key(&normalizer, "zzz"),
            key(&normalizer, "a"),
        ];
        let plan = plan(&view, &pinned, &Selection::Idle, &loose());
        let keys = plan
            .nodes
            .iter()
            .map(|n| n.identity.key.as_str())
            .collect::<Vec<_>>();
        assert_eq!(keys, vec!["c", "a"]);
        assert_eq!(plan.edges.len(), 1);
        assert!((plan.nodes[1].angle - TAU / 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_max_edges_per_method() {
        let normalizer = create_test_normalizer();
        let papers = vec![
            PaperRecord::new("p1", "", 2020, ["hub", "x1", "x2", "x3"]),
            PaperRecord::new("p2", "", 2020, ["hub", "x1", "x2"]),
            PaperRecord::new("p3", "", 2020, ["hub", "x1"]),
        ];
        let (graph, _) = build(&normalizer, papers);
        let view = filter(&graph, &FilterSpec::default());
        let hub = key(&normalizer, "hub");
        let pinned = vec![hub.clone(), key(&normalizer, "x1"), key(&normalizer, "x2"), key(&normalizer, "x3")];
        let config = LayoutConfig {
            min_cooccurrence: 1,
            max_edges_per_method: 1,
            ..Default::default()
        };
        let plan = plan(&view, &pinned, &Selection::Idle, &config);
        // hub keeps hub-x1 (3); x1 keeps hub-x1; x2 keeps hub-x2 (2); x3 keeps hub-x3
        let mut kept = plan
            .edges
            .iter()
            .map(|e| (e.key.opposite(&hub).map(|k| k.as_str().to_string()), e.weight))
            .collect::<Vec<_>>();
        kept.sort();
        assert_eq!(
            kept,
            vec![
                (Some("x1".to_string()), 3),
                (Some("x2".to_string()), 2),
                (Some("x3".to_string()), 1),
            ]
        );
    }

    #[test]
    fn test_focus_sets_emphasis_and_highlights() {
        let (normalizer, graph, _) = create_test_graph();
        let view = filter(&graph, &FilterSpec::default());
        let (a, b, c) = (key(&normalizer, "a"), key(&normalizer, "b"), key(&normalizer, "c"));

        let plan_b = plan(&view, &[], &Selection::NodeFocused(b.clone()), &loose());
        assert_eq!(plan_b.node(&b).unwrap().emphasis, NodeEmphasis::Focused);
        assert_eq!(plan_b.node(&a).unwrap().emphasis, NodeEmphasis::Connected);
        assert_eq!(plan_b.node(&c).unwrap().emphasis, NodeEmphasis::Dimmed);
        let ab = EdgeKey::new(a.clone(), b).unwrap();
        let ac = EdgeKey::new(a, c).unwrap();
        assert!(plan_b.edge(&ab).unwrap().highlighted);
        assert!(!plan_b.edge(&ac).unwrap().highlighted);

        let plan_edge = plan(&view, &[], &Selection::EdgeFocused(ac.clone()), &loose());
        assert!(plan_edge.edge(&ac).unwrap().highlighted);
        assert!(!plan_edge.edge(&ab).unwrap().highlighted);
        assert!(plan_edge
            .nodes
            .iter()
            .all(|n| n.emphasis == NodeEmphasis::Normal));
    }

    #[test]
    fn test_top_methods_and_empty_plan() {
        let (_, graph, _) = create_test_graph();
        let view = filter(&graph, &FilterSpec::default());
        let top = top_methods(&view, 2);
        assert_eq!(
            top.iter().map(MethodKey::as_str).collect::<Vec<_>>(),
            vec!["a", "b"]
        );
        let empty = filter(&graph, &FilterSpec::new(["Nope"], []));
        assert!(plan(&empty, &[], &Selection::Idle, &loose()).is_empty());
    }
}
