//! Node/edge selection and the drill-down data derived from it.
//!
//! The state is one of `Idle`, `NodeFocused` or `EdgeFocused`. Selecting the entity that
//! is already focused is a no-op, not a toggle. Focus data is never stored: it is computed
//! from the current selection and a [`FilteredView`] on demand.

use crate::{
    cooccurrence::{EdgeKey, PaperRecord},
    filter::FilteredView,
    normalize::{MethodIdentity, MethodKey},
};
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Selection {
    #[default]
    Idle,
    NodeFocused(MethodKey),
    EdgeFocused(EdgeKey),
}

impl Selection {
    pub fn is_idle(&self) -> bool {
        matches!(self, Selection::Idle)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionState {
    current: Selection,
}

impl SelectionState {
    pub fn current(&self) -> &Selection {
        &self.current
    }

    /// Returns whether the state changed.
    fn transition(&mut self, next: Selection) -> bool {
        if self.current == next {
            return false;
        }
        tracing::debug!("Selection {:?} -> {:?}", self.current, next);
        self.current = next;
        true
    }

    pub fn select_node(&mut self, key: MethodKey) -> bool {
        self.transition(Selection::NodeFocused(key))
    }

    pub fn select_edge(&mut self, key: EdgeKey) -> bool {
        self.transition(Selection::EdgeFocused(key))
    }

    pub fn clear(&mut self) -> bool {
        self.transition(Selection::Idle)
    }

    /// Drill-down data for the current selection, `None` when idle or when the focused
    /// entity is not part of `view`.
    pub fn focus(&self, view: &FilteredView<'_>) -> Option<Focus> {
        focus(&self.current, view)
    }
}

/// An edge leaving the focused node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    pub edge: EdgeKey,
    pub neighbor: MethodIdentity,
    pub weight: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaperSummary {
    pub id: String,
    pub title: String,
    pub year: i32,
    pub citation_count: u32,
    pub authors: Option<String>,
    pub doi: String,
}

impl From<&PaperRecord> for PaperSummary {
    fn from(paper: &PaperRecord) -> Self {
        PaperSummary {
            id: paper.id.to_string(),
            title: paper.title.clone(),
            year: paper.year,
            citation_count: paper.citation_count,
            authors: paper.authors.clone(),
            doi: paper.doi_or_id().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Focus {
    Node {
        method: MethodIdentity,
        occurrences: usize,
        /// Heaviest first, then by neighbor key.
        connections: Vec<Connection>,
    },
    Edge {
        edge: EdgeKey,
        weight: usize,
        /// Most relevant first: recent, then highly cited.
        papers: Vec<PaperSummary>,
    },
}

pub fn focus(selection: &Selection, view: &FilteredView<'_>) -> Option<Focus> {
    match selection {
        Selection::Idle => None,
        Selection::NodeFocused(key) => {
            let node = view.node(key)?;
            let mut connections = view
                .edges_of(key)
                .filter_map(|edge| {
                    let neighbor = edge.key().opposite(key)?;
                    let neighbor = view.node(neighbor)?;
                    Some(Connection {
                        edge: edge.key().clone(),
                        neighbor: neighbor.node.identity.clone(),
                        weight: edge.weight(),
                    })
                })
                .collect::<Vec<_>>();
            connections.sort_by(|a, b| {
                b.weight
                    .cmp(&a.weight)
                    .then_with(|| a.neighbor.key.cmp(&b.neighbor.key))
            });
            Some(Focus::Node {
                method: node.node.identity.clone(),
                occurrences: node.occurrences(),
                connections,
            })
        }
        Selection::EdgeFocused(key) => {
            let edge = view.edge(key)?;
            Some(Focus::Edge {
                edge: key.clone(),
                weight: edge.weight(),
                papers: ranked_papers(edge.papers.iter().filter_map(|id| view.paper(id)))
                    .into_iter()
                    .map(PaperSummary::from)
                    .collect(),
            })
        }
    }
}

/// Sort by relevance descending, ties by paper id.
pub fn ranked_papers<'g, I>(papers: I) -> Vec<&'g PaperRecord>
where
    I: IntoIterator<Item = &'g PaperRecord>,
{
    let mut papers = papers.into_iter().collect::<Vec<_>>();
    papers.sort_by(|a, b| {
        Reverse(a.relevance())
            .cmp(&Reverse(b.relevance()))
            .then_with(|| a.id.cmp(&b.id))
    });
    papers
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        filter::{filter, FilterSpec},
        tests::helpers::{create_test_graph, key},
    };
    use test_log::test;

    #[test]
    fn test_transitions() {
        let (normalizer, _, _) = create_test_graph();
        let (a, b) = (key(&normalizer, "a"), key(&normalizer, "b"));
        let mut state = SelectionState::default();
        assert!(state.current().is_idle());

        assert!(state.select_node(a.clone()));
        assert!(!state.select_node(a.clone()));
        assert_eq!(state.current(), &Selection::NodeFocused(a.clone()));

        let ab = EdgeKey::new(a.clone(), b.clone()).unwrap();
        assert!(state.select_edge(ab.clone()));
        assert!(!state.select_edge(EdgeKey::new(b, a).unwrap()));
        assert_eq!(state.current(), &Selection::EdgeFocused(ab));

        assert!(state.clear());
        assert!(!state.clear());
        assert!(state.current().is_idle());
    }

    #[test]
    fn test_node_focus_lists_connections() {
        let (normalizer, graph, _) = create_test_graph();
        let view = filter(&graph, &FilterSpec::default());
        let mut state = SelectionState::default();
        assert_eq!(state.focus(&view), None);

        state.select_node(key(&normalizer, "a"));
        let Some(Focus::Node {
            method,
            occurrences,
            connections,
        }) = state.focus(&view)
        else {
            panic!("expected node focus");
        };
        assert_eq!(method.key.as_str(), "a");
        assert_eq!(occurrences, 3);
        let neighbours = connections
            .iter()
            .map(|c| (c.neighbor.key.as_str(), c.weight))
            .collect::<Vec<_>>();
        assert_eq!(neighbours, vec![("b", 2), ("c", 1)]);
    }

    #[test]
    fn test_edge_focus_ranks_papers() {
        let (normalizer, graph, _) = create_test_graph();
        let view = filter(&graph, &FilterSpec::default());
        let mut state = SelectionState::default();
        state.select_edge(EdgeKey::new(key(&normalizer, "a"), key(&normalizer, "b")).unwrap());
        let Some(Focus::Edge { weight, papers, .. }) = state.focus(&view) else {
            panic!("expected edge focus");
        };
        assert_eq!(weight, 2);
        let ids = papers.iter().map(|p| p.id.as_str()).collect::<Vec<_>>();
        assert_eq!(ids, vec!["p2", "p1"]);
        assert_eq!(papers[0].year, 2021);
    }

    #[test]
    fn test_focus_outside_view_is_none() {
        let (normalizer, graph, _) = create_test_graph();
        let view = filter(&graph, &FilterSpec::new(["Statistics"], []));
        let mut state = SelectionState::default();
        state.select_node(key(&normalizer, "a"));
        assert_eq!(state.focus(&view), None);
        state.select_edge(EdgeKey::new(key(&normalizer, "a"), key(&normalizer, "b")).unwrap());
        assert_eq!(state.focus(&view), None);
    }
}
