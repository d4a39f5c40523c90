//! Session-scoped interaction state over a shared [`Dataset`].
//!
//! A [`Session`] owns the active filter, the pinned method list and the selection for one
//! user. Every query is computed from that state and the shared dataset; nothing derived
//! is cached. Changes can be observed through an unbounded channel of [`SessionEvent`]s,
//! which only fires on real transitions.

use crate::{
    config::TopicMode,
    cooccurrence::EdgeKey,
    dataset::Dataset,
    filter::{filter, FilterSpec, FilteredView},
    layout::{self, NetworkPlan},
    normalize::MethodKey,
    search::SearchHit,
    selection::{ranked_papers, Focus, PaperSummary, Selection, SelectionState},
    trend::{trend, TrendPoint, TrendTarget},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionEvent {
    FilterChanged(FilterSpec),
    SelectionChanged(Selection),
    PinsChanged(Vec<MethodKey>),
}

#[derive(Debug)]
pub struct Session {
    dataset: Arc<Dataset>,
    filter: FilterSpec,
    pinned: Vec<MethodKey>,
    selection: SelectionState,
    events: Option<UnboundedSender<SessionEvent>>,
}

impl Session {
    pub fn new(dataset: Arc<Dataset>) -> Self {
        Session {
            dataset,
            filter: FilterSpec::default(),
            pinned: Vec::new(),
            selection: SelectionState::default(),
            events: None,
        }
    }

    pub fn with_events(mut self, tx: UnboundedSender<SessionEvent>) -> Self {
        self.events = Some(tx);
        self
    }

    /// Replace the event sink with a fresh channel and hand back its receiver.
    pub fn subscribe(&mut self) -> UnboundedReceiver<SessionEvent> {
        let (tx, rx) = unbounded_channel();
        self.events = Some(tx);
        rx
    }

    fn emit(&mut self, event: SessionEvent) {
        let Some(tx) = self.events.as_ref() else {
            return;
        };
        if tx.send(event).is_err() {
            tracing::warn!("Session event receiver dropped, detaching event sink");
            self.events = None;
        }
    }

    pub fn dataset(&self) -> &Arc<Dataset> {
        &self.dataset
    }

    pub fn filter_spec(&self) -> &FilterSpec {
        &self.filter
    }

    pub fn pinned(&self) -> &[MethodKey] {
        &self.pinned
    }

    pub fn selection(&self) -> &Selection {
        self.selection.current()
    }

    /// Resolve a raw method string against the dataset's tables.
    pub fn resolve(&self, raw: &str) -> Option<MethodKey> {
        self.dataset.normalizer().resolve(raw)
    }

    // Filter

    pub fn set_filter(&mut self, spec: FilterSpec) -> bool {
        if self.filter == spec {
            return false;
        }
        tracing::debug!("Filter changed to {:?}", spec);
        self.filter = spec;
        self.emit(SessionEvent::FilterChanged(self.filter.clone()));
        true
    }

    pub fn set_categories<C, S>(&mut self, categories: C) -> bool
    where
        C: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let spec = FilterSpec {
            categories: categories.into_iter().map(Into::into).collect(),
            ..self.filter.clone()
        };
        self.set_filter(spec)
    }

    pub fn set_topics<T: IntoIterator<Item = u32>>(&mut self, topics: T) -> bool {
        let spec = FilterSpec {
            topics: topics.into_iter().collect(),
            ..self.filter.clone()
        };
        self.set_filter(spec)
    }

    pub fn set_topic_mode(&mut self, topic_mode: TopicMode) -> bool {
        let spec = self.filter.clone().with_topic_mode(topic_mode);
        self.set_filter(spec)
    }

    // Pins

    fn set_pins(&mut self, pinned: Vec<MethodKey>) -> bool {
        if self.pinned == pinned {
            return false;
        }
        self.pinned = pinned;
        self.emit(SessionEvent::PinsChanged(self.pinned.clone()));
        true
    }

    /// Pin `key` if absent, unpin it if present. Returns whether it is now pinned.
    pub fn toggle_pin(&mut self, key: MethodKey) -> bool {
        let mut pinned = self.pinned.clone();
        let now_pinned = match pinned.iter().position(|existing| existing == &key) {
            Some(idx) => {
                pinned.remove(idx);
                false
            }
            None => {
                pinned.push(key);
                true
            }
        };
        self.set_pins(pinned);
        now_pinned
    }

    /// Pin the `n` most frequent methods of the current view, replacing existing pins.
    pub fn pin_top_n(&mut self, n: usize) -> bool {
        let top = layout::top_methods(&self.view(), n);
        self.set_pins(top)
    }

    pub fn clear_pins(&mut self) -> bool {
        self.set_pins(Vec::new())
    }

    // Selection

    pub fn select_node(&mut self, key: MethodKey) -> bool {
        let changed = self.selection.select_node(key);
        if changed {
            self.emit(SessionEvent::SelectionChanged(self.selection.current().clone()));
        }
        changed
    }

    pub fn select_edge(&mut self, key: EdgeKey) -> bool {
        let changed = self.selection.select_edge(key);
        if changed {
            self.emit(SessionEvent::SelectionChanged(self.selection.current().clone()));
        }
        changed
    }

    pub fn clear_selection(&mut self) -> bool {
        let changed = self.selection.clear();
        if changed {
            self.emit(SessionEvent::SelectionChanged(Selection::Idle));
        }
        changed
    }

    // Queries

    pub fn view(&self) -> FilteredView<'_> {
        filter(self.dataset.graph(), &self.filter)
    }

    pub fn focus(&self) -> Option<Focus> {
        self.selection.focus(&self.view())
    }

    pub fn trend(&self, target: &TrendTarget) -> Vec<TrendPoint> {
        trend(&self.view(), target)
    }

    /// Trend of whatever is focused, `None` when idle.
    pub fn focus_trend(&self) -> Option<Vec<TrendPoint>> {
        let target = match self.selection.current() {
            Selection::Idle => return None,
            Selection::NodeFocused(key) => TrendTarget::Method(key.clone()),
            Selection::EdgeFocused(key) => TrendTarget::Edge(key.clone()),
        };
        Some(self.trend(&target))
    }

    /// Ranked matches for `query`, at most the configured search limit.
    pub fn search(&self, query: &str) -> Vec<SearchHit> {
        let matcher = self.dataset.matcher();
        matcher.search(query, matcher.config().limit).to_vec()
    }

    pub fn plan(&self) -> NetworkPlan {
        layout::plan(
            &self.view(),
            &self.pinned,
            self.selection.current(),
            self.dataset.layout(),
        )
    }

    /// The `n` most relevant papers behind the focused edge.
    pub fn edge_papers(&self, n: usize) -> Vec<PaperSummary> {
        let Selection::EdgeFocused(key) = self.selection.current() else {
            return Vec::new();
        };
        let view = self.view();
        let Some(edge) = view.edge(key) else {
            return Vec::new();
        };
        ranked_papers(edge.papers.iter().filter_map(|id| view.paper(id)))
            .into_iter()
            .take(n)
            .map(PaperSummary::from)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::AnalysisConfig,
        tests::helpers::{create_test_normalizer, create_test_papers, key},
    };
    use test_log::test;

    fn session() -> Session {
        let config = AnalysisConfig {
            topics: Vec::new(),
            ..Default::default()
        };
        let dataset = Dataset::from_records(create_test_normalizer(), create_test_papers(), &config);
        Session::new(Arc::new(dataset))
    }

    fn drain(rx: &mut UnboundedReceiver<SessionEvent>) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    #[test]
    fn test_events_fire_only_on_transitions() {
        let mut session = session();
        let mut rx = session.subscribe();
        let a = session.resolve("A").unwrap();

        assert!(session.select_node(a.clone()));
        assert!(!session.select_node(a.clone()));
        assert!(session.set_categories(["Optimization"]));
        assert!(!session.set_categories(["Optimization"]));
        assert!(session.clear_selection());
        assert!(!session.clear_selection());

        assert_eq!(
            drain(&mut rx),
            vec![
                SessionEvent::SelectionChanged(Selection::NodeFocused(a)),
                SessionEvent::FilterChanged(FilterSpec::new(["Optimization"], [])),
                SessionEvent::SelectionChanged(Selection::Idle),
            ]
        );
    }

    #[test]
    fn test_closed_receiver_detaches() {
        let mut session = session();
        let rx = session.subscribe();
        drop(rx);
        assert!(session.set_topics([2]));
        assert!(session.events.is_none());
        assert!(session.set_topics([5]));
    }

    #[test]
    fn test_pins() {
        let mut session = session();
        let normalizer = session.dataset().normalizer().clone();
        let (a, c) = (key(&normalizer, "a"), key(&normalizer, "c"));
        assert!(session.toggle_pin(c.clone()));
        assert!(session.toggle_pin(a.clone()));
        assert_eq!(session.pinned(), &[c.clone(), a.clone()]);
        assert!(!session.toggle_pin(c));
        assert_eq!(session.pinned(), &[a]);

        assert!(session.pin_top_n(2));
        let pinned = session.pinned().iter().map(MethodKey::as_str).collect::<Vec<_>>();
        assert_eq!(pinned, vec!["a", "b"]);
        assert!(session.clear_pins());
        assert!(!session.clear_pins());
    }

    #[test]
    fn test_queries_follow_filter_and_selection() {
        let mut session = session();
        let normalizer = session.dataset().normalizer().clone();
        let (a, b) = (key(&normalizer, "a"), key(&normalizer, "b"));
        let ab = EdgeKey::new(a.clone(), b).unwrap();

        assert_eq!(session.focus(), None);
        assert_eq!(session.focus_trend(), None);
        session.select_edge(ab.clone());
        let papers = session.edge_papers(1);
        assert_eq!(papers.len(), 1);
        assert_eq!(papers[0].id, "p2");
        let series = session.focus_trend().unwrap();
        assert_eq!(series.len(), 2);

        session.set_topics([2]);
        let papers = session.edge_papers(5);
        assert_eq!(
            papers.iter().map(|p| p.id.as_str()).collect::<Vec<_>>(),
            vec!["p1"]
        );
        assert!(matches!(session.focus(), Some(Focus::Edge { weight: 1, .. })));

        session.select_node(a);
        assert!(session.edge_papers(5).is_empty());
        assert!(matches!(session.focus(), Some(Focus::Node { occurrences: 2, .. })));
    }

    #[test]
    fn test_search_and_plan() {
        let session = session();
        let hits = session.search("a");
        // below the minimum query length
        assert!(hits.is_empty());
        let plan = session.plan();
        assert_eq!(plan.nodes.len(), 3);
        // default min_cooccurrence is 5
        assert!(plan.edges.is_empty());
    }
}
