//! Graph construction: normalized per-paper method sets into a [`MethodGraph`].

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::{
    config::{AnalysisConfig, TopicMode},
    cooccurrence::{
        graph::{EdgeKey, MethodGraph, MethodNode},
        record::{PaperId, PaperRecord, PaperRow, RecordRejection, RejectReason},
    },
    normalize::{MethodKey, Normalizer},
};

/// Restricts a build to papers carrying the active topic indices.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicScope {
    pub topics: BTreeSet<u32>,
    pub mode: TopicMode,
}

impl TopicScope {
    pub fn admits(&self, paper: &PaperRecord) -> bool {
        self.topics.is_empty()
            || self
                .mode
                .admits(&self.topics, paper.primary_topic, paper.secondary_topic)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildOptions {
    /// Methods backed by fewer papers are pruned with their edges.
    pub min_papers_per_method: usize,
    pub min_year: Option<i32>,
    pub min_citations: u32,
    pub scope: Option<TopicScope>,
}

impl Default for BuildOptions {
    fn default() -> Self {
        BuildOptions {
            min_papers_per_method: 1,
            min_year: None,
            min_citations: 0,
            scope: None,
        }
    }
}

impl From<&AnalysisConfig> for BuildOptions {
    fn from(config: &AnalysisConfig) -> Self {
        BuildOptions {
            min_papers_per_method: config.min_papers_per_method.max(1),
            min_year: config.min_year,
            min_citations: config.min_citations,
            scope: (!config.topics.is_empty()).then(|| TopicScope {
                topics: config.topic_set(),
                mode: config.topic_mode,
            }),
        }
    }
}

impl BuildOptions {
    fn in_scope(&self, paper: &PaperRecord) -> bool {
        self.min_year.is_none_or(|min| paper.year >= min)
            && paper.citation_count >= self.min_citations
            && self.scope.as_ref().is_none_or(|scope| scope.admits(paper))
    }
}

/// Ingestion totals. `processed == accepted + out_of_scope + rejected.len()`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildReport {
    pub processed: usize,
    pub accepted: usize,
    pub out_of_scope: usize,
    pub rejected: Vec<RecordRejection>,
    pub pruned_methods: Vec<MethodKey>,
}

impl BuildReport {
    pub fn rejected_count(&self) -> usize {
        self.rejected.len()
    }
}

/// Accumulates papers one at a time, then freezes into a [`MethodGraph`].
#[derive(Debug)]
pub struct GraphBuilder<'n> {
    normalizer: &'n Normalizer,
    options: BuildOptions,
    nodes: BTreeMap<MethodKey, MethodNode>,
    pairs: BTreeMap<EdgeKey, BTreeSet<PaperId>>,
    papers: BTreeMap<PaperId, PaperRecord>,
    // every id ingested so far, in scope or not
    seen: BTreeSet<PaperId>,
    report: BuildReport,
}

impl<'n> GraphBuilder<'n> {
    pub fn new(normalizer: &'n Normalizer, options: BuildOptions) -> Self {
        GraphBuilder {
            normalizer,
            options,
            nodes: BTreeMap::new(),
            pairs: BTreeMap::new(),
            papers: BTreeMap::new(),
            seen: BTreeSet::new(),
            report: BuildReport::default(),
        }
    }

    fn reject(&mut self, paper_id: Option<String>, reason: RejectReason) {
        let row = self.report.processed - 1;
        tracing::warn!(
            "Rejected row {row} ({}): {reason}",
            paper_id.as_deref().unwrap_or("no id")
        );
        self.report.rejected.push(RecordRejection {
            row,
            paper_id,
            reason,
        });
    }

    pub fn ingest_row(&mut self, row: PaperRow) {
        let paper_id = row.paper_id();
        match row.into_record() {
            Ok(record) => self.ingest(record),
            Err(reason) => {
                self.report.processed += 1;
                self.reject(paper_id, reason);
            }
        }
    }

    pub fn ingest(&mut self, paper: PaperRecord) {
        self.report.processed += 1;
        if paper.id.as_str().trim().is_empty() {
            self.reject(None, RejectReason::MissingId);
            return;
        }
        if !self.seen.insert(paper.id.clone()) {
            self.reject(Some(paper.id.to_string()), RejectReason::DuplicateId);
            return;
        }
        if !self.options.in_scope(&paper) {
            tracing::debug!("Paper {} is outside the analysis scope", paper.id);
            self.report.out_of_scope += 1;
            return;
        }

        let normalizer = self.normalizer;
        let mut methods = paper
            .methods
            .iter()
            .filter_map(|raw| normalizer.resolve(raw))
            .collect::<Vec<_>>();
        methods.sort_unstable();
        methods.dedup();

        for key in methods.iter() {
            self.nodes
                .entry(key.clone())
                .or_insert_with(|| MethodNode {
                    identity: normalizer.identity(key),
                    papers: BTreeSet::new(),
                })
                .papers
                .insert(paper.id.clone());
        }
        for (i, a) in methods.iter().enumerate() {
            for b in methods[i + 1..].iter() {
                if let Some(pair) = EdgeKey::new(a.clone(), b.clone()) {
                    self.pairs
                        .entry(pair)
                        .or_default()
                        .insert(paper.id.clone());
                }
            }
        }

        self.report.accepted += 1;
        self.papers.insert(paper.id.clone(), paper);
    }

    pub fn finish(mut self) -> (MethodGraph, BuildReport) {
        let min = self.options.min_papers_per_method;
        let pruned = self
            .nodes
            .iter()
            .filter(|(_, node)| node.occurrences() < min)
            .map(|(key, _)| key.clone())
            .collect::<Vec<_>>();
        for key in pruned.iter() {
            self.nodes.remove(key);
        }
        if !pruned.is_empty() {
            tracing::info!(
                "Pruned {} methods appearing in fewer than {min} papers",
                pruned.len()
            );
            self.pairs.retain(|pair, _| {
                let (a, b) = pair.endpoints();
                !pruned.contains(a) && !pruned.contains(b)
            });
        }
        self.report.pruned_methods = pruned;

        let graph = MethodGraph::assemble(self.nodes, self.pairs, self.papers);
        tracing::info!(
            "Built co-occurrence graph: {} methods, {} edges, {} papers ({} processed, {} rejected, {} out of scope)",
            graph.node_count(),
            graph.edge_count(),
            graph.paper_count(),
            self.report.processed,
            self.report.rejected.len(),
            self.report.out_of_scope
        );
        (graph, self.report)
    }
}

/// Build a graph from already-parsed records with default options.
pub fn build<I>(normalizer: &Normalizer, papers: I) -> (MethodGraph, BuildReport)
where
    I: IntoIterator<Item = PaperRecord>,
{
    let mut builder = GraphBuilder::new(normalizer, BuildOptions::default());
    for paper in papers {
        builder.ingest(paper);
    }
    builder.finish()
}

/// Build a graph from wide-format rows, collecting rejections in the report.
pub fn build_from_rows<I>(
    normalizer: &Normalizer,
    rows: I,
    options: BuildOptions,
) -> (MethodGraph, BuildReport)
where
    I: IntoIterator<Item = PaperRow>,
{
    let mut builder = GraphBuilder::new(normalizer, options);
    for row in rows {
        builder.ingest_row(row);
    }
    builder.finish()
}
