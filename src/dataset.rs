//! The per-process, read-only bundle every session shares.

use crate::{
    config::{AnalysisConfig, LayoutConfig, TableSource},
    cooccurrence::{build_from_rows, BuildOptions, BuildReport, GraphBuilder, MethodGraph, PaperRecord, PaperRow},
    error::MethodNetError,
    normalize::Normalizer,
    search::FuzzyMatcher,
};
use std::{collections::BTreeMap, fs::read_to_string, path::Path};

/// Normalization tables, the built graph and the search index for one dataset snapshot.
/// Built once at load and never mutated; wrap it in an `Arc` to share between sessions.
#[derive(Debug, Clone)]
pub struct Dataset {
    normalizer: Normalizer,
    graph: MethodGraph,
    matcher: FuzzyMatcher,
    report: BuildReport,
    topic_names: BTreeMap<u32, String>,
    layout: LayoutConfig,
}

impl Dataset {
    /// Read the tables and papers named by `config`. Any configuration problem aborts the
    /// load; bad paper rows only end up in the report.
    pub fn load(config: &AnalysisConfig) -> Result<Self, MethodNetError> {
        let rows = read_rows(&config.papers)?;
        Dataset::from_rows(&config.table_source(), rows, config)
    }

    pub fn from_rows<S, I>(source: &S, rows: I, config: &AnalysisConfig) -> Result<Self, MethodNetError>
    where
        S: TableSource + ?Sized,
        I: IntoIterator<Item = PaperRow>,
    {
        let tables = source.method_tables()?;
        let normalizer = Normalizer::new(&tables, &config.spelling)?;
        let (graph, report) = build_from_rows(&normalizer, rows, BuildOptions::from(config));
        Ok(Dataset::assemble(normalizer, graph, report, config))
    }

    /// Build from already-parsed records.
    pub fn from_records<I>(normalizer: Normalizer, papers: I, config: &AnalysisConfig) -> Self
    where
        I: IntoIterator<Item = PaperRecord>,
    {
        let mut builder = GraphBuilder::new(&normalizer, BuildOptions::from(config));
        for paper in papers {
            builder.ingest(paper);
        }
        let (graph, report) = builder.finish();
        Dataset::assemble(normalizer, graph, report, config)
    }

    fn assemble(
        normalizer: Normalizer,
        graph: MethodGraph,
        report: BuildReport,
        config: &AnalysisConfig,
    ) -> Self {
        let matcher = FuzzyMatcher::new(&normalizer, graph.method_keys(), config.search.clone());
        Dataset {
            normalizer,
            graph,
            matcher,
            report,
            topic_names: config.topic_names(),
            layout: config.layout.clone(),
        }
    }

    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    pub fn graph(&self) -> &MethodGraph {
        &self.graph
    }

    pub fn matcher(&self) -> &FuzzyMatcher {
        &self.matcher
    }

    pub fn report(&self) -> &BuildReport {
        &self.report
    }

    pub fn layout(&self) -> &LayoutConfig {
        &self.layout
    }

    pub fn topic_names(&self) -> &BTreeMap<u32, String> {
        &self.topic_names
    }

    /// Display label for a topic index, falling back to `Topic <idx>`.
    pub fn topic_label(&self, idx: u32) -> String {
        self.topic_names
            .get(&idx)
            .cloned()
            .unwrap_or_else(|| format!("Topic {idx}"))
    }
}

/// Decode a JSON array of wide-format paper rows.
pub fn read_rows<P: AsRef<Path>>(path: P) -> Result<Vec<PaperRow>, MethodNetError> {
    let path = path.as_ref();
    let content = read_to_string(path)?;
    let rows: Vec<PaperRow> = serde_json::from_str(&content)?;
    tracing::info!("Read {} paper rows from {:?}", rows.len(), path);
    Ok(rows)
}
