//! Shared test utilities for graph, filter and session tests

use crate::{
    config::MethodTables,
    cooccurrence::{build, BuildReport, MethodGraph, PaperRecord},
    normalize::{MethodKey, Normalizer},
};

/// Initialize logging for tests
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init()
        .ok();
}

/// Method tables with one alias family and categories for `a`, `b` and `c`.
pub fn create_test_tables() -> MethodTables {
    let mut tables = MethodTables::default();
    tables.variants.insert(
        "monte carlo simulation".to_string(),
        vec!["monte carlo".to_string(), "mcs".to_string()],
    );
    for (method, category) in [("a", "Optimization"), ("b", "Statistics"), ("c", "Optimization")] {
        tables
            .categories
            .insert(method.to_string(), category.to_string());
    }
    tables
        .categories
        .insert("monte carlo simulation".to_string(), "Probabilistic".to_string());
    tables
        .shortnames
        .insert("monte carlo simulation".to_string(), "MCS".to_string());
    tables
}

pub fn create_test_normalizer() -> Normalizer {
    init_logging();
    Normalizer::from_tables(&create_test_tables()).unwrap()
}

/// P1={A,B} 2020 topic 2, P2={A,B} 2021 topic 5, P3={A,C} 2020 topic 2
pub fn create_test_papers() -> Vec<PaperRecord> {
    vec![
        PaperRecord::new("p1", "Paper one", 2020, ["A", "B"])
            .with_topics(Some(2), None)
            .with_citations(10),
        PaperRecord::new("p2", "Paper two", 2021, ["a", "B", "b"])
            .with_topics(Some(5), Some(7))
            .with_citations(3),
        PaperRecord::new("p3", "Paper three", 2020, ["A", "", "C"])
            .with_topics(Some(2), None)
            .with_citations(50),
    ]
}

pub fn create_test_graph() -> (Normalizer, MethodGraph, BuildReport) {
    let normalizer = create_test_normalizer();
    let (graph, report) = build(&normalizer, create_test_papers());
    (normalizer, graph, report)
}

pub fn key(normalizer: &Normalizer, raw: &str) -> MethodKey {
    normalizer.resolve(raw).unwrap()
}
