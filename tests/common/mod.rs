//! Shared test utilities for integration tests.
//!
//! Import from integration test files as:
//! ```ignore
//! mod common;
//! ```

use serde_json::json;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Initialize tracing for tests, respecting RUST_LOG env var.
///
/// Safe to call multiple times. Later calls are no-ops.
#[allow(dead_code)]
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init()
        .ok();
}

/// Write the three method tables into `<temp_dir>/config/`.
///
/// `monte carlo simulation` owns the aliases `mcs` and `monte carlo`; the genetic
/// algorithm family includes the UK spelling of its category-bearing variant.
#[allow(dead_code)]
pub fn write_method_tables(temp_dir: &TempDir) -> PathBuf {
    let config_dir = temp_dir.path().join("config");
    std::fs::create_dir_all(&config_dir).unwrap();

    let variants = json!({
        "monte carlo simulation": ["mcs", "monte carlo", "Monte-Carlo"],
        "genetic algorithm": ["ga", "genetic algorithms"],
        "particle swarm optimization": ["pso"],
    });
    let categories = json!({
        "monte carlo simulation": "Probabilistic",
        "GA": "Metaheuristic",
        "particle swarm optimisation": "Metaheuristic",
        "linear programming": "Mathematical Programming",
    });
    let shortnames = json!({
        "monte carlo simulation": "MCS",
        "genetic algorithm": "GA",
        "particle swarm optimization": "PSO",
    });
    write_json(&config_dir.join("method_variants.json"), &variants);
    write_json(&config_dir.join("method_categories.json"), &categories);
    write_json(&config_dir.join("method_shortnames.json"), &shortnames);
    config_dir
}

/// Write a small paper export to `<temp_dir>/data/papers.json`.
///
/// Rows 4 and 5 are invalid: one has no year, one repeats an id.
#[allow(dead_code)]
pub fn write_papers(temp_dir: &TempDir) -> PathBuf {
    let data_dir = temp_dir.path().join("data");
    std::fs::create_dir_all(&data_dir).unwrap();
    let papers = json!([
        {
            "paperId": "w1", "title": "Reliability with sampling", "year": 2019,
            "citationCount": 120, "Primary_Topic_Index": 2, "Secondary_Topic_Index": 5,
            "Method_1": "MCS", "Method_2": "GA", "Method_3": "linear programming"
        },
        {
            "paperId": "w2", "title": "Hybrid dispatch", "year": 2021,
            "citationCount": 8, "Primary_Topic_Index": 5,
            "Method_1": "Monte-Carlo", "Method_2": "genetic algorithms", "Method_3": "PSO"
        },
        {
            "paperId": "w3", "title": "Swarm planning", "year": "2021",
            "citationCount": "30", "Primary_Topic_Index": 7,
            "Method_1": "Particle Swarm Optimisation", "Method_2": "ga"
        },
        {
            "paperId": "w4", "title": "Off topic", "year": 2020,
            "Primary_Topic_Index": 11,
            "Method_1": "monte carlo simulation", "Method_2": "linear programming"
        },
        { "paperId": "w5", "title": "No year", "Method_1": "GA" },
        { "paperId": "w1", "title": "Duplicate", "year": 2022, "Method_1": "PSO" }
    ]);
    let path = data_dir.join("papers.json");
    write_json(&path, &papers);
    path
}

/// Write an `analysis.toml` pointing at the tables and papers written above.
#[allow(dead_code)]
pub fn write_analysis_config(temp_dir: &TempDir, extra: &str) -> PathBuf {
    write_method_tables(temp_dir);
    write_papers(temp_dir);
    let path = temp_dir.path().join("analysis.toml");
    let content = format!(
        r#"papers = "data/papers.json"
config_dir = "config"
{extra}
"#
    );
    std::fs::write(&path, content).unwrap();
    path
}

fn write_json(path: &Path, value: &serde_json::Value) {
    std::fs::write(path, serde_json::to_string_pretty(value).unwrap()).unwrap();
}
