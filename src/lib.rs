//! # methodnet
//!
//! A library for turning papers annotated with free-text method mentions into a weighted
//! method co-occurrence network, and for exploring that network interactively.
//!
//! ## Overview
//!
//! Each paper carries up to ten raw method mentions ("MCS", "Monte-Carlo simulation",
//! "genetic algorithm", ...) plus primary and secondary topic indices. methodnet resolves
//! every mention to a canonical method through configurable alias tables, then builds an
//! undirected graph whose nodes are methods and whose edges join methods that appear in the
//! same paper. Edge weight is the number of papers in which both methods appear.
//!
//! ### Key Features
//!
//! - **Deterministic normalization**: alias, shortname and category tables validated at load
//! - **Auditable ingestion**: rejected rows are reported alongside the graph, never dropped
//! - **Pure derived views**: category/topic filters, trends and layout plans never mutate the graph
//! - **Fuzzy search**: tiered ranking over canonical keys, aliases and shortnames
//! - **Session state**: per-user filter, pins and selection over one shared dataset
//!
//! ## Architecture
//!
//! - **[`normalize`]**: raw mention to canonical [`normalize::MethodIdentity`]
//! - **[`cooccurrence`]**: paper records, the [`cooccurrence::MethodGraph`] and its builder
//! - **[`filter`]**: category/topic projection into a [`filter::FilteredView`]
//! - **[`trend`]**: per-year counts for a method or method pair
//! - **[`selection`]**: the node/edge focus state machine and its drill-down data
//! - **[`search`]**: the fuzzy matcher
//! - **[`layout`]**: circular network plan for a renderer
//! - **[`dataset`]** and **[`session`]**: the shared snapshot and the per-user context
//! - **[`config`]**: the TOML analysis config and JSON method tables
//!
//! ## Quick Start
//!
//! ```rust
//! use methodnet::{
//!     config::{AnalysisConfig, MethodTables},
//!     cooccurrence::{PaperRow, COL_PAPER_ID, COL_YEAR},
//!     dataset::Dataset,
//!     session::Session,
//!     trend::TrendTarget,
//! };
//! use std::sync::Arc;
//!
//! let mut tables = MethodTables::default();
//! tables.variants.insert(
//!     "monte carlo simulation".to_string(),
//!     vec!["mcs".to_string(), "monte carlo".to_string()],
//! );
//! let rows = vec![
//!     PaperRow::default()
//!         .set(COL_PAPER_ID, "p1")
//!         .set(COL_YEAR, 2020)
//!         .set("Method_1", "MCS")
//!         .set("Method_2", "Genetic Algorithm"),
//!     PaperRow::default()
//!         .set(COL_PAPER_ID, "p2")
//!         .set(COL_YEAR, 2021)
//!         .set("Method_1", "Monte-Carlo simulation")
//!         .set("Method_2", "genetic algorithm"),
//! ];
//! let config = AnalysisConfig { topics: Vec::new(), ..Default::default() };
//! let dataset = Dataset::from_rows(&tables, rows, &config)?;
//! assert_eq!(dataset.graph().edge_count(), 1);
//!
//! let mut session = Session::new(Arc::new(dataset));
//! let mcs = session.resolve("mcs").unwrap();
//! session.select_node(mcs.clone());
//! assert_eq!(session.trend(&TrendTarget::Method(mcs)).len(), 2);
//! # Ok::<(), methodnet::MethodNetError>(())
//! ```

pub mod config;
pub mod cooccurrence;
pub mod dataset;
pub mod error;
pub mod filter;
pub mod layout;
pub mod normalize;
pub mod search;
pub mod selection;
pub mod session;
#[cfg(test)]
mod tests;
pub mod trend;

pub use error::*;
