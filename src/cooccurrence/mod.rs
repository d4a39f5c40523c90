//! Co-occurrence module: paper records in, weighted method graph out.
//!
//! # Module Organization
//!
//! - [`record`]: paper records, wide-format rows and rejection reasons
//! - [`graph`]: the frozen [`MethodGraph`] with its nodes, edges and papers
//! - [`builder`]: per-paper accumulation into a graph plus a [`BuildReport`]
//!
//! ```rust
//! use methodnet::{config::MethodTables, cooccurrence::{build, PaperRecord}, normalize::Normalizer};
//!
//! let normalizer = Normalizer::from_tables(&MethodTables::default()).unwrap();
//! let papers = vec![
//!     PaperRecord::new("p1", "First", 2020, ["A", "B"]),
//!     PaperRecord::new("p2", "Second", 2021, ["a", "b", "B"]),
//! ];
//! let (graph, report) = build(&normalizer, papers);
//! assert_eq!(report.accepted, 2);
//! assert_eq!(graph.edge_count(), 1);
//! ```

mod builder;
mod graph;
mod record;


pub use builder::{build, build_from_rows, BuildOptions, BuildReport, GraphBuilder, TopicScope};
pub use graph::{CoEdge, EdgeKey, MethodGraph, MethodNode};
pub use record::{
    method_column, PaperId, PaperRecord, PaperRow, RecordRejection, RejectReason, COL_AUTHORS,
    COL_CITATIONS, COL_DOI, COL_PAPER_ID, COL_PRIMARY_TOPIC, COL_SECONDARY_TOPIC, COL_TITLE,
    COL_YEAR, MAX_METHODS,
};
