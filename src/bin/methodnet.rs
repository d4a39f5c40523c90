//! methodnet CLI tool
//!
//! Command-line access to a method co-occurrence dataset.
//!
//! ## Commands
//!
//! - `stats`: build report, graph size and the most frequent methods
//! - `search <query>`: fuzzy method lookup
//! - `trend <method>`: papers per year for one method
//! - `edge <a> <b>`: papers behind a method pair and their trend

use clap::{Parser, Subcommand};
use methodnet::{
    config::AnalysisConfig,
    cooccurrence::EdgeKey,
    dataset::Dataset,
    layout::top_methods,
    session::Session,
    trend::{TrendPoint, TrendTarget},
};
use std::{path::PathBuf, sync::Arc};

#[derive(Parser)]
#[command(name = "methodnet")]
#[command(author, version, about = "Explore method co-occurrence in annotated papers", long_about = None)]
struct Cli {
    /// Analysis configuration file
    #[arg(short, long, default_value = "analysis.toml")]
    config: PathBuf,

    /// Restrict to these categories (repeatable)
    #[arg(long = "category")]
    categories: Vec<String>,

    /// Restrict to these topic indices (repeatable)
    #[arg(long = "topic")]
    topics: Vec<u32>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the build report and the most frequent methods
    Stats {
        /// Number of methods to list, defaults to `layout.top_n`
        #[arg(short, long)]
        top: Option<usize>,
    },

    /// Fuzzy search for a method
    Search { query: String },

    /// Papers per year mentioning a method
    Trend { method: String },

    /// Papers in which two methods co-occur
    Edge {
        a: String,
        b: String,

        /// Number of papers to list
        #[arg(short, long, default_value_t = 10)]
        limit: usize,
    },
}

fn print_trend(series: &[TrendPoint]) {
    if series.is_empty() {
        println!("  (no papers)");
    }
    for point in series {
        println!("  {}  {}", point.year, point.count);
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = AnalysisConfig::load(&cli.config)?;
    let dataset = Dataset::load(&config)?;
    let mut session = Session::new(Arc::new(dataset));
    session.set_categories(cli.categories);
    session.set_topics(cli.topics);

    match cli.command {
        Commands::Stats { top } => {
            let dataset = session.dataset();
            let top = top.unwrap_or(dataset.layout().top_n);
            let report = dataset.report();
            println!("=== Build Report ===");
            println!("Processed: {}", report.processed);
            println!("Accepted: {}", report.accepted);
            println!("Out of scope: {}", report.out_of_scope);
            println!("Rejected: {}", report.rejected_count());
            for rejection in report.rejected.iter() {
                println!(
                    "  row {} ({}): {}",
                    rejection.row,
                    rejection.paper_id.as_deref().unwrap_or("no id"),
                    rejection.reason
                );
            }
            println!("Pruned methods: {}", report.pruned_methods.len());

            let view = session.view();
            println!("\n=== Network ===");
            println!("Methods: {}", view.node_count());
            println!("Connections: {}", view.edge_count());
            println!("Papers: {}", view.paper_count());

            println!("\n=== Top {top} Methods ===");
            for key in top_methods(&view, top) {
                if let Some(node) = view.node(&key) {
                    println!(
                        "  {:>5}  {} [{}]",
                        node.occurrences(),
                        node.node.identity.shortname,
                        node.node.identity.category
                    );
                }
            }
        }

        Commands::Search { query } => {
            let hits = session.search(&query);
            if hits.is_empty() {
                println!("No methods match '{query}'");
            }
            for hit in hits {
                println!("  {:.3}  {} (via '{}')", hit.score, hit.key, hit.matched);
            }
        }

        Commands::Trend { method } => {
            let Some(key) = session.resolve(&method) else {
                return Err(format!("'{method}' is not a method name").into());
            };
            println!("Trend for {key}:");
            print_trend(&session.trend(&TrendTarget::Method(key)));
        }

        Commands::Edge { a, b, limit } => {
            let (Some(a), Some(b)) = (session.resolve(&a), session.resolve(&b)) else {
                return Err("both method names must be non-empty".into());
            };
            let Some(key) = EdgeKey::new(a, b) else {
                return Err("a method does not co-occur with itself".into());
            };
            session.select_edge(key.clone());
            let papers = session.edge_papers(limit);
            println!("{key}: {} papers shown", papers.len());
            for paper in papers {
                println!("  {}  {}  ({} citations)  {}", paper.year, paper.title, paper.citation_count, paper.doi);
            }
            println!("\nTrend:");
            print_trend(&session.focus_trend().unwrap_or_default());
        }
    }

    Ok(())
}
