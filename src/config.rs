//! Static configuration: the TOML analysis config and the three JSON method tables.
//!
//! Decoding lives here so the rest of the crate only ever sees validated, already-parsed
//! mappings. Validation of alias uniqueness happens when a [`crate::normalize::Normalizer`]
//! is built from [`MethodTables`].

use crate::error::MethodNetError;
use serde::{Deserialize, Serialize};
use std::{
    collections::{BTreeMap, BTreeSet},
    fs::read_to_string,
    path::{Path, PathBuf},
};

pub const CATEGORIES_FILE: &str = "method_categories.json";
pub const SHORTNAMES_FILE: &str = "method_shortnames.json";
pub const VARIANTS_FILE: &str = "method_variants.json";

pub const DEFAULT_TOPICS: [u32; 6] = [2, 5, 6, 7, 8, 13];

/// Which of a paper's topic indices must fall inside a topic selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TopicMode {
    /// Primary or secondary index is selected.
    #[default]
    Any,
    Primary,
    Secondary,
    /// Both indices are selected.
    Both,
}

impl TopicMode {
    pub fn admits(
        &self,
        topics: &BTreeSet<u32>,
        primary: Option<u32>,
        secondary: Option<u32>,
    ) -> bool {
        let hit = |idx: Option<u32>| idx.is_some_and(|idx| topics.contains(&idx));
        match self {
            TopicMode::Any => hit(primary) || hit(secondary),
            TopicMode::Primary => hit(primary),
            TopicMode::Secondary => hit(secondary),
            TopicMode::Both => hit(primary) && hit(secondary),
        }
    }
}

/// The three method mappings, as decoded from their documents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodTables {
    /// method -> category label
    pub categories: BTreeMap<String, String>,
    /// method -> display shortname
    pub shortnames: BTreeMap<String, String>,
    /// canonical method -> accepted surface forms
    pub variants: BTreeMap<String, Vec<String>>,
}

/// Anything that can hand over decoded method tables.
pub trait TableSource {
    fn method_tables(&self) -> Result<MethodTables, MethodNetError>;
}

/// Reads the method tables from JSON documents in one directory.
#[derive(Debug, Clone)]
pub struct JsonDirSource {
    dir: PathBuf,
}

impl JsonDirSource {
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        JsonDirSource { dir: dir.into() }
    }

    fn load<T>(&self, file: &str) -> Result<T, MethodNetError>
    where
        T: for<'de> Deserialize<'de> + Default,
    {
        let path = self.dir.join(file);
        if !path.exists() {
            tracing::warn!("{file} not found in {:?}, using an empty mapping", self.dir);
            return Ok(T::default());
        }
        let content = read_to_string(&path)?;
        let table = serde_json::from_str(&content)
            .map_err(|err| MethodNetError::configuration(file, err))?;
        tracing::debug!("Loaded {file}");
        Ok(table)
    }
}

impl TableSource for JsonDirSource {
    fn method_tables(&self) -> Result<MethodTables, MethodNetError> {
        let tables = MethodTables {
            categories: self.load(CATEGORIES_FILE)?,
            shortnames: self.load(SHORTNAMES_FILE)?,
            variants: self.load(VARIANTS_FILE)?,
        };
        tracing::info!(
            "Method tables: {} categories, {} shortnames, {} variant families",
            tables.categories.len(),
            tables.shortnames.len(),
            tables.variants.len()
        );
        Ok(tables)
    }
}

impl TableSource for MethodTables {
    fn method_tables(&self) -> Result<MethodTables, MethodNetError> {
        Ok(self.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub min_cooccurrence: usize,
    pub max_edges_per_method: usize,
    pub top_n: usize,
    pub label_width: usize,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        LayoutConfig {
            min_cooccurrence: 5,
            max_edges_per_method: 5,
            top_n: 15,
            label_width: 18,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Hits scoring below this are dropped instead of padding the result list.
    pub min_score: f64,
    /// Shorter queries return nothing.
    pub min_query_chars: usize,
    pub limit: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            min_score: 0.2,
            min_query_chars: 2,
            limit: 10,
        }
    }
}

/// Top level analysis configuration, usually read from `analysis.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub papers: PathBuf,
    pub config_dir: PathBuf,
    /// Active topic indices. Empty means every paper is in scope.
    pub topics: Vec<u32>,
    pub topic_mode: TopicMode,
    pub min_papers_per_method: usize,
    pub min_year: Option<i32>,
    pub min_citations: u32,
    pub layout: LayoutConfig,
    pub search: SearchConfig,
    pub topic_names: BTreeMap<String, String>,
    /// Substring rewrites applied to method text before lookup.
    pub spelling: BTreeMap<String, String>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        AnalysisConfig {
            papers: PathBuf::from("data/papers.json"),
            config_dir: PathBuf::from("config"),
            topics: DEFAULT_TOPICS.to_vec(),
            topic_mode: TopicMode::default(),
            min_papers_per_method: 1,
            min_year: None,
            min_citations: 0,
            layout: LayoutConfig::default(),
            search: SearchConfig::default(),
            topic_names: BTreeMap::new(),
            spelling: default_spelling(),
        }
    }
}

impl AnalysisConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, MethodNetError> {
        let path = path.as_ref();
        tracing::debug!("Reading analysis config from {:?}", path);
        let content = read_to_string(path)?;
        let mut config: AnalysisConfig = toml::from_str(&content).map_err(|err| {
            MethodNetError::configuration(path.display(), err.message().to_string())
        })?;
        if let Some(base) = path.parent() {
            config.papers = base.join(&config.papers);
            config.config_dir = base.join(&config.config_dir);
        }
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), MethodNetError> {
        for key in self.topic_names.keys() {
            if key.trim().parse::<u32>().is_err() {
                return Err(MethodNetError::configuration(
                    format!("topic_names.{key}"),
                    "topic name keys must be non-negative integers",
                ));
            }
        }
        for from in self.spelling.keys() {
            if from.trim().is_empty() {
                return Err(MethodNetError::configuration(
                    "spelling",
                    "empty rewrite source",
                ));
            }
        }
        if !(0.0..=1.0).contains(&self.search.min_score) {
            return Err(MethodNetError::configuration(
                "search.min_score",
                "must lie in [0, 1]",
            ));
        }
        Ok(())
    }

    pub fn topic_set(&self) -> BTreeSet<u32> {
        self.topics.iter().copied().collect()
    }

    pub fn topic_names(&self) -> BTreeMap<u32, String> {
        self.topic_names
            .iter()
            .filter_map(|(k, v)| k.trim().parse::<u32>().ok().map(|idx| (idx, v.clone())))
            .collect()
    }

    pub fn table_source(&self) -> JsonDirSource {
        JsonDirSource::new(&self.config_dir)
    }
}

pub fn default_spelling() -> BTreeMap<String, String> {
    [
        ("optimisation", "optimization"),
        ("optimise", "optimize"),
        ("optimised", "optimized"),
        ("optimising", "optimizing"),
        ("behaviour", "behavior"),
        ("modelling", "modeling"),
        ("colour", "color"),
        ("centre", "center"),
        ("analyse", "analyze"),
        ("parameterise", "parameterize"),
    ]
    .into_iter()
    .map(|(uk, us)| (uk.to_string(), us.to_string()))
    .collect()
}
