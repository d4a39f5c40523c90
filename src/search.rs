//! Fuzzy lookup of a user query against the canonical methods of a graph.
//!
//! Every canonical key, its configured aliases and its display shortname are candidate
//! surfaces. A shortname that spells another method's key or alias is left out. Each surface is scored against the normalized query in tiers, so that
//! exact > prefix > substring > token overlap > edit distance always holds:
//!
//! | tier | score |
//! |---|---|
//! | exact | `1.0` |
//! | prefix | `0.75 .. 0.95` |
//! | substring | `0.55 .. 0.75` |
//! | token overlap | `0.35 .. 0.55` |
//! | edit distance | `0.0 .. 0.35` |
//!
//! Only the best surface per canonical counts. Ties are broken by canonical key.

use crate::{config::SearchConfig, normalize::MethodKey, normalize::Normalizer};
use serde::{Deserialize, Serialize};
use std::{
    cmp::Ordering,
    collections::{BTreeMap, BTreeSet},
};

const PREFIX_BASE: f64 = 0.75;
const SUBSTRING_BASE: f64 = 0.55;
const TOKEN_BASE: f64 = 0.35;
const TIER_SPAN: f64 = 0.2;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub key: MethodKey,
    pub score: f64,
    /// The surface form that produced the score.
    pub matched: String,
}

#[derive(Debug, Clone)]
struct Candidate {
    surface: String,
    key: MethodKey,
}

/// Immutable candidate table. Build once per dataset and share.
#[derive(Debug, Clone)]
pub struct FuzzyMatcher {
    normalizer: Normalizer,
    candidates: Vec<Candidate>,
    config: SearchConfig,
}

impl FuzzyMatcher {
    pub fn new<'a, I>(normalizer: &Normalizer, methods: I, config: SearchConfig) -> Self
    where
        I: IntoIterator<Item = &'a MethodKey>,
    {
        let methods = methods.into_iter().collect::<BTreeSet<_>>();
        let mut surfaces = BTreeSet::new();
        for &key in methods.iter() {
            surfaces.insert((key.as_str().to_string(), key.clone()));
            for alias in normalizer.aliases_of(key) {
                surfaces.insert((alias.to_string(), key.clone()));
            }
            let shortname = normalizer.normalize_text(normalizer.shortname(key));
            if shortname.is_empty() {
                continue;
            }
            // a shortname spelling another method's name or alias stays with that method
            let claimed = normalizer.owner(&shortname).is_some_and(|owner| owner != key)
                || methods.iter().any(|other| *other != key && other.as_str() == shortname);
            if claimed {
                tracing::debug!("Shortname '{shortname}' of {key} names another method, not indexed");
                continue;
            }
            surfaces.insert((shortname, key.clone()));
        }
        let candidates = surfaces
            .into_iter()
            .map(|(surface, key)| Candidate { surface, key })
            .collect::<Vec<_>>();
        tracing::debug!("Fuzzy matcher holds {} candidate surfaces", candidates.len());
        FuzzyMatcher {
            normalizer: normalizer.clone(),
            candidates,
            config,
        }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Lazy ranked search. Nothing is scored until the result is iterated, and iterating
    /// again yields the same sequence.
    pub fn search<'m>(&'m self, query: &str, top_k: usize) -> Search<'m> {
        Search {
            matcher: self,
            query: self.normalizer.normalize_text(query),
            top_k,
        }
    }

    fn rank(&self, query: &str, top_k: usize) -> Vec<SearchHit> {
        if top_k == 0 || query.chars().count() < self.config.min_query_chars.max(1) {
            return Vec::new();
        }

        let mut best: BTreeMap<&MethodKey, (f64, &str)> = BTreeMap::new();
        for candidate in self.candidates.iter() {
            let score = similarity(query, &candidate.surface);
            if score < self.config.min_score || score <= 0.0 {
                continue;
            }
            let entry = best
                .entry(&candidate.key)
                .or_insert((score, candidate.surface.as_str()));
            if score > entry.0 {
                *entry = (score, candidate.surface.as_str());
            }
        }

        let mut hits = best
            .into_iter()
            .map(|(key, (score, matched))| SearchHit {
                key: key.clone(),
                score,
                matched: matched.to_string(),
            })
            .collect::<Vec<_>>();
        hits.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.key.cmp(&b.key))
        });
        hits.truncate(top_k);
        hits
    }
}

/// A pending search. Iterate by reference to run it; each run is independent.
#[derive(Debug, Clone)]
pub struct Search<'m> {
    matcher: &'m FuzzyMatcher,
    query: String,
    top_k: usize,
}

impl Search<'_> {
    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn iter(&self) -> std::vec::IntoIter<SearchHit> {
        self.matcher.rank(&self.query, self.top_k).into_iter()
    }

    pub fn to_vec(&self) -> Vec<SearchHit> {
        self.iter().collect()
    }
}

impl IntoIterator for &Search<'_> {
    type Item = SearchHit;
    type IntoIter = std::vec::IntoIter<SearchHit>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl IntoIterator for Search<'_> {
    type Item = SearchHit;
    type IntoIter = std::vec::IntoIter<SearchHit>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Tiered similarity of two normalized strings, in `[0, 1]`.
pub fn similarity(query: &str, surface: &str) -> f64 {
    if query.is_empty() || surface.is_empty() {
        return 0.0;
    }
    if query == surface {
        return 1.0;
    }
    let coverage = query.chars().count() as f64 / surface.chars().count() as f64;
    if surface.starts_with(query) {
        return PREFIX_BASE + TIER_SPAN * coverage;
    }
    if surface.contains(query) {
        return SUBSTRING_BASE + TIER_SPAN * coverage;
    }
    let query_tokens = query.split(' ').collect::<BTreeSet<_>>();
    let surface_tokens = surface.split(' ').collect::<BTreeSet<_>>();
    let shared = query_tokens.intersection(&surface_tokens).count();
    if shared > 0 {
        let union = query_tokens.union(&surface_tokens).count();
        return TOKEN_BASE + TIER_SPAN * shared as f64 / union as f64;
    }
    TOKEN_BASE * rapidfuzz::fuzz::ratio(query.chars(), surface.chars())
}
