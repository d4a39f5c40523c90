//! Method normalization: raw method mentions to canonical method identities.
//!
//! A [`Normalizer`] is built once from [`MethodTables`] and is immutable afterwards, so the
//! same raw text resolves to the same [`MethodIdentity`] for its whole lifetime. Unknown
//! methods are never dropped: their normalized text becomes a canonical key of its own.

use crate::{
    config::{default_spelling, MethodTables},
    error::MethodNetError,
};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::{
    borrow::Borrow,
    collections::{btree_map::Entry, BTreeMap, BTreeSet},
    fmt,
};
use unicode_normalization::UnicodeNormalization;

pub const UNCATEGORIZED: &str = "Uncategorized";

static SEPARATORS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\s_\-]+").unwrap());

/// Canonical method key: normalized text, lower-case, single spaced.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MethodKey(String);

impl MethodKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MethodKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for MethodKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for MethodKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A canonical method together with its display attributes.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MethodIdentity {
    pub key: MethodKey,
    pub shortname: String,
    pub category: String,
}

#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    /// Longest rewrite first.
    spelling: Vec<(String, String)>,
    /// surface form -> owning canonical, canonical keys included
    aliases: BTreeMap<String, MethodKey>,
    /// canonical -> surface forms other than the key itself
    families: BTreeMap<MethodKey, BTreeSet<String>>,
    categories: BTreeMap<MethodKey, String>,
    shortnames: BTreeMap<MethodKey, String>,
}

impl Normalizer {
    /// Build with the default UK -> US spelling rewrites.
    pub fn from_tables(tables: &MethodTables) -> Result<Self, MethodNetError> {
        Normalizer::new(tables, &default_spelling())
    }

    pub fn new(
        tables: &MethodTables,
        spelling: &BTreeMap<String, String>,
    ) -> Result<Self, MethodNetError> {
        let mut spelling = spelling
            .iter()
            .map(|(from, to)| (from.to_lowercase(), to.to_lowercase()))
            .filter(|(from, _)| !from.is_empty())
            .collect::<Vec<_>>();
        spelling.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then_with(|| a.0.cmp(&b.0)));

        let mut normalizer = Normalizer {
            spelling,
            ..Default::default()
        };

        // Canonical keys claim themselves first so an alias naming another canonical
        // is reported as a conflict.
        for raw_key in tables.variants.keys() {
            let key = normalizer.canonical_from_config(raw_key)?;
            normalizer.claim(key.as_str().to_string(), &key, raw_key)?;
            normalizer.families.entry(key).or_default();
        }
        for (raw_key, variants) in tables.variants.iter() {
            let key = MethodKey(normalizer.normalize_text(raw_key));
            for raw_alias in variants {
                let alias = normalizer.normalize_text(raw_alias);
                if alias.is_empty() {
                    return Err(MethodNetError::configuration(
                        raw_key,
                        format!("alias '{raw_alias}' is empty after normalization"),
                    ));
                }
                normalizer.claim(alias.clone(), &key, raw_alias)?;
                if alias != key.as_str() {
                    normalizer
                        .families
                        .entry(key.clone())
                        .or_default()
                        .insert(alias);
                }
            }
        }

        let categories = normalizer.resolve_attribute(&tables.categories, "category")?;
        let shortnames = normalizer.resolve_attribute(&tables.shortnames, "shortname")?;
        normalizer.categories = categories;
        normalizer.shortnames = shortnames;

        tracing::debug!(
            "Normalizer ready: {} canonical families, {} surface forms",
            normalizer.families.len(),
            normalizer.aliases.len()
        );
        Ok(normalizer)
    }

    fn canonical_from_config(&self, raw: &str) -> Result<MethodKey, MethodNetError> {
        let key = self.normalize_text(raw);
        if key.is_empty() {
            return Err(MethodNetError::configuration(
                raw,
                "method key is empty after normalization",
            ));
        }
        Ok(MethodKey(key))
    }

    fn claim(&mut self, surface: String, owner: &MethodKey, raw: &str) -> Result<(), MethodNetError> {
        match self.aliases.entry(surface) {
            Entry::Vacant(entry) => {
                entry.insert(owner.clone());
                Ok(())
            }
            Entry::Occupied(entry) if entry.get() == owner => Ok(()),
            Entry::Occupied(entry) => Err(MethodNetError::configuration(
                raw,
                format!(
                    "surface form '{}' is claimed by both '{}' and '{}'",
                    entry.key(),
                    entry.get(),
                    owner
                ),
            )),
        }
    }

    fn resolve_attribute(
        &self,
        table: &BTreeMap<String, String>,
        what: &str,
    ) -> Result<BTreeMap<MethodKey, String>, MethodNetError> {
        let mut resolved = BTreeMap::new();
        for (raw_key, value) in table.iter() {
            let value = value.trim();
            if value.is_empty() {
                return Err(MethodNetError::configuration(
                    raw_key,
                    format!("empty {what}"),
                ));
            }
            let key = self.canonical_from_config(raw_key)?;
            let key = self.aliases.get(key.as_str()).cloned().unwrap_or(key);
            match resolved.entry(key) {
                Entry::Vacant(entry) => {
                    entry.insert(value.to_string());
                }
                Entry::Occupied(entry) if entry.get() == value => {}
                Entry::Occupied(entry) => {
                    return Err(MethodNetError::configuration(
                        raw_key,
                        format!(
                            "{what} for '{}' is both '{}' and '{}'",
                            entry.key(),
                            entry.get(),
                            value
                        ),
                    ));
                }
            }
        }
        Ok(resolved)
    }

    /// Lower-case, unify separators, apply spelling rewrites and collapse whitespace.
    pub fn normalize_text(&self, raw: &str) -> String {
        let lowered = raw.nfkc().collect::<String>().to_lowercase();
        let mut text = SEPARATORS.replace_all(lowered.trim(), " ").into_owned();
        for (from, to) in self.spelling.iter() {
            if text.contains(from.as_str()) {
                text = text.replace(from.as_str(), to);
            }
        }
        text.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    /// Canonical key for a raw mention, `None` for an empty mention.
    pub fn resolve(&self, raw: &str) -> Option<MethodKey> {
        let text = self.normalize_text(raw);
        if text.is_empty() {
            return None;
        }
        Some(self.aliases.get(&text).cloned().unwrap_or(MethodKey(text)))
    }

    /// The configured canonical that claims `raw`, if any.
    pub fn owner(&self, raw: &str) -> Option<&MethodKey> {
        self.aliases.get(&self.normalize_text(raw))
    }

    pub fn normalize(&self, raw: &str) -> Option<MethodIdentity> {
        self.resolve(raw).map(|key| self.identity(&key))
    }

    pub fn identity(&self, key: &MethodKey) -> MethodIdentity {
        MethodIdentity {
            key: key.clone(),
            shortname: self.shortname(key).to_string(),
            category: self.category(key).to_string(),
        }
    }

    pub fn category(&self, key: &MethodKey) -> &str {
        self.categories
            .get(key)
            .map(String::as_str)
            .unwrap_or(UNCATEGORIZED)
    }

    pub fn shortname<'a>(&'a self, key: &'a MethodKey) -> &'a str {
        self.shortnames
            .get(key)
            .map(String::as_str)
            .unwrap_or(key.as_str())
    }

    /// Surface forms that resolve to `key`, excluding the key itself.
    pub fn aliases_of(&self, key: &MethodKey) -> impl Iterator<Item = &str> {
        self.families
            .get(key)
            .into_iter()
            .flat_map(|family| family.iter().map(String::as_str))
    }

    /// Every canonical key named by the configuration.
    pub fn canonical_keys(&self) -> BTreeSet<&MethodKey> {
        self.families
            .keys()
            .chain(self.categories.keys())
            .chain(self.shortnames.keys())
            .collect()
    }

    /// Category labels named by the configuration, plus the fallback label.
    pub fn categories(&self) -> BTreeSet<&str> {
        self.categories
            .values()
            .map(String::as_str)
            .chain(std::iter::once(UNCATEGORIZED))
            .collect()
    }
}
