//! Adoption-over-time series for a method or a method pair.

use crate::{
    cooccurrence::{EdgeKey, PaperId},
    filter::FilteredView,
    normalize::MethodKey,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrendTarget {
    Method(MethodKey),
    Edge(EdgeKey),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TrendPoint {
    pub year: i32,
    pub count: usize,
}

/// Papers per publication year, ascending by year. Years without papers are omitted, and a
/// target that is not in the view yields an empty series.
pub fn trend(view: &FilteredView<'_>, target: &TrendTarget) -> Vec<TrendPoint> {
    let papers: Option<&BTreeSet<&PaperId>> = match target {
        TrendTarget::Method(key) => view.node(key).map(|node| &node.papers),
        TrendTarget::Edge(key) => view.edge(key).map(|edge| &edge.papers),
    };
    let Some(papers) = papers else {
        return Vec::new();
    };

    let mut years = BTreeMap::<i32, usize>::new();
    for paper in papers.iter().filter_map(|id| view.paper(id)) {
        *years.entry(paper.year).or_insert(0) += 1;
    }
    years
        .into_iter()
        .map(|(year, count)| TrendPoint { year, count })
        .collect()
}

/// One series per method, for comparing several methods on one axis.
pub fn method_trends<'a, I>(view: &FilteredView<'_>, methods: I) -> BTreeMap<MethodKey, Vec<TrendPoint>>
where
    I: IntoIterator<Item = &'a MethodKey>,
{
    methods
        .into_iter()
        .map(|key| {
            let series = trend(view, &TrendTarget::Method(key.clone()));
            (key.clone(), series)
        })
        .collect()
}

/// Fill the gaps of a sparse series with zero counts over `first..=last`.
pub fn densify(series: &[TrendPoint], first: i32, last: i32) -> Vec<TrendPoint> {
    let counts = series
        .iter()
        .map(|point| (point.year, point.count))
        .collect::<BTreeMap<_, _>>();
    (first..=last)
        .map(|year| TrendPoint {
            year,
            count: counts.get(&year).copied().unwrap_or(0),
        })
        .collect()
}
