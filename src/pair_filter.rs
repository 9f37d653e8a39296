//! Pair filters
//!
//! Each filter decides on a single left/right pair. A [`CompositeFilter`]
//! accepts a pair only if every filter it holds accepts it.

use crate::pairs::{pair_count, PairIndex};
use crate::split_read::SplitRead;
use log::info;

pub trait PairFilter {
    fn name(&self) -> &str;

    fn accepts(&self, left: &SplitRead, right: &SplitRead) -> bool;
}

/// Accepts pairs whose gap distance lies in `min..=max`
#[derive(Debug, Clone, Copy)]
pub struct DistanceFilter {
    min: i64,
    max: i64,
}

impl DistanceFilter {
    pub fn new(min: i64, max: i64) -> Self {
        DistanceFilter { min, max }
    }
}

impl PairFilter for DistanceFilter {
    fn name(&self) -> &str {
        "distance"
    }

    fn accepts(&self, left: &SplitRead, right: &SplitRead) -> bool {
        let distance = left.gap_distance(right);
        self.min <= distance && distance <= self.max
    }
}

/// Accepts opposite-side, same-strand pairs positioned as the strand implies
#[derive(Debug, Clone, Copy, Default)]
pub struct OrientationFilter;

impl PairFilter for OrientationFilter {
    fn name(&self) -> &str {
        "orientation"
    }

    fn accepts(&self, left: &SplitRead, right: &SplitRead) -> bool {
        left.is_oriented(right)
    }
}

#[derive(Default)]
pub struct CompositeFilter {
    filters: Vec<Box<dyn PairFilter>>,
}

impl CompositeFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, filter: impl PairFilter + 'static) -> Self {
        self.filters.push(Box::new(filter));
        self
    }

    /// Run each filter over `index` in the order they were added, so every
    /// stage logs its own counts.
    pub fn apply<'a>(&self, index: PairIndex<'a>) -> PairIndex<'a> {
        self.filters
            .iter()
            .fold(index, |index, filter| filter_pairs(index, filter.as_ref()))
    }
}

impl PairFilter for CompositeFilter {
    fn name(&self) -> &str {
        "composite"
    }

    fn accepts(&self, left: &SplitRead, right: &SplitRead) -> bool {
        self.filters.iter().all(|f| f.accepts(left, right))
    }
}

/// Drop the pairs `filter` rejects, and any group left without pairs.
pub fn filter_pairs<'a>(index: PairIndex<'a>, filter: &dyn PairFilter) -> PairIndex<'a> {
    let total = pair_count(&index);
    let filtered: PairIndex<'a> = index
        .into_iter()
        .filter_map(|(key, mut pairs)| {
            pairs.retain(|pair| filter.accepts(pair.left, pair.right));
            (!pairs.is_empty()).then_some((key, pairs))
        })
        .collect();
    info!(
        "filter_on_{} complete|{} pairs processed, {} pairs passed",
        filter.name(),
        total,
        pair_count(&filtered)
    );
    filtered
}
