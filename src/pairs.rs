use crate::read_group::{ReadGroup, ReadGroups, PROGRESS_INTERVAL};
use crate::split_read::{GroupKey, SplitRead};
use log::{debug, info};
use rustc_hash::FxHashMap;

/// A left/right combination drawn from one read group
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CandidatePair<'a> {
    pub left: &'a SplitRead,
    pub right: &'a SplitRead,
    pub gap_distance: i64,
}

impl<'a> CandidatePair<'a> {
    pub fn new(left: &'a SplitRead, right: &'a SplitRead) -> Self {
        CandidatePair {
            left,
            right,
            gap_distance: left.gap_distance(right),
        }
    }

    /// True if `read` is either member of this pair
    pub fn contains(&self, read: &SplitRead) -> bool {
        self.left == read || self.right == read
    }
}

/// Pairs per read group. Filtering never leaves an empty entry behind.
pub type PairIndex<'a> = FxHashMap<&'a GroupKey, Vec<CandidatePair<'a>>>;

/// Cartesian product of a group's left and right reads, left-major
pub fn expand(group: &ReadGroup) -> Vec<CandidatePair<'_>> {
    let mut pairs = Vec::with_capacity(group.left.len() * group.right.len());
    for left in &group.left {
        for right in &group.right {
            pairs.push(CandidatePair::new(left, right));
        }
    }
    pairs
}

/// Expand every read group; groups with reads on only one side produce no
/// entry.
pub fn build_pairs_from_groups(read_groups: &ReadGroups) -> PairIndex<'_> {
    let mut index = PairIndex::default();
    let mut pair_count = 0usize;

    for (count, (key, group)) in read_groups.iter().enumerate() {
        if count % PROGRESS_INTERVAL == 0 {
            debug!("build_pairs_from_groups|Processing read group {}", count + 1);
        }
        let pairs = expand(group);
        if !pairs.is_empty() {
            pair_count += pairs.len();
            index.insert(key, pairs);
        }
    }
    info!(
        "build_pairs_from_groups|Built {} pairs from {} read groups",
        pair_count,
        read_groups.len()
    );

    index
}

pub fn pair_count(index: &PairIndex<'_>) -> usize {
    index.values().map(Vec::len).sum()
}
