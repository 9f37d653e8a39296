//! Two-pass read grouping
//!
//! The first pass only collects keys, so memory is bounded by the number of
//! distinct keys. The second pass keeps the reads whose key was seen on both
//! sides, typically a small fraction of the input.

use crate::builder::SplitReadBuilder;
use crate::length_validator::ReadLengthValidator;
use crate::pipeline::PipelineError;
use crate::split_read::{GroupKey, Side, SplitRead};
use log::{debug, info};
use rustc_hash::{FxHashMap, FxHashSet};
use std::io::BufRead;

pub(crate) const PROGRESS_INTERVAL: usize = 100_000;

/// Left and right fragments sharing one [`GroupKey`], in input order
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReadGroup {
    pub left: Vec<SplitRead>,
    pub right: Vec<SplitRead>,
}

impl ReadGroup {
    pub fn push(&mut self, read: SplitRead) {
        match read.side {
            Side::Left => self.left.push(read),
            Side::Right => self.right.push(read),
        }
    }
}

pub type ReadGroups = FxHashMap<GroupKey, ReadGroup>;

/// Pass 1: returns every key that appears on both the left and the right
/// side, validating split lengths along the way.
pub fn identify_common_group_keys<R: BufRead>(
    builder: &dyn SplitReadBuilder,
    reader: R,
    read_len: u32,
) -> Result<FxHashSet<GroupKey>, PipelineError> {
    let mut left_keys: FxHashSet<GroupKey> = FxHashSet::default();
    let mut right_keys: FxHashSet<GroupKey> = FxHashSet::default();
    let mut validator = ReadLengthValidator::new(read_len);
    let mut count = 0usize;

    for line in reader.lines() {
        let line = line?;
        if line.is_empty() || builder.is_header(&line) {
            continue;
        }
        count += 1;
        if count % PROGRESS_INTERVAL == 1 {
            debug!("identify_group_keys|Processing line {}", count);
        }
        let Some(read) = builder.build(&line)?.into_aligned() else {
            continue;
        };
        validator.observe(read.split_len)?;
        let key = read.key();
        match read.side {
            Side::Left => left_keys.insert(key),
            Side::Right => right_keys.insert(key),
        };
    }
    info!("identify_group_keys|Processed {} lines", count);

    info!(
        "identify_group_keys|Intersecting {} left keys with {} right keys",
        left_keys.len(),
        right_keys.len()
    );
    // Iterate the smaller set
    let (smaller, larger) = if left_keys.len() <= right_keys.len() {
        (left_keys, right_keys)
    } else {
        (right_keys, left_keys)
    };
    let common_keys: FxHashSet<GroupKey> = smaller
        .into_iter()
        .filter(|key| larger.contains(key))
        .collect();
    info!("identify_group_keys|Found {} common keys", common_keys.len());

    validator.finalize()?;
    Ok(common_keys)
}

/// Pass 2: materialise the reads whose key is in `common_keys`.
pub fn build_read_groups<R: BufRead>(
    common_keys: &FxHashSet<GroupKey>,
    builder: &dyn SplitReadBuilder,
    reader: R,
) -> Result<ReadGroups, PipelineError> {
    let mut read_groups = ReadGroups::default();
    let mut count = 0usize;
    let mut kept = 0usize;

    for line in reader.lines() {
        let line = line?;
        if line.is_empty() || builder.is_header(&line) {
            continue;
        }
        count += 1;
        if count % PROGRESS_INTERVAL == 1 {
            debug!("build_read_groups|Processing line {}", count);
        }
        if let Some(read) = builder.build(&line)?.into_aligned() {
            let key = read.key();
            if common_keys.contains(&key) {
                read_groups.entry(key).or_default().push(read);
                kept += 1;
            }
        }
    }
    info!(
        "build_read_groups|Processed {} lines, kept {} reads in {} groups",
        count,
        kept,
        read_groups.len()
    );

    Ok(read_groups)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::LegacySplitReadBuilder;
    use crate::length_validator::LengthValidationError;
    use std::io::Cursor;

    fn builder() -> LegacySplitReadBuilder {
        LegacySplitReadBuilder::new(30)
    }

    fn line(name: &str, side: &str, split_len: u32, position: i64) -> String {
        format!(
            "{}\t{}\t{}\t+\tchr1\t{}\tACGT\tIIII\t0\n",
            name, side, split_len, position
        )
    }

    fn input(lines: &[String]) -> Cursor<Vec<u8>> {
        Cursor::new(lines.concat().into_bytes())
    }

    #[test]
    fn test_common_keys_found_on_both_sides() {
        let lines = [line("readC", "L", 10, 100), line("readC", "R", 20, 200)];
        let keys = identify_common_group_keys(&builder(), input(&lines), 30).unwrap();

        assert_eq!(keys.len(), 1);
        let key = keys.iter().next().unwrap();
        assert_eq!(key.to_string(), "readC|L|10|+|chr1");
    }

    #[test]
    fn test_no_common_keys() {
        let lines = [line("readA", "L", 10, 100), line("readB", "R", 20, 200)];
        let keys = identify_common_group_keys(&builder(), input(&lines), 30).unwrap();
        assert!(keys.is_empty());
    }

    #[test]
    fn test_key_only_on_one_side() {
        let lines = [line("readA", "L", 10, 100), line("readA", "L", 20, 200)];
        let keys = identify_common_group_keys(&builder(), input(&lines), 30).unwrap();
        assert!(keys.is_empty());
    }

    #[test]
    fn test_mixed_intersection() {
        let lines = [
            line("readA", "L", 10, 100),
            line("readB", "R", 20, 100),
            line("readC", "L", 12, 100),
            line("readC", "R", 18, 300),
        ];
        let keys = identify_common_group_keys(&builder(), input(&lines), 30).unwrap();
        let names: Vec<&str> = keys.iter().map(|k| k.name.as_str()).collect();
        assert_eq!(names, vec!["readC"]);
    }

    #[test]
    fn test_length_validation_runs_in_key_discovery() {
        let lines = [line("readA", "L", 10, 100), line("readA", "R", 19, 200)];
        let err = identify_common_group_keys(&builder(), input(&lines), 30).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::LengthValidation(LengthValidationError::LengthMismatch { .. })
        ));

        let lines = [line("readA", "L", 31, 100)];
        let err = identify_common_group_keys(&builder(), input(&lines), 30).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::LengthValidation(LengthValidationError::SplitTooLong { .. })
        ));
    }

    #[test]
    fn test_malformed_line_aborts() {
        let lines = [line("readA", "L", 10, 100), "readA\tL\t20\n".to_string()];
        let err = identify_common_group_keys(&builder(), input(&lines), 30).unwrap_err();
        assert!(matches!(err, PipelineError::Parse(_)));
    }

    #[test]
    fn test_build_read_groups_filters_on_common_keys() {
        let lines = [
            line("readA", "L", 10, 100),
            line("readB", "R", 20, 200),
            line("readA", "R", 20, 300),
        ];
        let common = identify_common_group_keys(&builder(), input(&lines), 30).unwrap();
        let groups = build_read_groups(&common, &builder(), input(&lines)).unwrap();

        assert_eq!(groups.len(), 1);
        let group = groups.values().next().unwrap();
        assert_eq!(group.left.len(), 1);
        assert_eq!(group.right.len(), 1);
        assert_eq!(group.left[0].position, 100);
        assert_eq!(group.right[0].position, 300);
    }

    #[test]
    fn test_build_read_groups_two_left_and_two_right() {
        let lines = [
            line("readA", "L", 10, 100),
            line("readA", "L", 10, 150),
            line("readA", "R", 20, 300),
            line("readA", "R", 20, 350),
        ];
        let common = identify_common_group_keys(&builder(), input(&lines), 30).unwrap();
        let groups = build_read_groups(&common, &builder(), input(&lines)).unwrap();

        assert_eq!(groups.len(), 1);
        let group = groups.values().next().unwrap();
        let left: Vec<i64> = group.left.iter().map(|r| r.position).collect();
        let right: Vec<i64> = group.right.iter().map(|r| r.position).collect();
        assert_eq!(left, vec![100, 150]);
        assert_eq!(right, vec![300, 350]);
    }

    #[test]
    fn test_build_read_groups_empty_key_set() {
        let lines = [line("readA", "L", 10, 100)];
        let groups =
            build_read_groups(&FxHashSet::default(), &builder(), input(&lines)).unwrap();
        assert!(groups.is_empty());
    }
}
