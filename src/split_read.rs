//! Split read records
//!
//! A sequencing read that spans a junction is cut into a left and a right
//! fragment before alignment. Each aligned fragment is a [`SplitRead`]; lines
//! that did not align are represented by [`Fragment::Unaligned`].

use std::fmt;

/// Which half of the original read a fragment came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn as_char(self) -> char {
        match self {
            Side::Left => 'L',
            Side::Right => 'R',
        }
    }
}

impl TryFrom<&str> for Side {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "L" => Ok(Side::Left),
            "R" => Ok(Side::Right),
            other => Err(other.to_string()),
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// Strand orientation of an alignment
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Strand {
    #[default]
    Plus,
    Minus,
}

impl Strand {
    pub fn as_char(self) -> char {
        match self {
            Strand::Plus => '+',
            Strand::Minus => '-',
        }
    }

    /// +1 for the plus strand, -1 for the minus strand
    pub fn sign(self) -> i64 {
        match self {
            Strand::Plus => 1,
            Strand::Minus => -1,
        }
    }
}

impl TryFrom<&str> for Strand {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "+" => Ok(Strand::Plus),
            "-" => Ok(Strand::Minus),
            other => Err(other.to_string()),
        }
    }
}

impl fmt::Display for Strand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// One aligned half of an original read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitRead {
    pub name: String,
    pub side: Side,
    pub split_len: u32,
    pub strand: Strand,
    pub chromosome: String,
    pub position: i64,
    pub matches: Option<u32>,
    pub read_len: u32,
}

impl SplitRead {
    /// Canonical read-group key. A right fragment maps onto the key of the
    /// left fragment it would complement.
    pub fn key(&self) -> GroupKey {
        let split_len = match self.side {
            Side::Left => i64::from(self.split_len),
            Side::Right => i64::from(self.read_len) - i64::from(self.split_len),
        };
        GroupKey {
            name: self.name.clone(),
            split_len,
            strand: self.strand,
            chromosome: self.chromosome.clone(),
        }
    }

    /// Distance from the end of the leftmost fragment to the start of the
    /// rightmost one. Negative when the fragments overlap. Saturates at the
    /// `i64` bounds.
    pub fn gap_distance(&self, other: &SplitRead) -> i64 {
        let (leftmost, rightmost) = if other.position < self.position {
            (other, self)
        } else {
            (self, other)
        };
        let leftmost_end = leftmost
            .position
            .saturating_add(i64::from(leftmost.split_len));
        rightmost.position.saturating_sub(leftmost_end)
    }

    /// True if `other` is on the opposite side and the same strand, and sits
    /// on the expected side of this fragment for that strand.
    pub fn is_oriented(&self, other: &SplitRead) -> bool {
        if self.side == other.side || self.strand != other.strand {
            return false;
        }
        let (left_position, right_position) = match self.side {
            Side::Left => (self.position, other.position),
            Side::Right => (other.position, self.position),
        };
        right_position
            .saturating_sub(left_position)
            .saturating_mul(self.strand.sign())
            > 0
    }

    /// Fields written to the pair report, joined by `delimiter`
    pub fn format(&self, delimiter: &str) -> String {
        let matches = self
            .matches
            .map_or_else(|| ".".to_string(), |m| m.to_string());
        [
            self.name.clone(),
            self.side.to_string(),
            self.split_len.to_string(),
            self.strand.to_string(),
            self.chromosome.clone(),
            self.position.to_string(),
            matches,
        ]
        .join(delimiter)
    }
}

/// Result of interpreting one data line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    Aligned(SplitRead),
    Unaligned,
}

impl Fragment {
    pub fn into_aligned(self) -> Option<SplitRead> {
        match self {
            Fragment::Aligned(read) => Some(read),
            Fragment::Unaligned => None,
        }
    }
}

/// Identity shared by the left and right fragments of the same original read
/// aligned to the same chromosome and strand. The side is always the left.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GroupKey {
    pub name: String,
    pub split_len: i64,
    pub strand: Strand,
    pub chromosome: String,
}

impl GroupKey {
    /// Read name both mates of a pair are written under
    pub fn read_name(&self) -> String {
        format!("{}-{}-{}", self.name, Side::Left, self.split_len)
    }

    /// Natural ordering on name and chromosome, then split length and strand
    pub fn natural_cmp(&self, other: &GroupKey) -> std::cmp::Ordering {
        natord::compare(&self.name, &other.name)
            .then_with(|| natord::compare(&self.chromosome, &other.chromosome))
            .then_with(|| self.split_len.cmp(&other.split_len))
            .then_with(|| self.strand.cmp(&other.strand))
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}|{}|{}|{}|{}",
            self.name,
            Side::Left,
            self.split_len,
            self.strand,
            self.chromosome
        )
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn read(side: Side, split_len: u32, strand: Strand, position: i64) -> SplitRead {
        SplitRead {
            name: "name".to_string(),
            side,
            split_len,
            strand,
            chromosome: "chr1".to_string(),
            position,
            matches: Some(5),
            read_len: 30,
        }
    }

    #[test]
    fn test_left_key_passes_through() {
        let left = read(Side::Left, 10, Strand::Plus, 100);
        assert_eq!(left.key().to_string(), "name|L|10|+|chr1");
    }

    #[test]
    fn test_right_key_switches_side_and_split_length() {
        let right = read(Side::Right, 20, Strand::Plus, 100);
        assert_eq!(right.key().to_string(), "name|L|10|+|chr1");
    }

    #[test]
    fn test_key_symmetry_over_all_split_lengths() {
        for split_len in 0..=30 {
            let left = read(Side::Left, split_len, Strand::Minus, 1);
            let right = read(Side::Right, 30 - split_len, Strand::Minus, 500);
            assert_eq!(left.key(), right.key());
        }
        let left = read(Side::Left, 10, Strand::Plus, 1);
        let right = read(Side::Right, 20, Strand::Minus, 1);
        assert_ne!(left.key(), right.key());
    }

    #[test]
    fn test_gap_distance_uses_leftmost_fragment() {
        let a = read(Side::Left, 10, Strand::Plus, 25);
        let b = read(Side::Right, 20, Strand::Plus, 100);
        assert_eq!(a.gap_distance(&b), 65);
        assert_eq!(b.gap_distance(&a), 65);

        // Right label genomically first
        let c = read(Side::Right, 20, Strand::Minus, 25);
        let d = read(Side::Left, 10, Strand::Minus, 100);
        assert_eq!(d.gap_distance(&c), 55);
    }

    #[test]
    fn test_gap_distance_negative_when_overlapping() {
        let a = read(Side::Left, 10, Strand::Plus, 100);
        let b = read(Side::Right, 20, Strand::Plus, 105);
        assert_eq!(a.gap_distance(&b), -5);
    }

    #[test]
    fn test_gap_distance_saturates_at_extreme_positions() {
        let a = read(Side::Left, 10, Strand::Plus, i64::MAX - 5);
        let b = read(Side::Right, 20, Strand::Plus, 0);
        assert_eq!(a.gap_distance(&b), i64::MAX - 25);
        assert_eq!(b.gap_distance(&a), i64::MAX - 25);

        let c = read(Side::Left, 10, Strand::Plus, i64::MIN);
        let d = read(Side::Right, 20, Strand::Plus, i64::MAX);
        assert_eq!(c.gap_distance(&d), i64::MAX);
    }

    #[test]
    fn test_is_oriented_at_extreme_positions() {
        let left = read(Side::Left, 10, Strand::Plus, i64::MIN);
        let right = read(Side::Right, 20, Strand::Plus, i64::MAX);
        assert!(left.is_oriented(&right));
        assert!(right.is_oriented(&left));

        let left = read(Side::Left, 10, Strand::Minus, i64::MIN);
        let right = read(Side::Right, 20, Strand::Minus, i64::MAX);
        assert!(!left.is_oriented(&right));
    }

    #[test]
    fn test_is_oriented() {
        let left = read(Side::Left, 10, Strand::Plus, 1);
        let right = read(Side::Right, 20, Strand::Plus, 2);
        assert!(left.is_oriented(&right));
        assert!(right.is_oriented(&left));

        let left = read(Side::Left, 10, Strand::Minus, 2);
        let right = read(Side::Right, 20, Strand::Minus, 1);
        assert!(left.is_oriented(&right));
        assert!(right.is_oriented(&left));

        let left = read(Side::Left, 10, Strand::Plus, 2);
        let right = read(Side::Right, 20, Strand::Plus, 1);
        assert!(!left.is_oriented(&right));
        assert!(!right.is_oriented(&left));
    }

    #[test]
    fn test_is_oriented_rejects_degenerate_pairs() {
        let left = read(Side::Left, 10, Strand::Plus, 1);
        let same_position = read(Side::Right, 20, Strand::Plus, 1);
        assert!(!left.is_oriented(&same_position));
        assert!(!same_position.is_oriented(&left));

        let other_strand = read(Side::Right, 20, Strand::Minus, 150);
        assert!(!left.is_oriented(&other_strand));
        assert!(!other_strand.is_oriented(&left));

        let same_side = read(Side::Left, 10, Strand::Plus, 150);
        assert!(!left.is_oriented(&same_side));
        assert!(!same_side.is_oriented(&left));
    }

    #[test]
    fn test_format() {
        let mut sr = read(Side::Left, 10, Strand::Plus, 100);
        sr.name = "foo".to_string();
        assert_eq!(sr.format("~"), "foo~L~10~+~chr1~100~5");
        sr.matches = None;
        assert_eq!(sr.format("\t"), "foo\tL\t10\t+\tchr1\t100\t.");
    }

    #[test]
    fn test_into_aligned() {
        assert_eq!(Fragment::Unaligned.into_aligned(), None);
        let aligned = Fragment::Aligned(read(Side::Right, 20, Strand::Plus, 3));
        assert_eq!(aligned.into_aligned().map(|r| r.key().split_len), Some(10));
    }

    #[test]
    fn test_read_name_and_natural_order() {
        let key = read(Side::Right, 20, Strand::Plus, 3).key();
        assert_eq!(key.read_name(), "name-L-10");

        let mut a = key.clone();
        a.chromosome = "chr2".to_string();
        let mut b = key.clone();
        b.chromosome = "chr10".to_string();
        assert_eq!(a.natural_cmp(&b), std::cmp::Ordering::Less);
    }
}
