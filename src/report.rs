use crate::pairs::{CandidatePair, PairIndex};
use crate::read_group::PROGRESS_INTERVAL;
use log::{debug, info};
use std::io::{self, Write};

/// One report row: left fields, right fields, gap distance
pub fn format_pair(pair: &CandidatePair<'_>, delimiter: &str) -> String {
    [
        pair.left.format(delimiter),
        pair.right.format(delimiter),
        pair.gap_distance.to_string(),
    ]
    .join(delimiter)
}

/// Write every surviving pair, groups in natural key order and pairs in
/// the order they were generated. Returns the number of rows written.
pub fn write_rsw_pairs<W: Write>(
    index: &PairIndex<'_>,
    writer: &mut W,
    delimiter: &str,
) -> io::Result<usize> {
    let mut keys: Vec<_> = index.keys().copied().collect();
    keys.sort_by(|a, b| a.natural_cmp(b));

    let mut count = 0usize;
    for key in keys {
        for pair in &index[key] {
            count += 1;
            if count % PROGRESS_INTERVAL == 1 {
                debug!("write_rsw_pairs|Processing pair {}", count);
            }
            writeln!(writer, "{}", format_pair(pair, delimiter))?;
        }
    }
    info!("write_rsw_pairs|Processed {} pairs", count);

    Ok(count)
}
