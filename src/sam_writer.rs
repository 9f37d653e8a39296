//! Paired SAM output
//!
//! Re-reads the original SAM input and writes each aligned record once per
//! surviving pair it belongs to, rewritten as one mate of that pair.

use crate::builder::{ParseError, ParseErrorKind, SplitReadBuilder};
use crate::pairs::{CandidatePair, PairIndex};
use crate::pipeline::PipelineError;
use crate::read_group::PROGRESS_INTERVAL;
use crate::split_read::{Fragment, SplitRead};
use log::{debug, info};
use noodles::sam::alignment::record::Flags;
use std::io::{BufRead, Write};

// QNAME FLAG RNAME POS MAPQ CIGAR RNEXT PNEXT TLEN
const QNAME: usize = 0;
const FLAG: usize = 1;
const RNEXT: usize = 6;
const PNEXT: usize = 7;
const TLEN: usize = 8;
const MIN_FIELDS: usize = 9;

/// Flags for `read` as one mate of a pair whose other member sits at
/// `mate_position`.
pub fn mate_flags(is_first: bool, position: i64, mate_position: i64) -> Flags {
    let mut flags = Flags::SEGMENTED | Flags::PROPERLY_SEGMENTED;
    if is_first {
        flags.insert(Flags::FIRST_SEGMENT);
    } else {
        flags.insert(Flags::LAST_SEGMENT);
    }
    if mate_position < position {
        flags.insert(Flags::REVERSE_COMPLEMENTED);
        if is_first {
            flags.insert(Flags::MATE_REVERSE_COMPLEMENTED);
        }
    }
    flags
}

/// Rewrite `line` as the mate of `pair` that `read` represents. `None` if
/// `read` is not part of the pair.
pub fn pair_record(
    line: &str,
    delimiter: char,
    read: &SplitRead,
    pair: &CandidatePair<'_>,
) -> Result<Option<String>, ParseError> {
    if !pair.contains(read) {
        return Ok(None);
    }
    let is_first = pair.left == read;
    let mate = if is_first { pair.right } else { pair.left };

    let mut fields: Vec<String> = line.trim_end().split(delimiter).map(String::from).collect();
    if fields.len() < MIN_FIELDS {
        return Err(ParseError::new(
            line,
            ParseErrorKind::NotEnoughFields {
                expected: MIN_FIELDS,
                found: fields.len(),
            },
        ));
    }

    let flags = mate_flags(is_first, read.position, mate.position);
    fields[QNAME] = read.key().read_name();
    fields[FLAG] = u16::from(flags).to_string();
    fields[RNEXT] = "=".to_string();
    fields[PNEXT] = mate.position.to_string();
    fields[TLEN] = mate.position.saturating_sub(read.position).to_string();

    let separator = delimiter.to_string();
    Ok(Some(fields.join(separator.as_str())))
}

/// Third pass over the input. Headers are copied through; aligned records
/// are written once per surviving pair containing them. Returns the number
/// of alignment records written.
pub fn write_sam_pairs<R: BufRead, W: Write>(
    index: &PairIndex<'_>,
    builder: &dyn SplitReadBuilder,
    reader: R,
    writer: &mut W,
    delimiter: char,
) -> Result<usize, PipelineError> {
    let mut count = 0usize;
    let mut written = 0usize;

    for line in reader.lines() {
        let line = line?;
        if line.is_empty() {
            continue;
        }
        count += 1;
        if count % PROGRESS_INTERVAL == 1 {
            debug!("write_sam_pairs|Processing line {}", count);
        }
        if builder.is_header(&line) {
            writeln!(writer, "{}", line)?;
            continue;
        }

        let read = match builder.build(&line)? {
            Fragment::Aligned(read) => read,
            Fragment::Unaligned => continue,
        };
        let Some(pairs) = index.get(&read.key()) else {
            continue;
        };
        for pair in pairs {
            if let Some(record) = pair_record(&line, delimiter, &read, pair)? {
                writeln!(writer, "{}", record)?;
                written += 1;
            }
        }
    }
    info!(
        "write_sam_pairs|Processed {} lines, wrote {} paired records",
        count, written
    );

    Ok(written)
}
