//! Splitting FASTQ reads into left/right fragments
//!
//! Every read is cut at each position in `margin..=len - margin`, producing a
//! `<header>-L-<left len>` and a `<header>-R-<right len>` record per cut. The
//! suffixes are what the positional and SAM builders parse back after
//! alignment.

use crate::input::open_reader;
use log::{debug, info};
use std::fmt;
use std::fs::File;
use std::io::{self, BufRead, BufWriter, Write};
use std::path::Path;

/// The four lines of one FASTQ record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FastqStanza {
    pub header: String,
    pub seq: String,
    pub score_header: String,
    pub score: String,
}

impl FastqStanza {
    /// Spaces in the header become underscores so aligners keep the whole
    /// name.
    pub fn new(header: &str, seq: &str, score_header: &str, score: &str) -> Self {
        FastqStanza {
            header: header.replace(' ', "_"),
            seq: seq.to_string(),
            score_header: score_header.to_string(),
            score: score.to_string(),
        }
    }

    /// Cut at `position`; the caller keeps `position <= seq.len()`.
    pub fn split(&self, position: usize) -> (FastqStanza, FastqStanza) {
        let right_len = self.seq.len() - position;
        let left = FastqStanza {
            header: format!("{}-L-{}", self.header, position),
            seq: self.seq[..position].to_string(),
            score_header: format!("{}-L-{}", self.score_header, position),
            score: self.score[..position].to_string(),
        };
        let right = FastqStanza {
            header: format!("{}-R-{}", self.header, right_len),
            seq: self.seq[position..].to_string(),
            score_header: format!("{}-R-{}", self.score_header, right_len),
            score: self.score[position..].to_string(),
        };
        (left, right)
    }
}

impl fmt::Display for FastqStanza {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\n{}\n{}\n{}",
            self.header, self.seq, self.score_header, self.score
        )
    }
}

/// Left/right stanzas for every cut position, in increasing position order
pub fn build_splits(stanza: &FastqStanza, margin: usize) -> Vec<FastqStanza> {
    let len = stanza.seq.len();
    if margin > len / 2 {
        return Vec::new();
    }
    let mut stanzas = Vec::with_capacity(2 * (len - 2 * margin + 1));
    for position in margin..=(len - margin) {
        let (left, right) = stanza.split(position);
        stanzas.push(left);
        stanzas.push(right);
    }
    stanzas
}

/// Reads FASTQ stanzas, skipping anything before the first `@` line. After
/// that lines are taken strictly four at a time, so quality strings starting
/// with `@` are not mistaken for headers.
pub struct StanzaReader<R> {
    lines: io::Lines<R>,
    started: bool,
}

impl<R: BufRead> StanzaReader<R> {
    pub fn new(reader: R) -> Self {
        StanzaReader {
            lines: reader.lines(),
            started: false,
        }
    }

    fn next_header(&mut self) -> io::Result<Option<String>> {
        if self.started {
            return self.lines.next().transpose();
        }
        for line in self.lines.by_ref() {
            let line = line?;
            if line.starts_with('@') {
                self.started = true;
                return Ok(Some(line));
            }
        }
        Ok(None)
    }

    fn read_stanza(&mut self) -> io::Result<Option<FastqStanza>> {
        let Some(header) = self.next_header()? else {
            return Ok(None);
        };
        let mut body = Vec::with_capacity(3);
        for _ in 0..3 {
            match self.lines.next().transpose()? {
                Some(line) => body.push(line),
                None => {
                    return Err(io::Error::new(
                        io::ErrorKind::UnexpectedEof,
                        format!("Truncated FASTQ record '{}'", header),
                    ))
                }
            }
        }
        if body[0].len() != body[2].len() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!(
                    "FASTQ record '{}' has {} bases but {} quality scores",
                    header,
                    body[0].len(),
                    body[2].len()
                ),
            ));
        }
        if !body[0].is_ascii() || !body[2].is_ascii() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("FASTQ record '{}' contains non-ASCII bases or scores", header),
            ));
        }
        Ok(Some(FastqStanza::new(&header, &body[0], &body[1], &body[2])))
    }
}

impl<R: BufRead> Iterator for StanzaReader<R> {
    type Item = io::Result<FastqStanza>;

    fn next(&mut self) -> Option<Self::Item> {
        self.read_stanza().transpose()
    }
}

/// Write the splits of every stanza. Returns (reads in, records out).
pub fn write_stanzas<I, W>(stanzas: I, writer: &mut W, margin: usize) -> io::Result<(usize, usize)>
where
    I: IntoIterator<Item = io::Result<FastqStanza>>,
    W: Write,
{
    let mut reads = 0usize;
    let mut records = 0usize;
    for stanza in stanzas {
        let stanza = stanza?;
        reads += 1;
        if reads % 100_000 == 1 {
            debug!("write_stanzas|Processing read {}", reads);
        }
        for split in build_splits(&stanza, margin) {
            writeln!(writer, "{}", split)?;
            records += 1;
        }
    }
    Ok((reads, records))
}

pub fn split_fastq(input: &Path, output: &Path, margin: usize) -> io::Result<(usize, usize)> {
    let reader = StanzaReader::new(open_reader(input)?);
    let mut writer = BufWriter::new(File::create(output)?);
    let (reads, records) = write_stanzas(reader, &mut writer, margin)?;
    writer.flush()?;
    info!(
        "split_fastq|Split {} reads from {} into {} records in {}",
        reads,
        input.display(),
        records,
        output.display()
    );
    Ok((reads, records))
}
