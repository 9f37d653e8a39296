//! Split read builders
//!
//! Each builder interprets one line of a particular input format as a
//! [`Fragment`]. Three formats are supported:
//! - **legacy**: `name, side, split_len, strand, chr, position, seq, quality, matches`
//! - **positional**: `name-<L|R>-<split_len>, strand, chr, position, seq, quality, matches`
//! - **sam**: standard SAM records whose QNAME carries the `-<L|R>-<split_len>` suffix

use crate::split_read::{Fragment, Side, SplitRead, Strand};
use clap::ValueEnum;
use noodles::sam::alignment::record::Flags;
use regex::Regex;
use std::fmt;
use std::num::ParseIntError;
use std::sync::LazyLock;

#[derive(Debug)]
pub enum ParseErrorKind {
    NotEnoughFields { expected: usize, found: usize },
    InvalidInteger(ParseIntError),
    InvalidSide(String),
    InvalidStrand(String),
    InvalidReadName(String),
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseErrorKind::NotEnoughFields { expected, found } => {
                write!(f, "expected at least {} fields, found {}", expected, found)
            }
            ParseErrorKind::InvalidInteger(e) => write!(f, "invalid integer field: {}", e),
            ParseErrorKind::InvalidSide(s) => write!(f, "invalid side '{}'", s),
            ParseErrorKind::InvalidStrand(s) => write!(f, "invalid strand '{}'", s),
            ParseErrorKind::InvalidReadName(s) => {
                write!(f, "read name '{}' does not end in -<L|R>-<split length>", s)
            }
        }
    }
}

/// A data line that could not be interpreted
#[derive(Debug)]
pub struct ParseError {
    pub line: String,
    pub kind: ParseErrorKind,
}

impl ParseError {
    pub fn new(line: &str, kind: ParseErrorKind) -> Self {
        ParseError {
            line: line.trim_end().to_string(),
            kind,
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Could not parse line: '{}'; {}", self.line, self.kind)
    }
}

impl std::error::Error for ParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.kind {
            ParseErrorKind::InvalidInteger(e) => Some(e),
            _ => None,
        }
    }
}

/// Interprets lines of one input format.
pub trait SplitReadBuilder {
    /// Header lines are skipped by grouping and copied through on output.
    fn is_header(&self, line: &str) -> bool;

    fn build(&self, line: &str) -> Result<Fragment, ParseError>;
}

/// Input formats, selected explicitly on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum InputFormat {
    /// Nine delimited columns carrying side and split length directly
    Legacy,
    /// Bowtie-style rows with the split encoded in the read name
    Positional,
    /// SAM records with the split encoded in the read name
    #[default]
    Sam,
}

impl InputFormat {
    pub fn builder(self, read_len: u32) -> Box<dyn SplitReadBuilder> {
        match self {
            InputFormat::Legacy => Box::new(LegacySplitReadBuilder::new(read_len)),
            InputFormat::Positional => Box::new(PositionalSplitReadBuilder::new(read_len)),
            InputFormat::Sam => Box::new(SamSplitReadBuilder::new(read_len)),
        }
    }
}

fn split_fields<'a>(
    line: &'a str,
    delimiter: char,
    expected: usize,
) -> Result<Vec<&'a str>, ParseError> {
    let fields: Vec<&str> = line.trim_end().split(delimiter).collect();
    if fields.len() < expected {
        return Err(ParseError::new(
            line,
            ParseErrorKind::NotEnoughFields {
                expected,
                found: fields.len(),
            },
        ));
    }
    Ok(fields)
}

fn parse_int<T: std::str::FromStr<Err = ParseIntError>>(
    line: &str,
    field: &str,
) -> Result<T, ParseError> {
    field
        .parse::<T>()
        .map_err(|e| ParseError::new(line, ParseErrorKind::InvalidInteger(e)))
}

fn parse_side(line: &str, field: &str) -> Result<Side, ParseError> {
    Side::try_from(field).map_err(|s| ParseError::new(line, ParseErrorKind::InvalidSide(s)))
}

fn parse_strand(line: &str, field: &str) -> Result<Strand, ParseError> {
    Strand::try_from(field).map_err(|s| ParseError::new(line, ParseErrorKind::InvalidStrand(s)))
}

// Compiled once; the pattern is a literal.
static READ_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.+)-([LR])-(\d+)$").expect("read name pattern is valid"));

/// Splits `<name>-<L|R>-<split_len>` into its parts
fn parse_read_name(line: &str, read_name: &str) -> Result<(String, Side, u32), ParseError> {
    let caps = READ_NAME.captures(read_name).ok_or_else(|| {
        ParseError::new(line, ParseErrorKind::InvalidReadName(read_name.to_string()))
    })?;
    let side = parse_side(line, &caps[2])?;
    let split_len = parse_int::<u32>(line, &caps[3])?;
    Ok((caps[1].to_string(), side, split_len))
}

pub struct LegacySplitReadBuilder {
    read_len: u32,
    delimiter: char,
}

impl LegacySplitReadBuilder {
    pub fn new(read_len: u32) -> Self {
        LegacySplitReadBuilder {
            read_len,
            delimiter: '\t',
        }
    }

    #[cfg(test)]
    pub(crate) fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }
}

impl SplitReadBuilder for LegacySplitReadBuilder {
    fn is_header(&self, _line: &str) -> bool {
        false
    }

    fn build(&self, line: &str) -> Result<Fragment, ParseError> {
        let fields = split_fields(line, self.delimiter, 9)?;
        Ok(Fragment::Aligned(SplitRead {
            name: fields[0].to_string(),
            side: parse_side(line, fields[1])?,
            split_len: parse_int(line, fields[2])?,
            strand: parse_strand(line, fields[3])?,
            chromosome: fields[4].to_string(),
            position: parse_int(line, fields[5])?,
            matches: Some(parse_int(line, fields[8])?),
            read_len: self.read_len,
        }))
    }
}

pub struct PositionalSplitReadBuilder {
    read_len: u32,
    delimiter: char,
}

impl PositionalSplitReadBuilder {
    pub fn new(read_len: u32) -> Self {
        PositionalSplitReadBuilder {
            read_len,
            delimiter: '\t',
        }
    }

    #[cfg(test)]
    pub(crate) fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }
}

impl SplitReadBuilder for PositionalSplitReadBuilder {
    fn is_header(&self, _line: &str) -> bool {
        false
    }

    fn build(&self, line: &str) -> Result<Fragment, ParseError> {
        let fields = split_fields(line, self.delimiter, 7)?;
        let (name, side, split_len) = parse_read_name(line, fields[0])?;
        Ok(Fragment::Aligned(SplitRead {
            name,
            side,
            split_len,
            strand: parse_strand(line, fields[1])?,
            chromosome: fields[2].to_string(),
            position: parse_int(line, fields[3])?,
            matches: Some(parse_int(line, fields[6])?),
            read_len: self.read_len,
        }))
    }
}

pub struct SamSplitReadBuilder {
    read_len: u32,
    delimiter: char,
}

impl SamSplitReadBuilder {
    pub fn new(read_len: u32) -> Self {
        SamSplitReadBuilder {
            read_len,
            delimiter: '\t',
        }
    }

    #[cfg(test)]
    pub(crate) fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }
}

impl SplitReadBuilder for SamSplitReadBuilder {
    fn is_header(&self, line: &str) -> bool {
        line.starts_with('@')
    }

    fn build(&self, line: &str) -> Result<Fragment, ParseError> {
        let fields = split_fields(line, self.delimiter, 4)?;
        let flags = Flags::from(parse_int::<u16>(line, fields[1])?);
        if flags.is_unmapped() {
            return Ok(Fragment::Unaligned);
        }
        let (name, side, split_len) = parse_read_name(line, fields[0])?;
        let strand = if flags.is_reverse_complemented() {
            Strand::Minus
        } else {
            Strand::Plus
        };
        Ok(Fragment::Aligned(SplitRead {
            name,
            side,
            split_len,
            strand,
            chromosome: fields[2].to_string(),
            position: parse_int(line, fields[3])?,
            matches: None,
            read_len: self.read_len,
        }))
    }
}
