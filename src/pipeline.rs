//! Identifying split read pairs
//!
//! The input is read three times: once to find keys present on both sides,
//! once to collect the reads for those keys, and, for SAM input, once more to
//! write the paired alignments. Each pass completes before the next begins.

use crate::builder::{InputFormat, ParseError};
use crate::input::open_reader;
use crate::length_validator::LengthValidationError;
use crate::pair_filter::{CompositeFilter, DistanceFilter, OrientationFilter};
use crate::pairs::{build_pairs_from_groups, pair_count};
use crate::read_group::{build_read_groups, identify_common_group_keys};
use crate::report::write_rsw_pairs;
use crate::sam_writer::write_sam_pairs;
use log::{info, warn};
use std::fmt;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub enum PipelineError {
    Io(io::Error),
    Parse(ParseError),
    LengthValidation(LengthValidationError),
    InvalidConfig(String),
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineError::Io(e) => write!(f, "IO error: {}", e),
            PipelineError::Parse(e) => write!(f, "{}", e),
            PipelineError::LengthValidation(e) => write!(f, "{}", e),
            PipelineError::InvalidConfig(msg) => write!(f, "Invalid configuration: {}", msg),
        }
    }
}

impl std::error::Error for PipelineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PipelineError::Io(e) => Some(e),
            PipelineError::Parse(e) => Some(e),
            PipelineError::LengthValidation(e) => Some(e),
            PipelineError::InvalidConfig(_) => None,
        }
    }
}

impl From<io::Error> for PipelineError {
    fn from(e: io::Error) -> Self {
        PipelineError::Io(e)
    }
}

impl From<ParseError> for PipelineError {
    fn from(e: ParseError) -> Self {
        PipelineError::Parse(e)
    }
}

impl From<LengthValidationError> for PipelineError {
    fn from(e: LengthValidationError) -> Self {
        PipelineError::LengthValidation(e)
    }
}

impl From<PipelineError> for io::Error {
    fn from(e: PipelineError) -> Self {
        match e {
            PipelineError::Io(e) => e,
            PipelineError::InvalidConfig(msg) => io::Error::new(io::ErrorKind::InvalidInput, msg),
            other => io::Error::new(io::ErrorKind::InvalidData, other.to_string()),
        }
    }
}

/// Configuration for the pair command
#[derive(Debug, Clone)]
pub struct PairConfig {
    /// Length of the reads before they were split
    pub read_len: u32,
    /// Smallest accepted gap distance (inclusive)
    pub min_distance: i64,
    /// Largest accepted gap distance (inclusive)
    pub max_distance: i64,
    pub format: InputFormat,
}

impl PairConfig {
    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.read_len == 0 {
            return Err(PipelineError::InvalidConfig(
                "read length must be greater than zero".to_string(),
            ));
        }
        if self.max_distance <= self.min_distance {
            return Err(PipelineError::InvalidConfig(
                "max distance must be greater than min distance".to_string(),
            ));
        }
        Ok(())
    }

    pub fn filter(&self) -> CompositeFilter {
        CompositeFilter::new()
            .with(DistanceFilter::new(self.min_distance, self.max_distance))
            .with(OrientationFilter)
    }
}

/// Counts reported once a run finishes
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PairSummary {
    pub common_keys: usize,
    pub candidate_pairs: usize,
    pub pairs_written: usize,
    pub sam_records_written: Option<usize>,
}

/// Paired SAM path derived from the report path: `pairs.txt` -> `pairs.sam`
pub fn default_sam_output(report: &Path) -> PathBuf {
    report.with_extension("sam")
}

pub fn identify_pairs(
    input: &Path,
    report: &Path,
    sam_output: Option<&Path>,
    config: &PairConfig,
) -> Result<PairSummary, PipelineError> {
    config.validate()?;
    info!(
        "process_file|read_len:{}, input:{}, output:{}, minimum_distance:{}, maximum_distance:{}, format:{:?}",
        config.read_len,
        input.display(),
        report.display(),
        config.min_distance,
        config.max_distance,
        config.format
    );

    let builder = config.format.builder(config.read_len);

    let common_keys =
        identify_common_group_keys(builder.as_ref(), open_reader(input)?, config.read_len)?;
    let read_groups = build_read_groups(&common_keys, builder.as_ref(), open_reader(input)?)?;

    let pairs = build_pairs_from_groups(&read_groups);
    let candidate_pairs = pair_count(&pairs);
    let pairs = config.filter().apply(pairs);

    let mut writer = BufWriter::new(File::create(report)?);
    let pairs_written = write_rsw_pairs(&pairs, &mut writer, "\t")?;
    writer.flush()?;
    info!("process_file|Pairs written to {}", report.display());

    let sam_records_written = match (config.format, sam_output) {
        (InputFormat::Sam, Some(sam_output)) => {
            let mut writer = BufWriter::new(File::create(sam_output)?);
            let written = write_sam_pairs(
                &pairs,
                builder.as_ref(),
                open_reader(input)?,
                &mut writer,
                '\t',
            )?;
            writer.flush()?;
            info!("process_file|Paired alignments written to {}", sam_output.display());
            Some(written)
        }
        (format, Some(sam_output)) => {
            warn!(
                "Skipping {}: paired alignments can only be regenerated from SAM input, not {:?}",
                sam_output.display(),
                format
            );
            None
        }
        (_, None) => None,
    };

    info!("process_file|{} complete", input.display());
    Ok(PairSummary {
        common_keys: common_keys.len(),
        candidate_pairs,
        pairs_written,
        sam_records_written,
    })
}
