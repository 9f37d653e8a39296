use clap::Parser;
use log::info;
use rsw::builder::InputFormat;
use rsw::fastq_split::split_fastq;
use rsw::pipeline::{default_sam_output, identify_pairs, PairConfig};
use std::io;
use std::path::PathBuf;

/// Common options shared between all commands
#[derive(Parser, Debug)]
struct CommonOpts {
    /// Verbosity level (0 = error, 1 = info, 2 = debug)
    #[clap(short, long, default_value = "0")]
    verbose: u8,
}

/// Pair up split reads that were aligned independently.
#[derive(Parser, Debug)]
#[command(author, version, about, disable_help_subcommand = true)]
enum Args {
    /// Identify left/right pairs among aligned split reads
    Pair {
        #[clap(flatten)]
        common: CommonOpts,

        /// Aligned split reads (plain or BGZF-compressed)
        #[clap(short = 'i', long, value_parser)]
        input: PathBuf,

        /// Output path for the pair report
        #[clap(short = 'o', long, value_parser)]
        output: PathBuf,

        /// Length of the reads before they were split
        #[clap(short = 'l', long, value_parser)]
        read_len: u32,

        /// Smallest accepted distance between the two fragments
        #[clap(long, value_parser, allow_negative_numbers = true)]
        min_distance: i64,

        /// Largest accepted distance between the two fragments
        #[clap(long, value_parser, allow_negative_numbers = true)]
        max_distance: i64,

        /// Layout of the input lines
        #[clap(short = 'f', long, value_enum, default_value_t = InputFormat::Sam)]
        format: InputFormat,

        /// Output path for paired SAM records [default: report path with a .sam extension]
        #[clap(short = 's', long, value_parser)]
        sam_output: Option<PathBuf>,
    },
    /// Split every FASTQ read into left/right fragments at each cut position
    Split {
        #[clap(flatten)]
        common: CommonOpts,

        /// Input FASTQ (plain or BGZF-compressed)
        #[clap(short = 'i', long, value_parser)]
        input: PathBuf,

        /// Output FASTQ
        #[clap(short = 'o', long, value_parser)]
        output: PathBuf,

        /// Minimum number of bases kept on each side of a cut
        #[clap(short = 'm', long, value_parser)]
        split_margin: usize,
    },
}

fn main() -> io::Result<()> {
    let args = Args::parse();

    match args {
        Args::Pair {
            common,
            input,
            output,
            read_len,
            min_distance,
            max_distance,
            format,
            sam_output,
        } => {
            init_logger(&common);
            let config = PairConfig {
                read_len,
                min_distance,
                max_distance,
                format,
            };
            let sam_output = sam_output.unwrap_or_else(|| default_sam_output(&output));
            let summary = identify_pairs(&input, &output, Some(sam_output.as_path()), &config)?;
            info!(
                "{} common keys, {} candidate pairs, {} pairs written",
                summary.common_keys, summary.candidate_pairs, summary.pairs_written
            );
        }
        Args::Split {
            common,
            input,
            output,
            split_margin,
        } => {
            init_logger(&common);
            split_fastq(&input, &output, split_margin)?;
        }
    }

    Ok(())
}

fn init_logger(common: &CommonOpts) {
    env_logger::Builder::new()
        .filter_level(match common.verbose {
            0 => log::LevelFilter::Error,
            1 => log::LevelFilter::Info,
            _ => log::LevelFilter::Debug,
        })
        .init();
}
