// lib.rs
pub mod builder;
pub mod fastq_split;
pub mod input;
pub mod length_validator;
pub mod pair_filter;
pub mod pairs;
pub mod pipeline;
pub mod read_group;
pub mod report;
pub mod sam_writer;
pub mod split_read;
