//! Converts plain-text citation dumps into delimited CSV files.
//!
//! Each input file holds publications separated by blank lines, one field per line.
//! [`splitter`] groups the lines into blocks, [`record`] maps a block onto the
//! 11-column schema, and [`convert`] drives the per-file and combined output.

pub mod convert;
pub mod record;
pub mod splitter;

pub use convert::{convert, ConversionSummary, ConvertConfig};
pub use record::{OutputRecord, HEADERS};
pub use splitter::{split_blocks, PublicationBlock};
