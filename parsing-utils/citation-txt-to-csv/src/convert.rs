use anyhow::{Context, Result};
use csv::{Terminator, Writer, WriterBuilder};
use glob::{glob_with, MatchOptions};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info, warn};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::record::{OutputRecord, HEADERS};
use crate::splitter::split_blocks;

pub const DEFAULT_INPUT_DIR: &str = "citation_project";
pub const DEFAULT_PATTERN: &str = "*";
pub const DEFAULT_OUTPUT_DIR: &str = "csv_files";
pub const DEFAULT_DELIMITER: u8 = b'$';
pub const COMBINED_FILE_NAME: &str = "_all_publications.csv";

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

#[derive(Debug, Clone)]
pub struct ConvertConfig {
    pub input_dir: PathBuf,
    /// Glob matched against file names directly inside `input_dir`.
    pub pattern: String,
    pub output_dir: PathBuf,
    pub delimiter: u8,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from(DEFAULT_INPUT_DIR),
            pattern: DEFAULT_PATTERN.to_string(),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            delimiter: DEFAULT_DELIMITER,
        }
    }
}

#[derive(Debug, Default)]
pub struct ConversionSummary {
    pub units_processed: usize,
    pub records_written: usize,
    pub unit_outputs: Vec<PathBuf>,
    pub combined_output: PathBuf,
}

/// Parses a delimiter argument. It must be one ASCII character that can't collide
/// with the field contents or the CSV quoting.
pub fn parse_delimiter(value: &str) -> Result<u8, String> {
    let mut chars = value.chars();
    let (Some(c), None) = (chars.next(), chars.next()) else {
        return Err(format!("delimiter must be a single character, got '{}'", value));
    };
    if !c.is_ascii() {
        return Err(format!("delimiter must be an ASCII character, got '{}'", c));
    }
    if matches!(c, ',' | ';' | '"' | '\n' | '\r') {
        return Err(format!("'{}' can't be used as a delimiter", c.escape_default()));
    }
    Ok(c as u8)
}

/// Lists the input units, sorted by path. Matches that aren't regular files are skipped.
pub fn find_input_files(input_dir: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
    if !input_dir.is_dir() {
        anyhow::bail!("Input directory not found: {}", input_dir.display());
    }

    let full_pattern = input_dir.join(pattern);
    let pattern_str = full_pattern.to_string_lossy();
    info!("Searching for files matching pattern: {}", pattern_str);

    let options = MatchOptions {
        require_literal_leading_dot: true,
        ..MatchOptions::new()
    };
    let mut paths = Vec::new();
    for entry in glob_with(&pattern_str, options)
        .with_context(|| format!("Invalid input pattern: {}", pattern_str))?
    {
        let path = entry.with_context(|| format!("Failed to read a match for: {}", pattern_str))?;
        if path.is_file() {
            paths.push(path);
        } else {
            warn!("Skipping non-file match: {}", path.display());
        }
    }
    paths.sort();

    if paths.is_empty() {
        warn!("No files found matching the pattern: {}", pattern_str);
    }
    Ok(paths)
}

/// Reads a whole input unit as UTF-8, dropping a leading byte-order mark.
pub fn read_unit(path: &Path) -> Result<String> {
    let bytes = fs::read(path)
        .with_context(|| format!("Failed to read input file: {}", path.display()))?;
    let body = bytes.strip_prefix(UTF8_BOM).unwrap_or(&bytes[..]);
    let text = std::str::from_utf8(body)
        .with_context(|| format!("Input file is not valid UTF-8: {}", path.display()))?;
    Ok(text.to_string())
}

/// Splits a unit's text into blocks and maps each block to a record, in order.
pub fn parse_publications(text: &str) -> Vec<OutputRecord> {
    split_blocks(text.lines())
        .map(OutputRecord::from_block)
        .collect()
}

/// Output file name for an input unit: everything before the first `.`, plus `.csv`.
pub fn output_file_name(input: &Path) -> Result<String> {
    let file_name = input
        .file_name()
        .and_then(|name| name.to_str())
        .with_context(|| format!("Input file has no usable name: {}", input.display()))?;
    let base = file_name.split('.').next().unwrap_or(file_name);
    Ok(format!("{}.csv", base))
}

fn create_writer(path: &Path, delimiter: u8) -> Result<Writer<File>> {
    let mut file = File::create(path)
        .with_context(|| format!("Failed to create output file: {}", path.display()))?;
    file.write_all(UTF8_BOM)
        .with_context(|| format!("Failed to write to output file: {}", path.display()))?;

    Ok(WriterBuilder::new()
        .delimiter(delimiter)
        .terminator(Terminator::CRLF)
        .from_writer(file))
}

/// Writes the header row followed by `records` to `path`, replacing any existing file.
pub fn write_records(path: &Path, records: &[OutputRecord], delimiter: u8) -> Result<()> {
    let mut writer = create_writer(path, delimiter)?;
    writer
        .write_record(HEADERS)
        .with_context(|| format!("Failed to write header to: {}", path.display()))?;
    for record in records {
        writer
            .write_record(record.as_row())
            .with_context(|| format!("Failed to write record to: {}", path.display()))?;
    }
    writer
        .flush()
        .with_context(|| format!("Failed to flush output file: {}", path.display()))?;
    Ok(())
}

/// Converts every input unit and writes the per-unit files plus the combined file.
///
/// Stops at the first read, decode or write error.
pub fn convert(config: &ConvertConfig) -> Result<ConversionSummary> {
    fs::create_dir_all(&config.output_dir).with_context(|| {
        format!("Failed to create output directory: {}", config.output_dir.display())
    })?;

    let files = find_input_files(&config.input_dir, &config.pattern)?;
    info!("Found {} files to process.", files.len());

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} Converting [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files {msg}")?
            .progress_chars("#>-"),
    );

    let mut summary = ConversionSummary::default();
    let mut all_publications: Vec<OutputRecord> = Vec::new();

    for input in &files {
        let text = read_unit(input)?;
        let publications = parse_publications(&text);
        debug!(
            "{}: {} blocks, {} with abstract and keywords",
            input.display(),
            publications.len(),
            publications
                .iter()
                .filter(|p| p.populated_fields() == HEADERS.len())
                .count()
        );

        let output_path = config.output_dir.join(output_file_name(input)?);
        write_records(&output_path, &publications, config.delimiter)?;
        info!(
            "Wrote {} records from {} to {}",
            publications.len(),
            input.display(),
            output_path.display()
        );

        summary.units_processed += 1;
        summary.unit_outputs.push(output_path);
        all_publications.extend(publications);
        pb.inc(1);
    }
    pb.finish_with_message("Conversion complete.");

    let combined_path = config.output_dir.join(COMBINED_FILE_NAME);
    write_records(&combined_path, &all_publications, config.delimiter)?;
    info!(
        "Wrote {} records to {}",
        all_publications.len(),
        combined_path.display()
    );

    summary.records_written = all_publications.len();
    summary.combined_output = combined_path;
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delimiter_validation() {
        assert_eq!(parse_delimiter("$"), Ok(b'$'));
        assert_eq!(parse_delimiter("|"), Ok(b'|'));
        assert_eq!(parse_delimiter("\t"), Ok(b'\t'));
        assert!(parse_delimiter(",").is_err());
        assert!(parse_delimiter(";").is_err());
        assert!(parse_delimiter("").is_err());
        assert!(parse_delimiter("$$").is_err());
        assert!(parse_delimiter("§").is_err());
    }

    #[test]
    fn output_name_stops_at_first_dot() {
        assert_eq!(output_file_name(Path::new("in/refs.txt")).unwrap(), "refs.csv");
        assert_eq!(output_file_name(Path::new("in/refs.2020.txt")).unwrap(), "refs.csv");
        assert_eq!(output_file_name(Path::new("in/noext")).unwrap(), "noext.csv");
    }

    #[test]
    fn parses_publications_in_block_order() {
        let text = "First author\nFirst title\n\n\n\nSecond author\n";
        let records = parse_publications(text);

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].authors.as_deref(), Some("First author"));
        assert_eq!(records[0].title.as_deref(), Some("First title"));
        assert_eq!(records[1].authors.as_deref(), Some("Second author"));
    }

    #[test]
    fn crlf_line_endings_separate_blocks() {
        let records = parse_publications("a\r\nb\r\n\r\nc\r\n");
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].title.as_deref(), Some("b"));
    }
}
