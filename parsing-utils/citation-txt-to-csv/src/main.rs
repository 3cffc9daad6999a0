use anyhow::Result;
use citation_txt_to_csv::convert::{
    self, parse_delimiter, ConvertConfig, DEFAULT_INPUT_DIR, DEFAULT_OUTPUT_DIR, DEFAULT_PATTERN,
};
use clap::Parser;
use log::{info, LevelFilter};
use simple_logger::SimpleLogger;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use time::macros::format_description;

#[derive(Parser)]
#[command(name = "Citation TXT to CSV Converter")]
#[command(about = "Convert plain-text publication lists into delimited CSV files, one per input file plus a combined file")]
#[command(version = "0.1.0")]
struct Cli {
    #[arg(short, long, default_value = DEFAULT_INPUT_DIR, help = "Directory containing the TXT citation files")]
    input: PathBuf,

    #[arg(short, long, default_value = DEFAULT_PATTERN, help = "Glob for input files inside the input directory")]
    pattern: String,

    #[arg(short, long, default_value = DEFAULT_OUTPUT_DIR, help = "Directory the CSV files are written to")]
    output: PathBuf,

    #[arg(short, long, default_value = "$", value_parser = parse_delimiter, help = "Single character separating CSV fields")]
    delimiter: u8,

    #[arg(short, long, default_value = "INFO", help = "Logging level (DEBUG, INFO, WARN, ERROR)")]
    log_level: String,
}

fn setup_logging(log_level_str: &str) -> Result<()> {
    let log_level = match log_level_str.to_uppercase().as_str() {
        "DEBUG" => LevelFilter::Debug,
        "INFO" => LevelFilter::Info,
        "WARN" | "WARNING" => LevelFilter::Warn,
        "ERROR" => LevelFilter::Error,
        other => {
            eprintln!("Invalid log level '{}', defaulting to INFO.", other);
            LevelFilter::Info
        }
    };

    SimpleLogger::new()
        .with_level(log_level)
        .with_timestamp_format(format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"))
        .init()?;

    Ok(())
}

fn format_elapsed(elapsed: Duration) -> String {
    let total_secs = elapsed.as_secs();
    let minutes = total_secs / 60;
    let seconds = total_secs % 60;
    let millis = elapsed.subsec_millis();

    if minutes > 0 {
        format!("{}m {}s", minutes, seconds)
    } else {
        format!("{}.{:03}s", seconds, millis)
    }
}

fn main() -> Result<()> {
    let start_time = Instant::now();
    let cli = Cli::parse();

    setup_logging(&cli.log_level)?;
    info!("Starting citation conversion");

    let config = ConvertConfig {
        input_dir: cli.input,
        pattern: cli.pattern,
        output_dir: cli.output,
        delimiter: cli.delimiter,
    };
    info!("Input directory: {}", config.input_dir.display());
    info!("Output directory: {}", config.output_dir.display());
    info!("Field delimiter: '{}'", config.delimiter as char);

    let summary = convert::convert(&config)?;

    info!("-------------------- FINAL SUMMARY --------------------");
    info!("Total execution time: {}", format_elapsed(start_time.elapsed()));
    info!("Input files converted: {}", summary.units_processed);
    info!("Publications written: {}", summary.records_written);
    for path in &summary.unit_outputs {
        info!("  - {}", path.display());
    }
    info!("Combined output: {}", summary.combined_output.display());
    info!("-------------------------------------------------------");

    Ok(())
}
