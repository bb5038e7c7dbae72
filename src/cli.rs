//! CLI interface definitions for the `burpconv` application.
//!
//! This module defines command-line arguments using [`clap`] and exposes:
//!
//! - [`Args`]: the main struct parsed from CLI inputs
//! - [`OutputFormat`]: report format, `csv` or `html`
//! - [`Delimiter`]: CSV field delimiter, `,` or `;`
//!
//! # Example
//!
//! ```bash
//! burpconv history.xml --format csv --csv-delimiter ';'
//! ```

use crate::convert::ConvertOptions;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Converts Burp Suite HTTP proxy history files to CSV or HTML files.
#[derive(Parser, Debug)]
#[command(name = "burpconv", version, about)]
pub struct Args {
    /// Burp Suite HTTP proxy history file
    pub filename: PathBuf,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Csv)]
    pub format: OutputFormat,

    /// CSV delimiter
    #[arg(long, value_enum, default_value_t = Delimiter::Comma)]
    pub csv_delimiter: Delimiter,

    /// Write the report here instead of next to the input file
    #[arg(long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Show phase timings and write a stats JSON file next to the report
    #[arg(long, default_value_t = false)]
    pub profile: bool,

    /// Enable debug logging (or set BURPCONV_LOG)
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

impl Args {
    /// Conversion settings selected on the command line.
    pub fn to_options(&self) -> ConvertOptions {
        ConvertOptions {
            format: self.format,
            delimiter: self.csv_delimiter,
            output: self.output.clone(),
        }
    }
}

/// Report format.
///
/// # Variants
/// * `Csv` - Delimited text for spreadsheets
/// * `Html` - Standalone page with one table
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Csv,
    Html,
}

impl OutputFormat {
    /// File extension of reports in this format, without the dot.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Html => "html",
        }
    }
}

/// CSV field delimiter.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum Delimiter {
    #[default]
    #[value(name = ",")]
    Comma,
    #[value(name = ";")]
    Semicolon,
}

impl Delimiter {
    pub fn as_byte(&self) -> u8 {
        match self {
            Delimiter::Comma => b',',
            Delimiter::Semicolon => b';',
        }
    }
}
