//! Library crate for burpconv
//!
//! Converts Burp Suite HTTP proxy history exports (XML with base64
//! encoded requests and responses) into CSV or HTML reports.
//!
//! # Modules
//!
//! - [`history`]: Export data structures and XML parser
//! - [`decode`]: Payload decoding with visible escapes for binary bytes
//! - [`output`]: Report renderers (CSV, HTML)
//! - [`convert`]: Pipeline tying parser, decoder and renderer together
//! - [`cli`]: Command-line interface definitions
//! - [`metrics`]: Phase timing and profiling
//! - [`error`]: Error type shared by all stages

pub mod cli;
pub mod convert;
pub mod decode;
pub mod error;
pub mod history;
pub mod metrics;
pub mod output;

pub use cli::{Args, Delimiter, OutputFormat};
pub use convert::{ConvertOptions, ConvertReport, convert, convert_file};
pub use error::{ConvertError, Result};
pub use history::{HistoryDocument, HistoryRecord, load_history, parse_history};
