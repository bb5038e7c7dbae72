//! Report renderers for converted proxy history.
//!
//! A renderer receives the report as a strict sequence of calls and
//! serializes it incrementally to its sink:
//!
//! 1. [`Renderer::begin_header`], [`Renderer::header_column`] per column, [`Renderer::end_header`]
//! 2. per record: [`Renderer::begin_row`], [`Renderer::row_column`] per column, [`Renderer::end_row`]
//! 3. [`Renderer::finish`]
//!
//! Callers are responsible for keeping that order; renderers do not
//! validate it.
//!
//! # Available Renderers
//!
//! - **CSV**: spreadsheet-dialect delimited text, see [`csv::CsvRenderer`]
//! - **HTML**: a standalone page with a single table, see [`html::HtmlRenderer`]

pub mod csv;
pub mod html;

use crate::cli::{Delimiter, OutputFormat};
use crate::error::Result;
use std::io::Write;

pub use self::csv::CsvRenderer;
pub use self::html::HtmlRenderer;

/// How a row value should be treated by the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// Short metadata such as the URL or method.
    Plain,
    /// Decoded request or response content.
    Encoded,
}

/// Incremental table writer shared by all output formats.
pub trait Renderer {
    fn begin_header(&mut self) -> Result<()>;
    fn header_column(&mut self, name: &str) -> Result<()>;
    fn end_header(&mut self) -> Result<()>;
    fn begin_row(&mut self) -> Result<()>;
    fn row_column(&mut self, value: &str, kind: ColumnKind) -> Result<()>;
    fn end_row(&mut self) -> Result<()>;
    /// Writes any trailer and flushes the sink. Called exactly once.
    fn finish(&mut self) -> Result<()>;
}

/// The renderer selected for a run.
pub enum ReportRenderer<W: Write> {
    Csv(CsvRenderer<W>),
    Html(HtmlRenderer<W>),
}

impl<W: Write> ReportRenderer<W> {
    /// Builds the renderer for `format`. `delimiter` only affects CSV output.
    pub fn new(sink: W, format: OutputFormat, delimiter: Delimiter) -> Self {
        match format {
            OutputFormat::Csv => ReportRenderer::Csv(CsvRenderer::new(sink, delimiter.as_byte())),
            OutputFormat::Html => ReportRenderer::Html(HtmlRenderer::new(sink)),
        }
    }
}

macro_rules! dispatch {
    ($self:ident, $r:ident => $call:expr) => {
        match $self {
            ReportRenderer::Csv($r) => $call,
            ReportRenderer::Html($r) => $call,
        }
    };
}

impl<W: Write> Renderer for ReportRenderer<W> {
    fn begin_header(&mut self) -> Result<()> {
        dispatch!(self, r => r.begin_header())
    }

    fn header_column(&mut self, name: &str) -> Result<()> {
        dispatch!(self, r => r.header_column(name))
    }

    fn end_header(&mut self) -> Result<()> {
        dispatch!(self, r => r.end_header())
    }

    fn begin_row(&mut self) -> Result<()> {
        dispatch!(self, r => r.begin_row())
    }

    fn row_column(&mut self, value: &str, kind: ColumnKind) -> Result<()> {
        dispatch!(self, r => r.row_column(value, kind))
    }

    fn end_row(&mut self) -> Result<()> {
        dispatch!(self, r => r.end_row())
    }

    fn finish(&mut self) -> Result<()> {
        dispatch!(self, r => r.finish())
    }
}
