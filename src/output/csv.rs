//! CSV renderer for proxy history reports.
//!
//! Output follows the spreadsheet dialect: fields are quoted only when
//! they contain the delimiter, a quote or a line break, embedded quotes
//! are doubled and records end with CRLF.

use super::{ColumnKind, Renderer};
use crate::error::Result;
use csv::{QuoteStyle, Terminator, Writer, WriterBuilder};
use std::borrow::Cow;
use std::io::Write;

/// Largest number of characters a spreadsheet cell can hold.
pub const MAX_CELL_CHARS: usize = 32_760;

/// Characters kept from an oversized cell before [`TRUNCATION_MARKER`].
pub const TRUNCATED_CELL_CHARS: usize = 32_744;

/// Appended to cells that were cut down to fit [`MAX_CELL_CHARS`].
pub const TRUNCATION_MARKER: &str = "..[TRUNCATED!]";

/// Writes one CSV record per call sequence row.
///
/// Header and row columns are buffered and written as a single record
/// when the header or row ends.
pub struct CsvRenderer<W: Write> {
    writer: Writer<W>,
    record: Vec<String>,
}

impl<W: Write> CsvRenderer<W> {
    /// Creates a renderer writing to `sink` with the given field delimiter.
    pub fn new(sink: W, delimiter: u8) -> Self {
        let writer = WriterBuilder::new()
            .delimiter(delimiter)
            .quote_style(QuoteStyle::Necessary)
            .terminator(Terminator::CRLF)
            .from_writer(sink);
        Self {
            writer,
            record: Vec::with_capacity(6),
        }
    }

    fn flush_record(&mut self) -> Result<()> {
        self.writer.write_record(&self.record)?;
        self.record.clear();
        Ok(())
    }
}

impl<W: Write> Renderer for CsvRenderer<W> {
    fn begin_header(&mut self) -> Result<()> {
        self.record.clear();
        Ok(())
    }

    fn header_column(&mut self, name: &str) -> Result<()> {
        self.record.push(name.to_string());
        Ok(())
    }

    fn end_header(&mut self) -> Result<()> {
        self.flush_record()
    }

    fn begin_row(&mut self) -> Result<()> {
        self.record.clear();
        Ok(())
    }

    fn row_column(&mut self, value: &str, kind: ColumnKind) -> Result<()> {
        let value = match kind {
            ColumnKind::Encoded => truncate_cell(value),
            ColumnKind::Plain => Cow::Borrowed(value),
        };
        self.record.push(value.into_owned());
        Ok(())
    }

    fn end_row(&mut self) -> Result<()> {
        self.flush_record()
    }

    fn finish(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

/// Cuts `value` down to fit a spreadsheet cell.
///
/// Values of at most [`MAX_CELL_CHARS`] characters are returned unchanged.
/// Longer values keep their first [`TRUNCATED_CELL_CHARS`] characters
/// followed by [`TRUNCATION_MARKER`].
pub fn truncate_cell(value: &str) -> Cow<'_, str> {
    // Byte length bounds the character count from above.
    if value.len() <= MAX_CELL_CHARS || value.chars().count() <= MAX_CELL_CHARS {
        return Cow::Borrowed(value);
    }
    let cut = value
        .char_indices()
        .nth(TRUNCATED_CELL_CHARS)
        .map(|(idx, _)| idx)
        .unwrap_or(value.len());
    Cow::Owned(format!("{}{}", &value[..cut], TRUNCATION_MARKER))
}
