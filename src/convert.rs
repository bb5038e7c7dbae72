//! Conversion pipeline: history document in, rendered report out.
//!
//! The main entry points are:
//! - [`convert`] drives any [`Renderer`] through the fixed report layout
//! - [`convert_file`] parses an export from disk and writes the report file
//!
//! Reports are written to a temporary sibling file and moved into place
//! only after the renderer finished, so a failed run never leaves a
//! partial report behind.

use crate::cli::{Delimiter, OutputFormat};
use crate::decode::decode_payload;
use crate::error::{ConvertError, Result};
use crate::history::{HistoryDocument, load_history};
use crate::metrics::PhaseResult;
use crate::output::{ColumnKind, Renderer, ReportRenderer};
use crate::time_phase;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs::{self, File};
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};

/// Report columns, in output order.
pub const COLUMNS: [&str; 6] = ["No.", "Name", "URL", "Method", "Request", "Response"];

/// Settings for one conversion.
///
/// # Fields
/// * `format` - Report format
/// * `delimiter` - Field delimiter, CSV only
/// * `output` - Explicit report path; derived from the input path when `None`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConvertOptions {
    pub format: OutputFormat,
    pub delimiter: Delimiter,
    pub output: Option<PathBuf>,
}

impl ConvertOptions {
    /// Path the report for `input` is written to.
    pub fn output_path(&self, input: &Path) -> PathBuf {
        match &self.output {
            Some(path) => path.clone(),
            None => input.with_extension(self.format.extension()),
        }
    }
}

/// Outcome of [`convert_file`].
#[derive(Debug, Clone)]
pub struct ConvertReport {
    pub output: PathBuf,
    pub records: usize,
    pub output_bytes: u64,
    pub phases: Vec<PhaseResult>,
}

/// Renders `document` through `renderer` and returns the number of rows written.
///
/// Each record becomes one row: comment, an always-empty name, URL,
/// method, then the decoded request and response. A missing payload
/// renders as an empty cell.
///
/// # Errors
/// [`ConvertError::Decode`] for a payload that is not valid base64, or any
/// error the renderer reports while writing. `finish` is not called after
/// an error.
pub fn convert<R: Renderer + ?Sized>(document: &HistoryDocument, renderer: &mut R) -> Result<usize> {
    convert_with_progress(document, renderer, &ProgressBar::hidden())
}

fn convert_with_progress<R: Renderer + ?Sized>(
    document: &HistoryDocument,
    renderer: &mut R,
    pb: &ProgressBar,
) -> Result<usize> {
    renderer.begin_header()?;
    for name in COLUMNS {
        renderer.header_column(name)?;
    }
    renderer.end_header()?;

    for (idx, record) in document.iter().enumerate() {
        let number = idx + 1;
        let request = decode_column(record.request.as_deref(), number, "request")?;
        let response = decode_column(record.response.as_deref(), number, "response")?;

        renderer.begin_row()?;
        renderer.row_column(&record.comment, ColumnKind::Plain)?;
        renderer.row_column("", ColumnKind::Plain)?;
        renderer.row_column(&record.url, ColumnKind::Plain)?;
        renderer.row_column(&record.method, ColumnKind::Plain)?;
        renderer.row_column(&request, ColumnKind::Encoded)?;
        renderer.row_column(&response, ColumnKind::Encoded)?;
        renderer.end_row()?;
        pb.inc(1);
    }

    renderer.finish()?;
    Ok(document.len())
}

fn decode_column(payload: Option<&str>, record: usize, column: &'static str) -> Result<String> {
    let Some(payload) = payload else {
        return Ok(String::new());
    };
    tracing::debug!(record, column, encoded_len = payload.len(), "decoding payload");
    decode_payload(payload).map_err(|source| ConvertError::Decode {
        record,
        column,
        source,
    })
}

/// Converts the history export at `input` into a report file.
///
/// The whole export is parsed before the report file is created, so a
/// parse error never touches the output location.
pub fn convert_file(input: &Path, options: &ConvertOptions) -> Result<ConvertReport> {
    let (document, parse_phase) = time_phase!("Parse", { load_history(input) });
    let document = document?;
    tracing::info!(
        input = %input.display(),
        records = document.len(),
        "loaded proxy history"
    );

    let output = options.output_path(input);
    let (written, render_phase) = time_phase!("Render", {
        write_report(&document, options, &output)
    });
    let output_bytes = written?;
    tracing::info!(
        output = %output.display(),
        format = options.format.extension(),
        bytes = output_bytes,
        "report written"
    );

    Ok(ConvertReport {
        output,
        records: document.len(),
        output_bytes,
        phases: vec![parse_phase, render_phase],
    })
}

/// Path of the temporary file a report is staged in.
pub fn staging_path(output: &Path) -> PathBuf {
    let mut name = output.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    output.with_file_name(name)
}

fn write_report(document: &HistoryDocument, options: &ConvertOptions, output: &Path) -> Result<u64> {
    let temp_path = staging_path(output);

    let result = render_to(document, options, &temp_path).and_then(|()| {
        fs::rename(&temp_path, output).map_err(|e| ConvertError::io(output, e))?;
        fs::metadata(output)
            .map(|m| m.len())
            .map_err(|e| ConvertError::io(output, e))
    });

    if result.is_err() {
        // The staged file may not exist if creating it failed.
        let _ = fs::remove_file(&temp_path);
    }
    result
}

fn render_to(document: &HistoryDocument, options: &ConvertOptions, path: &Path) -> Result<()> {
    let file = File::create(path).map_err(|e| ConvertError::io(path, e))?;
    let mut renderer = ReportRenderer::new(BufWriter::new(file), options.format, options.delimiter);

    let pb = ProgressBar::new(document.len() as u64);
    if let Ok(style) =
        ProgressStyle::default_bar().template("{bar:40} {pos}/{len} records [{elapsed}]")
    {
        pb.set_style(style);
    }

    let result = convert_with_progress(document, &mut renderer, &pb);
    pb.finish_and_clear();
    result.map(|_| ()).map_err(|e| attach_path(e, path))
}

/// Turns sink failures from either renderer into [`ConvertError::Io`] for `path`.
fn attach_path(err: ConvertError, path: &Path) -> ConvertError {
    match err {
        ConvertError::Write(source) => ConvertError::io(path, source),
        ConvertError::Csv(err) if err.is_io_error() => match err.into_kind() {
            csv::ErrorKind::Io(source) => ConvertError::io(path, source),
            other => ConvertError::io(path, io::Error::other(format!("{other:?}"))),
        },
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::HistoryRecord;
    use base64::Engine as _;
    use base64::engine::general_purpose::STANDARD;

    /// Records every call as a line so call order can be asserted.
    #[derive(Default)]
    struct CallLog(Vec<String>);

    impl Renderer for CallLog {
        fn begin_header(&mut self) -> Result<()> {
            self.0.push("begin_header".into());
            Ok(())
        }
        fn header_column(&mut self, name: &str) -> Result<()> {
            self.0.push(format!("th {name}"));
            Ok(())
        }
        fn end_header(&mut self) -> Result<()> {
            self.0.push("end_header".into());
            Ok(())
        }
        fn begin_row(&mut self) -> Result<()> {
            self.0.push("begin_row".into());
            Ok(())
        }
        fn row_column(&mut self, value: &str, kind: ColumnKind) -> Result<()> {
            self.0.push(format!("td {kind:?} {value}"));
            Ok(())
        }
        fn end_row(&mut self) -> Result<()> {
            self.0.push("end_row".into());
            Ok(())
        }
        fn finish(&mut self) -> Result<()> {
            self.0.push("finish".into());
            Ok(())
        }
    }

    fn record(comment: &str, request: Option<&str>) -> HistoryRecord {
        HistoryRecord {
            comment: comment.to_string(),
            url: "https://example.com/".to_string(),
            method: "GET".to_string(),
            request: request.map(str::to_string),
            response: Some("T0s=".to_string()),
        }
    }

    #[test]
    fn test_call_sequence() {
        let document = HistoryDocument {
            records: vec![record("c1", Some("R0VU")), record("c2", None)],
        };
        let mut log = CallLog::default();
        assert_eq!(convert(&document, &mut log).unwrap(), 2);

        let expected: Vec<String> = [
            "begin_header",
            "th No.",
            "th Name",
            "th URL",
            "th Method",
            "th Request",
            "th Response",
            "end_header",
            "begin_row",
            "td Plain c1",
            "td Plain ",
            "td Plain https://example.com/",
            "td Plain GET",
            "td Encoded GET",
            "td Encoded OK",
            "end_row",
            "begin_row",
            "td Plain c2",
            "td Plain ",
            "td Plain https://example.com/",
            "td Plain GET",
            "td Encoded ",
            "td Encoded OK",
            "end_row",
            "finish",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        assert_eq!(log.0, expected);
    }

    #[test]
    fn test_decode_error_names_record_and_column() {
        let document = HistoryDocument {
            records: vec![record("ok", Some("R0VU")), record("bad", Some("%%%"))],
        };
        let mut log = CallLog::default();
        let err = convert(&document, &mut log).unwrap_err();
        match err {
            ConvertError::Decode { record, column, .. } => {
                assert_eq!(record, 2);
                assert_eq!(column, "request");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(!log.0.contains(&"finish".to_string()));
    }

    /// Sink that rejects every write.
    struct FullDisk;

    impl io::Write for FullDisk {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::other("no space left on device"))
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_sink_failures_report_output_path() {
        // Large enough to overflow the csv writer's internal buffer mid-record.
        let body = STANDARD.encode("x".repeat(64 * 1024));
        let document = HistoryDocument {
            records: vec![record("big", Some(&body))],
        };
        let path = Path::new("/reports/history.csv");

        for format in [OutputFormat::Csv, OutputFormat::Html] {
            let mut renderer = ReportRenderer::new(FullDisk, format, Delimiter::Comma);
            let err = convert(&document, &mut renderer).unwrap_err();
            match attach_path(err, path) {
                ConvertError::Io { path: reported, .. } => assert_eq!(reported, path),
                other => panic!("unexpected error for {format:?}: {other}"),
            }
        }
    }

    #[test]
    fn test_non_sink_errors_pass_through() {
        let err = ConvertError::Parse("bad".into());
        assert!(matches!(
            attach_path(err, Path::new("out.csv")),
            ConvertError::Parse(_)
        ));
    }

    #[test]
    fn test_output_path_derivation() {
        let input = Path::new("/data/session.xml");
        let csv = ConvertOptions::default();
        assert_eq!(csv.output_path(input), PathBuf::from("/data/session.csv"));

        let html = ConvertOptions {
            format: OutputFormat::Html,
            ..Default::default()
        };
        assert_eq!(html.output_path(input), PathBuf::from("/data/session.html"));

        let explicit = ConvertOptions {
            output: Some(PathBuf::from("/elsewhere/report.txt")),
            ..Default::default()
        };
        assert_eq!(
            explicit.output_path(input),
            PathBuf::from("/elsewhere/report.txt")
        );

        assert_eq!(
            ConvertOptions::default().output_path(Path::new("export")),
            PathBuf::from("export.csv")
        );
    }

    #[test]
    fn test_staging_path() {
        assert_eq!(
            staging_path(Path::new("/data/session.csv")),
            PathBuf::from("/data/session.csv.tmp")
        );
    }
}
