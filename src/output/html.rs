//! HTML renderer for proxy history reports.
//!
//! Produces a standalone page with an inline stylesheet and a single
//! table. Request and response bodies are wrapped in `<pre>` so that
//! HTTP line breaks survive. All cell text is HTML-escaped.

use super::{ColumnKind, Renderer};
use crate::error::Result;
use std::io::Write;

const PREAMBLE: &str = r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>Burp Suite proxy history</title>
<style>
table {
    border-collapse: collapse;
}
table, th, td {
    border: 1px solid black;
    font-family: Arial, sans-serif;
    padding: 5px;
}
th {
    text-align: left;
}
td {
    vertical-align: top;
}
</style>
</head>
<body>
<table><thead><tr>
"#;

const HEADER_END: &str = "</tr></thead><tbody>\n";

const FOOTER: &str = "</tbody></table>\n</body></html>\n";

/// Writes the report as an HTML table.
pub struct HtmlRenderer<W: Write> {
    sink: W,
}

impl<W: Write> HtmlRenderer<W> {
    pub fn new(sink: W) -> Self {
        Self { sink }
    }
}

impl<W: Write> Renderer for HtmlRenderer<W> {
    fn begin_header(&mut self) -> Result<()> {
        self.sink.write_all(PREAMBLE.as_bytes())?;
        Ok(())
    }

    fn header_column(&mut self, name: &str) -> Result<()> {
        writeln!(self.sink, "<th>{}</th>", html_escape(name))?;
        Ok(())
    }

    fn end_header(&mut self) -> Result<()> {
        self.sink.write_all(HEADER_END.as_bytes())?;
        Ok(())
    }

    fn begin_row(&mut self) -> Result<()> {
        self.sink.write_all(b"<tr>\n")?;
        Ok(())
    }

    fn row_column(&mut self, value: &str, kind: ColumnKind) -> Result<()> {
        let value = html_escape(value);
        match kind {
            ColumnKind::Plain => writeln!(self.sink, "<td>{value}</td>")?,
            ColumnKind::Encoded => writeln!(self.sink, "<td><pre>{value}</pre></td>")?,
        }
        Ok(())
    }

    fn end_row(&mut self) -> Result<()> {
        self.sink.write_all(b"</tr>\n")?;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.sink.write_all(FOOTER.as_bytes())?;
        self.sink.flush()?;
        Ok(())
    }
}

/// HTML-escape a string for safe insertion into element content.
///
/// Escapes: & < > " '
pub fn html_escape(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#x27;"),
            _ => result.push(c),
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_html_escape() {
        assert_eq!(
            html_escape("<script>&\"'"),
            "&lt;script&gt;&amp;&quot;&#x27;"
        );
        assert_eq!(html_escape("plain text"), "plain text");
    }

    #[test]
    fn test_document_framing() {
        let mut buf = Vec::new();
        {
            let mut r = HtmlRenderer::new(&mut buf);
            r.begin_header().unwrap();
            r.header_column("URL").unwrap();
            r.end_header().unwrap();
            r.begin_row().unwrap();
            r.row_column("https://example.com/?a=1&b=2", ColumnKind::Plain)
                .unwrap();
            r.row_column("GET / HTTP/1.1\r\nHost: x\r\n", ColumnKind::Encoded)
                .unwrap();
            r.end_row().unwrap();
            r.finish().unwrap();
        }
        let out = String::from_utf8(buf).unwrap();

        assert!(out.starts_with("<!DOCTYPE html>\n"));
        assert!(out.contains("<table><thead><tr>\n<th>URL</th>\n</tr></thead><tbody>\n"));
        assert!(out.contains("<tr>\n<td>https://example.com/?a=1&amp;b=2</td>\n"));
        assert!(out.contains("<td><pre>GET / HTTP/1.1\r\nHost: x\r\n</pre></td>\n</tr>\n"));
        assert!(out.ends_with("</tbody></table>\n</body></html>\n"));
    }

    #[test]
    fn test_encoded_markup_is_not_injected() {
        let mut buf = Vec::new();
        {
            let mut r = HtmlRenderer::new(&mut buf);
            r.begin_row().unwrap();
            r.row_column("<script>&\"'", ColumnKind::Encoded).unwrap();
            r.end_row().unwrap();
        }
        let out = String::from_utf8(buf).unwrap();
        assert_eq!(
            out,
            "<tr>\n<td><pre>&lt;script&gt;&amp;&quot;&#x27;</pre></td>\n</tr>\n"
        );
    }

    #[test]
    fn test_no_truncation() {
        let long = "z".repeat(40_000);
        let mut buf = Vec::new();
        {
            let mut r = HtmlRenderer::new(&mut buf);
            r.row_column(&long, ColumnKind::Encoded).unwrap();
        }
        assert!(String::from_utf8(buf).unwrap().contains(&long));
    }
}
