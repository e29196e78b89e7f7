//! Module `parser`
//!
//! Reads comma-delimited text into [`TabularData`]. Quoting follows the usual
//! CSV rules: a field may be wrapped in double quotes to hold commas, quotes
//! or line breaks, and `""` inside a quoted field is a literal quote.
//!
//! The `csv` reader silently tolerates stray quotes, so the input is first
//! checked for quote structure and rejected with a located [`ParseError`]
//! before records are split. Ragged rows are not an error.

use csv::ReaderBuilder;
use log::debug;
use std::io::Read;

use crate::error::{ParseError, ParseErrorKind};
use crate::tabular::results::TabularData;

const DELIMITER: u8 = b',';
const QUOTE: u8 = b'"';

/// Parse delimiter-separated text. The first record becomes `columns`.
pub fn parse<R: Read>(mut reader: R) -> Result<TabularData, ParseError> {
    let mut buffer = Vec::new();
    reader
        .read_to_end(&mut buffer)
        .map_err(|e| ParseError::new(1, ParseErrorKind::Read(e)))?;

    parse_bytes(&buffer)
}

/// Parse an in-memory buffer
pub fn parse_bytes(data: &[u8]) -> Result<TabularData, ParseError> {
    check_quoting(data)?;

    let mut rdr = ReaderBuilder::new()
        .delimiter(DELIMITER)
        .quote(QUOTE)
        .has_headers(false)
        .flexible(true)
        .from_reader(data);

    let mut table = TabularData::default();
    for (index, result) in rdr.records().enumerate() {
        let record = result.map_err(from_csv_error)?;
        let fields: Vec<String> = record.iter().map(|f| f.to_string()).collect();

        if index == 0 {
            table.columns = fields;
        } else {
            table.rows.push(fields);
        }
    }

    debug!(
        "Parsed {} columns and {} rows",
        table.columns.len(),
        table.rows.len()
    );
    Ok(table)
}

#[derive(Clone, Copy)]
enum QuoteState {
    FieldStart,
    Unquoted,
    Quoted,
    /// Saw a quote inside a quoted field: either a closing quote or half of `""`
    QuoteInQuoted,
}

/// Walks the raw bytes and rejects anything the strict CSV grammar would not accept
fn check_quoting(data: &[u8]) -> Result<(), ParseError> {
    let mut state = QuoteState::FieldStart;
    let mut line: u64 = 1;
    let mut quote_line: u64 = 1;

    for &byte in data {
        state = match (state, byte) {
            (QuoteState::FieldStart, QUOTE) => {
                quote_line = line;
                QuoteState::Quoted
            }
            (QuoteState::Unquoted, QUOTE) => {
                return Err(ParseError::new(line, ParseErrorKind::BareQuote));
            }
            (QuoteState::FieldStart | QuoteState::Unquoted, DELIMITER | b'\r') => {
                QuoteState::FieldStart
            }
            (QuoteState::FieldStart | QuoteState::Unquoted, b'\n') => {
                line += 1;
                QuoteState::FieldStart
            }
            (QuoteState::FieldStart | QuoteState::Unquoted, _) => QuoteState::Unquoted,

            (QuoteState::Quoted, QUOTE) => QuoteState::QuoteInQuoted,
            (QuoteState::Quoted, b'\n') => {
                line += 1;
                QuoteState::Quoted
            }
            (QuoteState::Quoted, _) => QuoteState::Quoted,

            (QuoteState::QuoteInQuoted, QUOTE) => QuoteState::Quoted,
            (QuoteState::QuoteInQuoted, DELIMITER | b'\r') => QuoteState::FieldStart,
            (QuoteState::QuoteInQuoted, b'\n') => {
                line += 1;
                QuoteState::FieldStart
            }
            (QuoteState::QuoteInQuoted, _) => {
                return Err(ParseError::new(line, ParseErrorKind::MisplacedQuote));
            }
        };
    }

    if let QuoteState::Quoted = state {
        return Err(ParseError::new(quote_line, ParseErrorKind::UnterminatedQuote));
    }
    Ok(())
}

fn from_csv_error(err: csv::Error) -> ParseError {
    let line = err.position().map(|p| p.line()).unwrap_or(1);
    match err.into_kind() {
        csv::ErrorKind::Utf8 { .. } => ParseError::new(line, ParseErrorKind::InvalidUtf8),
        csv::ErrorKind::Io(e) => ParseError::new(line, ParseErrorKind::Read(e)),
        other => ParseError::new(line, ParseErrorKind::Malformed(format!("{:?}", other))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{self, Cursor};

    fn strings(fields: &[&str]) -> Vec<String> {
        fields.iter().map(|f| f.to_string()).collect()
    }

    #[test]
    fn test_header_and_rows() {
        let table = parse(Cursor::new("name,val\nx,1\ny,2\n")).unwrap();

        assert_eq!(table.columns, strings(&["name", "val"]));
        assert_eq!(table.rows, vec![strings(&["x", "1"]), strings(&["y", "2"])]);
    }

    #[test]
    fn test_empty_input() {
        let table = parse(io::empty()).unwrap();

        assert!(table.columns.is_empty());
        assert!(table.rows.is_empty());
        assert!(table.is_empty());
    }

    #[test]
    fn test_header_only() {
        let table = parse_bytes(b"a,b,c").unwrap();

        assert_eq!(table.columns, strings(&["a", "b", "c"]));
        assert!(table.rows.is_empty());
    }

    #[test]
    fn test_quoted_fields() {
        let input = "title,quote\n\"Smith, J.\",\"He said \"\"hi\"\"\"\nmulti,\"line one\nline two\"\n";
        let table = parse_bytes(input.as_bytes()).unwrap();

        assert_eq!(
            table.rows,
            vec![
                strings(&["Smith, J.", "He said \"hi\""]),
                strings(&["multi", "line one\nline two"]),
            ]
        );
    }

    #[test]
    fn test_ragged_rows_pass_through() {
        let table = parse_bytes(b"a,b\n1\n1,2,3\n").unwrap();

        assert_eq!(table.columns, strings(&["a", "b"]));
        assert_eq!(table.rows, vec![strings(&["1"]), strings(&["1", "2", "3"])]);
    }

    #[test]
    fn test_duplicate_headers_and_empty_fields() {
        let table = parse_bytes(b"id,id,\n,2,\n").unwrap();

        assert_eq!(table.columns, strings(&["id", "id", ""]));
        assert_eq!(table.rows, vec![strings(&["", "2", ""])]);
    }

    #[test]
    fn test_crlf_and_blank_lines() {
        let table = parse_bytes(b"a,b\r\n\r\n1,2\r\n").unwrap();

        assert_eq!(table.columns, strings(&["a", "b"]));
        assert_eq!(table.rows, vec![strings(&["1", "2"])]);
    }

    #[test]
    fn test_unterminated_quote() {
        let err = parse_bytes(b"a,b\n1,\"open\n2,3\n").unwrap_err();

        assert_eq!(err.line, 2);
        assert!(matches!(err.kind, ParseErrorKind::UnterminatedQuote));
    }

    #[test]
    fn test_bare_quote() {
        let err = parse_bytes(b"a,b\nx,ab\"c\n").unwrap_err();

        assert_eq!(err.line, 2);
        assert!(matches!(err.kind, ParseErrorKind::BareQuote));
    }

    #[test]
    fn test_text_after_closing_quote() {
        let err = parse_bytes(b"a,b\n\n\"x\"y,1\n").unwrap_err();

        assert_eq!(err.line, 3);
        assert!(matches!(err.kind, ParseErrorKind::MisplacedQuote));
    }

    #[test]
    fn test_invalid_utf8() {
        let err = parse_bytes(b"a,b\n\xff\xfe,1\n").unwrap_err();

        assert!(matches!(err.kind, ParseErrorKind::InvalidUtf8));
    }

    #[test]
    fn test_read_failure_is_reported() {
        struct FailingReader;
        impl Read for FailingReader {
            fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
                Err(io::Error::new(io::ErrorKind::Other, "disk gone"))
            }
        }

        let err = parse(FailingReader).unwrap_err();
        assert!(matches!(err.kind, ParseErrorKind::Read(_)));
    }
}
