//! CSV encoding of a parsed table, used to ship previews to clients

use csv::WriterBuilder;
use std::io;

use crate::tabular::results::TabularData;

/// Re-encode a table as CSV text, header first. An empty table encodes to no bytes.
pub fn encode(table: &TabularData) -> io::Result<Vec<u8>> {
    let mut wtr = WriterBuilder::new().flexible(true).from_writer(vec![]);

    if !table.is_empty() {
        wtr.write_record(&table.columns)?;
        for row in &table.rows {
            wtr.write_record(row)?;
        }
    }

    wtr.into_inner().map_err(|e| e.into_error())
}
