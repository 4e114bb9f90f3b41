//! Comma-separated export. Every field is double-quoted unconditionally and
//! every line, header included, ends with `\n`.

use csv::{QuoteStyle, ReaderBuilder, Terminator, WriterBuilder};

use super::rows::{Cell, ExportRow, COLUMNS};
use super::{ExportError, ExportFormat};

fn encoding_error(e: impl std::fmt::Display) -> ExportError {
    ExportError::Encoding {
        format: ExportFormat::Csv,
        reason: e.to_string(),
    }
}

pub fn encode(rows: &[ExportRow<'_>]) -> Result<Vec<u8>, ExportError> {
    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer
        .write_record(COLUMNS.iter().map(|c| c.header))
        .map_err(encoding_error)?;
    for row in rows {
        let fields: Vec<String> = row.cells().iter().map(Cell::render).collect();
        writer.write_record(&fields).map_err(encoding_error)?;
    }

    writer.into_inner().map_err(encoding_error)
}

/// Read an exported file back as records, header first.
pub fn parse(bytes: &[u8]) -> Result<Vec<Vec<String>>, ExportError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .from_reader(bytes);
    reader
        .records()
        .map(|record| {
            record
                .map(|r| r.iter().map(str::to_string).collect())
                .map_err(encoding_error)
        })
        .collect()
}
