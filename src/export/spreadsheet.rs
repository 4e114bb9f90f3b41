//! Single-sheet `.xlsx` export.
//!
//! `layout` decides every cell; `encode` only hands that grid to the
//! workbook writer, so tests can check cell values without unzipping a file.

use rust_xlsxwriter::{Format, Workbook, XlsxError};

use super::rows::{Cell, Column, ExportRow, COLUMNS};
use super::{ExportError, ExportFormat};

pub const SHEET_NAME: &str = "Diabetes Assessments";

/// Cell grid for one sheet, header row excluded.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetLayout {
    pub name: &'static str,
    pub columns: &'static [Column; 12],
    pub rows: Vec<[Cell; 12]>,
}

pub fn layout(rows: &[ExportRow<'_>]) -> SheetLayout {
    SheetLayout {
        name: SHEET_NAME,
        columns: &COLUMNS,
        rows: rows.iter().map(ExportRow::cells).collect(),
    }
}

pub fn encode(rows: &[ExportRow<'_>]) -> Result<Vec<u8>, ExportError> {
    encode_layout(&layout(rows))
}

/// Write `sheet` cell for cell: headers in row 0, `sheet.rows[i][j]` at
/// `(i + 1, j)`, `Cell::Number` as a numeric cell and `Cell::Text` as a
/// string cell. No value is derived here.
pub fn encode_layout(sheet: &SheetLayout) -> Result<Vec<u8>, ExportError> {
    write_workbook(sheet).map_err(|e| ExportError::Encoding {
        format: ExportFormat::Spreadsheet,
        reason: e.to_string(),
    })
}

fn write_workbook(sheet: &SheetLayout) -> Result<Vec<u8>, XlsxError> {
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();

    let worksheet = workbook.add_worksheet();
    worksheet.set_name(sheet.name)?;

    for (col, column) in sheet.columns.iter().enumerate() {
        let col = col as u16;
        worksheet.set_column_width(col, column.width)?;
        worksheet.write_string_with_format(0, col, column.header, &header_format)?;
    }

    for (i, cells) in sheet.rows.iter().enumerate() {
        let row = i as u32 + 1;
        for (col, cell) in cells.iter().enumerate() {
            let col = col as u16;
            match cell {
                Cell::Text(text) => worksheet.write_string(row, col, text.as_str())?,
                Cell::Number(n) => worksheet.write_number(row, col, *n)?,
            };
        }
    }

    workbook.save_to_buffer()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    use crate::export::rows::build_rows;
    use crate::models::{PatientRecord, PredictionResult, RiskLabel};

    #[test]
    fn empty_layout_has_no_data_rows() {
        let sheet = layout(&[]);
        assert_eq!(sheet.name, "Diabetes Assessments");
        assert!(sheet.rows.is_empty());
        assert_eq!(sheet.columns[0].header, "Assessment ID");
    }

    #[test]
    fn numeric_fields_stay_numeric() {
        let at = Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap();
        let result = PredictionResult::new(RiskLabel::High, 0.9, at, PatientRecord::default()).unwrap();
        let rows = build_rows(Some(&result), &[]);
        let sheet = layout(&rows);
        assert_eq!(sheet.rows.len(), 1);
        assert_eq!(sheet.rows[0][4], Cell::Number(45.0));
        assert_eq!(sheet.rows[0][6], Cell::Number(25.0));
        assert_eq!(sheet.rows[0][2], Cell::Text("High Risk".into()));
    }

    #[test]
    fn encoded_workbook_is_zip_container() {
        let at = Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap();
        let result = PredictionResult::new(RiskLabel::Low, 0.2, at, PatientRecord::default()).unwrap();
        let bytes = encode(&build_rows(Some(&result), &[])).unwrap();
        assert!(bytes.len() > 4);
        assert_eq!(&bytes[..2], b"PK");

        let empty = encode(&[]).unwrap();
        assert_eq!(&empty[..2], b"PK");
    }

    #[test]
    fn encode_writes_the_shared_layout() {
        let at = Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap();
        let result = PredictionResult::new(RiskLabel::Low, 0.2, at, PatientRecord::default()).unwrap();
        let rows = build_rows(Some(&result), &[]);

        let sheet = layout(&rows);
        assert_eq!(sheet.rows, vec![rows[0].cells()]);
        assert!(encode_layout(&sheet).unwrap().starts_with(b"PK"));

        let mut bad = sheet.clone();
        bad.name = "bad/name";
        assert!(matches!(
            encode_layout(&bad).unwrap_err(),
            ExportError::Encoding { format: ExportFormat::Spreadsheet, .. }
        ));
    }
}
