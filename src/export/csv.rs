//! CSV encoding of an [`ExportTable`].
//!
//! Rows are joined with `\n` and the output carries no trailing newline.
//! Quoting follows RFC 4180 (only cells holding a delimiter, quote or line
//! break are quoted). Text cells that a spreadsheet would evaluate as a
//! formula get a leading `'`.

use super::ExportTable;
use crate::error::{ReportError, Result};
use crate::format::parse_number;
use csv::{QuoteStyle, Terminator, WriterBuilder};
use std::borrow::Cow;

/// Neutralize cells starting with `=`, `+`, `-`, `@`, tab or carriage return
/// unless the whole cell is a number in the table's locale (`-1.5` stays).
fn guard_formula<'c>(cell: &'c str, table: &ExportTable) -> Cow<'c, str> {
    let risky = matches!(
        cell.chars().next(),
        Some('=' | '+' | '-' | '@' | '\t' | '\r')
    );
    if risky && parse_number(cell, table.locale).is_none() {
        Cow::Owned(format!("'{cell}"))
    } else {
        Cow::Borrowed(cell)
    }
}

pub fn encode_csv(table: &ExportTable) -> Result<String> {
    let mut wtr = WriterBuilder::new()
        .quote_style(QuoteStyle::Necessary)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    wtr.write_record(table.headers.iter().map(|h| guard_formula(h, table).into_owned()))?;
    for row in &table.rows {
        if row.len() != table.headers.len() {
            return Err(ReportError::Export(format!(
                "row has {} cells but the header has {}",
                row.len(),
                table.headers.len()
            )));
        }
        wtr.write_record(row.iter().map(|c| guard_formula(c, table).into_owned()))?;
    }

    let bytes = wtr
        .into_inner()
        .map_err(|e| ReportError::Export(format!("csv flush failed: {}", e.error())))?;
    let mut text = String::from_utf8(bytes)
        .map_err(|e| ReportError::Export(format!("csv is not UTF-8: {e}")))?;
    if text.ends_with('\n') {
        text.pop();
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::Locale;

    fn table(rows: Vec<Vec<&str>>) -> ExportTable {
        ExportTable {
            title: "t".into(),
            locale: Locale::En,
            headers: vec!["Year".into(), "Value".into()],
            rows: rows
                .into_iter()
                .map(|r| r.into_iter().map(String::from).collect())
                .collect(),
        }
    }

    #[test]
    fn formula_cells_are_neutralized_but_negatives_are_not() {
        let out = encode_csv(&table(vec![vec!["2020", "=SUM(A1)"], vec!["2021", "-1.5"]])).unwrap();
        assert_eq!(out, "Year,Value\n2020,'=SUM(A1)\n2021,-1.5");
    }

    #[test]
    fn ragged_rows_are_rejected() {
        assert!(encode_csv(&table(vec![vec!["2020"]])).is_err());
    }
}
