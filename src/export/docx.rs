//! Minimal WordprocessingML (DOCX) package holding a title and one table.
//!
//! Parts: `[Content_Types].xml`, `_rels/.rels`, `word/document.xml` and
//! `docProps/core.xml`. The table uses a fixed grid (Year column narrower),
//! a bold shaded header row repeated on every page, and right-aligned cells
//! for values that parse as numbers.

use super::ExportTable;
use crate::error::{ReportError, Result};
use crate::format::parse_number;
use chrono::{DateTime, SecondsFormat, Utc};
use quick_xml::escape::escape;
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

/// Letter page, 1" margins: text width in twentieths of a point.
const TEXT_WIDTH_TWIPS: u32 = 9360;
const YEAR_COL_TWIPS: u32 = 1440;
const HEADER_FILL: &str = "D9D9D9";

const CONTENT_TYPES: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
    r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#,
    r#"<Default Extension="xml" ContentType="application/xml"/>"#,
    r#"<Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>"#,
    r#"<Override PartName="/docProps/core.xml" ContentType="application/vnd.openxmlformats-package.core-properties+xml"/>"#,
    r#"</Types>"#
);

const ROOT_RELS: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/>"#,
    r#"<Relationship Id="rId2" Type="http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties" Target="docProps/core.xml"/>"#,
    r#"</Relationships>"#
);

/// Column widths: a narrow first (Year) column, the rest shared evenly.
pub fn column_widths(columns: usize) -> Vec<u32> {
    match columns {
        0 => Vec::new(),
        1 => vec![TEXT_WIDTH_TWIPS],
        n => {
            let rest = (TEXT_WIDTH_TWIPS - YEAR_COL_TWIPS) / (n as u32 - 1);
            std::iter::once(YEAR_COL_TWIPS)
                .chain(std::iter::repeat_n(rest, n - 1))
                .collect()
        }
    }
}

fn run(text: &str, bold: bool) -> String {
    let props = if bold { "<w:rPr><w:b/></w:rPr>" } else { "" };
    format!(
        "<w:r>{props}<w:t xml:space=\"preserve\">{}</w:t></w:r>",
        escape(text)
    )
}

fn cell(text: &str, width: u32, header: bool, right: bool) -> String {
    let shading = if header {
        format!("<w:shd w:val=\"clear\" w:color=\"auto\" w:fill=\"{HEADER_FILL}\"/>")
    } else {
        String::new()
    };
    let align = if right {
        "<w:pPr><w:jc w:val=\"right\"/></w:pPr>"
    } else {
        ""
    };
    format!(
        "<w:tc><w:tcPr><w:tcW w:w=\"{width}\" w:type=\"dxa\"/>{shading}</w:tcPr><w:p>{align}{}</w:p></w:tc>",
        run(text, header)
    )
}

/// `word/document.xml` for `table`.
pub fn document_xml(table: &ExportTable) -> Result<String> {
    let widths = column_widths(table.headers.len());
    if widths.is_empty() {
        return Err(ReportError::Export("table has no columns".into()));
    }

    let mut xml = String::with_capacity(4096);
    xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
    xml.push_str(&format!("<w:document xmlns:w=\"{W_NS}\"><w:body>"));
    xml.push_str(&format!(
        "<w:p><w:pPr><w:spacing w:after=\"240\"/></w:pPr><w:r><w:rPr><w:b/><w:sz w:val=\"28\"/></w:rPr><w:t xml:space=\"preserve\">{}</w:t></w:r></w:p>",
        escape(&table.title)
    ));

    let borders: String = ["top", "left", "bottom", "right", "insideH", "insideV"]
        .iter()
        .map(|side| format!("<w:{side} w:val=\"single\" w:sz=\"4\" w:space=\"0\" w:color=\"808080\"/>"))
        .collect();
    xml.push_str(&format!(
        "<w:tbl><w:tblPr><w:tblW w:w=\"{TEXT_WIDTH_TWIPS}\" w:type=\"dxa\"/><w:tblLayout w:type=\"fixed\"/><w:tblBorders>{borders}</w:tblBorders></w:tblPr>"
    ));
    xml.push_str("<w:tblGrid>");
    for w in &widths {
        xml.push_str(&format!("<w:gridCol w:w=\"{w}\"/>"));
    }
    xml.push_str("</w:tblGrid>");

    xml.push_str("<w:tr><w:trPr><w:tblHeader/></w:trPr>");
    for (h, w) in table.headers.iter().zip(&widths) {
        xml.push_str(&cell(h, *w, true, false));
    }
    xml.push_str("</w:tr>");

    for row in &table.rows {
        if row.len() != widths.len() {
            return Err(ReportError::Export(format!(
                "row has {} cells but the header has {}",
                row.len(),
                widths.len()
            )));
        }
        xml.push_str("<w:tr>");
        for (value, w) in row.iter().zip(&widths) {
            let numeric = parse_number(value, table.locale).is_some();
            xml.push_str(&cell(value, *w, false, numeric));
        }
        xml.push_str("</w:tr>");
    }
    xml.push_str("</w:tbl>");
    xml.push_str("<w:sectPr><w:pgSz w:w=\"12240\" w:h=\"15840\"/><w:pgMar w:top=\"1440\" w:right=\"1440\" w:bottom=\"1440\" w:left=\"1440\" w:header=\"708\" w:footer=\"708\" w:gutter=\"0\"/></w:sectPr>");
    xml.push_str("</w:body></w:document>");
    Ok(xml)
}

fn core_xml(table: &ExportTable, created: DateTime<Utc>) -> String {
    format!(
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
            r#"<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" "#,
            r#"xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" "#,
            r#"xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">"#,
            "<dc:title>{title}</dc:title><dc:language>{lang}</dc:language>",
            r#"<dcterms:created xsi:type="dcterms:W3CDTF">{created}</dcterms:created>"#,
            "</cp:coreProperties>"
        ),
        title = escape(&table.title),
        lang = table.locale.tag(),
        created = created.to_rfc3339_opts(SecondsFormat::Secs, true),
    )
}

/// Encode with an explicit creation timestamp (reproducible output).
pub fn encode_docx_at(table: &ExportTable, created: DateTime<Utc>) -> Result<Vec<u8>> {
    let document = document_xml(table)?;
    let core = core_xml(table, created);
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let opts = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let parts: [(&str, &str); 4] = [
        ("[Content_Types].xml", CONTENT_TYPES),
        ("_rels/.rels", ROOT_RELS),
        ("word/document.xml", &document),
        ("docProps/core.xml", &core),
    ];
    for (name, body) in parts {
        zip.start_file(name, opts)?;
        zip.write_all(body.as_bytes())?;
    }
    let bytes = zip.finish()?.into_inner();
    log::debug!("encoded {} byte DOCX for `{}`", bytes.len(), table.title);
    Ok(bytes)
}

pub fn encode_docx(table: &ExportTable) -> Result<Vec<u8>> {
    encode_docx_at(table, Utc::now())
}
