// src/report/mod.rs
pub mod models;

use crate::utils::error::ReportError;
use docx_rs::{
    read_docx, DocumentChild, Paragraph, ParagraphChild, RunChild, TableCellContent,
    TableChild, TableRowChild,
};
use models::{Cell, Document, Row, Table};
use std::path::Path;

/// Reads a final CAPA report (.docx) and materializes the in-memory
/// [`Document`] the extractor works on: tables and paragraph texts in
/// document order.
pub fn read_report<P: AsRef<Path>>(path: P) -> Result<Document, ReportError> {
    let path = path.as_ref();
    tracing::info!("Reading report: {}", path.display());

    let buf = std::fs::read(path)?;
    let docx = read_docx(&buf).map_err(|e| ReportError::Parse(e.to_string()))?;

    let mut document = Document::default();
    for child in docx.document.children {
        match child {
            DocumentChild::Paragraph(p) => {
                document.paragraphs.push(paragraph_text(*p));
            }
            DocumentChild::Table(t) => {
                document.tables.push(convert_table(*t));
            }
            other => tracing::trace!("Skipping document child: {other:?}"),
        }
    }

    tracing::debug!(
        "Parsed report: {} tables, {} paragraphs",
        document.tables.len(),
        document.paragraphs.len()
    );
    Ok(document)
}

fn convert_table(table: docx_rs::Table) -> Table {
    let mut rows = Vec::with_capacity(table.rows.len());
    for row in table.rows {
        let TableChild::TableRow(row) = row;

        let mut cells = Vec::with_capacity(row.cells.len());
        for cell in row.cells {
            let TableRowChild::TableCell(cell) = cell;

            let mut paragraphs = Vec::new();
            for content in cell.children {
                match content {
                    TableCellContent::Paragraph(p) => paragraphs.push(paragraph_text(*p)),
                    TableCellContent::Table(_) => {
                        tracing::debug!("Report has nested tables, not descending into them");
                    }
                    other => tracing::debug!("Unhandled cell content: {other:?}"),
                }
            }
            cells.push(Cell { paragraphs });
        }
        rows.push(Row { cells });
    }
    Table { rows }
}

fn paragraph_text(paragraph: Paragraph) -> String {
    let mut parts = Vec::new();
    for child in paragraph.children {
        match child {
            ParagraphChild::Run(run) => {
                for run_child in run.children {
                    match run_child {
                        RunChild::Text(t) => parts.push(t.text),
                        other => tracing::trace!("Unhandled run child: {other:?}"),
                    }
                }
            }
            other => tracing::trace!("Unhandled paragraph child: {other:?}"),
        }
    }
    parts.join("")
}
