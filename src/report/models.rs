// src/report/models.rs
use serde::Serialize;
use std::collections::BTreeMap;

/// A table cell as read from the report. The cell's text is the
/// concatenation of its paragraphs' space-trimmed text.
#[derive(Debug, Clone, Default)]
pub struct Cell {
    pub paragraphs: Vec<String>,
}

impl Cell {
    pub fn text(&self) -> String {
        self.paragraphs
            .iter()
            .map(|p| p.trim_matches(' '))
            .collect()
    }
}

#[derive(Debug, Clone, Default)]
pub struct Row {
    pub cells: Vec<Cell>,
}

#[derive(Debug, Clone, Default)]
pub struct Table {
    pub rows: Vec<Row>,
}

/// In-memory view of one final CAPA report: the document's tables and
/// paragraph texts, in document order. Read-only once built.
#[derive(Debug, Clone, Default)]
pub struct Document {
    pub tables: Vec<Table>,
    pub paragraphs: Vec<String>,
}

/// Number of columns a finding occupies in the findings table.
pub const FINDINGS_COLUMNS: usize = 5;

/// One row of the findings table: Process Area, Goal, Practice,
/// Description, Rating. Rows in the source with fewer cells keep what they
/// have; extra trailing cells are dropped. Never padded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FindingsRow {
    pub fields: Vec<String>,
}

impl FindingsRow {
    pub fn from_cells(mut cells: Vec<String>) -> Self {
        cells.truncate(FINDINGS_COLUMNS);
        Self { fields: cells }
    }

    pub fn process_area(&self) -> Option<&str> {
        self.fields.first().map(String::as_str)
    }
}

/// Project metadata fields the extractor can populate. A key is present in
/// [`ProjectInfo`] only if some line or row matched its pattern; absence
/// means "not found", not empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum ProjectField {
    #[serde(rename = "Site")]
    Site,
    #[serde(rename = "SAP ID")]
    SapId,
    #[serde(rename = "Go Live Date")]
    GoLiveDate,
    #[serde(rename = "Project Name")]
    ProjectName,
    #[serde(rename = "Lead(s)")]
    Leads,
    #[serde(rename = "Date Reported")]
    DateReported,
}

pub type ProjectInfo = BTreeMap<ProjectField, String>;

/// Reviewer first names used as the textual anchor for the metadata block
/// in old-format reports.
pub const DEFAULT_LEADS: [&str; 4] = ["Adam", "Monika", "Jeff", "Mario"];

/// The CMMI process-area codes findings are classified under.
pub const PROCESS_AREAS: [&str; 15] = [
    "PP", "IPM", "PMC", "RSKM", "REQM", "RD", "TS", "PI", "VER", "VAL", "CM",
    "MA", "PPQA", "DAR", "SAM",
];

/// Label for the aggregate row covering every process area.
pub const ALL_PROCESS_AREAS: &str = "All PA's";

/// Per-severity finding counts for one process area. Populated by the
/// spreadsheet-writing stage, not by this extractor.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SeverityCounts {
    pub li: u32,
    pub pi: u32,
    pub ni: u32,
    pub obv: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProcessAreaCounter {
    pub area: String,
    #[serde(flatten)]
    pub counts: SeverityCounts,
}

/// Zeroed counter set for the 15 process areas plus the aggregate entry.
pub fn process_area_counters() -> Vec<ProcessAreaCounter> {
    PROCESS_AREAS
        .iter()
        .copied()
        .chain(std::iter::once(ALL_PROCESS_AREAS))
        .map(|area| ProcessAreaCounter {
            area: area.to_string(),
            counts: SeverityCounts::default(),
        })
        .collect()
}

/// Whether `label` is one of the catalogued process-area codes.
pub fn is_known_process_area(label: &str) -> bool {
    label == ALL_PROCESS_AREAS || PROCESS_AREAS.contains(&label)
}
