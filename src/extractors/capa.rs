// src/extractors/capa.rs

use crate::report::models::{
    is_known_process_area, Document, FindingsRow, ProjectField, ProjectInfo, Row, Table,
    DEFAULT_LEADS, FINDINGS_COLUMNS,
};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

// Tokens stripped out of the "Customer" value before it is stored as Site.
static SITE_NOISE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new("State|Lottery").expect("Failed to compile SITE_NOISE_RE")
});

// Hyphens and spaces are removed from key text before keyword matching, so
// "SAP ID", "SAP-ID" and "SAPID" all normalize to the same key.
static KEY_NOISE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new("[- ]").expect("Failed to compile KEY_NOISE_RE")
});

/// Column headers of the findings table, in order.
const FINDINGS_HEADER: [&str; 5] = [
    "Process Area",
    "Goal",
    "Practice",
    "Description",
    "Rating",
];

/// Cell text that tags the project-information table in new-format reports.
const PROJECT_INFORMATION_TAG: &str = "Project Information";

/// Extracts the "Detail of Findings" table and project metadata from one
/// final CAPA report.
///
/// The report family has two historical formats: old-format reports carry
/// the project metadata in free-text paragraphs near a reviewer's name,
/// new-format reports keep it in a dedicated table tagged
/// "Project Information". Both funnel into the same keyword matcher.
pub struct ReportExtractor {
    document: Document,
    worksheet: String,
    table_data: Vec<FindingsRow>,
    data_read: Vec<String>,
    project_info: ProjectInfo,
    findings_table: Option<usize>,
    leads: Vec<String>,
}

impl ReportExtractor {
    pub fn new(document: Document, worksheet: impl Into<String>) -> Self {
        Self {
            document,
            worksheet: worksheet.into(),
            table_data: Vec::new(),
            data_read: Vec::new(),
            project_info: ProjectInfo::new(),
            findings_table: None,
            leads: DEFAULT_LEADS.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Replaces the lead-name catalog used as the old-format metadata anchor.
    #[allow(dead_code)]
    pub fn with_leads(mut self, leads: Vec<String>) -> Self {
        self.leads = leads;
        self
    }

    /// Runs the full extraction: locate the findings table, scan the
    /// paragraphs for old-format metadata, then normalize the table rows.
    /// When no findings table exists the notice below is the expected
    /// outcome, not a failure.
    pub fn process_document(&mut self) {
        self.find_table();
        self.read_doc();
        let Some(index) = self.findings_table else {
            println!("#####    Not able to find \"Detail of Findings\" table.   #####");
            println!("##### Possible that project does not have any findings. #####");
            return;
        };
        self.read_table_data(index);
    }

    /// Locates the detailed findings table.
    ///
    /// Scans tables in document order, one row at a time. A table tagged
    /// "Project Information" is the new-format metadata table: it is read
    /// for metadata on the spot and never selected as the findings table,
    /// even if a later row of it would look like a findings header. The
    /// first table whose row matches the findings header rules wins and
    /// stops the scan.
    fn find_table(&mut self) {
        for (index, table) in self.document.tables.iter().enumerate() {
            for row in &table.rows {
                let header = header_candidates(row);

                // New versions of final CAPA's keep project information in a table.
                if header.iter().any(|h| h == PROJECT_INFORMATION_TAG) {
                    tracing::debug!("Table {} is the project-information table", index);
                    Self::read_new_format(&mut self.project_info, table);
                    break;
                }

                if is_findings_header(&header) {
                    tracing::info!("Findings table located at table index {}", index);
                    self.findings_table = Some(index);
                    return;
                }
            }
        }
        tracing::debug!("No findings table matched");
    }

    /// Reads the document paragraphs and collects them into an ordered,
    /// index-addressable list, feeding each line to the old-format field
    /// matcher on the way.
    ///
    /// Afterwards the list is scanned for the first line containing a
    /// known lead name; that line is the Lead(s) entry and its neighbors
    /// are the Project Name (above) and Date Reported (below). A neighbor
    /// that falls outside the list is skipped, leaving that field unset.
    fn read_doc(&mut self) {
        self.data_read.clear();
        for paragraph in &self.document.paragraphs {
            let text = paragraph.trim();
            // skip blank lines
            if text.is_empty() {
                continue;
            }
            // collapse duplicated spaces
            let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
            // for older versions of final CAPA's
            Self::fill_project_info_old(&mut self.project_info, &text);
            self.data_read.push(text);
        }

        for i in 0..self.data_read.len() {
            let line = &self.data_read[i];
            if !self.leads.iter().any(|lead| line.contains(lead.as_str())) {
                continue;
            }
            self.project_info
                .insert(ProjectField::Leads, self.data_read[i].clone());
            if i > 0 {
                self.project_info
                    .insert(ProjectField::ProjectName, self.data_read[i - 1].clone());
            } else {
                tracing::warn!("Lead line is the first paragraph, no Project Name line above it");
            }
            if i + 1 < self.data_read.len() {
                self.project_info
                    .insert(ProjectField::DateReported, self.data_read[i + 1].clone());
            } else {
                tracing::warn!("Lead line is the last paragraph, no Date Reported line below it");
            }
            break;
        }
    }

    /// Reads the project-information table of a new-format report. Each row
    /// becomes an ordered cell-text list for the field matcher; one row may
    /// set several fields.
    fn read_new_format(info: &mut ProjectInfo, table: &Table) {
        for row in &table.rows {
            let cells = cell_texts(row);
            Self::fill_project_info_new(info, &cells);
        }
    }

    /// Old-format adapter: split the line on the first colon into key and
    /// value. A line without a colon is all key, and keys without a value
    /// cannot match any of the value-dependent rules.
    fn fill_project_info_old(info: &mut ProjectInfo, line: &str) {
        let mut parts = line.splitn(2, ':');
        let key = parts.next().unwrap_or_default();
        let value = parts.next();
        Self::apply_field_rules(info, key, value);
    }

    /// New-format adapter: de-duplicate the row's cell texts while keeping
    /// first-occurrence order (merged cells repeat their text), then treat
    /// element 0 as the key and element 1 as the value.
    fn fill_project_info_new(info: &mut ProjectInfo, cells: &[String]) {
        let mut seen = HashSet::new();
        let deduped: Vec<&String> = cells.iter().filter(|c| seen.insert(c.as_str())).collect();

        let Some(key) = deduped.first() else {
            return;
        };
        let value = deduped.get(1).map(|v| v.as_str());
        Self::apply_field_rules(info, key, value);
    }

    /// The shared keyword matcher both formats funnel into. Keys are
    /// normalized by deleting hyphens and spaces and lowercasing; each rule
    /// is independent, so one line may update several fields, and a repeat
    /// match overwrites the earlier value (last match wins).
    fn apply_field_rules(info: &mut ProjectInfo, key: &str, value: Option<&str>) {
        let key = KEY_NOISE_RE.replace_all(key, "").to_lowercase();
        // every current rule stores the value, so a key with no value cannot match
        let Some(value) = value else {
            return;
        };

        if key.contains("sapid") {
            info.insert(ProjectField::SapId, value.trim_matches(' ').to_string());
        }
        if key.contains("golive") {
            info.insert(ProjectField::GoLiveDate, value.to_string());
        }
        if key.contains("customer") {
            let site = SITE_NOISE_RE.replace_all(value, "");
            info.insert(
                ProjectField::Site,
                site.trim_matches(' ').to_string(),
            );
        }
    }

    /// Normalizes the findings table: drop the header row, keep the first
    /// five cell texts of every remaining row in order. Short rows keep
    /// whatever they have.
    fn read_table_data(&mut self, index: usize) {
        self.table_data.clear();
        let table = &self.document.tables[index];
        for row in table.rows.iter().skip(1) {
            let finding = FindingsRow::from_cells(cell_texts(row));
            if let Some(area) = finding.process_area() {
                if !is_known_process_area(area) {
                    tracing::debug!("Unrecognized process area label: {:?}", area);
                }
            }
            self.table_data.push(finding);
        }
        tracing::info!("Extracted {} findings rows", self.table_data.len());
    }

    pub fn table_data(&self) -> &[FindingsRow] {
        self.table_data.as_slice()
    }

    pub fn project_info(&self) -> &ProjectInfo {
        &self.project_info
    }

    #[allow(dead_code)]
    pub fn doc_data(&self) -> &[String] {
        self.data_read.as_slice()
    }

    pub fn worksheet(&self) -> &str {
        &self.worksheet
    }

    pub fn findings_table_index(&self) -> Option<usize> {
        self.findings_table
    }
}

/// Flattens a row into its header-candidate list: every cell's paragraph
/// texts, space-trimmed, in cell order.
fn header_candidates(row: &Row) -> Vec<String> {
    row.cells
        .iter()
        .flat_map(|cell| cell.paragraphs.iter().map(|p| p.trim_matches(' ').to_string()))
        .collect()
}

/// Concatenates each cell's trimmed paragraph texts into one text per cell.
fn cell_texts(row: &Row) -> Vec<String> {
    row.cells.iter().map(|cell| cell.text()).collect()
}

/// Findings header rules: either exactly five candidates with "Rating"
/// last, or every expected column title occurs as a substring of some
/// candidate, in any order.
fn is_findings_header(header: &[String]) -> bool {
    if header.len() == FINDINGS_COLUMNS && header[FINDINGS_COLUMNS - 1] == "Rating" {
        return true;
    }
    FINDINGS_HEADER
        .iter()
        .all(|term| header.iter().any(|candidate| candidate.contains(term)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::models::Cell;

    fn table(rows: &[&[&str]]) -> Table {
        Table {
            rows: rows
                .iter()
                .map(|cells| Row {
                    cells: cells
                        .iter()
                        .map(|text| Cell {
                            paragraphs: vec![text.to_string()],
                        })
                        .collect(),
                })
                .collect(),
        }
    }

    fn document(tables: Vec<Table>, paragraphs: &[&str]) -> Document {
        Document {
            tables,
            paragraphs: paragraphs.iter().map(|p| p.to_string()).collect(),
        }
    }

    fn findings_table() -> Table {
        table(&[
            &["Process Area", "Goal", "Practice", "Description", "Rating"],
            &["RD", "SG1", "SP1.1", "Requirements not elicited", "LI"],
        ])
    }

    #[test]
    fn finds_table_by_exact_five_column_header() {
        let doc = document(vec![findings_table()], &[]);
        let mut extractor = ReportExtractor::new(doc, "2021");
        extractor.process_document();

        assert_eq!(extractor.findings_table_index(), Some(0));
        assert_eq!(extractor.table_data().len(), 1);
        assert_eq!(extractor.table_data()[0].fields[0], "RD");
    }

    #[test]
    fn finds_table_by_substring_containment_in_any_order() {
        // Five columns but the fifth is not exactly "Rating", so only the
        // containment rule can match, and it is order-insensitive.
        let reworded = table(&[
            &[
                "Description of Finding",
                "Goal and Practice",
                "Process Area",
                "Practice Statement",
                "Finding Rating",
            ],
            &["CM", "SG2", "SP2.1", "Baselines not audited", "PI"],
        ]);
        let doc = document(vec![reworded], &[]);
        let mut extractor = ReportExtractor::new(doc, "2021");
        extractor.process_document();

        assert_eq!(extractor.findings_table_index(), Some(0));
    }

    #[test]
    fn table_missing_a_column_title_is_not_findings() {
        // No candidate contains "Process Area".
        let incomplete = table(&[
            &["Area", "Goal", "Practice", "Description", "Finding Rating"],
            &["VER", "SG1", "SP1.2", "Peer reviews skipped", "NI"],
        ]);
        let doc = document(vec![incomplete], &[]);
        let mut extractor = ReportExtractor::new(doc, "2021");
        extractor.process_document();

        assert_eq!(extractor.findings_table_index(), None);
        assert!(extractor.table_data().is_empty());
    }

    #[test]
    fn find_table_is_deterministic() {
        let doc = document(vec![findings_table(), findings_table()], &[]);
        let mut extractor = ReportExtractor::new(doc, "2021");
        extractor.find_table();
        let first = extractor.findings_table_index();
        extractor.find_table();

        assert_eq!(first, Some(0));
        assert_eq!(extractor.findings_table_index(), first);
    }

    #[test]
    fn project_information_table_is_read_but_never_selected() {
        // The project-info table even carries a five-column Rating header in
        // a later row; it must still be skipped in favor of the real
        // findings table that follows.
        let info_table = table(&[
            &["Project Information"],
            &["Customer", "ABC State Lottery Corp"],
            &["SAP ID", "12345"],
            &["Process Area", "Goal", "Practice", "Description", "Rating"],
        ]);
        let doc = document(vec![info_table, findings_table()], &[]);
        let mut extractor = ReportExtractor::new(doc, "2021");
        extractor.process_document();

        assert_eq!(extractor.findings_table_index(), Some(1));
        let info = extractor.project_info();
        assert_eq!(info.get(&ProjectField::SapId).map(String::as_str), Some("12345"));
        assert_eq!(info.get(&ProjectField::Site).map(String::as_str), Some("ABC   Corp"));
    }

    #[test]
    fn new_format_rows_deduplicate_merged_cells() {
        // Merged cells repeat their text; the key must stay element 0 and
        // the value element 1 after the stable de-dup.
        let info = &mut ProjectInfo::new();
        let cells = vec![
            "SAP ID".to_string(),
            "SAP ID".to_string(),
            "98765".to_string(),
        ];
        ReportExtractor::fill_project_info_new(info, &cells);

        assert_eq!(info.get(&ProjectField::SapId).map(String::as_str), Some("98765"));
    }

    #[test]
    fn rows_are_truncated_to_five_and_never_padded() {
        let ragged = table(&[
            &["Process Area", "Goal", "Practice", "Description", "Rating"],
            &["RD", "SG1", "SP1.1", "Finding one", "LI", "extra", "more"],
            &["CM", "SG2", "Finding two"],
        ]);
        let doc = document(vec![ragged], &[]);
        let mut extractor = ReportExtractor::new(doc, "2021");
        extractor.process_document();

        let rows = extractor.table_data();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].fields.len(), 5);
        assert_eq!(rows[0].fields[4], "LI");
        assert_eq!(rows[1].fields.len(), 3);
    }

    #[test]
    fn repeated_metadata_lines_keep_last_value_without_duplication() {
        let info = &mut ProjectInfo::new();
        ReportExtractor::fill_project_info_old(info, "SAP ID: 12345");
        ReportExtractor::fill_project_info_old(info, "SAP ID: 12345");
        assert_eq!(info.len(), 1);
        assert_eq!(info.get(&ProjectField::SapId).map(String::as_str), Some("12345"));

        // a later match for the same key overwrites the earlier one
        ReportExtractor::fill_project_info_old(info, "SAP-ID: 67890");
        assert_eq!(info.get(&ProjectField::SapId).map(String::as_str), Some("67890"));
    }

    #[test]
    fn customer_value_is_stripped_of_state_and_lottery_tokens() {
        let info = &mut ProjectInfo::new();
        ReportExtractor::fill_project_info_old(info, "Customer: ABC State Lottery Corp");

        // Only the literal tokens are removed and outer spaces trimmed; the
        // spaces that separated the removed tokens remain.
        assert_eq!(
            info.get(&ProjectField::Site).map(String::as_str),
            Some("ABC   Corp")
        );
    }

    #[test]
    fn go_live_value_is_stored_as_captured() {
        let info = &mut ProjectInfo::new();
        ReportExtractor::fill_project_info_old(info, "Go - Live Date : 2020-01-01");

        // key normalizes to "golivedate"; the value keeps its leading space
        assert_eq!(
            info.get(&ProjectField::GoLiveDate).map(String::as_str),
            Some(" 2020-01-01")
        );
    }

    #[test]
    fn line_without_colon_matches_nothing() {
        let info = &mut ProjectInfo::new();
        ReportExtractor::fill_project_info_old(info, "SAP ID pending assignment");
        assert!(info.is_empty());
    }

    #[test]
    fn lead_scan_extracts_neighboring_lines() {
        let doc = document(
            vec![],
            &["Acme Corp", "Lead: Adam", "2021-05-01", "Other text"],
        );
        let mut extractor = ReportExtractor::new(doc, "2021");
        extractor.process_document();

        let info = extractor.project_info();
        assert_eq!(info.get(&ProjectField::ProjectName).map(String::as_str), Some("Acme Corp"));
        assert_eq!(info.get(&ProjectField::Leads).map(String::as_str), Some("Lead: Adam"));
        assert_eq!(info.get(&ProjectField::DateReported).map(String::as_str), Some("2021-05-01"));
    }

    #[test]
    fn lead_scan_uses_only_the_first_matching_line() {
        let doc = document(
            vec![],
            &["First Project", "Reviewer Monika", "2020-02-02", "Reviewer Jeff", "2021-03-03"],
        );
        let mut extractor = ReportExtractor::new(doc, "2021");
        extractor.process_document();

        let info = extractor.project_info();
        assert_eq!(info.get(&ProjectField::Leads).map(String::as_str), Some("Reviewer Monika"));
        assert_eq!(info.get(&ProjectField::DateReported).map(String::as_str), Some("2020-02-02"));
    }

    #[test]
    fn custom_lead_catalog_is_respected() {
        let doc = document(vec![], &["Acme Corp", "Reviewed by Priya", "2023-01-15"]);
        let mut extractor =
            ReportExtractor::new(doc, "2023").with_leads(vec!["Priya".to_string()]);
        extractor.process_document();

        let info = extractor.project_info();
        assert_eq!(info.get(&ProjectField::Leads).map(String::as_str), Some("Reviewed by Priya"));
        assert_eq!(info.get(&ProjectField::ProjectName).map(String::as_str), Some("Acme Corp"));
    }

    #[test]
    fn lead_on_first_line_skips_project_name() {
        let doc = document(vec![], &["Lead: Mario", "2021-05-01"]);
        let mut extractor = ReportExtractor::new(doc, "2021");
        extractor.process_document();

        let info = extractor.project_info();
        assert!(!info.contains_key(&ProjectField::ProjectName));
        assert_eq!(info.get(&ProjectField::Leads).map(String::as_str), Some("Lead: Mario"));
        assert_eq!(info.get(&ProjectField::DateReported).map(String::as_str), Some("2021-05-01"));
    }

    #[test]
    fn lead_on_last_line_skips_date_reported() {
        let doc = document(vec![], &["Acme Corp", "Lead: Jeff"]);
        let mut extractor = ReportExtractor::new(doc, "2021");
        extractor.process_document();

        let info = extractor.project_info();
        assert!(!info.contains_key(&ProjectField::DateReported));
        assert_eq!(info.get(&ProjectField::ProjectName).map(String::as_str), Some("Acme Corp"));
        assert_eq!(info.get(&ProjectField::Leads).map(String::as_str), Some("Lead: Jeff"));
    }

    #[test]
    fn paragraph_scan_skips_blanks_and_collapses_spaces() {
        let doc = document(
            vec![],
            &["  ", "SAP  ID :  12345", "", "\t", "Go Live:2022-06-01"],
        );
        let mut extractor = ReportExtractor::new(doc, "2021");
        extractor.process_document();

        assert_eq!(extractor.doc_data(), ["SAP ID : 12345", "Go Live:2022-06-01"]);
        let info = extractor.project_info();
        assert_eq!(info.get(&ProjectField::SapId).map(String::as_str), Some("12345"));
        assert_eq!(info.get(&ProjectField::GoLiveDate).map(String::as_str), Some("2022-06-01"));
    }

    #[test]
    fn document_without_findings_yields_nothing_and_does_not_panic() {
        let doc = document(
            vec![table(&[&["Summary", "Notes"]])],
            &["No findings were raised."],
        );
        let mut extractor = ReportExtractor::new(doc, "2021");
        extractor.process_document();

        assert_eq!(extractor.findings_table_index(), None);
        assert!(extractor.table_data().is_empty());
    }
}
