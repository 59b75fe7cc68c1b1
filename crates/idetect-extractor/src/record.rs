//! Fact records
//!
//! Converts chosen reports to the persisted fact shape handed to storage
//! and geotagging collaborators.

use chrono::Utc;
use uuid::Uuid;

use idetect_core::{FactRecord, Result};

use crate::Report;

// ============================================================================
// Conversion utilities
// ============================================================================

/// Convert a report to a fact record of an analysis run
pub fn report_to_record(report: &Report, analysis_id: Uuid, analyzer: &str) -> Result<FactRecord> {
    let (specific, vague) = report.figures();

    Ok(FactRecord {
        id: Uuid::new_v4(),
        analysis_id,
        sentence_start: report.sentence_start,
        sentence_end: report.sentence_end,
        reporting_unit: report.reporting_unit.stored_value().to_string(),
        reporting_term: report.reporting_term.stored_value().to_string(),
        specific_displacement_figure: specific,
        vague_displacement_figure: vague,
        tag_locations: serde_json::to_string(&report.tag_spans)?,
        location_names: report.locations.clone(),
        analyzer: analyzer.to_string(),
        analysis_date: Utc::now(),
    })
}

/// Convert every report of an article
pub fn reports_to_records(
    reports: &[Report],
    analysis_id: Uuid,
    analyzer: &str,
) -> Result<Vec<FactRecord>> {
    reports
        .iter()
        .map(|r| report_to_record(r, analysis_id, analyzer))
        .collect()
}

// ============================================================================
// Tests
// ============================================================================
