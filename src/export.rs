use anyhow::{anyhow, Result};
use csv::Writer;

use crate::model::TestCase;

pub const CSV_HEADER: [&str; 8] = [
    "ID",
    "Title",
    "Description",
    "Preconditions",
    "Steps",
    "Expected Output",
    "Severity",
    "Tags",
];

/// Serializes test cases as CSV, one row per test case.
pub fn export_csv(test_cases: &[TestCase]) -> Result<Vec<u8>> {
    let mut writer = Writer::from_writer(Vec::new());
    writer.write_record(CSV_HEADER)?;

    for tc in test_cases {
        let severity = tc.severity.to_string();
        let preconditions = tc.preconditions.join("; ");
        let steps = tc.steps.join("; ");
        let tags = tc.tags.join(", ");
        writer.write_record([
            tc.id.as_str(),
            tc.title.as_str(),
            tc.description.as_str(),
            preconditions.as_str(),
            steps.as_str(),
            tc.expected_output.as_str(),
            severity.as_str(),
            tags.as_str(),
        ])?;
    }

    writer
        .into_inner()
        .map_err(|e| anyhow!("Failed to flush CSV output: {}", e))
}
