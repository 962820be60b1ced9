use serde::{Deserialize, Serialize};

/// One natural-language requirement statement.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requirement {
    #[serde(default)]
    pub text: String,
}

impl Requirement {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::High => write!(f, "High"),
            Severity::Medium => write!(f, "Medium"),
            Severity::Low => write!(f, "Low"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestCase {
    pub id: String,
    pub title: String,
    pub description: String,
    pub preconditions: Vec<String>,
    pub steps: Vec<String>,
    pub expected_output: String,
    pub severity: Severity,
    pub tags: Vec<String>,
}

impl TestCase {
    pub fn is_negative_counterpart(&self) -> bool {
        self.title.starts_with("Negative: ")
    }
}

/// JSON envelope returned by the `json` output format.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestCaseResponse {
    pub test_cases: Vec<TestCase>,
}

impl From<Vec<TestCase>> for TestCaseResponse {
    fn from(test_cases: Vec<TestCase>) -> Self {
        Self { test_cases }
    }
}
