use anyhow::Result;
use regex::Regex;

use crate::annotator::Annotator;
use crate::model::Severity;

// Rule tables are evaluated top to bottom; the first match wins unless noted.

const NEGATION_MARKERS: &[&str] = &["not ", "should not", "must not", "cannot", "can't", "won't", "never"];

const SEVERITY_RULES: &[(&[&str], Severity)] = &[
    (&["security", "critical", "must not"], Severity::High),
    (&["should not", "error"], Severity::Medium),
];

// Every matching rule contributes its tag, in this order.
const TAG_RULES: &[(&str, &[&str])] = &[
    ("security", &["security"]),
    ("edge-case", &["edge", "empty", "invalid", "expired"]),
    ("user", &["user"]),
    ("email", &["email"]),
    ("password", &["password"]),
    ("registration", &["registration"]),
    ("login", &["login"]),
    ("reset", &["reset"]),
];

const TITLE_RULES: &[(&str, &str)] = &[
    ("login", "Validate login"),
    ("register", "User registration"),
    ("reset", "Password reset"),
    ("error", "Error handling"),
    ("warning", "Warning scenario"),
    ("access", "Access control"),
];

const DEFAULT_TITLE_FRAGMENTS: &[&str] = &["", "step:", "otherwise"];

const EXPECTED_RULES: &[(&str, &str)] = &[
    ("error", "Error message displayed"),
    ("success", "Operation successful"),
];

const REQUIREMENT_MARKERS: &[&str] = &["must ", "should ", "required"];

pub const NEGATIVE_OUTCOME: &str = "Error message displayed";

const SUMMARY_LIMIT: usize = 30;

/// Lexical heuristics that classify a requirement fragment.
#[derive(Debug, Clone)]
pub struct Heuristics {
    conditional: Regex,
    step_separators: Regex,
    branch_separators: Regex,
}

impl Heuristics {
    pub fn new() -> Result<Self> {
        Ok(Self {
            conditional: Regex::new(r"(?i)\bif ")?,
            step_separators: Regex::new(r" and |,|;|\. ")?,
            branch_separators: Regex::new(r"then|else")?,
        })
    }

    pub fn is_negated(&self, text: &str) -> bool {
        contains_any(&text.to_lowercase(), NEGATION_MARKERS)
    }

    pub fn is_conditional(&self, text: &str) -> bool {
        self.conditional.is_match(text)
    }

    pub fn severity(&self, text: &str) -> Severity {
        let lower = text.to_lowercase();
        SEVERITY_RULES
            .iter()
            .find(|(markers, _)| contains_any(&lower, markers))
            .map(|(_, severity)| *severity)
            .unwrap_or(Severity::Low)
    }

    pub fn tags(&self, text: &str, negated: bool, conditional: bool) -> Vec<String> {
        let lower = text.to_lowercase();
        let mut tags = Vec::new();
        if negated {
            tags.push("negative".to_string());
        }
        if conditional {
            tags.push("conditional".to_string());
        }
        for (tag, markers) in TAG_RULES {
            if contains_any(&lower, markers) {
                tags.push(tag.to_string());
            }
        }
        tags
    }

    pub fn title(&self, fragment: &str, negated: bool, conditional: bool) -> String {
        let lower = fragment.to_lowercase();
        if DEFAULT_TITLE_FRAGMENTS.contains(&lower.as_str()) {
            return "Default scenario".to_string();
        }
        if negated {
            return format!("Negative scenario: {}", summarize(&lower));
        }
        if conditional {
            return format!("Conditional scenario: {}", summarize(&lower));
        }
        if let Some((_, title)) = TITLE_RULES.iter().find(|(keyword, _)| lower.contains(keyword)) {
            return title.to_string();
        }
        if lower.chars().count() > SUMMARY_LIMIT {
            return summarize(&lower);
        }
        capitalize_first(&lower)
    }

    pub fn expected_output(&self, fragment: &str, negated: bool) -> String {
        if negated {
            return NEGATIVE_OUTCOME.to_string();
        }
        let lower = fragment.to_lowercase();
        EXPECTED_RULES
            .iter()
            .find(|(keyword, _)| lower.contains(keyword))
            .map(|(_, outcome)| outcome.to_string())
            .unwrap_or_else(|| format!("Expected result for: {}", fragment))
    }

    pub fn preconditions(&self, fragment: &str, annotator: &dyn Annotator) -> Vec<String> {
        let mut preconditions = Vec::new();
        // ASCII lowering keeps byte offsets aligned with the original text
        let lower = fragment.to_ascii_lowercase();

        if let Some(start) = lower.find("if ") {
            let end = lower[start..]
                .find("then")
                .map(|offset| start + offset)
                .unwrap_or(fragment.len());
            preconditions.push(fragment[start..end].trim().to_string());
        }

        if contains_any(&lower, REQUIREMENT_MARKERS) {
            preconditions.push(format!("System requirement: {}", fragment));
        }

        for token in annotator.pos_tag(fragment) {
            if token.is_modal() {
                preconditions.push(format!("Action requires: {}", token.text));
            }
        }

        preconditions
    }

    pub fn steps(&self, fragment: &str, conditional: bool, annotator: &dyn Annotator) -> Vec<String> {
        let mut steps = Vec::new();

        for part in self.step_separators.split(fragment) {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }
            let lemmas: Vec<String> = annotator.lemmatize(part).into_iter().map(|l| l.lemma).collect();
            let normalized = if lemmas.is_empty() { part.to_string() } else { lemmas.join(" ") };
            steps.push(format!("Step: {}", normalized));
        }

        if conditional {
            for part in self.branch_separators.split(fragment) {
                let part = part.trim();
                if part.is_empty() {
                    continue;
                }
                let step = format!("Step: {}", part);
                if !steps.contains(&step) {
                    steps.push(step);
                }
            }
        }

        steps
    }
}

/// Strips step markers and a trailing `.`/`;`, then capitalizes.
pub fn summarize(text: &str) -> String {
    let without_markers = text.replace("step:", "");
    let stripped = without_markers
        .strip_suffix(['.', ';'])
        .unwrap_or(without_markers.as_str());
    capitalize_first(stripped.trim())
}

pub fn capitalize_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => "Test Case".to_string(),
    }
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| haystack.contains(needle))
}
