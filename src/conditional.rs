use tracing::{debug, warn};

use crate::heuristics::Heuristics;
use crate::model::Severity;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BranchKeyword {
    If,
    ElseIf,
    Else,
}

// Probed in this order at every position of the lower-cased sentence.
const KEYWORDS: &[(&str, BranchKeyword)] = &[
    ("if ", BranchKeyword::If),
    ("else if", BranchKeyword::ElseIf),
    ("else", BranchKeyword::Else),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConditionalBranch {
    /// `None` for text that precedes the first keyword.
    pub keyword: Option<BranchKeyword>,
    pub condition: String,
    pub action: String,
    pub title: String,
    pub expected_output: String,
    pub severity: Severity,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct BranchParse {
    pub branches: Vec<ConditionalBranch>,
    /// Keywords whose segment was empty and produced no branch.
    pub dropped_keywords: usize,
}

/// True when the sentence reads as if/then/else branching logic.
pub fn is_conditional_sentence(sentence: &str) -> bool {
    let lower = sentence.to_lowercase();
    lower.contains("if ") && (lower.contains("then") || lower.contains("else"))
}

/// Decomposes a conditional sentence into condition/action branches in source
/// order. This is a keyword scan, not a grammar: "if " inside a word or inside
/// an else-branch opens a new branch.
pub fn parse_branches(sentence: &str, heuristics: &Heuristics) -> BranchParse {
    let lower = sentence.to_lowercase();
    let mut parse = BranchParse::default();

    for (keyword, raw) in scan_segments(&lower) {
        let text = raw.trim();
        if text.is_empty() {
            if keyword.is_some() {
                parse.dropped_keywords += 1;
            }
            continue;
        }

        let (mut condition, mut action) = match keyword {
            Some(BranchKeyword::If) | Some(BranchKeyword::ElseIf) => match text.split_once("then") {
                Some((condition, action)) if !action.trim().is_empty() => {
                    (condition.trim().to_string(), action.trim().to_string())
                }
                Some((condition, _)) => (condition.trim().to_string(), condition.trim().to_string()),
                None => (text.to_string(), text.to_string()),
            },
            Some(BranchKeyword::Else) | None => (text.to_string(), text.to_string()),
        };
        if action.is_empty() {
            action = condition.clone();
        }
        if condition.is_empty() {
            condition = action.clone();
        }
        // A bare "then" leaves nothing on either side
        if condition.is_empty() {
            parse.dropped_keywords += 1;
            continue;
        }

        let negated = heuristics.is_negated(&action);
        let conditional = heuristics.is_conditional(&action);
        parse.branches.push(ConditionalBranch {
            keyword,
            title: heuristics.title(&action, negated, conditional),
            expected_output: heuristics.expected_output(&action, negated),
            severity: heuristics.severity(&action),
            tags: heuristics.tags(&action, negated, conditional),
            condition,
            action,
        });
    }

    if parse.dropped_keywords > 0 {
        warn!(
            sentence,
            dropped = parse.dropped_keywords,
            "conditional keywords without a branch body were skipped"
        );
    }
    debug!(sentence, branches = parse.branches.len(), "parsed conditional sentence");
    parse
}

fn scan_segments(lower: &str) -> Vec<(Option<BranchKeyword>, &str)> {
    let mut segments = Vec::new();
    let mut keyword = None;
    let mut start = 0;
    let mut idx = 0;

    while idx < lower.len() {
        let rest = &lower[idx..];
        match KEYWORDS.iter().find(|(marker, _)| rest.starts_with(marker)) {
            Some((marker, next)) => {
                segments.push((keyword, &lower[start..idx]));
                keyword = Some(*next);
                idx += marker.len();
                start = idx;
            }
            None => idx += rest.chars().next().map_or(1, char::len_utf8),
        }
    }
    segments.push((keyword, &lower[start..]));
    segments
}
