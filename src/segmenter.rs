use anyhow::Result;
use regex::Regex;

/// Splits a sentence into coordinate clauses on conjunctions and punctuation.
///
/// Matching is literal and not word-boundary aware: "brand new" splits
/// around its "and ".
#[derive(Debug, Clone)]
pub struct ClauseSegmenter {
    delimiters: Regex,
}

impl ClauseSegmenter {
    pub fn new() -> Result<Self> {
        Ok(Self {
            delimiters: Regex::new(r" and | and|and | or | or|or |;|\.|,")?,
        })
    }

    pub fn split<'a>(&self, sentence: &'a str) -> Vec<&'a str> {
        self.delimiters
            .split(sentence)
            .map(str::trim)
            .filter(|clause| !clause.is_empty())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_on_conjunctions_and_punctuation() {
        let segmenter = ClauseSegmenter::new().unwrap();
        let clauses = segmenter.split("The user can login, view history and log out; or cancel.");
        assert_eq!(clauses, vec!["The user can login", "view history", "log out", "cancel"]);
    }

    #[test]
    fn test_empty_fragments_are_dropped() {
        let segmenter = ClauseSegmenter::new().unwrap();
        assert!(segmenter.split(" ;, . ").is_empty());
        assert!(segmenter.split("").is_empty());
    }

    #[test]
    fn test_substring_matches_are_not_protected() {
        let segmenter = ClauseSegmenter::new().unwrap();
        assert_eq!(segmenter.split("a brand new badge"), vec!["a br", "new badge"]);
    }
}
