use anyhow::Result;
use tracing::{debug, info};

use crate::annotator::Annotator;
use crate::conditional::{is_conditional_sentence, parse_branches};
use crate::heuristics::{Heuristics, NEGATIVE_OUTCOME};
use crate::model::{Requirement, Severity, TestCase};
use crate::negation::synthesize_negative;
use crate::segmenter::ClauseSegmenter;

/// Sequential `TC<n>` identifiers owned by a single derivation call.
#[derive(Debug, Clone)]
pub struct IdSequence {
    next: usize,
}

impl IdSequence {
    pub fn new() -> Self {
        Self { next: 1 }
    }

    pub fn next_id(&mut self) -> String {
        let id = format!("TC{}", self.next);
        self.next += 1;
        id
    }

    pub fn issued(&self) -> usize {
        self.next - 1
    }
}

impl Default for IdSequence {
    fn default() -> Self {
        Self::new()
    }
}

pub struct TestCaseGenerator {
    annotator: Box<dyn Annotator>,
    segmenter: ClauseSegmenter,
    heuristics: Heuristics,
}

impl TestCaseGenerator {
    pub fn new(annotator: Box<dyn Annotator>) -> Result<Self> {
        Ok(Self {
            annotator,
            segmenter: ClauseSegmenter::new()?,
            heuristics: Heuristics::new()?,
        })
    }

    /// Derives test cases for every requirement, numbering them from TC1.
    pub fn generate(&self, requirements: &[Requirement]) -> Vec<TestCase> {
        let mut ids = IdSequence::new();
        let test_cases = self.generate_with(requirements, &mut ids);
        info!(
            requirements = requirements.len(),
            test_cases = ids.issued(),
            "derived test cases"
        );
        test_cases
    }

    pub fn generate_with(&self, requirements: &[Requirement], ids: &mut IdSequence) -> Vec<TestCase> {
        let mut test_cases = Vec::new();
        for requirement in requirements {
            if requirement.text.trim().is_empty() {
                debug!("skipping blank requirement");
                continue;
            }
            for sentence in self.annotator.sentences(&requirement.text) {
                if is_conditional_sentence(&sentence) {
                    self.derive_branches(&sentence, ids, &mut test_cases);
                } else {
                    self.derive_clauses(&sentence, ids, &mut test_cases);
                }
            }
        }
        test_cases
    }

    fn derive_branches(&self, sentence: &str, ids: &mut IdSequence, out: &mut Vec<TestCase>) {
        for branch in parse_branches(sentence, &self.heuristics).branches {
            out.push(TestCase {
                id: ids.next_id(),
                title: branch.title,
                description: branch.condition.clone(),
                preconditions: vec![branch.condition],
                steps: vec![format!("Step: {}", branch.action)],
                expected_output: branch.expected_output,
                severity: branch.severity,
                tags: branch.tags,
            });
        }
    }

    fn derive_clauses(&self, sentence: &str, ids: &mut IdSequence, out: &mut Vec<TestCase>) {
        let h = &self.heuristics;
        let annotator = self.annotator.as_ref();

        for clause in self.segmenter.split(sentence) {
            let negated = h.is_negated(clause);
            let conditional = h.is_conditional(clause);

            out.push(TestCase {
                id: ids.next_id(),
                title: h.title(clause, negated, conditional),
                description: clause.to_string(),
                preconditions: h.preconditions(clause, annotator),
                steps: h.steps(clause, conditional, annotator),
                expected_output: h.expected_output(clause, negated),
                severity: h.severity(clause),
                tags: h.tags(clause, negated, conditional),
            });

            if negated {
                continue;
            }
            let negative = synthesize_negative(clause);
            if negative == clause {
                continue;
            }
            debug!(clause, negative = %negative, "synthesized negative counterpart");
            out.push(TestCase {
                id: ids.next_id(),
                title: format!("Negative: {}", h.title(&negative, true, conditional)),
                preconditions: h.preconditions(&negative, annotator),
                steps: h.steps(&negative, conditional, annotator),
                expected_output: NEGATIVE_OUTCOME.to_string(),
                severity: Severity::High,
                tags: h.tags(&negative, true, conditional),
                description: negative,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotator::PlainAnnotator;

    #[test]
    fn test_id_sequence_starts_at_one() {
        let mut ids = IdSequence::new();
        assert_eq!(ids.issued(), 0);
        assert_eq!(ids.next_id(), "TC1");
        assert_eq!(ids.next_id(), "TC2");
        assert_eq!(ids.issued(), 2);
    }

    #[test]
    fn test_counter_continues_across_calls_when_threaded() {
        let generator = TestCaseGenerator::new(Box::new(PlainAnnotator)).unwrap();
        let mut ids = IdSequence::new();
        let first = generator.generate_with(&[Requirement::new("Show the report")], &mut ids);
        let second = generator.generate_with(&[Requirement::new("Print the report")], &mut ids);
        assert_eq!(first[0].id, "TC1");
        assert_eq!(second[0].id, "TC2");
    }

    #[test]
    fn test_each_generate_call_starts_fresh() {
        let generator = TestCaseGenerator::new(Box::new(PlainAnnotator)).unwrap();
        let reqs = [Requirement::new("Show the report")];
        assert_eq!(generator.generate(&reqs)[0].id, "TC1");
        assert_eq!(generator.generate(&reqs)[0].id, "TC1");
    }
}
