/// Modal verbs probed in priority order, not by position in the text.
const MODALS: &[&str] = &["should", "must", "can", "will", "shall"];

/// Builds the negative counterpart of an affirmative clause by inserting
/// " not" after the first modal found. Returns the input unchanged when no
/// modal is present.
pub fn synthesize_negative(clause: &str) -> String {
    let lower = clause.to_ascii_lowercase();
    for modal in MODALS {
        if let Some(idx) = lower.find(modal) {
            let split = idx + modal.len();
            return format!("{} not{}", &clause[..split], &clause[split..]);
        }
    }
    clause.to_string()
}
