use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

/// Linguistic annotation capability consumed by the test case generator.
///
/// Implementations never fail: a backend whose models are missing degrades
/// to plain tokenization instead of returning an error.
pub trait Annotator: Send + Sync {
    fn sentences(&self, text: &str) -> Vec<String>;
    fn tokenize(&self, text: &str) -> Vec<String>;
    fn pos_tag(&self, text: &str) -> Vec<TaggedToken>;
    fn lemmatize(&self, text: &str) -> Vec<Lemma>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaggedToken {
    pub text: String,
    pub tag: Option<String>,
}

impl TaggedToken {
    pub fn is_modal(&self) -> bool {
        self.tag.as_deref() == Some("MD")
    }
}

impl std::fmt::Display for TaggedToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.tag {
            Some(tag) => write!(f, "{}/{}", self.text, tag),
            None => write!(f, "{}", self.text),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lemma {
    pub token: String,
    pub lemma: String,
}

#[derive(Debug, Error)]
pub enum AnnotatorError {
    #[error("invalid annotator pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("could not read lexicon {path}: {source}")]
    LexiconIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not parse lexicon {path}: {source}")]
    LexiconParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnnotatorBackend {
    Lexicon,
    Plain,
}

impl std::fmt::Display for AnnotatorBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnnotatorBackend::Lexicon => write!(f, "lexicon"),
            AnnotatorBackend::Plain => write!(f, "plain"),
        }
    }
}

/// Fully degraded backend: one sentence, whitespace tokens, no tags, identity lemmas.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainAnnotator;

impl Annotator for PlainAnnotator {
    fn sentences(&self, text: &str) -> Vec<String> {
        if text.trim().is_empty() {
            return Vec::new();
        }
        vec![text.to_string()]
    }

    fn tokenize(&self, text: &str) -> Vec<String> {
        text.split_whitespace().map(str::to_string).collect()
    }

    fn pos_tag(&self, text: &str) -> Vec<TaggedToken> {
        self.tokenize(text)
            .into_iter()
            .map(|text| TaggedToken { text, tag: None })
            .collect()
    }

    fn lemmatize(&self, text: &str) -> Vec<Lemma> {
        self.tokenize(text)
            .into_iter()
            .map(|token| Lemma { lemma: token.clone(), token })
            .collect()
    }
}

const MODALS: &[&str] = &["can", "could", "may", "might", "must", "shall", "should", "will", "would"];

const CLOSED_CLASS: &[(&str, &[&str])] = &[
    ("DT", &["the", "a", "an", "this", "that", "these", "those", "each", "every", "all", "any", "no"]),
    ("IN", &["if", "of", "in", "on", "at", "for", "with", "by", "from", "into", "after", "before", "when", "until", "without", "within"]),
    ("TO", &["to"]),
    ("CC", &["and", "or", "but", "nor"]),
    ("PRP", &["i", "you", "he", "she", "it", "we", "they", "me", "him", "her", "us", "them"]),
    ("RB", &["not", "never", "then", "else", "also", "only", "otherwise"]),
];

const IRREGULAR_LEMMAS: &[(&str, &str)] = &[
    ("is", "be"),
    ("are", "be"),
    ("was", "be"),
    ("were", "be"),
    ("am", "be"),
    ("been", "be"),
    ("being", "be"),
    ("has", "have"),
    ("had", "have"),
    ("does", "do"),
    ("did", "do"),
    ("done", "do"),
    ("men", "man"),
    ("women", "woman"),
    ("children", "child"),
    ("data", "data"),
];

/// Extra entries merged into the built-in lexicon.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LexiconOverrides {
    #[serde(default)]
    pub modals: Vec<String>,
    #[serde(default)]
    pub lemmas: HashMap<String, String>,
}

/// Built-in rule backend driven by a closed-class lexicon.
#[derive(Debug, Clone)]
pub struct LexiconAnnotator {
    sentence_boundary: Regex,
    token: Regex,
    modals: HashSet<String>,
    tags: HashMap<String, &'static str>,
    lemmas: HashMap<String, String>,
}

impl LexiconAnnotator {
    pub fn new() -> Result<Self, AnnotatorError> {
        let mut tags = HashMap::new();
        for (tag, words) in CLOSED_CLASS {
            for word in *words {
                tags.insert(word.to_string(), *tag);
            }
        }

        Ok(Self {
            sentence_boundary: Regex::new(r"[.!?]+\s+")?,
            token: Regex::new(r"\w+(?:['\-]\w+)*|[^\w\s]")?,
            modals: MODALS.iter().map(|m| m.to_string()).collect(),
            tags,
            lemmas: IRREGULAR_LEMMAS
                .iter()
                .map(|(form, lemma)| (form.to_string(), lemma.to_string()))
                .collect(),
        })
    }

    pub fn with_overrides(mut self, overrides: LexiconOverrides) -> Self {
        for modal in overrides.modals {
            self.modals.insert(modal.to_lowercase());
        }
        for (form, lemma) in overrides.lemmas {
            self.lemmas.insert(form.to_lowercase(), lemma);
        }
        self
    }

    pub fn from_file(path: &Path) -> Result<Self, AnnotatorError> {
        let content = std::fs::read_to_string(path).map_err(|source| AnnotatorError::LexiconIo {
            path: path.to_path_buf(),
            source,
        })?;
        let overrides: LexiconOverrides =
            serde_yaml::from_str(&content).map_err(|source| AnnotatorError::LexiconParse {
                path: path.to_path_buf(),
                source,
            })?;
        debug!(
            path = %path.display(),
            modals = overrides.modals.len(),
            lemmas = overrides.lemmas.len(),
            "loaded custom lexicon"
        );
        Ok(Self::new()?.with_overrides(overrides))
    }

    fn tag_for(&self, token: &str) -> &str {
        let lower = token.to_lowercase();
        if self.modals.contains(&lower) {
            return "MD";
        }
        if let Some(tag) = self.tags.get(&lower) {
            return tag;
        }
        match token {
            "." | "!" | "?" => ".",
            "," => ",",
            ";" | ":" => ":",
            _ if token.chars().all(|c| c.is_ascii_digit()) => "CD",
            _ if token.chars().all(|c| !c.is_alphanumeric()) => "SYM",
            _ => "NN",
        }
    }

    fn lemma_for(&self, token: &str) -> String {
        let lower = token.to_lowercase();
        if let Some(lemma) = self.lemmas.get(&lower) {
            return lemma.clone();
        }
        if self.modals.contains(&lower) || self.tags.contains_key(&lower) {
            return lower;
        }

        let len = lower.chars().count();
        if len > 4 && lower.ends_with("ies") {
            return format!("{}y", &lower[..lower.len() - 3]);
        }
        if lower.ends_with("sses") {
            return lower[..lower.len() - 2].to_string();
        }
        if len > 3
            && lower.ends_with('s')
            && !lower.ends_with("ss")
            && !lower.ends_with("us")
            && !lower.ends_with("is")
        {
            return lower[..lower.len() - 1].to_string();
        }
        lower
    }
}

impl Annotator for LexiconAnnotator {
    fn sentences(&self, text: &str) -> Vec<String> {
        let mut sentences = Vec::new();
        let mut start = 0;
        for boundary in self.sentence_boundary.find_iter(text) {
            let end = boundary.start() + boundary.as_str().trim_end().len();
            sentences.push(text[start..end].trim().to_string());
            start = boundary.end();
        }
        sentences.push(text[start..].trim().to_string());
        sentences.retain(|s| !s.is_empty());
        sentences
    }

    fn tokenize(&self, text: &str) -> Vec<String> {
        self.token
            .find_iter(text)
            .map(|m| m.as_str().to_string())
            .collect()
    }

    fn pos_tag(&self, text: &str) -> Vec<TaggedToken> {
        self.tokenize(text)
            .into_iter()
            .map(|text| {
                let tag = self.tag_for(&text).to_string();
                TaggedToken { text, tag: Some(tag) }
            })
            .collect()
    }

    fn lemmatize(&self, text: &str) -> Vec<Lemma> {
        self.tokenize(text)
            .into_iter()
            .map(|token| Lemma { lemma: self.lemma_for(&token), token })
            .collect()
    }
}

/// Picks the configured backend, degrading to [`PlainAnnotator`] when the
/// lexicon backend cannot be built.
pub fn build_annotator(backend: AnnotatorBackend, lexicon_path: Option<&Path>) -> Box<dyn Annotator> {
    match backend {
        AnnotatorBackend::Plain => Box::new(PlainAnnotator),
        AnnotatorBackend::Lexicon => {
            let built = match lexicon_path {
                Some(path) => LexiconAnnotator::from_file(path),
                None => LexiconAnnotator::new(),
            };
            match built {
                Ok(annotator) => Box::new(annotator),
                Err(e) => {
                    warn!(error = %e, "lexicon annotator unavailable, falling back to plain tokenization");
                    Box::new(PlainAnnotator)
                }
            }
        }
    }
}
