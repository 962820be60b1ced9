//! Derives structured test case skeletons from free-text software requirements.
//!
//! ```no_run
//! use testscribe::annotator::PlainAnnotator;
//! use testscribe::{Requirement, TestCaseGenerator};
//!
//! let generator = TestCaseGenerator::new(Box::new(PlainAnnotator))?;
//! let cases = generator.generate(&[Requirement::new("The user can register with a valid email.")]);
//! assert_eq!(cases[1].title, "Negative: Negative scenario: The user can not register with a valid email");
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod annotator;
pub mod app;
pub mod cli;
pub mod conditional;
pub mod config;
pub mod document_processor;
pub mod error_handler;
pub mod export;
pub mod generator;
pub mod heuristics;
pub mod model;
pub mod negation;
pub mod segmenter;
pub mod template_engine;

pub use export::export_csv;
pub use generator::{IdSequence, TestCaseGenerator};
pub use model::{Requirement, Severity, TestCase, TestCaseResponse};
