use anyhow::Result;
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::{error, warn};

#[derive(Debug, Clone)]
pub struct ProcessingError {
    pub file_path: Option<PathBuf>,
    pub error_type: ErrorType,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorType {
    FileNotFound,
    UnreadableFormat,
    MalformedRequirements,
}

/// Decides whether a batch run continues after a file-level failure.
pub struct ErrorHandler {
    continue_on_error: bool,
    skip_invalid: bool,
    errors: Vec<ProcessingError>,
    warnings: Vec<String>,
}

impl ErrorHandler {
    pub fn new(continue_on_error: bool, skip_invalid: bool) -> Self {
        Self {
            continue_on_error,
            skip_invalid,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Records the error and returns whether processing should continue.
    pub fn handle_error(&mut self, error: ProcessingError) -> Result<bool> {
        let location = error
            .file_path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "unknown".to_string());

        let should_continue = match error.error_type {
            ErrorType::FileNotFound | ErrorType::UnreadableFormat if self.skip_invalid => {
                warn!(file = %location, reason = %error.message, "skipped invalid file");
                self.warnings
                    .push(format!("⚠️  Skipped invalid file: {} - {}", location, error.message));
                true
            }
            _ if self.continue_on_error => {
                error!(file = %location, reason = %error.message, "error processing file, continuing");
                self.errors.push(error);
                true
            }
            _ => {
                self.errors.push(error);
                false
            }
        };

        Ok(should_continue)
    }

    pub fn add_warning(&mut self, message: String) {
        self.warnings.push(message);
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn get_summary(&self) -> ErrorSummary {
        let mut error_counts = BTreeMap::new();
        for error in &self.errors {
            *error_counts.entry(format!("{:?}", error.error_type)).or_insert(0) += 1;
        }

        ErrorSummary {
            total_errors: self.errors.len(),
            total_warnings: self.warnings.len(),
            error_counts,
            errors: self.errors.clone(),
            warnings: self.warnings.clone(),
        }
    }

    pub fn print_summary(&self) {
        if !self.has_errors() && !self.has_warnings() {
            return;
        }

        println!("\n📊 Processing Summary");
        println!("===================");

        if self.has_warnings() {
            println!("⚠️  Warnings: {}", self.warnings.len());
            for warning in &self.warnings {
                println!("   {}", warning);
            }
        }

        if self.has_errors() {
            println!("❌ Errors: {}", self.errors.len());
            for (error_type, count) in self.get_summary().error_counts {
                println!("   {}: {}", error_type, count);
            }
        }
    }
}

#[derive(Debug)]
pub struct ErrorSummary {
    pub total_errors: usize,
    pub total_warnings: usize,
    pub error_counts: BTreeMap<String, usize>,
    pub errors: Vec<ProcessingError>,
    pub warnings: Vec<String>,
}

// Helper functions for creating common errors
impl ProcessingError {
    pub fn file_not_found(path: PathBuf) -> Self {
        Self {
            file_path: Some(path),
            error_type: ErrorType::FileNotFound,
            message: "File not found".to_string(),
        }
    }

    pub fn unreadable_format(path: PathBuf, details: String) -> Self {
        Self {
            file_path: Some(path),
            error_type: ErrorType::UnreadableFormat,
            message: format!("Unsupported or unreadable format: {}", details),
        }
    }

    pub fn malformed_requirements(path: PathBuf, details: String) -> Self {
        Self {
            file_path: Some(path),
            error_type: ErrorType::MalformedRequirements,
            message: format!("Malformed requirement list: {}", details),
        }
    }
}

impl std::fmt::Display for ProcessingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.file_path {
            Some(path) => write!(f, "{}: {}", path.display(), self.message),
            None => write!(f, "{}", self.message),
        }
    }
}
