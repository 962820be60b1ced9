use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing_subscriber::EnvFilter;

use crate::annotator::{build_annotator, Annotator, AnnotatorBackend};
use crate::cli::OutputFormat;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub annotator: AnnotatorConfig,
    pub output: OutputConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnotatorConfig {
    pub backend: AnnotatorBackend,
    #[serde(default)]
    pub lexicon_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub default_format: OutputFormat,
    #[serde(default = "default_csv_file_name")]
    pub csv_file_name: String,
    #[serde(default)]
    pub template_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_csv_file_name() -> String {
    "testscribe_testcases.csv".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: default_log_level() }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            annotator: AnnotatorConfig {
                backend: AnnotatorBackend::Lexicon,
                lexicon_path: None,
            },
            output: OutputConfig {
                default_format: OutputFormat::Json,
                csv_file_name: default_csv_file_name(),
                template_dir: None,
            },
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir().ok_or_else(|| anyhow::anyhow!("Could not find home directory"))?;
        Ok(home.join(".testscribe").join("config.yml"))
    }

    pub async fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?).await
    }

    /// Reads the config at `path`, writing the defaults there first if it is missing.
    pub async fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = fs::read_to_string(path).await?;
            Ok(serde_yaml::from_str(&content)?)
        } else {
            let config = Config::default();
            config.save_to(path).await?;
            Ok(config)
        }
    }

    pub async fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?).await
    }

    pub async fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let content = serde_yaml::to_string(self)?;
        fs::write(path, content).await?;

        Ok(())
    }

    pub fn set_annotator_backend(&mut self, backend: AnnotatorBackend) {
        self.annotator.backend = backend;
    }

    pub fn set_lexicon_path(&mut self, path: PathBuf) {
        self.annotator.lexicon_path = Some(path);
    }

    pub fn set_default_format(&mut self, format: OutputFormat) {
        self.output.default_format = format;
    }

    pub fn set_template_dir(&mut self, dir: PathBuf) {
        self.output.template_dir = Some(dir);
    }

    pub fn set_log_level(&mut self, level: String) {
        self.logging.level = level;
    }

    pub fn build_annotator(&self, backend_override: Option<AnnotatorBackend>) -> Box<dyn Annotator> {
        let backend = backend_override.unwrap_or(self.annotator.backend);
        build_annotator(backend, self.annotator.lexicon_path.as_deref())
    }

    pub fn validate(&self) -> ValidationResult {
        let mut issues = Vec::new();
        let mut warnings = Vec::new();

        if let Some(ref lexicon) = self.annotator.lexicon_path {
            if !lexicon.exists() {
                warnings.push(format!(
                    "Lexicon file {} does not exist; annotation will fall back to plain tokenization",
                    lexicon.display()
                ));
            }
            if self.annotator.backend == AnnotatorBackend::Plain {
                warnings.push("A lexicon path is set but the plain backend ignores it".to_string());
            }
        }

        if self.output.csv_file_name.trim().is_empty() {
            issues.push("CSV file name must not be empty".to_string());
        }

        if let Some(ref dir) = self.output.template_dir {
            if !dir.is_dir() {
                warnings.push(format!("Template directory {} does not exist", dir.display()));
            }
        }

        if let Err(e) = EnvFilter::try_new(&self.logging.level) {
            issues.push(format!("Invalid log level '{}': {}", self.logging.level, e));
        }

        ValidationResult {
            is_valid: issues.is_empty(),
            issues,
            warnings,
        }
    }
}

#[derive(Debug)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub issues: Vec<String>,
    pub warnings: Vec<String>,
}
