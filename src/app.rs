use anyhow::Result;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::annotator::AnnotatorBackend;
use crate::cli::{Commands, OutputFormat};
use crate::config::Config;
use crate::document_processor::DocumentProcessor;
use crate::error_handler::{ErrorHandler, ProcessingError};
use crate::export::export_csv;
use crate::generator::TestCaseGenerator;
use crate::model::{Requirement, TestCase, TestCaseResponse};
use crate::template_engine::{create_template_directory, ReportSummary, TemplateEngine};

pub struct App {
    pub config: Config,
    config_path: Option<PathBuf>,
    document_processor: DocumentProcessor,
    template_engine: TemplateEngine,
}

impl App {
    pub async fn new() -> Result<Self> {
        let config = Config::load().await?;
        let mut app = Self::with_config(config).await?;
        app.config_path = Some(Config::config_path()?);
        Ok(app)
    }

    /// Builds an app around an already loaded config; changes made through
    /// `config` commands are not persisted.
    pub async fn with_config(config: Config) -> Result<Self> {
        let template_engine = match &config.output.template_dir {
            Some(dir) => TemplateEngine::with_template_dir(dir).await?,
            None => TemplateEngine::new()?,
        };

        Ok(Self {
            config,
            config_path: None,
            document_processor: DocumentProcessor::new(),
            template_engine,
        })
    }

    fn print_branded_header(&self) {
        println!("🧪 TESTSCRIBE - Requirement-to-Test-Case Generator");
        println!("==================================================");
    }

    pub async fn run_command(&mut self, command: Commands) -> Result<()> {
        match command {
            Commands::Derive {
                text,
                file,
                dir,
                output,
                format,
                template,
                annotator,
                continue_on_error,
                skip_invalid,
            } => {
                self.print_branded_header();

                if text.is_empty() && file.is_none() && dir.is_none() {
                    return Err(anyhow::anyhow!("No input provided. Use <TEXT>, --file, or --dir"));
                }

                let mut handler = ErrorHandler::new(continue_on_error, skip_invalid);
                let requirements = self
                    .collect_requirements(text, file, dir, &mut handler)
                    .await?;
                handler.print_summary();

                let test_cases = self.derive(&requirements, annotator)?;
                println!(
                    "🧪 Derived {} test cases from {} requirements",
                    test_cases.len(),
                    requirements.len()
                );

                let format = format.unwrap_or(self.config.output.default_format);
                let rendered = self.render(&test_cases, format, template.as_deref())?;

                // CSV always lands in a file, like a download
                let destination = match (output, format, &template) {
                    (Some(path), _, _) => Some(path),
                    (None, OutputFormat::Csv, None) => Some(PathBuf::from(&self.config.output.csv_file_name)),
                    _ => None,
                };

                match destination {
                    Some(path) => {
                        fs::write(&path, &rendered).await?;
                        println!("📁 Test cases saved to: {}", path.display());
                    }
                    None => println!("{}", String::from_utf8_lossy(&rendered)),
                }
            }

            Commands::Config {
                show,
                debug,
                validate,
                annotator,
                lexicon,
                format,
                log_level,
                init_templates,
            } => {
                let mut changed = false;

                if let Some(backend) = annotator {
                    self.config.set_annotator_backend(backend);
                    println!("✅ Annotator backend set to: {}", backend);
                    changed = true;
                }

                if let Some(path) = lexicon {
                    println!("✅ Lexicon set to: {}", path.display());
                    self.config.set_lexicon_path(path);
                    changed = true;
                }

                if let Some(format) = format {
                    self.config.set_default_format(format);
                    println!("✅ Default output format set to: {:?}", format);
                    changed = true;
                }

                if let Some(level) = log_level {
                    println!("✅ Log level set to: {}", level);
                    self.config.set_log_level(level);
                    changed = true;
                }

                if let Some(dir) = init_templates {
                    let dir = create_template_directory(&dir).await?;
                    self.template_engine.load_custom_templates(&dir).await?;
                    println!("✅ Template directory created: {}", dir.display());
                    self.config.set_template_dir(dir);
                    changed = true;
                }

                if changed {
                    self.persist_config().await?;
                }

                if validate {
                    self.print_validation();
                }

                if debug {
                    self.show_config_debug();
                }

                if show || !(changed || validate || debug) {
                    self.show_config_status();
                }
            }
        }

        Ok(())
    }

    /// Runs the derivation engine with the configured annotator.
    pub fn derive(&self, requirements: &[Requirement], backend: Option<AnnotatorBackend>) -> Result<Vec<TestCase>> {
        let generator = TestCaseGenerator::new(self.config.build_annotator(backend))?;
        Ok(generator.generate(requirements))
    }

    pub fn render(&self, test_cases: &[TestCase], format: OutputFormat, template: Option<&str>) -> Result<Vec<u8>> {
        if let Some(name) = template {
            return Ok(self
                .template_engine
                .render_test_cases(name, "Derived Test Cases", test_cases)?
                .into_bytes());
        }

        Ok(match format {
            OutputFormat::Json => serde_json::to_string_pretty(&TestCaseResponse::from(test_cases.to_vec()))?.into_bytes(),
            OutputFormat::Csv => export_csv(test_cases)?,
            OutputFormat::Markdown => self.format_as_markdown(test_cases).into_bytes(),
            OutputFormat::Plain => self.format_as_plain(test_cases).into_bytes(),
        })
    }

    async fn collect_requirements(
        &self,
        text: Vec<String>,
        file: Option<PathBuf>,
        dir: Option<PathBuf>,
        handler: &mut ErrorHandler,
    ) -> Result<Vec<Requirement>> {
        let mut requirements: Vec<Requirement> = text.into_iter().map(Requirement::new).collect();

        if let Some(file_path) = file {
            if file_path.exists() {
                println!("📖 Reading requirements from: {}", file_path.display());
                let loaded = self.document_processor.extract_requirements_from_file(&file_path).await?;
                println!("📄 Loaded {} requirements from file", loaded.len());
                requirements.extend(loaded);
            } else {
                let error = ProcessingError::file_not_found(file_path);
                let message = error.to_string();
                if !handler.handle_error(error)? {
                    return Err(anyhow::anyhow!("Stopped at {}", message));
                }
            }
        }

        if let Some(dir_path) = dir {
            requirements.extend(self.read_directory(&dir_path, handler).await?);
        }

        Ok(requirements)
    }

    async fn read_directory(&self, path: &Path, handler: &mut ErrorHandler) -> Result<Vec<Requirement>> {
        if !path.exists() || !path.is_dir() {
            return Err(anyhow::anyhow!("Directory does not exist: {:?}", path));
        }

        println!("📁 Scanning directory: {}", path.display());
        let mut requirements = Vec::new();
        let mut file_count = 0;

        let entries = WalkDir::new(path)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file());

        for entry in entries {
            let file_path = entry.path();
            if !self.document_processor.is_supported_format(file_path) {
                debug!(file = %file_path.display(), "ignoring unsupported file");
                continue;
            }

            match self.document_processor.extract_requirements_from_file(file_path).await {
                Ok(loaded) => {
                    println!("  📖 Reading: {} ({} requirements)", file_path.display(), loaded.len());
                    if loaded.is_empty() {
                        handler.add_warning(format!("⚠️  No requirements found in {}", file_path.display()));
                    }
                    requirements.extend(loaded);
                    file_count += 1;
                }
                Err(e) => {
                    let error = if file_path.extension().and_then(|ext| ext.to_str()) == Some("json") {
                        ProcessingError::malformed_requirements(file_path.to_path_buf(), e.to_string())
                    } else {
                        ProcessingError::unreadable_format(file_path.to_path_buf(), e.to_string())
                    };
                    let message = error.to_string();
                    if !handler.handle_error(error)? {
                        return Err(anyhow::anyhow!("Stopped at {}", message));
                    }
                }
            }
        }

        info!(files = file_count, requirements = requirements.len(), "loaded requirement directory");
        println!("📊 Loaded {} files with {} requirements", file_count, requirements.len());
        Ok(requirements)
    }

    fn format_as_markdown(&self, test_cases: &[TestCase]) -> String {
        let summary = ReportSummary::from_test_cases(test_cases);
        let mut output = String::new();

        output.push_str("# 🧪 TESTSCRIBE Test Case Report\n\n");

        output.push_str("## 📊 Summary\n\n");
        output.push_str(&format!("- **Test Cases:** {}\n", summary.total));
        output.push_str(&format!("- **Negative Cases:** {}\n", summary.negative));
        output.push_str(&format!("- **Conditional Cases:** {}\n", summary.conditional));
        output.push_str(&format!(
            "- **Severity:** {} High / {} Medium / {} Low\n\n",
            summary.high, summary.medium, summary.low
        ));

        if test_cases.is_empty() {
            output.push_str("No test cases were derived.\n");
            return output;
        }

        output.push_str("| ID | Title | Severity | Tags |\n");
        output.push_str("|----|-------|----------|------|\n");
        for tc in test_cases {
            output.push_str(&format!(
                "| {} | {} | {} | {} |\n",
                tc.id,
                tc.title.replace('|', "\\|"),
                tc.severity,
                tc.tags.join(", ")
            ));
        }
        output.push('\n');

        for tc in test_cases {
            output.push_str(&format!("## {} - {}\n\n", tc.id, tc.title));
            output.push_str(&format!("**Description:** {}\n\n", tc.description));

            if !tc.preconditions.is_empty() {
                output.push_str("**Preconditions:**\n");
                for precondition in &tc.preconditions {
                    output.push_str(&format!("- {}\n", precondition));
                }
                output.push('\n');
            }

            output.push_str("**Steps:**\n");
            for (i, step) in tc.steps.iter().enumerate() {
                output.push_str(&format!("{}. {}\n", i + 1, step));
            }
            output.push('\n');

            output.push_str(&format!("**Expected Output:** {}\n\n", tc.expected_output));
            output.push_str("---\n\n");
        }

        output
    }

    fn format_as_plain(&self, test_cases: &[TestCase]) -> String {
        let mut output = String::new();

        output.push_str("DERIVED TEST CASES\n");
        output.push_str("==================\n\n");

        for tc in test_cases {
            output.push_str(&format!("{} {}\n", tc.id, tc.title));
            output.push_str(&format!("   Description: {}\n", tc.description));
            output.push_str(&format!("   Severity: {}\n", tc.severity));
            if !tc.tags.is_empty() {
                output.push_str(&format!("   Tags: {}\n", tc.tags.join(", ")));
            }
            for precondition in &tc.preconditions {
                output.push_str(&format!("   Given: {}\n", precondition));
            }
            for step in &tc.steps {
                output.push_str(&format!("   - {}\n", step));
            }
            output.push_str(&format!("   Expected: {}\n\n", tc.expected_output));
        }

        output.push_str(&format!("Total: {}\n", test_cases.len()));
        output
    }

    async fn persist_config(&self) -> Result<()> {
        match &self.config_path {
            Some(path) => {
                self.config.save_to(path).await?;
                println!("💾 Configuration saved to: {}", path.display());
            }
            None => debug!("config has no backing file, skipping save"),
        }
        Ok(())
    }

    fn show_config_status(&self) {
        println!("🔧 Current TESTSCRIBE Configuration");
        println!("===================================");
        println!("Annotator backend: {}", self.config.annotator.backend);
        println!(
            "Lexicon: {}",
            self.config
                .annotator
                .lexicon_path
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "built-in".to_string())
        );
        println!("Default format: {:?}", self.config.output.default_format);
        println!("CSV file name: {}", self.config.output.csv_file_name);
        println!("Log level: {}", self.config.logging.level);
        println!("Templates:");
        for template in self.template_engine.list_templates() {
            println!("  • {} - {}", template.name, template.description);
        }
    }

    fn show_config_debug(&self) {
        match &self.config_path {
            Some(path) => {
                println!("📁 Config file: {}", path.display());
                println!("   Exists: {}", if path.exists() { "✅ yes" } else { "❌ no" });
            }
            None => println!("📁 Config file: (in-memory configuration)"),
        }
        match serde_yaml::to_string(&self.config) {
            Ok(yaml) => println!("\n{}", yaml),
            Err(e) => eprintln!("⚠️  Could not serialize configuration: {}", e),
        }
    }

    fn print_validation(&self) {
        let result = self.config.validate();
        if result.is_valid {
            println!("✅ Configuration is valid");
        } else {
            println!("❌ Configuration has issues:");
            for issue in &result.issues {
                println!("   • {}", issue);
            }
        }
        for warning in &result.warnings {
            println!("⚠️  {}", warning);
        }
    }
}
