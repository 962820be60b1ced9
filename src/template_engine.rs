use anyhow::{anyhow, Result};
use handlebars::{no_escape, Context, Handlebars, Helper, HelperResult, Output, RenderContext};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

use crate::model::{Severity, TestCase};

#[derive(Debug, Clone)]
pub struct Template {
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportSummary {
    pub total: usize,
    pub negative: usize,
    pub conditional: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

impl ReportSummary {
    pub fn from_test_cases(test_cases: &[TestCase]) -> Self {
        let count_severity = |severity: Severity| test_cases.iter().filter(|tc| tc.severity == severity).count();
        Self {
            total: test_cases.len(),
            negative: test_cases.iter().filter(|tc| tc.tags.iter().any(|t| t == "negative")).count(),
            conditional: test_cases.iter().filter(|tc| tc.tags.iter().any(|t| t == "conditional")).count(),
            high: count_severity(Severity::High),
            medium: count_severity(Severity::Medium),
            low: count_severity(Severity::Low),
        }
    }
}

#[derive(Serialize)]
struct ReportData<'a> {
    title: &'a str,
    timestamp: String,
    version: &'static str,
    summary: ReportSummary,
    test_cases: &'a [TestCase],
}

pub struct TemplateEngine {
    handlebars: Handlebars<'static>,
    templates: BTreeMap<String, Template>,
}

impl TemplateEngine {
    pub fn new() -> Result<Self> {
        let mut handlebars = Handlebars::new();
        handlebars.set_strict_mode(false);
        handlebars.register_escape_fn(no_escape);
        Self::register_helpers(&mut handlebars);

        let mut engine = Self {
            handlebars,
            templates: BTreeMap::new(),
        };
        engine.register(
            "standard",
            "Markdown report with a severity summary",
            include_str!("../templates/standard.hbs"),
        )?;
        engine.register(
            "checklist",
            "Plain checklist, one line per test case",
            include_str!("../templates/checklist.hbs"),
        )?;
        Ok(engine)
    }

    pub async fn with_template_dir(template_dir: &Path) -> Result<Self> {
        let mut engine = Self::new()?;
        engine.load_custom_templates(template_dir).await?;
        Ok(engine)
    }

    fn register_helpers(handlebars: &mut Handlebars) {
        handlebars.register_helper("format_date", Box::new(format_date_helper));
        handlebars.register_helper("uppercase", Box::new(uppercase_helper));
        handlebars.register_helper("pluralize", Box::new(pluralize_helper));
        handlebars.register_helper("join", Box::new(join_helper));
    }

    fn register(&mut self, name: &str, description: &str, content: &str) -> Result<()> {
        self.handlebars
            .register_template_string(name, content)
            .map_err(|e| anyhow!("Failed to register template '{}': {}", name, e))?;
        self.templates.insert(
            name.to_string(),
            Template {
                name: name.to_string(),
                description: description.to_string(),
            },
        );
        Ok(())
    }

    /// Registers every `.hbs` file in `template_dir`; custom files may shadow built-ins.
    pub async fn load_custom_templates(&mut self, template_dir: &Path) -> Result<()> {
        if !template_dir.exists() {
            return Ok(());
        }

        let mut entries = fs::read_dir(template_dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|s| s.to_str()) == Some("hbs") {
                let name = path
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .ok_or_else(|| anyhow!("Invalid template filename"))?
                    .to_string();
                let content = fs::read_to_string(&path).await?;
                self.register(&name, &format!("Custom template from {}", path.display()), &content)?;
                debug!(template = %name, "registered custom template");
            }
        }
        Ok(())
    }

    pub fn has_template(&self, name: &str) -> bool {
        self.templates.contains_key(name)
    }

    pub fn list_templates(&self) -> Vec<&Template> {
        self.templates.values().collect()
    }

    pub fn render_test_cases(&self, template_name: &str, title: &str, test_cases: &[TestCase]) -> Result<String> {
        if !self.has_template(template_name) {
            return Err(anyhow!(
                "Unknown template '{}'. Available: {}",
                template_name,
                self.templates.keys().cloned().collect::<Vec<_>>().join(", ")
            ));
        }

        let data = ReportData {
            title,
            timestamp: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            version: env!("CARGO_PKG_VERSION"),
            summary: ReportSummary::from_test_cases(test_cases),
            test_cases,
        };

        self.handlebars
            .render(template_name, &data)
            .map_err(|e| anyhow!("Failed to render template '{}': {}", template_name, e))
    }
}

fn format_date_helper(
    h: &Helper,
    _: &Handlebars,
    _: &Context,
    _: &mut RenderContext,
    out: &mut dyn Output,
) -> HelperResult {
    let format = h.param(0).and_then(|v| v.value().as_str()).unwrap_or("%Y-%m-%d %H:%M:%S");
    out.write(&chrono::Local::now().format(format).to_string())?;
    Ok(())
}

fn uppercase_helper(
    h: &Helper,
    _: &Handlebars,
    _: &Context,
    _: &mut RenderContext,
    out: &mut dyn Output,
) -> HelperResult {
    let text = h.param(0).and_then(|v| v.value().as_str()).unwrap_or("");
    out.write(&text.to_uppercase())?;
    Ok(())
}

fn pluralize_helper(
    h: &Helper,
    _: &Handlebars,
    _: &Context,
    _: &mut RenderContext,
    out: &mut dyn Output,
) -> HelperResult {
    let count = h.param(0).and_then(|v| v.value().as_u64()).unwrap_or(0);
    let singular = h.param(1).and_then(|v| v.value().as_str()).unwrap_or("");
    let plural = h
        .param(2)
        .and_then(|v| v.value().as_str())
        .map(str::to_string)
        .unwrap_or_else(|| format!("{}s", singular));

    out.write(if count == 1 { singular } else { plural.as_str() })?;
    Ok(())
}

fn join_helper(
    h: &Helper,
    _: &Handlebars,
    _: &Context,
    _: &mut RenderContext,
    out: &mut dyn Output,
) -> HelperResult {
    let separator = h.param(1).and_then(|v| v.value().as_str()).unwrap_or(", ");
    let items: Vec<&str> = h
        .param(0)
        .and_then(|v| v.value().as_array())
        .map(|values| values.iter().filter_map(|v| v.as_str()).collect())
        .unwrap_or_default();
    out.write(&items.join(separator))?;
    Ok(())
}

// Create template directory structure
pub async fn create_template_directory(path: &Path) -> Result<PathBuf> {
    fs::create_dir_all(path).await?;

    let example = path.join("custom_report.hbs");
    if !example.exists() {
        fs::write(&example, include_str!("../templates/examples/custom_report.hbs")).await?;
    }

    let readme_path = path.join("README.md");
    if !readme_path.exists() {
        let readme_content = r#"# TESTSCRIBE Custom Templates

Every `.hbs` file in this directory is available as `--template <file stem>`.

## Template Variables

- `{{title}}` - Report title
- `{{timestamp}}` - Generation time
- `{{version}}` - testscribe version
- `{{summary}}` - Counts: `total`, `negative`, `conditional`, `high`, `medium`, `low`
- `{{test_cases}}` - Array of test cases with `id`, `title`, `description`,
  `preconditions`, `steps`, `expectedOutput`, `severity`, `tags`

## Helpers

- `{{format_date "%Y-%m-%d"}}` - Format current date
- `{{uppercase text}}` - Convert to uppercase
- `{{pluralize count "item" "items"}}` - Pluralize based on count
- `{{join list ", "}}` - Join a list of strings
"#;
        fs::write(&readme_path, readme_content).await?;
    }

    Ok(path.to_path_buf())
}
