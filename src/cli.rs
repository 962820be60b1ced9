use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::annotator::AnnotatorBackend;

#[derive(Parser)]
#[command(name = "testscribe")]
#[command(about = "🧪 TESTSCRIBE - Requirement-to-Test-Case Generator")]
#[command(long_about = "TESTSCRIBE derives structured test case skeletons from free-text requirements.

QUICK START:
  testscribe derive \"The user can register with a valid email.\"
  testscribe derive --file requirements.txt --format csv
  testscribe config --show

EXAMPLES:
  testscribe derive --file requirements.json --format markdown --output tests.md
  testscribe derive --dir ./stories --format csv --output suite.csv --skip-invalid
  testscribe derive \"If the password is valid then access is granted else access is denied.\" --template checklist")]
#[command(version = "1.0.0")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Derive test cases from requirements")]
    #[command(long_about = "Derive test cases from one or more requirements.

INPUT OPTIONS (combine freely):
  <TEXT>...  Each quoted argument is one requirement
  --file     One requirement per non-blank line (.txt, .md, .rst, .pdf, .docx, .xlsx)
             or a JSON list of {\"text\": ...} objects (.json)
  --dir      Every supported file in a directory tree

OUTPUT OPTIONS:
  --format   json, csv, markdown, plain
  --template Render with a Handlebars template (standard, checklist or a custom one)
  --output   Save results to a file instead of displaying them

EXAMPLES:
  testscribe derive \"The system must not allow duplicate emails.\"
  testscribe derive --file reqs.txt --format csv --output suite.csv")]
    Derive {
        #[arg(help = "Requirement text (one requirement per argument)")]
        text: Vec<String>,

        #[arg(short, long, help = "File with requirements")]
        file: Option<PathBuf>,

        #[arg(short, long, help = "Directory with requirement files")]
        dir: Option<PathBuf>,

        #[arg(short, long, help = "Save output to file instead of displaying on screen")]
        output: Option<PathBuf>,

        #[arg(long, help = "Output format", value_enum)]
        format: Option<OutputFormat>,

        #[arg(long, help = "Render output with a named template")]
        template: Option<String>,

        #[arg(long, help = "Linguistic annotation backend", value_enum)]
        annotator: Option<AnnotatorBackend>,

        #[arg(long, help = "Continue processing on errors instead of stopping")]
        continue_on_error: bool,

        #[arg(long, help = "Skip invalid files during directory processing")]
        skip_invalid: bool,
    },

    #[command(about = "Show and manage configuration")]
    #[command(long_about = "Show or update the TESTSCRIBE configuration.

CONFIGURATION FILE: ~/.testscribe/config.yml

EXAMPLES:
  testscribe config --show
  testscribe config --annotator plain
  testscribe config --lexicon ./domain-lexicon.yml
  testscribe config --init-templates ./templates")]
    Config {
        #[arg(long, help = "Display current configuration values")]
        show: bool,

        #[arg(long, help = "Show config file location and status")]
        debug: bool,

        #[arg(long, help = "Validate all configuration settings")]
        validate: bool,

        #[arg(long, help = "Set the default annotation backend", value_enum)]
        annotator: Option<AnnotatorBackend>,

        #[arg(long, help = "Set a YAML lexicon extending the built-in annotator")]
        lexicon: Option<PathBuf>,

        #[arg(long, help = "Set the default output format", value_enum)]
        format: Option<OutputFormat>,

        #[arg(long, help = "Set the default log level (e.g. info, debug, testscribe=trace)")]
        log_level: Option<String>,

        #[arg(long, help = "Create a custom template directory and use it")]
        init_templates: Option<PathBuf>,
    },
}

#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Json,
    Csv,
    Markdown,
    Plain,
}
