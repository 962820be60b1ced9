use std::path::PathBuf;
use testscribe::annotator::AnnotatorBackend;
use testscribe::app::App;
use testscribe::cli::{Commands, OutputFormat};
use testscribe::config::Config;
use testscribe::TestCaseResponse;
use tokio::fs;

async fn test_app() -> App {
    App::with_config(Config::default()).await.unwrap()
}

fn derive_command(text: &[&str], output: Option<PathBuf>, format: Option<OutputFormat>) -> Commands {
    Commands::Derive {
        text: text.iter().map(|t| t.to_string()).collect(),
        file: None,
        dir: None,
        output,
        format,
        template: None,
        annotator: None,
        continue_on_error: false,
        skip_invalid: false,
    }
}

#[tokio::test]
async fn test_text_derivation_to_json_file() {
    let dir = tempfile::tempdir().unwrap();
    let output_file = dir.path().join("cases.json");
    let mut app = test_app().await;

    let command = derive_command(
        &["The user can register with a valid email."],
        Some(output_file.clone()),
        Some(OutputFormat::Json),
    );
    app.run_command(command).await.unwrap();

    let content = fs::read_to_string(&output_file).await.unwrap();
    assert!(content.contains("\"testCases\""));
    assert!(content.contains("\"expectedOutput\""));

    let response: TestCaseResponse = serde_json::from_str(&content).unwrap();
    assert_eq!(response.test_cases.len(), 2);
    assert_eq!(response.test_cases[1].id, "TC2");
}

#[tokio::test]
async fn test_csv_without_output_uses_configured_file_name() {
    let dir = tempfile::tempdir().unwrap();
    let csv_path = dir.path().join("suite.csv");
    let mut config = Config::default();
    config.output.csv_file_name = csv_path.display().to_string();
    let mut app = App::with_config(config).await.unwrap();

    let command = derive_command(
        &["If the user enters a valid password then access is granted else access is denied."],
        None,
        Some(OutputFormat::Csv),
    );
    app.run_command(command).await.unwrap();

    let content = fs::read_to_string(&csv_path).await.unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(
        lines[0],
        "ID,Title,Description,Preconditions,Steps,Expected Output,Severity,Tags"
    );
    assert_eq!(lines.len(), 3);
    assert!(lines[1].starts_with("TC1,Access control,the user enters a valid password,"));
}

#[tokio::test]
async fn test_all_output_formats() {
    let app = test_app().await;
    let cases = app
        .derive(
            &[testscribe::Requirement::new("The system must not allow duplicate emails.")],
            Some(AnnotatorBackend::Plain),
        )
        .unwrap();

    let markdown = String::from_utf8(app.render(&cases, OutputFormat::Markdown, None).unwrap()).unwrap();
    assert!(markdown.starts_with("# 🧪 TESTSCRIBE Test Case Report"));
    assert!(markdown.contains("- **Negative Cases:** 1"));
    assert!(markdown.contains("## TC1 - Negative scenario: The system must not allow duplicate emails"));

    let plain = String::from_utf8(app.render(&cases, OutputFormat::Plain, None).unwrap()).unwrap();
    assert!(plain.contains("Severity: High"));
    assert!(plain.contains("Total: 1"));

    let csv = String::from_utf8(app.render(&cases, OutputFormat::Csv, None).unwrap()).unwrap();
    assert_eq!(csv.lines().count(), 2);

    let checklist = String::from_utf8(app.render(&cases, OutputFormat::Json, Some("checklist")).unwrap()).unwrap();
    assert!(checklist.contains("[ ] TC1 [High]"));
}

#[tokio::test]
async fn test_file_derivation_with_template() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("requirements.md");
    let output_file = dir.path().join("report.md");
    fs::write(
        &input,
        "# Signup\n\n- The user can register with a valid email.\n- The system must not allow duplicate emails.\n",
    )
    .await
    .unwrap();

    let mut app = test_app().await;
    let command = Commands::Derive {
        text: vec![],
        file: Some(input),
        dir: None,
        output: Some(output_file.clone()),
        format: None,
        template: Some("standard".to_string()),
        annotator: Some(AnnotatorBackend::Lexicon),
        continue_on_error: false,
        skip_invalid: false,
    };
    app.run_command(command).await.unwrap();

    let report = fs::read_to_string(&output_file).await.unwrap();
    assert!(report.contains("## TC1 - User registration"));
    assert!(report.contains("## TC3 - Negative scenario: The system must not allow duplicate emails"));
}

#[tokio::test]
async fn test_json_requirement_list_input() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("requirements.json");
    let output_file = dir.path().join("cases.json");
    fs::write(&input, r#"[{"text": "Show the report"}, {"text": ""}, {}]"#)
        .await
        .unwrap();

    let mut app = test_app().await;
    let command = Commands::Derive {
        text: vec![],
        file: Some(input),
        dir: None,
        output: Some(output_file.clone()),
        format: Some(OutputFormat::Json),
        template: None,
        annotator: None,
        continue_on_error: false,
        skip_invalid: false,
    };
    app.run_command(command).await.unwrap();

    let response: TestCaseResponse =
        serde_json::from_str(&fs::read_to_string(&output_file).await.unwrap()).unwrap();
    assert_eq!(response.test_cases.len(), 1);
    assert_eq!(response.test_cases[0].title, "Show the report");
}

#[tokio::test]
async fn test_error_handling_no_input() {
    let mut app = test_app().await;
    let result = app.run_command(derive_command(&[], None, None)).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_error_handling_nonexistent_file() {
    let mut app = test_app().await;
    let command = Commands::Derive {
        text: vec![],
        file: Some(PathBuf::from("nonexistent_requirements.txt")),
        dir: None,
        output: None,
        format: None,
        template: None,
        annotator: None,
        continue_on_error: false,
        skip_invalid: false,
    };
    assert!(app.run_command(command).await.is_err());
}

#[tokio::test]
async fn test_missing_file_is_skipped_when_requested() {
    let dir = tempfile::tempdir().unwrap();
    let output_file = dir.path().join("cases.json");
    let mut app = test_app().await;
    let command = Commands::Derive {
        text: vec!["Show the report".to_string()],
        file: Some(dir.path().join("missing.txt")),
        dir: None,
        output: Some(output_file.clone()),
        format: Some(OutputFormat::Json),
        template: None,
        annotator: None,
        continue_on_error: false,
        skip_invalid: true,
    };
    app.run_command(command).await.unwrap();

    let response: TestCaseResponse =
        serde_json::from_str(&fs::read_to_string(&output_file).await.unwrap()).unwrap();
    assert_eq!(response.test_cases.len(), 1);
}

#[tokio::test]
async fn test_unknown_template_is_an_error() {
    let mut app = test_app().await;
    let command = Commands::Derive {
        text: vec!["Show the report".to_string()],
        file: None,
        dir: None,
        output: None,
        format: None,
        template: Some("missing".to_string()),
        annotator: None,
        continue_on_error: false,
        skip_invalid: false,
    };
    assert!(app.run_command(command).await.is_err());
}

async fn requirement_dir() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("a_signup.txt"), "The user can register with a valid email.\n")
        .await
        .unwrap();
    fs::write(dir.path().join("b_broken.json"), "{ not a list")
        .await
        .unwrap();
    fs::write(dir.path().join("c_notes.bin"), [0u8, 1, 2]).await.unwrap();
    fs::create_dir_all(dir.path().join("nested")).await.unwrap();
    fs::write(dir.path().join("nested").join("d_login.md"), "Show the dashboard\n")
        .await
        .unwrap();
    dir
}

fn dir_command(dir: PathBuf, output: PathBuf, continue_on_error: bool, skip_invalid: bool) -> Commands {
    Commands::Derive {
        text: vec![],
        file: None,
        dir: Some(dir),
        output: Some(output),
        format: Some(OutputFormat::Json),
        template: None,
        annotator: None,
        continue_on_error,
        skip_invalid,
    }
}

#[tokio::test]
async fn test_directory_stops_on_malformed_list() {
    let input = requirement_dir().await;
    let out = tempfile::tempdir().unwrap();
    let mut app = test_app().await;

    // Malformed lists are not "invalid files", so skipping alone does not help
    let command = dir_command(input.path().to_path_buf(), out.path().join("cases.json"), false, true);
    assert!(app.run_command(command).await.is_err());
}

#[tokio::test]
async fn test_directory_continues_on_error() {
    let input = requirement_dir().await;
    let out = tempfile::tempdir().unwrap();
    let output_file = out.path().join("cases.json");
    let mut app = test_app().await;

    let command = dir_command(input.path().to_path_buf(), output_file.clone(), true, false);
    app.run_command(command).await.unwrap();

    let response: TestCaseResponse =
        serde_json::from_str(&fs::read_to_string(&output_file).await.unwrap()).unwrap();
    let descriptions: Vec<&str> = response.test_cases.iter().map(|tc| tc.description.as_str()).collect();
    assert_eq!(
        descriptions,
        vec![
            "The user can register with a valid email",
            "The user can not register with a valid email",
            "Show the dashboard",
        ]
    );
}

#[tokio::test]
async fn test_config_command_without_backing_file() {
    let mut app = test_app().await;
    let command = Commands::Config {
        show: true,
        debug: true,
        validate: true,
        annotator: Some(AnnotatorBackend::Plain),
        lexicon: None,
        format: Some(OutputFormat::Markdown),
        log_level: None,
        init_templates: None,
    };
    app.run_command(command).await.unwrap();

    assert_eq!(app.config.annotator.backend, AnnotatorBackend::Plain);
    assert_eq!(app.config.output.default_format, OutputFormat::Markdown);
}

#[tokio::test]
async fn test_init_templates_registers_custom_template() {
    let dir = tempfile::tempdir().unwrap();
    let template_dir = dir.path().join("templates");
    let mut app = test_app().await;

    let command = Commands::Config {
        show: false,
        debug: false,
        validate: false,
        annotator: None,
        lexicon: None,
        format: None,
        log_level: None,
        init_templates: Some(template_dir.clone()),
    };
    app.run_command(command).await.unwrap();
    assert_eq!(app.config.output.template_dir.as_deref(), Some(template_dir.as_path()));

    let cases = app.derive(&[testscribe::Requirement::new("Show the report")], None).unwrap();
    let rendered = String::from_utf8(app.render(&cases, OutputFormat::Json, Some("custom_report")).unwrap()).unwrap();
    assert!(rendered.contains("### TC1: Show the report"));
}
