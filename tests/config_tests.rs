use testscribe::annotator::AnnotatorBackend;
use testscribe::cli::OutputFormat;
use testscribe::config::*;

#[tokio::test]
async fn test_default_config() {
    let config = Config::default();

    assert_eq!(config.annotator.backend, AnnotatorBackend::Lexicon);
    assert!(config.annotator.lexicon_path.is_none());
    assert_eq!(config.output.default_format, OutputFormat::Json);
    assert_eq!(config.output.csv_file_name, "testscribe_testcases.csv");
    assert_eq!(config.logging.level, "info");
    assert!(config.validate().is_valid);
}

#[tokio::test]
async fn test_missing_config_is_created_with_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("config.yml");

    let config = Config::load_from(&path).await.unwrap();
    assert!(path.exists());
    assert_eq!(config.output.csv_file_name, "testscribe_testcases.csv");
}

#[tokio::test]
async fn test_config_modification_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.yml");

    let mut config = Config::default();
    config.set_annotator_backend(AnnotatorBackend::Plain);
    config.set_default_format(OutputFormat::Markdown);
    config.set_log_level("testscribe=debug".to_string());
    config.save_to(&path).await.unwrap();

    let loaded = Config::load_from(&path).await.unwrap();
    assert_eq!(loaded.annotator.backend, AnnotatorBackend::Plain);
    assert_eq!(loaded.output.default_format, OutputFormat::Markdown);
    assert_eq!(loaded.logging.level, "testscribe=debug");
}

#[tokio::test]
async fn test_older_config_without_optional_sections() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.yml");
    tokio::fs::write(&path, "annotator:\n  backend: plain\noutput:\n  default_format: csv\n")
        .await
        .unwrap();

    let config = Config::load_from(&path).await.unwrap();
    assert_eq!(config.output.default_format, OutputFormat::Csv);
    assert_eq!(config.output.csv_file_name, "testscribe_testcases.csv");
    assert_eq!(config.logging.level, "info");
}

#[test]
fn test_validation_flags_bad_settings() {
    let mut config = Config::default();
    config.set_log_level("info,testscribe=notalevel".to_string());
    config.output.csv_file_name = "  ".to_string();

    let result = config.validate();
    assert!(!result.is_valid);
    assert_eq!(result.issues.len(), 2);
}

#[test]
fn test_validation_warns_about_missing_lexicon() {
    let mut config = Config::default();
    config.set_lexicon_path("/nonexistent/lexicon.yml".into());

    let result = config.validate();
    assert!(result.is_valid);
    assert_eq!(result.warnings.len(), 1);
}

#[test]
fn test_missing_lexicon_still_builds_an_annotator() {
    let mut config = Config::default();
    config.set_lexicon_path("/nonexistent/lexicon.yml".into());

    let annotator = config.build_annotator(None);
    assert_eq!(annotator.sentences("One. Two."), vec!["One. Two."]);
}

#[test]
fn test_config_path() {
    let path = Config::config_path().unwrap();
    assert!(path.to_string_lossy().contains(".testscribe"));
    assert!(path.to_string_lossy().contains("config.yml"));
}
