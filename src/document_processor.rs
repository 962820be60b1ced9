use anyhow::{anyhow, Result};
use std::path::Path;
use tokio::fs;

use crate::model::Requirement;

pub struct DocumentProcessor;

impl DocumentProcessor {
    pub fn new() -> Self {
        Self
    }

    /// Loads the requirements held in a file: a JSON `[{"text": ...}]` list for
    /// `.json`, otherwise one requirement per non-blank line of extracted text.
    pub async fn extract_requirements_from_file<P: AsRef<Path>>(&self, file_path: P) -> Result<Vec<Requirement>> {
        let path = file_path.as_ref();
        if extension_of(path)?.as_str() == "json" {
            let content = fs::read_to_string(path).await?;
            return parse_requirement_list(&content);
        }
        let text = self.extract_text_from_file(path).await?;
        Ok(requirements_from_text(&text))
    }

    pub async fn extract_text_from_file<P: AsRef<Path>>(&self, file_path: P) -> Result<String> {
        let path = file_path.as_ref();
        match extension_of(path)?.as_str() {
            "pdf" => self.extract_pdf_text(path).await,
            "docx" => self.extract_docx_text(path).await,
            "xlsx" => self.extract_xlsx_text(path),
            "txt" | "md" | "rst" => Ok(fs::read_to_string(path).await?),
            other => Err(anyhow!("Unsupported file format: {}", other)),
        }
    }

    async fn extract_pdf_text(&self, path: &Path) -> Result<String> {
        let bytes = fs::read(path).await?;
        let text = pdf_extract::extract_text_from_mem(&bytes)
            .map_err(|e| anyhow!("Failed to extract PDF text: {}", e))?;

        Ok(self.clean_extracted_text(&text))
    }

    async fn extract_docx_text(&self, path: &Path) -> Result<String> {
        let bytes = fs::read(path).await?;
        let docx = docx_rs::read_docx(&bytes)
            .map_err(|e| anyhow!("Failed to read DOCX file: {}", e))?;

        // One line per paragraph
        let mut text = String::new();
        for child in docx.document.children {
            if let docx_rs::DocumentChild::Paragraph(para) = child {
                for run in para.children {
                    if let docx_rs::ParagraphChild::Run(run_content) = run {
                        for run_child in run_content.children {
                            if let docx_rs::RunChild::Text(text_content) = run_child {
                                text.push_str(&text_content.text);
                            }
                        }
                    }
                }
                text.push('\n');
            }
        }

        Ok(self.clean_extracted_text(&text))
    }

    fn extract_xlsx_text(&self, path: &Path) -> Result<String> {
        use calamine::{open_workbook, Reader, Xlsx};

        let mut workbook: Xlsx<_> = open_workbook(path)
            .map_err(|e| anyhow!("Failed to open XLSX file: {}", e))?;

        // Each row becomes one line of text: its string cells joined by spaces
        let mut text = String::new();
        for sheet_name in workbook.sheet_names() {
            if let Ok(range) = workbook.worksheet_range(&sheet_name) {
                for row in range.rows() {
                    let cells: Vec<String> = row
                        .iter()
                        .filter_map(|cell| match cell {
                            calamine::Data::String(s) => Some(s.trim().to_string()),
                            _ => None,
                        })
                        .filter(|s| !s.is_empty())
                        .collect();

                    if !cells.is_empty() {
                        text.push_str(&cells.join(" "));
                        text.push('\n');
                    }
                }
            }
        }

        Ok(self.clean_extracted_text(&text))
    }

    fn clean_extracted_text(&self, text: &str) -> String {
        text.lines()
            .map(|line| line.trim())
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn is_supported_format<P: AsRef<Path>>(&self, file_path: P) -> bool {
        file_path
            .as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                matches!(
                    ext.to_lowercase().as_str(),
                    "pdf" | "docx" | "xlsx" | "txt" | "md" | "rst" | "json"
                )
            })
            .unwrap_or(false)
    }
}

impl Default for DocumentProcessor {
    fn default() -> Self {
        Self::new()
    }
}

fn extension_of(path: &Path) -> Result<String> {
    Ok(path
        .extension()
        .and_then(|ext| ext.to_str())
        .ok_or_else(|| anyhow!("Unable to determine file extension"))?
        .to_lowercase())
}

pub fn parse_requirement_list(content: &str) -> Result<Vec<Requirement>> {
    serde_json::from_str(content).map_err(|e| anyhow!("Invalid requirement list: {}", e))
}

/// Splits free text into requirements, one per non-blank line. Markdown
/// headings are skipped and list markers are stripped.
pub fn requirements_from_text(text: &str) -> Vec<Requirement> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(strip_list_marker)
        .filter(|line| !line.is_empty())
        .map(Requirement::new)
        .collect()
}

fn strip_list_marker(line: &str) -> &str {
    let bullet = line.trim_start_matches(['-', '*', '+', '•']);
    if bullet.len() != line.len() && bullet.starts_with(char::is_whitespace) {
        return bullet.trim_start();
    }

    let digits = line.len() - line.trim_start_matches(|c: char| c.is_ascii_digit()).len();
    if digits > 0 {
        let rest = &line[digits..];
        if let Some(after) = rest.strip_prefix(['.', ')']) {
            if after.starts_with(char::is_whitespace) {
                return after.trim_start();
            }
        }
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_supported_format() {
        let processor = DocumentProcessor::new();

        assert!(processor.is_supported_format("test.pdf"));
        assert!(processor.is_supported_format("test.docx"));
        assert!(processor.is_supported_format("test.xlsx"));
        assert!(processor.is_supported_format("test.txt"));
        assert!(processor.is_supported_format("test.md"));
        assert!(processor.is_supported_format("test.rst"));
        assert!(processor.is_supported_format("reqs.JSON"));

        assert!(!processor.is_supported_format("test.doc"));
        assert!(!processor.is_supported_format("test.xls"));
        assert!(!processor.is_supported_format("test.unknown"));
        assert!(!processor.is_supported_format("Makefile"));
    }

    #[test]
    fn test_requirements_from_text_strips_markup() {
        let text = "# Signup\n\n- The user can register.\n2. Emails must be unique\n3.5 is a version\n*emphasis* stays\n";
        let texts: Vec<String> = requirements_from_text(text).into_iter().map(|r| r.text).collect();
        assert_eq!(
            texts,
            vec![
                "The user can register.",
                "Emails must be unique",
                "3.5 is a version",
                "*emphasis* stays",
            ]
        );
    }

    #[test]
    fn test_parse_requirement_list() {
        let reqs = parse_requirement_list(r#"[{"text": "The user can login."}, {"text": ""}]"#).unwrap();
        assert_eq!(reqs.len(), 2);
        assert!(parse_requirement_list("{not json").is_err());
    }

    #[tokio::test]
    async fn test_json_file_is_parsed_as_list() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reqs.json");
        fs::write(&path, r#"[{"text": "A"}, {"text": "B"}]"#).await.unwrap();

        let reqs = DocumentProcessor::new().extract_requirements_from_file(&path).await.unwrap();
        assert_eq!(reqs, vec![Requirement::new("A"), Requirement::new("B")]);
    }
}
