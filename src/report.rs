//! Extraction report: the run summary written alongside the output files.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::book::{Document, Metadata, TocEntry};
use crate::error::Result;
use crate::pipeline::RunManifest;

/// The full report serialized to `extraction_report.json`.
#[derive(Debug, Serialize)]
pub struct ExtractionReport {
    pub metadata: Metadata,
    pub extraction_summary: Summary,
    pub spine: Vec<SpineRecord>,
    pub toc: Vec<TocEntry>,
    pub extracted_files: Vec<ExtractedRecord>,
    pub skipped_files: Vec<SkippedRecord>,
    pub failed_files: Vec<FailedRecord>,
}

#[derive(Debug, Serialize)]
pub struct Summary {
    pub total_files_extracted: usize,
    pub total_files_skipped: usize,
    pub total_files_failed: usize,
    pub epub_source: String,
    pub raw_output_directory: String,
    pub cleaned_output_directory: String,
}

#[derive(Debug, Serialize)]
pub struct SpineRecord {
    pub index: usize,
    pub file_name: String,
    pub linear: bool,
}

#[derive(Debug, Serialize)]
pub struct ExtractedRecord {
    pub index: usize,
    pub original_name: String,
    pub output_name: String,
    pub raw_size_bytes: usize,
    pub cleaned_size_bytes: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keep_reason: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SkippedRecord {
    pub index: usize,
    pub file_name: String,
    pub skip_reason: String,
}

#[derive(Debug, Serialize)]
pub struct FailedRecord {
    pub index: usize,
    pub file_name: String,
    pub error: String,
}

/// Output file name for one kept document: `chapter_007_intro.html`.
pub fn output_file_name(order_index: usize, original_name: &str) -> String {
    let stem = Path::new(original_name)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "page".to_string());
    format!("chapter_{order_index:03}_{stem}.html")
}

impl ExtractionReport {
    pub fn new(
        metadata: Metadata,
        toc: Vec<TocEntry>,
        documents: &[Document],
        manifest: &RunManifest,
        epub_source: &str,
        raw_dir: &Path,
        cleaned_dir: &Path,
    ) -> Self {
        let spine = documents
            .iter()
            .map(|d| SpineRecord {
                index: d.order_index,
                file_name: d.file_name.clone(),
                linear: d.is_linear,
            })
            .collect();

        let extracted_files = manifest
            .kept
            .iter()
            .map(|p| ExtractedRecord {
                index: p.order_index,
                original_name: p.file_name.clone(),
                output_name: output_file_name(p.order_index, &p.file_name),
                raw_size_bytes: p.raw_size,
                cleaned_size_bytes: p.sanitized_size,
                keep_reason: p.reason.clone(),
            })
            .collect();

        let skipped_files = manifest
            .skipped
            .iter()
            .map(|p| SkippedRecord {
                index: p.order_index,
                file_name: p.file_name.clone(),
                skip_reason: p.reason.clone(),
            })
            .collect();

        let failed_files = manifest
            .failed
            .iter()
            .map(|p| FailedRecord {
                index: p.order_index,
                file_name: p.file_name.clone(),
                error: p.error.clone(),
            })
            .collect();

        Self {
            extraction_summary: Summary {
                total_files_extracted: manifest.kept.len(),
                total_files_skipped: manifest.skipped.len(),
                total_files_failed: manifest.failed.len(),
                epub_source: epub_source.to_string(),
                raw_output_directory: raw_dir.display().to_string(),
                cleaned_output_directory: cleaned_dir.display().to_string(),
            },
            metadata,
            spine,
            toc,
            extracted_files,
            skipped_files,
            failed_files,
        }
    }

    /// Write the report as pretty JSON.
    pub fn write(&self, path: &Path) -> Result<PathBuf> {
        let json = serde_json::to_string_pretty(self).expect("report serialization");
        fs::write(path, json)?;
        Ok(path.to_path_buf())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::{KeptPage, SkippedPage};

    #[test]
    fn test_output_file_name() {
        assert_eq!(
            output_file_name(3, "Text/chapter_three.xhtml"),
            "chapter_003_chapter_three.html"
        );
        assert_eq!(output_file_name(0, "cover.xhtml"), "chapter_000_cover.html");
    }

    #[test]
    fn test_report_roundtrip() {
        let documents = vec![
            Document::new(0, "a.xhtml", "<html/>"),
            Document::new(1, "b.xhtml", "<html/>").non_linear(),
        ];
        let manifest = RunManifest {
            kept: vec![KeptPage {
                order_index: 0,
                file_name: "a.xhtml".into(),
                raw_markup: "<html/>".into(),
                sanitized_markup: "<html/>".into(),
                raw_size: 7,
                sanitized_size: 7,
                reason: None,
            }],
            skipped: vec![SkippedPage {
                order_index: 1,
                file_name: "b.xhtml".into(),
                reason: "filename keyword: b".into(),
            }],
            failed: vec![],
        };

        let report = ExtractionReport::new(
            Metadata::new("Test Book"),
            vec![],
            &documents,
            &manifest,
            "test.epub",
            Path::new("out/raw_html"),
            Path::new("out/cleaned_html"),
        );

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("extraction_report.json");
        report.write(&path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["extraction_summary"]["total_files_extracted"], 1);
        assert_eq!(value["spine"][1]["linear"], false);
        assert_eq!(
            value["extracted_files"][0]["output_name"],
            "chapter_000_a.html"
        );
        assert_eq!(value["skipped_files"][0]["skip_reason"], "filename keyword: b");
    }
}
