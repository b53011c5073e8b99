//! Extraction pipeline: classify, sanitize, and record every document in
//! reading order.
//!
//! The pipeline is single-threaded and synchronous; classification and
//! sanitization are pure per-document functions, so the only ordering that
//! matters is the manifest's, which always follows ascending `order_index`.
//! A single document's failure is recorded and the run continues.
//!
//! Progress and diagnostics are emitted as severity-tagged events to a
//! caller-supplied sink rather than through a global logger, so embedders
//! decide what to surface.

use crate::book::Document;
use crate::classify::classify_with;
use crate::dom::{PageTree, serialize_tree};
use crate::error::{Error, Result};
use crate::rules::RuleSet;
use crate::sanitize::Sanitizer;

/// Event severity, lowest to highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Debug,
    Info,
    Warn,
    Error,
}

/// One pipeline event for the audit trail.
#[derive(Debug, Clone)]
pub struct PipelineEvent {
    pub severity: Severity,
    pub message: String,
}

/// Caller-supplied consumer of pipeline events.
pub trait EventSink {
    fn emit(&mut self, event: PipelineEvent);
}

/// Sink that discards every event.
#[derive(Debug, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&mut self, _event: PipelineEvent) {}
}

/// Sink that collects events in memory (useful for tests and embedders).
#[derive(Debug, Default)]
pub struct VecSink {
    pub events: Vec<PipelineEvent>,
}

impl EventSink for VecSink {
    fn emit(&mut self, event: PipelineEvent) {
        self.events.push(event);
    }
}

/// Pipeline behavior toggles. Defaults mirror the tool's historical
/// behavior: filter noise, keep covers, preserve comments.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// When false, classification is bypassed and every parseable page is kept.
    pub skip_noise_pages: bool,
    /// When false, blank cover pages are dropped like any other blank page.
    pub keep_cover: bool,
    /// When false, comment nodes are stripped during sanitization.
    pub preserve_comments: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            skip_noise_pages: true,
            keep_cover: true,
            preserve_comments: true,
        }
    }
}

/// A document that survived classification, with both markup versions.
#[derive(Debug, Clone)]
pub struct KeptPage {
    pub order_index: usize,
    pub file_name: String,
    pub raw_markup: String,
    pub sanitized_markup: String,
    /// Byte length of `raw_markup`.
    pub raw_size: usize,
    /// Byte length of `sanitized_markup`.
    pub sanitized_size: usize,
    /// Present when classification kept the page for an explicit reason
    /// (the cover override).
    pub reason: Option<String>,
}

/// A document classified as noise.
#[derive(Debug, Clone)]
pub struct SkippedPage {
    pub order_index: usize,
    pub file_name: String,
    pub reason: String,
}

/// A document whose extraction failed.
#[derive(Debug, Clone)]
pub struct FailedPage {
    pub order_index: usize,
    pub file_name: String,
    pub error: String,
}

/// The ordered kept/skipped/failed summary produced per run.
#[derive(Debug, Clone, Default)]
pub struct RunManifest {
    pub kept: Vec<KeptPage>,
    pub skipped: Vec<SkippedPage>,
    pub failed: Vec<FailedPage>,
}

impl RunManifest {
    pub fn total(&self) -> usize {
        self.kept.len() + self.skipped.len() + self.failed.len()
    }
}

/// Run the pipeline over all documents, in ascending `order_index`.
pub fn run(
    documents: &[Document],
    rules: &RuleSet,
    options: &PipelineOptions,
    sink: &mut dyn EventSink,
) -> RunManifest {
    let sanitizer = Sanitizer::new(rules);
    for warning in sanitizer.warnings() {
        sink.emit(PipelineEvent {
            severity: Severity::Warn,
            message: warning.clone(),
        });
    }

    let mut order: Vec<usize> = (0..documents.len()).collect();
    order.sort_by_key(|&i| documents[i].order_index);

    let mut manifest = RunManifest::default();

    for i in order {
        let document = &documents[i];
        match process_document(document, rules, options, &sanitizer) {
            Ok(Outcome::Kept(page)) => {
                sink.emit(PipelineEvent {
                    severity: Severity::Info,
                    message: format!(
                        "extracted {} ({} -> {} bytes)",
                        page.file_name, page.raw_size, page.sanitized_size
                    ),
                });
                manifest.kept.push(page);
            }
            Ok(Outcome::Skipped(page)) => {
                sink.emit(PipelineEvent {
                    severity: Severity::Info,
                    message: format!("skipping {}: {}", page.file_name, page.reason),
                });
                manifest.skipped.push(page);
            }
            Err(err) => {
                sink.emit(PipelineEvent {
                    severity: Severity::Error,
                    message: format!("failed to extract {}: {err}", document.file_name),
                });
                manifest.failed.push(FailedPage {
                    order_index: document.order_index,
                    file_name: document.file_name.clone(),
                    error: err.to_string(),
                });
            }
        }
    }

    sink.emit(PipelineEvent {
        severity: Severity::Info,
        message: format!(
            "done: {} kept, {} skipped, {} failed",
            manifest.kept.len(),
            manifest.skipped.len(),
            manifest.failed.len()
        ),
    });

    manifest
}

enum Outcome {
    Kept(KeptPage),
    Skipped(SkippedPage),
}

fn process_document(
    document: &Document,
    rules: &RuleSet,
    options: &PipelineOptions,
    sanitizer: &Sanitizer<'_>,
) -> Result<Outcome> {
    let mut tree = PageTree::parse(&document.raw_markup);
    // html5ever recovers from almost anything; a parse that produced no html
    // element at all means the content wasn't a page
    if !tree.has_element("html") {
        return Err(Error::MalformedMarkup(document.file_name.clone()));
    }

    let mut keep_reason = None;
    if options.skip_noise_pages {
        let verdict = classify_with(document, &tree, rules, options.keep_cover);
        if verdict.is_noise {
            return Ok(Outcome::Skipped(SkippedPage {
                order_index: document.order_index,
                file_name: document.file_name.clone(),
                reason: verdict.reason.unwrap_or_default(),
            }));
        }
        keep_reason = verdict.reason;
    }

    sanitizer.sanitize(&mut tree, options.preserve_comments);
    let sanitized_markup = serialize_tree(&tree);

    Ok(Outcome::Kept(KeptPage {
        order_index: document.order_index,
        file_name: document.file_name.clone(),
        raw_size: document.raw_markup.len(),
        sanitized_size: sanitized_markup.len(),
        raw_markup: document.raw_markup.clone(),
        sanitized_markup,
        reason: keep_reason,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules() -> RuleSet {
        RuleSet::default().validated().unwrap()
    }

    fn chapter(order_index: usize, name: &str, body: &str) -> Document {
        Document::new(
            order_index,
            name,
            format!("<html><head><title>Ch</title></head><body>{body}</body></html>"),
        )
    }

    const PROSE: &str = "<h1>Chapter</h1><p>A long paragraph of narrative prose that \
        easily clears the blank-page threshold for visible characters.</p>";

    #[test]
    fn test_kept_and_skipped_split() {
        let documents = vec![
            chapter(0, "Copyright_Page.xhtml", PROSE),
            chapter(1, "chapter01.xhtml", PROSE),
            chapter(2, "blank.xhtml", ""),
        ];

        let manifest = run(
            &documents,
            &rules(),
            &PipelineOptions::default(),
            &mut NullSink,
        );

        assert_eq!(manifest.kept.len(), 1);
        assert_eq!(manifest.kept[0].file_name, "chapter01.xhtml");
        assert_eq!(manifest.skipped.len(), 2);
        assert!(manifest.skipped[0].reason.contains("filename keyword"));
        assert!(manifest.skipped[1].reason.contains("blank page"));
        assert_eq!(manifest.failed.len(), 0);
    }

    #[test]
    fn test_manifest_preserves_spine_order() {
        // Documents arrive shuffled; the manifest must follow order_index
        let documents = vec![
            chapter(2, "c3.xhtml", PROSE),
            chapter(0, "c1.xhtml", PROSE),
            chapter(1, "c2.xhtml", PROSE),
        ];

        let manifest = run(
            &documents,
            &rules(),
            &PipelineOptions::default(),
            &mut NullSink,
        );

        let order: Vec<usize> = manifest.kept.iter().map(|p| p.order_index).collect();
        assert_eq!(order, vec![0, 1, 2]);
    }

    #[test]
    fn test_skip_noise_pages_disabled_keeps_everything() {
        let documents = vec![
            chapter(0, "Copyright_Page.xhtml", PROSE),
            chapter(1, "chapter01.xhtml", PROSE),
        ];

        let options = PipelineOptions {
            skip_noise_pages: false,
            ..Default::default()
        };
        let manifest = run(&documents, &rules(), &options, &mut NullSink);

        assert_eq!(manifest.kept.len(), 2);
        assert_eq!(manifest.skipped.len(), 0);
    }

    #[test]
    fn test_sanitized_output_recorded_with_sizes() {
        let documents = vec![chapter(
            0,
            "chapter01.xhtml",
            r#"<div class="ad">Buy!</div><p>The actual story text, long enough to keep this page.</p>"#,
        )];

        let manifest = run(
            &documents,
            &rules(),
            &PipelineOptions::default(),
            &mut NullSink,
        );

        let page = &manifest.kept[0];
        assert!(page.raw_markup.contains("Buy!"));
        assert!(!page.sanitized_markup.contains("Buy!"));
        assert_eq!(page.raw_size, page.raw_markup.len());
        assert_eq!(page.sanitized_size, page.sanitized_markup.len());
        assert!(page.sanitized_size < page.raw_size);
    }

    #[test]
    fn test_events_emitted() {
        let documents = vec![chapter(0, "chapter01.xhtml", PROSE)];
        let mut sink = VecSink::default();
        run(&documents, &rules(), &PipelineOptions::default(), &mut sink);

        assert!(
            sink.events
                .iter()
                .any(|e| e.severity == Severity::Info && e.message.starts_with("extracted"))
        );
        assert!(
            sink.events
                .iter()
                .any(|e| e.message.starts_with("done: 1 kept"))
        );
    }

    #[test]
    fn test_invalid_selector_surfaces_as_warning() {
        let mut custom = rules();
        custom.noise_selectors.push("p::after".into());

        let documents = vec![chapter(0, "chapter01.xhtml", PROSE)];
        let mut sink = VecSink::default();
        let manifest = run(&documents, &custom, &PipelineOptions::default(), &mut sink);

        assert_eq!(manifest.kept.len(), 1);
        assert!(
            sink.events
                .iter()
                .any(|e| e.severity == Severity::Warn && e.message.contains("p::after"))
        );
    }
}
