//! # epubsift
//!
//! Extracts reading-order textual content from EPUB files, filtering out
//! noise pages and sanitizing the markup of the pages it keeps.
//!
//! Per book, the tool produces:
//!
//! - a keep/drop verdict for every spine document, with an audit reason
//!   (copyright pages, advertising, blank filler are dropped wholesale; a
//!   blank page that is actually the front cover is kept)
//! - for kept pages, a sanitized copy of the markup with advertising
//!   blocks, legal boilerplate, table-of-contents links, and empty
//!   containers removed while the document structure stays intact
//! - offset-tracked paragraph records for downstream text processing
//!
//! ## Quick Start
//!
//! ```no_run
//! use epubsift::{PipelineOptions, NullSink, RuleSet, pipeline, read_epub};
//!
//! let ebook = read_epub("book.epub").unwrap();
//! let rules = RuleSet::default().validated().unwrap();
//! let manifest = pipeline::run(
//!     &ebook.documents,
//!     &rules,
//!     &PipelineOptions::default(),
//!     &mut NullSink,
//! );
//! println!("{} kept, {} skipped", manifest.kept.len(), manifest.skipped.len());
//! ```
//!
//! ## Classifying and sanitizing a single page
//!
//! ```
//! use epubsift::{Document, PageTree, RuleSet, classify, sanitize, serialize_tree};
//!
//! let rules = RuleSet::default().validated().unwrap();
//!
//! let markup = r#"<html><body><div class="ad">Buy now!</div>
//!     <p>It was a dark and stormy night; the rain fell in torrents.</p>
//!     </body></html>"#;
//! let document = Document::new(0, "chapter01.xhtml", markup);
//!
//! let mut tree = PageTree::parse(&document.raw_markup);
//! let verdict = classify(&document, &tree, &rules);
//! assert!(!verdict.is_noise);
//!
//! sanitize(&mut tree, &rules, true);
//! let cleaned = serialize_tree(&tree);
//! assert!(!cleaned.contains("Buy now!"));
//! ```

pub mod book;
pub mod classify;
pub mod dom;
pub mod epub;
pub mod error;
pub mod pipeline;
pub mod report;
pub mod rules;
pub mod sanitize;
pub mod segment;
pub(crate) mod util;

pub use book::{Document, Ebook, Metadata, TocEntry};
pub use classify::{ClassificationVerdict, classify, classify_with, is_cover};
pub use dom::{PageTree, serialize_tree};
pub use epub::{read_epub, read_epub_from_reader};
pub use error::{Error, Result};
pub use pipeline::{EventSink, NullSink, PipelineEvent, PipelineOptions, RunManifest, Severity};
pub use report::ExtractionReport;
pub use rules::RuleSet;
pub use sanitize::{Sanitizer, sanitize};
pub use segment::{Paragraph, segment};
