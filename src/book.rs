use serde::Serialize;

/// One reading-order content unit of the source book (roughly, one XHTML page).
///
/// Constructed by the EPUB reader from the spine; read-only to the
/// classification and sanitization core.
#[derive(Debug, Clone)]
pub struct Document {
    /// Position in the spine. Stable for the lifetime of the run.
    pub order_index: usize,
    /// Path of the content document inside the container. May contain
    /// directory segments (`Text/chapter01.xhtml`).
    pub file_name: String,
    /// Decoded markup text, exactly as stored in the container.
    pub raw_markup: String,
    /// Whether the spine marks this item as part of the linear reading order.
    pub is_linear: bool,
}

/// Book metadata (Dublin Core subset).
#[derive(Debug, Clone, Default, Serialize)]
pub struct Metadata {
    pub title: String,
    pub authors: Vec<String>,
    pub language: String,
    pub identifier: String,
    pub publisher: Option<String>,
    pub description: Option<String>,
    pub date: Option<String>,
}

/// A table of contents entry (hierarchical).
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct TocEntry {
    pub title: String,
    pub href: String,
    pub children: Vec<TocEntry>,
    /// Play order for sorting (from NCX playOrder attribute)
    pub play_order: Option<usize>,
}

impl Ord for TocEntry {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.play_order.cmp(&other.play_order)
    }
}

impl PartialOrd for TocEntry {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

/// Everything the pipeline needs from one opened EPUB: metadata, the table
/// of contents, and the spine documents in reading order.
#[derive(Debug, Clone, Default)]
pub struct Ebook {
    pub metadata: Metadata,
    pub toc: Vec<TocEntry>,
    pub documents: Vec<Document>,
}

impl Metadata {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.authors.push(author.into());
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }
}

impl TocEntry {
    pub fn new(title: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            href: href.into(),
            children: Vec::new(),
            play_order: None,
        }
    }
}

impl Document {
    pub fn new(order_index: usize, file_name: impl Into<String>, raw_markup: impl Into<String>) -> Self {
        Self {
            order_index,
            file_name: file_name.into(),
            raw_markup: raw_markup.into(),
            is_linear: true,
        }
    }

    pub fn non_linear(mut self) -> Self {
        self.is_linear = false;
        self
    }
}
