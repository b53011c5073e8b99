//! Noise-filtering rule set: keyword lists, selector blacklist, thresholds.
//!
//! Defaults cover the noise found in commercial EPUBs in the wild (both
//! English and Chinese front/back matter). A JSON file can override any
//! field; the rule set is loaded once at startup, validated, and shared
//! read-only for the whole run.
//!
//! Keyword matching throughout is case-insensitive substring matching, so
//! each keyword is stored once in lowercase. Substring (not token) matching
//! means a keyword inside an unrelated word matches too; that is the
//! intended behavior, not a defect.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Tags that count toward the blank-page content threshold.
///
/// A closed enumeration so the default set is validated at compile time;
/// configurations can extend it with extra tag names via
/// [`RuleSet::extra_meaningful_tags`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MeaningfulTag {
    Paragraph,
    Division,
    Span,
    Heading1,
    Heading2,
    Heading3,
    Heading4,
    Heading5,
    Heading6,
    Article,
    Section,
    Main,
    Content,
    Blockquote,
    Preformatted,
    Code,
    UnorderedList,
    OrderedList,
    ListItem,
    DescriptionList,
    DescriptionTerm,
    DescriptionDetail,
    Table,
    TableRow,
    TableCell,
    TableHeaderCell,
    Image,
    Figure,
    FigureCaption,
}

impl MeaningfulTag {
    pub fn from_tag(tag: &str) -> Option<Self> {
        use MeaningfulTag::*;
        Some(match tag {
            "p" => Paragraph,
            "div" => Division,
            "span" => Span,
            "h1" => Heading1,
            "h2" => Heading2,
            "h3" => Heading3,
            "h4" => Heading4,
            "h5" => Heading5,
            "h6" => Heading6,
            "article" => Article,
            "section" => Section,
            "main" => Main,
            "content" => Content,
            "blockquote" => Blockquote,
            "pre" => Preformatted,
            "code" => Code,
            "ul" => UnorderedList,
            "ol" => OrderedList,
            "li" => ListItem,
            "dl" => DescriptionList,
            "dt" => DescriptionTerm,
            "dd" => DescriptionDetail,
            "table" => Table,
            "tr" => TableRow,
            "td" => TableCell,
            "th" => TableHeaderCell,
            "img" => Image,
            "figure" => Figure,
            "figcaption" => FigureCaption,
            _ => return None,
        })
    }
}

/// Tags that can carry a front-cover image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CoverTag {
    Img,
    Svg,
    Image,
}

impl CoverTag {
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "img" => Some(Self::Img),
            "svg" => Some(Self::Svg),
            "image" => Some(Self::Image),
            _ => None,
        }
    }
}

/// Class/id/filename indicators for front-cover pages.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CoverIndicators {
    /// Class attribute tokens (matched whole, case-insensitive).
    pub classes: Vec<String>,
    /// Id attribute fragments (substring, case-insensitive).
    pub ids: Vec<String>,
    /// File name fragments (substring, case-insensitive).
    pub filenames: Vec<String>,
}

impl Default for CoverIndicators {
    fn default() -> Self {
        Self {
            classes: list(&["cover", "book-cover", "front-cover"]),
            ids: list(&["cover", "book-cover", "front-cover"]),
            filenames: list(&["cover", "front"]),
        }
    }
}

/// The versioned bundle of keyword/selector/threshold configuration driving
/// classification and sanitization.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RuleSet {
    /// Noise page heading/title keywords (whole chapter skipped).
    pub title_keywords: Vec<String>,
    /// Noise page file name keywords (whole chapter skipped).
    pub filename_keywords: Vec<String>,
    /// CSS selector blacklist (block-level removal).
    pub noise_selectors: Vec<String>,
    /// Tag blacklist (block-level removal: scripts, embeds, trackers).
    pub noise_tags: Vec<String>,
    /// Extra tags counted as meaningful content beyond the built-in set.
    pub extra_meaningful_tags: Vec<String>,
    /// Front-cover indicators for the blank-page override.
    pub cover: CoverIndicators,
    /// Minimum visible characters before a page counts as non-blank.
    pub min_text_length: usize,
    /// Minimum meaningful tags before a page counts as non-blank.
    pub min_meaningful_tag_count: usize,
    /// Minimum page-wide anchor count before TOC link cleanup engages.
    /// The original hardcoded 10; no principled derivation is known, so the
    /// cutoff is configurable.
    pub min_toc_link_count: usize,
}

impl Default for RuleSet {
    fn default() -> Self {
        Self {
            title_keywords: list(&[
                // Chinese
                "版权信息",
                "版权页",
                "版权声明",
                "版权",
                "广告",
                "广告页",
                "推广",
                "推荐",
                "关于本书",
                "关于作者",
                "作者简介",
                "推荐语",
                "书评",
                "媒体推荐",
                "出版说明",
                "编辑说明",
                "译者说明",
                "封面",
                "封底",
                "书脊",
                "目录页",
                "扉页",
                // English
                "copyright",
                "advertisement",
                "about the book",
                "about the author",
                "praise for",
                "reviews",
                "publisher's note",
                "editor's note",
                "translator's note",
                "cover",
                "title page",
                "table of contents",
                "toc",
                "frontmatter",
                "backmatter",
            ]),
            filename_keywords: list(&[
                "copyright",
                "cover",
                "title",
                "toc",
                "advertisement",
                "praise",
                "about",
                "frontmatter",
                "backmatter",
                "版权",
                "广告",
                "封面",
                "目录",
            ]),
            noise_selectors: list(&[
                ".ad",
                ".advertisement",
                ".ads",
                ".promotion",
                ".promo",
                ".sponsor",
                ".sponsored",
                "[data-ad]",
                "[data-advertisement]",
                ".copyright-notice",
                ".legal-notice",
                ".publisher-info",
                ".imprint",
                ".social-media",
                ".share-buttons",
            ]),
            noise_tags: list(&["script", "noscript", "iframe", "embed", "object"]),
            extra_meaningful_tags: Vec::new(),
            cover: CoverIndicators::default(),
            min_text_length: 50,
            min_meaningful_tag_count: 2,
            min_toc_link_count: 10,
        }
    }
}

fn list(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl RuleSet {
    /// Load a rule set from a JSON file, falling back to defaults for any
    /// omitted field. Fatal on unreadable files, malformed JSON, or
    /// structurally invalid contents — nothing is processed with a broken
    /// rule set.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = fs::read_to_string(path.as_ref()).map_err(|e| {
            Error::InvalidRules(format!("cannot read {}: {e}", path.as_ref().display()))
        })?;
        let rules: RuleSet = serde_json::from_str(&text)
            .map_err(|e| Error::InvalidRules(format!("malformed JSON: {e}")))?;
        rules.validated()
    }

    /// Normalize and validate: keywords are lowercased and deduplicated,
    /// empty entries rejected (an empty substring matches everything).
    pub fn validated(mut self) -> Result<Self> {
        for (field, entries) in [
            ("title_keywords", &mut self.title_keywords),
            ("filename_keywords", &mut self.filename_keywords),
            ("noise_tags", &mut self.noise_tags),
            ("extra_meaningful_tags", &mut self.extra_meaningful_tags),
            ("cover.classes", &mut self.cover.classes),
            ("cover.ids", &mut self.cover.ids),
            ("cover.filenames", &mut self.cover.filenames),
        ] {
            normalize(entries);
            if entries.iter().any(|e| e.is_empty()) {
                return Err(Error::InvalidRules(format!("empty entry in {field}")));
            }
        }
        if self.noise_selectors.iter().any(|s| s.trim().is_empty()) {
            return Err(Error::InvalidRules("empty entry in noise_selectors".into()));
        }
        Ok(self)
    }

    /// First title keyword contained in `text`, case-insensitively.
    pub fn matching_title_keyword(&self, text: &str) -> Option<&str> {
        let lowered = text.to_lowercase();
        self.title_keywords
            .iter()
            .find(|kw| lowered.contains(kw.as_str()))
            .map(|kw| kw.as_str())
    }

    /// First filename keyword contained in `file_name`, case-insensitively.
    pub fn matching_filename_keyword(&self, file_name: &str) -> Option<&str> {
        let lowered = file_name.to_lowercase();
        self.filename_keywords
            .iter()
            .find(|kw| lowered.contains(kw.as_str()))
            .map(|kw| kw.as_str())
    }

    /// Whether a tag counts toward the blank-page content threshold.
    pub fn is_meaningful_tag(&self, tag: &str) -> bool {
        MeaningfulTag::from_tag(tag).is_some()
            || self.extra_meaningful_tags.iter().any(|t| t == tag)
    }

    /// Whether a tag is on the block-removal blacklist.
    pub fn is_noise_tag(&self, tag: &str) -> bool {
        self.noise_tags.iter().any(|t| t == tag)
    }
}

fn normalize(entries: &mut Vec<String>) {
    for entry in entries.iter_mut() {
        *entry = entry.trim().to_lowercase();
    }
    let mut seen = std::collections::HashSet::new();
    entries.retain(|e| seen.insert(e.clone()));
}
