//! Page-level noise classification.
//!
//! Decides whether a whole content document is noise (copyright pages,
//! advertising, blank filler) or real reading content. Evaluation order is
//! fixed and first match wins:
//!
//! 1. File name keyword
//! 2. Heading/title keyword
//! 3. Blank-page test, with a front-cover override
//!
//! Classification is a pure function of (document, tree, rules): it never
//! mutates the tree and repeated calls yield identical verdicts.

mod cover;

pub use cover::is_cover;

use crate::book::Document;
use crate::dom::PageTree;
use crate::rules::RuleSet;

/// The keep/drop decision for one document, with an audit-trail reason.
///
/// `reason` is present iff the page is noise, or iff the blank-page verdict
/// was explicitly cleared by the cover override. It exists purely for audit
/// trails and is never parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassificationVerdict {
    pub is_noise: bool,
    pub reason: Option<String>,
}

impl ClassificationVerdict {
    fn noise(reason: String) -> Self {
        Self {
            is_noise: true,
            reason: Some(reason),
        }
    }

    fn keep() -> Self {
        Self {
            is_noise: false,
            reason: None,
        }
    }

    fn keep_with_reason(reason: String) -> Self {
        Self {
            is_noise: false,
            reason: Some(reason),
        }
    }
}

const HEADING_TAGS: &[&str] = &["h1", "h2", "h3", "h4", "h5", "h6"];

/// Classify one document against the rule set.
pub fn classify(document: &Document, tree: &PageTree, rules: &RuleSet) -> ClassificationVerdict {
    classify_with(document, tree, rules, true)
}

/// Classify with the cover override toggleable (`keep_cover = false` drops
/// blank cover pages along with other blank pages).
pub fn classify_with(
    document: &Document,
    tree: &PageTree,
    rules: &RuleSet,
    keep_cover: bool,
) -> ClassificationVerdict {
    // 1. File name match
    if let Some(keyword) = rules.matching_filename_keyword(&document.file_name) {
        return ClassificationVerdict::noise(format!("filename keyword: {keyword}"));
    }

    // 2. Heading/title match
    let title_bearing =
        tree.elements_where(|tag| tag == "title" || HEADING_TAGS.contains(&tag));
    for id in title_bearing {
        let text = tree.visible_text(id);
        if text.is_empty() {
            continue;
        }
        if let Some(keyword) = rules.matching_title_keyword(&text) {
            return ClassificationVerdict::noise(format!("title keyword: {keyword}"));
        }
    }

    // 3. Blank-page test
    let text_len = tree.visible_text(tree.document()).chars().count();
    let tag_count = tree
        .descendants(tree.document())
        .filter(|&id| {
            tree.element_name(id)
                .is_some_and(|name| rules.is_meaningful_tag(name.as_ref()))
        })
        .count();

    if text_len < rules.min_text_length && tag_count < rules.min_meaningful_tag_count {
        if keep_cover && is_cover(tree, &document.file_name, rules) {
            return ClassificationVerdict::keep_with_reason(
                "cover page overrides blank verdict".to_string(),
            );
        }
        return ClassificationVerdict::noise(format!(
            "blank page (text_len={text_len}, tags={tag_count})"
        ));
    }

    ClassificationVerdict::keep()
}
