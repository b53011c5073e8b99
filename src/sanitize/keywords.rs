//! Pass 4: keyword-bearing paragraph removal.
//!
//! Drops paragraphs and headings whose text marks them as residual noise
//! inside an otherwise-kept page: noise title keywords, copyright/legal
//! boilerplate, and table-of-contents labels.

use crate::dom::PageTree;
use crate::rules::RuleSet;

use super::pass::{PARAGRAPH_LIKE, is_attached, is_heading};

/// Copyright/legal markers. Imprint names cover the publishers whose
/// boilerplate shows up most in commercial EPUBs.
const LEGAL_MARKERS: &[&str] = &["copyright", "版权", "isbn", "penguin", "viking", "imprint"];

/// Exact labels (case-insensitive) that mark a standalone TOC heading.
const TOC_LABELS: &[&str] = &["contents", "目录", "table of contents"];

/// Remove paragraph-like and heading elements carrying noise text.
///
/// Per element, the first matching condition removes it and no further
/// conditions are checked: title keyword, then legal marker, then TOC label
/// (exact match, or a heading containing "contents").
pub fn remove_noise_paragraphs(tree: &mut PageTree, rules: &RuleSet) {
    let candidates = tree.elements_where(|tag| PARAGRAPH_LIKE.contains(&tag));

    for id in candidates {
        if !is_attached(tree, id) {
            continue;
        }

        let text = tree.visible_text(id);
        if text.is_empty() {
            continue;
        }
        let lowered = text.to_lowercase();

        if rules.matching_title_keyword(&text).is_some() {
            tree.detach(id);
            continue;
        }

        if LEGAL_MARKERS.iter().any(|marker| lowered.contains(marker)) {
            tree.detach(id);
            continue;
        }

        let heading = tree
            .element_name(id)
            .is_some_and(|name| is_heading(name.as_ref()));
        if TOC_LABELS.contains(&lowered.as_str()) || (heading && lowered.contains("contents")) {
            tree.detach(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::serialize_tree;

    fn rules() -> RuleSet {
        RuleSet::default().validated().unwrap()
    }

    #[test]
    fn test_removes_copyright_paragraph() {
        let mut tree = PageTree::parse(
            "<body><p>Copyright 2021 by Example House. All rights reserved.</p>\
             <p>Chapter text continues here.</p></body>",
        );
        remove_noise_paragraphs(&mut tree, &rules());
        let output = serialize_tree(&tree);
        assert!(!output.contains("All rights reserved"));
        assert!(output.contains("Chapter text continues here."));
    }

    #[test]
    fn test_removes_isbn_line() {
        let mut tree =
            PageTree::parse("<body><p>ISBN 978-0-00-000000-0</p><p>Story.</p></body>");
        remove_noise_paragraphs(&mut tree, &rules());
        let output = serialize_tree(&tree);
        assert!(!output.contains("ISBN"));
        assert!(output.contains("Story."));
    }

    #[test]
    fn test_removes_cjk_copyright() {
        let mut tree = PageTree::parse("<body><p>版权所有，翻印必究</p><p>正文内容</p></body>");
        remove_noise_paragraphs(&mut tree, &rules());
        let output = serialize_tree(&tree);
        assert!(!output.contains("版权"));
        assert!(output.contains("正文内容"));
    }

    #[test]
    fn test_removes_contents_heading() {
        let mut tree = PageTree::parse(
            "<body><h2>Contents of this volume</h2><p>Prose that merely mentions \
             the contents of a drawer stays.</p></body>",
        );
        remove_noise_paragraphs(&mut tree, &rules());
        let output = serialize_tree(&tree);
        assert!(!output.contains("Contents of this volume"));
        // Non-heading prose mentioning "contents" is not an exact label match
        assert!(output.contains("drawer"));
    }

    #[test]
    fn test_removes_exact_toc_label_paragraph() {
        let mut tree = PageTree::parse("<body><p>Table of Contents</p><p>Real text.</p></body>");
        remove_noise_paragraphs(&mut tree, &rules());
        let output = serialize_tree(&tree);
        assert!(!output.contains("Table of Contents"));
        assert!(output.contains("Real text."));
    }

    #[test]
    fn test_only_first_condition_applies() {
        // Matches both a title keyword and a legal marker; removed once,
        // second run finds nothing new
        let mut tree = PageTree::parse("<body><p>Copyright page</p><p>Keep.</p></body>");
        remove_noise_paragraphs(&mut tree, &rules());
        let after_first = serialize_tree(&tree);
        remove_noise_paragraphs(&mut tree, &rules());
        assert_eq!(serialize_tree(&tree), after_first);
    }
}
