//! Pass 5: table-of-contents link cleanup.
//!
//! Only engages when the page carries more anchors than the configured
//! cutoff; a page with a handful of inline links is not a TOC and must not
//! lose paragraphs to this heuristic.

use crate::dom::PageTree;
use crate::rules::RuleSet;

use super::pass::is_attached;

/// Anchor-text fragments that identify a TOC link.
const TOC_LINK_LABELS: &[&str] = &["table of contents", "contents", "目录", "index"];

/// Remove paragraphs whose anchors carry TOC labels, on link-heavy pages.
///
/// The gate counts anchors across the whole page as it stands when the pass
/// runs; below the cutoff the pass is a no-op.
pub fn remove_toc_link_paragraphs(tree: &mut PageTree, rules: &RuleSet) {
    let total_links = tree.count_elements("a");
    if total_links <= rules.min_toc_link_count {
        return;
    }

    let paragraphs = tree.elements_where(|tag| tag == "p");

    for id in paragraphs {
        if !is_attached(tree, id) {
            continue;
        }

        let anchors: Vec<_> = tree
            .descendants(id)
            .filter(|&n| tree.element_name(n).is_some_and(|t| t.as_ref() == "a"))
            .collect();
        if anchors.is_empty() {
            continue;
        }

        let is_toc_paragraph = anchors.iter().any(|&anchor| {
            let text = tree.visible_text(anchor).to_lowercase();
            TOC_LINK_LABELS.iter().any(|label| text.contains(label))
        });

        if is_toc_paragraph {
            log::debug!("removing TOC link paragraph");
            tree.detach(id);
        }
    }
}
