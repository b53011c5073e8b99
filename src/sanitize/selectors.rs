//! Pass 3: CSS selector blacklist removal.

use crate::dom::{NoiseSelector, PageTree, SelectorMatcher};

use super::pass::is_attached;

/// Remove every element matched by any compiled noise selector.
pub fn remove_selector_matches(tree: &mut PageTree, selectors: &[NoiseSelector]) {
    let mut matcher = SelectorMatcher::new();

    for selector in selectors {
        let matches: Vec<_> = tree
            .descendants(tree.document())
            .filter(|&id| matcher.matches(selector, tree, id))
            .collect();

        for id in matches {
            if is_attached(tree, id) {
                log::debug!("removing element matching '{}'", selector.source);
                tree.detach(id);
            }
        }
    }
}
