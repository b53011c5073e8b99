//! Pass 6: empty container removal.
//!
//! "Div soup" from conversion tools leaves empty paragraphs and containers
//! behind; earlier passes empty out more. Containers whose only payload is
//! an image are kept: the image is the content.

use crate::dom::PageTree;

use super::pass::is_attached;

/// Remove every `p`/`div` with no visible text and no `img` descendant.
///
/// The predicate only looks at the subtree, so matching is independent of
/// removal order and a second run finds nothing new.
pub fn remove_empty_containers(tree: &mut PageTree) {
    let candidates = tree.elements_where(|tag| tag == "p" || tag == "div");

    for id in candidates {
        if !is_attached(tree, id) {
            continue;
        }
        if tree.visible_text(id).is_empty() && !tree.has_descendant_tag(id, "img") {
            tree.detach(id);
        }
    }
}
