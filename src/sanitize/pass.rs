//! Shared helpers for removal passes.

use crate::dom::{NodeId, PageTree};

/// Elements the paragraph-level passes look at: paragraphs, generic
/// containers, and headings.
pub const PARAGRAPH_LIKE: &[&str] = &["p", "div", "h1", "h2", "h3", "h4", "h5", "h6"];

pub fn is_heading(tag: &str) -> bool {
    matches!(tag, "h1" | "h2" | "h3" | "h4" | "h5" | "h6")
}

/// Whether a node is still reachable from the document root.
///
/// Passes collect their targets up front; an earlier removal in the same
/// pass may have detached an ancestor, in which case the node must not be
/// inspected again.
pub fn is_attached(tree: &PageTree, id: NodeId) -> bool {
    let mut current = id;
    loop {
        if current == tree.document() {
            return true;
        }
        match tree.get(current).map(|n| n.parent) {
            Some(parent) if parent.is_some() => current = parent,
            _ => return false,
        }
    }
}
