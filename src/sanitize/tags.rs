//! Pass 2: tag blacklist removal.

use crate::dom::PageTree;
use crate::rules::RuleSet;

/// Remove every element whose tag is blacklisted, subtree and all.
///
/// These are script-like and embed-like tags that carry tracking or
/// advertising payloads rather than book content.
pub fn remove_noise_tags(tree: &mut PageTree, rules: &RuleSet) {
    let targets = tree.elements_where(|tag| rules.is_noise_tag(tag));
    for id in targets {
        tree.detach(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::serialize_tree;

    #[test]
    fn test_removes_script_and_iframe() {
        let mut tree = PageTree::parse(
            "<body><script>track()</script><p>Keep</p><iframe src=\"ad\"></iframe></body>",
        );
        remove_noise_tags(&mut tree, &RuleSet::default());
        let output = serialize_tree(&tree);
        assert!(!output.contains("script"));
        assert!(!output.contains("iframe"));
        assert!(output.contains("<p>Keep</p>"));
    }
}
