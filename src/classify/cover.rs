//! Front-cover page detection.
//!
//! Called only from the blank-page branch of the classifier: a page with
//! almost no text and almost no markup is usually filler, unless it is the
//! front cover, which is worth keeping despite being "blank".

use crate::dom::PageTree;
use crate::rules::{CoverTag, RuleSet};

/// Whether the page looks like a front-cover image page.
///
/// True if the file name carries a cover indicator, or if any image-bearing
/// element (`img`/`svg`/`image`) has a cover class token or a cover id
/// fragment. Pure predicate, no side effects.
pub fn is_cover(tree: &PageTree, file_name: &str, rules: &RuleSet) -> bool {
    let lowered_name = file_name.to_lowercase();
    if rules
        .cover
        .filenames
        .iter()
        .any(|kw| lowered_name.contains(kw.as_str()))
    {
        return true;
    }

    for id in tree.descendants(tree.document()) {
        let Some(name) = tree.element_name(id) else {
            continue;
        };
        if CoverTag::from_tag(name.as_ref()).is_none() {
            continue;
        }

        let has_cover_class = tree.element_classes(id).iter().any(|class| {
            let class = class.to_lowercase();
            rules.cover.classes.iter().any(|ind| ind == &class)
        });
        if has_cover_class {
            return true;
        }

        if let Some(elem_id) = tree.element_id(id) {
            let elem_id = elem_id.to_lowercase();
            if rules.cover.ids.iter().any(|ind| elem_id.contains(ind.as_str())) {
                return true;
            }
        }
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules() -> RuleSet {
        RuleSet::default().validated().unwrap()
    }

    #[test]
    fn test_cover_by_filename() {
        let tree = PageTree::parse("<html><body></body></html>");
        assert!(is_cover(&tree, "Images/Cover.xhtml", &rules()));
        assert!(is_cover(&tree, "front01.xhtml", &rules()));
        assert!(!is_cover(&tree, "chapter01.xhtml", &rules()));
    }

    #[test]
    fn test_cover_by_class() {
        let tree = PageTree::parse(r#"<body><img class="book-cover" src="c.jpg"/></body>"#);
        assert!(is_cover(&tree, "page.xhtml", &rules()));
    }

    #[test]
    fn test_cover_by_id_fragment() {
        let tree = PageTree::parse(r#"<body><img id="epub-cover-image" src="c.jpg"/></body>"#);
        assert!(is_cover(&tree, "page.xhtml", &rules()));
    }

    #[test]
    fn test_cover_class_on_non_image_tag_ignored() {
        let tree = PageTree::parse(r#"<body><div class="cover">text</div></body>"#);
        assert!(!is_cover(&tree, "page.xhtml", &rules()));
    }

    #[test]
    fn test_svg_image_counts() {
        let tree = PageTree::parse(r#"<body><svg class="cover"></svg></body>"#);
        assert!(is_cover(&tree, "page.xhtml", &rules()));
    }
}
