//! Block-level sanitization of kept pages.
//!
//! Removal passes run in a fixed order over the tree; later passes only see
//! what earlier passes left:
//!
//! 1. **Comments** - stripped unless preserved by configuration
//! 2. **Tag blacklist** - script-like and embed-like subtrees
//! 3. **Selector blacklist** - advertising/legal blocks by class/attr/id
//! 4. **Keyword paragraphs** - noise titles, legal boilerplate, TOC labels
//! 5. **TOC links** - link-count-gated TOC paragraph cleanup
//! 6. **Vacuum** - empty `p`/`div` containers (image-bearing ones kept)
//!
//! Passes 1-4 and 6 are idempotent: rerunning them on a cleaned tree
//! removes nothing further. Pass 5 re-evaluates its anchor-count gate
//! against the tree as it stands, but runs once per call.

mod comments;
mod keywords;
mod pass;
mod selectors;
mod tags;
mod toc_links;
mod vacuum;

use crate::dom::{NoiseSelector, PageTree};
use crate::rules::RuleSet;

/// Compiled sanitizer for one rule set.
///
/// Selector compilation happens once here; a selector that does not parse
/// is skipped with a warning and the rest proceed. A bad selector never
/// aborts a run.
pub struct Sanitizer<'r> {
    rules: &'r RuleSet,
    selectors: Vec<NoiseSelector>,
    warnings: Vec<String>,
}

impl<'r> Sanitizer<'r> {
    pub fn new(rules: &'r RuleSet) -> Self {
        let mut selectors = Vec::with_capacity(rules.noise_selectors.len());
        let mut warnings = Vec::new();

        for source in &rules.noise_selectors {
            match NoiseSelector::compile(source) {
                Ok(compiled) => selectors.push(compiled),
                Err(err) => {
                    log::warn!("skipping invalid noise selector '{source}': {err}");
                    warnings.push(format!("invalid selector '{source}': {err}"));
                }
            }
        }

        Self {
            rules,
            selectors,
            warnings,
        }
    }

    /// Warnings accumulated while compiling the rule set's selectors.
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Run all removal passes over a kept page's tree, in order.
    pub fn sanitize(&self, tree: &mut PageTree, preserve_comments: bool) {
        if !preserve_comments {
            comments::strip_comments(tree);
        }
        tags::remove_noise_tags(tree, self.rules);
        selectors::remove_selector_matches(tree, &self.selectors);
        keywords::remove_noise_paragraphs(tree, self.rules);
        toc_links::remove_toc_link_paragraphs(tree, self.rules);
        vacuum::remove_empty_containers(tree);
    }
}

/// One-shot convenience: compile the rule set and sanitize a single tree.
pub fn sanitize(tree: &mut PageTree, rules: &RuleSet, preserve_comments: bool) {
    Sanitizer::new(rules).sanitize(tree, preserve_comments);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::serialize_tree;

    fn rules() -> RuleSet {
        RuleSet::default().validated().unwrap()
    }

    #[test]
    fn test_full_pipeline() {
        let markup = r#"<html><body>
            <script>track()</script>
            <div class="advertisement">Buy the sequel!</div>
            <p>Copyright 2020 Example House</p>
            <p></p>
            <p>The story begins on a cold morning in April.</p>
        </body></html>"#;

        let mut tree = PageTree::parse(markup);
        let rules = rules();
        sanitize(&mut tree, &rules, true);
        let output = serialize_tree(&tree);

        assert!(!output.contains("track()"));
        assert!(!output.contains("Buy the sequel!"));
        assert!(!output.contains("Copyright 2020"));
        assert!(!output.contains("<p></p>"));
        assert!(output.contains("The story begins on a cold morning in April."));
    }

    #[test]
    fn test_preserve_comments_flag() {
        let markup = "<body><!-- marker --><p>Long enough paragraph text.</p></body>";

        let mut kept = PageTree::parse(markup);
        sanitize(&mut kept, &rules(), true);
        assert!(serialize_tree(&kept).contains("marker"));

        let mut stripped = PageTree::parse(markup);
        sanitize(&mut stripped, &rules(), false);
        assert!(!serialize_tree(&stripped).contains("marker"));
    }

    #[test]
    fn test_invalid_selector_is_skipped_with_warning() {
        let mut custom = rules();
        custom.noise_selectors = vec![".ad:hover".into(), ".ads".into()];

        let sanitizer = Sanitizer::new(&custom);
        assert_eq!(sanitizer.warnings().len(), 1);
        assert!(sanitizer.warnings()[0].contains(".ad:hover"));

        // The valid selector still works
        let mut tree =
            PageTree::parse(r#"<body><div class="ads">x</div><p>Prose stays.</p></body>"#);
        sanitizer.sanitize(&mut tree, true);
        let output = serialize_tree(&tree);
        assert!(!output.contains("ads"));
        assert!(output.contains("Prose stays."));
    }

    #[test]
    fn test_idempotent_below_link_gate() {
        let markup = r#"<html><body>
            <div class="ad">Sponsored</div>
            <p>Copyright 1999</p>
            <p>Real paragraph one, long enough to stay.</p>
            <p><a href="n1.xhtml">see note</a></p>
            <p></p>
        </body></html>"#;

        let rules = rules();
        let sanitizer = Sanitizer::new(&rules);

        let mut tree = PageTree::parse(markup);
        sanitizer.sanitize(&mut tree, false);
        let first = serialize_tree(&tree);

        let mut tree_again = PageTree::parse(&first);
        sanitizer.sanitize(&mut tree_again, false);
        let second = serialize_tree(&tree_again);

        assert_eq!(first, second);
    }

    #[test]
    fn test_structure_preserved_around_removals() {
        let markup = r#"<body><div class="ad">x</div><h1>Title</h1><p>Body text stays intact.</p></body>"#;
        let mut tree = PageTree::parse(markup);
        sanitize(&mut tree, &rules(), true);
        let output = serialize_tree(&tree);
        assert!(output.contains("<h1>Title</h1>"));
        assert!(output.contains("<p>Body text stays intact.</p>"));
    }
}
