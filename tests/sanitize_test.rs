//! Sanitizer behavior through the public API.

use epubsift::{PageTree, RuleSet, Sanitizer, sanitize, serialize_tree};

fn rules() -> RuleSet {
    RuleSet::default().validated().unwrap()
}

fn sanitize_markup(markup: &str) -> String {
    let mut tree = PageTree::parse(markup);
    sanitize(&mut tree, &rules(), true);
    serialize_tree(&tree)
}

#[test]
fn test_contents_paragraph_removed_on_link_heavy_page() {
    // 12 anchors page-wide; the "Contents" label paragraph goes
    let links: String = (1..=12)
        .map(|i| format!(r#"<a href="c{i}">Ch{i}</a>"#))
        .collect();
    let markup =
        format!(r#"<html><body><p><a href="toc">Contents</a></p>{links}</body></html>"#);

    let output = sanitize_markup(&markup);
    assert!(!output.contains(">Contents<"));
    assert!(output.contains("Ch12"));
}

#[test]
fn test_index_link_paragraph_gated_by_link_count() {
    // "index" is only a TOC label for the link-count-gated pass, so it
    // survives on sparse pages and goes on link-heavy ones
    let toc_paragraph = r#"<p><a href="idx">Index</a></p>"#;

    let sparse = format!(
        r#"<html><body>{toc_paragraph}<a href="x">one</a></body></html>"#
    );
    assert!(sanitize_markup(&sparse).contains(">Index<"));

    let links: String = (1..=12)
        .map(|i| format!(r#"<a href="c{i}">Ch{i}</a>"#))
        .collect();
    let heavy = format!(r#"<html><body>{toc_paragraph}{links}</body></html>"#);
    assert!(!sanitize_markup(&heavy).contains(">Index<"));
}

#[test]
fn test_ad_div_removed_siblings_verbatim() {
    let markup = r#"<html><body><div class="ad">Buy now!</div><p>Sibling prose survives untouched.</p></body></html>"#;
    let output = sanitize_markup(markup);
    assert!(!output.contains("Buy now!"));
    assert!(output.contains("<p>Sibling prose survives untouched.</p>"));
}

#[test]
fn test_empty_paragraph_removed_image_paragraph_kept() {
    let markup = r#"<html><body><p></p><p><img src="x.png"/></p></body></html>"#;
    let output = sanitize_markup(markup);
    assert!(!output.contains("<p></p>"));
    assert!(output.contains(r#"<img src="x.png"/>"#));
}

#[test]
fn test_script_subtree_removed() {
    let markup = r#"<html><body><script src="t.js">var x = 1;</script><p>Prose paragraph that stays.</p></body></html>"#;
    let output = sanitize_markup(markup);
    assert!(!output.contains("script"));
    assert!(!output.contains("var x"));
}

#[test]
fn test_sanitize_is_idempotent_below_link_gate() {
    let markup = r#"<html><body>
        <div class="sponsor">Sponsored content</div>
        <p>Copyright 2020 Example House</p>
        <h2>Contents</h2>
        <p>Actual prose, long enough to be unambiguous content.</p>
        <p></p>
        <div>   </div>
    </body></html>"#;

    let rules = rules();
    let sanitizer = Sanitizer::new(&rules);

    let mut tree = PageTree::parse(markup);
    sanitizer.sanitize(&mut tree, true);
    let once = serialize_tree(&tree);

    let mut reparsed = PageTree::parse(&once);
    sanitizer.sanitize(&mut reparsed, true);
    let twice = serialize_tree(&reparsed);

    assert_eq!(once, twice);
    assert!(once.contains("Actual prose"));
}

#[test]
fn test_structure_preserved() {
    // The root structure survives sanitization; only noise subtrees go
    let markup = r#"<html><head><title>Ch</title></head><body>
        <div class="ads">x</div>
        <h1>Heading</h1>
        <p>Paragraph one of the chapter text.</p>
        <p>Paragraph two of the chapter text.</p>
    </body></html>"#;

    let output = sanitize_markup(markup);
    assert!(output.contains("<html"));
    assert!(output.contains("<head>"));
    assert!(output.contains("<title>Ch</title>"));
    assert!(output.contains("<h1>Heading</h1>"));
    assert_eq!(output.matches("<p>").count(), 2);
}

#[test]
fn test_custom_rules_selector() {
    let mut custom = rules();
    custom.noise_selectors.push("#promo-banner".into());

    let markup = r#"<html><body><div id="promo-banner">50% off</div><p>Keep this sentence.</p></body></html>"#;
    let mut tree = PageTree::parse(markup);
    Sanitizer::new(&custom).sanitize(&mut tree, true);
    let output = serialize_tree(&tree);

    assert!(!output.contains("50% off"));
    assert!(output.contains("Keep this sentence."));
}
