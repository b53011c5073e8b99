//! Serialization of a [`PageTree`] back to markup text.

use super::{NodeData, NodeId, PageTree};

/// HTML elements with no closing tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// Serialize the whole tree to markup text.
///
/// Output is XHTML-flavored: void elements self-close, text and attribute
/// values are escaped. Detached subtrees are not emitted.
pub fn serialize_tree(tree: &PageTree) -> String {
    let mut output = String::new();
    for child in tree.children(tree.document()) {
        serialize_node(tree, child, &mut output);
    }
    output
}

fn serialize_node(tree: &PageTree, id: NodeId, output: &mut String) {
    let node = match tree.get(id) {
        Some(n) => n,
        None => return,
    };

    match &node.data {
        NodeData::Element { name, attrs, .. } => {
            let tag = name.local.as_ref();
            output.push('<');
            output.push_str(tag);

            for attr in attrs {
                output.push(' ');
                output.push_str(attr.name.local.as_ref());
                output.push_str("=\"");
                output.push_str(&escape_attr(&attr.value));
                output.push('"');
            }

            let has_children = tree.children(id).next().is_some();
            if !has_children && VOID_ELEMENTS.contains(&tag) {
                output.push_str("/>");
                return;
            }

            output.push('>');
            for child in tree.children(id) {
                serialize_node(tree, child, output);
            }
            output.push_str("</");
            output.push_str(tag);
            output.push('>');
        }
        NodeData::Text(text) => {
            output.push_str(&escape_text(text));
        }
        NodeData::Comment(text) => {
            output.push_str("<!--");
            output.push_str(text);
            output.push_str("-->");
        }
        NodeData::Doctype { name, .. } => {
            output.push_str("<!DOCTYPE ");
            output.push_str(name);
            output.push('>');
        }
        NodeData::Document => {
            for child in tree.children(id) {
                serialize_node(tree, child, output);
            }
        }
    }
}

fn escape_text(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn escape_attr(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip_basic() {
        let tree = PageTree::parse("<html><head><title>T</title></head><body><p>Hello</p></body></html>");
        let output = serialize_tree(&tree);
        assert!(output.contains("<p>Hello</p>"));
        assert!(output.contains("<title>T</title>"));
    }

    #[test]
    fn test_doctype_preserved() {
        let tree = PageTree::parse("<!DOCTYPE html><html><body></body></html>");
        let output = serialize_tree(&tree);
        assert!(output.starts_with("<!DOCTYPE html>"));
    }

    #[test]
    fn test_void_element_self_closes() {
        let tree = PageTree::parse(r#"<p><img src="x.png"></p>"#);
        let output = serialize_tree(&tree);
        assert!(output.contains(r#"<img src="x.png"/>"#));
    }

    #[test]
    fn test_text_escaped() {
        let tree = PageTree::parse("<p>a &amp; b</p>");
        let output = serialize_tree(&tree);
        assert!(output.contains("a &amp; b"));
    }

    #[test]
    fn test_detached_node_not_emitted() {
        let mut tree = PageTree::parse("<body><div class=\"ad\">Buy</div><p>Keep</p></body>");
        let div = tree.find_by_tag("div").unwrap();
        tree.detach(div);
        let output = serialize_tree(&tree);
        assert!(!output.contains("Buy"));
        assert!(output.contains("<p>Keep</p>"));
    }

    #[test]
    fn test_comment_preserved() {
        let tree = PageTree::parse("<body><!-- note --><p>x</p></body>");
        let output = serialize_tree(&tree);
        assert!(output.contains("<!-- note -->"));
    }
}
