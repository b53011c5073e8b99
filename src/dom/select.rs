//! selectors crate Element implementation for [`PageTree`].
//!
//! This enables CSS selector matching against the page tree, which is how
//! the sanitizer's selector blacklist pass finds advertising blocks.
//!
//! Only static structure matching is supported: pseudo-classes and
//! pseudo-elements are uninhabited here, so a rule like `.ad:hover` fails
//! to parse and is reported as an invalid selector rather than silently
//! matching nothing.

use std::fmt;

use cssparser::{Parser as CssParser, ParserInput};
use html5ever::{LocalName, Namespace};
use selectors::attr::{AttrSelectorOperation, CaseSensitivity, NamespaceConstraint};
use selectors::context::{MatchingContext, SelectorCaches};
use selectors::matching::ElementSelectorFlags;
use selectors::parser::{Selector, SelectorParseErrorKind};
use selectors::{OpaqueElement, SelectorImpl};

use super::{NodeData, NodeId, PageTree};

/// Our selector implementation for the selectors crate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiftSelectors;

/// Identifier string type.
#[derive(Debug, Clone, PartialEq, Eq, Default, Hash)]
pub struct IdentStr(pub String);

impl precomputed_hash::PrecomputedHash for IdentStr {
    fn precomputed_hash(&self) -> u32 {
        let mut h: u32 = 0;
        for byte in self.0.bytes() {
            h = h.wrapping_mul(31).wrapping_add(byte as u32);
        }
        h
    }
}

impl AsRef<str> for IdentStr {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<String> for IdentStr {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl<'a> From<&'a str> for IdentStr {
    fn from(s: &'a str) -> Self {
        Self(s.to_string())
    }
}

impl cssparser::ToCss for IdentStr {
    fn to_css<W: fmt::Write>(&self, dest: &mut W) -> fmt::Result {
        dest.write_str(&self.0)
    }
}

/// Wrapper type for LocalName that implements ToCss.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CssLocalName(pub LocalName);

impl precomputed_hash::PrecomputedHash for CssLocalName {
    fn precomputed_hash(&self) -> u32 {
        self.0.precomputed_hash()
    }
}

impl cssparser::ToCss for CssLocalName {
    fn to_css<W: fmt::Write>(&self, dest: &mut W) -> fmt::Result {
        dest.write_str(self.0.as_ref())
    }
}

impl From<String> for CssLocalName {
    fn from(s: String) -> Self {
        Self(LocalName::from(s))
    }
}

impl<'a> From<&'a str> for CssLocalName {
    fn from(s: &'a str) -> Self {
        Self(LocalName::from(s))
    }
}

impl AsRef<str> for CssLocalName {
    fn as_ref(&self) -> &str {
        self.0.as_ref()
    }
}

/// Wrapper type for Namespace that implements ToCss.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct CssNamespace(pub Namespace);

impl precomputed_hash::PrecomputedHash for CssNamespace {
    fn precomputed_hash(&self) -> u32 {
        self.0.precomputed_hash()
    }
}

impl cssparser::ToCss for CssNamespace {
    fn to_css<W: fmt::Write>(&self, dest: &mut W) -> fmt::Result {
        dest.write_str(self.0.as_ref())
    }
}

impl From<String> for CssNamespace {
    fn from(s: String) -> Self {
        Self(Namespace::from(s))
    }
}

impl<'a> From<&'a str> for CssNamespace {
    fn from(s: &'a str) -> Self {
        Self(Namespace::from(s))
    }
}

/// Pseudo-element type. Uninhabited: noise rules never target pseudo-elements.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PseudoElement {}

impl cssparser::ToCss for PseudoElement {
    fn to_css<W: fmt::Write>(&self, _dest: &mut W) -> fmt::Result {
        match *self {}
    }
}

impl selectors::parser::PseudoElement for PseudoElement {
    type Impl = SiftSelectors;

    fn accepts_state_pseudo_classes(&self) -> bool {
        match *self {}
    }

    fn valid_after_slotted(&self) -> bool {
        match *self {}
    }
}

/// Non-tree-structural pseudo-class type. Uninhabited: state pseudo-classes
/// have no meaning against static markup.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NonTSPseudoClass {}

impl selectors::parser::NonTSPseudoClass for NonTSPseudoClass {
    type Impl = SiftSelectors;

    fn is_active_or_hover(&self) -> bool {
        match *self {}
    }

    fn is_user_action_state(&self) -> bool {
        match *self {}
    }
}

impl cssparser::ToCss for NonTSPseudoClass {
    fn to_css<W: fmt::Write>(&self, _dest: &mut W) -> fmt::Result {
        match *self {}
    }
}

impl<'i> selectors::parser::Parser<'i> for SiftSelectors {
    type Impl = SiftSelectors;
    type Error = SelectorParseErrorKind<'i>;
}

impl SelectorImpl for SiftSelectors {
    type ExtraMatchingData<'a> = ();
    type AttrValue = IdentStr;
    type Identifier = IdentStr;
    type LocalName = CssLocalName;
    type NamespaceUrl = CssNamespace;
    type NamespacePrefix = IdentStr;
    type BorrowedLocalName = CssLocalName;
    type BorrowedNamespaceUrl = CssNamespace;
    type NonTSPseudoClass = NonTSPseudoClass;
    type PseudoElement = PseudoElement;
}

/// A compiled noise selector, paired with its source text for diagnostics.
#[derive(Debug, Clone)]
pub struct NoiseSelector {
    pub source: String,
    selector: Selector<SiftSelectors>,
}

impl NoiseSelector {
    /// Compile one selector from the rule set.
    ///
    /// Returns the human-readable parse failure on error; the caller turns
    /// that into a warning and skips the selector.
    pub fn compile(source: &str) -> Result<Self, String> {
        parse_selector(source).map(|selector| Self {
            source: source.to_string(),
            selector,
        })
    }
}

/// Parse a single selector string.
pub fn parse_selector(s: &str) -> Result<Selector<SiftSelectors>, String> {
    let mut parser_input = ParserInput::new(s);
    let mut parser = CssParser::new(&mut parser_input);
    Selector::parse(&SiftSelectors, &mut parser)
        .map_err(|e| format!("{:?} at '{}'", e.kind, s))
}

/// Reusable matching state for selector evaluation over one tree.
pub struct SelectorMatcher {
    caches: SelectorCaches,
}

impl Default for SelectorMatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl SelectorMatcher {
    pub fn new() -> Self {
        Self {
            caches: SelectorCaches::default(),
        }
    }

    /// Whether `id` (an element of `tree`) matches the compiled selector.
    pub fn matches(&mut self, selector: &NoiseSelector, tree: &PageTree, id: NodeId) -> bool {
        if !tree.is_element(id) {
            return false;
        }
        let elem = ElementRef::new(tree, id);
        let mut context = MatchingContext::new(
            selectors::matching::MatchingMode::Normal,
            None,
            &mut self.caches,
            selectors::context::QuirksMode::NoQuirks,
            selectors::matching::NeedsSelectorFlags::No,
            selectors::matching::MatchingForInvalidation::No,
        );
        selectors::matching::matches_selector(&selector.selector, 0, None, &elem, &mut context)
    }
}

/// Reference to an element in the page tree for selector matching.
#[derive(Clone, Copy)]
pub struct ElementRef<'a> {
    pub tree: &'a PageTree,
    pub id: NodeId,
}

impl<'a> ElementRef<'a> {
    pub fn new(tree: &'a PageTree, id: NodeId) -> Self {
        Self { tree, id }
    }
}

impl fmt::Debug for ElementRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElementRef")
            .field("id", &self.id)
            .field("name", &self.tree.element_name(self.id))
            .finish()
    }
}

impl<'a> selectors::Element for ElementRef<'a> {
    type Impl = SiftSelectors;

    fn opaque(&self) -> OpaqueElement {
        OpaqueElement::new(self)
    }

    fn parent_element(&self) -> Option<Self> {
        let node = self.tree.get(self.id)?;
        if node.parent.is_none() {
            return None;
        }
        if self.tree.is_element(node.parent) {
            Some(Self::new(self.tree, node.parent))
        } else {
            None
        }
    }

    fn parent_node_is_shadow_root(&self) -> bool {
        false
    }

    fn containing_shadow_host(&self) -> Option<Self> {
        None
    }

    fn is_pseudo_element(&self) -> bool {
        false
    }

    fn prev_sibling_element(&self) -> Option<Self> {
        let node = self.tree.get(self.id)?;
        let mut current = node.prev_sibling;
        while current.is_some() {
            if self.tree.is_element(current) {
                return Some(Self::new(self.tree, current));
            }
            current = self.tree.get(current)?.prev_sibling;
        }
        None
    }

    fn next_sibling_element(&self) -> Option<Self> {
        let node = self.tree.get(self.id)?;
        let mut current = node.next_sibling;
        while current.is_some() {
            if self.tree.is_element(current) {
                return Some(Self::new(self.tree, current));
            }
            current = self.tree.get(current)?.next_sibling;
        }
        None
    }

    fn first_element_child(&self) -> Option<Self> {
        for child in self.tree.children(self.id) {
            if self.tree.is_element(child) {
                return Some(Self::new(self.tree, child));
            }
        }
        None
    }

    fn is_html_element_in_html_document(&self) -> bool {
        true
    }

    fn has_local_name(&self, name: &CssLocalName) -> bool {
        self.tree
            .element_name(self.id)
            .is_some_and(|n| n == &name.0)
    }

    fn has_namespace(&self, ns: &CssNamespace) -> bool {
        self.tree
            .element_namespace(self.id)
            .is_some_and(|n| n == &ns.0)
    }

    fn is_same_type(&self, other: &Self) -> bool {
        let self_name = self.tree.element_name(self.id);
        let other_name = other.tree.element_name(other.id);
        self_name == other_name
    }

    fn attr_matches(
        &self,
        ns: &NamespaceConstraint<&CssNamespace>,
        local_name: &CssLocalName,
        operation: &AttrSelectorOperation<&IdentStr>,
    ) -> bool {
        let node = match self.tree.get(self.id) {
            Some(n) => n,
            None => return false,
        };

        let attrs = match &node.data {
            NodeData::Element { attrs, .. } => attrs,
            _ => return false,
        };

        for attr in attrs {
            let ns_match = match ns {
                NamespaceConstraint::Any => true,
                NamespaceConstraint::Specific(ns) => attr.name.ns == ns.0,
            };
            if !ns_match {
                continue;
            }

            if attr.name.local != local_name.0 {
                continue;
            }

            return operation.eval_str(&attr.value);
        }
        false
    }

    fn match_non_ts_pseudo_class(
        &self,
        pc: &NonTSPseudoClass,
        _context: &mut MatchingContext<'_, Self::Impl>,
    ) -> bool {
        match *pc {}
    }

    fn match_pseudo_element(
        &self,
        pe: &PseudoElement,
        _context: &mut MatchingContext<'_, Self::Impl>,
    ) -> bool {
        match *pe {}
    }

    fn is_link(&self) -> bool {
        let is_anchor = self
            .tree
            .element_name(self.id)
            .is_some_and(|n| n.as_ref() == "a");
        is_anchor && self.tree.get_attr(self.id, "href").is_some()
    }

    fn is_html_slot_element(&self) -> bool {
        false
    }

    fn has_id(&self, id: &IdentStr, case_sensitivity: CaseSensitivity) -> bool {
        let elem_id = match self.tree.element_id(self.id) {
            Some(i) => i,
            None => return false,
        };
        case_sensitivity.eq(elem_id.as_bytes(), id.0.as_bytes())
    }

    fn has_class(&self, name: &IdentStr, case_sensitivity: CaseSensitivity) -> bool {
        let classes = self.tree.element_classes(self.id);
        classes
            .iter()
            .any(|c| case_sensitivity.eq(c.as_bytes(), name.0.as_bytes()))
    }

    fn imported_part(&self, _name: &IdentStr) -> Option<IdentStr> {
        None
    }

    fn is_part(&self, _name: &IdentStr) -> bool {
        false
    }

    fn is_empty(&self) -> bool {
        for child in self.tree.children(self.id) {
            let node = match self.tree.get(child) {
                Some(n) => n,
                None => continue,
            };
            match &node.data {
                NodeData::Element { .. } => return false,
                NodeData::Text(t) if !t.trim().is_empty() => return false,
                _ => {}
            }
        }
        true
    }

    fn is_root(&self) -> bool {
        let parent = self.tree.get(self.id).map(|n| n.parent);
        if let Some(parent) = parent
            && let Some(parent_node) = self.tree.get(parent)
        {
            return matches!(parent_node.data, NodeData::Document);
        }
        false
    }

    fn apply_selector_flags(&self, _flags: ElementSelectorFlags) {}

    fn add_element_unique_hashes(&self, _filter: &mut selectors::bloom::BloomFilter) -> bool {
        false
    }

    fn has_custom_state(&self, _name: &IdentStr) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matches(tree: &PageTree, id: NodeId, selector: &str) -> bool {
        let compiled = NoiseSelector::compile(selector).unwrap();
        SelectorMatcher::new().matches(&compiled, tree, id)
    }

    #[test]
    fn test_tag_selector() {
        let tree = PageTree::parse("<div><p>Hello</p></div>");
        let p = tree.find_by_tag("p").unwrap();

        assert!(matches(&tree, p, "p"));
        assert!(!matches(&tree, p, "div"));
    }

    #[test]
    fn test_class_selector() {
        let tree = PageTree::parse(r#"<p class="intro highlight">Hello</p>"#);
        let p = tree.find_by_tag("p").unwrap();

        assert!(matches(&tree, p, ".intro"));
        assert!(matches(&tree, p, ".highlight"));
        assert!(matches(&tree, p, "p.intro"));
        assert!(!matches(&tree, p, ".missing"));
    }

    #[test]
    fn test_id_selector() {
        let tree = PageTree::parse(r#"<p id="main">Hello</p>"#);
        let p = tree.find_by_tag("p").unwrap();

        assert!(matches(&tree, p, "#main"));
        assert!(matches(&tree, p, "p#main"));
        assert!(!matches(&tree, p, "#other"));
    }

    #[test]
    fn test_attribute_selector() {
        let tree = PageTree::parse(r#"<div data-ad="1">Buy!</div>"#);
        let div = tree.find_by_tag("div").unwrap();

        assert!(matches(&tree, div, "[data-ad]"));
        assert!(!matches(&tree, div, "[data-promo]"));
    }

    #[test]
    fn test_descendant_selector() {
        let tree = PageTree::parse("<div><span><p>Hello</p></span></div>");
        let p = tree.find_by_tag("p").unwrap();

        assert!(matches(&tree, p, "div p"));
        assert!(matches(&tree, p, "span > p"));
        assert!(!matches(&tree, p, "div > p"));
    }

    #[test]
    fn test_pseudo_class_rejected() {
        assert!(NoiseSelector::compile(".ad:hover").is_err());
        assert!(NoiseSelector::compile("p::before").is_err());
        assert!(NoiseSelector::compile("[").is_err());
    }
}
