//! # panelgate-core
//!
//! Host-agnostic building blocks of the panelgate overlay.
//!
//! This crate provides:
//! - The adapter traits (`UiTree`, `ElementView`, `PanelHost`, `PageWindow`,
//!   `RoleDirectory`, `KeyValueStore`)
//! - Deep traversal across encapsulated boundaries (`traversal::search`)
//! - The selector language used to name controls (`selector::Selector`)
//!
//! ```rust,ignore
//! use panelgate_core::traversal::search;
//!
//! let previews = search(&doc, Some(panel_root), "sk-menu-item.env-preview");
//! ```

pub mod selector;
pub mod traits;
pub mod traversal;

pub use selector::Selector;
pub use traversal::{closest, search, search_first, search_scope, Predicate};

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use panelgate_contracts::error::GateError;

    use crate::traits::{ElementView, UiTree};
    use crate::traversal::FnPredicate;
    use crate::{closest, search, search_first, search_scope, Selector};

    // ── Helpers ───────────────────────────────────────────────────────────────

    /// A minimal arena tree: every node is an element with a tag, classes and
    /// attributes, plus an optional nested root.
    #[derive(Default)]
    struct TestTree {
        nodes: Vec<TestNode>,
    }

    #[derive(Default)]
    struct TestNode {
        tag: Option<String>,
        classes: Vec<String>,
        attrs: HashMap<String, String>,
        children: Vec<usize>,
        parent: Option<usize>,
        nested: Option<usize>,
    }

    impl TestTree {
        fn root(&mut self) -> usize {
            self.nodes.push(TestNode::default());
            self.nodes.len() - 1
        }

        fn element(&mut self, parent: usize, tag: &str, classes: &[&str]) -> usize {
            let id = self.nodes.len();
            self.nodes.push(TestNode {
                tag: Some(tag.to_string()),
                classes: classes.iter().map(|c| c.to_string()).collect(),
                parent: Some(parent),
                ..TestNode::default()
            });
            self.nodes[parent].children.push(id);
            id
        }

        fn attach_nested(&mut self, host: usize) -> usize {
            let id = self.root();
            self.nodes[host].nested = Some(id);
            id
        }
    }

    impl UiTree for TestTree {
        type Node = usize;

        fn children(&self, node: usize) -> Vec<usize> {
            self.nodes[node].children.clone()
        }

        fn parent(&self, node: usize) -> Option<usize> {
            self.nodes[node].parent
        }

        fn nested_root(&self, node: usize) -> Option<usize> {
            self.nodes[node].nested
        }
    }

    impl ElementView for TestTree {
        fn tag_name(&self, node: usize) -> Option<&str> {
            self.nodes[node].tag.as_deref()
        }

        fn has_class(&self, node: usize, class: &str) -> bool {
            self.nodes[node].classes.iter().any(|c| c == class)
        }

        fn attribute(&self, node: usize, name: &str) -> Option<&str> {
            self.nodes[node].attrs.get(name).map(String::as_str)
        }

        fn text_content(&self, _node: usize) -> String {
            String::new()
        }
    }

    /// root
    /// └─ host0 (nested)
    ///    └─ item.hit  ← level 1
    ///    └─ host1 (nested)
    ///       └─ item.hit  ← level 2
    ///       └─ host2 (nested)
    ///          └─ item.hit  ← level 3
    fn three_level_tree() -> (TestTree, usize, Vec<usize>) {
        let mut tree = TestTree::default();
        let root = tree.root();
        let mut host = tree.element(root, "panel-host", &[]);
        let mut hits = Vec::new();
        for level in 0..3 {
            let nested = tree.attach_nested(host);
            hits.push(tree.element(nested, "item", &["hit"]));
            if level < 2 {
                host = tree.element(nested, "panel-host", &[]);
            }
        }
        (tree, root, hits)
    }

    // ── Deep traversal ────────────────────────────────────────────────────────

    #[test]
    fn finds_one_match_per_nested_level_in_pre_order() {
        let (tree, root, hits) = three_level_tree();
        let found = search(&tree, Some(root), "item.hit");
        assert_eq!(found, hits);
    }

    #[test]
    fn scope_query_does_not_cross_boundaries() {
        let (tree, root, _) = three_level_tree();
        assert!(search_scope(&tree, Some(root), "item.hit").is_empty());
        assert_eq!(search_scope(&tree, Some(root), "panel-host").len(), 1);
    }

    #[test]
    fn light_children_come_before_the_nested_root() {
        let mut tree = TestTree::default();
        let root = tree.root();
        let host = tree.element(root, "x-host", &[]);
        let nested = tree.attach_nested(host);
        let inner = tree.element(nested, "item", &[]);
        let light = tree.element(host, "item", &[]);
        let sibling = tree.element(root, "item", &[]);

        assert_eq!(search(&tree, Some(root), "item"), vec![light, inner, sibling]);
    }

    #[test]
    fn root_itself_is_tested() {
        let mut tree = TestTree::default();
        let root = tree.root();
        let el = tree.element(root, "item", &["hit"]);
        assert_eq!(search(&tree, Some(el), "item.hit"), vec![el]);
        assert_eq!(search_first(&tree, Some(root), "item"), Some(el));
    }

    #[test]
    fn none_root_yields_empty() {
        let tree = TestTree::default();
        assert!(search(&tree, None, "item").is_empty());
    }

    #[test]
    fn malformed_selector_yields_empty_result() {
        let (tree, root, _) = three_level_tree();
        assert!(search(&tree, Some(root), "item >> .hit").is_empty());
        assert!(search(&tree, Some(root), "[unterminated").is_empty());
    }

    #[test]
    fn failing_predicate_aborts_only_the_local_test() {
        let (tree, root, hits) = three_level_tree();
        // Fails on every `panel-host`, matches every `item`.
        let predicate = FnPredicate(|t: &TestTree, n: usize| match t.tag_name(n) {
            Some("panel-host") => Err(GateError::Selector {
                selector: "test".to_string(),
                reason: "boom".to_string(),
            }),
            Some("item") => Ok(true),
            _ => Ok(false),
        });
        assert_eq!(search(&tree, Some(root), &predicate), hits);
    }

    #[test]
    fn closest_walks_up_within_one_scope() {
        let mut tree = TestTree::default();
        let root = tree.root();
        let login = tree.element(root, "login-button", &[]);
        let button = tree.element(login, "button", &[]);
        let nested = tree.attach_nested(login);
        let inner = tree.element(nested, "button", &[]);

        assert_eq!(closest(&tree, button, "login-button"), Some(login));
        assert_eq!(closest(&tree, login, "login-button"), Some(login));
        // The nested root has no scope parent, so the host is not reached.
        assert_eq!(closest(&tree, inner, "login-button"), None);
    }

    // ── Selector ──────────────────────────────────────────────────────────────

    #[test]
    fn selector_matches_tag_classes_and_attributes() {
        let mut tree = TestTree::default();
        let root = tree.root();
        let span = tree.element(root, "span", &["a", "b"]);
        tree.nodes[span].attrs.insert("slot".to_string(), "description".to_string());

        let sel = Selector::parse(r#"span[slot="description"]"#).unwrap();
        assert!(sel.matches(&tree, span));
        assert!(Selector::parse("span.a.b").unwrap().matches(&tree, span));
        assert!(Selector::parse("SPAN[slot]").unwrap().matches(&tree, span));
        assert!(Selector::parse("*").unwrap().matches(&tree, span));
        assert!(Selector::parse("div, .b").unwrap().matches(&tree, span));
        assert!(!Selector::parse("span.c").unwrap().matches(&tree, span));
        assert!(!Selector::parse("span[slot='title']").unwrap().matches(&tree, span));
        // The root is not an element.
        assert!(!Selector::parse("*").unwrap().matches(&tree, root));
    }

    #[test]
    fn selector_rejects_unsupported_syntax() {
        for bad in ["", "a b", "a > b", "a:hover", ".", "[x", "a,", "a[x=\"y]"] {
            match Selector::parse(bad) {
                Err(GateError::Selector { selector, .. }) => assert_eq!(selector, bad),
                other => panic!("expected selector error for {bad:?}, got {other:?}"),
            }
        }
    }
}
