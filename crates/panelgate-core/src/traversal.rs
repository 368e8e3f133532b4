//! Deep traversal across encapsulated UI boundaries.
//!
//! `search` walks a tree depth-first in pre-order. At each node it runs the
//! local single-node test, then recurses into every child in document order,
//! then, if the node exposes a nested root, recurses into that root exactly
//! once. The result is every match reachable through any finite chain of
//! boundary crossings, parents before descendants.
//!
//! A predicate that fails on a node only aborts that node's local test. The
//! walk carries on, so callers get a partial (possibly empty) result instead
//! of an error.

use tracing::debug;

use panelgate_contracts::error::GateResult;

use crate::selector::Selector;
use crate::traits::{ElementView, UiTree};

/// A test applied to a single node during traversal.
pub trait Predicate<T: UiTree + ?Sized> {
    fn test(&self, tree: &T, node: T::Node) -> GateResult<bool>;
}

impl<T: ElementView + ?Sized> Predicate<T> for Selector {
    fn test(&self, tree: &T, node: T::Node) -> GateResult<bool> {
        Ok(self.matches(tree, node))
    }
}

/// Raw selector text. Parsed on every local test, so a malformed selector
/// fails each test and the search returns nothing.
impl<T: ElementView + ?Sized> Predicate<T> for str {
    fn test(&self, tree: &T, node: T::Node) -> GateResult<bool> {
        Ok(Selector::parse(self)?.matches(tree, node))
    }
}

impl<T: UiTree + ?Sized, P: Predicate<T> + ?Sized> Predicate<T> for &P {
    fn test(&self, tree: &T, node: T::Node) -> GateResult<bool> {
        (**self).test(tree, node)
    }
}

/// Adapts a closure into a [`Predicate`].
pub struct FnPredicate<F>(pub F);

impl<T, F> Predicate<T> for FnPredicate<F>
where
    T: UiTree + ?Sized,
    F: Fn(&T, T::Node) -> GateResult<bool>,
{
    fn test(&self, tree: &T, node: T::Node) -> GateResult<bool> {
        (self.0)(tree, node)
    }
}

/// Every node under `root` (inclusive) matching `predicate`, crossing nested
/// boundaries. `None` yields an empty result.
pub fn search<T, P>(tree: &T, root: Option<T::Node>, predicate: &P) -> Vec<T::Node>
where
    T: UiTree + ?Sized,
    P: Predicate<T> + ?Sized,
{
    let mut matches = Vec::new();
    if let Some(root) = root {
        walk(tree, root, predicate, true, &mut matches);
    }
    matches
}

/// The first node `search` would return.
pub fn search_first<T, P>(tree: &T, root: Option<T::Node>, predicate: &P) -> Option<T::Node>
where
    T: UiTree + ?Sized,
    P: Predicate<T> + ?Sized,
{
    search(tree, root, predicate).into_iter().next()
}

/// An ordinary single-scope query: like `search` but never crosses into a
/// nested root.
pub fn search_scope<T, P>(tree: &T, root: Option<T::Node>, predicate: &P) -> Vec<T::Node>
where
    T: UiTree + ?Sized,
    P: Predicate<T> + ?Sized,
{
    let mut matches = Vec::new();
    if let Some(root) = root {
        walk(tree, root, predicate, false, &mut matches);
    }
    matches
}

/// Nearest inclusive ancestor of `node` within its scope matching `predicate`.
pub fn closest<T, P>(tree: &T, node: T::Node, predicate: &P) -> Option<T::Node>
where
    T: UiTree + ?Sized,
    P: Predicate<T> + ?Sized,
{
    let mut current = Some(node);
    while let Some(n) = current {
        if local_test(tree, n, predicate) {
            return Some(n);
        }
        current = tree.parent(n);
    }
    None
}

fn walk<T, P>(tree: &T, node: T::Node, predicate: &P, cross: bool, out: &mut Vec<T::Node>)
where
    T: UiTree + ?Sized,
    P: Predicate<T> + ?Sized,
{
    if local_test(tree, node, predicate) {
        out.push(node);
    }
    for child in tree.children(node) {
        walk(tree, child, predicate, cross, out);
    }
    if cross {
        if let Some(nested) = tree.nested_root(node) {
            walk(tree, nested, predicate, cross, out);
        }
    }
}

fn local_test<T, P>(tree: &T, node: T::Node, predicate: &P) -> bool
where
    T: UiTree + ?Sized,
    P: Predicate<T> + ?Sized,
{
    match predicate.test(tree, node) {
        Ok(matched) => matched,
        Err(e) => {
            debug!(node = ?node, error = %e, "local query failed; continuing traversal");
            false
        }
    }
}
