//! Trait definitions for the seams between panelgate and its environment.
//!
//! - `UiTree` / `ElementView` / `PanelHost`: the host panel's UI tree,
//!   including the explicit capability to cross an encapsulated boundary
//! - `PageWindow`: the surrounding page (location, new windows, alerts,
//!   cross-context messages)
//! - `RoleDirectory`: resolves an email to a role
//! - `KeyValueStore`: the persisted store the approval workflow writes to
//!
//! Nothing in the engine touches a concrete host; everything above the
//! adapters is written against these traits.

use std::fmt::Debug;
use std::hash::Hash;

use async_trait::async_trait;
use url::Url;

use panelgate_contracts::{
    error::GateResult,
    message::{Marker, Notice, OutboundMessage},
    role::Role,
};

/// A tree of UI nodes whose subtrees may sit behind encapsulated boundaries.
///
/// Ordinary `children` never include the content of a boundary: reaching it
/// requires an explicit `nested_root` step. `parent` stays within one scope,
/// so the parent of a nested root is `None`.
pub trait UiTree {
    /// Cheap handle to a node in the tree.
    type Node: Copy + Eq + Hash + Debug;

    /// Children of `node` in document order.
    fn children(&self, node: Self::Node) -> Vec<Self::Node>;

    /// Parent of `node` within its scope.
    fn parent(&self, node: Self::Node) -> Option<Self::Node>;

    /// The root of the encapsulated subtree `node` exposes, if any.
    fn nested_root(&self, node: Self::Node) -> Option<Self::Node>;
}

/// Element-level facts a selector can test.
pub trait ElementView: UiTree {
    /// Lower-case tag name, or `None` for non-element nodes (text, roots).
    fn tag_name(&self, node: Self::Node) -> Option<&str>;

    fn has_class(&self, node: Self::Node, class: &str) -> bool;

    fn attribute(&self, node: Self::Node, name: &str) -> Option<&str>;

    /// Concatenated text of `node` and its descendants within one scope.
    fn text_content(&self, node: Self::Node) -> String;
}

/// Identifies one subscription created by [`PanelHost::observe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(pub u64);

/// One structural change: children added to or removed from `target`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mutation<N> {
    pub target: N,
    pub added: Vec<N>,
    pub removed: Vec<N>,
}

/// The mutable surface of the host panel the engine is allowed to touch.
pub trait PanelHost: ElementView {
    /// The top of the page's tree.
    fn document_root(&self) -> Self::Node;

    fn is_hidden(&self, node: Self::Node) -> bool;

    /// Remove `node` from (or restore it to) visual presence and interaction.
    fn set_hidden(&mut self, node: Self::Node, hidden: bool);

    fn is_inert(&self, node: Self::Node) -> bool;

    /// Dim `node` and block interaction with it.
    fn make_inert(&mut self, node: Self::Node);

    /// Append `marker` as the last child of `parent` and return it.
    fn append_marker(&mut self, parent: Self::Node, marker: &Marker) -> Self::Node;

    /// Start observing structural change under `root`, at any depth.
    fn observe(&mut self, root: Self::Node) -> ObserverId;

    /// Drain the batch of changes recorded for `observer` since the last call.
    fn take_mutations(&mut self, observer: ObserverId) -> Vec<Mutation<Self::Node>>;
}

/// The current page's location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub href: Url,
}

impl Location {
    pub fn new(href: Url) -> Self {
        Self { href }
    }

    /// The document path (`/a/b.html`), used as the approval key.
    pub fn path(&self) -> &str {
        self.href.path()
    }
}

/// The page hosting the panel.
pub trait PageWindow {
    fn location(&self) -> Location;

    /// Open `url` in a new window.
    fn open(&self, url: &str);

    /// Show a blocking single-button notice.
    fn alert(&self, notice: &Notice);

    /// Deliver `message` to the companion context at its target origin.
    fn post_message(&self, message: OutboundMessage);
}

/// Resolves a signed-in email to a role.
///
/// Implementations never fail: every error degrades to the least privileged
/// role. See `panelgate-directory` for the HTTP-backed implementation.
#[async_trait]
pub trait RoleDirectory: Send + Sync {
    async fn resolve_role(&self, email: &str) -> Role;
}

/// A string-keyed, string-valued persisted store.
///
/// Values are read and written wholesale; there is no partial update and no
/// transactional guarantee between a `get` and the following `set`.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> GateResult<Option<String>>;

    fn set(&self, key: &str, value: &str) -> GateResult<()>;
}
