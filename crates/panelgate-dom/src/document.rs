//! Arena-backed in-memory document.
//!
//! Nodes are elements, text, encapsulated roots, or the document itself.
//! An element may host one encapsulated root; its content is reachable only
//! through `UiTree::nested_root`, never through `children`.
//!
//! Structural changes (append, remove) are recorded against every observer
//! whose root contains the changed node, including through encapsulated
//! boundaries. Style changes are not structural and are never recorded.

use std::collections::BTreeMap;

use panelgate_contracts::message::{Marker, MarkerKind};
use panelgate_core::traits::{ElementView, Mutation, ObserverId, PanelHost, UiTree};

/// Handle to a node in a [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug, Clone)]
enum NodeData {
    Document,
    Element(ElementData),
    Text(String),
    /// Root of an encapsulated subtree, owned by `host`.
    NestedRoot { host: NodeId },
}

#[derive(Debug, Clone)]
struct ElementData {
    tag: String,
    classes: Vec<String>,
    attributes: BTreeMap<String, String>,
    style: Style,
    nested: Option<NodeId>,
}

#[derive(Debug, Clone)]
struct Node {
    data: NodeData,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Inline style properties of an element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Style {
    properties: BTreeMap<String, String>,
}

impl Style {
    pub fn get(&self, property: &str) -> Option<&str> {
        self.properties.get(property).map(String::as_str)
    }

    pub fn set(&mut self, property: &str, value: &str) {
        self.properties.insert(property.to_string(), value.to_string());
    }

    pub fn remove(&mut self, property: &str) {
        self.properties.remove(property);
    }
}

struct Observer {
    id: ObserverId,
    root: NodeId,
    pending: Vec<Mutation<NodeId>>,
}

/// An in-memory document implementing [`PanelHost`].
pub struct Document {
    nodes: Vec<Node>,
    observers: Vec<Observer>,
    next_observer: u64,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                data: NodeData::Document,
                parent: None,
                children: Vec::new(),
            }],
            observers: Vec::new(),
            next_observer: 0,
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Create an element with `classes` and append it to `parent`.
    pub fn append_element(&mut self, parent: NodeId, tag: &str, classes: &[&str]) -> NodeId {
        let id = self.push(NodeData::Element(ElementData {
            tag: tag.to_ascii_lowercase(),
            classes: classes.iter().map(|c| c.to_string()).collect(),
            attributes: BTreeMap::new(),
            style: Style::default(),
            nested: None,
        }));
        self.append_child(parent, id);
        id
    }

    pub fn append_text(&mut self, parent: NodeId, text: &str) -> NodeId {
        let id = self.push(NodeData::Text(text.to_string()));
        self.append_child(parent, id);
        id
    }

    /// Give `host` an encapsulated root, or return the one it already has.
    /// Returns `None` if `host` is not an element.
    pub fn attach_nested_root(&mut self, host: NodeId) -> Option<NodeId> {
        if let Some(existing) = self.nested_root(host) {
            return Some(existing);
        }
        if !matches!(self.nodes[host.0].data, NodeData::Element(_)) {
            return None;
        }
        let root = self.push(NodeData::NestedRoot { host });
        if let NodeData::Element(el) = &mut self.nodes[host.0].data {
            el.nested = Some(root);
        }
        Some(root)
    }

    pub fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) {
        if let Some(el) = self.element_mut(node) {
            el.attributes.insert(name.to_string(), value.to_string());
        }
    }

    /// Detach `child` from `parent`. Does nothing if it is not a child.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) {
        let children = &mut self.nodes[parent.0].children;
        let Some(pos) = children.iter().position(|c| *c == child) else {
            return;
        };
        children.remove(pos);
        self.nodes[child.0].parent = None;
        self.record(Mutation {
            target: parent,
            added: Vec::new(),
            removed: vec![child],
        });
    }

    /// Detach every child of `parent` in one change.
    pub fn clear_children(&mut self, parent: NodeId) {
        let removed = std::mem::take(&mut self.nodes[parent.0].children);
        if removed.is_empty() {
            return;
        }
        for child in &removed {
            self.nodes[child.0].parent = None;
        }
        self.record(Mutation {
            target: parent,
            added: Vec::new(),
            removed,
        });
    }

    pub fn style(&self, node: NodeId) -> Option<&Style> {
        self.element(node).map(|el| &el.style)
    }

    pub fn style_mut(&mut self, node: NodeId) -> Option<&mut Style> {
        self.element_mut(node).map(|el| &mut el.style)
    }

    /// The host element of an encapsulated root.
    pub fn host_of(&self, nested_root: NodeId) -> Option<NodeId> {
        match self.nodes[nested_root.0].data {
            NodeData::NestedRoot { host } => Some(host),
            _ => None,
        }
    }

    /// True if `root` is `node` or one of its ancestors, following
    /// encapsulated roots out to their hosts.
    pub fn contains(&self, root: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(n) = current {
            if n == root {
                return true;
            }
            current = self.nodes[n.0].parent.or_else(|| self.host_of(n));
        }
        false
    }

    fn push(&mut self, data: NodeData) -> NodeId {
        self.nodes.push(Node {
            data,
            parent: None,
            children: Vec::new(),
        });
        NodeId(self.nodes.len() - 1)
    }

    fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.nodes[parent.0].children.push(child);
        self.nodes[child.0].parent = Some(parent);
        self.record(Mutation {
            target: parent,
            added: vec![child],
            removed: Vec::new(),
        });
    }

    fn record(&mut self, mutation: Mutation<NodeId>) {
        let interested: Vec<usize> = self
            .observers
            .iter()
            .enumerate()
            .filter(|(_, o)| self.contains(o.root, mutation.target))
            .map(|(i, _)| i)
            .collect();
        for i in interested {
            self.observers[i].pending.push(mutation.clone());
        }
    }

    fn element(&self, node: NodeId) -> Option<&ElementData> {
        match &self.nodes.get(node.0)?.data {
            NodeData::Element(el) => Some(el),
            _ => None,
        }
    }

    fn element_mut(&mut self, node: NodeId) -> Option<&mut ElementData> {
        match &mut self.nodes.get_mut(node.0)?.data {
            NodeData::Element(el) => Some(el),
            _ => None,
        }
    }
}

impl UiTree for Document {
    type Node = NodeId;

    fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.nodes[node.0].children.clone()
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes[node.0].parent
    }

    fn nested_root(&self, node: NodeId) -> Option<NodeId> {
        self.element(node).and_then(|el| el.nested)
    }
}

impl ElementView for Document {
    fn tag_name(&self, node: NodeId) -> Option<&str> {
        self.element(node).map(|el| el.tag.as_str())
    }

    fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.element(node)
            .map(|el| el.classes.iter().any(|c| c == class))
            .unwrap_or(false)
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        self.element(node)
            .and_then(|el| el.attributes.get(name))
            .map(String::as_str)
    }

    fn text_content(&self, node: NodeId) -> String {
        let mut out = String::new();
        let mut stack = vec![node];
        while let Some(n) = stack.pop() {
            if let NodeData::Text(text) = &self.nodes[n.0].data {
                out.push_str(text);
            }
            stack.extend(self.nodes[n.0].children.iter().rev());
        }
        out
    }
}

impl PanelHost for Document {
    fn document_root(&self) -> NodeId {
        self.root()
    }

    fn is_hidden(&self, node: NodeId) -> bool {
        self.style(node).and_then(|s| s.get("display")) == Some("none")
    }

    fn set_hidden(&mut self, node: NodeId, hidden: bool) {
        if let Some(style) = self.style_mut(node) {
            if hidden {
                style.set("display", "none");
            } else {
                style.remove("display");
            }
        }
    }

    fn is_inert(&self, node: NodeId) -> bool {
        self.style(node).and_then(|s| s.get("pointer-events")) == Some("none")
    }

    fn make_inert(&mut self, node: NodeId) {
        if let Some(style) = self.style_mut(node) {
            style.set("pointer-events", "none");
            style.set("opacity", "0.35");
        }
    }

    fn append_marker(&mut self, parent: NodeId, marker: &Marker) -> NodeId {
        let el = self.append_element(parent, "div", &["panelgate-marker"]);
        let (kind, color_property) = match marker.kind {
            MarkerKind::Badge => ("badge", "background"),
            MarkerKind::Notice => ("notice", "color"),
        };
        self.set_attribute(el, "data-marker", kind);
        if let Some(style) = self.style_mut(el) {
            style.set(color_property, &marker.color);
            style.set("margin-left", "8px");
            style.set("font-size", "11px");
            if marker.kind == MarkerKind::Badge {
                style.set("color", "#fff");
                style.set("padding", "3px 8px");
                style.set("border-radius", "4px");
            }
        }
        self.append_text(el, &marker.label);
        el
    }

    fn observe(&mut self, root: NodeId) -> ObserverId {
        let id = ObserverId(self.next_observer);
        self.next_observer += 1;
        self.observers.push(Observer {
            id,
            root,
            pending: Vec::new(),
        });
        id
    }

    fn take_mutations(&mut self, observer: ObserverId) -> Vec<Mutation<NodeId>> {
        self.observers
            .iter_mut()
            .find(|o| o.id == observer)
            .map(|o| std::mem::take(&mut o.pending))
            .unwrap_or_default()
    }
}
