//! A simulated authoring toolbar shaped like the real host panel.
//!
//! All structure here is fictional but follows the host's nesting: the
//! panel element hosts an encapsulated root; the environment switcher and
//! the user menu each host another; the user item hosts one more holding
//! the signed-in email.
//!
//! ```text
//! aem-sidekick ─┐ (nested)
//!               ├─ div.action-bar
//!               │   ├─ span.logo
//!               │   ├─ env-switcher ─┐ (nested)
//!               │   │                ├─ sk-menu-item.env-edit
//!               │   │                ├─ sk-menu-item.env-preview
//!               │   │                └─ sk-menu-item.env-live
//!               │   ├─ sk-action-button.publish
//!               │   ├─ sp-switch
//!               │   ├─ login-button
//!               │   │   └─ button.sign-in
//!               │   └─ sk-action-menu.user-menu ─┐ (nested)
//!               │                                ├─ sk-menu-item.user ─┐ (nested)
//!               │                                │                     └─ span[slot=description]
//!               │                                └─ sk-menu-item.sign-out
//! ```

use crate::document::{Document, NodeId};

/// Tag of the panel's top-level element.
pub const PANEL_TAG: &str = "aem-sidekick";

/// Handles into a [`Document`] built by [`sample_panel`].
#[derive(Debug, Clone)]
pub struct SamplePanel {
    pub panel: NodeId,
    pub panel_root: NodeId,
    pub logo: NodeId,
    pub env_switcher_root: NodeId,
    pub sign_in_button: NodeId,
}

/// Build a document containing the sample panel.
///
/// With `Some(email)` the user item shows that email; with `None` the user
/// item shows a sign-in prompt instead.
pub fn sample_panel(email: Option<&str>) -> (Document, SamplePanel) {
    let mut doc = Document::new();
    let body = doc.append_element(doc.root(), "body", &[]);
    let panel = insert_panel(&mut doc, body, email);
    (doc, panel)
}

/// Append the sample panel under `parent` of an existing document.
pub fn insert_panel(doc: &mut Document, parent: NodeId, email: Option<&str>) -> SamplePanel {
    let panel = doc.append_element(parent, PANEL_TAG, &[]);
    let panel_root = attach(doc, panel);

    let bar = doc.append_element(panel_root, "div", &["action-bar"]);
    let logo = doc.append_element(bar, "span", &["logo"]);
    doc.append_text(logo, "Sidekick");

    let switcher = doc.append_element(bar, "env-switcher", &[]);
    let env_switcher_root = attach(doc, switcher);
    fill_env_switcher(doc, env_switcher_root);

    let publish = doc.append_element(bar, "sk-action-button", &["publish"]);
    doc.append_text(publish, "Publish");
    doc.append_element(bar, "sp-switch", &[]);

    let login = doc.append_element(bar, "login-button", &[]);
    let sign_in_button = doc.append_element(login, "button", &["sign-in"]);
    doc.append_text(sign_in_button, "Sign in");

    let menu = doc.append_element(bar, "sk-action-menu", &["user-menu"]);
    let menu_root = attach(doc, menu);
    let user = doc.append_element(menu_root, "sk-menu-item", &["user"]);
    let user_root = attach(doc, user);
    let description = doc.append_element(user_root, "span", &[]);
    doc.set_attribute(description, "slot", "description");
    doc.append_text(description, email.unwrap_or("Not signed in"));
    doc.append_element(menu_root, "sk-menu-item", &["sign-out"]);

    SamplePanel {
        panel,
        panel_root,
        logo,
        env_switcher_root,
        sign_in_button,
    }
}

/// Simulate the host re-rendering the environment switcher: its items are
/// replaced by fresh, fully visible ones.
pub fn rerender_env_switcher(doc: &mut Document, panel: &SamplePanel) -> Vec<NodeId> {
    doc.clear_children(panel.env_switcher_root);
    fill_env_switcher(doc, panel.env_switcher_root)
}

fn fill_env_switcher(doc: &mut Document, root: NodeId) -> Vec<NodeId> {
    [("env-edit", "Edit"), ("env-preview", "Preview"), ("env-live", "Live")]
        .iter()
        .map(|(class, label)| {
            let item = doc.append_element(root, "sk-menu-item", &[*class]);
            doc.append_text(item, label);
            item
        })
        .collect()
}

fn attach(doc: &mut Document, host: NodeId) -> NodeId {
    // Every host created above is an element, so this always yields a root.
    doc.attach_nested_root(host).unwrap_or(host)
}
