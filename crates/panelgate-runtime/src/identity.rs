//! Reads the signed-in user's email out of the panel.

use tracing::debug;

use panelgate_core::{search_first, search_scope, traits::ElementView, Selector};

/// The email shown in the panel's user menu, or `None` if nobody is signed in.
///
/// Finds the first `user_item` anywhere under `panel_root`, crosses into
/// that item's own nested root, and reads the first `description` element
/// there. The trimmed text counts as an email only if it contains `@`.
pub fn read_user_email<H>(host: &H, panel_root: H::Node, user_item: &Selector, description: &Selector) -> Option<String>
where
    H: ElementView + ?Sized,
{
    let Some(item) = search_first(host, Some(panel_root), user_item) else {
        debug!(selector = %user_item, "no user item in panel");
        return None;
    };
    let Some(item_root) = host.nested_root(item) else {
        debug!("user item has no nested root");
        return None;
    };
    let node = search_scope(host, Some(item_root), description).into_iter().next()?;

    let text = host.text_content(node);
    let text = text.trim();
    text.contains('@').then(|| text.to_string())
}
