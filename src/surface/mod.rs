//! The view surface: the minimal document capability the core needs.
//!
//! The router, search broadcaster and overlay manager never touch a renderer
//! directly. They mount, query and mutate nodes through `ViewSurface`, which
//! `Document` implements in memory. The terminal renderer paints a
//! `Document`; tests inspect one.

pub mod document;
pub mod markup;
pub mod selector;

pub use document::{Document, NodeRef};
pub use markup::escape;

/// Handle to a node owned by a surface. Handles of removed nodes stay invalid
/// and are ignored by every operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub(crate) usize);

pub trait ViewSurface {
    /// The document body; overlays are mounted directly below it.
    fn root(&self) -> NodeId;

    /// All elements matching `selector`, in document order. A malformed
    /// selector matches nothing.
    fn query(&self, selector: &str) -> Vec<NodeId>;

    /// Like `query`, restricted to descendants of `scope`.
    fn query_within(&self, scope: NodeId, selector: &str) -> Vec<NodeId>;

    fn by_id(&self, id: &str) -> Option<NodeId>;

    fn contains(&self, node: NodeId) -> bool;

    fn create_element(&mut self, parent: NodeId, tag: &str) -> NodeId;

    /// Detaches `node` and its subtree.
    fn remove(&mut self, node: NodeId);

    /// Concatenated text of all descendant text nodes.
    fn text(&self, node: NodeId) -> String;

    /// Replaces the children of `node` with a single text node.
    fn set_text(&mut self, node: NodeId, text: &str);

    /// Replaces the children of `node` with parsed `markup`.
    fn set_markup(&mut self, node: NodeId, markup: &str);

    fn attribute(&self, node: NodeId, name: &str) -> Option<String>;

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str);

    fn remove_attribute(&mut self, node: NodeId, name: &str);

    fn attributes(&self, node: NodeId) -> Vec<(String, String)>;

    fn style(&self, node: NodeId, property: &str) -> Option<String>;

    fn set_style(&mut self, node: NodeId, property: &str, value: &str);

    /// Page-wide text selection (`user-select` on the body).
    fn selection_enabled(&self) -> bool;

    fn set_selection_enabled(&mut self, enabled: bool);

    fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.attribute(node, "class")
            .is_some_and(|classes| classes.split_whitespace().any(|c| c == class))
    }

    fn toggle_class(&mut self, node: NodeId, class: &str, on: bool) {
        let current = self.attribute(node, "class").unwrap_or_default();
        let mut classes: Vec<&str> = current
            .split_whitespace()
            .filter(|existing| *existing != class)
            .collect();
        if on {
            classes.push(class);
        }
        let joined = classes.join(" ");
        self.set_attribute(node, "class", &joined);
    }

    /// Current value of a form control: the `value` attribute, falling back
    /// to the element's text (a `<textarea>` before it was edited).
    fn value(&self, node: NodeId) -> String {
        self.attribute(node, "value")
            .unwrap_or_else(|| self.text(node))
    }
}
