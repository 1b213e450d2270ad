use std::collections::BTreeMap;

use super::markup::{self, MarkupNode};
use super::selector::{SelectorContext, SelectorList};
use super::{NodeId, ViewSurface};

#[derive(Debug, Clone)]
struct Element {
    tag: String,
    attributes: BTreeMap<String, String>,
    style: BTreeMap<String, String>,
}

#[derive(Debug, Clone)]
enum NodeData {
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone)]
struct Node {
    data: NodeData,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Borrowed view of a node for renderers walking the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeRef<'a> {
    Element { tag: &'a str },
    Text(&'a str),
}

/// In-memory document: an arena of element and text nodes under a `<body>`.
#[derive(Debug)]
pub struct Document {
    nodes: Vec<Option<Node>>,
    body: NodeId,
    selection_enabled: bool,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        let body = Node {
            data: NodeData::Element(Element {
                tag: "body".to_string(),
                attributes: BTreeMap::new(),
                style: BTreeMap::new(),
            }),
            parent: None,
            children: Vec::new(),
        };
        Self {
            nodes: vec![Some(body)],
            body: NodeId(0),
            selection_enabled: true,
        }
    }

    fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0).and_then(Option::as_ref)
    }

    fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0).and_then(Option::as_mut)
    }

    fn element(&self, id: NodeId) -> Option<&Element> {
        match &self.get(id)?.data {
            NodeData::Element(element) => Some(element),
            NodeData::Text(_) => None,
        }
    }

    fn element_mut(&mut self, id: NodeId) -> Option<&mut Element> {
        match &mut self.get_mut(id)?.data {
            NodeData::Element(element) => Some(element),
            NodeData::Text(_) => None,
        }
    }

    pub fn node(&self, id: NodeId) -> Option<NodeRef<'_>> {
        Some(match &self.get(id)?.data {
            NodeData::Element(element) => NodeRef::Element { tag: &element.tag },
            NodeData::Text(text) => NodeRef::Text(text),
        })
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map_or(&[], |node| node.children.as_slice())
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id)?.parent
    }

    pub fn tag(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(|element| element.tag.as_str())
    }

    /// Borrowing variant of `ViewSurface::attribute` for hot render paths.
    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id)?.attributes.get(name).map(String::as_str)
    }

    pub fn style_ref(&self, id: NodeId, property: &str) -> Option<&str> {
        self.element(id)?.style.get(property).map(String::as_str)
    }

    fn alloc(&mut self, node: Node) -> NodeId {
        self.nodes.push(Some(node));
        NodeId(self.nodes.len() - 1)
    }

    fn append(&mut self, parent: NodeId, data: NodeData) -> NodeId {
        let id = self.alloc(Node {
            data,
            parent: Some(parent),
            children: Vec::new(),
        });
        if let Some(parent_node) = self.get_mut(parent) {
            parent_node.children.push(id);
        }
        id
    }

    fn insert_markup(&mut self, parent: NodeId, nodes: Vec<MarkupNode>) {
        for node in nodes {
            match node {
                MarkupNode::Text(text) => {
                    self.append(parent, NodeData::Text(text));
                }
                MarkupNode::Element {
                    tag,
                    attributes,
                    children,
                } => {
                    let mut element = Element {
                        tag,
                        attributes: BTreeMap::new(),
                        style: BTreeMap::new(),
                    };
                    for (name, value) in attributes {
                        if name == "style" {
                            element.style = parse_style(&value);
                        } else {
                            element.attributes.insert(name, value);
                        }
                    }
                    let id = self.append(parent, NodeData::Element(element));
                    self.insert_markup(id, children);
                }
            }
        }
    }

    fn clear_children(&mut self, id: NodeId) {
        let children = match self.get_mut(id) {
            Some(node) => std::mem::take(&mut node.children),
            None => return,
        };
        for child in children {
            self.drop_subtree(child);
        }
    }

    fn drop_subtree(&mut self, id: NodeId) {
        let children = match self.nodes.get_mut(id.0).and_then(Option::take) {
            Some(node) => node.children,
            None => return,
        };
        for child in children {
            self.drop_subtree(child);
        }
    }

    /// Pre-order descendants of `scope`, excluding `scope` itself.
    pub fn descendants(&self, scope: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(scope).iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.children(id).iter().rev().copied());
        }
        out
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        match self.get(id).map(|node| &node.data) {
            Some(NodeData::Text(text)) => out.push_str(text),
            Some(NodeData::Element(_)) => {
                for child in self.children(id) {
                    self.collect_text(*child, out);
                }
            }
            None => {}
        }
    }

    fn select(&self, scope: NodeId, selector: &str) -> Vec<NodeId> {
        let list = match SelectorList::parse(selector) {
            Ok(list) => list,
            Err(err) => {
                tracing::warn!(selector, error = %err, "ignoring malformed selector");
                return Vec::new();
            }
        };
        self.descendants(scope)
            .into_iter()
            .filter(|id| list.matches(self, *id))
            .collect()
    }
}

impl SelectorContext for Document {
    type Node = NodeId;

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        Document::parent(self, node)
    }

    fn tag(&self, node: NodeId) -> Option<&str> {
        Document::tag(self, node)
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        self.attr(node, name)
    }
}

impl ViewSurface for Document {
    fn root(&self) -> NodeId {
        self.body
    }

    fn query(&self, selector: &str) -> Vec<NodeId> {
        self.select(self.body, selector)
    }

    fn query_within(&self, scope: NodeId, selector: &str) -> Vec<NodeId> {
        self.select(scope, selector)
    }

    fn by_id(&self, id: &str) -> Option<NodeId> {
        self.descendants(self.body)
            .into_iter()
            .find(|node| self.attr(*node, "id") == Some(id))
    }

    fn contains(&self, node: NodeId) -> bool {
        self.get(node).is_some()
    }

    fn create_element(&mut self, parent: NodeId, tag: &str) -> NodeId {
        self.append(
            parent,
            NodeData::Element(Element {
                tag: tag.to_ascii_lowercase(),
                attributes: BTreeMap::new(),
                style: BTreeMap::new(),
            }),
        )
    }

    fn remove(&mut self, node: NodeId) {
        if node == self.body {
            return;
        }
        if let Some(parent) = self.parent(node)
            && let Some(parent_node) = self.get_mut(parent)
        {
            parent_node.children.retain(|child| *child != node);
        }
        self.drop_subtree(node);
    }

    fn text(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(node, &mut out);
        out
    }

    fn set_text(&mut self, node: NodeId, text: &str) {
        if self.element(node).is_none() {
            if let Some(Node {
                data: NodeData::Text(existing),
                ..
            }) = self.get_mut(node)
            {
                *existing = text.to_string();
            }
            return;
        }
        self.clear_children(node);
        if !text.is_empty() {
            self.append(node, NodeData::Text(text.to_string()));
        }
    }

    fn set_markup(&mut self, node: NodeId, markup_text: &str) {
        if self.element(node).is_none() {
            return;
        }
        self.clear_children(node);
        self.insert_markup(node, markup::parse(markup_text));
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        let element = self.element(node)?;
        if name == "style" {
            return (!element.style.is_empty()).then(|| format_style(&element.style));
        }
        element.attributes.get(name).cloned()
    }

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) {
        if let Some(element) = self.element_mut(node) {
            if name == "style" {
                element.style = parse_style(value);
            } else {
                element
                    .attributes
                    .insert(name.to_string(), value.to_string());
            }
        }
    }

    fn remove_attribute(&mut self, node: NodeId, name: &str) {
        if let Some(element) = self.element_mut(node) {
            if name == "style" {
                element.style.clear();
            } else {
                element.attributes.remove(name);
            }
        }
    }

    fn attributes(&self, node: NodeId) -> Vec<(String, String)> {
        self.element(node)
            .map(|element| {
                element
                    .attributes
                    .iter()
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn style(&self, node: NodeId, property: &str) -> Option<String> {
        self.style_ref(node, property).map(str::to_string)
    }

    fn set_style(&mut self, node: NodeId, property: &str, value: &str) {
        if let Some(element) = self.element_mut(node) {
            element
                .style
                .insert(property.to_string(), value.to_string());
        }
    }

    fn selection_enabled(&self) -> bool {
        self.selection_enabled
    }

    fn set_selection_enabled(&mut self, enabled: bool) {
        self.selection_enabled = enabled;
    }
}

fn parse_style(value: &str) -> BTreeMap<String, String> {
    value
        .split(';')
        .filter_map(|decl| {
            let (prop, val) = decl.split_once(':')?;
            let prop = prop.trim();
            (!prop.is_empty()).then(|| (prop.to_ascii_lowercase(), val.trim().to_string()))
        })
        .collect()
}

fn format_style(style: &BTreeMap<String, String>) -> String {
    style
        .iter()
        .map(|(prop, val)| format!("{prop}: {val}"))
        .collect::<Vec<_>>()
        .join("; ")
}
