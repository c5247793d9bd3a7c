//! In-memory document
//!
//! Arena-backed element tree implementing [`Dom`]. It keeps inline styles as
//! ordered declarations, serializes `class` and `style` the way browsers do for
//! attribute selectors, and records a mutation log that only contains real
//! changes, mirroring what a `MutationObserver` would report.

use std::borrow::Cow;
use std::cell::RefCell;

use hashbrown::HashMap;

use super::{Dom, StyleDecl};
use crate::selector::{ElementView, SelectorList};
use crate::watcher::MutationKind;

const DOCUMENT_TAG: &str = "#document";

/// Handle to a node in a [`MemoryDom`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// One recorded change, with the node it happened on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryMutation {
    pub target: NodeId,
    pub kind: MutationKind,
}

#[derive(Debug)]
struct Node {
    tag: String,
    /// Attributes other than `class` and `style`
    attributes: HashMap<String, String>,
    classes: Vec<String>,
    style: Vec<(String, StyleDecl)>,
    text: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Node {
    fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            attributes: HashMap::new(),
            classes: Vec::new(),
            style: Vec::new(),
            text: String::new(),
            parent: None,
            children: Vec::new(),
        }
    }

    fn style_text(&self) -> String {
        self.style
            .iter()
            .map(|(property, decl)| {
                if decl.important {
                    format!("{property}: {} !important;", decl.value)
                } else {
                    format!("{property}: {};", decl.value)
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[derive(Debug)]
struct Tree {
    nodes: Vec<Node>,
    root: NodeId,
    head: Option<NodeId>,
    body: Option<NodeId>,
    log: Vec<MemoryMutation>,
}

impl Tree {
    fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    fn alloc(&mut self, tag: &str) -> NodeId {
        self.nodes.push(Node::new(tag));
        NodeId(self.nodes.len() - 1)
    }

    fn record(&mut self, target: NodeId, kind: MutationKind) {
        self.log.push(MemoryMutation { target, kind });
    }

    fn detach(&mut self, child: NodeId) {
        if let Some(parent) = self.node_mut(child).parent.take() {
            self.node_mut(parent).children.retain(|c| *c != child);
            self.record(parent, MutationKind::ChildList);
        }
    }

    fn append(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        self.node_mut(child).parent = Some(parent);
        self.node_mut(parent).children.push(child);
        self.record(parent, MutationKind::ChildList);
    }

    /// Pre-order descendants of `root`, excluding `root`
    fn descendants(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.node(root).children.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.node(id).children.iter().rev().copied());
        }
        out
    }

    fn is_inclusive_ancestor(&self, ancestor: NodeId, mut node: NodeId) -> bool {
        loop {
            if node == ancestor {
                return true;
            }
            match self.node(node).parent {
                Some(parent) => node = parent,
                None => return false,
            }
        }
    }

    fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) {
        let name = name.to_ascii_lowercase();
        let changed = match name.as_str() {
            "class" => {
                let classes: Vec<String> = value.split_whitespace().map(str::to_string).collect();
                let node = self.node_mut(id);
                let changed = node.classes != classes;
                node.classes = classes;
                changed
            }
            "style" => {
                let style = parse_style(value);
                let node = self.node_mut(id);
                let changed = node.style != style;
                node.style = style;
                changed
            }
            _ => {
                let node = self.node_mut(id);
                node.attributes.insert(name.clone(), value.to_string()).as_deref() != Some(value)
            }
        };
        if changed {
            self.record(id, MutationKind::Attribute(name));
        }
    }
}

/// Parse `prop: value; prop2: value2 !important` into ordered declarations
fn parse_style(text: &str) -> Vec<(String, StyleDecl)> {
    let mut out: Vec<(String, StyleDecl)> = Vec::new();
    for declaration in text.split(';') {
        let Some((property, value)) = declaration.split_once(':') else {
            continue;
        };
        let property = property.trim().to_ascii_lowercase();
        let mut value = value.trim();
        if property.is_empty() || value.is_empty() {
            continue;
        }
        let mut important = false;
        if let Some(at) = value.len().checked_sub("!important".len())
            && value.get(at..).is_some_and(|tail| tail.eq_ignore_ascii_case("!important"))
        {
            value = value[..at].trim_end();
            important = true;
        }
        let decl = StyleDecl {
            value: value.to_string(),
            important,
        };
        match out.iter_mut().find(|(p, _)| *p == property) {
            Some((_, existing)) => *existing = decl,
            None => out.push((property, decl)),
        }
    }
    out
}

/// Borrowed view used for selector evaluation
#[derive(Clone, Copy)]
struct NodeRef<'a> {
    tree: &'a Tree,
    id: NodeId,
}

impl ElementView for NodeRef<'_> {
    fn tag_name(&self) -> Cow<'_, str> {
        Cow::Borrowed(&self.tree.node(self.id).tag)
    }

    fn attribute(&self, name: &str) -> Option<Cow<'_, str>> {
        let node = self.tree.node(self.id);
        match name {
            "class" if node.classes.is_empty() => None,
            "class" => Some(Cow::Owned(node.classes.join(" "))),
            "style" if node.style.is_empty() => None,
            "style" => Some(Cow::Owned(node.style_text())),
            _ => node.attributes.get(name).map(|v| Cow::Borrowed(v.as_str())),
        }
    }

    fn has_class(&self, class: &str) -> bool {
        self.tree.node(self.id).classes.iter().any(|c| c == class)
    }

    fn parent_element(&self) -> Option<Self> {
        let parent = self.tree.node(self.id).parent?;
        if self.tree.node(parent).tag == DOCUMENT_TAG {
            return None;
        }
        Some(NodeRef {
            tree: self.tree,
            id: parent,
        })
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// MemoryDom
// ═══════════════════════════════════════════════════════════════════════════

/// In-memory document: `<html>` with `<head>` and `<body>`.
#[derive(Debug)]
pub struct MemoryDom {
    tree: RefCell<Tree>,
}

impl MemoryDom {
    pub fn new() -> Self {
        Self::build(true)
    }

    /// Document whose `<head>` has not been parsed yet
    pub fn without_head() -> Self {
        Self::build(false)
    }

    fn build(with_head: bool) -> Self {
        let mut tree = Tree {
            nodes: Vec::new(),
            root: NodeId(0),
            head: None,
            body: None,
            log: Vec::new(),
        };
        let root = tree.alloc(DOCUMENT_TAG);
        tree.root = root;
        let html = tree.alloc("html");
        tree.append(root, html);
        if with_head {
            let head = tree.alloc("head");
            tree.append(html, head);
            tree.head = Some(head);
        }
        let body = tree.alloc("body");
        tree.append(html, body);
        tree.body = Some(body);
        tree.log.clear();
        Self {
            tree: RefCell::new(tree),
        }
    }

    /// Create an element with the given attributes and append it to `parent`
    pub fn insert(&self, parent: NodeId, tag: &str, attributes: &[(&str, &str)]) -> NodeId {
        let mut tree = self.tree.borrow_mut();
        let id = tree.alloc(tag);
        for (name, value) in attributes {
            tree.set_attribute(id, name, value);
        }
        tree.append(parent, id);
        id
    }

    /// Detach `node` (and its subtree) from its parent
    pub fn remove(&self, node: NodeId) {
        self.tree.borrow_mut().detach(node);
    }

    /// Overwrite an attribute the way page scripts do
    pub fn set_attribute(&self, node: NodeId, name: &str, value: &str) {
        self.tree.borrow_mut().set_attribute(node, name, value);
    }

    /// Serialized attribute value
    pub fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        let tree = self.tree.borrow();
        NodeRef { tree: &tree, id: node }
            .attribute(name)
            .map(Cow::into_owned)
    }

    pub fn classes(&self, node: NodeId) -> Vec<String> {
        self.tree.borrow().node(node).classes.clone()
    }

    pub fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.tree.borrow().node(node).children.clone()
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.tree.borrow().node(node).parent
    }

    pub fn tag(&self, node: NodeId) -> String {
        self.tree.borrow().node(node).tag.clone()
    }

    pub fn text(&self, node: NodeId) -> String {
        self.tree.borrow().node(node).text.clone()
    }

    /// Number of recorded mutations not yet taken
    pub fn pending_mutations(&self) -> usize {
        self.tree.borrow().log.len()
    }

    /// Drain the whole mutation log
    pub fn take_mutations(&self) -> Vec<MemoryMutation> {
        std::mem::take(&mut self.tree.borrow_mut().log)
    }

    /// Drain the mutation log, keeping the kinds of records whose target lies
    /// inside `root` (inclusive), like an observer with `subtree: true`.
    pub fn take_mutations_under(&self, root: NodeId) -> Vec<MutationKind> {
        let mut tree = self.tree.borrow_mut();
        let log = std::mem::take(&mut tree.log);
        log.into_iter()
            .filter(|m| tree.is_inclusive_ancestor(root, m.target))
            .map(|m| m.kind)
            .collect()
    }
}

impl Default for MemoryDom {
    fn default() -> Self {
        Self::new()
    }
}

impl Dom for MemoryDom {
    type Element = NodeId;

    fn head(&self) -> Option<NodeId> {
        self.tree.borrow().head
    }

    fn body(&self) -> Option<NodeId> {
        self.tree.borrow().body
    }

    fn element_by_id(&self, id: &str) -> Option<NodeId> {
        let tree = self.tree.borrow();
        tree.descendants(tree.root)
            .into_iter()
            .find(|n| tree.node(*n).attributes.get("id").is_some_and(|v| v == id))
    }

    fn create_element(&self, tag: &str) -> Option<NodeId> {
        Some(self.tree.borrow_mut().alloc(tag))
    }

    fn set_id(&self, element: &NodeId, id: &str) {
        self.tree.borrow_mut().set_attribute(*element, "id", id);
    }

    fn set_text(&self, element: &NodeId, text: &str) {
        let mut tree = self.tree.borrow_mut();
        if tree.node(*element).text == text {
            return;
        }
        tree.node_mut(*element).text = text.to_string();
        tree.record(*element, MutationKind::ChildList);
    }

    fn append_child(&self, parent: &NodeId, child: &NodeId) {
        self.tree.borrow_mut().append(*parent, *child);
    }

    fn query_all(&self, selector: &SelectorList) -> Vec<NodeId> {
        let tree = self.tree.borrow();
        tree.descendants(tree.root)
            .into_iter()
            .filter(|id| selector.matches(&NodeRef { tree: &tree, id: *id }))
            .collect()
    }

    fn query_within(&self, root: &NodeId, selector: &SelectorList) -> Option<NodeId> {
        let tree = self.tree.borrow();
        tree.descendants(*root)
            .into_iter()
            .find(|id| selector.matches(&NodeRef { tree: &tree, id: *id }))
    }

    fn closest(&self, element: &NodeId, selector: &SelectorList) -> Option<NodeId> {
        let tree = self.tree.borrow();
        let mut cursor = Some(NodeRef {
            tree: &tree,
            id: *element,
        });
        while let Some(node) = cursor {
            if selector.matches(&node) {
                return Some(node.id);
            }
            cursor = node.parent_element();
        }
        None
    }

    fn style_value(&self, element: &NodeId, property: &str) -> Option<StyleDecl> {
        self.tree
            .borrow()
            .node(*element)
            .style
            .iter()
            .find(|(p, _)| p == property)
            .map(|(_, decl)| decl.clone())
    }

    fn set_style_important(&self, element: &NodeId, property: &str, value: &str) {
        let mut tree = self.tree.borrow_mut();
        let decl = StyleDecl::important(value);
        let node = tree.node_mut(*element);
        let changed = match node.style.iter_mut().find(|(p, _)| p == property) {
            Some((_, existing)) if *existing == decl => false,
            Some((_, existing)) => {
                *existing = decl;
                true
            }
            None => {
                node.style.push((property.to_string(), decl));
                true
            }
        };
        if changed {
            tree.record(*element, MutationKind::Attribute("style".to_string()));
        }
    }

    fn has_class(&self, element: &NodeId, class: &str) -> bool {
        self.tree
            .borrow()
            .node(*element)
            .classes
            .iter()
            .any(|c| c == class)
    }

    fn add_class(&self, element: &NodeId, class: &str) {
        let mut tree = self.tree.borrow_mut();
        let node = tree.node_mut(*element);
        if node.classes.iter().any(|c| c == class) {
            return;
        }
        node.classes.push(class.to_string());
        tree.record(*element, MutationKind::Attribute("class".to_string()));
    }

    fn remove_class(&self, element: &NodeId, class: &str) {
        let mut tree = self.tree.borrow_mut();
        let node = tree.node_mut(*element);
        let before = node.classes.len();
        node.classes.retain(|c| c != class);
        if node.classes.len() != before {
            tree.record(*element, MutationKind::Attribute("class".to_string()));
        }
    }

    fn is_connected(&self, element: &NodeId) -> bool {
        let tree = self.tree.borrow();
        tree.is_inclusive_ancestor(tree.root, *element)
    }
}
