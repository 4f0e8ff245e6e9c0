// ============================================================================
// spark-elements - In-Memory Node Tree
// Documents, fragments, elements and text, with shadow roots and templates
// ============================================================================
//
// Ownership runs downwards: parents hold children strongly, hosts hold their
// shadow root strongly. Every upward link (parent, owner document, shadow
// host, component capability) is Weak, so dropping a subtree frees it.
// ============================================================================

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::core::constants::TEMPLATE_TAG;
use crate::core::types::ResolveBinding;
use crate::core::value::Value;
use crate::dom::markup::MarkupNode;

// =============================================================================
// NODE KIND
// =============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeKind {
    Document,
    /// A document fragment; shadow roots are fragments with a host
    Fragment,
    Element,
    Text,
}

// =============================================================================
// NODE INNER
// =============================================================================

struct NodeInner {
    kind: NodeKind,

    /// Tag name for elements, `#document` / `#fragment` / `#text` otherwise
    tag: String,

    parent: RefCell<Weak<NodeInner>>,
    children: RefCell<Vec<Node>>,
    attributes: RefCell<Vec<(String, String)>>,

    /// Character data of text nodes
    text: RefCell<String>,

    /// Owner document
    owner: RefCell<Weak<NodeInner>>,

    shadow_root: RefCell<Option<Node>>,

    /// Host element of a shadow root
    host: RefCell<Weak<NodeInner>>,

    /// Component attached to this host, if it exposes the resolver capability
    capability: RefCell<Option<Weak<dyn ResolveBinding>>>,

    /// The global root of a document
    default_view: RefCell<Option<Value>>,
}

// =============================================================================
// NODE
// =============================================================================

/// A handle to a node in the tree. Clones refer to the same node.
#[derive(Clone)]
pub struct Node {
    inner: Rc<NodeInner>,
}

impl Node {
    fn with_kind(kind: NodeKind, tag: &str) -> Self {
        Self {
            inner: Rc::new(NodeInner {
                kind,
                tag: tag.to_string(),
                parent: RefCell::new(Weak::new()),
                children: RefCell::new(Vec::new()),
                attributes: RefCell::new(Vec::new()),
                text: RefCell::new(String::new()),
                owner: RefCell::new(Weak::new()),
                shadow_root: RefCell::new(None),
                host: RefCell::new(Weak::new()),
                capability: RefCell::new(None),
                default_view: RefCell::new(None),
            }),
        }
    }

    /// A document without a global root.
    pub fn document() -> Self {
        Self::with_kind(NodeKind::Document, "#document")
    }

    /// A document whose default view (global root) is `view`.
    pub fn document_with_view(view: impl Into<Value>) -> Self {
        let doc = Self::document();
        doc.set_default_view(Some(view.into()));
        doc
    }

    /// A detached element with no owner document.
    pub fn element(tag: &str) -> Self {
        Self::with_kind(NodeKind::Element, tag)
    }

    pub fn text(content: &str) -> Self {
        let node = Self::with_kind(NodeKind::Text, "#text");
        *node.inner.text.borrow_mut() = content.to_string();
        node
    }

    pub fn fragment() -> Self {
        Self::with_kind(NodeKind::Fragment, "#fragment")
    }

    /// Create an element owned by this node's document.
    pub fn create_element(&self, tag: &str) -> Self {
        let node = Self::element(tag);
        node.set_owner(self.owner_document().as_ref());
        node
    }

    pub fn create_text(&self, content: &str) -> Self {
        let node = Self::text(content);
        node.set_owner(self.owner_document().as_ref());
        node
    }

    pub fn create_fragment(&self) -> Self {
        let node = Self::fragment();
        node.set_owner(self.owner_document().as_ref());
        node
    }

    // =========================================================================
    // IDENTITY
    // =========================================================================

    pub fn kind(&self) -> NodeKind {
        self.inner.kind
    }

    pub fn tag_name(&self) -> &str {
        &self.inner.tag
    }

    pub fn is_element(&self) -> bool {
        self.inner.kind == NodeKind::Element
    }

    pub fn is_fragment(&self) -> bool {
        self.inner.kind == NodeKind::Fragment
    }

    pub fn is_document(&self) -> bool {
        self.inner.kind == NodeKind::Document
    }

    pub fn ptr_eq(&self, other: &Node) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    fn from_weak(weak: &Weak<NodeInner>) -> Option<Node> {
        weak.upgrade().map(|inner| Node { inner })
    }

    // =========================================================================
    // TREE STRUCTURE
    // =========================================================================

    pub fn parent(&self) -> Option<Node> {
        Self::from_weak(&self.inner.parent.borrow())
    }

    pub fn children(&self) -> Vec<Node> {
        self.inner.children.borrow().clone()
    }

    /// Append `child`, moving it from its current parent.
    ///
    /// Appending a (non-shadow) fragment moves the fragment's children
    /// instead, leaving it empty. Returns false, changing nothing, when the
    /// append would make a node its own ancestor or `self` cannot have
    /// children.
    pub fn append_child(&self, child: &Node) -> bool {
        if matches!(self.inner.kind, NodeKind::Text) || child.is_document() {
            return false;
        }
        if self.is_inclusive_descendant_of(child) {
            return false;
        }

        if child.is_fragment() && child.host().is_none() {
            let moved: Vec<Node> = child.inner.children.borrow_mut().drain(..).collect();
            for node in moved {
                *node.inner.parent.borrow_mut() = Weak::new();
                self.append_child(&node);
            }
            return true;
        }

        child.detach();
        *child.inner.parent.borrow_mut() = Rc::downgrade(&self.inner);
        if let Some(doc) = self.owner_document() {
            child.set_owner(Some(&doc));
        }
        self.inner.children.borrow_mut().push(child.clone());
        true
    }

    /// Remove this node from its parent, if any.
    pub fn detach(&self) {
        if let Some(parent) = self.parent() {
            parent
                .inner
                .children
                .borrow_mut()
                .retain(|c| !c.ptr_eq(self));
        }
        *self.inner.parent.borrow_mut() = Weak::new();
    }

    fn is_inclusive_descendant_of(&self, other: &Node) -> bool {
        let mut current = Some(self.clone());
        while let Some(node) = current {
            if node.ptr_eq(other) {
                return true;
            }
            current = node.parent();
        }
        false
    }

    /// Owner document, adopting the whole subtree including shadow roots.
    fn set_owner(&self, doc: Option<&Node>) {
        let weak = doc.map(|d| Rc::downgrade(&d.inner)).unwrap_or_default();
        *self.inner.owner.borrow_mut() = weak;
        if let Some(shadow) = self.shadow_root() {
            shadow.set_owner(doc);
        }
        for child in self.children() {
            child.set_owner(doc);
        }
    }

    /// The owning document; a document owns itself.
    pub fn owner_document(&self) -> Option<Node> {
        if self.is_document() {
            return Some(self.clone());
        }
        Self::from_weak(&self.inner.owner.borrow())
    }

    /// Descendant elements in document order. Shadow trees are not entered.
    pub fn descendants(&self) -> Vec<Node> {
        let mut out = Vec::new();
        self.collect_elements(&mut out);
        out
    }

    fn collect_elements(&self, out: &mut Vec<Node>) {
        for child in self.children() {
            if child.is_element() {
                out.push(child.clone());
            }
            child.collect_elements(out);
        }
    }

    /// Copy of this node and its subtree. Shadow roots, capabilities and
    /// default views are not copied.
    pub fn deep_clone(&self) -> Node {
        let copy = Self::with_kind(self.inner.kind, &self.inner.tag);
        *copy.inner.attributes.borrow_mut() = self.attributes();
        *copy.inner.text.borrow_mut() = self.inner.text.borrow().clone();
        *copy.inner.owner.borrow_mut() = self.inner.owner.borrow().clone();
        for child in self.children() {
            let child_copy = child.deep_clone();
            *child_copy.inner.parent.borrow_mut() = Rc::downgrade(&copy.inner);
            copy.inner.children.borrow_mut().push(child_copy);
        }
        copy
    }

    // =========================================================================
    // ATTRIBUTES AND TEXT
    // =========================================================================

    pub fn attributes(&self) -> Vec<(String, String)> {
        self.inner.attributes.borrow().clone()
    }

    pub fn attribute(&self, name: &str) -> Option<String> {
        self.inner
            .attributes
            .borrow()
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.clone())
    }

    /// Set an attribute on an element; a no-op on other node kinds.
    /// Existing attributes keep their position.
    pub fn set_attribute(&self, name: &str, value: &str) {
        if !self.is_element() {
            return;
        }
        let mut attributes = self.inner.attributes.borrow_mut();
        match attributes.iter_mut().find(|(n, _)| n == name) {
            Some((_, existing)) => *existing = value.to_string(),
            None => attributes.push((name.to_string(), value.to_string())),
        }
    }

    /// Builder-style attribute setter.
    pub fn with_attribute(self, name: &str, value: &str) -> Self {
        self.set_attribute(name, value);
        self
    }

    pub fn remove_attribute(&self, name: &str) -> Option<String> {
        let mut attributes = self.inner.attributes.borrow_mut();
        let index = attributes.iter().position(|(n, _)| n == name)?;
        Some(attributes.remove(index).1)
    }

    pub fn text_content(&self) -> String {
        match self.inner.kind {
            NodeKind::Text => self.inner.text.borrow().clone(),
            _ => self.children().iter().map(Node::text_content).collect(),
        }
    }

    /// Replace all children with a single text node (none for empty text).
    pub fn set_text_content(&self, text: &str) {
        if self.inner.kind == NodeKind::Text {
            *self.inner.text.borrow_mut() = text.to_string();
            return;
        }
        let old: Vec<Node> = self.inner.children.borrow_mut().drain(..).collect();
        for child in old {
            *child.inner.parent.borrow_mut() = Weak::new();
        }
        if !text.is_empty() {
            let node = Self::text(text);
            self.append_child(&node);
        }
    }

    // =========================================================================
    // SHADOW ROOTS
    // =========================================================================

    /// Attach (or return the already attached) shadow root.
    /// Only elements can host one.
    pub fn attach_shadow(&self) -> Option<Node> {
        if !self.is_element() {
            return None;
        }
        if let Some(existing) = self.shadow_root() {
            return Some(existing);
        }
        let shadow = Self::fragment();
        *shadow.inner.host.borrow_mut() = Rc::downgrade(&self.inner);
        *shadow.inner.owner.borrow_mut() = self.inner.owner.borrow().clone();
        *self.inner.shadow_root.borrow_mut() = Some(shadow.clone());
        Some(shadow)
    }

    pub fn shadow_root(&self) -> Option<Node> {
        self.inner.shadow_root.borrow().clone()
    }

    /// Host element of a shadow root.
    pub fn host(&self) -> Option<Node> {
        Self::from_weak(&self.inner.host.borrow())
    }

    // =========================================================================
    // DOCUMENT ROOTS AND CAPABILITIES
    // =========================================================================

    pub fn default_view(&self) -> Option<Value> {
        self.inner.default_view.borrow().clone()
    }

    pub fn set_default_view(&self, view: Option<Value>) {
        *self.inner.default_view.borrow_mut() = view;
    }

    /// Link the component living on this host. The link is weak; it dies
    /// with the component.
    pub fn set_binding_capability(&self, capability: Weak<dyn ResolveBinding>) {
        *self.inner.capability.borrow_mut() = Some(capability);
    }

    pub fn clear_binding_capability(&self) {
        *self.inner.capability.borrow_mut() = None;
    }

    /// The live component attached to this host, if any.
    pub fn binding_capability(&self) -> Option<Rc<dyn ResolveBinding>> {
        self.inner
            .capability
            .borrow()
            .as_ref()
            .and_then(|weak| weak.upgrade())
    }

    /// Find `<template id="{id}">` in the owner document and return a
    /// fragment holding a deep copy of its content.
    pub fn template_content(&self, id: &str) -> Option<Node> {
        let doc = self.owner_document()?;
        let template = doc.descendants().into_iter().find(|el| {
            el.tag_name().eq_ignore_ascii_case(TEMPLATE_TAG)
                && el.attribute("id").as_deref() == Some(id)
        })?;

        let content = doc.create_fragment();
        for child in template.children() {
            content.append_child(&child.deep_clone());
        }
        Some(content)
    }

    // =========================================================================
    // SERIALIZATION
    // =========================================================================

    /// Serialize the subtree (shadow trees excluded).
    pub fn to_markup(&self) -> String {
        let mut out = String::new();
        self.write_markup(&mut out);
        out
    }

    fn write_markup(&self, out: &mut String) {
        match self.inner.kind {
            NodeKind::Text => out.push_str(&escape_text(&self.inner.text.borrow())),
            NodeKind::Element => {
                out.push('<');
                out.push_str(&self.inner.tag);
                for (name, value) in self.inner.attributes.borrow().iter() {
                    out.push_str(&format!(" {name}=\"{}\"", escape_attribute(value)));
                }
                out.push('>');
                for child in self.children() {
                    child.write_markup(out);
                }
                out.push_str(&format!("</{}>", self.inner.tag));
            }
            NodeKind::Document | NodeKind::Fragment => {
                for child in self.children() {
                    child.write_markup(out);
                }
            }
        }
    }
}

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn escape_attribute(value: &str) -> String {
    value.replace('&', "&amp;").replace('"', "&quot;")
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("kind", &self.inner.kind)
            .field("tag", &self.inner.tag)
            .field("children", &self.inner.children.borrow().len())
            .finish()
    }
}

// =============================================================================
// MARKUP CAPABILITY
// =============================================================================

impl MarkupNode for Node {
    fn select_all(&self, predicate: &mut dyn FnMut(&Self) -> bool) -> Vec<Self> {
        self.descendants()
            .into_iter()
            .filter(|node| predicate(node))
            .collect()
    }

    fn attributes(&self) -> Vec<(String, String)> {
        Node::attributes(self)
    }

    fn attribute(&self, name: &str) -> Option<String> {
        Node::attribute(self, name)
    }

    fn set_attribute(&self, name: &str, value: &str) {
        Node::set_attribute(self, name, value);
    }

    fn set_text(&self, text: &str) {
        self.set_text_content(text);
    }
}

// =============================================================================
// TESTS
// =============================================================================
