//! An in-memory reference tree implementing [`Node`].
//!
//! Documents are built declaratively and finalized by
//! [`SimpleNode::document`], which assigns document order. Namespace nodes
//! are synthesized on demand from the declarations in scope and cached on
//! their element, so they keep their identity across calls.

use std::cell::{Cell, RefCell};
use std::cmp::Ordering;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};

use xpq_name::{Name, XML_NAMESPACE};

use super::{Node, NodeKind};

static NEXT_DOCUMENT: AtomicU64 = AtomicU64::new(1);

#[derive(Clone)]
pub struct SimpleNode(Rc<NodeData>);

struct NodeData {
    kind: NodeKind,
    name: Option<Name>,
    value: String,
    document: Cell<u64>,
    // preorder position, assigned when the document is finalized
    order: Cell<u64>,
    parent: RefCell<Weak<NodeData>>,
    children: RefCell<Vec<SimpleNode>>,
    attributes: RefCell<Vec<SimpleNode>>,
    // namespace declarations on this element; prefix "" is the default
    // namespace, an empty URI undeclares
    namespace_decls: RefCell<Vec<(String, String)>>,
    in_scope_cache: RefCell<Option<Vec<SimpleNode>>>,
    // position of a namespace node within its element's in-scope set
    ns_index: u32,
}

impl std::fmt::Debug for SimpleNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimpleNode")
            .field("kind", &self.0.kind)
            .field("name", &self.0.name)
            .field("value", &self.0.value)
            .finish()
    }
}

impl PartialEq for SimpleNode {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for SimpleNode {}

fn new_data(kind: NodeKind, name: Option<Name>, value: String) -> SimpleNode {
    SimpleNode(Rc::new(NodeData {
        kind,
        name,
        value,
        document: Cell::new(0),
        order: Cell::new(0),
        parent: RefCell::new(Weak::new()),
        children: RefCell::new(Vec::new()),
        attributes: RefCell::new(Vec::new()),
        namespace_decls: RefCell::new(Vec::new()),
        in_scope_cache: RefCell::new(None),
        ns_index: 0,
    }))
}

impl SimpleNode {
    pub fn element(local: &str) -> SimpleNode {
        new_data(NodeKind::Element, Some(Name::unprefixed(local)), String::new())
    }

    pub fn element_in(uri: &str, prefix: &str, local: &str) -> SimpleNode {
        let name = Name::new(
            local.to_string(),
            Some(uri.to_string()),
            if prefix.is_empty() {
                None
            } else {
                Some(prefix.to_string())
            },
        );
        new_data(NodeKind::Element, Some(name), String::new())
    }

    pub fn text(value: &str) -> SimpleNode {
        new_data(NodeKind::Text, None, value.to_string())
    }

    pub fn comment(value: &str) -> SimpleNode {
        new_data(NodeKind::Comment, None, value.to_string())
    }

    pub fn processing_instruction(target: &str, value: &str) -> SimpleNode {
        new_data(
            NodeKind::ProcessingInstruction,
            Some(Name::unprefixed(target)),
            value.to_string(),
        )
    }

    pub fn with_attribute(self, local: &str, value: &str) -> Self {
        let attribute = new_data(
            NodeKind::Attribute,
            Some(Name::unprefixed(local)),
            value.to_string(),
        );
        *attribute.0.parent.borrow_mut() = Rc::downgrade(&self.0);
        self.0.attributes.borrow_mut().push(attribute);
        self
    }

    pub fn with_attribute_in(self, uri: &str, prefix: &str, local: &str, value: &str) -> Self {
        let name = Name::new(
            local.to_string(),
            Some(uri.to_string()),
            if prefix.is_empty() {
                None
            } else {
                Some(prefix.to_string())
            },
        );
        let attribute = new_data(NodeKind::Attribute, Some(name), value.to_string());
        *attribute.0.parent.borrow_mut() = Rc::downgrade(&self.0);
        self.0.attributes.borrow_mut().push(attribute);
        self
    }

    /// Declare a namespace on this element, like `xmlns:prefix="uri"`.
    /// An empty prefix declares the default namespace; an empty URI
    /// undeclares (`xmlns=""`).
    pub fn with_namespace(self, prefix: &str, uri: &str) -> Self {
        self.0
            .namespace_decls
            .borrow_mut()
            .push((prefix.to_string(), uri.to_string()));
        self
    }

    pub fn with_child(self, child: SimpleNode) -> Self {
        *child.0.parent.borrow_mut() = Rc::downgrade(&self.0);
        self.0.children.borrow_mut().push(child);
        self
    }

    pub fn with_text(self, text: &str) -> Self {
        let node = SimpleNode::text(text);
        self.with_child(node)
    }

    /// Build a document node over the given children and assign document
    /// order to the whole tree.
    pub fn document(children: Vec<SimpleNode>) -> SimpleNode {
        let doc = new_data(NodeKind::Document, None, String::new());
        for child in children {
            *child.0.parent.borrow_mut() = Rc::downgrade(&doc.0);
            doc.0.children.borrow_mut().push(child);
        }
        let document_id = NEXT_DOCUMENT.fetch_add(1, AtomicOrdering::Relaxed);
        let mut order = 0u64;
        assign_order(&doc, document_id, &mut order);
        doc
    }

    fn order_key(&self) -> (u64, u64, u8, u32) {
        if self.0.kind == NodeKind::Namespace {
            match self.parent() {
                Some(parent) => (
                    parent.0.document.get(),
                    parent.0.order.get(),
                    1,
                    self.0.ns_index,
                ),
                None => (0, 0, 1, self.0.ns_index),
            }
        } else {
            (self.0.document.get(), self.0.order.get(), 0, 0)
        }
    }

    /// The namespace declarations in scope, nearest declaration winning,
    /// with the implicit `xml` binding and undeclarations applied.
    fn in_scope_declarations(&self) -> Vec<(String, String)> {
        let mut bindings: Vec<(String, String)> = Vec::new();
        let mut current = Some(self.clone());
        while let Some(node) = current {
            for (prefix, uri) in node.0.namespace_decls.borrow().iter() {
                if !bindings.iter().any(|(p, _)| p == prefix) {
                    bindings.push((prefix.clone(), uri.clone()));
                }
            }
            current = node.parent();
        }
        if !bindings.iter().any(|(p, _)| p == "xml") {
            bindings.push(("xml".to_string(), XML_NAMESPACE.to_string()));
        }
        // an empty URI undeclares the binding
        bindings.retain(|(_, uri)| !uri.is_empty());
        bindings.sort_by(|(a, _), (b, _)| a.cmp(b));
        bindings
    }
}

fn assign_order(node: &SimpleNode, document: u64, order: &mut u64) {
    node.0.document.set(document);
    node.0.order.set(*order);
    *order += 1;
    for attribute in node.0.attributes.borrow().iter() {
        attribute.0.document.set(document);
        attribute.0.order.set(*order);
        *order += 1;
    }
    for child in node.0.children.borrow().iter() {
        assign_order(child, document, order);
    }
}

impl Node for SimpleNode {
    fn kind(&self) -> NodeKind {
        self.0.kind
    }

    fn name(&self) -> Option<Name> {
        self.0.name.clone()
    }

    fn string_value(&self) -> String {
        match self.0.kind {
            NodeKind::Element | NodeKind::Document => {
                let mut value = String::new();
                collect_text(self, &mut value);
                value
            }
            _ => self.0.value.clone(),
        }
    }

    fn parent(&self) -> Option<Self> {
        self.0.parent.borrow().upgrade().map(SimpleNode)
    }

    fn children(&self) -> Vec<Self> {
        self.0.children.borrow().clone()
    }

    fn attributes(&self) -> Vec<Self> {
        self.0.attributes.borrow().clone()
    }

    fn namespaces(&self) -> Vec<Self> {
        if self.0.kind != NodeKind::Element {
            return Vec::new();
        }
        if let Some(cached) = self.0.in_scope_cache.borrow().as_ref() {
            return cached.clone();
        }
        let mut nodes = Vec::new();
        for (index, (prefix, uri)) in self.in_scope_declarations().into_iter().enumerate() {
            let name = if prefix.is_empty() {
                None
            } else {
                Some(Name::unprefixed(&prefix))
            };
            let node = SimpleNode(Rc::new(NodeData {
                kind: NodeKind::Namespace,
                name,
                value: uri,
                document: Cell::new(self.0.document.get()),
                order: Cell::new(0),
                parent: RefCell::new(Rc::downgrade(&self.0)),
                children: RefCell::new(Vec::new()),
                attributes: RefCell::new(Vec::new()),
                namespace_decls: RefCell::new(Vec::new()),
                in_scope_cache: RefCell::new(None),
                ns_index: index as u32,
            }));
            nodes.push(node);
        }
        *self.0.in_scope_cache.borrow_mut() = Some(nodes.clone());
        nodes
    }

    fn node_id(&self) -> u64 {
        Rc::as_ptr(&self.0) as u64
    }

    fn document_order(&self, other: &Self) -> Ordering {
        self.order_key().cmp(&other.order_key())
    }
}

fn collect_text(node: &SimpleNode, into: &mut String) {
    for child in node.0.children.borrow().iter() {
        match child.0.kind {
            NodeKind::Text => into.push_str(&child.0.value),
            NodeKind::Element => collect_text(child, into),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SimpleNode {
        SimpleNode::document(vec![SimpleNode::element("doc")
            .with_attribute("id", "d1")
            .with_child(
                SimpleNode::element("a")
                    .with_text("one")
                    .with_child(SimpleNode::element("b").with_text("two")),
            )
            .with_child(SimpleNode::element("c").with_text("three"))])
    }

    #[test]
    fn test_string_value_concatenates_text() {
        let doc = sample();
        assert_eq!(doc.string_value(), "onetwothree");
        let root = doc.children()[0].clone();
        let a = root.children()[0].clone();
        assert_eq!(a.string_value(), "onetwo");
    }

    #[test]
    fn test_document_order() {
        let doc = sample();
        let root = doc.children()[0].clone();
        let id = root.attributes()[0].clone();
        let a = root.children()[0].clone();
        let c = root.children()[1].clone();
        assert_eq!(doc.document_order(&root), Ordering::Less);
        assert_eq!(root.document_order(&id), Ordering::Less);
        assert_eq!(id.document_order(&a), Ordering::Less);
        assert_eq!(a.document_order(&c), Ordering::Less);
        assert_eq!(c.document_order(&c), Ordering::Equal);
    }

    #[test]
    fn test_ancestry() {
        let doc = sample();
        let root = doc.children()[0].clone();
        let b = root.children()[0].clone().children()[0].clone();
        assert_eq!(b.ancestors().len(), 3);
        assert_eq!(b.root(), doc);
    }

    #[test]
    fn test_siblings() {
        let doc = sample();
        let root = doc.children()[0].clone();
        let a = root.children()[0].clone();
        let c = root.children()[1].clone();
        assert_eq!(a.following_siblings(), vec![c.clone()]);
        assert_eq!(c.preceding_siblings(), vec![a]);
    }

    #[test]
    fn test_in_scope_namespaces_with_shadowing() {
        let inner = SimpleNode::element("inner").with_namespace("foo", "urn:inner");
        let doc = SimpleNode::document(vec![SimpleNode::element("outer")
            .with_namespace("foo", "urn:outer")
            .with_namespace("bar", "urn:bar")
            .with_child(inner)]);
        let outer = doc.children()[0].clone();
        let inner = outer.children()[0].clone();

        let outer_ns = outer.namespaces();
        let prefixes: Vec<_> = outer_ns
            .iter()
            .map(|n| n.name().map(|n| n.local_name().to_string()))
            .collect();
        assert_eq!(
            prefixes,
            vec![
                Some("bar".to_string()),
                Some("foo".to_string()),
                Some("xml".to_string())
            ]
        );

        let inner_ns = inner.namespaces();
        let foo = inner_ns
            .iter()
            .find(|n| n.name().map(|n| n.local_name() == "foo").unwrap_or(false))
            .unwrap();
        // the inner redeclaration wins
        assert_eq!(foo.string_value(), "urn:inner");
        // xml is always bound
        assert!(inner_ns
            .iter()
            .any(|n| n.string_value() == XML_NAMESPACE));
    }

    #[test]
    fn test_default_namespace_undeclaration() {
        let child = SimpleNode::element("child").with_namespace("", "");
        let doc = SimpleNode::document(vec![SimpleNode::element("root")
            .with_namespace("", "urn:default")
            .with_child(child)]);
        let root = doc.children()[0].clone();
        let child = root.children()[0].clone();
        // the default namespace is visible on root
        assert!(root.namespaces().iter().any(|n| n.name().is_none()));
        // and undeclared again on child
        assert!(!child.namespaces().iter().any(|n| n.name().is_none()));
    }

    #[test]
    fn test_namespace_nodes_are_stable_and_ordered() {
        let doc = SimpleNode::document(vec![
            SimpleNode::element("e").with_namespace("p", "urn:p")
        ]);
        let element = doc.children()[0].clone();
        let first = element.namespaces();
        let second = element.namespaces();
        assert_eq!(first, second);
        // namespace nodes come after their element
        assert_eq!(
            element.document_order(&first[0]),
            Ordering::Less
        );
    }
}
