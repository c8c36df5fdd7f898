//! Out-of-band node type annotations.
//!
//! Annotations are keyed by the host-provided opaque node identity, so
//! they never pin a node's lifetime. Hosts that free nodes call
//! [`TypeAnnotations::clear`] for them.

use std::cell::RefCell;

use ahash::AHashMap;

use xpq_name::Name;

use crate::xml::Node;

#[derive(Debug, Default)]
pub struct TypeAnnotations {
    table: RefCell<AHashMap<u64, Name>>,
}

impl TypeAnnotations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set<N: Node>(&self, node: &N, type_name: Name) {
        self.table.borrow_mut().insert(node.node_id(), type_name);
    }

    pub fn get<N: Node>(&self, node: &N) -> Option<Name> {
        self.table.borrow().get(&node.node_id()).cloned()
    }

    /// Drop the annotation for a node; the host calls this when the node
    /// is discarded.
    pub fn clear<N: Node>(&self, node: &N) {
        self.table.borrow_mut().remove(&node.node_id());
    }

    pub fn clear_all(&self) {
        self.table.borrow_mut().clear();
    }

    pub fn len(&self) -> usize {
        self.table.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.borrow().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::simple::SimpleNode;
    use crate::xml::Node as _;

    #[test]
    fn test_annotations_by_identity() {
        let doc = SimpleNode::document(vec![SimpleNode::element("a")
            .with_child(SimpleNode::element("b"))]);
        let a = doc.children()[0].clone();
        let b = a.children()[0].clone();
        let annotations = TypeAnnotations::new();
        annotations.set(&a, Name::namespaced(xpq_schema_type::Xs::namespace(), "string"));
        assert!(annotations.get(&a).is_some());
        assert!(annotations.get(&b).is_none());
        annotations.clear(&a);
        assert!(annotations.is_empty());
    }
}
