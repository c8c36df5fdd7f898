//! The node abstraction the evaluator navigates.
//!
//! The node tree itself belongs to the host; the engine only consumes this
//! interface. [`simple`] provides an in-memory reference implementation
//! used by the test suite and by embedders without their own DOM.

pub mod simple;

use std::fmt::Debug;

use xpq_name::Name;

/// Node kinds, mirroring the numeric DOM codes hosts use
/// (1 element, 2 attribute, 3 text, 7 processing instruction, 8 comment,
/// 9 document, 13 namespace).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Element,
    Attribute,
    Text,
    ProcessingInstruction,
    Comment,
    Document,
    Namespace,
}

impl NodeKind {
    /// The DOM numeric code for this kind.
    pub fn code(&self) -> u8 {
        match self {
            NodeKind::Element => 1,
            NodeKind::Attribute => 2,
            NodeKind::Text => 3,
            NodeKind::ProcessingInstruction => 7,
            NodeKind::Comment => 8,
            NodeKind::Document => 9,
            NodeKind::Namespace => 13,
        }
    }

    pub fn from_code(code: u8) -> Option<NodeKind> {
        let kind = match code {
            1 => NodeKind::Element,
            2 => NodeKind::Attribute,
            3 => NodeKind::Text,
            7 => NodeKind::ProcessingInstruction,
            8 => NodeKind::Comment,
            9 => NodeKind::Document,
            13 => NodeKind::Namespace,
            _ => return None,
        };
        Some(kind)
    }
}

/// A node in a host tree.
///
/// Implementations are cheap to clone (a handle, not the subtree).
/// Equality is node identity. Namespace nodes carry the prefix as their
/// name, the namespace URI as their string value and the owning element as
/// their parent; `namespaces()` returns the full in-scope set with
/// inherited declarations, shadowing, the implicit `xml` binding and
/// `xmlns=""` undeclaration already applied.
pub trait Node: Clone + PartialEq + Debug {
    fn kind(&self) -> NodeKind;

    /// The node's name: element/attribute names, processing-instruction
    /// targets and namespace-node prefixes. `None` for the rest.
    fn name(&self) -> Option<Name>;

    /// The string value per the XPath data model.
    fn string_value(&self) -> String;

    fn parent(&self) -> Option<Self>;

    fn children(&self) -> Vec<Self>;

    fn attributes(&self) -> Vec<Self>;

    /// In-scope namespace nodes of an element; empty for other kinds.
    fn namespaces(&self) -> Vec<Self>;

    /// A stable opaque identity, unique across live nodes. Used for
    /// deduplication, `is` comparisons and the type-annotation table.
    fn node_id(&self) -> u64;

    /// Document order. Nodes from different trees order by tree identity;
    /// namespace nodes follow their element and precede its attributes.
    fn document_order(&self, other: &Self) -> std::cmp::Ordering;

    /// The root of the tree this node belongs to.
    fn root(&self) -> Self {
        let mut current = self.clone();
        while let Some(parent) = current.parent() {
            current = parent;
        }
        current
    }

    fn descendants(&self) -> Vec<Self> {
        let mut result = Vec::new();
        collect_descendants(self, &mut result);
        result
    }

    fn ancestors(&self) -> Vec<Self> {
        let mut result = Vec::new();
        let mut current = self.parent();
        while let Some(node) = current {
            current = node.parent();
            result.push(node);
        }
        result
    }

    fn following_siblings(&self) -> Vec<Self> {
        match self.parent() {
            Some(parent) => {
                let siblings = parent.children();
                match siblings.iter().position(|n| n == self) {
                    Some(index) => siblings[index + 1..].to_vec(),
                    None => Vec::new(),
                }
            }
            None => Vec::new(),
        }
    }

    fn preceding_siblings(&self) -> Vec<Self> {
        match self.parent() {
            Some(parent) => {
                let siblings = parent.children();
                match siblings.iter().position(|n| n == self) {
                    Some(index) => {
                        let mut preceding = siblings[..index].to_vec();
                        preceding.reverse();
                        preceding
                    }
                    None => Vec::new(),
                }
            }
            None => Vec::new(),
        }
    }
}

fn collect_descendants<N: Node>(node: &N, into: &mut Vec<N>) {
    for child in node.children() {
        into.push(child.clone());
        collect_descendants(&child, into);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_kind_codes_match_dom() {
        for (kind, code) in [
            (NodeKind::Element, 1),
            (NodeKind::Attribute, 2),
            (NodeKind::Text, 3),
            (NodeKind::ProcessingInstruction, 7),
            (NodeKind::Comment, 8),
            (NodeKind::Document, 9),
            (NodeKind::Namespace, 13),
        ] {
            assert_eq!(kind.code(), code);
            assert_eq!(NodeKind::from_code(code), Some(kind));
        }
        assert_eq!(NodeKind::from_code(4), None);
    }
}
