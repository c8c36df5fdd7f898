use xpq_name::Name;
use xpq_schema_type::Xs;

use crate::span::Spanned;

/// The type of a sequence: either the empty sequence or an item type with
/// an occurrence indicator.
#[derive(Debug, Clone, PartialEq)]
pub enum SequenceType {
    Empty,
    Item {
        item_type: ItemType,
        occurrence: Occurrence,
    },
}

impl SequenceType {
    pub fn one(item_type: ItemType) -> Self {
        SequenceType::Item {
            item_type,
            occurrence: Occurrence::One,
        }
    }

    /// Whether the empty sequence satisfies this type.
    pub fn accepts_empty(&self) -> bool {
        match self {
            SequenceType::Empty => true,
            SequenceType::Item { occurrence, .. } => {
                matches!(occurrence, Occurrence::Optional | Occurrence::Many)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Occurrence {
    /// exactly one
    One,
    /// `?`
    Optional,
    /// `*`
    Many,
    /// `+`
    NonEmpty,
}

impl Occurrence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Occurrence::One => "",
            Occurrence::Optional => "?",
            Occurrence::Many => "*",
            Occurrence::NonEmpty => "+",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ItemType {
    /// `item()`
    AnyItem,
    Atomic(Xs),
    Kind(KindTest),
    Function(FunctionTest),
    Map(MapTest),
    Array(ArrayTest),
    /// A union of at least two member item types; a value matches if any
    /// member matches. Always built through [`ItemType::union`].
    Union(Vec<ItemType>),
}

impl ItemType {
    /// Build a union item type. Nested unions are flattened and duplicate
    /// members dropped; a union of one collapses to its member.
    pub fn union(members: Vec<ItemType>) -> ItemType {
        let mut flat: Vec<ItemType> = Vec::with_capacity(members.len());
        for member in members {
            match member {
                ItemType::Union(inner) => {
                    for item in inner {
                        if !flat.contains(&item) {
                            flat.push(item);
                        }
                    }
                }
                other => {
                    if !flat.contains(&other) {
                        flat.push(other);
                    }
                }
            }
        }
        if flat.len() == 1 {
            flat.into_iter().next().unwrap()
        } else {
            ItemType::Union(flat)
        }
    }
}

/// A node kind test, both in steps (`node()`, `element(p)`) and in
/// sequence types.
#[derive(Debug, Clone, PartialEq)]
pub enum KindTest {
    /// `node()`
    Any,
    /// `document-node(element-test?)`
    Document(Option<Box<KindTest>>),
    /// `element(name-or-*?, type?)`
    Element(Option<NameOrWildcard>, Option<Spanned<Name>>),
    /// `attribute(name-or-*?, type?)`
    Attribute(Option<NameOrWildcard>, Option<Spanned<Name>>),
    /// `processing-instruction(target?)`
    PI(Option<String>),
    Comment,
    Text,
    NamespaceNode,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NameOrWildcard {
    Name(Spanned<Name>),
    Wildcard,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FunctionTest {
    /// `function(*)`
    Any,
    Typed {
        params: Vec<SequenceType>,
        return_type: Box<SequenceType>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum MapTest {
    /// `map(*)`
    Any,
    Typed {
        key: Xs,
        value: Box<SequenceType>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum ArrayTest {
    /// `array(*)`
    Any,
    Typed(Box<SequenceType>),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_union_flattens_and_dedups() {
        let union = ItemType::union(vec![
            ItemType::Atomic(Xs::String),
            ItemType::Union(vec![
                ItemType::Atomic(Xs::Integer),
                ItemType::Atomic(Xs::String),
            ]),
            ItemType::Atomic(Xs::Integer),
        ]);
        match union {
            ItemType::Union(members) => {
                assert_eq!(
                    members,
                    vec![ItemType::Atomic(Xs::String), ItemType::Atomic(Xs::Integer)]
                );
            }
            other => panic!("expected union, got {:?}", other),
        }
    }

    #[test]
    fn test_union_of_one_collapses() {
        let union = ItemType::union(vec![
            ItemType::Atomic(Xs::String),
            ItemType::Atomic(Xs::String),
        ]);
        assert_eq!(union, ItemType::Atomic(Xs::String));
    }

    #[test]
    fn test_accepts_empty() {
        assert!(SequenceType::Empty.accepts_empty());
        assert!(SequenceType::Item {
            item_type: ItemType::AnyItem,
            occurrence: Occurrence::Many
        }
        .accepts_empty());
        assert!(!SequenceType::Item {
            item_type: ItemType::AnyItem,
            occurrence: Occurrence::NonEmpty
        }
        .accepts_empty());
    }
}
