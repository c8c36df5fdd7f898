//! Sequences and the items inside them.
//!
//! Every evaluation result is a [`Sequence`]; a single item and the
//! sequence containing it are interchangeable through the accessors here,
//! scalars are never smuggled around on their own.

use crate::atomic::Atomic;
use crate::error::{Error, Result};
use crate::function::Function;
use crate::xml::Node;

/// One item of a sequence.
#[derive(Debug, Clone, PartialEq)]
pub enum Item<N: Node> {
    Atomic(Atomic),
    Node(N),
    Function(Function<N>),
}

impl<N: Node> Item<N> {
    pub fn to_atomic(&self) -> Result<Atomic> {
        match self {
            Item::Atomic(a) => Ok(a.clone()),
            Item::Node(n) => Ok(Atomic::untyped(n.string_value())),
            Item::Function(_) => Err(Error::XPTY0004),
        }
    }

    pub fn to_node(&self) -> Result<N> {
        match self {
            Item::Node(n) => Ok(n.clone()),
            _ => Err(Error::XPTY0004),
        }
    }

    pub fn to_function(&self) -> Result<Function<N>> {
        match self {
            Item::Function(f) => Ok(f.clone()),
            _ => Err(Error::XPTY0004),
        }
    }

    pub fn effective_boolean_value(&self) -> Result<bool> {
        match self {
            Item::Atomic(a) => a.effective_boolean_value(),
            Item::Node(_) => Ok(true),
            Item::Function(_) => Err(Error::FORG0006),
        }
    }

    /// The string value used by templates and `fn:string`.
    pub fn string_value(&self) -> Result<String> {
        match self {
            Item::Atomic(a) => Ok(a.into_canonical()),
            Item::Node(n) => Ok(n.string_value()),
            Item::Function(_) => Err(Error::XPTY0004),
        }
    }
}

/// A finite ordered sequence of items; the universal value shape.
#[derive(Debug, Clone, PartialEq)]
pub struct Sequence<N: Node> {
    items: Vec<Item<N>>,
}

impl<N: Node> Default for Sequence<N> {
    fn default() -> Self {
        Sequence::empty()
    }
}

impl<N: Node> Sequence<N> {
    pub fn empty() -> Self {
        Sequence { items: Vec::new() }
    }

    pub fn one(item: Item<N>) -> Self {
        Sequence { items: vec![item] }
    }

    pub fn from_atomic(atomic: Atomic) -> Self {
        Sequence::one(Item::Atomic(atomic))
    }

    pub fn from_node(node: N) -> Self {
        Sequence::one(Item::Node(node))
    }

    pub fn from_items(items: Vec<Item<N>>) -> Self {
        Sequence { items }
    }

    pub fn from_nodes(nodes: Vec<N>) -> Self {
        Sequence {
            items: nodes.into_iter().map(Item::Node).collect(),
        }
    }

    pub fn from_bool(value: bool) -> Self {
        Sequence::from_atomic(Atomic::Boolean(value))
    }

    pub fn items(&self) -> &[Item<N>] {
        &self.items
    }

    pub fn into_items(self) -> Vec<Item<N>> {
        self.items
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Item<N>> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn push(&mut self, item: Item<N>) {
        self.items.push(item);
    }

    pub fn extend(&mut self, other: Sequence<N>) {
        self.items.extend(other.items);
    }

    /// Exactly one item, or `XPTY0004`.
    pub fn singleton(&self) -> Result<&Item<N>> {
        if self.items.len() == 1 {
            Ok(&self.items[0])
        } else {
            Err(Error::XPTY0004)
        }
    }

    /// At most one item.
    pub fn optional(&self) -> Result<Option<&Item<N>>> {
        match self.items.len() {
            0 => Ok(None),
            1 => Ok(Some(&self.items[0])),
            _ => Err(Error::XPTY0004),
        }
    }

    /// Atomization: nodes yield their untyped value, arrays flatten into
    /// their atomized members, other functions are an error.
    pub fn atomized(&self) -> Result<Vec<Atomic>> {
        let mut result = Vec::with_capacity(self.items.len());
        for item in &self.items {
            atomize_item(item, &mut result)?;
        }
        Ok(result)
    }

    /// Atomize a sequence expected to hold at most one value; for
    /// multi-item sequences the first item is used, as the arithmetic
    /// rules require.
    pub fn atomized_first(&self) -> Result<Option<Atomic>> {
        match self.items.first() {
            None => Ok(None),
            Some(item) => {
                let mut result = Vec::with_capacity(1);
                atomize_item(item, &mut result)?;
                Ok(result.into_iter().next())
            }
        }
    }

    /// The effective boolean value of the whole sequence.
    pub fn effective_boolean_value(&self) -> Result<bool> {
        match self.items.len() {
            0 => Ok(false),
            _ => {
                if matches!(self.items[0], Item::Node(_)) {
                    return Ok(true);
                }
                if self.items.len() > 1 {
                    return Err(Error::FORG0006);
                }
                self.items[0].effective_boolean_value()
            }
        }
    }

    /// All items as nodes, or `XPTY0004` when any is not a node.
    pub fn nodes(&self) -> Result<Vec<N>> {
        self.items.iter().map(|item| item.to_node()).collect()
    }
}

fn atomize_item<N: Node>(item: &Item<N>, into: &mut Vec<Atomic>) -> Result<()> {
    match item {
        Item::Atomic(a) => into.push(a.clone()),
        Item::Node(n) => into.push(Atomic::untyped(n.string_value())),
        Item::Function(Function::Array(array)) => {
            for member in array.members() {
                for atomic in member.atomized()? {
                    into.push(atomic);
                }
            }
        }
        Item::Function(_) => return Err(Error::XPTY0004),
    }
    Ok(())
}

impl<N: Node> IntoIterator for Sequence<N> {
    type Item = Item<N>;
    type IntoIter = std::vec::IntoIter<Item<N>>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<N: Node> From<Vec<Item<N>>> for Sequence<N> {
    fn from(items: Vec<Item<N>>) -> Self {
        Sequence { items }
    }
}
