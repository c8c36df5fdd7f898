//! Function items: maps, arrays, inline functions and named references.

use std::rc::Rc;

use ahash::AHashMap;
use ibig::IBig;

use xpq_ast::ast::{ExprS, Param};
use xpq_ast::types::SequenceType;
use xpq_name::Name;

use crate::atomic::Atomic;
use crate::context::DynamicContext;
use crate::error::{Error, Result};
use crate::sequence::{Item, Sequence};
use crate::xml::Node;

/// Variable bindings, shared by dynamic contexts and closures.
pub type Variables<N> = AHashMap<Name, Sequence<N>>;

/// Any function-typed item.
#[derive(Debug, Clone)]
pub enum Function<N: Node> {
    /// A reference to a named function, `fn:upper-case#1`.
    Named { name: Name, arity: u8 },
    Inline(Rc<InlineFunctionValue<N>>),
    Map(Map<N>),
    Array(Array<N>),
}

impl<N: Node> PartialEq for Function<N> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (
                Function::Named { name: a, arity: x },
                Function::Named { name: b, arity: y },
            ) => a == b && x == y,
            (Function::Inline(a), Function::Inline(b)) => Rc::ptr_eq(a, b),
            (Function::Map(a), Function::Map(b)) => a == b,
            (Function::Array(a), Function::Array(b)) => a == b,
            _ => false,
        }
    }
}

/// An inline function value: parameters, body and the variable bindings
/// captured at evaluation time.
#[derive(Debug)]
pub struct InlineFunctionValue<N: Node> {
    pub params: Vec<Param>,
    pub return_type: Option<SequenceType>,
    pub body: ExprS,
    pub closure: Variables<N>,
}

/// The string form under which map keys compare: atomized equality with
/// numbers and booleans normalized to their canonical string.
pub(crate) fn map_key(key: &Atomic) -> String {
    key.into_canonical()
}

/// An XPath map. Logically unordered, but construction order is kept for
/// enumeration (`?*`, `map:keys`).
#[derive(Debug, Clone)]
pub struct Map<N: Node> {
    inner: Rc<MapInner<N>>,
}

#[derive(Debug)]
struct MapInner<N: Node> {
    entries: Vec<(Atomic, Sequence<N>)>,
    index: AHashMap<String, usize>,
}

impl<N: Node> Map<N> {
    /// Build a map from key/value pairs. A duplicate key keeps its
    /// original position and takes the last written value.
    pub fn new(pairs: Vec<(Atomic, Sequence<N>)>) -> Map<N> {
        let mut entries: Vec<(Atomic, Sequence<N>)> = Vec::with_capacity(pairs.len());
        let mut index: AHashMap<String, usize> = AHashMap::with_capacity(pairs.len());
        for (key, value) in pairs {
            let normalized = map_key(&key);
            match index.get(&normalized) {
                Some(&at) => entries[at] = (key, value),
                None => {
                    index.insert(normalized, entries.len());
                    entries.push((key, value));
                }
            }
        }
        Map {
            inner: Rc::new(MapInner { entries, index }),
        }
    }

    pub fn get(&self, key: &Atomic) -> Option<&Sequence<N>> {
        self.inner
            .index
            .get(&map_key(key))
            .map(|&at| &self.inner.entries[at].1)
    }

    pub fn contains(&self, key: &Atomic) -> bool {
        self.inner.index.contains_key(&map_key(key))
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> Vec<Atomic> {
        self.inner.entries.iter().map(|(k, _)| k.clone()).collect()
    }

    /// Values in insertion order.
    pub fn values(&self) -> Vec<Sequence<N>> {
        self.inner.entries.iter().map(|(_, v)| v.clone()).collect()
    }

    pub fn entries(&self) -> &[(Atomic, Sequence<N>)] {
        &self.inner.entries
    }

    pub fn len(&self) -> usize {
        self.inner.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.entries.is_empty()
    }

    /// A copy of this map with one entry added or replaced.
    pub fn with_entry(&self, key: Atomic, value: Sequence<N>) -> Map<N> {
        let mut pairs = self.inner.entries.clone();
        pairs.push((key, value));
        Map::new(pairs)
    }
}

impl<N: Node> PartialEq for Map<N> {
    fn eq(&self, other: &Self) -> bool {
        if self.len() != other.len() {
            return false;
        }
        self.inner
            .entries
            .iter()
            .all(|(key, value)| other.get(key) == Some(value))
    }
}

/// An XPath array: ordered members, one sequence each, 1-indexed.
#[derive(Debug, Clone, PartialEq)]
pub struct Array<N: Node> {
    members: Rc<Vec<Sequence<N>>>,
}

impl<N: Node> Array<N> {
    pub fn new(members: Vec<Sequence<N>>) -> Array<N> {
        Array {
            members: Rc::new(members),
        }
    }

    pub fn members(&self) -> &[Sequence<N>] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// 1-based access; 0 and out-of-bounds raise `FOAY0001`.
    pub fn get(&self, index: &IBig) -> Result<&Sequence<N>> {
        if *index < IBig::from(1) || *index > IBig::from(self.members.len()) {
            return Err(Error::FOAY0001);
        }
        let at: usize = index
            .to_string()
            .parse()
            .map_err(|_| Error::FOAY0001)?;
        Ok(&self.members[at - 1])
    }

    /// All member values concatenated, nested arrays flattened deeply.
    pub fn flattened(&self) -> Result<Vec<Item<N>>> {
        let mut result = Vec::new();
        flatten_into(self, &mut result);
        Ok(result)
    }
}

fn flatten_into<N: Node>(array: &Array<N>, into: &mut Vec<Item<N>>) {
    for member in array.members() {
        for item in member.items() {
            match item {
                Item::Function(Function::Array(nested)) => flatten_into(nested, into),
                other => into.push(other.clone()),
            }
        }
    }
}

/// The calling context passed to built-in functions.
pub struct CallCtx<'a, N: Node> {
    pub context: &'a DynamicContext<N>,
}

pub type FunctionImpl<N> = fn(&CallCtx<'_, N>, &[Sequence<N>]) -> Result<Sequence<N>>;

struct Overload<N: Node> {
    min_args: usize,
    max_args: Option<usize>,
    implementation: FunctionImpl<N>,
}

/// Built-in and host functions, keyed by expanded name with per-entry
/// arity ranges; `concat` is variadic.
pub struct FunctionRegistry<N: Node> {
    entries: AHashMap<Name, Vec<Overload<N>>>,
}

impl<N: Node> Default for FunctionRegistry<N> {
    fn default() -> Self {
        FunctionRegistry {
            entries: AHashMap::new(),
        }
    }
}

impl<N: Node> FunctionRegistry<N> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &mut self,
        namespace: &str,
        local: &str,
        min_args: usize,
        max_args: Option<usize>,
        implementation: FunctionImpl<N>,
    ) {
        let name = Name::namespaced(namespace, local);
        self.entries.entry(name).or_default().push(Overload {
            min_args,
            max_args,
            implementation,
        });
    }

    /// Resolve by expanded name and argument count.
    pub fn resolve(&self, name: &Name, argc: usize) -> Result<FunctionImpl<N>> {
        let overloads = self.entries.get(name).ok_or(Error::XPST0017)?;
        overloads
            .iter()
            .find(|o| argc >= o.min_args && o.max_args.map(|max| argc <= max).unwrap_or(true))
            .map(|o| o.implementation)
            .ok_or(Error::XPST0017)
    }

    pub fn contains(&self, name: &Name) -> bool {
        self.entries.contains_key(name)
    }
}

impl<N: Node> std::fmt::Debug for FunctionRegistry<N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FunctionRegistry")
            .field("functions", &self.entries.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::simple::SimpleNode;

    type Seq = Sequence<SimpleNode>;

    #[test]
    fn test_map_last_write_wins_keeps_position() {
        let map: Map<SimpleNode> = Map::new(vec![
            (Atomic::string("a"), Seq::from_atomic(Atomic::integer(1))),
            (Atomic::string("b"), Seq::from_atomic(Atomic::integer(2))),
            (Atomic::string("a"), Seq::from_atomic(Atomic::integer(3))),
        ]);
        assert_eq!(map.len(), 2);
        assert_eq!(
            map.get(&Atomic::string("a")),
            Some(&Seq::from_atomic(Atomic::integer(3)))
        );
        let keys: Vec<String> = map.keys().iter().map(|k| k.into_canonical()).collect();
        assert_eq!(keys, vec!["a", "b"]);
    }

    #[test]
    fn test_map_keys_atomized_equality() {
        let map: Map<SimpleNode> = Map::new(vec![(
            Atomic::integer(1),
            Seq::from_atomic(Atomic::string("one")),
        )]);
        // the untyped string "1" normalizes to the same key
        assert!(map.contains(&Atomic::untyped("1")));
        assert!(!map.contains(&Atomic::string("2")));
    }

    #[test]
    fn test_array_bounds() {
        let array: Array<SimpleNode> = Array::new(vec![
            Seq::from_atomic(Atomic::integer(10)),
            Seq::from_atomic(Atomic::integer(20)),
        ]);
        assert_eq!(
            array.get(&IBig::from(2)).unwrap(),
            &Seq::from_atomic(Atomic::integer(20))
        );
        assert_eq!(array.get(&IBig::from(0)), Err(Error::FOAY0001));
        assert_eq!(array.get(&IBig::from(3)), Err(Error::FOAY0001));
    }

    #[test]
    fn test_array_flatten_is_deep() {
        let inner: Array<SimpleNode> =
            Array::new(vec![Seq::from_atomic(Atomic::integer(2))]);
        let outer: Array<SimpleNode> = Array::new(vec![
            Seq::from_atomic(Atomic::integer(1)),
            Seq::one(Item::Function(Function::Array(inner))),
        ]);
        let flat = outer.flattened().unwrap();
        assert_eq!(flat.len(), 2);
    }

    #[test]
    fn test_registry_arity_ranges() {
        fn zero(_: &CallCtx<'_, SimpleNode>, _: &[Seq]) -> Result<Seq> {
            Ok(Sequence::empty())
        }
        let mut registry: FunctionRegistry<SimpleNode> = FunctionRegistry::new();
        registry.register("urn:f", "variadic", 2, None, zero);
        let name = Name::namespaced("urn:f", "variadic");
        assert!(registry.resolve(&name, 2).is_ok());
        assert!(registry.resolve(&name, 9).is_ok());
        assert_eq!(registry.resolve(&name, 1), Err(Error::XPST0017));
        let missing = Name::namespaced("urn:f", "nope");
        assert_eq!(registry.resolve(&missing, 0), Err(Error::XPST0017));
    }
}
