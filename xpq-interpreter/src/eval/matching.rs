//! Sequence type matching for `instance of`, `treat as` and declared
//! variable and parameter types.

use xpq_ast::types::{
    ArrayTest, FunctionTest, ItemType, KindTest, MapTest, NameOrWildcard, Occurrence, SequenceType,
};
use xpq_name::Name;
use xpq_schema_type::Xs;

use crate::context::DynamicContext;
use crate::function::Function;
use crate::sequence::{Item, Sequence};
use crate::xml::{Node, NodeKind};

pub fn matches_sequence_type<N: Node>(
    sequence: &Sequence<N>,
    sequence_type: &SequenceType,
    context: &DynamicContext<N>,
) -> bool {
    match sequence_type {
        SequenceType::Empty => sequence.is_empty(),
        SequenceType::Item {
            item_type,
            occurrence,
        } => {
            let count_ok = match occurrence {
                Occurrence::One => sequence.len() == 1,
                Occurrence::Optional => sequence.len() <= 1,
                Occurrence::Many => true,
                Occurrence::NonEmpty => !sequence.is_empty(),
            };
            count_ok
                && sequence
                    .iter()
                    .all(|item| matches_item_type(item, item_type, context))
        }
    }
}

pub fn matches_item_type<N: Node>(
    item: &Item<N>,
    item_type: &ItemType,
    context: &DynamicContext<N>,
) -> bool {
    match item_type {
        ItemType::AnyItem => true,
        ItemType::Atomic(xs) => match item {
            Item::Atomic(atomic) => atomic.schema_type().derives_from(*xs),
            _ => false,
        },
        ItemType::Kind(kind_test) => match item {
            Item::Node(node) => matches_kind_test(kind_test, node, context),
            _ => false,
        },
        ItemType::Function(function_test) => match item {
            Item::Function(function) => matches_function_test(function, function_test),
            _ => false,
        },
        ItemType::Map(map_test) => match item {
            Item::Function(Function::Map(map)) => match map_test {
                MapTest::Any => true,
                MapTest::Typed { key, value } => map.entries().iter().all(|(k, v)| {
                    k.schema_type().derives_from(*key)
                        && matches_sequence_type(v, value, context)
                }),
            },
            _ => false,
        },
        ItemType::Array(array_test) => match item {
            Item::Function(Function::Array(array)) => match array_test {
                ArrayTest::Any => true,
                ArrayTest::Typed(member_type) => array
                    .members()
                    .iter()
                    .all(|member| matches_sequence_type(member, member_type, context)),
            },
            _ => false,
        },
        ItemType::Union(members) => members
            .iter()
            .any(|member| matches_item_type(item, member, context)),
    }
}

fn matches_function_test<N: Node>(function: &Function<N>, test: &FunctionTest) -> bool {
    match test {
        FunctionTest::Any => true,
        FunctionTest::Typed { params, .. } => match function {
            Function::Named { arity, .. } => *arity as usize == params.len(),
            Function::Inline(inline) => inline.params.len() == params.len(),
            Function::Map(_) | Function::Array(_) => params.len() == 1,
        },
    }
}

pub fn matches_kind_test<N: Node>(
    kind_test: &KindTest,
    node: &N,
    context: &DynamicContext<N>,
) -> bool {
    match kind_test {
        KindTest::Any => true,
        KindTest::Text => node.kind() == NodeKind::Text,
        KindTest::Comment => node.kind() == NodeKind::Comment,
        KindTest::NamespaceNode => node.kind() == NodeKind::Namespace,
        KindTest::PI(target) => {
            node.kind() == NodeKind::ProcessingInstruction
                && match target {
                    None => true,
                    Some(target) => node
                        .name()
                        .map(|name| name.local_name() == target)
                        .unwrap_or(false),
                }
        }
        KindTest::Document(inner) => {
            if node.kind() != NodeKind::Document {
                return false;
            }
            match inner {
                None => true,
                Some(element_test) => {
                    let elements: Vec<N> = node
                        .children()
                        .into_iter()
                        .filter(|child| child.kind() == NodeKind::Element)
                        .collect();
                    elements.len() == 1 && matches_kind_test(element_test, &elements[0], context)
                }
            }
        }
        KindTest::Element(name, type_name) => {
            node.kind() == NodeKind::Element
                && matches_name_or_wildcard(name, node)
                && matches_type_annotation(type_name, node, context)
        }
        KindTest::Attribute(name, type_name) => {
            node.kind() == NodeKind::Attribute
                && matches_name_or_wildcard(name, node)
                && matches_type_annotation(type_name, node, context)
        }
    }
}

fn matches_name_or_wildcard<N: Node>(test: &Option<NameOrWildcard>, node: &N) -> bool {
    match test {
        None | Some(NameOrWildcard::Wildcard) => true,
        Some(NameOrWildcard::Name(expected)) => match node.name() {
            Some(name) => name == expected.value,
            None => false,
        },
    }
}

/// A declared type in an element/attribute test matches through the
/// annotation table: exact name match, or derivation when both names
/// resolve in the XML Schema namespace.
fn matches_type_annotation<N: Node>(
    type_name: &Option<xpq_ast::Spanned<Name>>,
    node: &N,
    context: &DynamicContext<N>,
) -> bool {
    let expected = match type_name {
        None => return true,
        Some(name) => &name.value,
    };
    let annotation = match context.annotations().get(node) {
        Some(annotation) => annotation,
        None => return false,
    };
    if &annotation == expected {
        return true;
    }
    let annotated = Xs::by_name(annotation.namespace(), annotation.local_name());
    let wanted = Xs::by_name(expected.namespace(), expected.local_name());
    match (annotated, wanted) {
        (Some(a), Some(b)) => a.derives_from(b),
        _ => false,
    }
}
