//! Path evaluation: axes, node tests, predicates, document order.

use ahash::AHashSet;

use xpq_ast::ast::{Axis, AxisStep, ExprS, NameTest, NodeTest, PathExpr, Step, StepS};

use crate::context::DynamicContext;
use crate::error::{Error, Result};
use crate::sequence::{Item, Sequence};
use crate::xml::{Node, NodeKind};

use super::matching::matches_kind_test;
use super::evaluate;

pub(crate) fn evaluate_path<N: Node>(
    path: &PathExpr,
    context: &DynamicContext<N>,
) -> Result<Sequence<N>> {
    let mut sequence: Sequence<N>;
    let mut steps: &[StepS] = &path.steps;
    if path.absolute {
        let node = context.context_item()?.to_node()?;
        sequence = Sequence::from_node(node.root());
        if steps.is_empty() {
            return Ok(sequence);
        }
    } else {
        let (first, rest) = match steps.split_first() {
            Some(split) => split,
            None => return Ok(Sequence::empty()),
        };
        sequence = normalize_step_result(evaluate_step(first, context)?)?;
        steps = rest;
    }
    for step in steps {
        let input = sequence.into_items();
        let size = input.len();
        let mut output = Sequence::empty();
        for (index, item) in input.iter().enumerate() {
            let focus = context.with_focus(item.clone(), index + 1, size);
            output.extend(evaluate_step(step, &focus)?);
        }
        sequence = normalize_step_result(output)?;
    }
    Ok(sequence)
}

fn evaluate_step<N: Node>(step: &StepS, context: &DynamicContext<N>) -> Result<Sequence<N>> {
    match &step.value {
        Step::Expr(expr) => evaluate(expr, context),
        Step::Axis(axis_step) => evaluate_axis_step(axis_step, context),
    }
}

fn evaluate_axis_step<N: Node>(
    step: &AxisStep,
    context: &DynamicContext<N>,
) -> Result<Sequence<N>> {
    let node = context.context_item()?.to_node()?;
    let candidates = axis_nodes(step.axis, &node);
    let tested: Vec<Item<N>> = candidates
        .into_iter()
        .filter(|candidate| matches_node_test(&step.node_test, candidate, step.axis, context))
        .map(Item::Node)
        .collect();
    let filtered = apply_predicates(tested, &step.predicates, context)?;
    Ok(Sequence::from_items(filtered))
}

/// The nodes an axis delivers, in axis order (reverse axes are returned
/// nearest-first so predicate positions count by proximity).
fn axis_nodes<N: Node>(axis: Axis, node: &N) -> Vec<N> {
    match axis {
        Axis::Child => node.children(),
        Axis::Descendant => node.descendants(),
        Axis::DescendantOrSelf => {
            let mut nodes = vec![node.clone()];
            nodes.extend(node.descendants());
            nodes
        }
        Axis::Parent => node.parent().into_iter().collect(),
        Axis::Ancestor => node.ancestors(),
        Axis::AncestorOrSelf => {
            let mut nodes = vec![node.clone()];
            nodes.extend(node.ancestors());
            nodes
        }
        Axis::FollowingSibling => node.following_siblings(),
        Axis::PrecedingSibling => node.preceding_siblings(),
        Axis::Following => {
            let root = node.root();
            let mut nodes = vec![root.clone()];
            nodes.extend(root.descendants());
            nodes.retain(|candidate| {
                candidate.document_order(node) == std::cmp::Ordering::Greater
                    && !is_descendant_of(candidate, node)
            });
            nodes
        }
        Axis::Preceding => {
            let root = node.root();
            let mut nodes = vec![root.clone()];
            nodes.extend(root.descendants());
            nodes.retain(|candidate| {
                candidate.document_order(node) == std::cmp::Ordering::Less
                    && !is_ancestor_of(candidate, node)
            });
            nodes.reverse();
            nodes
        }
        Axis::Attribute => node.attributes(),
        Axis::Namespace => node.namespaces(),
        Axis::Self_ => vec![node.clone()],
    }
}

fn is_descendant_of<N: Node>(candidate: &N, node: &N) -> bool {
    candidate.ancestors().iter().any(|ancestor| ancestor == node)
}

fn is_ancestor_of<N: Node>(candidate: &N, node: &N) -> bool {
    node.ancestors().iter().any(|ancestor| ancestor == candidate)
}

/// The node kind a name test selects on this axis.
fn principal_node_kind(axis: Axis) -> NodeKind {
    match axis {
        Axis::Attribute => NodeKind::Attribute,
        Axis::Namespace => NodeKind::Namespace,
        _ => NodeKind::Element,
    }
}

fn matches_node_test<N: Node>(
    test: &NodeTest,
    node: &N,
    axis: Axis,
    context: &DynamicContext<N>,
) -> bool {
    match test {
        NodeTest::Kind(kind_test) => matches_kind_test(kind_test, node, context),
        NodeTest::Name(name_test) => {
            if node.kind() != principal_node_kind(axis) {
                return false;
            }
            match name_test {
                NameTest::Star => true,
                NameTest::Name(expected) => match node.name() {
                    Some(name) => name == expected.value,
                    None => false,
                },
                NameTest::LocalName(local) => match node.name() {
                    Some(name) => name.local_name() == local,
                    None => false,
                },
                NameTest::Namespace { uri, .. } => match node.name() {
                    Some(name) => name.namespace() == Some(uri.as_str()),
                    None => false,
                },
            }
        }
    }
}

/// Apply predicates left to right, each with a fresh position/size focus.
/// A numeric predicate value selects by position.
pub(crate) fn apply_predicates<N: Node>(
    items: Vec<Item<N>>,
    predicates: &[ExprS],
    context: &DynamicContext<N>,
) -> Result<Vec<Item<N>>> {
    let mut current = items;
    for predicate in predicates {
        let size = current.len();
        let mut kept = Vec::with_capacity(current.len());
        for (index, item) in current.into_iter().enumerate() {
            let focus = context.with_focus(item.clone(), index + 1, size);
            let value = evaluate(predicate, &focus)?;
            if predicate_holds(&value, index + 1)? {
                kept.push(item);
            }
        }
        current = kept;
    }
    Ok(current)
}

fn predicate_holds<N: Node>(value: &Sequence<N>, position: usize) -> Result<bool> {
    if value.len() == 1 {
        if let Item::Atomic(atomic) = &value.items()[0] {
            if atomic.is_numeric() {
                return Ok(atomic.number_value() == position as f64);
            }
        }
    }
    value.effective_boolean_value()
}

/// A step result containing nodes is deduplicated by identity and sorted
/// into document order; node and non-node items may not mix.
pub(crate) fn normalize_step_result<N: Node>(sequence: Sequence<N>) -> Result<Sequence<N>> {
    let any_nodes = sequence.iter().any(|item| matches!(item, Item::Node(_)));
    if !any_nodes {
        return Ok(sequence);
    }
    if sequence.iter().any(|item| !matches!(item, Item::Node(_))) {
        return Err(Error::XPTY0004);
    }
    let nodes = sequence.nodes()?;
    Ok(Sequence::from_nodes(sorted_distinct(nodes)))
}

/// Deduplicate by node identity and sort into document order.
pub(crate) fn sorted_distinct<N: Node>(nodes: Vec<N>) -> Vec<N> {
    let mut seen: AHashSet<u64> = AHashSet::with_capacity(nodes.len());
    let mut distinct: Vec<N> = Vec::with_capacity(nodes.len());
    for node in nodes {
        if seen.insert(node.node_id()) {
            distinct.push(node);
        }
    }
    distinct.sort_by(|a, b| a.document_order(b));
    distinct
}
