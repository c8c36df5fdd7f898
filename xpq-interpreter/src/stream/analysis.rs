use xpq_ast::ast::{
    ArrayConstructor, Axis, Expr, ExprS, KeySpecifier, PathExpr, Step, TemplateSegment,
};

/// How an expression moves through the input tree, best to worst.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Posture {
    /// Touches no nodes beyond the context item itself.
    Motionless,
    /// Navigates strictly downward; streamable without buffering.
    Grounded,
    /// Navigates upward or filters; streamable with buffering.
    Consuming,
    /// Navigates freely across the document; not streamable.
    Roaming,
}

/// The direction of navigation implied by a posture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sweep {
    None,
    Downward,
    Upward,
    Free,
}

/// The streamability classification of an expression.
#[derive(Debug, Clone, PartialEq)]
pub struct Streamability {
    pub posture: Posture,
    pub sweep: Sweep,
    pub streamable: bool,
    pub requires_buffering: bool,
    /// Relative working-set estimate in `[0, 1]`.
    pub memory_footprint: f64,
    /// Present exactly when the expression is not streamable.
    pub reason: Option<String>,
}

impl Streamability {
    fn motionless() -> Self {
        Self {
            posture: Posture::Motionless,
            sweep: Sweep::None,
            streamable: true,
            requires_buffering: false,
            memory_footprint: 0.0,
            reason: None,
        }
    }

    fn from_posture(posture: Posture, footprint: f64, reason: Option<String>) -> Self {
        match posture {
            Posture::Motionless => Self {
                memory_footprint: footprint.min(0.49),
                ..Self::motionless()
            },
            Posture::Grounded => Self {
                posture,
                sweep: Sweep::Downward,
                streamable: true,
                requires_buffering: false,
                memory_footprint: footprint.clamp(0.1, 0.49),
                reason: None,
            },
            Posture::Consuming => Self {
                posture,
                sweep: Sweep::Upward,
                streamable: true,
                requires_buffering: true,
                memory_footprint: footprint.clamp(0.5, 0.9),
                reason: None,
            },
            Posture::Roaming => Self {
                posture,
                sweep: Sweep::Free,
                streamable: false,
                requires_buffering: true,
                memory_footprint: 1.0,
                reason: Some(
                    reason.unwrap_or_else(|| "expression requires free navigation".to_string()),
                ),
            },
        }
    }
}

/// Classify an expression. A pure fold: the worst posture among
/// sub-expressions dominates, so replacing a sub-expression with a worse
/// one can never improve the result.
pub fn analyze(expr: &ExprS) -> Streamability {
    match &expr.value {
        Expr::Literal(_)
        | Expr::VarRef(_)
        | Expr::ContextItem
        | Expr::NamedFunctionRef(_)
        | Expr::InlineFunction(_) => Streamability::motionless(),
        Expr::Sequence(items) => combine(items.iter().map(analyze)),
        Expr::Unary(_, operand) => analyze(operand),
        Expr::Binary(binary) => combine([analyze(&binary.left), analyze(&binary.right)]),
        Expr::SimpleMap(left, right) => combine([analyze(left), analyze(right)]),
        Expr::Arrow(arrow) => {
            let mut parts = vec![analyze(&arrow.target)];
            parts.extend(arrow.call.args.iter().map(analyze));
            raise_for_function(arrow.call.name.value.local_name(), combine(parts))
        }
        Expr::If(if_expr) => combine([
            analyze(&if_expr.condition),
            analyze(&if_expr.then),
            analyze(&if_expr.else_),
        ]),
        Expr::Let(let_expr) => {
            let mut parts: Vec<Streamability> = let_expr
                .bindings
                .iter()
                .map(|b| analyze(&b.expr))
                .collect();
            parts.push(analyze(&let_expr.return_expr));
            combine(parts)
        }
        Expr::For(for_expr) => {
            let mut parts: Vec<Streamability> = for_expr
                .bindings
                .iter()
                .map(|b| analyze(&b.expr))
                .collect();
            parts.push(analyze(&for_expr.return_expr));
            combine(parts)
        }
        Expr::Quantified(quantified) => {
            let mut parts: Vec<Streamability> = quantified
                .bindings
                .iter()
                .map(|b| analyze(&b.expr))
                .collect();
            parts.push(analyze(&quantified.satisfies));
            combine(parts)
        }
        Expr::Switch(switch) => {
            let mut parts = vec![analyze(&switch.operand)];
            for case in &switch.cases {
                parts.extend(case.operands.iter().map(analyze));
                parts.push(analyze(&case.return_expr));
            }
            parts.push(analyze(&switch.default));
            combine(parts)
        }
        Expr::FunctionCall(call) => {
            let args = combine(call.args.iter().map(analyze));
            raise_for_function(call.name.value.local_name(), args)
        }
        Expr::Path(path) => analyze_path(path),
        Expr::Filter(filter) => {
            let mut parts = vec![analyze(&filter.primary)];
            parts.extend(filter.predicates.iter().map(analyze));
            let combined = combine(parts);
            // filtering holds items back until the predicate decides
            raise_to(combined, Posture::Consuming)
        }
        Expr::DynamicCall(call) => {
            let mut parts = vec![analyze(&call.base)];
            parts.extend(call.args.iter().map(analyze));
            raise_to(combine(parts), Posture::Consuming)
        }
        Expr::MapConstructor(constructor) => combine(
            constructor
                .entries
                .iter()
                .flat_map(|entry| [analyze(&entry.key), analyze(&entry.value)]),
        ),
        Expr::ArrayConstructor(constructor) => match constructor {
            ArrayConstructor::Square(members) => combine(members.iter().map(analyze)),
            ArrayConstructor::Curly(Some(body)) => analyze(body),
            ArrayConstructor::Curly(None) => Streamability::motionless(),
        },
        Expr::Lookup(lookup) => {
            let mut parts = vec![analyze(&lookup.base)];
            if let KeySpecifier::Expr(key) = &lookup.key {
                parts.push(analyze(key));
            }
            combine(parts)
        }
        Expr::UnaryLookup(key) => match key {
            KeySpecifier::Expr(key) => analyze(key),
            _ => Streamability::motionless(),
        },
        Expr::StringTemplate(segments) => combine(segments.iter().filter_map(|s| match s {
            TemplateSegment::Text(_) => None,
            TemplateSegment::Expr(expr) => Some(analyze(expr)),
        })),
        Expr::Cast(cast) | Expr::Castable(cast) => analyze(&cast.expr),
        Expr::Treat(treat) | Expr::InstanceOf(treat) => analyze(&treat.expr),
    }
}

// functions that only inspect values already produced downstream
const STREAMABLE_FUNCTIONS: &[&str] = &[
    "string", "concat", "contains", "boolean", "not", "true", "false", "count", "empty", "exists",
];
const AGGREGATE_FUNCTIONS: &[&str] = &["sum", "avg", "min", "max"];

fn raise_for_function(local_name: &str, args: Streamability) -> Streamability {
    if args.posture == Posture::Motionless {
        return args;
    }
    if STREAMABLE_FUNCTIONS.contains(&local_name) {
        raise_to(args, Posture::Grounded)
    } else if AGGREGATE_FUNCTIONS.contains(&local_name) {
        raise_to(args, Posture::Consuming)
    } else {
        raise_to(args, Posture::Consuming)
    }
}

fn analyze_path(path: &PathExpr) -> Streamability {
    if path.absolute {
        return Streamability::from_posture(
            Posture::Roaming,
            1.0,
            Some("absolute paths restart navigation at the document root".to_string()),
        );
    }
    combine(path.steps.iter().map(|step| match &step.value {
        Step::Expr(expr) => analyze(expr),
        Step::Axis(axis_step) => {
            let mut result = axis_streamability(axis_step.axis);
            if !axis_step.predicates.is_empty() {
                let mut parts = vec![result.clone()];
                parts.extend(axis_step.predicates.iter().map(analyze));
                result = raise_to(combine(parts), Posture::Consuming);
            }
            result
        }
    }))
}

fn axis_streamability(axis: Axis) -> Streamability {
    match axis {
        Axis::Self_ => Streamability::motionless(),
        Axis::Child
        | Axis::Descendant
        | Axis::DescendantOrSelf
        | Axis::Attribute
        | Axis::Namespace => Streamability::from_posture(Posture::Grounded, 0.3, None),
        Axis::Parent | Axis::Ancestor | Axis::AncestorOrSelf => {
            Streamability::from_posture(Posture::Consuming, 0.6, None)
        }
        Axis::Following | Axis::Preceding | Axis::FollowingSibling | Axis::PrecedingSibling => {
            Streamability::from_posture(
                Posture::Roaming,
                1.0,
                Some(format!(
                    "the {}:: axis navigates across document order",
                    axis.as_str()
                )),
            )
        }
    }
}

/// Composition: the worst posture dominates, footprints take the max,
/// the first roaming reason survives.
fn combine(parts: impl IntoIterator<Item = Streamability>) -> Streamability {
    let mut worst = Streamability::motionless();
    let mut footprint = 0.0f64;
    let mut reason = None;
    for part in parts {
        footprint = footprint.max(part.memory_footprint);
        if reason.is_none() {
            reason = part.reason.clone();
        }
        if part.posture > worst.posture {
            worst = part;
        }
    }
    let reason = if worst.posture == Posture::Roaming {
        reason.or(worst.reason)
    } else {
        None
    };
    Streamability::from_posture(worst.posture, footprint, reason)
}

fn raise_to(value: Streamability, floor: Posture) -> Streamability {
    if value.posture >= floor {
        value
    } else {
        Streamability::from_posture(floor, value.memory_footprint, value.reason)
    }
}

pub fn is_motionless(expr: &ExprS) -> bool {
    analyze(expr).posture == Posture::Motionless
}

pub fn is_grounded(expr: &ExprS) -> bool {
    analyze(expr).posture <= Posture::Grounded
}

pub fn is_streamable(expr: &ExprS) -> bool {
    analyze(expr).streamable
}

pub fn memory_footprint(expr: &ExprS) -> f64 {
    analyze(expr).memory_footprint
}

#[cfg(test)]
mod tests {
    use super::*;
    use xpq_ast::{parse_xpath, Version};
    use xpq_name::Namespaces;

    fn classify(source: &str) -> Streamability {
        let namespaces = Namespaces::default();
        let xpath = parse_xpath(source, Version::V3_1, &namespaces).unwrap();
        analyze(&xpath.0)
    }

    #[test]
    fn test_motionless() {
        for source in ["1", "$x", ".", "1 + 2", "$a and $b", "self::node()", "not(1)"] {
            let report = classify(source);
            assert_eq!(report.posture, Posture::Motionless, "{source}");
            assert!(report.streamable);
            assert!(!report.requires_buffering);
        }
    }

    #[test]
    fn test_grounded_downward_chain() {
        let report = classify("child::div/child::p");
        assert_eq!(report.posture, Posture::Grounded);
        assert_eq!(report.sweep, Sweep::Downward);
        assert!(report.streamable);
        assert!(!report.requires_buffering);
        assert!(report.memory_footprint < 0.5);
    }

    #[test]
    fn test_streamable_function_over_grounded_input() {
        let report = classify("count(child::item)");
        assert_eq!(report.posture, Posture::Grounded);
    }

    #[test]
    fn test_consuming() {
        for source in ["parent::node()", "ancestor::div", "sum(child::price)"] {
            let report = classify(source);
            assert_eq!(report.posture, Posture::Consuming, "{source}");
            assert!(report.streamable);
            assert!(report.requires_buffering);
            assert!(report.memory_footprint > 0.0 && report.memory_footprint < 1.0);
        }
    }

    #[test]
    fn test_predicates_consume() {
        let report = classify("child::item[2]");
        assert_eq!(report.posture, Posture::Consuming);
    }

    #[test]
    fn test_roaming() {
        for source in ["following::*", "preceding-sibling::item", "/child::doc"] {
            let report = classify(source);
            assert_eq!(report.posture, Posture::Roaming, "{source}");
            assert_eq!(report.sweep, Sweep::Free);
            assert!(!report.streamable);
            assert_eq!(report.memory_footprint, 1.0);
            assert!(report.reason.is_some());
        }
    }

    #[test]
    fn test_worst_posture_dominates() {
        let grounded = classify("child::a/child::b");
        let with_roaming = classify("child::a/following::b");
        assert!(with_roaming.posture > grounded.posture);
        assert_eq!(with_roaming.posture, Posture::Roaming);
    }

    #[test]
    fn test_monotone_composition() {
        // wrapping a worse sub-expression never improves the outer posture
        let inner_good = classify("count(child::item)");
        let inner_bad = classify("count(following::item)");
        assert!(inner_bad.posture >= inner_good.posture);
        let footprint_good = classify("string(child::a)").memory_footprint;
        let footprint_bad = classify("string(following::a)").memory_footprint;
        assert!(footprint_bad >= footprint_good);
    }

    #[test]
    fn test_helpers() {
        let namespaces = Namespaces::default();
        let xpath = parse_xpath("child::p", Version::V3_1, &namespaces).unwrap();
        assert!(is_grounded(&xpath.0));
        assert!(is_streamable(&xpath.0));
        assert!(!is_motionless(&xpath.0));
        assert!(memory_footprint(&xpath.0) < 0.5);
    }
}
