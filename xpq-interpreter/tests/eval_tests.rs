use std::rc::Rc;

use xpq_ast::{parse_xpath, Version};
use xpq_interpreter::atomic::Atomic;
use xpq_interpreter::context::{DynamicContext, DynamicContextBuilder, StaticContext};
use xpq_interpreter::error::Error;
use xpq_interpreter::function::Function;
use xpq_interpreter::sequence::{Item, Sequence};
use xpq_interpreter::xml::simple::SimpleNode;
use xpq_interpreter::xml::Node;
use xpq_interpreter::{evaluate, standard_registry};

type Seq = Sequence<SimpleNode>;

fn context() -> DynamicContext<SimpleNode> {
    DynamicContextBuilder::new(
        Rc::new(StaticContext::default()),
        Rc::new(standard_registry()),
    )
    .build()
}

fn context_with_node(node: SimpleNode) -> DynamicContext<SimpleNode> {
    DynamicContextBuilder::new(
        Rc::new(StaticContext::default()),
        Rc::new(standard_registry()),
    )
    .context_node(node)
    .build()
}

fn eval_in(source: &str, context: &DynamicContext<SimpleNode>) -> Result<Seq, Error> {
    let xpath = parse_xpath(
        source,
        Version::V3_1,
        context.static_context().namespaces(),
    )
    .unwrap_or_else(|e| panic!("parse failed for {source}: {e:?}"));
    evaluate(&xpath.0, context)
}

fn eval(source: &str) -> Result<Seq, Error> {
    eval_in(source, &context())
}

fn as_integer(seq: &Seq) -> i64 {
    match seq.singleton().unwrap() {
        Item::Atomic(Atomic::Integer(_, i)) => i.to_string().parse().unwrap(),
        other => panic!("expected integer, got {other:?}"),
    }
}

fn as_string(seq: &Seq) -> String {
    match seq.singleton().unwrap() {
        Item::Atomic(atomic) => atomic.into_canonical(),
        other => panic!("expected atomic, got {other:?}"),
    }
}

fn as_bool(seq: &Seq) -> bool {
    match seq.singleton().unwrap() {
        Item::Atomic(Atomic::Boolean(b)) => *b,
        other => panic!("expected boolean, got {other:?}"),
    }
}

fn integers(seq: &Seq) -> Vec<i64> {
    seq.iter()
        .map(|item| match item {
            Item::Atomic(Atomic::Integer(_, i)) => i.to_string().parse().unwrap(),
            other => panic!("expected integer, got {other:?}"),
        })
        .collect()
}

fn sample_tree() -> SimpleNode {
    SimpleNode::document(vec![SimpleNode::element("doc")
        .with_attribute("id", "d1")
        .with_child(
            SimpleNode::element("section")
                .with_attribute("name", "intro")
                .with_child(SimpleNode::element("p").with_text("one"))
                .with_child(SimpleNode::element("p").with_text("two")),
        )
        .with_child(
            SimpleNode::element("section")
                .with_attribute("name", "body")
                .with_child(SimpleNode::element("p").with_text("three")),
        )])
}

// --- arithmetic and logic -------------------------------------------------

#[test]
fn test_arithmetic() {
    assert_eq!(as_integer(&eval("(5 + 3) * 2 - 3").unwrap()), 13);
    assert_eq!(as_string(&eval("1 div 2").unwrap()), "0.5");
    assert_eq!(as_integer(&eval("7 idiv 2").unwrap()), 3);
    assert_eq!(as_integer(&eval("7 mod 3").unwrap()), 1);
}

#[test]
fn test_arithmetic_empty_operand_is_empty() {
    assert!(eval("() + 1").unwrap().is_empty());
    assert!(eval("1 * ()").unwrap().is_empty());
}

#[test]
fn test_non_numeric_string_is_nan() {
    let result = eval("\"pear\" + 1").unwrap();
    match result.singleton().unwrap() {
        Item::Atomic(atomic) => assert!(atomic.is_nan()),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn test_division_edges() {
    assert_eq!(as_string(&eval("1 div 0").unwrap()), "INF");
    assert_eq!(as_string(&eval("-1 div 0").unwrap()), "-INF");
    assert_eq!(eval("1 idiv 0"), Err(Error::XPDY0002));
    assert_eq!(eval("1 mod 0"), Err(Error::XPDY0002));
}

#[test]
fn test_logical_short_circuit_and_ebv() {
    assert!(as_bool(&eval("1 and \"x\"").unwrap()));
    assert!(!as_bool(&eval("0 or \"\"").unwrap()));
    // the right side would raise, but the left decides first
    assert!(as_bool(&eval("1 or (1,2)").unwrap()));
    assert_eq!(eval("(1, 2) and 1"), Err(Error::FORG0006));
}

// --- sequences ------------------------------------------------------------

#[test]
fn test_comma_flattens() {
    assert_eq!(integers(&eval("(1, (2, 3), ())").unwrap()), vec![1, 2, 3]);
}

#[test]
fn test_range() {
    assert_eq!(integers(&eval("1 to 4").unwrap()), vec![1, 2, 3, 4]);
    assert!(eval("4 to 1").unwrap().is_empty());
    assert_eq!(eval("1.5 to 2"), Err(Error::XPTY0004));
}

#[test]
fn test_let_sequential_bindings() {
    assert_eq!(
        as_integer(&eval("let $x := 5, $y := $x * 2 return $x + $y").unwrap()),
        15
    );
}

#[test]
fn test_for_cartesian_preserves_order() {
    assert_eq!(
        integers(&eval("for $x in (10, 20), $y in (1, 2) return $x + $y").unwrap()),
        vec![11, 12, 21, 22]
    );
}

#[test]
fn test_quantified() {
    assert!(as_bool(&eval("some $x in (1, 2, 3) satisfies $x = 2").unwrap()));
    assert!(!as_bool(&eval("every $x in (1, 2, 3) satisfies $x = 2").unwrap()));
    assert!(as_bool(&eval("every $x in () satisfies $x").unwrap()));
}

#[test]
fn test_simple_map() {
    assert_eq!(
        integers(&eval("(1, 2, 3) ! (. * 2)").unwrap()),
        vec![2, 4, 6]
    );
    // position and size are per item
    assert_eq!(
        integers(&eval("(5, 6, 7) ! position()").unwrap()),
        vec![1, 2, 3]
    );
}

#[test]
fn test_switch() {
    assert_eq!(
        as_string(
            &eval("switch (2) case 1 return \"one\" case 2 return \"two\" default return \"many\"")
                .unwrap()
        ),
        "two"
    );
    assert_eq!(
        as_string(&eval("switch (9) case 1 return \"one\" default return \"many\"").unwrap()),
        "many"
    );
}

#[test]
fn test_string_concat_operator() {
    assert_eq!(
        as_string(&eval("\"Hello\" || \" \" || \"World\"").unwrap()),
        "Hello World"
    );
    assert_eq!(as_string(&eval("() || \"x\"").unwrap()), "x");
}

// --- comparisons ----------------------------------------------------------

#[test]
fn test_general_comparison_is_existential() {
    assert!(as_bool(&eval("(1, 2, 3) = 2").unwrap()));
    assert!(!as_bool(&eval("(1, 2, 3) = 9").unwrap()));
    assert!(as_bool(&eval("(1, 2) != (1, 2)").unwrap()));
    assert!(as_bool(&eval("\"2\" = 2").unwrap()));
}

#[test]
fn test_value_comparison_cardinality() {
    assert!(as_bool(&eval("2 eq 2").unwrap()));
    assert_eq!(eval("(1, 2) eq 2"), Err(Error::XPTY0004));
    assert_eq!(eval("() eq 2"), Err(Error::XPTY0004));
}

// --- functions ------------------------------------------------------------

#[test]
fn test_core_function_library() {
    assert_eq!(as_integer(&eval("count((1, 2, 3))").unwrap()), 3);
    assert_eq!(as_string(&eval("concat(\"a\", \"b\", \"c\")").unwrap()), "abc");
    assert!(as_bool(&eval("contains(\"banana\", \"nan\")").unwrap()));
    assert_eq!(as_string(&eval("substring(\"12345\", 2, 3)").unwrap()), "234");
    assert_eq!(
        as_string(&eval("normalize-space(\"  a   b \")").unwrap()),
        "a b"
    );
    assert_eq!(
        as_string(&eval("translate(\"bar\", \"abc\", \"ABC\")").unwrap()),
        "BAr"
    );
    assert_eq!(as_integer(&eval("string-length(\"hello\")").unwrap()), 5);
    assert_eq!(as_integer(&eval("sum((1, 2, 3))").unwrap()), 6);
    assert_eq!(as_integer(&eval("floor(2.7)").unwrap()), 2);
    assert_eq!(as_integer(&eval("ceiling(2.1)").unwrap()), 3);
    assert_eq!(as_integer(&eval("round(2.5)").unwrap()), 3);
    assert_eq!(as_integer(&eval("round(-2.5)").unwrap()), -2);
    assert!(!as_bool(&eval("not(1)").unwrap()));
}

#[test]
fn test_unknown_function_and_wrong_arity() {
    assert_eq!(eval("no-such-function(1)"), Err(Error::XPST0017));
    assert_eq!(eval("count(1, 2)"), Err(Error::XPST0017));
}

#[test]
fn test_cardinality_functions() {
    assert_eq!(as_integer(&eval("zero-or-one((1))").unwrap()), 1);
    assert_eq!(eval("zero-or-one((1, 2))"), Err(Error::FORG0003));
    assert_eq!(eval("one-or-more(())"), Err(Error::FORG0004));
    assert_eq!(eval("exactly-one(())"), Err(Error::FORG0005));
    assert_eq!(eval("exactly-one((1, 2))"), Err(Error::FORG0005));
    assert_eq!(integers(&eval("unordered((3, 1, 2))").unwrap()), vec![3, 1, 2]);
}

#[test]
fn test_sequence_functions() {
    assert_eq!(
        integers(&eval("distinct-values((1, 2, 1, 3))").unwrap()),
        vec![1, 2, 3]
    );
    assert_eq!(integers(&eval("index-of((10, 20, 10), 10)").unwrap()), vec![1, 3]);
    assert_eq!(
        integers(&eval("insert-before((1, 2), 2, (9))").unwrap()),
        vec![1, 9, 2]
    );
    assert_eq!(integers(&eval("remove((1, 2, 3), 2)").unwrap()), vec![1, 3]);
    assert_eq!(integers(&eval("reverse((1, 2, 3))").unwrap()), vec![3, 2, 1]);
    assert_eq!(
        integers(&eval("subsequence((1, 2, 3, 4), 2, 2)").unwrap()),
        vec![2, 3]
    );
    assert_eq!(as_integer(&eval("head((7, 8, 9))").unwrap()), 7);
    assert_eq!(integers(&eval("tail((7, 8, 9))").unwrap()), vec![8, 9]);
    assert_eq!(integers(&eval("sort((3, 1, 2))").unwrap()), vec![1, 2, 3]);
}

#[test]
fn test_higher_order_functions() {
    assert_eq!(
        integers(&eval("for-each((1, 2, 3), function ($x) { $x * 10 })").unwrap()),
        vec![10, 20, 30]
    );
    assert_eq!(
        integers(&eval("filter((1, 2, 3, 4), function ($x) { $x mod 2 = 0 })").unwrap()),
        vec![2, 4]
    );
    assert_eq!(
        as_integer(&eval("fold-left((1, 2, 3), 0, function ($a, $b) { $a * 10 + $b })").unwrap()),
        123
    );
    assert_eq!(
        as_integer(&eval("fold-right((1, 2, 3), 0, function ($a, $b) { $a + $b })").unwrap()),
        6
    );
    assert_eq!(
        integers(
            &eval("for-each-pair((1, 2), (10, 20), function ($a, $b) { $a + $b })").unwrap()
        ),
        vec![11, 22]
    );
}

#[test]
fn test_named_function_references() {
    assert_eq!(
        integers(&eval("for-each((\"ab\", \"abc\"), string-length#1)").unwrap()),
        vec![2, 3]
    );
    assert_eq!(eval("no-such#1"), Err(Error::XPST0017));
}

#[test]
fn test_inline_function_closure() {
    assert_eq!(
        as_integer(&eval("let $n := 3 return (function ($x) { $x + $n })(4)").unwrap()),
        7
    );
}

#[test]
fn test_math_functions() {
    assert_eq!(as_string(&eval("math:sqrt(16)").unwrap()), "4");
    assert_eq!(as_string(&eval("math:pow(2, 10)").unwrap()), "1024");
    assert!(as_string(&eval("math:pi()").unwrap()).starts_with("3.14159"));
}

#[test]
fn test_constructor_functions_cast() {
    assert_eq!(as_integer(&eval("xs:integer(\"42\")").unwrap()), 42);
    assert_eq!(eval("xs:integer(\"x\")"), Err(Error::FORG0001));
    assert_eq!(eval("xs:byte(128)"), Err(Error::FORG0001));
}

// --- cast family ----------------------------------------------------------

#[test]
fn test_cast_expressions() {
    assert_eq!(as_integer(&eval("\"17\" cast as xs:integer").unwrap()), 17);
    assert!(as_bool(&eval("\"17\" castable as xs:integer").unwrap()));
    assert!(!as_bool(&eval("\"x\" castable as xs:integer").unwrap()));
    assert!(eval("() cast as xs:integer?").unwrap().is_empty());
    assert_eq!(eval("() cast as xs:integer"), Err(Error::XPTY0004));
}

#[test]
fn test_duration_cast_components() {
    let result = eval("\"P1Y2M3DT4H5M6S\" cast as xs:duration").unwrap();
    match result.singleton().unwrap() {
        Item::Atomic(Atomic::Duration(d)) => {
            assert_eq!(d.signed_months(), 2);
            assert!(!d.negative);
        }
        other => panic!("unexpected {other:?}"),
    }
    let negative = eval("\"-P1Y\" cast as xs:duration").unwrap();
    match negative.singleton().unwrap() {
        Item::Atomic(Atomic::Duration(d)) => {
            assert!(d.negative);
            assert_eq!(d.signed_years(), -1);
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn test_instance_of_and_treat() {
    assert!(as_bool(&eval("5 instance of xs:integer").unwrap()));
    assert!(as_bool(&eval("5 instance of xs:decimal").unwrap()));
    assert!(!as_bool(&eval("5.0 instance of xs:integer").unwrap()));
    assert!(as_bool(&eval("(1, 2) instance of xs:integer+").unwrap()));
    assert!(as_bool(&eval("5 instance of (xs:integer | xs:string)").unwrap()));
    assert!(as_bool(&eval("\"x\" instance of (xs:integer | xs:string)").unwrap()));
    assert_eq!(eval("\"x\" treat as xs:integer"), Err(Error::XPDY0050));
    assert_eq!(as_integer(&eval("5 treat as xs:integer").unwrap()), 5);
}

// --- maps and arrays --------------------------------------------------------

#[test]
fn test_map_last_write_wins() {
    assert_eq!(
        as_integer(&eval("map { \"a\": 1, \"b\": 2, \"a\": 3 }?a").unwrap()),
        3
    );
}

#[test]
fn test_map_enumeration_in_insertion_order() {
    let keys = eval("map:keys(map { \"z\": 1, \"a\": 2, \"m\": 3 })").unwrap();
    let keys: Vec<String> = keys
        .iter()
        .map(|item| match item {
            Item::Atomic(a) => a.into_canonical(),
            other => panic!("unexpected {other:?}"),
        })
        .collect();
    assert_eq!(keys, vec!["z", "a", "m"]);
    assert_eq!(
        integers(&eval("map { \"z\": 1, \"a\": 2 }?*").unwrap()),
        vec![1, 2]
    );
}

#[test]
fn test_map_numeric_keys_normalize() {
    assert_eq!(as_integer(&eval("map { 1: 10 }?1").unwrap()), 10);
    assert_eq!(as_integer(&eval("map { 1: 10 }(\"1\")").unwrap()), 10);
}

#[test]
fn test_array_semantics() {
    assert_eq!(as_integer(&eval("[10, 20, 30]?2").unwrap()), 20);
    assert_eq!(eval("[10, 20, 30]?0"), Err(Error::FOAY0001));
    assert_eq!(eval("[10]?2"), Err(Error::FOAY0001));
    // square arrays keep one member per operand
    assert_eq!(as_integer(&eval("array:size([(1, 2), 3])").unwrap()), 2);
    // curly arrays split the sequence
    assert_eq!(as_integer(&eval("array:size(array { 1 to 4 })").unwrap()), 4);
    assert_eq!(
        integers(&eval("[1, [2, 3], 4]?*").unwrap()),
        vec![1, 2, 3, 4]
    );
    assert_eq!(
        integers(&eval("array:flatten([[1, 2], [3]])").unwrap()),
        vec![1, 2, 3]
    );
}

#[test]
fn test_map_array_functions() {
    assert_eq!(as_integer(&eval("map:size(map { \"a\": 1 })").unwrap()), 1);
    assert!(as_bool(&eval("map:contains(map { \"a\": 1 }, \"a\")").unwrap()));
    assert_eq!(
        as_integer(&eval("map:get(map:put(map { }, \"k\", 9), \"k\")").unwrap()),
        9
    );
    assert_eq!(as_integer(&eval("array:get([5, 6], 1)").unwrap()), 5);
}

#[test]
fn test_unary_lookup_requires_map_or_array_context() {
    assert_eq!(
        integers(&eval("(map { \"a\": 1 }, map { \"a\": 2 }) ! ?a").unwrap()),
        vec![1, 2]
    );
    assert_eq!(eval("(1) ! ?a"), Err(Error::XPDY0002));
}

// --- string templates -------------------------------------------------------

#[test]
fn test_string_templates() {
    assert_eq!(as_string(&eval("`2 + 2 = {2 + 2}`").unwrap()), "2 + 2 = 4");
    assert_eq!(as_string(&eval("`empty: [{()}]`").unwrap()), "empty: []");
    assert_eq!(as_string(&eval("`{1 div 0}`").unwrap()), "INF");
    assert_eq!(as_string(&eval("`{-1 div 0}`").unwrap()), "-INF");
    assert_eq!(as_string(&eval("`{number(\"x\")}`").unwrap()), "NaN");
}

// --- paths ------------------------------------------------------------------

#[test]
fn test_path_navigation() {
    let context = context_with_node(sample_tree());
    let result = eval_in("/doc/section/p", &context).unwrap();
    assert_eq!(result.len(), 3);
    let texts: Vec<String> = result
        .iter()
        .map(|item| item.string_value().unwrap())
        .collect();
    assert_eq!(texts, vec!["one", "two", "three"]);
}

#[test]
fn test_descendant_shorthand_and_predicates() {
    let context = context_with_node(sample_tree());
    assert_eq!(eval_in("//p", &context).unwrap().len(), 3);
    let second = eval_in("//p[2]", &context).unwrap();
    assert_eq!(second.len(), 1);
    assert_eq!(second.items()[0].string_value().unwrap(), "two");
    let named = eval_in("//section[@name = \"body\"]/p", &context).unwrap();
    assert_eq!(named.len(), 1);
    assert_eq!(named.items()[0].string_value().unwrap(), "three");
    assert_eq!(
        eval_in("count(//section[last()]/p)", &context).unwrap(),
        eval_in("1", &context).unwrap()
    );
}

#[test]
fn test_path_results_are_document_ordered_and_distinct() {
    let context = context_with_node(sample_tree());
    // the union visits nodes twice; the result stays distinct and ordered
    let result = eval_in("(//p | //section/p)", &context).unwrap();
    assert_eq!(result.len(), 3);
    let nodes = result.nodes().unwrap();
    for window in nodes.windows(2) {
        assert_eq!(
            window[0].document_order(&window[1]),
            std::cmp::Ordering::Less
        );
    }
}

#[test]
fn test_set_operations() {
    let context = context_with_node(sample_tree());
    assert_eq!(
        eval_in("count(//p intersect //section[1]/p)", &context)
            .map(|s| as_integer(&s))
            .unwrap(),
        2
    );
    assert_eq!(
        eval_in("count(//p except //section[1]/p)", &context)
            .map(|s| as_integer(&s))
            .unwrap(),
        1
    );
}

#[test]
fn test_reverse_axes_and_node_comparisons() {
    let context = context_with_node(sample_tree());
    assert!(as_bool(
        &eval_in("(//p)[1]/parent::section is //section[1]", &context).unwrap()
    ));
    assert!(as_bool(&eval_in("(//p)[1] << (//p)[3]", &context).unwrap()));
    assert!(as_bool(
        &eval_in("(//p)[3] >> //section[1]", &context).unwrap()
    ));
    assert_eq!(
        eval_in("count((//p)[3]/ancestor::*)", &context)
            .map(|s| as_integer(&s))
            .unwrap(),
        2
    );
}

#[test]
fn test_attribute_and_node_name_functions() {
    let context = context_with_node(sample_tree());
    assert_eq!(
        eval_in("string(/doc/@id)", &context).map(|s| as_string(&s)).unwrap(),
        "d1"
    );
    assert_eq!(
        eval_in("local-name(/doc)", &context).map(|s| as_string(&s)).unwrap(),
        "doc"
    );
    assert_eq!(
        eval_in("name(//section[1]/@name)", &context)
            .map(|s| as_string(&s))
            .unwrap(),
        "name"
    );
}

#[test]
fn test_missing_context_raises() {
    assert_eq!(eval("."), Err(Error::XPDY0002));
    assert_eq!(eval("position()"), Err(Error::XPDY0002));
}

// --- namespace axis and functions -------------------------------------------

fn namespaced_tree() -> SimpleNode {
    let inner = SimpleNode::element("inner").with_namespace("foo", "urn:inner");
    SimpleNode::document(vec![SimpleNode::element("outer")
        .with_namespace("foo", "urn:outer")
        .with_namespace("", "urn:default")
        .with_child(inner.with_child(SimpleNode::element("leaf").with_namespace("", "")))])
}

#[test]
fn test_in_scope_prefixes_and_shadowing() {
    let context = context_with_node(namespaced_tree());
    let result = eval_in("in-scope-prefixes(/outer/inner)", &context).unwrap();
    let prefixes: Vec<String> = result
        .iter()
        .map(|item| item.string_value().unwrap())
        .collect();
    assert!(prefixes.contains(&"foo".to_string()));
    assert!(prefixes.contains(&"xml".to_string()));
    // the inner declaration shadows the outer one
    assert_eq!(
        eval_in(
            "string(namespace-uri-for-prefix(\"foo\", /outer/inner))",
            &context
        )
        .map(|s| as_string(&s))
        .unwrap(),
        "urn:inner"
    );
    assert_eq!(
        eval_in(
            "string(namespace-uri-for-prefix(\"foo\", /outer))",
            &context
        )
        .map(|s| as_string(&s))
        .unwrap(),
        "urn:outer"
    );
    // xmlns="" undeclares the default namespace on leaf
    assert!(eval_in(
        "namespace-uri-for-prefix(\"\", /outer/inner/leaf)",
        &context
    )
    .unwrap()
    .is_empty());
    assert_eq!(
        eval_in("string(namespace-uri-for-prefix(\"\", /outer))", &context)
            .map(|s| as_string(&s))
            .unwrap(),
        "urn:default"
    );
}

#[test]
fn test_resolve_qname_against_element() {
    let context = context_with_node(namespaced_tree());
    let resolved = eval_in(
        "namespace-uri-from-QName(resolve-QName(\"foo:x\", /outer/inner))",
        &context,
    )
    .unwrap();
    assert_eq!(as_string(&resolved), "urn:inner");
    // an unbound prefix is an error
    assert_eq!(
        eval_in("resolve-QName(\"nope:x\", /outer/inner)", &context),
        Err(Error::FORG0001)
    );
}

#[test]
fn test_qname_functions() {
    assert_eq!(
        as_string(&eval("local-name-from-QName(QName(\"urn:x\", \"p:local\"))").unwrap()),
        "local"
    );
    assert_eq!(
        as_string(&eval("prefix-from-QName(QName(\"urn:x\", \"p:local\"))").unwrap()),
        "p"
    );
    assert_eq!(
        as_string(&eval("namespace-uri-from-QName(QName(\"urn:x\", \"p:local\"))").unwrap()),
        "urn:x"
    );
}

// --- documents and collections ----------------------------------------------

#[test]
fn test_doc_and_collection_are_pure_lookups() {
    let tree = sample_tree();
    let static_context = Rc::new(StaticContext::default());
    let context = DynamicContextBuilder::new(static_context, Rc::new(standard_registry()))
        .document("urn:docs/sample", tree.clone())
        .collection("urn:all", vec![tree.clone()])
        .default_collection(vec![tree])
        .build();
    assert_eq!(eval_in("count(doc(\"urn:docs/sample\"))", &context)
        .map(|s| as_integer(&s))
        .unwrap(), 1);
    assert!(eval_in("doc(\"urn:missing\")", &context).unwrap().is_empty());
    assert_eq!(eval_in("doc(\"\")", &context), Err(Error::FODC0005));
    assert!(as_bool(
        &eval_in("doc-available(\"urn:docs/sample\")", &context).unwrap()
    ));
    assert!(!as_bool(&eval_in("doc-available(\"\")", &context).unwrap()));
    assert!(!as_bool(
        &eval_in("doc-available(\"urn:missing\")", &context).unwrap()
    ));
    assert_eq!(
        eval_in("count(collection(\"urn:all\"))", &context)
            .map(|s| as_integer(&s))
            .unwrap(),
        1
    );
    assert_eq!(
        eval_in("count(collection())", &context)
            .map(|s| as_integer(&s))
            .unwrap(),
        1
    );
}

// --- arrow and function items ------------------------------------------------

#[test]
fn test_arrow_chains() {
    assert_eq!(
        as_integer(&eval("\" abc \" => normalize-space() => string-length()").unwrap()),
        3
    );
}

#[test]
fn test_function_items_as_values() {
    let result = eval("string-length#1").unwrap();
    match result.singleton().unwrap() {
        Item::Function(Function::Named { arity, .. }) => assert_eq!(*arity, 1),
        other => panic!("unexpected {other:?}"),
    }
}
