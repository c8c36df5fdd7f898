use xpq_ast::ast::*;
use xpq_ast::parser::{parse_xpath, parse_xpath_with_options, ExtensionSignature, ParserOptions};
use xpq_ast::types::{ItemType, Occurrence, SequenceType};
use xpq_ast::{ParserError, Version, XPath};
use xpq_diagnostics::{NoopWarnings, WarningCollector, WarningSink};
use xpq_name::Namespaces;

fn parse(source: &str) -> XPath {
    parse_xpath(source, Version::V3_1, &Namespaces::default()).unwrap()
}

fn parse_version(source: &str, version: Version) -> Result<XPath, ParserError> {
    parse_xpath(source, version, &Namespaces::default())
}

fn expr(xpath: &XPath) -> &Expr {
    &xpath.0.value
}

#[test]
fn test_arithmetic_precedence() {
    let xpath = parse("(5 + 3) * 2 - 3");
    match expr(&xpath) {
        Expr::Binary(sub) => {
            assert_eq!(sub.op, BinaryOp::Sub);
            match &sub.left.value {
                Expr::Binary(mul) => assert_eq!(mul.op, BinaryOp::Mul),
                other => panic!("expected multiplication, got {:?}", other),
            }
        }
        other => panic!("expected subtraction, got {:?}", other),
    }
}

#[test]
fn test_unary_binds_tighter_than_mul() {
    let xpath = parse("-2 * 3");
    match expr(&xpath) {
        Expr::Binary(sub) => {
            assert_eq!(sub.op, BinaryOp::Mul);
            assert!(matches!(sub.left.value, Expr::Unary(UnaryOp::Minus, _)));
        }
        other => panic!("expected multiplication, got {:?}", other),
    }
}

#[test]
fn test_comma_sequence_flat() {
    let xpath = parse("1, 2, 3");
    match expr(&xpath) {
        Expr::Sequence(items) => assert_eq!(items.len(), 3),
        other => panic!("expected sequence, got {:?}", other),
    }
}

#[test]
fn test_empty_parens_is_empty_sequence() {
    let xpath = parse("()");
    assert_eq!(expr(&xpath), &Expr::Sequence(vec![]));
}

#[test]
fn test_path_abbreviations() {
    let xpath = parse("//div/@href/../self::node()");
    match expr(&xpath) {
        Expr::Path(path) => {
            assert!(path.absolute);
            assert_eq!(path.steps.len(), 5);
            match &path.steps[0].value {
                Step::Axis(step) => {
                    assert_eq!(step.axis, Axis::DescendantOrSelf);
                    assert_eq!(step.node_test, NodeTest::Kind(KindTest::Any));
                }
                other => panic!("expected axis step, got {:?}", other),
            }
            match &path.steps[2].value {
                Step::Axis(step) => assert_eq!(step.axis, Axis::Attribute),
                other => panic!("expected attribute step, got {:?}", other),
            }
            match &path.steps[3].value {
                Step::Axis(step) => assert_eq!(step.axis, Axis::Parent),
                other => panic!("expected parent step, got {:?}", other),
            }
        }
        other => panic!("expected path, got {:?}", other),
    }
}

#[test]
fn test_predicates_attach_to_steps() {
    let xpath = parse("child::item[2][@id]");
    match expr(&xpath) {
        Expr::Path(path) => match &path.steps[0].value {
            Step::Axis(step) => assert_eq!(step.predicates.len(), 2),
            other => panic!("expected axis step, got {:?}", other),
        },
        other => panic!("expected path, got {:?}", other),
    }
}

#[test]
fn test_let_bindings_sequential() {
    let xpath = parse("let $x := 5, $y := $x * 2 return $x + $y");
    match expr(&xpath) {
        Expr::Let(let_expr) => {
            assert_eq!(let_expr.bindings.len(), 2);
            assert_eq!(let_expr.bindings[0].name.value.local_name(), "x");
            assert_eq!(let_expr.bindings[1].name.value.local_name(), "y");
        }
        other => panic!("expected let, got {:?}", other),
    }
}

#[test]
fn test_quantified() {
    let xpath = parse("some $x in (1, 2) satisfies $x = 2");
    match expr(&xpath) {
        Expr::Quantified(quantified) => {
            assert_eq!(quantified.quantifier, Quantifier::Some);
            assert_eq!(quantified.bindings.len(), 1);
        }
        other => panic!("expected quantified, got {:?}", other),
    }
}

#[test]
fn test_switch() {
    let xpath = parse("switch (1) case 1 case 2 return \"low\" default return \"high\"");
    match expr(&xpath) {
        Expr::Switch(switch) => {
            assert_eq!(switch.cases.len(), 1);
            assert_eq!(switch.cases[0].operands.len(), 2);
        }
        other => panic!("expected switch, got {:?}", other),
    }
}

#[test]
fn test_map_constructor_and_lookup() {
    let xpath = parse("map { \"a\": 1, \"b\": 2 }?a");
    match expr(&xpath) {
        Expr::Lookup(lookup) => {
            assert_eq!(lookup.key, KeySpecifier::NcName("a".to_string()));
            assert!(matches!(lookup.base.value, Expr::MapConstructor(_)));
        }
        other => panic!("expected lookup, got {:?}", other),
    }
}

#[test]
fn test_array_constructors() {
    match expr(&parse("[1, 2, 3]")) {
        Expr::ArrayConstructor(ArrayConstructor::Square(members)) => {
            assert_eq!(members.len(), 3)
        }
        other => panic!("expected square array, got {:?}", other),
    }
    match expr(&parse("array { 1, 2, 3 }")) {
        Expr::ArrayConstructor(ArrayConstructor::Curly(Some(_))) => {}
        other => panic!("expected curly array, got {:?}", other),
    }
}

#[test]
fn test_arrow_is_sugar_for_call() {
    let xpath = parse("\"abc\" => string-length()");
    match expr(&xpath) {
        Expr::Arrow(arrow) => {
            assert_eq!(arrow.call.name.value.local_name(), "string-length");
            assert!(arrow.call.args.is_empty());
        }
        other => panic!("expected arrow, got {:?}", other),
    }
}

#[test]
fn test_instance_of_union_item_type() {
    let xpath = parse("5 instance of (xs:integer | xs:string)");
    match expr(&xpath) {
        Expr::InstanceOf(treat) => match &treat.target {
            SequenceType::Item { item_type, .. } => match item_type {
                ItemType::Union(members) => assert_eq!(members.len(), 2),
                other => panic!("expected union, got {:?}", other),
            },
            other => panic!("expected item, got {:?}", other),
        },
        other => panic!("expected instance of, got {:?}", other),
    }
}

#[test]
fn test_sequence_type_occurrence() {
    let xpath = parse("$x instance of xs:integer+");
    match expr(&xpath) {
        Expr::InstanceOf(treat) => match &treat.target {
            SequenceType::Item { occurrence, .. } => {
                assert_eq!(*occurrence, Occurrence::NonEmpty)
            }
            other => panic!("expected item, got {:?}", other),
        },
        other => panic!("expected instance of, got {:?}", other),
    }
}

#[test]
fn test_inline_function() {
    let xpath = parse("function ($a as xs:integer, $b) as xs:integer { $a + $b }");
    match expr(&xpath) {
        Expr::InlineFunction(inline) => {
            assert_eq!(inline.params.len(), 2);
            assert!(inline.params[0].declared_type.is_some());
            assert!(inline.return_type.is_some());
        }
        other => panic!("expected inline function, got {:?}", other),
    }
}

#[test]
fn test_string_template() {
    let xpath = parse("`total: {1 + 2} items`");
    match expr(&xpath) {
        Expr::StringTemplate(segments) => {
            assert_eq!(segments.len(), 3);
            assert!(matches!(segments[0], TemplateSegment::Text(_)));
            assert!(matches!(segments[1], TemplateSegment::Expr(_)));
        }
        other => panic!("expected template, got {:?}", other),
    }
}

// --- version gating -------------------------------------------------------

#[test]
fn test_10_rejects_later_constructs() {
    for source in [
        "let $x := 1 return $x",
        "for $x in (1, 2) return $x",
        "if (1) then 2 else 3",
        "some $x in (1) satisfies $x",
        "1 eq 1",
        "5 instance of xs:integer",
        "1 to 5",
        "\"a\" || \"b\"",
        "(1, 2) ! .",
        "map { }",
        "[1]",
        "$m?a",
        "`t`",
        "switch (1) case 1 return 2 default return 3",
        "function () { 1 }",
        "concat#2",
    ] {
        assert!(
            parse_version(source, Version::V1_0).is_err(),
            "1.0 should reject {source}"
        );
    }
}

#[test]
fn test_20_accepts_core_but_rejects_30() {
    assert!(parse_version("let $x := 1 return $x", Version::V2_0).is_ok());
    assert!(parse_version("1 to 5", Version::V2_0).is_ok());
    assert!(parse_version("1 eq 1", Version::V2_0).is_ok());
    for source in ["\"a\" || \"b\"", "(1) ! .", "`t`", "concat#2"] {
        assert!(
            parse_version(source, Version::V2_0).is_err(),
            "2.0 should reject {source}"
        );
    }
}

#[test]
fn test_30_accepts_core_but_rejects_31() {
    assert!(parse_version("\"a\" || \"b\"", Version::V3_0).is_ok());
    assert!(parse_version("(1, 2) ! (. * 2)", Version::V3_0).is_ok());
    assert!(parse_version("1 => string()", Version::V3_0).is_ok());
    for source in ["map { \"a\": 1 }", "[1, 2]", "$m?k"] {
        assert!(
            parse_version(source, Version::V3_0).is_err(),
            "3.0 should reject {source}"
        );
    }
}

#[test]
fn test_keywords_usable_as_names() {
    // `let`, `map` and friends are element names where no keyword role fits
    assert!(parse_version("child::let", Version::V3_1).is_ok());
    assert!(parse_version("map", Version::V3_1).is_ok());
    assert!(parse_version("for/let/if", Version::V3_1).is_ok());
    assert!(parse_version("div div div", Version::V1_0).is_ok());
}

#[test]
fn test_reserved_function_names() {
    for source in ["if(1)", "item()", "function()", "switch(1)"] {
        let err = parse_version(source, Version::V3_1).unwrap_err();
        match err {
            ParserError::Reserved { .. } | ParserError::Syntax { .. } => {}
            other => panic!("expected reserved/syntax error for {source}, got {other:?}"),
        }
    }
}

#[test]
fn test_unknown_prefix() {
    let err = parse_version("unbound:name", Version::V2_0).unwrap_err();
    assert!(matches!(err, ParserError::UnknownPrefix { .. }));
}

#[test]
fn test_unknown_atomic_type() {
    let err = parse_version("1 cast as xs:nosuch", Version::V2_0).unwrap_err();
    assert!(matches!(err, ParserError::UnknownType { .. }));
}

// --- options --------------------------------------------------------------

#[test]
fn test_namespace_axis_gated() {
    let namespaces = Namespaces::default();
    let err = parse_xpath("namespace::*", Version::V2_0, &namespaces).unwrap_err();
    assert!(matches!(err, ParserError::NamespaceAxisDisabled { .. }));

    let mut options = ParserOptions::new(Version::V2_0);
    options.enable_namespace_axis = true;
    let collector = WarningCollector::default();
    parse_xpath_with_options("namespace::*", &namespaces, &options, &collector).unwrap();
    assert_eq!(collector.warnings()[0].code, "XPWD0001");
}

#[test]
fn test_compatibility_mode() {
    let namespaces = Namespaces::default();
    let mut options = ParserOptions::new(Version::V2_0);
    options.compatibility_mode = true;
    let collector = WarningCollector::default();
    parse_xpath_with_options("1 + 1", &namespaces, &options, &collector).unwrap();
    assert_eq!(collector.warnings()[0].code, "XPWC0001");

    let mut options = ParserOptions::new(Version::V1_0);
    options.compatibility_mode = true;
    let err =
        parse_xpath_with_options("1", &namespaces, &options, &NoopWarnings).unwrap_err();
    assert!(matches!(err, ParserError::InvalidOptions { .. }));
}

#[test]
fn test_extension_validation() {
    let namespaces = Namespaces::default();
    let mut options = ParserOptions::new(Version::V2_0);
    options.extensions = vec![
        ExtensionSignature {
            name: "node-set".to_string(),
            min_args: 1,
            max_args: 1,
        },
        ExtensionSignature {
            name: "node-set".to_string(),
            min_args: 1,
            max_args: 2,
        },
    ];
    let err = parse_xpath_with_options("1", &namespaces, &options, &NoopWarnings).unwrap_err();
    assert!(matches!(err, ParserError::InvalidExtensions { .. }));

    let mut options = ParserOptions::new(Version::V2_0);
    options.extensions = vec![ExtensionSignature {
        name: "broken".to_string(),
        min_args: 3,
        max_args: 1,
    }];
    let err = parse_xpath_with_options("1", &namespaces, &options, &NoopWarnings).unwrap_err();
    assert!(matches!(err, ParserError::InvalidExtensions { .. }));
}

#[test]
fn test_lex_errors_have_positions() {
    let err = parse_version("1 ~ 2", Version::V3_1).unwrap_err();
    match err {
        ParserError::Lex { span } => assert_eq!(span.start, 2),
        other => panic!("expected lex error, got {other:?}"),
    }
}

// --- round-trip -----------------------------------------------------------

#[test]
fn test_display_round_trip() {
    let sources = [
        "1",
        "1.5",
        "1e3",
        "\"he said \"\"hi\"\"\"",
        "$x",
        ".",
        "()",
        "(1, 2, 3)",
        "-2",
        "(5 + 3) * 2 - 3",
        "1 < 2 or 3 >= 4 and 5 != 6",
        "1 eq 1",
        "$a is $b",
        "$a << $b",
        "\"a\" || \"b\" || \"c\"",
        "1 to 5",
        "a | b intersect c except d",
        "let $x := 5, $y := $x * 2 return $x + $y",
        "for $x in (1, 2), $y in (3, 4) return $x + $y",
        "some $x in (1, 2) satisfies $x = 2",
        "every $x in (1, 2) satisfies $x > 0",
        "if ($x) then 1 else 2",
        "switch (1) case 1 return \"a\" default return \"b\"",
        "(1, 2, 3) ! (. * 2)",
        "\"abc\" => substring(2) => string-length()",
        "//div[@class = \"x\"]/p[1]",
        "/",
        "child::*/attribute::href",
        "ancestor-or-self::node()",
        "preceding-sibling::item[last()]",
        "*:local",
        "xml:*",
        "text()",
        "comment()",
        "processing-instruction(\"xml-stylesheet\")",
        "document-node(element(doc))",
        "element(person, xs:string)",
        "attribute(id)",
        "count((1, 2, 3))",
        "concat#3",
        "function ($a) { $a * 2 }",
        "function () { }",
        "map { \"a\": 1, \"b\": (2, 3) }",
        "map { }",
        "[1, [2, 3], 4]",
        "array { 1 to 3 }",
        "array { }",
        "$m?key",
        "$a?1",
        "$m?*",
        "$m?(\"a\", \"b\")",
        "?name",
        "5 cast as xs:integer",
        "5 castable as xs:integer?",
        "$x treat as item()+",
        "5 instance of (xs:integer | xs:string)",
        "$x instance of map(xs:string, item()*)",
        "$x instance of array(xs:integer)",
        "$x instance of function(xs:integer) as xs:boolean",
        "$x instance of function(*)",
        "$x instance of empty-sequence()",
        "$f(1)(2)",
        "(1, 2)[. > 1]",
        "`a {1 + 1} b`",
        "`\\{literal\\}`",
    ];
    let namespaces = Namespaces::default();
    for source in sources {
        let parsed = parse_xpath(source, Version::V3_1, &namespaces)
            .unwrap_or_else(|e| panic!("failed to parse {source}: {e:?}"));
        let printed = parsed.to_string();
        let reparsed = parse_xpath(&printed, Version::V3_1, &namespaces)
            .unwrap_or_else(|e| panic!("failed to reparse {printed} (from {source}): {e:?}"));
        assert_eq!(parsed, reparsed, "round trip failed: {source} -> {printed}");
    }
}

#[test]
fn test_structural_equality_ignores_whitespace() {
    let namespaces = Namespaces::default();
    let a = parse_xpath("1+2", Version::V3_1, &namespaces).unwrap();
    let b = parse_xpath("1   +   2", Version::V3_1, &namespaces).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_trailing_tokens_rejected() {
    assert!(parse_version("1 2", Version::V3_1).is_err());
}

#[test]
fn test_warning_sink_is_quiet_by_default() {
    let collector = WarningCollector::default();
    collector.emit("XPWT0001", None);
    assert_eq!(collector.len(), 1);
}
