use phpintel::{InvocationInfo, InvocationKind, PartialParser};

// ─── Call-Tip Invocation Extraction ─────────────────────────────────────────

fn info(code: &str) -> InvocationInfo {
    PartialParser::default()
        .invocation_info_at(code)
        .unwrap_or_else(|e| panic!("expected `{code}` to resolve: {e}"))
        .unwrap_or_else(|| panic!("expected `{code}` to be inside an invocation"))
}

fn none(code: &str) -> bool {
    PartialParser::default()
        .invocation_info_at(code)
        .is_ok_and(|i| i.is_none())
}

#[test]
fn test_innermost_open_call_wins() {
    let info = info("foo(bar(");
    assert_eq!(info.callee_name, "bar");
    assert_eq!(info.kind, InvocationKind::Function);
    assert_eq!(info.argument_index, 0);
    assert_eq!(info.offset, "foo(bar".len());
}

#[test]
fn test_method_call_with_argument_position() {
    let info = info("$this->foo(1, 2, ");
    assert_eq!(info.callee_name, "foo");
    assert_eq!(info.callee_expression, "$this->foo");
    assert_eq!(info.kind, InvocationKind::Method);
    assert_eq!(info.argument_index, 2);
    assert_eq!(info.offset, "$this->foo".len());
}

#[test]
fn test_constructor_call_uses_last_name_segment() {
    let info = info("new \\Foo\\Bar(");
    assert_eq!(info.callee_name, "Bar");
    assert_eq!(info.kind, InvocationKind::Instantiation);
    assert_eq!(info.argument_index, 0);
}

#[test]
fn test_static_call_is_a_method_invocation() {
    let info = info("Foo::create($a, ");
    assert_eq!(info.callee_name, "create");
    assert_eq!(info.kind, InvocationKind::Method);
    assert_eq!(info.argument_index, 1);
}

#[test]
fn test_nullsafe_method_call() {
    let info = info("$order?->save(");
    assert_eq!(info.callee_name, "save");
    assert_eq!(info.kind, InvocationKind::Method);
}

#[test]
fn test_not_inside_any_call() {
    assert!(none(""), "empty input is not inside a call");
    assert!(none("$a = $b"), "plain assignment is not inside a call");
    assert!(none("foo()"), "a closed call is not open");
}

#[test]
fn test_keyword_parenthesis_is_not_an_invocation() {
    assert!(none("if ("), "an if condition is not a call");
    assert!(none("while ("), "a while condition is not a call");
}

#[test]
fn test_statement_end_stops_the_scan() {
    assert!(
        none("foo(1); $a"),
        "a semicolon at balanced nesting leaves the call behind"
    );
}

#[test]
fn test_open_block_stops_the_scan() {
    assert!(
        none("function x() { $a"),
        "an unmatched opening brace means we are in a body, not a call"
    );
}

#[test]
fn test_array_argument_commas_do_not_count() {
    let info = info("foo(1, [2, 3");
    assert_eq!(info.callee_name, "foo");
    assert_eq!(
        info.argument_index, 1,
        "commas inside an array literal belong to the array"
    );
}

#[test]
fn test_closed_nested_call_counts_as_one_argument() {
    let info = info("foo(bar(), ");
    assert_eq!(info.callee_name, "foo");
    assert_eq!(info.argument_index, 1);
}

#[test]
fn test_unclosed_parenthesized_argument_still_counts_commas() {
    let info = info("foo(1, (2");
    assert_eq!(info.callee_name, "foo");
    assert_eq!(info.argument_index, 1);
}

#[test]
fn test_chained_callee_expression_is_preserved() {
    let info = info("$container->get('db')->query(");
    assert_eq!(info.callee_name, "query");
    assert_eq!(info.callee_expression, "$container->get('db')->query");
    assert_eq!(info.kind, InvocationKind::Method);
}

#[test]
fn test_serializes_with_editor_facing_field_names() {
    let value = serde_json::to_value(info("$this->foo(1, ")).unwrap();
    assert_eq!(value["calleeName"], "foo");
    assert_eq!(value["type"], "method");
    assert_eq!(value["argumentIndex"], 1);
}
