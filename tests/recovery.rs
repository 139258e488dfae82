use phpintel::{Error, MemberName, Node, NodeKind, PartialParser};

// ─── Incomplete Expression Recovery ─────────────────────────────────────────

fn parse(code: &str) -> Node {
    PartialParser::default()
        .parse(code)
        .unwrap_or_else(|e| panic!("expected `{code}` to recover: {e}"))
}

#[test]
fn test_empty_input_is_malformed() {
    let result = PartialParser::default().parse("");
    assert!(matches!(result, Err(Error::MalformedFragment { .. })));
}

#[test]
fn test_dangling_arrow_recovers_property_fetch_with_empty_name() {
    let node = parse("$this->");
    let NodeKind::PropertyFetch { object, name, nullsafe } = node.kind else {
        panic!("expected a property fetch, got {:?}", node.kind);
    };
    assert_eq!(object.kind, NodeKind::Variable("this".to_string()));
    assert_eq!(name, MemberName::Identifier(String::new()));
    assert!(!nullsafe);
}

#[test]
fn test_dangling_nullsafe_arrow_recovers_property_fetch() {
    let node = parse("$order?->");
    let NodeKind::PropertyFetch { name, nullsafe, .. } = node.kind else {
        panic!("expected a property fetch, got {:?}", node.kind);
    };
    assert_eq!(name, MemberName::Identifier(String::new()));
    assert!(nullsafe);
}

#[test]
fn test_dangling_double_colon_recovers_const_fetch_with_empty_name() {
    let node = parse("Foo::");
    let NodeKind::ClassConstFetch { class, name } = node.kind else {
        panic!("expected a class const fetch, got {:?}", node.kind);
    };
    assert_eq!(class.kind, NodeKind::Identifier("Foo".to_string()));
    assert_eq!(name, MemberName::Identifier(String::new()));
}

#[test]
fn test_bare_self_recovers_keyword_node() {
    assert_eq!(parse("self").kind, NodeKind::SelfKeyword);
    assert_eq!(parse("static").kind, NodeKind::StaticKeyword);
    assert_eq!(parse("parent").kind, NodeKind::ParentKeyword);
}

#[test]
fn test_identifier_ending_in_self_is_not_a_keyword() {
    // `myself` must not be mistaken for the `self` keyword.
    assert_eq!(
        parse("myself").kind,
        NodeKind::Identifier("myself".to_string())
    );
}

#[test]
fn test_complete_member_chain_parses_verbatim() {
    let node = parse("$a = $user->profile->getName");
    assert_eq!(node.print(), "$user->profile->getName");
}

#[test]
fn test_method_call_arguments_survive_recovery() {
    let node = parse("$repo->find(1, 'two')->name");
    let NodeKind::PropertyFetch { object, .. } = node.kind else {
        panic!("expected a property fetch, got {:?}", node.kind);
    };
    let NodeKind::MethodCall { name, arguments, .. } = object.kind else {
        panic!("expected a method call, got {:?}", object.kind);
    };
    assert_eq!(name, MemberName::Identifier("find".to_string()));
    assert_eq!(arguments.len(), 2);
}

#[test]
fn test_dangling_heredoc_is_completed() {
    let node = parse("<<<EOT\nhello\nEOT");
    let NodeKind::StringLiteral(text) = node.kind else {
        panic!("expected a string literal, got {:?}", node.kind);
    };
    assert_eq!(text, "<<<EOT\nhello\nEOT");
}

#[test]
fn test_new_keyword_is_a_boundary() {
    // `new` itself terminates the trailing expression; what remains is
    // the qualified class name.
    let node = parse("new \\Foo\\Bar");
    assert_eq!(node.kind, NodeKind::Identifier("\\Foo\\Bar".to_string()));
}

#[test]
fn test_parenthesized_instantiation_recovers_new_node() {
    let node = parse("(new \\Foo\\Bar(1))");
    let NodeKind::New { class, arguments } = node.kind else {
        panic!("expected an instantiation, got {:?}", node.kind);
    };
    assert_eq!(class.kind, NodeKind::Identifier("\\Foo\\Bar".to_string()));
    assert_eq!(arguments.map(|a| a.len()), Some(1));
}

#[test]
fn test_static_property_fetch_keeps_name_without_sigil() {
    let node = parse("Config::$instance");
    let NodeKind::StaticPropertyFetch { class, name } = node.kind else {
        panic!("expected a static property fetch, got {:?}", node.kind);
    };
    assert_eq!(class.kind, NodeKind::Identifier("Config".to_string()));
    assert_eq!(name, "instance");
}

#[test]
fn test_dynamic_member_name_is_captured() {
    let node = parse("$obj->{$field}");
    let NodeKind::PropertyFetch { name, .. } = node.kind else {
        panic!("expected a property fetch, got {:?}", node.kind);
    };
    let MemberName::Dynamic(inner) = name else {
        panic!("expected a dynamic member name");
    };
    assert_eq!(inner.kind, NodeKind::Variable("field".to_string()));
}

#[test]
fn test_garbage_is_malformed() {
    let result = PartialParser::default().parse("$a ->-> b");
    assert!(matches!(result, Err(Error::MalformedFragment { .. })));
}

#[test]
fn test_last_node_at_respects_offset() {
    let parser = PartialParser::default();
    let code = "$first->a; $second->b";
    let node = parser.last_node_at(code, Some("$first->a".len()));
    assert_eq!(
        node.unwrap().print(),
        "$first->a",
        "Only source before the offset may contribute to the node"
    );
}

#[test]
fn test_printing_round_trips_common_shapes() {
    for code in ["$this->foo(1, 2)", "Foo::bar($x)", "$items[0]"] {
        assert_eq!(parse(code).print(), code);
    }
}
