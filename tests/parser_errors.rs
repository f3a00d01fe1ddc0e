//! Failure modes of the parser and the model builder
//!
//! Each case is a small document that must fail with a specific error kind. Offsets and
//! construct stacks are checked where they are part of the contract.

use rstest::rstest;
use webidl::webidl::config::{Loader, ParserConfig};
use webidl::{parse, parse_with_config, ErrorKind};

#[rstest]
#[case::truncated_interface("interface Foo {\n  void bar();\n", ErrorKind::StreamExhausted)]
#[case::truncated_header("interface Foo", ErrorKind::StreamExhausted)]
#[case::missing_semicolon("interface Foo {\n}", ErrorKind::StreamExhausted)]
#[case::unterminated_comment("/* open", ErrorKind::StreamExhausted)]
#[case::trailing_content("interface Foo {\n};\n};", ErrorKind::UnmatchedConstruct)]
#[case::garbage_member("interface Foo {\n  42;\n};", ErrorKind::UnmatchedConstruct)]
#[case::attribute_without_name("interface Foo { attribute long; };", ErrorKind::UnmatchedConstruct)]
#[case::unquoted_enum_value("enum E { eA };", ErrorKind::UnmatchedConstruct)]
#[case::member_outside_dictionary("interface Foo { required long x; };", ErrorKind::UnmatchedConstruct)]
#[case::missing_decorator_value("[Prefix=]\ninterface Foo {};", ErrorKind::MalformedDecorator)]
#[case::unbalanced_decorators("[NoDelete\ninterface Foo {};", ErrorKind::MalformedDecorator)]
#[case::dangling_decorators("interface Foo {\n  [Const]\n};", ErrorKind::MalformedDecorator)]
#[case::decorators_before_statement("[Const]\nA implements B;", ErrorKind::MalformedDecorator)]
#[case::decorators_at_end("interface Foo {};\n[NoDelete]", ErrorKind::MalformedDecorator)]
#[case::unknown_concrete("interface B {};\nA implements B;", ErrorKind::UnresolvedSuperInterface)]
#[case::unknown_super("interface A {};\nA includes Mixin;", ErrorKind::UnresolvedSuperInterface)]
#[case::unknown_inline_super("interface A : Missing {};", ErrorKind::UnresolvedSuperInterface)]
#[case::duplicate_interface("interface A {};\ninterface A {};", ErrorKind::DuplicateDefinition)]
#[case::enum_clashes_with_dictionary("enum S {};\ndictionary S {};", ErrorKind::DuplicateDefinition)]
#[case::trailing_parameter_comma("interface A { void f(long x,); };", ErrorKind::UnmatchedConstruct)]
#[case::leading_parameter_comma("interface A { void f(, long x); };", ErrorKind::UnmatchedConstruct)]
#[case::doubled_parameter_comma("interface A { void f(long x,, long y); };", ErrorKind::UnmatchedConstruct)]
#[case::nullable_type("interface A { attribute long? x; };", ErrorKind::UnsupportedType)]
#[case::generic_type("interface A { void f(sequence<long> xs); };", ErrorKind::UnsupportedType)]
fn test_error_kinds(#[case] source: &str, #[case] expected: ErrorKind) {
    let err = parse(source).unwrap_err();
    assert_eq!(err.kind, expected, "{}", err);
}

#[test]
fn test_unmatched_reports_offset_and_stack() {
    let err = parse("interface Foo {\n  42;\n};").unwrap_err();
    assert_eq!(err.offset, 18);
    assert_eq!(err.stack, vec!["interface Foo"]);
    assert!(err.to_string().contains("at offset 18 in interface Foo"));
}

#[test]
fn test_exhaustion_reports_open_construct_start() {
    let err = parse("enum E { \"a\" };\ninterface Foo {\n  void bar();\n").unwrap_err();
    assert_eq!(err.kind, ErrorKind::StreamExhausted);
    assert_eq!(err.offset, 16);
    assert_eq!(err.stack, vec!["interface Foo"]);
}

#[test]
fn test_unresolved_statement_is_named() {
    let err = parse("interface B {};\nA implements B;").unwrap_err();
    assert!(err.stack_mentions("A implements B"));
    assert_eq!(err.offset, 16);
}

#[test]
fn test_inline_super_check_is_configurable() {
    let config: ParserConfig = Loader::new()
        .with_toml_str("[model]\ncheck_inline_supers = false\n")
        .build()
        .unwrap();
    let model = parse_with_config("interface A : External {};", &config).unwrap();
    assert_eq!(model.interface("A").unwrap().super_interfaces, vec!["External"]);
}

#[test]
fn test_duplicate_arity_warning_is_configurable() {
    let source = "interface A {\n  void f(long x);\n  void f(float x);\n};";
    assert_eq!(parse(source).unwrap().warnings().len(), 2);

    let config = Loader::new()
        .set_override("model.warn_duplicate_arity", false)
        .unwrap()
        .build()
        .unwrap();
    let model = parse_with_config(source, &config).unwrap();
    assert!(model.warnings().is_empty());
    assert_eq!(model.interface("A").unwrap().functions.len(), 2);
}

#[test]
fn test_custom_package_marker() {
    let config = Loader::new()
        .set_override("parsing.package_marker", "module")
        .unwrap()
        .build()
        .unwrap();
    let source = "// [module=geo]\ninterface A {};\n// [package=ignored]\ninterface B {};";
    let model = parse_with_config(source, &config).unwrap();
    assert_eq!(model.interface("A").unwrap().source_package, "geo");
    assert_eq!(model.interface("B").unwrap().source_package, "geo");
}

#[test]
fn test_trailing_parameter_comma_is_located() {
    let err = parse("interface A { void f(long x,); };").unwrap_err();
    assert_eq!(err.offset, 28);
    assert_eq!(err.stack, vec!["interface A", "function f"]);
}
