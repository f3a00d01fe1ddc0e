//! Snapshot tests for the canonical text form and for error messages

use webidl::parse;

const SHAPES: &str = r#"interface Base {
};
// [package=geo]
[NoDelete]
interface Shape {
    double scale(optional double factor = 1.0);
    constructor(double size);
    readonly attribute double area;
};
Shape implements Base;
enum Kind { "eBOX", "eSPHERE" };
"#;

#[test]
fn test_canonical_form_snapshot() {
    let model = parse(SHAPES).unwrap();
    insta::assert_snapshot!(model.to_string().trim_end(), @r#"
    interface Base {
    };

    // [package=geo]

    [NoDelete]
    interface Shape : Base {
        readonly attribute double area;
        double scale(optional double factor = 1.0);
        constructor(double size);
    };

    enum Kind {
        "eBOX",
        "eSPHERE"
    };
    "#);
}

#[test]
fn test_canonical_form_is_stable() {
    let first = parse(SHAPES).unwrap();
    let second = parse(&first.to_string()).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.to_string(), second.to_string());
}

#[test]
fn test_unmatched_error_message_snapshot() {
    let err = parse("interface Foo {\n  42;\n};").unwrap_err();
    insta::assert_snapshot!(
        err.to_string(),
        @"unmatched construct at offset 18 in interface Foo: unexpected `42;` in interface"
    );
}

#[test]
fn test_duplicate_arity_warning_snapshot() {
    let model = parse("interface Foo {\n  void set(long x);\n  void set(float x);\n};").unwrap();
    let warnings: Vec<String> = model.warnings().iter().map(|w| w.to_string()).collect();
    insta::assert_snapshot!(warnings.join("\n"), @r"
    overloaded function with same parameter count: Foo.set (1 parameters)
    overloaded function with same parameter count: Foo.set (1 parameters)
    ");
}
