//! End-to-end tests: TypeScript in, JavaScript out.

use tsfront_parser::{transform, ErrorKind, ParserOptions, PrintOptions, TransformOptions};

fn ts(source: &str) -> String {
    transform(source, &TransformOptions::default()).unwrap_or_else(|e| panic!("{source}: {e}"))
}

fn ts_err(source: &str) -> tsfront_parser::ParseError {
    transform(source, &TransformOptions::default()).expect_err("expected an error")
}

// =============================================================================
// Type erasure
// =============================================================================

#[test]
fn test_annotations_are_erased() {
    assert_eq!(
        ts("function f<T>(a: T, b?: number): T { return a as T; }"),
        "function f(a, b) {\n  return a;\n}\n"
    );
    assert_eq!(ts("let y = x! as const;"), "let y = x;\n");
    assert_eq!(ts("const f = <T,>(x: T): T => x;"), "const f = (x) => x;\n");
    assert_eq!(ts("f<string>(x);"), "f(x);\n");
}

#[test]
fn test_type_declarations_produce_nothing() {
    assert_eq!(ts("interface I { a: string }\ntype T<U> = U[] | { [k: string]: U };"), "");
    assert_eq!(
        ts("declare const x: number;\ndeclare function f(): void;\ndeclare module \"m\" {}\ndeclare global { interface Window {} }"),
        ""
    );
    assert_eq!(ts("namespace Types { export type A = string; }"), "");
}

#[test]
fn test_class_members() {
    assert_eq!(ts("class A { x: number; y = 1; }"), "class A {\n  y = 1;\n}\n");

    let options = TransformOptions::default()
        .with_parser(ParserOptions::default().with_use_define_for_class_fields(true));
    assert_eq!(
        transform("class A { x: number; y = 1; }", &options).unwrap(),
        "class A {\n  x;\n  y = 1;\n}\n"
    );

    assert_eq!(
        ts("abstract class A implements B { abstract m(): void; private readonly z = 2; }"),
        "class A {\n  z = 2;\n}\n"
    );
}

#[test]
fn test_parameter_properties() {
    assert_eq!(
        ts("class A { constructor(public x: number) {} }"),
        "class A {\n  constructor(x) {\n    this.x = x;\n  }\n}\n"
    );
    assert_eq!(
        ts("class B extends A { constructor(private y = 1) { super(); } }"),
        "class B extends A {\n  constructor(y = 1) {\n    super();\n    this.y = y;\n  }\n}\n"
    );
}

#[test]
fn test_decorators_are_kept() {
    assert_eq!(ts("@dec class A {}"), "@dec\nclass A {}\n");
}

#[test]
fn test_misplaced_decorators() {
    let err = ts_err("class A { @dec constructor() {} }");
    assert_eq!(err.kind, ErrorKind::Declaration);
    assert_eq!(err.message, "Decorators are not valid on class constructors");

    for source in ["@dec function f() {}", "@dec let x = 1;", "class A { @dec #x = 1 }"] {
        assert_eq!(ts_err(source).kind, ErrorKind::Syntax, "{source}");
    }
}

#[test]
fn test_parenthesized_arrows_can_be_called() {
    assert_eq!(ts("(() => {})();"), "(() => {})();\n");
    assert_eq!(ts("(async () => {})();"), "(async () => {})();\n");
    assert_eq!(ts("(x => x).call(y);"), "((x) => x).call(y);\n");
}

#[test]
fn test_parenthesized_consequent_before_arrow() {
    assert_eq!(ts("let b = c ? (d) : e => f;"), "let b = c ? d : (e) => f;\n");
    assert_eq!(
        ts("let b = c ? (d): string => d : g;"),
        "let b = c ? (d) => d : g;\n"
    );
}

// =============================================================================
// Namespaces
// =============================================================================

#[test]
fn test_namespace_closure() {
    assert_eq!(
        ts("namespace N { export const a = 1; const b = 2; }"),
        "var N;\n((N) => {\n  N.a = 1;\n  const b = 2;\n})(N || (N = {}));\n"
    );
}

#[test]
fn test_namespace_exported_function() {
    assert_eq!(
        ts("namespace N { export function f() { return 1; } }"),
        "var N;\n((N) => {\n  function f() {\n    return 1;\n  }\n  N.f = f;\n})(N || (N = {}));\n"
    );
}

#[test]
fn test_dotted_namespace() {
    assert_eq!(
        ts("namespace A.B { export const x = 1 }"),
        "var A;\n((A) => {\n  let B;\n  ((B) => {\n    B.x = 1;\n  })(B = A.B || (A.B = {}));\n})(A || (A = {}));\n"
    );
}

#[test]
fn test_exported_namespace_at_top_level() {
    assert_eq!(
        ts("export namespace N { export let x = 1 }"),
        "export var N;\n((N) => {\n  N.x = 1;\n})(N || (N = {}));\n"
    );
}

#[test]
fn test_merged_namespace_reads_other_block() {
    assert_eq!(
        ts("namespace N { export let x = 1 }\nnamespace N { x; }"),
        "var N;\n((N) => {\n  N.x = 1;\n})(N || (N = {}));\n((N) => {\n  N.x;\n})(N || (N = {}));\n"
    );
}

#[test]
fn test_namespace_argument_avoids_member_name() {
    assert_eq!(
        ts("namespace N { export const N = 1 }"),
        "var N;\n((_N) => {\n  _N.N = 1;\n})(N || (N = {}));\n"
    );
}

#[test]
fn test_closure_output_parses_again() {
    let js = ts("namespace N { export const a = 1; }\nenum E { A }");
    assert_eq!(ts(&js), js);
}

#[test]
fn test_exported_destructuring_in_namespace() {
    assert_eq!(
        ts("namespace N { export let { a, b: [c] } = o; }"),
        "var N;\n((N) => {\n  ({ a: N.a, b: [N.c] } = o);\n})(N || (N = {}));\n"
    );
}

#[test]
fn test_nested_namespace_merges_across_parent_blocks() {
    assert_eq!(
        ts("namespace A { export namespace B { export const c = 1 } }\nnamespace A.B { c }"),
        "var A;\n\
         ((A) => {\n  let B;\n  ((B) => {\n    B.c = 1;\n  })(B = A.B || (A.B = {}));\n})(A || (A = {}));\n\
         ((A) => {\n  let B;\n  ((B) => {\n    B.c;\n  })(B = A.B || (A.B = {}));\n})(A || (A = {}));\n"
    );
}

#[test]
fn test_nested_enum_members_are_inlined_across_parent_blocks() {
    let js = ts(
        "namespace A { export enum E { X = 2 } }\nnamespace A { export enum E { Y = X + 1 } }",
    );
    assert!(js.contains("E[E[\"Y\"] = 3] = \"Y\";"), "{js}");
}

#[test]
fn test_namespace_with_exported_import_equals_is_kept() {
    assert_eq!(ts("namespace A { import x = y }"), "");
    assert_eq!(
        ts("namespace A { export import x = y }"),
        "var A;\n((A) => {\n  A.x = y;\n})(A || (A = {}));\n"
    );
}

#[test]
fn test_namespace_conflicting_with_let_is_an_error() {
    let err = ts_err("let foo;\nnamespace foo { 0 }");
    assert_eq!(err.kind, ErrorKind::Declaration);
}

// =============================================================================
// Enums
// =============================================================================

#[test]
fn test_numeric_enum() {
    assert_eq!(
        ts("enum E { A, B = 5, C }"),
        "var E;\n((E) => {\n  E[E[\"A\"] = 0] = \"A\";\n  E[E[\"B\"] = 5] = \"B\";\n  E[E[\"C\"] = 6] = \"C\";\n})(E || (E = {}));\n"
    );
}

#[test]
fn test_string_enum() {
    assert_eq!(
        ts("export enum S { X = \"x\" }"),
        "export var S;\n((S) => {\n  S[\"X\"] = \"x\";\n})(S || (S = {}));\n"
    );
}

#[test]
fn test_enum_values_are_folded_and_inlined() {
    let js = ts("enum E { A = 1 << 2, B = A | 1 }\nconsole.log(E.A, E[\"B\"]);");
    assert!(js.contains("E[E[\"B\"] = 5] = \"B\";"), "{js}");
    assert!(js.ends_with("console.log(4, 5);\n"), "{js}");
}

#[test]
fn test_enum_after_string_member_is_undefined() {
    let js = ts("enum E { A = \"a\", B }");
    assert!(js.contains("E[E[\"B\"] = void 0] = \"B\";"), "{js}");
}

#[test]
fn test_duplicate_enum_member() {
    let err = ts_err("enum E { A, A }");
    assert!(err.message.contains('A'), "{}", err.message);
}

// =============================================================================
// Modules
// =============================================================================

#[test]
fn test_unused_imports_are_elided() {
    assert_eq!(
        ts("import { A, b } from \"m\";\nlet x: A = b;"),
        "import { b } from \"m\";\nlet x = b;\n"
    );
    assert_eq!(ts("import { T } from \"m\";\nlet y: T;"), "let y;\n");
    assert_eq!(ts("import \"m\";"), "import \"m\";\n");
    assert_eq!(ts("import type { T } from \"m\";"), "");
}

#[test]
fn test_javascript_keeps_unused_imports() {
    let options = TransformOptions::default().with_parser(ParserOptions::javascript());
    assert_eq!(
        transform("import { a } from \"m\";", &options).unwrap(),
        "import { a } from \"m\";\n"
    );
}

#[test]
fn test_import_equals() {
    assert_eq!(ts("import x = a.b.c;\nx;"), "const x = a.b.c;\nx;\n");
    assert_eq!(ts("import y = a.b;"), "");
    assert_eq!(ts("import fs = require(\"fs\");\nfs;"), "const fs = require(\"fs\");\nfs;\n");
}

#[test]
fn test_export_equals() {
    assert_eq!(ts("const f = 1;\nexport = f;"), "const f = 1;\nmodule.exports = f;\n");
}

// =============================================================================
// Printing options
// =============================================================================

#[test]
fn test_minified_enum() {
    let options = TransformOptions::default().with_print(PrintOptions::default().with_minify(true));
    assert_eq!(
        transform("enum E { A }", &options).unwrap(),
        "var E;((E)=>{E[E[\"A\"]=0]=\"A\"})(E||(E={}))"
    );
}

#[test]
fn test_custom_indent() {
    let options = TransformOptions::default().with_print(PrintOptions::default().with_indent("\t"));
    assert_eq!(
        transform("if (a) { b(); }", &options).unwrap(),
        "if (a) {\n\tb();\n}\n"
    );
}
