//! Exercises the type checker and lexical borrow checker together,
//! through the same public surface `driver::pipeline` uses.

use daisyc::borrowck::BorrowChecker;
use daisyc::hir::check::Checker;
use daisyc::hir::diagnostics::DiagnosticKind;
use daisyc::parser::parse;
use daisyc::resolve::ModuleId;

fn type_diagnostics(src: &str) -> Vec<daisyc::hir::diagnostics::Diagnostic> {
    let (module, errors) = parse(src);
    assert!(errors.is_empty(), "{errors:?}");
    let mut checker = Checker::new();
    checker.check_module(&module, ModuleId::default());
    checker.diagnostics
}

fn borrow_diagnostics(src: &str) -> BorrowChecker {
    let (module, errors) = parse(src);
    assert!(errors.is_empty(), "{errors:?}");
    let mut checker = BorrowChecker::new();
    checker.check_module(&module);
    checker
}

#[test]
fn generic_function_declaration_alone_has_no_diagnostics() {
    let diags = type_diagnostics(
        "trait Describe:\n  fn describe(self) -> str\nfn show<T: Describe>(value: T) -> str:\n  return \"shown\"\n",
    );
    assert!(diags.is_empty(), "bound solving only runs at call sites: {diags:?}");
}

#[test]
fn trait_bound_without_an_impl_is_unresolved() {
    let diags = type_diagnostics(
        "trait Describe:\n  fn describe(self) -> str\nfn show<T: Describe>(value: T) -> str:\n  return \"shown\"\nfn main() -> str:\n  return show(0)\n",
    );
    assert!(diags.iter().any(|d| d.kind == DiagnosticKind::UnresolvedTraitBound));
}

#[test]
fn move_then_use_is_rejected_end_to_end() {
    let checker = borrow_diagnostics(
        "fn f() -> int:\n  let a = buffer(8)\n  let b = move a\n  release a\n  return 0\n",
    );
    assert!(checker.diagnostics.iter().any(|d| d.kind == DiagnosticKind::UseAfterMove));
}

#[test]
fn two_disjoint_views_over_one_buffer_coexist() {
    let checker = borrow_diagnostics(
        "fn f() -> int:\n  let r = buffer(16)\n  let left = borrow mut r[0..8]\n  let right = borrow mut r[8..16]\n  return 0\n",
    );
    assert!(checker.diagnostics.is_empty(), "{:?}", checker.diagnostics);
}

#[test]
fn overlapping_views_of_incompatible_kinds_conflict() {
    let checker = borrow_diagnostics(
        "fn f() -> int:\n  let r = buffer(16)\n  let a = borrow mut r[0..8]\n  let b = borrow r[4..12]\n  return 0\n",
    );
    assert!(checker.diagnostics.iter().any(|d| d.kind == DiagnosticKind::BorrowAliasConflict));
}

#[test]
fn struct_literal_resolves_to_the_declared_struct_type() {
    let diags = type_diagnostics(
        "struct Point:\n  x: int\n  y: int\nfn origin() -> Point:\n  return Point { x: 0, y: 0 }\n",
    );
    assert!(diags.is_empty(), "{diags:?}");
}

#[test]
fn enum_variant_call_checks_field_arity_against_the_declaration() {
    let diags = type_diagnostics(
        "enum Shape:\n  Circle(int)\n  Square(int)\nfn unit() -> Shape:\n  return Shape::Circle(1)\n",
    );
    assert!(diags.is_empty(), "{diags:?}");

    let bad_arity = type_diagnostics(
        "enum Shape:\n  Circle(int)\nfn unit() -> Shape:\n  return Shape::Circle(1, 2)\n",
    );
    assert!(bad_arity.iter().any(|d| d.kind == DiagnosticKind::GenericArityMismatch));
}

#[test]
fn try_propagates_an_error_result_type_checks() {
    let diags = type_diagnostics(
        "fn inner() -> Result<int, str>:\n  return Err(\"boom\")\nfn outer() -> Result<int, str>:\n  let v = try inner()\n  return Ok(v)\n",
    );
    assert!(diags.is_empty(), "{diags:?}");
}
