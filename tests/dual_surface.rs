//! Hello World in both surfaces parses to the same AST shape, and
//! English pretty-printing round-trips.

use daisyc::parser::{parse, pretty_print};

#[test]
fn hello_english_and_korean_produce_the_same_function_shape() {
    let english = "fn main() -> int:\n  print \"hi\"\n  return 0\n";
    let korean = "함수 main 정의한다:\n  \"hi\"를 출력한다\n  0을 반환한다\n";

    let (english_ast, english_errors) = parse(english);
    assert!(english_errors.is_empty(), "{english_errors:?}");
    let (korean_ast, korean_errors) = parse(korean);
    assert!(korean_errors.is_empty(), "{korean_errors:?}");

    assert_eq!(english_ast.items.len(), 1);
    assert_eq!(korean_ast.items.len(), 1);

    use daisyc::parser::ast::Item;
    let (Item::Function(en), Item::Function(ko)) = (&english_ast.items[0], &korean_ast.items[0])
    else {
        panic!("expected a function item in both surfaces");
    };
    assert_eq!(en.name, "main");
    assert_eq!(ko.name, "main");
    assert_eq!(en.body.stmts.len(), 2);
    assert_eq!(ko.body.stmts.len(), 2);
}

#[test]
fn pretty_printed_english_source_reparses_to_an_equal_ast() {
    let source = "fn main() -> int:\n  let x = 1\n  print x\n  return x\n";
    let (module, errors) = parse(source);
    assert!(errors.is_empty(), "{errors:?}");

    let printed = pretty_print(&module);
    let (reparsed, reparse_errors) = parse(&printed);
    assert!(reparse_errors.is_empty(), "{reparse_errors:?}: {printed}");

    assert_eq!(module.items.len(), reparsed.items.len());
}

#[test]
fn explicit_surface_directive_overrides_predicate_detection() {
    let source = "fn f() -> int:\n  한국어: 0을 반환한다\n";
    let (module, errors) = parse(source);
    assert!(errors.is_empty(), "{errors:?}");
    assert_eq!(module.items.len(), 1);
}
