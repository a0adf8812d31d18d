// tests/printer_tests.rs

use formula_lang::parser::parse;
use rstest::rstest;

#[rstest]
#[case("a || b || c", "[a] or ([b] or [c])")]
#[case("a && b && c", "[a] and ([b] and [c])")]
#[case("1 - 2 - 3", "(1 - 2) - 3")]
#[case("2 + 3 * 4", "2 + (3 * 4)")]
#[case("x ? 1 : 2.5", "[x] ? 1 : 2.5")]
#[case("not a", "![a]")]
#[case("-(a + b)", "-([a] + [b])")]
#[case("[unit price] <> 'x'", "[unit price] != 'x'")]
#[case("Max(1, Abs(-2))", "Max(1, Abs(-2))")]
#[case("2 in (1, 2)", "In(2, 1, 2)")]
#[case("#2024-03-01#", "#2024-03-01 00:00:00#")]
#[case("1e3", "1000.0")]
fn test_canonical_form(#[case] source: &str, #[case] expected: &str) {
    assert_eq!(parse(source).unwrap().to_string(), expected);
}

#[rstest]
#[case("a || b || c")]
#[case("(a || b) || c")]
#[case("1 + 2 * 3 - 4 / 5 % 6")]
#[case("a << 2 >> 1 & 7 | 8 ^ 9")]
#[case("x >= 1 and y <= 2 or not z")]
#[case("c ? (d ? 1 : 2) : 3")]
#[case("f(g(1), [h i], 'q\\'s', #1/2/2024 10:30#)")]
#[case("~a = -b")]
#[case("5 in (1, 2 + 3)")]
fn test_reparse_gives_same_tree(#[case] source: &str) {
    let tree = parse(source).unwrap();
    let printed = tree.to_string();
    assert_eq!(parse(&printed).unwrap(), tree, "printed as {}", printed);
}
