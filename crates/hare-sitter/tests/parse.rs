//! Parsing Hare source through the public API.

use hare_sitter::{language, tree_sitter_hare, ParseError, Parser, ParserConfig, Point, Tree};

const CTYPE: &str = include_str!("fixtures/ctype.ha");

fn parse(source: &str) -> Tree {
    let mut parser = Parser::new();
    parser.set_language(language()).unwrap();
    parser.parse(source).unwrap()
}

fn sexp(source: &str) -> String {
    parse(source).root_node().to_sexp()
}

#[test]
fn test_accessor_is_stable() {
    assert!(std::ptr::eq(tree_sitter_hare(), tree_sitter_hare()));
    assert!(std::ptr::eq(tree_sitter_hare(), language()));
    assert_eq!(tree_sitter_hare().name(), "hare");
}

#[test]
fn test_accessor_is_shared_across_threads() {
    let addresses: Vec<usize> = (0..4)
        .map(|_| std::thread::spawn(|| std::ptr::from_ref(tree_sitter_hare()) as usize))
        .collect::<Vec<_>>()
        .into_iter()
        .map(|handle| handle.join().unwrap())
        .collect();
    assert!(addresses.windows(2).all(|pair| pair[0] == pair[1]));
}

#[test]
fn test_ctype_module_parses_cleanly() {
    let tree = parse(CTYPE);
    let root = tree.root_node();
    assert_eq!(root.kind(), "module");
    assert!(!root.has_error(), "{}", root.to_sexp());
    assert_eq!(root.byte_range(), 0..CTYPE.len());

    let declarations = root
        .named_children()
        .find(|node| node.kind() == "declarations")
        .unwrap();
    let count = |kind: &str| {
        declarations
            .named_children()
            .filter(|node| node.kind() == kind)
            .count()
    };
    assert_eq!(count("constant_declaration"), 8);
    assert_eq!(count("global_declaration"), 1);
    assert_eq!(count("function_declaration"), 15);
}

#[test]
fn test_ctype_function_fields() {
    let tree = parse(CTYPE);
    let toupper = tree
        .walk()
        .filter(|node| node.kind() == "function_declaration")
        .find(|node| {
            node.child_by_field_name("name")
                .is_some_and(|name| name.text() == "toupper")
        })
        .unwrap();

    assert_eq!(toupper.child_by_field_name("returns").unwrap().text(), "rune");
    let body = toupper.child_by_field_name("body").unwrap();
    assert_eq!(body.kind(), "block");
    let yielded = tree
        .walk()
        .find(|node| node.kind() == "yield_statement" && body.byte_range().contains(&node.start_byte()))
        .unwrap();
    assert_eq!(yielded.text(), "yield (c: u32 - 'a' + 'A'): rune;");
}

#[test]
fn test_comments_are_extras() {
    let source = "// leading\nfn f() void; // trailing\n";
    let tree = parse(source);
    let comments: Vec<_> = tree.walk().filter(|node| node.kind() == "comment").collect();
    assert_eq!(comments.len(), 2);
    assert!(comments.iter().all(|node| node.is_extra() && node.is_named()));
    assert_eq!(comments[1].start_position(), Point::new(1, 13));
    insta::assert_snapshot!(
        tree.root_node().to_sexp(),
        @"(module (comment) (declarations (function_declaration name: (identifier) returns: (builtin_type))) (comment))"
    );
}

#[test]
fn test_imports() {
    insta::assert_snapshot!(
        sexp("use fmt;\nuse io = bufio::scanner;\nuse os::{exec, getenv};\nuse strings::*;\n"),
        @"(module (imports (use_statement (identifier)) (use_statement (identifier) (scoped_type_identifier path: (identifier) name: (identifier))) (use_statement (identifier) (identifier) (identifier)) (use_statement (identifier))))"
    );
}

#[test]
fn test_binary_precedence() {
    insta::assert_snapshot!(
        sexp("fn f() int = a + b * c;"),
        @"(module (declarations (function_declaration name: (identifier) returns: (builtin_type) body: (binary_expression left: (identifier) right: (binary_expression left: (identifier) right: (identifier))))))"
    );
}

#[test]
fn test_rune_escapes() {
    insta::assert_snapshot!(
        sexp(r"export fn isblank(c: rune) bool = (c == ' ' || c == '\t');"),
        @"(module (declarations (function_declaration name: (identifier) (parameter (identifier) (builtin_type)) returns: (builtin_type) body: (parenthesis_expression (binary_expression left: (binary_expression left: (identifier) right: (rune)) right: (binary_expression left: (identifier) right: (rune (escape_sequence))))))))"
    );
}

#[test]
fn test_concatenated_string() {
    assert_eq!(
        sexp(r#"def S: str = "a\tb" "c";"#),
        "(module (declarations (constant_declaration (identifier) (builtin_type) \
         (concatenated_string (string (string_content) (escape_sequence) (string_content)) \
         (string (string_content))))))"
    );
}

#[test]
fn test_struct_and_union_types() {
    assert_eq!(
        sexp("type t = struct { a: int, b: nullable *[]u8, union { c: int } };"),
        "(module (declarations (type_declaration (identifier) (struct_type \
         (field (identifier) (builtin_type)) \
         (field (identifier) (pointer_type (array_type (builtin_type)))) \
         (field (union_type (field (identifier) (builtin_type))))))))"
    );
    assert_eq!(
        sexp("type r = (int | str);"),
        "(module (declarations (type_declaration (identifier) (tagged_union_type (builtin_type) (builtin_type)))))"
    );
}

#[test]
fn test_struct_literal_and_switch() {
    assert_eq!(
        sexp("def P: point = point { x = 1, y = 2 };"),
        "(module (declarations (constant_declaration (identifier) (identifier) \
         (struct_literal (identifier) (field_assignment (identifier) (number)) \
         (field_assignment (identifier) (number))))))"
    );
    // A braced body after a bare operand is a switch body, not a struct literal.
    assert_eq!(
        sexp("fn f() void = switch x { case 1, 2 => void; case => g(); };"),
        "(module (declarations (function_declaration name: (identifier) returns: (builtin_type) \
         body: (switch_expression (identifier) \
         (case (number) (number) (expression_statement (void))) \
         (case (expression_statement (call_expression callee: (identifier))))))))"
    );
}

#[test]
fn test_for_loop() {
    assert_eq!(
        sexp("fn f() void = for (let i = 0z; i < 10z; i += 1) g(i);"),
        "(module (declarations (function_declaration name: (identifier) returns: (builtin_type) \
         body: (for_statement (let_expression (identifier) (number (integer_suffix))) \
         condition: (binary_expression left: (identifier) right: (number (integer_suffix))) \
         afterthought: (update_expression (identifier) (number)) \
         body: (call_expression callee: (identifier) (identifier))))))"
    );
}

#[test]
fn test_missing_semicolon() {
    let tree = parse("def X: int = 1");
    let root = tree.root_node();
    assert!(root.has_error());
    assert_eq!(
        root.to_sexp(),
        r#"(module (declarations (constant_declaration (identifier) (builtin_type) (number) (MISSING ";"))))"#
    );
    let missing = tree.walk().find(|node| node.is_missing()).unwrap();
    assert_eq!(missing.byte_range(), 14..14);
}

#[test]
fn test_missing_operand() {
    let tree = parse("fn f() void = { let x = ; };");
    assert_eq!(
        tree.root_node().to_sexp(),
        "(module (declarations (function_declaration name: (identifier) returns: (builtin_type) \
         body: (block (let_declaration (identifier) (MISSING identifier))))))"
    );
}

#[test]
fn test_stray_input_is_skipped() {
    let source = "def X: int = 1; # def Y: int = 2;";
    let tree = parse(source);
    let root = tree.root_node();
    assert!(root.has_error());
    assert_eq!(
        root.to_sexp(),
        "(module (declarations (constant_declaration (identifier) (builtin_type) (number)) \
         (ERROR) \
         (constant_declaration (identifier) (builtin_type) (number))))"
    );
    let error = tree.walk().find(|node| node.is_error()).unwrap();
    assert_eq!(error.text(), "#");
    assert!(!error.next_named_sibling().unwrap().has_error());
}

#[test]
fn test_recovery_keeps_following_declarations() {
    let tree = parse("fn broken( = ;\nfn ok() void;\n");
    let root = tree.root_node();
    assert!(root.has_error());
    let ok = tree
        .walk()
        .filter(|node| node.kind() == "function_declaration")
        .find(|node| !node.has_error())
        .unwrap();
    assert_eq!(ok.start_position(), Point::new(1, 0));
    assert_eq!(ok.child_by_field_name("name").unwrap().text(), "ok");
}

#[test]
fn test_nesting_limit() {
    let source = format!("def X: int = {}1{};", "(".repeat(64), ")".repeat(64));
    let mut parser = Parser::with_config(ParserConfig::default().with_max_depth(16));
    parser.set_language(language()).unwrap();
    assert!(matches!(
        parser.parse(&source),
        Err(ParseError::NestingTooDeep { limit: 16, .. })
    ));
    assert!(!parse(&source).root_node().has_error());
}

#[test]
fn test_descendant_lookup() {
    let source = "fn f() int = a + b * c;";
    let tree = parse(source);
    let node = tree
        .root_node()
        .named_descendant_for_byte_range(17, 18)
        .unwrap();
    assert_eq!(node.kind(), "identifier");
    assert_eq!(node.text(), "b");
    assert_eq!(node.field_name(), Some("left"));
    assert_eq!(node.parent().unwrap().text(), "b * c");
}
