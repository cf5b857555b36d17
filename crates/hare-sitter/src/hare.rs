//! The Hare grammar, declared with the [`dsl`](crate::grammar::dsl) helpers.
//!
//! See <https://harelang.org/specification> for the language itself.

use crate::grammar::dsl::{
    choice, field, immediate_token, optional, pattern, prec, prec_left, prec_right, repeat, repeat1,
    seq, string, sym, token, GrammarBuilder,
};
use crate::grammar::{Grammar, Rule};

/// Operator precedence levels, lowest binding first.
pub mod precedence {
    /// Parenthesised expressions.
    pub const PARENTHESES: i32 = -1;
    /// `=` and the compound assignments.
    pub const ASSIGNMENT: i32 = 0;
    /// `^^`
    pub const LOGICAL_XOR: i32 = 1;
    /// `||`
    pub const LOGICAL_OR: i32 = 2;
    /// `&&`
    pub const LOGICAL_AND: i32 = 3;
    /// `|`
    pub const BITWISE_OR: i32 = 4;
    /// `^`
    pub const BITWISE_XOR: i32 = 5;
    /// `&`
    pub const BITWISE_AND: i32 = 6;
    /// `==` and `!=`
    pub const EQUALITY: i32 = 7;
    /// `<`, `<=`, `>` and `>=`
    pub const COMPARE: i32 = 8;
    /// `<<` and `>>`
    pub const SHIFT: i32 = 9;
    /// `+` and `-`
    pub const ADD: i32 = 10;
    /// `*`, `/` and `%`
    pub const MULTIPLY: i32 = 11;
    /// `:`, `as` and `is` casts.
    pub const CAST: i32 = 12;
    /// Prefix operators.
    pub const UNARY: i32 = 13;
    /// Calls.
    pub const CALL: i32 = 14;
    /// Member access, indexing and slicing.
    pub const MEMBER: i32 = 15;
}

/// Names of the builtin scalar types.
pub const BUILTIN_TYPES: [&str; 19] = [
    "i8", "i16", "i32", "i64", "u8", "u16", "u32", "u64", "int", "uint", "size", "uintptr", "char",
    "f32", "f64", "rune", "str", "bool", "void",
];

/// Suffixes accepted after an integer literal.
pub const INTEGER_SUFFIXES: [&str; 11] = [
    "i", "u", "z", "i8", "i16", "i32", "i64", "u8", "u16", "u32", "u64",
];

/// Binary operators and their precedence.
pub const BINARY_OPERATORS: [(&str, i32); 19] = [
    ("+", precedence::ADD),
    ("-", precedence::ADD),
    ("*", precedence::MULTIPLY),
    ("/", precedence::MULTIPLY),
    ("%", precedence::MULTIPLY),
    ("||", precedence::LOGICAL_OR),
    ("&&", precedence::LOGICAL_AND),
    ("^^", precedence::LOGICAL_XOR),
    ("|", precedence::BITWISE_OR),
    ("&", precedence::BITWISE_AND),
    ("^", precedence::BITWISE_XOR),
    ("==", precedence::EQUALITY),
    ("!=", precedence::EQUALITY),
    (">", precedence::COMPARE),
    (">=", precedence::COMPARE),
    ("<=", precedence::COMPARE),
    ("<", precedence::COMPARE),
    ("<<", precedence::SHIFT),
    (">>", precedence::SHIFT),
];

/// Compound assignment operators.
pub const UPDATE_OPERATORS: [&str; 13] = [
    "+=", "-=", "*=", "/=", "%=", "<<=", ">>=", "|=", "&=", "^=", "||=", "&&=", "^^=",
];

/// Words that can never be an identifier.
pub const KEYWORDS: [&str; 30] = [
    "as", "break", "case", "const", "def", "defer", "else", "enum", "export", "false", "fn",
    "for", "if", "is", "let", "match", "null", "nullable", "return", "static", "struct",
    "switch", "true", "type", "union", "use", "void", "yield", "_", "size",
];

/// Returns `true` if `word` is reserved and cannot name anything.
#[must_use]
pub fn is_reserved(word: &str) -> bool {
    KEYWORDS.contains(&word) || BUILTIN_TYPES.contains(&word)
}

fn strings<'a>(values: impl IntoIterator<Item = &'a str>) -> Rule {
    choice(values.into_iter().map(string))
}

fn comma_sep1(rule: Rule) -> Rule {
    seq([rule.clone(), repeat(seq([string(","), rule]))])
}

fn comma_sep(rule: Rule) -> Rule {
    optional(comma_sep1(rule))
}

fn optional_comma_sep(rule: Rule) -> Rule {
    seq([comma_sep(rule), optional(string(","))])
}

fn optional_comma_sep1(rule: Rule) -> Rule {
    seq([comma_sep1(rule), optional(string(","))])
}

fn exponent() -> Rule {
    seq([
        strings(["e", "E"]),
        optional(strings(["+", "-"])),
        pattern("[0-9]+"),
    ])
}

/// Builds the Hare grammar.
#[must_use]
#[allow(clippy::too_many_lines)]
pub fn grammar() -> Grammar {
    GrammarBuilder::new("hare")
        .conflict(&["builtin_type", "void"])
        .extra(sym("comment"))
        .extra(pattern("\\s"))
        .supertype("declaration")
        .supertype("expression")
        .supertype("literal")
        .supertype("statement")
        .supertype("type")
        .word("identifier")
        // Modules and imports
        .rule(
            "module",
            seq([optional(sym("imports")), optional(sym("declarations"))]),
        )
        .rule("imports", repeat1(sym("use_statement")))
        .rule(
            "use_statement",
            seq([
                string("use"),
                choice([
                    seq([
                        sym("identifier"),
                        string("="),
                        choice([sym("identifier"), sym("scoped_type_identifier")]),
                    ]),
                    seq([
                        choice([sym("identifier"), sym("scoped_type_identifier")]),
                        optional(seq([
                            string("::"),
                            choice([
                                seq([
                                    string("{"),
                                    optional_comma_sep1(sym("identifier")),
                                    string("}"),
                                ]),
                                string("*"),
                            ]),
                        ])),
                    ]),
                ]),
                string(";"),
            ]),
        )
        .rule("name_list", optional_comma_sep1(sym("identifier")))
        // Declarations
        .rule("declarations", repeat1(sym("declaration")))
        .rule(
            "declaration",
            choice([
                sym("global_declaration"),
                sym("constant_declaration"),
                sym("type_declaration"),
                sym("function_declaration"),
            ]),
        )
        .rule(
            "global_declaration",
            seq([
                optional(string("export")),
                strings(["const", "let"]),
                comma_sep1(sym("global_binding")),
                string(";"),
            ]),
        )
        .rule(
            "global_binding",
            seq([
                optional(sym("declaration_attribute")),
                sym("identifier"),
                string(":"),
                sym("type"),
                optional(seq([string("="), sym("expression")])),
            ]),
        )
        .rule(
            "declaration_attribute",
            seq([string("@symbol"), string("("), sym("string"), string(")")]),
        )
        .rule(
            "constant_declaration",
            seq([
                optional(string("export")),
                string("def"),
                comma_sep1(seq([
                    sym("identifier"),
                    string(":"),
                    sym("type"),
                    string("="),
                    sym("expression"),
                ])),
                string(";"),
            ]),
        )
        .rule(
            "type_declaration",
            seq([
                optional(string("export")),
                string("type"),
                optional_comma_sep1(seq([sym("identifier"), string("="), sym("type")])),
                string(";"),
            ]),
        )
        .rule(
            "function_declaration",
            seq([
                optional(string("export")),
                repeat(sym("function_attribute")),
                string("fn"),
                field("name", sym("identifier")),
                string("("),
                optional_comma_sep(sym("parameter")),
                string(")"),
                field("returns", optional(sym("type"))),
                optional(seq([string("="), field("body", sym("expression"))])),
                string(";"),
            ]),
        )
        .rule(
            "function_attribute",
            choice([
                string("@fini"),
                string("@init"),
                string("@test"),
                string("@noreturn"),
                sym("declaration_attribute"),
            ]),
        )
        .rule(
            "parameter",
            seq([
                choice([sym("identifier"), string("_")]),
                string(":"),
                sym("type"),
                optional(string("...")),
            ]),
        )
        // Types
        .rule(
            "type",
            choice(
                [
                    "identifier",
                    "scoped_type_identifier",
                    "builtin_type",
                    "pointer_type",
                    "const_type",
                    "error_type",
                    "array_type",
                    "enum_type",
                    "slice_type",
                    "struct_type",
                    "tuple_type",
                    "union_type",
                    "tagged_union_type",
                    "function_type",
                    "unwrapped_type",
                ]
                .map(sym),
            ),
        )
        .rule("builtin_type", strings(BUILTIN_TYPES))
        .rule(
            "pointer_type",
            seq([optional(string("nullable")), string("*"), sym("type")]),
        )
        .rule("const_type", seq([string("const"), sym("type")]))
        .rule("error_type", seq([string("!"), sym("type")]))
        .rule("array_type", seq([string("["), string("]"), sym("type")]))
        .rule(
            "enum_type",
            seq([
                string("enum"),
                optional(sym("builtin_type")),
                string("{"),
                optional_comma_sep1(sym("enum_field")),
                string("}"),
            ]),
        )
        .rule(
            "slice_type",
            seq([
                string("["),
                field(
                    "size",
                    choice([string("_"), string("*"), sym("expression")]),
                ),
                string("]"),
                sym("type"),
            ]),
        )
        .rule(
            "struct_type",
            seq([
                string("struct"),
                optional(string("@packed")),
                string("{"),
                optional_comma_sep1(sym("field")),
                string("}"),
            ]),
        )
        .rule(
            "tuple_type",
            seq([string("("), comma_sep(sym("type")), string(")")]),
        )
        .rule(
            "union_type",
            seq([
                string("union"),
                string("{"),
                optional_comma_sep1(sym("field")),
                string("}"),
            ]),
        )
        .rule(
            "tagged_union_type",
            seq([
                string("("),
                sym("type"),
                repeat1(seq([string("|"), sym("type")])),
                string(")"),
            ]),
        )
        .rule(
            "function_type",
            prec_right(
                0,
                seq([
                    optional(sym("function_attribute")),
                    string("fn"),
                    string("("),
                    optional_comma_sep(sym("parameter")),
                    string(")"),
                    field("returns", optional(sym("type"))),
                ]),
            ),
        )
        .rule("unwrapped_type", seq([string("..."), sym("type")]))
        .rule(
            "enum_field",
            seq([
                sym("identifier"),
                optional(seq([string("="), sym("expression")])),
            ]),
        )
        .rule(
            "field",
            seq([
                optional(sym("offset_specifier")),
                choice([
                    seq([sym("identifier"), string(":"), sym("type")]),
                    sym("struct_type"),
                    sym("union_type"),
                    sym("identifier"),
                    sym("scoped_type_identifier"),
                ]),
            ]),
        )
        .rule(
            "offset_specifier",
            seq([
                string("@offset"),
                string("("),
                sym("expression"),
                string(")"),
            ]),
        )
        // Statements
        .rule(
            "statement",
            choice(
                [
                    "break_statement",
                    "defer_statement",
                    "yield_statement",
                    "static_operation",
                    "let_declaration",
                    "const_declaration",
                    "expression_statement",
                ]
                .map(sym),
            ),
        )
        .rule(
            "expression_statement",
            seq([sym("expression"), string(";")]),
        )
        .rule(
            "block",
            seq([
                optional(sym("label")),
                string("{"),
                repeat(sym("statement")),
                string("}"),
            ]),
        )
        .rule(
            "if_statement",
            prec_right(
                0,
                seq([
                    string("if"),
                    string("("),
                    field("condition", sym("expression")),
                    string(")"),
                    field("consequence", sym("expression")),
                    optional(sym("else_statement")),
                ]),
            ),
        )
        .rule(
            "else_statement",
            prec_right(
                0,
                seq([string("else"), field("alternative", sym("expression"))]),
            ),
        )
        .rule(
            "for_statement",
            prec_right(
                0,
                seq([
                    string("for"),
                    string("("),
                    optional(seq([sym("let_expression"), string(";")])),
                    seq([
                        field("condition", sym("expression")),
                        optional(seq([
                            string(";"),
                            field("afterthought", sym("expression")),
                        ])),
                    ]),
                    string(")"),
                    field("body", sym("expression")),
                ]),
            ),
        )
        .rule(
            "label",
            seq([string(":"), field("label", sym("identifier"))]),
        )
        .rule(
            "break_statement",
            seq([string("break"), optional(sym("label")), string(";")]),
        )
        .rule("defer_statement", seq([string("defer"), sym("statement")]))
        .rule(
            "return_statement",
            prec_right(0, seq([string("return"), optional(sym("expression"))])),
        )
        .rule(
            "yield_statement",
            seq([
                string("yield"),
                optional(choice([
                    seq([sym("label"), string(","), sym("expression")]),
                    sym("expression"),
                ])),
                string(";"),
            ]),
        )
        .rule(
            "static_operation",
            seq([string("static"), sym("expression"), string(";")]),
        )
        .rule(
            "let_declaration",
            seq([
                optional(string("static")),
                string("let"),
                comma_sep1(seq([
                    choice([sym("identifier"), sym("tuple_literal")]),
                    optional(seq([string(":"), sym("type")])),
                    optional(seq([string("="), sym("expression")])),
                ])),
                string(";"),
            ]),
        )
        .rule(
            "const_declaration",
            seq([
                optional(string("static")),
                string("const"),
                comma_sep1(seq([
                    choice([sym("identifier"), sym("tuple_literal")]),
                    optional(seq([string(":"), sym("type")])),
                    string("="),
                    sym("expression"),
                ])),
                string(";"),
            ]),
        )
        // Expressions
        .rule(
            "expression",
            prec_right(
                0,
                choice(
                    [
                        "assignment_expression",
                        "update_expression",
                        "unary_expression",
                        "binary_expression",
                        "size_expression",
                        "call_expression",
                        "error_assertion_expression",
                        "cast_expression",
                        "index_expression",
                        "range_expression",
                        "member_expression",
                        "try_expression",
                        "parenthesis_expression",
                        "if_statement",
                        "for_statement",
                        "return_statement",
                        "switch_expression",
                        "match_expression",
                        "block",
                        "identifier",
                        "scoped_type_identifier",
                        "literal",
                    ]
                    .map(sym),
                ),
            ),
        )
        .rule(
            "assignment_expression",
            prec_right(
                precedence::ASSIGNMENT,
                seq([sym("expression"), string("="), sym("expression")]),
            ),
        )
        .rule(
            "update_expression",
            prec_right(
                precedence::ASSIGNMENT,
                seq([
                    sym("expression"),
                    strings(UPDATE_OPERATORS),
                    sym("expression"),
                ]),
            ),
        )
        .rule(
            "unary_expression",
            choice([
                prec_right(
                    precedence::UNARY,
                    seq([
                        field("operator", strings(["+", "-", "~", "!", "*"])),
                        field("argument", sym("expression")),
                    ]),
                ),
                prec_right(
                    precedence::UNARY,
                    seq([
                        field("address", string("&")),
                        field("argument", sym("expression")),
                    ]),
                ),
            ]),
        )
        .rule(
            "binary_expression",
            choice(BINARY_OPERATORS.map(|(operator, level)| {
                prec_left(
                    level,
                    seq([
                        field("left", sym("expression")),
                        field("operator", string(operator)),
                        field("right", sym("expression")),
                    ]),
                )
            })),
        )
        .rule(
            "error_assertion_expression",
            seq([sym("expression"), string("!")]),
        )
        .rule(
            "cast_expression",
            prec(
                precedence::CAST,
                choice([
                    field(
                        "type_cast",
                        seq([sym("expression"), string(":"), sym("type")]),
                    ),
                    field(
                        "as_cast",
                        seq([sym("expression"), string("as"), sym("type")]),
                    ),
                    field(
                        "is_cast",
                        seq([sym("expression"), string("is"), sym("type")]),
                    ),
                ]),
            ),
        )
        .rule(
            "size_expression",
            seq([string("size"), string("("), sym("type"), string(")")]),
        )
        .rule(
            "call_expression",
            prec(
                precedence::CALL,
                seq([
                    field("callee", sym("expression")),
                    string("("),
                    optional_comma_sep(choice([
                        sym("expression"),
                        sym("variadic_argument"),
                    ])),
                    string(")"),
                ]),
            ),
        )
        .rule(
            "variadic_argument",
            seq([sym("expression"), string("...")]),
        )
        .rule(
            "index_expression",
            prec(
                precedence::MEMBER,
                seq([
                    sym("expression"),
                    string("["),
                    sym("expression"),
                    string("]"),
                ]),
            ),
        )
        .rule(
            "range_expression",
            prec(
                precedence::MEMBER,
                seq([
                    sym("expression"),
                    string("["),
                    optional(sym("expression")),
                    string(".."),
                    optional(sym("expression")),
                    string("]"),
                ]),
            ),
        )
        .rule(
            "member_expression",
            prec(
                precedence::MEMBER,
                seq([
                    sym("expression"),
                    string("."),
                    choice([sym("identifier"), sym("number")]),
                ]),
            ),
        )
        .rule("try_expression", seq([sym("expression"), string("?")]))
        .rule(
            "parenthesis_expression",
            prec(
                precedence::PARENTHESES,
                seq([string("("), sym("expression"), string(")")]),
            ),
        )
        .rule(
            "let_expression",
            seq([
                string("let"),
                comma_sep1(seq([
                    sym("identifier"),
                    optional(seq([string(":"), sym("type")])),
                    optional(seq([string("="), sym("expression")])),
                ])),
            ]),
        )
        .rule(
            "switch_expression",
            seq([
                string("switch"),
                sym("expression"),
                string("{"),
                repeat(sym("case")),
                string("}"),
            ]),
        )
        .rule(
            "match_expression",
            seq([
                string("match"),
                sym("expression"),
                string("{"),
                repeat(sym("case")),
                string("}"),
            ]),
        )
        .rule(
            "case",
            seq([
                string("case"),
                optional(choice([
                    comma_sep1(sym("expression")),
                    sym("let_expression"),
                    sym("array_type"),
                    sym("builtin_type"),
                ])),
                string("=>"),
                repeat1(sym("statement")),
            ]),
        )
        // Literals
        .rule(
            "literal",
            choice(
                [
                    "array_literal",
                    "struct_literal",
                    "tuple_literal",
                    "number",
                    "float",
                    "string",
                    "raw_string",
                    "concatenated_string",
                    "rune",
                    "boolean",
                    "void",
                    "null",
                ]
                .map(sym),
            ),
        )
        .rule(
            "array_literal",
            prec_right(
                0,
                seq([
                    string("["),
                    optional_comma_sep(seq([sym("expression"), optional(string("..."))])),
                    string("]"),
                ]),
            ),
        )
        .rule(
            "struct_literal",
            choice([
                seq([
                    string("struct"),
                    string("{"),
                    optional_comma_sep1(sym("field_assignment")),
                    string("}"),
                ]),
                seq([
                    choice([sym("identifier"), sym("scoped_type_identifier")]),
                    string("{"),
                    choice([
                        seq([
                            comma_sep1(sym("field_assignment")),
                            optional(seq([string(","), optional(string("..."))])),
                        ]),
                        string("..."),
                    ]),
                    string("}"),
                ]),
            ]),
        )
        .rule(
            "field_assignment",
            choice([
                seq([sym("identifier"), string("="), sym("expression")]),
                seq([
                    sym("identifier"),
                    string(":"),
                    sym("type"),
                    string("="),
                    sym("expression"),
                ]),
                sym("struct_literal"),
            ]),
        )
        .rule(
            "tuple_literal",
            seq([
                string("("),
                optional_comma_sep1(sym("expression")),
                string(")"),
            ]),
        )
        .rule("number", number())
        .rule("float", float())
        .rule("integer_suffix", strings(INTEGER_SUFFIXES))
        .rule(
            "string",
            seq([
                string("\""),
                repeat(choice([sym("string_content"), sym("_escape_sequence")])),
                string("\""),
            ]),
        )
        .rule(
            "raw_string",
            seq([string("`"), sym("raw_string_content"), string("`")]),
        )
        .rule(
            "concatenated_string",
            seq([sym("string"), repeat1(sym("string"))]),
        )
        .rule("string_content", token(prec(1, pattern("[^\"\\\\]+"))))
        .rule("raw_string_content", token(prec(1, pattern("[^`]*"))))
        .rule(
            "rune",
            seq([
                string("'"),
                choice([immediate_token(pattern("[^\\']")), sym("_escape_sequence")]),
                string("'"),
            ]),
        )
        .rule(
            "_escape_sequence",
            choice([
                prec(
                    2,
                    immediate_token(seq([string("\\"), pattern("[^abfnrtvxu'\"\\\\?]")])),
                ),
                prec(1, sym("escape_sequence")),
            ]),
        )
        .rule(
            "escape_sequence",
            immediate_token(seq([
                string("\\"),
                choice([
                    pattern("[^xu0-7]"),
                    pattern("[0-7]{1,3}"),
                    pattern("x[0-9a-fA-F]{2}"),
                    pattern("u[0-9a-fA-F]{4}"),
                    pattern("u\\{[0-9a-fA-F]+\\}"),
                    pattern("U[0-9a-fA-F]{8}"),
                ]),
            ])),
        )
        .rule("boolean", strings(["true", "false"]))
        .rule("void", string("void"))
        .rule("null", string("null"))
        .rule(
            "scoped_type_identifier",
            seq([
                field(
                    "path",
                    choice([sym("identifier"), sym("scoped_type_identifier")]),
                ),
                string("::"),
                field("name", sym("identifier")),
            ]),
        )
        .rule("identifier", pattern("[a-zA-Z_][a-zA-Z0-9_]*"))
        .rule(
            "comment",
            token(seq([string("//"), pattern("(\\\\(.|\\r?\\n)|[^\\\\\\n])*")])),
        )
        .build()
}

fn number() -> Rule {
    let decimal = || pattern("0|[1-9][0-9]*");
    let integer = token(choice([
        decimal(),
        pattern("0x[0-9a-fA-F][0-9a-fA-F]*"),
        pattern("0o[0-7][0-7]*"),
        pattern("0b[01][01]*"),
    ]));

    choice([
        seq([integer, optional(sym("integer_suffix"))]),
        seq([
            token(seq([decimal(), optional(exponent())])),
            optional(sym("integer_suffix")),
        ]),
    ])
}

fn float() -> Rule {
    let decimal = || pattern("[0-9]+");
    let width = || strings(["f32", "f64"]);

    choice([
        seq([token(seq([
            decimal(),
            string("."),
            decimal(),
            optional(exponent()),
            optional(width()),
        ]))]),
        token(seq([decimal(), optional(exponent()), width()])),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grammar_shape() {
        let grammar = grammar();
        assert_eq!(grammar.name, "hare");
        assert_eq!(grammar.start_rule(), Some("module"));
        assert_eq!(grammar.word.as_deref(), Some("identifier"));
        assert_eq!(grammar.supertypes.as_ref().map(Vec::len), Some(5));
        assert!(grammar.is_supertype("expression"));
        assert!(!grammar.is_supertype("block"));
        assert_eq!(
            grammar.conflicts,
            Some(vec![vec!["builtin_type".to_owned(), "void".to_owned()]])
        );
    }

    #[test]
    fn test_binary_expression_has_one_alternative_per_operator() {
        let grammar = grammar();
        let binary = grammar.rule("binary_expression").unwrap();
        assert_eq!(binary.members.len(), BINARY_OPERATORS.len());
        assert_eq!(binary.members[2].precedence(), Some(precedence::MULTIPLY));
    }

    #[test]
    fn test_reserved_words() {
        assert!(is_reserved("fn"));
        assert!(is_reserved("u8"));
        assert!(is_reserved("_"));
        assert!(!is_reserved("main"));
        assert!(!is_reserved("z"));
    }
}
