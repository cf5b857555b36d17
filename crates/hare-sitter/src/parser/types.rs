//! Types, struct and union fields.

use super::Parse;
use crate::lexer::TokenKind;

impl Parse<'_> {
    /// Whether the next token can begin a type.
    pub(super) fn at_type_start(&self) -> bool {
        self.at_identifier()
            || self.at_builtin_type()
            || self.nth_kind(0) == Some(TokenKind::Attribute)
            || ["nullable", "*", "const", "!", "[", "enum", "struct", "union", "(", "fn", "..."]
                .iter()
                .any(|t| self.at(t))
    }

    pub(super) fn type_(&mut self) {
        if !self.enter() {
            return;
        }
        match self.nth_text(0) {
            _ if self.at_builtin_type() => self.builtin_type(),
            "nullable" | "*" => {
                self.start("pointer_type");
                self.eat("nullable");
                self.expect("*");
                self.type_();
                self.finish();
            }
            "const" => self.prefixed_type("const_type"),
            "!" => self.prefixed_type("error_type"),
            "..." => self.prefixed_type("unwrapped_type"),
            "[" if self.nth_is(1, "]") => self.array_type(),
            "[" => self.slice_type(),
            "enum" => self.enum_type(),
            "struct" => {
                self.start("struct_type");
                self.bump();
                self.eat("@packed");
                self.fields();
                self.finish();
            }
            "union" => {
                self.start("union_type");
                self.bump();
                self.fields();
                self.finish();
            }
            "(" => self.tuple_or_tagged_union(),
            "fn" => self.function_type(),
            _ if self.nth_kind(0) == Some(TokenKind::Attribute) => self.function_type(),
            _ if self.at_identifier() => self.path(),
            _ => self.unexpected("identifier"),
        }
        self.leave();
    }

    pub(super) fn builtin_type(&mut self) {
        self.start("builtin_type");
        self.bump();
        self.finish();
    }

    /// A keyword or operator followed by a type.
    fn prefixed_type(&mut self, kind: &str) {
        self.start(kind);
        self.bump();
        self.type_();
        self.finish();
    }

    pub(super) fn array_type(&mut self) {
        self.start("array_type");
        self.bump();
        self.bump();
        self.type_();
        self.finish();
    }

    fn slice_type(&mut self) {
        self.start("slice_type");
        self.bump();
        let checkpoint = self.checkpoint();
        if !self.eat("_") && !self.eat("*") {
            self.expression();
        }
        self.label_since(checkpoint, "size");
        self.expect("]");
        self.type_();
        self.finish();
    }

    fn enum_type(&mut self) {
        self.start("enum_type");
        self.bump();
        if self.at_builtin_type() {
            self.builtin_type();
        }
        self.expect("{");
        loop {
            self.start("enum_field");
            self.identifier();
            if self.eat("=") {
                self.expression();
            }
            self.finish();
            if !self.eat(",") || self.at("}") {
                break;
            }
        }
        self.expect("}");
        self.finish();
    }

    fn tuple_or_tagged_union(&mut self) {
        let checkpoint = self.checkpoint();
        self.bump();
        if self.eat(")") {
            self.wrap(checkpoint, "tuple_type");
            return;
        }
        self.type_();
        if self.at("|") {
            while self.eat("|") {
                self.type_();
            }
            self.expect(")");
            self.wrap(checkpoint, "tagged_union_type");
        } else {
            while self.eat(",") {
                self.type_();
            }
            self.expect(")");
            self.wrap(checkpoint, "tuple_type");
        }
    }

    fn function_type(&mut self) {
        self.start("function_type");
        if self.nth_kind(0) == Some(TokenKind::Attribute) {
            self.function_attribute();
        }
        self.expect("fn");
        self.expect("(");
        self.parameters();
        self.expect(")");
        if self.at_type_start() {
            let checkpoint = self.checkpoint();
            self.type_();
            self.label_since(checkpoint, "returns");
        }
        self.finish();
    }

    /// The braced field list of a struct or union type.
    fn fields(&mut self) {
        self.expect("{");
        loop {
            self.field();
            if !self.eat(",") || self.at("}") {
                break;
            }
        }
        self.expect("}");
    }

    fn field(&mut self) {
        self.start("field");
        if self.at("@offset") {
            self.start("offset_specifier");
            self.bump();
            self.expect("(");
            self.expression();
            self.expect(")");
            self.finish();
        }
        if self.at("struct") || self.at("union") {
            self.type_();
        } else if self.at_identifier() && self.nth_is(1, ":") {
            self.identifier();
            self.bump();
            self.type_();
        } else {
            self.path();
        }
        self.finish();
    }
}
