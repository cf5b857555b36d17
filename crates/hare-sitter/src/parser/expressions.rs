//! Expressions, parsed by precedence climbing.

use super::Parse;
use crate::hare::{self, precedence};
use crate::lexer::TokenKind;

impl Parse<'_> {
    pub(super) fn expression(&mut self) {
        self.expression_bp(precedence::ASSIGNMENT);
    }

    /// An expression labelled with `field`.
    pub(super) fn expression_field(&mut self, field: &str) {
        let checkpoint = self.checkpoint();
        self.expression();
        self.label_since(checkpoint, field);
    }

    /// Parses an expression whose operators all bind at least as tightly as
    /// `min`.
    fn expression_bp(&mut self, min: i32) {
        if !self.enter() {
            return;
        }
        let checkpoint = self.checkpoint();
        self.operand();

        loop {
            if !matches!(self.nth_kind(0), Some(TokenKind::Punct | TokenKind::Word)) {
                break;
            }
            let text = self.nth_text(0);
            match text {
                "(" if precedence::CALL >= min => {
                    self.label_since(checkpoint, "callee");
                    self.bump();
                    self.arguments();
                    self.expect(")");
                    self.wrap(checkpoint, "call_expression");
                }
                "[" if precedence::MEMBER >= min => self.index_or_range(checkpoint),
                "." if precedence::MEMBER >= min => {
                    self.bump();
                    if matches!(self.nth_kind(0), Some(TokenKind::Number { .. })) {
                        self.literal();
                    } else {
                        self.identifier();
                    }
                    self.wrap(checkpoint, "member_expression");
                }
                "!" if precedence::MEMBER >= min => {
                    self.bump();
                    self.wrap(checkpoint, "error_assertion_expression");
                }
                "?" if precedence::MEMBER >= min => {
                    self.bump();
                    self.wrap(checkpoint, "try_expression");
                }
                ":" | "as" | "is" if precedence::CAST >= min => {
                    let field = match text {
                        ":" => "type_cast",
                        "as" => "as_cast",
                        _ => "is_cast",
                    };
                    self.bump();
                    self.type_();
                    self.label_since(checkpoint, field);
                    self.wrap(checkpoint, "cast_expression");
                }
                "=" if precedence::ASSIGNMENT >= min => {
                    self.bump();
                    self.expression_bp(precedence::ASSIGNMENT);
                    self.wrap(checkpoint, "assignment_expression");
                }
                _ if precedence::ASSIGNMENT >= min && hare::UPDATE_OPERATORS.contains(&text) => {
                    self.bump();
                    self.expression_bp(precedence::ASSIGNMENT);
                    self.wrap(checkpoint, "update_expression");
                }
                _ => {
                    let Some(&(_, level)) = hare::BINARY_OPERATORS
                        .iter()
                        .find(|(operator, _)| *operator == text)
                    else {
                        break;
                    };
                    if level < min {
                        break;
                    }
                    self.label_since(checkpoint, "left");
                    let operator = self.checkpoint();
                    self.bump();
                    self.label_since(operator, "operator");
                    let right = self.checkpoint();
                    self.expression_bp(level + 1);
                    self.label_since(right, "right");
                    self.wrap(checkpoint, "binary_expression");
                }
            }
        }
        self.leave();
    }

    fn index_or_range(&mut self, checkpoint: super::Checkpoint) {
        self.bump();
        let range = if self.eat("..") {
            true
        } else {
            self.expression();
            self.eat("..")
        };
        if range && !self.at("]") {
            self.expression();
        }
        self.expect("]");
        let kind = if range {
            "range_expression"
        } else {
            "index_expression"
        };
        self.wrap(checkpoint, kind);
    }

    fn arguments(&mut self) {
        while !self.at_sync() {
            let checkpoint = self.checkpoint();
            self.expression();
            if self.eat("...") {
                self.wrap(checkpoint, "variadic_argument");
            }
            if !self.eat(",") {
                break;
            }
        }
    }

    /// Everything an operator can apply to.
    fn operand(&mut self) {
        match self.nth_kind(0) {
            Some(
                TokenKind::Number { .. }
                | TokenKind::Float
                | TokenKind::String
                | TokenKind::RawString
                | TokenKind::Rune,
            ) => self.literal(),
            Some(TokenKind::Word | TokenKind::Punct) => self.keyword_or_punct_operand(),
            _ => self.unexpected("identifier"),
        }
    }

    fn keyword_or_punct_operand(&mut self) {
        match self.nth_text(0) {
            "+" | "-" | "~" | "!" | "*" => self.unary("operator"),
            "&" => self.unary("address"),
            "(" => self.parenthesized(false),
            "[" => self.array_literal(),
            "{" => self.block(),
            ":" if self.nth_is_identifier(1) && self.nth_is(2, "{") => self.block(),
            "if" => self.if_statement(),
            "for" => self.for_statement(),
            "return" => self.return_statement(),
            "switch" => self.switch_or_match("switch_expression"),
            "match" => self.switch_or_match("match_expression"),
            "struct" => self.anonymous_struct_literal(),
            "true" | "false" => {
                self.start("boolean");
                self.bump();
                self.finish();
            }
            "void" => self.bump_named("void"),
            "null" => self.bump_named("null"),
            "size" if self.nth_is(1, "(") => {
                self.start("size_expression");
                self.bump();
                self.bump();
                self.type_();
                self.expect(")");
                self.finish();
            }
            _ if self.at_identifier() => self.path_or_struct_literal(),
            _ => self.unexpected("identifier"),
        }
    }

    fn unary(&mut self, operator_field: &str) {
        self.start("unary_expression");
        let operator = self.checkpoint();
        self.bump();
        self.label_since(operator, operator_field);
        let argument = self.checkpoint();
        self.expression_bp(precedence::UNARY);
        self.label_since(argument, "argument");
        self.finish();
    }

    /// A parenthesised expression or a tuple literal. Destructuring targets
    /// are always tuples.
    pub(super) fn parenthesized(&mut self, tuple: bool) {
        let checkpoint = self.checkpoint();
        self.bump();
        self.expression();
        if tuple || self.at(",") {
            while self.eat(",") && !self.at(")") {
                self.expression();
            }
            self.expect(")");
            self.wrap(checkpoint, "tuple_literal");
        } else {
            self.expect(")");
            self.wrap(checkpoint, "parenthesis_expression");
        }
    }

    fn array_literal(&mut self) {
        self.start("array_literal");
        self.bump();
        while !self.at_sync() {
            self.expression();
            self.eat("...");
            if !self.eat(",") {
                break;
            }
        }
        self.expect("]");
        self.finish();
    }

    /// Whether the `{` ahead opens a struct literal rather than a block. Only
    /// field assignments or `...` can follow, which keeps `switch x {` and
    /// `if (c) x {` unambiguous.
    fn at_struct_literal_body(&self) -> bool {
        self.at("{")
            && (self.nth_is(1, "...")
                || self.nth_is(1, "struct")
                || (self.nth_is_identifier(1) && (self.nth_is(2, "=") || self.nth_is(2, ":"))))
    }

    fn path_or_struct_literal(&mut self) {
        let checkpoint = self.checkpoint();
        self.path();
        if !self.at_struct_literal_body() {
            return;
        }
        self.bump();
        if !self.eat("...") {
            loop {
                self.field_assignment();
                if !self.eat(",") || self.eat("...") || self.at("}") {
                    break;
                }
            }
        }
        self.expect("}");
        self.wrap(checkpoint, "struct_literal");
    }

    fn anonymous_struct_literal(&mut self) {
        self.start("struct_literal");
        self.bump();
        self.expect("{");
        loop {
            self.field_assignment();
            if !self.eat(",") || self.at("}") {
                break;
            }
        }
        self.expect("}");
        self.finish();
    }

    fn field_assignment(&mut self) {
        self.start("field_assignment");
        if self.at("struct") {
            self.anonymous_struct_literal();
        } else if self.at_identifier() && (self.nth_is(1, "{") || self.nth_is(1, "::")) {
            self.path_or_struct_literal();
        } else {
            self.identifier();
            if self.eat(":") {
                self.type_();
            }
            self.expect("=");
            self.expression();
        }
        self.finish();
    }
}
