//! Statements, blocks and the control flow expressions built from them.

use super::Parse;

impl Parse<'_> {
    pub(super) fn block(&mut self) {
        self.start("block");
        if self.at(":") {
            self.label();
        }
        self.expect("{");
        self.statements(&["}"]);
        self.expect("}");
        self.finish();
    }

    /// Statements up to, but not including, one of `terminators`.
    fn statements(&mut self, terminators: &[&str]) {
        while !self.at_eof() && !terminators.iter().any(|t| self.at(t)) {
            let before = self.pos;
            self.statement();
            if self.pos == before {
                self.error_token();
            }
        }
    }

    fn label(&mut self) {
        self.start("label");
        self.expect(":");
        self.identifier_field("label");
        self.finish();
    }

    fn statement(&mut self) {
        if !self.enter() {
            return;
        }
        match self.nth_text(0) {
            "break" => {
                self.start("break_statement");
                self.bump();
                if self.at(":") {
                    self.label();
                }
                self.expect(";");
                self.finish();
            }
            "defer" => {
                self.start("defer_statement");
                self.bump();
                self.statement();
                self.finish();
            }
            "yield" => self.yield_statement(),
            "static" if self.nth_is(1, "let") => self.let_declaration(),
            "static" if self.nth_is(1, "const") => self.const_declaration(),
            "static" => {
                self.start("static_operation");
                self.bump();
                self.expression();
                self.expect(";");
                self.finish();
            }
            "let" => self.let_declaration(),
            "const" => self.const_declaration(),
            // Left for the caller to report.
            _ if self.at_sync() => {}
            _ => {
                self.start("expression_statement");
                self.expression();
                self.expect(";");
                self.finish();
            }
        }
        self.leave();
    }

    fn yield_statement(&mut self) {
        self.start("yield_statement");
        self.bump();
        if self.at(":") {
            self.label();
            self.expect(",");
            self.expression();
        } else if !self.at(";") {
            self.expression();
        }
        self.expect(";");
        self.finish();
    }

    fn let_declaration(&mut self) {
        self.start("let_declaration");
        self.eat("static");
        self.bump();
        loop {
            self.binding_target();
            if self.eat(":") {
                self.type_();
            }
            if self.eat("=") {
                self.expression();
            }
            if !self.eat(",") {
                break;
            }
        }
        self.expect(";");
        self.finish();
    }

    fn const_declaration(&mut self) {
        self.start("const_declaration");
        self.eat("static");
        self.bump();
        loop {
            self.binding_target();
            if self.eat(":") {
                self.type_();
            }
            self.expect("=");
            self.expression();
            if !self.eat(",") {
                break;
            }
        }
        self.expect(";");
        self.finish();
    }

    /// A bound name, or a tuple of names to destructure into.
    fn binding_target(&mut self) {
        if self.at("(") {
            self.parenthesized(true);
        } else {
            self.identifier();
        }
    }

    pub(super) fn let_expression(&mut self) {
        self.start("let_expression");
        self.bump();
        loop {
            self.identifier();
            if self.eat(":") {
                self.type_();
            }
            if self.eat("=") {
                self.expression();
            }
            if !self.eat(",") {
                break;
            }
        }
        self.finish();
    }

    pub(super) fn if_statement(&mut self) {
        self.start("if_statement");
        self.bump();
        self.expect("(");
        self.expression_field("condition");
        self.expect(")");
        self.expression_field("consequence");
        if self.at("else") {
            self.start("else_statement");
            self.bump();
            self.expression_field("alternative");
            self.finish();
        }
        self.finish();
    }

    pub(super) fn for_statement(&mut self) {
        self.start("for_statement");
        self.bump();
        self.expect("(");
        if self.at("let") {
            self.let_expression();
            self.expect(";");
        }
        self.expression_field("condition");
        if self.eat(";") {
            self.expression_field("afterthought");
        }
        self.expect(")");
        self.expression_field("body");
        self.finish();
    }

    pub(super) fn return_statement(&mut self) {
        self.start("return_statement");
        self.bump();
        if !self.at_sync() {
            self.expression();
        }
        self.finish();
    }

    /// `switch` and `match` share their shape and differ only in kind.
    pub(super) fn switch_or_match(&mut self, kind: &str) {
        self.start(kind);
        self.bump();
        self.expression();
        self.expect("{");
        while !self.at("}") && !self.at_eof() {
            if self.at("case") {
                self.case();
            } else {
                self.error_token();
            }
        }
        self.expect("}");
        self.finish();
    }

    fn case(&mut self) {
        self.start("case");
        self.bump();
        if self.at("let") {
            self.let_expression();
        } else if self.at("[") && self.nth_is(1, "]") {
            self.array_type();
        } else if self.at_builtin_type() && self.nth_is(1, "=>") {
            self.builtin_type();
        } else if !self.at("=>") {
            loop {
                self.expression();
                if !self.eat(",") {
                    break;
                }
            }
        }
        self.expect("=>");
        self.statements(&["case", "}"]);
        self.finish();
    }
}
