//! Modules, imports and top-level declarations.

use super::Parse;
use crate::lexer::TokenKind;

const FUNCTION_ATTRIBUTES: [&str; 4] = ["@fini", "@init", "@test", "@noreturn"];

impl Parse<'_> {
    pub(super) fn module(&mut self) {
        // Leading comments belong to the module itself.
        self.builder.start_node("module");
        if self.at("use") {
            self.start("imports");
            while self.at("use") {
                self.use_statement();
            }
            self.finish();
        }
        if !self.at_eof() {
            self.start("declarations");
            while !self.at_eof() {
                self.declaration();
            }
            self.finish();
        }
        self.flush_trivia();
        self.finish();
    }

    fn use_statement(&mut self) {
        self.start("use_statement");
        self.bump();
        if self.at_identifier() && self.nth_is(1, "=") {
            self.identifier();
            self.bump();
            self.path();
        } else {
            self.path();
            if self.eat("::") && !self.eat("*") {
                self.expect("{");
                loop {
                    self.identifier();
                    if !self.eat(",") || self.at("}") {
                        break;
                    }
                }
                self.expect("}");
            }
        }
        self.expect(";");
        self.finish();
    }

    /// An `identifier` or a `scoped_type_identifier` such as `io::file`.
    ///
    /// Stops in front of a `::` that is not followed by a name, leaving it for
    /// the caller.
    pub(super) fn path(&mut self) {
        let checkpoint = self.checkpoint();
        self.identifier();
        while self.at("::") && self.nth_is_identifier(1) {
            self.label_since(checkpoint, "path");
            self.bump();
            self.identifier_field("name");
            self.wrap(checkpoint, "scoped_type_identifier");
        }
    }

    fn at_declaration_start(&self) -> bool {
        ["export", "fn", "def", "type", "let", "const"]
            .iter()
            .any(|k| self.at(k))
            || self.nth_kind(0) == Some(TokenKind::Attribute)
    }

    fn declaration(&mut self) {
        let head = usize::from(self.at("export"));
        match self.nth_text(head) {
            "const" | "let" => self.global_declaration(),
            "def" => self.constant_declaration(),
            "type" => self.type_declaration(),
            "fn" => self.function_declaration(),
            _ if self.nth_kind(head) == Some(TokenKind::Attribute) => self.function_declaration(),
            _ => self.recover_declaration(),
        }
    }

    /// Skips to the end of the current declaration, keeping brackets
    /// balanced, and wraps everything skipped in an `ERROR` node.
    fn recover_declaration(&mut self) {
        tracing::debug!(offset = self.offset(), "skipping input at declaration level");
        self.builder.start_error();
        let mut depth = 0usize;
        let mut first = true;
        while !self.at_eof() {
            if depth == 0 && !first && self.at_declaration_start() {
                break;
            }
            first = false;
            match self.nth_text(0) {
                "{" | "(" | "[" => depth += 1,
                "}" | ")" | "]" => depth = depth.saturating_sub(1),
                ";" if depth == 0 => {
                    self.bump();
                    break;
                }
                _ => {}
            }
            self.bump_any();
        }
        self.finish();
    }

    fn global_declaration(&mut self) {
        self.start("global_declaration");
        self.eat("export");
        self.bump();
        loop {
            self.global_binding();
            if !self.eat(",") {
                break;
            }
        }
        self.expect(";");
        self.finish();
    }

    fn global_binding(&mut self) {
        self.start("global_binding");
        if self.at("@symbol") {
            self.declaration_attribute();
        }
        self.identifier();
        self.expect(":");
        self.type_();
        if self.eat("=") {
            self.expression();
        }
        self.finish();
    }

    fn declaration_attribute(&mut self) {
        self.start("declaration_attribute");
        self.bump();
        self.expect("(");
        if self.nth_kind(0) == Some(TokenKind::String) {
            self.string();
        } else {
            self.builder.missing("string", true);
        }
        self.expect(")");
        self.finish();
    }

    fn constant_declaration(&mut self) {
        self.start("constant_declaration");
        self.eat("export");
        self.bump();
        loop {
            self.identifier();
            self.expect(":");
            self.type_();
            self.expect("=");
            self.expression();
            if !self.eat(",") {
                break;
            }
        }
        self.expect(";");
        self.finish();
    }

    fn type_declaration(&mut self) {
        self.start("type_declaration");
        self.eat("export");
        self.bump();
        loop {
            self.identifier();
            self.expect("=");
            self.type_();
            if !self.eat(",") || self.at(";") {
                break;
            }
        }
        self.expect(";");
        self.finish();
    }

    fn function_declaration(&mut self) {
        self.start("function_declaration");
        self.eat("export");
        while self.nth_kind(0) == Some(TokenKind::Attribute) {
            self.function_attribute();
        }
        self.expect("fn");
        self.identifier_field("name");
        self.expect("(");
        self.parameters();
        self.expect(")");
        if self.at_type_start() {
            let checkpoint = self.checkpoint();
            self.type_();
            self.label_since(checkpoint, "returns");
        }
        if self.eat("=") {
            let checkpoint = self.checkpoint();
            self.expression();
            self.label_since(checkpoint, "body");
        }
        self.expect(";");
        self.finish();
    }

    pub(super) fn function_attribute(&mut self) {
        self.start("function_attribute");
        if self.at("@symbol") {
            self.declaration_attribute();
        } else if FUNCTION_ATTRIBUTES.iter().any(|a| self.at(a)) {
            self.bump();
        } else {
            self.error_token();
        }
        self.finish();
    }

    /// The comma separated parameters between a function's parentheses.
    pub(super) fn parameters(&mut self) {
        while !self.at_sync() {
            self.parameter();
            if !self.eat(",") {
                break;
            }
        }
    }

    fn parameter(&mut self) {
        self.start("parameter");
        if !self.eat("_") {
            self.identifier();
        }
        self.expect(":");
        self.type_();
        self.eat("...");
        self.finish();
    }
}
