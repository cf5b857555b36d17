//! Numbers, strings and runes.
//!
//! Literal tokens arrive whole from the lexer and are split here into the
//! nodes the grammar describes.

use super::Parse;
use crate::lexer::{escape_len, is_named_escape, TokenKind};
use std::ops::Range;

impl Parse<'_> {
    pub(super) fn literal(&mut self) {
        match self.nth_kind(0) {
            Some(TokenKind::Number { suffix }) => self.number(suffix),
            Some(TokenKind::Float) => self.bump_named("float"),
            Some(TokenKind::String) if self.nth_kind(1) == Some(TokenKind::String) => {
                let checkpoint = self.checkpoint();
                while self.nth_kind(0) == Some(TokenKind::String) {
                    self.string();
                }
                self.wrap(checkpoint, "concatenated_string");
            }
            Some(TokenKind::String) => self.string(),
            Some(TokenKind::RawString) => self.raw_string(),
            Some(TokenKind::Rune) => self.rune(),
            _ => self.unexpected("number"),
        }
    }

    fn number(&mut self, suffix: Option<usize>) {
        self.start("number");
        if let Some(token) = self.take() {
            let start = token.range.start;
            match suffix {
                Some(offset) => {
                    self.builder.hidden(start..start + offset);
                    self.builder.start_node("integer_suffix");
                    let suffix = start + offset..token.range.end;
                    let source = self.source;
                    let text = &source[suffix.clone()];
                    self.builder.token(suffix, text);
                    self.builder.finish_node();
                }
                None => self.builder.hidden(token.range),
            }
        }
        self.finish();
    }

    pub(super) fn string(&mut self) {
        self.start("string");
        if let Some(token) = self.take() {
            let Range { start, end } = token.range;
            self.builder.token(start..start + 1, "\"");
            self.string_body(start + 1, end - 1);
            self.builder.token(end - 1..end, "\"");
        }
        self.finish();
    }

    /// Splits the inside of a string into content runs and escapes.
    fn string_body(&mut self, start: usize, end: usize) {
        let source = self.source;
        let body = &source[start..end];
        let mut run = 0;
        let mut at = 0;
        while at < body.len() {
            if body.as_bytes()[at] != b'\\' {
                at += 1;
                continue;
            }
            if run < at {
                self.builder.leaf(start + run..start + at, "string_content");
            }
            let len = 1 + escape_len(&body[at + 1..]);
            self.escape(start + at..start + at + len);
            at += len;
            run = at;
        }
        if run < body.len() {
            self.builder.leaf(start + run..end, "string_content");
        }
    }

    fn escape(&mut self, range: Range<usize>) {
        if is_named_escape(&self.source[range.start + 1..range.end]) {
            self.builder.leaf(range, "escape_sequence");
        } else {
            self.builder.hidden(range);
        }
    }

    fn raw_string(&mut self) {
        self.start("raw_string");
        if let Some(token) = self.take() {
            let Range { start, end } = token.range;
            self.builder.token(start..start + 1, "`");
            self.builder.leaf(start + 1..end - 1, "raw_string_content");
            self.builder.token(end - 1..end, "`");
        }
        self.finish();
    }

    fn rune(&mut self) {
        self.start("rune");
        if let Some(token) = self.take() {
            let Range { start, end } = token.range;
            self.builder.token(start..start + 1, "'");
            let inner = start + 1..end - 1;
            if self.source.as_bytes()[inner.start] == b'\\' {
                self.escape(inner);
            } else {
                self.builder.hidden(inner);
            }
            self.builder.token(end - 1..end, "'");
        }
        self.finish();
    }
}
