//! Tokenizer for Hare source text.
//!
//! The lexer works on bytes and never fails: anything it cannot classify
//! becomes a [`TokenKind::Unknown`] token that the parser wraps in an
//! `ERROR` node.

use std::ops::Range;

/// Coarse token classes. Punctuation and keywords are distinguished by text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// An identifier or keyword.
    Word,
    /// An attribute such as `@test`.
    Attribute,
    /// Operators and delimiters.
    Punct,
    /// An integer literal, possibly with a suffix.
    Number {
        /// Offset of the integer suffix, relative to the token start.
        suffix: Option<usize>,
    },
    /// A floating point literal.
    Float,
    /// A double-quoted string.
    String,
    /// A backtick-quoted string.
    RawString,
    /// A rune literal.
    Rune,
    /// A `//` comment.
    Comment,
    /// Anything that could not be lexed.
    Unknown,
}

/// A lexed token: a kind and a byte range into the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// What was lexed.
    pub kind: TokenKind,
    /// Where it was lexed.
    pub range: Range<usize>,
}

impl Token {
    /// The token's source text.
    #[must_use]
    pub fn text<'s>(&self, source: &'s str) -> &'s str {
        &source[self.range.clone()]
    }

    /// Whether the token is trivia the parser skips.
    #[must_use]
    pub fn is_comment(&self) -> bool {
        self.kind == TokenKind::Comment
    }
}

const PUNCTUATION: &[&str] = &[
    "<<=", ">>=", "||=", "&&=", "^^=", "...", "::", "=>", "==", "!=", "<=", ">=", "<<", ">>",
    "&&", "||", "^^", "+=", "-=", "*=", "/=", "%=", "|=", "&=", "^=", "..", "+", "-", "*",
    "/", "%", "=", "<", ">", "!", "~", "&", "|", "^", "(", ")", "[", "]", "{", "}", ",", ";",
    ":", ".", "?",
];

const SUFFIXES: [&str; 11] = [
    "i16", "i32", "i64", "u16", "u32", "u64", "i8", "u8", "i", "u", "z",
];

/// Splits `source` into tokens, comments included.
#[must_use]
pub fn tokenize(source: &str) -> Vec<Token> {
    let mut lexer = Lexer {
        source,
        bytes: source.as_bytes(),
        pos: 0,
        after_dot: false,
    };
    let mut tokens = Vec::new();
    while let Some(token) = lexer.next_token() {
        if !token.is_comment() {
            lexer.after_dot = token.kind == TokenKind::Punct && token.text(source) == ".";
        }
        tokens.push(token);
    }
    tokens
}

struct Lexer<'s> {
    source: &'s str,
    bytes: &'s [u8],
    pos: usize,
    // Tuple member access: `t.0.1` is two accesses, not a float.
    after_dot: bool,
}

fn is_word_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_'
}

fn is_word_continue(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

impl Lexer<'_> {
    fn peek(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.pos + offset).copied()
    }

    fn rest(&self) -> &str {
        &self.source[self.pos..]
    }

    fn eat_while(&mut self, pred: impl Fn(u8) -> bool) -> usize {
        let start = self.pos;
        while self.peek(0).is_some_and(&pred) {
            self.pos += 1;
        }
        self.pos - start
    }

    fn next_token(&mut self) -> Option<Token> {
        self.eat_while(|b| b.is_ascii_whitespace());
        let start = self.pos;
        let first = self.peek(0)?;

        let kind = match first {
            b'/' if self.peek(1) == Some(b'/') => self.comment(),
            b'"' => self.string(),
            b'`' => self.raw_string(),
            b'\'' => self.rune(),
            b'@' if self.peek(1).is_some_and(is_word_start) => {
                self.pos += 1;
                self.eat_while(is_word_continue);
                TokenKind::Attribute
            }
            b if is_word_start(b) => {
                self.eat_while(is_word_continue);
                TokenKind::Word
            }
            b if b.is_ascii_digit() => self.number(),
            _ => self.punct(),
        };

        Some(Token { kind, range: start..self.pos })
    }

    fn comment(&mut self) -> TokenKind {
        self.pos += 2;
        while let Some(b) = self.peek(0) {
            match b {
                b'\n' => break,
                // A backslash continues the comment onto the next line.
                b'\\' => self.pos += if self.peek(1).is_some() { 2 } else { 1 },
                _ => self.pos += 1,
            }
        }
        TokenKind::Comment
    }

    fn string(&mut self) -> TokenKind {
        self.pos += 1;
        while let Some(b) = self.peek(0) {
            match b {
                b'"' => {
                    self.pos += 1;
                    return TokenKind::String;
                }
                b'\\' => self.pos += if self.peek(1).is_some() { 2 } else { 1 },
                _ => self.pos += 1,
            }
        }
        TokenKind::Unknown
    }

    fn raw_string(&mut self) -> TokenKind {
        match self.source[self.pos + 1..].find('`') {
            Some(end) => {
                self.pos += end + 2;
                TokenKind::RawString
            }
            None => {
                self.pos = self.bytes.len();
                TokenKind::Unknown
            }
        }
    }

    fn rune(&mut self) -> TokenKind {
        self.pos += 1;
        match self.peek(0) {
            Some(b'\\') => {
                self.pos += 1;
                let body = self.rest();
                self.pos += escape_len(body);
            }
            Some(b'\'' | b'\n') | None => return TokenKind::Unknown,
            Some(_) => {
                let width = self.rest().chars().next().map_or(1, char::len_utf8);
                self.pos += width;
            }
        }
        if self.peek(0) == Some(b'\'') {
            self.pos += 1;
            TokenKind::Rune
        } else {
            TokenKind::Unknown
        }
    }

    fn number(&mut self) -> TokenKind {
        let start = self.pos;
        let radix = match (self.peek(0), self.peek(1)) {
            (Some(b'0'), Some(b'x')) => Some(16),
            (Some(b'0'), Some(b'o')) => Some(8),
            (Some(b'0'), Some(b'b')) => Some(2),
            _ => None,
        };

        if let Some(radix) = radix {
            let digits = self.bytes[self.pos + 2..]
                .iter()
                .take_while(|b| char::from(**b).is_digit(radix))
                .count();
            if digits > 0 {
                self.pos += 2 + digits;
                return self.integer_suffix(start);
            }
        }

        self.eat_while(|b| b.is_ascii_digit());
        if self.after_dot {
            return self.integer_suffix(start);
        }
        let mut float = false;
        if self.peek(0) == Some(b'.') && self.peek(1).is_some_and(|b| b.is_ascii_digit()) {
            self.pos += 1;
            self.eat_while(|b| b.is_ascii_digit());
            float = true;
        }
        self.exponent();

        let width = self.rest().starts_with("f32") || self.rest().starts_with("f64");
        if width && !self.peek(3).is_some_and(is_word_continue) {
            self.pos += 3;
            return TokenKind::Float;
        }
        if float {
            TokenKind::Float
        } else {
            self.integer_suffix(start)
        }
    }

    fn exponent(&mut self) {
        if !matches!(self.peek(0), Some(b'e' | b'E')) {
            return;
        }
        let sign = usize::from(matches!(self.peek(1), Some(b'+' | b'-')));
        if self.peek(1 + sign).is_some_and(|b| b.is_ascii_digit()) {
            self.pos += 1 + sign;
            self.eat_while(|b| b.is_ascii_digit());
        }
    }

    fn integer_suffix(&mut self, start: usize) -> TokenKind {
        let at = self.pos;
        let suffix = SUFFIXES.iter().find(|s| {
            self.rest().starts_with(**s) && !self.peek(s.len()).is_some_and(is_word_continue)
        });
        match suffix {
            Some(s) => {
                self.pos += s.len();
                TokenKind::Number { suffix: Some(at - start) }
            }
            None => TokenKind::Number { suffix: None },
        }
    }

    fn punct(&mut self) -> TokenKind {
        let rest = self.rest();
        if let Some(p) = PUNCTUATION.iter().find(|p| rest.starts_with(**p)) {
            self.pos += p.len();
            return TokenKind::Punct;
        }
        let width = rest.chars().next().map_or(1, char::len_utf8);
        self.pos += width;
        TokenKind::Unknown
    }
}

/// Length in bytes of the escape body following a backslash: the part
/// matched by `[0-7]{1,3}`, `x..`, `u....`, `u{...}`, `U........` or a single
/// character.
#[must_use]
pub fn escape_len(body: &str) -> usize {
    let bytes = body.as_bytes();
    let hex_run = |from: usize, max: usize| {
        bytes[from.min(bytes.len())..]
            .iter()
            .take(max)
            .take_while(|b| b.is_ascii_hexdigit())
            .count()
    };

    match bytes.first() {
        None => 0,
        Some(b'0'..=b'7') => bytes
            .iter()
            .take(3)
            .take_while(|b| (b'0'..=b'7').contains(*b))
            .count(),
        Some(b'x') if hex_run(1, 2) == 2 => 3,
        Some(b'u') if bytes.get(1) == Some(&b'{') => {
            let digits = hex_run(2, usize::MAX);
            if digits > 0 && bytes.get(2 + digits) == Some(&b'}') {
                digits + 3
            } else {
                1
            }
        }
        Some(b'u') if hex_run(1, 4) == 4 => 5,
        Some(b'U') if hex_run(1, 8) == 8 => 9,
        Some(_) => body.chars().next().map_or(1, char::len_utf8),
    }
}

/// Whether the escape body is one the grammar names `escape_sequence`, as
/// opposed to an unrecognised `\c` that stays anonymous.
#[must_use]
pub fn is_named_escape(body: &str) -> bool {
    match body.as_bytes().first() {
        Some(b'x' | b'u' | b'U') => escape_len(body) > 1,
        Some(b'0'..=b'7') => true,
        Some(c) => b"abfnrtv'\"\\?".contains(c),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<(TokenKind, &str)> {
        tokenize(source)
            .into_iter()
            .map(|t| (t.kind, &source[t.range]))
            .collect()
    }

    #[test]
    fn test_words_and_punctuation() {
        assert_eq!(
            kinds("export fn main() void = x <<= 1;"),
            vec![
                (TokenKind::Word, "export"),
                (TokenKind::Word, "fn"),
                (TokenKind::Word, "main"),
                (TokenKind::Punct, "("),
                (TokenKind::Punct, ")"),
                (TokenKind::Word, "void"),
                (TokenKind::Punct, "="),
                (TokenKind::Word, "x"),
                (TokenKind::Punct, "<<="),
                (TokenKind::Number { suffix: None }, "1"),
                (TokenKind::Punct, ";"),
            ]
        );
    }

    #[test]
    fn test_attributes_and_scopes() {
        assert_eq!(
            kinds("@test fn a::b"),
            vec![
                (TokenKind::Attribute, "@test"),
                (TokenKind::Word, "fn"),
                (TokenKind::Word, "a"),
                (TokenKind::Punct, "::"),
                (TokenKind::Word, "b"),
            ]
        );
    }

    #[test]
    fn test_numbers() {
        assert_eq!(kinds("0x1F")[0].0, TokenKind::Number { suffix: None });
        assert_eq!(kinds("0o17u8")[0], (TokenKind::Number { suffix: Some(4) }, "0o17u8"));
        assert_eq!(kinds("10z")[0], (TokenKind::Number { suffix: Some(2) }, "10z"));
        assert_eq!(kinds("1e3")[0], (TokenKind::Number { suffix: None }, "1e3"));
        assert_eq!(kinds("1.5")[0], (TokenKind::Float, "1.5"));
        assert_eq!(kinds("2.0e-3f64")[0], (TokenKind::Float, "2.0e-3f64"));
        assert_eq!(kinds("10f32")[0], (TokenKind::Float, "10f32"));
        // A suffix glued to more word characters is not a suffix.
        assert_eq!(kinds("1uz").len(), 2);
    }

    #[test]
    fn test_ranges_do_not_swallow_dots() {
        assert_eq!(
            kinds("x[1..2]"),
            vec![
                (TokenKind::Word, "x"),
                (TokenKind::Punct, "["),
                (TokenKind::Number { suffix: None }, "1"),
                (TokenKind::Punct, ".."),
                (TokenKind::Number { suffix: None }, "2"),
                (TokenKind::Punct, "]"),
            ]
        );
    }

    #[test]
    fn test_tuple_member_access_is_not_a_float() {
        assert_eq!(
            kinds("t.0.1"),
            vec![
                (TokenKind::Word, "t"),
                (TokenKind::Punct, "."),
                (TokenKind::Number { suffix: None }, "0"),
                (TokenKind::Punct, "."),
                (TokenKind::Number { suffix: None }, "1"),
            ]
        );
    }

    #[test]
    fn test_strings_runes_and_comments() {
        assert_eq!(
            kinds(r#""a\"b" `raw` 'x' '\n' // note"#),
            vec![
                (TokenKind::String, r#""a\"b""#),
                (TokenKind::RawString, "`raw`"),
                (TokenKind::Rune, "'x'"),
                (TokenKind::Rune, r"'\n'"),
                (TokenKind::Comment, "// note"),
            ]
        );
        assert_eq!(kinds("'こ'")[0].0, TokenKind::Rune);
    }

    #[test]
    fn test_comment_continues_after_backslash() {
        let toks = kinds("// one \\\n two\nx");
        assert_eq!(toks[0], (TokenKind::Comment, "// one \\\n two"));
        assert_eq!(toks[1], (TokenKind::Word, "x"));
    }

    #[test]
    fn test_unterminated_and_stray_input() {
        assert_eq!(kinds("\"open")[0].0, TokenKind::Unknown);
        assert_eq!(kinds("`open")[0].0, TokenKind::Unknown);
        assert_eq!(kinds("#"), vec![(TokenKind::Unknown, "#")]);
        assert_eq!(kinds("é")[0], (TokenKind::Unknown, "é"));
    }

    #[test]
    fn test_escape_lengths() {
        assert_eq!(escape_len("n"), 1);
        assert_eq!(escape_len("x41rest"), 3);
        assert_eq!(escape_len("u00e9"), 5);
        assert_eq!(escape_len("u{1F600}"), 8);
        assert_eq!(escape_len("U0001F600"), 9);
        assert_eq!(escape_len("0123"), 3);
        assert!(is_named_escape("n"));
        assert!(is_named_escape("x41"));
        assert!(!is_named_escape("q"));
    }
}
