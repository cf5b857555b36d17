//! A hand-written parser producing tree-sitter shaped syntax trees.
//!
//! Parsing never fails on malformed input. Unexpected tokens end up inside
//! `ERROR` nodes, absent tokens are inserted as zero-width `MISSING` nodes,
//! and the rest of the input is parsed as usual. The only hard failures are a
//! parser without a language and input nested deeper than
//! [`ParserConfig::max_depth`].

use crate::hare;
use crate::language::{Language, LANGUAGE_VERSION, MIN_COMPATIBLE_LANGUAGE_VERSION};
use crate::lexer::{self, Token, TokenKind};
use crate::tree::Tree;
use builder::{Checkpoint, TreeBuilder};

mod builder;
mod expressions;
mod items;
mod literals;
mod statements;
mod types;

/// Tunables for a [`Parser`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParserConfig {
    /// How deeply expressions, types and statements may nest.
    pub max_depth: usize,
}

impl ParserConfig {
    /// Default for [`ParserConfig::max_depth`].
    pub const DEFAULT_MAX_DEPTH: usize = 256;

    /// Sets [`ParserConfig::max_depth`].
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            max_depth: Self::DEFAULT_MAX_DEPTH,
        }
    }
}

/// Reasons a parse produced no tree.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// [`Parser::set_language`] was never called.
    #[error("no language has been set on the parser")]
    NoLanguage,

    /// The input nests deeper than the configured limit.
    #[error("input nests deeper than {limit} levels at byte {offset}")]
    NestingTooDeep {
        /// The configured [`ParserConfig::max_depth`].
        limit: usize,
        /// Where the limit was hit.
        offset: usize,
    },
}

/// Reasons a language cannot be used by this parser.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LanguageError {
    /// The descriptor layout is outside the supported range.
    #[error("incompatible language version {version}, expected {min} through {max}")]
    Version {
        /// The descriptor's version.
        version: usize,
        /// Oldest supported version.
        min: usize,
        /// Newest supported version.
        max: usize,
    },

    /// The parser only knows how to parse Hare.
    #[error("no parser is available for the `{0}` language")]
    Unsupported(String),
}

/// Parses Hare source into [`Tree`]s.
#[derive(Debug, Default)]
pub struct Parser {
    language: Option<&'static Language>,
    config: ParserConfig,
}

impl Parser {
    /// A parser with no language and the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A parser with no language and the given configuration.
    #[must_use]
    pub fn with_config(config: ParserConfig) -> Self {
        Self {
            language: None,
            config,
        }
    }

    /// Selects the language to parse.
    ///
    /// # Errors
    ///
    /// Returns [`LanguageError::Version`] if the descriptor's version is not
    /// supported, and [`LanguageError::Unsupported`] if it does not describe
    /// Hare.
    pub fn set_language(&mut self, language: &'static Language) -> Result<(), LanguageError> {
        let version = language.version();
        if !(MIN_COMPATIBLE_LANGUAGE_VERSION..=LANGUAGE_VERSION).contains(&version) {
            return Err(LanguageError::Version {
                version,
                min: MIN_COMPATIBLE_LANGUAGE_VERSION,
                max: LANGUAGE_VERSION,
            });
        }
        if language.name() != "hare" {
            return Err(LanguageError::Unsupported(language.name().to_owned()));
        }
        self.language = Some(language);
        Ok(())
    }

    /// The current language, if one was set.
    #[must_use]
    pub fn language(&self) -> Option<&'static Language> {
        self.language
    }

    /// The current configuration.
    #[must_use]
    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Replaces the configuration.
    pub fn set_config(&mut self, config: ParserConfig) {
        self.config = config;
    }

    /// Parses `source` into a syntax tree.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::NoLanguage`] before [`Parser::set_language`] has
    /// succeeded, and [`ParseError::NestingTooDeep`] when the input exceeds
    /// [`ParserConfig::max_depth`].
    #[tracing::instrument(level = "debug", skip_all, fields(bytes = source.len()))]
    pub fn parse(&self, source: &str) -> Result<Tree, ParseError> {
        let language = self.language.ok_or(ParseError::NoLanguage)?;
        let mut parse = Parse::new(source, language, self.config.max_depth);
        parse.module();

        if let Some(offset) = parse.overflow {
            return Err(ParseError::NestingTooDeep {
                limit: self.config.max_depth,
                offset,
            });
        }
        let tree = parse.builder.finish(source.to_owned());
        tracing::debug!(
            nodes = tree.node_count(),
            has_error = tree.root_node().has_error(),
            "parsed"
        );
        Ok(tree)
    }
}

/// Tokens that end whatever construct is being parsed. An expression that
/// runs into one of these is reported missing instead of consuming it.
const SYNC: [&str; 8] = [";", ")", "]", "}", ",", "=>", "case", "else"];

/// The state of one parse.
struct Parse<'s> {
    source: &'s str,
    language: &'static Language,
    tokens: Vec<Token>,
    // Index into `tokens`; may point at a comment.
    pos: usize,
    builder: TreeBuilder,
    depth: usize,
    max_depth: usize,
    overflow: Option<usize>,
}

impl<'s> Parse<'s> {
    fn new(source: &'s str, language: &'static Language, max_depth: usize) -> Self {
        Self {
            source,
            language,
            tokens: lexer::tokenize(source),
            pos: 0,
            builder: TreeBuilder::new(language),
            depth: 0,
            max_depth,
            overflow: None,
        }
    }

    fn significant(&self, n: usize) -> Option<&Token> {
        self.tokens[self.pos..]
            .iter()
            .filter(|t| !t.is_comment())
            .nth(n)
    }

    fn nth_kind(&self, n: usize) -> Option<TokenKind> {
        self.significant(n).map(|t| t.kind)
    }

    fn nth_text(&self, n: usize) -> &'s str {
        let source = self.source;
        self.significant(n).map_or("", |t| t.text(source))
    }

    /// Whether the `n`th upcoming token is the keyword or punctuation `text`.
    fn nth_is(&self, n: usize, text: &str) -> bool {
        matches!(
            self.nth_kind(n),
            Some(TokenKind::Word | TokenKind::Punct | TokenKind::Attribute)
        ) && self.nth_text(n) == text
    }

    fn at(&self, text: &str) -> bool {
        self.nth_is(0, text)
    }

    fn at_eof(&self) -> bool {
        self.significant(0).is_none()
    }

    fn nth_is_identifier(&self, n: usize) -> bool {
        self.nth_kind(n) == Some(TokenKind::Word) && !hare::is_reserved(self.nth_text(n))
    }

    fn at_identifier(&self) -> bool {
        self.nth_is_identifier(0)
    }

    fn at_builtin_type(&self) -> bool {
        self.nth_kind(0) == Some(TokenKind::Word) && hare::BUILTIN_TYPES.contains(&self.nth_text(0))
    }

    fn at_sync(&self) -> bool {
        self.at_eof() || SYNC.iter().any(|s| self.at(s))
    }

    fn offset(&self) -> usize {
        self.significant(0)
            .map_or(self.source.len(), |t| t.range.start)
    }

    fn flush_trivia(&mut self) {
        while let Some(token) = self.tokens.get(self.pos) {
            if !token.is_comment() {
                break;
            }
            let range = token.range.clone();
            self.builder.extra(range);
            self.pos += 1;
        }
    }

    /// Takes the next significant token, attaching any comments before it.
    fn take(&mut self) -> Option<Token> {
        self.flush_trivia();
        let token = self.tokens.get(self.pos)?.clone();
        self.pos += 1;
        Some(token)
    }

    fn checkpoint(&mut self) -> Checkpoint {
        self.flush_trivia();
        self.builder.checkpoint()
    }

    fn start(&mut self, kind: &str) {
        self.flush_trivia();
        self.builder.start_node(kind);
    }

    fn finish(&mut self) {
        self.builder.finish_node();
    }

    fn wrap(&mut self, checkpoint: Checkpoint, kind: &str) {
        self.builder.wrap(checkpoint, kind);
    }

    fn label_since(&mut self, checkpoint: Checkpoint, field: &str) {
        self.builder.label_since(checkpoint, field);
    }

    /// Consumes a keyword or punctuation token as an anonymous node.
    fn bump(&mut self) {
        if let Some(token) = self.take() {
            let text = token.text(self.source);
            self.builder.token(token.range, text);
        }
    }

    /// Consumes the next token as a named leaf of `kind`.
    fn bump_named(&mut self, kind: &str) {
        if let Some(token) = self.take() {
            self.builder.leaf(token.range, kind);
        }
    }

    /// Consumes any token inside an `ERROR` node, giving it the most
    /// plausible shape. Input with no kind of its own only widens the node.
    fn bump_any(&mut self) {
        match self.nth_kind(0) {
            None => {}
            Some(TokenKind::Word) if self.at_identifier() => self.bump_named("identifier"),
            Some(
                TokenKind::Number { .. }
                | TokenKind::Float
                | TokenKind::String
                | TokenKind::RawString
                | TokenKind::Rune,
            ) => self.literal(),
            Some(TokenKind::Word | TokenKind::Punct | TokenKind::Attribute)
                if self
                    .language
                    .id_for_node_kind(self.nth_text(0), false)
                    .is_some() =>
            {
                self.bump();
            }
            Some(_) => {
                if let Some(token) = self.take() {
                    self.builder.hidden(token.range);
                }
            }
        }
    }

    fn eat(&mut self, text: &str) -> bool {
        if self.at(text) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, text: &str) -> bool {
        if self.eat(text) {
            return true;
        }
        tracing::trace!(expected = text, offset = self.offset(), "inserting missing token");
        self.builder.missing(text, false);
        false
    }

    fn identifier(&mut self) -> bool {
        if self.at_identifier() {
            self.bump_named("identifier");
            true
        } else {
            tracing::trace!(offset = self.offset(), "inserting missing identifier");
            self.builder.missing("identifier", true);
            false
        }
    }

    /// An `identifier` labelled with `field`.
    fn identifier_field(&mut self, field: &str) {
        let checkpoint = self.checkpoint();
        self.identifier();
        self.label_since(checkpoint, field);
    }

    /// Wraps the next token in an `ERROR` node.
    fn error_token(&mut self) {
        tracing::debug!(
            offset = self.offset(),
            token = self.nth_text(0),
            "unexpected token"
        );
        self.builder.start_error();
        self.bump_any();
        self.finish();
    }

    /// Handles a token that cannot start the expected construct: either a
    /// missing node in front of a closing token, or an error around it.
    fn unexpected(&mut self, expected: &str) {
        if self.at_sync() {
            tracing::trace!(expected, offset = self.offset(), "inserting missing node");
            self.builder.missing(expected, true);
        } else {
            self.error_token();
        }
    }

    /// Enters one level of nesting. Returns `false`, and abandons the rest
    /// of the input, once the limit is reached.
    fn enter(&mut self) -> bool {
        if self.overflow.is_some() {
            return false;
        }
        if self.depth >= self.max_depth {
            let offset = self.offset();
            tracing::warn!(offset, limit = self.max_depth, "nesting limit reached");
            self.overflow = Some(offset);
            self.pos = self.tokens.len();
            return false;
        }
        self.depth += 1;
        true
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::language;

    #[test]
    fn test_parse_requires_language() {
        let parser = Parser::new();
        assert_eq!(parser.parse("").unwrap_err(), ParseError::NoLanguage);
    }

    #[test]
    fn test_language_can_be_set() {
        let mut parser = Parser::new();
        parser.set_language(language()).unwrap();
        assert!(std::ptr::eq(parser.language().unwrap(), language()));
    }

    #[test]
    fn test_other_grammars_are_rejected() {
        static OTHER: std::sync::LazyLock<Language> = std::sync::LazyLock::new(|| {
            Language::new(
                crate::grammar::dsl::GrammarBuilder::new("other")
                    .rule("start", crate::grammar::dsl::string("x"))
                    .build(),
            )
        });
        let mut parser = Parser::new();
        let err = parser.set_language(&OTHER).unwrap_err();
        assert_eq!(err, LanguageError::Unsupported("other".to_owned()));
        assert!(parser.language().is_none());
    }

    #[test]
    fn test_incompatible_versions_are_rejected() {
        static OLD: std::sync::LazyLock<Language> =
            std::sync::LazyLock::new(|| Language::with_version(crate::hare::grammar(), 12));
        static NEWER: std::sync::LazyLock<Language> =
            std::sync::LazyLock::new(|| Language::with_version(crate::hare::grammar(), 15));
        static OLDEST: std::sync::LazyLock<Language> = std::sync::LazyLock::new(|| {
            Language::with_version(crate::hare::grammar(), MIN_COMPATIBLE_LANGUAGE_VERSION)
        });

        let mut parser = Parser::new();
        for (lang, version) in [(&OLD, 12), (&NEWER, 15)] {
            let err = parser.set_language(lang).unwrap_err();
            assert_eq!(
                err,
                LanguageError::Version {
                    version,
                    min: 13,
                    max: 14
                }
            );
            assert!(parser.language().is_none());
        }
        assert_eq!(
            parser.set_language(&OLD).unwrap_err().to_string(),
            "incompatible language version 12, expected 13 through 14"
        );

        parser.set_language(&OLDEST).unwrap();
        assert!(parser.language().is_some());
    }

    #[test]
    fn test_empty_input() {
        let mut parser = Parser::new();
        parser.set_language(language()).unwrap();
        let tree = parser.parse("").unwrap();
        assert_eq!(tree.root_node().to_sexp(), "(module)");
        assert!(!tree.root_node().has_error());
    }

    #[test]
    fn test_nesting_limit() {
        let mut parser = Parser::with_config(ParserConfig::default().with_max_depth(16));
        parser.set_language(language()).unwrap();
        let source = format!("def X: int = {}1{};", "(".repeat(64), ")".repeat(64));
        let err = parser.parse(&source).unwrap_err();
        assert!(matches!(err, ParseError::NestingTooDeep { limit: 16, .. }));

        parser.set_config(ParserConfig::default());
        assert!(parser.parse(&source).is_ok());
    }
}
