//! A Rust-native Hare grammar and parser in the tree-sitter mould.
//!
//! The [`hare`] module declares the grammar of the Hare programming language
//! with tree-sitter's rule model. [`language`] turns it into a process-wide
//! [`Language`] descriptor, and [`Parser`] produces concrete syntax trees
//! whose node kinds and fields are the ones the grammar names.
//!
//! ```
//! let mut parser = hare_sitter::Parser::new();
//! parser.set_language(hare_sitter::language())?;
//! let tree = parser.parse("export fn main() void = void;")?;
//! assert!(!tree.root_node().has_error());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
#![cfg_attr(docsrs, feature(doc_cfg))]
#![allow(clippy::multiple_crate_versions)]

pub mod grammar;
pub mod hare;
pub mod language;
pub mod lexer;
pub mod node_types;
pub mod parser;
pub mod tree;
pub mod validate;

#[cfg(feature = "capi")]
#[cfg_attr(docsrs, doc(cfg(feature = "capi")))]
pub mod capi;

pub use grammar::{parse_grammar, Grammar, GrammarError, Rule};
pub use language::{language, tree_sitter_hare, Language};
pub use parser::{LanguageError, ParseError, Parser, ParserConfig};
pub use tree::{Node, Point, Tree};
pub use validate::{validate, ValidationError, ValidationReport};
