//! The grammar model: tree-sitter's `grammar.json` as Rust types.
//!
//! A [`Grammar`] can be read from JSON with [`parse_grammar`], written back
//! with [`Grammar::to_json`], or built in code with the [`dsl`] helpers, which
//! is how [`crate::hare`] declares Hare.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

pub mod dsl;
mod rules;

pub use rules::{Rule, RuleType, RuleValue};

/// A complete grammar: its rules plus the lists that tell the generator how
/// to treat them.
///
/// Field names and nesting follow
/// <https://tree-sitter.github.io/tree-sitter/assets/schemas/grammar.schema.json>,
/// so `grammar.json` files deserialize directly.
///
/// `rules` is a map and loses the declaration order that `grammar.js` uses
/// to pick its entry rule, so the entry rule is kept in [`Grammar::start`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grammar {
    /// The `$schema` URL, if the document names one.
    #[serde(rename = "$schema", default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    /// Language name, `"hare"` for [`crate::hare::grammar`].
    pub name: String,

    /// Grammar this one extends.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inherits: Option<String>,

    /// The entry rule. Absent in grammars written by `tree-sitter generate`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,

    /// Rule definitions by name. Names starting with `_` are hidden.
    pub rules: HashMap<String, Rule>,

    /// Tokens allowed between any two others: whitespace and comments.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extras: Option<Vec<Rule>>,

    /// Tokens produced by an external scanner.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub externals: Option<Vec<Rule>>,

    /// Rules spliced into their users instead of forming nodes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inline: Option<Vec<String>>,

    /// Named precedence orderings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precedences: Option<Vec<Vec<Precedence>>>,

    /// Rule sets allowed to stay ambiguous until runtime.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conflicts: Option<Vec<Vec<String>>>,

    /// Reserved word sets by context name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reserved: Option<HashMap<String, Vec<Rule>>>,

    /// The identifier rule that keywords are extracted from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub word: Option<String>,

    /// Hidden rules that group alternatives, such as `expression`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supertypes: Option<Vec<String>>,
}

/// One entry of a [`Grammar::precedences`] ordering.
///
/// `grammar.js` writes bare strings; `tree-sitter generate` writes `STRING`
/// and `SYMBOL` rules. Both read back in the form they were written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Precedence {
    /// A named level.
    Name(String),

    /// A `STRING` level or a `SYMBOL` whose rule is ranked.
    Rule(Rule),
}

/// Reads a `grammar.json` document.
///
/// # Errors
///
/// Returns [`GrammarError::JsonParse`] when `json` is malformed or does not
/// match the schema.
pub fn parse_grammar(json: &str) -> Result<Grammar, GrammarError> {
    serde_json::from_str(json).map_err(|e| GrammarError::JsonParse(e.to_string()))
}

/// Failure to load a grammar.
#[derive(Debug, thiserror::Error)]
pub enum GrammarError {
    /// The document could not be deserialized.
    #[error("JSON parse error: {0}")]
    JsonParse(String),

    /// The grammar could not be serialised.
    #[error("JSON write error: {0}")]
    JsonWrite(String),

    /// The grammar loaded but is not usable.
    #[error("validation error: {0}")]
    Validation(#[from] crate::validate::ValidationError),
}

impl Grammar {
    /// Serialises the grammar in the `grammar.json` format.
    ///
    /// # Errors
    ///
    /// Returns [`GrammarError::JsonWrite`] if serialisation fails.
    pub fn to_json(&self) -> Result<String, GrammarError> {
        serde_json::to_string(self).map_err(|e| GrammarError::JsonWrite(e.to_string()))
    }

    /// Looks up a rule by name.
    #[must_use]
    pub fn rule(&self, name: &str) -> Option<&Rule> {
        self.rules.get(name)
    }

    /// Returns `true` if `name` is declared as a supertype.
    #[must_use]
    pub fn is_supertype(&self, name: &str) -> bool {
        self.supertypes
            .as_ref()
            .is_some_and(|s| s.iter().any(|t| t == name))
    }

    /// Returns `true` if `name` is declared as an inline rule.
    #[must_use]
    pub fn is_inline(&self, name: &str) -> bool {
        self.inline
            .as_ref()
            .is_some_and(|s| s.iter().any(|t| t == name))
    }

    /// Returns the entry rule.
    ///
    /// Uses [`Grammar::start`] when set; otherwise falls back to the one rule
    /// that no other rule, extra or supertype list references. Returns `None`
    /// when neither identifies a unique candidate.
    #[must_use]
    pub fn start_rule(&self) -> Option<&str> {
        if let Some(start) = &self.start {
            return Some(start.as_str());
        }

        let mut referenced = HashSet::new();
        for rule in self.rules.values().chain(self.extras.iter().flatten()) {
            collect_symbols(rule, &mut referenced);
        }
        for name in self.supertypes.iter().flatten() {
            referenced.insert(name.as_str());
        }

        let mut roots = self
            .rules
            .keys()
            .filter(|name| !referenced.contains(name.as_str()));
        match (roots.next(), roots.next()) {
            (Some(root), None) => Some(root.as_str()),
            _ => None,
        }
    }
}

/// Collects every symbol name referenced anywhere beneath `rule`.
pub(crate) fn collect_symbols<'g>(rule: &'g Rule, out: &mut HashSet<&'g str>) {
    if let Some(name) = rule.symbol_name() {
        out.insert(name);
    }
    for child in rule.children() {
        collect_symbols(child, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SIMPLE: &str = r#"{
        "name": "mini",
        "rules": {
            "module": {
                "type": "REPEAT",
                "content": {"type": "SYMBOL", "name": "constant_declaration"}
            },
            "constant_declaration": {
                "type": "SEQ",
                "members": [
                    {"type": "STRING", "value": "def"},
                    {"type": "PATTERN", "value": "[a-zA-Z_][a-zA-Z0-9_]*"},
                    {"type": "STRING", "value": ";"}
                ]
            }
        }
    }"#;

    #[test]
    fn test_parse_simple_grammar() {
        let grammar = parse_grammar(SIMPLE).unwrap();
        assert_eq!(grammar.name, "mini");
        assert_eq!(grammar.rules.len(), 2);
        assert!(grammar.start.is_none());

        let declaration = grammar.rule("constant_declaration").unwrap();
        assert_eq!(declaration.members[0].string_value(), Some("def"));
        assert!(declaration.members[1].pattern_value().is_some());
    }

    #[test]
    fn test_start_rule_falls_back_to_unreferenced_rule() {
        let grammar = parse_grammar(SIMPLE).unwrap();
        assert_eq!(grammar.start_rule(), Some("module"));
    }

    #[test]
    fn test_hare_lists() {
        let grammar = crate::hare::grammar();
        assert_eq!(grammar.start_rule(), Some("module"));
        assert_eq!(grammar.word.as_deref(), Some("identifier"));
        assert!(grammar.is_supertype("expression"));
        assert!(!grammar.is_supertype("block"));
        assert!(!grammar.is_inline("block"));
    }

    #[test]
    fn test_invalid_json_is_reported() {
        let err = parse_grammar("{ not json").unwrap_err();
        assert!(matches!(err, GrammarError::JsonParse(_)));
        assert!(err.to_string().starts_with("JSON parse error"));
    }

    #[test]
    fn test_json_round_trip() {
        let grammar = crate::hare::grammar();
        let reparsed = parse_grammar(&grammar.to_json().unwrap()).unwrap();
        assert_eq!(reparsed, grammar);
    }

    #[test]
    fn test_written_values_are_plain_json_scalars() {
        let json = parse_grammar(SIMPLE).unwrap().to_json().unwrap();
        assert!(json.contains(r#"{"type":"STRING","value":"def"}"#), "{json}");
        assert!(json.contains(r#""value":"[a-zA-Z_][a-zA-Z0-9_]*""#), "{json}");
        assert!(!json.contains("null"), "{json}");

        let hare = crate::hare::grammar().to_json().unwrap();
        assert!(hare.contains(r#""type":"PREC_LEFT","value":"#), "{hare}");
        assert!(!hare.contains(r#""Integer""#) && !hare.contains(r#""String""#));
    }

    #[test]
    fn test_precedences_accept_names_and_rules() {
        let json = r#"{
            "name": "ranked",
            "precedences": [["member", {"type": "STRING", "value": "call"}, {"type": "SYMBOL", "name": "unary"}]],
            "rules": {"unary": {"type": "STRING", "value": "-"}}
        }"#;
        let grammar = parse_grammar(json).unwrap();
        let order = &grammar.precedences.as_ref().unwrap()[0];
        assert_eq!(order[0], Precedence::Name("member".to_owned()));
        assert!(matches!(&order[1], Precedence::Rule(rule) if rule.string_value() == Some("call")));
        assert!(matches!(&order[2], Precedence::Rule(rule) if rule.symbol_name() == Some("unary")));

        let written = grammar.to_json().unwrap();
        assert!(written.contains(r#""precedences":[["member",{"type":"STRING","value":"call"},{"type":"SYMBOL","name":"unary"}]]"#), "{written}");
    }
}
