//! Constructors mirroring tree-sitter's JavaScript grammar DSL.
//!
//! Grammars written with these helpers produce exactly the [`Rule`] values
//! that `tree-sitter generate` would serialise into `grammar.json`, so a
//! grammar can be declared in Rust and still be exported in the standard
//! format.

use super::{Grammar, Precedence, Rule, RuleType, RuleValue};
use std::collections::HashMap;

/// The empty production.
#[must_use]
pub fn blank() -> Rule {
    Rule::new(RuleType::Blank)
}

/// A literal string token.
#[must_use]
pub fn string(value: &str) -> Rule {
    Rule {
        value: Some(RuleValue::String(value.to_owned())),
        ..Rule::new(RuleType::String)
    }
}

/// A regular-expression token.
#[must_use]
pub fn pattern(value: &str) -> Rule {
    Rule {
        value: Some(RuleValue::String(value.to_owned())),
        ..Rule::new(RuleType::Pattern)
    }
}

/// A reference to another rule.
#[must_use]
pub fn sym(name: &str) -> Rule {
    Rule {
        name: Some(name.to_owned()),
        ..Rule::new(RuleType::Symbol)
    }
}

fn compound(rule_type: RuleType, members: impl IntoIterator<Item = Rule>) -> Rule {
    Rule {
        members: members.into_iter().collect(),
        ..Rule::new(rule_type)
    }
}

fn wrap(rule_type: RuleType, content: Rule) -> Rule {
    Rule {
        content: Some(Box::new(content)),
        ..Rule::new(rule_type)
    }
}

/// Matches each member in order.
#[must_use]
pub fn seq(members: impl IntoIterator<Item = Rule>) -> Rule {
    compound(RuleType::Seq, members)
}

/// Matches any one member.
#[must_use]
pub fn choice(members: impl IntoIterator<Item = Rule>) -> Rule {
    compound(RuleType::Choice, members)
}

/// Matches `rule` or nothing, encoded as `CHOICE [rule, BLANK]`.
#[must_use]
pub fn optional(rule: Rule) -> Rule {
    choice([rule, blank()])
}

/// Zero or more repetitions.
#[must_use]
pub fn repeat(rule: Rule) -> Rule {
    wrap(RuleType::Repeat, rule)
}

/// One or more repetitions.
#[must_use]
pub fn repeat1(rule: Rule) -> Rule {
    wrap(RuleType::Repeat1, rule)
}

fn precedence(rule_type: RuleType, level: i32, rule: Rule) -> Rule {
    Rule {
        value: Some(RuleValue::Integer(level)),
        ..wrap(rule_type, rule)
    }
}

/// Numeric precedence.
#[must_use]
pub fn prec(level: i32, rule: Rule) -> Rule {
    precedence(RuleType::Prec, level, rule)
}

/// Left-associative precedence.
#[must_use]
pub fn prec_left(level: i32, rule: Rule) -> Rule {
    precedence(RuleType::PrecLeft, level, rule)
}

/// Right-associative precedence.
#[must_use]
pub fn prec_right(level: i32, rule: Rule) -> Rule {
    precedence(RuleType::PrecRight, level, rule)
}

/// Dynamic precedence, resolved at parse time.
#[must_use]
pub fn prec_dynamic(level: i32, rule: Rule) -> Rule {
    precedence(RuleType::PrecDynamic, level, rule)
}

/// Attaches a field name to whatever `rule` produces.
#[must_use]
pub fn field(name: &str, rule: Rule) -> Rule {
    Rule {
        name: Some(name.to_owned()),
        ..wrap(RuleType::Field, rule)
    }
}

/// Renames the node produced by `rule`.
#[must_use]
pub fn alias(rule: Rule, name: &str, named: bool) -> Rule {
    Rule {
        value: Some(RuleValue::String(name.to_owned())),
        named: Some(named),
        ..wrap(RuleType::Alias, rule)
    }
}

/// Lexes `rule` as one token.
#[must_use]
pub fn token(rule: Rule) -> Rule {
    wrap(RuleType::Token, rule)
}

/// Lexes `rule` as one token that may not be preceded by extras.
#[must_use]
pub fn immediate_token(rule: Rule) -> Rule {
    wrap(RuleType::ImmediateToken, rule)
}

/// Incrementally assembles a [`Grammar`].
///
/// The first rule added becomes the start rule, as in `grammar.js`.
#[derive(Debug, Default)]
pub struct GrammarBuilder {
    name: String,
    start: Option<String>,
    rules: HashMap<String, Rule>,
    extras: Vec<Rule>,
    inline: Vec<String>,
    conflicts: Vec<Vec<String>>,
    supertypes: Vec<String>,
    precedences: Vec<Vec<Precedence>>,
    word: Option<String>,
}

impl GrammarBuilder {
    /// Starts a grammar called `name`.
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            ..Self::default()
        }
    }

    /// Defines rule `name`.
    #[must_use]
    pub fn rule(mut self, name: &str, rule: Rule) -> Self {
        if self.start.is_none() {
            self.start = Some(name.to_owned());
        }
        self.rules.insert(name.to_owned(), rule);
        self
    }

    /// Adds a rule that may appear between any two tokens.
    #[must_use]
    pub fn extra(mut self, rule: Rule) -> Self {
        self.extras.push(rule);
        self
    }

    /// Marks a rule as a hidden supertype.
    #[must_use]
    pub fn supertype(mut self, name: &str) -> Self {
        self.supertypes.push(name.to_owned());
        self
    }

    /// Declares an expected conflict between rules.
    #[must_use]
    pub fn conflict(mut self, names: &[&str]) -> Self {
        self.conflicts
            .push(names.iter().map(|n| (*n).to_owned()).collect());
        self
    }

    /// Marks a rule to be inlined at each use site.
    #[must_use]
    pub fn inline(mut self, name: &str) -> Self {
        self.inline.push(name.to_owned());
        self
    }

    /// Declares a named precedence ordering.
    #[must_use]
    pub fn precedences(mut self, order: Vec<Precedence>) -> Self {
        self.precedences.push(order);
        self
    }

    /// Sets the keyword-extraction word rule.
    #[must_use]
    pub fn word(mut self, name: &str) -> Self {
        self.word = Some(name.to_owned());
        self
    }

    /// Finishes the grammar.
    #[must_use]
    pub fn build(self) -> Grammar {
        fn non_empty<T>(items: Vec<T>) -> Option<Vec<T>> {
            (!items.is_empty()).then_some(items)
        }

        Grammar {
            schema: None,
            name: self.name,
            inherits: None,
            start: self.start,
            rules: self.rules,
            extras: non_empty(self.extras),
            externals: None,
            inline: non_empty(self.inline),
            precedences: non_empty(self.precedences),
            conflicts: non_empty(self.conflicts),
            reserved: None,
            word: self.word,
            supertypes: non_empty(self.supertypes),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_optional_is_choice_with_blank() {
        let rule = optional(string("export"));
        assert_eq!(rule.rule_type, RuleType::Choice);
        assert_eq!(rule.members.len(), 2);
        assert_eq!(rule.members[1].rule_type, RuleType::Blank);
    }

    #[test]
    fn test_builder_first_rule_is_start() {
        let grammar = GrammarBuilder::new("tiny")
            .rule("program", repeat(sym("word")))
            .rule("word", pattern("[a-z]+"))
            .extra(pattern("\\s"))
            .word("word")
            .build();

        assert_eq!(grammar.name, "tiny");
        assert_eq!(grammar.start_rule(), Some("program"));
        assert_eq!(grammar.word.as_deref(), Some("word"));
        assert!(grammar.conflicts.is_none());
        assert_eq!(grammar.extras.as_ref().map(Vec::len), Some(1));
    }

    #[test]
    fn test_alias_carries_name_and_visibility() {
        let rule = alias(sym("identifier"), "type_identifier", true);
        assert_eq!(rule.rule_type, RuleType::Alias);
        assert_eq!(rule.named, Some(true));
        assert_eq!(
            rule.value,
            Some(RuleValue::String("type_identifier".to_owned()))
        );
    }
}
