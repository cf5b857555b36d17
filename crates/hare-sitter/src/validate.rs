//! Consistency checks for a [`Grammar`].
//!
//! A grammar that references undefined rules or has no entry rule cannot
//! be numbered into a [`Language`](crate::Language) and fails with a
//! [`ValidationError`]. Legal but suspicious shapes, such as rules nothing
//! reaches, only end up in the [`ValidationReport`].

use crate::grammar::{Grammar, Rule, RuleType};
use std::collections::{BTreeSet, HashSet};

/// A structural defect that makes a grammar unusable.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// The grammar defines no rules at all.
    #[error("grammar has no rules")]
    NoRules,

    /// No entry rule is declared and none can be inferred.
    #[error("grammar has no start rule")]
    NoStartRule,

    /// A rule references a symbol that is not defined.
    #[error("undefined symbol '{symbol}' referenced in rule '{rule}'")]
    UndefinedSymbol {
        /// The missing symbol.
        symbol: String,
        /// The rule containing the reference.
        rule: String,
    },

    /// A grammar-level list (`word`, `supertypes`, `inline`, `conflicts`)
    /// names a rule that is not defined.
    #[error("undefined rule '{name}' listed in {list}")]
    UndefinedListEntry {
        /// The list the name appears in.
        list: &'static str,
        /// The missing rule.
        name: String,
    },
}

/// Non-fatal findings from [`validate`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    /// Rules that cannot be reached from the start rule or the extras.
    pub unreachable: Vec<String>,
    /// Rules whose first symbol can be the rule itself.
    pub left_recursive: Vec<String>,
    /// Rules that use more than one precedence level.
    pub mixed_precedence: Vec<String>,
}

/// Checks `grammar` and reports what it found.
///
/// Every `SYMBOL` and every name in `word`, `supertypes`, `inline` and
/// `conflicts` must be a defined rule, and an entry rule must exist. The
/// report lists unreachable rules, immediately left-recursive rules and
/// rules mixing precedence levels.
///
/// # Errors
///
/// Returns the first [`ValidationError`] found.
pub fn validate(grammar: &Grammar) -> Result<ValidationReport, ValidationError> {
    if grammar.rules.is_empty() {
        return Err(ValidationError::NoRules);
    }

    check_undefined_symbols(grammar)?;
    check_listed_rules(grammar)?;
    let start = grammar.start_rule().ok_or(ValidationError::NoStartRule)?;
    if !grammar.rules.contains_key(start) {
        return Err(ValidationError::UndefinedListEntry {
            list: "start",
            name: start.to_owned(),
        });
    }

    let report = ValidationReport {
        unreachable: unreachable_rules(grammar, start),
        left_recursive: left_recursive_rules(grammar),
        mixed_precedence: mixed_precedence_rules(grammar),
    };

    for rule in &report.unreachable {
        tracing::warn!(rule, "unreachable rule");
    }
    for rule in &report.left_recursive {
        tracing::debug!(rule, "rule is left recursive");
    }
    for rule in &report.mixed_precedence {
        tracing::debug!(rule, "rule has multiple precedence levels");
    }
    Ok(report)
}

fn check_undefined_symbols(grammar: &Grammar) -> Result<(), ValidationError> {
    let mut names: Vec<&String> = grammar.rules.keys().collect();
    names.sort_unstable();

    for name in names {
        check_rule_symbols(&grammar.rules[name], grammar, name)?;
    }
    for extra in grammar.extras.iter().flatten() {
        check_rule_symbols(extra, grammar, "extras")?;
    }
    Ok(())
}

fn check_rule_symbols(rule: &Rule, grammar: &Grammar, context: &str) -> Result<(), ValidationError> {
    if let Some(name) = rule.symbol_name() {
        if !grammar.rules.contains_key(name) {
            return Err(ValidationError::UndefinedSymbol {
                symbol: name.to_owned(),
                rule: context.to_owned(),
            });
        }
    }
    rule.children()
        .try_for_each(|child| check_rule_symbols(child, grammar, context))
}

fn check_listed_rules(grammar: &Grammar) -> Result<(), ValidationError> {
    let lists: [(&'static str, Vec<&String>); 4] = [
        ("word", grammar.word.iter().collect()),
        ("supertypes", grammar.supertypes.iter().flatten().collect()),
        ("inline", grammar.inline.iter().flatten().collect()),
        ("conflicts", grammar.conflicts.iter().flatten().flatten().collect()),
    ];
    for (list, names) in lists {
        if let Some(name) = names.into_iter().find(|n| !grammar.rules.contains_key(*n)) {
            return Err(ValidationError::UndefinedListEntry {
                list,
                name: name.clone(),
            });
        }
    }
    Ok(())
}

fn unreachable_rules(grammar: &Grammar, start: &str) -> Vec<String> {
    let mut reachable = HashSet::new();
    let mut to_visit = vec![start];
    for extra in grammar.extras.iter().flatten() {
        collect_referenced_symbols(extra, &mut to_visit);
    }

    while let Some(rule_name) = to_visit.pop() {
        if !reachable.insert(rule_name) {
            continue;
        }
        if let Some(rule) = grammar.rule(rule_name) {
            collect_referenced_symbols(rule, &mut to_visit);
        }
    }

    let mut unreachable: Vec<String> = grammar
        .rules
        .keys()
        .filter(|name| !reachable.contains(name.as_str()) && !grammar.is_inline(name))
        .cloned()
        .collect();
    unreachable.sort_unstable();
    unreachable
}

fn collect_referenced_symbols<'g>(rule: &'g Rule, symbols: &mut Vec<&'g str>) {
    if let Some(name) = rule.symbol_name() {
        symbols.push(name);
    }
    for child in rule.children() {
        collect_referenced_symbols(child, symbols);
    }
}

fn left_recursive_rules(grammar: &Grammar) -> Vec<String> {
    let mut rules: Vec<String> = grammar
        .rules
        .iter()
        .filter(|(name, rule)| has_immediate_left_recursion(rule, name))
        .map(|(name, _)| name.clone())
        .collect();
    rules.sort_unstable();
    rules
}

fn has_immediate_left_recursion(rule: &Rule, target: &str) -> bool {
    match rule.rule_type {
        RuleType::Symbol => rule.symbol_name() == Some(target),
        RuleType::Seq => rule
            .members
            .first()
            .is_some_and(|first| has_immediate_left_recursion(first, target)),
        RuleType::Choice => rule
            .members
            .iter()
            .any(|member| has_immediate_left_recursion(member, target)),
        RuleType::Prec
        | RuleType::PrecLeft
        | RuleType::PrecRight
        | RuleType::PrecDynamic
        | RuleType::Field
        | RuleType::Alias
        | RuleType::Repeat
        | RuleType::Repeat1 => rule
            .content
            .as_deref()
            .is_some_and(|content| has_immediate_left_recursion(content, target)),
        _ => false,
    }
}

fn mixed_precedence_rules(grammar: &Grammar) -> Vec<String> {
    let mut rules: Vec<String> = grammar
        .rules
        .iter()
        .filter(|(_, rule)| {
            let mut levels = BTreeSet::new();
            collect_precedence_levels(rule, &mut levels);
            levels.len() > 1
        })
        .map(|(name, _)| name.clone())
        .collect();
    rules.sort_unstable();
    rules
}

fn collect_precedence_levels(rule: &Rule, levels: &mut BTreeSet<i32>) {
    if let Some(level) = rule.precedence() {
        levels.insert(level);
    }
    for child in rule.children() {
        collect_precedence_levels(child, levels);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::dsl::{choice, prec, prec_left, seq, string, sym, GrammarBuilder};
    use crate::hare;

    #[test]
    fn test_hare_grammar_is_valid() {
        let report = validate(&hare::grammar()).unwrap();
        assert_eq!(report.unreachable, ["name_list"]);
        assert_eq!(report.left_recursive, ["scoped_type_identifier"]);
        assert!(report
            .mixed_precedence
            .contains(&"binary_expression".to_owned()));
    }

    #[test]
    fn test_undefined_symbol() {
        let grammar = GrammarBuilder::new("bad")
            .rule("start", seq([string("a"), sym("missing")]))
            .build();
        assert_eq!(
            validate(&grammar).unwrap_err(),
            ValidationError::UndefinedSymbol {
                symbol: "missing".to_owned(),
                rule: "start".to_owned(),
            }
        );
    }

    #[test]
    fn test_undefined_word_rule() {
        let grammar = GrammarBuilder::new("bad")
            .rule("start", string("a"))
            .word("identifier")
            .build();
        let err = validate(&grammar).unwrap_err();
        assert_eq!(err.to_string(), "undefined rule 'identifier' listed in word");
    }

    #[test]
    fn test_empty_grammar() {
        let grammar = GrammarBuilder::new("empty").build();
        assert_eq!(validate(&grammar).unwrap_err(), ValidationError::NoRules);
    }

    #[test]
    fn test_left_recursion_and_precedence_are_reported() {
        let grammar = GrammarBuilder::new("calc")
            .rule("expr", choice([sym("sum"), sym("product"), string("1")]))
            .rule("sum", prec_left(1, seq([sym("sum"), string("+"), sym("expr")])))
            .rule("product", prec(2, seq([sym("expr"), string("*"), sym("expr")])))
            .build();
        let report = validate(&grammar).unwrap();
        assert!(report.unreachable.is_empty());
        assert_eq!(report.left_recursive, ["sum"]);
        assert!(report.mixed_precedence.is_empty());
    }
}
