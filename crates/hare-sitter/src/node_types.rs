//! `node-types.json` style descriptions derived from a [`Grammar`].
//!
//! Each visible kind is listed with the fields and named children it can
//! have. Counts are summarised per rule: a field is `required` when every
//! alternative of the rule produces it and `multiple` when some alternative
//! can produce it more than once.

use crate::grammar::{Grammar, Rule, RuleType};
use facet::Facet;
use std::collections::{BTreeMap, BTreeSet, HashSet};

/// A reference to a node kind.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Facet)]
pub struct NodeTypeRef {
    /// The kind name.
    #[facet(rename = "type")]
    pub kind: String,
    /// Whether the kind is named.
    pub named: bool,
}

/// What may fill a field, or a node's unlabelled named children.
#[derive(Debug, Clone, PartialEq, Eq, Facet)]
pub struct ChildInfo {
    /// More than one node may appear.
    pub multiple: bool,
    /// At least one node always appears.
    pub required: bool,
    /// The kinds that may appear.
    pub types: Vec<NodeTypeRef>,
}

/// One entry of `node-types.json`.
#[derive(Debug, Clone, PartialEq, Eq, Facet)]
pub struct NodeTypeInfo {
    /// The kind name.
    #[facet(rename = "type")]
    pub kind: String,
    /// Whether the kind is named.
    pub named: bool,
    /// Labelled children, by field name.
    #[facet(default)]
    pub fields: BTreeMap<String, ChildInfo>,
    /// Unlabelled named children.
    #[facet(default)]
    pub children: Option<ChildInfo>,
    /// For supertypes, the kinds they stand for.
    #[facet(default)]
    pub subtypes: Vec<NodeTypeRef>,
}

/// Describes every visible kind of `grammar`, named kinds first.
#[must_use]
pub fn node_types(grammar: &Grammar) -> Vec<NodeTypeInfo> {
    let mut names: Vec<&str> = grammar.rules.keys().map(String::as_str).collect();
    names.sort_unstable();

    let mut out = Vec::new();
    let mut literals = BTreeSet::new();
    for name in names {
        let Some(rule) = grammar.rule(name) else {
            continue;
        };
        collect_literals(rule, &mut literals);

        if grammar.is_supertype(name) {
            let mut subtypes = BTreeSet::new();
            let mut seen = HashSet::new();
            produced(grammar, rule, &mut seen, &mut subtypes);
            out.push(NodeTypeInfo {
                kind: name.to_owned(),
                named: true,
                fields: BTreeMap::new(),
                children: None,
                subtypes: subtypes.into_iter().collect(),
            });
            continue;
        }
        if name.starts_with('_') {
            continue;
        }

        let summary = if rule.is_token() {
            Summary::default()
        } else {
            let mut expanding = HashSet::from([name]);
            summarize(grammar, rule, &mut expanding)
        };
        let children = summary
            .children
            .into_info()
            .filter(|info| !info.types.is_empty());
        out.push(NodeTypeInfo {
            kind: name.to_owned(),
            named: true,
            fields: summary
                .fields
                .into_iter()
                .filter_map(|(field, slot)| Some((field, slot.into_info()?)))
                .collect(),
            children,
            subtypes: Vec::new(),
        });
    }

    out.extend(literals.into_iter().map(|literal| NodeTypeInfo {
        kind: literal,
        named: false,
        fields: BTreeMap::new(),
        children: None,
        subtypes: Vec::new(),
    }));
    out
}

/// Serialises a node type list as JSON.
#[must_use]
pub fn to_json(node_types: &[NodeTypeInfo]) -> String {
    facet_json::to_string(&node_types.to_vec())
}

fn collect_literals(rule: &Rule, out: &mut BTreeSet<String>) {
    if rule.is_token() {
        return;
    }
    if let Some(value) = rule.string_value() {
        out.insert(value.to_owned());
    }
    for child in rule.children() {
        collect_literals(child, out);
    }
}

/// How many nodes a rule contributes to one slot. `max` saturates at 2,
/// which stands for "more than one".
#[derive(Debug, Clone, Default)]
struct Slot {
    min: u8,
    max: u8,
    types: BTreeSet<NodeTypeRef>,
}

impl Slot {
    fn one(kind: &str, named: bool) -> Self {
        Self {
            min: 1,
            max: 1,
            types: BTreeSet::from([NodeTypeRef {
                kind: kind.to_owned(),
                named,
            }]),
        }
    }

    fn then(mut self, other: Self) -> Self {
        self.min = (self.min + other.min).min(2);
        self.max = (self.max + other.max).min(2);
        self.types.extend(other.types);
        self
    }

    fn or(mut self, other: Self) -> Self {
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
        self.types.extend(other.types);
        self
    }

    fn repeated(mut self, at_least_once: bool) -> Self {
        if !at_least_once {
            self.min = 0;
        }
        if self.max > 0 {
            self.max = 2;
        }
        self
    }

    fn into_info(self) -> Option<ChildInfo> {
        (self.max > 0).then(|| ChildInfo {
            multiple: self.max > 1,
            required: self.min > 0,
            types: self.types.into_iter().collect(),
        })
    }
}

#[derive(Debug, Clone, Default)]
struct Summary {
    fields: BTreeMap<String, Slot>,
    // Named nodes outside any field.
    children: Slot,
    // Every visible node outside any field, anonymous ones included.
    all: Slot,
}

impl Summary {
    fn node(kind: &str, named: bool) -> Self {
        Self {
            fields: BTreeMap::new(),
            children: if named {
                Slot::one(kind, named)
            } else {
                Slot::default()
            },
            all: Slot::one(kind, named),
        }
    }

    fn combine(mut self, other: Self, op: fn(Slot, Slot) -> Slot) -> Self {
        let names: BTreeSet<String> = self.fields.keys().chain(other.fields.keys()).cloned().collect();
        let mut other_fields = other.fields;
        for name in names {
            let left = self.fields.remove(&name).unwrap_or_default();
            let right = other_fields.remove(&name).unwrap_or_default();
            self.fields.insert(name, op(left, right));
        }
        self.children = op(self.children, other.children);
        self.all = op(self.all, other.all);
        self
    }

    fn map(mut self, f: impl Fn(Slot) -> Slot) -> Self {
        self.fields = self.fields.into_iter().map(|(k, v)| (k, f(v))).collect();
        self.children = f(self.children);
        self.all = f(self.all);
        self
    }
}

fn summarize<'g>(grammar: &'g Grammar, rule: &'g Rule, expanding: &mut HashSet<&'g str>) -> Summary {
    match rule.rule_type {
        RuleType::String => rule
            .string_value()
            .map_or_else(Summary::default, |value| Summary::node(value, false)),
        RuleType::Symbol => {
            let Some(name) = rule.symbol_name() else {
                return Summary::default();
            };
            let hidden = name.starts_with('_') && !grammar.is_supertype(name);
            match grammar.rule(name) {
                Some(inner) if hidden && !inner.is_token() => {
                    if !expanding.insert(name) {
                        return Summary::default();
                    }
                    let summary = summarize(grammar, inner, expanding);
                    expanding.remove(name);
                    summary
                }
                _ if hidden => Summary::default(),
                _ => Summary::node(name, true),
            }
        }
        RuleType::Alias => match (&rule.value, rule.named) {
            (Some(crate::grammar::RuleValue::String(alias)), named) => {
                Summary::node(alias, named.unwrap_or(false))
            }
            _ => Summary::default(),
        },
        RuleType::Seq => rule
            .members
            .iter()
            .map(|m| summarize(grammar, m, expanding))
            .reduce(|a, b| a.combine(b, Slot::then))
            .unwrap_or_default(),
        RuleType::Choice => rule
            .members
            .iter()
            .map(|m| summarize(grammar, m, expanding))
            .reduce(|a, b| a.combine(b, Slot::or))
            .unwrap_or_default(),
        RuleType::Repeat | RuleType::Repeat1 => {
            let at_least_once = rule.rule_type == RuleType::Repeat1;
            content(grammar, rule, expanding).map(|slot| slot.repeated(at_least_once))
        }
        RuleType::Field => {
            let inner = content(grammar, rule, expanding);
            let mut summary = Summary {
                fields: inner.fields,
                ..Summary::default()
            };
            if let Some(name) = rule.field_name() {
                let slot = summary.fields.remove(name).unwrap_or_default();
                summary.fields.insert(name.to_owned(), slot.then(inner.all));
            }
            summary
        }
        RuleType::Prec | RuleType::PrecLeft | RuleType::PrecRight | RuleType::PrecDynamic => {
            content(grammar, rule, expanding)
        }
        _ => Summary::default(),
    }
}

fn content<'g>(grammar: &'g Grammar, rule: &'g Rule, expanding: &mut HashSet<&'g str>) -> Summary {
    rule.content
        .as_deref()
        .map(|inner| summarize(grammar, inner, expanding))
        .unwrap_or_default()
}

/// The visible kinds a supertype resolves to, looking through hidden rules.
fn produced<'g>(
    grammar: &'g Grammar,
    rule: &'g Rule,
    seen: &mut HashSet<&'g str>,
    out: &mut BTreeSet<NodeTypeRef>,
) {
    if let Some(name) = rule.symbol_name() {
        let hidden = name.starts_with('_') && !grammar.is_supertype(name);
        match grammar.rule(name) {
            Some(inner) if hidden && seen.insert(name) => produced(grammar, inner, seen, out),
            _ if hidden => {}
            _ => {
                out.insert(NodeTypeRef {
                    kind: name.to_owned(),
                    named: true,
                });
            }
        }
        return;
    }
    for child in rule.children() {
        produced(grammar, child, seen, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hare;

    fn find<'a>(types: &'a [NodeTypeInfo], kind: &str, named: bool) -> &'a NodeTypeInfo {
        types
            .iter()
            .find(|t| t.kind == kind && t.named == named)
            .unwrap()
    }

    fn refs(info: &ChildInfo) -> Vec<(&str, bool)> {
        info.types
            .iter()
            .map(|t| (t.kind.as_str(), t.named))
            .collect()
    }

    #[test]
    fn test_binary_expression_fields() {
        let types = node_types(&hare::grammar());
        let binary = find(&types, "binary_expression", true);
        let left = &binary.fields["left"];
        assert!(left.required);
        assert!(!left.multiple);
        assert_eq!(refs(left), [("expression", true)]);

        let operator = &binary.fields["operator"];
        assert_eq!(operator.types.len(), hare::BINARY_OPERATORS.len());
        assert!(operator.types.iter().all(|t| !t.named));
        assert!(binary.children.is_none());
    }

    #[test]
    fn test_optional_and_repeated_children() {
        let types = node_types(&hare::grammar());
        let function = find(&types, "function_declaration", true);
        assert!(function.fields["name"].required);
        assert!(!function.fields["returns"].required);
        assert!(!function.fields["body"].required);

        let children = function.children.as_ref().unwrap();
        assert!(children.multiple);
        assert!(!children.required);
        assert!(refs(children).contains(&("parameter", true)));
        assert!(refs(children).contains(&("function_attribute", true)));
    }

    #[test]
    fn test_cast_fields_cover_the_whole_sequence() {
        let types = node_types(&hare::grammar());
        let cast = find(&types, "cast_expression", true);
        let type_cast = &cast.fields["type_cast"];
        assert!(type_cast.multiple);
        assert!(!type_cast.required);
        assert!(refs(type_cast).contains(&(":", false)));
    }

    #[test]
    fn test_hidden_rules_are_looked_through() {
        let types = node_types(&hare::grammar());
        assert!(types
            .iter()
            .filter(|t| t.named)
            .all(|t| !t.kind.starts_with('_')));
        assert!(!find(&types, "_", false).named);

        let string = find(&types, "string", true);
        let children = refs(string.children.as_ref().unwrap());
        assert_eq!(children, [("escape_sequence", true), ("string_content", true)]);
    }

    #[test]
    fn test_supertypes_and_literals() {
        let types = node_types(&hare::grammar());
        let literal = find(&types, "literal", true);
        assert_eq!(literal.subtypes.len(), 12);
        assert!(find(&types, "identifier", true).fields.is_empty());
        assert!(!find(&types, "=>", false).named);
    }

    #[test]
    fn test_json_has_node_types_shape() {
        let types = node_types(&hare::grammar());
        let json = to_json(&types);
        assert!(json.starts_with('['));
        assert!(json.contains(r#""type":"binary_expression""#));
        let reparsed: Vec<NodeTypeInfo> = facet_json::from_str(&json).unwrap();
        assert_eq!(reparsed, types);
    }
}
