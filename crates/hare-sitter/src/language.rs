//! The language descriptor handed to parsers.
//!
//! A [`Language`] is derived once from a [`Grammar`]: it numbers every node
//! kind and field name so trees can store compact ids. The Hare descriptor is
//! built lazily on first access and lives for the rest of the process.

use crate::grammar::{Grammar, GrammarError, Rule};
use crate::node_types::{self, NodeTypeInfo};
use std::collections::{BTreeSet, HashMap};
use std::sync::LazyLock;

/// Numeric id of a node kind.
pub type KindId = u16;

/// Numeric id of a field name. Field ids start at 1.
pub type FieldId = u16;

/// Version of the descriptor layout produced by this crate.
pub const LANGUAGE_VERSION: usize = 14;

/// Oldest descriptor layout [`Parser`](crate::Parser) still accepts.
pub const MIN_COMPATIBLE_LANGUAGE_VERSION: usize = 13;

/// Kind id of the end-of-input symbol.
pub const END_KIND: KindId = 0;

/// Kind id used for `ERROR` nodes.
pub const ERROR_KIND: KindId = KindId::MAX;

#[derive(Debug, Clone)]
struct KindInfo {
    name: String,
    named: bool,
    visible: bool,
    supertype: bool,
}

/// An immutable grammar descriptor.
///
/// Treat this as an opaque handle: obtain it from [`language`], query it, and
/// pass it to [`Parser::set_language`](crate::Parser::set_language).
#[derive(Debug)]
pub struct Language {
    version: usize,
    grammar: Grammar,
    kinds: Vec<KindInfo>,
    kind_ids: HashMap<(String, bool), KindId>,
    fields: Vec<String>,
    supertypes: Vec<KindId>,
    subtypes: HashMap<KindId, Vec<KindId>>,
}

static HARE: LazyLock<Language> = LazyLock::new(|| Language::new(crate::hare::grammar()));

/// Returns the Hare language descriptor.
///
/// Every call returns the same address; the descriptor is never mutated or
/// freed.
#[must_use]
pub fn language() -> &'static Language {
    &HARE
}

/// Alias of [`language`] under the symbol name of the C binding.
#[must_use]
pub fn tree_sitter_hare() -> &'static Language {
    language()
}

impl Language {
    /// Derives a descriptor from `grammar`.
    #[must_use]
    pub fn new(grammar: Grammar) -> Self {
        Self::with_version(grammar, LANGUAGE_VERSION)
    }

    /// [`Language::new`] with an explicit layout version.
    #[must_use]
    pub(crate) fn with_version(grammar: Grammar, version: usize) -> Self {
        let mut rule_names: Vec<&str> = grammar.rules.keys().map(String::as_str).collect();
        rule_names.sort_unstable();

        let mut literals = BTreeSet::new();
        let mut field_names = BTreeSet::new();
        for rule in grammar.rules.values() {
            collect_literals(rule, &mut literals);
            collect_fields(rule, &mut field_names);
        }

        let mut kinds = vec![KindInfo {
            name: "end".to_owned(),
            named: false,
            visible: false,
            supertype: false,
        }];
        for name in &rule_names {
            let supertype = grammar.is_supertype(name);
            kinds.push(KindInfo {
                name: (*name).to_owned(),
                named: true,
                visible: !name.starts_with('_') && !supertype,
                supertype,
            });
        }
        for literal in literals {
            kinds.push(KindInfo {
                name: literal.to_owned(),
                named: false,
                visible: true,
                supertype: false,
            });
        }

        let kind_ids: HashMap<(String, bool), KindId> = kinds
            .iter()
            .enumerate()
            .skip(1)
            .filter_map(|(id, kind)| {
                let id = KindId::try_from(id).ok()?;
                Some(((kind.name.clone(), kind.named), id))
            })
            .collect();

        let supertypes: Vec<KindId> = grammar
            .supertypes
            .iter()
            .flatten()
            .filter_map(|name| kind_ids.get(&(name.clone(), true)).copied())
            .collect();

        let subtypes = supertypes
            .iter()
            .filter_map(|&id| {
                let rule = grammar.rule(&kinds[usize::from(id)].name)?;
                let mut members = Vec::new();
                collect_alternatives(rule, &mut members);
                let ids = members
                    .into_iter()
                    .filter_map(|name| kind_ids.get(&(name.to_owned(), true)).copied())
                    .collect();
                Some((id, ids))
            })
            .collect();

        let fields = field_names.into_iter().map(str::to_owned).collect();

        Self {
            version,
            grammar,
            kinds,
            kind_ids,
            fields,
            supertypes,
            subtypes,
        }
    }

    /// The grammar's name, e.g. `"hare"`.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.grammar.name
    }

    /// The descriptor layout version.
    #[must_use]
    pub fn version(&self) -> usize {
        self.version
    }

    /// The grammar this descriptor was derived from.
    #[must_use]
    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    /// Number of node kinds, not counting `ERROR`.
    #[must_use]
    pub fn node_kind_count(&self) -> usize {
        self.kinds.len()
    }

    /// The name of kind `id`.
    #[must_use]
    pub fn node_kind_for_id(&self, id: KindId) -> Option<&str> {
        if id == ERROR_KIND {
            return Some("ERROR");
        }
        self.kinds.get(usize::from(id)).map(|k| k.name.as_str())
    }

    /// Looks up the id of a named or anonymous kind.
    #[must_use]
    pub fn id_for_node_kind(&self, kind: &str, named: bool) -> Option<KindId> {
        if named && kind == "ERROR" {
            return Some(ERROR_KIND);
        }
        self.kind_ids.get(&(kind.to_owned(), named)).copied()
    }

    /// Whether kind `id` is a named node (a grammar rule rather than a literal).
    #[must_use]
    pub fn node_kind_is_named(&self, id: KindId) -> bool {
        id == ERROR_KIND || self.kinds.get(usize::from(id)).is_some_and(|k| k.named)
    }

    /// Whether nodes of kind `id` appear in syntax trees.
    #[must_use]
    pub fn node_kind_is_visible(&self, id: KindId) -> bool {
        id == ERROR_KIND || self.kinds.get(usize::from(id)).is_some_and(|k| k.visible)
    }

    /// Whether kind `id` is a supertype.
    #[must_use]
    pub fn node_kind_is_supertype(&self, id: KindId) -> bool {
        self.kinds
            .get(usize::from(id))
            .is_some_and(|k| k.supertype)
    }

    /// Number of distinct field names.
    #[must_use]
    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    /// The name of field `id`.
    #[must_use]
    pub fn field_name_for_id(&self, id: FieldId) -> Option<&str> {
        let index = usize::from(id).checked_sub(1)?;
        self.fields.get(index).map(String::as_str)
    }

    /// Looks up the id of a field name.
    #[must_use]
    pub fn field_id_for_name(&self, name: &str) -> Option<FieldId> {
        let index = self.fields.iter().position(|f| f == name)?;
        FieldId::try_from(index + 1).ok()
    }

    /// Kind ids of the supertypes, in declaration order.
    #[must_use]
    pub fn supertypes(&self) -> &[KindId] {
        &self.supertypes
    }

    /// Kind ids directly grouped under `supertype`.
    #[must_use]
    pub fn subtypes(&self, supertype: KindId) -> &[KindId] {
        self.subtypes.get(&supertype).map_or(&[], Vec::as_slice)
    }

    /// A `node-types.json` style description of every kind.
    #[must_use]
    pub fn node_types(&self) -> Vec<NodeTypeInfo> {
        node_types::node_types(&self.grammar)
    }

    /// [`Language::node_types`] serialised as JSON.
    #[must_use]
    pub fn node_types_json(&self) -> String {
        node_types::to_json(&self.node_types())
    }

    /// The grammar in `grammar.json` form.
    ///
    /// # Errors
    ///
    /// Returns [`GrammarError::JsonWrite`] if serialisation fails.
    pub fn grammar_json(&self) -> Result<String, GrammarError> {
        self.grammar.to_json()
    }
}

fn collect_literals<'g>(rule: &'g Rule, out: &mut BTreeSet<&'g str>) {
    if rule.is_token() {
        return;
    }
    if let Some(value) = rule.string_value() {
        out.insert(value);
    }
    for child in rule.children() {
        collect_literals(child, out);
    }
}

fn collect_fields<'g>(rule: &'g Rule, out: &mut BTreeSet<&'g str>) {
    if let Some(name) = rule.field_name() {
        out.insert(name);
    }
    for child in rule.children() {
        collect_fields(child, out);
    }
}

/// Symbols reachable through the choice/precedence wrappers of a supertype.
fn collect_alternatives<'g>(rule: &'g Rule, out: &mut Vec<&'g str>) {
    if let Some(name) = rule.symbol_name() {
        out.push(name);
        return;
    }
    for child in rule.children() {
        collect_alternatives(child, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accessor_returns_same_address() {
        let first = language();
        let second = tree_sitter_hare();
        assert!(std::ptr::eq(first, second));
    }

    #[test]
    fn test_accessor_is_shared_across_threads() {
        let addresses: Vec<usize> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| scope.spawn(|| std::ptr::from_ref(language()) as usize))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });
        assert!(addresses.windows(2).all(|w| w[0] == w[1]));
    }

    #[test]
    fn test_named_and_anonymous_kinds() {
        let lang = language();
        assert_eq!(lang.name(), "hare");
        assert_eq!(lang.version(), LANGUAGE_VERSION);

        let id = lang.id_for_node_kind("function_declaration", true).unwrap();
        assert_eq!(lang.node_kind_for_id(id), Some("function_declaration"));
        assert!(lang.node_kind_is_named(id));
        assert!(lang.node_kind_is_visible(id));

        let semi = lang.id_for_node_kind(";", false).unwrap();
        assert!(!lang.node_kind_is_named(semi));
        assert!(lang.node_kind_is_visible(semi));

        // The "void" keyword exists both as a rule and as a literal.
        assert_ne!(
            lang.id_for_node_kind("void", true),
            lang.id_for_node_kind("void", false)
        );

        // Token internals never become kinds.
        assert_eq!(lang.id_for_node_kind("//", false), None);
        assert!(lang.id_for_node_kind("f32", false).is_some());
        assert_eq!(lang.node_kind_for_id(END_KIND), Some("end"));
        assert_eq!(lang.node_kind_for_id(ERROR_KIND), Some("ERROR"));
    }

    #[test]
    fn test_hidden_rules_are_not_visible() {
        let lang = language();
        let escape = lang.id_for_node_kind("_escape_sequence", true).unwrap();
        assert!(!lang.node_kind_is_visible(escape));

        let expression = lang.id_for_node_kind("expression", true).unwrap();
        assert!(lang.node_kind_is_supertype(expression));
        assert!(!lang.node_kind_is_visible(expression));
    }

    #[test]
    fn test_supertypes_and_subtypes() {
        let lang = language();
        assert_eq!(lang.supertypes().len(), 5);

        let literal = lang.id_for_node_kind("literal", true).unwrap();
        let names: Vec<&str> = lang
            .subtypes(literal)
            .iter()
            .filter_map(|&id| lang.node_kind_for_id(id))
            .collect();
        assert_eq!(names.len(), 12);
        assert!(names.contains(&"concatenated_string"));
    }

    #[test]
    fn test_fields() {
        let lang = language();
        let id = lang.field_id_for_name("callee").unwrap();
        assert!(id >= 1);
        assert_eq!(lang.field_name_for_id(id), Some("callee"));
        assert_eq!(lang.field_name_for_id(0), None);
        assert_eq!(lang.field_id_for_name("nonexistent"), None);
        assert_eq!(lang.field_count(), 19);
    }
}
