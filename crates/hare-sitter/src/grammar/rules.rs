//! The rule tree of a grammar, in the shape `grammar.json` stores it.
//!
//! Every combinator of the JavaScript DSL (`seq`, `choice`, `prec.left`,
//! `field`, ...) becomes one [`Rule`] whose [`RuleType`] says which
//! combinator it was. Only the parts that combinator uses are set.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One node of a grammar's rule tree.
///
/// Leaf rules (`STRING`, `PATTERN`, `SYMBOL`, `BLANK`) carry a `value` or a
/// `name`; wrappers carry a single `content`; `SEQ` and `CHOICE` carry
/// `members`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    /// Which combinator this is.
    #[serde(rename = "type")]
    pub rule_type: RuleType,

    /// Literal text, pattern source or precedence level.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<RuleValue>,

    /// Referenced rule (`SYMBOL`), field name (`FIELD`) or alias target
    /// (`ALIAS`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// The wrapped rule of `REPEAT`, `PREC*`, `FIELD`, `ALIAS` and `TOKEN`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Box<Rule>>,

    /// Operands of `SEQ` and `CHOICE`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub members: Vec<Rule>,

    /// For `ALIAS`: whether the alias names a visible node.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub named: Option<bool>,

    /// Regex flags of a `PATTERN`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flags: Option<String>,

    /// Reserved word set of a `RESERVED` rule.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_name: Option<String>,
}

/// The scalar carried in [`Rule::value`]: a JSON string or a JSON number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RuleValue {
    /// Literal text or a regex source.
    String(String),

    /// A precedence level.
    Integer(i32),
}

/// The combinator a [`Rule`] stands for, spelled in JSON as in
/// `grammar.json`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RuleType {
    /// Matches nothing.
    Blank,
    /// Literal text.
    String,
    /// A regular expression.
    Pattern,
    /// Another rule, by name.
    Symbol,
    /// Any one of `members`.
    Choice,
    /// All of `members`, in order.
    Seq,
    /// Zero or more of `content`.
    Repeat,
    /// One or more of `content`.
    Repeat1,
    /// `prec(n, ...)`
    Prec,
    /// `prec.left(n, ...)`
    PrecLeft,
    /// `prec.right(n, ...)`
    PrecRight,
    /// `prec.dynamic(n, ...)`
    PrecDynamic,
    /// `field(name, ...)`
    Field,
    /// `alias(..., name)`
    Alias,
    /// `token(...)`
    Token,
    /// `token.immediate(...)`: no extras may precede it.
    ImmediateToken,
    /// `reserved(...)`
    Reserved,
}

impl RuleType {
    /// The spelling used in `grammar.json`.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Blank => "BLANK",
            Self::String => "STRING",
            Self::Pattern => "PATTERN",
            Self::Symbol => "SYMBOL",
            Self::Choice => "CHOICE",
            Self::Seq => "SEQ",
            Self::Repeat => "REPEAT",
            Self::Repeat1 => "REPEAT1",
            Self::Prec => "PREC",
            Self::PrecLeft => "PREC_LEFT",
            Self::PrecRight => "PREC_RIGHT",
            Self::PrecDynamic => "PREC_DYNAMIC",
            Self::Field => "FIELD",
            Self::Alias => "ALIAS",
            Self::Token => "TOKEN",
            Self::ImmediateToken => "IMMEDIATE_TOKEN",
            Self::Reserved => "RESERVED",
        }
    }

    /// Whether this is one of the four precedence wrappers.
    #[must_use]
    pub fn is_precedence(self) -> bool {
        matches!(
            self,
            Self::Prec | Self::PrecLeft | Self::PrecRight | Self::PrecDynamic
        )
    }
}

impl fmt::Display for RuleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Rule {
    /// A rule of `rule_type` with nothing else set.
    #[must_use]
    pub fn new(rule_type: RuleType) -> Self {
        Self {
            rule_type,
            value: None,
            name: None,
            content: None,
            members: Vec::new(),
            named: None,
            flags: None,
            context_name: None,
        }
    }

    /// The `type` string of this rule.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.rule_type.as_str()
    }

    /// Whether this rule matches text directly.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self.rule_type, RuleType::String | RuleType::Pattern)
    }

    /// Whether this rule lexes its whole content as one token.
    #[must_use]
    pub fn is_token(&self) -> bool {
        matches!(self.rule_type, RuleType::Token | RuleType::ImmediateToken)
    }

    /// Whether this rule refers to another rule.
    #[must_use]
    pub fn is_symbol(&self) -> bool {
        self.rule_type == RuleType::Symbol
    }

    /// The rule a `SYMBOL` refers to.
    #[must_use]
    pub fn symbol_name(&self) -> Option<&str> {
        self.name_if(RuleType::Symbol)
    }

    /// The field a `FIELD` assigns.
    #[must_use]
    pub fn field_name(&self) -> Option<&str> {
        self.name_if(RuleType::Field)
    }

    /// The level of a precedence wrapper.
    #[must_use]
    pub fn precedence(&self) -> Option<i32> {
        match self.value {
            Some(RuleValue::Integer(level)) if self.rule_type.is_precedence() => Some(level),
            _ => None,
        }
    }

    /// The text a `STRING` matches.
    #[must_use]
    pub fn string_value(&self) -> Option<&str> {
        self.text_if(RuleType::String)
    }

    /// The regex source of a `PATTERN`.
    #[must_use]
    pub fn pattern_value(&self) -> Option<&str> {
        self.text_if(RuleType::Pattern)
    }

    /// The direct sub-rules: `members`, then `content`.
    pub fn children(&self) -> impl Iterator<Item = &Rule> {
        self.members.iter().chain(self.content.as_deref())
    }

    fn name_if(&self, rule_type: RuleType) -> Option<&str> {
        (self.rule_type == rule_type)
            .then_some(self.name.as_deref())
            .flatten()
    }

    fn text_if(&self, rule_type: RuleType) -> Option<&str> {
        match &self.value {
            Some(RuleValue::String(text)) if self.rule_type == rule_type => Some(text),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::dsl::{field, pattern, prec_left, seq, string, sym};

    #[test]
    fn test_rule_accessors() {
        let rule = prec_left(1, seq([sym("expr"), string("+"), sym("expr")]));
        assert_eq!(rule.precedence(), Some(1));
        assert_eq!(rule.type_name(), "PREC_LEFT");
        assert!(rule.rule_type.is_precedence());

        let inner = rule.children().next().unwrap();
        assert_eq!(inner.children().count(), 3);
        assert_eq!(inner.members[0].symbol_name(), Some("expr"));
        assert_eq!(inner.members[1].string_value(), Some("+"));
        assert_eq!(inner.members[1].pattern_value(), None);
        assert!(inner.members[1].is_terminal());
    }

    #[test]
    fn test_field_name() {
        let rule = field("callee", sym("expression"));
        assert_eq!(rule.field_name(), Some("callee"));
        assert_eq!(rule.symbol_name(), None);
        assert_eq!(rule.children().next().unwrap().symbol_name(), Some("expression"));
    }

    #[test]
    fn test_pattern_value() {
        let rule = pattern(r"[a-z]+");
        assert_eq!(rule.pattern_value(), Some("[a-z]+"));
        assert_eq!(rule.string_value(), None);
        assert_eq!(rule.rule_type.to_string(), "PATTERN");
    }

    #[test]
    fn test_parse_member_access_rule() {
        let json = r#"{
            "type": "PREC",
            "value": 15,
            "content": {
                "type": "SEQ",
                "members": [
                    {"type": "FIELD", "name": "object", "content": {"type": "SYMBOL", "name": "expression"}},
                    {"type": "STRING", "value": "."},
                    {"type": "SYMBOL", "name": "identifier"}
                ]
            }
        }"#;

        let rule: Rule = serde_json::from_str(json).unwrap();
        assert_eq!(rule.precedence(), Some(15));
        let seq = rule.children().next().unwrap();
        assert_eq!(seq.members[0].field_name(), Some("object"));
        assert_eq!(seq.members[1].string_value(), Some("."));
    }

    #[test]
    fn test_scalar_values_are_written_bare() {
        let rule = prec_left(2, seq([string("+"), pattern("[0-9]+")]));
        assert_eq!(
            serde_json::to_string(&rule).unwrap(),
            r#"{"type":"PREC_LEFT","value":2,"content":{"type":"SEQ","members":[{"type":"STRING","value":"+"},{"type":"PATTERN","value":"[0-9]+"}]}}"#
        );
        assert_eq!(
            serde_json::to_string(&field("name", sym("identifier"))).unwrap(),
            r#"{"type":"FIELD","name":"name","content":{"type":"SYMBOL","name":"identifier"}}"#
        );
    }

    #[test]
    fn test_value_kind_follows_json_type() {
        let level: Rule = serde_json::from_str(r#"{"type":"PREC","value":-1,"content":{"type":"BLANK"}}"#).unwrap();
        assert_eq!(level.value, Some(RuleValue::Integer(-1)));
        let digits: Rule = serde_json::from_str(r#"{"type":"STRING","value":"15"}"#).unwrap();
        assert_eq!(digits.value, Some(RuleValue::String("15".to_owned())));
        assert_eq!(digits.precedence(), None);
    }
}
