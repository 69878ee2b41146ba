use crate::registry::UtilityCategory;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Declaration {
    pub property: String,
    pub value: String,
}

impl Declaration {
    pub fn new(property: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            value: value.into(),
        }
    }
}

impl fmt::Display for Declaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.property, self.value)
    }
}

/// One step of a variant chain.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Layer {
    /// A selector template; `&` stands for the selector built so far.
    Selector(String),
    /// A full at-rule prelude such as `@media (width >= 48rem)`.
    Condition(String),
}

/// Emission order: utility category, then variant count, then the variants'
/// own ranks, then the candidate text as a tie-break.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SortKey {
    pub category: UtilityCategory,
    pub variant_count: usize,
    pub variant_ranks: Vec<u16>,
    pub candidate: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rule {
    pub candidate: String,
    pub class_selector: String,
    pub layers: Vec<Layer>,
    pub declarations: Vec<Declaration>,
    pub sort_key: SortKey,
}

impl Rule {
    /// The selector with every selector layer folded in, outermost first.
    pub fn selector(&self) -> String {
        let mut selector = self.class_selector.clone();
        for layer in &self.layers {
            if let Layer::Selector(template) = layer {
                selector = template.replace('&', &selector);
            }
        }
        selector
    }

    /// At-rule preludes in chain order.
    pub fn conditions(&self) -> Vec<&str> {
        self.layers
            .iter()
            .filter_map(|layer| match layer {
                Layer::Condition(prelude) => Some(prelude.as_str()),
                Layer::Selector(_) => None,
            })
            .collect()
    }
}

/// An ordered, duplicate-free collection of rules.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    pub fn from_rules(rules: impl IntoIterator<Item = Rule>) -> Self {
        let mut rules: Vec<Rule> = rules.into_iter().collect();
        rules.sort_by(|a, b| a.sort_key.cmp(&b.sort_key));
        rules.dedup();
        Self { rules }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Rule> {
        self.rules.iter()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn candidates(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(|rule| rule.candidate.as_str())
    }
}

impl<'a> IntoIterator for &'a RuleSet {
    type Item = &'a Rule;
    type IntoIter = std::slice::Iter<'a, Rule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}

/// Escapes a class name for use after `.` in a selector. Anything outside
/// `[A-Za-z0-9_-]` and ASCII gets a backslash; a leading digit becomes a hex
/// escape.
pub fn escape_selector(class: &str) -> String {
    let mut escaped = String::with_capacity(class.len() * 2);

    for (idx, ch) in class.chars().enumerate() {
        if idx == 0 && ch.is_ascii_digit() {
            escaped.push_str(&format!("\\{:x} ", u32::from(ch)));
            continue;
        }
        if ch.is_ascii_alphanumeric() || ch == '_' || ch == '-' || !ch.is_ascii() {
            escaped.push(ch);
        } else {
            escaped.push('\\');
            escaped.push(ch);
        }
    }

    escaped
}
