use crate::rule::{Declaration, Layer, Rule, RuleSet};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::ops::Deref;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputStyle {
    /// Flat selectors, at-rules wrapped around them, two-space indentation.
    #[default]
    Expanded,
    /// One block per candidate with every variant layer as a nested rule,
    /// outermost first.
    Nested,
    /// Expanded semantics with no insignificant whitespace.
    Compact,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CssOutput(String);

impl CssOutput {
    pub fn new(css: String) -> Self {
        Self(css)
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl Deref for CssOutput {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        self.0.as_str()
    }
}

impl fmt::Display for CssOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.as_str())
    }
}

impl From<String> for CssOutput {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<CssOutput> for String {
    fn from(value: CssOutput) -> Self {
        value.0
    }
}

/// Renders `rules` in their stored order. Identical selector and
/// declaration pairs under the same conditions are written once.
pub fn emit(rules: &RuleSet, style: OutputStyle) -> CssOutput {
    CssOutput(emit_chunks(rules, style).collect())
}

/// The same text as [`emit`], one rule at a time.
pub fn emit_chunks(rules: &RuleSet, style: OutputStyle) -> impl Iterator<Item = String> + '_ {
    let mut seen = HashSet::new();
    rules
        .iter()
        .filter(move |rule| seen.insert(dedup_key(rule)))
        .map(move |rule| render_rule(rule, style))
}

fn dedup_key(rule: &Rule) -> (Vec<String>, String, Vec<Declaration>) {
    let conditions = rule.conditions().into_iter().map(str::to_string).collect();
    (conditions, rule.selector(), rule.declarations.clone())
}

fn render_rule(rule: &Rule, style: OutputStyle) -> String {
    match style {
        OutputStyle::Expanded => {
            let mut css = block(&rule.selector(), &declaration_lines(&rule.declarations));
            for condition in rule.conditions().into_iter().rev() {
                css = block(condition, &css);
            }
            css.push('\n');
            css
        }
        OutputStyle::Nested => {
            let mut css = declaration_lines(&rule.declarations);
            for layer in rule.layers.iter().rev() {
                let header = match layer {
                    Layer::Selector(template) => template.as_str(),
                    Layer::Condition(prelude) => prelude.as_str(),
                };
                css = block(header, &css);
            }
            let mut css = block(&rule.class_selector, &css);
            css.push('\n');
            css
        }
        OutputStyle::Compact => {
            let declarations = rule
                .declarations
                .iter()
                .map(|decl| format!("{}:{}", decl.property, decl.value))
                .collect::<Vec<_>>()
                .join(";");
            let mut css = format!("{}{{{}}}", rule.selector(), declarations);
            for condition in rule.conditions().into_iter().rev() {
                css = format!("{}{{{}}}", condition, css);
            }
            css
        }
    }
}

fn declaration_lines(declarations: &[Declaration]) -> String {
    declarations
        .iter()
        .map(|decl| format!("{};", decl))
        .collect::<Vec<_>>()
        .join("\n")
}

fn block(header: &str, body: &str) -> String {
    format!("{} {{\n{}\n}}", header, indent_css_block(body, 2))
}

fn indent_css_block(css: &str, spaces: usize) -> String {
    let padding = " ".repeat(spaces);
    css.lines()
        .map(|line| {
            if line.is_empty() {
                String::new()
            } else {
                format!("{}{}", padding, line)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
