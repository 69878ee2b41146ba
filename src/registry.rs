//! The utility table: maps a parsed candidate's base to declarations.
//!
//! Static utilities are looked up by exact name and always win. Functional
//! utilities are tried longest root first; a root whose value does not
//! resolve falls through to the next, shorter one. Several functional
//! entries may share a root (`text` is a font size before it is a color).

use crate::candidate::{ParsedCandidate, UtilityRef};
use crate::rule::Declaration;
use crate::theme::{ThemeTable, TokenCategory, ValueKind, is_number};
use emberwind_core::DropReason;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// Coarse emission groups; declaration order is the cascade order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum UtilityCategory {
    Layout,
    Flexbox,
    Spacing,
    Sizing,
    Typography,
    Background,
    Border,
    Effects,
    Interactivity,
    Arbitrary,
}

/// Declarations for a utility before variants are applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleTemplate {
    pub category: UtilityCategory,
    pub declarations: Vec<Declaration>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Grammar {
    Kind(ValueKind),
    Image,
    Any,
}

impl Grammar {
    fn accepts(self, value: &str) -> bool {
        match self {
            Self::Kind(kind) => kind.accepts(value),
            Self::Image => {
                let lower = value.to_ascii_lowercase();
                ["url(", "linear-gradient(", "radial-gradient(", "conic-gradient(", "image-set("]
                    .iter()
                    .any(|prefix| lower.starts_with(prefix))
                    || lower == "none"
            }
            Self::Any => true,
        }
    }

    fn matches_hint(self, hint: &str) -> bool {
        match self {
            Self::Kind(kind) => ValueKind::from_hint(hint) == Some(kind),
            Self::Image => matches!(hint, "image" | "url"),
            Self::Any => hint == "any",
        }
    }

    fn is_color(self) -> bool {
        self == Self::Kind(ValueKind::Color)
    }
}

const HINTS: [&str; 10] = [
    "length",
    "size",
    "percentage",
    "color",
    "number",
    "integer",
    "image",
    "url",
    "any",
    "family-name",
];

struct StaticUtility {
    name: &'static str,
    category: UtilityCategory,
    declarations: &'static [(&'static str, &'static str)],
    color: bool,
}

const fn s(
    name: &'static str,
    category: UtilityCategory,
    declarations: &'static [(&'static str, &'static str)],
) -> StaticUtility {
    StaticUtility {
        name,
        category,
        declarations,
        color: false,
    }
}

const fn c(name: &'static str, category: UtilityCategory, property: &'static [(&'static str, &'static str)]) -> StaticUtility {
    StaticUtility {
        name,
        category,
        declarations: property,
        color: true,
    }
}

struct FunctionalUtility {
    root: &'static str,
    category: UtilityCategory,
    properties: &'static [&'static str],
    theme: Option<TokenCategory>,
    grammar: &'static [Grammar],
    keywords: &'static [(&'static str, &'static str)],
    fractions: bool,
    negative: bool,
    bare: Option<fn(&str) -> String>,
}

impl FunctionalUtility {
    const fn new(
        root: &'static str,
        category: UtilityCategory,
        properties: &'static [&'static str],
        theme: Option<TokenCategory>,
        grammar: &'static [Grammar],
    ) -> Self {
        Self {
            root,
            category,
            properties,
            theme,
            grammar,
            keywords: &[],
            fractions: false,
            negative: false,
            bare: None,
        }
    }

    const fn keywords(mut self, keywords: &'static [(&'static str, &'static str)]) -> Self {
        self.keywords = keywords;
        self
    }

    const fn fractions(mut self) -> Self {
        self.fractions = true;
        self
    }

    const fn negative(mut self) -> Self {
        self.negative = true;
        self
    }

    const fn bare(mut self, format: fn(&str) -> String) -> Self {
        self.bare = Some(format);
        self
    }

    fn takes_color(&self) -> bool {
        self.grammar.iter().any(|grammar| grammar.is_color())
    }
}

pub struct UtilityRegistry {
    theme: Arc<ThemeTable>,
    statics: HashMap<&'static str, &'static StaticUtility>,
    functionals: Vec<&'static FunctionalUtility>,
}

impl UtilityRegistry {
    pub fn new(theme: Arc<ThemeTable>) -> Self {
        let statics = STATIC_UTILITIES
            .iter()
            .map(|utility| (utility.name, utility))
            .collect();
        let mut functionals: Vec<&'static FunctionalUtility> = FUNCTIONAL_UTILITIES.iter().collect();
        functionals.sort_by(|a, b| b.root.len().cmp(&a.root.len()));

        Self {
            theme,
            statics,
            functionals,
        }
    }

    pub fn theme(&self) -> &ThemeTable {
        &self.theme
    }

    /// Resolves a parsed candidate, honoring its negative, modifier and
    /// important-independent parts. Variants are not looked at here.
    pub fn resolve(&self, candidate: &ParsedCandidate) -> Result<RuleTemplate, DropReason> {
        let modifier = candidate.modifier.as_deref();
        match &candidate.utility {
            UtilityRef::Static(name) => self.resolve_named(name, candidate.negative, modifier),
            UtilityRef::Dynamic { root, value } => {
                self.resolve_dynamic(root, value, candidate.negative, modifier)
            }
            UtilityRef::ArbitraryProperty { property, value } => {
                resolve_arbitrary_property(property, value)
            }
        }
    }

    /// Plain lookup without flags, for callers that only hold a utility.
    pub fn lookup(&self, utility: &UtilityRef) -> Option<RuleTemplate> {
        match utility {
            UtilityRef::Static(name) => self.resolve_named(name, false, None).ok(),
            UtilityRef::Dynamic { root, value } => {
                self.resolve_dynamic(root, value, false, None).ok()
            }
            UtilityRef::ArbitraryProperty { property, value } => {
                resolve_arbitrary_property(property, value).ok()
            }
        }
    }

    /// Utility names whose output reads `token`, negative forms included.
    pub fn utilities_for_token(&self, category: TokenCategory, token: &str) -> Vec<String> {
        let Some(expected) = self.theme.get(category, token) else {
            return Vec::new();
        };
        let mut names = Vec::new();

        for utility in FUNCTIONAL_UTILITIES
            .iter()
            .filter(|utility| utility.theme == Some(category))
        {
            let name = if token == "DEFAULT" {
                utility.root.to_string()
            } else {
                format!("{}-{}", utility.root, token)
            };
            let reads_token = self.resolve_named(&name, false, None).is_ok_and(|template| {
                template.declarations.iter().all(|decl| decl.value == expected)
                    && template
                        .declarations
                        .iter()
                        .zip(utility.properties)
                        .all(|(decl, property)| decl.property == *property)
            });
            if !reads_token {
                continue;
            }
            if utility.negative {
                names.push(format!("-{}", name));
            }
            names.push(name);
        }

        names.sort();
        names.dedup();
        names
    }

    fn resolve_named(
        &self,
        name: &str,
        negative: bool,
        modifier: Option<&str>,
    ) -> Result<RuleTemplate, DropReason> {
        if let Some(modifier) = modifier {
            let joined = format!("{}/{}", name, modifier);
            if let Ok(template) = self.resolve_named(&joined, negative, None) {
                return Ok(template);
            }
        }

        if let Some(utility) = self.statics.get(name) {
            if !negative {
                return static_template(utility, modifier);
            }
        }

        let mut negative_rejected = false;
        for utility in &self.functionals {
            let value_name = if name == utility.root {
                "DEFAULT"
            } else {
                match name
                    .strip_prefix(utility.root)
                    .and_then(|rest| rest.strip_prefix('-'))
                {
                    Some(rest) if !rest.is_empty() && rest != "DEFAULT" => rest,
                    _ => continue,
                }
            };
            let Some(value) = self.named_value(utility, value_name) else {
                continue;
            };
            if negative && !utility.negative {
                negative_rejected = true;
                continue;
            }
            let value = if negative { negate(&value) } else { value };
            return functional_template(utility, value, modifier);
        }

        if negative_rejected || (negative && self.statics.contains_key(name)) {
            return Err(DropReason::NegativeNotSupported);
        }
        Err(DropReason::UnknownUtility)
    }

    fn resolve_dynamic(
        &self,
        root: &str,
        raw: &str,
        negative: bool,
        modifier: Option<&str>,
    ) -> Result<RuleTemplate, DropReason> {
        let candidates: Vec<&FunctionalUtility> = FUNCTIONAL_UTILITIES
            .iter()
            .filter(|utility| utility.root == root)
            .collect();
        if candidates.is_empty() {
            return Err(DropReason::UnknownUtility);
        }

        let (hint, raw_value) = split_type_hint(raw);
        let value = decode_arbitrary(raw_value);
        if value.trim().is_empty() || value.contains([';', '{', '}']) {
            return Err(DropReason::InvalidArbitraryValue(raw.to_string()));
        }

        let mut negative_rejected = false;
        for utility in candidates {
            let fits = match hint {
                Some(hint) => utility.grammar.iter().any(|g| g.matches_hint(hint)),
                None => utility.grammar.iter().any(|g| g.accepts(&value)),
            };
            if !fits {
                continue;
            }
            if negative && !utility.negative {
                negative_rejected = true;
                continue;
            }
            let value = if negative { negate(&value) } else { value.clone() };
            return functional_template(utility, value, modifier);
        }

        if negative_rejected {
            return Err(DropReason::NegativeNotSupported);
        }
        Err(DropReason::InvalidArbitraryValue(raw.to_string()))
    }

    fn named_value(&self, utility: &FunctionalUtility, name: &str) -> Option<String> {
        if let Some((_, value)) = utility.keywords.iter().find(|(keyword, _)| *keyword == name) {
            return Some((*value).to_string());
        }
        if let Some(category) = utility.theme {
            if let Some(value) = self.theme.get(category, name) {
                return Some(value.to_string());
            }
            if category == TokenCategory::Colors && COLOR_FALLBACKS.contains(&name) {
                return Some(name.to_string());
            }
        }
        if utility.fractions {
            if let Some(percentage) = fraction(name) {
                return Some(percentage);
            }
        }
        if let Some(format) = utility.bare {
            if !name.is_empty() && name.bytes().all(|b| b.is_ascii_digit()) {
                return Some(format(name));
            }
        }
        None
    }
}

fn static_template(
    utility: &StaticUtility,
    modifier: Option<&str>,
) -> Result<RuleTemplate, DropReason> {
    let alpha = match modifier {
        None => None,
        Some(modifier) if utility.color => Some(
            alpha_percentage(modifier)
                .ok_or_else(|| DropReason::InvalidModifier(modifier.to_string()))?,
        ),
        Some(modifier) => return Err(DropReason::InvalidModifier(modifier.to_string())),
    };
    let declarations = utility
        .declarations
        .iter()
        .map(|(property, value)| match &alpha {
            Some(alpha) => Declaration::new(*property, with_alpha(value, alpha)),
            None => Declaration::new(*property, *value),
        })
        .collect();
    Ok(RuleTemplate {
        category: utility.category,
        declarations,
    })
}

fn functional_template(
    utility: &FunctionalUtility,
    value: String,
    modifier: Option<&str>,
) -> Result<RuleTemplate, DropReason> {
    let value = match modifier {
        None => value,
        Some(modifier) if utility.takes_color() => {
            let alpha = alpha_percentage(modifier)
                .ok_or_else(|| DropReason::InvalidModifier(modifier.to_string()))?;
            with_alpha(&value, &alpha)
        }
        Some(modifier) => return Err(DropReason::InvalidModifier(modifier.to_string())),
    };
    Ok(RuleTemplate {
        category: utility.category,
        declarations: utility
            .properties
            .iter()
            .map(|property| Declaration::new(*property, value.clone()))
            .collect(),
    })
}

fn resolve_arbitrary_property(property: &str, raw: &str) -> Result<RuleTemplate, DropReason> {
    let valid_property = if let Some(custom) = property.strip_prefix("--") {
        !custom.is_empty()
            && custom
                .chars()
                .all(|ch| ch.is_ascii_alphanumeric() || ch == '-' || ch == '_')
    } else {
        property
            .chars()
            .all(|ch| ch.is_ascii_lowercase() || ch == '-')
            && property.starts_with(|ch: char| ch.is_ascii_lowercase() || ch == '-')
    };
    if !valid_property {
        return Err(DropReason::UnknownUtility);
    }
    let value = decode_arbitrary(raw);
    if value.trim().is_empty() || value.contains([';', '{', '}']) {
        return Err(DropReason::InvalidArbitraryValue(raw.to_string()));
    }
    Ok(RuleTemplate {
        category: UtilityCategory::Arbitrary,
        declarations: vec![Declaration::new(property, value)],
    })
}

fn split_type_hint(raw: &str) -> (Option<&str>, &str) {
    if let Some((hint, rest)) = raw.split_once(':') {
        if HINTS.contains(&hint) {
            return (Some(hint), rest);
        }
    }
    (None, raw)
}

/// `_` becomes a space except inside `url(...)`; `\_` keeps a literal
/// underscore.
fn decode_arbitrary(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    let mut url_depth = 0usize;

    while let Some(ch) = chars.next() {
        match ch {
            '\\' => match chars.next() {
                Some('_') => out.push('_'),
                Some(next) => {
                    out.push('\\');
                    out.push(next);
                }
                None => out.push('\\'),
            },
            '(' => {
                if url_depth > 0 {
                    url_depth += 1;
                } else if out.ends_with("url") {
                    url_depth = 1;
                }
                out.push(ch);
            }
            ')' => {
                url_depth = url_depth.saturating_sub(1);
                out.push(ch);
            }
            '_' if url_depth == 0 => out.push(' '),
            _ => out.push(ch),
        }
    }

    out
}

fn negate(value: &str) -> String {
    if matches!(value, "0" | "0px" | "auto") {
        return value.to_string();
    }
    if let Some(positive) = value.strip_prefix('-') {
        return positive.to_string();
    }
    if is_number(value) || value.starts_with(|c: char| c.is_ascii_digit() || c == '.') {
        return format!("-{}", value);
    }
    format!("calc({} * -1)", value)
}

fn fraction(name: &str) -> Option<String> {
    let (numerator, denominator) = name.split_once('/')?;
    let numerator: u32 = numerator.parse().ok()?;
    let denominator: u32 = denominator.parse().ok()?;
    if denominator == 0 {
        return None;
    }
    let percent = f64::from(numerator) * 100.0 / f64::from(denominator);
    Some(format!("{}%", trim_decimal(&format!("{:.6}", percent))))
}

fn trim_decimal(formatted: &str) -> &str {
    if !formatted.contains('.') {
        return formatted;
    }
    formatted.trim_end_matches('0').trim_end_matches('.')
}

fn alpha_percentage(modifier: &str) -> Option<String> {
    if let Some(inner) = modifier.strip_prefix('[').and_then(|m| m.strip_suffix(']')) {
        let percent = inner.strip_suffix('%')?;
        return percent
            .parse::<f64>()
            .ok()
            .filter(|value| (0.0..=100.0).contains(value))
            .map(|_| inner.to_string());
    }
    let value: u32 = modifier.parse().ok()?;
    (value <= 100).then(|| format!("{}%", value))
}

fn with_alpha(color: &str, alpha: &str) -> String {
    format!("color-mix(in oklab, {} {}, transparent)", color, alpha)
}

fn identity(value: &str) -> String {
    value.to_string()
}

fn pixels(value: &str) -> String {
    format!("{}px", value)
}

fn millis(value: &str) -> String {
    format!("{}ms", value)
}

fn grid_repeat(value: &str) -> String {
    format!("repeat({}, minmax(0, 1fr))", value)
}

fn grid_span(value: &str) -> String {
    format!("span {} / span {}", value, value)
}

use Grammar::{Any, Image};
use UtilityCategory::{
    Background, Border, Effects, Flexbox, Interactivity, Layout, Sizing, Spacing, Typography,
};

const LENGTH: &[Grammar] = &[Grammar::Kind(ValueKind::Length)];
const COLOR: &[Grammar] = &[Grammar::Kind(ValueKind::Color)];
const NUMBER: &[Grammar] = &[Grammar::Kind(ValueKind::Number)];
const NUMBER_OR_LENGTH: &[Grammar] = &[
    Grammar::Kind(ValueKind::Number),
    Grammar::Kind(ValueKind::Length),
];
const IMAGE: &[Grammar] = &[Image];
const ANY: &[Grammar] = &[Any];

const SPACING: Option<TokenCategory> = Some(TokenCategory::Spacing);
const COLORS: Option<TokenCategory> = Some(TokenCategory::Colors);
/// Color names that still resolve when a theme does not define them.
const COLOR_FALLBACKS: [&str; 2] = ["black", "white"];

const INSET_KEYWORDS: &[(&str, &str)] = &[("auto", "auto"), ("full", "100%")];
const MARGIN_KEYWORDS: &[(&str, &str)] = &[("auto", "auto")];
const WIDTH_KEYWORDS: &[(&str, &str)] = &[
    ("auto", "auto"),
    ("full", "100%"),
    ("screen", "100vw"),
    ("svw", "100svw"),
    ("dvw", "100dvw"),
    ("min", "min-content"),
    ("max", "max-content"),
    ("fit", "fit-content"),
];
const HEIGHT_KEYWORDS: &[(&str, &str)] = &[
    ("auto", "auto"),
    ("full", "100%"),
    ("screen", "100vh"),
    ("svh", "100svh"),
    ("dvh", "100dvh"),
    ("min", "min-content"),
    ("max", "max-content"),
    ("fit", "fit-content"),
];
const LIMIT_KEYWORDS: &[(&str, &str)] = &[
    ("none", "none"),
    ("full", "100%"),
    ("min", "min-content"),
    ("max", "max-content"),
    ("fit", "fit-content"),
    ("prose", "65ch"),
];
const LEADING_KEYWORDS: &[(&str, &str)] = &[
    ("none", "1"),
    ("tight", "1.25"),
    ("snug", "1.375"),
    ("normal", "1.5"),
    ("relaxed", "1.625"),
    ("loose", "2"),
];
const TRACKING_KEYWORDS: &[(&str, &str)] = &[
    ("tighter", "-0.05em"),
    ("tight", "-0.025em"),
    ("normal", "0em"),
    ("wide", "0.025em"),
    ("wider", "0.05em"),
    ("widest", "0.1em"),
];
const BORDER_WIDTH_KEYWORDS: &[(&str, &str)] = &[("DEFAULT", "1px")];
const FLEX_FACTOR_KEYWORDS: &[(&str, &str)] = &[("DEFAULT", "1")];
const ORDER_KEYWORDS: &[(&str, &str)] = &[("first", "-9999"), ("last", "9999"), ("none", "0")];
const GRID_TEMPLATE_KEYWORDS: &[(&str, &str)] = &[("none", "none"), ("subgrid", "subgrid")];
const SPAN_KEYWORDS: &[(&str, &str)] = &[("full", "1 / -1")];
const ASPECT_KEYWORDS: &[(&str, &str)] = &[
    ("auto", "auto"),
    ("square", "1 / 1"),
    ("video", "16 / 9"),
];
const CURSOR_KEYWORDS: &[(&str, &str)] = &[
    ("auto", "auto"),
    ("default", "default"),
    ("pointer", "pointer"),
    ("wait", "wait"),
    ("text", "text"),
    ("move", "move"),
    ("help", "help"),
    ("not-allowed", "not-allowed"),
    ("none", "none"),
    ("grab", "grab"),
    ("grabbing", "grabbing"),
];
const BASIS_KEYWORDS: &[(&str, &str)] = &[("auto", "auto"), ("full", "100%")];
const Z_KEYWORDS: &[(&str, &str)] = &[("auto", "auto")];

static FUNCTIONAL_UTILITIES: &[FunctionalUtility] = &[
    FunctionalUtility::new("inset", Layout, &["inset"], SPACING, LENGTH)
        .keywords(INSET_KEYWORDS)
        .fractions()
        .negative(),
    FunctionalUtility::new("inset-x", Layout, &["inset-inline"], SPACING, LENGTH)
        .keywords(INSET_KEYWORDS)
        .fractions()
        .negative(),
    FunctionalUtility::new("inset-y", Layout, &["inset-block"], SPACING, LENGTH)
        .keywords(INSET_KEYWORDS)
        .fractions()
        .negative(),
    FunctionalUtility::new("top", Layout, &["top"], SPACING, LENGTH)
        .keywords(INSET_KEYWORDS)
        .fractions()
        .negative(),
    FunctionalUtility::new("right", Layout, &["right"], SPACING, LENGTH)
        .keywords(INSET_KEYWORDS)
        .fractions()
        .negative(),
    FunctionalUtility::new("bottom", Layout, &["bottom"], SPACING, LENGTH)
        .keywords(INSET_KEYWORDS)
        .fractions()
        .negative(),
    FunctionalUtility::new("left", Layout, &["left"], SPACING, LENGTH)
        .keywords(INSET_KEYWORDS)
        .fractions()
        .negative(),
    FunctionalUtility::new("z", Layout, &["z-index"], Some(TokenCategory::ZIndex), NUMBER)
        .keywords(Z_KEYWORDS)
        .negative(),
    FunctionalUtility::new("aspect", Layout, &["aspect-ratio"], None, ANY)
        .keywords(ASPECT_KEYWORDS),
    FunctionalUtility::new("basis", Flexbox, &["flex-basis"], SPACING, LENGTH)
        .keywords(BASIS_KEYWORDS)
        .fractions(),
    FunctionalUtility::new("flex", Flexbox, &["flex"], None, ANY).bare(identity),
    FunctionalUtility::new("grow", Flexbox, &["flex-grow"], None, NUMBER)
        .keywords(FLEX_FACTOR_KEYWORDS)
        .bare(identity),
    FunctionalUtility::new("shrink", Flexbox, &["flex-shrink"], None, NUMBER)
        .keywords(FLEX_FACTOR_KEYWORDS)
        .bare(identity),
    FunctionalUtility::new("order", Flexbox, &["order"], None, NUMBER)
        .keywords(ORDER_KEYWORDS)
        .bare(identity)
        .negative(),
    FunctionalUtility::new("grid-cols", Flexbox, &["grid-template-columns"], None, ANY)
        .keywords(GRID_TEMPLATE_KEYWORDS)
        .bare(grid_repeat),
    FunctionalUtility::new("grid-rows", Flexbox, &["grid-template-rows"], None, ANY)
        .keywords(GRID_TEMPLATE_KEYWORDS)
        .bare(grid_repeat),
    FunctionalUtility::new("col-span", Flexbox, &["grid-column"], None, ANY)
        .keywords(SPAN_KEYWORDS)
        .bare(grid_span),
    FunctionalUtility::new("row-span", Flexbox, &["grid-row"], None, ANY)
        .keywords(SPAN_KEYWORDS)
        .bare(grid_span),
    FunctionalUtility::new("gap", Flexbox, &["gap"], SPACING, LENGTH),
    FunctionalUtility::new("gap-x", Flexbox, &["column-gap"], SPACING, LENGTH),
    FunctionalUtility::new("gap-y", Flexbox, &["row-gap"], SPACING, LENGTH),
    FunctionalUtility::new("p", Spacing, &["padding"], SPACING, LENGTH),
    FunctionalUtility::new("px", Spacing, &["padding-inline"], SPACING, LENGTH),
    FunctionalUtility::new("py", Spacing, &["padding-block"], SPACING, LENGTH),
    FunctionalUtility::new("ps", Spacing, &["padding-inline-start"], SPACING, LENGTH),
    FunctionalUtility::new("pe", Spacing, &["padding-inline-end"], SPACING, LENGTH),
    FunctionalUtility::new("pt", Spacing, &["padding-top"], SPACING, LENGTH),
    FunctionalUtility::new("pr", Spacing, &["padding-right"], SPACING, LENGTH),
    FunctionalUtility::new("pb", Spacing, &["padding-bottom"], SPACING, LENGTH),
    FunctionalUtility::new("pl", Spacing, &["padding-left"], SPACING, LENGTH),
    FunctionalUtility::new("m", Spacing, &["margin"], SPACING, LENGTH)
        .keywords(MARGIN_KEYWORDS)
        .negative(),
    FunctionalUtility::new("mx", Spacing, &["margin-inline"], SPACING, LENGTH)
        .keywords(MARGIN_KEYWORDS)
        .negative(),
    FunctionalUtility::new("my", Spacing, &["margin-block"], SPACING, LENGTH)
        .keywords(MARGIN_KEYWORDS)
        .negative(),
    FunctionalUtility::new("ms", Spacing, &["margin-inline-start"], SPACING, LENGTH)
        .keywords(MARGIN_KEYWORDS)
        .negative(),
    FunctionalUtility::new("me", Spacing, &["margin-inline-end"], SPACING, LENGTH)
        .keywords(MARGIN_KEYWORDS)
        .negative(),
    FunctionalUtility::new("mt", Spacing, &["margin-top"], SPACING, LENGTH)
        .keywords(MARGIN_KEYWORDS)
        .negative(),
    FunctionalUtility::new("mr", Spacing, &["margin-right"], SPACING, LENGTH)
        .keywords(MARGIN_KEYWORDS)
        .negative(),
    FunctionalUtility::new("mb", Spacing, &["margin-bottom"], SPACING, LENGTH)
        .keywords(MARGIN_KEYWORDS)
        .negative(),
    FunctionalUtility::new("ml", Spacing, &["margin-left"], SPACING, LENGTH)
        .keywords(MARGIN_KEYWORDS)
        .negative(),
    FunctionalUtility::new("w", Sizing, &["width"], SPACING, LENGTH)
        .keywords(WIDTH_KEYWORDS)
        .fractions(),
    FunctionalUtility::new("min-w", Sizing, &["min-width"], SPACING, LENGTH)
        .keywords(LIMIT_KEYWORDS),
    FunctionalUtility::new("max-w", Sizing, &["max-width"], SPACING, LENGTH)
        .keywords(LIMIT_KEYWORDS),
    FunctionalUtility::new("h", Sizing, &["height"], SPACING, LENGTH)
        .keywords(HEIGHT_KEYWORDS)
        .fractions(),
    FunctionalUtility::new("min-h", Sizing, &["min-height"], SPACING, LENGTH)
        .keywords(LIMIT_KEYWORDS),
    FunctionalUtility::new("max-h", Sizing, &["max-height"], SPACING, LENGTH)
        .keywords(LIMIT_KEYWORDS),
    FunctionalUtility::new("size", Sizing, &["width", "height"], SPACING, LENGTH)
        .keywords(INSET_KEYWORDS)
        .fractions(),
    FunctionalUtility::new(
        "text",
        Typography,
        &["font-size"],
        Some(TokenCategory::FontSize),
        LENGTH,
    ),
    FunctionalUtility::new("text", Typography, &["color"], COLORS, COLOR),
    FunctionalUtility::new(
        "font",
        Typography,
        &["font-weight"],
        Some(TokenCategory::FontWeight),
        NUMBER,
    ),
    FunctionalUtility::new("leading", Typography, &["line-height"], SPACING, NUMBER_OR_LENGTH)
        .keywords(LEADING_KEYWORDS),
    FunctionalUtility::new("tracking", Typography, &["letter-spacing"], None, LENGTH)
        .keywords(TRACKING_KEYWORDS)
        .negative(),
    FunctionalUtility::new("indent", Typography, &["text-indent"], SPACING, LENGTH).negative(),
    FunctionalUtility::new(
        "decoration",
        Typography,
        &["text-decoration-color"],
        COLORS,
        COLOR,
    ),
    FunctionalUtility::new("bg", Background, &["background-color"], COLORS, COLOR),
    FunctionalUtility::new("bg", Background, &["background-image"], None, IMAGE),
    FunctionalUtility::new(
        "rounded",
        Border,
        &["border-radius"],
        Some(TokenCategory::BorderRadius),
        LENGTH,
    ),
    FunctionalUtility::new(
        "rounded-t",
        Border,
        &["border-top-left-radius", "border-top-right-radius"],
        Some(TokenCategory::BorderRadius),
        LENGTH,
    ),
    FunctionalUtility::new(
        "rounded-r",
        Border,
        &["border-top-right-radius", "border-bottom-right-radius"],
        Some(TokenCategory::BorderRadius),
        LENGTH,
    ),
    FunctionalUtility::new(
        "rounded-b",
        Border,
        &["border-bottom-right-radius", "border-bottom-left-radius"],
        Some(TokenCategory::BorderRadius),
        LENGTH,
    ),
    FunctionalUtility::new(
        "rounded-l",
        Border,
        &["border-top-left-radius", "border-bottom-left-radius"],
        Some(TokenCategory::BorderRadius),
        LENGTH,
    ),
    FunctionalUtility::new("border", Border, &["border-width"], None, LENGTH)
        .keywords(BORDER_WIDTH_KEYWORDS)
        .bare(pixels),
    FunctionalUtility::new("border", Border, &["border-color"], COLORS, COLOR),
    FunctionalUtility::new("border-x", Border, &["border-inline-width"], None, LENGTH)
        .keywords(BORDER_WIDTH_KEYWORDS)
        .bare(pixels),
    FunctionalUtility::new("border-y", Border, &["border-block-width"], None, LENGTH)
        .keywords(BORDER_WIDTH_KEYWORDS)
        .bare(pixels),
    FunctionalUtility::new("border-t", Border, &["border-top-width"], None, LENGTH)
        .keywords(BORDER_WIDTH_KEYWORDS)
        .bare(pixels),
    FunctionalUtility::new("border-r", Border, &["border-right-width"], None, LENGTH)
        .keywords(BORDER_WIDTH_KEYWORDS)
        .bare(pixels),
    FunctionalUtility::new("border-b", Border, &["border-bottom-width"], None, LENGTH)
        .keywords(BORDER_WIDTH_KEYWORDS)
        .bare(pixels),
    FunctionalUtility::new("border-l", Border, &["border-left-width"], None, LENGTH)
        .keywords(BORDER_WIDTH_KEYWORDS)
        .bare(pixels),
    FunctionalUtility::new("outline", Border, &["outline-width"], None, LENGTH)
        .keywords(BORDER_WIDTH_KEYWORDS)
        .bare(pixels),
    FunctionalUtility::new("outline", Border, &["outline-color"], COLORS, COLOR),
    FunctionalUtility::new("outline-offset", Border, &["outline-offset"], None, LENGTH)
        .bare(pixels)
        .negative(),
    FunctionalUtility::new(
        "opacity",
        Effects,
        &["opacity"],
        Some(TokenCategory::Opacity),
        NUMBER,
    ),
    FunctionalUtility::new("fill", Effects, &["fill"], COLORS, COLOR),
    FunctionalUtility::new("stroke", Effects, &["stroke"], COLORS, COLOR),
    FunctionalUtility::new("cursor", Interactivity, &["cursor"], None, ANY)
        .keywords(CURSOR_KEYWORDS),
    FunctionalUtility::new("accent", Interactivity, &["accent-color"], COLORS, COLOR),
    FunctionalUtility::new("caret", Interactivity, &["caret-color"], COLORS, COLOR),
    FunctionalUtility::new("duration", Interactivity, &["transition-duration"], None, ANY)
        .bare(millis),
    FunctionalUtility::new("delay", Interactivity, &["transition-delay"], None, ANY)
        .bare(millis),
];

const EASE_STANDARD: &str = "cubic-bezier(0.4, 0, 0.2, 1)";

static STATIC_UTILITIES: &[StaticUtility] = &[
    s("block", Layout, &[("display", "block")]),
    s("inline-block", Layout, &[("display", "inline-block")]),
    s("inline", Layout, &[("display", "inline")]),
    s("flex", Layout, &[("display", "flex")]),
    s("inline-flex", Layout, &[("display", "inline-flex")]),
    s("grid", Layout, &[("display", "grid")]),
    s("inline-grid", Layout, &[("display", "inline-grid")]),
    s("contents", Layout, &[("display", "contents")]),
    s("flow-root", Layout, &[("display", "flow-root")]),
    s("table", Layout, &[("display", "table")]),
    s("hidden", Layout, &[("display", "none")]),
    s("static", Layout, &[("position", "static")]),
    s("fixed", Layout, &[("position", "fixed")]),
    s("absolute", Layout, &[("position", "absolute")]),
    s("relative", Layout, &[("position", "relative")]),
    s("sticky", Layout, &[("position", "sticky")]),
    s("visible", Layout, &[("visibility", "visible")]),
    s("invisible", Layout, &[("visibility", "hidden")]),
    s("isolate", Layout, &[("isolation", "isolate")]),
    s("box-border", Layout, &[("box-sizing", "border-box")]),
    s("box-content", Layout, &[("box-sizing", "content-box")]),
    s("float-left", Layout, &[("float", "left")]),
    s("float-right", Layout, &[("float", "right")]),
    s("float-none", Layout, &[("float", "none")]),
    s("clear-both", Layout, &[("clear", "both")]),
    s("overflow-auto", Layout, &[("overflow", "auto")]),
    s("overflow-hidden", Layout, &[("overflow", "hidden")]),
    s("overflow-clip", Layout, &[("overflow", "clip")]),
    s("overflow-visible", Layout, &[("overflow", "visible")]),
    s("overflow-scroll", Layout, &[("overflow", "scroll")]),
    s("overflow-x-auto", Layout, &[("overflow-x", "auto")]),
    s("overflow-x-hidden", Layout, &[("overflow-x", "hidden")]),
    s("overflow-x-scroll", Layout, &[("overflow-x", "scroll")]),
    s("overflow-y-auto", Layout, &[("overflow-y", "auto")]),
    s("overflow-y-hidden", Layout, &[("overflow-y", "hidden")]),
    s("overflow-y-scroll", Layout, &[("overflow-y", "scroll")]),
    s("object-contain", Layout, &[("object-fit", "contain")]),
    s("object-cover", Layout, &[("object-fit", "cover")]),
    s("object-fill", Layout, &[("object-fit", "fill")]),
    s("object-none", Layout, &[("object-fit", "none")]),
    s(
        "sr-only",
        Layout,
        &[
            ("position", "absolute"),
            ("width", "1px"),
            ("height", "1px"),
            ("padding", "0"),
            ("margin", "-1px"),
            ("overflow", "hidden"),
            ("clip", "rect(0, 0, 0, 0)"),
            ("white-space", "nowrap"),
            ("border-width", "0"),
        ],
    ),
    s("flex-row", Flexbox, &[("flex-direction", "row")]),
    s("flex-row-reverse", Flexbox, &[("flex-direction", "row-reverse")]),
    s("flex-col", Flexbox, &[("flex-direction", "column")]),
    s("flex-col-reverse", Flexbox, &[("flex-direction", "column-reverse")]),
    s("flex-wrap", Flexbox, &[("flex-wrap", "wrap")]),
    s("flex-wrap-reverse", Flexbox, &[("flex-wrap", "wrap-reverse")]),
    s("flex-nowrap", Flexbox, &[("flex-wrap", "nowrap")]),
    s("flex-1", Flexbox, &[("flex", "1 1 0%")]),
    s("flex-auto", Flexbox, &[("flex", "1 1 auto")]),
    s("flex-initial", Flexbox, &[("flex", "0 1 auto")]),
    s("flex-none", Flexbox, &[("flex", "none")]),
    s("grid-flow-row", Flexbox, &[("grid-auto-flow", "row")]),
    s("grid-flow-col", Flexbox, &[("grid-auto-flow", "column")]),
    s("grid-flow-dense", Flexbox, &[("grid-auto-flow", "dense")]),
    s("items-start", Flexbox, &[("align-items", "flex-start")]),
    s("items-end", Flexbox, &[("align-items", "flex-end")]),
    s("items-center", Flexbox, &[("align-items", "center")]),
    s("items-baseline", Flexbox, &[("align-items", "baseline")]),
    s("items-stretch", Flexbox, &[("align-items", "stretch")]),
    s("justify-start", Flexbox, &[("justify-content", "flex-start")]),
    s("justify-end", Flexbox, &[("justify-content", "flex-end")]),
    s("justify-center", Flexbox, &[("justify-content", "center")]),
    s("justify-between", Flexbox, &[("justify-content", "space-between")]),
    s("justify-around", Flexbox, &[("justify-content", "space-around")]),
    s("justify-evenly", Flexbox, &[("justify-content", "space-evenly")]),
    s("content-start", Flexbox, &[("align-content", "flex-start")]),
    s("content-center", Flexbox, &[("align-content", "center")]),
    s("content-end", Flexbox, &[("align-content", "flex-end")]),
    s("content-between", Flexbox, &[("align-content", "space-between")]),
    s("self-auto", Flexbox, &[("align-self", "auto")]),
    s("self-start", Flexbox, &[("align-self", "flex-start")]),
    s("self-end", Flexbox, &[("align-self", "flex-end")]),
    s("self-center", Flexbox, &[("align-self", "center")]),
    s("self-stretch", Flexbox, &[("align-self", "stretch")]),
    s("place-items-center", Flexbox, &[("place-items", "center")]),
    s("place-content-center", Flexbox, &[("place-content", "center")]),
    s("text-left", Typography, &[("text-align", "left")]),
    s("text-center", Typography, &[("text-align", "center")]),
    s("text-right", Typography, &[("text-align", "right")]),
    s("text-justify", Typography, &[("text-align", "justify")]),
    s("text-start", Typography, &[("text-align", "start")]),
    s("text-end", Typography, &[("text-align", "end")]),
    s("italic", Typography, &[("font-style", "italic")]),
    s("not-italic", Typography, &[("font-style", "normal")]),
    s("uppercase", Typography, &[("text-transform", "uppercase")]),
    s("lowercase", Typography, &[("text-transform", "lowercase")]),
    s("capitalize", Typography, &[("text-transform", "capitalize")]),
    s("normal-case", Typography, &[("text-transform", "none")]),
    s("underline", Typography, &[("text-decoration-line", "underline")]),
    s("overline", Typography, &[("text-decoration-line", "overline")]),
    s("line-through", Typography, &[("text-decoration-line", "line-through")]),
    s("no-underline", Typography, &[("text-decoration-line", "none")]),
    s(
        "truncate",
        Typography,
        &[
            ("overflow", "hidden"),
            ("text-overflow", "ellipsis"),
            ("white-space", "nowrap"),
        ],
    ),
    s("text-ellipsis", Typography, &[("text-overflow", "ellipsis")]),
    s("text-clip", Typography, &[("text-overflow", "clip")]),
    s("whitespace-normal", Typography, &[("white-space", "normal")]),
    s("whitespace-nowrap", Typography, &[("white-space", "nowrap")]),
    s("whitespace-pre", Typography, &[("white-space", "pre")]),
    s("whitespace-pre-line", Typography, &[("white-space", "pre-line")]),
    s("whitespace-pre-wrap", Typography, &[("white-space", "pre-wrap")]),
    s("break-words", Typography, &[("overflow-wrap", "break-word")]),
    s("break-all", Typography, &[("word-break", "break-all")]),
    s(
        "antialiased",
        Typography,
        &[
            ("-webkit-font-smoothing", "antialiased"),
            ("-moz-osx-font-smoothing", "grayscale"),
        ],
    ),
    s(
        "font-sans",
        Typography,
        &[("font-family", "ui-sans-serif, system-ui, sans-serif")],
    ),
    s(
        "font-serif",
        Typography,
        &[("font-family", "ui-serif, Georgia, Cambria, serif")],
    ),
    s(
        "font-mono",
        Typography,
        &[("font-family", "ui-monospace, SFMono-Regular, Menlo, monospace")],
    ),
    s("list-none", Typography, &[("list-style-type", "none")]),
    s("list-disc", Typography, &[("list-style-type", "disc")]),
    s("list-decimal", Typography, &[("list-style-type", "decimal")]),
    s("text-inherit", Typography, &[("color", "inherit")]),
    c("text-current", Typography, &[("color", "currentColor")]),
    c("text-transparent", Typography, &[("color", "transparent")]),
    s("bg-inherit", Background, &[("background-color", "inherit")]),
    c("bg-current", Background, &[("background-color", "currentColor")]),
    c("bg-transparent", Background, &[("background-color", "transparent")]),
    s("bg-fixed", Background, &[("background-attachment", "fixed")]),
    s("bg-cover", Background, &[("background-size", "cover")]),
    s("bg-contain", Background, &[("background-size", "contain")]),
    s("bg-center", Background, &[("background-position", "center")]),
    s("bg-no-repeat", Background, &[("background-repeat", "no-repeat")]),
    s("border-inherit", Border, &[("border-color", "inherit")]),
    c("border-current", Border, &[("border-color", "currentColor")]),
    c("border-transparent", Border, &[("border-color", "transparent")]),
    s("border-solid", Border, &[("border-style", "solid")]),
    s("border-dashed", Border, &[("border-style", "dashed")]),
    s("border-dotted", Border, &[("border-style", "dotted")]),
    s("border-double", Border, &[("border-style", "double")]),
    s("border-none", Border, &[("border-style", "none")]),
    s("outline-none", Border, &[("outline", "2px solid transparent"), ("outline-offset", "2px")]),
    s("shadow-sm", Effects, &[("box-shadow", "0 1px 2px 0 rgb(0 0 0 / 0.05)")]),
    s(
        "shadow",
        Effects,
        &[(
            "box-shadow",
            "0 1px 3px 0 rgb(0 0 0 / 0.1), 0 1px 2px -1px rgb(0 0 0 / 0.1)",
        )],
    ),
    s(
        "shadow-md",
        Effects,
        &[(
            "box-shadow",
            "0 4px 6px -1px rgb(0 0 0 / 0.1), 0 2px 4px -2px rgb(0 0 0 / 0.1)",
        )],
    ),
    s(
        "shadow-lg",
        Effects,
        &[(
            "box-shadow",
            "0 10px 15px -3px rgb(0 0 0 / 0.1), 0 4px 6px -4px rgb(0 0 0 / 0.1)",
        )],
    ),
    s(
        "shadow-xl",
        Effects,
        &[(
            "box-shadow",
            "0 20px 25px -5px rgb(0 0 0 / 0.1), 0 8px 10px -6px rgb(0 0 0 / 0.1)",
        )],
    ),
    s("shadow-none", Effects, &[("box-shadow", "0 0 #0000")]),
    s("select-none", Interactivity, &[("user-select", "none")]),
    s("select-text", Interactivity, &[("user-select", "text")]),
    s("select-all", Interactivity, &[("user-select", "all")]),
    s("select-auto", Interactivity, &[("user-select", "auto")]),
    s("pointer-events-none", Interactivity, &[("pointer-events", "none")]),
    s("pointer-events-auto", Interactivity, &[("pointer-events", "auto")]),
    s("resize-none", Interactivity, &[("resize", "none")]),
    s("resize", Interactivity, &[("resize", "both")]),
    s("appearance-none", Interactivity, &[("appearance", "none")]),
    s(
        "transition",
        Interactivity,
        &[
            (
                "transition-property",
                "color, background-color, border-color, text-decoration-color, fill, stroke, opacity, box-shadow, transform, filter",
            ),
            ("transition-timing-function", EASE_STANDARD),
            ("transition-duration", "150ms"),
        ],
    ),
    s(
        "transition-colors",
        Interactivity,
        &[
            (
                "transition-property",
                "color, background-color, border-color, text-decoration-color, fill, stroke",
            ),
            ("transition-timing-function", EASE_STANDARD),
            ("transition-duration", "150ms"),
        ],
    ),
    s("transition-none", Interactivity, &[("transition-property", "none")]),
    s("ease-linear", Interactivity, &[("transition-timing-function", "linear")]),
    s(
        "ease-in",
        Interactivity,
        &[("transition-timing-function", "cubic-bezier(0.4, 0, 1, 1)")],
    ),
    s(
        "ease-out",
        Interactivity,
        &[("transition-timing-function", "cubic-bezier(0, 0, 0.2, 1)")],
    ),
    s("ease-in-out", Interactivity, &[("transition-timing-function", EASE_STANDARD)]),
];

#[cfg(test)]
mod tests {
    use super::{RuleTemplate, UtilityCategory, UtilityRegistry};
    use crate::candidate::{ParsedCandidate, UtilityRef};
    use crate::rule::Declaration;
    use crate::theme::{ThemeExtension, ThemeResolver, ThemeSpec, TokenCategory};
    use emberwind_core::DropReason;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    fn registry() -> UtilityRegistry {
        let table = ThemeResolver::resolve(&ThemeSpec::builtin(), &ThemeExtension::default())
            .expect("builtin theme");
        UtilityRegistry::new(Arc::new(table))
    }

    fn resolve(registry: &UtilityRegistry, raw: &str) -> Result<RuleTemplate, DropReason> {
        let candidate = ParsedCandidate::parse(raw).expect("candidate should parse");
        registry.resolve(&candidate)
    }

    fn declarations(registry: &UtilityRegistry, raw: &str) -> Vec<(String, String)> {
        resolve(registry, raw)
            .unwrap_or_else(|reason| panic!("{} should resolve: {}", raw, reason))
            .declarations
            .into_iter()
            .map(|decl| (decl.property, decl.value))
            .collect()
    }

    fn pair(property: &str, value: &str) -> (String, String) {
        (property.to_string(), value.to_string())
    }

    #[test]
    fn resolves_theme_backed_utilities() {
        let registry = registry();
        assert_eq!(declarations(&registry, "p-4"), vec![pair("padding", "1rem")]);
        assert_eq!(declarations(&registry, "px-2"), vec![pair("padding-inline", "0.5rem")]);
        assert_eq!(
            declarations(&registry, "bg-red-500"),
            vec![pair("background-color", "#ef4444")]
        );
        assert_eq!(declarations(&registry, "z-10"), vec![pair("z-index", "10")]);
        assert_eq!(declarations(&registry, "rounded"), vec![pair("border-radius", "0.25rem")]);
        assert_eq!(
            declarations(&registry, "rounded-t-lg"),
            vec![
                pair("border-top-left-radius", "0.5rem"),
                pair("border-top-right-radius", "0.5rem"),
            ]
        );
    }

    #[test]
    fn shared_roots_try_each_value_type() {
        let registry = registry();
        assert_eq!(declarations(&registry, "text-sm"), vec![pair("font-size", "0.875rem")]);
        assert_eq!(declarations(&registry, "text-blue-600"), vec![pair("color", "#2563eb")]);
        assert_eq!(declarations(&registry, "border"), vec![pair("border-width", "1px")]);
        assert_eq!(declarations(&registry, "border-2"), vec![pair("border-width", "2px")]);
        assert_eq!(
            declarations(&registry, "border-gray-200"),
            vec![pair("border-color", "#e5e7eb")]
        );
    }

    #[test]
    fn static_utilities_win() {
        let registry = registry();
        assert_eq!(
            declarations(&registry, "text-transparent"),
            vec![pair("color", "transparent")]
        );
        assert_eq!(declarations(&registry, "flex"), vec![pair("display", "flex")]);
        assert_eq!(declarations(&registry, "flex-1"), vec![pair("flex", "1 1 0%")]);
        assert_eq!(
            resolve(&registry, "hidden").map(|t| t.category),
            Ok(UtilityCategory::Layout)
        );
    }

    #[test]
    fn keywords_and_fractions() {
        let registry = registry();
        assert_eq!(declarations(&registry, "w-full"), vec![pair("width", "100%")]);
        assert_eq!(declarations(&registry, "m-auto"), vec![pair("margin", "auto")]);
        assert_eq!(declarations(&registry, "w-1/2"), vec![pair("width", "50%")]);
        assert_eq!(declarations(&registry, "h-1/3"), vec![pair("height", "33.333333%")]);
        assert_eq!(
            declarations(&registry, "grid-cols-3"),
            vec![pair("grid-template-columns", "repeat(3, minmax(0, 1fr))")]
        );
        assert_eq!(declarations(&registry, "duration-300"), vec![pair("transition-duration", "300ms")]);
    }

    #[test]
    fn negative_values() {
        let registry = registry();
        assert_eq!(declarations(&registry, "-mt-2"), vec![pair("margin-top", "-0.5rem")]);
        assert_eq!(declarations(&registry, "-m-0"), vec![pair("margin", "0px")]);
        assert_eq!(declarations(&registry, "-z-10"), vec![pair("z-index", "-10")]);
        assert_eq!(
            declarations(&registry, "-m-[var(--gap)]"),
            vec![pair("margin", "calc(var(--gap) * -1)")]
        );
        assert_eq!(resolve(&registry, "-p-4"), Err(DropReason::NegativeNotSupported));
        assert_eq!(resolve(&registry, "-flex"), Err(DropReason::NegativeNotSupported));
    }

    #[test]
    fn arbitrary_values_are_checked_against_the_value_type() {
        let registry = registry();
        assert_eq!(declarations(&registry, "w-[37px]"), vec![pair("width", "37px")]);
        assert_eq!(
            declarations(&registry, "w-[calc(100%_-_2rem)]"),
            vec![pair("width", "calc(100% - 2rem)")]
        );
        assert_eq!(declarations(&registry, "text-[#123456]"), vec![pair("color", "#123456")]);
        assert_eq!(declarations(&registry, "text-[13px]"), vec![pair("font-size", "13px")]);
        assert_eq!(
            declarations(&registry, "text-[color:var(--brand)]"),
            vec![pair("color", "var(--brand)")]
        );
        assert_eq!(
            declarations(&registry, "bg-[url(/img/a_b.png)]"),
            vec![pair("background-image", "url(/img/a_b.png)")]
        );
        assert_eq!(
            resolve(&registry, "w-[banana]"),
            Err(DropReason::InvalidArbitraryValue("banana".to_string()))
        );
        assert_eq!(
            resolve(&registry, "p-[1px;color:red]"),
            Err(DropReason::InvalidArbitraryValue("1px;color:red".to_string()))
        );
        assert_eq!(resolve(&registry, "wiggle-[3px]"), Err(DropReason::UnknownUtility));
    }

    #[test]
    fn arbitrary_properties() {
        let registry = registry();
        assert_eq!(
            declarations(&registry, "[mask-type:luminance]"),
            vec![pair("mask-type", "luminance")]
        );
        assert_eq!(
            declarations(&registry, "[--gutter:2_rem]"),
            vec![pair("--gutter", "2 rem")]
        );
        assert_eq!(resolve(&registry, "[Bad:1]"), Err(DropReason::UnknownUtility));
    }

    #[test]
    fn black_and_white_follow_the_theme() {
        let extended = ThemeExtension {
            extend: ThemeSpec::new().with(TokenCategory::Colors, "white", "#fafafa"),
            ..ThemeExtension::default()
        };
        let table =
            ThemeResolver::resolve(&ThemeSpec::builtin(), &extended).expect("valid theme");
        let registry = UtilityRegistry::new(Arc::new(table));
        assert_eq!(declarations(&registry, "text-white"), vec![pair("color", "#fafafa")]);
        assert_eq!(declarations(&registry, "fill-white"), vec![pair("fill", "#fafafa")]);
        assert_eq!(
            declarations(&registry, "border-black"),
            vec![pair("border-color", "#000")]
        );

        let spacing_only = ThemeSpec::new().with(TokenCategory::Spacing, "4", "1rem");
        let table = ThemeResolver::resolve(&spacing_only, &ThemeExtension::default())
            .expect("valid theme");
        let registry = UtilityRegistry::new(Arc::new(table));
        assert_eq!(declarations(&registry, "text-white"), vec![pair("color", "white")]);
        assert_eq!(
            declarations(&registry, "bg-black/50"),
            vec![pair(
                "background-color",
                "color-mix(in oklab, black 50%, transparent)"
            )]
        );
        assert_eq!(
            resolve(&registry, "text-gray-500"),
            Err(DropReason::UnknownUtility)
        );
    }

    #[test]
    fn opacity_modifiers_mix_colors() {
        let registry = registry();
        assert_eq!(
            declarations(&registry, "bg-red-500/50"),
            vec![pair(
                "background-color",
                "color-mix(in oklab, #ef4444 50%, transparent)"
            )]
        );
        assert_eq!(
            declarations(&registry, "bg-black/[12.5%]"),
            vec![pair(
                "background-color",
                "color-mix(in oklab, #000 12.5%, transparent)"
            )]
        );
        assert_eq!(
            resolve(&registry, "p-4/50"),
            Err(DropReason::InvalidModifier("50".to_string()))
        );
        assert_eq!(
            resolve(&registry, "bg-red-500/150"),
            Err(DropReason::InvalidModifier("150".to_string()))
        );
    }

    #[test]
    fn unknown_names_are_reported_as_such() {
        let registry = registry();
        assert_eq!(resolve(&registry, "not-a-real-utility"), Err(DropReason::UnknownUtility));
        assert_eq!(resolve(&registry, "p-banana"), Err(DropReason::UnknownUtility));
        assert_eq!(resolve(&registry, "rounded-DEFAULT"), Err(DropReason::UnknownUtility));
    }

    #[test]
    fn lookup_ignores_flags() {
        let registry = registry();
        let template = registry
            .lookup(&UtilityRef::Static("m-2".to_string()))
            .expect("m-2 exists");
        assert_eq!(template.declarations, vec![Declaration::new("margin", "0.5rem")]);
        assert!(registry.lookup(&UtilityRef::Static("nope".to_string())).is_none());
    }

    #[test]
    fn inverse_query_lists_utilities_reading_a_token() {
        let registry = registry();
        let names = registry.utilities_for_token(TokenCategory::Spacing, "4");
        for expected in ["p-4", "px-4", "m-4", "-m-4", "w-4", "gap-4", "leading-4", "-top-4"] {
            assert!(names.contains(&expected.to_string()), "missing {}", expected);
        }
        assert!(!names.contains(&"-p-4".to_string()));

        let names = registry.utilities_for_token(TokenCategory::BorderRadius, "DEFAULT");
        assert!(names.contains(&"rounded".to_string()));
        assert!(names.contains(&"rounded-t".to_string()));

        assert!(registry.utilities_for_token(TokenCategory::Spacing, "missing").is_empty());
    }
}
