//! Theme tokens, validation and merging.
//!
//! A [`ThemeSpec`] is what configuration provides: loosely shaped token maps
//! per category. [`ThemeResolver::resolve`] validates every token against its
//! category's [`ValueKind`] and produces the immutable [`ThemeTable`] that the
//! registry and variant resolver read from.

use crate::config::ConfigError;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TokenCategory {
    Spacing,
    Colors,
    Screens,
    FontSize,
    FontWeight,
    BorderRadius,
    Opacity,
    ZIndex,
}

impl TokenCategory {
    pub const ALL: [TokenCategory; 8] = [
        TokenCategory::Spacing,
        TokenCategory::Colors,
        TokenCategory::Screens,
        TokenCategory::FontSize,
        TokenCategory::FontWeight,
        TokenCategory::BorderRadius,
        TokenCategory::Opacity,
        TokenCategory::ZIndex,
    ];

    pub fn value_kind(self) -> ValueKind {
        match self {
            Self::Colors => ValueKind::Color,
            Self::FontWeight | Self::Opacity | Self::ZIndex => ValueKind::Number,
            Self::Spacing | Self::Screens | Self::FontSize | Self::BorderRadius => {
                ValueKind::Length
            }
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Spacing => "spacing",
            Self::Colors => "colors",
            Self::Screens => "screens",
            Self::FontSize => "font-size",
            Self::FontWeight => "font-weight",
            Self::BorderRadius => "border-radius",
            Self::Opacity => "opacity",
            Self::ZIndex => "z-index",
        }
    }
}

impl fmt::Display for TokenCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The value grammar a token or arbitrary value must satisfy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    Length,
    Color,
    Number,
}

impl ValueKind {
    pub fn accepts(self, value: &str) -> bool {
        let value = value.trim();
        if value.is_empty() {
            return false;
        }
        match self {
            Self::Length => is_length(value),
            Self::Color => is_color(value),
            Self::Number => is_number(value),
        }
    }

    pub fn from_hint(hint: &str) -> Option<Self> {
        match hint {
            "length" | "size" | "percentage" => Some(Self::Length),
            "color" => Some(Self::Color),
            "number" | "integer" => Some(Self::Number),
            _ => None,
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Length => "length",
            Self::Color => "color",
            Self::Number => "number",
        })
    }
}

/// One configured token value. Nested maps flatten into `parent-child`
/// names; a `DEFAULT` child takes the parent's name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TokenInput {
    Text(String),
    Integer(i64),
    Float(f64),
    Nested(BTreeMap<String, TokenInput>),
}

impl From<&str> for TokenInput {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for TokenInput {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// Token maps keyed by category, as written in configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ThemeSpec {
    categories: BTreeMap<TokenCategory, BTreeMap<String, TokenInput>>,
}

impl ThemeSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(
        mut self,
        category: TokenCategory,
        name: impl Into<String>,
        value: impl Into<TokenInput>,
    ) -> Self {
        self.insert(category, name, value);
        self
    }

    pub fn insert(
        &mut self,
        category: TokenCategory,
        name: impl Into<String>,
        value: impl Into<TokenInput>,
    ) {
        self.categories
            .entry(category)
            .or_default()
            .insert(name.into(), value.into());
    }

    pub fn contains_category(&self, category: TokenCategory) -> bool {
        self.categories.contains_key(&category)
    }

    pub fn is_empty(&self) -> bool {
        self.categories.values().all(BTreeMap::is_empty)
    }

    /// The default base theme used when configuration does not provide one.
    pub fn builtin() -> Self {
        let mut spec = Self::new();

        spec.insert(TokenCategory::Spacing, "px", "1px");
        spec.insert(TokenCategory::Spacing, "0", "0px");
        for step in SPACING_STEPS {
            let rem = step.parse::<f64>().unwrap_or_default() * 0.25;
            spec.insert(TokenCategory::Spacing, step, format!("{}rem", rem));
        }

        spec.insert(TokenCategory::Colors, "black", "#000");
        spec.insert(TokenCategory::Colors, "white", "#fff");
        for (family, shades) in PALETTE {
            for (shade, hex) in SHADES.iter().zip(shades.iter()) {
                spec.insert(TokenCategory::Colors, format!("{}-{}", family, shade), *hex);
            }
        }

        for (category, entries) in [
            (TokenCategory::Screens, SCREENS),
            (TokenCategory::FontSize, FONT_SIZES),
            (TokenCategory::FontWeight, FONT_WEIGHTS),
            (TokenCategory::BorderRadius, RADII),
            (TokenCategory::ZIndex, Z_INDEX),
        ] {
            for (name, value) in entries {
                spec.insert(category, *name, *value);
            }
        }

        for step in OPACITY_STEPS {
            let value = format!("{}", f64::from(*step) / 100.0);
            spec.insert(TokenCategory::Opacity, step.to_string(), value);
        }

        spec
    }

    fn flattened(&self, category: TokenCategory) -> Vec<(String, String)> {
        let mut out = Vec::new();
        if let Some(entries) = self.categories.get(&category) {
            for (name, input) in entries {
                flatten_into(name, input, &mut out);
            }
        }
        out
    }
}

fn flatten_into(name: &str, input: &TokenInput, out: &mut Vec<(String, String)>) {
    match input {
        TokenInput::Text(value) => out.push((name.to_string(), value.clone())),
        TokenInput::Integer(value) => out.push((name.to_string(), value.to_string())),
        TokenInput::Float(value) => out.push((name.to_string(), value.to_string())),
        TokenInput::Nested(children) => {
            for (child, value) in children {
                let joined = if child == "DEFAULT" {
                    name.to_string()
                } else {
                    format!("{}-{}", name, child)
                };
                flatten_into(&joined, value, out);
            }
        }
    }
}

/// User overrides on top of a base theme.
///
/// `extend` overlays entries key by key. `replace` is the escape hatch: a
/// category named there discards the base category entirely before `extend`
/// is applied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeExtension {
    pub extend: ThemeSpec,
    pub replace: ThemeSpec,
}

/// Validated, immutable design tokens.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeTable {
    entries: BTreeMap<TokenCategory, BTreeMap<String, String>>,
}

impl ThemeTable {
    pub fn get(&self, category: TokenCategory, name: &str) -> Option<&str> {
        self.entries
            .get(&category)
            .and_then(|entries| entries.get(name))
            .map(String::as_str)
    }

    pub fn contains(&self, category: TokenCategory, name: &str) -> bool {
        self.get(category, name).is_some()
    }

    pub fn tokens(&self, category: TokenCategory) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .get(&category)
            .into_iter()
            .flat_map(|entries| entries.iter())
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Screens ordered from narrowest to widest. Values in different units
    /// are compared after converting `rem`/`em` at 16px; values with no px
    /// equivalent come last, in string order.
    pub fn screens_by_width(&self) -> Vec<(String, String)> {
        let mut screens: Vec<(Option<f64>, String, String)> = self
            .tokens(TokenCategory::Screens)
            .map(|(name, value)| (length_in_px(value), name.to_string(), value.to_string()))
            .collect();
        screens.sort_by(|a, b| {
            match (a.0, b.0) {
                (Some(left), Some(right)) => left.total_cmp(&right),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            }
            .then_with(|| a.2.cmp(&b.2))
            .then_with(|| a.1.cmp(&b.1))
        });
        screens
            .into_iter()
            .map(|(_, name, value)| (name, value))
            .collect()
    }
}

pub struct ThemeResolver;

impl ThemeResolver {
    pub fn resolve(base: &ThemeSpec, extension: &ThemeExtension) -> Result<ThemeTable, ConfigError> {
        let mut table = ThemeTable::default();

        for category in TokenCategory::ALL {
            let source = if extension.replace.contains_category(category) {
                &extension.replace
            } else {
                base
            };
            for (name, value) in source.flattened(category) {
                insert_validated(&mut table, category, name, value)?;
            }
            for (name, value) in extension.extend.flattened(category) {
                insert_validated(&mut table, category, name, value)?;
            }
        }

        Ok(table)
    }
}

fn insert_validated(
    table: &mut ThemeTable,
    category: TokenCategory,
    name: String,
    value: String,
) -> Result<(), ConfigError> {
    if name.trim().is_empty() {
        return Err(ConfigError::EmptyTokenName(category));
    }
    let kind = category.value_kind();
    if !kind.accepts(&value) {
        return Err(ConfigError::InvalidToken {
            category,
            token: name,
            value,
            kind,
        });
    }
    table
        .entries
        .entry(category)
        .or_default()
        .insert(name, value.trim().to_string());
    Ok(())
}

const LENGTH_UNITS: [&str; 30] = [
    "px", "rem", "em", "%", "vh", "vw", "vmin", "vmax", "svh", "lvh", "dvh", "svw", "lvw", "dvw",
    "ch", "ex", "lh", "rlh", "cm", "mm", "in", "pt", "pc", "q", "cqw", "cqh", "cqi", "cqb",
    "cqmin", "cqmax",
];

const MATH_FUNCTIONS: [&str; 6] = ["calc(", "var(", "min(", "max(", "clamp(", "env("];

const COLOR_FUNCTIONS: [&str; 12] = [
    "rgb(", "rgba(", "hsl(", "hsla(", "hwb(", "lab(", "lch(", "oklab(", "oklch(", "color(",
    "color-mix(", "var(",
];

const COLOR_KEYWORDS: [&str; 4] = ["transparent", "currentcolor", "inherit", "initial"];

const NAMED_COLORS: [&str; 148] = [
    "aliceblue", "antiquewhite", "aqua", "aquamarine", "azure", "beige", "bisque", "black",
    "blanchedalmond", "blue", "blueviolet", "brown", "burlywood", "cadetblue", "chartreuse",
    "chocolate", "coral", "cornflowerblue", "cornsilk", "crimson", "cyan", "darkblue", "darkcyan",
    "darkgoldenrod", "darkgray", "darkgreen", "darkgrey", "darkkhaki", "darkmagenta",
    "darkolivegreen", "darkorange", "darkorchid", "darkred", "darksalmon", "darkseagreen",
    "darkslateblue", "darkslategray", "darkslategrey", "darkturquoise", "darkviolet", "deeppink",
    "deepskyblue", "dimgray", "dimgrey", "dodgerblue", "firebrick", "floralwhite", "forestgreen",
    "fuchsia", "gainsboro", "ghostwhite", "gold", "goldenrod", "gray", "green", "greenyellow",
    "grey", "honeydew", "hotpink", "indianred", "indigo", "ivory", "khaki", "lavender",
    "lavenderblush", "lawngreen", "lemonchiffon", "lightblue", "lightcoral", "lightcyan",
    "lightgoldenrodyellow", "lightgray", "lightgreen", "lightgrey", "lightpink", "lightsalmon",
    "lightseagreen", "lightskyblue", "lightslategray", "lightslategrey", "lightsteelblue",
    "lightyellow", "lime", "limegreen", "linen", "magenta", "maroon", "mediumaquamarine",
    "mediumblue", "mediumorchid", "mediumpurple", "mediumseagreen", "mediumslateblue",
    "mediumspringgreen", "mediumturquoise", "mediumvioletred", "midnightblue", "mintcream",
    "mistyrose", "moccasin", "navajowhite", "navy", "oldlace", "olive", "olivedrab", "orange",
    "orangered", "orchid", "palegoldenrod", "palegreen", "paleturquoise", "palevioletred",
    "papayawhip", "peachpuff", "peru", "pink", "plum", "powderblue", "purple", "rebeccapurple",
    "red", "rosybrown", "royalblue", "saddlebrown", "salmon", "sandybrown", "seagreen", "seashell",
    "sienna", "silver", "skyblue", "slateblue", "slategray", "slategrey", "snow", "springgreen",
    "steelblue", "tan", "teal", "thistle", "tomato", "turquoise", "violet", "wheat", "white",
    "whitesmoke", "yellow", "yellowgreen",
];

pub(crate) fn is_color(value: &str) -> bool {
    let lower = value.to_ascii_lowercase();
    if let Some(hex) = lower.strip_prefix('#') {
        return matches!(hex.len(), 3 | 4 | 6 | 8) && hex.chars().all(|c| c.is_ascii_hexdigit());
    }
    if COLOR_FUNCTIONS.iter().any(|f| lower.starts_with(f)) {
        return has_balanced_parens(&lower) && lower.ends_with(')');
    }
    COLOR_KEYWORDS.contains(&lower.as_str()) || NAMED_COLORS.contains(&lower.as_str())
}

pub(crate) fn is_length(value: &str) -> bool {
    if value == "0" {
        return true;
    }
    let lower = value.to_ascii_lowercase();
    if MATH_FUNCTIONS.iter().any(|f| lower.starts_with(f)) {
        return has_balanced_parens(&lower) && lower.ends_with(')');
    }
    let Some((number, unit)) = split_number_unit(&lower) else {
        return false;
    };
    number.parse::<f64>().is_ok_and(f64::is_finite) && LENGTH_UNITS.contains(&unit)
}

pub(crate) fn is_number(value: &str) -> bool {
    if let Some(percent) = value.strip_suffix('%') {
        return percent.parse::<f64>().is_ok_and(f64::is_finite);
    }
    if value.starts_with("calc(") || value.starts_with("var(") {
        return has_balanced_parens(value) && value.ends_with(')');
    }
    value.parse::<f64>().is_ok_and(f64::is_finite)
}

fn split_number_unit(value: &str) -> Option<(&str, &str)> {
    let split_idx = value
        .char_indices()
        .find(|(_, ch)| !(ch.is_ascii_digit() || matches!(ch, '.' | '-' | '+')))
        .map(|(idx, _)| idx)?;
    if split_idx == 0 {
        return None;
    }
    Some((&value[..split_idx], &value[split_idx..]))
}

fn length_in_px(value: &str) -> Option<f64> {
    let (number, unit) = split_number_unit(value.trim())?;
    let number = number.parse::<f64>().ok()?;
    match unit {
        "px" => Some(number),
        "rem" | "em" => Some(number * 16.0),
        _ => None,
    }
}

fn has_balanced_parens(value: &str) -> bool {
    let mut depth = 0i32;
    for ch in value.chars() {
        match ch {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth < 0 {
                    return false;
                }
            }
            _ => {}
        }
    }
    depth == 0
}

const SPACING_STEPS: [&str; 34] = [
    "0.5", "1", "1.5", "2", "2.5", "3", "3.5", "4", "5", "6", "7", "8", "9", "10", "11", "12",
    "14", "16", "20", "24", "28", "32", "36", "40", "44", "48", "52", "56", "60", "64", "72", "80",
    "96", "128",
];

const SHADES: [&str; 11] = [
    "50", "100", "200", "300", "400", "500", "600", "700", "800", "900", "950",
];

const PALETTE: [(&str, [&str; 11]); 10] = [
    (
        "slate",
        [
            "#f8fafc", "#f1f5f9", "#e2e8f0", "#cbd5e1", "#94a3b8", "#64748b", "#475569", "#334155",
            "#1e293b", "#0f172a", "#020617",
        ],
    ),
    (
        "gray",
        [
            "#f9fafb", "#f3f4f6", "#e5e7eb", "#d1d5db", "#9ca3af", "#6b7280", "#4b5563", "#374151",
            "#1f2937", "#111827", "#030712",
        ],
    ),
    (
        "red",
        [
            "#fef2f2", "#fee2e2", "#fecaca", "#fca5a5", "#f87171", "#ef4444", "#dc2626", "#b91c1c",
            "#991b1b", "#7f1d1d", "#450a0a",
        ],
    ),
    (
        "orange",
        [
            "#fff7ed", "#ffedd5", "#fed7aa", "#fdba74", "#fb923c", "#f97316", "#ea580c", "#c2410c",
            "#9a3412", "#7c2d12", "#431407",
        ],
    ),
    (
        "yellow",
        [
            "#fefce8", "#fef9c3", "#fef08a", "#fde047", "#facc15", "#eab308", "#ca8a04", "#a16207",
            "#854d0e", "#713f12", "#422006",
        ],
    ),
    (
        "green",
        [
            "#f0fdf4", "#dcfce7", "#bbf7d0", "#86efac", "#4ade80", "#22c55e", "#16a34a", "#15803d",
            "#166534", "#14532d", "#052e16",
        ],
    ),
    (
        "blue",
        [
            "#eff6ff", "#dbeafe", "#bfdbfe", "#93c5fd", "#60a5fa", "#3b82f6", "#2563eb", "#1d4ed8",
            "#1e40af", "#1e3a8a", "#172554",
        ],
    ),
    (
        "indigo",
        [
            "#eef2ff", "#e0e7ff", "#c7d2fe", "#a5b4fc", "#818cf8", "#6366f1", "#4f46e5", "#4338ca",
            "#3730a3", "#312e81", "#1e1b4b",
        ],
    ),
    (
        "purple",
        [
            "#faf5ff", "#f3e8ff", "#e9d5ff", "#d8b4fe", "#c084fc", "#a855f7", "#9333ea", "#7e22ce",
            "#6b21a8", "#581c87", "#3b0764",
        ],
    ),
    (
        "pink",
        [
            "#fdf2f8", "#fce7f3", "#fbcfe8", "#f9a8d4", "#f472b6", "#ec4899", "#db2777", "#be185d",
            "#9d174d", "#831843", "#500724",
        ],
    ),
];

const SCREENS: &[(&str, &str)] = &[
    ("sm", "40rem"),
    ("md", "48rem"),
    ("lg", "64rem"),
    ("xl", "80rem"),
    ("2xl", "96rem"),
];

const FONT_SIZES: &[(&str, &str)] = &[
    ("xs", "0.75rem"),
    ("sm", "0.875rem"),
    ("base", "1rem"),
    ("lg", "1.125rem"),
    ("xl", "1.25rem"),
    ("2xl", "1.5rem"),
    ("3xl", "1.875rem"),
    ("4xl", "2.25rem"),
    ("5xl", "3rem"),
    ("6xl", "3.75rem"),
];

const FONT_WEIGHTS: &[(&str, &str)] = &[
    ("thin", "100"),
    ("extralight", "200"),
    ("light", "300"),
    ("normal", "400"),
    ("medium", "500"),
    ("semibold", "600"),
    ("bold", "700"),
    ("extrabold", "800"),
    ("black", "900"),
];

const RADII: &[(&str, &str)] = &[
    ("none", "0px"),
    ("sm", "0.125rem"),
    ("DEFAULT", "0.25rem"),
    ("md", "0.375rem"),
    ("lg", "0.5rem"),
    ("xl", "0.75rem"),
    ("2xl", "1rem"),
    ("3xl", "1.5rem"),
    ("full", "9999px"),
];

const Z_INDEX: &[(&str, &str)] = &[
    ("0", "0"),
    ("10", "10"),
    ("20", "20"),
    ("30", "30"),
    ("40", "40"),
    ("50", "50"),
];

const OPACITY_STEPS: &[u8] = &[0, 5, 10, 20, 25, 30, 40, 50, 60, 70, 75, 80, 90, 95, 100];

#[cfg(test)]
mod tests {
    use super::{ThemeExtension, ThemeResolver, ThemeSpec, TokenCategory, ValueKind};
    use crate::config::ConfigError;
    use std::collections::BTreeMap;

    fn spacing_base() -> ThemeSpec {
        ThemeSpec::new()
            .with(TokenCategory::Spacing, "1", "0.25rem")
            .with(TokenCategory::Spacing, "2", "0.5rem")
            .with(TokenCategory::Spacing, "4", "1rem")
            .with(TokenCategory::Colors, "red-500", "#ef4444")
    }

    #[test]
    fn extension_overrides_single_token_and_keeps_the_rest() {
        let extension = ThemeExtension {
            extend: ThemeSpec::new().with(TokenCategory::Spacing, "4", "1.125rem"),
            ..ThemeExtension::default()
        };
        let table = ThemeResolver::resolve(&spacing_base(), &extension).expect("valid theme");

        assert_eq!(table.get(TokenCategory::Spacing, "4"), Some("1.125rem"));
        assert_eq!(table.get(TokenCategory::Spacing, "1"), Some("0.25rem"));
        assert_eq!(table.get(TokenCategory::Spacing, "2"), Some("0.5rem"));
        assert_eq!(table.get(TokenCategory::Colors, "red-500"), Some("#ef4444"));
        assert_eq!(table.tokens(TokenCategory::Spacing).count(), 3);
    }

    #[test]
    fn replace_swaps_a_whole_category() {
        let extension = ThemeExtension {
            replace: ThemeSpec::new().with(TokenCategory::Spacing, "gutter", "2rem"),
            extend: ThemeSpec::new().with(TokenCategory::Spacing, "edge", "3rem"),
        };
        let table = ThemeResolver::resolve(&spacing_base(), &extension).expect("valid theme");

        let spacing: Vec<_> = table.tokens(TokenCategory::Spacing).collect();
        assert_eq!(spacing, vec![("edge", "3rem"), ("gutter", "2rem")]);
        assert!(table.contains(TokenCategory::Colors, "red-500"));
    }

    #[test]
    fn nested_colors_flatten_with_default() {
        let mut shades = BTreeMap::new();
        shades.insert("DEFAULT".to_string(), "#123456".into());
        shades.insert("light".to_string(), "#abcdef".into());
        let base = ThemeSpec::new().with(
            TokenCategory::Colors,
            "brand",
            super::TokenInput::Nested(shades),
        );
        let table = ThemeResolver::resolve(&base, &ThemeExtension::default()).expect("valid");

        assert_eq!(table.get(TokenCategory::Colors, "brand"), Some("#123456"));
        assert_eq!(table.get(TokenCategory::Colors, "brand-light"), Some("#abcdef"));
    }

    #[test]
    fn rejects_malformed_tokens() {
        let base = ThemeSpec::new().with(TokenCategory::Colors, "brand", "not-a-color");
        let err = ThemeResolver::resolve(&base, &ThemeExtension::default())
            .expect_err("bad color should fail");
        assert!(matches!(
            err,
            ConfigError::InvalidToken {
                category: TokenCategory::Colors,
                ..
            }
        ));

        let base = ThemeSpec::new().with(TokenCategory::Spacing, "4", "wide");
        assert!(ThemeResolver::resolve(&base, &ThemeExtension::default()).is_err());

        let base = ThemeSpec::new().with(TokenCategory::Spacing, " ", "1rem");
        assert!(matches!(
            ThemeResolver::resolve(&base, &ThemeExtension::default()),
            Err(ConfigError::EmptyTokenName(TokenCategory::Spacing))
        ));
    }

    #[test]
    fn extension_values_are_validated_too() {
        let extension = ThemeExtension {
            extend: ThemeSpec::new().with(TokenCategory::Opacity, "half", "lots"),
            ..ThemeExtension::default()
        };
        assert!(ThemeResolver::resolve(&spacing_base(), &extension).is_err());
    }

    #[test]
    fn value_kinds_accept_expected_shapes() {
        for color in ["#fff", "#ffffff80", "rgb(0 0 0 / 50%)", "oklch(0.7 0.1 200)", "white"] {
            assert!(ValueKind::Color.accepts(color), "{} should be a color", color);
        }
        for color in ["#ggg", "#12345", "rgb(0 0 0", "blurple"] {
            assert!(!ValueKind::Color.accepts(color), "{} should not be a color", color);
        }
        for length in ["0", "1rem", "-2px", "50%", "calc(100% - 1rem)", "12.5vh"] {
            assert!(ValueKind::Length.accepts(length), "{} should be a length", length);
        }
        for length in ["12", "rem", "1furlong", "calc(1px"] {
            assert!(!ValueKind::Length.accepts(length), "{} should not be a length", length);
        }
        assert!(ValueKind::Number.accepts("0.5"));
        assert!(ValueKind::Number.accepts("700"));
        assert!(!ValueKind::Number.accepts("bold"));
    }

    #[test]
    fn builtin_theme_is_valid_and_ordered() {
        let table = ThemeResolver::resolve(&ThemeSpec::builtin(), &ThemeExtension::default())
            .expect("builtin theme must validate");

        assert_eq!(table.get(TokenCategory::Spacing, "4"), Some("1rem"));
        assert_eq!(table.get(TokenCategory::Spacing, "0.5"), Some("0.125rem"));
        assert_eq!(table.get(TokenCategory::Colors, "red-500"), Some("#ef4444"));
        assert_eq!(table.get(TokenCategory::Opacity, "50"), Some("0.5"));
        assert_eq!(table.get(TokenCategory::BorderRadius, "DEFAULT"), Some("0.25rem"));

        let screens: Vec<String> = table
            .screens_by_width()
            .into_iter()
            .map(|(name, _)| name)
            .collect();
        assert_eq!(screens, vec!["sm", "md", "lg", "xl", "2xl"]);
    }

    #[test]
    fn screens_sort_across_units() {
        let base = ThemeSpec::new()
            .with(TokenCategory::Screens, "tablet", "48rem")
            .with(TokenCategory::Screens, "phone", "480px")
            .with(TokenCategory::Screens, "desk", "1200px");
        let table = ThemeResolver::resolve(&base, &ThemeExtension::default()).expect("valid");
        let names: Vec<String> = table
            .screens_by_width()
            .into_iter()
            .map(|(name, _)| name)
            .collect();
        assert_eq!(names, vec!["phone", "tablet", "desk"]);
    }

    #[test]
    fn screens_without_px_width_sort_last() {
        let base = ThemeSpec::new()
            .with(TokenCategory::Screens, "c", "5vw")
            .with(TokenCategory::Screens, "b", "10px")
            .with(TokenCategory::Screens, "wide", "60ch")
            .with(TokenCategory::Screens, "a", "9px");
        let table = ThemeResolver::resolve(&base, &ThemeExtension::default()).expect("valid");
        let names: Vec<String> = table
            .screens_by_width()
            .into_iter()
            .map(|(name, _)| name)
            .collect();
        assert_eq!(names, vec!["a", "b", "c", "wide"]);
    }
}
