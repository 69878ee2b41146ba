//! Structural parsing of candidate class names.
//!
//! Parsing only splits a candidate into its parts. Whether any part means
//! something is decided by the registry and the variant resolver.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UtilityRef {
    /// A named utility such as `p-4` or `flex`.
    Static(String),
    /// `root-[value]` with the raw bracket content.
    Dynamic { root: String, value: String },
    /// `[property:value]`.
    ArbitraryProperty { property: String, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParsedCandidate {
    pub raw: String,
    /// Outermost first, in the order written.
    pub variants: Vec<String>,
    pub important: bool,
    pub negative: bool,
    pub modifier: Option<String>,
    pub utility: UtilityRef,
}

impl ParsedCandidate {
    /// Splits `raw` into variants, flags, utility and modifier. Returns `None`
    /// when the text cannot be a class at all, e.g. `hover:` or `-[x]`.
    pub fn parse(raw: &str) -> Option<Self> {
        let (variants, base) = split_variants(raw);
        if variants.iter().any(|variant| variant.is_empty()) {
            return None;
        }
        let (base, important) = strip_important(base);
        if base.is_empty() {
            return None;
        }

        if let Some(inner) = base.strip_prefix('[').and_then(|v| v.strip_suffix(']')) {
            let (property, value) = inner.split_once(':')?;
            if property.is_empty() || value.is_empty() {
                return None;
            }
            return Some(Self {
                raw: raw.to_string(),
                variants: variants.into_iter().map(str::to_string).collect(),
                important,
                negative: false,
                modifier: None,
                utility: UtilityRef::ArbitraryProperty {
                    property: property.to_string(),
                    value: value.to_string(),
                },
            });
        }

        let (base, negative) = match base.strip_prefix('-') {
            Some(rest) => (rest, true),
            None => (base, false),
        };
        let (base, modifier) = split_modifier(base);
        if base.is_empty() || !base.starts_with(|c: char| c.is_ascii_alphanumeric()) {
            return None;
        }

        let utility = if base.ends_with(']') {
            let open = base.find("-[")?;
            let root = &base[..open];
            let value = &base[open + 2..base.len() - 1];
            if root.is_empty() || value.is_empty() || !is_balanced(value) {
                return None;
            }
            UtilityRef::Dynamic {
                root: root.to_string(),
                value: value.to_string(),
            }
        } else if base.contains(['[', ']']) {
            return None;
        } else {
            UtilityRef::Static(base.to_string())
        };

        Some(Self {
            raw: raw.to_string(),
            variants: variants.into_iter().map(str::to_string).collect(),
            important,
            negative,
            modifier: modifier.map(str::to_string),
            utility,
        })
    }
}

/// Splits on `:` outside brackets and parentheses. The last segment is the
/// base; everything before it is the variant chain.
pub fn split_variants(class: &str) -> (Vec<&str>, &str) {
    let mut paren_depth = 0usize;
    let mut bracket_depth = 0usize;
    let mut variants = Vec::new();
    let mut start = 0usize;

    for (idx, ch) in class.char_indices() {
        match ch {
            '(' => paren_depth += 1,
            ')' => paren_depth = paren_depth.saturating_sub(1),
            '[' => bracket_depth += 1,
            ']' => bracket_depth = bracket_depth.saturating_sub(1),
            ':' if paren_depth == 0 && bracket_depth == 0 => {
                variants.push(&class[start..idx]);
                start = idx + 1;
            }
            _ => {}
        }
    }

    (variants, &class[start..])
}

fn strip_important(base: &str) -> (&str, bool) {
    if base.len() > 1 {
        if let Some(stripped) = base.strip_prefix('!') {
            return (stripped, true);
        }
        if let Some(stripped) = base.strip_suffix('!') {
            return (stripped, true);
        }
    }
    (base, false)
}

fn split_modifier(base: &str) -> (&str, Option<&str>) {
    let mut depth = 0usize;
    let mut split_at = None;
    for (idx, ch) in base.char_indices() {
        match ch {
            '[' | '(' => depth += 1,
            ']' | ')' => depth = depth.saturating_sub(1),
            '/' if depth == 0 => split_at = Some(idx),
            _ => {}
        }
    }
    match split_at {
        Some(idx) if idx + 1 < base.len() => (&base[..idx], Some(&base[idx + 1..])),
        _ => (base, None),
    }
}

fn is_balanced(value: &str) -> bool {
    let mut depth = 0i32;
    for ch in value.chars() {
        match ch {
            '[' | '(' => depth += 1,
            ']' | ')' => {
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
