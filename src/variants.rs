use crate::candidate::ParsedCandidate;
use crate::config::DarkMode;
use crate::registry::RuleTemplate;
use crate::rule::{Declaration, Layer, Rule, SortKey, escape_selector};
use crate::theme::{ThemeTable, is_length};
use emberwind_core::DropReason;

const PSEUDO_CLASSES: [(&str, &str); 23] = [
    ("first", ":first-child"),
    ("last", ":last-child"),
    ("only", ":only-child"),
    ("odd", ":nth-child(odd)"),
    ("even", ":nth-child(even)"),
    ("first-of-type", ":first-of-type"),
    ("last-of-type", ":last-of-type"),
    ("empty", ":empty"),
    ("visited", ":visited"),
    ("target", ":target"),
    ("open", "[open]"),
    ("checked", ":checked"),
    ("indeterminate", ":indeterminate"),
    ("required", ":required"),
    ("invalid", ":invalid"),
    ("placeholder-shown", ":placeholder-shown"),
    ("focus-within", ":focus-within"),
    ("hover", ":hover"),
    ("focus", ":focus"),
    ("focus-visible", ":focus-visible"),
    ("active", ":active"),
    ("disabled", ":disabled"),
    ("enabled", ":enabled"),
];

const PSEUDO_ELEMENTS: [(&str, &str); 7] = [
    ("before", "::before"),
    ("after", "::after"),
    ("placeholder", "::placeholder"),
    ("selection", "::selection"),
    ("marker", "::marker"),
    ("first-line", "::first-line"),
    ("file", "::file-selector-button"),
];

const MEDIA_FEATURES: [(&str, &str); 7] = [
    ("motion-safe", "@media (prefers-reduced-motion: no-preference)"),
    ("motion-reduce", "@media (prefers-reduced-motion: reduce)"),
    ("contrast-more", "@media (prefers-contrast: more)"),
    ("contrast-less", "@media (prefers-contrast: less)"),
    ("portrait", "@media (orientation: portrait)"),
    ("landscape", "@media (orientation: landscape)"),
    ("print", "@media print"),
];

const ARIA_STATES: [&str; 8] = [
    "busy", "checked", "disabled", "expanded", "hidden", "pressed", "readonly", "required",
];

const RANK_PSEUDO_CLASS: u16 = 100;
const RANK_GROUP: u16 = 200;
const RANK_PEER: u16 = 250;
const RANK_ATTRIBUTE: u16 = 300;
const RANK_PSEUDO_ELEMENT: u16 = 400;
const RANK_ARBITRARY: u16 = 500;
const RANK_DARK: u16 = 600;
const RANK_MEDIA: u16 = 700;
const RANK_SUPPORTS: u16 = 800;
const RANK_MIN_SCREEN: u16 = 1000;
const RANK_MAX_SCREEN: u16 = 2000;

/// Turns variant names into [`Layer`]s and applies them to a template.
#[derive(Debug, Clone)]
pub struct VariantResolver {
    dark_mode: DarkMode,
    dark_selector: String,
    screens: Vec<(String, String)>,
}

impl VariantResolver {
    pub fn new(theme: &ThemeTable, dark_mode: DarkMode, dark_class: &str) -> Self {
        Self {
            dark_mode,
            dark_selector: format!(".{} &", escape_selector(dark_class)),
            screens: theme.screens_by_width(),
        }
    }

    /// The layer for one variant plus its ordering rank, or `None` when the
    /// name is unknown.
    pub fn layer(&self, variant: &str) -> Option<(Layer, u16)> {
        if variant == "dark" {
            let layer = match self.dark_mode {
                DarkMode::Class => Layer::Selector(self.dark_selector.clone()),
                DarkMode::Media => {
                    Layer::Condition("@media (prefers-color-scheme: dark)".to_string())
                }
            };
            return Some((layer, RANK_DARK));
        }

        if let Some(idx) = position(&PSEUDO_CLASSES, variant) {
            let selector = format!("&{}", PSEUDO_CLASSES[idx].1);
            return Some((Layer::Selector(selector), RANK_PSEUDO_CLASS + rank(idx)));
        }
        if let Some(idx) = position(&PSEUDO_ELEMENTS, variant) {
            let selector = format!("&{}", PSEUDO_ELEMENTS[idx].1);
            return Some((Layer::Selector(selector), RANK_PSEUDO_ELEMENT + rank(idx)));
        }
        if let Some(idx) = position(&MEDIA_FEATURES, variant) {
            let prelude = MEDIA_FEATURES[idx].1.to_string();
            return Some((Layer::Condition(prelude), RANK_MEDIA + rank(idx)));
        }

        if let Some(state) = variant.strip_prefix("group-") {
            let idx = position(&PSEUDO_CLASSES, state)?;
            let selector = format!(".group{} &", PSEUDO_CLASSES[idx].1);
            return Some((Layer::Selector(selector), RANK_GROUP + rank(idx)));
        }
        if let Some(state) = variant.strip_prefix("peer-") {
            let idx = position(&PSEUDO_CLASSES, state)?;
            let selector = format!(".peer{} ~ &", PSEUDO_CLASSES[idx].1);
            return Some((Layer::Selector(selector), RANK_PEER + rank(idx)));
        }
        if let Some(attribute) = variant.strip_prefix("aria-") {
            let selector = if let Some(inner) = bracketed(attribute) {
                format!("&[aria-{}]", arbitrary_content(inner)?)
            } else if ARIA_STATES.contains(&attribute) {
                format!("&[aria-{}=\"true\"]", attribute)
            } else {
                return None;
            };
            return Some((Layer::Selector(selector), RANK_ATTRIBUTE));
        }
        if let Some(attribute) = variant.strip_prefix("data-") {
            let selector = match bracketed(attribute) {
                Some(inner) => format!("&[data-{}]", arbitrary_content(inner)?),
                None if is_identifier(attribute) => format!("&[data-{}]", attribute),
                None => return None,
            };
            return Some((Layer::Selector(selector), RANK_ATTRIBUTE + 1));
        }
        if let Some(query) = variant.strip_prefix("supports-") {
            let query = bracketed(query)?;
            let prelude = format!("@supports {}", supports_query(&arbitrary_content(query)?));
            return Some((Layer::Condition(prelude), RANK_SUPPORTS));
        }
        if let Some(inner) = bracketed(variant) {
            let content = arbitrary_content(inner)?;
            if content.starts_with('@') {
                return Some((Layer::Condition(content), RANK_ARBITRARY));
            }
            if content.contains('&') {
                return Some((Layer::Selector(content), RANK_ARBITRARY));
            }
            return None;
        }

        if let Some(screen) = variant.strip_prefix("max-") {
            let idx = self.screens.iter().position(|(name, _)| name == screen)?;
            let prelude = format!("@media (width < {})", self.screens[idx].1);
            let rank = RANK_MAX_SCREEN + rank(self.screens.len() - idx);
            return Some((Layer::Condition(prelude), rank));
        }
        if let Some(inner) = variant.strip_prefix("min-").and_then(bracketed) {
            let width = arbitrary_content(inner)?;
            if !is_length(&width) {
                return None;
            }
            let prelude = format!("@media (width >= {})", width);
            return Some((Layer::Condition(prelude), RANK_MIN_SCREEN));
        }
        let idx = self.screens.iter().position(|(name, _)| name == variant)?;
        let prelude = format!("@media (width >= {})", self.screens[idx].1);
        Some((Layer::Condition(prelude), RANK_MIN_SCREEN + rank(idx + 1)))
    }

    /// Wraps `template` in the candidate's variant chain. The first unknown
    /// variant drops the whole candidate.
    pub fn apply(
        &self,
        candidate: &ParsedCandidate,
        template: RuleTemplate,
    ) -> Result<Rule, DropReason> {
        let mut layers = Vec::with_capacity(candidate.variants.len());
        let mut ranks = Vec::with_capacity(candidate.variants.len());
        for variant in &candidate.variants {
            let (layer, rank) = self
                .layer(variant)
                .ok_or_else(|| DropReason::UnknownVariant(variant.clone()))?;
            layers.push(layer);
            ranks.push(rank);
        }

        let declarations = if candidate.important {
            template
                .declarations
                .into_iter()
                .map(|decl| Declaration::new(decl.property, format!("{} !important", decl.value)))
                .collect()
        } else {
            template.declarations
        };

        Ok(Rule {
            candidate: candidate.raw.clone(),
            class_selector: format!(".{}", escape_selector(&candidate.raw)),
            sort_key: SortKey {
                category: template.category,
                variant_count: layers.len(),
                variant_ranks: ranks,
                candidate: candidate.raw.clone(),
            },
            layers,
            declarations,
        })
    }
}

fn position(table: &[(&str, &str)], name: &str) -> Option<usize> {
    table.iter().position(|(key, _)| *key == name)
}

fn rank(idx: usize) -> u16 {
    u16::try_from(idx).unwrap_or(u16::MAX)
}

fn bracketed(value: &str) -> Option<&str> {
    value
        .strip_prefix('[')
        .and_then(|inner| inner.strip_suffix(']'))
        .filter(|inner| !inner.is_empty())
}

fn is_identifier(value: &str) -> bool {
    !value.is_empty()
        && value
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '-' || ch == '_')
}

/// Decodes bracket content from a variant. Content that could close the
/// surrounding selector or block is rejected.
fn arbitrary_content(raw: &str) -> Option<String> {
    let content = decode_spaces(raw);
    if content.trim().is_empty() || content.contains(['{', '}', ';']) {
        return None;
    }
    let mut brackets = 0i32;
    let mut parens = 0i32;
    for ch in content.chars() {
        match ch {
            '[' => brackets += 1,
            ']' => brackets -= 1,
            '(' => parens += 1,
            ')' => parens -= 1,
            _ => {}
        }
        if brackets < 0 || parens < 0 {
            return None;
        }
    }
    let quotes_closed =
        content.matches('"').count() % 2 == 0 && content.matches('\'').count() % 2 == 0;
    (brackets == 0 && parens == 0 && quotes_closed).then_some(content)
}

fn decode_spaces(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
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
            '_' => out.push(' '),
            _ => out.push(ch),
        }
    }
    out
}

fn supports_query(query: &str) -> String {
    let trimmed = query.trim();
    if (trimmed.starts_with('(') && trimmed.ends_with(')')) || trimmed.starts_with("not ") {
        return trimmed.to_string();
    }
    format!("({})", trimmed)
}

#[cfg(test)]
mod tests {
    use super::VariantResolver;
    use crate::candidate::ParsedCandidate;
    use crate::config::DarkMode;
    use crate::registry::{RuleTemplate, UtilityCategory};
    use crate::rule::{Declaration, Layer};
    use crate::theme::{ThemeExtension, ThemeResolver, ThemeSpec};
    use emberwind_core::DropReason;

    fn resolver(mode: DarkMode) -> VariantResolver {
        let table = ThemeResolver::resolve(&ThemeSpec::builtin(), &ThemeExtension::default())
            .expect("builtin theme");
        VariantResolver::new(&table, mode, "dark")
    }

    fn template() -> RuleTemplate {
        RuleTemplate {
            category: UtilityCategory::Typography,
            declarations: vec![Declaration::new("color", "white")],
        }
    }

    fn apply(resolver: &VariantResolver, raw: &str) -> Result<crate::rule::Rule, DropReason> {
        let candidate = ParsedCandidate::parse(raw).expect("candidate should parse");
        resolver.apply(&candidate, template())
    }

    #[test]
    fn class_dark_mode_is_an_ancestor_selector() {
        let rule = apply(&resolver(DarkMode::Class), "dark:text-white").expect("applies");
        assert_eq!(rule.selector(), ".dark .dark\\:text-white");
        assert!(rule.conditions().is_empty());
    }

    #[test]
    fn media_dark_mode_is_a_condition() {
        let rule = apply(&resolver(DarkMode::Media), "dark:text-white").expect("applies");
        assert_eq!(rule.selector(), ".dark\\:text-white");
        assert_eq!(rule.conditions(), vec!["@media (prefers-color-scheme: dark)"]);
    }

    #[test]
    fn layers_follow_chain_order() {
        let resolver = resolver(DarkMode::Class);
        let rule = apply(&resolver, "dark:hover:text-white").expect("applies");
        assert_eq!(
            rule.layers,
            vec![
                Layer::Selector(".dark &".to_string()),
                Layer::Selector("&:hover".to_string()),
            ]
        );
        let reversed = apply(&resolver, "hover:dark:text-white").expect("applies");
        assert_eq!(
            reversed.layers,
            vec![
                Layer::Selector("&:hover".to_string()),
                Layer::Selector(".dark &".to_string()),
            ]
        );
    }

    #[test]
    fn bracket_content_cannot_escape_its_block() {
        let resolver = resolver(DarkMode::Class);
        for raw in [
            "[&{}body{color:red}]:text-white",
            "[@media{}*{x:y}]:text-white",
            "supports-[display:grid;}]:text-white",
            "data-[state=open]{}]:text-white",
            "aria-[label=\"x]:text-white",
            "[&:is(.a))]:text-white",
            "min-[1px;}]:text-white",
        ] {
            assert!(
                matches!(apply(&resolver, raw), Err(DropReason::UnknownVariant(_))),
                "{raw} should be dropped"
            );
        }
    }

    #[test]
    fn min_width_needs_a_length() {
        let resolver = resolver(DarkMode::Class);
        assert!(matches!(
            apply(&resolver, "min-[wide]:text-white"),
            Err(DropReason::UnknownVariant(_))
        ));
        let rule = apply(&resolver, "min-[calc(40rem_+_2px)]:text-white").expect("applies");
        assert_eq!(rule.conditions(), vec!["@media (width >= calc(40rem + 2px))"]);
    }

    #[test]
    fn screens_and_media_features() {
        let resolver = resolver(DarkMode::Class);
        let rule = apply(&resolver, "md:text-white").expect("applies");
        assert_eq!(rule.conditions(), vec!["@media (width >= 48rem)"]);
        let rule = apply(&resolver, "max-lg:text-white").expect("applies");
        assert_eq!(rule.conditions(), vec!["@media (width < 64rem)"]);
        let rule = apply(&resolver, "min-[900px]:text-white").expect("applies");
        assert_eq!(rule.conditions(), vec!["@media (width >= 900px)"]);
        let rule = apply(&resolver, "motion-reduce:print:text-white").expect("applies");
        assert_eq!(
            rule.conditions(),
            vec!["@media (prefers-reduced-motion: reduce)", "@media print"]
        );
        let rule = apply(&resolver, "supports-[display:grid]:text-white").expect("applies");
        assert_eq!(rule.conditions(), vec!["@supports (display:grid)"]);
    }

    #[test]
    fn wider_screens_rank_later() {
        let resolver = resolver(DarkMode::Class);
        let sm = apply(&resolver, "sm:text-white").expect("applies");
        let xl = apply(&resolver, "xl:text-white").expect("applies");
        let hover = apply(&resolver, "hover:text-white").expect("applies");
        assert!(sm.sort_key < xl.sort_key);
        assert!(hover.sort_key < sm.sort_key);
    }

    #[test]
    fn structural_selector_variants() {
        let resolver = resolver(DarkMode::Class);
        let cases = [
            ("group-hover:text-white", ".group:hover .group-hover\\:text-white"),
            ("peer-checked:text-white", ".peer:checked ~ .peer-checked\\:text-white"),
            ("aria-expanded:text-white", ".aria-expanded\\:text-white[aria-expanded=\"true\"]"),
            ("data-active:text-white", ".data-active\\:text-white[data-active]"),
            ("before:text-white", ".before\\:text-white::before"),
            ("[&>li]:text-white", ".\\[\\&\\>li\\]\\:text-white>li"),
            (
                "[&_p]:text-white",
                ".\\[\\&_p\\]\\:text-white p",
            ),
        ];
        for (raw, selector) in cases {
            let rule = apply(&resolver, raw).unwrap_or_else(|err| panic!("{}: {}", raw, err));
            assert_eq!(rule.selector(), selector, "{}", raw);
        }
    }

    #[test]
    fn unknown_variants_drop_the_candidate() {
        let resolver = resolver(DarkMode::Class);
        assert_eq!(
            apply(&resolver, "wiggle:text-white"),
            Err(DropReason::UnknownVariant("wiggle".to_string()))
        );
        assert_eq!(
            apply(&resolver, "hover:3xl:text-white"),
            Err(DropReason::UnknownVariant("3xl".to_string()))
        );
        assert!(apply(&resolver, "group-before:text-white").is_err());
        assert!(apply(&resolver, "[.foo]:text-white").is_err());
    }

    #[test]
    fn important_flag_marks_every_declaration() {
        let rule = apply(&resolver(DarkMode::Class), "!text-white").expect("applies");
        assert_eq!(
            rule.declarations,
            vec![Declaration::new("color", "white !important")]
        );
        assert_eq!(rule.selector(), ".\\!text-white");
    }
}
