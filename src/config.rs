use crate::emitter::OutputStyle;
use crate::theme::{ThemeExtension, ThemeSpec, TokenCategory, ValueKind};
use emberwind_scanner::{ScanError, ScanOptions};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Fatal configuration problems. Everything else a build runs into is a
/// [`emberwind_core::Diagnostic`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {kind} for {category}.{token}: '{value}'")]
    InvalidToken {
        category: TokenCategory,
        token: String,
        value: String,
        kind: ValueKind,
    },
    #[error("empty token name in theme category '{0}'")]
    EmptyTokenName(TokenCategory),
    #[error("invalid dark mode class '{0}'")]
    InvalidDarkClass(String),
    #[error(transparent)]
    Pattern(#[from] ScanError),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// How the `dark` variant is expressed in CSS.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DarkMode {
    /// `.dark &`, toggled by a marker class on an ancestor.
    #[default]
    Class,
    /// `@media (prefers-color-scheme: dark)`.
    Media,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    pub content: Vec<String>,
    pub ignore: Vec<String>,
    pub root: PathBuf,
    pub dark_mode: DarkMode,
    pub dark_class: String,
    pub theme: ThemeConfig,
    pub output: OutputConfig,
    pub scan: ScanConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            content: Vec::new(),
            ignore: Vec::new(),
            root: PathBuf::from("."),
            dark_mode: DarkMode::default(),
            dark_class: default_dark_class(),
            theme: ThemeConfig::default(),
            output: OutputConfig::default(),
            scan: ScanConfig::default(),
        }
    }
}

/// `base` replaces the built-in theme when present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ThemeConfig {
    pub base: Option<ThemeSpec>,
    pub extend: ThemeSpec,
    pub replace: ThemeSpec,
}

impl ThemeConfig {
    pub fn base_spec(&self) -> ThemeSpec {
        self.base.clone().unwrap_or_else(ThemeSpec::builtin)
    }

    pub fn extension(&self) -> ThemeExtension {
        ThemeExtension {
            extend: self.extend.clone(),
            replace: self.replace.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    pub style: OutputStyle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScanConfig {
    pub respect_gitignore: bool,
    pub follow_links: bool,
    pub include_node_modules: bool,
    pub include_binary_files: bool,
    pub include_lock_files: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        let defaults = ScanOptions::default();
        Self {
            respect_gitignore: defaults.respect_gitignore,
            follow_links: defaults.follow_links,
            include_node_modules: defaults.include_node_modules,
            include_binary_files: defaults.include_binary_files,
            include_lock_files: defaults.include_lock_files,
        }
    }
}

impl EngineConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn scan_options(&self) -> ScanOptions {
        ScanOptions {
            base_path: self.root.clone(),
            respect_gitignore: self.scan.respect_gitignore,
            follow_links: self.scan.follow_links,
            include_node_modules: self.scan.include_node_modules,
            include_binary_files: self.scan.include_binary_files,
            include_lock_files: self.scan.include_lock_files,
        }
    }
}

fn default_dark_class() -> String {
    "dark".to_string()
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, DarkMode, EngineConfig};
    use crate::emitter::OutputStyle;
    use crate::theme::{ThemeExtension, ThemeResolver, TokenCategory};

    #[test]
    fn defaults_when_empty() {
        let config = EngineConfig::from_toml_str("").expect("empty config should parse");
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.dark_mode, DarkMode::Class);
        assert_eq!(config.dark_class, "dark");
        assert!(config.theme.base.is_none());
        assert!(config.scan.respect_gitignore);
        assert!(!config.scan.include_node_modules);
    }

    #[test]
    fn loads_full_config() {
        let config = EngineConfig::from_toml_str(
            r##"
content = ["src/**/*.html", "./templates/**/*.jinja"]
ignore = ["src/vendor/**"]
dark_mode = "media"

[output]
style = "nested"

[scan]
respect_gitignore = false

[theme.base.spacing]
4 = "1rem"

[theme.extend.colors.brand]
DEFAULT = "#0ea5e9"
dark = "#0369a1"

[theme.extend.opacity]
15 = 0.15
"##,
        )
        .expect("config should parse");

        assert_eq!(config.content.len(), 2);
        assert_eq!(config.ignore, vec!["src/vendor/**".to_string()]);
        assert_eq!(config.dark_mode, DarkMode::Media);
        assert_eq!(config.output.style, OutputStyle::Nested);
        assert!(!config.scan.respect_gitignore);

        let table = ThemeResolver::resolve(&config.theme.base_spec(), &config.theme.extension())
            .expect("theme should validate");
        assert_eq!(table.get(TokenCategory::Spacing, "4"), Some("1rem"));
        assert_eq!(table.get(TokenCategory::Colors, "brand"), Some("#0ea5e9"));
        assert_eq!(table.get(TokenCategory::Colors, "brand-dark"), Some("#0369a1"));
        assert_eq!(table.get(TokenCategory::Opacity, "15"), Some("0.15"));
        assert!(!table.contains(TokenCategory::Colors, "red-500"));
    }

    #[test]
    fn missing_base_uses_builtin_theme() {
        let config = EngineConfig::default();
        let table = ThemeResolver::resolve(&config.theme.base_spec(), &ThemeExtension::default())
            .expect("builtin theme should validate");
        assert!(table.contains(TokenCategory::Colors, "blue-500"));
    }

    #[test]
    fn rejects_unknown_keys_and_categories() {
        assert!(matches!(
            EngineConfig::from_toml_str("colour = \"red\""),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            EngineConfig::from_toml_str("[theme.extend.shadows]\nsm = \"1px\""),
            Err(ConfigError::Parse(_))
        ));
    }
}
