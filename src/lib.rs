//! Content-driven utility-class CSS generation.
//!
//! Content files are scanned for candidate class names; every candidate that
//! names a known utility under the configured theme becomes one CSS rule.
//! Everything else is dropped without failing the build.
//!
//! ```no_run
//! use emberwind::{Engine, EngineConfig};
//!
//! let config = EngineConfig::from_toml_str(r#"content = ["src/**/*.html"]"#)?;
//! let engine = Engine::new(config)?;
//! let output = engine.build();
//! println!("{}", output.css);
//! # Ok::<(), emberwind::ConfigError>(())
//! ```

pub mod cache;
pub mod candidate;
pub mod config;
pub mod emitter;
pub mod engine;
pub mod registry;
pub mod rule;
pub mod theme;
pub mod variants;

pub use cache::{CacheStore, DirStore, IncrementalCache, MemoryStore, ScanFingerprint};
pub use candidate::{ParsedCandidate, UtilityRef};
pub use config::{ConfigError, DarkMode, EngineConfig};
pub use emitter::{CssOutput, OutputStyle, emit, emit_chunks};
pub use engine::{BuildOutput, BuildStats, Engine};
pub use registry::{RuleTemplate, UtilityCategory, UtilityRegistry};
pub use rule::{Declaration, Layer, Rule, RuleSet};
pub use theme::{ThemeExtension, ThemeResolver, ThemeSpec, ThemeTable, TokenCategory, ValueKind};
pub use variants::VariantResolver;

pub use emberwind_core::{Diagnostic, DropReason};
pub use emberwind_scanner::{Extractor, TokenExtractor};
