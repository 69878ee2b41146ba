use crate::cache::{
    self, CACHE_KEY, CacheStore, CacheUpdate, FileRecord, IncrementalCache, Resolution,
    ScanFingerprint,
};
use crate::candidate::ParsedCandidate;
use crate::config::{ConfigError, DarkMode, EngineConfig};
use crate::emitter::{CssOutput, OutputStyle, emit};
use crate::registry::UtilityRegistry;
use crate::rule::{Rule, RuleSet};
use crate::theme::{ThemeResolver, ThemeTable, TokenCategory};
use crate::variants::VariantResolver;
use emberwind_core::{Diagnostic, DropReason};
use emberwind_scanner::{
    ContentPatterns, Extractor, FileStamp, ScanOptions, ScannedFile, TokenExtractor, discover,
    extract_all, read_files, stamp_files,
};
use parking_lot::Mutex;
use rayon::prelude::*;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOutput {
    pub css: CssOutput,
    pub rules: RuleSet,
    pub diagnostics: Vec<Diagnostic>,
    pub stats: BuildStats,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildStats {
    pub files_scanned: usize,
    pub files_tokenized: usize,
    pub candidates: usize,
    pub rules: usize,
    pub cache_hit: bool,
}

/// Scans content, resolves candidates and renders CSS.
///
/// An engine owns its theme, registry and cache. Rebuilding after content
/// changes re-tokenizes only the files whose stamp changed; the output is
/// the same as a build with an empty cache.
pub struct Engine {
    patterns: ContentPatterns,
    scan_options: ScanOptions,
    style: OutputStyle,
    theme: Arc<ThemeTable>,
    registry: UtilityRegistry,
    variants: VariantResolver,
    extractor: Arc<dyn Extractor>,
    cache: IncrementalCache,
    store: Option<Box<dyn CacheStore>>,
    config_key: String,
    pending: Mutex<Vec<Diagnostic>>,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        let theme = ThemeResolver::resolve(&config.theme.base_spec(), &config.theme.extension())?;
        if !is_class_name(&config.dark_class) {
            return Err(ConfigError::InvalidDarkClass(config.dark_class));
        }
        let patterns = ContentPatterns::compile(&config.content, &config.ignore)?;

        let theme = Arc::new(theme);
        let registry = UtilityRegistry::new(Arc::clone(&theme));
        let variants = VariantResolver::new(&theme, config.dark_mode, &config.dark_class);
        let config_key = config_key_for(&theme, config.dark_mode, &config.dark_class);

        info!(
            tokens = theme.len(),
            patterns = patterns.include().len(),
            dark_mode = ?config.dark_mode,
            "engine configured"
        );

        Ok(Self {
            patterns,
            scan_options: config.scan_options(),
            style: config.output.style,
            theme,
            registry,
            variants,
            extractor: Arc::new(TokenExtractor),
            cache: IncrementalCache::new(config_key.clone()),
            store: None,
            config_key,
            pending: Mutex::new(Vec::new()),
        })
    }

    pub fn with_extractor(mut self, extractor: impl Extractor + 'static) -> Self {
        self.extractor = Arc::new(extractor);
        self.cache.clear();
        self
    }

    /// Attaches a persistent store and loads whatever cache it holds. A blob
    /// that cannot be used is reported on the next build.
    pub fn with_store(mut self, store: impl CacheStore + 'static) -> Self {
        match store.load(CACHE_KEY) {
            Ok(Some(blob)) => {
                let (cache, diagnostic) = IncrementalCache::from_blob(&self.config_key, &blob);
                self.cache = cache;
                if let Some(diagnostic) = diagnostic {
                    warn!(%diagnostic, "discarding persisted cache");
                    self.pending.lock().push(diagnostic);
                }
            }
            Ok(None) => debug!("no persisted cache"),
            Err(err) => {
                warn!(error = %err, "failed to load persisted cache");
                self.pending
                    .lock()
                    .push(Diagnostic::cache_invalid(format!("failed to load cache: {}", err)));
            }
        }
        self.store = Some(Box::new(store));
        self
    }

    pub fn theme(&self) -> &ThemeTable {
        &self.theme
    }

    pub fn registry(&self) -> &UtilityRegistry {
        &self.registry
    }

    pub fn cache(&self) -> &IncrementalCache {
        &self.cache
    }

    pub fn output_style(&self) -> OutputStyle {
        self.style
    }

    /// Resolves one candidate string without touching the cache.
    pub fn resolve_candidate(&self, raw: &str) -> Result<Rule, DropReason> {
        let candidate = ParsedCandidate::parse(raw).ok_or(DropReason::Malformed)?;
        let template = self.registry.resolve(&candidate)?;
        self.variants.apply(&candidate, template)
    }

    /// Scans the configured content and renders CSS, reusing cached work
    /// for files whose stamp is unchanged.
    pub fn build(&self) -> BuildOutput {
        let started = Instant::now();
        let mut diagnostics = std::mem::take(&mut *self.pending.lock());

        let discovery = discover(&self.patterns, &self.scan_options);
        diagnostics.extend(discovery.warnings);
        let (stamps, stamp_warnings) = stamp_files(&discovery.paths);
        diagnostics.extend(stamp_warnings);
        let fingerprint = ScanFingerprint::compute(&self.config_key, &stamps);
        let files_scanned = stamps.len();

        if let Some(rules) = self.cache.get(&fingerprint) {
            let dropped = self.cache.dropped();
            let candidates = dropped.len() + rules.len();
            diagnostics.extend(surfaced(dropped));
            let css = emit(&rules, self.style);
            info!(
                files = files_scanned,
                rules = rules.len(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "build served from cache"
            );
            return BuildOutput {
                css,
                stats: BuildStats {
                    files_scanned,
                    files_tokenized: 0,
                    candidates,
                    rules: rules.len(),
                    cache_hit: true,
                },
                rules,
                diagnostics,
            };
        }

        let mut files = BTreeMap::new();
        let mut changed: HashMap<PathBuf, FileStamp> = HashMap::new();
        for stamp in stamps {
            match self.cache.file_candidates(&stamp) {
                Some(candidates) => {
                    files.insert(stamp.path.clone(), FileRecord { stamp, candidates });
                }
                None => {
                    changed.insert(stamp.path.clone(), stamp);
                }
            }
        }

        let mut changed_paths: Vec<PathBuf> = changed.keys().cloned().collect();
        changed_paths.sort();
        let (scanned, read_warnings) = read_files(&changed_paths);
        let complete = read_warnings.is_empty();
        diagnostics.extend(read_warnings);
        let files_tokenized = scanned.len();

        for (path, candidates) in extract_all(&scanned, self.extractor.as_ref()) {
            if let Some(stamp) = changed.remove(&path) {
                files.insert(path, FileRecord { stamp, candidates });
            }
        }

        let candidates: BTreeSet<String> = files
            .values()
            .flat_map(|record| record.candidates.iter().cloned())
            .collect();
        let (rules, resolutions) = self.resolve_all(&candidates, true);
        diagnostics.extend(surfaced(dropped_from(&resolutions)));

        let rules = RuleSet::from_rules(rules);
        let css = emit(&rules, self.style);
        let stats = BuildStats {
            files_scanned,
            files_tokenized,
            candidates: candidates.len(),
            rules: rules.len(),
            cache_hit: false,
        };

        self.cache.commit(CacheUpdate {
            // An unreadable file leaves the result incomplete; do not let the
            // next build short-circuit on it.
            fingerprint: complete.then_some(fingerprint),
            rules: rules.clone(),
            files,
            resolutions,
        });
        self.persist();

        info!(
            files = stats.files_scanned,
            tokenized = stats.files_tokenized,
            candidates = stats.candidates,
            rules = stats.rules,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "build finished"
        );

        BuildOutput {
            css,
            rules,
            diagnostics,
            stats,
        }
    }

    /// Renders CSS for in-memory sources. The cache is neither read nor
    /// written.
    pub fn build_from_sources<I, P, B>(&self, sources: I) -> BuildOutput
    where
        I: IntoIterator<Item = (P, B)>,
        P: Into<PathBuf>,
        B: Into<Vec<u8>>,
    {
        let files: Vec<ScannedFile> = sources
            .into_iter()
            .map(|(path, bytes)| ScannedFile {
                path: path.into(),
                bytes: bytes.into(),
            })
            .collect();

        let candidates: BTreeSet<String> = extract_all(&files, self.extractor.as_ref())
            .into_iter()
            .flat_map(|(_, candidates)| candidates)
            .collect();
        let (rules, resolutions) = self.resolve_all(&candidates, false);
        let diagnostics = surfaced(dropped_from(&resolutions)).collect();

        let rules = RuleSet::from_rules(rules);
        BuildOutput {
            css: emit(&rules, self.style),
            stats: BuildStats {
                files_scanned: files.len(),
                files_tokenized: files.len(),
                candidates: candidates.len(),
                rules: rules.len(),
                cache_hit: false,
            },
            rules,
            diagnostics,
        }
    }

    fn resolve_all(
        &self,
        candidates: &BTreeSet<String>,
        use_memo: bool,
    ) -> (Vec<Rule>, BTreeMap<String, Resolution>) {
        let candidates: Vec<&String> = candidates.iter().collect();
        let resolved: Vec<(String, Resolution)> = candidates
            .par_iter()
            .map(|raw| {
                let memo = if use_memo {
                    self.cache.resolution(raw)
                } else {
                    None
                };
                let resolution =
                    memo.unwrap_or_else(|| Resolution::from(self.resolve_candidate(raw)));
                ((*raw).clone(), resolution)
            })
            .collect();

        let mut rules = Vec::new();
        let mut resolutions = BTreeMap::new();
        for (raw, resolution) in resolved {
            if let Resolution::Rule(rule) = &resolution {
                rules.push(rule.clone());
            }
            resolutions.insert(raw, resolution);
        }
        (rules, resolutions)
    }

    fn persist(&self) {
        let Some(store) = &self.store else {
            return;
        };
        match self.cache.to_blob() {
            Ok(blob) => {
                if let Err(err) = store.store(CACHE_KEY, &blob) {
                    warn!(error = %err, "failed to persist cache");
                }
            }
            Err(err) => warn!(error = %err, "failed to serialize cache"),
        }
    }
}

fn dropped_from(resolutions: &BTreeMap<String, Resolution>) -> Vec<(String, DropReason)> {
    resolutions
        .iter()
        .filter_map(|(raw, resolution)| match resolution {
            Resolution::Dropped(reason) => Some((raw.clone(), reason.clone())),
            Resolution::Rule(_) => None,
        })
        .collect()
}

/// Unknown utilities are expected when scanning prose; only the rest is
/// worth reporting.
fn surfaced(dropped: Vec<(String, DropReason)>) -> impl Iterator<Item = Diagnostic> {
    dropped.into_iter().filter_map(|(candidate, reason)| {
        if reason.is_noise() {
            debug!(%candidate, %reason, "dropped candidate");
            None
        } else {
            Some(Diagnostic::dropped(candidate, reason))
        }
    })
}

fn config_key_for(theme: &ThemeTable, dark_mode: DarkMode, dark_class: &str) -> String {
    let mut tokens = String::new();
    for category in TokenCategory::ALL {
        for (name, value) in theme.tokens(category) {
            tokens.push_str(&format!("{}\t{}\t{}\n", category, name, value));
        }
    }
    let mode = match dark_mode {
        DarkMode::Class => "class",
        DarkMode::Media => "media",
    };
    cache::config_key(&[tokens.as_bytes(), mode.as_bytes(), dark_class.as_bytes()])
}

fn is_class_name(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with(|ch: char| ch.is_ascii_digit())
        && name
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '-' || ch == '_')
}
