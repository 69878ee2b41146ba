//! File discovery and candidate extraction.
//!
//! [`discover`] expands content globs into a deduplicated file set,
//! [`stamp_files`] records the modification signature of each file and
//! [`read_files`] loads their bytes in parallel. Scanning never aborts on a
//! single bad file: problems come back as [`Diagnostic`] values.

mod extract;

pub use extract::{Extractor, TokenExtractor, extract_all, extract_candidates};

use emberwind_core::Diagnostic;
use globset::{Glob, GlobSet, GlobSetBuilder};
use ignore::WalkBuilder;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("invalid glob pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },
    #[error("failed to build glob set: {0}")]
    GlobSet(#[source] globset::Error),
}

/// Compiled content globs. Duplicate patterns are harmless: every pattern
/// lands in one glob set and matching files are collected into a set.
#[derive(Debug, Clone)]
pub struct ContentPatterns {
    include: Vec<String>,
    ignore: Vec<String>,
    include_set: GlobSet,
    ignore_set: GlobSet,
}

impl ContentPatterns {
    pub fn compile(include: &[String], ignore: &[String]) -> Result<Self, ScanError> {
        let include: Vec<String> = include.iter().map(|p| normalize_pattern(p)).collect();
        let ignore: Vec<String> = ignore.iter().map(|p| normalize_pattern(p)).collect();
        Ok(Self {
            include_set: build_globset(&include)?,
            ignore_set: build_globset(&ignore)?,
            include,
            ignore,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.include.is_empty()
    }

    pub fn include(&self) -> &[String] {
        &self.include
    }

    pub fn ignore(&self) -> &[String] {
        &self.ignore
    }

    /// `relative` is the path below the scan root, `path` the walked path.
    pub fn is_match(&self, relative: &Path, path: &Path) -> bool {
        if !self.include_set.is_match(relative) && !self.include_set.is_match(path) {
            return false;
        }
        !(self.ignore_set.is_match(relative) || self.ignore_set.is_match(path))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanOptions {
    pub base_path: PathBuf,
    pub respect_gitignore: bool,
    pub follow_links: bool,
    pub include_node_modules: bool,
    pub include_binary_files: bool,
    pub include_lock_files: bool,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            base_path: PathBuf::from("."),
            respect_gitignore: true,
            follow_links: true,
            include_node_modules: false,
            include_binary_files: false,
            include_lock_files: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Discovery {
    /// Sorted and deduplicated.
    pub paths: Vec<PathBuf>,
    pub warnings: Vec<Diagnostic>,
}

/// Modification signature of one scanned file.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FileStamp {
    pub path: PathBuf,
    pub len: u64,
    pub modified_ns: u128,
}

impl FileStamp {
    pub fn same_signature(&self, other: &FileStamp) -> bool {
        self.len == other.len && self.modified_ns == other.modified_ns
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedFile {
    pub path: PathBuf,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanReport {
    pub files: Vec<ScannedFile>,
    pub warnings: Vec<Diagnostic>,
}

/// Expands the patterns and reads every matching file.
pub fn scan(patterns: &ContentPatterns, options: &ScanOptions) -> ScanReport {
    let Discovery {
        paths,
        mut warnings,
    } = discover(patterns, options);
    let (files, read_warnings) = read_files(&paths);
    warnings.extend(read_warnings);
    ScanReport { files, warnings }
}

pub fn discover(patterns: &ContentPatterns, options: &ScanOptions) -> Discovery {
    let mut paths = BTreeSet::new();
    let mut warnings = Vec::new();

    if patterns.is_empty() {
        return Discovery::default();
    }

    let mut builder = WalkBuilder::new(&options.base_path);
    builder
        .hidden(false)
        .follow_links(options.follow_links)
        .require_git(false)
        .git_ignore(options.respect_gitignore)
        .git_global(options.respect_gitignore)
        .git_exclude(options.respect_gitignore);

    for entry in builder.build() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                let path = walk_error_path(&err).unwrap_or_else(|| options.base_path.clone());
                warn!(path = %path.display(), "skipping during scan: {}", err);
                warnings.push(Diagnostic::scan_warning(path, err.to_string()));
                continue;
            }
        };
        if !entry.file_type().is_some_and(|ft| ft.is_file()) {
            continue;
        }
        let path = entry.path();
        let relative_path = path.strip_prefix(&options.base_path).unwrap_or(path);
        if !patterns.is_match(relative_path, path) {
            continue;
        }
        if let Some(reason) = skip_reason(path, options) {
            debug!(path = %path.display(), ?reason, "skipping content file");
            continue;
        }
        paths.insert(path.to_path_buf());
    }

    debug!(files = paths.len(), "content discovery finished");
    Discovery {
        paths: paths.into_iter().collect(),
        warnings,
    }
}

pub fn stamp_files(paths: &[PathBuf]) -> (Vec<FileStamp>, Vec<Diagnostic>) {
    let results: Vec<Result<FileStamp, Diagnostic>> = paths
        .par_iter()
        .map(|path| {
            let metadata = fs::metadata(path).map_err(|err| {
                Diagnostic::scan_warning(path, format!("failed to stat: {}", err))
            })?;
            let modified_ns = metadata
                .modified()
                .ok()
                .and_then(|time| time.duration_since(UNIX_EPOCH).ok())
                .map(|duration| duration.as_nanos())
                .unwrap_or_default();
            Ok(FileStamp {
                path: path.clone(),
                len: metadata.len(),
                modified_ns,
            })
        })
        .collect();
    split_results(results)
}

/// Reads files on the rayon pool. Each worker fills its own slot; the
/// collected vector keeps input order.
pub fn read_files(paths: &[PathBuf]) -> (Vec<ScannedFile>, Vec<Diagnostic>) {
    let results: Vec<Result<ScannedFile, Diagnostic>> = paths
        .par_iter()
        .map(|path| {
            fs::read(path)
                .map(|bytes| ScannedFile {
                    path: path.clone(),
                    bytes,
                })
                .map_err(|err| Diagnostic::scan_warning(path, format!("failed to read: {}", err)))
        })
        .collect();
    split_results(results)
}

fn split_results<T>(results: Vec<Result<T, Diagnostic>>) -> (Vec<T>, Vec<Diagnostic>) {
    let mut ok = Vec::with_capacity(results.len());
    let mut warnings = Vec::new();
    for result in results {
        match result {
            Ok(value) => ok.push(value),
            Err(diagnostic) => {
                warn!("{}", diagnostic);
                warnings.push(diagnostic);
            }
        }
    }
    (ok, warnings)
}

fn walk_error_path(err: &ignore::Error) -> Option<PathBuf> {
    match err {
        ignore::Error::WithPath { path, .. } => Some(path.clone()),
        ignore::Error::WithDepth { err, .. } | ignore::Error::WithLineNumber { err, .. } => {
            walk_error_path(err)
        }
        ignore::Error::Loop { child, .. } => Some(child.clone()),
        ignore::Error::Partial(errors) => errors.iter().find_map(walk_error_path),
        _ => None,
    }
}

fn normalize_pattern(pattern: &str) -> String {
    pattern
        .trim()
        .strip_prefix("./")
        .unwrap_or(pattern.trim())
        .to_string()
}

fn build_globset(patterns: &[String]) -> Result<GlobSet, ScanError> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).map_err(|source| ScanError::InvalidPattern {
            pattern: pattern.clone(),
            source,
        })?;
        builder.add(glob);
    }
    builder.build().map_err(ScanError::GlobSet)
}

/// Matching files that only bloat a scan: they never hold class names.
const BINARY_EXTENSIONS: [&str; 12] = [
    "png", "jpg", "jpeg", "gif", "webp", "avif", "ico", "pdf", "zip", "gz", "woff", "woff2",
];

const LOCK_FILES: [&str; 6] = [
    "package-lock.json",
    "pnpm-lock.yaml",
    "yarn.lock",
    "bun.lock",
    "bun.lockb",
    "Cargo.lock",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SkipReason {
    NodeModules,
    LockFile,
    Binary,
}

fn skip_reason(path: &Path, options: &ScanOptions) -> Option<SkipReason> {
    if !options.include_node_modules
        && path.components().any(|part| part.as_os_str() == "node_modules")
    {
        return Some(SkipReason::NodeModules);
    }
    let name = path.file_name().and_then(OsStr::to_str).unwrap_or_default();
    if !options.include_lock_files && LOCK_FILES.contains(&name) {
        return Some(SkipReason::LockFile);
    }
    let binary = path
        .extension()
        .and_then(OsStr::to_str)
        .is_some_and(|ext| BINARY_EXTENSIONS.iter().any(|known| known.eq_ignore_ascii_case(ext)));
    if !options.include_binary_files && binary {
        return Some(SkipReason::Binary);
    }
    None
}
