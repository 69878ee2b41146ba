//! Incremental build state.
//!
//! The cache remembers three things between builds: the full rule set for a
//! scan fingerprint, the candidates each file produced keyed by its stamp,
//! and how each candidate resolved. All writes go through
//! [`IncrementalCache::commit`], so readers never observe a half-applied
//! update.

use crate::rule::{Rule, RuleSet};
use emberwind_core::{Diagnostic, DropReason};
use emberwind_scanner::FileStamp;
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Bumped whenever the persisted layout or rule semantics change.
pub const CACHE_VERSION: u32 = 2;

/// Key under which the engine persists its cache blob.
pub const CACHE_KEY: &str = "emberwind-cache-v1";

/// Hash of the configuration key and every content file's stamp.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScanFingerprint(String);

impl ScanFingerprint {
    pub fn compute(config_key: &str, stamps: &[FileStamp]) -> Self {
        let mut sorted: Vec<&FileStamp> = stamps.iter().collect();
        sorted.sort();

        let mut hasher = blake3::Hasher::new();
        hasher.update(config_key.as_bytes());
        for stamp in sorted {
            hasher.update(&[0]);
            hasher.update(stamp.path.to_string_lossy().as_bytes());
            hasher.update(&[0]);
            hasher.update(&stamp.len.to_le_bytes());
            hasher.update(&stamp.modified_ns.to_le_bytes());
        }
        Self(hasher.finalize().to_hex().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Hex digest identifying everything besides content that affects output.
pub fn config_key(parts: &[&[u8]]) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(&CACHE_VERSION.to_le_bytes());
    for part in parts {
        hasher.update(&(part.len() as u64).to_le_bytes());
        hasher.update(part);
    }
    hasher.finalize().to_hex().to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    pub stamp: FileStamp,
    pub candidates: BTreeSet<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Resolution {
    Rule(Rule),
    Dropped(DropReason),
}

impl From<Result<Rule, DropReason>> for Resolution {
    fn from(result: Result<Rule, DropReason>) -> Self {
        match result {
            Ok(rule) => Self::Rule(rule),
            Err(reason) => Self::Dropped(reason),
        }
    }
}

/// Everything one build learned, applied in a single write.
#[derive(Debug, Clone, Default)]
pub struct CacheUpdate {
    pub fingerprint: Option<ScanFingerprint>,
    pub rules: RuleSet,
    pub files: BTreeMap<PathBuf, FileRecord>,
    pub resolutions: BTreeMap<String, Resolution>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct CacheState {
    version: u32,
    config_key: String,
    fingerprint: Option<ScanFingerprint>,
    rules: RuleSet,
    files: BTreeMap<PathBuf, FileRecord>,
    resolutions: BTreeMap<String, Resolution>,
}

#[derive(Debug)]
pub struct IncrementalCache {
    state: RwLock<CacheState>,
}

impl IncrementalCache {
    pub fn new(config_key: impl Into<String>) -> Self {
        Self {
            state: RwLock::new(CacheState {
                version: CACHE_VERSION,
                config_key: config_key.into(),
                ..CacheState::default()
            }),
        }
    }

    /// The rule set of the last build, if it was produced for `fingerprint`.
    pub fn get(&self, fingerprint: &ScanFingerprint) -> Option<RuleSet> {
        let state = self.state.read();
        match &state.fingerprint {
            Some(stored) if stored == fingerprint => Some(state.rules.clone()),
            _ => None,
        }
    }

    pub fn put(&self, fingerprint: ScanFingerprint, rules: RuleSet) {
        let mut state = self.state.write();
        state.fingerprint = Some(fingerprint);
        state.rules = rules;
    }

    /// Candidates previously extracted from a file with this exact stamp.
    pub fn file_candidates(&self, stamp: &FileStamp) -> Option<BTreeSet<String>> {
        let state = self.state.read();
        state
            .files
            .get(&stamp.path)
            .filter(|record| record.stamp.same_signature(stamp))
            .map(|record| record.candidates.clone())
    }

    pub fn resolution(&self, candidate: &str) -> Option<Resolution> {
        self.state.read().resolutions.get(candidate).cloned()
    }

    /// Dropped candidates recorded by the last commit, in candidate order.
    pub fn dropped(&self) -> Vec<(String, DropReason)> {
        self.state
            .read()
            .resolutions
            .iter()
            .filter_map(|(candidate, resolution)| match resolution {
                Resolution::Dropped(reason) => Some((candidate.clone(), reason.clone())),
                Resolution::Rule(_) => None,
            })
            .collect()
    }

    pub fn commit(&self, update: CacheUpdate) {
        let mut state = self.state.write();
        state.fingerprint = update.fingerprint;
        state.rules = update.rules;
        state.files = update.files;
        state.resolutions = update.resolutions;
        debug!(
            files = state.files.len(),
            candidates = state.resolutions.len(),
            rules = state.rules.len(),
            "committed cache update"
        );
    }

    pub fn clear(&self) {
        let mut state = self.state.write();
        let config_key = std::mem::take(&mut state.config_key);
        *state = CacheState {
            version: CACHE_VERSION,
            config_key,
            ..CacheState::default()
        };
    }

    pub fn is_empty(&self) -> bool {
        let state = self.state.read();
        state.fingerprint.is_none() && state.files.is_empty() && state.resolutions.is_empty()
    }

    pub fn file_count(&self) -> usize {
        self.state.read().files.len()
    }

    pub fn to_blob(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(&*self.state.read())
    }

    /// Restores a persisted cache. A blob from another version or another
    /// configuration, or one that does not parse, yields an empty cache and
    /// the reason it was discarded.
    pub fn from_blob(config_key: &str, blob: &[u8]) -> (Self, Option<Diagnostic>) {
        let state: CacheState = match serde_json::from_slice(blob) {
            Ok(state) => state,
            Err(err) => {
                return (
                    Self::new(config_key),
                    Some(Diagnostic::cache_invalid(format!("unreadable cache: {}", err))),
                );
            }
        };
        if state.version != CACHE_VERSION {
            let reason = format!(
                "cache version {} does not match {}",
                state.version, CACHE_VERSION
            );
            return (Self::new(config_key), Some(Diagnostic::cache_invalid(reason)));
        }
        if state.config_key != config_key {
            return (
                Self::new(config_key),
                Some(Diagnostic::cache_invalid("configuration changed")),
            );
        }
        (
            Self {
                state: RwLock::new(state),
            },
            None,
        )
    }
}

/// Where persisted cache blobs live between processes.
pub trait CacheStore: Send + Sync {
    fn load(&self, key: &str) -> io::Result<Option<Vec<u8>>>;
    fn store(&self, key: &str, blob: &[u8]) -> io::Result<()>;
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    blobs: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CacheStore for MemoryStore {
    fn load(&self, key: &str) -> io::Result<Option<Vec<u8>>> {
        Ok(self.blobs.lock().get(key).cloned())
    }

    fn store(&self, key: &str, blob: &[u8]) -> io::Result<()> {
        self.blobs.lock().insert(key.to_string(), blob.to_vec());
        Ok(())
    }
}

/// One `<key>.json` file per blob inside a directory.
#[derive(Debug, Clone)]
pub struct DirStore {
    dir: PathBuf,
}

impl DirStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl CacheStore for DirStore {
    fn load(&self, key: &str) -> io::Result<Option<Vec<u8>>> {
        match fs::read(self.path_for(key)) {
            Ok(blob) => Ok(Some(blob)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err),
        }
    }

    fn store(&self, key: &str, blob: &[u8]) -> io::Result<()> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(key);
        let staging = path.with_extension("json.tmp");
        fs::write(&staging, blob)?;
        fs::rename(&staging, &path)
    }
}

#[cfg(test)]
mod tests {
    use super::{
        CACHE_KEY, CacheStore, CacheUpdate, DirStore, FileRecord, IncrementalCache, MemoryStore,
        Resolution, ScanFingerprint, config_key,
    };
    use crate::rule::RuleSet;
    use emberwind_core::{Diagnostic, DropReason};
    use emberwind_scanner::FileStamp;
    use std::collections::{BTreeMap, BTreeSet};
    use std::path::PathBuf;

    fn stamp(path: &str, len: u64, modified_ns: u128) -> FileStamp {
        FileStamp {
            path: PathBuf::from(path),
            len,
            modified_ns,
        }
    }

    fn update_with(stamp: FileStamp, candidates: &[&str], fingerprint: ScanFingerprint) -> CacheUpdate {
        let mut files = BTreeMap::new();
        files.insert(
            stamp.path.clone(),
            FileRecord {
                stamp,
                candidates: candidates.iter().map(|c| c.to_string()).collect(),
            },
        );
        let mut resolutions = BTreeMap::new();
        resolutions.insert(
            "nope".to_string(),
            Resolution::Dropped(DropReason::UnknownUtility),
        );
        CacheUpdate {
            fingerprint: Some(fingerprint),
            rules: RuleSet::default(),
            files,
            resolutions,
        }
    }

    #[test]
    fn fingerprint_ignores_stamp_order_but_not_content() {
        let a = stamp("a.html", 10, 1);
        let b = stamp("b.html", 20, 2);
        let forward = ScanFingerprint::compute("key", &[a.clone(), b.clone()]);
        let backward = ScanFingerprint::compute("key", &[b.clone(), a.clone()]);
        assert_eq!(forward, backward);

        let touched = ScanFingerprint::compute("key", &[a.clone(), stamp("b.html", 21, 2)]);
        assert_ne!(forward, touched);
        assert_ne!(forward, ScanFingerprint::compute("other", &[a, b]));
    }

    #[test]
    fn config_key_separates_parts() {
        assert_ne!(config_key(&[b"ab", b"c"]), config_key(&[b"a", b"bc"]));
        assert_eq!(config_key(&[b"x"]), config_key(&[b"x"]));
    }

    #[test]
    fn get_only_hits_matching_fingerprint() {
        let cache = IncrementalCache::new("key");
        let fingerprint = ScanFingerprint::compute("key", &[]);
        assert!(cache.get(&fingerprint).is_none());

        cache.put(fingerprint.clone(), RuleSet::default());
        assert_eq!(cache.get(&fingerprint), Some(RuleSet::default()));
        assert!(cache.get(&ScanFingerprint::compute("key", &[stamp("x", 1, 1)])).is_none());
    }

    #[test]
    fn file_candidates_require_same_signature() {
        let cache = IncrementalCache::new("key");
        let original = stamp("a.html", 10, 5);
        cache.commit(update_with(
            original.clone(),
            &["p-4", "m-2"],
            ScanFingerprint::compute("key", &[original.clone()]),
        ));

        let hit = cache.file_candidates(&original).expect("unchanged file hits");
        assert_eq!(hit, BTreeSet::from(["m-2".to_string(), "p-4".to_string()]));
        assert!(cache.file_candidates(&stamp("a.html", 11, 5)).is_none());
        assert!(cache.file_candidates(&stamp("a.html", 10, 6)).is_none());
        assert!(cache.file_candidates(&stamp("b.html", 10, 5)).is_none());
        assert_eq!(cache.dropped(), vec![("nope".to_string(), DropReason::UnknownUtility)]);
    }

    #[test]
    fn blob_round_trip_restores_state() {
        let cache = IncrementalCache::new("key");
        let original = stamp("a.html", 10, 5);
        let fingerprint = ScanFingerprint::compute("key", &[original.clone()]);
        cache.commit(update_with(original.clone(), &["p-4"], fingerprint.clone()));

        let blob = cache.to_blob().expect("serializes");
        let (restored, diagnostic) = IncrementalCache::from_blob("key", &blob);
        assert!(diagnostic.is_none());
        assert!(restored.get(&fingerprint).is_some());
        assert!(restored.file_candidates(&original).is_some());
        assert_eq!(restored.file_count(), 1);
    }

    #[test]
    fn mismatched_or_corrupt_blobs_are_discarded() {
        let cache = IncrementalCache::new("key");
        let blob = cache.to_blob().expect("serializes");

        let (restored, diagnostic) = IncrementalCache::from_blob("different", &blob);
        assert!(restored.is_empty());
        assert_eq!(
            diagnostic,
            Some(Diagnostic::cache_invalid("configuration changed"))
        );

        let text = String::from_utf8(blob).expect("json is utf-8");
        let older = text.replacen("\"version\":2", "\"version\":1", 1);
        assert_ne!(older, text);
        let (restored, diagnostic) = IncrementalCache::from_blob("key", older.as_bytes());
        assert!(restored.is_empty());
        assert!(matches!(diagnostic, Some(Diagnostic::CacheInvalid { .. })));

        let (restored, diagnostic) = IncrementalCache::from_blob("key", b"{not json");
        assert!(restored.is_empty());
        assert!(matches!(diagnostic, Some(Diagnostic::CacheInvalid { .. })));
    }

    #[test]
    fn clear_keeps_config_key() {
        let cache = IncrementalCache::new("key");
        cache.put(ScanFingerprint::compute("key", &[]), RuleSet::default());
        cache.clear();
        assert!(cache.is_empty());
        let (_, diagnostic) =
            IncrementalCache::from_blob("key", &cache.to_blob().expect("serializes"));
        assert!(diagnostic.is_none());
    }

    #[test]
    fn stores_round_trip_blobs() {
        let memory = MemoryStore::new();
        assert_eq!(memory.load(CACHE_KEY).expect("load"), None);
        memory.store(CACHE_KEY, b"blob").expect("store");
        assert_eq!(memory.load(CACHE_KEY).expect("load"), Some(b"blob".to_vec()));

        let dir = tempfile::tempdir().expect("temp dir");
        let store = DirStore::new(dir.path().join("cache"));
        assert_eq!(store.load(CACHE_KEY).expect("missing is not an error"), None);
        store.store(CACHE_KEY, b"blob").expect("store");
        assert_eq!(store.load(CACHE_KEY).expect("load"), Some(b"blob".to_vec()));
        assert!(store.dir().join("emberwind-cache-v1.json").is_file());
    }
}
