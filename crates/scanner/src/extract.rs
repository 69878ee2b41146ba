use crate::ScannedFile;
use rayon::prelude::*;
use std::collections::BTreeSet;
use std::path::PathBuf;

const MAX_CANDIDATE_LEN: usize = 256;

/// Turns file content into candidate class names.
///
/// Implementations must be pure in `bytes`: the engine caches results per
/// file signature and never re-runs extraction for an unchanged file.
pub trait Extractor: Send + Sync {
    fn extract(&self, bytes: &[u8]) -> BTreeSet<String>;
}

/// The default syntax-agnostic tokenizer. See [`extract_candidates`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenExtractor;

impl Extractor for TokenExtractor {
    fn extract(&self, bytes: &[u8]) -> BTreeSet<String> {
        extract_candidates(bytes)
    }
}

/// Runs `extractor` over every file on the rayon pool and returns one slot
/// per input file, in input order.
pub fn extract_all<E>(files: &[ScannedFile], extractor: &E) -> Vec<(PathBuf, BTreeSet<String>)>
where
    E: Extractor + ?Sized,
{
    files
        .par_iter()
        .map(|file| (file.path.clone(), extractor.extract(&file.bytes)))
        .collect()
}

/// Splits arbitrary text into maximal runs of class-name characters.
///
/// Outside brackets the alphabet is ASCII alphanumerics plus `- _ : / . % ! #`.
/// A `[` opens an arbitrary segment that keeps any byte except whitespace,
/// double quotes, backticks and angle brackets until the matching `]`. A span
/// that cannot be closed yields nothing, and scanning resumes right after the
/// unclosed `[`.
pub fn extract_candidates(bytes: &[u8]) -> BTreeSet<String> {
    let mut out = BTreeSet::new();
    let mut idx = 0;

    while idx < bytes.len() {
        let byte = bytes[idx];
        let opens_segment =
            byte == b'[' && bytes.get(idx + 1).is_some_and(|&next| opens_leading(next));
        if !is_class_byte(byte) && !opens_segment {
            idx += 1;
            continue;
        }
        let (end, unclosed) = scan_run(bytes, idx);
        if let Some(open) = unclosed {
            // Resume after the stray `[` so the words behind it still count.
            idx = open + 1;
            continue;
        }
        if let Some(token) = finish_token(&bytes[idx..end]) {
            out.insert(token);
        }
        idx = end.max(idx + 1);
    }

    out
}

/// Returns the end of the run and, when a bracket never closes, the
/// position of the outermost unclosed `[`.
fn scan_run(bytes: &[u8], start: usize) -> (usize, Option<usize>) {
    let mut depth = 0usize;
    let mut opened_at = start;
    let mut pos = start;

    while pos < bytes.len() {
        let byte = bytes[pos];
        if depth > 0 {
            match byte {
                b'[' => depth += 1,
                b']' => depth -= 1,
                _ if is_arbitrary_byte(byte) => {}
                _ => break,
            }
        } else if byte == b'[' {
            depth = 1;
            opened_at = pos;
        } else if !is_class_byte(byte) {
            break;
        }
        pos += 1;
    }

    (pos, (depth > 0).then_some(opened_at))
}

fn finish_token(raw: &[u8]) -> Option<String> {
    let mut start = 0;
    let mut end = raw.len();
    while start < end && matches!(raw[start], b'.' | b':' | b'/') {
        start += 1;
    }
    while end > start && matches!(raw[end - 1], b'.' | b':' | b'/' | b'-') {
        end -= 1;
    }
    let trimmed = &raw[start..end];

    if trimmed.is_empty() || trimmed.len() > MAX_CANDIDATE_LEN {
        return None;
    }
    if !trimmed.iter().any(u8::is_ascii_alphabetic) {
        return None;
    }
    String::from_utf8(trimmed.to_vec()).ok()
}

/// A `[` that starts a token must open an arbitrary property or variant
/// (`[mask-type:…]`, `[&…]`, `[@…]`); otherwise it is punctuation such as
/// an array literal.
fn opens_leading(next: u8) -> bool {
    next.is_ascii_alphabetic() || matches!(next, b'&' | b'@' | b'-' | b'_' | b'.' | b':' | b'*')
}

fn is_class_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric()
        || matches!(byte, b'-' | b'_' | b':' | b'/' | b'.' | b'%' | b'!' | b'#')
}

fn is_arbitrary_byte(byte: u8) -> bool {
    !(byte.is_ascii_whitespace()
        || byte.is_ascii_control()
        || matches!(byte, b'"' | b'`' | b'<' | b'>'))
}
