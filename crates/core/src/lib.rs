//! Diagnostics shared by the emberwind scanner and engine.
//!
//! Nothing in here is fatal. Fatal problems are configuration errors and live
//! next to the configuration types in the `emberwind` crate.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// A non-fatal problem observed during a build.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Diagnostic {
    /// A file or directory could not be visited or read. The scan continued.
    ScanWarning { path: PathBuf, message: String },
    /// A candidate produced no rule.
    CandidateDropped { candidate: String, reason: DropReason },
    /// The persisted cache was discarded and a full rebuild was performed.
    CacheInvalid { reason: String },
}

impl Diagnostic {
    pub fn scan_warning(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::ScanWarning {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn dropped(candidate: impl Into<String>, reason: DropReason) -> Self {
        Self::CandidateDropped {
            candidate: candidate.into(),
            reason,
        }
    }

    pub fn cache_invalid(reason: impl Into<String>) -> Self {
        Self::CacheInvalid {
            reason: reason.into(),
        }
    }

    pub fn is_scan_warning(&self) -> bool {
        matches!(self, Self::ScanWarning { .. })
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ScanWarning { path, message } => {
                write!(f, "skipped {}: {}", path.display(), message)
            }
            Self::CandidateDropped { candidate, reason } => {
                write!(f, "dropped candidate '{}': {}", candidate, reason)
            }
            Self::CacheInvalid { reason } => write!(f, "cache discarded: {}", reason),
        }
    }
}

/// Why a candidate did not turn into a rule.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DropReason {
    /// No utility matches the base name.
    UnknownUtility,
    /// The variant chain references an identifier no resolver knows.
    UnknownVariant(String),
    /// An arbitrary value does not fit the utility's value grammar.
    InvalidArbitraryValue(String),
    /// A `-` prefix on a utility that has no negative form.
    NegativeNotSupported,
    /// A `/modifier` on a utility that takes none, or an unparseable modifier.
    InvalidModifier(String),
    /// The candidate text itself does not follow the class grammar.
    Malformed,
}

impl DropReason {
    /// Unknown utilities are the normal fate of prose and identifiers found
    /// in scanned text; everything else points at a likely typo.
    pub fn is_noise(&self) -> bool {
        matches!(self, Self::UnknownUtility | Self::Malformed)
    }
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownUtility => f.write_str("unknown utility"),
            Self::UnknownVariant(variant) => write!(f, "unknown variant '{}'", variant),
            Self::InvalidArbitraryValue(value) => {
                write!(f, "invalid arbitrary value '{}'", value)
            }
            Self::NegativeNotSupported => f.write_str("utility has no negative form"),
            Self::InvalidModifier(modifier) => write!(f, "invalid modifier '{}'", modifier),
            Self::Malformed => f.write_str("malformed candidate"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Diagnostic, DropReason};

    #[test]
    fn renders_human_readable_messages() {
        let warning = Diagnostic::scan_warning("src/a.html", "permission denied");
        assert_eq!(warning.to_string(), "skipped src/a.html: permission denied");

        let dropped = Diagnostic::dropped(
            "wiggle:p-4",
            DropReason::UnknownVariant("wiggle".to_string()),
        );
        assert_eq!(
            dropped.to_string(),
            "dropped candidate 'wiggle:p-4': unknown variant 'wiggle'"
        );
    }

    #[test]
    fn unknown_utilities_are_noise() {
        assert!(DropReason::UnknownUtility.is_noise());
        assert!(!DropReason::InvalidArbitraryValue("x".to_string()).is_noise());
    }
}
