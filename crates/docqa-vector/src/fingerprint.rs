use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;

/// Identity of an input file set: blake3 hex over the JSON list of sorted,
/// de-duplicated path strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn from_hex(hex: impl Into<String>) -> Self {
        Self(hex.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub fn fingerprint(paths: &[PathBuf]) -> Fingerprint {
    let sorted: BTreeSet<String> = paths.iter().map(|p| p.to_string_lossy().into_owned()).collect();
    let names: Vec<&String> = sorted.iter().collect();
    // A list of strings always serializes.
    let encoded = serde_json::to_vec(&names).unwrap_or_default();
    Fingerprint(blake3::hash(&encoded).to_hex().to_string())
}
