//! Ordered, duplicate-free artifact sets
//!
//! The artifact set is the classpath-equivalent output of a nested build.
//! Order is significant: consumers resolve symbols first-entry-wins, so the
//! set keeps locations in the order the build reported them and ignores
//! later repeats of a location already present.

use crate::error::{NestError, NestResult};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};

/// Ordered collection of distinct filesystem locations
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<PathBuf>", into = "Vec<PathBuf>")]
pub struct ArtifactSet {
    entries: Vec<PathBuf>,
    seen: HashSet<PathBuf>,
}

impl ArtifactSet {
    /// Create an empty artifact set
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a location, returning false if it was already present
    pub fn insert(&mut self, location: impl Into<PathBuf>) -> bool {
        let location = location.into();
        if !self.seen.insert(location.clone()) {
            return false;
        }
        self.entries.push(location);
        true
    }

    /// Whether the set contains the given location
    pub fn contains(&self, location: &Path) -> bool {
        self.seen.contains(location)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate locations in reporting order
    pub fn iter(&self) -> std::slice::Iter<'_, PathBuf> {
        self.entries.iter()
    }

    pub fn as_slice(&self) -> &[PathBuf] {
        &self.entries
    }

    pub fn into_vec(self) -> Vec<PathBuf> {
        self.entries
    }

    /// Join into a single classpath string using the platform separator
    pub fn to_classpath(&self) -> NestResult<OsString> {
        std::env::join_paths(&self.entries)
            .map_err(|e| NestError::Internal(format!("artifact path not joinable: {}", e)))
    }
}

impl<P: Into<PathBuf>> FromIterator<P> for ArtifactSet {
    fn from_iter<I: IntoIterator<Item = P>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

impl<P: Into<PathBuf>> Extend<P> for ArtifactSet {
    fn extend<I: IntoIterator<Item = P>>(&mut self, iter: I) {
        for location in iter {
            self.insert(location);
        }
    }
}

impl From<Vec<PathBuf>> for ArtifactSet {
    fn from(entries: Vec<PathBuf>) -> Self {
        entries.into_iter().collect()
    }
}

impl From<ArtifactSet> for Vec<PathBuf> {
    fn from(set: ArtifactSet) -> Self {
        set.entries
    }
}

impl IntoIterator for ArtifactSet {
    type Item = PathBuf;
    type IntoIter = std::vec::IntoIter<PathBuf>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a> IntoIterator for &'a ArtifactSet {
    type Item = &'a PathBuf;
    type IntoIter = std::slice::Iter<'a, PathBuf>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl fmt::Display for ArtifactSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .entries
            .iter()
            .map(|p| p.display().to_string())
            .collect();
        write!(f, "[{}]", parts.join(", "))
    }
}
