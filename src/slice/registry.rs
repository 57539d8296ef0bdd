//! Flat registry of scanned slices
//!
//! Lookups return the first slice whose identifier satisfies the request,
//! so after `sort()` the highest compatible version wins. Failed lookups
//! are remembered once each, in the order they first failed.

use crate::error::{SliceError, SliceResult};
use crate::slice::Slice;
use crate::version::VersionIdentifier;
use std::collections::HashSet;
use tracing::debug;

/// Slices keyed by unique identifier
#[derive(Debug, Default)]
pub struct SliceRegistry {
    slices: Vec<Slice>,
    identifiers: HashSet<VersionIdentifier>,
    missing: Vec<VersionIdentifier>,
}

impl SliceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a slice. Two slices with the same identifier are an error.
    pub fn add(&mut self, slice: Slice) -> SliceResult<()> {
        if !self.identifiers.insert(slice.identifier().clone()) {
            return Err(SliceError::DuplicateSlice {
                identifier: slice.identifier().to_string(),
                path: slice.relative_path().to_string(),
            });
        }
        self.slices.push(slice);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.slices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slices.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Slice> {
        self.slices.iter()
    }

    /// Identifiers that failed lookup, first failure first
    pub fn missing_identifiers(&self) -> &[VersionIdentifier] {
        &self.missing
    }

    /// Most recent first: bunch version, then name version, then name
    pub fn sort(&mut self) {
        self.slices.sort_by(|a, b| b.identifier().cmp(a.identifier()));
    }

    /// Find the first slice satisfying `identifier`.
    ///
    /// Returns `Slice::Missing` and records the identifier when nothing
    /// matches.
    pub fn find_slice(&mut self, identifier: &VersionIdentifier) -> Slice {
        if let Some(slice) = self
            .slices
            .iter()
            .find(|slice| slice.identifier().satisfies(identifier))
        {
            return slice.clone();
        }

        if !self.missing.contains(identifier) {
            debug!("Slice not found: {}", identifier);
            self.missing.push(identifier.clone());
        }
        Slice::Missing(identifier.clone())
    }

    /// Look up several identifiers, dropping repeated results
    pub fn find_slices(&mut self, identifiers: &[VersionIdentifier]) -> Vec<Slice> {
        let mut found: Vec<Slice> = Vec::new();
        for identifier in identifiers {
            let slice = self.find_slice(identifier);
            if !found.contains(&slice) {
                found.push(slice);
            }
        }
        found
    }

    /// Slices whose name contains any of `queries` (all slices when empty)
    pub fn matching<'a>(&'a self, queries: &'a [String]) -> impl Iterator<Item = &'a Slice> {
        self.slices.iter().filter(move |slice| {
            queries.is_empty()
                || queries
                    .iter()
                    .any(|q| slice.identifier().name().contains(&q.to_lowercase()))
        })
    }
}
