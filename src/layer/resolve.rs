//! Layer dependency resolution
//!
//! Layers live in an arena owned by `LayerRegistry`; dependency edges are
//! arena indices. A layer is registered before its dependencies are
//! resolved, so every identifier maps to exactly one layer and shared
//! dependencies are reached through the same index.
//!
//! Per layer: `Unresolved -> Resolving -> Resolved -> Writing -> Written`.
//! Reaching a layer that is still `Resolving` means its `DEP` chain loops
//! back on itself, which aborts resolution.

use crate::error::{SliceError, SliceResult};
use crate::slice::{Slice, SliceRegistry};
use crate::version::VersionIdentifier;
use tracing::debug;

/// Where a layer is in resolution and merging
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerState {
    Unresolved,
    Resolving,
    Resolved,
    Writing,
    Written,
}

/// A slice wrapped with its resolved dependencies
#[derive(Debug)]
pub struct Layer {
    slice: Slice,
    dependencies: Vec<usize>,
    state: LayerState,
}

impl Layer {
    fn new(slice: Slice) -> Self {
        Self {
            slice,
            dependencies: Vec::new(),
            state: LayerState::Unresolved,
        }
    }

    pub fn slice(&self) -> &Slice {
        &self.slice
    }

    pub fn identifier(&self) -> &VersionIdentifier {
        self.slice.identifier()
    }

    /// Arena indices of direct dependencies, in declaration order
    pub fn dependencies(&self) -> &[usize] {
        &self.dependencies
    }

    pub fn state(&self) -> LayerState {
        self.state
    }

    pub fn is_missing(&self) -> bool {
        self.slice.is_missing()
    }

    /// Whether an existing layer can answer a lookup for `identifier`.
    ///
    /// Missing layers only answer for the exact identifier they stand in
    /// for; a lower version may still exist in the registry.
    fn answers(&self, identifier: &VersionIdentifier) -> bool {
        if self.slice.is_missing() {
            self.identifier() == identifier
        } else {
            self.identifier().satisfies(identifier)
        }
    }

    /// Append own content: every non-metadata section as a keyword line,
    /// an origin comment, then the body
    fn write_content(&self, lines: &mut Vec<String>) {
        for section in self
            .slice
            .sections()
            .iter()
            .filter(|s| !s.kind().is_metadata())
        {
            lines.push(String::new());
            lines.push(section.kind().to_string());
            lines.push(format!("# {}", self.identifier()));
            lines.extend(section.lines().iter().cloned());
        }
    }
}

/// All layers reachable from one request
#[derive(Debug)]
pub struct LayerRegistry {
    slices: SliceRegistry,
    layers: Vec<Layer>,
    os: VersionIdentifier,
    os_layer: usize,
    resolving: Vec<usize>,
}

impl LayerRegistry {
    /// Resolve `requested` layers and the `os` prerequisite.
    ///
    /// Index 0 is the first requested layer. Further requested layers
    /// become its leading dependencies, last request first.
    pub fn new(
        slices: SliceRegistry,
        requested: &[VersionIdentifier],
        os: VersionIdentifier,
    ) -> SliceResult<Self> {
        let Some((first, rest)) = requested.split_first() else {
            return Err(SliceError::NoLayersRequested);
        };

        let mut registry = Self {
            slices,
            layers: Vec::new(),
            os,
            os_layer: 0,
            resolving: Vec::new(),
        };

        let requested_indices: Vec<usize> =
            requested.iter().map(|id| registry.find_layer(id)).collect();

        // The OS closure resolves first so its own dependencies never
        // point back at it
        registry.os_layer = registry.resolve_os_layer()?;

        for &index in &requested_indices {
            registry.find_dependencies_recursive(index)?;
        }

        let head = registry.find_layer(first);
        for identifier in rest.iter().rev() {
            let index = registry.find_layer(identifier);
            if index != head {
                registry.insert_leading_dependency(head, index);
            }
        }

        debug!(
            "Resolved {} layer(s) for {}, {} missing",
            registry.layers.len(),
            first,
            registry.missing_identifiers().len()
        );
        Ok(registry)
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Layer by arena index; index 0 is the first requested layer
    pub fn layer(&self, index: usize) -> &Layer {
        &self.layers[index]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Layer> {
        self.layers.iter()
    }

    /// The OS prerequisite layer (an empty placeholder without an OS)
    pub fn os_layer(&self) -> &Layer {
        &self.layers[self.os_layer]
    }

    /// Every identifier no slice could satisfy, first failure first
    pub fn missing_identifiers(&self) -> &[VersionIdentifier] {
        self.slices.missing_identifiers()
    }

    /// Look up or register the layer for `identifier`
    pub fn find_layer(&mut self, identifier: &VersionIdentifier) -> usize {
        if let Some(index) = self.layers.iter().position(|l| l.answers(identifier)) {
            return index;
        }

        let slice = self.slices.find_slice(identifier);
        self.layers.push(Layer::new(slice));
        self.layers.len() - 1
    }

    /// Merge the OS layer, then the first requested layer and everything
    /// it depends on. Each layer is emitted at most once.
    pub fn merge(&mut self) -> Vec<String> {
        let mut lines = Vec::new();
        self.write(self.os_layer, &mut lines);
        if !self.layers.is_empty() {
            self.write(0, &mut lines);
        }
        lines
    }

    /// Write one layer after its dependencies, last declared first.
    ///
    /// A layer already being written is skipped, which breaks loops
    /// introduced by requesting a layer together with its dependents.
    pub fn write(&mut self, index: usize, lines: &mut Vec<String>) {
        match self.layers[index].state {
            LayerState::Writing | LayerState::Written => return,
            _ => {}
        }
        self.layers[index].state = LayerState::Writing;

        let dependencies = self.layers[index].dependencies.clone();
        for &dependency in dependencies.iter().rev() {
            self.write(dependency, lines);
        }

        self.layers[index].write_content(lines);
        self.layers[index].state = LayerState::Written;
    }

    /// The OS layer with its dependencies resolved, or an empty
    /// placeholder when no OS was requested
    fn resolve_os_layer(&mut self) -> SliceResult<usize> {
        if self.os.name().is_empty() {
            self.layers.push(Layer {
                slice: Slice::Empty(self.os.clone()),
                dependencies: Vec::new(),
                state: LayerState::Resolved,
            });
            return Ok(self.layers.len() - 1);
        }

        let os = self.os.clone();
        let index = self.find_layer(&os);
        self.find_dependencies_recursive(index)?;
        Ok(index)
    }

    fn add_dependency(&mut self, index: usize, dependency: usize) {
        let dependencies = &mut self.layers[index].dependencies;
        if !dependencies.contains(&dependency) {
            dependencies.push(dependency);
        }
    }

    fn insert_leading_dependency(&mut self, index: usize, dependency: usize) {
        let dependencies = &mut self.layers[index].dependencies;
        dependencies.retain(|&d| d != dependency);
        dependencies.insert(0, dependency);
    }

    fn find_dependencies_recursive(&mut self, index: usize) -> SliceResult<()> {
        match self.layers[index].state {
            LayerState::Unresolved => {}
            LayerState::Resolving => return Err(self.cycle_error(index)),
            _ => return Ok(()),
        }
        self.layers[index].state = LayerState::Resolving;
        self.resolving.push(index);

        let slice = self.layers[index].slice.clone();
        for identifier in slice.dependency_identifiers() {
            let dependency = self.find_layer(identifier);
            self.add_dependency(index, dependency);
        }

        let own_name = slice.identifier().name();
        let needs_os = !self.os.name().is_empty()
            && own_name != self.os.name()
            && slice
                .os_identifiers()
                .iter()
                .any(|entry| entry.name() == self.os.name());
        if needs_os {
            let os = self.os.clone();
            let dependency = self.find_layer(&os);
            // Layers the OS itself needs are written before it anyway
            if !self.resolving.contains(&dependency) {
                self.add_dependency(index, dependency);
            }
        }

        let dependencies = self.layers[index].dependencies.clone();
        for dependency in dependencies {
            self.find_dependencies_recursive(dependency)?;
        }

        self.resolving.pop();
        self.layers[index].state = LayerState::Resolved;
        Ok(())
    }

    fn cycle_error(&self, index: usize) -> SliceError {
        let start = self
            .resolving
            .iter()
            .position(|&i| i == index)
            .unwrap_or_default();
        let chain: Vec<String> = self.resolving[start..]
            .iter()
            .chain(std::iter::once(&index))
            .map(|&i| self.layers[i].identifier().to_string())
            .collect();
        SliceError::DependencyCycle(chain.join(" -> "))
    }
}
