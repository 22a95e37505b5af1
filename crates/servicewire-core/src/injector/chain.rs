//! Per-resolution trace used for cycle detection

use crate::core::{InjectorResult, InstantiationError};
use std::collections::HashSet;

/// Trace of one resolution path.
///
/// `resolutions` holds every identifier visited on the path (bindings
/// included) for O(1) cycle checks, while `chain` only records the concrete
/// targets in the order they were reached.
#[derive(Debug, Clone, Default)]
pub struct InjectionChain {
    chain: Vec<String>,
    resolutions: HashSet<String>,
}

impl InjectionChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a resolved target to the trace
    pub fn add_to_chain(&mut self, class: &str) -> &mut Self {
        self.chain.push(class.to_string());
        self
    }

    /// Mark an identifier as visited on this path
    pub fn add_resolution(&mut self, resolution: &str) -> &mut Self {
        self.resolutions.insert(resolution.to_string());
        self
    }

    pub fn has_resolution(&self, resolution: &str) -> bool {
        self.resolutions.contains(resolution)
    }

    /// The most recently resolved target
    pub fn current_target(&self) -> InjectorResult<&str> {
        self.chain
            .last()
            .map(String::as_str)
            .ok_or(InstantiationError::EmptyInjectionChain)
    }

    /// Resolved targets, most recent first
    pub fn chain(&self) -> Vec<String> {
        self.chain.iter().rev().cloned().collect()
    }
}
