//! Dependency graph of declared services

use crate::core::ServiceError;
use indexmap::IndexMap;
use std::collections::HashSet;

/// Node in the dependency graph
#[derive(Debug, Clone)]
pub struct DependencyNode {
    pub id: String,
    pub dependencies: Vec<String>,
}

/// Declared services and the service ids they depend on.
///
/// Built before anything is instantiated, so a broken table fails before
/// the first constructor runs.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    nodes: IndexMap<String, DependencyNode>,
}

impl DependencyGraph {
    /// Create a new empty dependency graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node to the graph
    pub fn add_node<I, S>(&mut self, id: impl Into<String>, dependencies: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let id = id.into();
        let mut node = DependencyNode {
            id: id.clone(),
            dependencies: Vec::new(),
        };
        for dependency in dependencies {
            let dependency = dependency.into();
            if !node.dependencies.contains(&dependency) {
                node.dependencies.push(dependency);
            }
        }
        self.nodes.insert(id, node);
    }

    /// Get a node from the graph
    pub fn get_node(&self, id: &str) -> Option<&DependencyNode> {
        self.nodes.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    /// Node ids in insertion order
    pub fn node_ids(&self) -> impl Iterator<Item = &str> {
        self.nodes.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Check every dependency names a node of the graph
    pub fn validate_references(&self) -> Result<(), ServiceError> {
        for node in self.nodes.values() {
            if let Some(dependency) = node.dependencies.iter().find(|d| !self.contains(d)) {
                return Err(ServiceError::MissingService {
                    service: node.id.clone(),
                    dependency: dependency.clone(),
                });
            }
        }
        Ok(())
    }

    /// Detect circular dependencies using depth-first search
    ///
    /// The error carries the cycle as a path that starts and ends with the
    /// same id.
    pub fn detect_circular_dependencies(&self) -> Result<(), ServiceError> {
        let mut visited = HashSet::new();
        let mut stack = Vec::new();

        for id in self.nodes.keys() {
            if !visited.contains(id.as_str()) {
                self.detect_cycle_dfs(id, &mut visited, &mut stack)?;
            }
        }

        Ok(())
    }

    /// DFS helper for cycle detection
    fn detect_cycle_dfs<'a>(
        &'a self,
        id: &'a str,
        visited: &mut HashSet<&'a str>,
        stack: &mut Vec<&'a str>,
    ) -> Result<(), ServiceError> {
        visited.insert(id);
        stack.push(id);

        if let Some(node) = self.nodes.get(id) {
            for dependency in &node.dependencies {
                let on_stack = stack.iter().position(|entry| *entry == dependency.as_str());
                if let Some(start) = on_stack {
                    let mut cycle: Vec<String> =
                        stack[start..].iter().map(|entry| entry.to_string()).collect();
                    cycle.push(dependency.clone());
                    return Err(ServiceError::CircularDependency { cycle });
                }
                if !visited.contains(dependency.as_str()) {
                    self.detect_cycle_dfs(dependency, visited, stack)?;
                }
            }
        }

        stack.pop();
        Ok(())
    }
}
