//! Upfront analysis of the declared service table

pub mod dependency_graph;

pub use dependency_graph::{DependencyGraph, DependencyNode};
