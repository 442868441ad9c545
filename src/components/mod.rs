//! Reusable components.

pub mod dependency_graph;
