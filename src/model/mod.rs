//! Model descriptions: analytic layer graphs, built-in zoo, registry.

pub mod graph;
pub mod registry;
pub mod zoo;

pub use graph::{numel, Activation, Layer, ModelGraph, Module, Shape, Stage};
pub use registry::ModelRegistry;
