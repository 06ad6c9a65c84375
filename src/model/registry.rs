//! Model zoo registry: named architectures resolved to layer graphs.

use crate::errors::FlopscopeError;
use crate::model::graph::ModelGraph;
use crate::model::zoo;
use std::collections::BTreeMap;

type ModelBuilder = fn() -> ModelGraph;

/// Registry of named model builders. Use [ModelRegistry::create] to
/// resolve a configured identifier to a concrete architecture.
#[derive(Default)]
pub struct ModelRegistry {
    entries: BTreeMap<String, ModelBuilder>,
}

impl ModelRegistry {
    /// New empty registry.
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Registry with all built-in architectures.
    pub fn builtin() -> Self {
        let mut r = Self::new();
        r.register("resnet18", zoo::resnet18);
        r.register("resnet34", zoo::resnet34);
        r.register("resnet50", zoo::resnet50);
        r.register("vgg11", zoo::vgg11);
        r.register("vgg16", zoo::vgg16);
        r.register("vit_tiny_patch16_224", zoo::vit_tiny_patch16_224);
        r.register("vit_small_patch16_224", zoo::vit_small_patch16_224);
        r.register("vit_base_patch16_224", zoo::vit_base_patch16_224);
        r.register("simple_cnn", zoo::simple_cnn);
        r
    }

    /// Register a builder by name. Overwrites if the name exists.
    pub fn register(&mut self, name: impl Into<String>, builder: ModelBuilder) {
        self.entries.insert(name.into(), builder);
    }

    /// All registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    /// Build the named model. Unknown names fail with the list of
    /// registered names in the message.
    pub fn create(&self, name: &str) -> Result<ModelGraph, FlopscopeError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(FlopscopeError::InvalidInput(
                "model name must not be empty".to_string(),
            ));
        }
        match self.entries.get(name) {
            Some(builder) => Ok(builder()),
            None => Err(FlopscopeError::UnknownModel(format!(
                "{}. Registered models: {}",
                name,
                self.names().join(", ")
            ))),
        }
    }
}
