//! Transformation registry for lookup by annotation kind.

use crate::transform::{DynTransformFactory, TransformFactory};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("no transformation registered for annotation kind \"{0}\"")]
    NotFound(String),
}

#[derive(Default, Clone)]
pub struct TransformRegistry {
    factories: Vec<DynTransformFactory>,
}

impl TransformRegistry {
    pub fn new() -> Self {
        Self {
            factories: Vec::new(),
        }
    }

    pub fn with_default_transforms() -> Self {
        let mut registry = Self::new();
        registry.register(crate::builtin::Passthrough::new());
        registry.register(crate::builtin::Reindent::new());
        registry.register(crate::builtin::Substitute::new());
        registry
    }

    /// Register a factory. A later registration shadows an earlier one of
    /// the same name.
    pub fn register<F>(&mut self, factory: F)
    where
        F: TransformFactory + 'static,
    {
        self.factories.push(Arc::new(factory));
    }

    pub fn transforms(&self) -> &[DynTransformFactory] {
        &self.factories
    }

    pub fn find(&self, name: &str) -> Option<DynTransformFactory> {
        self.factories
            .iter()
            .rev()
            .find(|factory| factory.name() == name)
            .map(Arc::clone)
    }

    pub fn resolve(&self, name: &str) -> Result<DynTransformFactory, RegistryError> {
        self.find(name)
            .ok_or_else(|| RegistryError::NotFound(name.to_string()))
    }
}
