use crate::model::ResourceType;
use std::collections::BTreeMap;
use thiserror::Error as ThisError;

///
/// ResourceGraphError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum ResourceGraphError {
    #[error("resource type '{0}' already registered")]
    AlreadyRegistered(String),

    #[error("resource type '{0}' declares field '{1}' more than once")]
    DuplicateField(String, String),

    #[error("resource type '{0}' declares reserved field 'id'")]
    ReservedField(String),
}

///
/// ResourceGraph
///
/// Registry of resource descriptors, keyed by public type name.
/// Built once at startup and shared read-only by every request.
///

#[derive(Clone, Debug, Default)]
pub struct ResourceGraph {
    types: BTreeMap<String, ResourceType>,
}

impl ResourceGraph {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a resource type.
    pub fn register(&mut self, resource: ResourceType) -> Result<(), ResourceGraphError> {
        if self.types.contains_key(&resource.name) {
            return Err(ResourceGraphError::AlreadyRegistered(resource.name));
        }

        for (i, field) in resource.fields.iter().enumerate() {
            if field.name == crate::ID_FIELD {
                return Err(ResourceGraphError::ReservedField(resource.name.clone()));
            }
            if resource.fields[..i].iter().any(|f| f.name == field.name) {
                return Err(ResourceGraphError::DuplicateField(
                    resource.name.clone(),
                    field.name.clone(),
                ));
            }
        }

        self.types.insert(resource.name.clone(), resource);

        Ok(())
    }

    /// Builder-style registration for fixtures and startup wiring.
    pub fn with(mut self, resource: ResourceType) -> Result<Self, ResourceGraphError> {
        self.register(resource)?;

        Ok(self)
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ResourceType> {
        self.types.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ResourceType> {
        self.types.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}
