///
/// Cardinality
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Cardinality {
    ToOne,
    ToMany,
}

///
/// FieldKind
///
/// Minimal field classification needed by the validator and field filter.
/// Attribute value types are owned by the framework and not modelled here.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum FieldKind {
    Attribute,
    Relationship {
        cardinality: Cardinality,
        target: String,
    },
}

impl FieldKind {
    #[must_use]
    pub const fn is_relationship(&self) -> bool {
        matches!(self, Self::Relationship { .. })
    }
}

///
/// ResourceField
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ResourceField {
    /// Public field name as used in query strings and documents.
    pub name: String,
    pub kind: FieldKind,
}

///
/// ResourceType
///
/// Runtime descriptor for one resource type.
///
/// `restricted_backend` marks types persisted in the document store. The
/// field filter and the validator key off this flag rather than off any
/// concrete storage type.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ResourceType {
    pub name: String,
    pub fields: Vec<ResourceField>,
    pub restricted_backend: bool,
}

impl ResourceType {
    /// Create a descriptor for a type stored in the restricted document backend.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
            restricted_backend: true,
        }
    }

    /// Create a descriptor for a type stored elsewhere (e.g. a relational store).
    #[must_use]
    pub fn unrestricted(name: impl Into<String>) -> Self {
        Self {
            restricted_backend: false,
            ..Self::new(name)
        }
    }

    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>) -> Self {
        self.fields.push(ResourceField {
            name: name.into(),
            kind: FieldKind::Attribute,
        });
        self
    }

    #[must_use]
    pub fn with_to_one(mut self, name: impl Into<String>, target: impl Into<String>) -> Self {
        self.push_relationship(name.into(), Cardinality::ToOne, target.into());
        self
    }

    #[must_use]
    pub fn with_to_many(mut self, name: impl Into<String>, target: impl Into<String>) -> Self {
        self.push_relationship(name.into(), Cardinality::ToMany, target.into());
        self
    }

    fn push_relationship(&mut self, name: String, cardinality: Cardinality, target: String) {
        self.fields.push(ResourceField {
            name,
            kind: FieldKind::Relationship {
                cardinality,
                target,
            },
        });
    }

    /// Look up a field by its public name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&ResourceField> {
        self.fields.iter().find(|field| field.name == name)
    }

    #[must_use]
    pub fn is_attribute(&self, name: &str) -> bool {
        self.field(name)
            .is_some_and(|field| !field.kind.is_relationship())
    }

    #[must_use]
    pub fn is_relationship(&self, name: &str) -> bool {
        self.field(name)
            .is_some_and(|field| field.kind.is_relationship())
    }

    pub fn attributes(&self) -> impl Iterator<Item = &ResourceField> {
        self.fields.iter().filter(|f| !f.kind.is_relationship())
    }

    pub fn relationships(&self) -> impl Iterator<Item = &ResourceField> {
        self.fields.iter().filter(|f| f.kind.is_relationship())
    }
}
