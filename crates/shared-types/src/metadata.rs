//! # Entity Metadata Registry
//!
//! Explicit schema descriptors, registered once at startup.
//!
//! Every component that needs to know an entity's cluster, table, primary
//! key or table count receives the registry (or a descriptor) by injection.
//!
//! ```rust,ignore
//! let mut registry = MetadataRegistry::new();
//! registry.register(EntityDescriptor::sharded("user", "c1", 4))?;
//! registry.register(EntityDescriptor::global("country", "c1").with_cacheable(false))?;
//! let registry = Arc::new(registry);
//! ```

use crate::errors::MetadataError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

/// Default primary key column.
pub const DEFAULT_PRIMARY_KEY: &str = "id";

/// Schema descriptor for one entity type.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityDescriptor {
    /// Entity name (registry key).
    pub name: String,
    /// Owning cluster.
    pub cluster: String,
    /// Logical table name.
    pub table: String,
    /// Primary key column.
    pub primary_key: String,
    /// Tables per shard database; 0 marks a global (unsharded) table.
    pub table_count: usize,
    /// Whether rows of this entity may be cached.
    pub cacheable: bool,
}

impl EntityDescriptor {
    /// Descriptor for a sharded entity with `table_count` tables per shard.
    ///
    /// The table name defaults to the entity name and the primary key to `id`.
    pub fn sharded(name: impl Into<String>, cluster: impl Into<String>, table_count: usize) -> Self {
        let name = name.into();
        Self {
            table: name.clone(),
            name,
            cluster: cluster.into(),
            primary_key: DEFAULT_PRIMARY_KEY.to_string(),
            table_count,
            cacheable: true,
        }
    }

    /// Descriptor for a global entity (one table per cluster).
    pub fn global(name: impl Into<String>, cluster: impl Into<String>) -> Self {
        Self::sharded(name, cluster, 0)
    }

    /// Builder-style method to set the table name.
    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = table.into();
        self
    }

    /// Builder-style method to set the primary key column.
    pub fn with_primary_key(mut self, field: impl Into<String>) -> Self {
        self.primary_key = field.into();
        self
    }

    /// Builder-style method to set cacheability.
    pub fn with_cacheable(mut self, cacheable: bool) -> Self {
        self.cacheable = cacheable;
        self
    }

    /// Check for a sharded entity.
    pub fn is_sharded(&self) -> bool {
        self.table_count > 0
    }

    /// Validate the descriptor.
    pub fn validate(&self) -> Result<(), MetadataError> {
        let invalid = |reason: &str| MetadataError::Invalid {
            entity: self.name.clone(),
            reason: reason.to_string(),
        };

        if self.name.trim().is_empty() {
            return Err(invalid("name cannot be empty"));
        }
        if self.cluster.trim().is_empty() {
            return Err(invalid("cluster cannot be empty"));
        }
        if self.table.trim().is_empty() {
            return Err(invalid("table cannot be empty"));
        }
        if self.primary_key.trim().is_empty() {
            return Err(invalid("primary key cannot be empty"));
        }
        Ok(())
    }
}

/// Registry of entity descriptors, keyed by entity name.
///
/// Populated during startup and shared read-only afterwards.
#[derive(Debug, Default)]
pub struct MetadataRegistry {
    entities: HashMap<String, Arc<EntityDescriptor>>,
}

impl MetadataRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a descriptor.
    pub fn register(
        &mut self,
        descriptor: EntityDescriptor,
    ) -> Result<Arc<EntityDescriptor>, MetadataError> {
        descriptor.validate()?;
        if self.entities.contains_key(&descriptor.name) {
            return Err(MetadataError::DuplicateEntity(descriptor.name));
        }

        info!(
            entity = %descriptor.name,
            cluster = %descriptor.cluster,
            table = %descriptor.table,
            table_count = descriptor.table_count,
            "[registry] entity registered"
        );

        let descriptor = Arc::new(descriptor);
        self.entities
            .insert(descriptor.name.clone(), Arc::clone(&descriptor));
        Ok(descriptor)
    }

    /// Look up a descriptor.
    pub fn get(&self, name: &str) -> Result<Arc<EntityDescriptor>, MetadataError> {
        self.entities
            .get(name)
            .cloned()
            .ok_or_else(|| MetadataError::UnknownEntity(name.to_string()))
    }

    /// Descriptors belonging to one cluster.
    pub fn in_cluster<'a>(
        &'a self,
        cluster: &'a str,
    ) -> impl Iterator<Item = &'a Arc<EntityDescriptor>> + 'a {
        self.entities.values().filter(move |d| d.cluster == cluster)
    }

    /// Number of registered entities.
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Check for an empty registry.
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_get() {
        let mut registry = MetadataRegistry::new();
        registry
            .register(EntityDescriptor::sharded("user", "c1", 4))
            .unwrap();

        let user = registry.get("user").unwrap();
        assert!(user.is_sharded());
        assert_eq!(user.table, "user");
        assert_eq!(user.primary_key, "id");
    }

    #[test]
    fn test_duplicate_registration_rejected() {
        let mut registry = MetadataRegistry::new();
        registry.register(EntityDescriptor::global("country", "c1")).unwrap();
        let err = registry
            .register(EntityDescriptor::global("country", "c1"))
            .unwrap_err();
        assert_eq!(err, MetadataError::DuplicateEntity("country".to_string()));
    }

    #[test]
    fn test_unknown_entity() {
        let registry = MetadataRegistry::new();
        assert!(matches!(
            registry.get("nope"),
            Err(MetadataError::UnknownEntity(_))
        ));
    }

    #[test]
    fn test_invalid_descriptor() {
        let mut registry = MetadataRegistry::new();
        let err = registry
            .register(EntityDescriptor::global("x", "c1").with_primary_key(""))
            .unwrap_err();
        assert!(matches!(err, MetadataError::Invalid { .. }));
    }

    #[test]
    fn test_in_cluster_filter() {
        let mut registry = MetadataRegistry::new();
        registry.register(EntityDescriptor::global("a", "c1")).unwrap();
        registry.register(EntityDescriptor::global("b", "c2")).unwrap();
        assert_eq!(registry.in_cluster("c1").count(), 1);
        assert_eq!(registry.len(), 2);
    }
}
