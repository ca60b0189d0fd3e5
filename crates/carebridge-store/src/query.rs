use serde::{Deserialize, Serialize};

use carebridge_types::{PersistedResource, ResourceType};

/// Filter for listing queries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceQuery {
    /// Allowed types. Empty means every type.
    #[serde(default)]
    pub types: Vec<ResourceType>,
    /// Case-insensitive substring matched against name, location and quantity.
    #[serde(default)]
    pub search: Option<String>,
}

impl ResourceQuery {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn with_types(mut self, types: impl IntoIterator<Item = ResourceType>) -> Self {
        self.types = types.into_iter().collect();
        self
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    pub fn matches(&self, resource: &PersistedResource) -> bool {
        if !self.types.is_empty() && !self.types.contains(&resource.resource_type) {
            return false;
        }

        let Some(needle) = self
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
        else {
            return true;
        };
        let needle = needle.to_lowercase();

        resource.name.to_lowercase().contains(&needle)
            || resource.location.to_lowercase().contains(&needle)
            || resource
                .quantity
                .as_deref()
                .is_some_and(|q| q.to_lowercase().contains(&needle))
    }
}
