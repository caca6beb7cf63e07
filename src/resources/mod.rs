pub mod service;

use crate::error::Result;
use crate::models::FetchParams;

/// Collection endpoint of one resource kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceEndpoint {
    pub resource: String,
    pub namespaced: bool,
}

impl ResourceEndpoint {
    pub fn resource(resource: &str, namespaced: bool) -> Self {
        Self {
            resource: resource.to_string(),
            namespaced,
        }
    }

    /// Path of the list call, scoped to `namespace` when the resource is namespaced.
    pub fn list_path(&self, namespace: Option<&str>) -> String {
        match namespace {
            Some(ns) if self.namespaced => format!("api/v1/{}/{}", self.resource, ns),
            _ => format!("api/v1/{}", self.resource),
        }
    }
}

/// Source of list envelopes for a resource list.
#[async_trait::async_trait]
pub trait ListFetcher<L>: Send + Sync {
    async fn get(
        &self,
        endpoint: &ResourceEndpoint,
        items_limit: Option<u32>,
        query_append: Option<&str>,
        params: Option<&FetchParams>,
    ) -> Result<L>;
}
