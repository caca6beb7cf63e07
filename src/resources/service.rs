use crate::error::{AppError, Result};
use crate::models::service::{SERVICE_KIND, Service, ServiceList};
use crate::models::{FetchParams, ListMeta};
use crate::namespaces::ALL_NAMESPACES;
use crate::resources::{ListFetcher, ResourceEndpoint};
use async_trait::async_trait;
use k8s_openapi::api::core::v1::Service as KubeService;
use kube::{
    api::{Api, ListParams},
    Client,
};

/// Lists services from the Kubernetes API.
pub struct KubeServiceFetcher {
    client: Client,
}

impl KubeServiceFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn apis(&self, namespaces: &[String]) -> Vec<(Option<String>, Api<KubeService>)> {
        if namespaces.is_empty() || namespaces.iter().any(|ns| ns == ALL_NAMESPACES) {
            return vec![(None, Api::all(self.client.clone()))];
        }

        namespaces
            .iter()
            .map(|ns| (Some(ns.clone()), Api::namespaced(self.client.clone(), ns)))
            .collect()
    }
}

#[async_trait]
impl ListFetcher<ServiceList> for KubeServiceFetcher {
    async fn get(
        &self,
        endpoint: &ResourceEndpoint,
        items_limit: Option<u32>,
        query_append: Option<&str>,
        params: Option<&FetchParams>,
    ) -> Result<ServiceList> {
        if endpoint.resource != SERVICE_KIND {
            return Err(AppError::Fetch(format!(
                "Endpoint '{}' does not list services",
                endpoint.resource
            )));
        }

        let params = params.cloned().unwrap_or_default();
        let mut list_params = ListParams::default();
        if let Some(selector) = params.label_selector.as_deref() {
            list_params = list_params.labels(selector);
        }
        if let Some(fields) = query_append {
            list_params = list_params.fields(fields);
        }
        if let Some(limit) = items_limit {
            list_params = list_params.limit(limit);
        }

        let mut services = Vec::new();
        let mut errors = Vec::new();
        let mut total_items = 0;

        for (namespace, api) in self.apis(&params.namespaces) {
            let path = endpoint.list_path(namespace.as_deref());
            tracing::debug!(path = %path, "Listing services");

            match api.list(&list_params).await {
                Ok(list) => {
                    let remaining = list.metadata.remaining_item_count.unwrap_or(0).max(0);
                    total_items += list.items.len() + remaining as usize;
                    services.extend(list.items.iter().map(Service::from));
                }
                // Forbidden namespaces are reported in the envelope instead of failing the list.
                Err(kube::Error::Api(err)) if err.code == 401 || err.code == 403 => {
                    tracing::warn!(path = %path, code = err.code, "Service list not permitted: {}", err.message);
                    errors.push(err.message);
                }
                Err(e) => return Err(AppError::Kube(e)),
            }
        }

        Ok(ServiceList {
            list_meta: ListMeta { total_items },
            services,
            errors,
        })
    }
}
