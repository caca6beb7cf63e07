use super::{ListMeta, ResourceMeta};
use k8s_openapi::api::core::v1::{
    LoadBalancerIngress, Service as KubeService, ServicePort as KubeServicePort,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const SERVICE_KIND: &str = "service";

/// Publishing type of a service. Unknown values are kept as `Unknown` rather than rejected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ServiceType {
    #[default]
    ClusterIP,
    NodePort,
    LoadBalancer,
    ExternalName,
    #[serde(other)]
    Unknown,
}

impl From<&str> for ServiceType {
    fn from(value: &str) -> Self {
        match value {
            "ClusterIP" => ServiceType::ClusterIP,
            "NodePort" => ServiceType::NodePort,
            "LoadBalancer" => ServiceType::LoadBalancer,
            "ExternalName" => ServiceType::ExternalName,
            _ => ServiceType::Unknown,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServicePort {
    pub port: i32,
    pub protocol: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_port: Option<i32>,
}

impl From<&KubeServicePort> for ServicePort {
    fn from(port: &KubeServicePort) -> Self {
        Self {
            port: port.port,
            protocol: port.protocol.clone().unwrap_or_else(|| "TCP".to_string()),
            node_port: port.node_port,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    pub host: String,
    pub ports: Vec<ServicePort>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    pub object_meta: ResourceMeta,
    #[serde(rename = "type", default)]
    pub service_type: ServiceType,
    #[serde(rename = "clusterIP", default)]
    pub cluster_ip: String,
    pub internal_endpoint: Endpoint,
    #[serde(default)]
    pub external_endpoints: Vec<Endpoint>,
    #[serde(default)]
    pub selector: BTreeMap<String, String>,
}

impl From<&KubeService> for Service {
    fn from(service: &KubeService) -> Self {
        let object_meta = ResourceMeta::from(&service.metadata);
        let spec = service.spec.as_ref();

        let ports: Vec<ServicePort> = spec
            .and_then(|spec| spec.ports.as_ref())
            .map(|ports| ports.iter().map(ServicePort::from).collect())
            .unwrap_or_default();
        let service_type = spec
            .and_then(|spec| spec.type_.as_deref())
            .map(ServiceType::from)
            .unwrap_or_default();

        let internal_endpoint = Endpoint {
            host: internal_host(&object_meta.name, object_meta.namespace.as_deref()),
            ports: ports.clone(),
        };

        let mut external_endpoints = Vec::new();
        if service_type == ServiceType::LoadBalancer {
            let ingresses = service
                .status
                .as_ref()
                .and_then(|status| status.load_balancer.as_ref())
                .and_then(|lb| lb.ingress.as_ref());
            for ingress in ingresses.into_iter().flatten() {
                external_endpoints.push(Endpoint {
                    host: ingress_host(ingress),
                    ports: ports.clone(),
                });
            }
        }
        for ip in spec.and_then(|spec| spec.external_ips.as_ref()).into_iter().flatten() {
            external_endpoints.push(Endpoint {
                host: ip.clone(),
                ports: ports.clone(),
            });
        }

        Self {
            service_type,
            cluster_ip: spec
                .and_then(|spec| spec.cluster_ip.clone())
                .unwrap_or_default(),
            internal_endpoint,
            external_endpoints,
            selector: spec
                .and_then(|spec| spec.selector.clone())
                .unwrap_or_default(),
            object_meta,
        }
    }
}

/// In-cluster DNS host of a service; the namespace suffix is dropped for `default`.
fn internal_host(name: &str, namespace: Option<&str>) -> String {
    match namespace {
        Some(ns) if !ns.is_empty() && ns != "default" => format!("{}.{}", name, ns),
        _ => name.to_string(),
    }
}

fn ingress_host(ingress: &LoadBalancerIngress) -> String {
    match ingress.hostname.as_deref() {
        Some(hostname) if !hostname.is_empty() => hostname.to_string(),
        _ => ingress.ip.clone().unwrap_or_default(),
    }
}

/// One page of services as returned by a fetch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceList {
    pub list_meta: ListMeta,
    pub services: Vec<Service>,
    /// Non-fatal errors hit while listing, e.g. forbidden namespaces.
    #[serde(default)]
    pub errors: Vec<String>,
}
