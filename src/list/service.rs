use super::columns::ActionWidget;
use super::controller::ResourceListController;
use super::status::{HealthState, RuleTable, StatusClassifier};
use super::{ListEnvelope, ListResource, RenderContext, icons};
use crate::error::Result;
use crate::models::service::{SERVICE_KIND, Service, ServiceList, ServiceType};
use crate::models::{ListMeta, ResourceIdentity};
use crate::notifications::Notifier;
use crate::resources::{ListFetcher, ResourceEndpoint};
use serde_json::{Value, json};
use std::sync::{Arc, LazyLock};

pub type ServiceListController = ResourceListController<ServiceList, Service>;

pub const DISPLAY_COLUMNS: [&str; 7] = [
    "statusicon",
    "name",
    "labels",
    "clusterip",
    "internalendp",
    "externalendp",
    "age",
];

impl ListResource for Service {
    fn identity(&self) -> ResourceIdentity {
        ResourceIdentity {
            kind: SERVICE_KIND.to_string(),
            name: self.object_meta.name.clone(),
            namespace: self.object_meta.namespace.clone(),
        }
    }
}

impl ListEnvelope for ServiceList {
    fn list_meta(&self) -> ListMeta {
        self.list_meta
    }

    fn errors(&self) -> &[String] {
        &self.errors
    }
}

/// Health of a service depends on how it is published:
///
/// - ExternalName: always healthy.
/// - LoadBalancer: needs external endpoints, and then a cluster IP like the rest.
/// - ClusterIP, NodePort and anything else: healthy once a cluster IP is assigned.
static SERVICE_STATUS: LazyLock<RuleTable<Service>> = LazyLock::new(|| {
    RuleTable::<Service>::new(HealthState::Pending)
        .rule(
            |s| s.service_type == ServiceType::ExternalName,
            HealthState::Success,
        )
        .rule(
            |s| s.service_type == ServiceType::LoadBalancer && s.external_endpoints.is_empty(),
            HealthState::Pending,
        )
        .rule(|s| !s.cluster_ip.is_empty(), HealthState::Success)
});

pub fn classify(service: &Service) -> HealthState {
    SERVICE_STATUS.classify(service)
}

pub fn is_in_success_state(service: &Service) -> bool {
    classify(service) == HealthState::Success
}

pub fn is_in_pending_state(service: &Service) -> bool {
    !is_in_success_state(service)
}

fn should_show_namespace_column(ctx: &RenderContext) -> bool {
    ctx.namespaces.are_multiple_namespaces_selected()
}

/// Per-row menu offering the generic resource actions.
pub struct MenuWidget {
    actions: Vec<&'static str>,
}

impl Default for MenuWidget {
    fn default() -> Self {
        Self {
            actions: vec!["edit", "delete"],
        }
    }
}

impl ActionWidget for MenuWidget {
    fn render(&self, identity: &ResourceIdentity) -> Value {
        json!({
            "kind": identity.kind,
            "name": identity.name,
            "namespace": identity.namespace,
            "actions": self.actions,
        })
    }
}

/// Builds the service list: fetch from the service endpoint, status bindings, the row menu
/// and a namespace column shown only while several namespaces are selected.
pub fn controller(
    fetcher: Arc<dyn ListFetcher<ServiceList>>,
    notifier: Arc<dyn Notifier>,
    menu: Arc<dyn ActionWidget>,
    items_limit: Option<u32>,
) -> Result<ServiceListController> {
    let mut list = ServiceListController::new(
        SERVICE_KIND,
        ResourceEndpoint::resource(SERVICE_KIND, true),
        fetcher,
        |list: ServiceList| list.services,
        notifier,
    )
    .with_display_columns(&DISPLAY_COLUMNS)
    .with_items_limit(items_limit);

    list.register_binding(icons::CHECK_CIRCLE, "kd-success", is_in_success_state)?;
    list.register_binding(icons::TIMELAPSE, "kd-muted", is_in_pending_state)?;

    list.register_action_column("menu", menu)?;

    list.register_dynamic_column("namespace", "name", should_show_namespace_column)?;

    Ok(list)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::list::bindings::Presentation;
    use crate::list::controller::ListState;
    use crate::list::controller::tests::{RecordingNotifier, ScriptedFetcher};
    use crate::models::ResourceMeta;
    use crate::models::service::Endpoint;
    use crate::namespaces::{ALL_NAMESPACES, NamespaceSelection};

    fn service(service_type: ServiceType, cluster_ip: &str, endpoints: usize) -> Service {
        Service {
            object_meta: ResourceMeta {
                name: "web".to_string(),
                namespace: Some("shop".to_string()),
                ..Default::default()
            },
            service_type,
            cluster_ip: cluster_ip.to_string(),
            external_endpoints: (0..endpoints)
                .map(|i| Endpoint {
                    host: format!("10.1.0.{}", i),
                    ports: Vec::new(),
                })
                .collect(),
            ..Default::default()
        }
    }

    fn service_list(services: Vec<Service>) -> ServiceList {
        ServiceList {
            list_meta: ListMeta {
                total_items: services.len(),
            },
            services,
            errors: Vec::new(),
        }
    }

    fn build(fetcher: Arc<ScriptedFetcher<ServiceList>>) -> (ServiceListController, Arc<RecordingNotifier>) {
        let notifier = Arc::new(RecordingNotifier::default());
        let list = controller(fetcher, notifier.clone(), Arc::new(MenuWidget::default()), None)
            .unwrap();
        (list, notifier)
    }

    #[test]
    fn test_external_name_is_always_success() {
        assert!(is_in_success_state(&service(ServiceType::ExternalName, "", 0)));
        assert!(is_in_success_state(&service(ServiceType::ExternalName, "10.0.0.1", 3)));
    }

    #[test]
    fn test_load_balancer_without_endpoints_is_pending() {
        assert!(is_in_pending_state(&service(ServiceType::LoadBalancer, "10.0.0.1", 0)));
        assert!(is_in_pending_state(&service(ServiceType::LoadBalancer, "", 0)));
    }

    #[test]
    fn test_load_balancer_with_endpoints_falls_through_to_cluster_ip() {
        assert!(is_in_success_state(&service(ServiceType::LoadBalancer, "10.0.0.1", 1)));
        assert!(is_in_pending_state(&service(ServiceType::LoadBalancer, "", 2)));
    }

    #[test]
    fn test_cluster_ip_decides_other_types() {
        for service_type in [ServiceType::ClusterIP, ServiceType::NodePort, ServiceType::Unknown] {
            assert_eq!(classify(&service(service_type, "", 0)), HealthState::Pending);
            assert_eq!(classify(&service(service_type, "", 2)), HealthState::Pending);
            assert_eq!(classify(&service(service_type, "10.0.0.1", 0)), HealthState::Success);
        }
    }

    #[test]
    fn test_pending_is_negation_of_success() {
        let types = [
            ServiceType::ClusterIP,
            ServiceType::NodePort,
            ServiceType::LoadBalancer,
            ServiceType::ExternalName,
            ServiceType::Unknown,
        ];
        for service_type in types {
            for cluster_ip in ["", "10.0.0.1"] {
                for endpoints in [0, 1] {
                    let s = service(service_type, cluster_ip, endpoints);
                    assert_eq!(is_in_pending_state(&s), !is_in_success_state(&s));
                }
            }
        }
    }

    #[test]
    fn test_classification_from_json() {
        let parse = |raw: Value| -> Service { serde_json::from_value(raw).unwrap() };
        let base = |type_: &str, ip: &str, endpoints: Value| {
            json!({
                "objectMeta": { "name": "web" },
                "type": type_,
                "clusterIP": ip,
                "internalEndpoint": { "host": "web", "ports": [] },
                "externalEndpoints": endpoints,
            })
        };

        assert_eq!(classify(&parse(base("ClusterIP", "", json!([])))), HealthState::Pending);
        assert_eq!(
            classify(&parse(base("ClusterIP", "10.0.0.1", json!([])))),
            HealthState::Success
        );
        assert_eq!(
            classify(&parse(base("LoadBalancer", "10.0.0.1", json!([])))),
            HealthState::Pending
        );
        assert_eq!(
            classify(&parse(base(
                "LoadBalancer",
                "10.0.0.1",
                json!([{ "host": "1.2.3.4", "ports": [] }])
            ))),
            HealthState::Success
        );
        assert_eq!(classify(&parse(base("ExternalName", "", json!([])))), HealthState::Success);
        assert_eq!(classify(&parse(base("Headless", "", json!([])))), HealthState::Pending);
    }

    #[test]
    fn test_columns_follow_namespace_selection() {
        let (list, _) = build(Arc::new(ScriptedFetcher::new(Vec::new())));
        let selection = NamespaceSelection::new(vec!["default".to_string()]);

        assert_eq!(list.display_columns(), DISPLAY_COLUMNS.map(String::from).as_slice());

        let single = list.columns(&RenderContext::new(selection.snapshot()));
        assert_eq!(
            single,
            vec![
                "statusicon",
                "name",
                "labels",
                "clusterip",
                "internalendp",
                "externalendp",
                "age",
                "menu"
            ]
        );

        selection.select(vec![ALL_NAMESPACES.to_string()]);
        let multiple = list.columns(&RenderContext::new(selection.snapshot()));
        assert_eq!(
            multiple,
            vec![
                "statusicon",
                "name",
                "namespace",
                "labels",
                "clusterip",
                "internalendp",
                "externalendp",
                "age",
                "menu"
            ]
        );

        selection.select(vec!["default".to_string()]);
        assert_eq!(list.columns(&RenderContext::new(selection.snapshot())), single);
    }

    #[test]
    fn test_bindings() {
        let (list, _) = build(Arc::new(ScriptedFetcher::new(Vec::new())));

        assert_eq!(
            list.presentation(&service(ServiceType::NodePort, "10.0.0.1", 0)),
            Presentation::new(icons::CHECK_CIRCLE, "kd-success")
        );
        assert_eq!(
            list.presentation(&service(ServiceType::LoadBalancer, "10.0.0.1", 0)),
            Presentation::new(icons::TIMELAPSE, "kd-muted")
        );
    }

    #[tokio::test]
    async fn test_fetch_failure_after_render_keeps_services() {
        let fetcher = Arc::new(ScriptedFetcher::new(vec![
            Ok(service_list(vec![service(ServiceType::ClusterIP, "10.0.0.1", 0)])),
            Err(AppError::Fetch("api server unavailable".to_string())),
        ]));
        let (list, notifier) = build(fetcher);

        assert_eq!(list.refresh(None).await, ListState::Rendered);
        assert_eq!(list.refresh(None).await, ListState::Error);

        let view = list.render(&RenderContext::default(), None);
        assert_eq!(view.rows.len(), 1);
        assert_eq!(view.rows[0].resource.object_meta.name, "web");
        assert_eq!(view.rows[0].actions["menu"]["actions"], json!(["edit", "delete"]));
        assert_eq!(view.rows[0].actions["menu"]["namespace"], json!("shop"));
        assert_eq!(notifier.messages.lock().len(), 1);
    }
}
