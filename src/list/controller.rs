use super::bindings::{BindingRegistry, Presentation};
use super::columns::{ActionWidget, ColumnRegistry};
use super::{ListEnvelope, ListResource, RenderContext};
use crate::error::{AppError, Result};
use crate::models::{FetchParams, ListMeta};
use crate::notifications::Notifier;
use crate::resources::{ListFetcher, ResourceEndpoint};
use parking_lot::RwLock;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

/// Lifecycle of a list: Idle -> Fetching -> Rendered -> Fetching ..., with
/// Fetching -> Error -> Idle when a fetch fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ListState {
    Idle,
    Fetching,
    Rendered,
    Error,
}

/// 1-based page of the current collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: usize,
    pub items_per_page: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListRow<R> {
    pub status: Presentation,
    pub resource: R,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub actions: BTreeMap<String, Value>,
}

/// Everything the dashboard needs to draw one list.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListView<R> {
    pub kind: String,
    pub state: ListState,
    pub generation: u64,
    pub columns: Vec<String>,
    pub list_meta: ListMeta,
    pub rows: Vec<ListRow<R>>,
    pub errors: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}

struct Snapshot<R> {
    state: ListState,
    items: Arc<Vec<R>>,
    list_meta: ListMeta,
    errors: Vec<String>,
    last_error: Option<String>,
}

type MapFn<L, R> = Box<dyn Fn(L) -> Vec<R> + Send + Sync>;

/// A polled list of resources.
///
/// Every successful fetch replaces the rendered items wholesale. A failed fetch is forwarded
/// to the notifier and the last good items stay visible.
pub struct ResourceListController<L, R> {
    kind: String,
    endpoint: ResourceEndpoint,
    items_limit: Option<u32>,
    query_append: Option<String>,
    fetcher: Arc<dyn ListFetcher<L>>,
    map: MapFn<L, R>,
    notifier: Arc<dyn Notifier>,
    display_columns: Vec<String>,
    columns: ColumnRegistry,
    bindings: BindingRegistry<R>,
    snapshot: RwLock<Snapshot<R>>,
    rendered: watch::Sender<u64>,
    token: CancellationToken,
}

impl<L, R> ResourceListController<L, R>
where
    L: ListEnvelope + Send + 'static,
    R: ListResource + Clone + Send + Sync + 'static,
{
    pub fn new<M>(
        kind: &str,
        endpoint: ResourceEndpoint,
        fetcher: Arc<dyn ListFetcher<L>>,
        map: M,
        notifier: Arc<dyn Notifier>,
    ) -> Self
    where
        M: Fn(L) -> Vec<R> + Send + Sync + 'static,
    {
        let (rendered, _) = watch::channel(0);
        Self {
            kind: kind.to_string(),
            endpoint,
            items_limit: None,
            query_append: None,
            fetcher,
            map: Box::new(map),
            notifier,
            display_columns: Vec::new(),
            columns: ColumnRegistry::new(),
            bindings: BindingRegistry::new(),
            snapshot: RwLock::new(Snapshot {
                state: ListState::Idle,
                items: Arc::new(Vec::new()),
                list_meta: ListMeta::default(),
                errors: Vec::new(),
                last_error: None,
            }),
            rendered,
            token: CancellationToken::new(),
        }
    }

    pub fn with_display_columns(mut self, columns: &[&str]) -> Self {
        self.display_columns = columns.iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn with_items_limit(mut self, limit: Option<u32>) -> Self {
        self.items_limit = limit;
        self
    }

    pub fn with_query_append(mut self, query: Option<String>) -> Self {
        self.query_append = query;
        self
    }

    pub fn register_binding<F>(&mut self, icon: &str, css_class: &str, predicate: F) -> Result<()>
    where
        F: Fn(&R) -> bool + Send + Sync + 'static,
    {
        self.bindings.register_binding(icon, css_class, predicate)
    }

    pub fn register_static_column(&mut self, name: &str) -> Result<()> {
        self.columns.register_static(name)
    }

    pub fn register_dynamic_column<F>(&mut self, name: &str, anchor: &str, predicate: F) -> Result<()>
    where
        F: Fn(&RenderContext) -> bool + Send + Sync + 'static,
    {
        self.columns.register_dynamic(name, anchor, predicate)
    }

    pub fn register_action_column(&mut self, name: &str, widget: Arc<dyn ActionWidget>) -> Result<()> {
        self.columns.register_action(name, widget)
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn state(&self) -> ListState {
        self.snapshot.read().state
    }

    pub fn items(&self) -> Arc<Vec<R>> {
        self.snapshot.read().items.clone()
    }

    pub fn generation(&self) -> u64 {
        *self.rendered.borrow()
    }

    /// Receives the render generation, bumped after every successful fetch.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.rendered.subscribe()
    }

    pub fn display_columns(&self) -> &[String] {
        &self.display_columns
    }

    pub fn columns(&self, ctx: &RenderContext) -> Vec<String> {
        self.columns.resolve(&self.display_columns, ctx)
    }

    pub fn presentation(&self, resource: &R) -> Presentation {
        self.bindings.lookup(resource)
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Tears the list down. An outstanding fetch is abandoned without touching the items.
    pub fn destroy(&self) {
        self.token.cancel();
    }

    pub fn is_destroyed(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Fetches once and applies the result. Never fails: errors go to the notifier.
    pub async fn refresh(&self, params: Option<&FetchParams>) -> ListState {
        if self.token.is_cancelled() {
            return self.state();
        }
        self.snapshot.write().state = ListState::Fetching;

        let fetch = self.fetcher.get(
            &self.endpoint,
            self.items_limit,
            self.query_append.as_deref(),
            params,
        );
        let result = tokio::select! {
            biased;
            _ = self.token.cancelled() => {
                tracing::debug!(kind = %self.kind, "List destroyed during fetch, dropping result");
                self.snapshot.write().state = ListState::Idle;
                return ListState::Idle;
            }
            result = fetch => result,
        };

        match result {
            Ok(envelope) => self.apply(envelope),
            Err(err) => self.fail(err),
        }
    }

    fn apply(&self, envelope: L) -> ListState {
        let list_meta = envelope.list_meta();
        let errors = envelope.errors().to_vec();
        let items = (self.map)(envelope);
        let count = items.len();

        {
            let mut snapshot = self.snapshot.write();
            snapshot.items = Arc::new(items);
            snapshot.list_meta = list_meta;
            snapshot.errors = errors;
            snapshot.last_error = None;
            snapshot.state = ListState::Rendered;
        }
        self.rendered.send_modify(|generation| *generation += 1);

        tracing::info!(kind = %self.kind, count, total = list_meta.total_items, "List refreshed");
        ListState::Rendered
    }

    fn fail(&self, err: AppError) -> ListState {
        tracing::warn!(kind = %self.kind, error = %err, "List fetch failed, keeping last items");
        {
            let mut snapshot = self.snapshot.write();
            snapshot.state = ListState::Error;
            snapshot.last_error = Some(err.to_string());
        }

        self.notifier.notify(&err);

        self.snapshot.write().state = ListState::Idle;
        ListState::Error
    }

    pub fn render(&self, ctx: &RenderContext, page: Option<PageRequest>) -> ListView<R> {
        let columns = self.columns(ctx);
        let snapshot = self.snapshot.read();

        let (skip, take) = match page {
            Some(PageRequest { page, items_per_page }) => {
                (page.saturating_sub(1).saturating_mul(items_per_page), items_per_page)
            }
            None => (0, snapshot.items.len()),
        };

        let rows = snapshot
            .items
            .iter()
            .skip(skip)
            .take(take)
            .map(|item| {
                let identity = item.identity();
                ListRow {
                    status: self.bindings.lookup(item),
                    resource: item.clone(),
                    actions: self
                        .columns
                        .action_widgets()
                        .map(|(name, widget)| (name.to_string(), widget.render(&identity)))
                        .collect(),
                }
            })
            .collect();

        ListView {
            kind: self.kind.clone(),
            state: snapshot.state,
            generation: self.generation(),
            columns,
            list_meta: snapshot.list_meta,
            rows,
            errors: snapshot.errors.clone(),
            last_error: snapshot.last_error.clone(),
        }
    }
}

impl<L, R> Drop for ResourceListController<L, R> {
    fn drop(&mut self) {
        self.token.cancel();
    }
}
