//! Polling resource lists with per-row status presentation.
//!
//! A list is a [`controller::ResourceListController`] wired with a fetcher, a map from the
//! fetched envelope to rows, a [`columns::ColumnRegistry`] and a [`bindings::BindingRegistry`].
//! Concrete lists such as [`service`] only supply that wiring.

pub mod bindings;
pub mod columns;
pub mod controller;
pub mod poller;
pub mod service;
pub mod status;

use crate::models::{ListMeta, ResourceIdentity};
use crate::namespaces::SelectedNamespaces;

/// Material icon names used by status bindings.
pub mod icons {
    pub const CHECK_CIRCLE: &str = "check_circle";
    pub const TIMELAPSE: &str = "timelapse";
    pub const HELP: &str = "help";
}

/// External state read during one render pass.
#[derive(Debug, Clone, Default)]
pub struct RenderContext {
    pub namespaces: SelectedNamespaces,
}

impl RenderContext {
    pub fn new(namespaces: SelectedNamespaces) -> Self {
        Self { namespaces }
    }
}

/// A row of a resource list.
pub trait ListResource {
    fn identity(&self) -> ResourceIdentity;
}

/// A fetched page of rows plus its list metadata.
pub trait ListEnvelope {
    fn list_meta(&self) -> ListMeta;
    fn errors(&self) -> &[String];
}
