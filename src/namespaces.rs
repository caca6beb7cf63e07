use parking_lot::RwLock;
use serde::Serialize;

/// Selection value meaning "every namespace".
pub const ALL_NAMESPACES: &str = "_all";

/// Namespaces picked in the dashboard. Written by the selection endpoint, read by lists.
#[derive(Debug, Default)]
pub struct NamespaceSelection {
    selected: RwLock<Vec<String>>,
}

impl NamespaceSelection {
    pub fn new(initial: Vec<String>) -> Self {
        Self {
            selected: RwLock::new(initial),
        }
    }

    pub fn select(&self, namespaces: Vec<String>) {
        *self.selected.write() = namespaces;
    }

    /// Consistent copy of the selection, taken once per render pass.
    pub fn snapshot(&self) -> SelectedNamespaces {
        SelectedNamespaces(self.selected.read().clone())
    }

    pub fn are_multiple_namespaces_selected(&self) -> bool {
        self.snapshot().are_multiple_namespaces_selected()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SelectedNamespaces(pub Vec<String>);

impl SelectedNamespaces {
    /// An empty selection lists every namespace.
    pub fn are_multiple_namespaces_selected(&self) -> bool {
        self.0.is_empty() || self.0.len() > 1 || self.0.iter().any(|ns| ns == ALL_NAMESPACES)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}
