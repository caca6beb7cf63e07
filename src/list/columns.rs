use super::RenderContext;
use crate::error::{AppError, Result};
use crate::models::ResourceIdentity;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Renders the cell of an action column, e.g. a per-row menu.
pub trait ActionWidget: Send + Sync {
    fn render(&self, identity: &ResourceIdentity) -> Value;
}

type ColumnPredicate = Box<dyn Fn(&RenderContext) -> bool + Send + Sync>;

enum Visibility {
    Always,
    When {
        anchor: String,
        predicate: ColumnPredicate,
    },
    Action(Arc<dyn ActionWidget>),
}

struct ColumnDescriptor {
    name: String,
    visibility: Visibility,
}

/// Columns a list adds on top of its display columns.
#[derive(Default)]
pub struct ColumnRegistry {
    columns: Vec<ColumnDescriptor>,
}

impl ColumnRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_static(&mut self, name: &str) -> Result<()> {
        self.push(name, Visibility::Always)
    }

    /// Shows `name` right after `anchor` whenever `predicate` holds for the current render.
    pub fn register_dynamic<F>(&mut self, name: &str, anchor: &str, predicate: F) -> Result<()>
    where
        F: Fn(&RenderContext) -> bool + Send + Sync + 'static,
    {
        self.push(
            name,
            Visibility::When {
                anchor: anchor.to_string(),
                predicate: Box::new(predicate),
            },
        )
    }

    pub fn register_action(&mut self, name: &str, widget: Arc<dyn ActionWidget>) -> Result<()> {
        self.push(name, Visibility::Action(widget))
    }

    fn push(&mut self, name: &str, visibility: Visibility) -> Result<()> {
        if self.columns.iter().any(|c| c.name == name) {
            return Err(AppError::Registration(format!(
                "column '{}' registered twice",
                name
            )));
        }

        self.columns.push(ColumnDescriptor {
            name: name.to_string(),
            visibility,
        });
        Ok(())
    }

    /// Final column order: `display`, static columns, dynamic columns spliced after their
    /// anchors (appended when the anchor is not shown), then action columns.
    pub fn resolve(&self, display: &[String], ctx: &RenderContext) -> Vec<String> {
        let mut resolved: Vec<String> = display.to_vec();

        for column in &self.columns {
            if matches!(column.visibility, Visibility::Always) && !resolved.contains(&column.name) {
                resolved.push(column.name.clone());
            }
        }

        let mut spliced: HashMap<&str, usize> = HashMap::new();
        for column in &self.columns {
            let Visibility::When { anchor, predicate } = &column.visibility else {
                continue;
            };
            if resolved.contains(&column.name) || !predicate(ctx) {
                continue;
            }

            match resolved.iter().position(|name| name == anchor) {
                Some(index) => {
                    let offset = spliced.entry(anchor.as_str()).or_insert(0);
                    resolved.insert(index + 1 + *offset, column.name.clone());
                    *offset += 1;
                }
                None => resolved.push(column.name.clone()),
            }
        }

        for column in &self.columns {
            if matches!(column.visibility, Visibility::Action(_)) && !resolved.contains(&column.name) {
                resolved.push(column.name.clone());
            }
        }

        resolved
    }

    pub fn action_widgets(&self) -> impl Iterator<Item = (&str, &Arc<dyn ActionWidget>)> {
        self.columns.iter().filter_map(|c| match &c.visibility {
            Visibility::Action(widget) => Some((c.name.as_str(), widget)),
            _ => None,
        })
    }
}
