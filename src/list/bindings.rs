use super::icons;
use crate::error::{AppError, Result};
use serde::Serialize;

/// Icon and CSS class painted in a row's status cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Presentation {
    pub icon: String,
    pub css_class: String,
}

impl Presentation {
    pub fn new(icon: &str, css_class: &str) -> Self {
        Self {
            icon: icon.to_string(),
            css_class: css_class.to_string(),
        }
    }

    /// Shown when no binding matches.
    pub fn neutral() -> Self {
        Self::new(icons::HELP, "")
    }
}

type BindingPredicate<R> = Box<dyn Fn(&R) -> bool + Send + Sync>;

struct Binding<R> {
    presentation: Presentation,
    predicate: BindingPredicate<R>,
}

/// Ordered status bindings of one list. The first binding whose predicate holds wins.
pub struct BindingRegistry<R> {
    bindings: Vec<Binding<R>>,
}

impl<R> Default for BindingRegistry<R> {
    fn default() -> Self {
        Self {
            bindings: Vec::new(),
        }
    }
}

impl<R> BindingRegistry<R> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_binding<F>(&mut self, icon: &str, css_class: &str, predicate: F) -> Result<()>
    where
        F: Fn(&R) -> bool + Send + Sync + 'static,
    {
        let presentation = Presentation::new(icon, css_class);
        if self.bindings.iter().any(|b| b.presentation == presentation) {
            return Err(AppError::Registration(format!(
                "binding '{}' / '{}' registered twice",
                icon, css_class
            )));
        }

        self.bindings.push(Binding {
            presentation,
            predicate: Box::new(predicate),
        });
        Ok(())
    }

    pub fn lookup(&self, resource: &R) -> Presentation {
        self.bindings
            .iter()
            .find(|b| (b.predicate)(resource))
            .map(|b| b.presentation.clone())
            .unwrap_or_else(Presentation::neutral)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_match_wins() {
        let mut registry = BindingRegistry::<i32>::new();
        registry
            .register_binding("check_circle", "kd-success", |n| *n > 0)
            .unwrap();
        registry
            .register_binding("timelapse", "kd-muted", |n| *n > 0 || *n == -1)
            .unwrap();

        assert_eq!(
            registry.lookup(&5),
            Presentation::new("check_circle", "kd-success")
        );
        assert_eq!(registry.lookup(&-1), Presentation::new("timelapse", "kd-muted"));
    }

    #[test]
    fn test_no_match_is_neutral() {
        let mut registry = BindingRegistry::<i32>::new();
        registry
            .register_binding("check_circle", "kd-success", |n| *n > 0)
            .unwrap();

        assert_eq!(registry.lookup(&0), Presentation::neutral());
        assert_eq!(BindingRegistry::<i32>::new().lookup(&1).icon, "help");
    }

    #[test]
    fn test_duplicate_binding_is_rejected() {
        let mut registry = BindingRegistry::<i32>::new();
        registry
            .register_binding("check_circle", "kd-success", |_| true)
            .unwrap();

        let err = registry
            .register_binding("check_circle", "kd-success", |_| false)
            .unwrap_err();
        assert!(matches!(err, AppError::Registration(_)));
        assert_eq!(registry.len(), 1);
    }
}
