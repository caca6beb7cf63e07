use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthState {
    Success,
    Pending,
}

/// Maps a resource to its health state. Must be total: every resource gets a state.
pub trait StatusClassifier<R>: Send + Sync {
    fn classify(&self, resource: &R) -> HealthState;
}

pub struct StatusRule<R> {
    guard: fn(&R) -> bool,
    outcome: HealthState,
}

impl<R> StatusRule<R> {
    pub fn new(guard: fn(&R) -> bool, outcome: HealthState) -> Self {
        Self { guard, outcome }
    }
}

/// Guarded rules checked top to bottom; the first matching guard decides, `fallback` otherwise.
pub struct RuleTable<R> {
    rules: Vec<StatusRule<R>>,
    fallback: HealthState,
}

impl<R> RuleTable<R> {
    pub fn new(fallback: HealthState) -> Self {
        Self {
            rules: Vec::new(),
            fallback,
        }
    }

    pub fn rule(mut self, guard: fn(&R) -> bool, outcome: HealthState) -> Self {
        self.rules.push(StatusRule::new(guard, outcome));
        self
    }
}

impl<R> StatusClassifier<R> for RuleTable<R> {
    fn classify(&self, resource: &R) -> HealthState {
        self.rules
            .iter()
            .find(|rule| (rule.guard)(resource))
            .map(|rule| rule.outcome)
            .unwrap_or(self.fallback)
    }
}
