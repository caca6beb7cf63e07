use crate::error::AppError;
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::VecDeque;
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// Receives errors that should reach the user. Fire-and-forget.
pub trait Notifier: Send + Sync {
    fn notify(&self, error: &AppError);
}

#[derive(Debug, Clone, Serialize)]
pub struct Notification {
    pub id: Uuid,
    pub message: String,
    pub timestamp: u64,
}

/// Logs every error and keeps the most recent ones for the dashboard to poll.
pub struct TracingNotifier {
    history: Mutex<VecDeque<Notification>>,
    capacity: usize,
}

impl TracingNotifier {
    pub fn new(capacity: usize) -> Self {
        Self {
            history: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
        }
    }

    /// Newest first.
    pub fn recent(&self) -> Vec<Notification> {
        self.history.lock().iter().rev().cloned().collect()
    }
}

impl Notifier for TracingNotifier {
    fn notify(&self, error: &AppError) {
        tracing::error!(error = %error, "Notifying dashboard");

        if self.capacity == 0 {
            return;
        }

        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();

        let mut history = self.history.lock();
        while history.len() >= self.capacity {
            history.pop_front();
        }
        history.push_back(Notification {
            id: Uuid::new_v4(),
            message: error.to_string(),
            timestamp,
        });
    }
}
