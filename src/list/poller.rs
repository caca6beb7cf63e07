use super::controller::ResourceListController;
use super::{ListEnvelope, ListResource};
use crate::models::FetchParams;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::time::MissedTickBehavior;

/// Requests refreshes from a running poller.
#[derive(Debug, Clone)]
pub struct PollerHandle {
    trigger: mpsc::Sender<()>,
}

impl PollerHandle {
    /// Queues an immediate fetch. Returns false once the poller has stopped.
    pub fn request_refresh(&self) -> bool {
        match self.trigger.try_send(()) {
            Ok(()) | Err(TrySendError::Full(())) => true,
            Err(TrySendError::Closed(())) => false,
        }
    }
}

/// Polls `controller` every `interval`, plus on demand through the returned handle.
///
/// Fetches run one at a time on a single task. `params` is read before every fetch. The task
/// holds only a weak reference and stops when the list is destroyed or dropped.
pub fn spawn<L, R, P>(
    controller: &Arc<ResourceListController<L, R>>,
    interval: Duration,
    params: P,
) -> PollerHandle
where
    L: ListEnvelope + Send + 'static,
    R: ListResource + Clone + Send + Sync + 'static,
    P: Fn() -> Option<FetchParams> + Send + 'static,
{
    let (trigger, mut requests) = mpsc::channel(1);
    let list = Arc::downgrade(controller);
    let token = controller.cancellation_token();
    let kind = controller.kind().to_string();

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tracing::info!(kind = %kind, interval_ms = interval.as_millis() as u64, "List poller started");

        loop {
            tokio::select! {
                _ = token.cancelled() => break,
                _ = ticker.tick() => {}
                Some(()) = requests.recv() => ticker.reset(),
            }

            let Some(controller) = list.upgrade() else {
                break;
            };
            let params = params();
            controller.refresh(params.as_ref()).await;
        }

        tracing::info!(kind = %kind, "List poller stopped");
    });

    PollerHandle { trigger }
}
