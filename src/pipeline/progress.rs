use serde::Serialize;
use tokio::sync::mpsc::UnboundedSender;
use tracing::info;

/// Emitted once per stage, just before the stage runs
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgressEvent {
    pub stage_name: String,
    /// Order of the stage (0-based)
    pub index: usize,
    /// Number of stages in the run
    pub total: usize,
}

/// Receives progress events from a pipeline run.
///
/// Delivery is fire-and-forget: the runner never waits on the sink, so sinks
/// must not block. A sink that panics is caught and logged by the runner and
/// the run carries on; the panic is not propagated to the caller.
pub trait ProgressSink: Send + Sync {
    fn stage_started(&self, event: &ProgressEvent);
}

/// Discards every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn stage_started(&self, _event: &ProgressEvent) {}
}

/// Logs each event at INFO
#[derive(Debug, Clone, Copy, Default)]
pub struct LogProgress;

impl ProgressSink for LogProgress {
    fn stage_started(&self, event: &ProgressEvent) {
        info!(
            "Stage {}/{}: {}",
            event.index + 1,
            event.total,
            event.stage_name
        );
    }
}

/// Forwards events to an async consumer such as a UI task
#[derive(Debug, Clone)]
pub struct ChannelProgress {
    sender: UnboundedSender<ProgressEvent>,
}

impl ChannelProgress {
    pub fn new(sender: UnboundedSender<ProgressEvent>) -> Self {
        Self { sender }
    }
}

impl ProgressSink for ChannelProgress {
    fn stage_started(&self, event: &ProgressEvent) {
        // A closed receiver only means nobody is watching anymore
        let _ = self.sender.send(event.clone());
    }
}

impl<F> ProgressSink for F
where
    F: Fn(&ProgressEvent) + Send + Sync,
{
    fn stage_started(&self, event: &ProgressEvent) {
        self(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(index: usize) -> ProgressEvent {
        ProgressEvent {
            stage_name: format!("pass{}", index),
            index,
            total: 2,
        }
    }

    #[tokio::test]
    async fn test_channel_progress_preserves_order() {
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let sink = ChannelProgress::new(tx);

        sink.stage_started(&event(0));
        sink.stage_started(&event(1));
        drop(sink);

        assert_eq!(rx.recv().await, Some(event(0)));
        assert_eq!(rx.recv().await, Some(event(1)));
        assert_eq!(rx.recv().await, None);
    }

    #[test]
    fn test_channel_progress_ignores_closed_receiver() {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        drop(rx);

        ChannelProgress::new(tx).stage_started(&event(0));
    }

    #[test]
    fn test_closure_sink() {
        let seen = std::sync::Mutex::new(Vec::new());
        let sink = |e: &ProgressEvent| seen.lock().unwrap().push(e.index);

        sink.stage_started(&event(0));
        sink.stage_started(&event(1));

        assert_eq!(*seen.lock().unwrap(), vec![0, 1]);
    }
}
