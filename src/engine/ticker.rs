//! Per-flow reset ticker.
//!
//! Each flow owns one background task that fires every interval and
//! advances the accounting record. The task holds only a weak
//! reference to the flow, so it can never keep a removed flow alive;
//! the handle aborts the task when the registry entry is dropped.

use std::sync::{Arc, Weak};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::engine::flow::Flow;

/// Registration of a flow's periodic reset. Aborts the task on drop.
pub(crate) struct TickerHandle {
    handle: JoinHandle<()>,
}

impl Drop for TickerHandle {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Schedule the periodic reset for a flow on the given runtime.
pub(crate) fn spawn_reset_ticker(
    runtime: &Handle,
    flow: &Arc<Flow>,
    period: Duration,
) -> TickerHandle {
    let weak: Weak<Flow> = Arc::downgrade(flow);
    let handle = runtime.spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately; consume it so the
        // first reset lands one full interval out.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            match weak.upgrade() {
                Some(flow) => flow.reset(),
                None => break,
            }
        }
    });
    TickerHandle { handle }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FlowName;

    fn ticked_flow(period: Duration) -> (Arc<Flow>, TickerHandle) {
        let flow = Arc::new(Flow::new(FlowName::from("ticked"), 512, period));
        let ticker = spawn_reset_ticker(&Handle::current(), &flow, period);
        (flow, ticker)
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticker_advances_version_per_interval() {
        let (flow, _ticker) = ticked_flow(Duration::from_millis(100));

        tokio::time::sleep(Duration::from_millis(350)).await;
        assert_eq!(flow.snapshot().version, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_handle_stops_resets() {
        let (flow, ticker) = ticked_flow(Duration::from_millis(100));

        tokio::time::sleep(Duration::from_millis(150)).await;
        assert_eq!(flow.snapshot().version, 1);

        drop(ticker);
        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(flow.snapshot().version, 1);
    }
}
