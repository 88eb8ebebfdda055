//! Global flow registry.

use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use tokio::runtime::Handle;

use crate::config::FlowConfig;
use crate::engine::{spawn_reset_ticker, Flow, FlowSnapshot, TickerHandle};
use crate::error::{Error, Result};
use crate::metrics::METRICS;
use crate::task::TakeTask;
use crate::types::{FlowName, Limit};

/// Registry entry: the shared flow plus its ticker registration.
/// Dropping the entry releases the ticker.
struct FlowEntry {
    flow: Arc<Flow>,
    _ticker: TickerHandle,
}

/// Thread-safe registry of named flows.
///
/// Creation and limit changes are rare; admission calls do a
/// read-locked lookup and clone the flow handle out, so `take` never
/// holds the lock across a wait.
pub struct FlowRegistry {
    flows: RwLock<FxHashMap<FlowName, FlowEntry>>,
}

impl FlowRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            flows: RwLock::new(FxHashMap::default()),
        }
    }

    /// Create a flow and install its reset ticker.
    ///
    /// Fails if the name is taken, the configuration is invalid, or no
    /// runtime is available to schedule the ticker.
    pub fn create(&self, name: impl Into<FlowName>, config: FlowConfig) -> Result<Arc<Flow>> {
        let name = name.into();
        let limit = config.validate()?;
        let runtime = Handle::try_current().map_err(|_| Error::NoRuntime)?;

        let mut flows = self.flows.write();
        if flows.contains_key(&name) {
            return Err(Error::DuplicateFlow(name));
        }

        let flow = Arc::new(Flow::new(name.clone(), limit, config.interval));
        let ticker = spawn_reset_ticker(&runtime, &flow, config.interval);
        flows.insert(
            name.clone(),
            FlowEntry {
                flow: flow.clone(),
                _ticker: ticker,
            },
        );

        METRICS.inc(&METRICS.flows_created);
        tracing::debug!(
            "Flow {} created: limit {}, interval {:?}",
            name,
            config.limit,
            config.interval
        );
        Ok(flow)
    }

    /// Replace a flow's limit, resetting its bucket headroom.
    pub fn set_limit(&self, name: &FlowName, limit: Limit) -> Result<()> {
        let raw = limit.to_raw()?;
        self.lookup(name)?.set_limit(raw);
        Ok(())
    }

    /// Get a flow's current limit.
    pub fn get_limit(&self, name: &FlowName) -> Result<Limit> {
        Ok(self.lookup(name)?.limit())
    }

    /// Get the admitted total of a flow's last completed interval.
    pub fn prev_allowed(&self, name: &FlowName) -> Result<u64> {
        Ok(self.lookup(name)?.prev_allowed())
    }

    /// Get a point-in-time view of a flow's accounting record.
    pub fn info(&self, name: &FlowName) -> Result<FlowSnapshot> {
        Ok(self.lookup(name)?.snapshot())
    }

    /// Acquire `n` tokens from a flow, blocking until admitted.
    pub async fn take(&self, name: &FlowName, n: u64) -> Result<()> {
        let flow = self.lookup(name)?;
        flow.take(n).await;
        Ok(())
    }

    /// Make one non-blocking admission attempt for `n` tokens.
    pub fn try_take(&self, name: &FlowName, n: u64) -> Result<bool> {
        Ok(self.lookup(name)?.try_take(n))
    }

    /// Spawn a background take that delivers `msg` once admitted.
    pub fn atake<T: Send + 'static>(&self, name: &FlowName, n: u64, msg: T) -> Result<TakeTask<T>> {
        let flow = self.lookup(name)?;
        let runtime = Handle::try_current().map_err(|_| Error::NoRuntime)?;
        Ok(TakeTask::spawn(&runtime, flow, n, msg))
    }

    /// Register interest in a flow.
    ///
    /// Reserved hook for per-member accounting on top of the advisory
    /// fair share; currently only validates that the flow exists.
    pub fn join(&self, name: &FlowName) -> Result<()> {
        self.lookup(name)?;
        Ok(())
    }

    /// Number of registered flows.
    pub fn len(&self) -> usize {
        self.flows.read().len()
    }

    /// Check if the registry has no flows.
    pub fn is_empty(&self) -> bool {
        self.flows.read().is_empty()
    }

    /// Names of all registered flows.
    pub fn names(&self) -> Vec<FlowName> {
        self.flows.read().keys().cloned().collect()
    }

    fn lookup(&self, name: &FlowName) -> Result<Arc<Flow>> {
        self.flows
            .read()
            .get(name)
            .map(|entry| entry.flow.clone())
            .ok_or_else(|| Error::UnknownFlow(name.clone()))
    }
}

impl Default for FlowRegistry {
    fn default() -> Self {
        Self::new()
    }
}
