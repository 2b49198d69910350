//! Tokio progress ticker

use crate::error::{MediaError, Result};
use loopdeck_engine::{TickScheduler, TickerToken};
use std::collections::HashMap;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

/// Tick scheduler that sends tokens over a channel
///
/// Each ticker is a spawned task; cancelling aborts it.
pub struct TokioTicker {
    ticks: UnboundedSender<TickerToken>,
    runtime: Handle,
    next: u64,
    tasks: HashMap<TickerToken, JoinHandle<()>>,
}

impl TokioTicker {
    /// Create a scheduler reporting on `ticks`
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(ticks: UnboundedSender<TickerToken>) -> Result<Self> {
        let runtime = Handle::try_current().map_err(|_| MediaError::NoRuntime)?;

        Ok(Self {
            ticks,
            runtime,
            next: 0,
            tasks: HashMap::new(),
        })
    }

    /// Number of live tickers
    pub fn live(&self) -> usize {
        self.tasks.len()
    }
}

impl TickScheduler for TokioTicker {
    fn start(&mut self, interval: Duration) -> TickerToken {
        self.next += 1;
        let token = TickerToken::new(self.next);
        let ticks = self.ticks.clone();
        // tokio intervals panic on zero
        let interval = interval.max(Duration::from_millis(1));
        let first = Instant::now() + interval;

        let task = self.runtime.spawn(async move {
            let mut timer = tokio::time::interval_at(first, interval);
            timer.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                timer.tick().await;
                if ticks.send(token).is_err() {
                    break;
                }
            }
        });

        self.tasks.insert(token, task);
        token
    }

    fn cancel(&mut self, token: TickerToken) {
        if let Some(task) = self.tasks.remove(&token) {
            task.abort();
        }
    }
}

impl Drop for TokioTicker {
    fn drop(&mut self) {
        for (_, task) in self.tasks.drain() {
            task.abort();
        }
    }
}
