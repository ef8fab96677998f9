//! Polling fetch client.
//!
//! A [`QuotePoller`] owns at most one polling cycle at a time. A cycle is a
//! spawned task driving a [`tokio::time::interval`]: the first tick fires
//! immediately, later ticks every `interval`. Each tick runs one
//! fetch-and-normalize attempt and reports `Loading` followed by `Ready` or
//! `Failed` to the registered [`QuoteObserver`].
//!
//! Cancellation aborts the cycle task, which drops any in-flight request. An
//! abort only lands at the task's next suspension point, so every transition
//! is also checked against the cycle generation under the state lock; a
//! cancelled cycle can neither notify the observer nor issue a new request
//! once `stop`, `start` or `set_key` has returned.
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use tickwatch_core::{AlphaVantageSource, FetchState, QuotePoller, Symbol};
//!
//! let source = Arc::new(AlphaVantageSource::from_env()?);
//! let poller = QuotePoller::new(source, Arc::new(|symbol: &Symbol, state: &FetchState| {
//!     println!("{symbol}: {state:?}");
//! }));
//! poller.start_default()?;
//! poller.set_key("msft")?;
//! ```

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use time::OffsetDateTime;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::config::{validate_interval, PollerConfig};
use crate::data_source::DataSource;
use crate::fetch::fetch_quote;
use crate::{FetchState, PollerError, Symbol};

/// Receives every state transition of the active cycle.
///
/// Called with the poller's state lock held: notifications are strictly
/// ordered, and an observer must not call back into the poller.
pub trait QuoteObserver: Send + Sync {
    fn on_state(&self, symbol: &Symbol, state: &FetchState);
}

impl<F> QuoteObserver for F
where
    F: Fn(&Symbol, &FetchState) + Send + Sync,
{
    fn on_state(&self, symbol: &Symbol, state: &FetchState) {
        self(symbol, state)
    }
}

/// Point-in-time view of the poller for presentation layers.
///
/// `state` and `updated_at` always belong to the cycle named by `symbol`;
/// a new cycle starts from `Loading` with no timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct PollerSnapshot {
    /// Key of the current (or last) cycle.
    pub symbol: Option<Symbol>,
    /// Outcome of the most recent attempt.
    pub state: FetchState,
    /// When the most recent attempt settled.
    pub updated_at: Option<OffsetDateTime>,
    pub running: bool,
}

struct CycleState {
    generation: u64,
    symbol: Option<Symbol>,
    interval: Duration,
    state: FetchState,
    updated_at: Option<OffsetDateTime>,
    task: Option<JoinHandle<()>>,
}

impl CycleState {
    /// Invalidate the current cycle and release its timer task.
    fn cancel(&mut self) -> bool {
        self.generation = self.generation.wrapping_add(1);
        match self.task.take() {
            Some(task) => {
                task.abort();
                true
            }
            None => false,
        }
    }

    fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }
}

struct Shared {
    source: Arc<dyn DataSource>,
    observer: Arc<dyn QuoteObserver>,
    cycle: Mutex<CycleState>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, CycleState> {
        self.cycle.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// One fetch attempt. Returns `false` once the cycle has been cancelled.
    async fn attempt(&self, generation: u64, symbol: &Symbol) -> bool {
        if !self.transition(generation, symbol, FetchState::Loading) {
            return false;
        }
        let outcome = fetch_quote(self.source.as_ref(), symbol).await;
        self.transition(generation, symbol, FetchState::from(outcome))
    }

    fn transition(&self, generation: u64, symbol: &Symbol, state: FetchState) -> bool {
        let mut cycle = self.lock();
        if cycle.generation != generation {
            debug!(%symbol, "discarding transition from cancelled cycle");
            return false;
        }
        if state.is_settled() {
            cycle.updated_at = Some(OffsetDateTime::now_utc());
        }
        cycle.state = state;
        self.observer.on_state(symbol, &cycle.state);
        true
    }
}

async fn run_cycle(shared: Arc<Shared>, generation: u64, symbol: Symbol, interval: Duration) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        ticker.tick().await;
        if !shared.attempt(generation, &symbol).await {
            break;
        }
    }
}

/// Periodic fetch client for one subscription key at a time.
pub struct QuotePoller {
    shared: Arc<Shared>,
    initial_symbol: Symbol,
}

impl QuotePoller {
    pub fn new(source: Arc<dyn DataSource>, observer: Arc<dyn QuoteObserver>) -> Self {
        Self::from_config(PollerConfig::default(), source, observer)
    }

    pub fn from_config(
        config: PollerConfig,
        source: Arc<dyn DataSource>,
        observer: Arc<dyn QuoteObserver>,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                source,
                observer,
                cycle: Mutex::new(CycleState {
                    generation: 0,
                    symbol: None,
                    interval: config.interval,
                    state: FetchState::Loading,
                    updated_at: None,
                    task: None,
                }),
            }),
            initial_symbol: config.initial_symbol,
        }
    }

    /// Start a cycle for `key`: fetch now, then every `interval`.
    ///
    /// Any running cycle is cancelled first. Must be called from within a
    /// Tokio runtime.
    ///
    /// # Errors
    ///
    /// [`PollerError::Validation`] for a blank key or zero interval,
    /// [`PollerError::RuntimeUnavailable`] outside a runtime. The running
    /// cycle is left untouched in both cases.
    pub fn start(&self, key: &str, interval: Duration) -> Result<(), PollerError> {
        let symbol = Symbol::parse(key)?;
        let interval = validate_interval(interval)?;
        self.launch(symbol, Some(interval))
    }

    /// Start the configured initial symbol at the configured interval.
    pub fn start_default(&self) -> Result<(), PollerError> {
        self.launch(self.initial_symbol.clone(), None)
    }

    /// Switch to `new_key`, keeping the current interval.
    ///
    /// A blank key is rejected and the running cycle keeps going.
    pub fn set_key(&self, new_key: &str) -> Result<(), PollerError> {
        let symbol = Symbol::parse(new_key)?;
        self.launch(symbol, None)
    }

    /// Cancel the running cycle, if any. No fetch is issued and no
    /// notification is delivered for it after this returns.
    pub fn stop(&self) {
        let mut cycle = self.shared.lock();
        if cycle.cancel() {
            info!(
                symbol = cycle.symbol.as_ref().map(Symbol::as_str),
                "polling cycle stopped"
            );
        }
    }

    pub fn snapshot(&self) -> PollerSnapshot {
        let cycle = self.shared.lock();
        PollerSnapshot {
            symbol: cycle.symbol.clone(),
            state: cycle.state.clone(),
            updated_at: cycle.updated_at,
            running: cycle.is_running(),
        }
    }

    pub fn state(&self) -> FetchState {
        self.shared.lock().state.clone()
    }

    pub fn symbol(&self) -> Option<Symbol> {
        self.shared.lock().symbol.clone()
    }

    pub fn interval(&self) -> Duration {
        self.shared.lock().interval
    }

    pub fn is_running(&self) -> bool {
        self.shared.lock().is_running()
    }

    fn launch(&self, symbol: Symbol, interval: Option<Duration>) -> Result<(), PollerError> {
        let runtime = Handle::try_current().map_err(|_| PollerError::RuntimeUnavailable)?;

        let mut cycle = self.shared.lock();
        let replaced = cycle.cancel();
        let generation = cycle.generation;
        let interval = interval.unwrap_or(cycle.interval);
        cycle.symbol = Some(symbol.clone());
        cycle.interval = interval;
        cycle.state = FetchState::Loading;
        cycle.updated_at = None;

        info!(
            %symbol,
            interval_secs = interval.as_secs(),
            replaced,
            source = self.shared.source.id(),
            "polling cycle started"
        );

        cycle.task = Some(runtime.spawn(run_cycle(
            Arc::clone(&self.shared),
            generation,
            symbol,
            interval,
        )));
        Ok(())
    }
}

impl Drop for QuotePoller {
    fn drop(&mut self) {
        self.stop();
    }
}

impl std::fmt::Debug for QuotePoller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let cycle = self.shared.lock();
        f.debug_struct("QuotePoller")
            .field("source", &self.shared.source.id())
            .field("symbol", &cycle.symbol)
            .field("interval", &cycle.interval)
            .field("state", &cycle.state)
            .field("running", &cycle.is_running())
            .finish()
    }
}
