//! Behavior-driven tests for the polling fetch client.
//!
//! These tests drive `QuotePoller` against scripted data sources on a paused
//! Tokio clock, checking the observer's view of each cycle: ordering of
//! transitions, timer ownership, and isolation of cancelled cycles.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::{json, Value};
use tokio::sync::Notify;

use tickwatch_core::{
    DataSource, FetchErrorKind, FetchState, PollerConfig, PollerError, Quote, QuotePoller,
    RawResponse, Symbol, TransportError, ValidationError,
};

const FIVE_MINUTES: Duration = Duration::from_secs(5 * 60);

// =============================================================================
// Test doubles
// =============================================================================

#[derive(Clone)]
enum Reply {
    Body(Value),
    Fail(&'static str),
}

#[derive(Default)]
struct ScriptedSource {
    replies: HashMap<String, Reply>,
    gates: HashMap<String, Arc<Notify>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedSource {
    fn new() -> Self {
        Self::default()
    }

    fn reply(mut self, symbol: &str, reply: Reply) -> Self {
        self.replies.insert(symbol.to_owned(), reply);
        self
    }

    /// Hold every fetch for `symbol` until the returned gate is notified.
    fn gated(mut self, symbol: &str) -> (Self, Arc<Notify>) {
        let gate = Arc::new(Notify::new());
        self.gates.insert(symbol.to_owned(), Arc::clone(&gate));
        (self, gate)
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("call log should not be poisoned").clone()
    }
}

impl DataSource for ScriptedSource {
    fn id(&self) -> &'static str {
        "scripted"
    }

    fn fetch<'a>(
        &'a self,
        symbol: &'a Symbol,
    ) -> Pin<Box<dyn Future<Output = Result<RawResponse, TransportError>> + Send + 'a>> {
        self.calls
            .lock()
            .expect("call log should not be poisoned")
            .push(symbol.to_string());
        let reply = self
            .replies
            .get(symbol.as_str())
            .cloned()
            .unwrap_or(Reply::Fail("no scripted reply"));
        let gate = self.gates.get(symbol.as_str()).cloned();

        Box::pin(async move {
            if let Some(gate) = gate {
                gate.notified().await;
            }
            match reply {
                Reply::Body(body) => Ok(body),
                Reply::Fail(message) => Err(TransportError::new(message)),
            }
        })
    }
}

type EventLog = Arc<Mutex<Vec<(String, FetchState)>>>;

fn recording_poller(source: Arc<ScriptedSource>) -> (QuotePoller, EventLog) {
    let events: EventLog = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    let poller = QuotePoller::new(
        source,
        Arc::new(move |symbol: &Symbol, state: &FetchState| {
            sink.lock()
                .expect("event log should not be poisoned")
                .push((symbol.to_string(), state.clone()));
        }),
    );
    (poller, events)
}

fn events_of(log: &EventLog) -> Vec<(String, FetchState)> {
    log.lock().expect("event log should not be poisoned").clone()
}

fn global_quote(symbol: &str, price: &str, change: &str, change_percent: &str) -> Value {
    json!({
        "Global Quote": {
            "01. symbol": symbol,
            "05. price": price,
            "09. change": change,
            "10. change percent": change_percent
        }
    })
}

fn quote(symbol: &str, price: f64, change: f64, change_percent: &str) -> Quote {
    Quote::new(
        Symbol::parse(symbol).expect("valid symbol"),
        price,
        change,
        change_percent,
    )
    .expect("valid quote")
}

/// Let spawned cycle tasks run until they block on their next tick.
async fn settle() {
    for _ in 0..16 {
        tokio::task::yield_now().await;
    }
}

// =============================================================================
// Single attempt outcomes
// =============================================================================

#[tokio::test(start_paused = true)]
async fn when_payload_is_well_formed_observer_sees_loading_then_ready() {
    // Given: the upstream answers AAPL with a string-typed quote payload
    let source = Arc::new(
        ScriptedSource::new().reply(
            "AAPL",
            Reply::Body(global_quote("AAPL", "150.25", "-1.50", "-0.99%")),
        ),
    );
    let (poller, events) = recording_poller(Arc::clone(&source));

    // When: polling starts with the default five-minute interval
    poller.start("AAPL", FIVE_MINUTES).expect("valid start");
    settle().await;

    // Then: exactly Loading → Ready(quote) is delivered
    assert_eq!(
        events_of(&events),
        vec![
            (String::from("AAPL"), FetchState::Loading),
            (
                String::from("AAPL"),
                FetchState::Ready(quote("AAPL", 150.25, -1.50, "-0.99%"))
            ),
        ]
    );
    assert_eq!(source.calls(), vec![String::from("AAPL")]);
    assert!(poller.snapshot().updated_at.is_some());
}

#[tokio::test(start_paused = true)]
async fn when_transport_fails_observer_sees_transport_error() {
    // Given: every request for the symbol fails before a response arrives
    let source = Arc::new(ScriptedSource::new().reply("AAPL", Reply::Fail("connection reset")));
    let (poller, events) = recording_poller(source);

    // When
    poller.start("aapl", FIVE_MINUTES).expect("valid start");
    settle().await;

    // Then
    let events = events_of(&events);
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].1, FetchState::Loading);
    let error = events[1].1.error().expect("second transition is a failure");
    assert_eq!(error.kind(), FetchErrorKind::Transport);
    assert!(error.message().contains("connection reset"));
}

#[tokio::test(start_paused = true)]
async fn when_marker_object_is_absent_outcome_is_upstream_error() {
    let source = Arc::new(ScriptedSource::new().reply(
        "ZZZZ",
        Reply::Body(json!({ "Error Message": "Invalid API call." })),
    ));
    let (poller, _events) = recording_poller(source);

    poller.start("ZZZZ", FIVE_MINUTES).expect("valid start");
    settle().await;

    assert_eq!(poller.state().failure_kind(), Some(FetchErrorKind::Upstream));
}

#[tokio::test(start_paused = true)]
async fn when_price_is_not_numeric_outcome_is_parse_error() {
    let source = Arc::new(ScriptedSource::new().reply(
        "AAPL",
        Reply::Body(global_quote("AAPL", "one fifty", "-1.50", "-0.99%")),
    ));
    let (poller, _events) = recording_poller(source);

    poller.start("AAPL", FIVE_MINUTES).expect("valid start");
    settle().await;

    assert_eq!(poller.state().failure_kind(), Some(FetchErrorKind::Parse));
}

// =============================================================================
// Timer ownership
// =============================================================================

#[tokio::test(start_paused = true)]
async fn when_start_is_called_twice_only_one_timer_survives() {
    // Given
    let source = Arc::new(ScriptedSource::new().reply(
        "AAPL",
        Reply::Body(global_quote("AAPL", "150.25", "-1.50", "-0.99%")),
    ));
    let (poller, events) = recording_poller(Arc::clone(&source));

    // When: start is issued twice back to back, then two intervals elapse
    poller.start("AAPL", FIVE_MINUTES).expect("valid start");
    poller.start("AAPL", FIVE_MINUTES).expect("valid restart");
    tokio::time::sleep(FIVE_MINUTES * 2 + Duration::from_secs(1)).await;

    // Then: 1 immediate + 2 scheduled attempts, not double that
    assert_eq!(source.calls().len(), 3);
    let events = events_of(&events);
    assert_eq!(events.len(), 6);
    for pair in events.chunks(2) {
        assert_eq!(pair[0].1, FetchState::Loading);
        assert!(pair[1].1.quote().is_some());
    }
}

#[tokio::test(start_paused = true)]
async fn when_attempt_fails_the_next_tick_still_fires() {
    let source = Arc::new(ScriptedSource::new().reply("AAPL", Reply::Fail("timeout")));
    let (poller, events) = recording_poller(Arc::clone(&source));

    poller.start("AAPL", FIVE_MINUTES).expect("valid start");
    tokio::time::sleep(FIVE_MINUTES * 2 + Duration::from_secs(1)).await;

    assert_eq!(source.calls().len(), 3);
    let failures = events_of(&events)
        .iter()
        .filter(|(_, state)| state.failure_kind() == Some(FetchErrorKind::Transport))
        .count();
    assert_eq!(failures, 3);
    assert!(poller.is_running());
}

#[tokio::test(start_paused = true)]
async fn when_stopped_no_further_attempts_happen() {
    // Given: a running cycle that has completed its immediate attempt
    let source = Arc::new(ScriptedSource::new().reply(
        "AAPL",
        Reply::Body(global_quote("AAPL", "150.25", "-1.50", "-0.99%")),
    ));
    let (poller, events) = recording_poller(Arc::clone(&source));
    poller.start("AAPL", FIVE_MINUTES).expect("valid start");
    settle().await;

    // When: the cycle is stopped and a long time passes
    poller.stop();
    tokio::time::sleep(FIVE_MINUTES * 6).await;

    // Then: nothing else was fetched or reported, and the last outcome is kept
    assert_eq!(source.calls().len(), 1);
    assert_eq!(events_of(&events).len(), 2);
    assert!(!poller.is_running());
    assert!(poller.state().quote().is_some());

    // And: stopping again is a no-op
    poller.stop();
    assert!(!poller.is_running());
}

// =============================================================================
// Switching symbols
// =============================================================================

#[tokio::test(start_paused = true)]
async fn when_key_changes_mid_flight_old_result_is_discarded() {
    // Given: the AAPL fetch hangs until released; MSFT answers immediately
    let (scripted, aapl_gate) = ScriptedSource::new()
        .reply(
            "AAPL",
            Reply::Body(global_quote("AAPL", "150.25", "-1.50", "-0.99%")),
        )
        .reply(
            "MSFT",
            Reply::Body(global_quote("MSFT", "410.10", "2.05", "0.50%")),
        )
        .gated("AAPL");
    let source = Arc::new(scripted);
    let (poller, events) = recording_poller(Arc::clone(&source));

    poller.start("AAPL", FIVE_MINUTES).expect("valid start");
    settle().await;
    assert_eq!(source.calls(), vec![String::from("AAPL")]);

    // When: the key switches while AAPL is in flight, then AAPL resolves
    poller.set_key("msft").expect("valid key");
    settle().await;
    aapl_gate.notify_one();
    settle().await;

    // Then: the AAPL result never reaches the observer or the state
    assert_eq!(
        events_of(&events),
        vec![
            (String::from("AAPL"), FetchState::Loading),
            (String::from("MSFT"), FetchState::Loading),
            (
                String::from("MSFT"),
                FetchState::Ready(quote("MSFT", 410.10, 2.05, "0.50%"))
            ),
        ]
    );
    assert_eq!(
        poller.state(),
        FetchState::Ready(quote("MSFT", 410.10, 2.05, "0.50%"))
    );
    assert_eq!(poller.symbol().map(String::from), Some(String::from("MSFT")));
}

#[tokio::test(start_paused = true)]
async fn when_key_changes_snapshot_never_pairs_new_symbol_with_old_quote() {
    // Given: AAPL has settled to Ready
    let source = Arc::new(
        ScriptedSource::new()
            .reply(
                "AAPL",
                Reply::Body(global_quote("AAPL", "150.25", "-1.50", "-0.99%")),
            )
            .reply(
                "MSFT",
                Reply::Body(global_quote("MSFT", "410.10", "2.05", "0.50%")),
            ),
    );
    let (poller, _events) = recording_poller(source);
    poller.start("AAPL", FIVE_MINUTES).expect("valid start");
    settle().await;
    assert!(poller.snapshot().updated_at.is_some());

    // When: the key switches, before the MSFT cycle has run
    poller.set_key("MSFT").expect("valid key");
    let snapshot = poller.snapshot();

    // Then: the snapshot describes the MSFT cycle only
    assert_eq!(snapshot.symbol.as_ref().map(Symbol::as_str), Some("MSFT"));
    assert!(snapshot.state.is_loading());
    assert!(snapshot.updated_at.is_none());

    // And: once MSFT settles, state and symbol agree
    settle().await;
    let snapshot = poller.snapshot();
    assert_eq!(
        snapshot.state.quote().map(|quote| quote.symbol.as_str()),
        snapshot.symbol.as_ref().map(Symbol::as_str)
    );
    assert!(snapshot.updated_at.is_some());
}

#[tokio::test(start_paused = true)]
async fn when_failing_fetch_is_superseded_its_error_is_dropped() {
    let (scripted, aapl_gate) = ScriptedSource::new()
        .reply("AAPL", Reply::Fail("socket closed"))
        .reply(
            "TSLA",
            Reply::Body(global_quote("TSLA", "180.00", "0.00", "0.0000%")),
        )
        .gated("AAPL");
    let (poller, events) = recording_poller(Arc::new(scripted));

    poller.start("AAPL", FIVE_MINUTES).expect("valid start");
    settle().await;
    poller.set_key("TSLA").expect("valid key");
    aapl_gate.notify_one();
    settle().await;

    assert!(events_of(&events)
        .iter()
        .all(|(_, state)| state.failure_kind().is_none()));
    assert!(poller.state().quote().is_some());
}

#[tokio::test(start_paused = true)]
async fn when_new_key_is_blank_the_running_cycle_is_untouched() {
    let source = Arc::new(ScriptedSource::new().reply(
        "AAPL",
        Reply::Body(global_quote("AAPL", "150.25", "-1.50", "-0.99%")),
    ));
    let (poller, events) = recording_poller(Arc::clone(&source));
    poller.start("AAPL", FIVE_MINUTES).expect("valid start");
    settle().await;

    let result = poller.set_key("   ");

    assert_eq!(
        result,
        Err(PollerError::Validation(ValidationError::EmptySymbol))
    );
    assert_eq!(poller.symbol().map(String::from), Some(String::from("AAPL")));
    assert!(poller.is_running());
    assert_eq!(events_of(&events).len(), 2);

    // The running cycle keeps ticking.
    tokio::time::sleep(FIVE_MINUTES + Duration::from_secs(1)).await;
    assert_eq!(source.calls().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn set_key_restarts_immediately_and_keeps_the_interval() {
    // Given: a one-minute cycle on AAPL
    let source = Arc::new(
        ScriptedSource::new()
            .reply(
                "AAPL",
                Reply::Body(global_quote("AAPL", "150.25", "-1.50", "-0.99%")),
            )
            .reply(
                "NVDA",
                Reply::Body(global_quote("NVDA", "900.00", "12.00", "1.35%")),
            ),
    );
    let (poller, _events) = recording_poller(Arc::clone(&source));
    let minute = Duration::from_secs(60);
    poller.start("AAPL", minute).expect("valid start");
    tokio::time::sleep(Duration::from_secs(30)).await;

    // When: switching to NVDA half way through the interval
    poller.set_key("nvda").expect("valid key");
    tokio::time::sleep(minute + Duration::from_secs(1)).await;

    // Then: NVDA fetched at once and again one interval later; AAPL never again
    assert_eq!(
        source.calls(),
        vec![
            String::from("AAPL"),
            String::from("NVDA"),
            String::from("NVDA")
        ]
    );
    assert_eq!(poller.interval(), minute);
}

#[tokio::test(start_paused = true)]
async fn set_key_before_any_start_uses_the_configured_interval() {
    let source = Arc::new(ScriptedSource::new().reply(
        "MSFT",
        Reply::Body(global_quote("MSFT", "410.10", "2.05", "0.50%")),
    ));
    let config = PollerConfig::new("AAPL", Duration::from_secs(90)).expect("valid config");
    let poller = QuotePoller::from_config(
        config,
        Arc::clone(&source) as Arc<dyn DataSource>,
        Arc::new(|_: &Symbol, _: &FetchState| {}),
    );

    poller.set_key("MSFT").expect("valid key");
    tokio::time::sleep(Duration::from_secs(91)).await;

    assert_eq!(poller.interval(), Duration::from_secs(90));
    assert_eq!(source.calls().len(), 2);
}
