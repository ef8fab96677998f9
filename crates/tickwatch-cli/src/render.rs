//! Line rendering for poller state transitions.

use tickwatch_core::{FetchErrorKind, FetchState, Quote, Symbol};

/// Render one transition as a single terminal line.
pub fn state_line(symbol: &Symbol, state: &FetchState) -> String {
    match state {
        FetchState::Loading => format!("{symbol}  Loading..."),
        FetchState::Ready(quote) => quote_line(quote),
        FetchState::Failed(error) => {
            let headline = match error.kind() {
                FetchErrorKind::Transport => "Error fetching stock data",
                FetchErrorKind::Upstream | FetchErrorKind::Parse => "Unable to fetch stock data",
            };
            format!("{symbol}  {headline}: {error}")
        }
    }
}

fn quote_line(quote: &Quote) -> String {
    let arrow = if quote.is_gain() { '▲' } else { '▼' };
    format!(
        "{}  Current Price: ${:.2}  Change: {arrow} ${:.2} ({})",
        quote.symbol, quote.price, quote.change, quote.change_percent
    )
}
