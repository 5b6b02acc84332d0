//! Gateway error taxonomy and user-facing messages.

use std::fmt;

use thiserror::Error;

use crate::transport::TransportError;

/// Backend operations, used to pick the fallback error message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    FetchMarketData,
    RunBacktest,
    StartStream,
    StopStream,
    Health,
    ListSymbols,
    ListIntervals,
}

impl Operation {
    pub fn default_message(self) -> &'static str {
        match self {
            Operation::FetchMarketData => "Failed to fetch market data",
            Operation::RunBacktest => "Failed to run backtest",
            Operation::StartStream => "Failed to start live stream",
            Operation::StopStream => "Failed to stop live stream",
            Operation::Health => "Backend health check failed",
            Operation::ListSymbols => "Failed to list symbols",
            Operation::ListIntervals => "Failed to list intervals",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Operation::FetchMarketData => "fetch_market_data",
            Operation::RunBacktest => "run_backtest",
            Operation::StartStream => "start_stream",
            Operation::StopStream => "stop_stream",
            Operation::Health => "health",
            Operation::ListSymbols => "list_symbols",
            Operation::ListIntervals => "list_intervals",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GatewayError {
    /// The backend answered with `success: false`.
    #[error("backend reported failure: {}", .0.as_deref().unwrap_or("(no message)"))]
    Domain(Option<String>),

    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The body decoded as JSON but not into the expected shape.
    #[error("unexpected response shape: {0}")]
    Contract(String),
}

impl GatewayError {
    /// Text for the store's `error` field.
    ///
    /// Backend-provided text wins; otherwise the transport message if there is
    /// one; otherwise the operation's default.
    pub fn user_message(&self, op: Operation) -> String {
        let text = match self {
            GatewayError::Domain(msg) => msg.clone().unwrap_or_default(),
            GatewayError::Transport(e) => e.to_string(),
            GatewayError::Contract(msg) => msg.clone(),
        };
        if text.trim().is_empty() {
            op.default_message().to_string()
        } else {
            text
        }
    }

    pub fn is_domain(&self) -> bool {
        matches!(self, GatewayError::Domain(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_message_verbatim_or_default() {
        let e = GatewayError::Domain(Some("insufficient data".into()));
        assert_eq!(e.user_message(Operation::RunBacktest), "insufficient data");

        let e = GatewayError::Domain(None);
        assert_eq!(e.user_message(Operation::RunBacktest), "Failed to run backtest");

        let e = GatewayError::Domain(Some("  ".into()));
        assert_eq!(
            e.user_message(Operation::FetchMarketData),
            "Failed to fetch market data"
        );
    }

    #[test]
    fn transport_message_used_when_present() {
        let e = GatewayError::from(TransportError::Connect("connection refused".into()));
        assert_eq!(
            e.user_message(Operation::StartStream),
            "backend unreachable: connection refused"
        );

        let e = GatewayError::from(TransportError::Request(String::new()));
        assert_eq!(e.user_message(Operation::StopStream), "Failed to stop live stream");
    }
}
