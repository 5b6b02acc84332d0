//! macdscope client — everything that talks to the backtest backend.
//!
//! - `Transport` seam with a blocking reqwest implementation
//! - Wire envelope decoding and conversion into core domain types
//! - `BackendGateway` (one blocking call per operation)
//! - `Dispatcher` (worker threads, results drained onto the store owner's thread)
//! - TOML settings

pub mod convert;
pub mod dispatch;
pub mod error;
pub mod gateway;
pub mod settings;
pub mod transport;
pub mod wire;

pub use dispatch::{DispatchEvent, Dispatcher, GatewayCommand};
pub use error::{GatewayError, Operation};
pub use gateway::{
    BackendGateway, BacktestOutcome, BacktestParams, MarketData, MarketDataRequest, StreamRequest,
    DEFAULT_TIMEZONE,
};
pub use settings::{Settings, SettingsError};
pub use transport::{HttpTransport, Transport, TransportError};
pub use wire::{HealthStatus, IntervalOption, MarketMetadata};
