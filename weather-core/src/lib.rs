//! Core library for the weather bot.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The OpenWeather client and its freshness cache
//! - Preference and audit stores (Postgres and in-memory)
//! - The command processor that ties them together
//!
//! It is used by `weather-bot`, which supplies the chat transport and the history API.

pub mod cache;
pub mod clock;
pub mod config;
pub mod model;
pub mod processor;
pub mod provider;
pub mod reply;
pub mod store;
pub mod transport;

pub use cache::FreshnessCache;
pub use clock::{Clock, SystemClock};
pub use config::{Config, DatabaseConfig, HttpConfig, ProviderConfig};
pub use model::{AuditRecord, Command, NewAuditRecord, Reply, ReplyFormat, WeatherSnapshot};
pub use processor::{AuditStatus, CommandProcessor, Dispatch};
pub use provider::{WeatherError, WeatherProvider};
pub use store::{AuditHistory, AuditLog, LogQuery, PersistenceError, PreferenceStore};
pub use transport::{Transport, TransportError};
