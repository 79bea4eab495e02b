use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A decoded chat command, owned by a single dispatch call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub user_id: i64,
    pub name: String,
    pub args: Vec<String>,
    pub raw_text: String,
}

impl Command {
    /// Parse a chat line such as `/weather@SomeBot Nizhny Novgorod`.
    ///
    /// Returns `None` when the line is not a command (no leading `/` or no name).
    pub fn parse(user_id: i64, raw_text: &str) -> Option<Self> {
        let trimmed = raw_text.trim();
        let body = trimmed.strip_prefix('/')?;

        let mut parts = body.split_whitespace();
        let head = parts.next()?;
        let name = head.split('@').next().unwrap_or(head);
        if name.is_empty() {
            return None;
        }

        Some(Self {
            user_id,
            name: name.to_lowercase(),
            args: parts.map(str::to_string).collect(),
            raw_text: trimmed.to_string(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyFormat {
    Plain,
    Markdown,
}

/// Text handed back to the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub format: ReplyFormat,
}

impl Reply {
    pub fn plain(text: impl Into<String>) -> Self {
        Self { text: text.into(), format: ReplyFormat::Plain }
    }

    pub fn markdown(text: impl Into<String>) -> Self {
        Self { text: text.into(), format: ReplyFormat::Markdown }
    }
}

/// One provider observation for a city.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub city: String,
    pub temperature_c: f64,
    pub feels_like_c: f64,
    pub description: String,
    pub humidity_pct: u8,
    pub wind_speed_mps: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserPreference {
    pub user_id: i64,
    pub city: String,
}

/// Fields the caller supplies when appending to the audit log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAuditRecord {
    pub user_id: i64,
    pub command: String,
    pub response: String,
}

/// A stored audit log row. `id` and `timestamp` are assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct AuditRecord {
    pub id: i64,
    pub user_id: i64,
    pub command: String,
    pub timestamp: DateTime<Utc>,
    pub response: String,
}
