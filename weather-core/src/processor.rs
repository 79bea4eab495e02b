//! Command orchestration: resolve city, fetch through the cache, reply, audit.

use std::sync::Arc;

use crate::{
    cache::FreshnessCache,
    model::{Command, NewAuditRecord, Reply},
    provider::WeatherProvider,
    reply,
    store::{AuditLog, PreferenceStore},
    transport::Transport,
};

/// What happened to the audit step of a dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditStatus {
    /// The command is not audited (help, settings, prompts).
    NotRequired,
    Recorded,
    /// The append failed after the reply was delivered.
    Failed,
    /// The reply was not delivered, so nothing was written.
    Skipped,
}

/// Result of handling one command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dispatch {
    pub reply: Reply,
    pub delivered: bool,
    pub audit: AuditStatus,
}

pub struct CommandProcessor {
    provider: Arc<dyn WeatherProvider>,
    cache: Arc<FreshnessCache>,
    preferences: Arc<dyn PreferenceStore>,
    audit: Arc<dyn AuditLog>,
}

impl CommandProcessor {
    pub fn new(
        provider: Arc<dyn WeatherProvider>,
        cache: Arc<FreshnessCache>,
        preferences: Arc<dyn PreferenceStore>,
        audit: Arc<dyn AuditLog>,
    ) -> Self {
        Self { provider, cache, preferences, audit }
    }

    /// Handle `command` and hand the reply to `transport`.
    ///
    /// Never fails: every collaborator error is turned into a reply or a log line.
    pub async fn dispatch(&self, command: &Command, transport: &dyn Transport) -> Dispatch {
        match command.name.as_str() {
            "weather" => self.weather(command, transport).await,
            "setcity" => {
                let reply = self.set_city(command).await;
                deliver(command, reply, transport).await
            }
            "getcity" => {
                let reply = self.get_city(command).await;
                deliver(command, reply, transport).await
            }
            "help" | "start" => deliver(command, reply::help(), transport).await,
            other => {
                tracing::info!(user_id = command.user_id, command = other, "unknown command");
                deliver(command, Reply::plain(reply::UNKNOWN_COMMAND), transport).await
            }
        }
    }

    async fn weather(&self, command: &Command, transport: &dyn Transport) -> Dispatch {
        let user_id = command.user_id;
        tracing::info!(user_id, "weather requested");

        let city = match self.resolve_city(command).await {
            Ok(city) => city,
            Err(prompt) => return deliver(command, prompt, transport).await,
        };

        let reply = self.weather_reply(&city).await;

        let mut dispatch = deliver(command, reply, transport).await;
        if !dispatch.delivered {
            dispatch.audit = AuditStatus::Skipped;
            return dispatch;
        }

        let record = NewAuditRecord {
            user_id,
            command: command.raw_text.clone(),
            response: dispatch.reply.text.clone(),
        };
        dispatch.audit = match self.audit.append(record).await {
            Ok(()) => {
                tracing::info!(user_id, "weather request logged");
                AuditStatus::Recorded
            }
            Err(err) => {
                tracing::error!(user_id, error = %err, "failed to log weather request");
                AuditStatus::Failed
            }
        };

        dispatch
    }

    /// City from the arguments, else the saved preference. `Err` carries the reply to send instead.
    async fn resolve_city(&self, command: &Command) -> Result<String, Reply> {
        let user_id = command.user_id;

        if !command.args.is_empty() {
            let city = command.args.join(" ");
            tracing::info!(user_id, city = %city, "city given in command");
            return Ok(city);
        }

        match self.preferences.get(user_id).await {
            Ok(Some(city)) => {
                tracing::info!(user_id, city = %city, "using saved city");
                Ok(city)
            }
            Ok(None) => {
                tracing::info!(user_id, "no city given and none saved");
                Err(Reply::plain(reply::SPECIFY_CITY))
            }
            Err(err) => {
                tracing::error!(user_id, error = %err, "failed to read user settings");
                Err(Reply::plain(reply::SETTINGS_READ_FAILED))
            }
        }
    }

    /// Weather report for `city`, or the generic failure text.
    pub async fn weather_reply(&self, city: &str) -> Reply {
        match self.cache.get_or_fetch(city, || self.provider.fetch(city)).await {
            Ok(snapshot) => reply::weather(&snapshot),
            Err(err) => {
                tracing::warn!(city, error = %err, "weather lookup failed");
                Reply::plain(reply::WEATHER_UNAVAILABLE)
            }
        }
    }

    async fn set_city(&self, command: &Command) -> Reply {
        let user_id = command.user_id;
        if command.args.is_empty() {
            tracing::info!(user_id, "setcity without a city");
            return Reply::plain(reply::SETCITY_USAGE);
        }

        let city = command.args.join(" ");
        match self.preferences.set(user_id, &city).await {
            Ok(()) => {
                tracing::info!(user_id, city = %city, "saved city");
                reply::city_set(&city)
            }
            Err(err) => {
                tracing::error!(user_id, error = %err, "failed to save city");
                Reply::plain(reply::SETTINGS_WRITE_FAILED)
            }
        }
    }

    async fn get_city(&self, command: &Command) -> Reply {
        let user_id = command.user_id;
        match self.preferences.get(user_id).await {
            Ok(Some(city)) => reply::current_city(&city),
            Ok(None) => Reply::plain(reply::CITY_NOT_SET),
            Err(err) => {
                tracing::error!(user_id, error = %err, "failed to read user settings");
                Reply::plain(reply::SETTINGS_READ_FAILED)
            }
        }
    }
}

async fn deliver(command: &Command, reply: Reply, transport: &dyn Transport) -> Dispatch {
    let user_id = command.user_id;
    let delivered = match transport.send(user_id, &reply).await {
        Ok(()) => true,
        Err(err) => {
            tracing::error!(user_id, error = %err, "failed to send reply");
            false
        }
    };

    Dispatch { reply, delivered, audit: AuditStatus::NotRequired }
}
