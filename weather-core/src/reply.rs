//! User-facing reply texts.

use crate::model::{Reply, WeatherSnapshot};

pub const HELP: &str = "ℹ️ *Available commands:*\n\
    /weather <city> - current weather in the given city.\n\
    /weather - current weather in your saved city.\n\
    /setcity <city> - save a city for future requests.\n\
    /getcity - show your saved city.\n\
    /help - show this list.";

pub const SPECIFY_CITY: &str = "❓ Please specify a city.\nExample: /weather Moscow";
pub const SETCITY_USAGE: &str = "❓ Please specify a city.\nExample: /setcity Moscow";
pub const WEATHER_UNAVAILABLE: &str =
    "❌ Could not retrieve weather data. Check the city name.";
pub const CITY_NOT_SET: &str = "❌ No city saved. Use /setcity <city> to save one.";
pub const SETTINGS_READ_FAILED: &str =
    "❌ Could not read your settings. Please try again later.";
pub const SETTINGS_WRITE_FAILED: &str = "❌ Could not save your city. Please try again later.";
pub const UNKNOWN_COMMAND: &str = "🤷 Unknown command. Send /help to see what I can do.";

pub fn help() -> Reply {
    Reply::markdown(HELP)
}

pub fn city_set(city: &str) -> Reply {
    Reply::plain(format!("✅ City set to {city}"))
}

pub fn current_city(city: &str) -> Reply {
    Reply::plain(format!("📍 Your saved city: {city}"))
}

pub fn weather(snapshot: &WeatherSnapshot) -> Reply {
    Reply::markdown(format!(
        "🌤 *Weather in {}*\n\
         🌡 *Temperature:* {}°C\n\
         🌡 *Feels like:* {}°C\n\
         ☁️ *Conditions:* {}\n\
         💧 *Humidity:* {}%\n\
         💨 *Wind speed:* {} m/s",
        snapshot.city,
        snapshot.temperature_c,
        snapshot.feels_like_c,
        capitalize(&snapshot.description),
        snapshot.humidity_pct,
        snapshot.wind_speed_mps,
    ))
}

/// Upper-case the first character and lower-case the rest.
fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}
