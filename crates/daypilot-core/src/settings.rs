use std::path::PathBuf;

use chrono_tz::Tz;

/// Configuration error. Fatal at startup: the process prints the
/// diagnostic and never enters the receive loop.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value for {key}: {detail}")]
    Invalid { key: &'static str, detail: String },
}

/// Process configuration, read once at startup from the environment.
#[derive(Clone, Debug)]
pub struct Settings {
    pub bot_token: String,
    pub chat_id: i64,
    pub database_path: PathBuf,
    pub timezone: Tz,
    pub reminder_hour: u32,
    pub reminder_minute: u32,
}

impl Settings {
    pub fn from_env() -> Result<Self, SettingsError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from any key lookup. Tests inject values here
    /// instead of mutating the process environment.
    pub fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, SettingsError> {
        // Empty values count as unset, matching `VAR=` in a unit file.
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let bot_token = get("TELEGRAM_BOT_TOKEN")
            .ok_or(SettingsError::Missing("TELEGRAM_BOT_TOKEN"))?;

        let chat_id = get("TELEGRAM_CHAT_ID")
            .ok_or(SettingsError::Missing("TELEGRAM_CHAT_ID"))?
            .trim()
            .parse::<i64>()
            .map_err(|e| SettingsError::Invalid {
                key: "TELEGRAM_CHAT_ID",
                detail: e.to_string(),
            })?;

        let database_path = get("DATABASE_PATH")
            .map(PathBuf::from)
            .ok_or(SettingsError::Missing("DATABASE_PATH"))?;

        let timezone = match get("TIMEZONE") {
            Some(name) => name.trim().parse::<Tz>().map_err(|_| SettingsError::Invalid {
                key: "TIMEZONE",
                detail: format!("unknown time zone: {name}"),
            })?,
            None => chrono_tz::Europe::Paris,
        };

        let reminder_hour = parse_clock_component(&get, "REMINDER_HOUR", 21, 23)?;
        let reminder_minute = parse_clock_component(&get, "REMINDER_MINUTE", 0, 59)?;

        Ok(Self {
            bot_token,
            chat_id,
            database_path,
            timezone,
            reminder_hour,
            reminder_minute,
        })
    }
}

fn parse_clock_component(
    get: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: u32,
    max: u32,
) -> Result<u32, SettingsError> {
    let Some(raw) = get(key) else {
        return Ok(default);
    };
    let value = raw
        .trim()
        .parse::<u32>()
        .map_err(|e| SettingsError::Invalid {
            key,
            detail: e.to_string(),
        })?;
    if value > max {
        return Err(SettingsError::Invalid {
            key,
            detail: format!("out of range: {value}"),
        });
    }
    Ok(value)
}
