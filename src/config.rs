//! Support for library configuration options
//!
//! Store credentials are supplied by the environment.

use std::error::Error;

use chrono::{FixedOffset, Offset, Utc};

/// Name of the collection that holds tasks
pub const TASKS: &str = "tasks";
/// Name of the collection that holds personal time slots
pub const TIME_SLOTS: &str = "time_slots";

/// Base URL of the hosted store (mandatory)
pub const STORE_URL_VAR: &str = "DAYBOOK_STORE_URL";
/// Anonymous API key of the hosted store (mandatory)
pub const STORE_KEY_VAR: &str = "DAYBOOK_STORE_KEY";
/// Access token of the signed-in user (optional)
pub const STORE_TOKEN_VAR: &str = "DAYBOOK_STORE_TOKEN";
/// UTC offset the class timetable is expressed in, e.g. `+05:30` (optional, defaults to UTC)
pub const UTC_OFFSET_VAR: &str = "DAYBOOK_UTC_OFFSET";

/// How to reach the store, and where the timetable lives
#[derive(Clone, Debug, PartialEq)]
pub struct StoreConfig {
    pub url: String,
    pub api_key: String,
    pub access_token: Option<String>,
    pub utc_offset: FixedOffset,
}

impl StoreConfig {
    pub fn new<S: ToString, T: ToString>(url: S, api_key: T) -> Self {
        Self {
            url: url.to_string(),
            api_key: api_key.to_string(),
            access_token: None,
            utc_offset: Utc.fix(),
        }
    }

    /// Read the configuration from the process environment
    pub fn from_env() -> Result<Self, Box<dyn Error>> {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    /// Read the configuration from any variable lookup
    pub fn from_vars<F>(lookup: F) -> Result<Self, Box<dyn Error>>
    where
        F: Fn(&str) -> Option<String>,
    {
        let url = lookup(STORE_URL_VAR)
            .ok_or_else(|| format!("Missing environment variable {}", STORE_URL_VAR))?;
        let api_key = lookup(STORE_KEY_VAR)
            .ok_or_else(|| format!("Missing environment variable {}", STORE_KEY_VAR))?;

        let mut config = Self::new(url, api_key);
        config.access_token = lookup(STORE_TOKEN_VAR).filter(|t| t.is_empty() == false);
        if let Some(offset) = lookup(UTC_OFFSET_VAR) {
            config.utc_offset = parse_utc_offset(&offset)?;
        }
        Ok(config)
    }
}

/// Parse offsets like `+05:30`, `-04:00` or `Z`
pub fn parse_utc_offset(text: &str) -> Result<FixedOffset, Box<dyn Error>> {
    let text = text.trim();
    if text == "Z" || text.is_empty() {
        return Ok(Utc.fix());
    }

    let (sign, rest) = match text.chars().next() {
        Some('+') => (1, &text[1..]),
        Some('-') => (-1, &text[1..]),
        _ => return Err(format!("Invalid UTC offset {:?}: it must start with + or -", text).into()),
    };
    if rest.chars().any(|c| c != ':' && c.is_ascii_digit() == false) {
        return Err(format!("Invalid UTC offset {:?}", text).into());
    }
    let mut parts = rest.splitn(2, ':');
    let hours: u32 = parts.next().unwrap_or("").parse()?;
    let minutes: u32 = match parts.next() {
        None => 0,
        Some(m) => m.parse()?,
    };
    if hours > 23 || minutes > 59 {
        return Err(format!("Invalid UTC offset {:?}", text).into());
    }

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60) as i32)
        .ok_or_else(|| format!("Invalid UTC offset {:?}", text).into())
}
