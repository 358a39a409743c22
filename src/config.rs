use crate::card::SortKey;
use crate::card_list_machine::MachineConfig;
use crate::error::CardListError;
use std::env;
use std::time::Duration;
use url::Url;

pub const DEFAULT_API_BASE_URL: &str = "https://api.swu-db.com";
const DEFAULT_TIMEOUT_SECS: u64 = 15;

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub api_base_url: Url,
    pub api_token: Option<String>,
    pub initial_filter: String,
    pub initial_sort: SortKey,
    pub request_timeout: Duration,
    pub discard_stale_responses: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            api_base_url: Url::parse(DEFAULT_API_BASE_URL).expect("default base url is valid"),
            api_token: None,
            initial_filter: String::new(),
            initial_sort: SortKey::default(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            discard_stale_responses: true,
        }
    }
}

impl Settings {
    /// Reads settings from the process environment, after loading `.env`.
    pub fn from_env() -> Result<Self, CardListError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, CardListError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Settings::default();

        if let Some(v) = lookup("SWU_API_BASE_URL") {
            let url = Url::parse(v.trim()).map_err(|e| {
                CardListError::Configuration(format!("SWU_API_BASE_URL '{v}': {e}"))
            })?;
            if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
                return Err(CardListError::Configuration(format!(
                    "SWU_API_BASE_URL '{v}' must be an http(s) URL"
                )));
            }
            settings.api_base_url = url;
        }
        settings.api_token = lookup("SWU_API_TOKEN").filter(|t| !t.trim().is_empty());
        if let Some(v) = lookup("CARD_LIST_FILTER") {
            settings.initial_filter = v;
        }
        if let Some(v) = lookup("CARD_LIST_SORT") {
            settings.initial_sort = v.parse()?;
        }
        if let Some(v) = lookup("CARD_LIST_TIMEOUT_SECS") {
            let secs: u64 = v.trim().parse().map_err(|_| {
                CardListError::Configuration(format!("CARD_LIST_TIMEOUT_SECS '{v}' is not a number"))
            })?;
            settings.request_timeout = Duration::from_secs(secs);
        }
        if let Some(v) = lookup("CARD_LIST_DISCARD_STALE") {
            settings.discard_stale_responses = parse_flag("CARD_LIST_DISCARD_STALE", &v)?;
        }

        Ok(settings)
    }

    pub fn machine_config(&self) -> MachineConfig {
        MachineConfig {
            initial_filter: self.initial_filter.clone(),
            initial_sort: self.initial_sort,
            discard_stale_responses: self.discard_stale_responses,
        }
    }
}

fn parse_flag(key: &str, value: &str) -> Result<bool, CardListError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(CardListError::Configuration(format!(
            "{key} '{value}' is not a boolean"
        ))),
    }
}
