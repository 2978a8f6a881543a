use std::{path::PathBuf, time::Duration};

use chrono::FixedOffset;
use serde::Deserialize;
use serde_aux::field_attributes::deserialize_number_from_string;

#[derive(Deserialize, Clone, Debug)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub venue: VenueSettings,
    pub fetcher: FetcherSettings,
    pub line: LineSettings,
    pub cache: CacheSettings,
}

#[derive(Deserialize, Clone, Debug)]
pub struct ApplicationSettings {
    pub host: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,
}

#[derive(Deserialize, Clone, Debug)]
pub struct VenueSettings {
    pub url: String,
    pub code: String,
    pub name: String,
    pub marker_selector: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub utc_offset_hours: i32,
    #[serde(default)]
    pub include_date: bool,
}

impl VenueSettings {
    pub fn utc_offset(&self) -> Option<FixedOffset> {
        FixedOffset::east_opt(self.utc_offset_hours * 3600)
    }
}

#[derive(Deserialize, Clone, Debug)]
pub struct FetcherSettings {
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub max_retries: u32,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub backoff_base_millis: u64,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl FetcherSettings {
    pub fn backoff_base(&self) -> Duration {
        Duration::from_millis(self.backoff_base_millis)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Deserialize, Clone, Debug)]
pub struct LineSettings {
    pub api_base_url: String,
    pub channel_access_token: String,
    pub target_user_id: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub timeout_secs: u64,
}

impl LineSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Deserialize, Clone, Debug)]
pub struct CacheSettings {
    pub path: PathBuf,
}

pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    let base_path = std::env::current_dir().expect("Failed to determine the current directory");
    let configuration_directory = base_path.join("configuration");

    let settings = config::Config::builder()
        .add_source(config::File::from(configuration_directory.join("base.yaml")))
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        // Variables the service has always been deployed with
        .set_override_option("application.port", std::env::var("PORT").ok())?
        .set_override_option(
            "line.channel_access_token",
            std::env::var("LINE_CHANNEL_ACCESS_TOKEN").ok(),
        )?
        .set_override_option("line.target_user_id", std::env::var("TARGET_USER_ID").ok())?
        .build()?;

    settings.try_deserialize::<Settings>()
}
