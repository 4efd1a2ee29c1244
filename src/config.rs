use std::env;
use std::time::Duration;

use crate::error::ConfigError;
use crate::link_proxy::LinkProxyConfig;
use crate::nominatim::NominatimConfig;
use crate::osrm::OsrmConfig;

#[derive(Debug, Clone)]
pub struct Config {
    pub osrm: OsrmConfig,
    pub nominatim: NominatimConfig,
    pub link_proxy: LinkProxyConfig,
    pub geocode_spacing: Duration,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            osrm: OsrmConfig::default(),
            nominatim: NominatimConfig::default(),
            link_proxy: LinkProxyConfig::default(),
            geocode_spacing: crate::geocode_queue::DEFAULT_SPACING,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        let defaults = Self::default();
        let timeout_secs = parse_or_default("HTTP_TIMEOUT_SECS", defaults.osrm.timeout_secs)?;

        Ok(Self {
            osrm: OsrmConfig {
                base_url: string_or_default("OSRM_BASE_URL", defaults.osrm.base_url),
                profile: string_or_default("OSRM_PROFILE", defaults.osrm.profile),
                timeout_secs,
            },
            nominatim: NominatimConfig {
                base_url: string_or_default("NOMINATIM_BASE_URL", defaults.nominatim.base_url),
                user_agent: string_or_default("GEOCODER_USER_AGENT", defaults.nominatim.user_agent),
                timeout_secs,
            },
            link_proxy: LinkProxyConfig {
                base_url: string_or_default("LINK_PROXY_URL", defaults.link_proxy.base_url),
                timeout_secs: timeout_secs.max(defaults.link_proxy.timeout_secs),
            },
            geocode_spacing: Duration::from_millis(parse_or_default(
                "GEOCODE_SPACING_MS",
                defaults.geocode_spacing.as_millis() as u64,
            )?),
            log_level: string_or_default("LOG_LEVEL", defaults.log_level),
        })
    }
}

fn string_or_default(key: &str, default: String) -> String {
    env::var(key)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .unwrap_or(default)
}

fn parse_or_default<T>(key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw.trim().parse::<T>().map_err(|err| ConfigError::Invalid {
            key,
            message: format!("{raw:?}: {err}"),
        }),
        Err(_) => Ok(default),
    }
}
