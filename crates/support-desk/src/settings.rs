use std::env;
use std::error::Error;
use std::fmt::{self, Display};
use std::time::Duration;

use support_desk_http_gateway::{HttpGatewayConfig, HttpGatewayConfigBuilder};

use crate::SupportDeskBuilder;

/// Environment variable holding the gateway's base URL.
pub const API_URL_VAR: &str = "SUPPORT_DESK_API_URL";
/// Environment variable holding the request timeout in whole seconds.
pub const TIMEOUT_SECS_VAR: &str = "SUPPORT_DESK_TIMEOUT_SECS";
/// Environment variable holding the caller id.
pub const CALLER_ID_VAR: &str = "SUPPORT_DESK_CALLER_ID";

/// Settings read from the environment. Every setting is optional.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Settings {
    /// Base URL of the gateway.
    pub api_url: Option<String>,
    /// Request timeout.
    pub timeout: Option<Duration>,
    /// Caller id sent with every request.
    pub caller_id: Option<String>,
}

impl Settings {
    /// Reads the settings from the process environment.
    pub fn from_env() -> Result<Self, SettingsError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, SettingsError> {
        let non_empty = |key| {
            lookup(key)
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty())
        };

        let timeout = match non_empty(TIMEOUT_SECS_VAR) {
            Some(value) => match value.parse::<u64>() {
                Ok(secs) if secs > 0 => Some(Duration::from_secs(secs)),
                _ => {
                    return Err(SettingsError {
                        key: TIMEOUT_SECS_VAR,
                        value,
                    });
                }
            },
            None => None,
        };

        Ok(Self {
            api_url: non_empty(API_URL_VAR),
            timeout,
            caller_id: non_empty(CALLER_ID_VAR),
        })
    }

    /// Builds the HTTP gateway configuration, falling back to the
    /// defaults for anything that isn't set.
    pub fn gateway_config(&self) -> HttpGatewayConfig {
        let mut builder = HttpGatewayConfigBuilder::new();
        if let Some(api_url) = &self.api_url {
            builder = builder.with_base_url(api_url.as_str());
        }
        if let Some(timeout) = self.timeout {
            builder = builder.with_timeout(timeout);
        }
        builder.build()
    }

    /// Applies the caller id, if set, to a support desk builder.
    pub fn apply(&self, builder: SupportDeskBuilder) -> SupportDeskBuilder {
        match &self.caller_id {
            Some(caller_id) => builder.with_caller_id(caller_id.as_str()),
            None => builder,
        }
    }
}

/// A setting that could not be parsed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SettingsError {
    key: &'static str,
    value: String,
}

impl SettingsError {
    /// Returns the name of the offending environment variable.
    #[inline]
    pub fn key(&self) -> &str {
        self.key
    }
}

impl Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid value for {}: {:?}", self.key, self.value)
    }
}

impl Error for SettingsError {}
