use std::time::Duration;

const DEFAULT_BASE_URL: &str = "http://localhost:8000";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Builder for [`HttpGatewayConfig`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct HttpGatewayConfigBuilder {
    base_url: Option<String>,
    timeout: Option<Duration>,
}

impl HttpGatewayConfigBuilder {
    /// Creates a builder with every setting at its default.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the address the service is reachable at, e.g.
    /// `https://support.example.com`.
    #[inline]
    pub fn with_base_url<S: Into<String>>(mut self, base_url: S) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Sets how long a single request may take before it fails.
    #[inline]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Builds the configuration.
    #[inline]
    pub fn build(self) -> HttpGatewayConfig {
        let base_url = self
            .base_url
            .as_deref()
            .map(|url| url.trim().trim_end_matches('/'))
            .filter(|url| !url.is_empty())
            .unwrap_or(DEFAULT_BASE_URL)
            .to_owned();
        HttpGatewayConfig {
            base_url,
            timeout: self.timeout.unwrap_or(DEFAULT_TIMEOUT),
        }
    }
}

/// Configuration for [`HttpGateway`](crate::HttpGateway).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct HttpGatewayConfig {
    pub(crate) base_url: String,
    pub(crate) timeout: Duration,
}

impl HttpGatewayConfig {
    /// Returns the base address, without a trailing slash.
    #[inline]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the per-request timeout.
    #[inline]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    #[inline]
    pub(crate) fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = HttpGatewayConfigBuilder::new().build();
        assert_eq!(config.base_url(), "http://localhost:8000");
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert_eq!(
            config.endpoint("/api/chat"),
            "http://localhost:8000/api/chat"
        );
    }

    #[test]
    fn test_base_url_is_normalized() {
        let config = HttpGatewayConfigBuilder::new()
            .with_base_url(" https://support.example.com/ ")
            .with_timeout(Duration::from_secs(5))
            .build();
        assert_eq!(config.base_url(), "https://support.example.com");
        assert_eq!(config.timeout(), Duration::from_secs(5));

        let config = HttpGatewayConfigBuilder::new().with_base_url("").build();
        assert_eq!(config.base_url(), DEFAULT_BASE_URL);
    }
}
