//! Client configuration.

use std::time::Duration;

use crate::error::ClientError;

/// Default Ollama API base URL.
pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";

/// Port Ollama listens on when a host is given without one.
pub const DEFAULT_PORT: u16 = 11434;

/// Environment variable read by [`ClientConfig::from_env`].
pub const HOST_ENV: &str = "OLLAMA_HOST";

/// Static configuration for an [`Ollama`](crate::Ollama) client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Server base URL, without a trailing slash.
    pub base_url: String,

    /// How long the server keeps a model loaded after a request
    /// (e.g. `"5m"`, `"0"`, `"-1"`). Server default when `None`.
    pub keep_alive: Option<String>,

    /// Overall request timeout. Streams can run for minutes, so there is
    /// none by default.
    pub request_timeout: Option<Duration>,

    /// TCP connect timeout. The reqwest default (none) when `None`.
    pub connect_timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            keep_alive: None,
            request_timeout: None,
            connect_timeout: None,
        }
    }
}

impl ClientConfig {
    /// Defaults, with the base URL taken from `OLLAMA_HOST` when set.
    ///
    /// Accepts the same forms as the Ollama CLI: a full URL, `host:port`,
    /// or a bare host (port 11434 is assumed).
    pub fn from_env() -> Result<Self, ClientError> {
        Self::from_host(std::env::var(HOST_ENV).ok().as_deref())
    }

    pub(crate) fn from_host(host: Option<&str>) -> Result<Self, ClientError> {
        let mut config = Self::default();
        if let Some(raw) = host.map(str::trim).filter(|h| !h.is_empty()) {
            config.base_url = normalize_host(raw)?;
        }
        Ok(config)
    }
}

/// Turn an `OLLAMA_HOST`-style value into a base URL.
pub(crate) fn normalize_host(raw: &str) -> Result<String, ClientError> {
    let has_scheme = raw.contains("://");
    let candidate = if has_scheme {
        raw.to_string()
    } else {
        format!("http://{raw}")
    };

    let mut url = reqwest::Url::parse(&candidate)
        .map_err(|e| ClientError::InvalidConfig(format!("{HOST_ENV}={raw:?}: {e}")))?;
    if url.host_str().is_none() {
        return Err(ClientError::InvalidConfig(format!(
            "{HOST_ENV}={raw:?}: missing host"
        )));
    }
    if !has_scheme && url.port().is_none() {
        url.set_port(Some(DEFAULT_PORT)).map_err(|()| {
            ClientError::InvalidConfig(format!("{HOST_ENV}={raw:?}: cannot set port"))
        })?;
    }

    Ok(url.as_str().trim_end_matches('/').to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert!(config.keep_alive.is_none());
        assert!(config.request_timeout.is_none());
        assert!(config.connect_timeout.is_none());
    }

    #[test]
    fn unset_or_blank_host_keeps_default() {
        assert_eq!(
            ClientConfig::from_host(None).expect("ok").base_url,
            DEFAULT_BASE_URL
        );
        assert_eq!(
            ClientConfig::from_host(Some("  ")).expect("ok").base_url,
            DEFAULT_BASE_URL
        );
    }

    #[test]
    fn host_and_port() {
        assert_eq!(
            normalize_host("localhost:9999").expect("ok"),
            "http://localhost:9999"
        );
    }

    #[test]
    fn bare_host_gets_default_port() {
        assert_eq!(
            normalize_host("0.0.0.0").expect("ok"),
            "http://0.0.0.0:11434"
        );
    }

    #[test]
    fn full_url_is_kept() {
        assert_eq!(
            normalize_host("https://ollama.example.com/").expect("ok"),
            "https://ollama.example.com"
        );
    }

    #[test]
    fn invalid_host_is_config_error() {
        let err = normalize_host("http://[::1").unwrap_err();
        assert!(matches!(err, ClientError::InvalidConfig(msg) if msg.contains(HOST_ENV)));
    }
}
