//! Purpose: Resolve catalog client configuration from explicit values and the environment.
//! Exports: `ClientConfig`, `ConfigOverrides`, and the env/default constants.
//! Role: Single place where endpoint/token precedence and token validation live.
//! Invariants: Explicit non-empty values beat environment values; empty strings count as unset.
//! Invariants: Tokens are exactly `TOKEN_LEN` bytes and never appear in `Debug` output.
#![allow(clippy::result_large_err)]

use std::fmt;
use std::time::Duration;

use url::Url;

use crate::core::error::{Error, ErrorKind};

pub const DEFAULT_ENDPOINT: &str = "https://span.app/api/external/v1";
pub const TOKEN_ENV: &str = "SPAN_ACCESS_TOKEN";
pub const ENDPOINT_ENV: &str = "SPAN_API_ENDPOINT";
pub const TOKEN_LEN: usize = 64;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

type ApiResult<T> = Result<T, Error>;

/// Values supplied by the caller (CLI flags, embedding code) before env fallback.
#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub token: Option<String>,
    pub endpoint: Option<String>,
    pub timeout: Option<Duration>,
}

#[derive(Clone)]
pub struct ClientConfig {
    endpoint: Url,
    token: String,
    timeout: Duration,
}

impl ClientConfig {
    pub fn new(endpoint: &str, token: impl Into<String>) -> ApiResult<Self> {
        let token = token.into();
        validate_token(&token)?;
        Ok(Self {
            endpoint: normalize_endpoint(endpoint)?,
            token,
            timeout: DEFAULT_TIMEOUT,
        })
    }

    pub fn resolve(overrides: ConfigOverrides) -> ApiResult<Self> {
        Self::resolve_with(overrides, |key| std::env::var(key).ok())
    }

    pub fn resolve_with<F>(overrides: ConfigOverrides, env: F) -> ApiResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let token = non_empty(overrides.token)
            .or_else(|| non_empty(env(TOKEN_ENV)))
            .ok_or_else(|| {
                Error::new(ErrorKind::Usage)
                    .with_message("missing catalog access token")
                    .with_hint(format!(
                        "Pass --token or set {TOKEN_ENV} to a {TOKEN_LEN}-character access token."
                    ))
            })?;
        let endpoint = non_empty(overrides.endpoint)
            .or_else(|| non_empty(env(ENDPOINT_ENV)))
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());

        let mut config = Self::new(&endpoint, token)?;
        if let Some(timeout) = overrides.timeout {
            config.timeout = timeout;
        }
        Ok(config)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("endpoint", &self.endpoint.as_str())
            .field("token", &"<redacted>")
            .field("timeout", &self.timeout)
            .finish()
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.trim().is_empty())
}

fn validate_token(token: &str) -> ApiResult<()> {
    let len = token.len();
    if len != TOKEN_LEN {
        return Err(Error::new(ErrorKind::Usage)
            .with_message(format!(
                "access token must be exactly {TOKEN_LEN} bytes (got {len})"
            ))
            .with_hint(format!("Check the value passed via --token or {TOKEN_ENV}.")));
    }
    Ok(())
}

fn normalize_endpoint(raw: &str) -> ApiResult<Url> {
    let mut url = Url::parse(raw.trim()).map_err(|err| {
        Error::new(ErrorKind::Usage)
            .with_message("invalid catalog endpoint url")
            .with_subject(raw)
            .with_source(err)
    })?;
    let scheme = url.scheme();
    if scheme != "http" && scheme != "https" {
        return Err(Error::new(ErrorKind::Usage)
            .with_message("catalog endpoint must use http or https scheme")
            .with_subject(raw));
    }
    if url.cannot_be_a_base() {
        return Err(Error::new(ErrorKind::Usage)
            .with_message("catalog endpoint cannot be a base url")
            .with_subject(raw));
    }
    url.set_query(None);
    url.set_fragment(None);
    Ok(url)
}
