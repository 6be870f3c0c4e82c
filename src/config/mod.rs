//! Environment-backed configuration.
//!
//! Most settings have defaults. Override with `DEEPSCOPE_*` environment variables;
//! provider credentials use the providers' conventional names.

pub mod error;


pub use error::ConfigError;

use std::env;
use std::net::IpAddr;
use std::time::Duration;

use crate::constants::{
    DEFAULT_ADAPTER_TIMEOUT, DEFAULT_CLAIM_CONCURRENCY, DEFAULT_FACTCHECK_URL,
    DEFAULT_LANGUAGE_CODE, DEFAULT_LLM_MODEL, DEFAULT_MAX_CONCURRENCY,
};

/// Service configuration loaded from environment variables.
///
/// Use [`Config::from_env`] to read overrides on top of defaults, then
/// [`Config::validate`] before building a [`Verifier`](crate::verify::Verifier).
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port. Default: `8080`.
    pub port: u16,

    /// IP address to bind to. Default: `127.0.0.1`.
    pub bind_addr: IpAddr,

    /// Enables the LLM adapter.
    pub openai_api_key: Option<String>,

    /// Enables the fact-check search adapter.
    pub google_api_key: Option<String>,

    /// Model name passed to the LLM client. Default: `gpt-4o-mini`.
    pub llm_model: String,

    /// Fact-check search endpoint.
    pub factcheck_url: String,

    /// Search language. Default: `en-US`.
    pub language_code: String,

    /// Per-adapter timeout; `None` when set to `0`. Default: 30s.
    pub adapter_timeout: Option<Duration>,

    /// LLM short-circuit threshold. Disabled by default.
    pub short_circuit_threshold: Option<f64>,

    /// Adapter calls in flight at once. Default: `16`.
    pub max_concurrency: usize,

    /// Claims verified in parallel inside a batch. Default: `1`.
    pub claim_concurrency: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            bind_addr: IpAddr::V4(std::net::Ipv4Addr::new(127, 0, 0, 1)),
            openai_api_key: None,
            google_api_key: None,
            llm_model: DEFAULT_LLM_MODEL.to_string(),
            factcheck_url: DEFAULT_FACTCHECK_URL.to_string(),
            language_code: DEFAULT_LANGUAGE_CODE.to_string(),
            adapter_timeout: Some(DEFAULT_ADAPTER_TIMEOUT),
            short_circuit_threshold: None,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            claim_concurrency: DEFAULT_CLAIM_CONCURRENCY,
        }
    }
}

impl Config {
    const ENV_PORT: &'static str = "DEEPSCOPE_PORT";
    const ENV_BIND_ADDR: &'static str = "DEEPSCOPE_BIND_ADDR";
    const ENV_OPENAI_API_KEY: &'static str = "OPENAI_API_KEY";
    const ENV_GOOGLE_API_KEY: &'static str = "GOOGLE_API_KEY";
    const ENV_LLM_MODEL: &'static str = "DEEPSCOPE_LLM_MODEL";
    const ENV_FACTCHECK_URL: &'static str = "DEEPSCOPE_FACTCHECK_URL";
    const ENV_LANGUAGE_CODE: &'static str = "DEEPSCOPE_LANGUAGE_CODE";
    const ENV_ADAPTER_TIMEOUT_SECS: &'static str = "DEEPSCOPE_ADAPTER_TIMEOUT_SECS";
    const ENV_SHORT_CIRCUIT_THRESHOLD: &'static str = "DEEPSCOPE_SHORT_CIRCUIT_THRESHOLD";
    const ENV_MAX_CONCURRENCY: &'static str = "DEEPSCOPE_MAX_CONCURRENCY";
    const ENV_CLAIM_CONCURRENCY: &'static str = "DEEPSCOPE_CLAIM_CONCURRENCY";

    /// Loads configuration from environment variables (falling back to defaults).
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let port = Self::parse_port_from_env(defaults.port)?;
        let bind_addr = Self::parse_bind_addr_from_env(defaults.bind_addr)?;
        let openai_api_key = Self::parse_optional_string_from_env(Self::ENV_OPENAI_API_KEY);
        let google_api_key = Self::parse_optional_string_from_env(Self::ENV_GOOGLE_API_KEY);
        let llm_model = Self::parse_string_from_env(Self::ENV_LLM_MODEL, defaults.llm_model);
        let factcheck_url =
            Self::parse_string_from_env(Self::ENV_FACTCHECK_URL, defaults.factcheck_url);
        let language_code =
            Self::parse_string_from_env(Self::ENV_LANGUAGE_CODE, defaults.language_code);
        let adapter_timeout = Self::parse_timeout_from_env(defaults.adapter_timeout)?;
        let short_circuit_threshold = Self::parse_threshold_from_env()?;
        let max_concurrency =
            Self::parse_usize_from_env(Self::ENV_MAX_CONCURRENCY, defaults.max_concurrency);
        let claim_concurrency =
            Self::parse_usize_from_env(Self::ENV_CLAIM_CONCURRENCY, defaults.claim_concurrency);

        Ok(Self {
            port,
            bind_addr,
            openai_api_key,
            google_api_key,
            llm_model,
            factcheck_url,
            language_code,
            adapter_timeout,
            short_circuit_threshold,
            max_concurrency,
            claim_concurrency,
        })
    }

    /// Validates invariants. Misconfiguration fails here, at startup, rather
    /// than as a stream of `no_data` verdicts later.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.openai_api_key.is_none() && self.google_api_key.is_none() {
            return Err(ConfigError::NoAdaptersConfigured);
        }

        if let Some(threshold) = self.short_circuit_threshold
            && !(0.0..=1.0).contains(&threshold)
        {
            return Err(ConfigError::InvalidThreshold {
                value: threshold.to_string(),
            });
        }

        if self.max_concurrency == 0 {
            return Err(ConfigError::InvalidConcurrency {
                name: Self::ENV_MAX_CONCURRENCY,
            });
        }
        if self.claim_concurrency == 0 {
            return Err(ConfigError::InvalidConcurrency {
                name: Self::ENV_CLAIM_CONCURRENCY,
            });
        }

        reqwest::Url::parse(&self.factcheck_url).map_err(|e| ConfigError::InvalidUrl {
            value: self.factcheck_url.clone(),
            reason: e.to_string(),
        })?;

        Ok(())
    }

    /// Returns `"{bind_addr}:{port}"` (useful for logging/binding).
    pub fn socket_addr(&self) -> String {
        match self.bind_addr {
            IpAddr::V4(addr) => format!("{}:{}", addr, self.port),
            IpAddr::V6(addr) => format!("[{}]:{}", addr, self.port),
        }
    }

    fn parse_port_from_env(default: u16) -> Result<u16, ConfigError> {
        match env::var(Self::ENV_PORT) {
            Ok(value) => {
                let port: u16 = value.parse().map_err(|e| ConfigError::PortParseError {
                    value: value.clone(),
                    source: e,
                })?;

                if port == 0 {
                    return Err(ConfigError::InvalidPort { value });
                }

                Ok(port)
            }
            Err(_) => Ok(default),
        }
    }

    fn parse_bind_addr_from_env(default: IpAddr) -> Result<IpAddr, ConfigError> {
        match env::var(Self::ENV_BIND_ADDR) {
            Ok(value) => value
                .parse()
                .map_err(|e| ConfigError::InvalidBindAddr { value, source: e }),
            Err(_) => Ok(default),
        }
    }

    fn parse_timeout_from_env(default: Option<Duration>) -> Result<Option<Duration>, ConfigError> {
        match env::var(Self::ENV_ADAPTER_TIMEOUT_SECS) {
            Ok(value) => {
                let secs: u64 = value
                    .trim()
                    .parse()
                    .map_err(|_| ConfigError::InvalidTimeout { value })?;
                Ok((secs > 0).then(|| Duration::from_secs(secs)))
            }
            Err(_) => Ok(default),
        }
    }

    fn parse_threshold_from_env() -> Result<Option<f64>, ConfigError> {
        match Self::parse_optional_string_from_env(Self::ENV_SHORT_CIRCUIT_THRESHOLD) {
            Some(value) => value
                .parse::<f64>()
                .map(Some)
                .map_err(|_| ConfigError::InvalidThreshold { value }),
            None => Ok(None),
        }
    }

    fn parse_optional_string_from_env(var_name: &str) -> Option<String> {
        env::var(var_name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn parse_string_from_env(var_name: &str, default: String) -> String {
        Self::parse_optional_string_from_env(var_name).unwrap_or(default)
    }

    fn parse_usize_from_env(var_name: &str, default: usize) -> usize {
        env::var(var_name)
            .ok()
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(default)
    }
}
