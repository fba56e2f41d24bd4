//! Environment-backed configuration.
//!
//! Most settings have defaults. Override with `DETOUR_*` environment
//! variables. The three artifact paths (model, catalog, trust store) are
//! required; everything else falls back to a documented default.

pub mod error;

#[cfg(test)]
mod tests;

pub use error::ConfigError;

use std::env;
use std::net::IpAddr;
use std::path::PathBuf;

use crate::index::DistanceMetric;

/// Server configuration loaded from environment variables.
///
/// Use [`Config::from_env`] to read `DETOUR_*` overrides on top of defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port. Default: `8080`.
    pub port: u16,

    /// IP address to bind to. Default: `127.0.0.1`.
    pub bind_addr: IpAddr,

    /// Path to the serialized risk model artifact (JSON). Required.
    pub model_path: PathBuf,

    /// Path to the alternatives catalog (parquet). Required.
    pub catalog_path: PathBuf,

    /// Path to the trust store (JSON). Required.
    pub trust_store_path: PathBuf,

    /// Risk level at or above which alternatives are retrieved. Default: `0.5`.
    pub action_threshold: f32,

    /// Minimum risk improvement a valid alternative must offer. Default: `0.1`.
    pub risk_margin: f32,

    /// Default recommendation length. Default: `5`.
    pub top_k: usize,

    /// Hard cap on the per-request `top_k`. Default: `50`.
    pub max_top_k: usize,

    /// Overfetch multiplier for the index query (`m = top_k * factor`).
    /// Default: `4`.
    pub overfetch_factor: usize,

    /// Weight of embedding similarity in the combined score. Default: `0.5`.
    pub weight_similarity: f32,

    /// Weight of risk reduction in the combined score. Default: `0.5`.
    pub weight_risk: f32,

    /// Distance metric for the vector index. Default: cosine.
    pub metric: DistanceMetric,

    /// Per-request deadline in milliseconds. Default: `2000`.
    pub request_timeout_ms: u64,

    /// Max entries in the response cache; `0` disables it. Default: `1024`.
    pub cache_capacity: u64,

    /// Trust store re-read interval in seconds; `0` keeps it static for
    /// the process lifetime. Default: `0`.
    pub trust_store_refresh_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            bind_addr: IpAddr::V4(std::net::Ipv4Addr::new(127, 0, 0, 1)),
            model_path: PathBuf::new(),
            catalog_path: PathBuf::new(),
            trust_store_path: PathBuf::new(),
            action_threshold: 0.5,
            risk_margin: 0.1,
            top_k: 5,
            max_top_k: 50,
            overfetch_factor: 4,
            weight_similarity: 0.5,
            weight_risk: 0.5,
            metric: DistanceMetric::Cosine,
            request_timeout_ms: 2000,
            cache_capacity: 1024,
            trust_store_refresh_secs: 0,
        }
    }
}

impl Config {
    const ENV_PORT: &'static str = "DETOUR_PORT";
    const ENV_BIND_ADDR: &'static str = "DETOUR_BIND_ADDR";
    const ENV_MODEL_PATH: &'static str = "DETOUR_MODEL_PATH";
    const ENV_CATALOG_PATH: &'static str = "DETOUR_CATALOG_PATH";
    const ENV_TRUST_STORE_PATH: &'static str = "DETOUR_TRUST_STORE_PATH";
    const ENV_ACTION_THRESHOLD: &'static str = "DETOUR_ACTION_THRESHOLD";
    const ENV_RISK_MARGIN: &'static str = "DETOUR_RISK_MARGIN";
    const ENV_TOP_K: &'static str = "DETOUR_TOP_K";
    const ENV_MAX_TOP_K: &'static str = "DETOUR_MAX_TOP_K";
    const ENV_OVERFETCH_FACTOR: &'static str = "DETOUR_OVERFETCH_FACTOR";
    const ENV_WEIGHT_SIMILARITY: &'static str = "DETOUR_WEIGHT_SIMILARITY";
    const ENV_WEIGHT_RISK: &'static str = "DETOUR_WEIGHT_RISK";
    const ENV_METRIC: &'static str = "DETOUR_METRIC";
    const ENV_REQUEST_TIMEOUT_MS: &'static str = "DETOUR_REQUEST_TIMEOUT_MS";
    const ENV_CACHE_CAPACITY: &'static str = "DETOUR_CACHE_CAPACITY";
    const ENV_TRUST_STORE_REFRESH_SECS: &'static str = "DETOUR_TRUST_STORE_REFRESH_SECS";

    /// Loads configuration from environment variables (falling back to defaults).
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let port = Self::parse_port_from_env(defaults.port)?;
        let bind_addr = Self::parse_bind_addr_from_env(defaults.bind_addr)?;
        let model_path = Self::parse_required_path_from_env(Self::ENV_MODEL_PATH)?;
        let catalog_path = Self::parse_required_path_from_env(Self::ENV_CATALOG_PATH)?;
        let trust_store_path = Self::parse_required_path_from_env(Self::ENV_TRUST_STORE_PATH)?;
        let action_threshold =
            Self::parse_f32_from_env(Self::ENV_ACTION_THRESHOLD, defaults.action_threshold)?;
        let risk_margin = Self::parse_f32_from_env(Self::ENV_RISK_MARGIN, defaults.risk_margin)?;
        let top_k = Self::parse_usize_from_env(Self::ENV_TOP_K, defaults.top_k)?;
        let max_top_k = Self::parse_usize_from_env(Self::ENV_MAX_TOP_K, defaults.max_top_k)?;
        let overfetch_factor =
            Self::parse_usize_from_env(Self::ENV_OVERFETCH_FACTOR, defaults.overfetch_factor)?;
        let weight_similarity =
            Self::parse_f32_from_env(Self::ENV_WEIGHT_SIMILARITY, defaults.weight_similarity)?;
        let weight_risk = Self::parse_f32_from_env(Self::ENV_WEIGHT_RISK, defaults.weight_risk)?;
        let metric = Self::parse_metric_from_env(defaults.metric)?;
        let request_timeout_ms =
            Self::parse_u64_from_env(Self::ENV_REQUEST_TIMEOUT_MS, defaults.request_timeout_ms)?;
        let cache_capacity =
            Self::parse_u64_from_env(Self::ENV_CACHE_CAPACITY, defaults.cache_capacity)?;
        let trust_store_refresh_secs = Self::parse_u64_from_env(
            Self::ENV_TRUST_STORE_REFRESH_SECS,
            defaults.trust_store_refresh_secs,
        )?;

        let config = Self {
            port,
            bind_addr,
            model_path,
            catalog_path,
            trust_store_path,
            action_threshold,
            risk_margin,
            top_k,
            max_top_k,
            overfetch_factor,
            weight_similarity,
            weight_risk,
            metric,
            request_timeout_ms,
            cache_capacity,
            trust_store_refresh_secs,
        };
        config.validate_values()?;
        Ok(config)
    }

    /// Validates artifact paths (does not open them).
    pub fn validate(&self) -> Result<(), ConfigError> {
        for path in [&self.model_path, &self.catalog_path, &self.trust_store_path] {
            if !path.exists() {
                return Err(ConfigError::PathNotFound { path: path.clone() });
            }
            if !path.is_file() {
                return Err(ConfigError::NotAFile { path: path.clone() });
            }
        }
        Ok(())
    }

    /// Returns `"{bind_addr}:{port}"` (useful for logging/binding).
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }

    fn validate_values(&self) -> Result<(), ConfigError> {
        Self::check_unit_interval(Self::ENV_ACTION_THRESHOLD, self.action_threshold)?;
        Self::check_unit_interval(Self::ENV_RISK_MARGIN, self.risk_margin)?;
        if self.risk_margin <= 0.0 {
            return Err(ConfigError::InvalidValue {
                name: Self::ENV_RISK_MARGIN,
                value: self.risk_margin.to_string(),
                reason: "must be greater than zero",
            });
        }
        for (name, weight) in [
            (Self::ENV_WEIGHT_SIMILARITY, self.weight_similarity),
            (Self::ENV_WEIGHT_RISK, self.weight_risk),
        ] {
            if !weight.is_finite() || weight < 0.0 {
                return Err(ConfigError::InvalidValue {
                    name,
                    value: weight.to_string(),
                    reason: "must be finite and non-negative",
                });
            }
        }
        if self.top_k == 0 || self.top_k > self.max_top_k {
            return Err(ConfigError::InvalidValue {
                name: Self::ENV_TOP_K,
                value: self.top_k.to_string(),
                reason: "must be between 1 and DETOUR_MAX_TOP_K",
            });
        }
        if self.overfetch_factor == 0 {
            return Err(ConfigError::InvalidValue {
                name: Self::ENV_OVERFETCH_FACTOR,
                value: self.overfetch_factor.to_string(),
                reason: "must be at least 1",
            });
        }
        if self.request_timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                name: Self::ENV_REQUEST_TIMEOUT_MS,
                value: self.request_timeout_ms.to_string(),
                reason: "must be greater than zero",
            });
        }
        Ok(())
    }

    fn check_unit_interval(name: &'static str, value: f32) -> Result<(), ConfigError> {
        if !value.is_finite() || !(0.0..=1.0).contains(&value) {
            return Err(ConfigError::InvalidValue {
                name,
                value: value.to_string(),
                reason: "must be within [0, 1]",
            });
        }
        Ok(())
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

    fn parse_required_path_from_env(name: &'static str) -> Result<PathBuf, ConfigError> {
        env::var(name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .ok_or(ConfigError::MissingEnvVar { name })
    }

    fn parse_metric_from_env(default: DistanceMetric) -> Result<DistanceMetric, ConfigError> {
        match env::var(Self::ENV_METRIC) {
            Ok(value) => value.parse().map_err(|_| ConfigError::InvalidValue {
                name: Self::ENV_METRIC,
                value,
                reason: "expected 'cosine' or 'euclidean'",
            }),
            Err(_) => Ok(default),
        }
    }

    fn parse_f32_from_env(name: &'static str, default: f32) -> Result<f32, ConfigError> {
        match env::var(name) {
            Ok(value) => value.parse().map_err(|_| ConfigError::InvalidValue {
                name,
                value,
                reason: "expected a floating point number",
            }),
            Err(_) => Ok(default),
        }
    }

    fn parse_usize_from_env(name: &'static str, default: usize) -> Result<usize, ConfigError> {
        match env::var(name) {
            Ok(value) => value.parse().map_err(|_| ConfigError::InvalidValue {
                name,
                value,
                reason: "expected an unsigned integer",
            }),
            Err(_) => Ok(default),
        }
    }

    fn parse_u64_from_env(name: &'static str, default: u64) -> Result<u64, ConfigError> {
        match env::var(name) {
            Ok(value) => value.parse().map_err(|_| ConfigError::InvalidValue {
                name,
                value,
                reason: "expected an unsigned integer",
            }),
            Err(_) => Ok(default),
        }
    }
}
