use super::*;
use serial_test::serial;
use std::env;
use std::net::IpAddr;

const REQUIRED_PATHS: &[(&str, &str)] = &[
    ("DETOUR_MODEL_PATH", "/tmp/model.json"),
    ("DETOUR_CATALOG_PATH", "/tmp/catalog.parquet"),
    ("DETOUR_TRUST_STORE_PATH", "/tmp/trust.json"),
];

fn with_env_vars<F, R>(vars: &[(&str, &str)], f: F) -> R
where
    F: FnOnce() -> R,
{
    // SAFETY: Test code only, we accept the thread-safety risk in tests.
    for (key, value) in REQUIRED_PATHS.iter().chain(vars) {
        unsafe { env::set_var(key, value) };
    }

    let result = f();

    // SAFETY: Test code only, we accept the thread-safety risk in tests.
    for (key, _) in REQUIRED_PATHS.iter().chain(vars) {
        unsafe { env::remove_var(key) };
    }

    result
}

fn clear_detour_env() {
    // SAFETY: Test code only, we accept the thread-safety risk in tests.
    unsafe {
        for key in [
            "DETOUR_PORT",
            "DETOUR_BIND_ADDR",
            "DETOUR_MODEL_PATH",
            "DETOUR_CATALOG_PATH",
            "DETOUR_TRUST_STORE_PATH",
            "DETOUR_ACTION_THRESHOLD",
            "DETOUR_RISK_MARGIN",
            "DETOUR_TOP_K",
            "DETOUR_MAX_TOP_K",
            "DETOUR_OVERFETCH_FACTOR",
            "DETOUR_WEIGHT_SIMILARITY",
            "DETOUR_WEIGHT_RISK",
            "DETOUR_METRIC",
            "DETOUR_REQUEST_TIMEOUT_MS",
            "DETOUR_CACHE_CAPACITY",
            "DETOUR_TRUST_STORE_REFRESH_SECS",
        ] {
            env::remove_var(key);
        }
    }
}

#[test]
fn test_default_config() {
    let config = Config::default();

    assert_eq!(config.port, 8080);
    assert_eq!(
        config.bind_addr,
        IpAddr::V4(std::net::Ipv4Addr::new(127, 0, 0, 1))
    );
    assert_eq!(config.action_threshold, 0.5);
    assert_eq!(config.risk_margin, 0.1);
    assert_eq!(config.top_k, 5);
    assert_eq!(config.max_top_k, 50);
    assert_eq!(config.overfetch_factor, 4);
    assert_eq!(config.weight_similarity, 0.5);
    assert_eq!(config.weight_risk, 0.5);
    assert_eq!(config.metric, DistanceMetric::Cosine);
    assert_eq!(config.request_timeout_ms, 2000);
    assert_eq!(config.cache_capacity, 1024);
    assert_eq!(config.trust_store_refresh_secs, 0);
}

#[test]
fn test_socket_addr() {
    let config = Config::default();
    assert_eq!(config.socket_addr(), "127.0.0.1:8080");

    let config = Config {
        port: 3000,
        bind_addr: IpAddr::V4(std::net::Ipv4Addr::new(0, 0, 0, 0)),
        ..Default::default()
    };
    assert_eq!(config.socket_addr(), "0.0.0.0:3000");
}

#[test]
#[serial]
fn test_from_env_with_defaults() {
    clear_detour_env();

    let config = with_env_vars(&[], || Config::from_env().expect("should parse with defaults"));

    assert_eq!(config.port, 8080);
    assert_eq!(config.model_path.to_str(), Some("/tmp/model.json"));
    assert_eq!(config.catalog_path.to_str(), Some("/tmp/catalog.parquet"));
    assert_eq!(config.trust_store_path.to_str(), Some("/tmp/trust.json"));
}

#[test]
#[serial]
fn test_from_env_missing_model_path() {
    clear_detour_env();

    // SAFETY: Test code only, we accept the thread-safety risk in tests.
    unsafe {
        env::set_var("DETOUR_CATALOG_PATH", "/tmp/catalog.parquet");
        env::set_var("DETOUR_TRUST_STORE_PATH", "/tmp/trust.json");
    }

    let err = Config::from_env().expect_err("model path is required");
    assert!(matches!(
        err,
        ConfigError::MissingEnvVar {
            name: "DETOUR_MODEL_PATH"
        }
    ));

    clear_detour_env();
}

#[test]
#[serial]
fn test_from_env_overrides() {
    clear_detour_env();

    let config = with_env_vars(
        &[
            ("DETOUR_PORT", "9000"),
            ("DETOUR_ACTION_THRESHOLD", "0.75"),
            ("DETOUR_RISK_MARGIN", "0.2"),
            ("DETOUR_TOP_K", "3"),
            ("DETOUR_METRIC", "euclidean"),
            ("DETOUR_CACHE_CAPACITY", "0"),
        ],
        || Config::from_env().expect("overrides should parse"),
    );

    assert_eq!(config.port, 9000);
    assert_eq!(config.action_threshold, 0.75);
    assert_eq!(config.risk_margin, 0.2);
    assert_eq!(config.top_k, 3);
    assert_eq!(config.metric, DistanceMetric::Euclidean);
    assert_eq!(config.cache_capacity, 0);
}

#[test]
#[serial]
fn test_from_env_rejects_invalid_port() {
    clear_detour_env();

    let err = with_env_vars(&[("DETOUR_PORT", "0")], || {
        Config::from_env().expect_err("port 0 is invalid")
    });
    assert!(matches!(err, ConfigError::InvalidPort { .. }));

    let err = with_env_vars(&[("DETOUR_PORT", "not-a-port")], || {
        Config::from_env().expect_err("non-numeric port is invalid")
    });
    assert!(matches!(err, ConfigError::PortParseError { .. }));
}

#[test]
#[serial]
fn test_from_env_rejects_out_of_range_threshold() {
    clear_detour_env();

    let err = with_env_vars(&[("DETOUR_ACTION_THRESHOLD", "1.5")], || {
        Config::from_env().expect_err("threshold above 1 is invalid")
    });
    assert!(matches!(
        err,
        ConfigError::InvalidValue {
            name: "DETOUR_ACTION_THRESHOLD",
            ..
        }
    ));
}

#[test]
#[serial]
fn test_from_env_rejects_zero_margin() {
    clear_detour_env();

    let err = with_env_vars(&[("DETOUR_RISK_MARGIN", "0.0")], || {
        Config::from_env().expect_err("zero margin is invalid")
    });
    assert!(matches!(
        err,
        ConfigError::InvalidValue {
            name: "DETOUR_RISK_MARGIN",
            ..
        }
    ));
}

#[test]
#[serial]
fn test_from_env_rejects_unknown_metric() {
    clear_detour_env();

    let err = with_env_vars(&[("DETOUR_METRIC", "manhattan")], || {
        Config::from_env().expect_err("unsupported metric")
    });
    assert!(matches!(
        err,
        ConfigError::InvalidValue {
            name: "DETOUR_METRIC",
            ..
        }
    ));
}

#[test]
#[serial]
fn test_from_env_rejects_top_k_above_cap() {
    clear_detour_env();

    let err = with_env_vars(&[("DETOUR_TOP_K", "100"), ("DETOUR_MAX_TOP_K", "50")], || {
        Config::from_env().expect_err("top_k above the cap is invalid")
    });
    assert!(matches!(
        err,
        ConfigError::InvalidValue {
            name: "DETOUR_TOP_K",
            ..
        }
    ));
}

#[test]
fn test_validate_missing_paths() {
    let config = Config {
        model_path: "/nonexistent/model.json".into(),
        catalog_path: "/nonexistent/catalog.parquet".into(),
        trust_store_path: "/nonexistent/trust.json".into(),
        ..Default::default()
    };

    assert!(matches!(
        config.validate(),
        Err(ConfigError::PathNotFound { .. })
    ));
}
