//! Configuration system.
//!
//! This module provides:
//! - Service configuration (server, fork dialect, Tenderly credentials)
//! - Chain configuration (tokens, protocol contract addresses)
//! - Configuration registry for runtime loading
//! - A loader that reads everything from one directory

mod chain;
mod loader;
mod registry;
mod service;

pub use chain::{
    ChainConfig, ChainContracts, ChainDetails, CometMarket, CurveUsdMarket, LiquityV2Branch,
    TokenConfig, TokenRef,
};
pub use loader::{load_from_env, ConfigLoader, LoadedConfig, SERVICE_CONFIG_FILE};
pub use registry::ConfigRegistry;
pub use service::{
    DataConfig, ForkDialect, NetworkConfig, ServerConfig, ServiceConfig, TenderlyConfig,
};

/// Expand ${VAR_NAME} patterns with environment variable values.
///
/// Unset variables are left in place.
pub(crate) fn expand_env(s: &str) -> String {
    let Ok(re) = regex_lite::Regex::new(r"\$\{([^}]+)\}") else {
        return s.to_string();
    };

    let mut result = s.to_string();
    for cap in re.captures_iter(s) {
        if let (Some(full_match), Some(var_match)) = (cap.get(0), cap.get(1)) {
            if let Ok(value) = std::env::var(var_match.as_str()) {
                result = result.replace(full_match.as_str(), &value);
            }
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_env() {
        // Use unique var name to avoid conflicts with parallel tests
        std::env::set_var("CONFIG_TEST_VAR", "test_value");
        assert_eq!(expand_env("${CONFIG_TEST_VAR}"), "test_value");
        assert_eq!(
            expand_env("prefix_${CONFIG_TEST_VAR}_suffix"),
            "prefix_test_value_suffix"
        );
        assert_eq!(expand_env("no_vars"), "no_vars");
        assert_eq!(expand_env("${CONFIG_TEST_UNSET}"), "${CONFIG_TEST_UNSET}");
        std::env::remove_var("CONFIG_TEST_VAR");
    }
}
