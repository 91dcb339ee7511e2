use std::str::FromStr;

use anyhow::Result;
use serde::Serialize;

use super::ai::AIConfig;
use crate::error::MarketError;

pub const API_KEY_VAR: &str = "GEMINI_API_KEY";
/// 兼容旧的变量名
pub const LEGACY_API_KEY_VAR: &str = "API_KEY";
pub const MODEL_VAR: &str = "MARKET_PULSE_MODEL";
pub const BASE_URL_VAR: &str = "MARKET_PULSE_BASE_URL";
pub const TEMPERATURE_VAR: &str = "MARKET_PULSE_TEMPERATURE";
pub const TIMEOUT_VAR: &str = "MARKET_PULSE_TIMEOUT_SECS";

/// 启动配置，仅 API key 必填，其余均有默认值
#[derive(Debug, Clone, Serialize, Default)]
pub struct AppSettings {
    pub ai: AIConfig,
}

impl AppSettings {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as `from_env`, reading variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let api_key = var(API_KEY_VAR)
            .or_else(|| var(LEGACY_API_KEY_VAR))
            .ok_or(MarketError::MissingCredential(API_KEY_VAR))?;

        let mut ai = AIConfig {
            api_key,
            ..AIConfig::default()
        };
        if let Some(model) = var(MODEL_VAR) {
            ai.model_name = model;
        }
        if let Some(base_url) = var(BASE_URL_VAR) {
            ai.base_url = base_url;
        }
        if let Some(temperature) = parse_var::<f64>(TEMPERATURE_VAR, var(TEMPERATURE_VAR)) {
            if (0.0..=2.0).contains(&temperature) {
                ai.temperature = temperature;
            } else {
                log::warn!(
                    "{}={} out of range 0..=2, keeping {}",
                    TEMPERATURE_VAR,
                    temperature,
                    ai.temperature
                );
            }
        }
        if let Some(timeout) = parse_var::<u64>(TIMEOUT_VAR, var(TIMEOUT_VAR)) {
            if timeout > 0 {
                ai.timeout_secs = timeout;
            }
        }

        Ok(Self { ai })
    }
}

fn parse_var<T: FromStr>(name: &str, raw: Option<String>) -> Option<T> {
    let raw = raw?;
    match raw.parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            log::warn!("Ignoring unparsable {}={:?}, using default", name, raw);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ai::{DEFAULT_BASE_URL, DEFAULT_MODEL};
    use std::collections::HashMap;

    fn settings(vars: &[(&str, &str)]) -> Result<AppSettings> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppSettings::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_missing_key_is_an_error() {
        let err = settings(&[]).unwrap_err();
        assert_eq!(
            err.downcast_ref::<MarketError>(),
            Some(&MarketError::MissingCredential(API_KEY_VAR))
        );
        assert!(settings(&[(API_KEY_VAR, "   ")]).is_err());
    }

    #[test]
    fn test_defaults_with_only_key() {
        let s = settings(&[(API_KEY_VAR, "abc")]).unwrap();
        assert_eq!(s.ai.api_key, "abc");
        assert_eq!(s.ai.model_name, DEFAULT_MODEL);
        assert_eq!(s.ai.base_url, DEFAULT_BASE_URL);
        assert_eq!(s.ai.temperature, 0.3);
        assert_eq!(s.ai.timeout_secs, 120);
    }

    #[test]
    fn test_legacy_key_fallback() {
        let s = settings(&[(LEGACY_API_KEY_VAR, "old")]).unwrap();
        assert_eq!(s.ai.api_key, "old");
        let s = settings(&[(LEGACY_API_KEY_VAR, "old"), (API_KEY_VAR, "new")]).unwrap();
        assert_eq!(s.ai.api_key, "new");
    }

    #[test]
    fn test_overrides_and_bad_values() {
        let s = settings(&[
            (API_KEY_VAR, "k"),
            (MODEL_VAR, "gemini-2.5-pro"),
            (BASE_URL_VAR, "http://localhost:9000/v1beta"),
            (TEMPERATURE_VAR, "0.1"),
            (TIMEOUT_VAR, "45"),
        ])
        .unwrap();
        assert_eq!(s.ai.model_name, "gemini-2.5-pro");
        assert_eq!(s.ai.base_url, "http://localhost:9000/v1beta");
        assert_eq!(s.ai.temperature, 0.1);
        assert_eq!(s.ai.timeout_secs, 45);

        let s = settings(&[
            (API_KEY_VAR, "k"),
            (TEMPERATURE_VAR, "hot"),
            (TIMEOUT_VAR, "0"),
        ])
        .unwrap();
        assert_eq!(s.ai.temperature, 0.3);
        assert_eq!(s.ai.timeout_secs, 120);

        let s = settings(&[(API_KEY_VAR, "k"), (TEMPERATURE_VAR, "7")]).unwrap();
        assert_eq!(s.ai.temperature, 0.3);
    }
}
