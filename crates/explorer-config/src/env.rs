//! Environment variable loading: a prefix/default/validate loader keyed on
//! `EXPLORER_`-prefixed variables.

use std::collections::HashMap;
use std::env;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EnvError {
    #[error("environment variable not found: {var}")]
    NotFound { var: String },

    #[error("invalid value for {var}: {reason}")]
    InvalidValue { var: String, reason: String },
}

/// Loads `EXPLORER_*` environment variables with typed conversions and
/// per-key defaults.
pub struct EnvConfigLoader {
    prefix: String,
    defaults: HashMap<String, String>,
}

impl EnvConfigLoader {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            defaults: HashMap::new(),
        }
    }

    pub fn default(mut self, var: impl Into<String>, value: impl Into<String>) -> Self {
        self.defaults.insert(var.into(), value.into());
        self
    }

    fn full_name(&self, var: &str) -> String {
        format!("{}{}", self.prefix, var.to_uppercase())
    }

    pub fn get(&self, var: &str) -> Result<String, EnvError> {
        let full = self.full_name(var);
        env::var(&full).or_else(|_| {
            self.defaults
                .get(var)
                .cloned()
                .ok_or(EnvError::NotFound { var: full })
        })
    }

    pub fn get_u32(&self, var: &str) -> Result<u32, EnvError> {
        let value = self.get(var)?;
        value.parse().map_err(|_| EnvError::InvalidValue {
            var: self.full_name(var),
            reason: format!("'{value}' is not a u32"),
        })
    }

    pub fn get_usize(&self, var: &str) -> Result<usize, EnvError> {
        let value = self.get(var)?;
        value.parse().map_err(|_| EnvError::InvalidValue {
            var: self.full_name(var),
            reason: format!("'{value}' is not a usize"),
        })
    }

    pub fn get_f32(&self, var: &str) -> Result<f32, EnvError> {
        let value = self.get(var)?;
        value.parse().map_err(|_| EnvError::InvalidValue {
            var: self.full_name(var),
            reason: format!("'{value}' is not a float"),
        })
    }

    pub fn get_duration_secs(&self, var: &str) -> Result<Duration, EnvError> {
        let secs = self.get_u32(var)?;
        Ok(Duration::from_secs(secs as u64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn falls_back_to_default_when_unset() {
        let loader = EnvConfigLoader::new("EXPLORER_TEST_").default("chunk_size", "400");
        assert_eq!(loader.get_u32("chunk_size").unwrap(), 400);
    }

    #[test]
    fn env_var_overrides_default() {
        env::set_var("EXPLORER_TEST_OVERLAP", "77");
        let loader = EnvConfigLoader::new("EXPLORER_TEST_").default("overlap", "50");
        assert_eq!(loader.get_u32("overlap").unwrap(), 77);
        env::remove_var("EXPLORER_TEST_OVERLAP");
    }

    #[test]
    fn missing_without_default_errors() {
        let loader = EnvConfigLoader::new("EXPLORER_TEST_");
        assert!(loader.get("nonexistent").is_err());
    }
}
