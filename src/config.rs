//! Configuration for the chat-completion endpoint and retry behavior

use std::path::Path;
use std::time::Duration;

use log::debug;
use serde::{Deserialize, Serialize};

pub const DEFAULT_API_BASE: &str
  = "https://api.moonshot.cn/v1";
pub const DEFAULT_MODEL: &str = "moonshot-v1-8k";
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

fn default_api_base() -> String
{   DEFAULT_API_BASE.to_string()
}

fn default_model() -> String
{   DEFAULT_MODEL.to_string()
}

fn default_temperature() -> f32
{   DEFAULT_TEMPERATURE
}

fn default_timeout_secs() -> u64
{   DEFAULT_TIMEOUT_SECS
}

/// Retry configuration; missing fields take defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig
{   /// Automatic retries after the first attempt
    pub max_retries: usize
  , /// Backoff multiplier for retries
    pub backoff_multiplier: f32
  , /// Initial backoff duration in milliseconds
    pub initial_backoff_ms: u64
}

impl Default for RetryConfig
{   fn default() -> Self
    {   RetryConfig
        {   max_retries: 2
          , backoff_multiplier: 2.0
          , initial_backoff_ms: 500
        }
    }
}

/// Generator configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratorConfig
{   /// API base URL, without the `/chat/completions` suffix
    #[serde(default = "default_api_base")]
    pub api_base: String
  , /// Model name sent with each request
    #[serde(default = "default_model")]
    pub model: String
  , /// Sampling temperature; 0.7 is the reference value and the
    /// default, other values are for experiments only
    #[serde(default = "default_temperature")]
    pub temperature: f32
  , /// Per-attempt request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64
  , #[serde(default)]
    pub retry: RetryConfig
}

impl Default for GeneratorConfig
{   fn default() -> Self
    {   GeneratorConfig
        {   api_base: default_api_base()
          , model: default_model()
          , temperature: default_temperature()
          , timeout_secs: default_timeout_secs()
          , retry: RetryConfig::default()
        }
    }
}

impl GeneratorConfig
{   /// Parse a JSON document; missing fields take defaults
    pub fn from_json_str(json: &str)
      -> Result<Self, crate::error::Error>
    {   let config: GeneratorConfig = serde_json::from_str(json)
          .map_err(|e| {
            crate::error::Error::InvalidConfiguration(e.to_string())
          })?;
        config.validate()?;
        Ok(config)
    }

    /// Load a JSON config file
    pub fn from_file(path: impl AsRef<Path>)
      -> Result<Self, crate::error::Error>
    {   let path = path.as_ref();
        debug!("Loading config from {}", path.display());
        let text = std::fs::read_to_string(path)
          .map_err(|e| {
            crate::error::Error::InvalidConfiguration(
              format!("{}: {}", path.display(), e)
            )
          })?;
        GeneratorConfig::from_json_str(&text)
    }

    /// Apply REDNOTE_API_BASE, REDNOTE_MODEL and REDNOTE_TIMEOUT_SECS
    pub fn with_env_overrides(mut self)
      -> Result<Self, crate::error::Error>
    {   if let Ok(base) = std::env::var("REDNOTE_API_BASE")
        {   debug!("api_base overridden from environment");
            self.api_base = base;
        }
        if let Ok(model) = std::env::var("REDNOTE_MODEL")
        {   debug!("model overridden from environment");
            self.model = model;
        }
        if let Ok(secs) = std::env::var("REDNOTE_TIMEOUT_SECS")
        {   self.timeout_secs = secs.trim().parse()
              .map_err(|_| {
                crate::error::Error::InvalidConfiguration(
                  format!("REDNOTE_TIMEOUT_SECS is not a number: {}", secs)
                )
              })?;
        }
        self.validate()?;
        Ok(self)
    }

    /// Full URL of the chat-completion endpoint
    pub fn completions_url(&self) -> String
    {   format!("{}/chat/completions", self.api_base.trim_end_matches('/'))
    }

    pub fn timeout(&self) -> Duration
    {   Duration::from_secs(self.timeout_secs)
    }

    pub fn validate(&self) -> Result<(), crate::error::Error>
    {   if self.api_base.trim().is_empty()
        {   return Err(crate::error::Error::InvalidConfiguration(
              "api_base is empty".to_string()
            ));
        }
        if self.model.trim().is_empty()
        {   return Err(crate::error::Error::InvalidConfiguration(
              "model is empty".to_string()
            ));
        }
        if self.timeout_secs == 0
        {   return Err(crate::error::Error::InvalidConfiguration(
              "timeout_secs must be positive".to_string()
            ));
        }
        if !(0.0..=2.0).contains(&self.temperature)
        {   return Err(crate::error::Error::InvalidConfiguration(
              format!("temperature out of range: {}", self.temperature)
            ));
        }
        Ok(())
    }
}
