//! Configuration for the model endpoint and where it is read from

use std::path::PathBuf;
use serde::{Deserialize, Serialize};
use log::{debug, warn};

pub const DEFAULT_ENDPOINT: &str = "http://localhost:11434";
pub const DEFAULT_MODEL: &str = "codellama";
pub const DEFAULT_MAX_TOKENS: u32 = 2048;

pub const ENV_ENDPOINT: &str = "LASSIST_MODEL_ENDPOINT";
pub const ENV_MODEL: &str = "LASSIST_MODEL_NAME";
pub const ENV_MAX_TOKENS: &str = "LASSIST_MAX_TOKENS";

/// Model endpoint configuration, snapshotted per query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Configuration
{   /// Base URL of the model server
    #[serde(rename = "modelEndpoint")]
    pub endpoint_base_url: String
  , /// Model to run the prompt against
    #[serde(rename = "modelName")]
    pub model_name: String
  , /// Max tokens to generate
    #[serde(rename = "maxTokens")]
    pub max_tokens: u32
}

impl Default for Configuration
{   fn default() -> Self
    {   Configuration
        {   endpoint_base_url: DEFAULT_ENDPOINT.to_string()
          , model_name: DEFAULT_MODEL.to_string()
          , max_tokens: DEFAULT_MAX_TOKENS
        }
    }
}

impl Configuration
{   /// Parse a settings JSON object; absent keys take defaults
    pub fn from_json_str(s: &str)
      -> Result<Self, crate::error::Error>
    {   serde_json::from_str(s).map_err(|e| {
          crate::error::Error::InvalidConfiguration(e.to_string())
        })
    }

    /// Apply overrides looked up through `lookup` (normally the
    /// process environment)
    pub fn apply_overrides<F>(mut self, lookup: F)
      -> Result<Self, crate::error::Error>
    where F: Fn(&str) -> Option<String>
    {   if let Some(endpoint) = lookup(ENV_ENDPOINT)
        {   debug!("Endpoint overridden from {}", ENV_ENDPOINT);
            self.endpoint_base_url = endpoint;
        }
        if let Some(model) = lookup(ENV_MODEL)
        {   debug!("Model overridden from {}", ENV_MODEL);
            self.model_name = model;
        }
        if let Some(raw) = lookup(ENV_MAX_TOKENS)
        {   self.max_tokens = raw.trim().parse().map_err(|_| {
              crate::error::Error::InvalidConfiguration(format!(
                "{} is not a token count: {}", ENV_MAX_TOKENS, raw
              ))
            })?;
        }
        Ok(self)
    }

    /// Reject values no request could be built from
    pub fn validate(&self) -> Result<(), crate::error::Error>
    {   if !(self.endpoint_base_url.starts_with("http://")
          || self.endpoint_base_url.starts_with("https://"))
        {   return Err(crate::error::Error::InvalidConfiguration(
              format!(
                "modelEndpoint must be an http(s) URL: {}",
                self.endpoint_base_url
              )
            ));
        }
        if self.model_name.trim().is_empty()
        {   return Err(crate::error::Error::InvalidConfiguration(
              "modelName is empty".to_string()
            ));
        }
        Ok(())
    }

    /// Full URL of the generate call
    pub fn generate_url(&self) -> String
    {   format!(
          "{}/api/generate",
          self.endpoint_base_url.trim_end_matches('/')
        )
    }
}

/// Where configuration comes from. Queried on every request so
/// edits take effect without restarting anything.
pub trait ConfigSource: Send + Sync
{   fn current(&self) -> Result<Configuration, crate::error::Error>;
}

impl ConfigSource for Configuration
{   fn current(&self) -> Result<Configuration, crate::error::Error>
    {   Ok(self.clone())
    }
}

/// Settings file on disk plus environment overrides
#[derive(Debug, Clone)]
pub struct SettingsFile
{   pub path: PathBuf
}

impl SettingsFile
{   pub fn new(path: impl Into<PathBuf>) -> Self
    {   SettingsFile { path: path.into() }
    }
}

impl ConfigSource for SettingsFile
{   fn current(&self) -> Result<Configuration, crate::error::Error>
    {   let base = match std::fs::read_to_string(&self.path)
        {   Ok(text) => Configuration::from_json_str(&text)?
          , Err(e) => {
              warn!(
                "Settings file {} unreadable ({}), using defaults",
                self.path.display(), e
              );
              Configuration::default()
            }
        };
        let config = base.apply_overrides(|k| std::env::var(k).ok())?;
        config.validate()?;
        Ok(config)
    }
}
