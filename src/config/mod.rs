//! Configuration system (layered: defaults < TOML file < env < CLI flags).
//!
//! CLI flags are applied by the binary on top of what [`HrAgentConfig::load`]
//! returns.

use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;

use crate::error::HrAgentError;

pub const DEFAULT_MODEL: &str = "claude-sonnet-4-5";
pub const DEFAULT_LANGFUSE_HOST: &str = "https://cloud.langfuse.com";

/// Top-level service configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct HrAgentConfig {
    pub server: ServerConfig,
    pub anthropic: AnthropicConfig,
    pub agent: AgentSettings,
    pub langfuse: LangfuseConfig,
    pub pricing: PricingConfig,
}

/// HTTP listener settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

/// Model endpoint settings.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct AnthropicConfig {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: Option<f64>,
    /// Per-HTTP-request timeout for model calls.
    pub request_timeout_secs: u64,
}

impl Default for AnthropicConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: None,
            model: DEFAULT_MODEL.to_string(),
            max_tokens: 4096,
            temperature: None,
            request_timeout_secs: 120,
        }
    }
}

impl fmt::Debug for AnthropicConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnthropicConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| ".."))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

/// Agent loop limits.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AgentSettings {
    pub max_tool_iterations: usize,
    /// Upper bound for one chat turn, tool calls included.
    pub timeout_secs: u64,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            max_tool_iterations: 20,
            timeout_secs: 120,
        }
    }
}

/// Trace collector settings. Tracing is on only when both keys are set.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct LangfuseConfig {
    pub host: String,
    pub public_key: Option<String>,
    pub secret_key: Option<String>,
    pub batch_size: usize,
    pub flush_interval_ms: u64,
}

impl Default for LangfuseConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_LANGFUSE_HOST.to_string(),
            public_key: None,
            secret_key: None,
            batch_size: 32,
            flush_interval_ms: 1000,
        }
    }
}

impl fmt::Debug for LangfuseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LangfuseConfig")
            .field("host", &self.host)
            .field("public_key", &self.public_key)
            .field("secret_key", &self.secret_key.as_ref().map(|_| ".."))
            .field("batch_size", &self.batch_size)
            .field("flush_interval_ms", &self.flush_interval_ms)
            .finish()
    }
}

impl LangfuseConfig {
    /// `(public, secret)` when both keys are set. Tracing is off otherwise.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        Some((self.public_key.as_deref()?, self.secret_key.as_deref()?))
    }
}

/// USD price per million tokens, used for trace cost metadata.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PricingConfig {
    pub input_per_m: f64,
    pub output_per_m: f64,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            input_per_m: 3.0,
            output_per_m: 15.0,
        }
    }
}

impl HrAgentConfig {
    /// Load defaults, then the optional TOML file, then the environment
    /// (a `.env` file in the working directory is honoured).
    pub fn load(path: Option<&Path>) -> Result<Self, HrAgentError> {
        let _ = dotenvy::dotenv();
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Parse a TOML config file.
    pub fn from_file(path: &Path) -> Result<Self, HrAgentError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml(&raw)
    }

    /// Parse TOML text.
    pub fn from_toml(raw: &str) -> Result<Self, HrAgentError> {
        toml::from_str(raw)
            .map_err(|e| HrAgentError::Configuration(format!("invalid config file: {e}")))
    }

    /// Overlay values from an environment lookup.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), HrAgentError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let string = |key: &str, slot: &mut String| {
            if let Some(v) = lookup(key) {
                *slot = v;
            }
        };
        let optional = |key: &str, slot: &mut Option<String>| {
            if let Some(v) = lookup(key).filter(|v| !v.is_empty()) {
                *slot = Some(v);
            }
        };

        optional("ANTHROPIC_API_KEY", &mut self.anthropic.api_key);
        optional("ANTHROPIC_BASE_URL", &mut self.anthropic.base_url);
        string("HR_AGENT_MODEL", &mut self.anthropic.model);
        string("HR_AGENT_HOST", &mut self.server.host);
        string("LANGFUSE_HOST", &mut self.langfuse.host);
        optional("LANGFUSE_PUBLIC_KEY", &mut self.langfuse.public_key);
        optional("LANGFUSE_SECRET_KEY", &mut self.langfuse.secret_key);

        parse_into(&lookup, "HR_AGENT_PORT", &mut self.server.port)?;
        parse_into(&lookup, "HR_AGENT_MAX_TOKENS", &mut self.anthropic.max_tokens)?;
        parse_into(
            &lookup,
            "HR_AGENT_MAX_TOOL_ITERATIONS",
            &mut self.agent.max_tool_iterations,
        )?;
        parse_into(&lookup, "HR_AGENT_TIMEOUT_SECS", &mut self.agent.timeout_secs)?;
        parse_into(
            &lookup,
            "HR_AGENT_REQUEST_TIMEOUT_SECS",
            &mut self.anthropic.request_timeout_secs,
        )?;
        parse_into(&lookup, "HR_AGENT_INPUT_PRICE_PER_M", &mut self.pricing.input_per_m)?;
        parse_into(&lookup, "HR_AGENT_OUTPUT_PRICE_PER_M", &mut self.pricing.output_per_m)?;
        Ok(())
    }

    /// Fail early when the service cannot run.
    pub fn validate(&self) -> Result<(), HrAgentError> {
        if self.anthropic_api_key().is_none() {
            return Err(HrAgentError::Configuration(
                "ANTHROPIC_API_KEY is not set".into(),
            ));
        }
        if self.agent.max_tool_iterations == 0 {
            return Err(HrAgentError::Configuration(
                "max_tool_iterations must be at least 1".into(),
            ));
        }
        if self.langfuse.public_key.is_some() != self.langfuse.secret_key.is_some() {
            return Err(HrAgentError::Configuration(
                "LANGFUSE_PUBLIC_KEY and LANGFUSE_SECRET_KEY must be set together".into(),
            ));
        }
        Ok(())
    }

    pub fn anthropic_api_key(&self) -> Option<&str> {
        self.anthropic.api_key.as_deref()
    }

    pub fn anthropic_base_url(&self) -> Option<&str> {
        self.anthropic.base_url.as_deref()
    }

    pub fn model(&self) -> &str {
        &self.anthropic.model
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.anthropic.request_timeout_secs)
    }

    pub fn agent_timeout(&self) -> Duration {
        Duration::from_secs(self.agent.timeout_secs)
    }

    /// `host:port` for the listener.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

fn parse_into<T, F>(lookup: &F, key: &str, slot: &mut T) -> Result<(), HrAgentError>
where
    T: FromStr,
    T::Err: fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    if let Some(raw) = lookup(key) {
        *slot = raw
            .trim()
            .parse()
            .map_err(|e| HrAgentError::Configuration(format!("{key}={raw}: {e}")))?;
    }
    Ok(())
}
