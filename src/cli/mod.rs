//! Command-line flags for the `hr-agent` binary.

use std::path::PathBuf;

use clap::Parser;

use crate::config::HrAgentConfig;

/// HR agent HTTP service
#[derive(Parser, Debug, Default)]
#[command(name = "hr-agent", version, about = "HR agent chat API")]
pub struct Cli {
    /// TOML config file (values are overridden by environment variables)
    #[arg(short, long, env = "HR_AGENT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Address to bind
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Anthropic model id
    #[arg(short, long)]
    pub model: Option<String>,
}

impl Cli {
    /// Apply flags on top of file and environment values.
    pub fn apply(&self, config: &mut HrAgentConfig) {
        if let Some(host) = &self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(model) = &self.model {
            config.anthropic.model = model.clone();
        }
    }
}
