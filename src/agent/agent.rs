//! The HR agent adapter over an [`AgentRuntime`].

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::config::PricingConfig;
use crate::error::HrAgentError;
use crate::provider::ModelProvider;
use crate::runtime::{AgentRuntime, ClaudeRuntime, RunObserver, RuntimeRequest};
use crate::trace::Tracer;
use crate::types::Usage;
use crate::util::with_timeout;

use super::options::AgentOptions;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Result of one agent turn.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentReply {
    pub session_id: String,
    pub content: String,
    pub is_new_session: bool,
    pub usage: Usage,
}

/// Forwards chat messages to the runtime and traces each call.
///
/// Holds no conversation text itself; continuity comes from passing the
/// runtime's session id back in.
pub struct HrAgent {
    runtime: Arc<dyn AgentRuntime>,
    tracer: Option<Tracer>,
    pricing: PricingConfig,
    timeout: Duration,
}

impl HrAgent {
    pub fn new(runtime: Arc<dyn AgentRuntime>) -> Self {
        Self {
            runtime,
            tracer: None,
            pricing: PricingConfig::default(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Build a [`ClaudeRuntime`] from `options` and wrap it.
    pub fn with_provider(provider: Arc<dyn ModelProvider>, options: AgentOptions) -> Self {
        let runtime = ClaudeRuntime::new(provider, options.into_runtime_options());
        Self::new(Arc::new(runtime))
    }

    pub fn with_tracer(mut self, tracer: Tracer, pricing: PricingConfig) -> Self {
        self.tracer = Some(tracer);
        self.pricing = pricing;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Send `message`, continuing `session_id` when given.
    pub async fn respond(
        &self,
        message: &str,
        session_id: Option<String>,
    ) -> Result<AgentReply, HrAgentError> {
        let trace = self.tracer.as_ref().map(|tracer| {
            Arc::new(tracer.start_request(session_id.as_deref(), message, self.pricing.clone()))
        });

        let mut request = RuntimeRequest::new(message).resume(session_id.clone());
        if let Some(trace) = &trace {
            request = request.observer(Arc::clone(trace) as Arc<dyn RunObserver>);
        }

        match with_timeout(self.timeout, self.runtime.send(request)).await {
            Ok(reply) => {
                if let Some(trace) = &trace {
                    trace.finish(Some(&reply.session_id), Ok(&reply.text), reply.usage);
                }
                let is_new_session = session_id.is_none() || !reply.resumed;
                info!(
                    session_id = %reply.session_id,
                    is_new_session,
                    input_tokens = reply.usage.input_tokens,
                    output_tokens = reply.usage.output_tokens,
                    "agent turn complete"
                );
                Ok(AgentReply {
                    session_id: reply.session_id,
                    content: reply.text,
                    is_new_session,
                    usage: reply.usage,
                })
            }
            Err(e) => {
                warn!(session_id = ?session_id, error = %e, "agent turn failed");
                if let Some(trace) = &trace {
                    trace.finish(session_id.as_deref(), Err(e.to_string()), Usage::default());
                }
                Err(e)
            }
        }
    }
}

impl std::fmt::Debug for HrAgent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HrAgent")
            .field("tracing", &self.tracer.is_some())
            .field("timeout", &self.timeout)
            .finish()
    }
}
