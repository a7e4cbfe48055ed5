//! The agent control loop.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use quire_ops::{DocumentAdapter, OperationRegistry};
use quire_session::SessionStore;
use quire_turn::{Provider, ProviderRequest, TokenUsage};
use quire_types::{AgentError, OperationCall, OperationError, SessionId, Turn};
use serde::{Deserialize, Serialize};
use tracing::Instrument;

use crate::config::AgentConfig;
use crate::context::AgentContext;
use crate::normalize::normalize;

/// Why a run ended.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitReason {
    /// The engine gave a final answer.
    Complete,
    /// The iteration bound was reached while the engine still wanted
    /// to run operations.
    MaxIterations,
}

/// One executed operation call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationRecord {
    /// Call id the result was filed under.
    pub call_id: String,
    /// Operation name as requested.
    pub name: String,
    /// Wall-clock time spent in the adapter.
    pub duration_ms: u64,
    /// Whether the operation succeeded.
    pub success: bool,
}

/// Result of [`Agent::run`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunOutput {
    /// The answer for the user.
    pub response: String,
    /// Why the loop stopped.
    pub exit_reason: ExitReason,
    /// Engine consultations made.
    pub iterations: u32,
    /// Every operation call, in execution order.
    pub operations: Vec<OperationRecord>,
    /// Token usage summed over all consultations.
    pub usage: TokenUsage,
}

enum LoopState {
    AwaitingModel,
    ExecutingOperations {
        text: String,
        calls: Vec<OperationCall>,
    },
    Done {
        answer: String,
        exit_reason: ExitReason,
    },
}

/// Drives the engine and the document operations for one file per run.
///
/// Generic over `P: Provider`; everything else is injected as a shared
/// handle so several agents can share one session store or adapter.
pub struct Agent<P: Provider> {
    provider: P,
    registry: Arc<OperationRegistry>,
    adapter: Arc<dyn DocumentAdapter>,
    sessions: Arc<SessionStore>,
    config: AgentConfig,
}

impl<P: Provider> Agent<P> {
    /// Create an agent from its dependencies.
    pub fn new(
        provider: P,
        registry: Arc<OperationRegistry>,
        adapter: Arc<dyn DocumentAdapter>,
        sessions: Arc<SessionStore>,
        config: AgentConfig,
    ) -> Self {
        Self {
            provider,
            registry,
            adapter,
            sessions,
            config,
        }
    }

    /// The session store this agent commits to.
    pub fn sessions(&self) -> &Arc<SessionStore> {
        &self.sessions
    }

    /// The operation catalog offered to the engine.
    pub fn registry(&self) -> &OperationRegistry {
        &self.registry
    }

    /// The agent's configuration.
    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    /// Handle one user message against `file_path` within `session_id`.
    ///
    /// The session is locked for the whole run. The user message is
    /// committed before the first consultation, each engine turn is
    /// committed together with all of its results, and the final answer is
    /// committed last. Engine failures abort the run; operation failures
    /// are reported back to the engine as result text.
    pub async fn run(
        &self,
        message: &str,
        file_path: impl AsRef<Path>,
        session_id: &SessionId,
    ) -> Result<RunOutput, AgentError> {
        let context = AgentContext::new(file_path);
        let span = tracing::info_span!(
            "agent_run",
            session_id = %session_id,
            file_kind = %context.file_kind,
        );
        self.run_in_context(message, context, session_id)
            .instrument(span)
            .await
    }

    async fn run_in_context(
        &self,
        message: &str,
        context: AgentContext,
        session_id: &SessionId,
    ) -> Result<RunOutput, AgentError> {
        let mut session = self.sessions.checkout(session_id).await;
        session.commit([Turn::user(message)]);

        let system = context.system_prompt(self.config.system_addendum.as_deref());
        let tools = self.registry.schemas();
        let mut usage = TokenUsage::default();
        let mut iterations: u32 = 0;
        let mut operations: Vec<OperationRecord> = Vec::new();
        let mut state = LoopState::AwaitingModel;

        loop {
            state = match state {
                LoopState::AwaitingModel if iterations >= self.config.max_iterations => {
                    LoopState::Done {
                        answer: format!(
                            "Stopped: max iterations exceeded ({}) before the request was completed.",
                            self.config.max_iterations
                        ),
                        exit_reason: ExitReason::MaxIterations,
                    }
                }
                LoopState::AwaitingModel => {
                    iterations += 1;
                    let request = ProviderRequest {
                        model: self.config.model.clone(),
                        system: Some(system.clone()),
                        turns: session.history().to_vec(),
                        tools: tools.clone(),
                        max_tokens: self.config.max_tokens,
                        temperature: self.config.temperature,
                        extra: serde_json::Value::Null,
                    };
                    tracing::debug!(
                        iteration = iterations,
                        turns = request.turns.len(),
                        "consulting model"
                    );

                    let response = self.provider.complete(request).await?;
                    usage.accumulate(&response.usage);
                    let text = normalize(&response.content);

                    if response.calls.is_empty() {
                        LoopState::Done {
                            answer: text,
                            exit_reason: ExitReason::Complete,
                        }
                    } else {
                        LoopState::ExecutingOperations {
                            text,
                            calls: assign_call_ids(response.calls, iterations),
                        }
                    }
                }
                LoopState::ExecutingOperations { text, calls } => {
                    let mut results = Vec::with_capacity(calls.len());
                    for call in &calls {
                        let started = Instant::now();
                        let outcome = self.execute_call(call, &context).await;
                        let duration_ms = started.elapsed().as_millis() as u64;

                        let (result_text, is_error) = match outcome {
                            Ok(text) => (text, false),
                            Err(err) => (err.to_string(), true),
                        };
                        tracing::info!(
                            operation = %call.name,
                            duration_ms,
                            is_error,
                            "operation finished"
                        );
                        operations.push(OperationRecord {
                            call_id: call.id.clone(),
                            name: call.name.clone(),
                            duration_ms,
                            success: !is_error,
                        });
                        results.push(Turn::OperationResult {
                            call_id: call.id.clone(),
                            name: call.name.clone(),
                            text: result_text,
                            is_error,
                        });
                    }
                    session.commit(std::iter::once(Turn::Agent { text, calls }).chain(results));
                    LoopState::AwaitingModel
                }
                LoopState::Done {
                    answer,
                    exit_reason,
                } => {
                    session.commit([Turn::agent(answer.clone())]);
                    if exit_reason == ExitReason::MaxIterations {
                        tracing::warn!(
                            max_iterations = self.config.max_iterations,
                            "run stopped at iteration limit"
                        );
                    }
                    return Ok(RunOutput {
                        response: answer,
                        exit_reason,
                        iterations,
                        operations,
                        usage,
                    });
                }
            };
        }
    }

    async fn execute_call(
        &self,
        call: &OperationCall,
        context: &AgentContext,
    ) -> Result<String, OperationError> {
        let descriptor = self.registry.resolve(&call.name)?;
        let args = descriptor.bind(&call.arguments)?;
        self.adapter
            .execute(descriptor, &context.file_path, &args)
            .await
    }
}

/// Give every call an id; engines that omit one get `call_<iteration>_<index>`.
fn assign_call_ids(calls: Vec<OperationCall>, iteration: u32) -> Vec<OperationCall> {
    calls
        .into_iter()
        .enumerate()
        .map(|(idx, mut call)| {
            if call.id.is_empty() {
                call.id = format!("call_{iteration}_{idx}");
            }
            call
        })
        .collect()
}
