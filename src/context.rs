//! Memory context retrieval for prompt injection.

use std::sync::Arc;

use tracing::{info, warn};

use crate::worker::WorkerClient;

/// Fetches a project's memory context and formats it for a system prompt.
#[derive(Debug, Clone)]
pub struct ContextInjector {
    worker: Arc<WorkerClient>,
}

impl ContextInjector {
    pub fn new(worker: Arc<WorkerClient>) -> Self {
        Self { worker }
    }

    /// Raw context text for `project`. Empty when the worker has nothing or fails.
    pub async fn inject_context(&self, project: &str) -> String {
        match self.worker.get_project_context(project).await {
            Ok(context) if context.trim().is_empty() => {
                info!(project, "no memory context available");
                String::new()
            }
            Ok(context) => {
                info!(project, chars = context.len(), "memory context injected");
                context
            }
            Err(e) => {
                warn!(project, error = %e, "failed to fetch memory context");
                String::new()
            }
        }
    }

    /// Context wrapped as a system-prompt section, or empty when there is none.
    pub async fn system_prompt_addition(&self, project: &str) -> String {
        let context = self.inject_context(project).await;
        format_prompt_addition(&context)
    }
}

pub fn format_prompt_addition(context: &str) -> String {
    if context.is_empty() {
        return String::new();
    }
    format!("\n## Relevant Context from Past Sessions\n\n{context}\n\n---\n")
}
