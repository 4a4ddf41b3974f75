//! Process-level wiring: one [`MemoryIntegration`] is built at startup and owns
//! the shared worker client, the event bridge, and the context injector.
//!
//! If the worker is not ready within the configured budget the integration
//! stays up in a degraded "memory unavailable" mode instead of failing.

use std::sync::Arc;

use anyhow::{bail, Result};
use serde::Serialize;
use tracing::{error, info, warn};

use crate::bridge::{Binding, EventBridge, EventBus};
use crate::config::BridgeConfig;
use crate::context::ContextInjector;
use crate::project::current_project;
use crate::worker::{SearchOptions, SearchResults, WorkerClient};

/// Snapshot reported by [`MemoryIntegration::status`].
#[derive(Debug, Clone, Serialize)]
pub struct IntegrationStatus {
    pub initialized: bool,
    pub worker_ready: bool,
    pub worker_url: String,
    pub current_project: String,
}

pub struct MemoryIntegration {
    config: BridgeConfig,
    worker: Arc<WorkerClient>,
    bridge: EventBridge,
    injector: ContextInjector,
    binding: Option<Binding>,
    initialized: bool,
    memory_available: bool,
}

impl MemoryIntegration {
    pub fn new(config: BridgeConfig) -> Result<Self> {
        let worker = Arc::new(WorkerClient::new(&config.worker)?);
        let bridge = EventBridge::new(Arc::clone(&worker));
        let injector = ContextInjector::new(Arc::clone(&worker));
        Ok(Self {
            config,
            worker,
            bridge,
            injector,
            binding: None,
            initialized: false,
            memory_available: false,
        })
    }

    /// Wait for the worker, then attach the bridge to `bus` (or run standalone).
    ///
    /// Never fails: an unready worker leaves memory unavailable. Calling this
    /// again after a successful initialization is a no-op.
    pub async fn initialize(&mut self, bus: Option<&dyn EventBus>) {
        if self.initialized {
            info!("integration already initialized");
            return;
        }

        info!(worker = %self.worker.base_url(), "initializing memory integration");
        let budget = self.config.worker.ready_timeout();
        if !self.worker.wait_for_ready(budget).await {
            error!(
                worker = %self.worker.base_url(),
                timeout_ms = budget.as_millis() as u64,
                "worker not ready, memory features unavailable"
            );
            self.memory_available = false;
            return;
        }
        info!("worker service is ready");

        self.binding = Some(self.bridge.attach(bus));
        self.initialized = true;
        self.memory_available = true;
        info!(project = %current_project(), "memory integration initialized");
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn is_memory_available(&self) -> bool {
        self.memory_available
    }

    /// Whether the bridge ended up bound to a host bus.
    pub fn is_bound(&self) -> bool {
        self.binding.as_ref().is_some_and(Binding::is_bound)
    }

    pub async fn status(&self) -> IntegrationStatus {
        let worker_ready = self.memory_available && self.worker.health_check().await;
        IntegrationStatus {
            initialized: self.initialized,
            worker_ready,
            worker_url: self.worker.base_url().to_string(),
            current_project: current_project(),
        }
    }

    /// Memory context for `project` (or the current directory's project).
    /// `None` while memory is unavailable.
    pub async fn project_context(&self, project: Option<&str>) -> Option<String> {
        if !self.memory_available {
            warn!("memory features are not available");
            return None;
        }
        let project = project.map_or_else(current_project, str::to_string);
        Some(self.injector.inject_context(&project).await)
    }

    pub async fn search_memory(&self, query: &str, options: &SearchOptions) -> Result<SearchResults> {
        if !self.memory_available {
            warn!("memory features are not available");
            bail!("memory features not available");
        }
        Ok(self.worker.search(query, options).await?)
    }

    /// Wait for the bound dispatch loop to drain after the bus has closed.
    pub async fn drain(&mut self) {
        if let Some(binding) = self.binding.take() {
            binding.join().await;
        }
    }

    /// Detach from the bus and drop back to the uninitialized state.
    pub fn shutdown(&mut self) {
        info!("shutting down memory integration");
        if let Some(binding) = self.binding.take() {
            binding.detach();
        }
        self.initialized = false;
        self.memory_available = false;
    }

    pub fn worker(&self) -> &Arc<WorkerClient> {
        &self.worker
    }

    pub fn bridge(&self) -> &EventBridge {
        &self.bridge
    }

    pub fn context_injector(&self) -> &ContextInjector {
        &self.injector
    }
}
