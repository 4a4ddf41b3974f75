use std::collections::HashMap;

/// Prompt number reported for sessions the tracker has never seen.
pub const DEFAULT_PROMPT_NUMBER: u32 = 1;

/// Per-host-session prompt counters, seeded from the worker's init response.
#[derive(Debug, Default)]
pub struct PromptTracker {
    counters: HashMap<String, u32>,
}

impl PromptTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed(&mut self, host_id: &str, prompt_number: u32) {
        self.counters.insert(host_id.to_string(), prompt_number);
    }

    pub fn current(&self, host_id: &str) -> u32 {
        self.counters
            .get(host_id)
            .copied()
            .unwrap_or(DEFAULT_PROMPT_NUMBER)
    }

    /// Advance the counter and return the new value.
    pub fn increment(&mut self, host_id: &str) -> u32 {
        let next = self.current(host_id).saturating_add(1);
        self.counters.insert(host_id.to_string(), next);
        next
    }

    pub fn remove(&mut self, host_id: &str) {
        self.counters.remove(host_id);
    }

    pub fn len(&self) -> usize {
        self.counters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counters.is_empty()
    }
}
