//! In-memory session identity state.
//!
//! - [`mapper`]: bidirectional host ⇄ worker session id mapping
//! - [`prompts`]: per-host-session prompt counters
//!
//! Nothing here survives a process restart.

pub mod mapper;
pub mod prompts;

pub use mapper::SessionMapper;
pub use prompts::PromptTracker;
