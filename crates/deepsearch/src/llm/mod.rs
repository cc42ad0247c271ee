//! Generation provider abstractions
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │        Pipeline steps                   │
//! └─────────────────┬───────────────────────┘
//!                   │ uses
//!                   ▼
//! ┌─────────────────────────────────────────┐
//! │        LLMProvider (trait)              │
//! │  - complete(messages, config)           │
//! └─────────────────┬───────────────────────┘
//!                   │ implemented by
//!                   ▼
//! ┌─────────────────────────────────────────┐
//! │         RigAgentAdapter                 │
//! │   (wraps any Rig Agent<M>)              │
//! └─────────────────────────────────────────┘
//! ```

mod config;
mod message;
mod provider;

pub use config::{LLMConfig, TokenUsage};
pub use message::{extract_system_preamble, Message, Role};
pub use provider::{LLMProvider, LLMResponse};
