//! Model boundary for the debate workflow
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │     Debate nodes (via NodeContext)      │
//! └─────────────────┬───────────────────────┘
//!                   │ invoke(prompt)
//!                   ▼
//! ┌─────────────────────────────────────────┐
//! │          ModelClient (trait)            │
//! └─────────────────┬───────────────────────┘
//!          ┌────────┴─────────┐
//!          ▼                  ▼
//! ┌──────────────────┐ ┌──────────────────┐
//! │ OpenAiCompat     │ │ RigModelClient   │
//! │ (per request)    │ │ (any Rig Agent)  │
//! └──────────────────┘ └──────────────────┘
//! ```
//!
//! Responses are untrusted text; use [`extract_structured`] or [`extract_as`]
//! to read JSON out of them.

pub mod config;
pub mod extract;
pub mod openai;
pub mod provider;

pub use config::ModelConfig;
pub use extract::{content_to_string, extract_as, extract_structured, truncate_chars};
pub use openai::OpenAiCompatClient;
pub use provider::{ModelClient, ModelResponse};
