//! Compatibility layer for Rig framework integration
//!
//! ```text
//! ┌──────────────────────────┐      ┌──────────────────────────┐
//! │ rig-deliberation         │      │ Rig Framework            │
//! │ ModelClient trait        │◄─────│ Agent<M>                 │
//! │ (prompt -> text)         │ wraps│ (CompletionModel)        │
//! └──────────────────────────┘      └──────────────────────────┘
//! ```

mod rig_agent_adapter;

pub use rig_agent_adapter::RigModelClient;
