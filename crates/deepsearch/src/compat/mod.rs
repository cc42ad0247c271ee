//! Bridges between the pipeline's provider traits and the Rig framework

mod rig_agent_adapter;

pub use rig_agent_adapter::RigAgentAdapter;
