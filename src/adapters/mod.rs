//! Adapters for the external systems behind the domain ports.

pub mod github;
pub mod kubernetes;
pub mod llm;
