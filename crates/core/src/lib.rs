//! Airprompts domain logic.
//!
//! Pure building blocks shared by the database and API layers: placeholder
//! extraction and rendering, sequential workflow execution, feature-flag
//! resolution, import/export planning, and validation limits. Nothing in
//! this crate touches the database or the network.

pub mod error;
pub mod export;
pub mod flags;
pub mod template;
pub mod types;
pub mod validation;
pub mod workflow;
