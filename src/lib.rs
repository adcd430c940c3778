pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use crate::adapters::WorkspaceClient;
pub use crate::config::Cli;
pub use crate::core::job::{JobEngine, SubmitRequest};
pub use crate::utils::error::{QuantumError, Result};
