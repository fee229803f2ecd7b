//! Azure interaction through the Azure CLI.
//!
//! This module handles all Azure-related operations:
//! - [`cli`] - Command execution for Azure CLI
//! - [`client`] - Collaborator implementations for vnet, permission and provider reads

mod cli;
mod client;

// Re-export public types and functions
pub use cli::{classify_failure, run};
pub use client::AzCliClient;
