#![deny(missing_docs)]
//! Lifecycle driver for the SMC module host emulator.
//!
//! A [`ModuleRuntime`] hosts one [`Module`]: it builds the configuration
//! tree around it from a [`RuntimeConfig`], feeds it input, and drives it
//! through `start → process → update → process → stop`.
//!
//! | Surface | Seen by the module as |
//! |---------|-----------------------|
//! | Own configuration | [`ConfigurationTool`] |
//! | Input, output, controllers | [`ExecutionContextTool`] |
//! | Phases and failure boundary | [`Process`] |
//!
//! Input can be loaded from JSON with [`fixture::input_from_json`].

mod config;
mod configuration_tool;
mod execution_context_tool;
pub mod fixture;
mod module;
mod process;
mod runtime;

pub use config::{ManagedConfigurationConfig, RuntimeConfig};
pub use configuration_tool::ConfigurationTool;
pub use execution_context_tool::ExecutionContextTool;
pub use module::Module;
pub use process::Process;
pub use runtime::{HOST_MODULE, ModuleRuntime, RuntimeBuilder};
