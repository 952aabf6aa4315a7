#![deny(missing_docs)]
//! # smc-emulator: umbrella crate
//!
//! A single import surface for the SMC module host emulator. Re-exports the
//! protocol types and, behind feature flags, the configuration tree, the
//! flow controller and the lifecycle driver, plus a `prelude` for writing
//! and testing a module.

pub use smc_api;
#[cfg(feature = "config")]
pub use smc_config;
#[cfg(feature = "flow")]
pub use smc_flow;
#[cfg(feature = "runtime")]
pub use smc_runtime;

/// Happy-path imports for hosting a module.
pub mod prelude {
    pub use smc_api::{
        Action, ActionType, Command, CommandType, ManagedUnit, Message, MessageType, ModuleError,
        SourceFilter, Value, ValueType, WorkInterval,
    };

    #[cfg(feature = "config")]
    pub use smc_config::{
        ConfigurationRef, ContainerRef, ExecutionContextRef, SharedState, SourceGetType,
        SourceListRef,
    };

    #[cfg(feature = "flow")]
    pub use smc_flow::{ConfigurationController, FlowController};

    #[cfg(feature = "runtime")]
    pub use smc_runtime::{
        ConfigurationTool, ExecutionContextTool, Module, ModuleRuntime, RuntimeBuilder,
        RuntimeConfig, fixture::input_from_json,
    };
}
