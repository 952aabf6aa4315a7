#![deny(missing_docs)]
//! Configuration tree of the SMC module host emulator.
//!
//! Containers hold configurations, configurations own execution contexts,
//! execution contexts own sources. The nodes live in a generational arena
//! ([`ConfigTree`]); modules work with cheap handles ([`ContainerRef`],
//! [`ConfigurationRef`], [`ExecutionContextRef`], [`SourceListRef`]) that
//! share one [`SharedState`] per runtime instance.
//!
//! Every mutation made through a handle appends exactly one control
//! message to the shared output log, in invocation order. Failed
//! mutations change nothing and emit nothing.

mod configuration;
mod container;
mod execution_context;
pub mod source;
mod source_list;
pub mod state;
pub mod tree;

pub use configuration::ConfigurationRef;
pub use container::ContainerRef;
pub use execution_context::ExecutionContextRef;
pub use source::{Source, SourceData, SourceGetType, SourceKind, SourceList, SourceParam, SourceType};
pub use source_list::SourceListRef;
pub use state::{HostState, SharedState};
pub use tree::{ConfigTree, ConfigurationNode, ContainerNode, ExecutionContextNode};
