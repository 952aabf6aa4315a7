//! # smc-api: protocol types for the SMC module host emulator
//!
//! A module running inside the host sees the world through a small set of
//! typed envelopes. This crate defines them, together with the handles and
//! traits the emulator crates build on.
//!
//! ## The Envelopes
//!
//! | Layer | Type | What it carries |
//! |-------|------|-----------------|
//! | ① Scalar | [`Value`] | One typed payload, kind fixed at construction |
//! | ② Message | [`Message`] | A value, its [`MessageType`] and a timestamp |
//! | ③ Action | [`Action`] | Ordered messages produced by one unit run |
//! | ④ Command | [`Command`] | Ordered actions received as one instruction |
//!
//! ## Around Them
//!
//! | Concern | Types |
//! |---------|-------|
//! | Structured payloads | [`ObjectArray`], [`ObjectElement`], [`ObjectField`] |
//! | Narrowing resolved data | [`SourceFilter`] |
//! | Module catalog | [`ModuleDescriptor`], [`ModuleType`] |
//! | Arena handles | [`ContainerId`], [`ConfigurationId`], [`ExecutionContextId`], [`TaskHandle`] |
//! | Managed execution | [`ManagedUnit`], [`FnUnit`] |
//! | Failures | [`ModuleError`] |
//!
//! Every control-plane change the emulator makes is reported as a
//! [`Message`] appended to an [`OutputLog`]; the kinds and payload
//! conventions live on [`MessageType`].

#![deny(missing_docs)]

pub mod action;
pub mod error;
pub mod filter;
pub mod id;
pub mod interval;
pub mod message;
pub mod module_type;
pub mod object;
pub mod unit;
pub mod value;

#[cfg(feature = "test-utils")]
pub mod test_utils;

// Re-exports for convenience
pub use action::{Action, ActionType, Command, CommandType, filter_actions};
pub use error::ModuleError;
pub use filter::{SourceFilter, SourceFilterType};
pub use id::{ConfigurationId, ContainerId, ExecutionContextId, TaskHandle};
pub use interval::WorkInterval;
pub use message::{Message, MessageType, OutputLog};
pub use module_type::{ModuleDescriptor, ModuleType};
pub use object::{ObjectArray, ObjectElement, ObjectField};
pub use unit::{FnUnit, ManagedUnit};
pub use value::{Value, ValueType};
