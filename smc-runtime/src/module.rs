//! The module under test.

use crate::configuration_tool::ConfigurationTool;
use crate::execution_context_tool::ExecutionContextTool;
use async_trait::async_trait;
use smc_api::ModuleError;

/// A plugin hosted by the runtime.
///
/// Only `process` is required. Any entry point may fail; the lifecycle
/// driver turns the failure into an `ACTION_ERROR` message and carries on
/// with the next phase.
#[async_trait]
pub trait Module: Send {
    /// Called once before the first `process`.
    async fn start(&mut self, _configuration: &mut ConfigurationTool) -> Result<(), ModuleError> {
        Ok(())
    }

    /// Handle one round of input.
    async fn process(
        &mut self,
        configuration: &mut ConfigurationTool,
        context: &mut ExecutionContextTool,
    ) -> Result<(), ModuleError>;

    /// Called after the configuration changed.
    async fn update(&mut self, _configuration: &mut ConfigurationTool) -> Result<(), ModuleError> {
        Ok(())
    }

    /// Called once at shutdown.
    async fn stop(&mut self, _configuration: &mut ConfigurationTool) -> Result<(), ModuleError> {
        Ok(())
    }
}
