//! Lifecycle driver.

use crate::configuration_tool::ConfigurationTool;
use crate::execution_context_tool::ExecutionContextTool;
use crate::module::Module;
use smc_api::{Message, MessageType, ModuleError};

/// Drives a [`Module`] through its lifecycle phases.
///
/// Every phase is bracketed by `ACTION_START` and `ACTION_STOP` markers
/// (both carrying `1`). A failing entry point adds one `ACTION_ERROR`
/// between them, and the next phase still runs. Without a module every
/// phase yields nothing.
pub struct Process {
    module: Option<Box<dyn Module>>,
}

fn describe(err: &ModuleError) -> String {
    match err {
        ModuleError::Failure(reason) => reason.clone(),
        other => other.to_string(),
    }
}

/// Wrap a phase outcome in its markers.
fn bracket(phase: &str, start: Message, outcome: Result<Vec<Message>, ModuleError>) -> Vec<Message> {
    let mut result = vec![start];
    match outcome {
        Ok(output) => result.extend(output),
        Err(err) => {
            tracing::warn!(phase, error = %err, "module entry point failed");
            result.push(Message::new(
                format!("error {}", describe(&err)),
                MessageType::ActionError,
            ));
        }
    }
    result.push(Message::new(1, MessageType::ActionStop));
    result
}

fn start_marker(phase: &str) -> Message {
    tracing::debug!(phase, "lifecycle phase");
    Message::new(1, MessageType::ActionStart)
}

impl Process {
    /// Drive `module`, or nothing.
    pub fn new(module: Option<Box<dyn Module>>) -> Self {
        Self { module }
    }

    /// Whether a module is attached.
    pub fn has_module(&self) -> bool {
        self.module.is_some()
    }

    /// Run `start`.
    pub async fn start(&mut self, configuration: &mut ConfigurationTool) -> Vec<Message> {
        let Some(module) = self.module.as_mut() else {
            return Vec::new();
        };
        let marker = start_marker("start");
        let outcome = module.start(configuration).await.map(|()| Vec::new());
        bracket("start", marker, outcome)
    }

    /// Run `process`. The phase result carries what the call emitted; the
    /// shared log ends up as its prior content followed by that output,
    /// whether or not the call failed.
    pub async fn execute(
        &mut self,
        configuration: &mut ConfigurationTool,
        context: &mut ExecutionContextTool,
    ) -> Result<Vec<Message>, ModuleError> {
        let Some(module) = self.module.as_mut() else {
            return Ok(Vec::new());
        };
        let marker = start_marker("process");
        let prior = context.state().write(|host| Ok(host.output.take()))?;
        let outcome = module.process(configuration, context).await;
        let fresh = context.state().write(|host| {
            let fresh = host.output.take();
            host.output.extend(prior);
            host.output.extend(fresh.iter().cloned());
            Ok(fresh)
        })?;
        Ok(bracket("process", marker, outcome.map(|()| fresh)))
    }

    /// Run `update`.
    pub async fn update(&mut self, configuration: &mut ConfigurationTool) -> Vec<Message> {
        let Some(module) = self.module.as_mut() else {
            return Vec::new();
        };
        let marker = start_marker("update");
        let outcome = module.update(configuration).await.map(|()| Vec::new());
        bracket("update", marker, outcome)
    }

    /// Run `stop`.
    pub async fn stop(&mut self, configuration: &mut ConfigurationTool) -> Vec<Message> {
        let Some(module) = self.module.as_mut() else {
            return Vec::new();
        };
        let marker = start_marker("stop");
        let outcome = module.stop(configuration).await.map(|()| Vec::new());
        bracket("stop", marker, outcome)
    }

    /// `start`, `process`, `update`, `process`, `stop`, concatenated.
    pub async fn full_life_cycle(
        &mut self,
        configuration: &mut ConfigurationTool,
        context: &mut ExecutionContextTool,
    ) -> Result<Vec<Message>, ModuleError> {
        let mut result = self.start(configuration).await;
        result.extend(self.execute(configuration, context).await?);
        result.extend(self.update(configuration).await);
        result.extend(self.execute(configuration, context).await?);
        result.extend(self.stop(configuration).await);
        Ok(result)
    }
}

impl std::fmt::Debug for Process {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Process")
            .field("module", &self.module.is_some())
            .finish()
    }
}
