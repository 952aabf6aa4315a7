//! Assembly of the host around one module.

use crate::config::RuntimeConfig;
use crate::configuration_tool::ConfigurationTool;
use crate::execution_context_tool::ExecutionContextTool;
use crate::module::Module;
use crate::process::Process;
use smc_api::{Action, ManagedUnit, Message, ModuleDescriptor, ModuleError, Value, WorkInterval};
use smc_config::{ConfigurationRef, ContainerRef, SharedState};
use smc_flow::{ConfigurationController, FlowController};

/// Name of the module every runtime hosts.
pub const HOST_MODULE: &str = "Module";

/// Collects what a [`ModuleRuntime`] is built from.
///
/// ```rust,ignore
/// let mut runtime = RuntimeBuilder::new()
///     .config(RuntimeConfig::from_json(json)?)
///     .input(input_from_json(input)?)
///     .unit("worker", Box::new(worker))
///     .module(Box::new(my_module))
///     .build()?;
/// let log = runtime.full_life_cycle().await?;
/// ```
#[derive(Default)]
pub struct RuntimeBuilder {
    config: RuntimeConfig,
    input: Vec<Vec<Action>>,
    units: Vec<(String, Box<dyn ManagedUnit>)>,
    module: Option<Box<dyn Module>>,
}

impl RuntimeBuilder {
    /// Defaults everywhere, no module.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the configuration.
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the input, one list of actions per source id.
    pub fn input(mut self, input: Vec<Vec<Action>>) -> Self {
        self.input = input;
        self
    }

    /// Add a managed unit. It gets a nested execution context named `name`
    /// under the module's own, and the next flow slot.
    pub fn unit(mut self, name: impl Into<String>, unit: Box<dyn ManagedUnit>) -> Self {
        self.units.push((name.into(), unit));
        self
    }

    /// The module to drive.
    pub fn module(mut self, module: Box<dyn Module>) -> Self {
        self.module = Some(module);
        self
    }

    /// Build the tree, the controllers and the tools. The log starts empty:
    /// nothing done here is reported.
    pub fn build(self) -> Result<ModuleRuntime, ModuleError> {
        let Self {
            config,
            input,
            units,
            module,
        } = self;

        let state = SharedState::new(config.container.as_str());
        let root = ContainerRef::root(&state)?;
        let catalog = catalog(&config);

        let own = add_configuration(
            &state,
            &root,
            catalog[0].clone(),
            &config.configuration,
            config.description.clone(),
        )?;
        for (key, value) in &config.settings {
            own.set_setting(key, Value::from_json(value)?)?;
        }
        for (key, value) in &config.variables {
            own.set_variable(key, Value::from_json(value)?)?;
        }
        own.set_buffer_size(config.buffer_size)?;
        own.set_thread_buffer_size(config.thread_buffer_size)?;
        let own_context = own.create_execution_context(
            &config.execution_context,
            Some(config.execution_context_type.as_str()),
            config.max_work_interval,
        )?;

        let mut control = ConfigurationController::new(state.clone(), catalog.clone());
        for managed in &config.managed_configurations {
            let module = catalog
                .iter()
                .find(|m| m.name() == managed.module)
                .cloned()
                .ok_or_else(|| ModuleError::invalid(format!("unknown module {}", managed.module)))?;
            let configuration = add_configuration(&state, &root, module, &managed.name, None)?;
            control.adopt(&configuration)?;
        }

        let mut flow = FlowController::new(state.clone());
        for (name, unit) in units {
            let nested = own.create_execution_context(&name, None, WorkInterval::Unbounded)?;
            let index = own_context.count_execution_contexts()?;
            own_context.insert_execution_context(index, &nested)?;
            flow.register_linked(unit, nested.id());
        }

        state.write(|host| {
            host.output.take();
            Ok(())
        })?;
        tracing::debug!(
            configuration = %config.configuration,
            units = flow.count_managed_execution_contexts(),
            managed = control.count_managed_configurations(),
            "runtime built"
        );

        Ok(ModuleRuntime {
            state,
            process: Process::new(module),
            configuration: ConfigurationTool::new(own)?,
            context: ExecutionContextTool::new(own_context, input, flow, control),
        })
    }
}

/// `"Module"` first, then the configured modules, then the modules of the
/// managed configurations; first occurrence of a name wins.
fn catalog(config: &RuntimeConfig) -> Vec<ModuleDescriptor> {
    let mut catalog = vec![ModuleDescriptor::new(HOST_MODULE)];
    let managed = config
        .managed_configurations
        .iter()
        .map(|m| ModuleDescriptor::new(m.module.as_str()));
    for module in config.modules.iter().cloned().chain(managed) {
        if catalog.iter().all(|m| m.name() != module.name()) {
            catalog.push(module);
        }
    }
    catalog
}

fn add_configuration(
    state: &SharedState,
    container: &ContainerRef,
    module: ModuleDescriptor,
    name: &str,
    description: Option<String>,
) -> Result<ConfigurationRef, ModuleError> {
    let id = state.write(|host| {
        host.tree
            .add_configuration(Some(container.id()), module, name, description)
    })?;
    Ok(ConfigurationRef::new(state.clone(), id))
}

/// One hosted module with everything it can see.
#[derive(Debug)]
pub struct ModuleRuntime {
    state: SharedState,
    process: Process,
    configuration: ConfigurationTool,
    context: ExecutionContextTool,
}

impl ModuleRuntime {
    /// Shortcut for [`RuntimeBuilder::new`].
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// The host state of this runtime.
    pub fn state(&self) -> &SharedState {
        &self.state
    }

    /// The module's configuration tool.
    pub fn configuration_tool(&mut self) -> &mut ConfigurationTool {
        &mut self.configuration
    }

    /// The module's execution context tool.
    pub fn execution_context_tool(&mut self) -> &mut ExecutionContextTool {
        &mut self.context
    }

    /// Snapshot of the shared output log.
    pub fn output(&self) -> Result<Vec<Message>, ModuleError> {
        self.context.output()
    }

    /// Drain the shared output log.
    pub fn take_output(&mut self) -> Result<Vec<Message>, ModuleError> {
        self.state.write(|host| Ok(host.output.take()))
    }

    /// Run the `start` phase.
    pub async fn start(&mut self) -> Vec<Message> {
        self.process.start(&mut self.configuration).await
    }

    /// Run one `process` phase.
    pub async fn execute(&mut self) -> Result<Vec<Message>, ModuleError> {
        self.process
            .execute(&mut self.configuration, &mut self.context)
            .await
    }

    /// Run the `update` phase.
    pub async fn update(&mut self) -> Vec<Message> {
        self.process.update(&mut self.configuration).await
    }

    /// Run the `stop` phase.
    pub async fn stop(&mut self) -> Vec<Message> {
        self.process.stop(&mut self.configuration).await
    }

    /// Run every phase and return what they produced, in order.
    pub async fn full_life_cycle(&mut self) -> Result<Vec<Message>, ModuleError> {
        self.process
            .full_life_cycle(&mut self.configuration, &mut self.context)
            .await
    }
}
