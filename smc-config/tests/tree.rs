use smc_api::{MessageType, ModuleDescriptor, ModuleError, SourceFilter, Value, WorkInterval};
use smc_config::{
    ConfigurationRef, ContainerRef, ExecutionContextRef, SharedState, SourceGetType, SourceType,
};

fn setup() -> (SharedState, ConfigurationRef, ExecutionContextRef) {
    let state = SharedState::new("root");
    let root = ContainerRef::root(&state).unwrap();
    let id = state
        .write(|host| {
            host.tree
                .add_configuration(Some(root.id()), ModuleDescriptor::new("Module"), "cfg", None)
        })
        .unwrap();
    let cfg = ConfigurationRef::new(state.clone(), id);
    let ec = cfg
        .create_execution_context("ec", None, WorkInterval::Unbounded)
        .unwrap();
    drain(&state);
    (state, cfg, ec)
}

fn drain(state: &SharedState) -> Vec<(MessageType, String)> {
    state
        .write(|host| Ok(host.output.take()))
        .unwrap()
        .into_iter()
        .map(|m| (m.message_type(), m.value().to_string()))
        .collect()
}

// --- Sources ---

#[test]
fn source_lifecycle_emits_one_message_each() {
    let (state, _, ec) = setup();
    let sources = ec.sources();
    for v in [10, 20, 30] {
        sources.create_source_value(v).unwrap();
    }
    assert_eq!(
        drain(&state),
        [
            (MessageType::ConfigurationControlSourceContextCreate, "cfg.ec.0".to_owned()),
            (MessageType::ConfigurationControlSourceContextCreate, "cfg.ec.1".to_owned()),
            (MessageType::ConfigurationControlSourceContextCreate, "cfg.ec.2".to_owned()),
        ]
    );

    let removed = sources.remove_source(1).unwrap();
    assert_eq!(removed.order(), 1);
    assert_eq!(
        drain(&state),
        [(MessageType::ConfigurationControlSourceContextRemove, "cfg.ec.1".to_owned())]
    );

    // the survivors keep their orders
    let orders: Vec<_> = sources.sources().unwrap().iter().map(|s| s.order()).collect();
    assert_eq!(orders, [0, 2]);

    sources.update_source_value(1, 99).unwrap();
    assert_eq!(
        drain(&state),
        [(MessageType::ConfigurationControlSourceContextUpdate, "cfg.ec.2".to_owned())]
    );
}

#[test]
fn out_of_range_removal_changes_nothing() {
    let (state, _, ec) = setup();
    let sources = ec.sources();
    sources.create_source_value(1).unwrap();
    drain(&state);

    let err = sources.remove_source(1).unwrap_err();
    assert!(matches!(err, ModuleError::InvalidArgument(_)));
    assert_eq!(sources.count_sources().unwrap(), 1);
    assert!(drain(&state).is_empty());
}

#[test]
fn multipart_lists_emit_with_owner_prefix() {
    let (state, _, ec) = setup();
    let sources = ec.sources();
    sources.create_source_value(1).unwrap();
    let multipart = sources.create_source().unwrap();
    assert_eq!(multipart.source_type(), SourceType::Multipart);
    drain(&state);

    let nested = sources.source_list(1).unwrap();
    nested.create_source_caller().unwrap();
    nested.create_source_caller_relative_name("0").unwrap();
    assert_eq!(nested.count_sources().unwrap(), 2);
    assert_eq!(
        drain(&state),
        [
            (MessageType::ConfigurationControlSourceContextCreate, "cfg.ec.0".to_owned()),
            (MessageType::ConfigurationControlSourceContextCreate, "cfg.ec.1".to_owned()),
        ]
    );
    assert!(sources.source_list(0).unwrap_err().is_invalid_argument());
}

#[test]
fn references_must_exist() {
    let (state, cfg, ec) = setup();
    let other = cfg
        .create_execution_context("other", None, WorkInterval::Unbounded)
        .unwrap();
    cfg.remove_execution_context(1).unwrap();
    drain(&state);

    let err = ec
        .sources()
        .create_source_execution_context(&other, SourceGetType::New, 0, false)
        .unwrap_err();
    assert!(err.is_invalid_argument());
    assert!(drain(&state).is_empty());

    ec.sources()
        .create_source_configuration(&cfg, SourceGetType::Last, 1, true)
        .unwrap();
    assert_eq!(drain(&state).len(), 1);
}

#[test]
fn filter_changes_update_the_source() {
    let (state, _, ec) = setup();
    let sources = ec.sources();
    sources.create_source_value(5).unwrap();
    drain(&state);

    sources.create_filter(0, SourceFilter::number(0.0, 10.0, None)).unwrap();
    sources
        .update_filter(0, 0, SourceFilter::number(6.0, 10.0, None))
        .unwrap();
    assert!(sources.remove_filter(0, 1).is_err());
    assert_eq!(
        drain(&state),
        [
            (MessageType::ConfigurationControlSourceContextUpdate, "cfg.ec.0".to_owned()),
            (MessageType::ConfigurationControlSourceContextUpdate, "cfg.ec.0".to_owned()),
        ]
    );

    let resolved = sources.resolve(&()).unwrap();
    assert!(resolved[0].is_empty());
    sources.remove_filter(0, 0).unwrap();
    assert_eq!(sources.resolve(&()).unwrap()[0][0].value(), &Value::Long(5));
}

// --- Configuration ---

#[test]
fn settings_and_variables_keep_their_kind() {
    let (state, cfg, _) = setup();
    cfg.set_variable("k", 1).unwrap();
    let err = cfg.set_variable("k", "one").unwrap_err();
    assert!(err.is_invalid_argument());
    assert_eq!(cfg.variable("k").unwrap(), Some(Value::Long(1)));
    cfg.set_variable("k", 2).unwrap();

    cfg.set_setting("s", true).unwrap();
    assert!(cfg.set_setting("", true).is_err());

    assert!(cfg.remove_variable("k").unwrap());
    assert_eq!(
        drain(&state),
        [
            (MessageType::ConfigurationControlConfigurationVariableUpdate, "cfg k".to_owned()),
            (MessageType::ConfigurationControlConfigurationVariableUpdate, "cfg k".to_owned()),
            (MessageType::ConfigurationControlConfigurationSettingUpdate, "cfg s".to_owned()),
            (MessageType::ConfigurationControlConfigurationVariableRemove, "cfg k".to_owned()),
        ]
    );
}

#[test]
fn configuration_updates_report_the_name() {
    let (state, cfg, ec) = setup();
    cfg.set_name("renamed").unwrap();
    cfg.set_buffer_size(8).unwrap();
    cfg.set_thread_buffer_size(2).unwrap();
    cfg.set_enabled(false).unwrap();
    let log = drain(&state);
    assert_eq!(log.len(), 4);
    assert!(log.iter().all(|(kind, payload)| {
        *kind == MessageType::ConfigurationControlConfigurationUpdate && payload == "renamed"
    }));
    assert_eq!(cfg.buffer_size().unwrap(), 8);
    assert!(!cfg.is_enabled().unwrap());
    assert!(!cfg.is_active());

    // later payloads follow the new name
    ec.sources().create_source_caller().unwrap();
    assert_eq!(drain(&state)[0].1, "renamed.ec.0");
}

#[test]
fn execution_context_crud() {
    let (state, cfg, _) = setup();
    let second = cfg
        .create_execution_context("second", Some("worker"), WorkInterval::Millis(100))
        .unwrap();
    assert_eq!(second.kind().unwrap(), "worker");
    cfg.update_execution_context(1, "second2", None, WorkInterval::Unbounded)
        .unwrap();
    assert_eq!(second.name().unwrap(), "second2");
    assert_eq!(second.kind().unwrap(), "default");
    assert!(cfg
        .update_execution_context(5, "x", None, WorkInterval::Unbounded)
        .is_err());
    cfg.remove_execution_context(1).unwrap();
    assert_eq!(cfg.count_execution_contexts().unwrap(), 1);
    assert!(second.name().unwrap_err().is_invalid_argument());
    assert_eq!(
        drain(&state),
        [
            (MessageType::ConfigurationControlExecutionContextCreate, "cfg.second".to_owned()),
            (MessageType::ConfigurationControlExecutionContextUpdate, "cfg.second2".to_owned()),
            (MessageType::ConfigurationControlExecutionContextRemove, "cfg.second2".to_owned()),
        ]
    );
}

#[test]
fn execution_context_links_emit_updates() {
    let (state, cfg, ec) = setup();
    let child = cfg
        .create_execution_context("child", None, WorkInterval::Unbounded)
        .unwrap();
    drain(&state);

    ec.insert_execution_context(0, &child).unwrap();
    assert!(ec.insert_execution_context(5, &child).is_err());
    ec.insert_managed_configuration(0, &cfg).unwrap();
    ec.set_max_work_interval(WorkInterval::Millis(5)).unwrap();
    ec.set_enabled(false).unwrap();
    assert_eq!(ec.execution_context(0).unwrap().name().unwrap(), "child");
    assert_eq!(ec.managed_configuration(0).unwrap().name().unwrap(), "cfg");
    ec.remove_execution_context(0).unwrap();
    ec.remove_managed_configuration(0).unwrap();

    let log = drain(&state);
    assert_eq!(log.len(), 6);
    assert!(log
        .iter()
        .all(|(kind, payload)| *kind == MessageType::ConfigurationControlExecutionContextUpdate
            && payload == "cfg.ec"));
}

// --- Containers ---

#[test]
fn container_removal_with_children_is_refused() {
    let (state, cfg, _) = setup();
    let root = ContainerRef::root(&state).unwrap();
    let child = root.create_container("child").unwrap();
    cfg.set_container(Some(&child)).unwrap();
    assert_eq!(root.count_configurations().unwrap(), 0);
    assert_eq!(child.configuration(0).unwrap().name().unwrap(), "cfg");
    drain(&state);

    let err = root.remove_container(0).unwrap_err();
    assert!(matches!(err, ModuleError::Conflict(_)));
    assert!(err.is_invalid_argument());
    assert!(drain(&state).is_empty());

    cfg.set_container(Some(&root)).unwrap();
    root.remove_container(0).unwrap();
    assert_eq!(
        drain(&state),
        [(MessageType::ConfigurationControlContainerRemove, "child".to_owned())]
    );
    assert!(root.container(0).unwrap_err().is_invalid_argument());
}
