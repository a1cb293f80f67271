//! Module lifecycle runtime.
//!
//! Owns the list of loaded modules, most-recently-loaded first. Lifecycle
//! notifications are fanned out in list order, and that order is load-
//! bearing: modules learn about each other through these hooks, so the
//! sequencing around insertion and removal follows the rules below to the
//! letter.

use std::any::Any;
use std::sync::Arc;

use smarthub_domain::error::ModuleError;

use crate::capabilities::{Capabilities, CapabilityIndex};
use crate::ports::loader::ModuleLoader;
use crate::ports::module::{MODULE_ABI_VERSION, Module};

struct ModuleRecord {
    name: String,
    module: Box<dyn Module>,
    // Keeps the module's code loaded; dropping it releases the code.
    _code: Box<dyn Any + Send>,
}

/// Loads, unloads, and drives extension modules.
pub struct ModuleRuntime {
    loader: Box<dyn ModuleLoader>,
    // Index 0 is the most recently loaded module.
    records: Vec<ModuleRecord>,
    index: CapabilityIndex,
}

impl ModuleRuntime {
    /// Create a runtime resolving module code through `loader` and
    /// publishing module capabilities into `index`.
    #[must_use]
    pub fn new(loader: Box<dyn ModuleLoader>, index: CapabilityIndex) -> Self {
        Self {
            loader,
            records: Vec::new(),
            index,
        }
    }

    /// Load the named module.
    ///
    /// Nothing changes on failure. On success, lifecycle notifications run
    /// *before* the new record is inserted: first the new module hears
    /// about every already-loaded module (current list order), then every
    /// already-loaded module hears about the new one (same order), then the
    /// record joins the list head and its capability becomes resolvable.
    ///
    /// # Errors
    ///
    /// [`ModuleError`] for a duplicate name, an unopenable unit, a missing
    /// entry point, an absent export block, or an ABI version mismatch. All
    /// are logged and non-fatal.
    pub fn load(&mut self, name: &str, capabilities: &Arc<Capabilities>) -> Result<(), ModuleError> {
        if self.is_loaded(name) {
            tracing::warn!(module = name, "module is already loaded");
            return Err(ModuleError::AlreadyLoaded(name.to_string()));
        }

        let handle = match self.loader.open(name) {
            Ok(handle) => handle,
            Err(err) => {
                tracing::warn!(module = name, error = %err, "could not load module");
                return Err(err.into());
            }
        };

        let Some(export) = handle.initialize(Arc::clone(capabilities)) else {
            tracing::warn!(module = name, "module returned no exports");
            return Err(ModuleError::NoExports(name.to_string()));
        };

        if export.abi_version != MODULE_ABI_VERSION {
            tracing::warn!(
                module = name,
                declared = export.abi_version,
                supported = MODULE_ABI_VERSION,
                "module ABI version not supported"
            );
            return Err(ModuleError::AbiMismatch {
                name: name.to_string(),
                expected: MODULE_ABI_VERSION,
                found: export.abi_version,
            });
        }

        let mut record = ModuleRecord {
            name: name.to_string(),
            module: export.module,
            _code: handle.into_guard(),
        };

        // Tell the new module about every module loaded before it.
        let existing: Vec<String> = self.records.iter().map(|rec| rec.name.clone()).collect();
        for other in &existing {
            record.module.on_module_loaded(other);
        }

        // Tell every loaded module about the new one.
        for rec in &mut self.records {
            rec.module.on_module_loaded(&record.name);
        }

        if let Some(capability) = export.capability {
            self.index.insert(&record.name, capability);
        }
        self.records.insert(0, record);

        tracing::info!(module = name, "loaded module");
        Ok(())
    }

    /// Unload the named module.
    ///
    /// The record leaves the list (and the capability index) *before* any
    /// notification, so the unloading module is invisible during its own
    /// teardown. Every remaining module is then notified, the removed
    /// module's shutdown hook runs, and finally its code is released.
    ///
    /// # Errors
    ///
    /// [`ModuleError::NotLoaded`] when no module with this name is loaded.
    pub fn unload(&mut self, name: &str) -> Result<(), ModuleError> {
        let Some(pos) = self.records.iter().position(|rec| rec.name == name) else {
            tracing::warn!(module = name, "module is not loaded");
            return Err(ModuleError::NotLoaded(name.to_string()));
        };

        let mut record = self.records.remove(pos);
        self.index.remove(&record.name);

        for rec in &mut self.records {
            rec.module.on_module_unloaded(&record.name);
        }

        record.module.shutdown();

        tracing::info!(module = name, "unloaded module");
        Ok(())
    }

    /// Unload every module, most recently loaded first.
    pub fn shutdown(&mut self) {
        while let Some(record) = self.records.first() {
            let name = record.name.clone();
            // Cannot fail: the name was just taken from the list.
            let _ = self.unload(&name);
        }
    }

    /// Run every loaded module's process hook once, list order.
    pub fn process(&mut self) {
        for rec in &mut self.records {
            rec.module.process();
        }
    }

    /// Whether a module with this name is loaded.
    #[must_use]
    pub fn is_loaded(&self, name: &str) -> bool {
        self.records.iter().any(|rec| rec.name == name)
    }

    /// Number of loaded modules.
    #[must_use]
    pub fn count(&self) -> usize {
        self.records.len()
    }

    /// Names of the loaded modules, most recently loaded first.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.records.iter().map(|rec| rec.name.as_str())
    }

    /// Resolve the named module's capability object.
    #[must_use]
    pub fn capability(&self, name: &str) -> Option<Arc<dyn Any + Send + Sync>> {
        self.index.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    use crate::bus::MessageBus;
    use crate::directives::DirectiveRegistry;
    use crate::gateway::ApiGateway;
    use crate::ports::broker::BrokerClient;
    use crate::ports::module::ModuleExport;
    use crate::static_loader::StaticModuleLoader;

    struct NullBroker;

    impl BrokerClient for NullBroker {
        fn connect(&self) -> Result<(), smarthub_domain::error::BrokerError> {
            Ok(())
        }
        fn disconnect(&self) {}
        fn subscribe(&self, _topic: &str) -> Result<(), smarthub_domain::error::BrokerError> {
            Ok(())
        }
        fn unsubscribe(&self, _topic: &str) -> Result<(), smarthub_domain::error::BrokerError> {
            Ok(())
        }
        fn publish(
            &self,
            _topic: &str,
            _payload: &[u8],
        ) -> Result<(), smarthub_domain::error::BrokerError> {
            Ok(())
        }
    }

    fn capabilities(index: &CapabilityIndex) -> Arc<Capabilities> {
        Arc::new(Capabilities::new(
            Arc::new(DirectiveRegistry::new()),
            Arc::new(MessageBus::new(Arc::new(NullBroker))),
            Arc::new(ApiGateway::new()),
            index.clone(),
            "./config",
        ))
    }

    type EventLog = Arc<Mutex<Vec<String>>>;

    struct RecordingModule {
        name: String,
        events: EventLog,
        capabilities: Arc<Capabilities>,
    }

    impl Module for RecordingModule {
        fn process(&mut self) {
            self.events.lock().push(format!("{}:process", self.name));
        }

        fn shutdown(&mut self) {
            self.events.lock().push(format!("{}:shutdown", self.name));
        }

        fn on_module_loaded(&mut self, name: &str) {
            self.events.lock().push(format!("{}:loaded:{}", self.name, name));
        }

        fn on_module_unloaded(&mut self, name: &str) {
            let resolvable = self.capabilities.module_capability(name).is_some();
            self.events
                .lock()
                .push(format!("{}:unloaded:{}:{}", self.name, name, resolvable));
        }
    }

    fn register_recording(loader: &StaticModuleLoader, name: &str, events: &EventLog) {
        let module_name = name.to_string();
        let events = Arc::clone(events);
        loader.register(name, move |caps| {
            Some(
                ModuleExport::new(Box::new(RecordingModule {
                    name: module_name.clone(),
                    events: Arc::clone(&events),
                    capabilities: caps,
                }))
                .with_capability(Arc::new(module_name.clone())),
            )
        });
    }

    fn runtime_with(names: &[&str]) -> (ModuleRuntime, Arc<Capabilities>, EventLog) {
        let events: EventLog = Arc::default();
        let loader = StaticModuleLoader::new();
        for name in names {
            register_recording(&loader, name, &events);
        }
        let index = CapabilityIndex::new();
        let caps = capabilities(&index);
        (ModuleRuntime::new(Box::new(loader), index), caps, events)
    }

    #[test]
    fn should_refuse_duplicate_load_and_keep_list_unchanged() {
        let (mut runtime, caps, _) = runtime_with(&["lights"]);
        runtime.load("lights", &caps).unwrap();

        let result = runtime.load("lights", &caps);

        assert!(matches!(result, Err(ModuleError::AlreadyLoaded(_))));
        assert_eq!(runtime.count(), 1);
    }

    #[test]
    fn should_fail_load_of_unknown_module() {
        let (mut runtime, caps, _) = runtime_with(&[]);
        let result = runtime.load("ghost", &caps);
        assert!(matches!(result, Err(ModuleError::Loader(_))));
        assert!(!runtime.is_loaded("ghost"));
    }

    #[test]
    fn should_refuse_module_without_exports() {
        let (_, caps, _) = runtime_with(&[]);
        let loader = StaticModuleLoader::new();
        loader.register("empty", |_| None);
        let mut runtime = ModuleRuntime::new(Box::new(loader), CapabilityIndex::new());

        let result = runtime.load("empty", &caps);

        assert!(matches!(result, Err(ModuleError::NoExports(_))));
        assert_eq!(runtime.count(), 0);
    }

    #[test]
    fn should_refuse_mismatched_abi_version() {
        let (_, caps, _) = runtime_with(&[]);
        let loader = StaticModuleLoader::new();
        loader.register("future", |_| {
            struct Noop;
            impl Module for Noop {}
            let mut export = ModuleExport::new(Box::new(Noop));
            export.abi_version = MODULE_ABI_VERSION + 1;
            Some(export)
        });
        let mut runtime = ModuleRuntime::new(Box::new(loader), CapabilityIndex::new());

        let result = runtime.load("future", &caps);

        assert!(matches!(result, Err(ModuleError::AbiMismatch { .. })));
        assert!(!runtime.is_loaded("future"));
    }

    #[test]
    fn should_notify_new_module_before_existing_ones() {
        let (mut runtime, caps, events) = runtime_with(&["a", "b"]);
        runtime.load("a", &caps).unwrap();
        runtime.load("b", &caps).unwrap();

        // B hears about A before A hears about B.
        assert_eq!(
            events.lock().as_slice(),
            ["b:loaded:a".to_string(), "a:loaded:b".to_string()]
        );
    }

    #[test]
    fn should_keep_most_recently_loaded_module_first() {
        let (mut runtime, caps, _) = runtime_with(&["a", "b", "c"]);
        for name in ["a", "b", "c"] {
            runtime.load(name, &caps).unwrap();
        }

        let names: Vec<_> = runtime.names().collect();
        assert_eq!(names, ["c", "b", "a"]);
    }

    #[test]
    fn should_process_modules_in_list_order() {
        let (mut runtime, caps, events) = runtime_with(&["a", "b"]);
        runtime.load("a", &caps).unwrap();
        runtime.load("b", &caps).unwrap();
        events.lock().clear();

        runtime.process();

        assert_eq!(
            events.lock().as_slice(),
            ["b:process".to_string(), "a:process".to_string()]
        );
    }

    #[test]
    fn should_hide_module_from_itself_during_unload() {
        let (mut runtime, caps, events) = runtime_with(&["a", "b"]);
        runtime.load("a", &caps).unwrap();
        runtime.load("b", &caps).unwrap();
        events.lock().clear();

        runtime.unload("a").unwrap();

        // The capability of "a" was already unresolvable when "b" was
        // notified, and the notification precedes a's shutdown hook.
        assert_eq!(
            events.lock().as_slice(),
            ["b:unloaded:a:false".to_string(), "a:shutdown".to_string()]
        );
        assert!(!runtime.is_loaded("a"));
        assert!(runtime.capability("a").is_none());
    }

    #[test]
    fn should_not_notify_unloaded_module_about_later_changes() {
        let (mut runtime, caps, events) = runtime_with(&["a", "b", "c"]);
        runtime.load("a", &caps).unwrap();
        runtime.load("b", &caps).unwrap();
        runtime.unload("b").unwrap();
        events.lock().clear();

        runtime.load("c", &caps).unwrap();

        let log = events.lock();
        assert!(log.iter().all(|entry| !entry.starts_with("b:")));
    }

    #[test]
    fn should_report_unload_of_unknown_module() {
        let (mut runtime, _, _) = runtime_with(&[]);
        assert!(matches!(
            runtime.unload("ghost"),
            Err(ModuleError::NotLoaded(_))
        ));
    }

    #[test]
    fn should_shutdown_most_recent_first() {
        let (mut runtime, caps, events) = runtime_with(&["a", "b", "c"]);
        for name in ["a", "b", "c"] {
            runtime.load(name, &caps).unwrap();
        }
        events.lock().clear();

        runtime.shutdown();

        let shutdowns: Vec<_> = events
            .lock()
            .iter()
            .filter(|entry| entry.ends_with(":shutdown"))
            .cloned()
            .collect();
        assert_eq!(shutdowns, ["c:shutdown", "b:shutdown", "a:shutdown"]);
        assert_eq!(runtime.count(), 0);
    }

    #[test]
    fn should_resolve_capability_of_loaded_module() {
        let (mut runtime, caps, _) = runtime_with(&["lights"]);
        runtime.load("lights", &caps).unwrap();

        let capability = caps.module_capability("lights").unwrap();
        assert_eq!(
            capability.downcast_ref::<String>().map(String::as_str),
            Some("lights")
        );
        assert!(caps.module_capability("alarm").is_none());
    }
}
