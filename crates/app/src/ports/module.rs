//! The module contract — what every extension unit exports to the hub.

use std::any::Any;
use std::sync::Arc;

/// ABI version compiled into this runtime. A module whose export block
/// declares a different version is refused at load time.
pub const MODULE_ABI_VERSION: u32 = 1;

/// An extension unit loaded into the hub.
///
/// All hooks have no-op defaults; a module overrides the ones it cares
/// about. Hooks run on the driver loop, so they must return promptly.
pub trait Module: Send {
    /// Called once per driver tick while the module is loaded.
    fn process(&mut self) {}

    /// Called when the module is being unloaded, after the remaining
    /// modules have been notified. Release interfaces and subscriptions
    /// here.
    fn shutdown(&mut self) {}

    /// Called once per sibling module: for every module already loaded
    /// when this one loads, and again whenever a new module loads later.
    fn on_module_loaded(&mut self, name: &str) {
        let _ = name;
    }

    /// Called when a sibling module is unloaded. Any capability pointer
    /// resolved from that module must be re-resolved, not reused.
    fn on_module_unloaded(&mut self, name: &str) {
        let _ = name;
    }
}

/// Export block returned by a module's initialization entry point.
pub struct ModuleExport {
    /// ABI version the module was built against; must equal
    /// [`MODULE_ABI_VERSION`].
    pub abi_version: u32,
    /// The module instance itself.
    pub module: Box<dyn Module>,
    /// Optional capability object other modules can resolve by this
    /// module's name. Snapshotted at load time.
    pub capability: Option<Arc<dyn Any + Send + Sync>>,
}

impl ModuleExport {
    /// Export block for `module` with the runtime's own ABI version and no
    /// capability.
    #[must_use]
    pub fn new(module: Box<dyn Module>) -> Self {
        Self {
            abi_version: MODULE_ABI_VERSION,
            module,
            capability: None,
        }
    }

    /// Attach a capability object other modules can look up by name.
    #[must_use]
    pub fn with_capability(mut self, capability: Arc<dyn Any + Send + Sync>) -> Self {
        self.capability = Some(capability);
        self
    }
}
