//! Loader port — resolves a module name to its initialization entry point.
//!
//! How module code gets into the process (a dynamic library, a registry of
//! linked-in constructors, …) is an adapter concern. The runtime only sees
//! a handle: an entry point to call plus an opaque guard that keeps the
//! code alive until the module is unloaded.

use std::any::Any;
use std::sync::Arc;

use smarthub_domain::error::LoaderError;

use crate::capabilities::Capabilities;
use crate::ports::module::ModuleExport;

/// A module's initialization entry point. Receives the capability table and
/// returns an export block, or `None` to refuse the load.
pub type ModuleInit = Box<dyn Fn(Arc<Capabilities>) -> Option<ModuleExport> + Send + Sync>;

/// Opened module code, ready to initialize.
pub struct ModuleHandle {
    init: ModuleInit,
    guard: Box<dyn Any + Send>,
}

impl ModuleHandle {
    /// Bundle an entry point with the guard that keeps its code loaded.
    #[must_use]
    pub fn new(init: ModuleInit, guard: Box<dyn Any + Send>) -> Self {
        Self { init, guard }
    }

    /// Call the initialization entry point.
    #[must_use]
    pub fn initialize(&self, capabilities: Arc<Capabilities>) -> Option<ModuleExport> {
        (self.init)(capabilities)
    }

    /// Give up the entry point and keep only the guard. Dropping the guard
    /// releases the loaded code.
    #[must_use]
    pub fn into_guard(self) -> Box<dyn Any + Send> {
        self.guard
    }
}

/// Resolves module names to openable code.
pub trait ModuleLoader: Send + Sync {
    /// Open the named unit and locate its initialization entry point.
    ///
    /// # Errors
    ///
    /// [`LoaderError::NotFound`] when no unit with this name exists;
    /// [`LoaderError::MissingEntryPoint`] when the unit exposes no
    /// initialization entry point.
    fn open(&self, name: &str) -> Result<ModuleHandle, LoaderError>;
}
