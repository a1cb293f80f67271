//! In-process module loader backed by a registry of constructors.
//!
//! The production deployment links its extension modules into the binary
//! and registers a constructor per module name here; the runtime then
//! loads and unloads them exactly as it would externally built units. The
//! guard returned for registry-backed modules is inert — there is no
//! library handle to release.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use smarthub_domain::error::LoaderError;

use crate::capabilities::Capabilities;
use crate::ports::loader::{ModuleHandle, ModuleLoader};
use crate::ports::module::ModuleExport;

type Constructor = Arc<dyn Fn(Arc<Capabilities>) -> Option<ModuleExport> + Send + Sync>;

/// Loader resolving module names against registered constructors.
#[derive(Default)]
pub struct StaticModuleLoader {
    constructors: RwLock<HashMap<String, Constructor>>,
}

impl StaticModuleLoader {
    /// Create a loader with no registered modules.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `constructor` as the initialization entry point for
    /// `name`. Registering a name again replaces the constructor.
    pub fn register(
        &self,
        name: impl Into<String>,
        constructor: impl Fn(Arc<Capabilities>) -> Option<ModuleExport> + Send + Sync + 'static,
    ) {
        self.constructors
            .write()
            .insert(name.into(), Arc::new(constructor));
    }
}

impl ModuleLoader for StaticModuleLoader {
    fn open(&self, name: &str) -> Result<ModuleHandle, LoaderError> {
        let constructor = self
            .constructors
            .read()
            .get(name)
            .map(Arc::clone)
            .ok_or_else(|| LoaderError::NotFound(name.to_string()))?;

        Ok(ModuleHandle::new(
            Box::new(move |caps| constructor(caps)),
            Box::new(()),
        ))
    }
}
