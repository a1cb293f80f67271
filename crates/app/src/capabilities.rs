//! The capability table handed to every module at load time.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::bus::MessageBus;
use crate::directives::DirectiveRegistry;
use crate::gateway::ApiGateway;

type CapabilityMap = HashMap<String, Arc<dyn Any + Send + Sync>>;

/// Name-resolved registry of module capability objects.
///
/// Shared between the module runtime (which publishes and retracts entries
/// as modules load and unload) and the capability table (which resolves
/// them on behalf of sibling modules). A resolved capability is a weak
/// reference in spirit: it stays usable only while the owning module is
/// loaded, and callers must re-resolve after an unload notification for
/// that name rather than cache the pointer.
#[derive(Clone, Default)]
pub struct CapabilityIndex {
    inner: Arc<RwLock<CapabilityMap>>,
}

impl CapabilityIndex {
    /// Create an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve the named module's capability object, if that module is
    /// loaded and declared one.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<dyn Any + Send + Sync>> {
        self.inner.read().get(name).map(Arc::clone)
    }

    pub(crate) fn insert(&self, name: &str, capability: Arc<dyn Any + Send + Sync>) {
        self.inner.write().insert(name.to_string(), capability);
    }

    pub(crate) fn remove(&self, name: &str) {
        self.inner.write().remove(name);
    }
}

/// The host-provided operation bundle passed to every module.
///
/// Built once at startup and frozen before any module loads: its content is
/// identical regardless of load order and never mutates afterwards. Lives
/// as long as the process.
pub struct Capabilities {
    directives: Arc<DirectiveRegistry>,
    bus: Arc<MessageBus>,
    gateway: Arc<ApiGateway>,
    modules: CapabilityIndex,
    config_dir: PathBuf,
}

impl Capabilities {
    /// Assemble the table. Called once by the composition root, before the
    /// first module load.
    #[must_use]
    pub fn new(
        directives: Arc<DirectiveRegistry>,
        bus: Arc<MessageBus>,
        gateway: Arc<ApiGateway>,
        modules: CapabilityIndex,
        config_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            directives,
            bus,
            gateway,
            modules,
            config_dir: config_dir.into(),
        }
    }

    /// Config directive registration and file parsing.
    #[must_use]
    pub fn directives(&self) -> &DirectiveRegistry {
        &self.directives
    }

    /// Topic-addressed publish/subscribe.
    #[must_use]
    pub fn bus(&self) -> &MessageBus {
        &self.bus
    }

    /// Synchronous request/response interface registration.
    #[must_use]
    pub fn gateway(&self) -> &ApiGateway {
        &self.gateway
    }

    /// Directory modules read their own config files from.
    #[must_use]
    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Resolve a sibling module's capability object by module name.
    ///
    /// Absent when that module is not loaded. Re-resolve rather than cache:
    /// the object is only meaningful while its owner stays loaded.
    #[must_use]
    pub fn module_capability(&self, name: &str) -> Option<Arc<dyn Any + Send + Sync>> {
        self.modules.get(name)
    }

    /// Write a line to the hub log on behalf of a module.
    pub fn log(&self, message: impl fmt::Display) {
        tracing::info!(target: "smarthub::module", "{message}");
    }

    /// Write an error line to the hub log on behalf of a module.
    pub fn log_error(&self, message: impl fmt::Display) {
        tracing::error!(target: "smarthub::module", "{message}");
    }
}
