//! Port definitions — traits that adapters and modules implement.
//!
//! Ports are the boundaries between the hub core and the outside world.
//! They are defined here (in `app`) so that both the core subsystems and
//! the adapter layer can depend on them without creating circular
//! dependencies.

pub mod broker;
pub mod loader;
pub mod module;

pub use broker::{BrokerClient, BrokerEvent};
pub use loader::{ModuleHandle, ModuleLoader};
pub use module::{MODULE_ABI_VERSION, Module, ModuleExport};
