//! # smarthub-app
//!
//! The hub core — three cooperating subsystems behind one module contract:
//!
//! - [`runtime`] — loads and unloads extension modules, enforces ABI
//!   compatibility, fans out lifecycle notifications in a deterministic
//!   order, and resolves cross-module capabilities by name
//! - [`bus`] — topic-addressed publish/subscribe, keeping a desired
//!   subscription set independent of the broker connection and reconciling
//!   it whenever the connection comes up
//! - [`gateway`] — synchronous HTTP-style request dispatch keyed by a flat
//!   namespace of interface names
//!
//! They share the [`capabilities::Capabilities`] table handed to every
//! module at load time, and the load/unload lifecycle decides what is
//! reachable through the bus and the gateway.
//!
//! ## Dependency rule
//! Depends on `smarthub-domain` only. Outbound IO (broker wire protocol,
//! dynamic code loading) is expressed as port traits in [`ports`]; adapters
//! implement them and never the reverse.

pub mod bus;
pub mod capabilities;
pub mod directives;
pub mod gateway;
pub mod ports;
pub mod runtime;
pub mod static_loader;
