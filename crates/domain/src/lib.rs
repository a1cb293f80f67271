//! # smarthub-domain
//!
//! Pure domain model for the smarthub home automation hub.
//!
//! ## Responsibilities
//! - Foundational types shared by the hub core and its extension modules:
//!   subscription context identity, topic templates, API request/response
//!   shapes, and the error contract for the core subsystems
//! - Small string utilities used on both sides of the module boundary
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod api;
pub mod context;
pub mod error;
pub mod topic;
pub mod util;
