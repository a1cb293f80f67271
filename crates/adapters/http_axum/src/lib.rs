//! # smarthub-adapter-http-axum
//!
//! HTTP adapter built on [axum](https://docs.rs/axum).
//!
//! ## Responsibilities
//! - Accept HTTP requests and hand their paths to the hub's API gateway
//!   (driving adapter); the first path segment selects the module-registered
//!   interface
//! - Map gateway responses onto HTTP: success → `200 OK` with a JSON body,
//!   client error → `400 Bad Request` with an empty body — the gateway never
//!   produces anything else
//! - Optionally serve static files for paths that match no interface
//!
//! ## Dependency rule
//! Depends on `smarthub-app` and `smarthub-domain`. Never leaks axum types
//! into the core; the gateway knows nothing about HTTP framing.

pub mod router;
pub mod state;
