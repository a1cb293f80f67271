//! Synchronous request dispatch keyed by interface name.
//!
//! Modules register named interfaces; the first path segment of a request
//! selects the interface and the handler receives the full path verbatim.
//! The gateway produces exactly two outcomes, success and client error —
//! everything else is the transport adapter's business.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use smarthub_domain::api::{ApiResponse, HandlerRejected};
use smarthub_domain::util::segments;

/// Handler backing a registered interface.
///
/// Receives the full request path (leading separator included) and returns
/// an owned JSON body, `None` for a bodiless acknowledgment, or
/// [`HandlerRejected`] to refuse the request.
pub type InterfaceHandler =
    Arc<dyn Fn(&str) -> Result<Option<String>, HandlerRejected> + Send + Sync>;

/// Flat namespace of named interfaces.
#[derive(Default)]
pub struct ApiGateway {
    interfaces: RwLock<HashMap<String, InterfaceHandler>>,
}

impl ApiGateway {
    /// Create a gateway with no interfaces.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` under `name`. The latest registration for a name
    /// wins.
    pub fn register_interface(&self, name: impl Into<String>, handler: InterfaceHandler) {
        self.interfaces.write().insert(name.into(), handler);
    }

    /// Remove the interface registered under `name`, if any.
    pub fn unregister_interface(&self, name: &str) {
        self.interfaces.write().remove(name);
    }

    /// Whether an interface is registered under `name`.
    #[must_use]
    pub fn has_interface(&self, name: &str) -> bool {
        self.interfaces.read().contains_key(name)
    }

    /// The interface name addressed by a request path: the first segment
    /// after stripping a leading separator.
    #[must_use]
    pub fn interface_name(path: &str) -> &str {
        segments(path, '/').next().unwrap_or("")
    }

    /// Dispatch a request path to the matching interface.
    pub fn handle(&self, path: &str) -> ApiResponse {
        let name = Self::interface_name(path);
        let handler = self.interfaces.read().get(name).map(Arc::clone);

        let Some(handler) = handler else {
            return ApiResponse::client_error();
        };

        match handler(path) {
            Ok(Some(body)) => ApiResponse::ok(body),
            Ok(None) => ApiResponse::ok_empty(),
            Err(HandlerRejected) => ApiResponse::client_error(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smarthub_domain::api::ApiStatus;

    fn fixed(body: &str) -> InterfaceHandler {
        let body = body.to_string();
        Arc::new(move |_| Ok(Some(body.clone())))
    }

    #[test]
    fn should_return_handler_body_on_success() {
        let gateway = ApiGateway::new();
        gateway.register_interface("lights", fixed("{\"a\":1}"));

        let resp = gateway.handle("/lights/status");
        assert_eq!(resp.status, ApiStatus::Ok);
        assert_eq!(resp.body, "{\"a\":1}");
    }

    #[test]
    fn should_return_client_error_for_unknown_interface() {
        let gateway = ApiGateway::new();
        let resp = gateway.handle("/missing/status");
        assert_eq!(resp.status, ApiStatus::ClientError);
        assert!(resp.body.is_empty());
    }

    #[test]
    fn should_return_envelope_when_handler_produces_no_content() {
        let gateway = ApiGateway::new();
        gateway.register_interface("alarm", Arc::new(|_| Ok(None)));

        let resp = gateway.handle("/alarm/snooze");
        assert_eq!(resp.status, ApiStatus::Ok);
        assert_eq!(resp.body, "{\"result\":true}");
    }

    #[test]
    fn should_return_empty_client_error_when_handler_rejects() {
        let gateway = ApiGateway::new();
        gateway.register_interface("alarm", Arc::new(|_| Err(HandlerRejected)));

        let resp = gateway.handle("/alarm/bogus");
        assert_eq!(resp.status, ApiStatus::ClientError);
        assert!(resp.body.is_empty());
    }

    #[test]
    fn should_pass_full_path_to_handler() {
        let gateway = ApiGateway::new();
        gateway.register_interface(
            "lights",
            Arc::new(|path| Ok(Some(format!("{{\"path\":\"{path}\"}}")))),
        );

        let resp = gateway.handle("/lights/kitchen/toggle");
        assert_eq!(resp.body, "{\"path\":\"/lights/kitchen/toggle\"}");
    }

    #[test]
    fn should_match_interface_without_leading_separator() {
        let gateway = ApiGateway::new();
        gateway.register_interface("lights", fixed("{}"));
        assert_eq!(gateway.handle("lights/status").status, ApiStatus::Ok);
    }

    #[test]
    fn should_let_latest_registration_win() {
        let gateway = ApiGateway::new();
        gateway.register_interface("lights", fixed("{\"v\":1}"));
        gateway.register_interface("lights", fixed("{\"v\":2}"));

        assert_eq!(gateway.handle("/lights").body, "{\"v\":2}");
    }

    #[test]
    fn should_stop_matching_after_unregister() {
        let gateway = ApiGateway::new();
        gateway.register_interface("lights", fixed("{}"));
        gateway.unregister_interface("lights");

        assert_eq!(gateway.handle("/lights").status, ApiStatus::ClientError);
    }

    #[test]
    fn should_reject_bare_root_path() {
        let gateway = ApiGateway::new();
        gateway.register_interface("lights", fixed("{}"));
        assert_eq!(gateway.handle("/").status, ApiStatus::ClientError);
    }

    #[test]
    fn should_extract_interface_name_from_path() {
        assert_eq!(ApiGateway::interface_name("/lights/status"), "lights");
        assert_eq!(ApiGateway::interface_name("alarm"), "alarm");
        assert_eq!(ApiGateway::interface_name("/"), "");
    }
}
