//! Console input — runtime commands typed on stdin.
//!
//! A background task reads stdin line by line; the driver loop drains the
//! channel once per tick, so commands run between module process hooks,
//! never concurrently with them. `load_module`, `unload_module` and `quit`
//! are handled by the driver itself because they need the module runtime;
//! everything else goes through the directive registry, reaching handlers
//! modules registered for their own directives.

use std::sync::Arc;

use tokio::io::AsyncBufReadExt;
use tokio::sync::mpsc;

use smarthub_app::capabilities::Capabilities;
use smarthub_app::runtime::ModuleRuntime;

/// Spawn the stdin reader task and return the line channel.
pub fn spawn_stdin_reader() -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            if tx.send(line).is_err() {
                return;
            }
        }
    });

    rx
}

/// Handle one console line. Returns `false` when the hub should exit.
pub fn handle_line(
    line: &str,
    runtime: &mut ModuleRuntime,
    capabilities: &Arc<Capabilities>,
) -> bool {
    let trimmed = line.trim();
    let (command, args) = match trimmed.split_once(char::is_whitespace) {
        Some((command, args)) => (command, args.trim()),
        None => (trimmed, ""),
    };

    match command {
        "quit" => return false,
        "load_module" => {
            if args.is_empty() {
                tracing::info!("usage: load_module <name>");
            } else {
                // Failures are logged by the runtime.
                let _ = runtime.load(args, capabilities);
            }
        }
        "unload_module" => {
            if args.is_empty() {
                tracing::info!("usage: unload_module <name>");
            } else {
                let _ = runtime.unload(args);
            }
        }
        _ => {
            capabilities.directives().dispatch_line(line);
        }
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;

    use smarthub_app::bus::MessageBus;
    use smarthub_app::capabilities::CapabilityIndex;
    use smarthub_app::directives::DirectiveRegistry;
    use smarthub_app::gateway::ApiGateway;
    use smarthub_app::ports::module::{Module, ModuleExport};
    use smarthub_app::static_loader::StaticModuleLoader;
    use smarthub_adapter_mqtt::{MqttBroker, MqttConfig};

    struct Noop;
    impl Module for Noop {}

    fn fixture() -> (ModuleRuntime, Arc<Capabilities>) {
        let (tx, _rx) = mpsc::unbounded_channel();
        let broker = Arc::new(MqttBroker::new(MqttConfig::default(), tx));
        let index = CapabilityIndex::new();
        let capabilities = Arc::new(Capabilities::new(
            Arc::new(DirectiveRegistry::new()),
            Arc::new(MessageBus::new(broker)),
            Arc::new(ApiGateway::new()),
            index.clone(),
            "./config",
        ));

        let loader = StaticModuleLoader::new();
        loader.register("lights", |_| Some(ModuleExport::new(Box::new(Noop))));
        (ModuleRuntime::new(Box::new(loader), index), capabilities)
    }

    #[tokio::test]
    async fn should_request_exit_on_quit() {
        let (mut runtime, capabilities) = fixture();
        assert!(!handle_line("quit", &mut runtime, &capabilities));
    }

    #[tokio::test]
    async fn should_load_and_unload_module_by_name() {
        let (mut runtime, capabilities) = fixture();

        assert!(handle_line("load_module lights", &mut runtime, &capabilities));
        assert!(runtime.is_loaded("lights"));

        assert!(handle_line("unload_module lights", &mut runtime, &capabilities));
        assert!(!runtime.is_loaded("lights"));
    }

    #[tokio::test]
    async fn should_route_other_lines_to_directives() {
        let (mut runtime, capabilities) = fixture();
        let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
        {
            let seen = Arc::clone(&seen);
            capabilities
                .directives()
                .register("mqtt_server", Arc::new(move |args: &str| {
                    seen.lock().unwrap().push(args.to_string());
                }));
        }

        assert!(handle_line("mqtt_server 10.0.0.2", &mut runtime, &capabilities));
        assert_eq!(seen.lock().unwrap().as_slice(), ["10.0.0.2".to_string()]);
    }
}
