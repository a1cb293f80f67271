//! # smarthubd — smarthub daemon
//!
//! Composition root that wires the hub core and adapters together and runs
//! the driver loop.
//!
//! ## Responsibilities
//! - Parse configuration (TOML file, env vars)
//! - Build the broker adapter, message bus, gateway, directive registry and
//!   the frozen capability table, in that order, before any module loads
//! - Bind the HTTP listener and serve the gateway through axum
//! - Run the driver loop: module process hooks, queued broker events, then
//!   pending console commands, every tick
//! - Handle ordered shutdown (console `quit` or SIGINT): unload all
//!   modules, disconnect the bus, stop the HTTP server
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer — no hub logic belongs here.

mod config;
mod console;

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use smarthub_adapter_http_axum::state::AppState;
use smarthub_adapter_mqtt::MqttBroker;
use smarthub_app::bus::MessageBus;
use smarthub_app::capabilities::{Capabilities, CapabilityIndex};
use smarthub_app::directives::DirectiveRegistry;
use smarthub_app::gateway::ApiGateway;
use smarthub_app::runtime::ModuleRuntime;
use smarthub_app::static_loader::StaticModuleLoader;

use config::Config;

const TICK_INTERVAL: Duration = Duration::from_millis(10);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.logging.filter))
        .init();

    // Broker adapter and bus. Broker notifications land on this channel
    // and are drained once per driver tick.
    let (broker_tx, mut broker_rx) = mpsc::unbounded_channel();
    let broker = Arc::new(MqttBroker::new(config.broker.clone(), broker_tx));
    let bus = Arc::new(MessageBus::new(broker));

    // The capability table is assembled once, before any module loads.
    let gateway = Arc::new(ApiGateway::new());
    let directives = Arc::new(DirectiveRegistry::new());
    let index = CapabilityIndex::new();
    let capabilities = Arc::new(Capabilities::new(
        Arc::clone(&directives),
        Arc::clone(&bus),
        Arc::clone(&gateway),
        index.clone(),
        config.modules.config_dir.clone(),
    ));

    // Extension modules linked into this binary register their
    // constructors here before the boot-time loads below.
    let loader = StaticModuleLoader::new();
    let mut runtime = ModuleRuntime::new(Box::new(loader), index);

    bus.connect();

    // HTTP server.
    let mut state = AppState::new(Arc::clone(&gateway));
    if let Some(static_dir) = &config.server.static_dir {
        state = state.with_static_dir(static_dir);
    }
    let app = smarthub_adapter_http_axum::router::build(state);
    let listener = tokio::net::TcpListener::bind(config.bind_addr()).await?;
    tracing::info!(addr = %config.bind_addr(), "smarthubd listening");

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
    let server = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.await;
            })
            .await
    });

    // Boot-time module loads; failures are logged and skipped.
    for name in &config.modules.load {
        let _ = runtime.load(name, &capabilities);
    }

    let mut console_rx = console::spawn_stdin_reader();

    let mut tick = tokio::time::interval(TICK_INTERVAL);
    let mut running = true;
    while running {
        tokio::select! {
            _ = tick.tick() => {
                runtime.process();

                while let Ok(event) = broker_rx.try_recv() {
                    bus.apply(event);
                }

                while let Ok(line) = console_rx.try_recv() {
                    if !console::handle_line(&line, &mut runtime, &capabilities) {
                        running = false;
                        break;
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => {
                running = false;
            }
        }
    }

    // Ordered teardown: modules first, then the bus, then HTTP.
    tracing::info!("shutting down");
    runtime.shutdown();
    bus.disconnect();
    let _ = shutdown_tx.send(());
    server.await??;

    Ok(())
}
