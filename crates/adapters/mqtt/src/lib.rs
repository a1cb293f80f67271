//! # smarthub-adapter-mqtt
//!
//! MQTT adapter — implements the hub's [`BrokerClient`] port via
//! [rumqttc](https://docs.rs/rumqttc).
//!
//! ## Responsibilities
//! - Translate the bus's connect/disconnect/subscribe/unsubscribe/publish
//!   requests into rumqttc client calls (all non-blocking `try_*` variants)
//! - Drive the rumqttc event loop on its own task and translate its events
//!   into [`BrokerEvent`]s on the hub's notification channel
//!
//! ## Connection lifecycle
//! Every `connect` call builds a fresh client and polling task. A poll
//! error *before* the first ConnAck ends the task with
//! [`BrokerEvent::ConnectFailed`] — no retry. A poll error *after* a
//! ConnAck ends it with [`BrokerEvent::ConnectionLost`], and the bus's
//! loss handler immediately dials again with a new client. This mirrors
//! how the hub has always treated the two failure kinds differently.
//!
//! ## Dependency rule
//! Depends on `smarthub-app` (port traits) and `smarthub-domain` only.

pub mod config;
pub mod error;

use std::time::Duration;

use parking_lot::Mutex;
use rumqttc::{AsyncClient, Event, EventLoop, MqttOptions, Packet, QoS};
use tokio::sync::mpsc;

use smarthub_app::ports::broker::{BrokerClient, BrokerEvent};
use smarthub_domain::error::BrokerError;

pub use config::MqttConfig;
pub use error::MqttError;

// Matches the original deployment: acknowledged delivery, no duplicates
// tolerated by subscribers.
const QOS: QoS = QoS::AtLeastOnce;

const EVENT_LOOP_CAPACITY: usize = 16;

/// rumqttc-backed implementation of the hub's broker port.
pub struct MqttBroker {
    config: MqttConfig,
    events: mpsc::UnboundedSender<BrokerEvent>,
    client: Mutex<Option<AsyncClient>>,
}

impl MqttBroker {
    /// Create a broker client that reports its notifications on `events`.
    ///
    /// Nothing connects until [`BrokerClient::connect`] is called.
    #[must_use]
    pub fn new(config: MqttConfig, events: mpsc::UnboundedSender<BrokerEvent>) -> Self {
        Self {
            config,
            events,
            client: Mutex::new(None),
        }
    }

    fn current_client(&self) -> Result<AsyncClient, BrokerError> {
        self.client.lock().clone().ok_or(BrokerError::NotConnected)
    }
}

impl BrokerClient for MqttBroker {
    fn connect(&self) -> Result<(), BrokerError> {
        let mut options = MqttOptions::new(
            self.config.client_id.clone(),
            self.config.broker_host.clone(),
            self.config.broker_port,
        );
        options.set_keep_alive(Duration::from_secs(u64::from(self.config.keep_alive_secs)));

        let (client, event_loop) = AsyncClient::new(options, EVENT_LOOP_CAPACITY);
        *self.client.lock() = Some(client);

        tracing::info!(
            host = %self.config.broker_host,
            port = self.config.broker_port,
            "connecting to MQTT broker"
        );
        tokio::spawn(drive(event_loop, self.events.clone()));

        Ok(())
    }

    fn disconnect(&self) {
        if let Some(client) = self.client.lock().take()
            && let Err(err) = client.try_disconnect()
        {
            tracing::debug!(error = %err, "MQTT disconnect request failed");
        }
    }

    fn subscribe(&self, topic: &str) -> Result<(), BrokerError> {
        self.current_client()?
            .try_subscribe(topic, QOS)
            .map_err(|err| MqttError::Client(err).into())
    }

    fn unsubscribe(&self, topic: &str) -> Result<(), BrokerError> {
        self.current_client()?
            .try_unsubscribe(topic)
            .map_err(|err| MqttError::Client(err).into())
    }

    fn publish(&self, topic: &str, payload: &[u8]) -> Result<(), BrokerError> {
        self.current_client()?
            .try_publish(topic, QOS, false, payload.to_vec())
            .map_err(|err| MqttError::Client(err).into())
    }
}

/// Poll the rumqttc event loop until it fails or the hub goes away,
/// translating protocol events into [`BrokerEvent`]s.
async fn drive(mut event_loop: EventLoop, events: mpsc::UnboundedSender<BrokerEvent>) {
    let mut connected = false;

    loop {
        let event = match event_loop.poll().await {
            Ok(Event::Incoming(Packet::ConnAck(_))) => {
                connected = true;
                BrokerEvent::Connected
            }
            Ok(Event::Incoming(Packet::Publish(publish))) => BrokerEvent::Message {
                topic: publish.topic,
                payload: publish.payload.to_vec(),
            },
            Ok(Event::Incoming(Packet::PubAck(_))) => BrokerEvent::Delivered,
            Ok(_) => continue,
            Err(err) => {
                let event = if connected {
                    tracing::warn!(error = %err, "MQTT connection lost");
                    BrokerEvent::ConnectionLost
                } else {
                    tracing::warn!(error = %err, "MQTT connection attempt failed");
                    BrokerEvent::ConnectFailed
                };
                let _ = events.send(event);
                return;
            }
        };

        if events.send(event).is_err() {
            // The hub dropped its receiver; stop driving the connection.
            return;
        }
    }
}
