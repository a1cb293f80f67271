//! Topic-addressed publish/subscribe bridged to an external broker.
//!
//! The bus keeps a *desired* subscription set that exists independently of
//! the broker connection: subscriptions made while disconnected are
//! replayed as soon as the broker acknowledges a connection. Publishing is
//! best-effort, at-most-once — while disconnected, messages are dropped,
//! not queued.
//!
//! Broker notifications originate in the adapter's own execution context
//! and reach the bus as [`BrokerEvent`]s funneled through [`MessageBus::apply`]
//! once per driver tick, so the connection flag and the desired set have a
//! single mutex and delivery never runs module callbacks under it.

use std::fmt::Display;
use std::sync::Arc;

use parking_lot::Mutex;

use smarthub_domain::context::ContextKey;
use smarthub_domain::topic;

use crate::ports::broker::{BrokerClient, BrokerEvent};

/// Callback invoked with (topic, payload, context) for every matching
/// inbound message.
pub type MessageCallback = Arc<dyn Fn(&str, &[u8], ContextKey) + Send + Sync>;

/// Connection to the external broker, as the bus last heard it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// No connection and no attempt in flight.
    Disconnected,
    /// A connection attempt is in flight.
    Connecting,
    /// The broker acknowledged the connection; the desired set is live.
    Connected,
}

struct Subscription {
    topic: String,
    context: ContextKey,
    callback: MessageCallback,
}

impl Subscription {
    fn matches(&self, topic: &str, context: ContextKey, callback: &MessageCallback) -> bool {
        self.topic == topic && self.context == context && Arc::ptr_eq(&self.callback, callback)
    }
}

struct BusState {
    connection: ConnectionState,
    desired: Vec<Subscription>,
}

/// The message bus.
pub struct MessageBus {
    broker: Arc<dyn BrokerClient>,
    state: Mutex<BusState>,
}

impl MessageBus {
    /// Create a bus over the given broker client, initially disconnected
    /// with an empty desired set.
    #[must_use]
    pub fn new(broker: Arc<dyn BrokerClient>) -> Self {
        Self {
            broker,
            state: Mutex::new(BusState {
                connection: ConnectionState::Disconnected,
                desired: Vec::new(),
            }),
        }
    }

    /// Current connection state.
    #[must_use]
    pub fn connection_state(&self) -> ConnectionState {
        self.state.lock().connection
    }

    /// Number of entries in the desired subscription set.
    #[must_use]
    pub fn subscription_count(&self) -> usize {
        self.state.lock().desired.len()
    }

    /// Begin connecting to the broker. A no-op unless currently
    /// disconnected; the outcome arrives later as a [`BrokerEvent`].
    pub fn connect(&self) {
        {
            let mut state = self.state.lock();
            if state.connection != ConnectionState::Disconnected {
                return;
            }
            state.connection = ConnectionState::Connecting;
        }

        tracing::info!("connecting to broker");

        if let Err(err) = self.broker.connect() {
            tracing::warn!(error = %err, "could not initiate broker connection");
            self.state.lock().connection = ConnectionState::Disconnected;
        }
    }

    /// Tear down the broker connection. The desired set is kept.
    pub fn disconnect(&self) {
        let was = {
            let mut state = self.state.lock();
            std::mem::replace(&mut state.connection, ConnectionState::Disconnected)
        };

        if was != ConnectionState::Disconnected {
            self.broker.disconnect();
        }
    }

    /// Add a subscription for the rendered topic.
    ///
    /// An exact (topic, context, callback) duplicate is a no-op. The entry
    /// joins the desired set regardless of connection state; a broker
    /// subscribe is only issued when currently connected.
    pub fn subscribe(
        &self,
        context: ContextKey,
        callback: MessageCallback,
        template: &str,
        args: &[&dyn Display],
    ) {
        let rendered = topic::render(template, args);

        let issue = {
            let mut state = self.state.lock();
            if state
                .desired
                .iter()
                .any(|sub| sub.matches(&rendered, context, &callback))
            {
                return;
            }

            state.desired.push(Subscription {
                topic: rendered.clone(),
                context,
                callback,
            });
            state.connection == ConnectionState::Connected
        };

        if issue && let Err(err) = self.broker.subscribe(&rendered) {
            tracing::warn!(topic = %rendered, error = %err, "broker subscribe failed");
        }
    }

    /// Remove the subscription matching the rendered topic and the exact
    /// (context, callback) pair.
    ///
    /// Unknown triples are a no-op. The entry leaves the desired set even
    /// when the broker unsubscribe cannot be issued.
    pub fn unsubscribe(
        &self,
        context: ContextKey,
        callback: &MessageCallback,
        template: &str,
        args: &[&dyn Display],
    ) {
        let rendered = topic::render(template, args);

        let issue = {
            let mut state = self.state.lock();
            let Some(pos) = state
                .desired
                .iter()
                .position(|sub| sub.matches(&rendered, context, callback))
            else {
                return;
            };

            state.desired.remove(pos);
            state.connection == ConnectionState::Connected
        };

        if issue && let Err(err) = self.broker.unsubscribe(&rendered) {
            tracing::warn!(topic = %rendered, error = %err, "broker unsubscribe failed");
        }
    }

    /// Publish a UTF-8 message to the rendered topic. Dropped silently
    /// while not connected.
    pub fn publish(&self, message: &str, template: &str, args: &[&dyn Display]) {
        self.publish_data(message.as_bytes(), template, args);
    }

    /// Publish a raw payload to the rendered topic. Dropped silently while
    /// not connected; delivery is handed off without awaiting an
    /// acknowledgment.
    pub fn publish_data(&self, payload: &[u8], template: &str, args: &[&dyn Display]) {
        let rendered = topic::render(template, args);

        if self.connection_state() != ConnectionState::Connected {
            return;
        }

        if let Err(err) = self.broker.publish(&rendered, payload) {
            tracing::warn!(topic = %rendered, error = %err, "broker publish failed");
        }
    }

    /// Apply one broker notification. Called from the driver loop, once per
    /// queued event per tick.
    pub fn apply(&self, event: BrokerEvent) {
        match event {
            BrokerEvent::Connected => self.on_connected(),
            BrokerEvent::ConnectFailed => {
                self.state.lock().connection = ConnectionState::Disconnected;
                tracing::warn!("could not connect to broker");
            }
            BrokerEvent::ConnectionLost => {
                self.state.lock().connection = ConnectionState::Disconnected;
                tracing::info!("lost connection to broker, reconnecting");
                self.connect();
            }
            BrokerEvent::Message { topic, payload } => self.deliver(&topic, &payload),
            BrokerEvent::Delivered => {
                tracing::trace!("broker acknowledged delivery");
            }
        }
    }

    /// The broker acknowledged a connection: mark connected and replay a
    /// subscribe for every desired entry, in desired-set order.
    fn on_connected(&self) {
        let topics: Vec<String> = {
            let mut state = self.state.lock();
            state.connection = ConnectionState::Connected;
            state.desired.iter().map(|sub| sub.topic.clone()).collect()
        };

        tracing::info!("connected to broker");

        for topic in &topics {
            if let Err(err) = self.broker.subscribe(topic) {
                tracing::warn!(topic = %topic, error = %err, "broker subscribe replay failed");
            }
        }
    }

    /// Deliver an inbound message to every desired entry whose topic
    /// matches exactly, in desired-set order.
    ///
    /// The matching entries are snapshotted before any callback runs, so a
    /// callback that subscribes or unsubscribes only affects deliveries
    /// from the next message on. Wildcard semantics belong to the broker;
    /// no expansion happens here.
    fn deliver(&self, topic: &str, payload: &[u8]) {
        let matched: Vec<(MessageCallback, ContextKey)> = self
            .state
            .lock()
            .desired
            .iter()
            .filter(|sub| sub.topic == topic)
            .map(|sub| (Arc::clone(&sub.callback), sub.context))
            .collect();

        for (callback, context) in matched {
            callback(topic, payload, context);
        }
    }
}
