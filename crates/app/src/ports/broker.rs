//! Broker port — the message bus's view of the external broker.
//!
//! The wire protocol is the adapter's concern. The bus issues requests
//! through [`BrokerClient`] and consumes [`BrokerEvent`]s that the adapter
//! produces from its own execution context; the driver funnels them into
//! the bus once per tick.

use smarthub_domain::error::BrokerError;

/// Outbound requests the bus can make of the broker connection.
pub trait BrokerClient: Send + Sync {
    /// Begin an asynchronous connection attempt. The outcome arrives later
    /// as [`BrokerEvent::Connected`] or [`BrokerEvent::ConnectFailed`].
    ///
    /// # Errors
    ///
    /// Returns [`BrokerError::Connect`] when the attempt could not even be
    /// initiated (e.g. an unusable address).
    fn connect(&self) -> Result<(), BrokerError>;

    /// Tear down the current connection, if any.
    fn disconnect(&self);

    /// Ask the broker to deliver messages for `topic`.
    ///
    /// # Errors
    ///
    /// Returns [`BrokerError`] when the request cannot be issued.
    fn subscribe(&self, topic: &str) -> Result<(), BrokerError>;

    /// Retract a previous subscribe for `topic`.
    ///
    /// # Errors
    ///
    /// Returns [`BrokerError`] when the request cannot be issued.
    fn unsubscribe(&self, topic: &str) -> Result<(), BrokerError>;

    /// Hand a message off for asynchronous delivery; no acknowledgment is
    /// awaited.
    ///
    /// # Errors
    ///
    /// Returns [`BrokerError`] when the request cannot be issued.
    fn publish(&self, topic: &str, payload: &[u8]) -> Result<(), BrokerError>;
}

/// Notifications produced by the broker adapter's own execution context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrokerEvent {
    /// The broker acknowledged the connection.
    Connected,
    /// An initial connection attempt failed. Not retried automatically.
    ConnectFailed,
    /// An established connection dropped. Reconnection starts immediately.
    ConnectionLost,
    /// A message arrived on a subscribed topic.
    Message {
        /// Fully rendered topic the message arrived on.
        topic: String,
        /// Raw payload bytes.
        payload: Vec<u8>,
    },
    /// The broker acknowledged delivery of an outbound message.
    Delivered,
}
