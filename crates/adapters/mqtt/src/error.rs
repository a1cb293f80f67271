//! MQTT adapter error types.

use smarthub_domain::error::BrokerError;

/// Errors specific to the MQTT adapter.
#[derive(Debug, thiserror::Error)]
pub enum MqttError {
    /// No MQTT client exists yet; `connect` has not been called.
    #[error("MQTT client not connected")]
    NotConnected,

    /// The rumqttc client refused a request.
    #[error("MQTT client error")]
    Client(#[source] rumqttc::ClientError),
}

impl From<MqttError> for BrokerError {
    fn from(err: MqttError) -> Self {
        match err {
            MqttError::NotConnected => Self::NotConnected,
            MqttError::Client(source) => Self::Request(Box::new(source)),
        }
    }
}
