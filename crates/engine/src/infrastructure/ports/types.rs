//! Helper types for port operations.

use parties_domain::{ClientPayload, PlayerId};

/// A payload addressed to a set of players.
#[derive(Debug, Clone, PartialEq)]
pub struct Outbound {
    pub recipients: Vec<PlayerId>,
    pub payload: ClientPayload,
}

impl Outbound {
    pub fn new(recipients: Vec<PlayerId>, payload: impl Into<ClientPayload>) -> Self {
        Self {
            recipients,
            payload: payload.into(),
        }
    }
}
