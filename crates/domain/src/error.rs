//! Party error taxonomy
//!
//! Every variant is a recoverable user-input error. The `Display` text is the
//! message surfaced verbatim to whoever issued the command, so keep it short
//! and player-facing.

use thiserror::Error;

/// Unified error type for party operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PartyError {
    /// Joining would push the party past its configured size
    #[error("The party is full (max {max} members)")]
    PartyFull { max: u32 },

    /// The player already belongs to a party
    #[error("That player is already in a party")]
    AlreadyInParty,

    /// The player is not a member of the party in question
    #[error("That player is not a member of the party")]
    NotMember,

    /// Only the leader may perform this action
    #[error("Only the party leader can do that")]
    NotLeader,

    /// A player tried to invite themselves
    #[error("You cannot invite yourself")]
    SelfInvite,

    /// An invite for this (inviter, invitee) pair is still outstanding
    #[error("An invite to that player is already pending")]
    AlreadyInvited,

    /// No outstanding invite matches the request
    #[error("There is no pending invite from that player")]
    NoSuchInvite,

    /// The invite existed but its accept window has passed
    #[error("That invite has expired")]
    InviteExpired,

    /// Party management is delegated to an external team system
    #[error("Parties are managed by an external team system")]
    ExternalTeamsActive,

    /// Configuration failed validation
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl PartyError {
    /// Create an invalid configuration error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create a party full error for the given capacity
    pub fn party_full(max: u32) -> Self {
        Self::PartyFull { max }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_party_full_message() {
        let err = PartyError::party_full(5);
        assert!(matches!(err, PartyError::PartyFull { max: 5 }));
        assert_eq!(err.to_string(), "The party is full (max 5 members)");
    }

    #[test]
    fn test_invalid_config_message() {
        let err = PartyError::invalid_config("slow interval 20 is below fast interval 40");
        assert_eq!(
            err.to_string(),
            "Invalid configuration: slow interval 20 is below fast interval 40"
        );
    }
}
