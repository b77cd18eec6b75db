//! Player-facing party commands.
//!
//! Text parsing and name resolution belong to the host's command layer. It
//! hands over an already-resolved [`PartyCommand`] and shows the returned
//! message, or the error's `Display` text, to the sender.

use std::sync::Arc;

use parties_domain::{PartyError, PartyView, PlayerId};

use super::membership::MembershipBridge;
use crate::infrastructure::config::ConfigHandle;
use crate::infrastructure::ports::{ConfigProvider, PlayerDirectory};
use crate::stores::PartyStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartyCommand {
    /// `party create`
    Create,
    /// `party invite <player>`
    Invite { target: PlayerId },
    /// `party accept <player>`
    Accept { inviter: PlayerId },
    /// `party decline <player>`
    Decline { inviter: PlayerId },
    /// `party cancel <player>`
    Cancel { invitee: PlayerId },
    /// `party leave`
    Leave,
    /// `party kick <player>`
    Kick { target: PlayerId },
    /// `party promote <player>`
    Promote { target: PlayerId },
    /// `party disband`
    Disband,
    /// `party info`
    Info,
    /// `party reload`
    Reload,
}

/// Success message for the sender.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandReply {
    pub message: String,
    pub party: Option<PartyView>,
}

impl CommandReply {
    fn text(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            party: None,
        }
    }

    fn with_party(message: impl Into<String>, party: PartyView) -> Self {
        Self {
            message: message.into(),
            party: Some(party),
        }
    }
}

pub struct CommandDispatcher {
    store: Arc<PartyStore>,
    membership: Arc<MembershipBridge>,
    directory: Arc<dyn PlayerDirectory>,
    config: ConfigHandle,
    provider: Arc<dyn ConfigProvider>,
}

impl CommandDispatcher {
    pub fn new(
        store: Arc<PartyStore>,
        membership: Arc<MembershipBridge>,
        directory: Arc<dyn PlayerDirectory>,
        config: ConfigHandle,
        provider: Arc<dyn ConfigProvider>,
    ) -> Self {
        Self {
            store,
            membership,
            directory,
            config,
            provider,
        }
    }

    pub async fn dispatch(
        &self,
        sender: PlayerId,
        command: PartyCommand,
    ) -> Result<CommandReply, PartyError> {
        let result = self.run(sender, command).await;
        if let Err(e) = &result {
            tracing::debug!(player_id = %sender, ?command, error = %e, "Party command rejected");
        }
        result
    }

    async fn run(
        &self,
        sender: PlayerId,
        command: PartyCommand,
    ) -> Result<CommandReply, PartyError> {
        match command {
            PartyCommand::Create => {
                let party = self.store.create_party(sender).await?;
                Ok(CommandReply::with_party("Party created", party))
            }
            PartyCommand::Invite { target } => {
                let invite = self.store.send_invite(sender, target).await?;
                let seconds = (invite.expires_at() - invite.created_at()).num_seconds();
                Ok(CommandReply::text(format!(
                    "Invited {}. The invite expires in {} seconds",
                    self.name_of(target),
                    seconds
                )))
            }
            PartyCommand::Accept { inviter } => {
                let party = self.store.accept_invite(sender, inviter).await?;
                Ok(CommandReply::with_party(
                    format!("You joined {}'s party", self.name_of(party.leader)),
                    party,
                ))
            }
            PartyCommand::Decline { inviter } => {
                self.store.decline_invite(sender, inviter).await?;
                Ok(CommandReply::text(format!(
                    "Declined the invite from {}",
                    self.name_of(inviter)
                )))
            }
            PartyCommand::Cancel { invitee } => {
                self.store.cancel_invite(sender, invitee).await?;
                Ok(CommandReply::text(format!(
                    "Cancelled the invite to {}",
                    self.name_of(invitee)
                )))
            }
            PartyCommand::Leave => {
                self.store.leave(sender).await?;
                Ok(CommandReply::text("You left the party"))
            }
            PartyCommand::Kick { target } => {
                self.store.kick(sender, target).await?;
                if target == sender {
                    return Ok(CommandReply::text("You left the party"));
                }
                Ok(CommandReply::text(format!(
                    "Removed {} from the party",
                    self.name_of(target)
                )))
            }
            PartyCommand::Promote { target } => {
                let party = self.store.promote(sender, target).await?;
                Ok(CommandReply::with_party(
                    format!("{} is now the party leader", self.name_of(target)),
                    party,
                ))
            }
            PartyCommand::Disband => {
                self.store.disband(sender).await?;
                Ok(CommandReply::text("The party was disbanded"))
            }
            PartyCommand::Info => {
                let party = self
                    .membership
                    .party_of(sender)
                    .await
                    .ok_or(PartyError::NotMember)?;
                let names: Vec<String> = party.members.iter().map(|m| self.name_of(*m)).collect();
                Ok(CommandReply::with_party(
                    format!(
                        "Party ({}/{}), leader {}: {}",
                        party.size(),
                        self.config.current().max_party_size(),
                        self.name_of(party.leader),
                        names.join(", ")
                    ),
                    party,
                ))
            }
            PartyCommand::Reload => {
                let fresh = self.provider.load()?;
                self.config.replace(fresh)?;
                Ok(CommandReply::text("Configuration reloaded"))
            }
        }
    }

    fn name_of(&self, player: PlayerId) -> String {
        self.directory
            .player(player)
            .map(|p| p.name)
            .unwrap_or_else(|| player.to_string())
    }
}
