//! In-memory state storage modules.
//!
//! - `PartyRegistry` - parties and the player -> party reverse index
//! - `InviteManager` - pending invites with an expiry-ordered index
//! - `PartyStore` - both of the above behind one lock; the only mutation path

pub mod invite_manager;
pub mod party_registry;
pub mod party_store;

// Re-export store types
pub use invite_manager::InviteManager;
pub use party_registry::{Membership, PartyRegistry};
pub use party_store::PartyStore;
