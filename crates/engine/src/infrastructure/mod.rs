//! Infrastructure implementations.
//!
//! Contains port trait implementations for the host collaborators.

pub mod broadcast;
pub mod clock;
pub mod config;
pub mod directory;
pub mod ports;
pub mod proximity;
pub mod spatial;
