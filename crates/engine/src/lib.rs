//! Parties Engine library.
//!
//! Party lifecycle, invites, sync cadence, XP share, and boss scaling for a
//! game server. The host implements the ports in `infrastructure::ports` and
//! drives [`App::tick`] once per simulation tick.
//!
//! ## Structure
//!
//! - `stores/` - Party registry and invite bookkeeping behind one lock
//! - `use_cases/` - Features built on the store and the ports
//! - `infrastructure/` - Port traits and in-process adapters
//! - `app` - Application composition
//! - `game_loop` - Fixed-rate tick driver

pub mod app;
pub mod game_loop;
pub mod infrastructure;
pub mod stores;
pub mod use_cases;

/// Shared builders for unit tests.
#[cfg(test)]
pub(crate) mod test_fixtures;

pub use app::App;
