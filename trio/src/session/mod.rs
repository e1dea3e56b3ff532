//! Session module running games as async actors.
//!
//! This module implements:
//! - GameActor: Async actor owning a single game engine
//! - GameManager: Registry creating, dispatching to and reaping games
//! - Message-based communication with tokio channels
//! - Selection, celebration and inactivity timers
//!
//! ## Architecture
//!
//! Each game runs in a separate Tokio task with an mpsc message inbox.
//! Player actions, timer firings and snapshot requests are all messages,
//! so exactly one trigger touches a game at a time. Timer tasks hold only
//! a weak sender and deliver a generation-tagged message after sleeping.
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use trio::{Action, ChannelBroadcaster, GameConfig, GameManager, Player};
//!
//! #[tokio::main]
//! async fn main() {
//!     let (broadcaster, mut events) = ChannelBroadcaster::new();
//!     let manager = GameManager::new(GameConfig::default(), Arc::new(broadcaster)).unwrap();
//!
//!     let alice = Player::new("alice", "Alice");
//!     let game = manager.create_game(alice.clone()).await;
//!     game.handle(alice, Action::StartGame).await.unwrap();
//!
//!     while let Some((game_id, event)) = events.recv().await {
//!         println!("{game_id}: {event}");
//!     }
//! }
//! ```

pub mod actor;
pub mod config;
pub mod manager;
pub mod messages;

pub use actor::{GameActor, GameHandle};
pub use config::{ConfigError, GameConfig};
pub use manager::{GameManager, GameSummary};
pub use messages::SessionError;
