//! Trio game engine - cards, board, selection queue and lifecycle.
//!
//! This module provides the single-game rules:
//! - Cards with four ternary attributes and the trio rule
//! - Decks and the pluggable deck builder
//! - The game state aggregate (players, board, queue, scores)
//! - The synchronous engine driving a round from start to game over
//! - Outbound seams for events and lifecycle notifications

pub mod actions;
pub mod card;
pub mod deck;
pub mod engine;
pub mod errors;
pub mod events;
pub mod sinks;
pub mod state;

pub use actions::Action;
pub use card::{Attribute, Card, find_trio};
pub use deck::{Deck, DeckBuilder, FixedDeckBuilder, ShuffledDeckBuilder};
pub use engine::{Engine, MISS_PENALTY, TRIO_REWARD, Timer};
pub use errors::{ActionError, ActionResult, CardError, ForbiddenReason, IllegalStateReason};
pub use events::{DrawReason, GameEvent};
pub use sinks::{
    Broadcaster, ChannelBroadcaster, GameLifecycleListener, MemoryBroadcaster, NoopListener,
    RoundResult,
};
pub use state::{
    Board, FULL_BOARD_SIZE, GameId, GameState, Lifecycle, NORMAL_BOARD_SIZE, Player, PlayerId,
};
