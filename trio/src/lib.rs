//! # Trio
//!
//! A real-time multiplayer card-matching game engine. Players race to spot
//! three cards that form a trio: for each of the four attributes (color,
//! shape, fill, number) the three values are either all equal or all
//! different.
//!
//! ## Architecture
//!
//! A game is a synchronous [`game::Engine`] owned by a single
//! [`session::GameActor`] task. All actions and timer callbacks reach the
//! engine through the actor's inbox, so every state change of a game is
//! serialized and its events are broadcast in production order. The
//! [`session::GameManager`] keeps the registry of live games and drops
//! them once they go idle.
//!
//! A round moves through three phases:
//!
//! - **Preparing**: players join and leave, the owner starts the round
//! - **Playing**: players declare, the queue head selects or cancels
//! - **Over**: the deck is exhausted and no trio remains on the board
//!
//! ## Core Modules
//!
//! - [`game`]: Cards, board, selection queue and the engine
//! - [`session`]: Per-game actor, timers and the game registry
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use trio::{Action, Engine, GameId, MemoryBroadcaster, NoopListener, Player, ShuffledDeckBuilder};
//!
//! let owner = Player::new("alice", "Alice");
//! let mut engine = Engine::new(
//!     GameId::new("g1"),
//!     owner.clone(),
//!     Arc::new(ShuffledDeckBuilder),
//!     Arc::new(MemoryBroadcaster::new()),
//!     Arc::new(NoopListener),
//! );
//! engine.handle(&owner, Action::StartGame).unwrap();
//! assert_eq!(engine.state().cards_on_board() % 3, 0);
//! ```

/// Single-game rules and the engine.
pub mod game;
pub use game::{
    Action, ActionError, ActionResult, Attribute, Broadcaster, Card, ChannelBroadcaster, Deck,
    DeckBuilder, DrawReason, Engine, FixedDeckBuilder, ForbiddenReason, GameEvent, GameId,
    GameLifecycleListener, GameState, IllegalStateReason, Lifecycle, MemoryBroadcaster,
    NoopListener, Player, PlayerId, RoundResult, ShuffledDeckBuilder, find_trio,
};

/// Concurrency shell: actors, timers, registry.
pub mod session;
pub use session::{
    ConfigError, GameActor, GameConfig, GameHandle, GameManager, GameSummary, SessionError,
};
