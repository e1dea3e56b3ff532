//! Outbound seams: event broadcast and game lifecycle notifications.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use tokio::sync::mpsc;

use super::{
    events::GameEvent,
    state::{GameId, Player},
};

/// Receives every event a game produces, in production order.
///
/// Called from inside the game's critical section, so implementations must
/// not block.
pub trait Broadcaster: Send + Sync {
    fn broadcast(&self, game_id: &GameId, event: &GameEvent);
}

/// Final standings of a finished round.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct RoundResult {
    pub game_id: GameId,
    pub round: u32,
    pub owner: Option<Player>,
    pub finished_at: DateTime<Utc>,
    /// Every participant with their final score, highest first.
    pub scores: Vec<(Player, i32)>,
}

/// Notified when a game needs outside attention. Both hooks default to
/// doing nothing.
pub trait GameLifecycleListener: Send + Sync {
    /// The game saw no action for the configured delay and is shutting
    /// down; the registry should drop it.
    fn on_inactivity_timeout(&self, _game_id: &GameId) {}

    /// A round ended; the result may be persisted.
    fn on_round_end(&self, _result: &RoundResult) {}
}

/// Listener that ignores every notification.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopListener;

impl GameLifecycleListener for NoopListener {}

/// Forwards events into an unbounded channel. Sending never blocks and
/// per-game order is preserved.
#[derive(Clone, Debug)]
pub struct ChannelBroadcaster {
    sender: mpsc::UnboundedSender<(GameId, GameEvent)>,
}

impl ChannelBroadcaster {
    #[must_use]
    pub fn new() -> (Self, mpsc::UnboundedReceiver<(GameId, GameEvent)>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl Broadcaster for ChannelBroadcaster {
    fn broadcast(&self, game_id: &GameId, event: &GameEvent) {
        if self.sender.send((game_id.clone(), event.clone())).is_err() {
            log::debug!("Game {game_id}: no event receiver, dropping {event}");
        }
    }
}

/// Keeps every event in memory.
#[derive(Debug, Default)]
pub struct MemoryBroadcaster {
    events: Mutex<Vec<(GameId, GameEvent)>>,
}

impl MemoryBroadcaster {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All events recorded so far, across games.
    #[must_use]
    pub fn events(&self) -> Vec<(GameId, GameEvent)> {
        self.lock().clone()
    }

    /// Removes and returns everything recorded so far.
    pub fn take(&self) -> Vec<(GameId, GameEvent)> {
        std::mem::take(&mut *self.lock())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<(GameId, GameEvent)>> {
        // A panic while holding the lock cannot leave the Vec half-written.
        self.events
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl Broadcaster for MemoryBroadcaster {
    fn broadcast(&self, game_id: &GameId, event: &GameEvent) {
        self.lock().push((game_id.clone(), event.clone()));
    }
}
