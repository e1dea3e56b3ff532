//! Game actor message types.

use thiserror::Error;
use tokio::sync::oneshot;

use crate::game::{Action, ActionError, ActionResult, GameId, GameState, Player};

/// Messages that can be sent to a GameActor
#[derive(Debug)]
pub(crate) enum GameMessage {
    /// Player action
    Handle {
        player: Player,
        action: Action,
        response: oneshot::Sender<ActionResult>,
    },

    /// Get a snapshot of the game state
    GetState {
        response: oneshot::Sender<GameState>,
    },

    /// Selection timer fired
    SelectionTimeout { generation: u64 },

    /// Celebration delay elapsed
    CelebrationElapsed { generation: u64 },

    /// Stop the actor
    Close { response: oneshot::Sender<()> },
}

/// Errors surfaced by game handles and the manager.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error(transparent)]
    Action(#[from] ActionError),

    #[error("game {0} not found")]
    GameNotFound(GameId),

    #[error("game is closed")]
    Closed,
}
