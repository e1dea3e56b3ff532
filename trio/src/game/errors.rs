//! Error types for game actions and card construction.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::card::Attribute;

/// Errors that can occur while building a card
#[derive(Clone, Copy, Debug, Eq, Error, PartialEq)]
pub enum CardError {
    #[error("attribute '{attribute}' out of range [0-2] ({value})")]
    InvalidAttribute { attribute: Attribute, value: u8 },
}

/// Why an actor is not allowed to perform an action at all.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Error, PartialEq, Serialize)]
pub enum ForbiddenReason {
    #[error("you are not part of this game")]
    NotParticipant,
    #[error("you are not allowed to change this game state")]
    NotOwner,
}

/// Why an action is invalid for the current lifecycle state, queue
/// position or board occupancy.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Error, PartialEq, Serialize)]
pub enum IllegalStateReason {
    #[error("players can only join or leave a game that has not started")]
    NotPreparing,
    #[error("the game is not started")]
    NotPlaying,
    #[error("this game cannot be started")]
    CannotStart,
    #[error("this game cannot be restarted")]
    CannotRestart,
    #[error("you already declared a trio")]
    AlreadyDeclared,
    #[error("selection queue is empty")]
    QueueEmpty,
    #[error("you're not the queue player")]
    NotQueuePlayer,
    #[error("selected position is outside the board")]
    SlotOutOfRange,
    #[error("the same position was selected twice")]
    DuplicatePosition,
    #[error("you've selected a non occupied slot")]
    SlotNotOccupied,
    #[error("timer no longer matches the selection state")]
    StaleTimer,
}

/// Caller-visible rejection of an action. State is unchanged whenever one
/// of these is returned.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Error, PartialEq, Serialize)]
pub enum ActionError {
    #[error("forbidden: {0}")]
    Forbidden(ForbiddenReason),
    #[error("illegal game state: {0}")]
    IllegalGameState(IllegalStateReason),
}

impl From<ForbiddenReason> for ActionError {
    fn from(reason: ForbiddenReason) -> Self {
        Self::Forbidden(reason)
    }
}

impl From<IllegalStateReason> for ActionError {
    fn from(reason: IllegalStateReason) -> Self {
        Self::IllegalGameState(reason)
    }
}

/// Result type for game actions
pub type ActionResult<T = ()> = Result<T, ActionError>;
