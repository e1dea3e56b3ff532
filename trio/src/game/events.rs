//! Events broadcast to game observers, one per observable change.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::{
    card::{Attribute, Card},
    state::{Lifecycle, Player, PlayerId},
};

/// Why cards were drawn.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DrawReason {
    /// Board topped up to 12 cards.
    Refill,
    /// 3 extra cards because the normal board holds no trio.
    Extra,
    /// 3 cards replaced because the extended board still holds no trio.
    Replaced,
}

impl fmt::Display for DrawReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::Refill => "refill",
            Self::Extra => "extra",
            Self::Replaced => "replaced",
        };
        write!(f, "{repr}")
    }
}

/// Queue payloads carry the selection queue as it stands after the change.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    GameStateChanged {
        state: Lifecycle,
    },
    PlayerJoined {
        player: Player,
    },
    PlayerLeft {
        player: Player,
    },
    PlayerDeclares {
        player: Player,
        queue: Vec<PlayerId>,
    },
    PlayerSelects {
        player: Player,
        queue: Vec<PlayerId>,
    },
    SelectTimeout {
        player: Player,
        new_score: i32,
        queue: Vec<PlayerId>,
    },
    SelectGiveup {
        player: Player,
        new_score: i32,
        queue: Vec<PlayerId>,
    },
    SelectWithdraw {
        player: Player,
        queue: Vec<PlayerId>,
    },
    SelectSuccess {
        player: Player,
        positions: [usize; 3],
        new_score: i32,
        queue: Vec<PlayerId>,
    },
    SelectFailure {
        player: Player,
        faulty: Vec<Attribute>,
        new_score: i32,
        queue: Vec<PlayerId>,
    },
    CardsMoved {
        from: Vec<usize>,
        to: Vec<usize>,
    },
    CardsDrawn {
        reason: DrawReason,
        /// Cards left in the deck before this draw.
        cards_left: usize,
        cards: Vec<Card>,
        positions: Vec<usize>,
    },
}

impl fmt::Display for GameEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GameStateChanged { state } => write!(f, "game is now {state}"),
            Self::PlayerJoined { player } => write!(f, "{player} joined"),
            Self::PlayerLeft { player } => write!(f, "{player} left"),
            Self::PlayerDeclares { player, queue } => {
                write!(f, "{player} declares a trio (queue: {})", queue.len())
            }
            Self::PlayerSelects { player, .. } => write!(f, "{player} is selecting"),
            Self::SelectTimeout {
                player, new_score, ..
            } => write!(f, "{player} timed out (score {new_score})"),
            Self::SelectGiveup {
                player, new_score, ..
            } => write!(f, "{player} gave up (score {new_score})"),
            Self::SelectWithdraw { player, .. } => write!(f, "{player} withdrew"),
            Self::SelectSuccess {
                player,
                positions,
                new_score,
                ..
            } => write!(f, "{player} found a trio at {positions:?} (score {new_score})"),
            Self::SelectFailure {
                player,
                faulty,
                new_score,
                ..
            } => write!(
                f,
                "{player} missed on {} (score {new_score})",
                faulty
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
            Self::CardsMoved { from, to } => write!(f, "cards moved {from:?} -> {to:?}"),
            Self::CardsDrawn {
                reason,
                cards_left,
                cards,
                positions,
            } => write!(
                f,
                "{} cards drawn ({reason}, {cards_left} left before) at {positions:?}",
                cards.len()
            ),
        }
    }
}
