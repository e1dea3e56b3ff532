use serde::{Deserialize, Serialize};
use std::fmt;

/// Inbound player actions.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    StartGame,
    RestartGame,
    PlayerJoin,
    PlayerLeave,
    DeclareTrio,
    SelectTrio { selection: [usize; 3] },
    CancelTrio,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StartGame => write!(f, "start game"),
            Self::RestartGame => write!(f, "restart game"),
            Self::PlayerJoin => write!(f, "join"),
            Self::PlayerLeave => write!(f, "leave"),
            Self::DeclareTrio => write!(f, "declare trio"),
            Self::SelectTrio { selection } => write!(f, "select trio {selection:?}"),
            Self::CancelTrio => write!(f, "cancel trio"),
        }
    }
}
