//! Game data aggregate. Bookkeeping only: every guard lives in the engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{
    borrow::Borrow,
    collections::{HashMap, VecDeque},
    fmt,
    hash::{Hash, Hasher},
};

use super::card::Card;

/// Number of cards usually displayed when a trio is present.
pub const NORMAL_BOARD_SIZE: usize = 12;

/// Board size including the overflow slots used when the normal board
/// holds no trio.
pub const FULL_BOARD_SIZE: usize = 15;

pub type Board = [Option<Card>; FULL_BOARD_SIZE];

#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct GameId(String);

impl GameId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for GameId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Stable player identity (the authenticated username).
#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct PlayerId(String);

impl PlayerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for PlayerId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for PlayerId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// A participant, derived from an external user identity.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
}

impl Player {
    pub fn new(id: impl Into<PlayerId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

impl PartialEq for Player {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Player {}

impl Hash for Player {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl Borrow<PlayerId> for Player {
    fn borrow(&self) -> &PlayerId {
        &self.id
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.id, self.name)
    }
}

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Lifecycle {
    /// Players may join and leave until the owner starts the round.
    #[default]
    Preparing,
    /// Trio actions are accepted. Lasts until the deck is exhausted and
    /// the board holds no trio.
    Playing,
    /// Round finished; lasts until the owner restarts.
    Over,
}

impl fmt::Display for Lifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::Preparing => "preparing",
            Self::Playing => "playing",
            Self::Over => "over",
        };
        write!(f, "{repr}")
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct GameState {
    id: GameId,
    owner_id: PlayerId,
    created: DateTime<Utc>,
    round: u32,
    lifecycle: Lifecycle,
    players: HashMap<PlayerId, Player>,
    board: Board,
    queue: VecDeque<PlayerId>,
    scores: HashMap<PlayerId, i32>,
    cards_left: usize,
}

impl GameState {
    #[must_use]
    pub fn new(id: GameId, owner_id: PlayerId) -> Self {
        Self {
            id,
            owner_id,
            created: Utc::now(),
            round: 0,
            lifecycle: Lifecycle::Preparing,
            players: HashMap::new(),
            board: [None; FULL_BOARD_SIZE],
            queue: VecDeque::new(),
            scores: HashMap::new(),
            cards_left: 0,
        }
    }

    /// Clears everything tied to a round. Players and the round counter
    /// are kept.
    pub fn reset(&mut self) {
        self.lifecycle = Lifecycle::Preparing;
        self.board = [None; FULL_BOARD_SIZE];
        self.queue.clear();
        self.scores.clear();
        self.cards_left = 0;
    }

    #[must_use]
    pub fn id(&self) -> &GameId {
        &self.id
    }

    #[must_use]
    pub fn owner_id(&self) -> &PlayerId {
        &self.owner_id
    }

    #[must_use]
    pub fn owner(&self) -> Option<&Player> {
        self.players.get(&self.owner_id)
    }

    #[must_use]
    pub fn created(&self) -> DateTime<Utc> {
        self.created
    }

    #[must_use]
    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn next_round(&mut self) -> u32 {
        self.round += 1;
        self.round
    }

    #[must_use]
    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn set_lifecycle(&mut self, lifecycle: Lifecycle) {
        self.lifecycle = lifecycle;
    }

    // === Players ===

    #[must_use]
    pub fn players(&self) -> &HashMap<PlayerId, Player> {
        &self.players
    }

    #[must_use]
    pub fn player(&self, id: &PlayerId) -> Option<&Player> {
        self.players.get(id)
    }

    #[must_use]
    pub fn contains_player(&self, id: &PlayerId) -> bool {
        self.players.contains_key(id)
    }

    /// Returns false if the player was already there.
    pub fn add_player(&mut self, player: Player) -> bool {
        if self.players.contains_key(&player.id) {
            return false;
        }
        self.players.insert(player.id.clone(), player);
        true
    }

    pub fn remove_player(&mut self, id: &PlayerId) -> Option<Player> {
        self.queue.retain(|queued| queued != id);
        self.players.remove(id)
    }

    // === Scores ===

    #[must_use]
    pub fn score(&self, id: &PlayerId) -> i32 {
        self.scores.get(id).copied().unwrap_or(0)
    }

    /// Applies `delta` and returns the new score.
    pub fn incr_score(&mut self, id: &PlayerId, delta: i32) -> i32 {
        let score = self.scores.entry(id.clone()).or_insert(0);
        *score += delta;
        *score
    }

    /// Every participant with their score, highest first.
    #[must_use]
    pub fn standings(&self) -> Vec<(Player, i32)> {
        let mut standings: Vec<(Player, i32)> = self
            .players
            .values()
            .map(|player| (player.clone(), self.score(&player.id)))
            .collect();
        standings.sort_by(|(p1, s1), (p2, s2)| s2.cmp(s1).then_with(|| p1.id.cmp(&p2.id)));
        standings
    }

    // === Deck counter ===

    #[must_use]
    pub fn cards_left(&self) -> usize {
        self.cards_left
    }

    pub fn set_cards_left(&mut self, cards_left: usize) {
        self.cards_left = cards_left;
    }

    pub fn decr_cards_left(&mut self, delta: usize) {
        self.cards_left = self.cards_left.saturating_sub(delta);
    }

    // === Selection queue ===

    #[must_use]
    pub fn queue(&self) -> &VecDeque<PlayerId> {
        &self.queue
    }

    #[must_use]
    pub fn queue_snapshot(&self) -> Vec<PlayerId> {
        self.queue.iter().cloned().collect()
    }

    #[must_use]
    pub fn is_queued(&self, id: &PlayerId) -> bool {
        self.queue.contains(id)
    }

    pub fn enqueue(&mut self, id: PlayerId) {
        self.queue.push_back(id);
    }

    #[must_use]
    pub fn peek_queue(&self) -> Option<&PlayerId> {
        self.queue.front()
    }

    pub fn dequeue(&mut self) -> Option<PlayerId> {
        self.queue.pop_front()
    }

    // === Board ===

    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[must_use]
    pub fn card_at(&self, pos: usize) -> Option<Card> {
        self.board.get(pos).copied().flatten()
    }

    pub fn place(&mut self, pos: usize, card: Card) {
        self.board[pos] = Some(card);
    }

    pub fn take(&mut self, pos: usize) -> Option<Card> {
        self.board[pos].take()
    }

    pub fn move_card(&mut self, from: usize, to: usize) {
        self.board[to] = self.board[from].take();
    }

    #[must_use]
    pub fn cards_on_board(&self) -> usize {
        self.board.iter().flatten().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> GameState {
        let mut state = GameState::new(GameId::new("g1"), PlayerId::new("alice"));
        state.add_player(Player::new("alice", "Alice"));
        state
    }

    #[test]
    fn test_add_player_twice() {
        let mut state = state();
        assert!(!state.add_player(Player::new("alice", "Alice Again")));
        assert_eq!(state.players().len(), 1);
        assert_eq!(state.owner().map(|p| p.name.as_str()), Some("Alice"));
    }

    #[test]
    fn test_scores_default_to_zero() {
        let mut state = state();
        let alice = PlayerId::new("alice");
        assert_eq!(state.score(&alice), 0);
        assert_eq!(state.incr_score(&alice, 3), 3);
        assert_eq!(state.incr_score(&alice, -1), 2);
    }

    #[test]
    fn test_queue_fifo() {
        let mut state = state();
        state.enqueue("alice".into());
        state.enqueue("bob".into());
        assert_eq!(state.peek_queue(), Some(&PlayerId::new("alice")));
        assert!(state.is_queued(&"bob".into()));
        assert_eq!(state.dequeue(), Some(PlayerId::new("alice")));
        assert_eq!(state.queue_snapshot(), vec![PlayerId::new("bob")]);
    }

    #[test]
    fn test_remove_player_leaves_queue() {
        let mut state = state();
        state.add_player(Player::new("bob", "Bob"));
        state.enqueue("bob".into());
        assert!(state.remove_player(&"bob".into()).is_some());
        assert!(state.queue().is_empty());
    }

    #[test]
    fn test_reset_keeps_players_and_round() {
        let mut state = state();
        state.next_round();
        state.set_lifecycle(Lifecycle::Over);
        state.place(3, Card::try_from(5).unwrap());
        state.incr_score(&"alice".into(), 6);
        state.set_cards_left(12);

        state.reset();

        assert_eq!(state.lifecycle(), Lifecycle::Preparing);
        assert_eq!(state.cards_on_board(), 0);
        assert_eq!(state.score(&"alice".into()), 0);
        assert_eq!(state.cards_left(), 0);
        assert_eq!(state.round(), 1);
        assert_eq!(state.players().len(), 1);
    }

    #[test]
    fn test_move_card() {
        let mut state = state();
        let card = Card::try_from(21).unwrap();
        state.place(13, card);
        state.move_card(13, 4);
        assert_eq!(state.card_at(4), Some(card));
        assert_eq!(state.card_at(13), None);
        assert_eq!(state.card_at(99), None);
    }

    #[test]
    fn test_standings_sorted_by_score() {
        let mut state = state();
        state.add_player(Player::new("bob", "Bob"));
        state.incr_score(&"bob".into(), 3);
        let standings = state.standings();
        assert_eq!(standings[0].0.id, PlayerId::new("bob"));
        assert_eq!(standings[1], (Player::new("alice", "Alice"), 0));
    }
}
