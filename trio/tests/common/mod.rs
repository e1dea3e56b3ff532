//! Shared fixtures for the integration tests.
#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use trio::{
    Card, Engine, FixedDeckBuilder, GameEvent, GameId, GameLifecycleListener, MemoryBroadcaster,
    Player, RoundResult, game::Timer,
};

/// 21 cards; slots 0, 1 and 2 form a trio right after the first refill.
pub const TRIO_FIRST_DECK: [u8; 21] = [
    0, 1, 2, 82, 138, 32, 10, 22, 73, 9, 145, 69, 68, 41, 148, 132, 137, 70, 25, 153, 90,
];

/// 21 cards with no trio among the first 18: the opening refill needs the
/// extra draw and two replacements, then the trio sits at [1, 3, 14].
pub const LATE_TRIO_DECK: [u8; 21] = [
    73, 16, 152, 37, 21, 22, 38, 8, 68, 146, 148, 134, 137, 132, 136, 154, 106, 89, 25, 153, 90,
];

pub fn cards(values: &[u8]) -> Vec<Card> {
    values
        .iter()
        .map(|&value| Card::try_from(value).unwrap())
        .collect()
}

pub fn alice() -> Player {
    Player::new("alice", "Alice")
}

pub fn bob() -> Player {
    Player::new("bob", "Bob")
}

pub fn carol() -> Player {
    Player::new("carol", "Carol")
}

/// Records lifecycle notifications.
#[derive(Default)]
pub struct RecordingListener {
    pub rounds: Mutex<Vec<RoundResult>>,
    pub inactive: Mutex<Vec<GameId>>,
}

impl RecordingListener {
    pub fn rounds(&self) -> Vec<RoundResult> {
        self.rounds.lock().unwrap().clone()
    }

    pub fn inactive(&self) -> Vec<GameId> {
        self.inactive.lock().unwrap().clone()
    }
}

impl GameLifecycleListener for RecordingListener {
    fn on_inactivity_timeout(&self, game_id: &GameId) {
        self.inactive.lock().unwrap().push(game_id.clone());
    }

    fn on_round_end(&self, result: &RoundResult) {
        self.rounds.lock().unwrap().push(result.clone());
    }
}

pub struct Fixture {
    pub engine: Engine,
    pub events: Arc<MemoryBroadcaster>,
    pub listener: Arc<RecordingListener>,
}

impl Fixture {
    /// Game owned by alice, dealing `deck` every round.
    pub fn new(deck: &[u8]) -> Self {
        let events = Arc::new(MemoryBroadcaster::new());
        let listener = Arc::new(RecordingListener::default());
        let engine = Engine::new(
            GameId::new("test-game"),
            alice(),
            Arc::new(FixedDeckBuilder::new(cards(deck))),
            events.clone(),
            listener.clone(),
        );
        Self {
            engine,
            events,
            listener,
        }
    }

    /// Joins `others`, starts the round and discards everything emitted so far.
    pub fn started(deck: &[u8], others: &[Player]) -> Self {
        let mut fixture = Self::new(deck);
        for player in others {
            fixture
                .engine
                .handle(player, trio::Action::PlayerJoin)
                .unwrap();
        }
        fixture
            .engine
            .handle(&alice(), trio::Action::StartGame)
            .unwrap();
        fixture.take_events();
        fixture.engine.drain_timers();
        fixture
    }

    pub fn take_events(&self) -> Vec<GameEvent> {
        self.events
            .take()
            .into_iter()
            .map(|(_, event)| event)
            .collect()
    }

    /// Generation of the only timer requested since the last drain.
    pub fn single_timer(&mut self) -> Timer {
        let timers = self.engine.drain_timers();
        assert_eq!(timers.len(), 1, "expected exactly one timer, got {timers:?}");
        timers[0]
    }

    pub fn elapse_celebration(&mut self) {
        match self.single_timer() {
            Timer::Celebration { generation } => {
                self.engine.on_celebration_elapsed(generation).unwrap();
            }
            other => panic!("expected a celebration timer, got {other:?}"),
        }
    }
}
