//! Single-game engine: lifecycle state machine, selection queue protocol
//! and the cascading board refill.
//!
//! The engine is synchronous and never sleeps. Whenever it needs a timer it
//! queues a [`Timer`] request stamped with a fresh generation; the owner
//! (see [`crate::session::GameActor`]) drains those requests, waits, and
//! calls back into [`Engine::on_selection_timeout`] or
//! [`Engine::on_celebration_elapsed`]. A callback whose generation no
//! longer matches is rejected with [`IllegalStateReason::StaleTimer`].
//!
//! Owners should drain after every call. Requests left undrained are
//! replaced by the next one, since only one turn or celebration is live at
//! a time, so the queue never holds more than a single request.

use chrono::Utc;
use std::sync::Arc;

use super::{
    actions::Action,
    card::{Card, find_trio},
    deck::{Deck, DeckBuilder},
    errors::{ActionResult, ForbiddenReason, IllegalStateReason},
    events::{DrawReason, GameEvent},
    sinks::{Broadcaster, GameLifecycleListener, RoundResult},
    state::{FULL_BOARD_SIZE, GameId, GameState, Lifecycle, NORMAL_BOARD_SIZE, Player, PlayerId},
};

/// Score awarded for a valid trio.
pub const TRIO_REWARD: i32 = 3;

/// Score applied for a wrong selection, a give-up or a timeout.
pub const MISS_PENALTY: i32 = -1;

/// Cards drawn at once when the board holds no trio.
const EXTRA_CARDS: usize = 3;

/// Timer requests produced by the engine.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Timer {
    /// The current queue head must act before the selection timeout.
    SelectionTimeout { generation: u64 },
    /// Queue advancement resumes once the celebration delay elapses.
    Celebration { generation: u64 },
}

#[derive(Debug)]
struct Turn {
    player: PlayerId,
    generation: u64,
}

pub struct Engine {
    state: GameState,
    deck: Deck,
    deck_builder: Arc<dyn DeckBuilder>,
    broadcaster: Arc<dyn Broadcaster>,
    listener: Arc<dyn GameLifecycleListener>,
    /// Queue head currently allowed to select or cancel.
    turn: Option<Turn>,
    /// Pending celebration delay after a successful trio.
    celebration: Option<u64>,
    /// Set once a trio was claimed in the current queue-drain cycle.
    trio_found_in_cycle: bool,
    generation: u64,
    timers: Vec<Timer>,
}

impl Engine {
    /// Creates a game in the preparing state with its creator as owner and
    /// first participant.
    pub fn new(
        id: GameId,
        creator: Player,
        deck_builder: Arc<dyn DeckBuilder>,
        broadcaster: Arc<dyn Broadcaster>,
        listener: Arc<dyn GameLifecycleListener>,
    ) -> Self {
        let mut state = GameState::new(id, creator.id.clone());
        state.add_player(creator);
        Self {
            state,
            deck: Deck::default(),
            deck_builder,
            broadcaster,
            listener,
            turn: None,
            celebration: None,
            trio_found_in_cycle: false,
            generation: 0,
            timers: Vec::new(),
        }
    }

    #[must_use]
    pub fn id(&self) -> &GameId {
        self.state.id()
    }

    #[must_use]
    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Player whose selection turn is running, if any.
    #[must_use]
    pub fn selecting_player(&self) -> Option<&PlayerId> {
        self.turn.as_ref().map(|turn| &turn.player)
    }

    #[must_use]
    pub fn is_celebrating(&self) -> bool {
        self.celebration.is_some()
    }

    /// Takes the live timer request queued since the last call, if any.
    pub fn drain_timers(&mut self) -> Vec<Timer> {
        std::mem::take(&mut self.timers)
    }

    /// Dispatches a player action.
    ///
    /// # Errors
    ///
    /// Returns [`ActionError::Forbidden`](super::errors::ActionError::Forbidden)
    /// when the player may not act on this game at all, and
    /// [`ActionError::IllegalGameState`](super::errors::ActionError::IllegalGameState)
    /// when the action does not fit the lifecycle, queue or board. Nothing
    /// changes on error.
    pub fn handle(&mut self, player: &Player, action: Action) -> ActionResult {
        log::info!("Game {}: <<< from {}: {action}", self.id(), player.id);
        let result = match action {
            Action::StartGame => self.start_round(player),
            Action::RestartGame => self.prepare_next_round(player),
            Action::PlayerJoin => self.player_joins(player),
            Action::PlayerLeave => self.player_leaves(player),
            Action::DeclareTrio => self.player_declares_trio(player),
            Action::SelectTrio { selection } => self.player_selects_trio(player, selection),
            Action::CancelTrio => self.player_cancels_trio(player),
        };
        if let Err(e) = &result {
            log::debug!("Game {}: rejected {action} from {}: {e}", self.id(), player.id);
        }
        result
    }

    /// Forces the running turn to time out.
    ///
    /// # Errors
    ///
    /// [`IllegalStateReason::StaleTimer`] if the turn this timer was armed
    /// for has already ended.
    pub fn on_selection_timeout(&mut self, generation: u64) -> ActionResult {
        let Some(id) = self
            .turn
            .as_ref()
            .filter(|turn| turn.generation == generation)
            .map(|turn| turn.player.clone())
        else {
            return Err(IllegalStateReason::StaleTimer.into());
        };

        log::warn!("Game {}: selection timeout reached for {id}", self.id());
        self.end_turn();
        let player = self.known_player(&id);
        let new_score = self.state.incr_score(&id, MISS_PENALTY);
        self.broadcast(GameEvent::SelectTimeout {
            player,
            new_score,
            queue: self.state.queue_snapshot(),
        });
        self.advance_queue();
        Ok(())
    }

    /// Resumes queue advancement after a successful trio.
    ///
    /// # Errors
    ///
    /// [`IllegalStateReason::StaleTimer`] if no celebration with this
    /// generation is pending.
    pub fn on_celebration_elapsed(&mut self, generation: u64) -> ActionResult {
        if self.celebration != Some(generation) {
            return Err(IllegalStateReason::StaleTimer.into());
        }
        self.celebration = None;
        self.advance_queue();
        Ok(())
    }

    // =====================================================
    // === Lifecycle
    // =====================================================

    fn start_round(&mut self, player: &Player) -> ActionResult {
        self.check_owner(player)?;
        if self.state.lifecycle() != Lifecycle::Preparing {
            return Err(IllegalStateReason::CannotStart.into());
        }

        let round = self.state.next_round();
        self.state.set_lifecycle(Lifecycle::Playing);
        log::info!("Game {}: round {round} started", self.id());
        self.broadcast(GameEvent::GameStateChanged {
            state: Lifecycle::Playing,
        });

        self.deck = self.deck_builder.build();
        self.state.set_cards_left(self.deck.len());
        self.trio_found_in_cycle = false;
        self.refill_board();
        Ok(())
    }

    fn prepare_next_round(&mut self, player: &Player) -> ActionResult {
        self.check_owner(player)?;
        if self.state.lifecycle() != Lifecycle::Over {
            return Err(IllegalStateReason::CannotRestart.into());
        }

        self.state.reset();
        self.deck = Deck::default();
        self.turn = None;
        self.celebration = None;
        self.trio_found_in_cycle = false;
        self.broadcast(GameEvent::GameStateChanged {
            state: Lifecycle::Preparing,
        });
        Ok(())
    }

    fn end_round(&mut self) {
        self.state.set_lifecycle(Lifecycle::Over);
        self.turn = None;
        self.celebration = None;
        self.timers.clear();
        log::info!(
            "Game {}: no trio on board and no more cards, round {} is over",
            self.id(),
            self.state.round()
        );
        self.broadcast(GameEvent::GameStateChanged {
            state: Lifecycle::Over,
        });

        let result = RoundResult {
            game_id: self.id().clone(),
            round: self.state.round(),
            owner: self.state.owner().cloned(),
            finished_at: Utc::now(),
            scores: self.state.standings(),
        };
        self.listener.on_round_end(&result);
    }

    // =====================================================
    // === Connection
    // =====================================================

    fn player_joins(&mut self, player: &Player) -> ActionResult {
        if self.state.lifecycle() != Lifecycle::Preparing {
            return Err(IllegalStateReason::NotPreparing.into());
        }
        if !self.state.add_player(player.clone()) {
            log::warn!("Game {}: {player} already joined, ignoring", self.id());
            return Ok(());
        }
        self.broadcast(GameEvent::PlayerJoined {
            player: player.clone(),
        });
        Ok(())
    }

    fn player_leaves(&mut self, player: &Player) -> ActionResult {
        let participant = self.participant(player)?;
        if self.state.lifecycle() != Lifecycle::Preparing {
            return Err(IllegalStateReason::NotPreparing.into());
        }
        self.state.remove_player(&participant.id);
        self.broadcast(GameEvent::PlayerLeft {
            player: participant,
        });
        Ok(())
    }

    // =====================================================
    // === Selection queue
    // =====================================================

    fn player_declares_trio(&mut self, player: &Player) -> ActionResult {
        let participant = self.participant(player)?;
        self.check_playing()?;
        if self.state.is_queued(&participant.id) {
            return Err(IllegalStateReason::AlreadyDeclared.into());
        }

        self.state.enqueue(participant.id.clone());
        if self.state.queue().len() == 1 && self.celebration.is_none() {
            self.advance_queue();
        } else {
            self.broadcast(GameEvent::PlayerDeclares {
                player: participant,
                queue: self.state.queue_snapshot(),
            });
        }
        Ok(())
    }

    fn player_selects_trio(&mut self, player: &Player, selection: [usize; 3]) -> ActionResult {
        let participant = self.participant(player)?;
        self.check_playing()?;
        self.check_selector(&participant.id)?;
        let [card1, card2, card3] = self.selected_cards(selection)?;

        self.end_turn();
        let faulty = Card::is_trio(card1, card2, card3);
        if faulty.is_empty() {
            for pos in selection {
                self.state.take(pos);
            }
            let new_score = self.state.incr_score(&participant.id, TRIO_REWARD);
            log::info!("Game {}: {} found a trio at {selection:?}", self.id(), participant.id);
            self.broadcast(GameEvent::SelectSuccess {
                player: participant,
                positions: selection,
                new_score,
                queue: self.state.queue_snapshot(),
            });

            self.trio_found_in_cycle = true;
            let generation = self.next_generation();
            self.celebration = Some(generation);
            self.request_timer(Timer::Celebration { generation });
        } else {
            let new_score = self.state.incr_score(&participant.id, MISS_PENALTY);
            self.broadcast(GameEvent::SelectFailure {
                player: participant,
                faulty,
                new_score,
                queue: self.state.queue_snapshot(),
            });
            self.advance_queue();
        }
        Ok(())
    }

    /// Withdrawal (no penalty) once a trio was claimed earlier in this
    /// cycle, give-up otherwise.
    fn player_cancels_trio(&mut self, player: &Player) -> ActionResult {
        let participant = self.participant(player)?;
        self.check_playing()?;
        self.check_selector(&participant.id)?;

        self.end_turn();
        if self.trio_found_in_cycle {
            self.broadcast(GameEvent::SelectWithdraw {
                player: participant,
                queue: self.state.queue_snapshot(),
            });
        } else {
            let new_score = self.state.incr_score(&participant.id, MISS_PENALTY);
            self.broadcast(GameEvent::SelectGiveup {
                player: participant,
                new_score,
                queue: self.state.queue_snapshot(),
            });
        }
        self.advance_queue();
        Ok(())
    }

    fn end_turn(&mut self) {
        self.turn = None;
        self.state.dequeue();
    }

    fn advance_queue(&mut self) {
        match self.state.peek_queue().cloned() {
            Some(head) => {
                let generation = self.next_generation();
                let player = self.known_player(&head);
                self.turn = Some(Turn {
                    player: head,
                    generation,
                });
                self.request_timer(Timer::SelectionTimeout { generation });
                self.broadcast(GameEvent::PlayerSelects {
                    player,
                    queue: self.state.queue_snapshot(),
                });
            }
            None => {
                self.trio_found_in_cycle = false;
                self.refill_board();
            }
        }
    }

    // =====================================================
    // === Board
    // =====================================================

    fn refill_board(&mut self) {
        self.compact_board();

        let on_board = self.state.cards_on_board();
        if on_board < NORMAL_BOARD_SIZE {
            self.draw_cards(NORMAL_BOARD_SIZE - on_board, DrawReason::Refill, None);
        }

        if find_trio(self.state.board()).is_some() {
            return;
        }
        if self.deck.is_empty() {
            self.end_round();
            return;
        }

        log::info!("Game {}: no trio on board, drawing extra cards", self.id());
        self.draw_cards(EXTRA_CARDS, DrawReason::Extra, None);

        let mut replace_from = 0;
        while find_trio(self.state.board()).is_none() {
            if self.deck.is_empty() {
                self.end_round();
                return;
            }
            log::info!("Game {}: still no trio, replacing cards", self.id());
            self.draw_cards(EXTRA_CARDS, DrawReason::Replaced, Some(replace_from));
            replace_from = (replace_from + EXTRA_CARDS) % FULL_BOARD_SIZE;
        }
    }

    /// Moves cards out of the overflow slots into free normal slots.
    fn compact_board(&mut self) {
        let board = self.state.board();
        let overflow: Vec<usize> = (NORMAL_BOARD_SIZE..FULL_BOARD_SIZE)
            .filter(|&pos| board[pos].is_some())
            .collect();
        let free: Vec<usize> = (0..NORMAL_BOARD_SIZE)
            .filter(|&pos| board[pos].is_none())
            .collect();

        let moves = overflow.len().min(free.len());
        if moves == 0 {
            return;
        }
        let from = overflow[..moves].to_vec();
        let to = free[..moves].to_vec();
        for (&src, &dst) in from.iter().zip(&to) {
            self.state.move_card(src, dst);
        }
        self.broadcast(GameEvent::CardsMoved { from, to });
    }

    /// Draws up to `count` cards. Without `replace_from` the cards fill free
    /// slots in index order; with it they overwrite consecutive slots from
    /// that index.
    fn draw_cards(&mut self, count: usize, reason: DrawReason, replace_from: Option<usize>) {
        if count == 0 || self.deck.is_empty() {
            return;
        }
        let cards_left = self.state.cards_left();
        let positions: Vec<usize> = match replace_from {
            None => (0..FULL_BOARD_SIZE)
                .filter(|&pos| self.state.card_at(pos).is_none())
                .take(count)
                .collect(),
            Some(start) => (0..count).map(|i| (start + i) % FULL_BOARD_SIZE).collect(),
        };

        let mut cards = Vec::with_capacity(positions.len());
        let mut placed = Vec::with_capacity(positions.len());
        for pos in positions {
            let Some(card) = self.deck.draw() else {
                break;
            };
            self.state.place(pos, card);
            cards.push(card);
            placed.push(pos);
        }
        if cards.is_empty() {
            return;
        }

        self.state.decr_cards_left(cards.len());
        self.broadcast(GameEvent::CardsDrawn {
            reason,
            cards_left,
            cards,
            positions: placed,
        });
    }

    fn selected_cards(&self, selection: [usize; 3]) -> ActionResult<[Card; 3]> {
        if selection.iter().any(|&pos| pos >= FULL_BOARD_SIZE) {
            return Err(IllegalStateReason::SlotOutOfRange.into());
        }
        let [a, b, c] = selection;
        if a == b || a == c || b == c {
            return Err(IllegalStateReason::DuplicatePosition.into());
        }
        match (
            self.state.card_at(a),
            self.state.card_at(b),
            self.state.card_at(c),
        ) {
            (Some(card1), Some(card2), Some(card3)) => Ok([card1, card2, card3]),
            _ => Err(IllegalStateReason::SlotNotOccupied.into()),
        }
    }

    // =====================================================
    // === Guards and helpers
    // =====================================================

    fn check_owner(&self, player: &Player) -> ActionResult {
        if player.id != *self.state.owner_id() {
            return Err(ForbiddenReason::NotOwner.into());
        }
        Ok(())
    }

    fn participant(&self, player: &Player) -> ActionResult<Player> {
        self.state
            .player(&player.id)
            .cloned()
            .ok_or_else(|| ForbiddenReason::NotParticipant.into())
    }

    fn check_playing(&self) -> ActionResult {
        if self.state.lifecycle() != Lifecycle::Playing {
            return Err(IllegalStateReason::NotPlaying.into());
        }
        Ok(())
    }

    fn check_selector(&self, id: &PlayerId) -> ActionResult {
        match &self.turn {
            Some(turn) if turn.player == *id => Ok(()),
            _ if self.state.queue().is_empty() => Err(IllegalStateReason::QueueEmpty.into()),
            _ => Err(IllegalStateReason::NotQueuePlayer.into()),
        }
    }

    fn known_player(&self, id: &PlayerId) -> Player {
        self.state.player(id).cloned().unwrap_or_else(|| {
            log::error!("Game {}: queued player {id} is not a participant", self.id());
            Player::new(id.clone(), id.as_str())
        })
    }

    fn request_timer(&mut self, timer: Timer) {
        // A new turn or celebration makes every earlier request stale.
        self.timers.clear();
        self.timers.push(timer);
    }

    fn next_generation(&mut self) -> u64 {
        self.generation += 1;
        self.generation
    }

    fn broadcast(&self, event: GameEvent) {
        log::debug!("Game {}: >>> {event}", self.id());
        self.broadcaster.broadcast(self.id(), &event);
    }
}
