//! Game actor: owns one engine and serializes every trigger through its inbox.

use super::{
    config::{ConfigError, GameConfig},
    messages::{GameMessage, SessionError},
};
use crate::game::{
    Action, Broadcaster, DeckBuilder, Engine, GameId, GameLifecycleListener, GameState, Player,
    Timer,
};
use std::sync::Arc;
use tokio::{
    sync::{mpsc, oneshot},
    time::{self, Instant},
};

/// Game actor handle for sending messages
///
/// A handle only submits actions, requests snapshots and closes the game.
/// Timer firings are delivered by the actor's own timer tasks and cannot be
/// sent from outside the crate:
///
/// ```compile_fail
/// use trio::session::messages::GameMessage;
///
/// async fn fire(handle: trio::GameHandle) {
///     handle.send(GameMessage::SelectionTimeout { generation: 1 }).await.unwrap();
/// }
/// ```
#[derive(Clone, Debug)]
pub struct GameHandle {
    sender: mpsc::Sender<GameMessage>,
    game_id: GameId,
}

impl GameHandle {
    pub(crate) fn new(sender: mpsc::Sender<GameMessage>, game_id: GameId) -> Self {
        Self { sender, game_id }
    }

    #[must_use]
    pub fn game_id(&self) -> &GameId {
        &self.game_id
    }

    /// Send a message to the game
    async fn send(&self, message: GameMessage) -> Result<(), SessionError> {
        self.sender
            .send(message)
            .await
            .map_err(|_| SessionError::Closed)
    }

    /// Submits a player action and waits for the engine's verdict.
    ///
    /// # Errors
    ///
    /// [`SessionError::Action`] when the engine rejects the action,
    /// [`SessionError::Closed`] when the game has shut down.
    pub async fn handle(&self, player: Player, action: Action) -> Result<(), SessionError> {
        let (tx, rx) = oneshot::channel();
        self.send(GameMessage::Handle {
            player,
            action,
            response: tx,
        })
        .await?;
        rx.await.map_err(|_| SessionError::Closed)??;
        Ok(())
    }

    /// Snapshot of the game state.
    pub async fn state(&self) -> Result<GameState, SessionError> {
        let (tx, rx) = oneshot::channel();
        self.send(GameMessage::GetState { response: tx }).await?;
        rx.await.map_err(|_| SessionError::Closed)
    }

    /// Stops the actor once the messages already queued are processed.
    pub async fn close(&self) -> Result<(), SessionError> {
        let (tx, rx) = oneshot::channel();
        self.send(GameMessage::Close { response: tx }).await?;
        rx.await.map_err(|_| SessionError::Closed)
    }
}

/// Game actor managing a single game
pub struct GameActor {
    engine: Engine,

    config: GameConfig,

    /// Message inbox
    inbox: mpsc::Receiver<GameMessage>,

    /// Used by timer tasks; weak so that dropping every handle stops the actor
    sender: mpsc::WeakSender<GameMessage>,

    listener: Arc<dyn GameLifecycleListener>,

    is_closed: bool,
}

impl GameActor {
    /// Create a new game actor
    ///
    /// # Returns
    ///
    /// * `(GameActor, GameHandle)` - Actor and handle for sending messages
    ///
    /// # Errors
    ///
    /// Returns the validation error of `config`.
    pub fn new(
        id: GameId,
        creator: Player,
        config: GameConfig,
        deck_builder: Arc<dyn DeckBuilder>,
        broadcaster: Arc<dyn Broadcaster>,
        listener: Arc<dyn GameLifecycleListener>,
    ) -> Result<(Self, GameHandle), ConfigError> {
        config.validate()?;
        Ok(Self::with_valid_config(
            id,
            creator,
            config,
            deck_builder,
            broadcaster,
            listener,
        ))
    }

    /// Same as [`GameActor::new`] for a config that already passed `validate()`.
    pub(super) fn with_valid_config(
        id: GameId,
        creator: Player,
        config: GameConfig,
        deck_builder: Arc<dyn DeckBuilder>,
        broadcaster: Arc<dyn Broadcaster>,
        listener: Arc<dyn GameLifecycleListener>,
    ) -> (Self, GameHandle) {
        let (sender, inbox) = mpsc::channel(config.inbox_capacity);
        let engine = Engine::new(id.clone(), creator, deck_builder, broadcaster, listener.clone());

        let actor = Self {
            engine,
            config,
            inbox,
            sender: sender.downgrade(),
            listener,
            is_closed: false,
        };

        (actor, GameHandle::new(sender, id))
    }

    /// Run the game actor event loop
    pub async fn run(mut self) {
        let id = self.engine.id().clone();
        log::info!("Game {id} starting");

        let inactivity = time::sleep(self.config.inactivity_timeout);
        tokio::pin!(inactivity);

        loop {
            tokio::select! {
                message = self.inbox.recv() => {
                    let Some(message) = message else {
                        log::debug!("Game {id}: every handle dropped");
                        break;
                    };

                    if matches!(message, GameMessage::Handle { .. }) {
                        inactivity
                            .as_mut()
                            .reset(Instant::now() + self.config.inactivity_timeout);
                    }

                    self.handle_message(message);
                    self.arm_timers();

                    if self.is_closed {
                        break;
                    }
                }

                () = &mut inactivity => {
                    log::warn!(
                        "Game {id}: no activity for {:?}, shutting down",
                        self.config.inactivity_timeout
                    );
                    self.listener.on_inactivity_timeout(&id);
                    break;
                }
            }
        }

        log::info!("Game {id} closed");
    }

    fn handle_message(&mut self, message: GameMessage) {
        match message {
            GameMessage::Handle {
                player,
                action,
                response,
            } => {
                let result = self.engine.handle(&player, action);
                let _ = response.send(result);
            }

            GameMessage::GetState { response } => {
                let _ = response.send(self.engine.state().clone());
            }

            GameMessage::SelectionTimeout { generation } => {
                if let Err(e) = self.engine.on_selection_timeout(generation) {
                    log::debug!(
                        "Game {}: selection timer {generation} ignored: {e}",
                        self.engine.id()
                    );
                }
            }

            GameMessage::CelebrationElapsed { generation } => {
                if let Err(e) = self.engine.on_celebration_elapsed(generation) {
                    log::debug!(
                        "Game {}: celebration timer {generation} ignored: {e}",
                        self.engine.id()
                    );
                }
            }

            GameMessage::Close { response } => {
                self.is_closed = true;
                let _ = response.send(());
            }
        }
    }

    /// Spawns one sleeping task per timer the engine asked for.
    fn arm_timers(&mut self) {
        for timer in self.engine.drain_timers() {
            let (delay, message) = match timer {
                Timer::SelectionTimeout { generation } => (
                    self.config.selection_timeout,
                    GameMessage::SelectionTimeout { generation },
                ),
                Timer::Celebration { generation } => (
                    self.config.celebration_delay,
                    GameMessage::CelebrationElapsed { generation },
                ),
            };

            let sender = self.sender.clone();
            tokio::spawn(async move {
                time::sleep(delay).await;
                if let Some(sender) = sender.upgrade() {
                    let _ = sender.send(message).await;
                }
            });
        }
    }
}
