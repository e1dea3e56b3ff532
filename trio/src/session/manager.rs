//! Game manager for spawning and tracking game actors.

use super::{
    actor::{GameActor, GameHandle},
    config::{ConfigError, GameConfig},
    messages::SessionError,
};
use crate::game::{
    Action, Broadcaster, DeckBuilder, GameId, GameLifecycleListener, Lifecycle, Player, PlayerId,
    RoundResult, ShuffledDeckBuilder,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::{collections::HashMap, sync::Arc};
use tokio::sync::RwLock;
use uuid::Uuid;

type Registry = Arc<RwLock<HashMap<GameId, GameHandle>>>;

/// Game metadata for discovery
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameSummary {
    pub id: GameId,
    pub owner: PlayerId,
    pub lifecycle: Lifecycle,
    pub round: u32,
    pub player_count: usize,
    pub created: DateTime<Utc>,
}

/// Game manager for managing multiple game instances
pub struct GameManager {
    /// Active game handles
    games: Registry,

    config: GameConfig,

    deck_builder: Arc<dyn DeckBuilder>,

    broadcaster: Arc<dyn Broadcaster>,

    /// Receives round results and inactivity notices after the registry
    downstream: Option<Arc<dyn GameLifecycleListener>>,
}

impl GameManager {
    /// Create a new game manager dealing shuffled decks
    ///
    /// # Errors
    ///
    /// Returns the validation error of `config`.
    pub fn new(config: GameConfig, broadcaster: Arc<dyn Broadcaster>) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            games: Arc::new(RwLock::new(HashMap::new())),
            config,
            deck_builder: Arc::new(ShuffledDeckBuilder),
            broadcaster,
            downstream: None,
        })
    }

    #[must_use]
    pub fn with_deck_builder(mut self, deck_builder: Arc<dyn DeckBuilder>) -> Self {
        self.deck_builder = deck_builder;
        self
    }

    #[must_use]
    pub fn with_listener(mut self, listener: Arc<dyn GameLifecycleListener>) -> Self {
        self.downstream = Some(listener);
        self
    }

    #[must_use]
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Create and spawn a new game owned by `creator`
    pub async fn create_game(&self, creator: Player) -> GameHandle {
        let game_id = GameId::new(Uuid::new_v4().simple().to_string());
        let listener = Arc::new(RegistryListener {
            games: Arc::clone(&self.games),
            downstream: self.downstream.clone(),
        });

        let (actor, handle) = GameActor::with_valid_config(
            game_id.clone(),
            creator.clone(),
            self.config,
            Arc::clone(&self.deck_builder),
            Arc::clone(&self.broadcaster),
            listener,
        );

        let mut games = self.games.write().await;
        games.insert(game_id.clone(), handle.clone());
        drop(games);

        tokio::spawn(async move {
            actor.run().await;
        });

        log::info!("Created game {game_id} for {creator}");
        handle
    }

    pub async fn get_game(&self, game_id: &GameId) -> Option<GameHandle> {
        let games = self.games.read().await;
        games.get(game_id).cloned()
    }

    /// Dispatch a player action to a game
    ///
    /// # Errors
    ///
    /// [`SessionError::GameNotFound`] for unknown ids, otherwise whatever
    /// the game answers.
    pub async fn handle(
        &self,
        game_id: &GameId,
        player: Player,
        action: Action,
    ) -> Result<(), SessionError> {
        let handle = self
            .get_game(game_id)
            .await
            .ok_or_else(|| SessionError::GameNotFound(game_id.clone()))?;

        let result = handle.handle(player, action).await;
        if matches!(result, Err(SessionError::Closed)) {
            self.games.write().await.remove(game_id);
        }
        result
    }

    /// List live games, oldest first
    pub async fn list_games(&self) -> Vec<GameSummary> {
        let handles: Vec<GameHandle> = self.games.read().await.values().cloned().collect();

        let mut summaries = Vec::with_capacity(handles.len());
        for handle in handles {
            let Ok(state) = handle.state().await else {
                continue;
            };
            summaries.push(GameSummary {
                id: state.id().clone(),
                owner: state.owner_id().clone(),
                lifecycle: state.lifecycle(),
                round: state.round(),
                player_count: state.players().len(),
                created: state.created(),
            });
        }
        summaries.sort_by(|a, b| a.created.cmp(&b.created).then_with(|| a.id.cmp(&b.id)));
        summaries
    }

    /// Close a game and drop it from the registry
    ///
    /// # Errors
    ///
    /// [`SessionError::GameNotFound`] for unknown ids.
    pub async fn close_game(&self, game_id: &GameId) -> Result<(), SessionError> {
        let handle = self
            .games
            .write()
            .await
            .remove(game_id)
            .ok_or_else(|| SessionError::GameNotFound(game_id.clone()))?;

        if let Err(e) = handle.close().await {
            log::debug!("Game {game_id} was already stopped: {e}");
        }

        log::info!("Closed game {game_id}");
        Ok(())
    }

    pub async fn active_game_count(&self) -> usize {
        self.games.read().await.len()
    }
}

/// Lifecycle listener installed on every game the manager spawns.
struct RegistryListener {
    games: Registry,
    downstream: Option<Arc<dyn GameLifecycleListener>>,
}

impl GameLifecycleListener for RegistryListener {
    fn on_inactivity_timeout(&self, game_id: &GameId) {
        // Called from inside the game actor, which must not wait on the lock.
        let games = Arc::clone(&self.games);
        let id = game_id.clone();
        tokio::spawn(async move {
            if games.write().await.remove(&id).is_some() {
                log::info!("Removed inactive game {id}");
            }
        });

        if let Some(downstream) = &self.downstream {
            downstream.on_inactivity_timeout(game_id);
        }
    }

    fn on_round_end(&self, result: &RoundResult) {
        log::info!(
            "Game {}: round {} finished, {} players scored",
            result.game_id,
            result.round,
            result.scores.len()
        );
        if let Some(downstream) = &self.downstream {
            downstream.on_round_end(result);
        }
    }
}
