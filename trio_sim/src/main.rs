//! Local trio simulation with automated players.
//!
//! Spawns games through a GameManager and lets bots race for trios until
//! every round is over, logging the event stream and the final standings.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Error;
use ctrlc::set_handler;
use log::info;
use pico_args::Arguments;
use rand::Rng;
use tokio::sync::mpsc;
use trio::{
    Action, ChannelBroadcaster, GameConfig, GameHandle, GameLifecycleListener, GameManager,
    Lifecycle, Player, RoundResult, find_trio,
};

const HELP: &str = "\
Simulate trio games between bots

USAGE:
  trio_sim [OPTIONS]

OPTIONS:
  --players    N           Bots per game               [default: 3]
  --games      N           Games played concurrently   [default: 1]

FLAGS:
  --json                   Print every event as a JSON line
  -h, --help               Print help information

ENVIRONMENT:
  TRIO_SELECTION_TIMEOUT_MS     Time the queue head has to select
  TRIO_CELEBRATION_DELAY_MS     Pause after a trio is found
  TRIO_INACTIVITY_TIMEOUT_SECS  Idle time before a game shuts down
  TRIO_INBOX_CAPACITY           Game actor inbox size
  RUST_LOG                      Log filter (e.g., info)
";

/// Chance that a bot gives up instead of selecting.
const CANCEL_PROBABILITY: f64 = 0.1;

struct Args {
    players: usize,
    games: usize,
    json: bool,
}

/// Forwards finished rounds to the main task.
struct RoundReporter {
    sender: mpsc::UnboundedSender<RoundResult>,
}

impl GameLifecycleListener for RoundReporter {
    fn on_inactivity_timeout(&self, game_id: &trio::GameId) {
        log::warn!("Game {game_id} went idle");
    }

    fn on_round_end(&self, result: &RoundResult) {
        let _ = self.sender.send(result.clone());
    }
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let args = Args {
        json: pargs.contains("--json"),
        players: pargs.value_from_str("--players").unwrap_or(3),
        games: pargs.value_from_str("--games").unwrap_or(1),
    };
    if args.players == 0 {
        anyhow::bail!("--players must be at least 1");
    }

    // Catching signals for exit.
    set_handler(|| std::process::exit(0))?;

    env_logger::builder().format_target(false).init();

    let config = GameConfig::from_env();
    info!(
        "Simulating {} game(s) with {} bots each ({config:?})",
        args.games, args.players
    );

    let (broadcaster, mut events) = ChannelBroadcaster::new();
    let (results_tx, mut results) = mpsc::unbounded_channel();
    let manager = Arc::new(
        GameManager::new(config, Arc::new(broadcaster))?
            .with_listener(Arc::new(RoundReporter { sender: results_tx })),
    );

    let json = args.json;
    let printer = tokio::spawn(async move {
        while let Some((game_id, event)) = events.recv().await {
            if json {
                let line = serde_json::json!({ "game": game_id, "event": event });
                println!("{line}");
            } else {
                info!("{game_id}: {event}");
            }
        }
    });

    let players: Vec<Player> = (0..args.players)
        .map(|i| Player::new(format!("bot{i}"), format!("Bot {i}")))
        .collect();

    let mut games = Vec::with_capacity(args.games);
    for _ in 0..args.games {
        let manager = manager.clone();
        let players = players.clone();
        games.push(tokio::spawn(
            async move { play_game(&manager, &players).await },
        ));
    }
    for game in games {
        game.await??;
    }

    results.close();
    while let Some(result) = results.recv().await {
        info!("Game {} round {} standings:", result.game_id, result.round);
        for (rank, (player, score)) in result.scores.iter().enumerate() {
            info!("  {}. {player}: {score}", rank + 1);
        }
    }

    printer.abort();
    Ok(())
}

async fn play_game(manager: &GameManager, players: &[Player]) -> Result<(), Error> {
    let owner = &players[0];
    let game = manager.create_game(owner.clone()).await;
    for player in &players[1..] {
        game.handle(player.clone(), Action::PlayerJoin).await?;
    }
    game.handle(owner.clone(), Action::StartGame).await?;

    let bots: Vec<_> = players
        .iter()
        .map(|player| tokio::spawn(run_bot(game.clone(), player.clone())))
        .collect();
    for bot in bots {
        bot.await?;
    }

    manager.close_game(game.game_id()).await?;
    Ok(())
}

/// Polls the board at a random pace and claims the first trio it sees.
async fn run_bot(game: GameHandle, me: Player) {
    loop {
        let reaction = rand::rng().random_range(200..1200);
        tokio::time::sleep(Duration::from_millis(reaction)).await;

        let Ok(state) = game.state().await else {
            break;
        };
        match state.lifecycle() {
            Lifecycle::Over => break,
            Lifecycle::Preparing => continue,
            Lifecycle::Playing => {}
        }
        let Some(selection) = find_trio(state.board()) else {
            continue;
        };

        if !state.is_queued(&me.id)
            && let Err(e) = game.handle(me.clone(), Action::DeclareTrio).await
        {
            log::debug!("{me} could not declare: {e}");
            continue;
        }

        let action = if rand::rng().random_bool(CANCEL_PROBABILITY) {
            Action::CancelTrio
        } else {
            Action::SelectTrio { selection }
        };
        if let Err(e) = game.handle(me.clone(), action).await {
            // Usually still waiting behind another player
            log::debug!("{me} could not {action}: {e}");
        }
    }
}
