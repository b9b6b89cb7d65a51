use std::thread;
use std::time::{Duration, Instant};

use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use agario_sim::config::{FieldConfig, SessionConfig};
use agario_sim::game::constants::ai::SPEED_MULTIPLIER;
use agario_sim::game::events::{FieldEvent, GameEvent, PlayerInfo, SessionEvent};
use agario_sim::game::field::GameField;
use agario_sim::game::session::GameSession;
use agario_sim::game::strategy::ComputerStrategy;
#[cfg(feature = "records")]
use agario_sim::records::RecordTable;

/// How often the headless runner re-aims the human player
const AUTOPILOT_PERIOD: Duration = Duration::from_millis(250);

fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    info!("Agario simulation v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let field_config = FieldConfig::load_or_default();
    field_config.validate().context("invalid field configuration")?;
    let session_config = SessionConfig::load_or_default();
    session_config.validate().context("invalid session configuration")?;
    info!(
        "Configuration loaded: field {}x{}, {} food, {} computer players, {} Hz, running {}s",
        field_config.width,
        field_config.height,
        field_config.start_food,
        session_config.computer_players,
        session_config.tick_rate,
        session_config.run_seconds
    );

    #[cfg(feature = "records")]
    let mut records = RecordTable::load(&session_config.records_path, session_config.records_capacity)
        .with_context(|| format!("failed to load records from {}", session_config.records_path.display()))?;

    let field = GameField::with_defaults(
        field_config,
        &session_config.player_name,
        session_config.computer_players,
    );
    let human = field.human_player_id();
    let run_for = Duration::from_secs(session_config.run_seconds);
    let session = GameSession::new(field, session_config.clone()).context("failed to spawn ticker")?;

    // Count deaths and frames until the session finishes
    let events = session.subscribe();
    let consumer = thread::Builder::new()
        .name("event-consumer".to_string())
        .spawn(move || {
            let mut frames: u64 = 0;
            let mut deaths: u64 = 0;
            for event in events.iter() {
                match event {
                    GameEvent::Session(SessionEvent::RenderPermitted) => frames += 1,
                    GameEvent::Session(SessionEvent::Finished) => break,
                    GameEvent::Field(FieldEvent::PlayerDead(info)) => {
                        info!("{} died with max score {}", info.name, info.max_score);
                        deaths += 1;
                    }
                    _ => {}
                }
            }
            (frames, deaths)
        })
        .context("failed to spawn event consumer")?;

    session.start();
    let started = Instant::now();
    let commands = session.command_sender();
    while started.elapsed() < run_for {
        // Steer the human player like a computer player, through the command queue
        if let Some(id) = human {
            let desired = session.with_field(|field| {
                field
                    .player(id)
                    .filter(|p| p.alive)
                    .map(|me| ComputerStrategy::decide(me, field.players(), field.food()))
            });
            if let Some(desired) = desired {
                if let Err(e) = commands.set_velocity(id, desired * SPEED_MULTIPLIER) {
                    warn!("Dropped autopilot command: {}", e);
                }
            }
        }
        thread::sleep(AUTOPILOT_PERIOD);
    }
    session.stop();

    let (frames, deaths) = consumer
        .join()
        .map_err(|_| anyhow::anyhow!("event consumer panicked"))?;

    let leaderboard = session.with_field(|field| {
        let mut players: Vec<PlayerInfo> = field
            .players()
            .iter()
            .map(|p| {
                let mut info = PlayerInfo::from(p);
                info.max_score = info.max_score.max(info.score);
                info
            })
            .collect();
        players.sort_by(|a, b| b.max_score.cmp(&a.max_score));
        players
    });

    info!(
        "Session finished: {} ticks, {} frames, {} deaths",
        session.ticks(),
        frames,
        deaths
    );
    for (rank, player) in leaderboard.iter().enumerate() {
        info!("#{} {} (max score {}, final score {})", rank + 1, player.name, player.max_score, player.score);
    }

    #[cfg(feature = "records")]
    {
        // max_score survives deaths, so the final standings cover every life
        for player in &leaderboard {
            if records.submit(player.name.clone(), player.max_score) {
                info!("New record: {} with {}", player.name, player.max_score);
            }
        }
        records
            .save(&session_config.records_path)
            .with_context(|| format!("failed to save records to {}", session_config.records_path.display()))?;
    }

    info!("Simulation stopped");
    Ok(())
}
