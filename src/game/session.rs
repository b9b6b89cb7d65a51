//! Session scheduler: lifecycle state machine and the fixed-rate ticker
//!
//! The ticker runs on its own thread and blocks on a condition variable
//! while the session is not active. Inbound commands are queued and applied
//! between frames; field events and a render permit are published after
//! each frame.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::Receiver;
use parking_lot::{Condvar, Mutex};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace};

use crate::config::SessionConfig;
use crate::game::command_buffer::{CommandBuffer, CommandBufferError, CommandSender, FieldCommand};
use crate::game::constants::session::STATS_LOG_INTERVAL;
use crate::game::events::{EventBus, GameEvent, SessionEvent};
use crate::game::field::GameField;
use crate::game::player::PlayerId;
use crate::game::timestep::FixedTimestep;
use crate::util::vec2::Vec2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    Active,
    Paused,
    /// Initial state; the next start resets the field
    StoppedNeedsReset,
}

struct Control {
    state: SessionState,
    shutdown: bool,
    /// Bumped on every start that reset the field, so the ticker drops its lag
    epoch: u64,
}

struct Shared {
    // Lock order: control, then field, then the bus. Lifecycle events are
    // published under the control lock so they precede the next frame.
    control: Mutex<Control>,
    gate: Condvar,
    field: Mutex<GameField>,
    bus: EventBus,
    commands: CommandBuffer,
    ticks: AtomicU64,
}

/// Owns a game field and drives it at a fixed tick rate
pub struct GameSession {
    shared: Arc<Shared>,
    ticker: Option<JoinHandle<()>>,
}

impl GameSession {
    /// Wrap `field` and spawn the (initially parked) ticker thread
    pub fn new(field: GameField, config: SessionConfig) -> std::io::Result<Self> {
        let shared = Arc::new(Shared {
            control: Mutex::new(Control {
                state: SessionState::StoppedNeedsReset,
                shutdown: false,
                epoch: 0,
            }),
            gate: Condvar::new(),
            field: Mutex::new(field),
            bus: EventBus::new(),
            commands: CommandBuffer::new(config.command_buffer_capacity),
            ticks: AtomicU64::new(0),
        });

        let ticker_shared = Arc::clone(&shared);
        let ticker = thread::Builder::new()
            .name("field-ticker".to_string())
            .spawn(move || run_ticker(ticker_shared, config))?;

        Ok(Self {
            shared,
            ticker: Some(ticker),
        })
    }

    pub fn state(&self) -> SessionState {
        self.shared.control.lock().state
    }

    /// Ticks simulated since the session was created
    pub fn ticks(&self) -> u64 {
        self.shared.ticks.load(Ordering::Relaxed)
    }

    /// Enter `Active` from any other state, resetting the field first when
    /// coming from `StoppedNeedsReset`. Returns false when already active.
    pub fn start(&self) -> bool {
        let mut control = self.shared.control.lock();
        match control.state {
            SessionState::Active => return false,
            SessionState::StoppedNeedsReset => {
                let events = {
                    let mut field = self.shared.field.lock();
                    field.reset();
                    field.drain_events()
                };
                control.epoch += 1;
                self.shared.bus.publish_all(events);
            }
            SessionState::Paused => {}
        }
        control.state = SessionState::Active;
        self.shared.bus.publish(SessionEvent::Started);
        drop(control);

        self.shared.gate.notify_all();
        info!("Session started");
        true
    }

    /// `Active` -> `Paused`
    pub fn pause(&self) -> bool {
        self.transition(SessionState::Active, SessionState::Paused, SessionEvent::Paused)
    }

    /// `Paused` -> `Active`
    pub fn resume(&self) -> bool {
        let resumed = self.transition(SessionState::Paused, SessionState::Active, SessionEvent::Resumed);
        if resumed {
            self.shared.gate.notify_all();
        }
        resumed
    }

    /// Any state -> `StoppedNeedsReset`; a no-op when already stopped
    pub fn stop(&self) -> bool {
        let mut control = self.shared.control.lock();
        if control.state == SessionState::StoppedNeedsReset {
            return false;
        }
        control.state = SessionState::StoppedNeedsReset;
        self.shared.bus.publish(SessionEvent::Finished);
        drop(control);

        info!("Session stopped");
        true
    }

    fn transition(&self, from: SessionState, to: SessionState, event: SessionEvent) -> bool {
        let mut control = self.shared.control.lock();
        if control.state != from {
            return false;
        }
        control.state = to;
        self.shared.bus.publish(event);
        drop(control);

        debug!("Session {:?} -> {:?}", from, to);
        true
    }

    /// Receive every session and field event from now on
    pub fn subscribe(&self) -> Receiver<GameEvent> {
        self.shared.bus.subscribe()
    }

    /// Producer handle for input threads
    pub fn command_sender(&self) -> CommandSender {
        self.shared.commands.sender()
    }

    /// Queue a desired velocity, applied before the next frame's ticks
    pub fn set_player_velocity(&self, player: PlayerId, velocity: Vec2) -> Result<(), CommandBufferError> {
        self.shared.commands.sender().set_velocity(player, velocity)
    }

    /// Queue a split request, applied before the next frame's ticks
    pub fn request_split(&self, player: PlayerId) -> Result<(), CommandBufferError> {
        self.shared.commands.sender().split(player)
    }

    pub fn add_player(&self, name: impl Into<String>) -> PlayerId {
        self.mutate_field(|field| field.add_player(name))
    }

    pub fn add_computer_player(&self, name: impl Into<String>) -> PlayerId {
        self.mutate_field(|field| field.add_computer_player(name))
    }

    pub fn create_food(&self, count: usize) -> usize {
        self.mutate_field(|field| field.create_food(count))
    }

    pub fn rename_player(&self, player: PlayerId, name: impl Into<String>) -> bool {
        self.shared.field.lock().rename_player(player, name)
    }

    /// Run `f` against the field between frames
    pub fn with_field<R>(&self, f: impl FnOnce(&GameField) -> R) -> R {
        f(&self.shared.field.lock())
    }

    /// Structural changes take the field lock, so they land between frames.
    /// Events go out before the lock is released to keep field order.
    fn mutate_field<R>(&self, f: impl FnOnce(&mut GameField) -> R) -> R {
        let mut field = self.shared.field.lock();
        let result = f(&mut field);
        self.shared.bus.publish_all(field.drain_events());
        result
    }
}

impl Drop for GameSession {
    fn drop(&mut self) {
        self.shared.control.lock().shutdown = true;
        self.shared.gate.notify_all();
        if let Some(ticker) = self.ticker.take() {
            if ticker.join().is_err() {
                tracing::error!("Ticker thread panicked");
            }
        }
    }
}

fn apply_command(field: &mut GameField, command: FieldCommand) {
    let applied = match command {
        FieldCommand::SetVelocity { player, velocity } => field.set_player_velocity(player, velocity),
        FieldCommand::Split { player } => field.request_split(player),
    };
    if !applied {
        trace!("Ignored command for player {}", command.player());
    }
}

fn run_ticker(shared: Arc<Shared>, config: SessionConfig) {
    let mut timestep = FixedTimestep::new(config.tick_rate, config.max_lag_seconds);
    let dt = timestep.period() as f32;
    let frame_interval = Duration::from_millis(config.frame_interval_ms);
    let started = Instant::now();
    let mut last_frame = Instant::now();
    let mut last_stats = Instant::now();
    let mut seen_epoch = 0;

    info!("Ticker ready at {} Hz", config.tick_rate);

    loop {
        {
            let mut control = shared.control.lock();
            let mut waited = false;
            while control.state != SessionState::Active && !control.shutdown {
                shared.gate.wait(&mut control);
                waited = true;
            }
            if control.shutdown {
                break;
            }
            // Time spent parked is not simulated
            if waited {
                last_frame = Instant::now();
            }
            if control.epoch != seen_epoch {
                seen_epoch = control.epoch;
                timestep.reset();
            }
        }

        let now = Instant::now();
        let ticks = timestep.accumulate(now.duration_since(last_frame).as_secs_f64());
        last_frame = now;

        let stats = {
            let mut field = shared.field.lock();
            let pending = shared.commands.pending_count();
            if pending > 0 {
                trace!("Applying {} queued commands", pending);
            }
            for command in shared.commands.drain() {
                apply_command(&mut field, command);
            }
            for _ in 0..ticks {
                field.update(dt);
            }
            shared.bus.publish_all(field.drain_events());
            field.stats()
        };
        let total_ticks = shared.ticks.fetch_add(ticks as u64, Ordering::Relaxed) + ticks as u64;
        shared.bus.publish(SessionEvent::RenderPermitted);

        if last_stats.elapsed().as_secs_f32() >= STATS_LOG_INTERVAL {
            last_stats = Instant::now();
            info!(
                "Session: {}s, tick {}, {}/{} players alive, {} cells, {} food, {} subscribers",
                started.elapsed().as_secs(),
                total_ticks,
                stats.alive,
                stats.players,
                stats.cells,
                stats.food,
                shared.bus.subscriber_count()
            );
        }

        thread::sleep(frame_interval);
    }

    info!("Ticker stopped after {} ticks", shared.ticks.load(Ordering::Relaxed));
}
