//! Round Session
//!
//! Single owner of a round. Taps, timer ticks and motion samples arrive as
//! commands on one queue and are applied in arrival order, so the round is
//! never touched from two places at once. Events fan out on a broadcast
//! channel and to the injected collaborators.
//!
//! ```text
//!  taps ─────────┐
//!  motion ───────┼──▶ mpsc ──▶ RoundSession ──▶ broadcast<RoundEvent>
//!  interval tick ┘               │
//!                                ├──▶ ScenePresenter
//!                                ├──▶ EffectSink
//!                                └──▶ RecordStore
//! ```

use std::time::Duration;

use chrono::NaiveDate;
use serde::{Serialize, Deserialize};
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info};

use crate::core::hash::StateHash;
use crate::core::rng::derive_round_seed;
use crate::game::config::ConfigError;
use crate::game::events::{RoundEvent, RoundEventKind};
use crate::game::item::{Item, ItemId};
use crate::game::motion::{AccelerationSample, MotionConfig, MotionSensor, ShakeDetector, UnavailableSensor};
use crate::game::state::{RoundPhase, RoundState};
use crate::game::theme::ThemeConfig;
use crate::game::tray::TraySlot;
use crate::services::effects::{dispatch_effect, EffectSink, NullEffects, SoundEffect};
use crate::services::records::{MemoryRecordStore, RecordStore};
use crate::services::scene::{present_events, NullScene, ScenePresenter};
use crate::services::settings::GameSettings;

// =============================================================================
// CONFIG & ERRORS
// =============================================================================

/// Session tuning.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Countdown tick period.
    pub tick_interval: Duration,
    /// Command queue depth.
    pub command_capacity: usize,
    /// Event broadcast buffer.
    pub event_capacity: usize,
    /// Shake detector tuning (sensitivity comes from settings).
    pub motion: MotionConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_secs(1),
            command_capacity: 64,
            event_capacity: 256,
            motion: MotionConfig::default(),
        }
    }
}

/// Session errors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SessionError {
    /// The session task is gone.
    #[error("Session closed")]
    Closed,

    /// No round has been started.
    #[error("No active round")]
    NoActiveRound,

    /// The round configuration was rejected.
    #[error("Invalid round configuration: {0}")]
    Config(#[from] ConfigError),
}

// =============================================================================
// COMMANDS
// =============================================================================

/// Point-in-time view of the round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundSnapshot {
    /// Phase
    pub phase: RoundPhase,
    /// Score
    pub score: u32,
    /// Seconds left
    pub time_remaining: u32,
    /// Clears so far
    pub elimination_count: u32,
    /// Clears needed
    pub target_eliminations: u32,
    /// Shakes so far
    pub shake_count: u32,
    /// Items in the pot
    pub items: Vec<Item>,
    /// Tray contents, oldest first
    pub tray: Vec<TraySlot>,
    /// Shake accepted right now
    pub shake_ready: bool,
    /// Sensor present
    pub motion_available: bool,
    /// Round fingerprint
    pub hash: StateHash,
}

/// Work for the session task.
#[derive(Debug)]
pub enum SessionCommand {
    /// Start a round at a difficulty tier.
    Start {
        /// Tier
        level: u32,
        /// Outcome
        reply: oneshot::Sender<Result<(), ConfigError>>,
    },
    /// Pause the round.
    Pause,
    /// Resume the round.
    Resume,
    /// Tear the round down.
    End,
    /// Player tapped an item.
    Select {
        /// Tapped item
        item_id: ItemId,
        /// Whether the tray took it
        reply: oneshot::Sender<bool>,
    },
    /// Shake button pressed.
    ManualShake,
    /// One accelerometer reading.
    Motion(AccelerationSample),
    /// Advance round and detector clocks (seconds).
    Advance(f64),
    /// Use another theme from the next round on.
    SetTheme {
        /// New theme
        theme: ThemeConfig,
        /// Day it applies to
        date: NaiveDate,
    },
    /// Read the round.
    Snapshot {
        /// `None` before the first round
        reply: oneshot::Sender<Option<RoundSnapshot>>,
    },
    /// Stop the task.
    Shutdown,
}

// =============================================================================
// SESSION
// =============================================================================

/// Owns one round and its collaborators.
pub struct RoundSession {
    config: SessionConfig,
    state: RoundState,
    detector: ShakeDetector,
    theme: ThemeConfig,
    date: NaiveDate,
    settings: GameSettings,
    scene: Box<dyn ScenePresenter>,
    effects: Box<dyn EffectSink>,
    records: Box<dyn RecordStore>,
    sensor: Box<dyn MotionSensor>,
    event_tx: broadcast::Sender<RoundEvent>,
    /// Countdown (re)started since the task last looked; the timer
    /// restarts its period from here
    clock_restarted: bool,
}

impl RoundSession {
    /// Session for `theme` on `date` with headless collaborators.
    pub fn new(theme: ThemeConfig, date: NaiveDate, settings: GameSettings, config: SessionConfig) -> Self {
        let (event_tx, _) = broadcast::channel(config.event_capacity.max(1));
        let detector = ShakeDetector::new(settings.motion_config(config.motion));
        let state = RoundState::with_palette(0, theme.item_types.clone());

        Self {
            config,
            state,
            detector,
            theme,
            date,
            settings,
            scene: Box::new(NullScene),
            effects: Box::new(NullEffects),
            records: Box::new(MemoryRecordStore::new(date)),
            sensor: Box::new(UnavailableSensor),
            event_tx,
            clock_restarted: false,
        }
    }

    /// Use a presenter.
    pub fn with_scene(mut self, scene: impl ScenePresenter + 'static) -> Self {
        self.scene = Box::new(scene);
        self
    }

    /// Use an audio/haptics sink.
    pub fn with_effects(mut self, effects: impl EffectSink + 'static) -> Self {
        self.effects = Box::new(effects);
        self
    }

    /// Use a record store.
    pub fn with_records(mut self, records: impl RecordStore + 'static) -> Self {
        self.records = Box::new(records);
        self
    }

    /// Use an accelerometer.
    pub fn with_sensor(mut self, sensor: impl MotionSensor + 'static) -> Self {
        self.sensor = Box::new(sensor);
        self
    }

    /// The round.
    pub fn state(&self) -> &RoundState {
        &self.state
    }

    /// The shake detector.
    pub fn detector(&self) -> &ShakeDetector {
        &self.detector
    }

    /// Active theme.
    pub fn theme(&self) -> &ThemeConfig {
        &self.theme
    }

    /// Subscribe to round events.
    pub fn subscribe(&self) -> broadcast::Receiver<RoundEvent> {
        self.event_tx.subscribe()
    }

    /// Current view of the round, or `None` before the first round.
    pub fn snapshot(&self) -> Option<RoundSnapshot> {
        if self.state.rounds_started == 0 {
            return None;
        }
        Some(RoundSnapshot {
            phase: self.state.phase,
            score: self.state.score,
            time_remaining: self.state.time_remaining,
            elimination_count: self.state.elimination_count,
            target_eliminations: self.state.config.target_eliminations,
            shake_count: self.state.shake_count,
            items: self.state.items.clone(),
            tray: self.state.tray.slots().to_vec(),
            shake_ready: self.state.is_playing() && !self.detector.is_on_cooldown(),
            motion_available: self.detector.is_available(),
            hash: self.state.compute_hash(),
        })
    }

    // -------------------------------------------------------------------------
    // Command handling
    // -------------------------------------------------------------------------

    /// Apply one command. Returns false once the session should stop.
    pub fn handle(&mut self, command: SessionCommand) -> bool {
        match command {
            SessionCommand::Start { level, reply } => {
                let result = self.start_round(level);
                self.clock_restarted |= result.is_ok();
                let _ = reply.send(result);
            }
            SessionCommand::Pause => {
                if self.state.pause() {
                    self.detector.stop_monitoring();
                }
            }
            SessionCommand::Resume => {
                if self.state.resume() {
                    self.clock_restarted = true;
                    self.start_motion();
                }
            }
            SessionCommand::End => self.end_round(),
            SessionCommand::Select { item_id, reply } => {
                let accepted = self.state.select_item(item_id);
                let _ = reply.send(accepted);
            }
            SessionCommand::ManualShake => {
                if self.state.is_playing() && self.detector.trigger_manual().is_some() {
                    self.state.trigger_shake();
                }
            }
            SessionCommand::Motion(sample) => {
                if self.state.is_playing() && self.detector.process_sample(sample).is_some() {
                    self.state.trigger_shake();
                }
            }
            SessionCommand::Advance(delta) => self.advance(delta),
            SessionCommand::SetTheme { theme, date } => {
                info!(theme = %theme.name, %date, "Theme set for next round");
                self.theme = theme;
                self.date = date;
            }
            SessionCommand::Snapshot { reply } => {
                let _ = reply.send(self.snapshot());
            }
            SessionCommand::Shutdown => {
                self.end_round();
                return false;
            }
        }

        self.flush();
        true
    }

    fn start_round(&mut self, level: u32) -> Result<(), ConfigError> {
        let seed = derive_round_seed(self.date, self.theme.id, level);
        let mut next = RoundState::with_palette(seed, self.theme.item_types.clone());
        next.start(level)?;

        // Close out the previous round first so its events go out in order
        self.end_round();
        self.flush();

        self.state = next;
        self.detector.reset_cooldown();
        self.start_motion();
        info!(theme = %self.theme.name, level, seed, "Session round started");
        Ok(())
    }

    fn end_round(&mut self) {
        let was_running = self.state.phase != RoundPhase::Idle;
        self.state.end();
        self.detector.stop_monitoring();
        if was_running {
            self.scene.clear();
        }
    }

    fn start_motion(&mut self) {
        if self.settings.use_button_instead_of_shake {
            return;
        }
        self.detector.start_monitoring(&*self.sensor);
    }

    fn advance(&mut self, delta: f64) {
        self.state.advance_time(delta);
        self.detector.advance_time(delta);

        if !self.state.is_playing() {
            return;
        }
        for _ in self.detector.poll_sensor(&mut *self.sensor) {
            self.state.trigger_shake();
        }
    }

    /// Forward queued round events to collaborators and subscribers.
    fn flush(&mut self) {
        let events = self.state.take_events();
        if events.is_empty() {
            return;
        }

        present_events(&mut *self.scene, &self.state, &events);

        for event in &events {
            if let Some(effect) = SoundEffect::for_event(&event.kind) {
                dispatch_effect(&mut *self.effects, effect, &self.settings);
            }
            self.record(&event.kind);
        }

        for event in events {
            // No subscribers is fine
            let _ = self.event_tx.send(event);
        }
    }

    fn record(&mut self, kind: &RoundEventKind) {
        match kind {
            RoundEventKind::Eliminated { .. } => self.records.record_elimination(),
            RoundEventKind::Shaken { .. } => self.records.record_shake(),
            RoundEventKind::RoundWon { score, time_remaining } => {
                let elapsed = self.state.elapsed();
                self.records.record_round_result(*score, *time_remaining, self.theme.id, self.date);
                self.records.record_win(elapsed, self.state.shake_count == 0);
                self.records.record_play_time(elapsed);
                self.records.unlock_reward(&self.theme.unlock_reward_id, self.theme.id, *score, self.date);
                self.detector.stop_monitoring();
            }
            RoundEventKind::RoundLost { score, time_remaining, .. } => {
                self.records.record_round_result(*score, *time_remaining, self.theme.id, self.date);
                self.records.record_play_time(self.state.elapsed());
                self.detector.stop_monitoring();
            }
            _ => {}
        }
    }

    // -------------------------------------------------------------------------
    // Task
    // -------------------------------------------------------------------------

    /// Run on the tokio runtime. The task hands the session back when it stops.
    pub fn spawn(self) -> (SessionHandle, JoinHandle<RoundSession>) {
        let (tx, rx) = mpsc::channel(self.config.command_capacity.max(1));
        let handle = SessionHandle {
            tx,
            events: self.event_tx.clone(),
        };
        let task = tokio::spawn(self.run(rx));
        (handle, task)
    }

    async fn run(mut self, mut rx: mpsc::Receiver<SessionCommand>) -> Self {
        let period = self.config.tick_interval;
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // First tick completes immediately
        ticker.tick().await;

        loop {
            tokio::select! {
                command = rx.recv() => {
                    let command = command.unwrap_or(SessionCommand::Shutdown);
                    if !self.handle(command) {
                        break;
                    }
                    // A full period must pass before the first second comes off
                    if std::mem::take(&mut self.clock_restarted) {
                        ticker.reset();
                    }
                }
                _ = ticker.tick() => {
                    self.handle(SessionCommand::Advance(period.as_secs_f64()));
                }
            }
        }

        debug!("Session task stopped");
        self
    }
}

// =============================================================================
// HANDLE
// =============================================================================

/// Cloneable front end to a spawned session.
#[derive(Clone)]
pub struct SessionHandle {
    tx: mpsc::Sender<SessionCommand>,
    events: broadcast::Sender<RoundEvent>,
}

impl SessionHandle {
    async fn send(&self, command: SessionCommand) -> Result<(), SessionError> {
        self.tx.send(command).await.map_err(|_| SessionError::Closed)
    }

    /// Subscribe to round events.
    pub fn subscribe(&self) -> broadcast::Receiver<RoundEvent> {
        self.events.subscribe()
    }

    /// Start a round at a difficulty tier.
    pub async fn start(&self, level: u32) -> Result<(), SessionError> {
        let (reply, rx) = oneshot::channel();
        self.send(SessionCommand::Start { level, reply }).await?;
        rx.await.map_err(|_| SessionError::Closed)??;
        Ok(())
    }

    /// Tap an item. Returns whether the tray took it.
    pub async fn select(&self, item_id: ItemId) -> Result<bool, SessionError> {
        let (reply, rx) = oneshot::channel();
        self.send(SessionCommand::Select { item_id, reply }).await?;
        rx.await.map_err(|_| SessionError::Closed)
    }

    /// Read the round.
    pub async fn snapshot(&self) -> Result<RoundSnapshot, SessionError> {
        let (reply, rx) = oneshot::channel();
        self.send(SessionCommand::Snapshot { reply }).await?;
        rx.await
            .map_err(|_| SessionError::Closed)?
            .ok_or(SessionError::NoActiveRound)
    }

    /// Pause the round.
    pub async fn pause(&self) -> Result<(), SessionError> {
        self.send(SessionCommand::Pause).await
    }

    /// Resume the round.
    pub async fn resume(&self) -> Result<(), SessionError> {
        self.send(SessionCommand::Resume).await
    }

    /// Tear the round down.
    pub async fn end(&self) -> Result<(), SessionError> {
        self.send(SessionCommand::End).await
    }

    /// Shake button.
    pub async fn manual_shake(&self) -> Result<(), SessionError> {
        self.send(SessionCommand::ManualShake).await
    }

    /// Feed an accelerometer reading.
    pub async fn motion(&self, sample: AccelerationSample) -> Result<(), SessionError> {
        self.send(SessionCommand::Motion(sample)).await
    }

    /// Advance clocks by `delta` seconds.
    pub async fn advance(&self, delta: f64) -> Result<(), SessionError> {
        self.send(SessionCommand::Advance(delta)).await
    }

    /// Use another theme from the next round on.
    pub async fn set_theme(&self, theme: ThemeConfig, date: NaiveDate) -> Result<(), SessionError> {
        self.send(SessionCommand::SetTheme { theme, date }).await
    }

    /// Stop the session task.
    pub async fn shutdown(&self) -> Result<(), SessionError> {
        self.send(SessionCommand::Shutdown).await
    }
}
