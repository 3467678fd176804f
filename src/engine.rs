//! Game state machine
//!
//! `Arcade` owns the live `SimulationState` and drives it through
//! Idle → Playing ⇄ Paused → (GameOver | Victory) → Idle. Adapters only read
//! snapshots and submit intents; the simulation is never touched directly.
//!
//! Scheduling is cancellation-safe: every session carries a generation, and
//! the `TickToken` handed out by `start` goes stale as soon as the session is
//! reset or replaced. A stale tick is a no-op.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::Serialize;

use crate::consts::{MAX_FRAME_DT, MAX_SUBSTEPS};
use crate::error::StartError;
use crate::host::{ArcadeHost, SessionResult};
use crate::palette::palette_for;
use crate::settings::ArcadeSettings;
use crate::sim::{
    Direction, Entity, GameEvent, GameKind, GamePhase, Intent, Level, Outcome, Ruleset,
    SimulationState, StepReport, TickInput, accepts_turn, step,
};

/// Handle for one scheduled session; stale after reset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickToken {
    generation: u64,
}

/// Read-only view for render adapters
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot<'a> {
    pub phase: GamePhase,
    pub kind: GameKind,
    pub level: Option<&'a Level>,
    /// Player first, then enemies, then uncollected collectibles
    pub entities: Vec<&'a Entity>,
    pub score: u64,
    pub lives: u8,
    pub camera_offset: f32,
    pub invulnerable: bool,
}

/// One arcade cabinet: a game kind, its settings and the host it reports to
pub struct Arcade<H: ArcadeHost> {
    kind: GameKind,
    settings: ArcadeSettings,
    host: H,
    phase: GamePhase,
    state: Option<SimulationState>,
    /// Level prepared by the last reset, used by the next start
    staged: Option<(u64, Level)>,
    /// Latest intent, read at the start of the next tick
    pending: Option<Intent>,
    /// Horizontal direction held down (platformer)
    held: Option<Direction>,
    generation: u64,
    accumulator: f32,
    seeds: Pcg32,
}

impl<H: ArcadeHost> Arcade<H> {
    pub fn new(kind: GameKind, settings: ArcadeSettings, host: H, seed: u64) -> Self {
        Self {
            kind,
            settings,
            host,
            phase: GamePhase::Idle,
            state: None,
            staged: None,
            pending: None,
            held: None,
            generation: 0,
            accumulator: 0.0,
            seeds: Pcg32::seed_from_u64(seed),
        }
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn kind(&self) -> GameKind {
        self.kind
    }

    pub fn settings(&self) -> &ArcadeSettings {
        &self.settings
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// Live simulation state (None while Idle)
    pub fn state(&self) -> Option<&SimulationState> {
        self.state.as_ref()
    }

    /// Fixed simulation period in seconds
    pub fn tick_seconds(&self) -> f32 {
        self.kind.tick_ms(&self.settings) as f32 / 1000.0
    }

    /// Pay the play cost and begin a session
    ///
    /// Starting while a session is active replaces it (implicit reset). When
    /// the host refuses the cost nothing changes.
    pub fn start(&mut self) -> Result<TickToken, StartError> {
        let cost = self.settings.play_cost;
        if !self.host.spend_play_cost(cost) {
            log::warn!("Start blocked: cannot pay {} token(s)", cost);
            return Err(StartError::InsufficientTokens { cost });
        }

        if self.phase != GamePhase::Idle {
            log::info!("Restarting {} (implicit reset)", self.kind.as_str());
        }
        let (seed, level) = match self.staged.take() {
            Some(staged) => staged,
            None => self.generate_level(),
        };

        self.generation += 1;
        self.pending = None;
        self.held = None;
        self.accumulator = 0.0;
        let palette = palette_for(self.host.player_avatar().as_ref());
        self.state = Some(
            SimulationState::new(self.kind, level, &self.settings, seed).with_palette(palette),
        );
        self.set_phase(GamePhase::Playing);

        Ok(TickToken {
            generation: self.generation,
        })
    }

    /// Back to Idle with a freshly generated level; cancels pending ticks
    pub fn reset(&mut self) {
        self.generation += 1;
        self.state = None;
        self.pending = None;
        self.held = None;
        self.accumulator = 0.0;
        self.staged = Some(self.generate_level());
        self.set_phase(GamePhase::Idle);
    }

    fn generate_level(&mut self) -> (u64, Level) {
        let seed: u64 = self.seeds.random();
        let avatar = self.host.player_avatar();
        let palette = palette_for(avatar.as_ref());
        let mut rng = Pcg32::seed_from_u64(seed);
        let level = self.kind.generate_level(&mut rng, &self.settings, palette);
        log::debug!("Prepared level '{}' (seed {})", level.name, seed);
        (seed, level)
    }

    /// Record an intent for the next tick (last write wins)
    ///
    /// Grid turns that reverse the current heading are dropped here so they
    /// cannot overwrite a valid pending turn.
    pub fn submit_input(&mut self, intent: Intent) {
        if let (Intent::Move(dir), Some(state)) = (intent, &self.state) {
            match state.ruleset {
                Ruleset::Grid(_) => {
                    if !accepts_turn(state.player.heading(), dir) {
                        log::trace!("Dropped reversing turn {:?}", dir);
                        return;
                    }
                }
                Ruleset::Physics(_) => {
                    if dir.horizontal() != 0.0 {
                        self.held = Some(dir);
                    }
                }
            }
        }
        self.pending = Some(intent);
    }

    /// Key released; stops a held platformer run
    pub fn release_input(&mut self, dir: Direction) {
        if self.held == Some(dir) {
            self.held = None;
        }
    }

    /// Run one simulation step for the session `token` belongs to
    pub fn tick(&mut self, token: TickToken) -> StepReport {
        if token.generation != self.generation {
            log::trace!("Ignoring stale tick");
            return StepReport::default();
        }

        let intent = self.pending.take();
        if intent == Some(Intent::PauseToggle) {
            self.toggle_pause();
            return StepReport::default();
        }
        if self.phase != GamePhase::Playing {
            return StepReport::default();
        }
        let Some(state) = self.state.as_mut() else {
            return StepReport::default();
        };

        let input = match state.ruleset {
            Ruleset::Grid(_) => TickInput::from_intent(intent),
            // Running comes only from the held key; Up is a jump, Down does nothing
            Ruleset::Physics(_) => TickInput {
                direction: self.held,
                jump: matches!(intent, Some(Intent::Jump | Intent::Move(Direction::Up))),
            },
        };

        let report = step(state, &input, self.kind.tick_ms(&self.settings));
        if let Some(outcome) = report.outcome {
            self.finish(outcome);
        }
        report
    }

    /// Feed one frame's elapsed time; runs as many fixed ticks as are due
    pub fn advance(&mut self, token: TickToken, frame_dt: f32) -> Vec<GameEvent> {
        let mut events = Vec::new();
        if token.generation != self.generation {
            return events;
        }

        let tick_dt = self.tick_seconds();
        self.accumulator += frame_dt.clamp(0.0, MAX_FRAME_DT);

        let mut substeps = 0;
        while self.accumulator >= tick_dt && substeps < MAX_SUBSTEPS {
            let report = self.tick(token);
            events.extend(report.events);
            self.accumulator -= tick_dt;
            substeps += 1;

            if self.phase.is_terminal() {
                self.accumulator = 0.0;
                break;
            }
        }
        // Drop backlog the substep cap could not absorb
        self.accumulator = self.accumulator.min(tick_dt * MAX_SUBSTEPS as f32);
        events
    }

    fn toggle_pause(&mut self) {
        match self.phase {
            GamePhase::Playing => self.set_phase(GamePhase::Paused),
            GamePhase::Paused => {
                self.accumulator = 0.0;
                self.set_phase(GamePhase::Playing);
            }
            _ => {}
        }
    }

    fn finish(&mut self, outcome: Outcome) {
        let score = self.state.as_ref().map_or(0, |s| s.score);
        self.set_phase(match outcome {
            Outcome::Victory => GamePhase::Victory,
            Outcome::GameOver => GamePhase::GameOver,
        });
        self.pending = None;
        self.host.report_session_result(SessionResult {
            game: self.kind,
            score,
            outcome,
        });
    }

    fn set_phase(&mut self, phase: GamePhase) {
        if phase != self.phase {
            log::info!(
                "{}: {:?} -> {:?}",
                self.kind.as_str(),
                self.phase,
                phase
            );
            self.phase = phase;
        }
    }

    /// Current state for rendering
    pub fn snapshot(&self) -> Snapshot<'_> {
        let Some(state) = &self.state else {
            return Snapshot {
                phase: self.phase,
                kind: self.kind,
                level: self.staged.as_ref().map(|(_, level)| level),
                entities: Vec::new(),
                score: 0,
                lives: 0,
                camera_offset: 0.0,
                invulnerable: false,
            };
        };

        let entities = std::iter::once(&state.player)
            .chain(&state.enemies)
            .chain(state.level.collectibles.iter().filter(|c| !c.is_collected()))
            .collect();

        Snapshot {
            phase: self.phase,
            kind: self.kind,
            level: Some(&state.level),
            entities,
            score: state.score,
            lives: state.lives,
            camera_offset: state.camera_offset,
            invulnerable: state.is_invulnerable(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{LocalHost, TokenWallet};
    use crate::sim::Behavior;

    fn arcade(kind: GameKind, tokens: u32) -> Arcade<LocalHost> {
        let host = LocalHost::new(None, TokenWallet::new(tokens));
        Arcade::new(kind, ArcadeSettings::default(), host, 7)
    }

    #[test]
    fn test_blocked_start_stays_idle() {
        let mut arcade = arcade(GameKind::Maze, 0);
        let err = arcade.start().unwrap_err();
        assert_eq!(err, StartError::InsufficientTokens { cost: 1 });
        assert_eq!(arcade.phase(), GamePhase::Idle);
        assert!(arcade.state().is_none());
    }

    #[test]
    fn test_start_spends_once() {
        let mut arcade = arcade(GameKind::Maze, 3);
        arcade.start().unwrap();
        assert_eq!(arcade.phase(), GamePhase::Playing);
        assert_eq!(arcade.host().wallet.balance, 2);
        assert!(arcade.state().is_some());
    }

    #[test]
    fn test_stale_token_is_noop() {
        let mut arcade = arcade(GameKind::Snake, 3);
        let token = arcade.start().unwrap();
        arcade.tick(token);
        assert_eq!(arcade.state().unwrap().time_ticks, 1);

        arcade.reset();
        assert_eq!(arcade.phase(), GamePhase::Idle);
        assert!(arcade.state().is_none());

        let fresh = arcade.start().unwrap();
        arcade.tick(token);
        assert_eq!(arcade.state().unwrap().time_ticks, 0);
        arcade.tick(fresh);
        assert_eq!(arcade.state().unwrap().time_ticks, 1);
    }

    #[test]
    fn test_restart_is_implicit_reset() {
        let mut arcade = arcade(GameKind::Maze, 3);
        let first = arcade.start().unwrap();
        let second = arcade.start().unwrap();
        assert_ne!(first, second);
        assert_eq!(arcade.host().wallet.balance, 1);
        assert!(arcade.host().results.is_empty());
        assert_eq!(arcade.advance(first, 1.0), Vec::new());
    }

    #[test]
    fn test_pause_freezes_simulation() {
        let mut arcade = arcade(GameKind::Snake, 1);
        let token = arcade.start().unwrap();
        arcade.submit_input(Intent::PauseToggle);
        arcade.tick(token);
        assert_eq!(arcade.phase(), GamePhase::Paused);

        let before = arcade.state().unwrap().clone();
        for _ in 0..10 {
            arcade.tick(token);
        }
        let after = arcade.state().unwrap();
        assert_eq!(after.time_ticks, before.time_ticks);
        assert_eq!(after.player, before.player);

        arcade.submit_input(Intent::PauseToggle);
        arcade.tick(token);
        assert_eq!(arcade.phase(), GamePhase::Playing);
        arcade.tick(token);
        assert_eq!(arcade.state().unwrap().time_ticks, before.time_ticks + 1);
    }

    #[test]
    fn test_reversal_dropped_at_submit() {
        let mut arcade = arcade(GameKind::Snake, 1);
        let token = arcade.start().unwrap();
        arcade.submit_input(Intent::Move(Direction::Up));
        arcade.submit_input(Intent::Move(Direction::Left));
        arcade.tick(token);
        assert_eq!(arcade.state().unwrap().player.heading(), Some(Direction::Up));
    }

    #[test]
    fn test_terminal_reports_once() {
        let mut arcade = arcade(GameKind::Platformer, 1);
        let token = arcade.start().unwrap();
        if let Some(state) = arcade.state.as_mut() {
            state.player.bounds.y = 10_000.0;
            if let Behavior::Player { grounded, .. } = &mut state.player.behavior {
                *grounded = false;
            }
        }

        arcade.tick(token);
        assert_eq!(arcade.phase(), GamePhase::GameOver);
        for _ in 0..5 {
            arcade.tick(token);
        }
        arcade.advance(token, 0.25);
        assert_eq!(arcade.host().results.len(), 1);
        assert_eq!(arcade.host().results[0].outcome, Outcome::GameOver);
        // Final state stays readable until reset
        assert!(arcade.state().is_some());
    }

    #[test]
    fn test_advance_runs_due_ticks() {
        let mut arcade = arcade(GameKind::Maze, 1);
        let token = arcade.start().unwrap();
        // 150ms period
        arcade.advance(token, 0.1);
        assert_eq!(arcade.state().unwrap().time_ticks, 0);
        arcade.advance(token, 0.1);
        assert_eq!(arcade.state().unwrap().time_ticks, 1);
    }

    #[test]
    fn test_advance_caps_substeps() {
        let mut arcade = arcade(GameKind::Platformer, 1);
        let token = arcade.start().unwrap();
        for _ in 0..4 {
            arcade.advance(token, 10.0);
        }
        assert!(arcade.state().unwrap().time_ticks <= 4 * u64::from(MAX_SUBSTEPS));
    }

    #[test]
    fn test_held_direction_runs_platformer() {
        let mut arcade = arcade(GameKind::Platformer, 1);
        let token = arcade.start().unwrap();
        let x = arcade.state().unwrap().player.bounds.x;
        arcade.submit_input(Intent::Move(Direction::Right));
        for _ in 0..10 {
            arcade.tick(token);
        }
        assert!(arcade.state().unwrap().player.bounds.x > x);

        arcade.release_input(Direction::Right);
        for _ in 0..60 {
            arcade.tick(token);
        }
        assert_eq!(arcade.state().unwrap().player.vel.x, 0.0);
    }

    #[test]
    fn test_jump_keeps_held_run() {
        let mut arcade = arcade(GameKind::Platformer, 1);
        let token = arcade.start().unwrap();
        arcade.submit_input(Intent::Move(Direction::Right));
        for _ in 0..30 {
            arcade.tick(token);
        }
        let before = arcade.state().unwrap().player.vel;
        assert_eq!(before.x, crate::consts::MAX_RUN_SPEED);

        arcade.submit_input(Intent::Move(Direction::Up));
        arcade.tick(token);
        let after = arcade.state().unwrap().player.vel;
        assert!(after.x >= before.x);
        assert!(after.y < 0.0);

        // Down neither jumps nor brakes
        let mut arcade = self::arcade(GameKind::Platformer, 1);
        let token = arcade.start().unwrap();
        arcade.submit_input(Intent::Move(Direction::Right));
        for _ in 0..30 {
            arcade.tick(token);
        }
        let before = arcade.state().unwrap().player.vel;
        arcade.submit_input(Intent::Move(Direction::Down));
        arcade.tick(token);
        let after = arcade.state().unwrap().player.vel;
        assert!(after.x >= before.x);
        assert_eq!(after.y, 0.0);
        assert!(arcade.state().unwrap().player.is_grounded());
    }

    #[test]
    fn test_advance_keeps_pace_with_frames() {
        let mut arcade = arcade(GameKind::Platformer, 1);
        let token = arcade.start().unwrap();
        for _ in 0..60 {
            arcade.advance(token, 1.0 / 60.0);
        }
        let sim_ms = arcade.state().unwrap().time_ms;
        let tick_ms = u64::from(GameKind::Platformer.tick_ms(arcade.settings()));
        // One second of frames is one second of simulation, give or take a tick
        assert!(sim_ms + tick_ms >= 1000, "sim ran {} ms", sim_ms);
        assert!(sim_ms <= 1000);
    }

    #[test]
    fn test_snapshot_lists_player_first() {
        let mut arcade = arcade(GameKind::Maze, 1);
        let idle = arcade.snapshot();
        assert_eq!(idle.phase, GamePhase::Idle);
        assert!(idle.entities.is_empty());

        arcade.start().unwrap();
        let snap = arcade.snapshot();
        let state = arcade.state().unwrap();
        assert_eq!(snap.entities[0].id, state.player.id);
        assert_eq!(
            snap.entities.len(),
            1 + state.enemies.len() + state.level.remaining_collectibles()
        );
        assert_eq!(snap.lives, state.lives);
        assert!(serde_json::to_string(&snap).is_ok());
    }

    #[test]
    fn test_reset_stages_level() {
        let mut arcade = arcade(GameKind::Maze, 1);
        arcade.reset();
        let staged = arcade.snapshot().level.cloned();
        assert!(staged.is_some());
        arcade.start().unwrap();
        assert_eq!(Some(&arcade.state().unwrap().level), staged.as_ref());
    }
}
