//! Run state and core simulation types
//!
//! One `RunState` per attempt. Everything here is ephemeral: it is created on
//! scene entry and discarded on scene exit, with only the fields that mirror
//! into the progression record ever leaving the run.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::events::Notice;
use super::spawn::SpawnParams;
use super::upgrades::{Passive, UpgradeKind};
use crate::consts::*;

/// Lifecycle state of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    /// Active gameplay
    Playing,
    /// Explicit pause; all timers frozen, only resume accepted
    Paused,
    /// Phase advanced, waiting for the player to pick one of three upgrades.
    /// The run clock does not advance until the pick lands.
    UpgradeChoice,
    /// Run ended; progression flushed, all event processing frozen
    GameOver,
}

/// Difficulty modifier rolled at each phase advance, active for a fixed window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActiveEvent {
    #[default]
    None,
    EnemyRush,
    CoinShower,
    HeavyWave,
    PrecisionWindow,
}

impl ActiveEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActiveEvent::None => "None",
            ActiveEvent::EnemyRush => "Enemy Rush",
            ActiveEvent::CoinShower => "Coin Shower",
            ActiveEvent::HeavyWave => "Heavy Wave",
            ActiveEvent::PrecisionWindow => "Precision Window",
        }
    }
}

/// Per-run stat block. Starts from the `consts` baseline, then passives and
/// upgrades apply additive deltas that never expire.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerStats {
    pub move_speed: f32,
    pub step_size: f32,
    pub dash_cooldown: f32,
    pub dash_distance: f32,
    pub near_miss_bonus: u32,
    pub near_miss_dash_reduction: f32,
    pub coin_score_bonus: u32,
}

impl Default for PlayerStats {
    fn default() -> Self {
        Self {
            move_speed: MOVE_SPEED,
            step_size: STEP_SIZE,
            dash_cooldown: DASH_COOLDOWN,
            dash_distance: DASH_DISTANCE,
            near_miss_bonus: NEAR_MISS_SCORE_BONUS,
            near_miss_dash_reduction: NEAR_MISS_DASH_REDUCTION,
            coin_score_bonus: 0,
        }
    }
}

/// Read-only display snapshot handed to the presentation layer each frame
#[derive(Debug, Clone, PartialEq)]
pub struct HudSnapshot {
    pub score: u32,
    pub health: i32,
    pub coins: u32,
    pub dash_remaining: f32,
    pub phase_number: u32,
    pub event_name: &'static str,
    pub passive_name: &'static str,
}

/// Complete per-attempt state
#[derive(Debug, Clone)]
pub struct RunState {
    /// Run seed for reproducibility
    pub seed: u64,
    /// Run RNG; every roll (passive, event, upgrade offer, spawn variants)
    /// goes through this so a seed fully determines a run
    pub rng: Pcg32,
    pub current_level: u32,
    pub current_phase: u32,
    pub score: u32,
    /// Coins collected this run (display mirror of the durable balance delta)
    pub coins: u32,
    pub health: i32,
    pub phase: RunPhase,
    pub active_event: ActiveEvent,
    /// Deadline for the active event, against `clock`
    pub event_ends_at: f32,
    /// Passive rolled once at run start
    pub passive: Passive,
    pub stats: PlayerStats,
    /// Every 2nd pass scores; see the resolver
    pub enemy_pass_counter: u32,
    /// Run clock in seconds. Frozen while not `Playing`, so all deadlines
    /// below survive pause and upgrade choice without adjustment.
    pub clock: f32,
    pub player_pos: Vec2,
    /// Direction of the most recent movement input; dashes reuse it
    pub last_move_dir: Vec2,
    /// Deadline after which the next dash is accepted
    pub dash_ready_at: f32,
    /// End of the dash invulnerability window
    pub dash_until: f32,
    /// End of the post-hit invulnerability window
    pub invuln_until: f32,
    /// Earliest clock at which another near miss may score
    pub near_miss_ready_at: f32,
    /// Next phase-director fire
    pub next_phase_at: f32,
    /// Pacing parameters published to the external spawner
    pub spawn: SpawnParams,
    /// Open upgrade offer; `Some` exactly while `phase == UpgradeChoice`
    pub pending_upgrades: Option<[UpgradeKind; 3]>,
    /// Seconds until dash is ready, recomputed per tick for the HUD
    pub dash_remaining: f32,
    /// Fire-and-forget feedback requests for the presentation layer
    notices: Vec<Notice>,
}

impl RunState {
    /// Start a fresh attempt at the given level: reset run-scoped fields,
    /// roll the passive, arm the phase timer.
    pub fn new(level: u32, seed: u64) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let passive = Passive::roll(&mut rng);
        let mut stats = PlayerStats::default();
        let mut health = STARTING_HEALTH;
        passive.apply(&mut stats, &mut health);

        log::info!(
            "Run start: level {}, seed {}, passive {}",
            level,
            seed,
            passive.as_str()
        );

        Self {
            seed,
            rng,
            current_level: level.max(1),
            current_phase: 1,
            score: 0,
            coins: 0,
            health,
            phase: RunPhase::Playing,
            active_event: ActiveEvent::None,
            event_ends_at: 0.0,
            passive,
            stats,
            enemy_pass_counter: 0,
            clock: 0.0,
            player_pos: Vec2::new(FIELD_WIDTH / 2.0, FIELD_HEIGHT / 2.0),
            last_move_dir: Vec2::X,
            dash_ready_at: 0.0,
            dash_until: 0.0,
            invuln_until: 0.0,
            near_miss_ready_at: 0.0,
            next_phase_at: PHASE_INTERVAL,
            spawn: SpawnParams::default(),
            pending_upgrades: None,
            dash_remaining: 0.0,
            notices: Vec::new(),
        }
    }

    /// True while any invulnerability window (post-hit or dash) is open
    pub fn is_invulnerable(&self) -> bool {
        self.clock < self.invuln_until || self.is_dashing()
    }

    /// True during the dash i-frame window
    pub fn is_dashing(&self) -> bool {
        self.clock < self.dash_until
    }

    pub fn push_notice(&mut self, notice: Notice) {
        self.notices.push(notice);
    }

    /// Drain accumulated feedback requests (called by the host once per frame)
    pub fn drain_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    pub fn hud(&self) -> HudSnapshot {
        HudSnapshot {
            score: self.score,
            health: self.health.max(0),
            coins: self.coins,
            dash_remaining: self.dash_remaining,
            phase_number: self.current_phase,
            event_name: self.active_event.as_str(),
            passive_name: self.passive.as_str(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_run_starts_playing_with_armed_phase_timer() {
        let state = RunState::new(3, 42);
        assert_eq!(state.phase, RunPhase::Playing);
        assert_eq!(state.current_level, 3);
        assert_eq!(state.current_phase, 1);
        assert_eq!(state.active_event, ActiveEvent::None);
        assert_eq!(state.next_phase_at, PHASE_INTERVAL);
        assert!(state.health >= STARTING_HEALTH);
    }

    #[test]
    fn test_same_seed_rolls_same_passive() {
        let a = RunState::new(1, 777);
        let b = RunState::new(1, 777);
        assert_eq!(a.passive, b.passive);
    }

    #[test]
    fn test_level_floor() {
        let state = RunState::new(0, 1);
        assert_eq!(state.current_level, 1);
    }

    #[test]
    fn test_hud_clamps_negative_health_for_display() {
        let mut state = RunState::new(1, 1);
        state.health = -2;
        assert_eq!(state.hud().health, 0);
    }
}
