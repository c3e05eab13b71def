//! Discrete gameplay events and their resolution
//!
//! The host's collision layer observes passes and contacts and delivers them
//! here as a tagged union; the resolver maps each one to a run-state delta.
//! Every handler checks the lifecycle flags first: nothing mutates while the
//! run is paused, choosing an upgrade, or over.

use glam::Vec2;

use super::spawn::{CoinKind, EnemyKind};
use super::state::{ActiveEvent, RunPhase, RunState};
use crate::consts::*;
use crate::progression::{KvStore, ProgressionStore};

/// One discrete gameplay event, delivered synchronously by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    /// Enemy exited the play field un-intercepted
    EnemyPassed,
    /// Enemy touched the player
    EnemyContact { kind: EnemyKind },
    /// Player picked up a coin
    CoinContact { kind: CoinKind },
    /// Enemy passed through the near band without touching (host pre-checks
    /// with `classify_proximity`)
    NearMiss,
}

/// Fire-and-forget feedback request for the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    NearMissPopup,
    DamageFlash,
    DashFlash,
    CoinPickup { kind: CoinKind },
    PhaseUp { phase: u32 },
    EventStarted { event: ActiveEvent },
}

/// Navigation request for the external scene/menu collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneRequest {
    RestartRun,
    AdvanceLevel,
    ReturnToMenu,
}

/// Where an enemy sits relative to the player's two radii
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Proximity {
    /// Inside the collision radius; takes precedence over the near band
    Collision,
    /// Inside the near band but outside the collision radius
    NearMiss,
    Clear,
}

/// Classify an enemy position against the core's distance thresholds.
///
/// Both boundaries are inclusive on their inner side: distance exactly at
/// the collision radius is a collision (never also a near miss), distance
/// exactly at the near radius still counts as a near miss.
pub fn classify_proximity(player_pos: Vec2, enemy_pos: Vec2) -> Proximity {
    let dist = player_pos.distance(enemy_pos);
    if dist <= COLLISION_RADIUS {
        Proximity::Collision
    } else if dist <= NEAR_MISS_RADIUS {
        Proximity::NearMiss
    } else {
        Proximity::Clear
    }
}

/// Resolve one event into its state delta. Returns a scene request when the
/// event ends the level.
pub fn apply_event<S: KvStore>(
    state: &mut RunState,
    store: &mut ProgressionStore<S>,
    event: GameEvent,
) -> Option<SceneRequest> {
    // Lifecycle guard: drop everything outside active play
    if state.phase != RunPhase::Playing {
        return None;
    }

    match event {
        GameEvent::EnemyPassed => {
            state.enemy_pass_counter += 1;
            // Only every 2nd pass scores; halved pacing is intentional
            if state.enemy_pass_counter % 2 == 0 {
                state.score += 1;
            }
            if state.score >= SCORE_TO_PASS {
                return Some(advance_level(state, store));
            }
        }

        GameEvent::EnemyContact { kind } => {
            if state.is_invulnerable() {
                return None;
            }
            state.health -= kind.damage().max(1);
            if state.health <= 0 {
                enter_game_over(state, store);
            } else {
                state.invuln_until = state.clock + CONTACT_INVULN;
                state.push_notice(Notice::DamageFlash);
            }
        }

        GameEvent::CoinContact { kind } => {
            state.score += kind.score_value() + state.stats.coin_score_bonus;
            state.coins += kind.coin_value();
            store.collect_coin(kind.coin_value());
            state.push_notice(Notice::CoinPickup { kind });
        }

        GameEvent::NearMiss => {
            if state.clock < state.near_miss_ready_at {
                return None;
            }
            state.score += state.stats.near_miss_bonus;
            // Shave the pending dash cooldown, never past "ready now"
            if state.dash_ready_at > state.clock {
                state.dash_ready_at =
                    (state.dash_ready_at - state.stats.near_miss_dash_reduction).max(state.clock);
            }
            state.near_miss_ready_at = state.clock + NEAR_MISS_COOLDOWN;
            state.push_notice(Notice::NearMissPopup);
        }
    }

    None
}

/// Level complete: bump the level, reset the score, unlock and persist, then
/// hand the scene swap to the host.
fn advance_level<S: KvStore>(
    state: &mut RunState,
    store: &mut ProgressionStore<S>,
) -> SceneRequest {
    store.unlock_next_level(state.current_level);
    state.current_level += 1;
    state.score = 0;
    store.begin_run(state.current_level);
    log::info!("Level complete, advancing to level {}", state.current_level);
    SceneRequest::AdvanceLevel
}

/// Terminal transition: flush progression once and freeze event processing.
fn enter_game_over<S: KvStore>(state: &mut RunState, store: &mut ProgressionStore<S>) {
    state.phase = RunPhase::GameOver;
    store.flush_run(state.score, state.current_phase);
    log::info!(
        "Game over: level {}, phase {}, score {}, coins {}",
        state.current_level,
        state.current_phase,
        state.score,
        state.coins
    );
}
