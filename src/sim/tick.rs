//! Fixed timestep run tick
//!
//! One call per rendering frame: resolve the frame's delivered events first,
//! then dash and movement bookkeeping, then the deadline-driven timers
//! (active event expiry, phase director). Timers are absolute deadlines
//! compared against the run clock, which only advances while `Playing`, so
//! pause and the upgrade freeze need no rescheduling.

use glam::Vec2;
use rand::Rng;

use super::events::{GameEvent, Notice, SceneRequest, apply_event};
use super::state::{ActiveEvent, RunPhase, RunState};
use super::upgrades::{apply_upgrade, offer_upgrades};
use crate::consts::*;
use crate::progression::{KvStore, ProgressionStore};

/// Input commands for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Held movement direction (from key state), if any
    pub move_dir: Option<Vec2>,
    /// Dash request (one-shot)
    pub dash: bool,
    /// Pause toggle (one-shot)
    pub pause: bool,
    /// Index into the open upgrade offer (0..3), if the player picked
    pub choose_upgrade: Option<usize>,
}

/// Advance the run by one fixed timestep.
///
/// `events` are the contact/pass events the host's collision layer observed
/// since the last tick, in delivery order. They are applied before movement
/// and clamping, so a contact's damage is never undone by the same tick's
/// position fixup.
pub fn tick<S: KvStore>(
    state: &mut RunState,
    store: &mut ProgressionStore<S>,
    input: &TickInput,
    events: &[GameEvent],
    dt: f32,
) -> Option<SceneRequest> {
    // Pause toggle: Playing <-> Paused only
    if input.pause {
        match state.phase {
            RunPhase::Playing => {
                state.phase = RunPhase::Paused;
                return None;
            }
            RunPhase::Paused => state.phase = RunPhase::Playing,
            _ => {}
        }
    }

    // Upgrade pick resolves the freeze and resumes play on the same tick
    if state.phase == RunPhase::UpgradeChoice {
        if let (Some(index), Some(offer)) = (input.choose_upgrade, state.pending_upgrades) {
            if let Some(&choice) = offer.get(index) {
                apply_upgrade(choice, state);
                state.pending_upgrades = None;
                state.phase = RunPhase::Playing;
            }
        }
    }

    // Clock frozen outside active play
    if state.phase != RunPhase::Playing {
        return None;
    }

    state.clock += dt;

    // Resolve this frame's events before any movement bookkeeping
    for &event in events {
        if let Some(request) = apply_event(state, store, event) {
            return Some(request);
        }
    }
    if state.phase != RunPhase::Playing {
        // A contact ended the run mid-frame
        return None;
    }

    if input.dash {
        try_dash(state);
    }

    // Movement integration, then field clamp
    if let Some(dir) = input.move_dir {
        if dir != Vec2::ZERO {
            let dir = dir.normalize();
            state.player_pos += dir * state.stats.move_speed * dt;
            state.last_move_dir = dir;
        }
    }
    state.player_pos = crate::clamp_to_field(state.player_pos);

    // Active event runs out on its deadline
    if state.active_event != ActiveEvent::None && state.clock >= state.event_ends_at {
        state.active_event = ActiveEvent::None;
    }

    // Phase director
    if state.clock >= state.next_phase_at {
        advance_phase(state);
    }

    // Dash readiness for the HUD
    state.dash_remaining = (state.dash_ready_at - state.clock).max(0.0);

    None
}

/// Dash: fails silently while dashing or cooling down; otherwise a fixed
/// positional offset along the last movement direction plus a short
/// i-frame window. Independent of frame rate.
fn try_dash(state: &mut RunState) {
    if state.is_dashing() || state.clock < state.dash_ready_at {
        return;
    }
    state.dash_ready_at = state.clock + state.stats.dash_cooldown;
    state.dash_until = state.clock + DASH_INVULN;
    state.player_pos += state.last_move_dir * state.stats.dash_distance;
    state.push_notice(Notice::DashFlash);
}

/// Phase advance: escalate difficulty, roll a fresh modifier event, open a
/// three-way upgrade offer, and freeze the run until the player picks.
fn advance_phase(state: &mut RunState) {
    state.current_phase += 1;
    state.spawn.escalate();

    const EVENTS: [ActiveEvent; 4] = [
        ActiveEvent::EnemyRush,
        ActiveEvent::CoinShower,
        ActiveEvent::HeavyWave,
        ActiveEvent::PrecisionWindow,
    ];
    state.active_event = EVENTS[state.rng.random_range(0..EVENTS.len())];
    state.event_ends_at = state.clock + EVENT_DURATION;
    state.next_phase_at = state.clock + PHASE_INTERVAL;

    let offer = offer_upgrades(&mut state.rng);
    state.pending_upgrades = Some(offer);
    state.phase = RunPhase::UpgradeChoice;

    state.push_notice(Notice::PhaseUp {
        phase: state.current_phase,
    });
    state.push_notice(Notice::EventStarted {
        event: state.active_event,
    });
    log::info!(
        "Phase {}: spawn interval {:.2}s, enemy speed {:.0}, event {}",
        state.current_phase,
        state.spawn.interval,
        state.spawn.enemy_speed,
        state.active_event.as_str()
    );
}

/// Game-over exit: start a fresh attempt at the same unlocked level.
/// Returns `None` unless the run is actually over.
pub fn continue_run<S: KvStore>(
    state: &mut RunState,
    store: &mut ProgressionStore<S>,
) -> Option<(RunState, SceneRequest)> {
    if state.phase != RunPhase::GameOver {
        return None;
    }
    let seed: u64 = state.rng.random();
    store.begin_run(state.current_level);
    Some((
        RunState::new(state.current_level, seed),
        SceneRequest::RestartRun,
    ))
}

/// Game-over exit: hand control back to the external menu.
pub fn quit_to_menu(state: &RunState) -> Option<SceneRequest> {
    if state.phase != RunPhase::GameOver {
        return None;
    }
    Some(SceneRequest::ReturnToMenu)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progression::MemoryStore;
    use crate::sim::spawn::EnemyKind;

    fn setup() -> (RunState, ProgressionStore<MemoryStore>) {
        (RunState::new(1, 42), ProgressionStore::open(MemoryStore::new()))
    }

    fn pause_input() -> TickInput {
        TickInput {
            pause: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_pause_toggle_freezes_clock() {
        let (mut state, mut store) = setup();
        tick(&mut state, &mut store, &pause_input(), &[], SIM_DT);
        assert_eq!(state.phase, RunPhase::Paused);

        let frozen = state.clock;
        for _ in 0..100 {
            tick(&mut state, &mut store, &TickInput::default(), &[], SIM_DT);
        }
        assert_eq!(state.clock, frozen);

        tick(&mut state, &mut store, &pause_input(), &[], SIM_DT);
        assert_eq!(state.phase, RunPhase::Playing);
        assert!(state.clock > frozen);
    }

    #[test]
    fn test_paused_rejects_movement_and_dash() {
        let (mut state, mut store) = setup();
        tick(&mut state, &mut store, &pause_input(), &[], SIM_DT);
        let pos = state.player_pos;
        let input = TickInput {
            move_dir: Some(Vec2::X),
            dash: true,
            ..Default::default()
        };
        tick(&mut state, &mut store, &input, &[], SIM_DT);
        assert_eq!(state.player_pos, pos);
    }

    #[test]
    fn test_dash_displaces_and_cools_down() {
        let (mut state, mut store) = setup();
        let start = state.player_pos;
        let input = TickInput {
            dash: true,
            ..Default::default()
        };
        tick(&mut state, &mut store, &input, &[], SIM_DT);
        let after_first = state.player_pos;
        assert!((after_first.x - start.x - state.stats.dash_distance).abs() < 1.0);
        assert!(state.is_invulnerable());

        // Second dash inside the cooldown is a silent no-op
        tick(&mut state, &mut store, &input, &[], SIM_DT);
        assert_eq!(state.player_pos, after_first);
    }

    #[test]
    fn test_dash_ready_again_after_cooldown() {
        let (mut state, mut store) = setup();
        let input = TickInput {
            dash: true,
            ..Default::default()
        };
        tick(&mut state, &mut store, &input, &[], SIM_DT);
        let cooldown_ticks = (state.stats.dash_cooldown / SIM_DT).ceil() as u32 + 1;
        for _ in 0..cooldown_ticks {
            tick(&mut state, &mut store, &TickInput::default(), &[], SIM_DT);
        }
        let pos = state.player_pos;
        tick(&mut state, &mut store, &input, &[], SIM_DT);
        assert!(state.player_pos.x > pos.x);
    }

    #[test]
    fn test_movement_clamps_to_field() {
        let (mut state, mut store) = setup();
        let input = TickInput {
            move_dir: Some(Vec2::new(1.0, 0.0)),
            ..Default::default()
        };
        for _ in 0..5000 {
            tick(&mut state, &mut store, &input, &[], SIM_DT);
        }
        assert_eq!(state.player_pos.x, FIELD_WIDTH - PLAYER_HALF_EXTENT);
    }

    #[test]
    fn test_phase_director_fires_and_freezes_for_choice() {
        let (mut state, mut store) = setup();
        let ticks = (PHASE_INTERVAL / SIM_DT).ceil() as u32 + 1;
        for _ in 0..ticks {
            tick(&mut state, &mut store, &TickInput::default(), &[], SIM_DT);
        }
        assert_eq!(state.phase, RunPhase::UpgradeChoice);
        assert_eq!(state.current_phase, 2);
        assert_ne!(state.active_event, ActiveEvent::None);
        assert!(state.pending_upgrades.is_some());
        assert!(state.spawn.interval < SPAWN_INTERVAL_START);
        assert!(state.spawn.enemy_speed > ENEMY_SPEED_START);

        // Frozen until the pick: clock holds, events are dropped
        let frozen = state.clock;
        tick(
            &mut state,
            &mut store,
            &TickInput::default(),
            &[GameEvent::EnemyPassed],
            SIM_DT,
        );
        assert_eq!(state.clock, frozen);
        assert_eq!(state.enemy_pass_counter, 0);

        // Picking resumes play and clears the offer
        let input = TickInput {
            choose_upgrade: Some(0),
            ..Default::default()
        };
        tick(&mut state, &mut store, &input, &[], SIM_DT);
        assert_eq!(state.phase, RunPhase::Playing);
        assert!(state.pending_upgrades.is_none());
        assert!(state.clock > frozen);
    }

    #[test]
    fn test_active_event_expires_on_deadline() {
        let (mut state, mut store) = setup();
        state.active_event = ActiveEvent::CoinShower;
        state.event_ends_at = state.clock + 0.05;
        for _ in 0..10 {
            tick(&mut state, &mut store, &TickInput::default(), &[], SIM_DT);
        }
        assert_eq!(state.active_event, ActiveEvent::None);
    }

    #[test]
    fn test_fatal_contact_stops_the_tick() {
        let (mut state, mut store) = setup();
        state.health = 1;
        let input = TickInput {
            move_dir: Some(Vec2::X),
            ..Default::default()
        };
        let pos = state.player_pos;
        tick(
            &mut state,
            &mut store,
            &input,
            &[GameEvent::EnemyContact { kind: EnemyKind::Basic }],
            SIM_DT,
        );
        assert_eq!(state.phase, RunPhase::GameOver);
        // No movement after the run ended mid-frame
        assert_eq!(state.player_pos, pos);
    }

    #[test]
    fn test_continue_and_quit_only_from_game_over() {
        let (mut state, mut store) = setup();
        assert!(continue_run(&mut state, &mut store).is_none());
        assert!(quit_to_menu(&state).is_none());

        state.current_level = 3;
        state.phase = RunPhase::GameOver;
        let (fresh, request) = continue_run(&mut state, &mut store).unwrap();
        assert_eq!(request, SceneRequest::RestartRun);
        assert_eq!(fresh.current_level, 3);
        assert_eq!(fresh.phase, RunPhase::Playing);
        assert_eq!(fresh.score, 0);
        assert_eq!(quit_to_menu(&state), Some(SceneRequest::ReturnToMenu));
    }

    #[test]
    fn test_determinism_for_equal_seeds() {
        let mut a = RunState::new(1, 99999);
        let mut b = RunState::new(1, 99999);
        let mut store_a = ProgressionStore::open(MemoryStore::new());
        let mut store_b = ProgressionStore::open(MemoryStore::new());

        let input = TickInput {
            move_dir: Some(Vec2::new(0.3, -0.7)),
            ..Default::default()
        };
        let ticks = (PHASE_INTERVAL / SIM_DT).ceil() as u32 + 10;
        for _ in 0..ticks {
            tick(&mut a, &mut store_a, &input, &[], SIM_DT);
            tick(&mut b, &mut store_b, &input, &[], SIM_DT);
        }
        assert_eq!(a.passive, b.passive);
        assert_eq!(a.active_event, b.active_event);
        assert_eq!(a.pending_upgrades, b.pending_upgrades);
        assert_eq!(a.player_pos, b.player_pos);
    }
}
