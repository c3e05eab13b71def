//! Pixel Dodge headless demo
//!
//! Plays a scripted run against a stand-in spawner/collision host and prints
//! the outcome. Exercises the full core loop: spawn pacing, event delivery,
//! phase advances, upgrade picks, progression persistence.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use pixel_dodge::consts::*;
use pixel_dodge::progression::{JsonFileStore, ProgressionStore};
use pixel_dodge::sim::{
    GameEvent, RunPhase, RunState, SceneRequest, TickInput, continue_run, roll_coin_kind,
    roll_enemy_kind, tick,
};

/// Stand-in for the host's spawner and collision layer: tracks abstract
/// enemies by their field-crossing deadline and rolls each outcome.
struct ScriptedHost {
    rng: Pcg32,
    next_spawn_at: f32,
    next_coin_at: f32,
    clock: f32,
    crossings: Vec<(f32, pixel_dodge::sim::EnemyKind)>,
}

impl ScriptedHost {
    fn new(seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
            next_spawn_at: 0.0,
            next_coin_at: 3.0,
            clock: 0.0,
            crossings: Vec::new(),
        }
    }

    /// Produce this frame's events from the core's published spawn params.
    fn step(&mut self, state: &RunState, dt: f32) -> Vec<GameEvent> {
        let mut events = Vec::new();
        if state.phase != RunPhase::Playing {
            return events;
        }
        self.clock += dt;

        if self.clock >= self.next_spawn_at {
            self.next_spawn_at = self.clock + state.spawn.interval;
            let kind = roll_enemy_kind(&mut self.rng, state.current_phase, state.active_event);
            let crossing_time = FIELD_WIDTH / state.spawn.enemy_speed;
            self.crossings.push((self.clock + crossing_time, kind));
        }

        if self.clock >= self.next_coin_at {
            self.next_coin_at = self.clock + 3.0;
            if self.rng.random_range(0..2) == 0 {
                let kind = roll_coin_kind(&mut self.rng, state.active_event);
                events.push(GameEvent::CoinContact { kind });
            }
        }

        let clock = self.clock;
        let mut resolved = Vec::new();
        self.crossings.retain(|&(at, kind)| {
            if at <= clock {
                resolved.push(kind);
                false
            } else {
                true
            }
        });
        for kind in resolved {
            // Scripted dodging: most enemies pass, some graze, a few connect
            match self.rng.random_range(0..10) {
                0 => events.push(GameEvent::EnemyContact { kind }),
                1 | 2 => events.push(GameEvent::NearMiss),
                _ => events.push(GameEvent::EnemyPassed),
            }
        }
        events
    }
}

fn main() {
    env_logger::init();

    let seed: u64 = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(0xD0D6E);

    let save_path = std::env::temp_dir().join("pixel-dodge-demo-save.json");
    let mut store = ProgressionStore::open(JsonFileStore::open(&save_path));

    let mut state = RunState::new(store.record().saved_level, seed);
    store.begin_run(state.current_level);
    let mut host = ScriptedHost::new(seed ^ 0x5EED);

    let mut input = TickInput::default();
    let mut continues_left = 1;

    // A few minutes of simulated play, tops
    for frame in 0..(5 * 60 * 120) {
        let events = host.step(&state, SIM_DT);

        // Scripted player: drift vertically, dash now and then, always take
        // the first upgrade on offer
        input.move_dir = Some(Vec2::new(0.0, if frame % 2400 < 1200 { 1.0 } else { -1.0 }));
        input.dash = frame % 600 == 0;
        input.choose_upgrade = state.pending_upgrades.map(|_| 0);

        let request = tick(&mut state, &mut store, &input, &events, SIM_DT);

        for notice in state.drain_notices() {
            log::debug!("notice: {:?}", notice);
        }

        match request {
            Some(SceneRequest::AdvanceLevel) => {
                println!(
                    "Level {} cleared at phase {} (coins banked: {})",
                    state.current_level - 1,
                    state.current_phase,
                    state.coins
                );
                state = RunState::new(state.current_level, host.rng.random());
            }
            Some(other) => log::debug!("scene request: {:?}", other),
            None => {}
        }

        if state.phase == RunPhase::GameOver {
            let hud = state.hud();
            println!(
                "Game over on level {}: score {}, phase {}, coins {}",
                state.current_level, hud.score, hud.phase_number, hud.coins
            );
            if continues_left > 0 {
                continues_left -= 1;
                if let Some((fresh, _)) = continue_run(&mut state, &mut store) {
                    println!("Continuing at level {}", fresh.current_level);
                    state = fresh;
                    host = ScriptedHost::new(host.rng.random());
                }
            } else {
                break;
            }
        }
    }

    let record = store.record();
    println!(
        "Progression: high score {}, unlocked level {}, best phase {}, total coins {}",
        record.high_score, record.unlocked_level, record.best_phase, record.total_coins
    );
}
