//! Deterministic run simulation
//!
//! All gameplay logic lives here. This module must stay pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Timers as absolute deadlines against the run clock
//! - No rendering or platform dependencies

pub mod events;
pub mod spawn;
pub mod state;
pub mod tick;
pub mod upgrades;

pub use events::{GameEvent, Notice, Proximity, SceneRequest, apply_event, classify_proximity};
pub use spawn::{CoinKind, EnemyKind, SpawnParams, roll_coin_kind, roll_enemy_kind};
pub use state::{ActiveEvent, HudSnapshot, PlayerStats, RunPhase, RunState};
pub use tick::{TickInput, continue_run, quit_to_menu, tick};
pub use upgrades::{Passive, UpgradeKind, apply_upgrade, offer_upgrades};
