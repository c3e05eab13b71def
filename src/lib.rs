//! Pixel Dodge - run and progression core for a pixel-art dodge game
//!
//! Core modules:
//! - `sim`: Deterministic run simulation (event resolution, phase director, upgrades)
//! - `progression`: Durable progression record and key-value persistence
//!
//! Rendering, physics broad-phase, input dispatch, and scene transitions are
//! host concerns. The host drives this crate with one `tick` per frame plus
//! the discrete contact/pass events its collision layer observed, and reads
//! back HUD snapshots, feedback notices, and scene requests.

pub mod progression;
pub mod sim;

pub use progression::{JsonFileStore, KvStore, MemoryStore, ProgressionRecord, ProgressionStore};
pub use sim::{GameEvent, RunPhase, RunState, SceneRequest, TickInput, tick};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (120 Hz, matches the host frame pacing)
    pub const SIM_DT: f32 = 1.0 / 120.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Play-field dimensions
    pub const FIELD_WIDTH: f32 = 800.0;
    pub const FIELD_HEIGHT: f32 = 600.0;
    /// Player sprite half-extent (32x32 sprite)
    pub const PLAYER_HALF_EXTENT: f32 = 16.0;

    /// Score threshold that completes the current level
    pub const SCORE_TO_PASS: u32 = 20;
    /// Starting health before the Survivor passive
    pub const STARTING_HEALTH: i32 = 3;

    /// Player movement
    pub const MOVE_SPEED: f32 = 220.0;
    pub const STEP_SIZE: f32 = 20.0;

    /// Dash defaults
    pub const DASH_COOLDOWN: f32 = 1.5;
    /// Lower bound the DashCooldown upgrade cannot cross
    pub const DASH_COOLDOWN_MIN: f32 = 0.4;
    pub const DASH_DISTANCE: f32 = 90.0;
    /// Invulnerability window granted by a dash
    pub const DASH_INVULN: f32 = 0.18;

    /// Invulnerability window granted after taking a hit
    pub const CONTACT_INVULN: f32 = 1.0;

    /// Near-miss band: inside COLLISION_RADIUS is a hit, inside
    /// NEAR_MISS_RADIUS (but outside COLLISION_RADIUS) is a near miss
    pub const COLLISION_RADIUS: f32 = 24.0;
    pub const NEAR_MISS_RADIUS: f32 = 48.0;
    /// Re-trigger lockout so a lingering enemy scores one near miss, not one per frame
    pub const NEAR_MISS_COOLDOWN: f32 = 0.8;
    pub const NEAR_MISS_SCORE_BONUS: u32 = 1;
    /// Seconds shaved off the pending dash cooldown per near miss
    pub const NEAR_MISS_DASH_REDUCTION: f32 = 0.2;

    /// Phase director
    pub const PHASE_INTERVAL: f32 = 15.0;
    pub const EVENT_DURATION: f32 = 10.0;

    /// Spawn pacing published to the external spawner
    pub const SPAWN_INTERVAL_START: f32 = 1.0;
    pub const SPAWN_INTERVAL_STEP: f32 = 0.05;
    pub const SPAWN_INTERVAL_MIN: f32 = 0.35;
    pub const ENEMY_SPEED_START: f32 = 160.0;
    pub const ENEMY_SPEED_STEP: f32 = 10.0;
    pub const ENEMY_SPEED_MAX: f32 = 320.0;
}

/// Clamp a player position to the play field, keeping the full sprite inside.
///
/// Pure function of field size and sprite half-extent; the host's physics
/// layer never moves the player, only this clamp does.
#[inline]
pub fn clamp_to_field(pos: Vec2) -> Vec2 {
    use crate::consts::*;
    Vec2::new(
        pos.x.clamp(PLAYER_HALF_EXTENT, FIELD_WIDTH - PLAYER_HALF_EXTENT),
        pos.y.clamp(PLAYER_HALF_EXTENT, FIELD_HEIGHT - PLAYER_HALF_EXTENT),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;

    #[test]
    fn test_clamp_keeps_sprite_inside_field() {
        let p = clamp_to_field(Vec2::new(-50.0, 1000.0));
        assert_eq!(p.x, PLAYER_HALF_EXTENT);
        assert_eq!(p.y, FIELD_HEIGHT - PLAYER_HALF_EXTENT);

        let mid = Vec2::new(FIELD_WIDTH / 2.0, FIELD_HEIGHT / 2.0);
        assert_eq!(clamp_to_field(mid), mid);
    }
}
