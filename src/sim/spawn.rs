//! Spawn policy surface
//!
//! The core never moves an enemy or a coin. It publishes pacing parameters
//! for the host's spawner and rolls entity variants with the run RNG; the
//! host owns trajectories, lifetimes, and collision geometry, and reports
//! back pass/contact events.

use rand::Rng;
use rand_pcg::Pcg32;

use super::state::ActiveEvent;
use crate::consts::{ENEMY_SPEED_START, SPAWN_INTERVAL_START};

/// Pacing parameters the external spawner reads after every phase advance
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnParams {
    /// Seconds between enemy spawns
    pub interval: f32,
    /// Horizontal enemy speed in px/s
    pub enemy_speed: f32,
}

impl Default for SpawnParams {
    fn default() -> Self {
        Self {
            interval: SPAWN_INTERVAL_START,
            enemy_speed: ENEMY_SPEED_START,
        }
    }
}

impl SpawnParams {
    /// Phase-advance difficulty step: tighter spawn interval, faster
    /// enemies, both bounded.
    pub fn escalate(&mut self) {
        use crate::consts::{
            ENEMY_SPEED_MAX, ENEMY_SPEED_STEP, SPAWN_INTERVAL_MIN, SPAWN_INTERVAL_STEP,
        };
        self.interval = (self.interval - SPAWN_INTERVAL_STEP).max(SPAWN_INTERVAL_MIN);
        self.enemy_speed = (self.enemy_speed + ENEMY_SPEED_STEP).min(ENEMY_SPEED_MAX);
    }
}

/// Enemy variant; the numbers ride along into the contact event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnemyKind {
    Basic,
    Fast,
    Heavy,
    Zigzag,
}

impl EnemyKind {
    pub fn score_value(&self) -> u32 {
        match self {
            EnemyKind::Basic | EnemyKind::Fast => 1,
            EnemyKind::Heavy | EnemyKind::Zigzag => 2,
        }
    }

    pub fn damage(&self) -> i32 {
        match self {
            EnemyKind::Basic | EnemyKind::Fast | EnemyKind::Zigzag => 1,
            EnemyKind::Heavy => 2,
        }
    }
}

/// Coin variant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoinKind {
    Normal,
    Large,
    Risky,
}

impl CoinKind {
    pub fn score_value(&self) -> u32 {
        match self {
            CoinKind::Normal => 1,
            CoinKind::Large => 2,
            CoinKind::Risky => 5,
        }
    }

    pub fn coin_value(&self) -> u32 {
        match self {
            CoinKind::Normal => 1,
            CoinKind::Large => 5,
            CoinKind::Risky => 10,
        }
    }
}

/// Roll the next enemy variant. Later phases widen the pool; the active
/// event biases it.
pub fn roll_enemy_kind(rng: &mut Pcg32, phase: u32, event: ActiveEvent) -> EnemyKind {
    // Event bias first: rushes lean fast, heavy waves lean heavy
    match event {
        ActiveEvent::EnemyRush if rng.random_range(0..2) == 0 => return EnemyKind::Fast,
        ActiveEvent::HeavyWave if rng.random_range(0..2) == 0 => return EnemyKind::Heavy,
        _ => {}
    }

    // Pool grows with phase: Fast at 2, Zigzag at 3, Heavy at 4
    let pool: &[EnemyKind] = match phase {
        1 => &[EnemyKind::Basic],
        2 => &[EnemyKind::Basic, EnemyKind::Fast],
        3 => &[EnemyKind::Basic, EnemyKind::Fast, EnemyKind::Zigzag],
        _ => &[
            EnemyKind::Basic,
            EnemyKind::Fast,
            EnemyKind::Zigzag,
            EnemyKind::Heavy,
        ],
    };
    pool[rng.random_range(0..pool.len())]
}

/// Roll the next coin variant: Normal common, Large uncommon, Risky rare.
/// Coin showers lean toward the larger variants.
pub fn roll_coin_kind(rng: &mut Pcg32, event: ActiveEvent) -> CoinKind {
    let roll = rng.random_range(0..100);
    if event == ActiveEvent::CoinShower {
        match roll {
            0..50 => CoinKind::Normal,
            50..85 => CoinKind::Large,
            _ => CoinKind::Risky,
        }
    } else {
        match roll {
            0..75 => CoinKind::Normal,
            75..95 => CoinKind::Large,
            _ => CoinKind::Risky,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_phase_one_only_spawns_basic() {
        let mut rng = Pcg32::seed_from_u64(1);
        for _ in 0..100 {
            assert_eq!(
                roll_enemy_kind(&mut rng, 1, ActiveEvent::None),
                EnemyKind::Basic
            );
        }
    }

    #[test]
    fn test_heavy_requires_phase_four() {
        let mut rng = Pcg32::seed_from_u64(2);
        for _ in 0..200 {
            assert_ne!(
                roll_enemy_kind(&mut rng, 3, ActiveEvent::None),
                EnemyKind::Heavy
            );
        }
        // At phase 4 the heavy variant shows up within a reasonable sample
        let seen_heavy = (0..200)
            .any(|_| roll_enemy_kind(&mut rng, 4, ActiveEvent::None) == EnemyKind::Heavy);
        assert!(seen_heavy);
    }

    #[test]
    fn test_heavy_wave_biases_heavies_even_at_phase_one() {
        let mut rng = Pcg32::seed_from_u64(3);
        let heavies = (0..400)
            .filter(|_| roll_enemy_kind(&mut rng, 1, ActiveEvent::HeavyWave) == EnemyKind::Heavy)
            .count();
        // Bias path fires on roughly half the rolls
        assert!(heavies > 100, "only {} heavies in 400 rolls", heavies);
    }

    #[test]
    fn test_escalation_is_bounded() {
        use crate::consts::{ENEMY_SPEED_MAX, SPAWN_INTERVAL_MIN};
        let mut params = SpawnParams::default();
        for _ in 0..100 {
            params.escalate();
        }
        assert_eq!(params.interval, SPAWN_INTERVAL_MIN);
        assert_eq!(params.enemy_speed, ENEMY_SPEED_MAX);
    }

    #[test]
    fn test_coin_values() {
        assert_eq!(CoinKind::Normal.coin_value(), 1);
        assert_eq!(CoinKind::Large.coin_value(), 5);
        assert_eq!(CoinKind::Risky.coin_value(), 10);
        assert!(CoinKind::Risky.score_value() > CoinKind::Normal.score_value());
    }
}
