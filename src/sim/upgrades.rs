//! Upgrade and passive effect tables
//!
//! Both are pure lookups from an enum to a stat delta. Upgrades are offered
//! three at a time on each phase advance; a passive is rolled exactly once
//! at run start. All effects apply once and never expire.

use rand::Rng;
use rand_pcg::Pcg32;

use super::state::{PlayerStats, RunState};
use crate::consts::DASH_COOLDOWN_MIN;

/// Per-pick upgrade deltas
const UPGRADE_DASH_COOLDOWN_STEP: f32 = 0.2;
const UPGRADE_DASH_DISTANCE_STEP: f32 = 20.0;
const UPGRADE_MOVE_SPEED_STEP: f32 = 30.0;
const UPGRADE_STEP_SIZE_STEP: f32 = 4.0;
const UPGRADE_NEAR_MISS_BONUS_STEP: u32 = 1;
const UPGRADE_NEAR_MISS_DASH_STEP: f32 = 0.1;
const UPGRADE_COIN_BONUS_STEP: u32 = 1;

/// Passive deltas
const PASSIVE_MOVE_SPEED: f32 = 40.0;
const PASSIVE_STEP_SIZE: f32 = 5.0;
const PASSIVE_COIN_BONUS: u32 = 1;
const PASSIVE_NEAR_MISS_BONUS: u32 = 1;
const PASSIVE_NEAR_MISS_DASH: f32 = 0.1;

/// Player-chosen stat modifier, offered at each phase advance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpgradeKind {
    DashCooldown,
    DashDistance,
    Heal,
    MoveSpeed,
    NearMissBoost,
    CoinBonus,
}

impl UpgradeKind {
    pub const ALL: [UpgradeKind; 6] = [
        UpgradeKind::DashCooldown,
        UpgradeKind::DashDistance,
        UpgradeKind::Heal,
        UpgradeKind::MoveSpeed,
        UpgradeKind::NearMissBoost,
        UpgradeKind::CoinBonus,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            UpgradeKind::DashCooldown => "Quicker Dash",
            UpgradeKind::DashDistance => "Longer Dash",
            UpgradeKind::Heal => "Patch Up",
            UpgradeKind::MoveSpeed => "Fleet Foot",
            UpgradeKind::NearMissBoost => "Daredevil",
            UpgradeKind::CoinBonus => "Coin Magnet",
        }
    }
}

/// Draw three unique upgrades from the six-member table.
///
/// Partial Fisher-Yates over a scratch copy keeps the draw unbiased and
/// without replacement.
pub fn offer_upgrades(rng: &mut Pcg32) -> [UpgradeKind; 3] {
    let mut pool = UpgradeKind::ALL;
    for i in 0..3 {
        let j = rng.random_range(i..pool.len());
        pool.swap(i, j);
    }
    [pool[0], pool[1], pool[2]]
}

/// Apply one chosen upgrade to the run. Pure per-field delta.
pub fn apply_upgrade(choice: UpgradeKind, state: &mut RunState) {
    match choice {
        UpgradeKind::DashCooldown => {
            state.stats.dash_cooldown =
                (state.stats.dash_cooldown - UPGRADE_DASH_COOLDOWN_STEP).max(DASH_COOLDOWN_MIN);
        }
        UpgradeKind::DashDistance => {
            state.stats.dash_distance += UPGRADE_DASH_DISTANCE_STEP;
        }
        UpgradeKind::Heal => {
            // Uncapped; a run built around Heal can bank health
            state.health += 1;
        }
        UpgradeKind::MoveSpeed => {
            state.stats.move_speed += UPGRADE_MOVE_SPEED_STEP;
            state.stats.step_size += UPGRADE_STEP_SIZE_STEP;
        }
        UpgradeKind::NearMissBoost => {
            state.stats.near_miss_bonus += UPGRADE_NEAR_MISS_BONUS_STEP;
            state.stats.near_miss_dash_reduction += UPGRADE_NEAR_MISS_DASH_STEP;
        }
        UpgradeKind::CoinBonus => {
            state.stats.coin_score_bonus += UPGRADE_COIN_BONUS_STEP;
        }
    }
    log::info!("Upgrade applied: {}", choice.as_str());
}

/// Once-per-run randomly chosen permanent modifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Passive {
    Agile,
    Survivor,
    Collector,
    Daring,
}

impl Passive {
    pub const ALL: [Passive; 4] = [
        Passive::Agile,
        Passive::Survivor,
        Passive::Collector,
        Passive::Daring,
    ];

    pub fn roll(rng: &mut Pcg32) -> Self {
        Self::ALL[rng.random_range(0..Self::ALL.len())]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Passive::Agile => "Agile",
            Passive::Survivor => "Survivor",
            Passive::Collector => "Collector",
            Passive::Daring => "Daring",
        }
    }

    /// Fold this passive into the starting stat block
    pub fn apply(&self, stats: &mut PlayerStats, health: &mut i32) {
        match self {
            Passive::Agile => {
                stats.move_speed += PASSIVE_MOVE_SPEED;
                stats.step_size += PASSIVE_STEP_SIZE;
            }
            Passive::Survivor => *health += 1,
            Passive::Collector => stats.coin_score_bonus += PASSIVE_COIN_BONUS,
            Passive::Daring => {
                stats.near_miss_bonus += PASSIVE_NEAR_MISS_BONUS;
                stats.near_miss_dash_reduction += PASSIVE_NEAR_MISS_DASH;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_offer_draws_three_unique_upgrades() {
        let mut rng = Pcg32::seed_from_u64(7);
        for _ in 0..50 {
            let offer = offer_upgrades(&mut rng);
            assert_ne!(offer[0], offer[1]);
            assert_ne!(offer[0], offer[2]);
            assert_ne!(offer[1], offer[2]);
        }
    }

    #[test]
    fn test_dash_cooldown_floors_at_minimum() {
        let mut state = RunState::new(1, 1);
        for _ in 0..20 {
            apply_upgrade(UpgradeKind::DashCooldown, &mut state);
        }
        assert_eq!(state.stats.dash_cooldown, DASH_COOLDOWN_MIN);
    }

    #[test]
    fn test_heal_is_uncapped() {
        let mut state = RunState::new(1, 1);
        let start = state.health;
        for _ in 0..5 {
            apply_upgrade(UpgradeKind::Heal, &mut state);
        }
        assert_eq!(state.health, start + 5);
    }

    #[test]
    fn test_survivor_passive_grants_extra_starting_health() {
        let mut stats = PlayerStats::default();
        let mut health = crate::consts::STARTING_HEALTH;
        Passive::Survivor.apply(&mut stats, &mut health);
        assert_eq!(health, crate::consts::STARTING_HEALTH + 1);
        assert_eq!(stats, PlayerStats::default());
    }

}
