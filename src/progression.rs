//! Durable progression record and its key-value persistence schema.
//!
//! Progression survives across runs: best score, unlocked level, best phase,
//! coin totals. The backing store is injected (there is no process-wide
//! singleton) so the menu layer and the run loop share one explicitly owned
//! instance, and tests can run against an in-memory store.

use std::collections::HashMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Persistence schema keys. All values are integers.
pub mod keys {
    pub const SAVED_LEVEL: &str = "SavedLevel";
    pub const SAVED_SCORE: &str = "SavedScore";
    pub const HIGH_SCORE: &str = "HighScore";
    pub const UNLOCKED_LEVEL: &str = "UnlockedLevel";
    pub const CURRENT_COINS: &str = "CurrentCoins";
    pub const TOTAL_COINS: &str = "TotalCoins";
    pub const BEST_PHASE: &str = "BestPhase";
}

/// Integer key-value backend, the shape of the original save storage.
///
/// A missing key is `None`; the record layer substitutes schema defaults,
/// never propagates the absence.
pub trait KvStore {
    fn get_int(&self, key: &str) -> Option<i64>;
    fn set_int(&mut self, key: &str, value: i64);
    fn remove(&mut self, key: &str);
}

/// In-memory backend for tests and the headless demo.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: HashMap<String, i64>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvStore for MemoryStore {
    fn get_int(&self, key: &str) -> Option<i64> {
        self.values.get(key).copied()
    }

    fn set_int(&mut self, key: &str, value: i64) {
        self.values.insert(key.to_string(), value);
    }

    fn remove(&mut self, key: &str) {
        self.values.remove(key);
    }
}

/// JSON-file backend for native builds. Write-through: every set rewrites
/// the file. A missing or corrupt file reads as empty.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    values: HashMap<String, i64>,
}

impl JsonFileStore {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let values = match std::fs::read_to_string(&path) {
            Ok(json) => match serde_json::from_str(&json) {
                Ok(values) => values,
                Err(err) => {
                    log::warn!("Corrupt save file {:?}, starting fresh: {}", path, err);
                    HashMap::new()
                }
            },
            Err(_) => {
                log::info!("No save file at {:?}, starting fresh", path);
                HashMap::new()
            }
        };
        Self { path, values }
    }

    fn write_out(&self) {
        match serde_json::to_string(&self.values) {
            Ok(json) => {
                if let Err(err) = std::fs::write(&self.path, json) {
                    log::warn!("Failed to write save file {:?}: {}", self.path, err);
                }
            }
            Err(err) => log::warn!("Failed to serialize save data: {}", err),
        }
    }
}

impl KvStore for JsonFileStore {
    fn get_int(&self, key: &str) -> Option<i64> {
        self.values.get(key).copied()
    }

    fn set_int(&mut self, key: &str, value: i64) {
        self.values.insert(key.to_string(), value);
        self.write_out();
    }

    fn remove(&mut self, key: &str) {
        self.values.remove(key);
        self.write_out();
    }
}

/// Durable progression fields. Level/phase fields never drop below 1 and
/// counters never below 0; outside of `clear` no field ever decreases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressionRecord {
    pub saved_level: u32,
    pub saved_score: u32,
    pub high_score: u32,
    pub unlocked_level: u32,
    pub current_coins: u32,
    pub total_coins: u32,
    pub best_phase: u32,
}

impl Default for ProgressionRecord {
    fn default() -> Self {
        Self {
            saved_level: 1,
            saved_score: 0,
            high_score: 0,
            unlocked_level: 1,
            current_coins: 0,
            total_coins: 0,
            best_phase: 1,
        }
    }
}

/// Progression store: owns the record plus its backend, and keeps the two in
/// sync at well-defined points (run start, run end, level unlock, explicit
/// clear).
#[derive(Debug)]
pub struct ProgressionStore<S: KvStore> {
    store: S,
    record: ProgressionRecord,
}

impl<S: KvStore> ProgressionStore<S> {
    /// Open the store and load the record, substituting schema defaults for
    /// missing keys.
    pub fn open(store: S) -> Self {
        let record = Self::load_from(&store);
        log::info!(
            "Progression loaded: high score {}, unlocked level {}, best phase {}",
            record.high_score,
            record.unlocked_level,
            record.best_phase
        );
        Self { store, record }
    }

    fn load_from(store: &S) -> ProgressionRecord {
        // Floors: 1 for level/phase fields, 0 for counters.
        let at_least_one = |key| store.get_int(key).unwrap_or(1).max(1) as u32;
        let at_least_zero = |key| store.get_int(key).unwrap_or(0).max(0) as u32;
        ProgressionRecord {
            saved_level: at_least_one(keys::SAVED_LEVEL),
            saved_score: at_least_zero(keys::SAVED_SCORE),
            high_score: at_least_zero(keys::HIGH_SCORE),
            unlocked_level: at_least_one(keys::UNLOCKED_LEVEL),
            current_coins: at_least_zero(keys::CURRENT_COINS),
            total_coins: at_least_zero(keys::TOTAL_COINS),
            best_phase: at_least_one(keys::BEST_PHASE),
        }
    }

    pub fn record(&self) -> &ProgressionRecord {
        &self.record
    }

    /// Re-read the record from the backend.
    pub fn load(&mut self) -> &ProgressionRecord {
        self.record = Self::load_from(&self.store);
        &self.record
    }

    /// Overwrite-all-fields write. Idempotent.
    pub fn save(&mut self) {
        let r = &self.record;
        self.store.set_int(keys::SAVED_LEVEL, r.saved_level as i64);
        self.store.set_int(keys::SAVED_SCORE, r.saved_score as i64);
        self.store.set_int(keys::HIGH_SCORE, r.high_score as i64);
        self.store
            .set_int(keys::UNLOCKED_LEVEL, r.unlocked_level as i64);
        self.store
            .set_int(keys::CURRENT_COINS, r.current_coins as i64);
        self.store.set_int(keys::TOTAL_COINS, r.total_coins as i64);
        self.store.set_int(keys::BEST_PHASE, r.best_phase as i64);
    }

    /// Reset every field to its default and persist the defaults immediately.
    pub fn clear(&mut self) {
        self.record = ProgressionRecord::default();
        self.save();
        log::info!("Save data cleared");
    }

    /// `high_score = max(high_score, score)`, persisted only on change.
    /// Returns whether the record changed.
    pub fn update_high_score_if_needed(&mut self, score: u32) -> bool {
        if score > self.record.high_score {
            self.record.high_score = score;
            self.store
                .set_int(keys::HIGH_SCORE, self.record.high_score as i64);
            true
        } else {
            false
        }
    }

    /// `best_phase = max(best_phase, phase)`, persisted only on change.
    pub fn update_best_phase_if_needed(&mut self, phase: u32) -> bool {
        if phase > self.record.best_phase {
            self.record.best_phase = phase;
            self.store
                .set_int(keys::BEST_PHASE, self.record.best_phase as i64);
            true
        } else {
            false
        }
    }

    /// Unlock the level after `current_level`. Never decreases.
    pub fn unlock_next_level(&mut self, current_level: u32) {
        let unlocked = self.record.unlocked_level.max(current_level + 1);
        if unlocked != self.record.unlocked_level {
            self.record.unlocked_level = unlocked;
            self.store.set_int(keys::UNLOCKED_LEVEL, unlocked as i64);
            log::info!("Unlocked level {}", unlocked);
        }
    }

    /// Credit a coin pickup to both the run balance and the lifetime total.
    pub fn collect_coin(&mut self, amount: u32) {
        if amount == 0 {
            return;
        }
        self.record.current_coins += amount;
        self.record.total_coins += amount;
        self.store
            .set_int(keys::CURRENT_COINS, self.record.current_coins as i64);
        self.store
            .set_int(keys::TOTAL_COINS, self.record.total_coins as i64);
    }

    /// Spend from the run balance. Fails closed: returns `false` with no
    /// mutation when the balance is short.
    pub fn spend_coins(&mut self, amount: u32) -> bool {
        if amount == 0 || self.record.current_coins < amount {
            return false;
        }
        self.record.current_coins -= amount;
        self.store
            .set_int(keys::CURRENT_COINS, self.record.current_coins as i64);
        true
    }

    /// Record the level a new run starts at (scene-entry save).
    pub fn begin_run(&mut self, level: u32) {
        self.record.saved_level = level;
        self.record.saved_score = 0;
        self.save();
    }

    /// Run-ending flush: final score mirror, high score, best phase, full record.
    pub fn flush_run(&mut self, score: u32, phase: u32) {
        self.record.saved_score = score;
        self.update_high_score_if_needed(score);
        self.update_best_phase_if_needed(phase);
        self.save();
    }
}
