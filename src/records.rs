//! Per-day best results and star awards
//!
//! Persisted through the key/value store. A replay can only improve a
//! day's record, never lower it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::persistence::{KeyValueStore, StorageError};
use crate::sim::{RoundOutcome, RoundResult};

/// Most stars a day can award
pub const MAX_STARS: u32 = 3;

/// Stars for a finished round: one per `money_per_star` above target, capped
pub fn stars_for(money: u32, target: u32, money_per_star: u32) -> u32 {
    if money < target || money_per_star == 0 {
        return 0;
    }
    ((money - target) / money_per_star).min(MAX_STARS)
}

/// Best result recorded for a day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayRecord {
    pub best_money: u32,
    pub stars: u32,
    pub cleared: bool,
}

/// What recording a result changed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordUpdate {
    /// Stars earned by this run alone
    pub stars: u32,
    /// Stars added on top of the previous best (what the ledger should credit)
    pub new_stars: u32,
    pub new_best: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DayRecords {
    days: BTreeMap<u32, DayRecord>,
}

impl DayRecords {
    const STORAGE_KEY: &'static str = "waffle_tycoon_records";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, day: u32) -> Option<&DayRecord> {
        self.days.get(&day)
    }

    /// Highest day cleared so far
    pub fn highest_cleared(&self) -> Option<u32> {
        self.days
            .iter()
            .rev()
            .find(|(_, r)| r.cleared)
            .map(|(day, _)| *day)
    }

    pub fn total_stars(&self) -> u32 {
        self.days.values().map(|r| r.stars).sum()
    }

    /// Fold a round result into the ledger, keeping the best per field
    pub fn record(&mut self, result: &RoundResult, money_per_star: u32) -> RecordUpdate {
        let cleared = result.outcome == RoundOutcome::Success;
        let stars = if cleared {
            stars_for(result.money, result.target_money, money_per_star)
        } else {
            0
        };

        let entry = self.days.entry(result.day).or_insert(DayRecord {
            best_money: 0,
            stars: 0,
            cleared: false,
        });
        let new_best = result.money > entry.best_money;
        let new_stars = stars.saturating_sub(entry.stars);

        entry.best_money = entry.best_money.max(result.money);
        entry.stars = entry.stars.max(stars);
        entry.cleared |= cleared;

        if new_best {
            log::info!("Day {} new best: {}", result.day, result.money);
        }
        RecordUpdate {
            stars,
            new_stars,
            new_best,
        }
    }

    pub fn load(store: &dyn KeyValueStore) -> Self {
        if let Some(json) = store.get(Self::STORAGE_KEY) {
            match serde_json::from_str::<DayRecords>(&json) {
                Ok(records) => {
                    log::info!("Loaded records for {} days", records.days.len());
                    return records;
                }
                Err(e) => log::warn!("Discarding unreadable records: {}", e),
            }
        }
        Self::new()
    }

    pub fn save(&self, store: &mut dyn KeyValueStore) -> Result<(), StorageError> {
        let json = serde_json::to_string(self)?;
        store.set(Self::STORAGE_KEY, &json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;

    fn result(day: u32, money: u32, target: u32) -> RoundResult {
        RoundResult {
            day,
            money,
            target_money: target,
            outcome: if money >= target {
                RoundOutcome::Success
            } else {
                RoundOutcome::Failure
            },
        }
    }

    #[test]
    fn test_stars_for() {
        assert_eq!(stars_for(900, 1000, 500), 0);
        assert_eq!(stars_for(1000, 1000, 500), 0);
        assert_eq!(stars_for(1500, 1000, 500), 1);
        assert_eq!(stars_for(2400, 1000, 500), 2);
        assert_eq!(stars_for(9000, 1000, 500), MAX_STARS);
    }

    #[test]
    fn test_replay_never_lowers_record() {
        let mut records = DayRecords::new();
        let first = records.record(&result(1, 2600, 1000), 500);
        assert_eq!(first.stars, 3);
        assert_eq!(first.new_stars, 3);
        assert!(first.new_best);

        let worse = records.record(&result(1, 1200, 1000), 500);
        assert_eq!(worse.stars, 0);
        assert_eq!(worse.new_stars, 0);
        assert!(!worse.new_best);

        let failed = records.record(&result(1, 100, 1000), 500);
        assert!(!failed.new_best);

        let rec = records.get(1).unwrap();
        assert_eq!(rec.best_money, 2600);
        assert_eq!(rec.stars, 3);
        assert!(rec.cleared);
    }

    #[test]
    fn test_improvement_credits_only_difference() {
        let mut records = DayRecords::new();
        records.record(&result(2, 2000, 1500), 500);
        let better = records.record(&result(2, 2600, 1500), 500);
        assert_eq!(better.stars, 2);
        assert_eq!(better.new_stars, 1);
        assert_eq!(records.total_stars(), 2);
    }

    #[test]
    fn test_highest_cleared() {
        let mut records = DayRecords::new();
        assert_eq!(records.highest_cleared(), None);
        records.record(&result(1, 1000, 1000), 500);
        records.record(&result(2, 100, 1500), 500);
        assert_eq!(records.highest_cleared(), Some(1));
    }

    #[test]
    fn test_records_persist() {
        let mut store = MemoryStore::new();
        let mut records = DayRecords::new();
        records.record(&result(3, 3000, 2000), 500);
        records.save(&mut store).unwrap();
        assert_eq!(DayRecords::load(&store), records);
    }
}
