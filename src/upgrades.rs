//! Shop upgrades and the round modifiers derived from them
//!
//! The progression store is an external collaborator; the simulation only
//! reads upgrade levels at round start and turns them into plain numbers.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::persistence::{KeyValueStore, StorageError};
use crate::tuning::Tuning;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UpgradeKind {
    WorkTrayCapacity,
    FinishedTrayCapacity,
    CookingSpeed,
    StrongFireDuration,
    StrongFirePower,
    PriceBonus,
    RoundTime,
    // Sold in the shop but not yet wired into the simulation
    BurnProtection,
    TipBonus,
}

impl UpgradeKind {
    pub const ALL: [UpgradeKind; 9] = [
        UpgradeKind::WorkTrayCapacity,
        UpgradeKind::FinishedTrayCapacity,
        UpgradeKind::CookingSpeed,
        UpgradeKind::StrongFireDuration,
        UpgradeKind::StrongFirePower,
        UpgradeKind::PriceBonus,
        UpgradeKind::RoundTime,
        UpgradeKind::BurnProtection,
        UpgradeKind::TipBonus,
    ];

    /// Highest purchasable level
    pub fn max_level(&self) -> u32 {
        match self {
            UpgradeKind::WorkTrayCapacity | UpgradeKind::FinishedTrayCapacity => 3,
            UpgradeKind::BurnProtection => 1,
            _ => 5,
        }
    }
}

/// Read side of the progression store
pub trait ProgressionStore {
    fn upgrade_level(&self, kind: UpgradeKind) -> u32;
}

/// Purchased upgrade levels
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpgradeLevels {
    levels: HashMap<UpgradeKind, u32>,
}

impl UpgradeLevels {
    const STORAGE_KEY: &'static str = "waffle_tycoon_upgrades";

    pub fn new() -> Self {
        Self::default()
    }

    /// Set a level, clamped to the upgrade's maximum
    pub fn set(&mut self, kind: UpgradeKind, level: u32) {
        self.levels.insert(kind, level.min(kind.max_level()));
    }

    pub fn load(store: &dyn KeyValueStore) -> Self {
        store
            .get(Self::STORAGE_KEY)
            .and_then(|json| match serde_json::from_str(&json) {
                Ok(levels) => Some(levels),
                Err(e) => {
                    log::warn!("Discarding unreadable upgrade levels: {}", e);
                    None
                }
            })
            .unwrap_or_default()
    }

    pub fn save(&self, store: &mut dyn KeyValueStore) -> Result<(), StorageError> {
        let json = serde_json::to_string(self)?;
        store.set(Self::STORAGE_KEY, &json)
    }
}

impl ProgressionStore for UpgradeLevels {
    fn upgrade_level(&self, kind: UpgradeKind) -> u32 {
        self.levels.get(&kind).copied().unwrap_or(0)
    }
}

/// Per-round numbers computed from tuning and upgrade levels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoundModifiers {
    pub work_tray_capacity: usize,
    pub finished_tray_capacity: usize,
    /// Multiplier on every grill cell
    pub cook_speed: f32,
    pub strong_fire_secs: f32,
    pub strong_fire_power: f32,
    /// Added per waffle sold
    pub price_bonus: u32,
    pub round_secs: f32,
}

impl RoundModifiers {
    /// Modifiers with no upgrades purchased
    pub fn base(tuning: &Tuning) -> Self {
        Self {
            work_tray_capacity: tuning.work_tray_capacity,
            finished_tray_capacity: tuning.finished_tray_capacity,
            cook_speed: 1.0,
            strong_fire_secs: tuning.strong_fire_secs,
            strong_fire_power: tuning.strong_fire_power,
            price_bonus: 0,
            round_secs: tuning.round_secs,
        }
    }

    pub fn from_store(store: &dyn ProgressionStore, tuning: &Tuning) -> Self {
        let level = |kind| store.upgrade_level(kind);
        let base = Self::base(tuning);
        Self {
            work_tray_capacity: base.work_tray_capacity
                + level(UpgradeKind::WorkTrayCapacity) as usize,
            finished_tray_capacity: base.finished_tray_capacity
                + level(UpgradeKind::FinishedTrayCapacity) as usize,
            cook_speed: base.cook_speed + 0.1 * level(UpgradeKind::CookingSpeed) as f32,
            strong_fire_secs: base.strong_fire_secs
                + 0.5 * level(UpgradeKind::StrongFireDuration) as f32,
            strong_fire_power: base.strong_fire_power
                + 0.25 * level(UpgradeKind::StrongFirePower) as f32,
            price_bonus: 10 * level(UpgradeKind::PriceBonus),
            round_secs: base.round_secs + 5.0 * level(UpgradeKind::RoundTime) as f32,
        }
    }
}
