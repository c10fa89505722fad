//! Data-driven game balance
//!
//! Loaded from JSON (bundled asset or storage override). Anything that is
//! not a fixed rule of cooking lives here so it can be tuned without a
//! rebuild.

use rand::Rng;
use rand::distr::uniform::SampleUniform;
use serde::{Deserialize, Serialize};

use crate::persistence::KeyValueStore;
use crate::sim::grill::HeatMap;

/// Inclusive range a value is drawn from
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Span<T> {
    pub min: T,
    pub max: T,
}

impl<T: SampleUniform + PartialOrd + Copy> Span<T> {
    pub fn new(min: T, max: T) -> Self {
        Self { min, max }
    }

    /// Uniform draw from `[min, max]`
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> T {
        if self.min >= self.max {
            self.min
        } else {
            rng.random_range(self.min..=self.max)
        }
    }

    fn is_ordered(&self) -> bool {
        self.min <= self.max
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TuningError {
    #[error("tuning parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("range {0} has min > max")]
    InvertedRange(&'static str),
    #[error("{0} must be positive")]
    NotPositive(&'static str),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Round ===
    /// Base round length in seconds
    pub round_secs: f32,
    /// Money target for day 1
    pub start_target: u32,
    /// Target increase per cleared day
    pub target_increment: u32,

    // === Customers ===
    pub max_customers: usize,
    /// Waffles per order
    pub order_size: Span<u32>,
    /// Seconds a customer will wait
    pub patience: Span<f32>,
    /// Seconds between arrival attempts
    pub spawn_interval: Span<f32>,

    // === Trays ===
    pub work_tray_capacity: usize,
    pub finished_tray_capacity: usize,

    // === Strong fire ===
    pub strong_fire_secs: f32,
    /// Cook speed multiplier while active
    pub strong_fire_power: f32,

    // === Progression ===
    /// Money above target per star
    pub money_per_star: u32,

    // === Tutorial ===
    /// Per-cell heat used by the tutorial grill (hot center)
    pub tutorial_heat: HeatMap,
    /// Seconds before a burnt tutorial waffle is moved to the tray
    pub tutorial_burn_move_delay: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            round_secs: 60.0,
            start_target: 1000,
            target_increment: 500,

            max_customers: 3,
            order_size: Span::new(1, 3),
            patience: Span::new(15.0, 25.0),
            spawn_interval: Span::new(3.0, 6.0),

            work_tray_capacity: 5,
            finished_tray_capacity: 5,

            strong_fire_secs: 3.0,
            strong_fire_power: 2.0,

            money_per_star: 500,

            tutorial_heat: [[0.75, 1.0, 0.75], [1.0, 1.5, 1.0], [0.75, 1.0, 0.75]],
            tutorial_burn_move_delay: 1.0,
        }
    }
}

impl Tuning {
    /// Storage key for a tuning override
    const STORAGE_KEY: &'static str = "waffle_tycoon_tuning";

    /// Parse and validate a tuning document. Missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    pub fn validate(&self) -> Result<(), TuningError> {
        if !self.order_size.is_ordered() {
            return Err(TuningError::InvertedRange("order_size"));
        }
        if !self.patience.is_ordered() {
            return Err(TuningError::InvertedRange("patience"));
        }
        if !self.spawn_interval.is_ordered() {
            return Err(TuningError::InvertedRange("spawn_interval"));
        }

        let positive = [
            ("round_secs", self.round_secs > 0.0),
            ("order_size", self.order_size.min > 0),
            ("patience", self.patience.min > 0.0),
            ("spawn_interval", self.spawn_interval.min > 0.0),
            ("max_customers", self.max_customers > 0),
            ("work_tray_capacity", self.work_tray_capacity > 0),
            ("finished_tray_capacity", self.finished_tray_capacity > 0),
            ("strong_fire_secs", self.strong_fire_secs > 0.0),
            ("strong_fire_power", self.strong_fire_power > 0.0),
            ("money_per_star", self.money_per_star > 0),
        ];
        for (name, ok) in positive {
            if !ok {
                return Err(TuningError::NotPositive(name));
            }
        }
        Ok(())
    }

    /// Load an override from storage, falling back to defaults
    pub fn load(store: &dyn KeyValueStore) -> Self {
        if let Some(json) = store.get(Self::STORAGE_KEY) {
            match Self::from_json(&json) {
                Ok(tuning) => {
                    log::info!("Loaded tuning override from storage");
                    return tuning;
                }
                Err(e) => log::warn!("Ignoring stored tuning: {}", e),
            }
        }
        Self::default()
    }

    pub fn save(&self, store: &mut dyn KeyValueStore) {
        match serde_json::to_string(self) {
            Ok(json) => {
                if let Err(e) = store.set(Self::STORAGE_KEY, &json) {
                    log::warn!("Failed to save tuning: {}", e);
                }
            }
            Err(e) => log::warn!("Failed to encode tuning: {}", e),
        }
    }
}
