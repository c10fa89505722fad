//! Waffle Tycoon - a grill-and-serve arcade tycoon
//!
//! Core modules:
//! - `sim`: Deterministic simulation (grill, trays, customers, rounds)
//! - `tutorial`: Scripted onboarding over the same simulation
//! - `upgrades`: Shop upgrade levels and the round modifiers they imply
//! - `records`: Per-day best results and stars
//! - `persistence`: Key/value storage collaborator
//! - `tuning`: Data-driven game balance

pub mod persistence;
pub mod records;
pub mod sim;
pub mod tuning;
pub mod tutorial;
pub mod upgrades;

pub use records::{DayRecords, stars_for};
pub use tuning::Tuning;
pub use upgrades::{ProgressionStore, RoundModifiers, UpgradeKind, UpgradeLevels};

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (120 Hz)
    pub const SIM_DT: f32 = 1.0 / 120.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Longest frame delta accepted from the host (seconds)
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Grill dimensions
    pub const GRILL_ROWS: usize = 3;
    pub const GRILL_COLS: usize = 3;
    /// The hot center cell used by the tutorial
    pub const GRILL_CENTER: (usize, usize) = (GRILL_ROWS / 2, GRILL_COLS / 2);
}
