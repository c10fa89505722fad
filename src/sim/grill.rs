//! The grill: a fixed matrix of independently cooking slots
//!
//! Slots are plain value records addressed by (row, col). The grill owns
//! stage advancement; the only other mutations are placing batter and
//! harvesting.

use serde::{Deserialize, Serialize};

use super::error::CommandError;
use super::event::GameEvent;
use super::stage::CookingStage;
use super::tray::TrayWaffle;
use crate::consts::{GRILL_COLS, GRILL_ROWS};

/// Per-cell cook speed multipliers
pub type HeatMap = [[f32; GRILL_COLS]; GRILL_ROWS];

/// Every cell cooks at 1.0x
pub const UNIFORM_HEAT: HeatMap = [[1.0; GRILL_COLS]; GRILL_ROWS];

/// One grill cell
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GrillSlot {
    pub stage: CookingStage,
    /// Seconds accumulated in the current stage
    pub cook_time: f32,
}

impl GrillSlot {
    /// Fraction of the current stage completed (0 for terminal stages)
    pub fn progress(&self) -> f32 {
        let required = self.stage.required_time();
        if required.is_finite() {
            (self.cook_time / required).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Grill {
    slots: [[GrillSlot; GRILL_COLS]; GRILL_ROWS],
    /// Cell whose Perfect -> Burnt transition is suppressed
    #[serde(default)]
    burn_guard: Option<(usize, usize)>,
}

impl Grill {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rows(&self) -> usize {
        GRILL_ROWS
    }

    pub fn cols(&self) -> usize {
        GRILL_COLS
    }

    pub fn slot(&self, row: usize, col: usize) -> Option<&GrillSlot> {
        self.slots.get(row).and_then(|r| r.get(col))
    }

    fn slot_mut(&mut self, row: usize, col: usize) -> Result<&mut GrillSlot, CommandError> {
        self.slots
            .get_mut(row)
            .and_then(|r| r.get_mut(col))
            .ok_or(CommandError::OutOfBounds(row, col))
    }

    /// Iterate all slots with their coordinates, row-major
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, &GrillSlot)> {
        self.slots
            .iter()
            .enumerate()
            .flat_map(|(r, row)| row.iter().enumerate().map(move |(c, s)| (r, c, s)))
    }

    /// Pour batter into an empty cell
    pub fn place_batter(&mut self, row: usize, col: usize) -> Result<(), CommandError> {
        let slot = self.slot_mut(row, col)?;
        if slot.stage != CookingStage::Empty {
            return Err(CommandError::InvalidTransition {
                action: "place batter on",
                stage: slot.stage,
            });
        }
        slot.stage = CookingStage::Batter;
        slot.cook_time = 0.0;
        Ok(())
    }

    /// Check whether a cell could be harvested right now, without mutating it
    pub fn check_harvest(&self, row: usize, col: usize) -> Result<CookingStage, CommandError> {
        let slot = self.slot(row, col).ok_or(CommandError::OutOfBounds(row, col))?;
        if !slot.stage.is_harvestable() {
            return Err(CommandError::InvalidTransition {
                action: "harvest",
                stage: slot.stage,
            });
        }
        Ok(slot.stage)
    }

    /// Remove the waffle from a cell, freezing its stage
    pub fn eject(&mut self, row: usize, col: usize) -> Result<TrayWaffle, CommandError> {
        let stage = self.check_harvest(row, col)?;
        let slot = self.slot_mut(row, col)?;
        *slot = GrillSlot::default();
        if self.burn_guard == Some((row, col)) {
            self.burn_guard = None;
        }
        Ok(TrayWaffle::new(stage))
    }

    /// Keep the given cell from burning once it reaches Perfect
    pub fn set_burn_guard(&mut self, cell: Option<(usize, usize)>) {
        self.burn_guard = cell;
    }

    pub fn burn_guard(&self) -> Option<(usize, usize)> {
        self.burn_guard
    }

    /// Clear every cell back to Empty
    pub fn clear(&mut self) {
        self.slots = Default::default();
        self.burn_guard = None;
    }

    /// Advance cooking on every active cell.
    ///
    /// At most one stage transition per cell per call; `cook_time` restarts
    /// from zero on each transition.
    pub fn tick(&mut self, dt: f32, heat: f32, heat_map: &HeatMap, events: &mut Vec<GameEvent>) {
        for (row, cells) in self.slots.iter_mut().enumerate() {
            for (col, slot) in cells.iter_mut().enumerate() {
                if !slot.stage.is_cooking() {
                    continue;
                }

                if slot.stage == CookingStage::Perfect && self.burn_guard == Some((row, col)) {
                    slot.cook_time = 0.0;
                    continue;
                }

                slot.cook_time += dt * heat * heat_map[row][col];
                if slot.cook_time >= slot.stage.required_time() {
                    if let Some(next) = slot.stage.next() {
                        let from = slot.stage;
                        slot.stage = next;
                        slot.cook_time = 0.0;
                        log::debug!("Grill ({}, {}) {} -> {}", row, col, from.as_str(), next.as_str());
                        events.push(GameEvent::StageChanged {
                            row,
                            col,
                            from,
                            to: next,
                        });
                    }
                }
            }
        }
    }

    /// Count of cells currently holding something
    pub fn occupied(&self) -> usize {
        self.iter()
            .filter(|(_, _, s)| s.stage != CookingStage::Empty)
            .count()
    }
}
