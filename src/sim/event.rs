//! Presentation events
//!
//! Controllers push these as state changes happen; the view layer drains
//! them after each tick or command and maps them to visuals and audio.

use serde::{Deserialize, Serialize};

use super::stage::{CookingStage, JamType};
use super::tray::TrayKind;
use crate::tutorial::TutorialStep;

/// How a round ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundOutcome {
    Success,
    Failure,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    BatterPlaced {
        row: usize,
        col: usize,
    },
    StageChanged {
        row: usize,
        col: usize,
        from: CookingStage,
        to: CookingStage,
    },
    WaffleHarvested {
        row: usize,
        col: usize,
        stage: CookingStage,
    },
    TrayChanged {
        tray: TrayKind,
        len: usize,
    },
    WaffleTopped {
        jam: JamType,
    },
    WaffleDiscarded {
        stage: CookingStage,
    },
    CustomerSpawned {
        slot: usize,
        id: u32,
        waffle_count: u32,
    },
    /// Patience ran out
    CustomerDeparted {
        slot: usize,
        id: u32,
    },
    CustomerServed {
        slot: usize,
        id: u32,
        revenue: u32,
    },
    StrongFireChanged {
        active: bool,
    },
    RoundEnded {
        outcome: RoundOutcome,
        money: u32,
        target: u32,
    },
    TutorialStepEntered(TutorialStep),
    TutorialConfirmEnabled,
    TutorialCompleted {
        skipped: bool,
    },
}
