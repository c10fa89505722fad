//! Command rejection outcomes
//!
//! Every player command is validated against the current state and either
//! applied atomically or rejected with one of these. None of them are fatal.

use super::stage::{CookingStage, JamType};
use super::tray::TrayKind;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CommandError {
    #[error("cannot {action} a slot in stage {stage:?}")]
    InvalidTransition {
        action: &'static str,
        stage: CookingStage,
    },
    #[error("{0:?} tray is full")]
    CapacityExceeded(TrayKind),
    #[error("{0:?} tray is empty")]
    EmptySource(TrayKind),
    #[error("action not allowed on the {0:?} tray")]
    WrongTray(TrayKind),
    #[error("not enough waffles: need {needed}, have {available}")]
    InsufficientStock { needed: u32, available: u32 },
    #[error("no free customer slot")]
    SlotUnavailable,
    #[error("index out of bounds: ({0}, {1})")]
    OutOfBounds(usize, usize),
    #[error("no customer waiting in slot {0}")]
    NoCustomer(usize),
    #[error("customer wants {wanted:?}")]
    JamMismatch { wanted: JamType },
    #[error("round is over")]
    RoundOver,
}

impl CommandError {
    /// Short transient message for the HUD
    pub fn user_message(&self) -> &'static str {
        match self {
            CommandError::InvalidTransition { .. } => "Not ready",
            CommandError::CapacityExceeded(_) => "Tray full",
            CommandError::EmptySource(_) => "Tray empty",
            CommandError::WrongTray(_) => "Wrong tray",
            CommandError::InsufficientStock { .. } => "Not enough waffles",
            CommandError::SlotUnavailable => "No room",
            CommandError::OutOfBounds(..) => "Invalid target",
            CommandError::NoCustomer(_) => "No customer",
            CommandError::JamMismatch { .. } => "Wrong topping",
            CommandError::RoundOver => "Time's up",
        }
    }
}
