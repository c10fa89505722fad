//! Deterministic cooking/serving simulation
//!
//! All gameplay rules live here. This module must stay pure:
//! - Time only advances through `tick(dt)`
//! - Randomness only through an injected, seedable RNG
//! - No rendering, audio or storage dependencies; changes are reported as events

pub mod clock;
pub mod customer;
pub mod error;
pub mod event;
pub mod grill;
pub mod round;
pub mod stage;
pub mod station;
pub mod tray;

pub use clock::FixedStep;
pub use customer::{Customer, CustomerPool, Sale};
pub use error::CommandError;
pub use event::{GameEvent, RoundOutcome};
pub use grill::{Grill, GrillSlot, HeatMap, UNIFORM_HEAT};
pub use round::{Command, RoundController, RoundPhase, RoundResult, RoundState, SpawnScheduler};
pub use stage::{CookingStage, JamType};
pub use tray::{Tray, TrayKind, TrayWaffle};
