//! Scripted onboarding
//!
//! A linear sequence of gated steps driving a restricted copy of the
//! simulation. Never active at the same time as a round.

pub mod controller;
pub mod step;

pub use controller::{SCRIPTED_PATIENCE, TutorialController, TutorialResponse};
pub use step::{Accepts, EntryAction, Highlight, STEPS, StepDescriptor, TutorialInput, TutorialStep};
