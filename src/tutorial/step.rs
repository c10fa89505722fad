//! Tutorial steps and their contracts
//!
//! Each step is described by a row in [`STEPS`]: which input it accepts,
//! whether cooking is paused, what happens on entry and what to highlight.
//! The controller reads the table instead of branching on the step for
//! every one of these questions.

use serde::{Deserialize, Serialize};

use crate::consts::GRILL_CENTER;
use crate::sim::Command;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TutorialStep {
    GrillTouch,
    HeatExplanation,
    StrongFire,
    PickPerfect,
    BurnWarning,
    ApplyJam,
    TrashBurnt,
    ServeCustomer,
    StarExplanation,
    Complete,
}

/// Player input while the tutorial runs
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum TutorialInput {
    Command(Command),
    /// "Next" / "OK" on the guidance panel
    Confirm,
}

/// The one interaction a step responds to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Accepts {
    PlaceBatterAt(usize, usize),
    HarvestAt(usize, usize),
    StrongFire,
    ApplyJam,
    Discard,
    Serve,
    Confirm,
    Nothing,
}

impl Accepts {
    /// Shape check only; stage and stock conditions are checked by the controller
    pub fn matches(&self, input: &TutorialInput) -> bool {
        match (self, input) {
            (
                Accepts::PlaceBatterAt(r, c),
                TutorialInput::Command(Command::PlaceBatter { row, col }),
            ) => (r, c) == (row, col),
            (Accepts::HarvestAt(r, c), TutorialInput::Command(Command::Harvest { row, col })) => {
                (r, c) == (row, col)
            }
            (Accepts::StrongFire, TutorialInput::Command(Command::ActivateStrongFire)) => true,
            (Accepts::ApplyJam, TutorialInput::Command(Command::ApplyJam(_))) => true,
            (Accepts::Discard, TutorialInput::Command(Command::Discard)) => true,
            (Accepts::Serve, TutorialInput::Command(Command::Serve { .. })) => true,
            (Accepts::Confirm, TutorialInput::Confirm) => true,
            _ => false,
        }
    }
}

/// Side effect run when a step becomes active
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryAction {
    None,
    /// Keep the center cell from burning
    GuardCenter,
    /// Pour fresh batter in the center and lift the burn guard
    PlaceCenterBatter,
    SeatScriptedCustomer,
    PersistCompletion,
}

/// UI element the view should spotlight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Highlight {
    None,
    GrillCell(usize, usize),
    Grill,
    FireButton,
    ConfirmButton,
    JamButtons,
    TrashButton,
    Customer,
    Stars,
}

#[derive(Debug, Clone, Copy)]
pub struct StepDescriptor {
    pub step: TutorialStep,
    /// Message key for the guidance panel
    pub guidance: &'static str,
    pub accepts: Accepts,
    pub paused: bool,
    pub entry: EntryAction,
    pub highlight: Highlight,
}

const CENTER_ROW: usize = GRILL_CENTER.0;
const CENTER_COL: usize = GRILL_CENTER.1;

pub const STEPS: [StepDescriptor; 10] = [
    StepDescriptor {
        step: TutorialStep::GrillTouch,
        guidance: "tutorial.grill_touch",
        accepts: Accepts::PlaceBatterAt(CENTER_ROW, CENTER_COL),
        paused: true,
        entry: EntryAction::None,
        highlight: Highlight::GrillCell(CENTER_ROW, CENTER_COL),
    },
    StepDescriptor {
        step: TutorialStep::HeatExplanation,
        guidance: "tutorial.heat",
        accepts: Accepts::Confirm,
        paused: true,
        entry: EntryAction::None,
        highlight: Highlight::Grill,
    },
    StepDescriptor {
        step: TutorialStep::StrongFire,
        guidance: "tutorial.strong_fire",
        accepts: Accepts::StrongFire,
        paused: false,
        entry: EntryAction::GuardCenter,
        highlight: Highlight::FireButton,
    },
    StepDescriptor {
        step: TutorialStep::PickPerfect,
        guidance: "tutorial.pick_perfect",
        accepts: Accepts::HarvestAt(CENTER_ROW, CENTER_COL),
        paused: false,
        entry: EntryAction::GuardCenter,
        highlight: Highlight::GrillCell(CENTER_ROW, CENTER_COL),
    },
    StepDescriptor {
        step: TutorialStep::BurnWarning,
        guidance: "tutorial.burn_warning",
        accepts: Accepts::Confirm,
        paused: false,
        entry: EntryAction::PlaceCenterBatter,
        highlight: Highlight::GrillCell(CENTER_ROW, CENTER_COL),
    },
    StepDescriptor {
        step: TutorialStep::ApplyJam,
        guidance: "tutorial.apply_jam",
        accepts: Accepts::ApplyJam,
        paused: true,
        entry: EntryAction::None,
        highlight: Highlight::JamButtons,
    },
    StepDescriptor {
        step: TutorialStep::TrashBurnt,
        guidance: "tutorial.trash_burnt",
        accepts: Accepts::Discard,
        paused: true,
        entry: EntryAction::None,
        highlight: Highlight::TrashButton,
    },
    StepDescriptor {
        step: TutorialStep::ServeCustomer,
        guidance: "tutorial.serve_customer",
        accepts: Accepts::Serve,
        paused: true,
        entry: EntryAction::SeatScriptedCustomer,
        highlight: Highlight::Customer,
    },
    StepDescriptor {
        step: TutorialStep::StarExplanation,
        guidance: "tutorial.stars",
        accepts: Accepts::Confirm,
        paused: true,
        entry: EntryAction::None,
        highlight: Highlight::Stars,
    },
    StepDescriptor {
        step: TutorialStep::Complete,
        guidance: "tutorial.complete",
        accepts: Accepts::Nothing,
        paused: true,
        entry: EntryAction::PersistCompletion,
        highlight: Highlight::None,
    },
];

impl TutorialStep {
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn descriptor(self) -> &'static StepDescriptor {
        &STEPS[self.index()]
    }

    /// Following step in script order
    pub fn next(self) -> Option<TutorialStep> {
        STEPS.get(self.index() + 1).map(|d| d.step)
    }
}
