//! Scripted onboarding over the real grill and trays
//!
//! Runs the same Grill/Tray/CustomerPool primitives as a round, but every
//! input is filtered through the active step's descriptor. Steps only
//! advance from their completion handlers, never from the clock.

use serde::Serialize;

use super::step::{Accepts, EntryAction, Highlight, StepDescriptor, TutorialInput, TutorialStep};
use crate::consts::GRILL_CENTER;
use crate::persistence::{self, KeyValueStore};
use crate::sim::station;
use crate::sim::{
    Command, CommandError, CookingStage, CustomerPool, GameEvent, Grill, JamType, Tray, TrayKind,
    TrayWaffle,
};
use crate::tuning::Tuning;

/// Patience of the scripted customer; effectively never leaves
pub const SCRIPTED_PATIENCE: f32 = f32::MAX;

/// What happened to a tutorial input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TutorialResponse {
    /// Not the interaction this step is waiting for
    Ignored,
    /// Moved on to the given step
    Advanced(TutorialStep),
}

pub struct TutorialController<S: KeyValueStore> {
    step: TutorialStep,
    is_waiting_for_action: bool,
    /// Center waffle has burnt during the burn warning
    has_burnt: bool,
    confirm_enabled: bool,
    /// Seconds until the burnt waffle is moved to the tray
    burn_move_timer: Option<f32>,
    applied_jam: Option<JamType>,
    scripted_slot: Option<usize>,
    finished: bool,

    grill: Grill,
    work_tray: Tray,
    finished_tray: Tray,
    customers: CustomerPool,
    is_strong_fire: bool,
    strong_fire_remaining: f32,
    money: u32,

    tuning: Tuning,
    store: S,
    events: Vec<GameEvent>,
}

impl<S: KeyValueStore> TutorialController<S> {
    pub fn new(tuning: Tuning, store: S) -> Self {
        let mut ctrl = Self {
            step: TutorialStep::GrillTouch,
            is_waiting_for_action: false,
            has_burnt: false,
            confirm_enabled: false,
            burn_move_timer: None,
            applied_jam: None,
            scripted_slot: None,
            finished: false,
            grill: Grill::new(),
            work_tray: Tray::new(TrayKind::Work, tuning.work_tray_capacity),
            finished_tray: Tray::new(TrayKind::Finished, tuning.finished_tray_capacity),
            customers: CustomerPool::new(tuning.max_customers, tuning.order_size, tuning.patience),
            is_strong_fire: false,
            strong_fire_remaining: 0.0,
            money: 0,
            tuning,
            store,
            events: Vec::new(),
        };
        log::info!("Tutorial started");
        ctrl.enter(TutorialStep::GrillTouch);
        ctrl
    }

    pub fn current_step(&self) -> TutorialStep {
        self.step
    }

    fn descriptor(&self) -> &'static StepDescriptor {
        self.step.descriptor()
    }

    pub fn is_waiting_for_action(&self) -> bool {
        self.is_waiting_for_action
    }

    pub fn is_cooking_paused(&self) -> bool {
        self.finished || self.descriptor().paused
    }

    pub fn highlight(&self) -> Highlight {
        self.descriptor().highlight
    }

    pub fn guidance(&self) -> &'static str {
        self.descriptor().guidance
    }

    pub fn confirm_enabled(&self) -> bool {
        self.confirm_enabled
    }

    pub fn has_burnt(&self) -> bool {
        self.has_burnt
    }

    /// Host should leave the tutorial flow
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn grill(&self) -> &Grill {
        &self.grill
    }

    pub fn work_tray(&self) -> &Tray {
        &self.work_tray
    }

    pub fn finished_tray(&self) -> &Tray {
        &self.finished_tray
    }

    pub fn customers(&self) -> &CustomerPool {
        &self.customers
    }

    pub fn is_strong_fire(&self) -> bool {
        self.is_strong_fire
    }

    pub fn money(&self) -> u32 {
        self.money
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    // ------------------------------------------------------------------
    // Step transitions
    // ------------------------------------------------------------------

    fn advance(&mut self) -> TutorialResponse {
        match self.step.next() {
            Some(next) => {
                self.enter(next);
                TutorialResponse::Advanced(next)
            }
            None => TutorialResponse::Ignored,
        }
    }

    fn enter(&mut self, step: TutorialStep) {
        self.step = step;
        let desc = step.descriptor();
        self.confirm_enabled = desc.accepts == Accepts::Confirm
            && step != TutorialStep::BurnWarning;
        self.is_waiting_for_action = step != TutorialStep::BurnWarning
            && desc.accepts != Accepts::Nothing;

        log::info!("Tutorial step: {:?}", step);
        self.events.push(GameEvent::TutorialStepEntered(step));

        match desc.entry {
            EntryAction::None => {}
            EntryAction::GuardCenter => self.grill.set_burn_guard(Some(GRILL_CENTER)),
            EntryAction::PlaceCenterBatter => {
                self.grill.set_burn_guard(None);
                let (row, col) = GRILL_CENTER;
                let placed = station::place_batter(&mut self.grill, row, col, &mut self.events);
                if let Err(e) = placed {
                    log::warn!("Tutorial could not place batter: {}", e);
                }
            }
            EntryAction::SeatScriptedCustomer => self.seat_scripted_customer(),
            EntryAction::PersistCompletion => self.complete(false),
        }
    }

    fn seat_scripted_customer(&mut self) {
        let jam = self.applied_jam.unwrap_or(JamType::Strawberry);

        // The customer must be servable on the first try
        let head_matches = self
            .finished_tray
            .peek_first()
            .is_ok_and(|w| w.jam == Some(jam));
        if !head_matches {
            self.finished_tray.clear();
            let waffle = TrayWaffle {
                stage: CookingStage::Perfect,
                jam: Some(jam),
            };
            if let Err(e) = self.finished_tray.push(waffle) {
                log::warn!("Tutorial could not stock finished tray: {}", e);
            }
            station::tray_changed(&self.finished_tray, &mut self.events);
        }

        match self
            .customers
            .seat(1, SCRIPTED_PATIENCE, Some(jam), &mut self.events)
        {
            Ok(slot) => self.scripted_slot = Some(slot),
            Err(e) => log::warn!("Tutorial could not seat customer: {}", e),
        }
    }

    fn complete(&mut self, skipped: bool) {
        if self.finished {
            return;
        }
        self.step = TutorialStep::Complete;
        self.finished = true;
        self.is_waiting_for_action = false;
        self.confirm_enabled = false;
        self.burn_move_timer = None;
        if let Err(e) = persistence::mark_tutorial_completed(&mut self.store) {
            log::warn!("Failed to persist tutorial completion: {}", e);
        }
        log::info!("Tutorial completed (skipped: {})", skipped);
        self.events.push(GameEvent::TutorialCompleted { skipped });
    }

    /// Leave the tutorial from any step. The host asks for confirmation first.
    pub fn skip(&mut self) {
        if !self.finished {
            log::info!("Tutorial skipped at {:?}", self.step);
        }
        self.complete(true);
    }

    // ------------------------------------------------------------------
    // Simulation
    // ------------------------------------------------------------------

    pub fn tick(&mut self, dt: f32) {
        if self.is_cooking_paused() || dt <= 0.0 {
            return;
        }

        let heat = if self.is_strong_fire {
            self.tuning.strong_fire_power
        } else {
            1.0
        };
        self.grill
            .tick(dt, heat, &self.tuning.tutorial_heat, &mut self.events);

        if self.is_strong_fire {
            self.strong_fire_remaining -= dt;
            if self.strong_fire_remaining <= 0.0 {
                self.strong_fire_remaining = 0.0;
                self.is_strong_fire = false;
                self.events.push(GameEvent::StrongFireChanged { active: false });
            }
        }

        self.customers.tick(dt, &mut self.events);

        if self.step == TutorialStep::BurnWarning {
            self.watch_burn(dt);
        }
    }

    /// Burn warning: wait for the center to burn, then move it to the tray
    /// after a short delay and unlock the confirm button.
    fn watch_burn(&mut self, dt: f32) {
        let (row, col) = GRILL_CENTER;
        if !self.has_burnt {
            let burnt = self
                .grill
                .slot(row, col)
                .is_some_and(|s| s.stage == CookingStage::Burnt);
            if burnt {
                self.has_burnt = true;
                self.burn_move_timer = Some(self.tuning.tutorial_burn_move_delay);
            }
            return;
        }

        let Some(remaining) = self.burn_move_timer.as_mut() else {
            return;
        };
        *remaining -= dt;
        if *remaining > 0.0 {
            return;
        }
        self.burn_move_timer = None;

        if let Err(e) = station::harvest(
            &mut self.grill,
            &mut self.work_tray,
            row,
            col,
            &mut self.events,
        ) {
            log::warn!("Tutorial could not move burnt waffle: {}", e);
        }

        self.confirm_enabled = true;
        self.is_waiting_for_action = true;
        self.events.push(GameEvent::TutorialConfirmEnabled);
    }

    // ------------------------------------------------------------------
    // Input
    // ------------------------------------------------------------------

    /// Route a player input through the active step.
    ///
    /// Inputs the step is not waiting for are ignored. An accepted input
    /// that fails validation (e.g. topping a burnt waffle) returns the
    /// command error and the step stays put.
    pub fn handle(&mut self, input: TutorialInput) -> Result<TutorialResponse, CommandError> {
        if self.finished || !self.descriptor().accepts.matches(&input) {
            return Ok(TutorialResponse::Ignored);
        }

        match (self.step, input) {
            (TutorialStep::GrillTouch, TutorialInput::Command(Command::PlaceBatter { row, col })) => {
                station::place_batter(&mut self.grill, row, col, &mut self.events)?;
                Ok(self.advance())
            }
            (TutorialStep::StrongFire, TutorialInput::Command(Command::ActivateStrongFire)) => {
                if !self.is_strong_fire {
                    self.is_strong_fire = true;
                    self.strong_fire_remaining = self.tuning.strong_fire_secs;
                    self.events.push(GameEvent::StrongFireChanged { active: true });
                }
                Ok(self.advance())
            }
            (TutorialStep::PickPerfect, TutorialInput::Command(Command::Harvest { row, col })) => {
                let ready = self
                    .grill
                    .slot(row, col)
                    .is_some_and(|s| s.stage == CookingStage::Perfect);
                if !ready {
                    return Ok(TutorialResponse::Ignored);
                }
                station::harvest(
                    &mut self.grill,
                    &mut self.work_tray,
                    row,
                    col,
                    &mut self.events,
                )?;
                Ok(self.advance())
            }
            (TutorialStep::ApplyJam, TutorialInput::Command(Command::ApplyJam(jam))) => {
                station::apply_jam(
                    &mut self.work_tray,
                    &mut self.finished_tray,
                    jam,
                    &mut self.events,
                )?;
                self.applied_jam = Some(jam);
                Ok(self.advance())
            }
            (TutorialStep::TrashBurnt, TutorialInput::Command(Command::Discard)) => {
                station::discard(&mut self.work_tray, &mut self.events)?;
                Ok(self.advance())
            }
            (TutorialStep::ServeCustomer, TutorialInput::Command(Command::Serve { slot })) => {
                if self.scripted_slot != Some(slot) {
                    return Ok(TutorialResponse::Ignored);
                }
                let sale = station::serve(
                    &mut self.customers,
                    &mut self.finished_tray,
                    slot,
                    0,
                    &mut self.events,
                )?;
                self.money = self.money.saturating_add(sale.revenue);
                self.scripted_slot = None;
                Ok(self.advance())
            }
            (
                TutorialStep::HeatExplanation
                | TutorialStep::BurnWarning
                | TutorialStep::StarExplanation,
                TutorialInput::Confirm,
            ) => {
                if !self.confirm_enabled {
                    return Ok(TutorialResponse::Ignored);
                }
                Ok(self.advance())
            }
            _ => Ok(TutorialResponse::Ignored),
        }
    }
}
