//! Round controller: one timed day
//!
//! Owns the grill, both trays and the customer pool. The host feeds frame
//! time into [`RoundController::tick`] and player actions into
//! [`RoundController::apply`]; both leave a trail of [`GameEvent`]s for the
//! view layer to drain.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::customer::CustomerPool;
use super::error::CommandError;
use super::event::{GameEvent, RoundOutcome};
use super::grill::{Grill, UNIFORM_HEAT};
use super::stage::JamType;
use super::station;
use super::tray::{Tray, TrayKind};
use crate::tuning::{Span, Tuning};
use crate::upgrades::RoundModifiers;

/// Where the round is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundPhase {
    Running,
    /// Time ran out; waiting for the host to start the next round
    Ended(RoundOutcome),
}

/// Player actions
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Command {
    PlaceBatter { row: usize, col: usize },
    Harvest { row: usize, col: usize },
    ApplyJam(JamType),
    Discard,
    Serve { slot: usize },
    ActivateStrongFire,
}

/// Round bookkeeping (HUD state)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundState {
    pub day: u32,
    pub money: u32,
    pub target_money: u32,
    pub time_remaining: f32,
    pub max_time: f32,
    pub is_strong_fire: bool,
    pub strong_fire_remaining: f32,
    pub phase: RoundPhase,
    /// Customers served this round
    pub served: u32,
    /// Customers who left angry this round
    pub missed: u32,
    pub waffles_sold: u32,
}

impl RoundState {
    fn new(day: u32, target_money: u32, round_secs: f32) -> Self {
        Self {
            day,
            money: 0,
            target_money,
            time_remaining: round_secs,
            max_time: round_secs,
            is_strong_fire: false,
            strong_fire_remaining: 0.0,
            phase: RoundPhase::Running,
            served: 0,
            missed: 0,
            waffles_sold: 0,
        }
    }

    pub fn is_running(&self) -> bool {
        self.phase == RoundPhase::Running
    }
}

/// Final numbers of an ended round, for the progression layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundResult {
    pub day: u32,
    pub money: u32,
    pub target_money: u32,
    pub outcome: RoundOutcome,
}

/// Randomized arrival timer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpawnScheduler {
    interval: Span<f32>,
    elapsed: f32,
    next_interval: f32,
}

impl SpawnScheduler {
    pub fn new<R: Rng + ?Sized>(interval: Span<f32>, rng: &mut R) -> Self {
        Self {
            interval,
            elapsed: 0.0,
            next_interval: interval.sample(rng),
        }
    }

    /// Advance the timer. Returns true when an arrival is due; the timer
    /// restarts with a fresh interval either way the spawn goes.
    pub fn tick<R: Rng + ?Sized>(&mut self, dt: f32, rng: &mut R) -> bool {
        self.elapsed += dt;
        if self.elapsed >= self.next_interval {
            self.elapsed = 0.0;
            self.next_interval = self.interval.sample(rng);
            true
        } else {
            false
        }
    }

    pub fn reset<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.elapsed = 0.0;
        self.next_interval = self.interval.sample(rng);
    }
}

pub struct RoundController<R: Rng = Pcg32> {
    state: RoundState,
    grill: Grill,
    work_tray: Tray,
    finished_tray: Tray,
    customers: CustomerPool,
    spawner: SpawnScheduler,
    modifiers: RoundModifiers,
    tuning: Tuning,
    rng: R,
    events: Vec<GameEvent>,
}

impl RoundController<Pcg32> {
    /// Day-1 round with a seeded RNG
    pub fn with_seed(seed: u64, tuning: Tuning, modifiers: RoundModifiers) -> Self {
        Self::new(tuning, modifiers, Pcg32::seed_from_u64(seed))
    }
}

impl<R: Rng> RoundController<R> {
    pub fn new(tuning: Tuning, modifiers: RoundModifiers, rng: R) -> Self {
        Self::at_day(1, tuning, modifiers, rng)
    }

    /// Start at a saved day; the target follows the day
    pub fn at_day(day: u32, tuning: Tuning, modifiers: RoundModifiers, mut rng: R) -> Self {
        let day = day.max(1);
        let target = tuning
            .start_target
            .saturating_add(tuning.target_increment.saturating_mul(day - 1));
        let spawner = SpawnScheduler::new(tuning.spawn_interval, &mut rng);
        log::info!(
            "Day {} starts: target {}, {:.0}s",
            day,
            target,
            modifiers.round_secs
        );
        Self {
            state: RoundState::new(day, target, modifiers.round_secs),
            grill: Grill::new(),
            work_tray: Tray::new(TrayKind::Work, modifiers.work_tray_capacity),
            finished_tray: Tray::new(TrayKind::Finished, modifiers.finished_tray_capacity),
            customers: CustomerPool::new(tuning.max_customers, tuning.order_size, tuning.patience),
            spawner,
            modifiers,
            tuning,
            rng,
            events: Vec::new(),
        }
    }

    pub fn state(&self) -> &RoundState {
        &self.state
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

    pub fn modifiers(&self) -> &RoundModifiers {
        &self.modifiers
    }

    /// Take all events emitted since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Final numbers, once the round has ended
    pub fn result(&self) -> Option<RoundResult> {
        match self.state.phase {
            RoundPhase::Running => None,
            RoundPhase::Ended(outcome) => Some(RoundResult {
                day: self.state.day,
                money: self.state.money,
                target_money: self.state.target_money,
                outcome,
            }),
        }
    }

    /// Current cook speed multiplier for every cell
    pub fn heat(&self) -> f32 {
        let fire = if self.state.is_strong_fire {
            self.modifiers.strong_fire_power
        } else {
            1.0
        };
        fire * self.modifiers.cook_speed
    }

    /// Advance the round by one frame. Never fails.
    pub fn tick(&mut self, dt: f32) {
        if !self.state.is_running() || dt <= 0.0 {
            return;
        }

        let heat = self.heat();
        self.grill.tick(dt, heat, &UNIFORM_HEAT, &mut self.events);

        if self.state.is_strong_fire {
            self.state.strong_fire_remaining -= dt;
            if self.state.strong_fire_remaining <= 0.0 {
                self.state.strong_fire_remaining = 0.0;
                self.state.is_strong_fire = false;
                self.events.push(GameEvent::StrongFireChanged { active: false });
            }
        }

        self.state.missed += self.customers.tick(dt, &mut self.events);
        if self.spawner.tick(dt, &mut self.rng) {
            if let Err(e) = self.customers.try_spawn(&mut self.rng, &mut self.events) {
                log::debug!("Spawn skipped: {}", e);
            }
        }

        self.state.time_remaining -= dt;
        if self.state.time_remaining <= 0.0 {
            self.state.time_remaining = 0.0;
            self.end_round();
        }
    }

    fn end_round(&mut self) {
        let outcome = if self.state.money >= self.state.target_money {
            RoundOutcome::Success
        } else {
            RoundOutcome::Failure
        };
        self.state.phase = RoundPhase::Ended(outcome);
        self.state.is_strong_fire = false;
        self.state.strong_fire_remaining = 0.0;
        log::info!(
            "Day {} ended {:?}: {} / {} (served {}, missed {})",
            self.state.day,
            outcome,
            self.state.money,
            self.state.target_money,
            self.state.served,
            self.state.missed
        );
        self.events.push(GameEvent::RoundEnded {
            outcome,
            money: self.state.money,
            target: self.state.target_money,
        });
    }

    /// Start the next round after an ended one.
    ///
    /// Success moves to the next day with a higher target; failure retries
    /// the same day. Modifiers are re-read so upgrades bought between
    /// rounds take effect. Returns `None` while the round is still running.
    pub fn next_round(&mut self, modifiers: RoundModifiers) -> Option<RoundOutcome> {
        let RoundPhase::Ended(outcome) = self.state.phase else {
            return None;
        };

        let (day, target) = match outcome {
            RoundOutcome::Success => (
                self.state.day.saturating_add(1),
                self.state
                    .target_money
                    .saturating_add(self.tuning.target_increment),
            ),
            RoundOutcome::Failure => (self.state.day, self.state.target_money),
        };

        self.modifiers = modifiers;
        self.state = RoundState::new(day, target, modifiers.round_secs);
        self.grill.clear();
        self.work_tray.clear();
        self.work_tray.set_capacity(modifiers.work_tray_capacity);
        self.finished_tray.clear();
        self.finished_tray.set_capacity(modifiers.finished_tray_capacity);
        self.customers.clear();
        self.spawner.reset(&mut self.rng);

        log::info!(
            "Day {} starts: target {}, {:.0}s",
            day,
            target,
            modifiers.round_secs
        );
        self.push_tray_events();
        Some(outcome)
    }

    fn ensure_running(&self) -> Result<(), CommandError> {
        if self.state.is_running() {
            Ok(())
        } else {
            Err(CommandError::RoundOver)
        }
    }

    fn push_tray_events(&mut self) {
        station::tray_changed(&self.work_tray, &mut self.events);
        station::tray_changed(&self.finished_tray, &mut self.events);
    }

    /// Dispatch a player command
    pub fn apply(&mut self, command: Command) -> Result<(), CommandError> {
        match command {
            Command::PlaceBatter { row, col } => self.place_batter(row, col),
            Command::Harvest { row, col } => self.harvest(row, col),
            Command::ApplyJam(jam) => self.apply_jam(jam),
            Command::Discard => self.discard(),
            Command::Serve { slot } => self.serve(slot).map(|_| ()),
            Command::ActivateStrongFire => self.activate_strong_fire(),
        }
    }

    pub fn place_batter(&mut self, row: usize, col: usize) -> Result<(), CommandError> {
        self.ensure_running()?;
        station::place_batter(&mut self.grill, row, col, &mut self.events)
    }

    /// Move a cell's waffle onto the work tray. A full tray leaves the grill untouched.
    pub fn harvest(&mut self, row: usize, col: usize) -> Result<(), CommandError> {
        self.ensure_running()?;
        station::harvest(
            &mut self.grill,
            &mut self.work_tray,
            row,
            col,
            &mut self.events,
        )?;
        Ok(())
    }

    pub fn apply_jam(&mut self, jam: JamType) -> Result<(), CommandError> {
        self.ensure_running()?;
        station::apply_jam(
            &mut self.work_tray,
            &mut self.finished_tray,
            jam,
            &mut self.events,
        )?;
        Ok(())
    }

    pub fn discard(&mut self) -> Result<(), CommandError> {
        self.ensure_running()?;
        station::discard(&mut self.work_tray, &mut self.events)?;
        Ok(())
    }

    /// Sell to the customer in `slot`. Returns the revenue including the price bonus.
    pub fn serve(&mut self, slot: usize) -> Result<u32, CommandError> {
        self.ensure_running()?;
        let sale = station::serve(
            &mut self.customers,
            &mut self.finished_tray,
            slot,
            self.modifiers.price_bonus,
            &mut self.events,
        )?;
        let sold = sale.waffles.len() as u32;

        self.state.money = self.state.money.saturating_add(sale.revenue);
        self.state.served += 1;
        self.state.waffles_sold += sold;
        log::debug!(
            "Served customer {} x{} for {} (total {})",
            sale.customer_id,
            sold,
            sale.revenue,
            self.state.money
        );
        Ok(sale.revenue)
    }

    /// Turn on strong fire. No effect while it is already burning.
    pub fn activate_strong_fire(&mut self) -> Result<(), CommandError> {
        self.ensure_running()?;
        if self.state.is_strong_fire {
            return Ok(());
        }
        self.state.is_strong_fire = true;
        self.state.strong_fire_remaining = self.modifiers.strong_fire_secs;
        self.events.push(GameEvent::StrongFireChanged { active: true });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::stage::{BATTER_SECS, CookingStage};
    use proptest::prelude::*;

    fn controller() -> RoundController {
        let tuning = Tuning::default();
        let modifiers = RoundModifiers::base(&tuning);
        RoundController::with_seed(1234, tuning, modifiers)
    }

    /// Controller with no random arrivals during the test window
    fn quiet_controller() -> RoundController {
        let tuning = Tuning {
            spawn_interval: Span::new(1000.0, 1000.0),
            round_secs: 500.0,
            ..Default::default()
        };
        let modifiers = RoundModifiers::base(&tuning);
        RoundController::with_seed(1, tuning, modifiers)
    }

    fn run(ctrl: &mut RoundController, secs: f32) {
        let steps = (secs / 0.5).round() as u32;
        for _ in 0..steps {
            ctrl.tick(0.5);
        }
    }

    /// Cook one waffle to `stage` in cell (0, 0) and harvest it
    fn harvest_at(ctrl: &mut RoundController, stage: CookingStage) {
        ctrl.place_batter(0, 0).unwrap();
        while ctrl.grill().slot(0, 0).unwrap().stage != stage {
            ctrl.tick(0.5);
        }
        ctrl.harvest(0, 0).unwrap();
    }

    #[test]
    fn test_round_starts_running() {
        let ctrl = controller();
        let state = ctrl.state();
        assert_eq!(state.day, 1);
        assert_eq!(state.money, 0);
        assert_eq!(state.target_money, 1000);
        assert_eq!(state.time_remaining, 60.0);
        assert_eq!(state.phase, RoundPhase::Running);
        assert!(ctrl.result().is_none());
    }

    #[test]
    fn test_strong_fire_doubles_and_expires() {
        let mut ctrl = quiet_controller();
        ctrl.place_batter(1, 1).unwrap();
        ctrl.activate_strong_fire().unwrap();
        assert!(ctrl.state().is_strong_fire);
        assert_eq!(ctrl.heat(), 2.0);

        // Idempotent: a second activation does not refresh the timer
        run(&mut ctrl, 1.0);
        ctrl.activate_strong_fire().unwrap();
        assert_eq!(ctrl.state().strong_fire_remaining, 2.0);

        run(&mut ctrl, 2.0);
        assert!(!ctrl.state().is_strong_fire);
        // 3s at 2x = 6s of cooking
        let slot = ctrl.grill().slot(1, 1).unwrap();
        assert_eq!(slot.stage, CookingStage::Batter);
        assert_eq!(slot.cook_time, 6.0);

        let events = ctrl.drain_events();
        let toggles: Vec<_> = events
            .iter()
            .filter(|e| matches!(e, GameEvent::StrongFireChanged { .. }))
            .collect();
        assert_eq!(toggles.len(), 2);
    }

    #[test]
    fn test_cook_top_serve_flow() {
        let mut ctrl = quiet_controller();
        harvest_at(&mut ctrl, CookingStage::Perfect);
        assert_eq!(ctrl.work_tray().len(), 1);

        ctrl.apply(Command::ApplyJam(JamType::Strawberry)).unwrap();
        assert!(ctrl.work_tray().is_empty());
        assert_eq!(ctrl.finished_tray().len(), 1);

        ctrl.customers.seat(1, 30.0, None, &mut ctrl.events).unwrap();
        let revenue = ctrl.serve(0).unwrap();
        assert_eq!(revenue, CookingStage::Perfect.base_price());
        assert_eq!(ctrl.state().money, revenue);
        assert_eq!(ctrl.state().served, 1);
        assert!(ctrl.finished_tray().is_empty());
        assert!(ctrl.customers().get(0).is_none());
    }

    #[test]
    fn test_price_bonus_added_per_waffle() {
        let tuning = Tuning {
            spawn_interval: Span::new(1000.0, 1000.0),
            round_secs: 500.0,
            ..Default::default()
        };
        let mut modifiers = RoundModifiers::base(&tuning);
        modifiers.price_bonus = 20;
        let mut ctrl = RoundController::with_seed(5, tuning, modifiers);

        harvest_at(&mut ctrl, CookingStage::Cooked);
        harvest_at(&mut ctrl, CookingStage::Cooked);
        ctrl.apply_jam(JamType::Apple).unwrap();
        ctrl.apply_jam(JamType::Apple).unwrap();
        ctrl.customers.seat(2, 30.0, None, &mut ctrl.events).unwrap();

        let revenue = ctrl.serve(0).unwrap();
        assert_eq!(revenue, 2 * CookingStage::Cooked.base_price() + 40);
    }

    #[test]
    fn test_harvest_into_full_tray_keeps_grill() {
        let tuning = Tuning {
            work_tray_capacity: 1,
            spawn_interval: Span::new(1000.0, 1000.0),
            round_secs: 500.0,
            ..Default::default()
        };
        let modifiers = RoundModifiers::base(&tuning);
        let mut ctrl = RoundController::with_seed(9, tuning, modifiers);

        ctrl.place_batter(0, 0).unwrap();
        ctrl.place_batter(0, 1).unwrap();
        run(&mut ctrl, BATTER_SECS);
        ctrl.harvest(0, 0).unwrap();
        assert_eq!(
            ctrl.harvest(0, 1),
            Err(CommandError::CapacityExceeded(TrayKind::Work))
        );
        assert_eq!(
            ctrl.grill().slot(0, 1).unwrap().stage,
            CookingStage::Undercooked
        );
    }

    #[test]
    fn test_serve_insufficient_stock() {
        let mut ctrl = quiet_controller();
        harvest_at(&mut ctrl, CookingStage::Cooked);
        ctrl.apply_jam(JamType::Blueberry).unwrap();
        ctrl.customers.seat(2, 30.0, None, &mut ctrl.events).unwrap();

        assert_eq!(
            ctrl.serve(0),
            Err(CommandError::InsufficientStock {
                needed: 2,
                available: 1
            })
        );
        assert_eq!(ctrl.finished_tray().len(), 1);
        assert_eq!(ctrl.state().money, 0);
    }

    #[test]
    fn test_round_ends_with_failure_and_retries() {
        let mut ctrl = controller();
        run(&mut ctrl, 60.0);
        assert_eq!(ctrl.state().phase, RoundPhase::Ended(RoundOutcome::Failure));
        assert_eq!(ctrl.state().time_remaining, 0.0);

        // Commands are rejected once time is up
        assert_eq!(ctrl.place_batter(0, 0), Err(CommandError::RoundOver));

        // Ticks after the end do nothing
        let events_before = ctrl.drain_events();
        assert!(events_before.iter().any(|e| matches!(
            e,
            GameEvent::RoundEnded {
                outcome: RoundOutcome::Failure,
                ..
            }
        )));
        ctrl.tick(1.0);
        assert!(ctrl.drain_events().is_empty());

        let modifiers = *ctrl.modifiers();
        assert_eq!(ctrl.next_round(modifiers), Some(RoundOutcome::Failure));
        assert_eq!(ctrl.state().day, 1);
        assert_eq!(ctrl.state().target_money, 1000);
        assert_eq!(ctrl.state().money, 0);
        assert!(ctrl.state().is_running());
    }

    #[test]
    fn test_success_advances_day() {
        let tuning = Tuning {
            start_target: 0,
            ..Default::default()
        };
        let modifiers = RoundModifiers::base(&tuning);
        let mut ctrl = RoundController::with_seed(77, tuning, modifiers);
        assert_eq!(ctrl.next_round(modifiers), None);

        run(&mut ctrl, 60.0);
        let result = ctrl.result().unwrap();
        assert_eq!(result.outcome, RoundOutcome::Success);

        let mut upgraded = modifiers;
        upgraded.round_secs = 70.0;
        upgraded.work_tray_capacity = 7;
        assert_eq!(ctrl.next_round(upgraded), Some(RoundOutcome::Success));
        assert_eq!(ctrl.state().day, 2);
        assert_eq!(ctrl.state().target_money, 500);
        assert_eq!(ctrl.state().time_remaining, 70.0);
        assert_eq!(ctrl.work_tray().capacity(), 7);
        assert_eq!(ctrl.grill().occupied(), 0);
        assert_eq!(ctrl.customers().waiting(), 0);
    }

    #[test]
    fn test_at_day_sets_target() {
        let tuning = Tuning::default();
        let modifiers = RoundModifiers::base(&tuning);
        let ctrl = RoundController::at_day(4, tuning, modifiers, Pcg32::seed_from_u64(0));
        assert_eq!(ctrl.state().target_money, 1000 + 3 * 500);
    }

    #[test]
    fn test_at_huge_day_saturates_target() {
        let tuning = Tuning::default();
        let modifiers = RoundModifiers::base(&tuning);
        let mut ctrl =
            RoundController::at_day(u32::MAX, tuning, modifiers, Pcg32::seed_from_u64(0));
        assert_eq!(ctrl.state().day, u32::MAX);
        assert_eq!(ctrl.state().target_money, u32::MAX);

        // Clearing it cannot overflow either
        ctrl.state.money = u32::MAX;
        run(&mut ctrl, 60.0);
        assert_eq!(ctrl.next_round(modifiers), Some(RoundOutcome::Success));
        assert_eq!(ctrl.state().day, u32::MAX);
        assert_eq!(ctrl.state().target_money, u32::MAX);
    }

    #[test]
    fn test_customers_arrive_and_leave() {
        let mut ctrl = controller();
        run(&mut ctrl, 59.0);
        let events = ctrl.drain_events();
        let spawned = events
            .iter()
            .filter(|e| matches!(e, GameEvent::CustomerSpawned { .. }))
            .count();
        let departed = events
            .iter()
            .filter(|e| matches!(e, GameEvent::CustomerDeparted { .. }))
            .count();
        assert!(spawned > 0);
        assert!(ctrl.customers().waiting() <= 3);
        assert_eq!(departed as u32, ctrl.state().missed);
    }

    #[test]
    fn test_same_seed_same_round() {
        let mut a = controller();
        let mut b = controller();
        run(&mut a, 30.0);
        run(&mut b, 30.0);
        assert_eq!(a.drain_events(), b.drain_events());
    }

    fn arb_command() -> impl Strategy<Value = Command> {
        prop_oneof![
            (0..3usize, 0..3usize).prop_map(|(row, col)| Command::PlaceBatter { row, col }),
            (0..3usize, 0..3usize).prop_map(|(row, col)| Command::Harvest { row, col }),
            Just(Command::ApplyJam(JamType::Apple)),
            Just(Command::Discard),
            (0..3usize).prop_map(|slot| Command::Serve { slot }),
            Just(Command::ActivateStrongFire),
        ]
    }

    proptest! {
        #[test]
        fn prop_money_only_grows_within_round(
            seed in any::<u64>(),
            steps in proptest::collection::vec((arb_command(), 0.0f32..2.0), 1..150),
        ) {
            let tuning = Tuning::default();
            let modifiers = RoundModifiers::base(&tuning);
            let mut ctrl = RoundController::with_seed(seed, tuning, modifiers);
            let mut last_money = 0;
            for (command, dt) in steps {
                let _ = ctrl.apply(command);
                ctrl.tick(dt);
                prop_assert!(ctrl.state().money >= last_money);
                prop_assert!(ctrl.work_tray().len() <= ctrl.work_tray().capacity());
                prop_assert!(ctrl.finished_tray().len() <= ctrl.finished_tray().capacity());
                last_money = ctrl.state().money;
            }
        }
    }
}
