//! Waffle Tycoon entry point
//!
//! Native: headless driver that plays the tutorial and a few days with a
//! simple autopilot, logging the event stream. Run with
//! `RUST_LOG=info waffle-tycoon [seed] [days]`.
//! Web: the page drives `WasmGame` from JavaScript.

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use wasm_bindgen::prelude::*;

    use waffle_tycoon::sim::{Command, FixedStep, JamType, RoundController};
    use waffle_tycoon::{RoundModifiers, Tuning};

    /// Round handle exposed to the page
    #[wasm_bindgen]
    pub struct WasmGame {
        round: RoundController,
        clock: FixedStep,
    }

    #[wasm_bindgen]
    impl WasmGame {
        #[wasm_bindgen(constructor)]
        pub fn new(seed: u64) -> WasmGame {
            let tuning = Tuning::default();
            let modifiers = RoundModifiers::base(&tuning);
            WasmGame {
                round: RoundController::with_seed(seed, tuning, modifiers),
                clock: FixedStep::new(),
            }
        }

        /// Advance by one animation frame (seconds)
        pub fn frame(&mut self, frame_dt: f32) {
            for _ in 0..self.clock.advance(frame_dt) {
                self.round.tick(waffle_tycoon::consts::SIM_DT);
            }
        }

        pub fn place_batter(&mut self, row: usize, col: usize) -> String {
            self.run(Command::PlaceBatter { row, col })
        }

        pub fn harvest(&mut self, row: usize, col: usize) -> String {
            self.run(Command::Harvest { row, col })
        }

        pub fn apply_jam(&mut self, jam: &str) -> String {
            match JamType::from_str(jam) {
                Some(jam) => self.run(Command::ApplyJam(jam)),
                None => "Unknown topping".to_string(),
            }
        }

        pub fn discard(&mut self) -> String {
            self.run(Command::Discard)
        }

        pub fn serve(&mut self, slot: usize) -> String {
            self.run(Command::Serve { slot })
        }

        pub fn strong_fire(&mut self) -> String {
            self.run(Command::ActivateStrongFire)
        }

        /// Round state as JSON
        pub fn state_json(&self) -> String {
            serde_json::to_string(self.round.state()).unwrap_or_default()
        }

        /// Events since the last call, as a JSON array
        pub fn drain_events_json(&mut self) -> String {
            serde_json::to_string(&self.round.drain_events()).unwrap_or_default()
        }
    }

    impl WasmGame {
        /// Returns an error message for the HUD, or an empty string
        fn run(&mut self, command: Command) -> String {
            match self.round.apply(command) {
                Ok(()) => String::new(),
                Err(e) => e.user_message().to_string(),
            }
        }
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        let _ = console_log::init_with_level(log::Level::Info);
        log::info!("Waffle Tycoon (web) ready");
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use waffle_tycoon::persistence::{MemoryStore, is_tutorial_completed};
    use waffle_tycoon::{DayRecords, RoundModifiers, Tuning, UpgradeLevels};

    env_logger::init();

    let mut args = std::env::args().skip(1);
    let seed: u64 = args.next().and_then(|s| s.parse().ok()).unwrap_or(42);
    let days: u32 = args.next().and_then(|s| s.parse().ok()).unwrap_or(3);
    log::info!("Waffle Tycoon (native) starting, seed {}", seed);

    let mut store = MemoryStore::new();
    let tuning = Tuning::load(&store);

    if !is_tutorial_completed(&store) {
        native::play_tutorial(&tuning, &mut store);
    }

    let upgrades = UpgradeLevels::load(&store);
    let mut records = DayRecords::load(&store);
    let modifiers = RoundModifiers::from_store(&upgrades, &tuning);
    let money_per_star = tuning.money_per_star;
    let mut round = waffle_tycoon::sim::RoundController::with_seed(seed, tuning, modifiers);

    for attempt in 1..=days {
        native::play_round(&mut round);
        if let Some(result) = round.result() {
            let update = records.record(&result, money_per_star);
            println!(
                "Attempt {}: day {} {:?} - {} / {} ({} stars)",
                attempt, result.day, result.outcome, result.money, result.target_money, update.stars
            );
        }
        round.next_round(modifiers);
    }

    if let Err(e) = records.save(&mut store) {
        log::warn!("Failed to save records: {}", e);
    }
    println!("Total stars: {}", records.total_stars());
}

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use waffle_tycoon::consts::SIM_DT;
    use waffle_tycoon::persistence::KeyValueStore;
    use waffle_tycoon::sim::{CookingStage, FixedStep, JamType, RoundController};
    use waffle_tycoon::tutorial::{Accepts, TutorialController, TutorialInput, TutorialStep};
    use waffle_tycoon::{Tuning, sim::Command};

    /// Simulated display refresh
    const FRAME_DT: f32 = 1.0 / 60.0;

    /// Walk the tutorial by answering each step with the input it asks for
    pub fn play_tutorial(tuning: &Tuning, store: &mut dyn KeyValueStore) {
        let mut tutorial = TutorialController::new(tuning.clone(), store);
        let mut clock = FixedStep::new();

        // Hard stop in case a step never unlocks
        for _ in 0..(60 * 120) {
            if tutorial.is_finished() {
                break;
            }
            for _ in 0..clock.advance(FRAME_DT) {
                tutorial.tick(SIM_DT);
            }

            let input = match tutorial.current_step().descriptor().accepts {
                Accepts::PlaceBatterAt(row, col) => {
                    Some(TutorialInput::Command(Command::PlaceBatter { row, col }))
                }
                Accepts::HarvestAt(row, col) => {
                    let ready = tutorial
                        .grill()
                        .slot(row, col)
                        .is_some_and(|s| s.stage == CookingStage::Perfect);
                    ready.then_some(TutorialInput::Command(Command::Harvest { row, col }))
                }
                Accepts::StrongFire => Some(TutorialInput::Command(Command::ActivateStrongFire)),
                Accepts::ApplyJam => Some(TutorialInput::Command(Command::ApplyJam(
                    JamType::Strawberry,
                ))),
                Accepts::Discard => Some(TutorialInput::Command(Command::Discard)),
                Accepts::Serve => tutorial
                    .customers()
                    .iter()
                    .next()
                    .map(|(slot, _)| TutorialInput::Command(Command::Serve { slot })),
                Accepts::Confirm => tutorial.confirm_enabled().then_some(TutorialInput::Confirm),
                Accepts::Nothing => None,
            };

            if let Some(input) = input {
                match tutorial.handle(input) {
                    Ok(response) => log::debug!("Tutorial input {:?}: {:?}", input, response),
                    Err(e) => log::warn!("Tutorial input rejected: {}", e),
                }
            }
            for event in tutorial.drain_events() {
                log::debug!("{:?}", event);
            }
        }

        if tutorial.current_step() != TutorialStep::Complete {
            log::warn!("Tutorial stalled, skipping");
            tutorial.skip();
        }
    }

    /// One frame of a greedy player
    fn autopilot(round: &mut RoundController, frame: u64) {
        let grill = round.grill().clone();
        for (row, col, slot) in grill.iter() {
            let result = match slot.stage {
                CookingStage::Empty => round.place_batter(row, col),
                CookingStage::Perfect | CookingStage::Burnt => round.harvest(row, col),
                _ => Ok(()),
            };
            if let Err(e) = result {
                log::trace!("Autopilot: {}", e.user_message());
            }
        }

        if let Ok(stage) = round.work_tray().peek_first().map(|w| w.stage) {
            let result = if stage == CookingStage::Burnt {
                round.discard()
            } else {
                let jam = JamType::ALL[(frame % JamType::ALL.len() as u64) as usize];
                round.apply_jam(jam)
            };
            if let Err(e) = result {
                log::trace!("Autopilot: {}", e.user_message());
            }
        }

        let waiting: Vec<usize> = round.customers().iter().map(|(slot, _)| slot).collect();
        for slot in waiting {
            if let Err(e) = round.serve(slot) {
                log::trace!("Autopilot: {}", e.user_message());
            }
        }

        if round.grill().occupied() > 4 {
            if let Err(e) = round.activate_strong_fire() {
                log::trace!("Autopilot: {}", e.user_message());
            }
        }
    }

    /// Play until the round ends
    pub fn play_round(round: &mut RoundController) {
        let mut clock = FixedStep::new();
        let mut frame = 0u64;
        while round.state().is_running() {
            for _ in 0..clock.advance(FRAME_DT) {
                round.tick(SIM_DT);
            }
            autopilot(round, frame);
            for event in round.drain_events() {
                log::debug!("{:?}", event);
            }
            frame += 1;
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use waffle_tycoon::RoundModifiers;
        use waffle_tycoon::persistence::{MemoryStore, is_tutorial_completed};

        #[test]
        fn test_autopilot_plays_round_to_the_end() {
            let tuning = Tuning::default();
            let modifiers = RoundModifiers::base(&tuning);
            let mut round = RoundController::with_seed(42, tuning, modifiers);
            play_round(&mut round);
            let result = round.result().unwrap();
            assert_eq!(result.day, 1);
            assert!(round.state().served > 0);
        }

        #[test]
        fn test_autopilot_finishes_tutorial() {
            let mut store = MemoryStore::new();
            play_tutorial(&Tuning::default(), &mut store);
            assert!(is_tutorial_completed(&store));
        }
    }
}
