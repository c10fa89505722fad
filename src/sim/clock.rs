//! Frame time to fixed simulation steps
//!
//! Hosts deliver uneven frame deltas. The accumulator turns them into a
//! whole number of `SIM_DT` steps, capped so a long stall (tab switch,
//! debugger) cannot trigger a spiral of catch-up ticks.

use crate::consts::{MAX_FRAME_DT, MAX_SUBSTEPS, SIM_DT};

#[derive(Debug, Clone, Default)]
pub struct FixedStep {
    accumulator: f32,
}

impl FixedStep {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one frame's elapsed time; returns how many `SIM_DT` ticks to run
    pub fn advance(&mut self, frame_dt: f32) -> u32 {
        self.accumulator += frame_dt.clamp(0.0, MAX_FRAME_DT);

        let mut steps = 0;
        while self.accumulator >= SIM_DT && steps < MAX_SUBSTEPS {
            self.accumulator -= SIM_DT;
            steps += 1;
        }
        // Drop whatever could not be simulated this frame
        if steps == MAX_SUBSTEPS {
            self.accumulator = self.accumulator.min(SIM_DT);
        }
        steps
    }

    /// Leftover fraction of a step, for render interpolation
    pub fn alpha(&self) -> f32 {
        self.accumulator / SIM_DT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whole_steps() {
        let mut clock = FixedStep::new();
        assert_eq!(clock.advance(SIM_DT * 0.5), 0);
        assert_eq!(clock.advance(SIM_DT * 0.6), 1);
        assert!(clock.alpha() < 1.0);
    }

    #[test]
    fn test_stall_is_capped() {
        let mut clock = FixedStep::new();
        assert_eq!(clock.advance(10.0), MAX_SUBSTEPS);
        assert!(clock.alpha() <= 1.0);
    }

    #[test]
    fn test_negative_frame_ignored() {
        let mut clock = FixedStep::new();
        assert_eq!(clock.advance(-1.0), 0);
        assert_eq!(clock.alpha(), 0.0);
    }
}
