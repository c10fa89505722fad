//! Work and finished trays
//!
//! Bounded FIFO queues. Inserts go to the tail; topping, discarding and
//! selling always take the head, so the first waffle harvested is the
//! first one processed.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use super::error::CommandError;
use super::stage::{CookingStage, JamType};

/// Which tray an item or event refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrayKind {
    Work,
    Finished,
}

/// A harvested waffle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrayWaffle {
    /// Stage at harvest time, never changes afterwards
    pub stage: CookingStage,
    pub jam: Option<JamType>,
}

impl TrayWaffle {
    pub fn new(stage: CookingStage) -> Self {
        Self { stage, jam: None }
    }

    /// Base sale price. Upgrade bonuses are added at sale time.
    pub fn price(&self) -> u32 {
        self.stage.base_price()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tray {
    pub kind: TrayKind,
    capacity: usize,
    items: VecDeque<TrayWaffle>,
}

impl Tray {
    pub fn new(kind: TrayKind, capacity: usize) -> Self {
        Self {
            kind,
            capacity,
            items: VecDeque::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.items.len() >= self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Change capacity between rounds. Never drops below the current length.
    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity.max(self.items.len());
    }

    /// Items from head to tail
    pub fn iter(&self) -> impl Iterator<Item = &TrayWaffle> {
        self.items.iter()
    }

    pub fn push(&mut self, waffle: TrayWaffle) -> Result<(), CommandError> {
        if self.is_full() {
            return Err(CommandError::CapacityExceeded(self.kind));
        }
        self.items.push_back(waffle);
        Ok(())
    }

    pub fn peek_first(&self) -> Result<&TrayWaffle, CommandError> {
        self.items.front().ok_or(CommandError::EmptySource(self.kind))
    }

    pub fn pop_first(&mut self) -> Result<TrayWaffle, CommandError> {
        self.items
            .pop_front()
            .ok_or(CommandError::EmptySource(self.kind))
    }

    fn ensure_work(&self) -> Result<(), CommandError> {
        match self.kind {
            TrayKind::Work => Ok(()),
            kind => Err(CommandError::WrongTray(kind)),
        }
    }

    /// Top the head waffle and move it to `finished`.
    ///
    /// Only a work tray can be topped, and only into a finished tray.
    /// Fails without changing either tray if the head is burnt or the
    /// finished tray is full.
    pub fn apply_topping(
        &mut self,
        jam: JamType,
        finished: &mut Tray,
    ) -> Result<TrayWaffle, CommandError> {
        self.ensure_work()?;
        if finished.kind != TrayKind::Finished {
            return Err(CommandError::WrongTray(finished.kind));
        }
        let head = *self.peek_first()?;
        if head.stage == CookingStage::Burnt {
            return Err(CommandError::InvalidTransition {
                action: "top",
                stage: head.stage,
            });
        }
        if finished.is_full() {
            return Err(CommandError::CapacityExceeded(finished.kind));
        }

        let mut waffle = self.pop_first()?;
        waffle.jam = Some(jam);
        finished.push(waffle)?;
        Ok(waffle)
    }

    /// Throw away the head of a work tray, whatever its stage
    pub fn discard(&mut self) -> Result<TrayWaffle, CommandError> {
        self.ensure_work()?;
        self.pop_first()
    }

    /// Pop `count` waffles from the head, all or nothing
    pub fn take_front(&mut self, count: usize) -> Result<Vec<TrayWaffle>, CommandError> {
        if self.items.len() < count {
            return Err(CommandError::InsufficientStock {
                needed: count as u32,
                available: self.items.len() as u32,
            });
        }
        Ok(self.items.drain(..count).collect())
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn waffle(stage: CookingStage) -> TrayWaffle {
        TrayWaffle::new(stage)
    }

    #[test]
    fn test_push_past_capacity_fails() {
        let mut tray = Tray::new(TrayKind::Work, 5);
        for _ in 0..5 {
            tray.push(waffle(CookingStage::Cooked)).unwrap();
        }
        assert_eq!(
            tray.push(waffle(CookingStage::Perfect)),
            Err(CommandError::CapacityExceeded(TrayKind::Work))
        );
        assert_eq!(tray.len(), 5);
        assert!(tray.iter().all(|w| w.stage == CookingStage::Cooked));
    }

    #[test]
    fn test_pop_is_fifo() {
        let mut tray = Tray::new(TrayKind::Work, 5);
        let order = [
            CookingStage::Undercooked,
            CookingStage::Perfect,
            CookingStage::Burnt,
        ];
        for stage in order {
            tray.push(waffle(stage)).unwrap();
        }
        for stage in order {
            assert_eq!(tray.pop_first().unwrap().stage, stage);
        }
        assert_eq!(
            tray.pop_first(),
            Err(CommandError::EmptySource(TrayKind::Work))
        );
    }

    #[test]
    fn test_topping_moves_head_to_finished() {
        let mut work = Tray::new(TrayKind::Work, 5);
        let mut finished = Tray::new(TrayKind::Finished, 5);
        work.push(waffle(CookingStage::Perfect)).unwrap();
        work.push(waffle(CookingStage::Cooked)).unwrap();

        let topped = work.apply_topping(JamType::Apple, &mut finished).unwrap();
        assert_eq!(topped.stage, CookingStage::Perfect);
        assert_eq!(topped.jam, Some(JamType::Apple));
        assert_eq!(work.len(), 1);
        assert_eq!(finished.peek_first().unwrap(), &topped);
    }

    #[test]
    fn test_burnt_head_cannot_be_topped() {
        let mut work = Tray::new(TrayKind::Work, 5);
        let mut finished = Tray::new(TrayKind::Finished, 5);
        work.push(waffle(CookingStage::Burnt)).unwrap();
        work.push(waffle(CookingStage::Perfect)).unwrap();

        let err = work
            .apply_topping(JamType::Strawberry, &mut finished)
            .unwrap_err();
        assert!(matches!(err, CommandError::InvalidTransition { .. }));
        assert_eq!(work.len(), 2);
        assert!(finished.is_empty());

        // Trash clears the head, then the next one can be topped
        assert_eq!(work.discard().unwrap().stage, CookingStage::Burnt);
        assert!(work.apply_topping(JamType::Strawberry, &mut finished).is_ok());
    }

    #[test]
    fn test_topping_into_full_finished_is_atomic() {
        let mut work = Tray::new(TrayKind::Work, 5);
        let mut finished = Tray::new(TrayKind::Finished, 1);
        finished
            .push(TrayWaffle {
                stage: CookingStage::Cooked,
                jam: Some(JamType::Apple),
            })
            .unwrap();
        work.push(waffle(CookingStage::Perfect)).unwrap();

        assert_eq!(
            work.apply_topping(JamType::Blueberry, &mut finished),
            Err(CommandError::CapacityExceeded(TrayKind::Finished))
        );
        assert_eq!(work.len(), 1);
        assert_eq!(work.peek_first().unwrap().jam, None);
        assert_eq!(finished.len(), 1);
    }

    #[test]
    fn test_topping_and_trash_need_work_tray() {
        let mut finished = Tray::new(TrayKind::Finished, 5);
        let mut other = Tray::new(TrayKind::Finished, 5);
        finished.push(waffle(CookingStage::Perfect)).unwrap();

        assert_eq!(
            finished.apply_topping(JamType::Apple, &mut other),
            Err(CommandError::WrongTray(TrayKind::Finished))
        );
        assert_eq!(
            finished.discard(),
            Err(CommandError::WrongTray(TrayKind::Finished))
        );
        assert_eq!(finished.len(), 1);
        assert!(other.is_empty());

        // Work to work is rejected too, leaving both untouched
        let mut work = Tray::new(TrayKind::Work, 5);
        let mut second = Tray::new(TrayKind::Work, 5);
        work.push(waffle(CookingStage::Cooked)).unwrap();
        assert_eq!(
            work.apply_topping(JamType::Apple, &mut second),
            Err(CommandError::WrongTray(TrayKind::Work))
        );
        assert_eq!(work.len(), 1);
        assert!(second.is_empty());
    }

    #[test]
    fn test_take_front_is_all_or_nothing() {
        let mut tray = Tray::new(TrayKind::Finished, 5);
        tray.push(waffle(CookingStage::Cooked)).unwrap();
        assert_eq!(
            tray.take_front(2),
            Err(CommandError::InsufficientStock {
                needed: 2,
                available: 1
            })
        );
        assert_eq!(tray.len(), 1);
    }

    #[test]
    fn test_set_capacity_never_truncates() {
        let mut tray = Tray::new(TrayKind::Work, 3);
        for _ in 0..3 {
            tray.push(waffle(CookingStage::Cooked)).unwrap();
        }
        tray.set_capacity(1);
        assert_eq!(tray.capacity(), 3);
        tray.set_capacity(6);
        assert_eq!(tray.capacity(), 6);
    }

    proptest! {
        #[test]
        fn prop_fifo_and_capacity(
            capacity in 1usize..8,
            ops in proptest::collection::vec(proptest::option::of(0u8..5), 1..100),
        ) {
            // Some(n) pushes a waffle tagged by stage index, None pops
            let mut tray = Tray::new(TrayKind::Work, capacity);
            let mut model: VecDeque<CookingStage> = VecDeque::new();
            for op in ops {
                match op {
                    Some(n) => {
                        let stage = CookingStage::ALL[1 + n as usize];
                        let res = tray.push(waffle(stage));
                        if model.len() < capacity {
                            prop_assert!(res.is_ok());
                            model.push_back(stage);
                        } else {
                            prop_assert_eq!(res, Err(CommandError::CapacityExceeded(TrayKind::Work)));
                        }
                    }
                    None => {
                        let got = tray.pop_first().ok().map(|w| w.stage);
                        prop_assert_eq!(got, model.pop_front());
                    }
                }
                prop_assert!(tray.len() <= tray.capacity());
                prop_assert_eq!(tray.len(), model.len());
            }
        }
    }
}
