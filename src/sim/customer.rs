//! Customer slots: arrival, patience countdown and sales
//!
//! A fixed number of counter slots. Each occupied slot counts down on its
//! own; customers never queue for a slot.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::error::CommandError;
use super::event::GameEvent;
use super::stage::JamType;
use super::tray::{Tray, TrayWaffle};
use crate::tuning::Span;

/// A waiting customer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub id: u32,
    /// Order size
    pub waffle_count: u32,
    /// Remaining patience (seconds)
    pub wait_time: f32,
    /// Patience at arrival, for the patience bar
    pub max_wait_time: f32,
    /// Required topping, for scripted customers
    #[serde(default)]
    pub preferred_jam: Option<JamType>,
}

impl Customer {
    /// Remaining patience as 0..=1
    pub fn patience_ratio(&self) -> f32 {
        if self.max_wait_time > 0.0 {
            (self.wait_time / self.max_wait_time).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}

/// Result of a successful sale
#[derive(Debug, Clone, PartialEq)]
pub struct Sale {
    pub slot: usize,
    pub customer_id: u32,
    /// Waffles handed over, in tray order
    pub waffles: Vec<TrayWaffle>,
    /// Sum of base prices
    pub revenue: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerPool {
    slots: Vec<Option<Customer>>,
    order_size: Span<u32>,
    patience: Span<f32>,
    next_id: u32,
}

impl CustomerPool {
    pub fn new(size: usize, order_size: Span<u32>, patience: Span<f32>) -> Self {
        Self {
            slots: vec![None; size],
            order_size,
            patience,
            next_id: 1,
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn get(&self, slot: usize) -> Option<&Customer> {
        self.slots.get(slot).and_then(|c| c.as_ref())
    }

    /// Occupied slots with their index
    pub fn iter(&self) -> impl Iterator<Item = (usize, &Customer)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, c)| c.as_ref().map(|c| (i, c)))
    }

    pub fn waiting(&self) -> usize {
        self.slots.iter().filter(|c| c.is_some()).count()
    }

    fn first_free(&self) -> Option<usize> {
        self.slots.iter().position(|c| c.is_none())
    }

    fn allocate_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Seat a new random customer in the first free slot
    pub fn try_spawn<R: Rng>(
        &mut self,
        rng: &mut R,
        events: &mut Vec<GameEvent>,
    ) -> Result<usize, CommandError> {
        let slot = self.first_free().ok_or(CommandError::SlotUnavailable)?;
        let waffle_count = self.order_size.sample(rng);
        let patience = self.patience.sample(rng);
        let customer = Customer {
            id: self.allocate_id(),
            waffle_count,
            wait_time: patience,
            max_wait_time: patience,
            preferred_jam: None,
        };
        log::debug!(
            "Customer {} arrives at slot {} wanting {} ({:.1}s patience)",
            customer.id,
            slot,
            waffle_count,
            patience
        );
        events.push(GameEvent::CustomerSpawned {
            slot,
            id: customer.id,
            waffle_count,
        });
        self.slots[slot] = Some(customer);
        Ok(slot)
    }

    /// Seat a scripted customer with a fixed order
    pub fn seat(
        &mut self,
        waffle_count: u32,
        patience: f32,
        preferred_jam: Option<JamType>,
        events: &mut Vec<GameEvent>,
    ) -> Result<usize, CommandError> {
        let slot = self.first_free().ok_or(CommandError::SlotUnavailable)?;
        let customer = Customer {
            id: self.allocate_id(),
            waffle_count,
            wait_time: patience,
            max_wait_time: patience,
            preferred_jam,
        };
        events.push(GameEvent::CustomerSpawned {
            slot,
            id: customer.id,
            waffle_count,
        });
        self.slots[slot] = Some(customer);
        Ok(slot)
    }

    /// Count down patience. Returns how many customers left angry.
    pub fn tick(&mut self, dt: f32, events: &mut Vec<GameEvent>) -> u32 {
        let mut departed = 0;
        for (slot, entry) in self.slots.iter_mut().enumerate() {
            let Some(customer) = entry.as_mut() else {
                continue;
            };
            customer.wait_time -= dt;
            if customer.wait_time <= 0.0 {
                log::debug!("Customer {} left slot {} angry", customer.id, slot);
                events.push(GameEvent::CustomerDeparted {
                    slot,
                    id: customer.id,
                });
                *entry = None;
                departed += 1;
            }
        }
        departed
    }

    fn customer_at(&self, slot: usize) -> Result<&Customer, CommandError> {
        if slot >= self.slots.len() {
            return Err(CommandError::OutOfBounds(slot, 0));
        }
        self.get(slot).ok_or(CommandError::NoCustomer(slot))
    }

    fn complete_sale(&mut self, slot: usize, waffles: Vec<TrayWaffle>) -> Sale {
        let customer_id = self.slots[slot].take().map(|c| c.id).unwrap_or_default();
        let revenue = waffles.iter().map(TrayWaffle::price).sum();
        Sale {
            slot,
            customer_id,
            waffles,
            revenue,
        }
    }

    /// Hand over the first `waffle_count` finished waffles, whatever their topping
    pub fn serve(&mut self, slot: usize, finished: &mut Tray) -> Result<Sale, CommandError> {
        let needed = self.customer_at(slot)?.waffle_count as usize;
        let waffles = finished.take_front(needed)?;
        Ok(self.complete_sale(slot, waffles))
    }

    /// Serve a customer who insists on a topping.
    ///
    /// The head `waffle_count` items must all carry the preferred jam;
    /// customers without a preference fall back to plain FIFO serving.
    pub fn serve_matching(
        &mut self,
        slot: usize,
        finished: &mut Tray,
    ) -> Result<Sale, CommandError> {
        let customer = self.customer_at(slot)?;
        let needed = customer.waffle_count as usize;
        let Some(wanted) = customer.preferred_jam else {
            return self.serve(slot, finished);
        };

        if finished.len() < needed {
            return Err(CommandError::InsufficientStock {
                needed: needed as u32,
                available: finished.len() as u32,
            });
        }
        if !finished.iter().take(needed).all(|w| w.jam == Some(wanted)) {
            return Err(CommandError::JamMismatch { wanted });
        }

        let waffles = finished.take_front(needed)?;
        Ok(self.complete_sale(slot, waffles))
    }

    pub fn clear(&mut self) {
        for slot in &mut self.slots {
            *slot = None;
        }
    }

    /// Resize between rounds; extra slots are dropped from the end
    pub fn resize(&mut self, size: usize) {
        self.slots.resize(size, None);
    }
}
