//! Player actions on the grill, trays and counter
//!
//! Both the round and the tutorial apply actions through these helpers, so
//! an action changes the same state and leaves the same event trail no
//! matter which controller owns the kitchen. Controllers add their own
//! gating (round over, tutorial step) before calling in.

use super::customer::{CustomerPool, Sale};
use super::error::CommandError;
use super::event::GameEvent;
use super::grill::Grill;
use super::stage::JamType;
use super::tray::{Tray, TrayWaffle};

/// Report a tray's new length
pub fn tray_changed(tray: &Tray, events: &mut Vec<GameEvent>) {
    events.push(GameEvent::TrayChanged {
        tray: tray.kind,
        len: tray.len(),
    });
}

pub fn place_batter(
    grill: &mut Grill,
    row: usize,
    col: usize,
    events: &mut Vec<GameEvent>,
) -> Result<(), CommandError> {
    grill.place_batter(row, col)?;
    events.push(GameEvent::BatterPlaced { row, col });
    Ok(())
}

/// Move a cell's waffle onto the work tray. A full tray leaves the grill untouched.
pub fn harvest(
    grill: &mut Grill,
    work: &mut Tray,
    row: usize,
    col: usize,
    events: &mut Vec<GameEvent>,
) -> Result<TrayWaffle, CommandError> {
    grill.check_harvest(row, col)?;
    if work.is_full() {
        return Err(CommandError::CapacityExceeded(work.kind));
    }
    let waffle = grill.eject(row, col)?;
    work.push(waffle)?;
    events.push(GameEvent::WaffleHarvested {
        row,
        col,
        stage: waffle.stage,
    });
    tray_changed(work, events);
    Ok(waffle)
}

pub fn apply_jam(
    work: &mut Tray,
    finished: &mut Tray,
    jam: JamType,
    events: &mut Vec<GameEvent>,
) -> Result<TrayWaffle, CommandError> {
    let waffle = work.apply_topping(jam, finished)?;
    events.push(GameEvent::WaffleTopped { jam });
    tray_changed(work, events);
    tray_changed(finished, events);
    Ok(waffle)
}

pub fn discard(work: &mut Tray, events: &mut Vec<GameEvent>) -> Result<TrayWaffle, CommandError> {
    let waffle = work.discard()?;
    events.push(GameEvent::WaffleDiscarded {
        stage: waffle.stage,
    });
    tray_changed(work, events);
    Ok(waffle)
}

/// Sell to the customer in `slot`.
///
/// Customers with a preferred jam only accept matching waffles; everyone
/// else takes the head of the finished tray. The returned revenue includes
/// `price_bonus` per waffle.
pub fn serve(
    customers: &mut CustomerPool,
    finished: &mut Tray,
    slot: usize,
    price_bonus: u32,
    events: &mut Vec<GameEvent>,
) -> Result<Sale, CommandError> {
    let mut sale = customers.serve_matching(slot, finished)?;
    let sold = sale.waffles.len() as u32;
    sale.revenue = sale
        .revenue
        .saturating_add(price_bonus.saturating_mul(sold));
    events.push(GameEvent::CustomerServed {
        slot,
        id: sale.customer_id,
        revenue: sale.revenue,
    });
    tray_changed(finished, events);
    Ok(sale)
}
