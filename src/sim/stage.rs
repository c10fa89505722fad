//! Cooking stages, stage timing and base prices
//!
//! Stage order is fixed: Empty -> Batter -> Undercooked -> Cooked -> Perfect -> Burnt.
//! A slot only ever moves forward through this order, or is reset to Empty
//! by an explicit harvest.

use serde::{Deserialize, Serialize};

/// Seconds a slot spends in each stage before advancing (at 1.0x heat)
pub const BATTER_SECS: f32 = 8.0;
pub const UNDERCOOKED_SECS: f32 = 6.0;
pub const COOKED_SECS: f32 = 6.0;
pub const PERFECT_SECS: f32 = 6.0;

/// Base sale price per stage (before any upgrade bonus)
pub const UNDERCOOKED_PRICE: u32 = 100;
pub const COOKED_PRICE: u32 = 200;
pub const PERFECT_PRICE: u32 = 300;

/// Doneness of a waffle, ordered from raw to ruined
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub enum CookingStage {
    #[default]
    Empty,
    Batter,
    Undercooked,
    Cooked,
    Perfect,
    Burnt,
}

impl CookingStage {
    /// All stages in cooking order
    pub const ALL: [CookingStage; 6] = [
        CookingStage::Empty,
        CookingStage::Batter,
        CookingStage::Undercooked,
        CookingStage::Cooked,
        CookingStage::Perfect,
        CookingStage::Burnt,
    ];

    /// Stage that follows this one. Empty and Burnt have no successor.
    pub fn next(self) -> Option<CookingStage> {
        match self {
            CookingStage::Empty => None,
            CookingStage::Batter => Some(CookingStage::Undercooked),
            CookingStage::Undercooked => Some(CookingStage::Cooked),
            CookingStage::Cooked => Some(CookingStage::Perfect),
            CookingStage::Perfect => Some(CookingStage::Burnt),
            CookingStage::Burnt => None,
        }
    }

    /// Seconds required to leave this stage. Infinite for the terminal stages.
    pub fn required_time(self) -> f32 {
        match self {
            CookingStage::Batter => BATTER_SECS,
            CookingStage::Undercooked => UNDERCOOKED_SECS,
            CookingStage::Cooked => COOKED_SECS,
            CookingStage::Perfect => PERFECT_SECS,
            CookingStage::Empty | CookingStage::Burnt => f32::INFINITY,
        }
    }

    /// Base price of a waffle harvested at this stage
    pub fn base_price(self) -> u32 {
        match self {
            CookingStage::Undercooked => UNDERCOOKED_PRICE,
            CookingStage::Cooked => COOKED_PRICE,
            CookingStage::Perfect => PERFECT_PRICE,
            CookingStage::Empty | CookingStage::Batter | CookingStage::Burnt => 0,
        }
    }

    /// Whether the slot is actively cooking (accumulates time on tick)
    pub fn is_cooking(self) -> bool {
        !matches!(self, CookingStage::Empty | CookingStage::Burnt)
    }

    /// Whether a slot in this stage may be harvested into the work tray
    pub fn is_harvestable(self) -> bool {
        !matches!(self, CookingStage::Empty | CookingStage::Batter)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CookingStage::Empty => "Empty",
            CookingStage::Batter => "Batter",
            CookingStage::Undercooked => "Undercooked",
            CookingStage::Cooked => "Cooked",
            CookingStage::Perfect => "Perfect",
            CookingStage::Burnt => "Burnt",
        }
    }
}

/// Topping applied to a waffle on the work tray
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JamType {
    Strawberry,
    Blueberry,
    Apple,
}

impl JamType {
    pub const ALL: [JamType; 3] = [JamType::Strawberry, JamType::Blueberry, JamType::Apple];

    pub fn as_str(&self) -> &'static str {
        match self {
            JamType::Strawberry => "Strawberry",
            JamType::Blueberry => "Blueberry",
            JamType::Apple => "Apple",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "strawberry" => Some(JamType::Strawberry),
            "blueberry" => Some(JamType::Blueberry),
            "apple" => Some(JamType::Apple),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_follows_fixed_order() {
        let mut stage = CookingStage::Batter;
        let mut seen = vec![stage];
        while let Some(next) = stage.next() {
            assert!(next > stage);
            seen.push(next);
            stage = next;
        }
        assert_eq!(&seen[..], &CookingStage::ALL[1..]);
    }

    #[test]
    fn test_terminal_stages_never_advance() {
        assert_eq!(CookingStage::Burnt.next(), None);
        assert!(CookingStage::Burnt.required_time().is_infinite());
        assert!(!CookingStage::Burnt.is_cooking());
        assert!(!CookingStage::Empty.is_cooking());
    }

    #[test]
    fn test_prices_ascend_for_sellable_stages() {
        assert_eq!(CookingStage::Empty.base_price(), 0);
        assert_eq!(CookingStage::Batter.base_price(), 0);
        assert_eq!(CookingStage::Burnt.base_price(), 0);
        assert!(CookingStage::Undercooked.base_price() < CookingStage::Cooked.base_price());
        assert!(CookingStage::Cooked.base_price() < CookingStage::Perfect.base_price());
    }

    #[test]
    fn test_jam_from_str() {
        assert_eq!(JamType::from_str("APPLE"), Some(JamType::Apple));
        assert_eq!(JamType::from_str("mango"), None);
    }
}
