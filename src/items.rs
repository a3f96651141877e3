use serde::{Deserialize, Serialize};

/// Consumables a player can carry into a session.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum_macros::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Item {
    /// Stops the clock for five seconds.
    TimeFreeze,
    /// Types up to five characters of the current phrase.
    AutoWord,
    /// Passive: absorbs one mistake or one boss attack.
    ProxyShield,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    pub time_freeze: u32,
    pub auto_word: u32,
    pub proxy_shield: u32,
}

impl Inventory {
    pub fn new(time_freeze: u32, auto_word: u32, proxy_shield: u32) -> Self {
        Self {
            time_freeze,
            auto_word,
            proxy_shield,
        }
    }

    pub fn count(&self, item: Item) -> u32 {
        match item {
            Item::TimeFreeze => self.time_freeze,
            Item::AutoWord => self.auto_word,
            Item::ProxyShield => self.proxy_shield,
        }
    }

    pub fn has(&self, item: Item) -> bool {
        self.count(item) > 0
    }

    fn slot_mut(&mut self, item: Item) -> &mut u32 {
        match item {
            Item::TimeFreeze => &mut self.time_freeze,
            Item::AutoWord => &mut self.auto_word,
            Item::ProxyShield => &mut self.proxy_shield,
        }
    }

    /// Spends one charge of `item`. Returns false, spending nothing, when empty.
    pub fn try_consume(&mut self, item: Item) -> bool {
        let slot = self.slot_mut(item);
        if *slot == 0 {
            return false;
        }
        *slot -= 1;
        true
    }

    pub fn add(&mut self, item: Item, n: u32) {
        let slot = self.slot_mut(item);
        *slot = slot.saturating_add(n);
    }

    /// Removes what `used` lists, never going below zero.
    pub fn subtract(&mut self, used: &Inventory) {
        self.time_freeze = self.time_freeze.saturating_sub(used.time_freeze);
        self.auto_word = self.auto_word.saturating_sub(used.auto_word);
        self.proxy_shield = self.proxy_shield.saturating_sub(used.proxy_shield);
    }
}

/// Passive hardware upgrades that feed the session's formulas.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum_macros::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Hardware {
    /// -10% timer speed.
    SynapticAccel,
    /// +15% yen earned.
    MechSwitch,
    /// Owned and displayed, no effect on the engine.
    ErrorRam,
}

/// Read-only inputs to the time and payout formulas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Modifiers {
    pub timer_speed: f64,
    pub yen_multiplier: f64,
    pub prestige_level: u32,
}

impl Default for Modifiers {
    fn default() -> Self {
        Self {
            timer_speed: 1.0,
            yen_multiplier: 1.0,
            prestige_level: 0,
        }
    }
}

impl Modifiers {
    pub fn from_hardware(hardware: &[Hardware], prestige_level: u32) -> Self {
        let owns = |h: Hardware| hardware.contains(&h);
        Self {
            timer_speed: if owns(Hardware::SynapticAccel) { 0.9 } else { 1.0 },
            yen_multiplier: if owns(Hardware::MechSwitch) { 1.15 } else { 1.0 },
            prestige_level,
        }
    }

    pub fn prestige_multiplier(&self) -> f64 {
        1.0 + self.prestige_level as f64 * 0.1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_consume_decrements_once() {
        let mut inv = Inventory::new(1, 0, 2);

        assert!(inv.try_consume(Item::TimeFreeze));
        assert_eq!(inv.count(Item::TimeFreeze), 0);
        assert!(!inv.try_consume(Item::TimeFreeze));
        assert_eq!(inv.count(Item::TimeFreeze), 0);

        assert!(inv.try_consume(Item::ProxyShield));
        assert_eq!(inv.proxy_shield, 1);
    }

    #[test]
    fn test_empty_inventory_is_noop() {
        let mut inv = Inventory::default();

        assert!(!inv.try_consume(Item::AutoWord));
        assert_eq!(inv, Inventory::default());
    }

    #[test]
    fn test_add_and_subtract() {
        let mut inv = Inventory::new(2, 2, 2);
        inv.add(Item::AutoWord, 3);
        inv.subtract(&Inventory::new(1, 0, 5));

        assert_eq!(inv, Inventory::new(1, 5, 0));
    }

    #[test]
    fn test_item_names() {
        assert_eq!(Item::TimeFreeze.to_string(), "time_freeze");
        assert_eq!(
            serde_json::to_string(&Item::ProxyShield).unwrap(),
            "\"proxy_shield\""
        );
    }

    #[test]
    fn test_modifiers_from_hardware() {
        let mods = Modifiers::from_hardware(&[Hardware::SynapticAccel, Hardware::MechSwitch], 2);

        assert_eq!(mods.timer_speed, 0.9);
        assert_eq!(mods.yen_multiplier, 1.15);
        assert!((mods.prestige_multiplier() - 1.2).abs() < 1e-12);
    }

    #[test]
    fn test_default_modifiers_are_neutral() {
        let mods = Modifiers::from_hardware(&[Hardware::ErrorRam], 0);

        assert_eq!(mods, Modifiers::default());
        assert_eq!(mods.prestige_multiplier(), 1.0);
    }
}
