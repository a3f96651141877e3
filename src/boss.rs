use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::combo::ComboMeter;
use crate::error::SessionError;

const CHARGE_RATE: f64 = 2.5;
const CHARGE_FULL: f64 = 100.0;
const LOG_LINES: usize = 6;
const STREAK_BONUS_AFTER: u32 = 50;

pub const LOG_BLOCKED: &str = "ATTACK_BLOCKED_BY_PROXY";
pub const LOG_LAYER_BREACHED: &str = "FIREWALL_LAYER_BREACHED";

const HACK_TEXT: [&str; 5] = [
    "INJECTING_MALWARE...",
    "BYPASSING_FIREWALL...",
    "CORRUPTING_SECTOR_7...",
    "OVERRIDING_KERNEL...",
    "DRAINING_LINK_STABILITY...",
];

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum_macros::Display,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
    Nightmare,
}

/// Static description of a boss.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BossDef {
    pub id: String,
    pub name: String,
    pub difficulty: Difficulty,
    pub hp: u32,
    /// Attack charge gained per second is `attack_speed * 2.5` percent.
    pub attack_speed: f64,
    /// Seconds drained from the player per landed attack.
    pub attack_damage: f64,
    pub reward: u64,
}

impl BossDef {
    fn new(
        id: &str,
        name: &str,
        difficulty: Difficulty,
        hp: u32,
        attack_speed: f64,
        attack_damage: f64,
        reward: u64,
    ) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            difficulty,
            hp,
            attack_speed,
            attack_damage,
            reward,
        }
    }
}

/// The built-in bosses, easiest first.
pub fn roster() -> Vec<BossDef> {
    vec![
        BossDef::new("gatekeeper", "THE GATEKEEPER", Difficulty::Easy, 150, 5.0, 3.0, 1000),
        BossDef::new("colonel_ai", "TACTICAL AI", Difficulty::Medium, 300, 8.0, 5.0, 2500),
        BossDef::new("akira_fragment", "ESPER FRAGMENT", Difficulty::Hard, 600, 12.0, 8.0, 5000),
        BossDef::new("sol_satellite", "SOL SATELLITE", Difficulty::Nightmare, 1000, 15.0, 10.0, 10000),
    ]
}

pub fn resolve_boss(id: &str) -> Result<BossDef, SessionError> {
    roster()
        .into_iter()
        .find(|b| b.id == id)
        .ok_or_else(|| SessionError::UnknownBoss(id.to_string()))
}

/// Damage one correct keystroke deals, from the meter as it stood before the keystroke.
pub fn hit_damage(meter: &ComboMeter) -> u32 {
    1 + u32::from(meter.boosts_damage()) + u32::from(meter.streak() > STREAK_BONUS_AFTER)
}

/// Live state of a boss fight.
#[derive(Debug, Clone)]
pub struct BossEncounter {
    def: BossDef,
    hp: u32,
    charge: f64,
    log: VecDeque<String>,
}

impl BossEncounter {
    pub fn new(def: BossDef) -> Self {
        Self {
            hp: def.hp,
            def,
            charge: 0.0,
            log: VecDeque::with_capacity(LOG_LINES),
        }
    }

    pub fn def(&self) -> &BossDef {
        &self.def
    }

    pub fn hp(&self) -> u32 {
        self.hp
    }

    pub fn max_hp(&self) -> u32 {
        self.def.hp
    }

    pub fn is_defeated(&self) -> bool {
        self.hp == 0
    }

    /// Health bar percentage, rounded up and floored at 0.
    pub fn hp_percent(&self) -> u32 {
        if self.def.hp == 0 {
            return 0;
        }
        (self.hp as f64 / self.def.hp as f64 * 100.0).ceil() as u32
    }

    pub fn charge_percent(&self) -> f64 {
        self.charge
    }

    pub fn log(&self) -> impl Iterator<Item = &str> {
        self.log.iter().map(String::as_str)
    }

    /// Applies `damage`; returns true when this blow finished the boss.
    pub fn take_damage(&mut self, damage: u32) -> bool {
        let was_alive = !self.is_defeated();
        self.hp = self.hp.saturating_sub(damage);
        was_alive && self.is_defeated()
    }

    /// Builds attack charge over `live_secs`; returns true when an attack fires.
    /// The charge is reset either way once it fires.
    pub fn charge(&mut self, live_secs: f64) -> bool {
        self.charge += self.def.attack_speed * CHARGE_RATE * live_secs.max(0.0);
        if self.charge >= CHARGE_FULL {
            self.charge = 0.0;
            true
        } else {
            false
        }
    }

    pub fn record_block(&mut self) {
        self.push_log(LOG_BLOCKED.to_string());
    }

    /// Logs a landed attack with a random flavour line and returns the line.
    pub fn record_hit<R: Rng + ?Sized>(&mut self, rng: &mut R) -> String {
        let line = HACK_TEXT.choose(rng).copied().unwrap_or(HACK_TEXT[0]).to_string();
        self.push_log(line.clone());
        line
    }

    pub fn record_layer_breached(&mut self) {
        self.push_log(LOG_LAYER_BREACHED.to_string());
    }

    fn push_log(&mut self, line: String) {
        if self.log.len() == LOG_LINES {
            self.log.pop_front();
        }
        self.log.push_back(line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn gatekeeper() -> BossDef {
        resolve_boss("gatekeeper").unwrap()
    }

    #[test]
    fn test_roster_lookup() {
        let boss = gatekeeper();

        assert_eq!(boss.name, "THE GATEKEEPER");
        assert_eq!(boss.hp, 150);
        assert_eq!(boss.reward, 1000);
        assert_eq!(boss.difficulty.to_string(), "EASY");
    }

    #[test]
    fn test_unknown_boss() {
        let err = resolve_boss("nobody").unwrap_err();
        assert!(matches!(err, SessionError::UnknownBoss(id) if id == "nobody"));
    }

    #[test]
    fn test_hit_damage_formula() {
        assert_eq!(hit_damage(&ComboMeter::with(15, 60)), 3);
        assert_eq!(hit_damage(&ComboMeter::with(5, 10)), 1);
        assert_eq!(hit_damage(&ComboMeter::with(10, 50)), 2);
        assert_eq!(hit_damage(&ComboMeter::with(0, 51)), 2);
    }

    #[test]
    fn test_take_damage_floors_at_zero() {
        let mut enc = BossEncounter::new(gatekeeper());

        assert!(!enc.take_damage(100));
        assert_eq!(enc.hp(), 50);
        assert!(enc.take_damage(80));
        assert_eq!(enc.hp(), 0);
        assert_eq!(enc.hp_percent(), 0);
        // already dead: no second kill
        assert!(!enc.take_damage(1));
    }

    #[test]
    fn test_hp_percent_rounds_up() {
        let mut enc = BossEncounter::new(gatekeeper());
        enc.take_damage(149);

        assert_eq!(enc.hp_percent(), 1);
    }

    #[test]
    fn test_charge_fires_and_resets() {
        let mut enc = BossEncounter::new(gatekeeper());

        // 5 * 2.5 = 12.5 %/s, full after 8s
        assert!(!enc.charge(7.9));
        assert!(enc.charge_percent() > 98.0);
        assert!(enc.charge(0.5));
        assert_eq!(enc.charge_percent(), 0.0);
    }

    #[test]
    fn test_log_is_bounded() {
        let mut enc = BossEncounter::new(gatekeeper());
        let mut rng = StdRng::seed_from_u64(5);

        enc.record_block();
        for _ in 0..6 {
            let line = enc.record_hit(&mut rng);
            assert!(HACK_TEXT.contains(&line.as_str()));
        }

        assert_eq!(enc.log().count(), LOG_LINES);
        assert!(enc.log().all(|l| l != LOG_BLOCKED));
    }
}
