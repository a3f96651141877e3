pub const MAX_HEAT: u8 = 20;
/// Heat at which boss hits deal bonus damage.
pub const BOOST_HEAT: u8 = 10;
const MISTAKE_PENALTY: u8 = 20;

/// Heat meter and streak counter, driven only by judge verdicts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ComboMeter {
    heat: u8,
    streak: u32,
}

impl ComboMeter {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub(crate) fn with(heat: u8, streak: u32) -> Self {
        Self {
            heat: heat.min(MAX_HEAT),
            streak,
        }
    }

    pub fn heat(&self) -> u8 {
        self.heat
    }

    pub fn streak(&self) -> u32 {
        self.streak
    }

    pub fn on_correct(&mut self) {
        self.heat = (self.heat + 1).min(MAX_HEAT);
        self.streak += 1;
    }

    pub fn on_mistake(&mut self) {
        self.heat = self.heat.saturating_sub(MISTAKE_PENALTY);
        self.streak = 0;
    }

    /// Full meter doubles the payout.
    pub fn is_maxed(&self) -> bool {
        self.heat >= MAX_HEAT
    }

    pub fn boosts_damage(&self) -> bool {
        self.heat >= BOOST_HEAT
    }

    pub fn payout_multiplier(&self) -> f64 {
        if self.is_maxed() {
            2.0
        } else {
            1.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_correct_raises_heat_and_streak() {
        let mut meter = ComboMeter::new();

        meter.on_correct();
        meter.on_correct();

        assert_eq!(meter.heat(), 2);
        assert_eq!(meter.streak(), 2);
    }

    #[test]
    fn test_heat_caps_but_streak_does_not() {
        let mut meter = ComboMeter::new();

        for _ in 0..30 {
            meter.on_correct();
        }

        assert_eq!(meter.heat(), MAX_HEAT);
        assert_eq!(meter.streak(), 30);
        assert!(meter.is_maxed());
        assert_eq!(meter.payout_multiplier(), 2.0);
    }

    #[test]
    fn test_mistake_wipes_meter() {
        let mut meter = ComboMeter::with(15, 40);

        meter.on_mistake();

        assert_eq!(meter.heat(), 0);
        assert_eq!(meter.streak(), 0);
        assert_eq!(meter.payout_multiplier(), 1.0);
    }

    #[test]
    fn test_damage_boost_threshold() {
        assert!(!ComboMeter::with(9, 0).boosts_damage());
        assert!(ComboMeter::with(10, 0).boosts_damage());
    }
}
