/// How long one time-freeze charge stops the clock, in seconds.
pub const FREEZE_SECS: f64 = 5.0;

/// Split of one tick's delta around the freeze window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickSplit {
    /// Seconds of the tick that ran with the clock live.
    pub live: f64,
    /// Seconds of the tick that fell inside the freeze window.
    pub frozen: f64,
}

/// The player's remaining time.
///
/// Engine time (`now`) is owned by the session and passed in; the bank only
/// knows where the freeze window ends. An untimed bank (ZEN) holds
/// `f64::INFINITY` and is never drained.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeBank {
    remaining: f64,
    starting: f64,
    speed: f64,
    frozen_until: f64,
}

impl TimeBank {
    pub fn timed(secs: f64, speed: f64) -> Self {
        Self {
            remaining: secs.max(0.0),
            starting: secs.max(0.0),
            speed,
            frozen_until: 0.0,
        }
    }

    pub fn untimed() -> Self {
        Self {
            remaining: f64::INFINITY,
            starting: f64::INFINITY,
            speed: 1.0,
            frozen_until: 0.0,
        }
    }

    pub fn is_timed(&self) -> bool {
        self.starting.is_finite()
    }

    pub fn remaining(&self) -> f64 {
        self.remaining
    }

    /// Remaining time as a fraction of the starting time, for the time bar.
    pub fn fraction(&self) -> f64 {
        if !self.is_timed() || self.starting <= 0.0 {
            return 1.0;
        }
        (self.remaining / self.starting).clamp(0.0, 1.0)
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining <= 0.0
    }

    pub fn frozen_until(&self) -> f64 {
        self.frozen_until
    }

    pub fn is_frozen(&self, now: f64) -> bool {
        now < self.frozen_until
    }

    pub fn freeze(&mut self, now: f64) {
        self.frozen_until = now + FREEZE_SECS;
    }

    /// Advances the bank from `now` by `delta` seconds of engine time.
    ///
    /// Only the part of the delta outside the freeze window drains time; the
    /// split is returned so other timers can skip the frozen part too.
    pub fn advance(&mut self, now: f64, delta: f64) -> TickSplit {
        let delta = delta.max(0.0);
        let frozen = (self.frozen_until - now).clamp(0.0, delta);
        let live = delta - frozen;

        if self.is_timed() {
            self.drain(live * self.speed);
        }
        TickSplit { live, frozen }
    }

    /// Removes `secs` from the bank, flooring at zero.
    pub fn drain(&mut self, secs: f64) {
        if self.is_timed() {
            self.remaining = (self.remaining - secs).max(0.0);
        }
    }
}
