use crate::items::Item;
use crate::outcome::Outcome;

/// Gameplay events a front end may turn into sound or visuals.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    SessionStarted,
    CorrectKeystroke { heat: u8 },
    Mistake,
    MistakeBlocked,
    AttackBlocked,
    AttackLanded { damage: f64, line: String },
    BossHit { damage: u32, hp: u32 },
    PhraseComplete,
    ItemUsed(Item),
    Finished { passed: bool },
}

/// Receiver for gameplay events. The session owns no audio or rendering; it
/// only reports what happened.
pub trait EffectsSink {
    fn emit(&mut self, effect: Effect);

    fn on_correct_keystroke(&mut self, heat: u8) {
        self.emit(Effect::CorrectKeystroke { heat });
    }

    fn on_mistake(&mut self) {
        self.emit(Effect::Mistake);
    }

    fn on_mistake_blocked(&mut self) {
        self.emit(Effect::MistakeBlocked);
    }

    fn on_attack_blocked(&mut self) {
        self.emit(Effect::AttackBlocked);
    }

    fn on_attack_landed(&mut self, damage: f64, line: &str) {
        self.emit(Effect::AttackLanded {
            damage,
            line: line.to_string(),
        });
    }

    fn on_finished(&mut self, outcome: &Outcome) {
        self.emit(Effect::Finished {
            passed: outcome.passed,
        });
    }
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl EffectsSink for NullSink {
    fn emit(&mut self, _effect: Effect) {}
}

/// Records effects in order; handy for tests and replays.
impl EffectsSink for Vec<Effect> {
    fn emit(&mut self, effect: Effect) {
        self.push(effect);
    }
}

/// Logs every effect through `tracing` at debug level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl EffectsSink for TracingSink {
    fn emit(&mut self, effect: Effect) {
        match &effect {
            Effect::AttackLanded { damage, line } => {
                tracing::debug!(damage, line = %line, "boss attack landed")
            }
            Effect::Finished { passed } => tracing::debug!(passed, "finish effect"),
            other => tracing::debug!(effect = ?other, "effect"),
        }
    }
}
