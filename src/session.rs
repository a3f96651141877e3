use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::boss::{hit_damage, BossDef, BossEncounter};
use crate::combo::ComboMeter;
use crate::effects::{Effect, EffectsSink, NullSink};
use crate::error::SessionError;
use crate::items::{Inventory, Item, Modifiers};
use crate::judge::{expected_char, judge, Verdict};
use crate::outcome::{self, FinishReason, Outcome, PayoutInput};
use crate::phrases::{PhraseKind, PhrasePool};
use crate::reveal::Reveal;
use crate::timer::TimeBank;

pub const NORMAL_SECS: f64 = 30.0;
pub const BOSS_SECS: f64 = 60.0;
const AUTO_WORD_CHARS: usize = 5;
const AUTO_WORD_DAMAGE: u32 = 5;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum_macros::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "UPPERCASE")]
pub enum GameMode {
    Normal,
    Boss,
    Zen,
}

/// What happens when the current phrase has been typed out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhraseCompletion {
    Finish,
    NextPhrase(PhraseKind),
}

impl GameMode {
    pub fn starting_secs(&self) -> Option<f64> {
        match self {
            GameMode::Normal => Some(NORMAL_SECS),
            GameMode::Boss => Some(BOSS_SECS),
            GameMode::Zen => None,
        }
    }

    pub fn phrase_kind(&self) -> PhraseKind {
        match self {
            GameMode::Boss => PhraseKind::Boss,
            GameMode::Normal | GameMode::Zen => PhraseKind::Normal,
        }
    }

    pub fn on_phrase_complete(&self) -> PhraseCompletion {
        match self {
            GameMode::Normal => PhraseCompletion::Finish,
            GameMode::Boss => PhraseCompletion::NextPhrase(PhraseKind::Boss),
            GameMode::Zen => PhraseCompletion::NextPhrase(PhraseKind::Normal),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Idle,
    Active,
    Finished,
}

/// Everything a session is built from.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub mode: GameMode,
    pub boss: Option<BossDef>,
    pub pool: PhrasePool,
    pub modifiers: Modifiers,
    pub inventory: Inventory,
    /// Fixes phrase choice, flavour text and the reveal scramble.
    pub seed: Option<u64>,
    pub reveal: bool,
}

impl SessionConfig {
    pub fn new(mode: GameMode, pool: PhrasePool) -> Self {
        Self {
            mode,
            boss: None,
            pool,
            modifiers: Modifiers::default(),
            inventory: Inventory::default(),
            seed: None,
            reveal: true,
        }
    }

    pub fn with_boss(mut self, boss: BossDef) -> Self {
        self.boss = Some(boss);
        self
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    pub fn with_inventory(mut self, inventory: Inventory) -> Self {
        self.inventory = inventory;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn without_reveal(mut self) -> Self {
        self.reveal = false;
        self
    }
}

/// One run of the typing game, from the first keystroke to its outcome.
///
/// The session keeps its own engine clock, advanced only by [`Session::advance`],
/// so every time-based rule is a function of the deltas it was fed.
#[derive(Debug)]
pub struct Session<S: EffectsSink = NullSink> {
    mode: GameMode,
    status: Status,
    target: String,
    target_chars: Vec<char>,
    typed: Vec<char>,
    bank: TimeBank,
    combo: ComboMeter,
    boss: Option<BossEncounter>,
    inventory: Inventory,
    consumed: Inventory,
    modifiers: Modifiers,
    pool: PhrasePool,
    rng: StdRng,
    reveal: Reveal,
    reveal_enabled: bool,
    now: f64,
    started_at: Option<f64>,
    live_wpm: u32,
    outcome: Option<Outcome>,
    delivered: bool,
    sink: S,
}

impl Session<NullSink> {
    pub fn without_effects(config: SessionConfig) -> Result<Self, SessionError> {
        Session::new(config, NullSink)
    }
}

impl<S: EffectsSink> Session<S> {
    pub fn new(config: SessionConfig, sink: S) -> Result<Self, SessionError> {
        let SessionConfig {
            mode,
            boss,
            pool,
            modifiers,
            inventory,
            seed,
            reveal,
        } = config;

        let boss = match (mode, boss) {
            (GameMode::Boss, Some(def)) if def.hp == 0 => {
                return Err(SessionError::InvalidBoss(def.id))
            }
            (GameMode::Boss, Some(def)) => Some(BossEncounter::new(def)),
            (GameMode::Boss, None) => return Err(SessionError::MissingBoss),
            (_, Some(def)) => return Err(SessionError::UnexpectedBoss(def.id)),
            (_, None) => None,
        };

        let kind = mode.phrase_kind();
        pool.ensure_usable(kind)?;

        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let target = pool
            .pick(kind, &mut rng)
            .ok_or(SessionError::EmptyPool(kind))?
            .to_string();
        let reveal_state = if reveal {
            Reveal::new(&target, rng.gen())
        } else {
            Reveal::finished(&target)
        };

        let bank = match mode.starting_secs() {
            Some(secs) => TimeBank::timed(secs, modifiers.timer_speed),
            None => TimeBank::untimed(),
        };

        tracing::debug!(%mode, boss = ?boss.as_ref().map(|b| &b.def().id), "session created");

        Ok(Self {
            mode,
            status: Status::Idle,
            target_chars: target.chars().collect(),
            target,
            typed: Vec::new(),
            bank,
            combo: ComboMeter::new(),
            boss,
            inventory,
            consumed: Inventory::default(),
            modifiers,
            pool,
            rng,
            reveal: reveal_state,
            reveal_enabled: reveal,
            now: 0.0,
            started_at: None,
            live_wpm: 0,
            outcome: None,
            delivered: false,
            sink,
        })
    }

    pub fn mode(&self) -> GameMode {
        self.mode
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn has_started(&self) -> bool {
        self.status != Status::Idle
    }

    pub fn has_finished(&self) -> bool {
        self.status == Status::Finished
    }

    /// The authoritative phrase every keystroke is judged against.
    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn target_chars(&self) -> &[char] {
        &self.target_chars
    }

    /// Text to show for the phrase; scrambled while the reveal runs.
    pub fn display_text(&mut self) -> String {
        if !self.reveal_enabled || self.reveal.is_done() {
            return self.target.clone();
        }
        self.reveal.display()
    }

    pub fn typed(&self) -> &[char] {
        &self.typed
    }

    pub fn remaining_secs(&self) -> f64 {
        self.bank.remaining()
    }

    pub fn is_timed(&self) -> bool {
        self.bank.is_timed()
    }

    pub fn time_fraction(&self) -> f64 {
        self.bank.fraction()
    }

    pub fn is_frozen(&self) -> bool {
        self.bank.is_frozen(self.now)
    }

    pub fn heat(&self) -> u8 {
        self.combo.heat()
    }

    pub fn streak(&self) -> u32 {
        self.combo.streak()
    }

    pub fn boss(&self) -> Option<&BossEncounter> {
        self.boss.as_ref()
    }

    pub fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    pub fn consumed(&self) -> &Inventory {
        &self.consumed
    }

    pub fn live_wpm(&self) -> u32 {
        self.live_wpm
    }

    /// Engine time since construction, in seconds.
    pub fn now(&self) -> f64 {
        self.now
    }

    /// Seconds the clock has run since the start, excluding frozen time.
    pub fn elapsed_secs(&self) -> f64 {
        self.started_at.map_or(0.0, |start| (self.now - start).max(0.0))
    }

    pub fn outcome(&self) -> Option<&Outcome> {
        self.outcome.as_ref()
    }

    /// Hands out the outcome exactly once.
    pub fn take_outcome(&mut self) -> Option<Outcome> {
        if self.delivered {
            return None;
        }
        let outcome = self.outcome.clone()?;
        self.delivered = true;
        Some(outcome)
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// IDLE -> ACTIVE. Returns false if the session was not idle.
    pub fn start(&mut self) -> bool {
        if self.status != Status::Idle {
            return false;
        }
        self.status = Status::Active;
        self.started_at = Some(self.now);
        self.sink.emit(Effect::SessionStarted);
        tracing::info!(mode = %self.mode, "session started");
        true
    }

    pub fn tick(&mut self, delta: Duration) -> Status {
        self.advance(delta.as_secs_f64())
    }

    /// Advances engine time by `delta` seconds: the timer first, then the boss,
    /// then the live WPM. A finished session ignores the tick.
    pub fn advance(&mut self, delta: f64) -> Status {
        if self.status == Status::Finished {
            return self.status;
        }
        let delta = if delta.is_finite() { delta.max(0.0) } else { 0.0 };
        self.reveal.advance(delta);

        if self.status == Status::Idle {
            self.now += delta;
            return self.status;
        }

        let split = self.bank.advance(self.now, delta);
        if let Some(start) = self.started_at.as_mut() {
            *start += split.frozen;
        }
        self.now += delta;

        self.advance_boss(split.live);

        if self.bank.is_timed() && self.bank.is_exhausted() {
            self.finish(FinishReason::TimeExpired);
            return self.status;
        }

        self.live_wpm = outcome::wpm(self.typed.len(), self.elapsed_secs());
        self.status
    }

    fn advance_boss(&mut self, live: f64) {
        let Some(boss) = self.boss.as_mut() else {
            return;
        };
        if !boss.charge(live) {
            return;
        }

        if self.inventory.try_consume(Item::ProxyShield) {
            self.consumed.add(Item::ProxyShield, 1);
            boss.record_block();
            self.sink.on_attack_blocked();
            tracing::debug!(shields = self.inventory.proxy_shield, "boss attack blocked");
        } else {
            let damage = boss.def().attack_damage;
            self.bank.drain(damage);
            let line = boss.record_hit(&mut self.rng);
            self.sink.on_attack_landed(damage, &line);
            tracing::debug!(damage, remaining = self.bank.remaining(), "boss attack landed");
        }
    }

    /// Feeds one typed character. Returns the verdict, or `None` when the
    /// keystroke was ignored (finished session, control character, or a full
    /// buffer that still differs from the target).
    pub fn type_char(&mut self, c: char) -> Option<Verdict> {
        if self.status == Status::Finished || c.is_control() {
            return None;
        }
        if self.typed.len() >= self.target_chars.len() {
            return None;
        }
        if self.status == Status::Idle {
            self.start();
        }

        let expected = expected_char(&self.target_chars, self.typed.len())?;
        let before = self.combo;
        let verdict = judge(c, expected, self.inventory.has(Item::ProxyShield));
        verdict.apply(&mut self.combo);
        self.typed.push(c);

        match verdict {
            Verdict::Correct => self.sink.on_correct_keystroke(self.combo.heat()),
            Verdict::Blocked => {
                if self.inventory.try_consume(Item::ProxyShield) {
                    self.consumed.add(Item::ProxyShield, 1);
                }
                self.sink.on_mistake_blocked();
            }
            Verdict::Wrong => self.sink.on_mistake(),
        }

        if verdict == Verdict::Correct && self.damage_boss(hit_damage(&before)) {
            return Some(verdict);
        }

        if self.typed == self.target_chars {
            self.on_phrase_complete();
        }
        Some(verdict)
    }

    /// Deals `damage` to the boss, if any; finishes the session on a kill.
    fn damage_boss(&mut self, damage: u32) -> bool {
        let Some(boss) = self.boss.as_mut() else {
            return false;
        };
        let killed = boss.take_damage(damage);
        let hp = boss.hp();
        self.sink.emit(Effect::BossHit { damage, hp });
        if killed {
            self.finish(FinishReason::BossDefeated);
        }
        killed
    }

    pub fn backspace(&mut self) {
        if self.status == Status::Active {
            self.typed.pop();
        }
    }

    fn on_phrase_complete(&mut self) {
        self.sink.emit(Effect::PhraseComplete);
        match self.mode.on_phrase_complete() {
            PhraseCompletion::Finish => self.finish(FinishReason::Completed),
            PhraseCompletion::NextPhrase(kind) => {
                self.typed.clear();
                if let Some(boss) = self.boss.as_mut() {
                    boss.record_layer_breached();
                }
                self.load_phrase(kind);
            }
        }
    }

    fn load_phrase(&mut self, kind: PhraseKind) {
        let Some(next) = self.pool.pick(kind, &mut self.rng).map(str::to_string) else {
            return;
        };
        tracing::debug!(phrase = %next, "next phrase");
        self.reveal.restart(&next);
        self.target_chars = next.chars().collect();
        self.target = next;
    }

    /// Uses one charge of `item`. Proxy shields are passive and cannot be
    /// triggered by hand. Returns false when nothing happened.
    pub fn use_item(&mut self, item: Item) -> bool {
        match item {
            Item::TimeFreeze => self.use_time_freeze(),
            Item::AutoWord => self.use_auto_word(),
            Item::ProxyShield => false,
        }
    }

    fn spend(&mut self, item: Item) -> bool {
        if self.status != Status::Active || !self.inventory.try_consume(item) {
            return false;
        }
        self.consumed.add(item, 1);
        self.sink.emit(Effect::ItemUsed(item));
        tracing::debug!(%item, left = self.inventory.count(item), "item used");
        true
    }

    pub fn use_time_freeze(&mut self) -> bool {
        if !self.spend(Item::TimeFreeze) {
            return false;
        }
        self.bank.freeze(self.now);
        true
    }

    pub fn use_auto_word(&mut self) -> bool {
        if !self.spend(Item::AutoWord) {
            return false;
        }
        let from = self.typed.len().min(self.target_chars.len());
        let to = (from + AUTO_WORD_CHARS).min(self.target_chars.len());
        self.typed.extend_from_slice(&self.target_chars[from..to]);

        if self.damage_boss(AUTO_WORD_DAMAGE) {
            return true;
        }
        if self.typed == self.target_chars {
            self.on_phrase_complete();
        }
        true
    }

    /// Ends the session without success. Returns false if it already ended.
    pub fn abort(&mut self) -> bool {
        if self.status == Status::Finished {
            return false;
        }
        self.finish(FinishReason::Aborted);
        true
    }

    /// Ends a ZEN session successfully. Other modes cannot cash out.
    pub fn cash_out(&mut self) -> bool {
        if self.mode != GameMode::Zen || self.status == Status::Finished {
            return false;
        }
        self.finish(FinishReason::CashedOut);
        true
    }

    fn finish(&mut self, reason: FinishReason) {
        if self.status == Status::Finished {
            return;
        }
        self.status = Status::Finished;

        let is_zen = self.mode == GameMode::Zen;
        let wpm = outcome::wpm(self.typed.len(), self.elapsed_secs());
        let accuracy = outcome::accuracy(&self.typed, &self.target_chars);
        let passed = outcome::passed(reason, is_zen, accuracy);
        let yen_payout = if passed {
            outcome::payout(&PayoutInput {
                wpm,
                boss_reward: self.boss.as_ref().map(|b| b.def().reward),
                is_zen,
                heat_multiplier: self.combo.payout_multiplier(),
                modifiers: self.modifiers,
            })
        } else {
            0
        };

        let result = Outcome {
            wpm,
            accuracy,
            yen_payout,
            passed,
            boss_defeated: reason == FinishReason::BossDefeated,
            is_zen,
            reason,
            consumed: self.consumed,
        };
        self.live_wpm = wpm;
        self.sink.on_finished(&result);
        tracing::info!(%reason, wpm, accuracy, passed, yen_payout, "session finished");
        self.outcome = Some(result);
    }
}
